use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;

use admin_probe::{report, runner, Config};

#[derive(Parser)]
#[command(name = "admin-probe")]
#[command(version)]
#[command(about = "End-to-end probes for the admin user-management API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the probe suite against a running service
    Run {
        /// YAML config file (values are overridden by env and flags)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Base URL of the service under test
        #[arg(long)]
        base_url: Option<String>,

        /// Phone of the admin account
        #[arg(long)]
        admin_phone: Option<String>,

        /// Name sent with the admin's OTP requests
        #[arg(long)]
        admin_name: Option<String>,

        /// OTP to use when the service does not echo one
        #[arg(long)]
        otp: Option<String>,

        /// Per-request timeout in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Pause between steps in milliseconds
        #[arg(long)]
        pause_ms: Option<u64>,

        /// Output directory for reports
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Generate reports (JSON, HTML, JUnit, Markdown)
        #[arg(long, default_value = "false")]
        report: bool,

        /// Only print the final summary
        #[arg(short, long, default_value = "false")]
        quiet: bool,
    },

    /// List the probe steps in execution order
    Steps,

    /// Generate report from saved results
    Report {
        /// Path to test-results.json
        results: PathBuf,

        /// Output format (json, html, junit, markdown)
        #[arg(short, long, default_value = "html")]
        format: String,

        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            base_url,
            admin_phone,
            admin_name,
            otp,
            timeout_ms,
            pause_ms,
            output,
            report,
            quiet,
        } => {
            let mut cfg = Config::load(config.as_deref())?;
            if let Some(v) = base_url {
                cfg.base_url = v;
            }
            if let Some(v) = admin_phone {
                cfg.admin_phone = v;
            }
            if let Some(v) = admin_name {
                cfg.admin_name = v;
            }
            if otp.is_some() {
                cfg.otp = otp;
            }
            if let Some(v) = timeout_ms {
                cfg.request_timeout_ms = v;
            }
            if let Some(v) = pause_ms {
                cfg.step_pause_ms = v;
            }
            if let Some(v) = output {
                cfg.output_dir = v;
            }
            cfg.report |= report;
            cfg.quiet |= quiet;

            log::info!("running probes against {}", cfg.base_url);
            let results = runner::run_suite(cfg).await?;

            println!("\n{}", "=".repeat(60));
            print!("{}", report::markdown::generate_markdown(&results));

            if results.all_passed() {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }

        Commands::Steps => {
            runner::print_plan();
            Ok(ExitCode::SUCCESS)
        }

        Commands::Report {
            results,
            format,
            output,
        } => {
            println!(
                "{} Generating {} report from: {}",
                "📊".to_string().blue(),
                format.cyan(),
                results.display()
            );
            report::generate_report(&results, &format, output.as_deref())?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
