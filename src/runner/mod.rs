pub mod assertions;
pub mod context;
pub mod events;
pub mod executor;
pub mod probes;
pub mod state;

use anyhow::Result;
use colored::Colorize;

use crate::report::types::SuiteReport;
use crate::utils::config::Config;

pub use events::*;
pub use probes::Step;
pub use state::*;

/// Run the full probe suite against the configured service
pub async fn run_suite(config: Config) -> Result<SuiteReport> {
    let mut executor = executor::SuiteExecutor::new(config)?;
    executor.run().await
}

/// Print the ordered step plan
pub fn print_plan() {
    println!("{} Probe plan:", "▶".green().bold());
    for (i, step) in Step::ALL.iter().enumerate() {
        let marker = if step.is_fatal() {
            " (fatal)".red().to_string()
        } else {
            String::new()
        };
        println!(
            "  [{:>2}] {}{}\n       {}",
            i,
            step.name().white().bold(),
            marker,
            step.description().dimmed()
        );
    }
}
