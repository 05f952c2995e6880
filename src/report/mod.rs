pub mod html;
pub mod json;
pub mod junit;
pub mod markdown;
pub mod types;

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

/// Generate report from a saved `test-results.json`
pub fn generate_report(results_path: &Path, format: &str, output: Option<&Path>) -> Result<()> {
    let results = std::fs::read_to_string(results_path)
        .with_context(|| format!("Failed to read results: {}", results_path.display()))?;
    let suite: types::SuiteReport = serde_json::from_str(&results)
        .with_context(|| format!("Invalid results file: {}", results_path.display()))?;

    match format {
        "json" => json::generate(&suite, output),
        "html" => html::generate(&suite, output),
        "junit" => {
            let xml = junit::generate_junit_xml(&suite)?;
            emit(&xml, output)
        }
        "markdown" | "md" => emit(&markdown::generate_markdown(&suite), output),
        _ => anyhow::bail!("Unknown format: {}", format),
    }
}

fn emit(content: &str, output: Option<&Path>) -> Result<()> {
    if let Some(path) = output {
        std::fs::write(path, content)?;
        println!("Report saved to: {}", path.display());
    } else {
        println!("{}", content);
    }
    Ok(())
}

/// Write every report format into `output_dir`
pub fn write_all(report: &types::SuiteReport, output_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory: {}", output_dir.display()))?;

    let json_path = output_dir.join("test-results.json");
    json::generate(report, Some(&json_path))?;

    let html_path = output_dir.join("report.html");
    html::generate(report, Some(&html_path))?;

    junit::write_report(report, output_dir)?;
    markdown::write_report(report, output_dir)?;

    println!(
        "\n{} Reports written to: {}",
        "📄".to_string().blue(),
        output_dir.display().to_string().cyan()
    );
    Ok(())
}
