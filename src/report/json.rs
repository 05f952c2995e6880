use super::types::SuiteReport;
use anyhow::Result;
use std::path::Path;

pub fn generate_json(results: &SuiteReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(results)?)
}

/// Generate JSON report
pub fn generate(results: &SuiteReport, output: Option<&Path>) -> Result<()> {
    let json = generate_json(results)?;

    if let Some(path) = output {
        std::fs::write(path, json)?;
        println!("JSON report saved to: {}", path.display());
    } else {
        println!("{}", json);
    }

    Ok(())
}
