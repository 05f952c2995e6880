//! Short Markdown digest of a run, meant to be pasted into a status page.

use super::types::SuiteReport;
use anyhow::Result;
use std::fmt::Write as _;
use std::path::Path;

/// Areas reported as working when every step passed
const COVERED_AREAS: [&str; 4] = [
    "GET /api/admin/users",
    "POST /api/admin/users",
    "POST /api/admin/users/update-role",
    "Authentication & Authorization",
];

pub fn generate_markdown(results: &SuiteReport) -> String {
    let summary = &results.summary;
    let mut out = String::new();

    let _ = writeln!(out, "# Admin User Management API\n");
    let _ = writeln!(
        out,
        "Target `{}` · session `{}` · {}\n",
        results.base_url, results.session_id, results.generated_at
    );
    let _ = writeln!(
        out,
        "**{}/{} steps passed** ({} failed, {} skipped)\n",
        summary.passed, summary.total_steps, summary.failed, summary.skipped
    );

    if results.all_passed() {
        let _ = writeln!(out, "✅ ALL ADMIN USER MANAGEMENT APIS WORKING\n");
        for area in COVERED_AREAS {
            let _ = writeln!(out, "- {}: ✅ Working", area);
        }
    } else {
        let _ = writeln!(out, "❌ SOME ADMIN USER MANAGEMENT APIS FAILED\n");
        for result in results.failed_results() {
            let _ = writeln!(out, "- {}: ❌ {}", result.test, result.message);
        }
        if let Some(reason) = &results.aborted {
            let _ = writeln!(
                out,
                "- Run aborted: {} ({} steps skipped)",
                reason, summary.skipped
            );
        }
    }

    out
}

/// Write report to file
pub fn write_report(results: &SuiteReport, output_dir: &Path) -> Result<()> {
    let path = output_dir.join("test-summary.md");
    std::fs::write(&path, generate_markdown(results))?;
    println!("    Generated summary: {}", path.display());
    Ok(())
}
