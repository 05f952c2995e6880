use super::types::SuiteReport;
use crate::runner::state::StepStatus;
use anyhow::Result;
use std::path::Path;

/// Generate HTML report
pub fn generate(results: &SuiteReport, output: Option<&Path>) -> Result<()> {
    let html = generate_html(results);

    if let Some(path) = output {
        std::fs::write(path, html)?;
        println!("HTML report saved to: {}", path.display());
    } else {
        println!("{}", html);
    }

    Ok(())
}

pub fn generate_html(results: &SuiteReport) -> String {
    let summary = &results.summary;
    let pass_rate = if summary.total_steps > 0 {
        (summary.passed as f64 / summary.total_steps as f64 * 100.0) as u32
    } else {
        0
    };

    let mut steps_html = String::new();
    for step in &results.steps {
        let (status_icon, status_class) = match &step.status {
            StepStatus::Passed => ("✓", "passed"),
            StepStatus::Failed { .. } => ("✗", "failed"),
            StepStatus::Skipped { .. } => ("○", "skipped"),
            StepStatus::Running => ("⋯", "running"),
            StepStatus::Pending => ("○", "pending"),
        };

        let message = match &step.status {
            StepStatus::Failed { error } => error.clone(),
            StepStatus::Skipped { reason } => reason.clone(),
            _ => results
                .result_for(&step.name)
                .map(|r| r.message.clone())
                .unwrap_or_default(),
        };

        let details_html = results
            .result_for(&step.name)
            .filter(|r| !r.details.is_empty())
            .map(|r| {
                let pretty = serde_json::to_string_pretty(&r.details).unwrap_or_default();
                format!(
                    r#"<details><summary>Details</summary><pre>{}</pre></details>"#,
                    html_escape(&pretty)
                )
            })
            .unwrap_or_default();

        let duration_html = step
            .duration_ms
            .map(|d| format!("<span class=\"duration\">{}</span>", format_duration(d)))
            .unwrap_or_default();

        steps_html.push_str(&format!(
            r##"
            <div class="step {status_class}">
                <div class="step-icon">{status_icon}</div>
                <div class="step-content">
                    <div class="step-name">[{index}] {name}</div>
                    <div class="step-message">{message}</div>
                    {details_html}
                </div>
                {duration_html}
            </div>
        "##,
            index = step.index,
            name = html_escape(&step.name),
            message = html_escape(&message),
        ));
    }

    let aborted_html = results
        .aborted
        .as_deref()
        .map(|reason| format!(r#"<div class="aborted">Run aborted: {}</div>"#, html_escape(reason)))
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Admin API Probe Report - {session_id}</title>
    <style>
        :root {{
            --bg-primary: #0a0f1d;
            --bg-secondary: #141b2d;
            --border: #374151;
            --text-primary: #f9fafb;
            --text-secondary: #9ca3af;
            --green: #10b981;
            --red: #ef4444;
            --yellow: #f59e0b;
        }}
        * {{ margin: 0; padding: 0; box-sizing: border-box; }}
        body {{
            font-family: system-ui, -apple-system, sans-serif;
            background: var(--bg-primary);
            color: var(--text-primary);
            line-height: 1.5;
            padding: 3rem 1rem;
        }}
        .container {{ max-width: 1100px; margin: 0 auto; }}
        header {{ margin-bottom: 2rem; }}
        h1 {{ font-size: 2rem; font-weight: 800; }}
        .meta {{ color: var(--text-secondary); font-size: 0.9rem; }}
        .stats {{ display: flex; gap: 1rem; margin: 1.5rem 0; }}
        .stat {{
            background: var(--bg-secondary);
            border: 1px solid var(--border);
            border-radius: 0.75rem;
            padding: 1rem 1.5rem;
        }}
        .stat .value {{ font-size: 1.75rem; font-weight: 700; }}
        .stat.passed .value {{ color: var(--green); }}
        .stat.failed .value {{ color: var(--red); }}
        .stat.skipped .value {{ color: var(--yellow); }}
        .aborted {{
            border: 1px solid var(--red);
            color: var(--red);
            border-radius: 0.5rem;
            padding: 0.75rem 1rem;
            margin-bottom: 1rem;
        }}
        .step {{
            display: flex;
            gap: 1rem;
            align-items: flex-start;
            background: var(--bg-secondary);
            border-left: 4px solid var(--border);
            border-radius: 0.5rem;
            padding: 0.75rem 1rem;
            margin-bottom: 0.5rem;
        }}
        .step.passed {{ border-left-color: var(--green); }}
        .step.failed {{ border-left-color: var(--red); }}
        .step.skipped {{ border-left-color: var(--yellow); opacity: 0.7; }}
        .step-content {{ flex: 1; }}
        .step-name {{ font-weight: 600; }}
        .step-message {{ color: var(--text-secondary); font-size: 0.9rem; }}
        .step.failed .step-message {{ color: var(--red); }}
        .duration {{ color: var(--text-secondary); font-family: monospace; }}
        pre {{ font-size: 0.8rem; white-space: pre-wrap; }}
    </style>
</head>
<body>
    <div class="container">
        <header>
            <h1>Admin User Management API</h1>
            <div class="meta">Target {base_url} &middot; Session {session_id} &middot; Generated {generated_at}</div>
        </header>
        <div class="stats">
            <div class="stat"><div class="value">{pass_rate}%</div>Pass rate</div>
            <div class="stat passed"><div class="value">{passed}</div>Passed</div>
            <div class="stat failed"><div class="value">{failed}</div>Failed</div>
            <div class="stat skipped"><div class="value">{skipped}</div>Skipped</div>
            <div class="stat"><div class="value">{duration}</div>Duration</div>
        </div>
        {aborted_html}
        <div class="steps">
            {steps_html}
        </div>
    </div>
</body>
</html>"#,
        session_id = html_escape(&results.session_id),
        base_url = html_escape(&results.base_url),
        generated_at = results.generated_at,
        passed = summary.passed,
        failed = summary.failed,
        skipped = summary.skipped,
        duration = format_duration(summary.total_duration_ms.unwrap_or(0)),
    )
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn format_duration(ms: u64) -> String {
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 60000 {
        format!("{:.1}s", ms as f64 / 1000.0)
    } else {
        let minutes = ms / 60000;
        let seconds = (ms % 60000) as f64 / 1000.0;
        format!("{}m {:.0}s", minutes, seconds)
    }
}
