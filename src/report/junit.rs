use super::types::SuiteReport;
use crate::runner::state::{StepStateReport, StepStatus};
use anyhow::Result;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;
use std::path::Path;

fn seconds(ms: u64) -> String {
    (ms as f64 / 1000.0).to_string()
}

/// Generate JUnit XML report string from a suite report
pub fn generate_junit_xml(results: &SuiteReport) -> Result<String> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let summary = &results.summary;
    let tests = results.steps.len().to_string();
    let failures = summary.failed.to_string();
    let skipped = summary.skipped.to_string();
    let time = seconds(summary.total_duration_ms.unwrap_or(0));

    // <testsuites>
    let mut suites_start = BytesStart::new("testsuites");
    suites_start.push_attribute(("name", "admin-probe-run"));
    suites_start.push_attribute(("tests", tests.as_str()));
    suites_start.push_attribute(("failures", failures.as_str()));
    suites_start.push_attribute(("skipped", skipped.as_str()));
    suites_start.push_attribute(("time", time.as_str()));
    writer.write_event(Event::Start(suites_start))?;

    // Single <testsuite> for the admin user-management probes
    let mut suite_start = BytesStart::new("testsuite");
    suite_start.push_attribute(("name", "admin-user-management"));
    suite_start.push_attribute(("tests", tests.as_str()));
    suite_start.push_attribute(("failures", failures.as_str()));
    suite_start.push_attribute(("skipped", skipped.as_str()));
    suite_start.push_attribute(("id", results.session_id.as_str()));
    suite_start.push_attribute(("hostname", results.base_url.as_str()));
    suite_start.push_attribute(("time", time.as_str()));
    suite_start.push_attribute(("timestamp", results.generated_at.as_str()));
    writer.write_event(Event::Start(suite_start))?;

    for step in &results.steps {
        write_test_case(&mut writer, step)?;
    }

    writer.write_event(Event::End(BytesEnd::new("testsuite")))?;
    writer.write_event(Event::End(BytesEnd::new("testsuites")))?;

    let result = writer.into_inner().into_inner();
    let xml = String::from_utf8(result)?;
    Ok(xml)
}

fn write_test_case<W: std::io::Write>(writer: &mut Writer<W>, step: &StepStateReport) -> Result<()> {
    let time = seconds(step.duration_ms.unwrap_or(0));

    let mut case_start = BytesStart::new("testcase");
    case_start.push_attribute(("name", step.name.as_str()));
    case_start.push_attribute(("classname", "admin_probe.admin_user_management"));
    case_start.push_attribute(("time", time.as_str()));
    writer.write_event(Event::Start(case_start))?;

    match &step.status {
        StepStatus::Failed { error } => {
            let mut fail_start = BytesStart::new("failure");
            fail_start.push_attribute(("message", error.as_str()));
            fail_start.push_attribute(("type", "AssertionError"));
            writer.write_event(Event::Start(fail_start))?;
            writer.write_event(Event::Text(BytesText::new(error)))?;
            writer.write_event(Event::End(BytesEnd::new("failure")))?;
        }
        StepStatus::Skipped { reason } => {
            let mut skip = BytesStart::new("skipped");
            skip.push_attribute(("message", reason.as_str()));
            writer.write_event(Event::Empty(skip))?;
        }
        _ => {}
    }

    writer.write_event(Event::End(BytesEnd::new("testcase")))?;
    Ok(())
}

/// Write report to file
pub fn write_report(results: &SuiteReport, output_dir: &Path) -> Result<()> {
    let xml = generate_junit_xml(results)?;
    let path = output_dir.join("junit.xml");
    std::fs::write(&path, xml)?;
    println!("    Generated JUnit report: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::state::TestSummary;

    fn step(index: usize, name: &str, status: StepStatus) -> StepStateReport {
        StepStateReport {
            index,
            name: name.to_string(),
            status,
            duration_ms: Some(120),
        }
    }

    #[test]
    fn test_generate_junit_xml() {
        let results = SuiteReport {
            session_id: "test-session".to_string(),
            base_url: "http://localhost:3000".to_string(),
            steps: vec![
                step(0, "Send OTP", StepStatus::Passed),
                step(
                    1,
                    "Admin Login",
                    StepStatus::Failed {
                        error: "User role is customer, expected 'admin'".to_string(),
                    },
                ),
                step(
                    2,
                    "GET /api/admin/users",
                    StepStatus::Skipped {
                        reason: "Cannot proceed without admin authentication".to_string(),
                    },
                ),
            ],
            results: vec![],
            summary: TestSummary {
                session_id: "test-session".to_string(),
                total_steps: 3,
                passed: 1,
                failed: 1,
                skipped: 1,
                total_duration_ms: Some(3500),
            },
            aborted: Some("Cannot proceed without admin authentication".to_string()),
            generated_at: "2024-01-01 12:00:00".to_string(),
        };

        let xml = generate_junit_xml(&results).expect("Failed to generate XML");

        assert!(xml.contains(r#"<testsuites name="admin-probe-run""#));
        assert!(xml.contains(r#"tests="3""#));
        assert!(xml.contains(r#"failures="1""#));
        assert!(xml.contains(r#"skipped="1""#));
        assert!(xml.contains(r#"<testcase name="Send OTP""#));
        assert!(xml.contains(r#"<failure message="User role is customer, expected"#));
        assert!(xml.contains(r#"<skipped message="Cannot proceed without admin authentication""#));
    }
}
