use crate::runner::state::{StepStateReport, TestResult, TestSummary};
use serde::{Deserialize, Serialize};

/// Snapshot of a finished run, the input of every report writer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteReport {
    pub session_id: String,
    pub base_url: String,
    pub steps: Vec<StepStateReport>,
    pub results: Vec<TestResult>,
    pub summary: TestSummary,
    #[serde(default)]
    pub aborted: Option<String>,
    pub generated_at: String,
}

impl SuiteReport {
    pub fn all_passed(&self) -> bool {
        self.summary.all_passed()
    }

    pub fn failed_results(&self) -> impl Iterator<Item = &TestResult> {
        self.results.iter().filter(|r| !r.success)
    }

    /// Result recorded for a step, if the step ran.
    pub fn result_for(&self, step_name: &str) -> Option<&TestResult> {
        self.results.iter().find(|r| r.test == step_name)
    }
}
