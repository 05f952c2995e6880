use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Outcome of one probe, as recorded for the run log and reports.
/// Created once when the step completes and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub test: String,
    pub success: bool,
    pub message: String,
    #[serde(default)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

impl TestResult {
    pub fn passed(
        test: &str,
        message: impl Into<String>,
        details: serde_json::Map<String, serde_json::Value>,
    ) -> Self {
        Self {
            test: test.to_string(),
            success: true,
            message: message.into(),
            details,
        }
    }

    pub fn failed(test: &str, message: impl Into<String>) -> Self {
        Self {
            test: test.to_string(),
            success: false,
            message: message.into(),
            details: serde_json::Map::new(),
        }
    }
}

/// Step execution status
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StepStatus {
    Pending,
    Running,
    Passed,
    Failed { error: String },
    Skipped { reason: String },
}

impl StepStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StepStatus::Passed | StepStatus::Failed { .. } | StepStatus::Skipped { .. }
        )
    }
}

/// State for a single step execution
#[derive(Debug, Clone)]
pub struct StepState {
    pub index: usize,
    pub name: String,
    pub status: StepStatus,
    pub started_at: Option<Instant>,
    pub finished_at: Option<Instant>,
    pub duration_ms: Option<u64>,
}

impl StepState {
    pub fn new(index: usize, name: &str) -> Self {
        Self {
            index,
            name: name.to_string(),
            status: StepStatus::Pending,
            started_at: None,
            finished_at: None,
            duration_ms: None,
        }
    }

    pub fn start(&mut self) {
        self.status = StepStatus::Running;
        self.started_at = Some(Instant::now());
    }

    pub fn pass(&mut self) {
        self.finish(StepStatus::Passed);
    }

    pub fn fail(&mut self, error: String) {
        self.finish(StepStatus::Failed { error });
    }

    pub fn skip(&mut self, reason: String) {
        self.status = StepStatus::Skipped { reason };
    }

    fn finish(&mut self, status: StepStatus) {
        self.status = status;
        self.finished_at = Some(Instant::now());
        if let Some(start) = self.started_at {
            self.duration_ms = Some(start.elapsed().as_millis() as u64);
        }
    }

    /// Serialize state for reporting (without Instant which isn't serializable)
    pub fn to_report(&self) -> StepStateReport {
        StepStateReport {
            index: self.index,
            name: self.name.clone(),
            status: self.status.clone(),
            duration_ms: self.duration_ms,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepStateReport {
    pub index: usize,
    pub name: String,
    pub status: StepStatus,
    pub duration_ms: Option<u64>,
}

/// State of one full run of the suite
#[derive(Debug, Clone)]
pub struct SuiteState {
    pub session_id: String,
    pub base_url: String,
    pub steps: Vec<StepState>,
    pub results: Vec<TestResult>,
    pub current_index: usize,
    pub started_at: Option<Instant>,
    pub finished_at: Option<Instant>,
    /// Why the run stopped early, if it did
    pub aborted: Option<String>,
}

impl SuiteState {
    pub fn new(session_id: &str, base_url: &str, steps: Vec<StepState>) -> Self {
        Self {
            session_id: session_id.to_string(),
            base_url: base_url.to_string(),
            steps,
            results: Vec::new(),
            current_index: 0,
            started_at: None,
            finished_at: None,
            aborted: None,
        }
    }

    pub fn start(&mut self) {
        self.started_at = Some(Instant::now());
    }

    pub fn current_step(&mut self) -> Option<&mut StepState> {
        self.steps.get_mut(self.current_index)
    }

    /// Move to the next step. Returns false once every step has been visited.
    pub fn advance(&mut self) -> bool {
        self.current_index += 1;
        self.current_index < self.steps.len()
    }

    pub fn record(&mut self, result: TestResult) {
        self.results.push(result);
    }

    /// Mark every unfinished step after the current one as skipped.
    pub fn abort(&mut self, reason: &str) {
        self.aborted = Some(reason.to_string());
        let from = (self.current_index + 1).min(self.steps.len());
        for step in &mut self.steps[from..] {
            if !step.status.is_terminal() {
                step.skip(reason.to_string());
            }
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Instant::now());
    }

    pub fn all_passed(&self) -> bool {
        !self.steps.is_empty()
            && self
                .steps
                .iter()
                .all(|s| matches!(s.status, StepStatus::Passed))
    }

    pub fn summary(&self) -> TestSummary {
        let mut passed = 0;
        let mut failed = 0;
        let mut skipped = 0;

        for step in &self.steps {
            match step.status {
                StepStatus::Passed => passed += 1,
                StepStatus::Failed { .. } => failed += 1,
                StepStatus::Skipped { .. } => skipped += 1,
                _ => {}
            }
        }

        let total_duration_ms = self.started_at.map(|start| {
            self.finished_at
                .unwrap_or_else(Instant::now)
                .duration_since(start)
                .as_millis() as u64
        });

        TestSummary {
            session_id: self.session_id.clone(),
            total_steps: self.steps.len() as u32,
            passed,
            failed,
            skipped,
            total_duration_ms,
        }
    }

    /// Serialize state for reporting
    pub fn to_report(&self) -> crate::report::types::SuiteReport {
        crate::report::types::SuiteReport {
            session_id: self.session_id.clone(),
            base_url: self.base_url.clone(),
            steps: self.steps.iter().map(|s| s.to_report()).collect(),
            results: self.results.clone(),
            summary: self.summary(),
            aborted: self.aborted.clone(),
            generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSummary {
    pub session_id: String,
    pub total_steps: u32,
    pub passed: u32,
    pub failed: u32,
    pub skipped: u32,
    pub total_duration_ms: Option<u64>,
}

impl TestSummary {
    pub fn all_passed(&self) -> bool {
        self.total_steps > 0 && self.passed == self.total_steps
    }
}
