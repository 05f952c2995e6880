use anyhow::{Context, Result};
use colored::Colorize;
use uuid::Uuid;

use super::context::RunContext;
use super::events::{ConsoleEventListener, EventEmitter, TestEvent};
use super::probes::{run_probe, Step};
use super::state::{StepState, SuiteState, TestResult};
use crate::api::AdminApiClient;
use crate::report::types::SuiteReport;
use crate::utils::config::Config;

pub struct SuiteExecutor {
    client: AdminApiClient,
    config: Config,
    context: RunContext,
    session: SuiteState,
    emitter: EventEmitter,
    steps: Vec<Step>,
}

impl SuiteExecutor {
    pub fn new(config: Config) -> Result<Self> {
        Self::with_context(config, RunContext::new())
    }

    /// Start from a prepared context (e.g. a fixed phone sequence).
    pub fn with_context(config: Config, context: RunContext) -> Result<Self> {
        let client = AdminApiClient::new(&config.base_url, config.request_timeout())
            .context("Failed to create HTTP client")?;

        let (emitter, receiver) = EventEmitter::new();
        if !config.quiet {
            // Start console listener in background
            tokio::spawn(ConsoleEventListener::listen(receiver));
        }

        let steps = Step::ALL.to_vec();
        let states = steps
            .iter()
            .enumerate()
            .map(|(i, step)| StepState::new(i, step.name()))
            .collect();
        let session = SuiteState::new(&Uuid::new_v4().to_string(), client.base_url(), states);

        Ok(Self {
            client,
            config,
            context,
            session,
            emitter,
            steps,
        })
    }

    /// Subscribe to suite execution events
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<TestEvent> {
        self.emitter.subscribe()
    }

    pub fn context(&self) -> &RunContext {
        &self.context
    }

    pub fn results(&self) -> &[TestResult] {
        &self.session.results
    }

    /// Run every step in order, then finish the session.
    pub async fn run(&mut self) -> Result<SuiteReport> {
        self.session.start();
        self.emitter.emit(TestEvent::SessionStarted {
            session_id: self.session.session_id.clone(),
            base_url: self.session.base_url.clone(),
            step_count: self.steps.len(),
        });

        let steps = self.steps.clone();
        while let Some(step) = steps.get(self.session.current_index).copied() {
            let index = self.session.current_index;
            let passed = self.run_step(index, step).await;

            if !passed && step.is_fatal() {
                let reason = step.abort_reason();
                self.emitter.emit(TestEvent::Log {
                    message: format!("{} {}. Exiting.", "✗".red(), reason),
                });
                self.session.abort(reason);
                for (i, skipped) in steps.iter().enumerate().skip(index + 1) {
                    self.emitter.emit(TestEvent::StepSkipped {
                        index: i,
                        name: skipped.name().to_string(),
                        reason: reason.to_string(),
                    });
                }
                break;
            }

            if !self.session.advance() {
                break;
            }
            // OTP and login run back to back; the admin probes are paced
            if !step.is_fatal() && !self.config.step_pause().is_zero() {
                tokio::time::sleep(self.config.step_pause()).await;
            }
        }

        self.finish().await
    }

    /// Execute one probe and record its result. Returns whether it passed.
    async fn run_step(&mut self, index: usize, step: Step) -> bool {
        if let Some(state) = self.session.current_step() {
            state.start();
        }
        self.emitter.emit(TestEvent::StepStarted {
            index,
            name: step.name().to_string(),
        });
        log::debug!("step {} ({}): {}", index, step.name(), step.description());

        let outcome = run_probe(step, &self.client, &self.config, &mut self.context).await;

        let duration_ms = match self.session.current_step() {
            Some(state) => {
                match &outcome {
                    Ok(_) => state.pass(),
                    Err(e) => state.fail(e.to_string()),
                }
                state.duration_ms.unwrap_or(0)
            }
            None => 0,
        };

        match outcome {
            Ok(report) => {
                self.emitter.emit(TestEvent::StepPassed {
                    index,
                    message: report.message.clone(),
                    details: report.details.clone(),
                    duration_ms,
                });
                self.session
                    .record(TestResult::passed(step.name(), report.message, report.details));
                true
            }
            Err(e) => {
                log::warn!("{} failed: {}", step.name(), e);
                self.emitter.emit(TestEvent::StepFailed {
                    index,
                    error: e.to_string(),
                    duration_ms,
                });
                self.session.record(TestResult::failed(step.name(), e.to_string()));
                false
            }
        }
    }

    /// Close the session, emit the summary and write reports if enabled.
    pub async fn finish(&mut self) -> Result<SuiteReport> {
        self.session.finish();

        let summary = self.session.summary();
        self.emitter.emit(TestEvent::SessionFinished { summary });

        // Small delay to ensure SessionFinished event is processed before printing reports
        if !self.config.quiet {
            tokio::time::sleep(tokio::time::Duration::from_millis(200)).await;
        }

        let report = self.session.to_report();
        if self.config.report {
            crate::report::write_all(&report, &self.config.output_dir)?;
        }

        Ok(report)
    }
}
