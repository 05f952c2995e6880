use super::state::TestSummary;
use tokio::sync::broadcast;

type Details = serde_json::Map<String, serde_json::Value>;

/// Suite execution events for real-time updates
#[derive(Debug, Clone)]
pub enum TestEvent {
    // Session events
    SessionStarted {
        session_id: String,
        base_url: String,
        step_count: usize,
    },
    SessionFinished {
        summary: TestSummary,
    },

    // Step events
    StepStarted {
        index: usize,
        name: String,
    },
    StepPassed {
        index: usize,
        message: String,
        details: Details,
        duration_ms: u64,
    },
    StepFailed {
        index: usize,
        error: String,
        duration_ms: u64,
    },
    StepSkipped {
        index: usize,
        name: String,
        reason: String,
    },

    // Log event for coordinated output
    Log {
        message: String,
    },
}

/// Event emitter for broadcasting suite events
pub struct EventEmitter {
    sender: broadcast::Sender<TestEvent>,
}

impl EventEmitter {
    pub fn new() -> (Self, broadcast::Receiver<TestEvent>) {
        let (sender, receiver) = broadcast::channel(100);
        (Self { sender }, receiver)
    }

    pub fn emit(&self, event: TestEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TestEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventEmitter {
    fn default() -> Self {
        let (sender, _) = broadcast::channel(100);
        Self { sender }
    }
}

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration as StdDuration;

/// Console event listener for printing real-time updates
pub struct ConsoleEventListener;

impl ConsoleEventListener {
    pub async fn listen(mut receiver: broadcast::Receiver<TestEvent>) {
        use colored::Colorize;
        use std::io::IsTerminal;

        let tty = std::io::stdout().is_terminal();
        let mut spinner: Option<ProgressBar> = None;
        let mut step_text = String::new();

        while let Ok(event) = receiver.recv().await {
            match event {
                TestEvent::SessionStarted {
                    session_id,
                    base_url,
                    step_count,
                } => {
                    println!(
                        "\n{} Starting Admin User Management API Tests",
                        "▶".green().bold()
                    );
                    println!("  Session: {}", session_id.cyan());
                    println!("  Target: {}", base_url.cyan());
                    println!("  Steps: {}", step_count);
                    println!("{}", "=".repeat(60));
                }

                TestEvent::SessionFinished { summary } => {
                    if let Some(pb) = spinner.take() {
                        pb.finish_and_clear();
                    }

                    println!("{}", "=".repeat(60));
                    println!(
                        "{} Test Results: {}/{} steps passed",
                        "■".blue().bold(),
                        summary.passed,
                        summary.total_steps
                    );
                    println!(
                        "  {} passed, {} failed, {} skipped",
                        summary.passed.to_string().green(),
                        summary.failed.to_string().red(),
                        summary.skipped.to_string().yellow()
                    );
                    if let Some(duration) = summary.total_duration_ms {
                        println!("  Duration: {}ms", duration);
                    }
                    if summary.all_passed() {
                        println!(
                            "{} All tests passed! Admin User Management APIs are working correctly.",
                            "✓".green().bold()
                        );
                    } else {
                        println!(
                            "{} {} tests did not pass. Please check the issues above.",
                            "⚠".yellow(),
                            summary.failed + summary.skipped
                        );
                    }
                }

                TestEvent::StepStarted { index, name } => {
                    let pb = ProgressBar::new_spinner();
                    if !tty {
                        // Piped output: no escape codes
                        pb.set_draw_target(ProgressDrawTarget::hidden());
                    }
                    if let Ok(style) = ProgressStyle::default_spinner()
                        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
                        .template("  {spinner} {msg}")
                    {
                        pb.set_style(style);
                    }

                    step_text = format!("[{}] {}", index, name);
                    pb.set_message(format!("{}... ", step_text.dimmed()));
                    pb.enable_steady_tick(StdDuration::from_millis(100));
                    spinner = Some(pb);
                }

                TestEvent::StepPassed {
                    message,
                    details,
                    duration_ms,
                    ..
                } => {
                    if let Some(pb) = spinner.take() {
                        pb.finish_and_clear();
                    }
                    println!(
                        "  {} {} {} ({}ms)",
                        "✓ PASS".green().bold(),
                        step_text,
                        format!("- {}", message).dimmed(),
                        duration_ms
                    );
                    if !details.is_empty() {
                        let rendered = serde_json::Value::Object(details).to_string();
                        println!("      Details: {}", rendered.dimmed());
                    }
                }

                TestEvent::StepFailed {
                    error, duration_ms, ..
                } => {
                    if let Some(pb) = spinner.take() {
                        pb.finish_and_clear();
                    }
                    println!(
                        "  {} {} - {} ({}ms)",
                        "✗ FAIL".red().bold(),
                        step_text,
                        error.red(),
                        duration_ms
                    );
                }

                TestEvent::StepSkipped {
                    index,
                    name,
                    reason,
                } => {
                    println!(
                        "  {} [{}] {} ({})",
                        "○ SKIP".yellow(),
                        index,
                        name,
                        reason.dimmed()
                    );
                }

                TestEvent::Log { message } => {
                    if let Some(pb) = &spinner {
                        pb.suspend(|| println!("      {}", message));
                    } else {
                        println!("      {}", message);
                    }
                }
            }
        }
    }
}
