pub mod api;
pub mod error;
pub mod report;
pub mod runner;
pub mod utils;

// Re-export common items
pub use error::{ProbeError, ProbeResult};
pub use report::generate_report;
pub use runner::run_suite;
pub use utils::config::Config;
