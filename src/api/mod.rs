pub mod client;
pub mod response;
pub mod types;

pub use client::{AdminApiClient, Session};
pub use response::{ApiResponse, Cookie, ProbeOutcome};
pub use types::{Role, UserRecord};
