use thiserror::Error;

/// Failure of a single probe.
///
/// The `Display` text is what ends up in the step's `TestResult.message`,
/// so variants are worded for a human reading the run log.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Exception: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid JSON in HTTP {status} response: {source}")]
    Decode {
        status: u16,
        #[source]
        source: serde_json::Error,
    },

    #[error("HTTP {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("Expected {expected}, got {actual}")]
    StatusMismatch { expected: u16, actual: u16 },

    #[error("Wrong error message: {0}")]
    WrongMessage(String),

    #[error("No test user ID available from previous test")]
    MissingCreatedUser,

    #[error("{0}")]
    Assertion(String),
}

impl ProbeError {
    pub fn assertion(message: impl Into<String>) -> Self {
        ProbeError::Assertion(message.into())
    }
}

pub type ProbeResult<T> = std::result::Result<T, ProbeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_read_like_run_log() {
        let err = ProbeError::StatusMismatch {
            expected: 400,
            actual: 200,
        };
        assert_eq!(err.to_string(), "Expected 400, got 200");

        let err = ProbeError::UnexpectedStatus {
            status: 500,
            body: "{\"error\":\"Failed to create user\"}".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "HTTP 500: {\"error\":\"Failed to create user\"}"
        );

        assert_eq!(
            ProbeError::MissingCreatedUser.to_string(),
            "No test user ID available from previous test"
        );
    }
}
