//! Expectations a probe places on a response.

use crate::api::{ApiResponse, ProbeOutcome};
use crate::error::{ProbeError, ProbeResult};

/// Require exactly `expected` as the status.
pub fn expect_status(response: &ApiResponse, expected: u16) -> ProbeResult<()> {
    if response.status == expected {
        Ok(())
    } else {
        Err(ProbeError::UnexpectedStatus {
            status: response.status,
            body: response.body.clone(),
        })
    }
}

/// Require a rejection with status `expected` whose error message contains
/// `keyword` (case-insensitive). Returns the error message.
pub fn expect_rejection(response: &ApiResponse, expected: u16, keyword: &str) -> ProbeResult<String> {
    let outcome = response.outcome();
    if outcome.status() != expected {
        return Err(ProbeError::StatusMismatch {
            expected,
            actual: outcome.status(),
        });
    }

    match outcome {
        ProbeOutcome::Rejected { error, .. } => {
            if error.to_lowercase().contains(&keyword.to_lowercase()) {
                Ok(error)
            } else {
                Err(ProbeError::WrongMessage(error))
            }
        }
        // right status, but no `error` field to check
        ProbeOutcome::Success { .. } | ProbeOutcome::Unexpected { .. } => {
            Err(ProbeError::WrongMessage(String::new()))
        }
    }
}

/// Check that a JSON object carries every key in `fields`; returns the missing ones.
pub fn missing_fields(object: &serde_json::Map<String, serde_json::Value>, fields: &[&str]) -> Vec<String> {
    fields
        .iter()
        .filter(|f| !object.contains_key(**f))
        .map(|f| f.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expect_rejection_matches_keyword_case_insensitively() {
        let res = ApiResponse::new(
            400,
            r#"{"error":"User with this phone number Already Exists"}"#,
        );
        let msg = expect_rejection(&res, 400, "already exists").unwrap();
        assert_eq!(msg, "User with this phone number Already Exists");
    }

    #[test]
    fn test_expect_rejection_wrong_status() {
        let res = ApiResponse::new(201, r#"{"success":true}"#);
        let err = expect_rejection(&res, 400, "already exists").unwrap_err();
        assert_eq!(err.to_string(), "Expected 400, got 201");
    }

    #[test]
    fn test_expect_rejection_wrong_message() {
        let res = ApiResponse::new(400, r#"{"error":"Name, phone, and role are required"}"#);
        let err = expect_rejection(&res, 400, "invalid role").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Wrong error message: Name, phone, and role are required"
        );
    }

    #[test]
    fn test_expect_rejection_without_error_field() {
        let res = ApiResponse::new(404, "<!DOCTYPE html><h1>404</h1>");
        let err = expect_rejection(&res, 404, "not found").unwrap_err();
        assert!(matches!(err, ProbeError::WrongMessage(ref m) if m.is_empty()));
    }

    #[test]
    fn test_expect_status_reports_body() {
        let res = ApiResponse::new(500, r#"{"error":"Failed to fetch users"}"#);
        let err = expect_status(&res, 200).unwrap_err();
        assert_eq!(err.to_string(), r#"HTTP 500: {"error":"Failed to fetch users"}"#);
        assert!(expect_status(&ApiResponse::new(200, "{}"), 200).is_ok());
    }

    #[test]
    fn test_missing_fields() {
        let user = serde_json::json!({"name": "A", "phone": "+91", "role": "admin"});
        let missing = missing_fields(
            user.as_object().unwrap(),
            &["name", "phone", "role", "createdAt"],
        );
        assert_eq!(missing, vec!["createdAt".to_string()]);
    }
}
