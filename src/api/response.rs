//! Captured HTTP responses and their classification.

use serde::de::DeserializeOwned;

use crate::error::{ProbeError, ProbeResult};

/// A cookie taken from a `Set-Cookie` header. Attributes are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
}

impl Cookie {
    /// Parse the leading `name=value` pair of a `Set-Cookie` header value.
    ///
    /// An empty value is the service clearing the cookie, so it yields `None`
    /// and the cookie is never sent back.
    pub fn parse_set_cookie(header: &str) -> Option<Cookie> {
        let pair = header.split(';').next()?.trim();
        let (name, value) = pair.split_once('=')?;
        let name = name.trim();
        let value = value.trim().trim_matches('"');
        if name.is_empty() || value.is_empty() {
            return None;
        }
        Some(Cookie {
            name: name.to_string(),
            value: value.to_string(),
        })
    }
}

/// How the service answered a request, independent of what the probe expected.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome {
    /// 2xx.
    Success { status: u16 },
    /// 4xx carrying an `error` message.
    Rejected { status: u16, error: String },
    /// Anything else, including a 4xx without an `error` field.
    Unexpected { status: u16, body: String },
}

impl ProbeOutcome {
    pub fn status(&self) -> u16 {
        match self {
            ProbeOutcome::Success { status }
            | ProbeOutcome::Rejected { status, .. }
            | ProbeOutcome::Unexpected { status, .. } => *status,
        }
    }
}

/// Fully read response: status, raw body text and the cookies it set.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
    pub cookies: Vec<Cookie>,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            cookies: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> ProbeResult<T> {
        serde_json::from_str(&self.body).map_err(|source| ProbeError::Decode {
            status: self.status,
            source,
        })
    }

    /// The `error` string of a JSON body, if there is one.
    pub fn error_message(&self) -> Option<String> {
        let value: serde_json::Value = serde_json::from_str(&self.body).ok()?;
        value.get("error")?.as_str().map(str::to_string)
    }

    pub fn cookie(&self, name: &str) -> Option<&Cookie> {
        self.cookies.iter().find(|c| c.name == name)
    }

    pub fn outcome(&self) -> ProbeOutcome {
        if self.is_success() {
            return ProbeOutcome::Success {
                status: self.status,
            };
        }
        if (400..500).contains(&self.status) {
            if let Some(error) = self.error_message() {
                return ProbeOutcome::Rejected {
                    status: self.status,
                    error,
                };
            }
        }
        ProbeOutcome::Unexpected {
            status: self.status,
            body: self.body.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_set_cookie() {
        let cookie =
            Cookie::parse_set_cookie("token=eyJhbGci.x.y; Path=/; HttpOnly; SameSite=lax").unwrap();
        assert_eq!(cookie.name, "token");
        assert_eq!(cookie.value, "eyJhbGci.x.y");

        assert!(Cookie::parse_set_cookie("garbage").is_none());
        assert!(Cookie::parse_set_cookie("=value").is_none());
    }

    #[test]
    fn test_cleared_cookie_is_dropped() {
        assert!(Cookie::parse_set_cookie("token=; Path=/; Max-Age=0").is_none());
        assert!(Cookie::parse_set_cookie(r#"token=""; Max-Age=0"#).is_none());
    }

    #[test]
    fn test_outcome_classification() {
        assert_eq!(
            ApiResponse::new(201, r#"{"success":true}"#).outcome(),
            ProbeOutcome::Success { status: 201 }
        );
        assert_eq!(
            ApiResponse::new(400, r#"{"error":"Invalid role"}"#).outcome(),
            ProbeOutcome::Rejected {
                status: 400,
                error: "Invalid role".to_string()
            }
        );
        assert_eq!(
            ApiResponse::new(404, "<html>Not Found</html>").outcome(),
            ProbeOutcome::Unexpected {
                status: 404,
                body: "<html>Not Found</html>".to_string()
            }
        );
        assert_eq!(
            ApiResponse::new(500, r#"{"error":"Failed to create user"}"#)
                .outcome()
                .status(),
            500
        );
    }

    #[test]
    fn test_json_decode_error_keeps_status() {
        let err = ApiResponse::new(200, "not json")
            .json::<serde_json::Value>()
            .unwrap_err();
        assert!(matches!(err, ProbeError::Decode { status: 200, .. }));
    }
}
