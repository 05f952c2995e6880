//! HTTP client for the admin user-management API
//!
//! Cookies are handled by hand rather than by a shared cookie store: each
//! call takes the [`Session`] it should authenticate as, so the admin, a
//! customer and an anonymous caller can be used side by side.

use reqwest::header::{COOKIE, SET_COOKIE};
use serde::Serialize;
use std::time::Duration;

use super::response::{ApiResponse, Cookie};
use super::types::{CreateUserRequest, SendOtpRequest, UpdateRoleRequest, VerifyOtpRequest};
use crate::error::ProbeResult;

pub const SEND_OTP_PATH: &str = "/api/auth/send-otp";
pub const VERIFY_OTP_PATH: &str = "/api/auth/verify-otp";
pub const ADMIN_USERS_PATH: &str = "/api/admin/users";
pub const UPDATE_ROLE_PATH: &str = "/api/admin/users/update-role";

/// Name of the cookie the service stores the session token in.
pub const SESSION_COOKIE: &str = "token";

/// Credentials of one logged-in identity.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub token: Option<String>,
    pub cookies: Vec<Cookie>,
}

impl Session {
    /// No credentials at all.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn from_login(token: Option<String>, cookies: Vec<Cookie>) -> Self {
        Self { token, cookies }
    }

    pub fn has_cookies(&self) -> bool {
        !self.cookies.is_empty()
    }

    /// Value for the `Cookie` request header.
    pub fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        Some(
            self.cookies
                .iter()
                .map(|c| format!("{}={}", c.name, c.value))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

pub struct AdminApiClient {
    /// Base URL of the service (e.g., "http://localhost:3000")
    base_url: String,
    client: reqwest::Client,
}

impl AdminApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> ProbeResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn send_otp(&self, phone: &str, name: &str) -> ProbeResult<ApiResponse> {
        self.post_json(
            SEND_OTP_PATH,
            &Session::anonymous(),
            &SendOtpRequest { phone, name },
        )
        .await
    }

    pub async fn verify_otp(&self, phone: &str, otp: &str, name: &str) -> ProbeResult<ApiResponse> {
        self.post_json(
            VERIFY_OTP_PATH,
            &Session::anonymous(),
            &VerifyOtpRequest { phone, otp, name },
        )
        .await
    }

    pub async fn list_users(&self, session: &Session) -> ProbeResult<ApiResponse> {
        let mut req = self.client.get(self.url(ADMIN_USERS_PATH));
        if let Some(cookie) = session.cookie_header() {
            req = req.header(COOKIE, cookie);
        }
        log::debug!("GET {}", ADMIN_USERS_PATH);
        self.execute(req).await
    }

    pub async fn create_user(
        &self,
        session: &Session,
        name: &str,
        phone: &str,
        role: &str,
    ) -> ProbeResult<ApiResponse> {
        self.post_json(
            ADMIN_USERS_PATH,
            session,
            &CreateUserRequest { name, phone, role },
        )
        .await
    }

    pub async fn update_role(
        &self,
        session: &Session,
        user_id: &str,
        new_role: &str,
    ) -> ProbeResult<ApiResponse> {
        self.post_json(
            UPDATE_ROLE_PATH,
            session,
            &UpdateRoleRequest { user_id, new_role },
        )
        .await
    }

    /// POST any JSON body, used directly by probes that send incomplete payloads.
    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        session: &Session,
        body: &B,
    ) -> ProbeResult<ApiResponse> {
        let mut req = self.client.post(self.url(path)).json(body);
        if let Some(cookie) = session.cookie_header() {
            req = req.header(COOKIE, cookie);
        }
        log::debug!("POST {}", path);
        self.execute(req).await
    }

    async fn execute(&self, req: reqwest::RequestBuilder) -> ProbeResult<ApiResponse> {
        let res = req.send().await?;
        let status = res.status().as_u16();

        let cookies = res
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(Cookie::parse_set_cookie)
            .collect();

        let body = res.text().await?;
        log::debug!("  -> HTTP {} {}", status, body);

        Ok(ApiResponse {
            status,
            body,
            cookies,
        })
    }
}
