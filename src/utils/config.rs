use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variables that override file and default values
pub const ENV_BASE_URL: &str = "ADMIN_PROBE_BASE_URL";
pub const ENV_ADMIN_PHONE: &str = "ADMIN_PROBE_ADMIN_PHONE";
pub const ENV_ADMIN_NAME: &str = "ADMIN_PROBE_ADMIN_NAME";
pub const ENV_OTP: &str = "ADMIN_PROBE_OTP";

/// Run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Base URL of the service under test
    pub base_url: String,

    /// Phone of the pre-provisioned admin account
    pub admin_phone: String,

    /// Name sent with the admin's OTP requests
    pub admin_name: String,

    /// Name used for the non-admin identity in the access-control probe
    pub customer_name: String,

    /// Per-request timeout (ms)
    pub request_timeout_ms: u64,

    /// Pause between steps (ms)
    pub step_pause_ms: u64,

    /// Fallback OTP used when the service does not echo one
    pub otp: Option<String>,

    /// Output directory for reports
    pub output_dir: PathBuf,

    /// Write JSON, HTML, JUnit and Markdown reports after the run
    pub report: bool,

    /// Suppress console progress output
    pub quiet: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            admin_phone: "+919999999999".to_string(),
            admin_name: "Dipak Parmar".to_string(),
            customer_name: "Test Customer".to_string(),
            request_timeout_ms: 10_000,
            step_pause_ms: 500,
            otp: None,
            output_dir: PathBuf::from("./output"),
            report: false,
            quiet: false,
        }
    }
}

impl Config {
    /// Defaults, then the YAML file (if any), then environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Apply overrides from a variable lookup (the process environment in production).
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(ENV_BASE_URL) {
            self.base_url = v;
        }
        if let Some(v) = lookup(ENV_ADMIN_PHONE) {
            self.admin_phone = v;
        }
        if let Some(v) = lookup(ENV_ADMIN_NAME) {
            self.admin_name = v;
        }
        if let Some(v) = lookup(ENV_OTP) {
            self.otp = Some(v);
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn step_pause(&self) -> Duration {
        Duration::from_millis(self.step_pause_ms)
    }
}
