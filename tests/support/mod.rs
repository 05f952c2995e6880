#![allow(dead_code)]

pub mod fake_service;

use admin_probe::Config;
use fake_service::FakeService;

/// Config pointed at `service`, with no pacing and no console output.
pub fn config_for(service: &FakeService) -> Config {
    Config {
        base_url: service.base_url.clone(),
        step_pause_ms: 0,
        request_timeout_ms: 5_000,
        quiet: true,
        ..Config::default()
    }
}
