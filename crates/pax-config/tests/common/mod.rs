// crates/pax-config/tests/common/mod.rs
// =============================================================================
// Module: Config Test Helpers
// Description: Shared helpers for config validation tests.
// Purpose: Reduce duplication across integration tests for pax-config.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use pax_config::ConfigError;
use pax_config::PaxConfig;

/// Test outcome with a readable failure message.
pub type TestResult = Result<(), String>;

/// Parses a TOML string into a `PaxConfig` without validation.
pub fn config_from_toml(toml_str: &str) -> Result<PaxConfig, toml::de::Error> {
    toml::from_str(toml_str)
}

/// Returns a config with all defaults applied.
pub fn minimal_config() -> Result<PaxConfig, toml::de::Error> {
    config_from_toml("")
}

/// Fails unless `result` is an error whose message contains `needle`.
pub fn assert_invalid<T>(result: Result<T, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config".to_string()),
    }
}
