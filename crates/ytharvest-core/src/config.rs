use crate::app_config::{AppConfig, Environment};
use crate::run_config::{CollectorConfig, DelayRange, ReplyConfig};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a pure
/// `HashMap` lookup.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_range = |min_var: &str,
                       min_default: &str,
                       max_var: &str,
                       max_default: &str|
     -> Result<DelayRange, ConfigError> {
        let range = DelayRange::new(
            parse_u64(min_var, min_default)?,
            parse_u64(max_var, max_default)?,
        );
        if range.is_valid() {
            Ok(range)
        } else {
            Err(ConfigError::Validation(format!(
                "{min_var} ({}) must not exceed {max_var} ({})",
                range.min_ms, range.max_ms
            )))
        }
    };

    let env = parse_environment(&or_default("YTHARVEST_ENV", "development"));
    let log_level = or_default("YTHARVEST_LOG_LEVEL", "info");
    let cdp_url = or_default("YTHARVEST_CDP_URL", "http://127.0.0.1:9222");
    let locators_path = lookup("YTHARVEST_LOCATORS_PATH")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from);
    let export_dir = PathBuf::from(or_default("YTHARVEST_EXPORT_DIR", "."));

    let collector = CollectorConfig {
        max_attempts: parse_u32("YTHARVEST_COLLECT_MAX_ATTEMPTS", "30")?,
        stagnation_threshold: parse_u32("YTHARVEST_COLLECT_STAGNATION_THRESHOLD", "5")?,
        step_delay: parse_range(
            "YTHARVEST_COLLECT_STEP_DELAY_MIN_MS",
            "1500",
            "YTHARVEST_COLLECT_STEP_DELAY_MAX_MS",
            "2000",
        )?,
        batch_size: parse_u32("YTHARVEST_COLLECT_BATCH_SIZE", "10")?,
        batch_pause_ms: parse_u64("YTHARVEST_COLLECT_BATCH_PAUSE_MS", "3000")?,
        ..CollectorConfig::default()
    };
    if collector.stagnation_threshold == 0 {
        return Err(ConfigError::Validation(
            "YTHARVEST_COLLECT_STAGNATION_THRESHOLD must be at least 1".to_string(),
        ));
    }

    let reply = ReplyConfig {
        inter_reply_delay: parse_range(
            "YTHARVEST_REPLY_DELAY_MIN_MS",
            "2000",
            "YTHARVEST_REPLY_DELAY_MAX_MS",
            "4000",
        )?,
        ..ReplyConfig::default()
    };
    let reply_timeout_secs = parse_u64("YTHARVEST_REPLY_TIMEOUT_SECS", "300")?;

    Ok(AppConfig {
        env,
        log_level,
        cdp_url,
        locators_path,
        export_dir,
        collector,
        reply,
        reply_timeout_secs,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
