use crate::app_config::{AppConfig, Environment};
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
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>().map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("REELTRACK_ENV", "development"));
    let log_level = or_default("REELTRACK_LOG_LEVEL", "info");
    let data_dir = PathBuf::from(or_default("REELTRACK_DATA_DIR", "./data"));
    let creator_path = PathBuf::from(or_default(
        "REELTRACK_CREATOR_PATH",
        "./config/creator.yaml",
    ));

    let tick_interval_secs = parse_u64("REELTRACK_TICK_INTERVAL_SECS", "15")?;
    if tick_interval_secs == 0 {
        return Err(invalid(
            "REELTRACK_TICK_INTERVAL_SECS",
            "must be at least 1".to_string(),
        ));
    }
    let submit_latency_ms = parse_u64("REELTRACK_SUBMIT_LATENCY_MS", "2000")?;
    let batch_size = parse_usize("REELTRACK_BATCH_SIZE", "5")?;
    if batch_size == 0 {
        return Err(invalid(
            "REELTRACK_BATCH_SIZE",
            "must be at least 1".to_string(),
        ));
    }
    let batch_pacing_ms = parse_u64("REELTRACK_BATCH_PACING_MS", "1000")?;
    let refresh_latency_ms = parse_u64("REELTRACK_REFRESH_LATENCY_MS", "3000")?;

    let sim_seed = match lookup("REELTRACK_SIM_SEED") {
        Ok(raw) => Some(
            raw.parse::<u64>()
                .map_err(|e| invalid("REELTRACK_SIM_SEED", e.to_string()))?,
        ),
        Err(_) => None,
    };

    Ok(AppConfig {
        env,
        log_level,
        data_dir,
        creator_path,
        tick_interval_secs,
        submit_latency_ms,
        batch_size,
        batch_pacing_ms,
        refresh_latency_ms,
        sim_seed,
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
