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

    // Blank credentials are treated the same as unset ones.
    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
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

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let env = parse_environment(&or_default("STACKWISE_ENV", "development"))?;
    let log_level = or_default("STACKWISE_LOG_LEVEL", "info");
    let serpapi_api_key = optional("SERPAPI_KEY");
    let couponapi_api_key = optional("COUPONSAPI_KEY");
    let catalog_path = PathBuf::from(or_default(
        "STACKWISE_CATALOG_PATH",
        "./config/savings.yaml",
    ));
    let profile_path = PathBuf::from(or_default(
        "STACKWISE_PROFILE_PATH",
        "./config/profile.yaml",
    ));

    let http_timeout_secs = parse_u64("STACKWISE_HTTP_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("STACKWISE_USER_AGENT", "stackwise/0.1 (savings-engine)");
    let source_timeout_ms = parse_u64("STACKWISE_SOURCE_TIMEOUT_MS", "5000")?;
    let max_concurrent_offers = parse_usize("STACKWISE_MAX_CONCURRENT_OFFERS", "8")?;
    if max_concurrent_offers == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "STACKWISE_MAX_CONCURRENT_OFFERS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    let max_retries = parse_u32("STACKWISE_MAX_RETRIES", "2")?;
    let retry_backoff_base_secs = parse_u64("STACKWISE_RETRY_BACKOFF_BASE_SECS", "1")?;
    let search_country = or_default("STACKWISE_SEARCH_COUNTRY", "us");
    let search_language = or_default("STACKWISE_SEARCH_LANGUAGE", "en");
    let coupon_lookback_days = parse_u32("STACKWISE_COUPON_LOOKBACK_DAYS", "365")?;

    Ok(AppConfig {
        env,
        log_level,
        serpapi_api_key,
        couponapi_api_key,
        catalog_path,
        profile_path,
        http_timeout_secs,
        user_agent,
        source_timeout_ms,
        max_concurrent_offers,
        max_retries,
        retry_backoff_base_secs,
        search_country,
        search_language,
        coupon_lookback_days,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for unrecognized values.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "STACKWISE_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
