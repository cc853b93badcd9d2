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
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let optional = |var: &str| -> Option<String> {
        lookup(var).ok().filter(|v| !v.trim().is_empty())
    };

    let or_default = |var: &str, default: &str| -> String {
        optional(var).unwrap_or_else(|| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("NICHESCAN_ENV", "development"))?;
    let bind_addr = parse_addr("NICHESCAN_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("NICHESCAN_LOG_LEVEL", "info");
    let taxonomy_path = optional("NICHESCAN_TAXONOMY_PATH").map(PathBuf::from);

    let serp_api_key = optional("VALUESERP_API_KEY");
    let serp_base_url = or_default("NICHESCAN_SERP_BASE_URL", "https://api.valueserp.com");
    let serp_timeout_secs = parse_u64("NICHESCAN_SERP_TIMEOUT_SECS", "30")?;
    let serp_max_retries = parse_u32("NICHESCAN_SERP_MAX_RETRIES", "2")?;
    let serp_backoff_base_secs = parse_u64("NICHESCAN_SERP_BACKOFF_BASE_SECS", "1")?;
    let serp_max_page = parse_u32("NICHESCAN_SERP_MAX_PAGE", "2")?;
    if serp_max_page == 0 {
        return Err(invalid(
            "NICHESCAN_SERP_MAX_PAGE",
            "must be at least 1".to_string(),
        ));
    }

    let llm_api_key = optional("NICHESCAN_LLM_API_KEY");
    let llm_base_url = or_default("NICHESCAN_LLM_BASE_URL", "https://api.groq.com/openai/v1");
    let llm_model = or_default("NICHESCAN_LLM_MODEL", "llama-3.3-70b-versatile");
    let llm_timeout_secs = parse_u64("NICHESCAN_LLM_TIMEOUT_SECS", "45")?;

    let database_url = optional("DATABASE_URL");
    let db_max_connections = parse_u32("NICHESCAN_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("NICHESCAN_DB_MIN_CONNECTIONS", "1")?;
    if db_min_connections > db_max_connections {
        return Err(invalid(
            "NICHESCAN_DB_MIN_CONNECTIONS",
            format!("{db_min_connections} exceeds max connections {db_max_connections}"),
        ));
    }
    let db_acquire_timeout_secs = parse_u64("NICHESCAN_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        taxonomy_path,
        serp_api_key,
        serp_base_url,
        serp_timeout_secs,
        serp_max_retries,
        serp_backoff_base_secs,
        serp_max_page,
        llm_api_key,
        llm_base_url,
        llm_model,
        llm_timeout_secs,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
    })
}

fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "NICHESCAN_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
