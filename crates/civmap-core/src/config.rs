use std::path::PathBuf;
use std::str::FromStr;

use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if any value is invalid.
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
/// Returns `ConfigError` if any value is invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

fn parse_var<F, T>(lookup: &F, var: &str, default: &str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = lookup(var).unwrap_or_else(|_| default.to_string());
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can use a `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };
    let optional = |var: &str| -> Option<String> {
        lookup(var).ok().filter(|v| !v.trim().is_empty())
    };

    let env = parse_environment(&or_default("CIVMAP_ENV", "development"))?;
    let log_level = or_default("CIVMAP_LOG_LEVEL", "info");
    let facilities_path = PathBuf::from(or_default(
        "CIVMAP_FACILITIES_PATH",
        "./config/facilities.yaml",
    ));
    let api_base_url = optional("CIVMAP_API_BASE_URL");
    let api_token = optional("CIVMAP_API_TOKEN");
    let http_timeout_secs = parse_var(&lookup, "CIVMAP_HTTP_TIMEOUT_SECS", "30")?;

    let min_zoom: u8 = parse_var(&lookup, "CIVMAP_MIN_ZOOM", "3")?;
    let max_zoom: u8 = parse_var(&lookup, "CIVMAP_MAX_ZOOM", "19")?;
    let marker_min_zoom: u8 = parse_var(&lookup, "CIVMAP_MARKER_MIN_ZOOM", "10")?;
    let label_min_zoom: u8 = parse_var(&lookup, "CIVMAP_LABEL_MIN_ZOOM", "15")?;
    let initial_zoom: u8 = parse_var(&lookup, "CIVMAP_INITIAL_ZOOM", "13")?;
    let focus_zoom: u8 = parse_var(&lookup, "CIVMAP_FOCUS_ZOOM", "16")?;
    let search_debounce_ms = parse_var(&lookup, "CIVMAP_SEARCH_DEBOUNCE_MS", "300")?;

    let viewport_height: f32 = parse_var(&lookup, "CIVMAP_VIEWPORT_HEIGHT", "800")?;
    let sheet_min_height: f32 = parse_var(&lookup, "CIVMAP_SHEET_MIN_HEIGHT", "180")?;
    let sheet_max_fraction: f32 = parse_var(&lookup, "CIVMAP_SHEET_MAX_FRACTION", "0.85")?;
    let sheet_animation_ms = parse_var(&lookup, "CIVMAP_SHEET_ANIMATION_MS", "300")?;
    let drag_dead_zone_px = parse_var(&lookup, "CIVMAP_DRAG_DEAD_ZONE_PX", "10")?;
    let drag_commit_px = parse_var(&lookup, "CIVMAP_DRAG_COMMIT_PX", "20")?;

    let config = AppConfig {
        env,
        log_level,
        facilities_path,
        api_base_url,
        api_token,
        http_timeout_secs,
        min_zoom,
        max_zoom,
        marker_min_zoom,
        label_min_zoom,
        initial_zoom,
        focus_zoom,
        search_debounce_ms,
        viewport_height,
        sheet_min_height,
        sheet_max_fraction,
        sheet_animation_ms,
        drag_dead_zone_px,
        drag_commit_px,
    };
    validate_app_config(&config)?;
    Ok(config)
}

fn validate_app_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.min_zoom > config.max_zoom {
        return Err(ConfigError::Validation(format!(
            "CIVMAP_MIN_ZOOM ({}) exceeds CIVMAP_MAX_ZOOM ({})",
            config.min_zoom, config.max_zoom
        )));
    }

    for (var, zoom) in [
        ("CIVMAP_INITIAL_ZOOM", config.initial_zoom),
        ("CIVMAP_FOCUS_ZOOM", config.focus_zoom),
    ] {
        if !(config.min_zoom..=config.max_zoom).contains(&zoom) {
            return Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: format!(
                    "{zoom} is outside [{}, {}]",
                    config.min_zoom, config.max_zoom
                ),
            });
        }
    }

    if config.marker_min_zoom > config.label_min_zoom {
        return Err(ConfigError::Validation(format!(
            "CIVMAP_MARKER_MIN_ZOOM ({}) must not exceed CIVMAP_LABEL_MIN_ZOOM ({})",
            config.marker_min_zoom, config.label_min_zoom
        )));
    }

    if !(0.80..=0.90).contains(&config.sheet_max_fraction) {
        return Err(ConfigError::InvalidEnvVar {
            var: "CIVMAP_SHEET_MAX_FRACTION".to_string(),
            reason: format!("{} is outside [0.80, 0.90]", config.sheet_max_fraction),
        });
    }

    if config.viewport_height <= 0.0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "CIVMAP_VIEWPORT_HEIGHT".to_string(),
            reason: "must be positive".to_string(),
        });
    }

    if config.sheet_min_height < 0.0 || config.sheet_min_height >= config.sheet_max_height() {
        return Err(ConfigError::Validation(format!(
            "CIVMAP_SHEET_MIN_HEIGHT ({}) must be below the expanded height ({})",
            config.sheet_min_height,
            config.sheet_max_height()
        )));
    }

    if config.drag_dead_zone_px < 0.0 || config.drag_commit_px < config.drag_dead_zone_px {
        return Err(ConfigError::Validation(format!(
            "CIVMAP_DRAG_COMMIT_PX ({}) must be at least CIVMAP_DRAG_DEAD_ZONE_PX ({})",
            config.drag_commit_px, config.drag_dead_zone_px
        )));
    }

    Ok(())
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
            var: "CIVMAP_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
