use crate::app_config::{AppConfig, ReportMeta};
use crate::ConfigError;

/// Build application configuration using the provided env-var lookup function.
///
/// The binary passes `std::env::var` after loading `.env`; tests pass a map.
///
/// A required variable that is unset, empty, or only whitespace is reported as
/// [`ConfigError::MissingEnvVar`]. Optional variables treat empty the same as unset.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn app_config_from_lookup<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let optional = |var: &str| -> Option<String> {
        lookup(var).ok().filter(|v| !v.trim().is_empty())
    };

    let require = |var: &str| -> Result<String, ConfigError> {
        optional(var).ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default =
        |var: &str, default: &str| -> String { optional(var).unwrap_or_else(|| default.to_string()) };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u16 = |var: &str, default: &str| -> Result<u16, ConfigError> {
        let raw = or_default(var, default);
        raw.trim()
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    // Secrets and addresses are checked first so a half-configured host fails
    // on the credential it is missing rather than on a tuning knob.
    let site_url = require("HC_URL")?;
    let login_username = require("HC_LOGIN_USERNAME")?;
    let login_password = require("HC_LOGIN_PASSWORD")?;
    let sender_address = require("HC_EMAIL_ADDRESS_1")?;
    let recipient_address = require("HC_EMAIL_ADDRESS_2")?;
    let extra_recipient_address = optional("HC_EMAIL_ADDRESS_3");
    let email_password = require("HC_EMAIL_PASSWORD")?;

    let webdriver_url = or_default("HC_WEBDRIVER_URL", "http://localhost:9515");
    let headless = parse_bool("HC_HEADLESS", &or_default("HC_HEADLESS", "true"))?;
    let element_timeout_secs = parse_u64("HC_ELEMENT_TIMEOUT_SECS", "20")?;
    let settle_delay_ms = parse_u64("HC_SETTLE_DELAY_MS", "3000")?;
    let smtp_host = or_default("HC_SMTP_HOST", "smtp.gmail.com");
    let smtp_port = parse_u16("HC_SMTP_PORT", "587")?;
    let log_level = or_default("HC_LOG_LEVEL", "info");
    let locators_path = optional("HC_LOCATORS_PATH").map(std::path::PathBuf::from);

    let defaults = ReportMeta::default();
    let report = ReportMeta {
        project_name: optional("HC_PROJECT_NAME").unwrap_or(defaults.project_name),
        server_label: optional("HC_SERVER_LABEL").unwrap_or(defaults.server_label),
        currency: optional("HC_CURRENCY").unwrap_or(defaults.currency),
    };

    Ok(AppConfig {
        site_url,
        login_username,
        login_password,
        sender_address,
        recipient_address,
        extra_recipient_address,
        email_password,
        webdriver_url,
        headless,
        element_timeout_secs,
        settle_delay_ms,
        smtp_host,
        smtp_port,
        log_level,
        locators_path,
        report,
    })
}

fn parse_bool(var: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("expected a boolean, got \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
