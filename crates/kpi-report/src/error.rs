use std::path::PathBuf;

use kpi_core::ConfigError;
use kpi_scraper::{DriverError, LocatorError, ScraperError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid email address \"{address}\": {source}")]
    InvalidAddress {
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },

    #[error("failed to build email: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("failed to configure SMTP relay {host}: {reason}")]
    Relay { host: String, reason: String },

    #[error("SMTP send failed: {0}")]
    Transport(String),
}

/// Any failure that ends a report run.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("locator map error: {0}")]
    Locator(#[from] LocatorError),

    #[error("browser session error: {0}")]
    Browser(#[from] DriverError),

    #[error(transparent)]
    Scraper(#[from] ScraperError),

    #[error("failed to write report HTML to {}: {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Mail(#[from] MailError),
}
