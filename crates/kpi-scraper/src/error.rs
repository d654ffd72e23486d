use std::path::PathBuf;

use kpi_core::{GridShapeError, KpiColumn};
use thiserror::Error;

use crate::session::AuthStage;

/// Failures reported by a [`crate::Driver`] implementation.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("failed to start WebDriver session at {url}: {reason}")]
    Connect { url: String, reason: String },

    #[error("timed out after {timeout_secs}s waiting for {locator}")]
    Timeout { locator: String, timeout_secs: u64 },

    #[error("no element matches {locator}")]
    NoSuchElement { locator: String },

    #[error("WebDriver command failed: {0}")]
    Command(String),
}

/// Problems with a locator map file.
#[derive(Debug, Error)]
pub enum LocatorError {
    #[error("failed to read locator file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse locator file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("locator map has no category for column {0}")]
    MissingCategory(KpiColumn),

    #[error("cell id template \"{0}\" must contain {{row}} and {{category}}")]
    BadTemplate(String),
}

/// A scraped cell that could not be turned into a display value.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("cell is empty")]
    EmptyCell,

    #[error("\"{0}\" is not a number")]
    NotNumeric(String),

    #[error("\"{0}\" has no weekday and is not a number")]
    NoWeekday(String),
}

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("{context}: {source}")]
    Driver {
        context: String,
        #[source]
        source: DriverError,
    },

    #[error("element not found at stage {stage}: {element} ({locator}) did not appear within {timeout_secs}s")]
    ElementNotFound {
        stage: AuthStage,
        element: &'static str,
        locator: String,
        timeout_secs: u64,
    },

    #[error("data extraction failed: cell {id} (row {row}, column {column}) is missing")]
    CellMissing {
        row: usize,
        column: KpiColumn,
        id: String,
    },

    #[error("session step out of order: expected stage {expected}, session is at {actual}")]
    OutOfOrder {
        expected: AuthStage,
        actual: AuthStage,
    },

    #[error("failed to parse cell at row {row}, column {column}: {source}")]
    Normalize {
        row: usize,
        column: KpiColumn,
        #[source]
        source: NormalizeError,
    },

    #[error("scraped grid has the wrong shape: {0}")]
    Shape(#[from] GridShapeError),

    #[error(transparent)]
    Locator(#[from] LocatorError),
}
