pub mod app_config;
pub mod config;
pub mod grid;
pub mod window;

use thiserror::Error;

pub use app_config::{AppConfig, ReportMeta};
pub use config::app_config_from_lookup;
pub use grid::{CellKind, GridShapeError, KpiColumn, KpiGrid, DAYS_IN_WINDOW};
pub use window::DateWindow;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing or empty environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
