//! Browser driver seam and the scoped scrape that always releases it.

use std::time::Duration;

use async_trait::async_trait;
use kpi_core::DateWindow;

use crate::error::{DriverError, ScraperError};
use crate::extract::RawGrid;
use crate::locator::{Locator, LocatorMap};
use crate::session::{DashboardSession, SessionSettings};

/// The handful of browser operations the report needs.
///
/// [`crate::WebDriverSession`] implements this over a real WebDriver endpoint.
#[async_trait]
pub trait Driver: Send {
    type Element: Send + Sync;

    async fn goto(&mut self, url: &str) -> Result<(), DriverError>;

    /// Polls until `locator` is present or `timeout` elapses.
    async fn wait_for(
        &mut self,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<Self::Element, DriverError>;

    async fn clear(&mut self, element: &Self::Element) -> Result<(), DriverError>;

    async fn type_into(&mut self, element: &Self::Element, text: &str) -> Result<(), DriverError>;

    async fn click(&mut self, element: &Self::Element) -> Result<(), DriverError>;

    async fn text(&mut self, element: &Self::Element) -> Result<String, DriverError>;

    /// Ends the browser session. Called exactly once per run.
    async fn close(&mut self) -> Result<(), DriverError>;
}

/// Logs in, loads the KPI results for `window`, and reads the raw grid.
///
/// Takes ownership of `driver` and closes it before returning, whether the
/// scrape succeeded or failed. A failure to close is logged and does not
/// replace the scrape's own result.
///
/// # Errors
///
/// Returns the first [`ScraperError`] raised by the login sequence or the
/// extractor.
pub async fn scrape_kpis<D: Driver>(
    mut driver: D,
    settings: &SessionSettings,
    locators: &LocatorMap,
    window: &DateWindow,
) -> Result<RawGrid, ScraperError> {
    let outcome = run_scrape(&mut driver, settings, locators, window).await;
    close_best_effort(&mut driver).await;
    outcome
}

async fn run_scrape<D: Driver>(
    driver: &mut D,
    settings: &SessionSettings,
    locators: &LocatorMap,
    window: &DateWindow,
) -> Result<RawGrid, ScraperError> {
    let mut session = DashboardSession::new(driver, locators, settings);
    if let Err(e) = session.login_and_load(window).await {
        tracing::error!(stage = %session.stage(), error = %e, "dashboard sequence stopped");
        return Err(e);
    }
    session.extract().await
}

async fn close_best_effort<D: Driver>(driver: &mut D) {
    match driver.close().await {
        Ok(()) => tracing::debug!("browser session closed"),
        Err(e) => tracing::warn!(error = %e, "failed to close browser session"),
    }
}
