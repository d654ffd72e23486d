//! Login and navigation sequence for the KPI dashboard.
//!
//! The session walks a fixed chain of stages:
//!
//! | Stage | Reached by |
//! |-------|------------|
//! | `Start` | [`DashboardSession::new`] |
//! | `UsernameEntered` | [`DashboardSession::enter_username`] |
//! | `PasswordEntered` | [`DashboardSession::enter_password`] |
//! | `LoggedIn` | [`DashboardSession::submit_login`] |
//! | `KpiMenuOpen` | [`DashboardSession::open_kpi_menu`] |
//! | `DateRangeSet` | [`DashboardSession::set_date_range`] |
//! | `ResultsLoaded` | [`DashboardSession::search`] |
//!
//! Each step first locates its element; if the element never appears the
//! session stays where it was and the step fails. There are no retries and no
//! way back to an earlier stage.

use std::time::Duration;

use kpi_core::{AppConfig, DateWindow};

use crate::driver::Driver;
use crate::error::{DriverError, ScraperError};
use crate::extract::{read_grid, RawGrid};
use crate::locator::{Locator, LocatorMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStage {
    Start,
    UsernameEntered,
    PasswordEntered,
    LoggedIn,
    KpiMenuOpen,
    DateRangeSet,
    ResultsLoaded,
}

impl std::fmt::Display for AuthStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AuthStage::Start => "start",
            AuthStage::UsernameEntered => "username-entered",
            AuthStage::PasswordEntered => "password-entered",
            AuthStage::LoggedIn => "logged-in",
            AuthStage::KpiMenuOpen => "kpi-menu-open",
            AuthStage::DateRangeSet => "date-range-set",
            AuthStage::ResultsLoaded => "results-loaded",
        };
        f.write_str(name)
    }
}

/// Credentials and timing for one dashboard visit.
#[derive(Clone)]
pub struct SessionSettings {
    pub site_url: String,
    pub username: String,
    pub password: String,
    /// Ceiling for every element wait.
    pub element_timeout: Duration,
    /// Pause after opening the KPI menu while the form renders.
    pub settle_delay: Duration,
}

impl SessionSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            site_url: config.site_url.clone(),
            username: config.login_username.clone(),
            password: config.login_password.clone(),
            element_timeout: Duration::from_secs(config.element_timeout_secs),
            settle_delay: Duration::from_millis(config.settle_delay_ms),
        }
    }
}

impl std::fmt::Debug for SessionSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSettings")
            .field("site_url", &"[redacted]")
            .field("username", &"[redacted]")
            .field("password", &"[redacted]")
            .field("element_timeout", &self.element_timeout)
            .field("settle_delay", &self.settle_delay)
            .finish()
    }
}

pub struct DashboardSession<'a, D: Driver> {
    driver: &'a mut D,
    locators: &'a LocatorMap,
    settings: &'a SessionSettings,
    stage: AuthStage,
}

impl<'a, D: Driver> DashboardSession<'a, D> {
    pub fn new(driver: &'a mut D, locators: &'a LocatorMap, settings: &'a SessionSettings) -> Self {
        Self {
            driver,
            locators,
            settings,
            stage: AuthStage::Start,
        }
    }

    #[must_use]
    pub fn stage(&self) -> AuthStage {
        self.stage
    }

    /// Runs the whole sequence from [`AuthStage::Start`] to
    /// [`AuthStage::ResultsLoaded`].
    ///
    /// # Errors
    ///
    /// Returns the first step's error; later steps are not attempted.
    pub async fn login_and_load(&mut self, window: &DateWindow) -> Result<(), ScraperError> {
        self.open().await?;
        self.enter_username().await?;
        self.enter_password().await?;
        self.submit_login().await?;
        self.open_kpi_menu().await?;
        self.set_date_range(window).await?;
        self.search().await
    }

    /// Navigates to the dashboard's login page.
    ///
    /// # Errors
    ///
    /// [`ScraperError::OutOfOrder`] unless at `Start`; [`ScraperError::Driver`]
    /// if navigation fails.
    pub async fn open(&mut self) -> Result<(), ScraperError> {
        self.require(AuthStage::Start)?;
        tracing::info!("opening dashboard");
        self.driver
            .goto(&self.settings.site_url)
            .await
            .map_err(command_failed("opening dashboard"))
    }

    /// # Errors
    ///
    /// [`ScraperError::OutOfOrder`] unless at `Start`; [`ScraperError::ElementNotFound`]
    /// if the username field never appears.
    pub async fn enter_username(&mut self) -> Result<(), ScraperError> {
        self.require(AuthStage::Start)?;
        let locators = self.locators;
        let field = self.locate("username field", &locators.username).await?;
        self.driver
            .type_into(&field, &self.settings.username)
            .await
            .map_err(command_failed("typing username"))?;
        self.advance(AuthStage::UsernameEntered);
        Ok(())
    }

    /// # Errors
    ///
    /// [`ScraperError::OutOfOrder`] unless at `UsernameEntered`;
    /// [`ScraperError::ElementNotFound`] if the password field never appears.
    pub async fn enter_password(&mut self) -> Result<(), ScraperError> {
        self.require(AuthStage::UsernameEntered)?;
        let locators = self.locators;
        let field = self.locate("password field", &locators.password).await?;
        self.driver
            .type_into(&field, &self.settings.password)
            .await
            .map_err(command_failed("typing password"))?;
        self.advance(AuthStage::PasswordEntered);
        Ok(())
    }

    /// # Errors
    ///
    /// [`ScraperError::OutOfOrder`] unless at `PasswordEntered`;
    /// [`ScraperError::ElementNotFound`] if the login button never appears.
    pub async fn submit_login(&mut self) -> Result<(), ScraperError> {
        self.require(AuthStage::PasswordEntered)?;
        let locators = self.locators;
        let button = self.locate("login button", &locators.login_button).await?;
        self.driver
            .click(&button)
            .await
            .map_err(command_failed("clicking login button"))?;
        self.advance(AuthStage::LoggedIn);
        Ok(())
    }

    /// Opens the KPI screen and waits for its form to settle.
    ///
    /// # Errors
    ///
    /// [`ScraperError::OutOfOrder`] unless at `LoggedIn`;
    /// [`ScraperError::ElementNotFound`] if the menu entry never appears.
    pub async fn open_kpi_menu(&mut self) -> Result<(), ScraperError> {
        self.require(AuthStage::LoggedIn)?;
        let locators = self.locators;
        let menu = self.locate("KPI menu", &locators.kpi_menu).await?;
        self.driver
            .click(&menu)
            .await
            .map_err(command_failed("clicking KPI menu"))?;
        if !self.settings.settle_delay.is_zero() {
            tokio::time::sleep(self.settings.settle_delay).await;
        }
        self.advance(AuthStage::KpiMenuOpen);
        Ok(())
    }

    /// Replaces both date fields: ISO start date, weekday-labelled end date.
    ///
    /// # Errors
    ///
    /// [`ScraperError::OutOfOrder`] unless at `KpiMenuOpen`;
    /// [`ScraperError::ElementNotFound`] if either field never appears.
    pub async fn set_date_range(&mut self, window: &DateWindow) -> Result<(), ScraperError> {
        self.require(AuthStage::KpiMenuOpen)?;
        let locators = self.locators;

        let start = self.locate("start date field", &locators.start_date).await?;
        self.replace_text(&start, &window.start_iso(), "start date").await?;

        let end = self.locate("end date field", &locators.end_date).await?;
        self.replace_text(&end, &window.end_label(), "end date").await?;

        tracing::info!(
            start = %window.start_iso(),
            end = %window.end_label(),
            "date range set"
        );
        self.advance(AuthStage::DateRangeSet);
        Ok(())
    }

    /// # Errors
    ///
    /// [`ScraperError::OutOfOrder`] unless at `DateRangeSet`;
    /// [`ScraperError::ElementNotFound`] if the search button never appears.
    pub async fn search(&mut self) -> Result<(), ScraperError> {
        self.require(AuthStage::DateRangeSet)?;
        let locators = self.locators;
        let button = self.locate("search button", &locators.search_button).await?;
        self.driver
            .click(&button)
            .await
            .map_err(command_failed("clicking search button"))?;
        self.advance(AuthStage::ResultsLoaded);
        Ok(())
    }

    /// Reads the 7×11 result cells.
    ///
    /// # Errors
    ///
    /// [`ScraperError::OutOfOrder`] unless at `ResultsLoaded`;
    /// [`ScraperError::CellMissing`] if any cell is absent.
    pub async fn extract(&mut self) -> Result<RawGrid, ScraperError> {
        self.require(AuthStage::ResultsLoaded)?;
        read_grid(
            &mut *self.driver,
            &self.locators.cells,
            self.settings.element_timeout,
        )
        .await
    }

    async fn replace_text(
        &mut self,
        element: &D::Element,
        text: &str,
        what: &'static str,
    ) -> Result<(), ScraperError> {
        self.driver
            .clear(element)
            .await
            .map_err(|e| ScraperError::Driver {
                context: format!("clearing {what}"),
                source: e,
            })?;
        self.driver
            .type_into(element, text)
            .await
            .map_err(|e| ScraperError::Driver {
                context: format!("typing {what}"),
                source: e,
            })
    }

    async fn locate(
        &mut self,
        element: &'static str,
        locator: &Locator,
    ) -> Result<D::Element, ScraperError> {
        let stage = self.stage;
        let timeout = self.settings.element_timeout;
        self.driver
            .wait_for(locator, timeout)
            .await
            .map_err(|e| match e {
                DriverError::Timeout { .. } | DriverError::NoSuchElement { .. } => {
                    tracing::error!(%stage, element, %locator, "element not found");
                    ScraperError::ElementNotFound {
                        stage,
                        element,
                        locator: locator.to_string(),
                        timeout_secs: timeout.as_secs(),
                    }
                }
                other => ScraperError::Driver {
                    context: format!("locating {element}"),
                    source: other,
                },
            })
    }

    fn require(&self, expected: AuthStage) -> Result<(), ScraperError> {
        if self.stage == expected {
            Ok(())
        } else {
            Err(ScraperError::OutOfOrder {
                expected,
                actual: self.stage,
            })
        }
    }

    fn advance(&mut self, next: AuthStage) {
        tracing::debug!(from = %self.stage, to = %next, "session stage advanced");
        self.stage = next;
    }
}

fn command_failed(context: &'static str) -> impl FnOnce(DriverError) -> ScraperError {
    move |source| ScraperError::Driver {
        context: context.to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::fake::{test_settings, Action, FakeDriver};

    fn window() -> DateWindow {
        DateWindow::ending_yesterday(NaiveDate::from_ymd_opt(2026, 10, 16).unwrap())
    }

    #[tokio::test]
    async fn full_sequence_reaches_results_loaded() {
        let mut driver = FakeDriver::with_dashboard();
        let log = driver.log();
        let locators = LocatorMap::default();
        let settings = test_settings();
        let mut session = DashboardSession::new(&mut driver, &locators, &settings);

        session.login_and_load(&window()).await.unwrap();

        assert_eq!(session.stage(), AuthStage::ResultsLoaded);
        assert_eq!(
            log.actions(),
            vec![
                Action::Goto("https://dashboard.test/login".into()),
                Action::Type("A".into(), "operator".into()),
                Action::Type("B".into(), "hunter2".into()),
                Action::Click("/html/body/div[2]/button".into()),
                Action::Click(r#"//*[@id="L"]/div[28]/button"#.into()),
                Action::Clear("a101".into()),
                Action::Type("a101".into(), "2026-10-09".into()),
                Action::Clear("a102".into()),
                Action::Type("a102".into(), "2026-10-15(Thu)".into()),
                Action::Click(r#"//*[@id="R1"]/table/tbody/tr[3]/td/button"#.into()),
            ]
        );
    }

    #[tokio::test]
    async fn date_fields_are_cleared_before_typing() {
        let mut driver = FakeDriver::with_dashboard()
            .with_text("a101", "2020-01-01")
            .with_text("a102", "2020-01-07(Tue)");
        let log = driver.log();
        let locators = LocatorMap::default();
        let settings = test_settings();
        let mut session = DashboardSession::new(&mut driver, &locators, &settings);
        session.login_and_load(&window()).await.unwrap();

        assert_eq!(log.field_value("a101").as_deref(), Some("2026-10-09"));
        assert_eq!(log.field_value("a102").as_deref(), Some("2026-10-15(Thu)"));
    }

    #[tokio::test]
    async fn missing_kpi_menu_stops_at_logged_in() {
        let mut driver = FakeDriver::with_dashboard().without_element(r#"//*[@id="L"]/div[28]/button"#);
        let log = driver.log();
        let locators = LocatorMap::default();
        let settings = test_settings();
        let mut session = DashboardSession::new(&mut driver, &locators, &settings);

        let err = session.login_and_load(&window()).await.unwrap_err();

        assert!(
            matches!(
                err,
                ScraperError::ElementNotFound {
                    stage: AuthStage::LoggedIn,
                    element: "KPI menu",
                    timeout_secs: 20,
                    ..
                }
            ),
            "got {err:?}"
        );
        assert_eq!(session.stage(), AuthStage::LoggedIn);
        assert!(!log
            .actions()
            .iter()
            .any(|a| matches!(a, Action::Clear(_))));
    }

    #[tokio::test]
    async fn steps_cannot_be_skipped() {
        let mut driver = FakeDriver::with_dashboard();
        let locators = LocatorMap::default();
        let settings = test_settings();
        let mut session = DashboardSession::new(&mut driver, &locators, &settings);

        let err = session.set_date_range(&window()).await.unwrap_err();
        assert!(matches!(
            err,
            ScraperError::OutOfOrder {
                expected: AuthStage::KpiMenuOpen,
                actual: AuthStage::Start
            }
        ));

        let err = session.extract().await.unwrap_err();
        assert!(matches!(err, ScraperError::OutOfOrder { .. }));
    }

    #[tokio::test]
    async fn steps_cannot_be_repeated() {
        let mut driver = FakeDriver::with_dashboard();
        let locators = LocatorMap::default();
        let settings = test_settings();
        let mut session = DashboardSession::new(&mut driver, &locators, &settings);

        session.enter_username().await.unwrap();
        let err = session.enter_username().await.unwrap_err();
        assert!(matches!(
            err,
            ScraperError::OutOfOrder {
                expected: AuthStage::Start,
                actual: AuthStage::UsernameEntered
            }
        ));
    }

    #[test]
    fn settings_debug_redacts_credentials() {
        let debug = format!("{:?}", test_settings());
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("operator"));
    }
}
