//! In-memory [`Driver`] for tests.
//!
//! Elements are keyed by locator value. [`FakeDriver::with_dashboard`] lays
//! out every element of the default [`LocatorMap`] plus a full 7×11 result
//! table for the window ending 2026-10-15.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use kpi_core::{KpiColumn, DAYS_IN_WINDOW};

use crate::driver::Driver;
use crate::error::DriverError;
use crate::locator::{Locator, LocatorMap};
use crate::session::SessionSettings;

/// Korean weekday labels for 2026-10-09 (Fri) through 2026-10-15 (Thu).
const DATE_LABELS: [&str; DAYS_IN_WINDOW] = [
    "2026-10-09(금)",
    "2026-10-10(토)",
    "2026-10-11(일)",
    "2026-10-12(월)",
    "2026-10-13(화)",
    "2026-10-14(수)",
    "2026-10-15(목)",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Goto(String),
    Clear(String),
    Type(String, String),
    Click(String),
    Close,
}

#[derive(Debug, Default)]
struct LogInner {
    actions: Vec<Action>,
    fields: HashMap<String, String>,
    close_attempted: bool,
    closed: bool,
}

/// Shared view of what a [`FakeDriver`] was asked to do. Survives the driver
/// being moved into the code under test.
#[derive(Debug, Clone, Default)]
pub struct DriverLog(Arc<Mutex<LogInner>>);

impl DriverLog {
    fn with<T>(&self, f: impl FnOnce(&mut LogInner) -> T) -> T {
        let mut inner = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut inner)
    }

    #[must_use]
    pub fn actions(&self) -> Vec<Action> {
        self.with(|i| i.actions.clone())
    }

    /// Current text of an input after the clears and keystrokes it received.
    #[must_use]
    pub fn field_value(&self, id: &str) -> Option<String> {
        self.with(|i| i.fields.get(id).cloned())
    }

    #[must_use]
    pub fn closed(&self) -> bool {
        self.with(|i| i.closed)
    }

    #[must_use]
    pub fn close_attempted(&self) -> bool {
        self.with(|i| i.close_attempted)
    }
}

#[derive(Debug, Default)]
pub struct FakeDriver {
    elements: HashMap<String, String>,
    missing: HashSet<String>,
    fail_close: bool,
    log: DriverLog,
}

impl FakeDriver {
    /// A dashboard where every default locator and result cell is present.
    #[must_use]
    pub fn with_dashboard() -> Self {
        let locators = LocatorMap::default();
        let mut elements = HashMap::new();
        for locator in [
            &locators.username,
            &locators.password,
            &locators.login_button,
            &locators.kpi_menu,
            &locators.start_date,
            &locators.end_date,
            &locators.search_button,
        ] {
            elements.insert(locator.value.clone(), String::new());
        }
        for (row, label) in DATE_LABELS.iter().enumerate() {
            for column in KpiColumn::ALL {
                let Ok(id) = locators.cells.cell_id(row, column) else {
                    continue;
                };
                let category = locators.cells.categories.get(&column).copied().unwrap_or(0);
                // Row 0 NRU (category 1) reads "101.5", row 6 ARPPU (27) "727.5".
                let text = if column == KpiColumn::Date {
                    (*label).to_string()
                } else {
                    format!("{}{category:02}.5", row + 1)
                };
                elements.insert(id, text);
            }
        }
        let log = DriverLog::default();
        log.with(|i| {
            for (id, text) in &elements {
                i.fields.insert(id.clone(), text.clone());
            }
        });
        Self {
            elements,
            log,
            ..Self::default()
        }
    }

    /// Overrides the text of an element (or adds it).
    #[must_use]
    pub fn with_text(mut self, id: &str, text: &str) -> Self {
        self.elements.insert(id.to_string(), text.to_string());
        self.log
            .with(|i| i.fields.insert(id.to_string(), text.to_string()));
        self
    }

    /// Makes waits on `id` time out.
    #[must_use]
    pub fn without_element(mut self, id: &str) -> Self {
        self.missing.insert(id.to_string());
        self
    }

    #[must_use]
    pub fn failing_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    #[must_use]
    pub fn log(&self) -> DriverLog {
        self.log.clone()
    }
}

#[async_trait]
impl Driver for FakeDriver {
    type Element = String;

    async fn goto(&mut self, url: &str) -> Result<(), DriverError> {
        self.log.with(|i| i.actions.push(Action::Goto(url.to_string())));
        Ok(())
    }

    async fn wait_for(
        &mut self,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<Self::Element, DriverError> {
        if self.missing.contains(&locator.value) || !self.elements.contains_key(&locator.value) {
            return Err(DriverError::Timeout {
                locator: locator.to_string(),
                timeout_secs: timeout.as_secs(),
            });
        }
        Ok(locator.value.clone())
    }

    async fn clear(&mut self, element: &Self::Element) -> Result<(), DriverError> {
        self.log.with(|i| {
            i.actions.push(Action::Clear(element.clone()));
            i.fields.insert(element.clone(), String::new());
        });
        Ok(())
    }

    async fn type_into(&mut self, element: &Self::Element, text: &str) -> Result<(), DriverError> {
        self.log.with(|i| {
            i.actions
                .push(Action::Type(element.clone(), text.to_string()));
            i.fields.entry(element.clone()).or_default().push_str(text);
        });
        Ok(())
    }

    async fn click(&mut self, element: &Self::Element) -> Result<(), DriverError> {
        self.log.with(|i| i.actions.push(Action::Click(element.clone())));
        Ok(())
    }

    async fn text(&mut self, element: &Self::Element) -> Result<String, DriverError> {
        self.elements
            .get(element)
            .cloned()
            .ok_or_else(|| DriverError::NoSuchElement {
                locator: element.clone(),
            })
    }

    async fn close(&mut self) -> Result<(), DriverError> {
        let fail = self.fail_close;
        self.log.with(|i| {
            i.close_attempted = true;
            if !fail {
                i.closed = true;
                i.actions.push(Action::Close);
            }
        });
        if fail {
            Err(DriverError::Command("session already gone".to_string()))
        } else {
            Ok(())
        }
    }
}

/// Settings matching the fake dashboard, with no settle delay.
#[must_use]
pub fn test_settings() -> SessionSettings {
    SessionSettings {
        site_url: "https://dashboard.test/login".to_string(),
        username: "operator".to_string(),
        password: "hunter2".to_string(),
        element_timeout: Duration::from_secs(20),
        settle_delay: Duration::ZERO,
    }
}
