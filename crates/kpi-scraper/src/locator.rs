//! Declarative mapping from dashboard fields to page locators.
//!
//! The dashboard's markup is outside our control, so every element the login
//! sequence and the extractor touch is named here. A markup change on the
//! dashboard side is absorbed by editing a YAML file (`HC_LOCATORS_PATH`)
//! instead of code. Without a file the built-in [`LocatorMap::default`] is used.

use std::collections::BTreeMap;
use std::path::Path;

use kpi_core::KpiColumn;
use serde::{Deserialize, Serialize};

use crate::error::LocatorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocatorKind {
    Id,
    Xpath,
    Css,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locator {
    pub by: LocatorKind,
    pub value: String,
}

impl Locator {
    pub fn id(value: impl Into<String>) -> Self {
        Self {
            by: LocatorKind::Id,
            value: value.into(),
        }
    }

    pub fn xpath(value: impl Into<String>) -> Self {
        Self {
            by: LocatorKind::Xpath,
            value: value.into(),
        }
    }

    #[must_use]
    pub fn as_fantoccini(&self) -> fantoccini::Locator<'_> {
        match self.by {
            LocatorKind::Id => fantoccini::Locator::Id(&self.value),
            LocatorKind::Xpath => fantoccini::Locator::XPath(&self.value),
            LocatorKind::Css => fantoccini::Locator::Css(&self.value),
        }
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let by = match self.by {
            LocatorKind::Id => "id",
            LocatorKind::Xpath => "xpath",
            LocatorKind::Css => "css",
        };
        write!(f, "{by}={}", self.value)
    }
}

/// Result-table cells are addressed by id, built from a row offset and a
/// per-column category number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellLocators {
    /// Id pattern with `{row}` and `{category}` placeholders.
    pub id_template: String,
    pub categories: BTreeMap<KpiColumn, u32>,
}

impl CellLocators {
    /// Element id of the cell at `row` (0 = oldest day) for `column`.
    ///
    /// # Errors
    ///
    /// Returns [`LocatorError::MissingCategory`] if `column` has no category.
    pub fn cell_id(&self, row: usize, column: KpiColumn) -> Result<String, LocatorError> {
        let category = self
            .categories
            .get(&column)
            .ok_or(LocatorError::MissingCategory(column))?;
        Ok(self
            .id_template
            .replace("{row}", &row.to_string())
            .replace("{category}", &category.to_string()))
    }

    fn validate(&self) -> Result<(), LocatorError> {
        if !self.id_template.contains("{row}") || !self.id_template.contains("{category}") {
            return Err(LocatorError::BadTemplate(self.id_template.clone()));
        }
        if let Some(missing) = KpiColumn::ALL
            .into_iter()
            .find(|c| !self.categories.contains_key(c))
        {
            return Err(LocatorError::MissingCategory(missing));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocatorMap {
    pub username: Locator,
    pub password: Locator,
    pub login_button: Locator,
    pub kpi_menu: Locator,
    pub start_date: Locator,
    pub end_date: Locator,
    pub search_button: Locator,
    pub cells: CellLocators,
}

impl Default for LocatorMap {
    fn default() -> Self {
        let categories = [
            (KpiColumn::Date, 0),
            (KpiColumn::NewRegisteredUsers, 1),
            (KpiColumn::DailyActiveUsers, 4),
            (KpiColumn::NruDauDifference, 5),
            (KpiColumn::PayingUsers, 19),
            (KpiColumn::PayingUsersIos, 20),
            (KpiColumn::PayingUsersAndroid, 21),
            (KpiColumn::Arppu, 27),
            (KpiColumn::SalesIos, 24),
            (KpiColumn::SalesAndroid, 25),
            (KpiColumn::SalesTotal, 23),
        ];
        Self {
            username: Locator::id("A"),
            password: Locator::id("B"),
            login_button: Locator::xpath("/html/body/div[2]/button"),
            kpi_menu: Locator::xpath(r#"//*[@id="L"]/div[28]/button"#),
            start_date: Locator::id("a101"),
            end_date: Locator::id("a102"),
            search_button: Locator::xpath(r#"//*[@id="R1"]/table/tbody/tr[3]/td/button"#),
            cells: CellLocators {
                id_template: "A0_{row}_{category}".to_string(),
                categories: categories.into_iter().collect(),
            },
        }
    }
}

impl LocatorMap {
    /// Parses and validates a YAML locator map.
    ///
    /// # Errors
    ///
    /// Returns [`LocatorError::Parse`] on malformed YAML, or a validation error
    /// if a column has no category or the id template lacks a placeholder.
    pub fn from_yaml(source: &str, path: &Path) -> Result<Self, LocatorError> {
        let map: LocatorMap = serde_yaml::from_str(source).map_err(|e| LocatorError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        map.cells.validate()?;
        Ok(map)
    }

    /// Loads the map from `path`, or returns the built-in default when `None`.
    ///
    /// # Errors
    ///
    /// Returns [`LocatorError::Read`] if the file cannot be read, otherwise
    /// anything [`LocatorMap::from_yaml`] returns.
    pub fn load(path: Option<&Path>) -> Result<Self, LocatorError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let source = std::fs::read_to_string(path).map_err(|e| LocatorError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        let map = Self::from_yaml(&source, path)?;
        tracing::info!(path = %path.display(), "loaded locator map");
        Ok(map)
    }
}
