//! KPI column schema and the normalized 7×11 grid.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rows in every report: one per day of the window.
pub const DAYS_IN_WINDOW: usize = 7;

/// How a scraped cell must be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellKind {
    /// A date with a single-character Korean weekday, e.g. `10/15(목)`.
    DateLabel,
    /// A plain decimal number.
    Numeric,
}

/// Report columns in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum KpiColumn {
    #[serde(rename = "DATE")]
    Date,
    #[serde(rename = "NRU")]
    NewRegisteredUsers,
    #[serde(rename = "DAU")]
    DailyActiveUsers,
    #[serde(rename = "NRU-DAU")]
    NruDauDifference,
    #[serde(rename = "PU")]
    PayingUsers,
    #[serde(rename = "PU(IOS)")]
    PayingUsersIos,
    #[serde(rename = "PU(AOS)")]
    PayingUsersAndroid,
    #[serde(rename = "ARPPU")]
    Arppu,
    #[serde(rename = "SALES(IOS)")]
    SalesIos,
    #[serde(rename = "SALES(AOS)")]
    SalesAndroid,
    #[serde(rename = "SALES(TOTAL)")]
    SalesTotal,
}

impl KpiColumn {
    pub const ALL: [KpiColumn; 11] = [
        KpiColumn::Date,
        KpiColumn::NewRegisteredUsers,
        KpiColumn::DailyActiveUsers,
        KpiColumn::NruDauDifference,
        KpiColumn::PayingUsers,
        KpiColumn::PayingUsersIos,
        KpiColumn::PayingUsersAndroid,
        KpiColumn::Arppu,
        KpiColumn::SalesIos,
        KpiColumn::SalesAndroid,
        KpiColumn::SalesTotal,
    ];

    pub const COUNT: usize = Self::ALL.len();

    /// Table header text.
    #[must_use]
    pub fn header(self) -> &'static str {
        match self {
            KpiColumn::Date => "DATE",
            KpiColumn::NewRegisteredUsers => "NRU",
            KpiColumn::DailyActiveUsers => "DAU",
            KpiColumn::NruDauDifference => "NRU-DAU",
            KpiColumn::PayingUsers => "PU",
            KpiColumn::PayingUsersIos => "PU(IOS)",
            KpiColumn::PayingUsersAndroid => "PU(AOS)",
            KpiColumn::Arppu => "ARPPU",
            KpiColumn::SalesIos => "SALES(IOS)",
            KpiColumn::SalesAndroid => "SALES(AOS)",
            KpiColumn::SalesTotal => "SALES(TOTAL)",
        }
    }

    #[must_use]
    pub fn kind(self) -> CellKind {
        match self {
            KpiColumn::Date => CellKind::DateLabel,
            _ => CellKind::Numeric,
        }
    }
}

impl std::fmt::Display for KpiColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.header())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridShapeError {
    #[error("expected {expected} rows, got {actual}")]
    RowCount { expected: usize, actual: usize },

    #[error("row {row}: expected {expected} cells, got {actual}")]
    ColumnCount {
        row: usize,
        expected: usize,
        actual: usize,
    },
}

/// Display-ready KPI values, exactly [`DAYS_IN_WINDOW`] rows of
/// [`KpiColumn::COUNT`] cells, oldest day first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KpiGrid {
    rows: Vec<Vec<String>>,
}

impl KpiGrid {
    /// # Errors
    ///
    /// Returns [`GridShapeError`] unless `rows` is exactly 7×11.
    pub fn new(rows: Vec<Vec<String>>) -> Result<Self, GridShapeError> {
        if rows.len() != DAYS_IN_WINDOW {
            return Err(GridShapeError::RowCount {
                expected: DAYS_IN_WINDOW,
                actual: rows.len(),
            });
        }
        if let Some((row, cells)) = rows
            .iter()
            .enumerate()
            .find(|(_, cells)| cells.len() != KpiColumn::COUNT)
        {
            return Err(GridShapeError::ColumnCount {
                row,
                expected: KpiColumn::COUNT,
                actual: cells.len(),
            });
        }
        Ok(Self { rows })
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    #[must_use]
    pub fn cell(&self, row: usize, column: KpiColumn) -> Option<&str> {
        let idx = KpiColumn::ALL.iter().position(|c| *c == column)?;
        self.rows.get(row)?.get(idx).map(String::as_str)
    }
}
