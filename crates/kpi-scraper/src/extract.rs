//! Reads the KPI result table cell by cell.

use std::time::Duration;

use kpi_core::{CellKind, KpiColumn, DAYS_IN_WINDOW};

use crate::driver::Driver;
use crate::error::{DriverError, ScraperError};
use crate::locator::{CellLocators, Locator};

/// Text read from one cell, tagged with how its column must be interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCell {
    pub kind: CellKind,
    pub text: String,
}

/// Unnormalized cells in page order, one row per day (row 0 = oldest).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawGrid {
    rows: Vec<Vec<RawCell>>,
}

impl RawGrid {
    /// Builds a grid from text rows, tagging each cell with its column's kind.
    #[must_use]
    pub fn from_text_rows(rows: Vec<Vec<String>>) -> Self {
        let rows = rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .zip(KpiColumn::ALL)
                    .map(|(text, column)| RawCell {
                        kind: column.kind(),
                        text,
                    })
                    .collect()
            })
            .collect();
        Self { rows }
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<RawCell>] {
        &self.rows
    }
}

/// Reads every `(row, column)` cell of the result table.
///
/// # Errors
///
/// - [`ScraperError::CellMissing`] if a cell does not appear within `timeout`.
/// - [`ScraperError::Locator`] if the locator map lacks a column category.
/// - [`ScraperError::Driver`] if reading a present cell fails.
pub(crate) async fn read_grid<D: Driver>(
    driver: &mut D,
    cells: &CellLocators,
    timeout: Duration,
) -> Result<RawGrid, ScraperError> {
    let mut rows = Vec::with_capacity(DAYS_IN_WINDOW);
    for row in 0..DAYS_IN_WINDOW {
        let mut values = Vec::with_capacity(KpiColumn::COUNT);
        for column in KpiColumn::ALL {
            let id = cells.cell_id(row, column)?;
            let locator = Locator::id(id.as_str());
            let element = driver
                .wait_for(&locator, timeout)
                .await
                .map_err(|e| match e {
                    DriverError::Timeout { .. } | DriverError::NoSuchElement { .. } => {
                        ScraperError::CellMissing {
                            row,
                            column,
                            id: id.clone(),
                        }
                    }
                    other => ScraperError::Driver {
                        context: format!("locating cell {id}"),
                        source: other,
                    },
                })?;
            let text = driver
                .text(&element)
                .await
                .map_err(|e| ScraperError::Driver {
                    context: format!("reading cell {id}"),
                    source: e,
                })?;
            values.push(RawCell {
                kind: column.kind(),
                text,
            });
        }
        rows.push(values);
    }
    tracing::info!(rows = rows.len(), columns = KpiColumn::COUNT, "extracted KPI cells");
    Ok(RawGrid { rows })
}
