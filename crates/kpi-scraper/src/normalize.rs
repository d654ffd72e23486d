//! Conversion from scraped cell text to display values.
//!
//! The dashboard renders dates with a one-character Korean weekday and
//! numbers with a fractional part. The report wants English weekday
//! abbreviations and grouped integers.

use kpi_core::{CellKind, KpiColumn, KpiGrid};

use crate::error::{NormalizeError, ScraperError};
use crate::extract::{RawCell, RawGrid};

/// Checked in this order; the first token present wins.
const WEEKDAYS: [(char, &str); 7] = [
    ('월', "Mon"),
    ('화', "Tue"),
    ('수', "Wed"),
    ('목', "Thu"),
    ('금', "Fri"),
    ('토', "Sat"),
    ('일', "Sun"),
];

/// Replaces the first Korean weekday token in `text` with its English
/// abbreviation. Returns `None` when `text` has no such token.
#[must_use]
pub fn translate_weekday(text: &str) -> Option<String> {
    WEEKDAYS.iter().find_map(|(kr, en)| {
        text.contains(*kr)
            .then(|| text.replacen(*kr, en, 1))
    })
}

/// Truncates a decimal string toward zero and groups its digits by thousands.
///
/// Existing `,` separators are accepted. `"1234.9"` becomes `"1,234"` and
/// `"-0.7"` becomes `"0"`.
///
/// # Errors
///
/// [`NormalizeError::EmptyCell`] for blank input, [`NormalizeError::NotNumeric`]
/// when the text is not a finite number.
pub fn format_numeric(text: &str) -> Result<String, NormalizeError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(NormalizeError::EmptyCell);
    }
    let value: f64 = trimmed
        .replace(',', "")
        .parse()
        .map_err(|_| NormalizeError::NotNumeric(trimmed.to_string()))?;
    if !value.is_finite() {
        return Err(NormalizeError::NotNumeric(trimmed.to_string()));
    }

    let truncated = value.trunc();
    if truncated.abs() < 1.0 {
        return Ok("0".to_string());
    }
    let digits = format!("{:.0}", truncated.abs());
    let grouped = group_thousands(&digits);
    Ok(if truncated < 0.0 {
        format!("-{grouped}")
    } else {
        grouped
    })
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Normalizes one cell according to its column's kind.
///
/// A date label must carry a Korean weekday token. Without one it is read as
/// a number, and anything else is rejected.
///
/// # Errors
///
/// [`NormalizeError::EmptyCell`] for blank text, [`NormalizeError::NoWeekday`]
/// for a date label that is neither a weekday label nor a number, and
/// anything [`format_numeric`] returns for numeric cells.
pub fn normalize_cell(cell: &RawCell) -> Result<String, NormalizeError> {
    match cell.kind {
        CellKind::DateLabel => {
            let trimmed = cell.text.trim();
            if trimmed.is_empty() {
                return Err(NormalizeError::EmptyCell);
            }
            match translate_weekday(trimmed) {
                Some(translated) => Ok(translated),
                None => format_numeric(trimmed)
                    .map_err(|_| NormalizeError::NoWeekday(trimmed.to_string())),
            }
        }
        CellKind::Numeric => format_numeric(&cell.text),
    }
}

/// Normalizes every cell and checks the 7×11 shape.
///
/// # Errors
///
/// [`ScraperError::Normalize`] naming the first bad cell, or
/// [`ScraperError::Shape`] if the grid is not 7×11.
pub fn normalize_grid(raw: &RawGrid) -> Result<KpiGrid, ScraperError> {
    let rows = raw
        .rows()
        .iter()
        .enumerate()
        .map(|(row, cells)| {
            cells
                .iter()
                .zip(KpiColumn::ALL)
                .map(|(cell, column)| {
                    normalize_cell(cell).map_err(|source| ScraperError::Normalize {
                        row,
                        column,
                        source,
                    })
                })
                .collect::<Result<Vec<_>, _>>()
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(KpiGrid::new(rows)?)
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
