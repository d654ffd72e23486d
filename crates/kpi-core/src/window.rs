//! Reporting window: the seven calendar days that end yesterday.

use chrono::{Days, NaiveDate};

use crate::grid::DAYS_IN_WINDOW;

const ISO_FORMAT: &str = "%Y-%m-%d";
const LABEL_FORMAT: &str = "%Y-%m-%d(%a)";

/// Inclusive date range `[start, end]` covered by one report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    /// Window for a run executed on `today`: `end = today - 1`, `start = today - 7`.
    ///
    /// Saturates at [`NaiveDate::MIN`] instead of panicking for dates at the
    /// very start of chrono's range.
    #[must_use]
    pub fn ending_yesterday(today: NaiveDate) -> Self {
        let end = today.checked_sub_days(Days::new(1)).unwrap_or(NaiveDate::MIN);
        let start = today
            .checked_sub_days(Days::new(DAYS_IN_WINDOW as u64))
            .unwrap_or(NaiveDate::MIN);
        Self { start, end }
    }

    #[must_use]
    pub fn start_iso(&self) -> String {
        self.start.format(ISO_FORMAT).to_string()
    }

    #[must_use]
    pub fn end_iso(&self) -> String {
        self.end.format(ISO_FORMAT).to_string()
    }

    /// End date with an English weekday suffix, e.g. `2026-10-15(Thu)`.
    ///
    /// This is both the value typed into the dashboard's end-date field and
    /// the label shown in the email subject.
    #[must_use]
    pub fn end_label(&self) -> String {
        self.end.format(LABEL_FORMAT).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn days(w: &DateWindow) -> Vec<NaiveDate> {
        w.start.iter_days().take_while(|d| *d <= w.end).collect()
    }

    #[test]
    fn ends_yesterday_and_starts_seven_days_back() {
        let w = DateWindow::ending_yesterday(date(2026, 10, 16));
        assert_eq!(w.end, date(2026, 10, 15));
        assert_eq!(w.start, date(2026, 10, 9));
    }

    #[test]
    fn iso_and_label_formats() {
        let w = DateWindow::ending_yesterday(date(2026, 10, 16));
        assert_eq!(w.start_iso(), "2026-10-09");
        assert_eq!(w.end_iso(), "2026-10-15");
        assert_eq!(w.end_label(), "2026-10-15(Thu)");
    }

    #[test]
    fn spans_exactly_seven_days() {
        for today in [date(2026, 1, 3), date(2024, 3, 1), date(2026, 12, 31)] {
            let w = DateWindow::ending_yesterday(today);
            let days = days(&w);
            assert_eq!(days.len(), DAYS_IN_WINDOW, "window for {today}");
            assert_eq!(days.first(), Some(&w.start));
            assert_eq!(days.last(), Some(&w.end));
        }
    }

    #[test]
    fn crosses_year_boundary() {
        let w = DateWindow::ending_yesterday(date(2027, 1, 2));
        assert_eq!(w.start_iso(), "2026-12-26");
        assert_eq!(w.end_label(), "2027-01-01(Fri)");
    }

    #[test]
    fn leap_day_is_counted() {
        let w = DateWindow::ending_yesterday(date(2024, 3, 2));
        assert_eq!(w.end, date(2024, 3, 1));
        assert_eq!(w.start, date(2024, 2, 24));
        assert!(days(&w).contains(&date(2024, 2, 29)));
    }
}
