//! One end-to-end report run: configure, scrape, normalize, render, send.

use std::env::VarError;
use std::future::Future;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use kpi_core::{app_config_from_lookup, AppConfig, DateWindow, KpiColumn, DAYS_IN_WINDOW};
use kpi_scraper::{normalize_grid, scrape_kpis, Driver, DriverError, LocatorMap, SessionSettings};

use crate::error::{MailError, ReportError};
use crate::html::render_report;
use crate::mail::{build_message, subject_for, MailEnvelope, MailTransport};

#[derive(Debug, Clone)]
pub struct RunOptions {
    /// The run date; the window ends the day before.
    pub today: NaiveDate,
    /// Build everything but skip the SMTP send.
    pub dry_run: bool,
    /// Where to save the rendered HTML. Written before any send.
    pub html_out: Option<PathBuf>,
}

/// What a run produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub window: DateWindow,
    pub subject: String,
    pub recipients: Vec<String>,
    pub html: String,
    pub sent: bool,
}

/// Runs the daily report once.
///
/// `open_driver` is only called after configuration and the locator map
/// have loaded, so a misconfigured run never starts a browser. The driver is
/// closed before normalization starts, whatever the scrape outcome.
/// `open_mailer` is skipped on a dry run. `options.html_out` is written
/// before the send, so a saved copy exists even when delivery fails.
///
/// # Errors
///
/// Returns the first [`ReportError`] from any stage. Nothing is sent unless
/// every earlier stage succeeded.
pub async fn run_daily_report<L, OD, DFut, D, OM, M>(
    lookup: L,
    options: &RunOptions,
    open_driver: OD,
    open_mailer: OM,
) -> Result<RunSummary, ReportError>
where
    L: Fn(&str) -> Result<String, VarError>,
    OD: FnOnce(&AppConfig) -> DFut,
    DFut: Future<Output = Result<D, DriverError>>,
    D: Driver,
    OM: FnOnce(&AppConfig) -> Result<M, MailError>,
    M: MailTransport,
{
    let config = app_config_from_lookup(lookup)?;
    let locators = LocatorMap::load(config.locators_path.as_deref())?;
    let window = DateWindow::ending_yesterday(options.today);
    let settings = SessionSettings::from_app_config(&config);

    tracing::info!(
        start = %window.start_iso(),
        end = %window.end_iso(),
        dry_run = options.dry_run,
        "starting daily KPI report"
    );

    let driver = open_driver(&config).await?;
    let raw = scrape_kpis(driver, &settings, &locators, &window).await?;
    tracing::info!(rows = raw.rows().len(), "scraped KPI grid");

    let grid = normalize_grid(&raw)?;
    tracing::info!(
        newest = grid.cell(DAYS_IN_WINDOW - 1, KpiColumn::Date).unwrap_or_default(),
        "normalized KPI grid"
    );
    let html = render_report(&grid, &config.report);
    if let Some(path) = &options.html_out {
        write_html(path, &html)?;
    }

    let envelope = MailEnvelope::from_app_config(&config);
    let subject = subject_for(&window.end_label());
    let message = build_message(&envelope, &subject, html.clone())?;

    let mut summary = RunSummary {
        window,
        subject,
        recipients: envelope.to,
        html,
        sent: false,
    };

    if options.dry_run {
        tracing::info!(subject = %summary.subject, "dry run, skipping send");
        return Ok(summary);
    }

    let mailer = open_mailer(&config)?;
    mailer.send(message).await?;
    summary.sent = true;
    tracing::info!(
        subject = %summary.subject,
        recipients = summary.recipients.len(),
        "report email sent"
    );
    Ok(summary)
}

fn write_html(path: &Path, html: &str) -> Result<(), ReportError> {
    std::fs::write(path, html).map_err(|source| ReportError::Output {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), "wrote report HTML");
    Ok(())
}
