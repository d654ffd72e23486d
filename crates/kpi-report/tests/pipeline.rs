//! End-to-end report runs against the in-memory dashboard.

use std::cell::Cell;
use std::collections::HashMap;
use std::env::VarError;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use lettre::Message;

use kpi_core::{AppConfig, ConfigError, KpiColumn};
use kpi_report::{run_daily_report, MailError, MailTransport, ReportError, RunOptions};
use kpi_scraper::fake::FakeDriver;
use kpi_scraper::{AuthStage, DriverError, NormalizeError, ScraperError};

#[derive(Clone, Default)]
struct RecordingMailer {
    sent: Arc<Mutex<Vec<Message>>>,
}

impl RecordingMailer {
    fn sent(&self) -> Vec<Message> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailTransport for RecordingMailer {
    async fn send(&self, message: Message) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(message);
        Ok(())
    }
}

struct RejectingMailer;

#[async_trait]
impl MailTransport for RejectingMailer {
    async fn send(&self, _message: Message) -> Result<(), MailError> {
        Err(MailError::Transport("535 authentication failed".to_string()))
    }
}

fn scratch_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("kpi-report-{}-{name}.html", std::process::id()))
}

fn env() -> HashMap<&'static str, &'static str> {
    HashMap::from([
        ("HC_URL", "https://dashboard.test/login"),
        ("HC_LOGIN_USERNAME", "operator"),
        ("HC_LOGIN_PASSWORD", "hunter2"),
        ("HC_EMAIL_ADDRESS_1", "reports@example.com"),
        ("HC_EMAIL_ADDRESS_2", "team@example.com"),
        ("HC_EMAIL_ADDRESS_3", "exec@example.com"),
        ("HC_EMAIL_PASSWORD", "app-password"),
        ("HC_SETTLE_DELAY_MS", "0"),
    ])
}

fn lookup(
    map: HashMap<&'static str, &'static str>,
) -> impl Fn(&str) -> Result<String, VarError> {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

fn options(dry_run: bool) -> RunOptions {
    RunOptions {
        today: NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(),
        dry_run,
        html_out: None,
    }
}

fn mailer_factory(
    mailer: &RecordingMailer,
) -> impl FnOnce(&AppConfig) -> Result<RecordingMailer, MailError> + '_ {
    move |_| Ok(mailer.clone())
}

#[tokio::test]
async fn full_run_sends_one_normalized_report() {
    // Row 3 is 2026-10-12(월); its NRU cell comes back as a raw float.
    let driver = FakeDriver::with_dashboard().with_text("A0_3_1", "12345.0");
    let log = driver.log();
    let mailer = RecordingMailer::default();

    let summary = run_daily_report(
        lookup(env()),
        &options(false),
        |_: &AppConfig| async move { Ok::<_, DriverError>(driver) },
        mailer_factory(&mailer),
    )
    .await
    .unwrap();

    assert!(summary.sent);
    assert_eq!(summary.window.start_iso(), "2026-10-09");
    assert_eq!(summary.window.end_iso(), "2026-10-15");
    assert_eq!(summary.subject, "【HC】Daily KPI Report: 2026-10-15(Thu)");
    assert_eq!(summary.recipients, vec!["team@example.com", "exec@example.com"]);

    assert!(summary.html.contains("<td>2026-10-12(Mon)</td>"));
    assert!(summary.html.contains("<td>12,345</td>"));
    assert!(summary.html.contains("<td>2026-10-15(Thu)</td>"));
    assert!(!summary.html.contains('월'));
    assert!(!summary.html.contains("12345.0"));

    let sent = mailer.sent();
    assert_eq!(sent.len(), 1);
    let to: Vec<String> = sent[0]
        .envelope()
        .to()
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(to, vec!["team@example.com", "exec@example.com"]);
    assert!(log.closed());
}

#[tokio::test]
async fn date_range_is_entered_before_extraction() {
    let driver = FakeDriver::with_dashboard();
    let log = driver.log();

    run_daily_report(
        lookup(env()),
        &options(true),
        |_: &AppConfig| async move { Ok::<_, DriverError>(driver) },
        mailer_factory(&RecordingMailer::default()),
    )
    .await
    .unwrap();

    assert_eq!(log.field_value("a101").as_deref(), Some("2026-10-09"));
    assert_eq!(log.field_value("a102").as_deref(), Some("2026-10-15(Thu)"));
}

#[tokio::test]
async fn dry_run_renders_without_sending() {
    let driver = FakeDriver::with_dashboard();
    let mailer = RecordingMailer::default();
    let opened = Cell::new(false);

    let summary = run_daily_report(
        lookup(env()),
        &options(true),
        |_: &AppConfig| async move { Ok::<_, DriverError>(driver) },
        |_: &AppConfig| {
            opened.set(true);
            Ok(mailer.clone())
        },
    )
    .await
    .unwrap();

    assert!(!summary.sent);
    assert!(summary.html.contains("<table"));
    assert!(!opened.get());
    assert!(mailer.sent().is_empty());
}

#[tokio::test]
async fn missing_config_never_opens_browser() {
    let mut vars = env();
    vars.remove("HC_LOGIN_PASSWORD");
    let opened = Cell::new(false);
    let mailer = RecordingMailer::default();

    let err = run_daily_report(
        lookup(vars),
        &options(false),
        |_: &AppConfig| {
            opened.set(true);
            async { Ok::<_, DriverError>(FakeDriver::with_dashboard()) }
        },
        mailer_factory(&mailer),
    )
    .await
    .unwrap_err();

    assert!(
        matches!(err, ReportError::Config(ConfigError::MissingEnvVar(ref v)) if v == "HC_LOGIN_PASSWORD"),
        "got {err:?}"
    );
    assert!(!opened.get());
    assert!(mailer.sent().is_empty());
}

#[tokio::test]
async fn login_timeout_sends_nothing_and_closes_browser() {
    let driver = FakeDriver::with_dashboard().without_element("/html/body/div[2]/button");
    let log = driver.log();
    let mailer = RecordingMailer::default();

    let err = run_daily_report(
        lookup(env()),
        &options(false),
        |_: &AppConfig| async move { Ok::<_, DriverError>(driver) },
        mailer_factory(&mailer),
    )
    .await
    .unwrap_err();

    assert!(
        matches!(
            err,
            ReportError::Scraper(ScraperError::ElementNotFound {
                stage: AuthStage::PasswordEntered,
                element: "login button",
                ..
            })
        ),
        "got {err:?}"
    );
    assert!(mailer.sent().is_empty());
    assert!(log.closed());
}

#[tokio::test]
async fn missing_cell_aborts_before_rendering() {
    let driver = FakeDriver::with_dashboard().without_element("A0_4_21");
    let log = driver.log();
    let mailer = RecordingMailer::default();

    let err = run_daily_report(
        lookup(env()),
        &options(false),
        |_: &AppConfig| async move { Ok::<_, DriverError>(driver) },
        mailer_factory(&mailer),
    )
    .await
    .unwrap_err();

    assert!(
        matches!(
            err,
            ReportError::Scraper(ScraperError::CellMissing { row: 4, ref id, .. }) if id == "A0_4_21"
        ),
        "got {err:?}"
    );
    assert!(mailer.sent().is_empty());
    assert!(log.closed());
}

#[tokio::test]
async fn unparseable_cell_fails_the_run() {
    let driver = FakeDriver::with_dashboard().with_text("A0_2_4", "n/a");
    let mailer = RecordingMailer::default();

    let err = run_daily_report(
        lookup(env()),
        &options(false),
        |_: &AppConfig| async move { Ok::<_, DriverError>(driver) },
        mailer_factory(&mailer),
    )
    .await
    .unwrap_err();

    assert!(
        matches!(err, ReportError::Scraper(ScraperError::Normalize { row: 2, .. })),
        "got {err:?}"
    );
    assert!(mailer.sent().is_empty());
}

#[tokio::test]
async fn browser_start_failure_is_reported() {
    let mailer = RecordingMailer::default();

    let err = run_daily_report(
        lookup(env()),
        &options(false),
        |config: &AppConfig| {
            let url = config.webdriver_url.clone();
            async move {
                Err::<FakeDriver, _>(DriverError::Connect {
                    url,
                    reason: "connection refused".to_string(),
                })
            }
        },
        mailer_factory(&mailer),
    )
    .await
    .unwrap_err();

    assert!(
        matches!(err, ReportError::Browser(DriverError::Connect { ref url, .. }) if url == "http://localhost:9515"),
        "got {err:?}"
    );
    assert!(mailer.sent().is_empty());
}

#[tokio::test]
async fn third_recipient_is_optional() {
    let mut vars = env();
    vars.remove("HC_EMAIL_ADDRESS_3");
    let driver = FakeDriver::with_dashboard();
    let mailer = RecordingMailer::default();

    let summary = run_daily_report(
        lookup(vars),
        &options(false),
        |_: &AppConfig| async move { Ok::<_, DriverError>(driver) },
        mailer_factory(&mailer),
    )
    .await
    .unwrap();

    assert_eq!(summary.recipients, vec!["team@example.com"]);
    assert_eq!(mailer.sent()[0].envelope().to().len(), 1);
}

#[tokio::test]
async fn date_cell_without_weekday_sends_nothing() {
    let driver = FakeDriver::with_dashboard().with_text("A0_0_0", "n/a");
    let log = driver.log();
    let mailer = RecordingMailer::default();

    let err = run_daily_report(
        lookup(env()),
        &options(false),
        |_: &AppConfig| async move { Ok::<_, DriverError>(driver) },
        mailer_factory(&mailer),
    )
    .await
    .unwrap_err();

    assert!(
        matches!(
            err,
            ReportError::Scraper(ScraperError::Normalize {
                row: 0,
                column: KpiColumn::Date,
                source: NormalizeError::NoWeekday(_),
            })
        ),
        "got {err:?}"
    );
    assert!(mailer.sent().is_empty());
    assert!(log.closed());
}

#[tokio::test]
async fn html_is_saved_before_a_failed_send() {
    let path = scratch_path("failed-send");
    let _ = std::fs::remove_file(&path);
    let mut opts = options(false);
    opts.html_out = Some(path.clone());

    let err = run_daily_report(
        lookup(env()),
        &opts,
        |_: &AppConfig| async move { Ok::<_, DriverError>(FakeDriver::with_dashboard()) },
        |_: &AppConfig| Ok(RejectingMailer),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ReportError::Mail(MailError::Transport(_))), "got {err:?}");
    let saved = std::fs::read_to_string(&path).unwrap();
    assert!(saved.contains("<td>2026-10-15(Thu)</td>"));
    std::fs::remove_file(&path).unwrap();
}

#[tokio::test]
async fn unwritable_html_out_stops_before_sending() {
    let mut opts = options(false);
    opts.html_out = Some(PathBuf::from("/nonexistent-kpi-report-dir/report.html"));
    let mailer = RecordingMailer::default();

    let err = run_daily_report(
        lookup(env()),
        &opts,
        |_: &AppConfig| async move { Ok::<_, DriverError>(FakeDriver::with_dashboard()) },
        mailer_factory(&mailer),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ReportError::Output { .. }), "got {err:?}");
    assert!(mailer.sent().is_empty());
}
