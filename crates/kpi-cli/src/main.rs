use std::path::PathBuf;
use std::process::ExitCode;

use chrono::{Local, NaiveDate};
use clap::Parser;
use kpi_core::AppConfig;
use kpi_report::{run_daily_report, RunOptions, RunSummary, SmtpMailer};
use kpi_scraper::WebDriverSession;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "kpi-report")]
#[command(about = "Scrape the last seven days of KPIs and mail them as an HTML report")]
struct Cli {
    /// Run as if today were this date (YYYY-MM-DD); the report ends the day before.
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Scrape and render, but do not send the email.
    #[arg(long)]
    dry_run: bool,

    /// Also write the rendered HTML to this file, before the email is sent.
    #[arg(long, value_name = "PATH")]
    html_out: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if let Err(e) = init_tracing() {
        eprintln!("failed to initialise logging: {e:#}");
        return ExitCode::FAILURE;
    }

    match run(&cli).await {
        Ok(summary) if summary.sent => {
            tracing::info!(subject = %summary.subject, "daily KPI report sent");
            ExitCode::SUCCESS
        }
        Ok(summary) => {
            tracing::info!(subject = %summary.subject, "daily KPI report rendered (dry run)");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("daily KPI report failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// `RUST_LOG` wins; otherwise `HC_LOG_LEVEL`, then `info`.
fn init_tracing() -> anyhow::Result<()> {
    let level = std::env::var("HC_LOG_LEVEL")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| "info".to_string());
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    Ok(())
}

async fn run(cli: &Cli) -> anyhow::Result<RunSummary> {
    let options = RunOptions {
        today: cli.date.unwrap_or_else(|| Local::now().date_naive()),
        dry_run: cli.dry_run,
        html_out: cli.html_out.clone(),
    };

    let summary = run_daily_report(
        |key| std::env::var(key),
        &options,
        |config: &AppConfig| {
            let url = config.webdriver_url.clone();
            let headless = config.headless;
            async move { WebDriverSession::connect(&url, headless).await }
        },
        SmtpMailer::from_app_config,
    )
    .await?;
    Ok(summary)
}
