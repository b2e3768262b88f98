use std::io::Write;
use std::process;

use clap::{Parser, ValueEnum};
use jobsheet::adapters::{MultiSiteAdapter, RemoteApiAdapter};
use jobsheet::sheets::{ServiceAccountAuth, SheetAppender, SheetsClient};
use jobsheet::{Config, Pipeline, RunOutcome, WebScraper};
use log::LevelFilter;

#[derive(Parser)]
#[command(name = "jobsheet")]
#[command(
    about = "Fetch job postings from LinkedIn, Indeed and Remotive and append them to a Google Sheet",
    long_about = None
)]
struct Cli {
    #[arg(
        short = 'l',
        long = "log-level",
        value_enum,
        default_value = "info",
        help = "Set the logging level"
    )]
    log_level: LogLevel,

    #[arg(long, help = "Fetch and merge, print the rows as JSON and skip the upload")]
    dry_run: bool,

    #[arg(long, help = "Exit with status 1 when the upload fails")]
    strict: bool,
}

#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

fn build_pipeline(config: Config, dry_run: bool) -> Result<Pipeline, String> {
    let scraper = WebScraper::new().map_err(|e| format!("Error creating scraper: {e}"))?;
    let remotive = RemoteApiAdapter::new(config.remotive_url.clone())
        .map_err(|e| format!("Error creating Remotive client: {e}"))?;
    let auth = ServiceAccountAuth::new(config.service_account_file.clone())
        .map_err(|e| format!("Error creating auth client: {e}"))?;
    let sheets = SheetsClient::new().map_err(|e| format!("Error creating Sheets client: {e}"))?;

    Ok(Pipeline::new(
        config.query,
        config.destination,
        SheetAppender::new(auth, sheets),
    )
    .with_adapter(MultiSiteAdapter::new(scraper))
    .with_adapter(remotive)
    .dry_run(dry_run))
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level.clone().into())
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {} - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .init();

    let config = Config::from_env().unwrap_or_else(|e| {
        log::error!("Invalid configuration: {}", e);
        process::exit(1);
    });

    let pipeline = build_pipeline(config, cli.dry_run).unwrap_or_else(|e| {
        log::error!("{}", e);
        process::exit(1);
    });

    let report = pipeline.run().await;

    for failure in &report.failures {
        log::warn!("Source skipped: {}", failure);
    }

    match &report.outcome {
        RunOutcome::Uploaded(result) => log::info!("Run complete: {}", result),
        RunOutcome::DryRun(rows) => match serde_json::to_string_pretty(rows) {
            Ok(json) => println!("{}", json),
            Err(e) => log::error!("Error serializing to JSON: {}", e),
        },
        RunOutcome::NothingToUpload => log::info!("Run complete: nothing to upload"),
        RunOutcome::Failed(_) => {}
    }

    if cli.strict && report.is_failed() {
        process::exit(1);
    }
}
