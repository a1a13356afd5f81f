//! Hepascore: liver cirrhosis risk assessment
//!
//! Command-line front end. Results are printed to stdout as JSON; logs go to
//! stderr or a file so they never mix with command output.
//!
//! ```bash
//! hepascore assess <patient.json|->
//! hepascore history [--limit N] [--offset N]
//! hepascore show <id>
//! hepascore summary
//! hepascore export [--out <path>]
//! ```

use std::io::{Read, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use hepascore::adapters::memory::InMemoryLedger;
use hepascore::adapters::sanitize::RedactingMakeWriter;
use hepascore::adapters::sqlite::SqliteLedger;
use hepascore::adapters::LedgerError;
use hepascore::application::{
    AnalyticsService, AssessmentService, ExportReport, ExportedAssessment, ExportedEntry,
    ExportedHistoryRow,
};
use hepascore::config::{AppConfig, LogMode, APP_NAME, APP_VERSION};
use hepascore::ports::HistoryLedger;
use hepascore::PatientInput;

const USAGE: &str = "Usage:
  hepascore assess <patient.json|->
  hepascore history [--limit N] [--offset N]
  hepascore show <id>
  hepascore summary
  hepascore export [--out <path>]";

const DEFAULT_HISTORY_LIMIT: usize = 20;

enum Command {
    Assess { source: String },
    History { limit: usize, offset: usize },
    Show { id: String },
    Summary,
    Export { out: Option<PathBuf> },
    Help,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Command> {
    let Some(command) = args.next() else {
        return Ok(Command::Help);
    };

    match command.as_str() {
        "assess" => {
            let source = args.next().ok_or_else(|| anyhow!("assess needs a file path or '-'"))?;
            Ok(Command::Assess { source })
        }
        "history" => {
            let mut limit = DEFAULT_HISTORY_LIMIT;
            let mut offset = 0;
            while let Some(flag) = args.next() {
                let value = args.next().ok_or_else(|| anyhow!("{flag} needs a value"))?;
                let n: usize = value
                    .parse()
                    .with_context(|| format!("{flag} expects a number, got {value:?}"))?;
                match flag.as_str() {
                    "--limit" => limit = n,
                    "--offset" => offset = n,
                    _ => bail!("unknown flag for history: {flag}"),
                }
            }
            Ok(Command::History { limit, offset })
        }
        "show" => {
            let id = args.next().ok_or_else(|| anyhow!("show needs an entry id"))?;
            Ok(Command::Show { id })
        }
        "summary" => Ok(Command::Summary),
        "export" => {
            let out = match (args.next().as_deref(), args.next()) {
                (None, _) => None,
                (Some("--out"), Some(path)) => Some(PathBuf::from(path)),
                (Some(flag), _) => bail!("unknown or incomplete flag for export: {flag}"),
            };
            Ok(Command::Export { out })
        }
        "-h" | "--help" | "help" => Ok(Command::Help),
        other => bail!("unknown command: {other}"),
    }
}

fn init_logging(config: &AppConfig) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let (writer, guard) = if config.log_mode == LogMode::File {
        if let Some(parent) = config.log_file.parent() {
            // Best-effort: a missing directory surfaces when the file is opened.
            let _ = std::fs::create_dir_all(parent);
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.log_file)
            .with_context(|| format!("cannot open log file {:?}", config.log_file))?;
        tracing_appender::non_blocking(file)
    } else {
        tracing_appender::non_blocking(std::io::stderr())
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(RedactingMakeWriter::new(writer)))
        .init();

    Ok(guard)
}

fn read_input(source: &str) -> Result<PatientInput> {
    let raw = if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("cannot read patient data from stdin")?;
        buf
    } else {
        std::fs::read_to_string(source).with_context(|| format!("cannot read {source}"))?
    };
    serde_json::from_str(&raw).context("patient data is not valid JSON")
}

fn print_json<T: serde::Serialize>(out: &mut impl Write, value: &T) -> Result<()> {
    writeln!(out, "{}", serde_json::to_string_pretty(value)?)?;
    Ok(())
}

/// Execute one command, writing its output to `out`. Assessments are printed
/// in their presentation form, with unmeasured labs shown as zero.
fn run<L>(ledger: Arc<L>, command: Command, config: &AppConfig, out: &mut impl Write) -> Result<()>
where
    L: HistoryLedger,
    L::Error: Into<LedgerError>,
{
    let assessments = AssessmentService::new(ledger.clone());

    match command {
        Command::Assess { source } => {
            let input = read_input(&source)?;
            let result = assessments.assess_input(input)?;
            print_json(out, &ExportedAssessment::from(&result))?;
        }
        Command::History { limit, offset } => {
            let page = assessments.history_page(offset, limit)?;
            tracing::info!(
                "Listing {} of {} history entries from offset {}",
                page.items.len(),
                page.total_count,
                page.offset
            );
            let rows: Vec<ExportedHistoryRow> =
                page.items.iter().map(ExportedHistoryRow::from).collect();
            print_json(out, &rows)?;
        }
        Command::Show { id } => {
            let entry = assessments.history_entry(&id)?;
            print_json(out, &ExportedEntry::from(&entry))?;
        }
        Command::Summary => {
            let summary = AnalyticsService::new(ledger).summary()?;
            print_json(out, &summary)?;
        }
        Command::Export { out: target } => {
            let history = assessments.history()?;
            let current = history.first().map(|e| &e.prediction_result);
            let report = ExportReport::build(current, &history, chrono::Utc::now());
            tracing::info!(
                "Export covers {} entries on {} page(s)",
                report.history.len(),
                report.pages(config.export_page_size).len()
            );

            let json = report.to_json_paged(config.export_page_size)?;
            match target {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("cannot write {}", path.display()))?;
                    tracing::info!("Wrote export to {}", path.display());
                }
                None => writeln!(out, "{json}")?,
            }
        }
        Command::Help => writeln!(out, "{APP_NAME} {APP_VERSION}\n\n{USAGE}")?,
    }

    Ok(())
}

fn main() -> Result<()> {
    let config = AppConfig::from_env();
    let _guard = init_logging(&config)?;

    let command = parse_args(std::env::args().skip(1)).map_err(|e| anyhow!("{e}\n\n{USAGE}"))?;

    let mut stdout = std::io::stdout().lock();

    if config.in_memory_ledger() {
        tracing::info!("Using in-memory history ledger");
        run(Arc::new(InMemoryLedger::new()), command, &config, &mut stdout)
    } else {
        tracing::debug!("Opening history ledger at {}", config.db_path);
        let ledger = SqliteLedger::new(&config.db_path)
            .with_context(|| format!("cannot open history database {}", config.db_path))?;
        run(Arc::new(ledger), command, &config, &mut stdout)
    }
}
