//! `framelord` command-line entry point.
//!
//! # Responsibility
//! - Probe core crate linkage (`ping`, `version`).
//! - Inspect and seed FrameScan JSON blobs on disk.

mod config;

use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use config::CliConfig;
use framelord_core::{
    FrameScanDomain, FrameScanService, FrameScanStore, JsonFilePersistence, RecordScanRequest,
    StoreError,
};
use log::{info, warn};
use serde_json::json;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "framelord")]
#[command(about = "FrameLord record store utilities")]
#[command(
    after_help = "Environment:\n  FRAMELORD_LOG_LEVEL   Log verbosity override\n  FRAMELORD_LOG_DIR     Rolling log directory\n  FRAMELORD_DATA_DIR    Base directory for data files"
)]
struct Cli {
    #[command(flatten)]
    config: CliConfig,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Ping,
    Version,
    /// Print report totals and per-contact counts for a FrameScan blob.
    Summary {
        file: PathBuf,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Append demo reports to a FrameScan blob, one per day back from today.
    Seed {
        file: PathBuf,
        #[arg(default_value_t = 10)]
        count: usize,
        #[arg(long, default_value = "contact_demo")]
        contact: String,
    },
}

#[derive(Debug)]
enum CliError {
    Io(std::io::Error),
    Store(StoreError),
    Scan(String),
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io error: {err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Scan(message) => write!(f, "invalid scan: {message}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<StoreError> for CliError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_cli_logging(&cli.config);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("framelord: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_cli_logging(config: &CliConfig) {
    let log_dir = match config.log_dir() {
        Ok(dir) => dir,
        Err(err) => {
            eprintln!("framelord: logging disabled: {err}");
            return;
        }
    };
    if let Err(err) = framelord_core::init_logging(config.log_level(), &log_dir.to_string_lossy())
    {
        eprintln!("framelord: logging disabled: {err}");
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    match &cli.command {
        Commands::Ping => {
            println!("framelord_core ping={}", framelord_core::ping());
            Ok(())
        }
        Commands::Version => {
            println!("framelord_core version={}", framelord_core::core_version());
            Ok(())
        }
        Commands::Summary { file, json } => summary(&cli.config, file, *json),
        Commands::Seed {
            file,
            count,
            contact,
        } => seed(&cli.config, file, *count, contact),
    }
}

fn open_reports(
    config: &CliConfig,
    file: &Path,
) -> Result<(FrameScanStore, JsonFilePersistence), CliError> {
    let adapter = JsonFilePersistence::new(config.data_file(file)?);
    let store = FrameScanStore::new();
    let loaded = store.load_from(&adapter)?;
    info!(
        "event=cli_load module=cli status=ok path={} records={}",
        adapter.path().display(),
        loaded
    );
    Ok((store, adapter))
}

fn summary(config: &CliConfig, file: &Path, as_json: bool) -> Result<(), CliError> {
    let (store, _) = open_reports(config, file)?;
    let service = FrameScanService::new(&store);
    let per_contact = service.reports_per_contact();
    let average = service.average_score(None);
    let latest = store.get_latest();

    if as_json {
        let body = json!({
            "total": store.len(),
            "averageScore": average,
            "latestId": latest.as_ref().map(|record| record.id.to_string()),
            "perContact": per_contact,
        });
        println!("{body}");
        return Ok(());
    }

    println!("total={}", store.len());
    match average {
        Some(average) => println!("average_score={average:.1}"),
        None => println!("average_score=none"),
    }
    if let Some(latest) = latest {
        println!(
            "latest id={} score={} created_at={}",
            latest.id,
            latest.payload.score,
            latest.created_at.to_rfc3339()
        );
    }
    for (contact, count) in &per_contact {
        println!("contact {contact} reports={count}");
    }
    Ok(())
}

fn seed(config: &CliConfig, file: &Path, count: usize, contact: &str) -> Result<(), CliError> {
    let (store, adapter) = open_reports(config, file)?;
    let service = FrameScanService::new(&store);
    let domains = [
        FrameScanDomain::Text,
        FrameScanDomain::Image,
        FrameScanDomain::Audio,
    ];
    let now = Utc::now();

    for index in 0..count {
        let score = u8::try_from((index * 37 + 20) % 101).unwrap_or(50);
        let domain = domains[index % domains.len()];
        service
            .record_scan(RecordScanRequest {
                contact_ids: vec![contact.to_string()],
                domain,
                score,
                summary: format!("demo scan {}", index + 1),
                raw_result: json!({ "seeded": true, "index": index }),
                created_at: Some(now - Duration::days(index as i64)),
            })
            .map_err(|err| CliError::Scan(err.to_string()))?;
    }

    store.save_to(&adapter)?;
    if count == 0 {
        warn!("event=cli_seed module=cli status=skip reason=zero_count");
    }
    println!(
        "seeded={count} total={} path={}",
        store.len(),
        adapter.path().display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Cli, Commands};
    use clap::Parser;
    use std::path::PathBuf;

    #[test]
    fn seed_defaults_count_and_contact() {
        let cli = Cli::try_parse_from(["framelord", "seed", "scans.json"]).unwrap();
        match cli.command {
            Commands::Seed {
                file,
                count,
                contact,
            } => {
                assert_eq!(file, PathBuf::from("scans.json"));
                assert_eq!(count, 10);
                assert_eq!(contact, "contact_demo");
            }
            _ => panic!("expected seed"),
        }
    }

    #[test]
    fn global_flags_are_accepted_after_subcommand() {
        let cli = Cli::try_parse_from([
            "framelord",
            "summary",
            "scans.json",
            "--json",
            "--data-dir",
            "/srv/framelord",
        ])
        .unwrap();
        assert_eq!(cli.config.data_dir, Some(PathBuf::from("/srv/framelord")));
        assert!(matches!(cli.command, Commands::Summary { json: true, .. }));
    }

    #[test]
    fn missing_subcommand_is_rejected() {
        assert!(Cli::try_parse_from(["framelord"]).is_err());
    }
}
