// src/main.rs
use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use rust_decimal::Decimal;
use std::{collections::HashMap, path::PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use attendance_core::config::AppConfig;
use attendance_core::policy::parse_time_of_day;
use attendance_core::punch_source::read_punch_log;
use attendance_core::report_export::{report_to_json, write_report_csv};
use attendance_core::user_directory::load_user_directory;
use attendance_core::{process_attendance, ReportOutcome, ReportingPeriod};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
}

/// Builds the monthly attendance report from a time-clock punch log.
#[derive(Debug, Parser)]
#[command(name = "attendance-core", version, about)]
struct Cli {
    /// Punch log: raw device log (.dat/.txt) or CSV export with `User ID`,`Timestamp`
    punch_log: PathBuf,

    /// User directory CSV (`User ID`,`Name`); overrides ATTENDANCE_USER_DATABASE
    #[arg(long)]
    users: Option<PathBuf>,

    /// Directory for the CSV reports; overrides ATTENDANCE_OUTPUT_DIR
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Year to reconcile (defaults to the previous calendar month)
    #[arg(long, requires = "month")]
    year: Option<i32>,

    /// Month to reconcile, 1-12
    #[arg(long, requires = "year")]
    month: Option<u32>,

    /// Hours at or above which a day counts as a full day
    #[arg(long)]
    full_day_threshold: Option<Decimal>,

    /// Latest arrival (HH:MM) that still counts as a late-in short leave
    #[arg(long)]
    late_in_boundary: Option<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    format: OutputFormat,
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Setting tracing subscriber failed")?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing()?;

    let config = AppConfig::from_env().context("Loading ATTENDANCE_* configuration failed")?;
    info!("Configuration loaded.");

    let mut policy = config.policy().context("Invalid attendance policy in configuration")?;
    if let Some(threshold) = cli.full_day_threshold {
        policy.full_day_threshold_hours = threshold;
    }
    if let Some(boundary) = &cli.late_in_boundary {
        policy.late_in_boundary = parse_time_of_day(boundary)?;
    }
    policy.validate()?;
    info!(
        "Policy: half day from {}h, full day from {}h, late-in until {}",
        policy.half_day_threshold_hours, policy.full_day_threshold_hours, policy.late_in_boundary
    );

    let period = match (cli.year, cli.month) {
        (Some(year), Some(month)) => ReportingPeriod::new(year, month)?,
        (None, None) => ReportingPeriod::preceding(chrono::Local::now().date_naive()),
        _ => bail!("--year and --month must be given together"),
    };
    info!("Reporting period: {}", period);

    let punches = read_punch_log(&cli.punch_log)
        .with_context(|| format!("Reading punch log {}", cli.punch_log.display()))?;

    let users_path = cli.users.unwrap_or_else(|| config.user_database_path());
    let names: HashMap<_, _> = match load_user_directory(&users_path) {
        Ok(names) => names,
        Err(e) => {
            warn!(
                "User directory {} unavailable ({}); names will be left empty",
                users_path.display(),
                e
            );
            HashMap::new()
        }
    };

    let report = match process_attendance(&punches, period, &names, &policy) {
        ReportOutcome::Report(report) => report,
        ReportOutcome::NoDataForPeriod(period) => {
            println!("No data found for {}.", period);
            return Ok(());
        }
    };

    match cli.format {
        OutputFormat::Json => println!("{}", report_to_json(&report)?),
        OutputFormat::Csv => {
            let out_dir = cli.output_dir.unwrap_or_else(|| config.output_dir_path());
            let files = write_report_csv(&report, &out_dir)
                .with_context(|| format!("Writing reports to {}", out_dir.display()))?;
            println!("Processed Attendance: {}", files.records.display());
            println!("Summary: {}", files.summary.display());
        }
    }

    Ok(())
}
