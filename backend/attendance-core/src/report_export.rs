// src/report_export.rs
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use tracing::info;

use crate::error::AppError;
use crate::pipeline::AttendanceReport;
use crate::reconciler::{AttendanceRecord, MonthlySummary};

pub const RECORDS_FILE_NAME: &str = "processed_attendance.csv";
pub const SUMMARY_FILE_NAME: &str = "summary.csv";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFiles {
    pub records: PathBuf,
    pub summary: PathBuf,
}

fn write_rows<W: Write, T: serde::Serialize>(writer: W, rows: &[T]) -> Result<(), AppError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Writes the "Processed Attendance" table.
pub fn write_records_csv<W: Write>(writer: W, records: &[AttendanceRecord]) -> Result<(), AppError> {
    write_rows(writer, records)
}

/// Writes the "Summary" table.
pub fn write_summaries_csv<W: Write>(
    writer: W,
    summaries: &[MonthlySummary],
) -> Result<(), AppError> {
    write_rows(writer, summaries)
}

/// Writes both tables into `out_dir`, creating it if needed.
pub fn write_report_csv(report: &AttendanceReport, out_dir: &Path) -> Result<ReportFiles, AppError> {
    fs::create_dir_all(out_dir)?;
    let files = ReportFiles {
        records: out_dir.join(RECORDS_FILE_NAME),
        summary: out_dir.join(SUMMARY_FILE_NAME),
    };

    write_records_csv(fs::File::create(&files.records)?, &report.records)?;
    write_summaries_csv(fs::File::create(&files.summary)?, &report.summaries)?;

    info!(
        "Wrote {} records to {} and {} summaries to {}",
        report.records.len(),
        files.records.display(),
        report.summaries.len(),
        files.summary.display()
    );
    Ok(files)
}

pub fn report_to_json(report: &AttendanceReport) -> Result<String, AppError> {
    Ok(serde_json::to_string_pretty(report)?)
}
