// src/punch_source.rs
use std::{fs::File, io::Read, path::Path};
use tracing::{info, warn};

use crate::error::AppError;
use crate::normalizer::{RawPunch, UserId};

// Raw device log: headerless, tab-delimited, six columns
// (user id, timestamp, then four device fields we do not use).
const RAW_LOG_MIN_COLUMNS: usize = 2;

const USER_ID_COLUMN: &str = "User ID";
const TIMESTAMP_COLUMN: &str = "Timestamp";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PunchLogFormat {
    RawDeviceLog,
    CsvExport,
}

impl PunchLogFormat {
    pub fn from_path(path: &Path) -> Result<Self, AppError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "dat" | "txt" => Ok(PunchLogFormat::RawDeviceLog),
            "csv" => Ok(PunchLogFormat::CsvExport),
            _ => Err(AppError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

fn parse_user_id(raw: &str) -> Option<UserId> {
    raw.trim().parse::<UserId>().ok()
}

/// Position of a named column in a CSV header row.
pub(crate) fn column_index(headers: &csv::StringRecord, name: &str) -> Result<usize, AppError> {
    headers
        .iter()
        .position(|header| header == name)
        .ok_or_else(|| AppError::MissingColumn(name.to_string()))
}

/// Reads a punch log, picking the parser from the file extension.
pub fn read_punch_log(path: &Path) -> Result<Vec<RawPunch>, AppError> {
    let format = PunchLogFormat::from_path(path)?;
    info!("Reading punch log {} as {:?}", path.display(), format);
    let file = File::open(path)?;
    match format {
        PunchLogFormat::RawDeviceLog => read_raw_device_log(file),
        PunchLogFormat::CsvExport => read_csv_export(file),
    }
}

/// Parses the headerless tab-delimited device log. Rows with a non-numeric
/// user id or too few columns are skipped.
pub fn read_raw_device_log<R: Read>(reader: R) -> Result<Vec<RawPunch>, AppError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut punches = Vec::new();
    for (line, row) in csv_reader.records().enumerate() {
        let row = row?;
        if row.len() < RAW_LOG_MIN_COLUMNS {
            if !(row.len() == 1 && row[0].is_empty()) {
                warn!(
                    "Skipping device log line {}: expected at least {} columns",
                    line + 1,
                    RAW_LOG_MIN_COLUMNS
                );
            }
            continue;
        }
        match parse_user_id(&row[0]) {
            Some(user_id) => punches.push(RawPunch::new(user_id, &row[1])),
            None => warn!(
                "Skipping device log line {}: invalid user id '{}'",
                line + 1,
                &row[0]
            ),
        }
    }

    info!("Read {} punches from device log", punches.len());
    Ok(punches)
}

/// Parses a headed CSV export with `User ID` and `Timestamp` columns.
/// Rows missing either cell, or with a non-numeric user id, are skipped.
pub fn read_csv_export<R: Read>(reader: R) -> Result<Vec<RawPunch>, AppError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    if headers.is_empty() {
        return Ok(Default::default());
    }
    let user_id_at = column_index(&headers, USER_ID_COLUMN)?;
    let timestamp_at = column_index(&headers, TIMESTAMP_COLUMN)?;

    let mut punches = Vec::new();
    for (index, row) in csv_reader.records().enumerate() {
        let row = row?;
        // Line numbers count the header.
        let line = index + 2;
        let (Some(raw_id), Some(timestamp)) = (row.get(user_id_at), row.get(timestamp_at)) else {
            warn!("Skipping punch export line {}: too few columns", line);
            continue;
        };
        match parse_user_id(raw_id) {
            Some(user_id) => punches.push(RawPunch::new(user_id, timestamp)),
            None => warn!(
                "Skipping punch export line {}: invalid user id '{}'",
                line, raw_id
            ),
        }
    }

    info!("Read {} punches from CSV export", punches.len());
    Ok(punches)
}
