// src/normalizer.rs
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::fmt;
use tracing::{debug, info, warn};

use crate::error::AppError;

pub type UserId = u64;

// Formats accepted for punch timestamps, tried in order after RFC 3339.
// `%.f` also matches a missing fraction. Slash dates with the year last are
// month-first, as spreadsheet CSV exports write them.
const TIMESTAMP_FORMATS: [&str; 8] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// A punch as delivered by a punch source, timestamp still unparsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPunch {
    pub user_id: UserId,
    pub timestamp: String,
}

impl RawPunch {
    pub fn new(user_id: UserId, timestamp: impl Into<String>) -> Self {
        Self {
            user_id,
            timestamp: timestamp.into(),
        }
    }
}

/// A validated punch inside the reporting period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PunchEvent {
    pub user_id: UserId,
    pub timestamp: NaiveDateTime,
}

/// The calendar month being reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ReportingPeriod {
    year: i32,
    month: u32,
}

impl ReportingPeriod {
    pub fn new(year: i32, month: u32) -> Result<Self, AppError> {
        if !(1..=12).contains(&month) || NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(AppError::InvalidPeriod { year, month });
        }
        Ok(Self { year, month })
    }

    /// The calendar month immediately before the month containing `today`.
    pub fn preceding(today: NaiveDate) -> Self {
        let (year, month) = if today.month() > 1 {
            (today.year(), today.month() - 1)
        } else {
            (today.year() - 1, 12)
        };
        Self { year, month }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn contains(&self, timestamp: &NaiveDateTime) -> bool {
        timestamp.year() == self.year && timestamp.month() == self.month
    }
}

impl fmt::Display for ReportingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match NaiveDate::from_ymd_opt(self.year, self.month, 1) {
            Some(first) => write!(f, "{}", first.format("%B %Y")),
            None => write!(f, "{}-{:02}", self.year, self.month),
        }
    }
}

/// Parses a punch timestamp. Offsets are discarded; the device's wall-clock
/// time is what attendance rules compare against.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(with_offset) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(with_offset.naive_local());
    }

    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
}

/// Drops punches with unparseable timestamps and punches outside `period`.
/// Input order is preserved.
pub fn normalize(punches: &[RawPunch], period: ReportingPeriod) -> Vec<PunchEvent> {
    let mut malformed = 0usize;
    let mut out_of_period = 0usize;

    let events: Vec<PunchEvent> = punches
        .iter()
        .filter_map(|punch| {
            let Some(timestamp) = parse_timestamp(&punch.timestamp) else {
                debug!(
                    "Dropping punch for user {}: unparseable timestamp '{}'",
                    punch.user_id, punch.timestamp
                );
                malformed += 1;
                return None;
            };
            if !period.contains(&timestamp) {
                out_of_period += 1;
                return None;
            }
            Some(PunchEvent {
                user_id: punch.user_id,
                timestamp,
            })
        })
        .collect();

    if malformed > 0 {
        warn!("Dropped {} punches with malformed timestamps", malformed);
    }
    info!(
        "Normalized {} punches for {}: kept {}, outside period {}, malformed {}",
        punches.len(),
        period,
        events.len(),
        out_of_period,
        malformed
    );

    events
}
