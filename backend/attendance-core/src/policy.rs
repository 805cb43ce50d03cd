// src/policy.rs
use chrono::NaiveTime;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use std::fmt;

use crate::error::AppError;

// --- Short Leave Windows ---
//
// Window (a): late arrival, in at [10:46, late_in_boundary] and out at or after 19:00.
// Window (b): slightly late arrival, in at [10:20, 10:46) and out at [18:00, 18:30].

const LATE_IN_START: (u32, u32) = (10, 46);
const LATE_IN_REQUIRED_OUT: (u32, u32) = (19, 0);
const EARLY_IN_START: (u32, u32) = (10, 20);
const EARLY_OUT_START: (u32, u32) = (18, 0);
const EARLY_OUT_END: (u32, u32) = (18, 30);

pub const DEFAULT_HALF_DAY_THRESHOLD_HOURS: Decimal = dec!(4.0);
pub const DEFAULT_FULL_DAY_THRESHOLD_HOURS: Decimal = dec!(7.0);
const DEFAULT_LATE_IN_BOUNDARY: (u32, u32) = (11, 40);

fn hm(hour_minute: (u32, u32)) -> NaiveTime {
    // The window constants are all valid wall-clock times.
    NaiveTime::from_hms_opt(hour_minute.0, hour_minute.1, 0).unwrap_or(NaiveTime::MIN)
}

/// Parses `HH:MM` or `HH:MM:SS`.
pub fn parse_time_of_day(raw: &str) -> Result<NaiveTime, AppError> {
    let trimmed = raw.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
        .map_err(|_| AppError::InvalidTime(raw.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AttendanceStatus {
    #[serde(rename = "Leave")]
    Leave,
    #[serde(rename = "Half Day")]
    HalfDay,
    #[serde(rename = "Full Day")]
    FullDay,
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AttendanceStatus::Leave => "Leave",
            AttendanceStatus::HalfDay => "Half Day",
            AttendanceStatus::FullDay => "Full Day",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ShortLeave {
    Yes,
    No,
}

impl ShortLeave {
    pub fn is_yes(&self) -> bool {
        matches!(self, ShortLeave::Yes)
    }
}

impl From<bool> for ShortLeave {
    fn from(flag: bool) -> Self {
        if flag {
            ShortLeave::Yes
        } else {
            ShortLeave::No
        }
    }
}

impl fmt::Display for ShortLeave {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.is_yes() { "Yes" } else { "No" })
    }
}

/// Tunable rules used to classify a day. Deployments have disagreed on the
/// half/full boundary (7.0, 7.2, 7.5) and the late-in boundary (11:40, 11:59),
/// so both are configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendancePolicy {
    pub half_day_threshold_hours: Decimal,
    pub full_day_threshold_hours: Decimal,
    pub late_in_boundary: NaiveTime,
}

impl Default for AttendancePolicy {
    fn default() -> Self {
        Self {
            half_day_threshold_hours: DEFAULT_HALF_DAY_THRESHOLD_HOURS,
            full_day_threshold_hours: DEFAULT_FULL_DAY_THRESHOLD_HOURS,
            late_in_boundary: hm(DEFAULT_LATE_IN_BOUNDARY),
        }
    }
}

impl AttendancePolicy {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.half_day_threshold_hours.is_sign_negative() {
            return Err(AppError::InvalidPolicy(format!(
                "half day threshold must not be negative (got {})",
                self.half_day_threshold_hours
            )));
        }
        if self.full_day_threshold_hours < self.half_day_threshold_hours {
            return Err(AppError::InvalidPolicy(format!(
                "full day threshold {} is below half day threshold {}",
                self.full_day_threshold_hours, self.half_day_threshold_hours
            )));
        }
        if self.late_in_boundary < hm(LATE_IN_START) {
            return Err(AppError::InvalidPolicy(format!(
                "late-in boundary {} is before the window start {}",
                self.late_in_boundary,
                hm(LATE_IN_START)
            )));
        }
        Ok(())
    }

    pub fn classify_status(&self, worked_hours: Decimal) -> AttendanceStatus {
        if worked_hours < self.half_day_threshold_hours {
            AttendanceStatus::Leave
        } else if worked_hours < self.full_day_threshold_hours {
            AttendanceStatus::HalfDay
        } else {
            AttendanceStatus::FullDay
        }
    }

    /// Only the time of day is compared; the dates of the punches are ignored.
    pub fn short_leave(&self, in_time: NaiveTime, out_time: NaiveTime) -> ShortLeave {
        let late_in = (hm(LATE_IN_START)..=self.late_in_boundary).contains(&in_time)
            && out_time >= hm(LATE_IN_REQUIRED_OUT);
        let early_out = (hm(EARLY_IN_START)..hm(LATE_IN_START)).contains(&in_time)
            && (hm(EARLY_OUT_START)..=hm(EARLY_OUT_END)).contains(&out_time);
        ShortLeave::from(late_in || early_out)
    }
}
