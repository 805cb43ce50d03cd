// src/config.rs
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::PathBuf;

use crate::error::AppError;
use crate::policy::{
    parse_time_of_day, AttendancePolicy, DEFAULT_FULL_DAY_THRESHOLD_HOURS,
    DEFAULT_HALF_DAY_THRESHOLD_HOURS,
};

pub const ENV_PREFIX: &str = "ATTENDANCE_";

const DEFAULT_USER_DATABASE: &str = "user_database.csv";
const DEFAULT_OUTPUT_DIR: &str = "reports";

fn default_user_database() -> String {
    DEFAULT_USER_DATABASE.to_string()
}

fn default_output_dir() -> String {
    DEFAULT_OUTPUT_DIR.to_string()
}

fn default_half_day_threshold_hours() -> Decimal {
    DEFAULT_HALF_DAY_THRESHOLD_HOURS
}

fn default_full_day_threshold_hours() -> Decimal {
    DEFAULT_FULL_DAY_THRESHOLD_HOURS
}

// Settings read from `ATTENDANCE_*` environment variables (and `.env`).
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    // Inputs / outputs
    #[serde(default = "default_user_database")]
    pub user_database: String,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    // Attendance policy
    #[serde(default = "default_half_day_threshold_hours")]
    pub half_day_threshold_hours: Decimal,
    #[serde(default = "default_full_day_threshold_hours")]
    pub full_day_threshold_hours: Decimal,
    pub late_in_boundary: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        // Load .env file if it exists
        dotenv::dotenv().ok();

        Ok(envy::prefixed(ENV_PREFIX).from_env::<AppConfig>()?)
    }

    pub fn from_pairs<I>(pairs: I) -> Result<Self, AppError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Ok(envy::prefixed(ENV_PREFIX).from_iter(pairs)?)
    }

    pub fn user_database_path(&self) -> PathBuf {
        PathBuf::from(&self.user_database)
    }

    pub fn output_dir_path(&self) -> PathBuf {
        PathBuf::from(&self.output_dir)
    }

    /// Builds and validates the attendance policy described by this config.
    pub fn policy(&self) -> Result<AttendancePolicy, AppError> {
        let mut policy = AttendancePolicy {
            half_day_threshold_hours: self.half_day_threshold_hours,
            full_day_threshold_hours: self.full_day_threshold_hours,
            ..Default::default()
        };
        if let Some(boundary) = &self.late_in_boundary {
            policy.late_in_boundary = parse_time_of_day(boundary)?;
        }
        policy.validate()?;
        Ok(policy)
    }
}
