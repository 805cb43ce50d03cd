// src/lib.rs
//! Reconciles raw time-clock punches into daily attendance records and
//! per-user monthly summaries.

pub mod config;
pub mod error;
pub mod normalizer;
pub mod pipeline;
pub mod policy;
pub mod punch_source;
pub mod reconciler;
pub mod report_export;
pub mod user_directory;

mod pipeline_tests;

pub use error::AppError;
pub use normalizer::{normalize, PunchEvent, RawPunch, ReportingPeriod, UserId};
pub use pipeline::{process_attendance, AttendanceReport, ReportOutcome};
pub use policy::{AttendancePolicy, AttendanceStatus, ShortLeave};
pub use reconciler::{reconcile, AttendanceRecord, MonthlySummary, Reconciliation};
