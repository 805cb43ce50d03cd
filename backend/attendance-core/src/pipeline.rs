// src/pipeline.rs
use serde::Serialize;
use std::collections::HashMap;
use tracing::{info, warn};

use crate::normalizer::{normalize, RawPunch, ReportingPeriod, UserId};
use crate::policy::AttendancePolicy;
use crate::reconciler::{reconcile, AttendanceRecord, MonthlySummary, Reconciliation};

/// The reconciled month handed to exporters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendanceReport {
    pub period: ReportingPeriod,
    pub records: Vec<AttendanceRecord>,
    pub summaries: Vec<MonthlySummary>,
}

/// Either a report or the designed early exit for an empty period. Callers
/// branch on this; it is not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportOutcome {
    NoDataForPeriod(ReportingPeriod),
    Report(AttendanceReport),
}

/// Normalizes raw punches to `period` and reconciles what remains.
pub fn process_attendance(
    punches: &[RawPunch],
    period: ReportingPeriod,
    names: &HashMap<UserId, String>,
    policy: &AttendancePolicy,
) -> ReportOutcome {
    info!(
        "Processing {} raw punches for {} ({} known users)",
        punches.len(),
        period,
        names.len()
    );

    let events = normalize(punches, period);
    if events.is_empty() {
        warn!("No punches found for {}", period);
        return ReportOutcome::NoDataForPeriod(period);
    }

    match reconcile(&events, names, policy) {
        Some(Reconciliation { records, summaries }) => ReportOutcome::Report(AttendanceReport {
            period,
            records,
            summaries,
        }),
        None => ReportOutcome::NoDataForPeriod(period),
    }
}
