// src/reconciler.rs
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::normalizer::{PunchEvent, UserId};
use crate::policy::{AttendancePolicy, AttendanceStatus, ShortLeave};

pub const SINGLE_ENTRY_REMARK: &str = "Supervision Required - Single Entry";

const MILLIS_PER_HOUR: Decimal = dec!(3600000);

// --- Result Rows ---
//
// Field order and serde names are the column contract of the
// "Processed Attendance" and "Summary" exports.

/// One reconciled day for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendanceRecord {
    #[serde(rename = "Serial No")]
    pub serial_no: usize,
    #[serde(rename = "User ID")]
    pub user_id: UserId,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Day")]
    pub day: String,
    #[serde(rename = "In Time")]
    pub in_time: NaiveTime,
    #[serde(rename = "Out Time")]
    pub out_time: NaiveTime,
    #[serde(rename = "Working Hours")]
    pub worked_hours: Decimal,
    #[serde(rename = "Attendance Status")]
    pub status: AttendanceStatus,
    #[serde(rename = "Short Leave")]
    pub short_leave: ShortLeave,
    #[serde(rename = "Remarks")]
    pub remarks: String,
}

impl AttendanceRecord {
    pub fn is_single_entry(&self) -> bool {
        self.remarks == SINGLE_ENTRY_REMARK
    }
}

/// Per-user totals over the reconciled month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlySummary {
    #[serde(rename = "Serial No")]
    pub serial_no: usize,
    #[serde(rename = "User ID")]
    pub user_id: UserId,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Full Days")]
    pub full_days: u32,
    #[serde(rename = "Half Days")]
    pub half_days: u32,
    #[serde(rename = "Short Leaves")]
    pub short_leaves: u32,
    #[serde(rename = "Total Working Days")]
    pub total_working_days: Decimal,
    #[serde(rename = "Remarks")]
    pub remarks: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reconciliation {
    pub records: Vec<AttendanceRecord>,
    pub summaries: Vec<MonthlySummary>,
}

// --- Day Grouping ---

/// All punches of one user on one calendar date, ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
struct DayGroup {
    user_id: UserId,
    date: NaiveDate,
    punches: Vec<NaiveDateTime>,
}

impl DayGroup {
    fn start(event: &PunchEvent) -> Self {
        Self {
            user_id: event.user_id,
            date: event.timestamp.date(),
            punches: vec![event.timestamp],
        }
    }

    fn accepts(&self, event: &PunchEvent) -> bool {
        self.user_id == event.user_id && self.date == event.timestamp.date()
    }

    fn in_time(&self) -> NaiveDateTime {
        self.punches[0]
    }

    fn out_time(&self) -> NaiveDateTime {
        self.punches[self.punches.len() - 1]
    }

    fn is_single_entry(&self) -> bool {
        self.punches.len() == 1
    }

    /// Unrounded; only the record's displayed value is rounded.
    fn worked_hours(&self) -> Decimal {
        if self.is_single_entry() {
            return Decimal::ZERO;
        }
        let millis = (self.out_time() - self.in_time()).num_milliseconds();
        Decimal::from(millis) / MILLIS_PER_HOUR
    }
}

/// Rounds the exact decimal half-to-even to two places and pads the scale so
/// every value renders with two decimals.
fn round_hundredths(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp(2);
    rounded.rescale(2);
    rounded
}

/// Events must already be sorted by `(user_id, timestamp)`.
fn group_by_day(sorted: &[PunchEvent]) -> Vec<DayGroup> {
    let mut groups: Vec<DayGroup> = Vec::new();
    for event in sorted {
        match groups.last_mut() {
            Some(group) if group.accepts(event) => group.punches.push(event.timestamp),
            _ => groups.push(DayGroup::start(event)),
        }
    }
    groups
}

fn build_record(
    serial_no: usize,
    group: &DayGroup,
    names: &HashMap<UserId, String>,
    policy: &AttendancePolicy,
) -> AttendanceRecord {
    let in_time = group.in_time();
    let out_time = group.out_time();
    let worked_hours = group.worked_hours();

    let remarks = if group.is_single_entry() {
        SINGLE_ENTRY_REMARK.to_string()
    } else {
        String::new()
    };

    AttendanceRecord {
        serial_no,
        user_id: group.user_id,
        name: names.get(&group.user_id).cloned().unwrap_or_default(),
        date: group.date,
        day: in_time.format("%A").to_string(),
        in_time: in_time.time(),
        out_time: out_time.time(),
        worked_hours: round_hundredths(worked_hours),
        status: policy.classify_status(worked_hours),
        short_leave: policy.short_leave(in_time.time(), out_time.time()),
        remarks,
    }
}

// --- Monthly Summary ---

/// `full + half/2 - (short - 2)/4`, rounded to two places. Not clamped: many
/// short leaves can push it below zero.
pub fn total_working_days(full_days: u32, half_days: u32, short_leaves: u32) -> Decimal {
    let full = Decimal::from(full_days);
    let half = Decimal::from(half_days);
    let short = Decimal::from(short_leaves);
    round_hundredths(full + half / dec!(2) - (short - dec!(2)) / dec!(4))
}

/// Builds one summary per user, in order of the user's first record.
pub fn summarize(records: &[AttendanceRecord]) -> Vec<MonthlySummary> {
    let mut order: Vec<UserId> = Vec::new();
    let mut by_user: HashMap<UserId, Vec<&AttendanceRecord>> = HashMap::new();
    for record in records {
        by_user
            .entry(record.user_id)
            .or_insert_with(|| {
                order.push(record.user_id);
                Vec::new()
            })
            .push(record);
    }

    order
        .iter()
        .enumerate()
        .map(|(index, user_id)| {
            let user_records = by_user.get(user_id).map(Vec::as_slice).unwrap_or_default();
            let full_days = user_records
                .iter()
                .filter(|r| r.status == AttendanceStatus::FullDay)
                .count() as u32;
            let half_days = user_records
                .iter()
                .filter(|r| r.status == AttendanceStatus::HalfDay)
                .count() as u32;
            let short_leaves = user_records
                .iter()
                .filter(|r| r.short_leave.is_yes())
                .count() as u32;
            let has_single_entry = user_records.iter().any(|r| r.is_single_entry());

            MonthlySummary {
                serial_no: index + 1,
                user_id: *user_id,
                name: user_records
                    .first()
                    .map(|r| r.name.clone())
                    .unwrap_or_default(),
                full_days,
                half_days,
                short_leaves,
                total_working_days: total_working_days(full_days, half_days, short_leaves),
                remarks: if has_single_entry {
                    SINGLE_ENTRY_REMARK.to_string()
                } else {
                    String::new()
                },
            }
        })
        .collect()
}

// --- Reconciliation ---

/// Reconstructs daily attendance and monthly summaries from normalized
/// punches. Returns `None` when there is nothing to reconcile.
pub fn reconcile(
    events: &[PunchEvent],
    names: &HashMap<UserId, String>,
    policy: &AttendancePolicy,
) -> Option<Reconciliation> {
    if events.is_empty() {
        debug!("No punch events to reconcile");
        return None;
    }

    let mut sorted = events.to_vec();
    sorted.sort_by_key(|event| (event.user_id, event.timestamp));

    let groups = group_by_day(&sorted);
    let records: Vec<AttendanceRecord> = groups
        .iter()
        .enumerate()
        .map(|(index, group)| build_record(index + 1, group, names, policy))
        .collect();
    let summaries = summarize(&records);

    info!(
        "Reconciled {} punches into {} day records for {} users",
        events.len(),
        records.len(),
        summaries.len()
    );

    Some(Reconciliation { records, summaries })
}
