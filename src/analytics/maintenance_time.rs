//! Elapsed-time attribution between maintenance status transitions
//!
//! Walks one machine's full history (NOT narrowed by the display filter) in
//! ascending timestamp order, attributes to each row the minutes elapsed since
//! the last in-window normal row, and sums those minutes per
//! `(status, failure_type)` bucket over in-window rows.
//!
//! Attribution rules for a row at `now`:
//!
//! | status | previous status | last normal set | in window | value                  |
//! |--------|-----------------|-----------------|-----------|------------------------|
//! | 1      | 0               | yes             | yes       | `now - last_normal`    |
//! | 0      | any             | yes             | yes       | `now - last_normal`    |
//! | other  |                 |                 |           | 0                      |
//!
//! After the value is computed, an in-window normal row becomes the new
//! `last_normal`. `previous_status` is updated for every row, in window or not.
//!
//! Each normal row closes the gap since the previous normal row, so time can
//! be attributed to more than one bucket across normal/fail/normal cycles.
//! That is the reporting convention of the dashboard and is kept as is.

use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::filter::TimeWindow;
use crate::types::{MaintenanceStatus, SensorReading};

/// Per-row attribution result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributedRow {
    pub timestamp: NaiveDateTime,
    pub status: MaintenanceStatus,
    pub failure_type: String,
    pub in_window: bool,
    pub elapsed_minutes: f64,
}

/// One bar-chart record: total minutes for a `(status, failure_type)` bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaintenanceTimeRecord {
    #[serde(skip)]
    pub status: MaintenanceStatus,
    /// Bucket label, e.g. `"maintenance required"`
    pub maintenance_required: &'static str,
    pub failure_type: String,
    pub diff_minutes: f64,
}

/// Scan state carried from row to row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ElapsedTracker {
    last_normal: Option<NaiveDateTime>,
    previous_status: Option<MaintenanceStatus>,
}

impl ElapsedTracker {
    pub const fn new() -> Self {
        Self {
            last_normal: None,
            previous_status: None,
        }
    }

    /// Advance by one row and return the minutes attributed to it.
    pub fn step(&mut self, now: NaiveDateTime, status: MaintenanceStatus, in_window: bool) -> f64 {
        let elapsed = match (status, self.last_normal) {
            (MaintenanceStatus::Required, Some(last))
                if in_window && self.previous_status == Some(MaintenanceStatus::Normal) =>
            {
                minutes_between(last, now)
            }
            (MaintenanceStatus::Normal, Some(last)) if in_window => minutes_between(last, now),
            _ => 0.0,
        };

        if status == MaintenanceStatus::Normal && in_window {
            self.last_normal = Some(now);
        }
        self.previous_status = Some(status);

        elapsed
    }

    /// Timestamp of the most recent in-window normal row.
    pub const fn last_normal(&self) -> Option<NaiveDateTime> {
        self.last_normal
    }

    /// Status of the most recently stepped row.
    pub const fn previous_status(&self) -> Option<MaintenanceStatus> {
        self.previous_status
    }
}

fn minutes_between(from: NaiveDateTime, to: NaiveDateTime) -> f64 {
    let elapsed = to - from;
    match elapsed.num_microseconds() {
        Some(us) => us as f64 / 60_000_000.0,
        None => elapsed.num_milliseconds() as f64 / 60_000.0,
    }
}

/// Tag every row with its window membership and attributed minutes.
///
/// `history` must be one machine's readings in ascending timestamp order.
pub fn attribute_elapsed<'a, I>(history: I, window: &TimeWindow) -> Vec<AttributedRow>
where
    I: IntoIterator<Item = &'a SensorReading>,
{
    let mut tracker = ElapsedTracker::new();
    history
        .into_iter()
        .map(|reading| {
            let in_window = window.contains(reading.timestamp);
            let elapsed_minutes = tracker.step(reading.timestamp, reading.maintenance_required, in_window);
            AttributedRow {
                timestamp: reading.timestamp,
                status: reading.maintenance_required,
                failure_type: reading.failure_type.clone(),
                in_window,
                elapsed_minutes,
            }
        })
        .collect()
}

/// Sum attributed minutes per `(status, failure_type)` over in-window rows.
///
/// Buckets are ordered by status (normal first), then failure type. A bucket
/// with in-window rows but zero minutes is still emitted.
pub fn aggregate(rows: &[AttributedRow]) -> Vec<MaintenanceTimeRecord> {
    let mut buckets: BTreeMap<(MaintenanceStatus, &str), f64> = BTreeMap::new();
    for row in rows.iter().filter(|r| r.in_window) {
        *buckets
            .entry((row.status, row.failure_type.as_str()))
            .or_insert(0.0) += row.elapsed_minutes;
    }

    buckets
        .into_iter()
        .map(|((status, failure_type), diff_minutes)| MaintenanceTimeRecord {
            status,
            maintenance_required: status.bucket_label(),
            failure_type: failure_type.to_string(),
            diff_minutes,
        })
        .collect()
}

/// Attribute and aggregate in one call.
pub fn maintenance_time_by_status<'a, I>(history: I, window: &TimeWindow) -> Vec<MaintenanceTimeRecord>
where
    I: IntoIterator<Item = &'a SensorReading>,
{
    aggregate(&attribute_elapsed(history, window))
}
