//! Machine / date / time-of-day selection
//!
//! Two membership tests exist and they are intentionally different:
//!
//! - [`FilterSelection::matches`] is the display filter: the reading's date is in
//!   the date range AND its time of day is in the time range, independently.
//! - [`TimeWindow::contains`] is a single datetime comparison between
//!   `start_date + start_time` and `end_date + end_time`. Only the
//!   maintenance-time aggregation uses it.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::sensors::SensorLog;
use crate::types::SensorReading;

/// Raw, possibly partial selection as received from the API or CLI.
///
/// Times are `HH:MM` strings; seconds, if given, are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct FilterQuery {
    #[serde(default)]
    pub machine: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    #[error("sensor log contains no readings")]
    EmptyLog,
    #[error("unknown machine '{0}'")]
    UnknownMachine(String),
    #[error("invalid time of day '{0}' (expected HH:MM)")]
    BadTime(String),
    #[error("{what} range is inverted: {start} > {end}")]
    InvertedRange {
        what: &'static str,
        start: String,
        end: String,
    },
}

/// Inclusive datetime window used for in-window tagging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeWindow {
    pub const fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// `start <= ts <= end`
    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        self.start <= ts && ts <= self.end
    }
}

/// Fully resolved selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    pub machine_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

/// Default start of the time-of-day range.
pub fn day_start() -> NaiveTime {
    NaiveTime::MIN
}

/// Default end of the time-of-day range (23:59, minute granularity).
pub fn day_end() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 0).unwrap_or(NaiveTime::MIN)
}

/// Parse `HH:MM` (or `HH:MM:SS`, truncated to the minute).
pub fn parse_hm(raw: &str) -> Result<NaiveTime, FilterError> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .ok_or_else(|| FilterError::BadTime(raw.to_string()))
}

impl FilterSelection {
    /// Resolve a partial query against the loaded log.
    ///
    /// - machine defaults to the first machine id in sorted order
    /// - dates default to the machine's observed bounds; explicit dates are
    ///   clamped into those bounds
    /// - times default to 00:00 ~ 23:59
    pub fn resolve(log: &SensorLog, query: &FilterQuery) -> Result<Self, FilterError> {
        let machine_id = match &query.machine {
            Some(m) if log.has_machine(m) => m.clone(),
            Some(m) => return Err(FilterError::UnknownMachine(m.clone())),
            None => log
                .machines()
                .into_iter()
                .next()
                .ok_or(FilterError::EmptyLog)?,
        };

        let (min_date, max_date) = log
            .date_bounds(&machine_id)
            .ok_or_else(|| FilterError::UnknownMachine(machine_id.clone()))?;

        let start_date = query.start_date.unwrap_or(min_date).clamp(min_date, max_date);
        let end_date = query.end_date.unwrap_or(max_date).clamp(min_date, max_date);
        if query.start_date.is_some_and(|d| d != start_date)
            || query.end_date.is_some_and(|d| d != end_date)
        {
            debug!(%min_date, %max_date, "Requested dates clamped to observed range");
        }

        let start_time = query.start_time.as_deref().map(parse_hm).transpose()?.unwrap_or_else(day_start);
        let end_time = query.end_time.as_deref().map(parse_hm).transpose()?.unwrap_or_else(day_end);

        let selection = Self {
            machine_id,
            start_date,
            end_date,
            start_time,
            end_time,
        };
        selection.check_ranges()?;
        Ok(selection)
    }

    fn check_ranges(&self) -> Result<(), FilterError> {
        if self.start_date > self.end_date {
            return Err(FilterError::InvertedRange {
                what: "date",
                start: self.start_date.to_string(),
                end: self.end_date.to_string(),
            });
        }
        if self.start_time > self.end_time {
            return Err(FilterError::InvertedRange {
                what: "time",
                start: self.start_time.format("%H:%M").to_string(),
                end: self.end_time.format("%H:%M").to_string(),
            });
        }
        Ok(())
    }

    /// Combined datetime window (`start_date start_time` to `end_date end_time`).
    pub fn window(&self) -> TimeWindow {
        TimeWindow::new(
            self.start_date.and_time(self.start_time),
            self.end_date.and_time(self.end_time),
        )
    }

    /// Display filter: machine, date range and time-of-day range.
    pub fn matches(&self, reading: &SensorReading) -> bool {
        let date = reading.date();
        let time = reading.time();
        reading.machine_id == self.machine_id
            && self.start_date <= date
            && date <= self.end_date
            && self.start_time <= time
            && time <= self.end_time
    }

    /// Readings passing the display filter, ascending by timestamp.
    pub fn apply<'a>(&self, log: &'a SensorLog) -> Vec<&'a SensorReading> {
        log.readings().iter().filter(|r| self.matches(r)).collect()
    }

    /// `"2025-01-01 ~ 2025-01-31"`
    pub fn date_label(&self) -> String {
        format!("{} ~ {}", self.start_date, self.end_date)
    }

    /// `"00:00 ~ 23:59"`
    pub fn time_label(&self) -> String {
        format!(
            "{} ~ {}",
            self.start_time.format("%H:%M"),
            self.end_time.format("%H:%M")
        )
    }
}
