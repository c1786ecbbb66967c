//! Sensor log ingestion from CSV files
//!
//! The header row is validated once into a [`SensorSchema`]; every row is then
//! parsed against that schema into a typed [`SensorReading`]. Downstream code
//! never looks at raw columns.
//!
//! Expected columns:
//! `timestamp,machine_id,maintenance_required` (required), plus any of
//! `energy_consumption,humidity,pressure,temperature,vibration,predicted_remaining_life,failure_type`.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::types::{MaintenanceStatus, Metric, SensorReading, DEFAULT_FAILURE_TYPE};

const COL_TIMESTAMP: &str = "timestamp";
const COL_MACHINE_ID: &str = "machine_id";
const COL_MAINTENANCE_REQUIRED: &str = "maintenance_required";
const COL_FAILURE_TYPE: &str = "failure_type";

/// Cell contents treated as a missing value.
const MISSING_TOKENS: [&str; 7] = ["", "NaN", "nan", "NA", "N/A", "null", "None"];

/// Timestamp layouts tried in order before falling back to RFC 3339.
const TIMESTAMP_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

/// Errors that abort loading the whole file.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to open sensor log {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV error in {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("sensor log {} is missing required column '{column}'", .path.display())]
    MissingColumn { path: PathBuf, column: &'static str },
}

/// Errors that reject a single row. The row is skipped and loading continues.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RowError {
    #[error("row has no value for '{0}'")]
    MissingField(&'static str),
    #[error("unparseable timestamp '{0}'")]
    BadTimestamp(String),
    #[error("maintenance_required must be 0 or 1, got '{0}'")]
    BadStatus(String),
}

// ============================================================================
// Schema
// ============================================================================

/// Column layout of a sensor log, validated once from the header row.
#[derive(Debug, Clone)]
pub struct SensorSchema {
    timestamp: usize,
    machine_id: usize,
    maintenance_required: usize,
    metrics: [Option<usize>; 6],
    failure_type: Option<usize>,
}

impl SensorSchema {
    /// Validate a header row. Returns the name of the first missing required column.
    pub fn from_headers(headers: &StringRecord) -> Result<Self, &'static str> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);

        let timestamp = find(COL_TIMESTAMP).ok_or(COL_TIMESTAMP)?;
        let machine_id = find(COL_MACHINE_ID).ok_or(COL_MACHINE_ID)?;
        let maintenance_required =
            find(COL_MAINTENANCE_REQUIRED).ok_or(COL_MAINTENANCE_REQUIRED)?;

        let mut metrics = [None; 6];
        for metric in Metric::ALL {
            metrics[metric.index()] = find(metric.column());
        }

        Ok(Self {
            timestamp,
            machine_id,
            maintenance_required,
            metrics,
            failure_type: find(COL_FAILURE_TYPE),
        })
    }

    /// Schema with every optional column present, for readings built in code.
    pub fn full() -> Self {
        Self {
            timestamp: 0,
            machine_id: 1,
            maintenance_required: 2,
            metrics: [Some(3), Some(4), Some(5), Some(6), Some(7), Some(8)],
            failure_type: Some(9),
        }
    }

    pub fn has_metric(&self, metric: Metric) -> bool {
        self.metrics[metric.index()].is_some()
    }

    pub fn has_failure_type(&self) -> bool {
        self.failure_type.is_some()
    }

    /// Names of the optional columns found in the file.
    pub fn optional_columns(&self) -> Vec<&'static str> {
        let mut cols: Vec<&'static str> = Metric::ALL
            .iter()
            .filter(|m| self.has_metric(**m))
            .map(|m| m.column())
            .collect();
        if self.has_failure_type() {
            cols.push(COL_FAILURE_TYPE);
        }
        cols
    }

    /// Parse one data row against this schema.
    pub fn parse_record(&self, record: &StringRecord) -> Result<SensorReading, RowError> {
        let cell = |idx: usize| record.get(idx).map(str::trim).filter(|v| !is_missing(v));

        let raw_ts = cell(self.timestamp).ok_or(RowError::MissingField(COL_TIMESTAMP))?;
        let timestamp =
            parse_timestamp(raw_ts).ok_or_else(|| RowError::BadTimestamp(raw_ts.to_string()))?;

        let machine_id = cell(self.machine_id)
            .ok_or(RowError::MissingField(COL_MACHINE_ID))?
            .to_string();

        let raw_status = cell(self.maintenance_required)
            .ok_or(RowError::MissingField(COL_MAINTENANCE_REQUIRED))?;
        let maintenance_required = MaintenanceStatus::parse(raw_status)
            .ok_or_else(|| RowError::BadStatus(raw_status.to_string()))?;

        let mut metrics = [None; 6];
        for metric in Metric::ALL {
            metrics[metric.index()] = self.metrics[metric.index()]
                .and_then(cell)
                .and_then(|v| match v.parse::<f64>() {
                    Ok(x) if x.is_finite() => Some(x),
                    _ => {
                        debug!(column = metric.column(), value = v, "Non-numeric metric treated as missing");
                        None
                    }
                });
        }

        let failure_type = self
            .failure_type
            .and_then(cell)
            .unwrap_or(DEFAULT_FAILURE_TYPE)
            .to_string();

        Ok(SensorReading {
            timestamp,
            machine_id,
            metrics,
            maintenance_required,
            failure_type,
        })
    }
}

fn is_missing(value: &str) -> bool {
    MISSING_TOKENS.contains(&value)
}

/// Parse a timestamp cell into a naive date-time.
///
/// Zoned RFC 3339 values are converted to UTC and the zone dropped. A bare
/// date is taken as midnight.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    for fmt in TIMESTAMP_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(ts);
        }
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.naive_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

// ============================================================================
// Sensor Log
// ============================================================================

/// Summary of one machine's readings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MachineSummary {
    pub machine_id: String,
    pub readings: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
}

/// The fully loaded sensor log, sorted ascending by timestamp.
#[derive(Debug, Clone)]
pub struct SensorLog {
    source: PathBuf,
    schema: SensorSchema,
    readings: Vec<SensorReading>,
    skipped_rows: usize,
}

impl SensorLog {
    /// Load a sensor log from a CSV file.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let file = File::open(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let log = Self::from_reader(file, path)?;
        info!(
            path = %path.display(),
            readings = log.readings.len(),
            skipped = log.skipped_rows,
            machines = log.machines().len(),
            "Loaded sensor log"
        );
        Ok(log)
    }

    /// Parse CSV from any reader. `source` is only used for error messages.
    pub fn from_reader<R: Read>(reader: R, source: &Path) -> Result<Self, LoadError> {
        let mut csv_reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|e| LoadError::Csv {
                path: source.to_path_buf(),
                source: e,
            })?
            .clone();

        let schema = SensorSchema::from_headers(&headers).map_err(|column| {
            LoadError::MissingColumn {
                path: source.to_path_buf(),
                column,
            }
        })?;

        let mut readings = Vec::new();
        let mut skipped_rows = 0;

        for (i, result) in csv_reader.records().enumerate() {
            // +2: one for the header, one for 1-based line numbers
            let line = i + 2;
            let record = match result {
                Ok(r) => r,
                Err(e) => {
                    warn!(line, error = %e, "Error reading CSV row");
                    skipped_rows += 1;
                    continue;
                }
            };
            if record.iter().all(str::is_empty) {
                continue;
            }
            match schema.parse_record(&record) {
                Ok(reading) => readings.push(reading),
                Err(e) => {
                    warn!(line, error = %e, "Skipping invalid sensor row");
                    skipped_rows += 1;
                }
            }
        }

        readings.sort_by_key(|r| r.timestamp);

        Ok(Self {
            source: source.to_path_buf(),
            schema,
            readings,
            skipped_rows,
        })
    }

    /// Build a log from readings constructed in code. All optional columns
    /// are considered present.
    pub fn from_readings(mut readings: Vec<SensorReading>) -> Self {
        readings.sort_by_key(|r| r.timestamp);
        Self {
            source: PathBuf::from("<memory>"),
            schema: SensorSchema::full(),
            readings,
            skipped_rows: 0,
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn schema(&self) -> &SensorSchema {
        &self.schema
    }

    pub fn readings(&self) -> &[SensorReading] {
        &self.readings
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }

    /// Distinct machine ids in sorted order.
    pub fn machines(&self) -> Vec<String> {
        self.readings
            .iter()
            .map(|r| r.machine_id.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    pub fn has_machine(&self, machine_id: &str) -> bool {
        self.readings.iter().any(|r| r.machine_id == machine_id)
    }

    /// Every reading for one machine, ascending by timestamp.
    pub fn machine_history<'a>(
        &'a self,
        machine_id: &'a str,
    ) -> impl Iterator<Item = &'a SensorReading> + 'a {
        self.readings.iter().filter(move |r| r.machine_id == machine_id)
    }

    /// First and last observed calendar date for one machine.
    pub fn date_bounds(&self, machine_id: &str) -> Option<(NaiveDate, NaiveDate)> {
        let mut history = self.machine_history(machine_id);
        let first = history.next()?.date();
        let last = history.last().map_or(first, SensorReading::date);
        Some((first, last))
    }

    /// Per-machine reading counts and date bounds.
    pub fn machine_summaries(&self) -> Vec<MachineSummary> {
        self.machines()
            .into_iter()
            .filter_map(|machine_id| {
                let (first_date, last_date) = self.date_bounds(&machine_id)?;
                let readings = self.machine_history(&machine_id).count();
                Some(MachineSummary {
                    machine_id,
                    readings,
                    first_date,
                    last_date,
                })
            })
            .collect()
    }
}
