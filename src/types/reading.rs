//! Sensor reading record

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use super::{MaintenanceStatus, Metric};

/// One validated row of the sensor log.
///
/// Metric channels whose column is absent from the file, or whose cell is a
/// missing-value token, are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub timestamp: NaiveDateTime,
    pub machine_id: String,
    /// Indexed by `Metric::index()`
    pub metrics: [Option<f64>; 6],
    pub maintenance_required: MaintenanceStatus,
    /// `"Normal"` when absent
    pub failure_type: String,
}

impl SensorReading {
    pub fn metric(&self, metric: Metric) -> Option<f64> {
        self.metrics[metric.index()]
    }

    pub fn set_metric(&mut self, metric: Metric, value: Option<f64>) {
        self.metrics[metric.index()] = value;
    }

    /// Calendar date of the reading.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    /// Time of day of the reading.
    pub fn time(&self) -> NaiveTime {
        self.timestamp.time()
    }

    pub fn status(&self) -> MaintenanceStatus {
        self.maintenance_required
    }
}
