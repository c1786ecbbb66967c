//! Maintenance events over time (scatter chart input and report summary)

use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::types::{MaintenanceStatus, SensorReading};

/// Display format for timestamps in the report summary.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub timestamp: NaiveDateTime,
    pub maintenance_required: MaintenanceStatus,
    pub failure_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScatterSummary {
    pub maintenance_required_count: usize,
    pub total_samples: usize,
    pub failure_type_distribution: BTreeMap<String, usize>,
    pub maintenance_required_at: Vec<String>,
}

pub fn scatter_points(rows: &[&SensorReading]) -> Vec<ScatterPoint> {
    rows.iter()
        .map(|r| ScatterPoint {
            timestamp: r.timestamp,
            maintenance_required: r.maintenance_required,
            failure_type: r.failure_type.clone(),
        })
        .collect()
}

pub fn summarize(rows: &[&SensorReading]) -> ScatterSummary {
    let mut summary = ScatterSummary {
        total_samples: rows.len(),
        ..Default::default()
    };
    for r in rows {
        *summary
            .failure_type_distribution
            .entry(r.failure_type.clone())
            .or_insert(0) += 1;
        if r.maintenance_required == MaintenanceStatus::Required {
            summary.maintenance_required_count += 1;
            summary
                .maintenance_required_at
                .push(r.timestamp.format(TIMESTAMP_FORMAT).to_string());
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn reading(minute: u32, status: MaintenanceStatus, failure: &str) -> SensorReading {
        SensorReading {
            timestamp: NaiveDate::from_ymd_opt(2025, 2, 3)
                .unwrap()
                .and_hms_opt(10, minute, 0)
                .unwrap(),
            machine_id: "M".into(),
            metrics: [None; 6],
            maintenance_required: status,
            failure_type: failure.into(),
        }
    }

    #[test]
    fn test_summary_counts() {
        let rows = [
            reading(0, MaintenanceStatus::Normal, "Normal"),
            reading(5, MaintenanceStatus::Required, "Bearing"),
            reading(9, MaintenanceStatus::Required, "Overheating"),
        ];
        let refs: Vec<&SensorReading> = rows.iter().collect();
        let s = summarize(&refs);
        assert_eq!(s.total_samples, 3);
        assert_eq!(s.maintenance_required_count, 2);
        assert_eq!(s.failure_type_distribution["Bearing"], 1);
        assert_eq!(s.failure_type_distribution["Normal"], 1);
        assert_eq!(
            s.maintenance_required_at,
            vec!["2025-02-03 10:05:00", "2025-02-03 10:09:00"]
        );
        assert_eq!(scatter_points(&refs).len(), 3);
    }

    #[test]
    fn test_empty_summary() {
        let s = summarize(&[]);
        assert_eq!(s, ScatterSummary::default());
    }
}
