//! Predicted remaining life gauge

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::config::GaugeConfig;
use crate::types::{Metric, SensorReading};

/// Health band of the remaining-life value. Only selects the display color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GaugeLevel {
    Critical,
    Healthy,
}

impl GaugeLevel {
    /// CSS color name of the gauge bar.
    pub const fn color_name(self) -> &'static str {
        match self {
            Self::Critical => "red",
            Self::Healthy => "limegreen",
        }
    }

    /// RGB of the gauge bar.
    pub const fn rgb(self) -> (u8, u8, u8) {
        match self {
            Self::Critical => (255, 0, 0),
            Self::Healthy => (50, 205, 50),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GaugeReading {
    pub value: f64,
    pub level: GaugeLevel,
    pub color: &'static str,
    /// Upper end of the gauge axis (lower end is 0)
    pub axis_max: f64,
    pub timestamp: NaiveDateTime,
}

/// `Critical` when `value <= threshold` (inclusive), otherwise `Healthy`.
pub fn classify(value: f64, threshold: f64) -> GaugeLevel {
    if value <= threshold {
        GaugeLevel::Critical
    } else {
        GaugeLevel::Healthy
    }
}

/// Latest present `predicted_remaining_life` in `rows` (ascending by timestamp).
pub fn select_gauge(rows: &[&SensorReading], config: &GaugeConfig) -> Option<GaugeReading> {
    let (timestamp, value) = rows.iter().rev().find_map(|r| {
        r.metric(Metric::PredictedRemainingLife)
            .map(|v| (r.timestamp, v))
    })?;
    let level = classify(value, config.critical_threshold);
    Some(GaugeReading {
        value,
        level,
        color: level.color_name(),
        axis_max: config.max_value,
        timestamp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MaintenanceStatus;
    use chrono::NaiveDate;

    fn reading(minute: u32, life: Option<f64>) -> SensorReading {
        let mut r = SensorReading {
            timestamp: NaiveDate::from_ymd_opt(2025, 1, 1)
                .unwrap()
                .and_hms_opt(0, minute, 0)
                .unwrap(),
            machine_id: "M".into(),
            metrics: [None; 6],
            maintenance_required: MaintenanceStatus::Normal,
            failure_type: "Normal".into(),
        };
        r.set_metric(Metric::PredictedRemainingLife, life);
        r
    }

    #[test]
    fn test_boundary_is_critical() {
        assert_eq!(classify(100.0, 100.0), GaugeLevel::Critical);
        assert_eq!(classify(100.01, 100.0), GaugeLevel::Healthy);
        assert_eq!(classify(0.0, 100.0), GaugeLevel::Critical);
    }

    #[test]
    fn test_selects_latest_present_value() {
        let rows = [reading(0, Some(300.0)), reading(1, Some(80.0)), reading(2, None)];
        let refs: Vec<&SensorReading> = rows.iter().collect();
        let gauge = select_gauge(&refs, &GaugeConfig::default()).unwrap();
        assert_eq!(gauge.value, 80.0);
        assert_eq!(gauge.level, GaugeLevel::Critical);
        assert_eq!(gauge.color, "red");
        assert_eq!(gauge.axis_max, 500.0);
        assert_eq!(gauge.timestamp, rows[1].timestamp);
    }

    #[test]
    fn test_value_outside_axis_is_kept() {
        let rows = [reading(0, Some(742.5))];
        let refs: Vec<&SensorReading> = rows.iter().collect();
        let gauge = select_gauge(&refs, &GaugeConfig::default()).unwrap();
        assert_eq!(gauge.value, 742.5);
        assert_eq!(gauge.level, GaugeLevel::Healthy);
    }

    #[test]
    fn test_no_value_is_none() {
        let rows = [reading(0, None)];
        let refs: Vec<&SensorReading> = rows.iter().collect();
        assert!(select_gauge(&refs, &GaugeConfig::default()).is_none());
        assert!(select_gauge(&[], &GaugeConfig::default()).is_none());
    }
}
