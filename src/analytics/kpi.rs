//! KPI cards: latest present value of each tracked metric

use serde::Serialize;

use crate::sensors::SensorSchema;
use crate::types::{Metric, SensorReading, KPI_METRICS};

/// Value shown on a KPI card.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum KpiValue {
    Available { value: f64 },
    /// Column absent or no present value in the selection
    Unavailable,
}

impl KpiValue {
    pub const fn value(&self) -> Option<f64> {
        match self {
            Self::Available { value } => Some(*value),
            Self::Unavailable => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiCard {
    pub metric: Metric,
    pub label: String,
    pub icon: &'static str,
    #[serde(flatten)]
    pub value: KpiValue,
}

/// Round to 2 decimal places, ties to even.
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round_ties_even() / 100.0
}

/// Last present value of `metric`, scanning `rows` (ascending by timestamp)
/// from the end.
pub fn last_present(rows: &[&SensorReading], metric: Metric) -> Option<f64> {
    rows.iter().rev().find_map(|r| r.metric(metric))
}

/// One card per KPI metric, in display order.
pub fn extract_kpis(rows: &[&SensorReading], schema: &SensorSchema) -> Vec<KpiCard> {
    KPI_METRICS
        .iter()
        .map(|&metric| {
            let value = if schema.has_metric(metric) {
                last_present(rows, metric)
                    .map_or(KpiValue::Unavailable, |v| KpiValue::Available { value: round2(v) })
            } else {
                KpiValue::Unavailable
            };
            if value == KpiValue::Unavailable {
                tracing::debug!(metric = %metric, "KPI unavailable for selection");
            }
            KpiCard {
                metric,
                label: metric.label(),
                icon: metric.icon(),
                value,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MaintenanceStatus;
    use chrono::NaiveDate;

    fn reading(minute: u32, temperature: Option<f64>, humidity: Option<f64>) -> SensorReading {
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
        r.set_metric(Metric::Temperature, temperature);
        r.set_metric(Metric::Humidity, humidity);
        r
    }

    #[test]
    fn test_last_present_skips_trailing_missing() {
        let rows = [
            reading(0, Some(50.0), None),
            reading(1, Some(61.236), None),
            reading(2, None, None),
        ];
        let refs: Vec<&SensorReading> = rows.iter().collect();
        assert_eq!(last_present(&refs, Metric::Temperature), Some(61.236));

        let cards = extract_kpis(&refs, &SensorSchema::full());
        assert_eq!(cards.len(), 5);
        let temp = cards.iter().find(|c| c.metric == Metric::Temperature).unwrap();
        assert_eq!(temp.value, KpiValue::Available { value: 61.24 });
    }

    #[test]
    fn test_all_missing_column_is_unavailable() {
        let rows = [reading(0, Some(1.0), None), reading(1, Some(2.0), None)];
        let refs: Vec<&SensorReading> = rows.iter().collect();
        let cards = extract_kpis(&refs, &SensorSchema::full());
        let humidity = cards.iter().find(|c| c.metric == Metric::Humidity).unwrap();
        assert_eq!(humidity.value, KpiValue::Unavailable);
        assert_eq!(humidity.value.value(), None);
    }

    #[test]
    fn test_empty_selection_is_all_unavailable() {
        let cards = extract_kpis(&[], &SensorSchema::full());
        assert!(cards.iter().all(|c| c.value == KpiValue::Unavailable));
    }

    #[test]
    fn test_card_serialization() {
        let card = KpiCard {
            metric: Metric::Vibration,
            label: Metric::Vibration.label(),
            icon: Metric::Vibration.icon(),
            value: KpiValue::Available { value: 3.5 },
        };
        let v = serde_json::to_value(&card).unwrap();
        assert_eq!(v["metric"], "vibration");
        assert_eq!(v["status"], "available");
        assert_eq!(v["value"], 3.5);

        let missing = KpiCard {
            value: KpiValue::Unavailable,
            ..card
        };
        let v = serde_json::to_value(&missing).unwrap();
        assert_eq!(v["status"], "unavailable");
        assert!(v.get("value").is_none());
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(1.005_000_1), 1.01);
        assert_eq!(round2(-2.345_6), -2.35);
        assert_eq!(round2(7.0), 7.0);
    }

    #[test]
    fn test_round2_ties_go_to_even() {
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(0.375), 0.38);
        assert_eq!(round2(-0.125), -0.12);
        assert_eq!(round2(2.5), 2.5);
    }
}
