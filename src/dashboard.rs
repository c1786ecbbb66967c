//! Dashboard view assembly
//!
//! Runs every analytics stage for one resolved selection and bundles the
//! results into a single serializable value. The view is what the HTTP API
//! returns, what the chart renderers draw, and what the report assembler
//! summarizes.

use serde::Serialize;
use tracing::debug;

use crate::analytics::{
    extract_kpis, maintenance_time_by_status, scatter_points, select_gauge, status_ratio,
    summarize, GaugeReading, KpiCard, MaintenanceTimeRecord, ScatterPoint, ScatterSummary,
    StatusRatioRecord,
};
use crate::config::GaugeConfig;
use crate::filter::FilterSelection;
use crate::sensors::SensorLog;

/// Filter banner shown above the KPI cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterBanner {
    pub machine: String,
    /// `"2025-01-01 ~ 2025-01-31"`
    pub date: String,
    /// `"00:00 ~ 23:59"`
    pub time: String,
}

/// Everything the dashboard displays for one selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub selection: FilterSelection,
    pub banner: FilterBanner,
    pub kpis: Vec<KpiCard>,
    pub maintenance_time: Vec<MaintenanceTimeRecord>,
    pub status_ratio: Vec<StatusRatioRecord>,
    pub scatter: Vec<ScatterPoint>,
    pub scatter_summary: ScatterSummary,
    /// `None` when no remaining-life value is present in the selection
    pub gauge: Option<GaugeReading>,
    /// Readings passing the display filter
    pub row_count: usize,
}

impl DashboardView {
    /// Total filtered rows represented in the pie records.
    pub fn status_ratio_total(&self) -> usize {
        self.status_ratio.iter().map(|r| r.count).sum()
    }
}

/// Build the view for `selection`.
///
/// KPI, pie, scatter and gauge data come from the display-filtered rows. The
/// maintenance-time bars are computed over the machine's full history tagged
/// against the combined datetime window, so a failure that began before the
/// window is measured from its last in-window normal reading.
pub fn build_view(log: &SensorLog, selection: &FilterSelection, gauge: &GaugeConfig) -> DashboardView {
    let rows = selection.apply(log);
    let window = selection.window();

    let maintenance_time =
        maintenance_time_by_status(log.machine_history(&selection.machine_id), &window);

    debug!(
        machine = %selection.machine_id,
        rows = rows.len(),
        buckets = maintenance_time.len(),
        "Dashboard view built"
    );

    DashboardView {
        banner: FilterBanner {
            machine: selection.machine_id.clone(),
            date: selection.date_label(),
            time: selection.time_label(),
        },
        kpis: extract_kpis(&rows, log.schema()),
        maintenance_time,
        status_ratio: status_ratio(&rows),
        scatter: scatter_points(&rows),
        scatter_summary: summarize(&rows),
        gauge: select_gauge(&rows, gauge),
        row_count: rows.len(),
        selection: selection.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::KpiValue;
    use crate::filter::FilterQuery;
    use crate::types::{MaintenanceStatus, Metric, SensorReading};
    use chrono::NaiveDate;

    fn reading(
        machine: &str,
        hour: u32,
        minute: u32,
        status: MaintenanceStatus,
        failure: &str,
        life: Option<f64>,
    ) -> SensorReading {
        let mut r = SensorReading {
            timestamp: NaiveDate::from_ymd_opt(2025, 3, 1)
                .unwrap()
                .and_hms_opt(hour, minute, 0)
                .unwrap(),
            machine_id: machine.to_string(),
            metrics: [None; 6],
            maintenance_required: status,
            failure_type: failure.to_string(),
        };
        r.set_metric(Metric::Temperature, Some(70.0 + f64::from(minute)));
        r.set_metric(Metric::PredictedRemainingLife, life);
        r
    }

    fn sample_log() -> SensorLog {
        SensorLog::from_readings(vec![
            reading("M1", 9, 0, MaintenanceStatus::Normal, "Normal", Some(300.0)),
            reading("M1", 9, 10, MaintenanceStatus::Required, "Bearing", Some(120.0)),
            reading("M1", 9, 25, MaintenanceStatus::Normal, "Normal", Some(90.0)),
            reading("M2", 9, 5, MaintenanceStatus::Normal, "Normal", None),
        ])
    }

    fn select(log: &SensorLog, machine: &str) -> FilterSelection {
        FilterSelection::resolve(
            log,
            &FilterQuery {
                machine: Some(machine.to_string()),
                ..Default::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn test_view_for_machine() {
        let log = sample_log();
        let view = build_view(&log, &select(&log, "M1"), &GaugeConfig::default());

        assert_eq!(view.row_count, 3);
        assert_eq!(view.banner.machine, "M1");
        assert_eq!(view.banner.date, "2025-03-01 ~ 2025-03-01");
        assert_eq!(view.banner.time, "00:00 ~ 23:59");
        assert_eq!(view.status_ratio_total(), view.row_count);

        let temp = view.kpis.iter().find(|k| k.metric == Metric::Temperature).unwrap();
        assert_eq!(temp.value, KpiValue::Available { value: 95.0 });

        let gauge = view.gauge.unwrap();
        assert_eq!(gauge.value, 90.0);
        assert_eq!(gauge.color, "red");

        let minutes: Vec<(&str, &str, f64)> = view
            .maintenance_time
            .iter()
            .map(|r| (r.maintenance_required, r.failure_type.as_str(), r.diff_minutes))
            .collect();
        assert_eq!(
            minutes,
            vec![
                ("maintenance not required", "Normal", 15.0),
                ("maintenance required", "Bearing", 10.0),
            ]
        );
    }

    #[test]
    fn test_view_without_remaining_life_has_no_gauge() {
        let log = sample_log();
        let view = build_view(&log, &select(&log, "M2"), &GaugeConfig::default());
        assert_eq!(view.row_count, 1);
        assert!(view.gauge.is_none());
    }

    #[test]
    fn test_build_view_is_idempotent() {
        let log = sample_log();
        let selection = select(&log, "M1");
        let a = build_view(&log, &selection, &GaugeConfig::default());
        let b = build_view(&log, &selection, &GaugeConfig::default());
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn test_time_of_day_filter_narrows_display_rows() {
        let log = sample_log();
        let selection = FilterSelection::resolve(
            &log,
            &FilterQuery {
                machine: Some("M1".into()),
                start_time: Some("09:05".into()),
                end_time: Some("09:20".into()),
                ..Default::default()
            },
        )
        .unwrap();
        let view = build_view(&log, &selection, &GaugeConfig::default());
        assert_eq!(view.row_count, 1);
        assert_eq!(view.scatter_summary.maintenance_required_count, 1);
        // 09:00 is outside the window, so there is no normal anchor to measure from
        assert!(view.maintenance_time.iter().all(|r| r.diff_minutes == 0.0));
    }
}
