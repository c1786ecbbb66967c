//! Structured report payload sent to the chat model

use serde::Serialize;

use crate::analytics::{MaintenanceTimeRecord, ScatterSummary, StatusRatioRecord};
use crate::dashboard::DashboardView;

/// Chart data keyed by chart title.
///
/// Field names must stay in sync with the titles in `charts`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    #[serde(rename = "Elapsed Time by Maintenance Status (min)")]
    pub maintenance_time: Vec<MaintenanceTimeRecord>,
    #[serde(rename = "Maintenance Status and Failure Type Ratio")]
    pub status_ratio: Vec<StatusRatioRecord>,
    #[serde(rename = "Maintenance Over Time")]
    pub scatter: ScatterSummary,
    /// `null` when no remaining-life value is present
    #[serde(rename = "Predicted Remaining Life")]
    pub remaining_life: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportData {
    pub machine: String,
    pub date: String,
    pub time: String,
    pub chart_data: ChartData,
}

impl ReportData {
    pub fn from_view(view: &DashboardView) -> Self {
        Self {
            machine: view.banner.machine.clone(),
            date: view.banner.date.clone(),
            time: view.banner.time.clone(),
            chart_data: ChartData {
                maintenance_time: view.maintenance_time.clone(),
                status_ratio: view.status_ratio.clone(),
                scatter: view.scatter_summary.clone(),
                remaining_life: view.gauge.map(|g| g.value),
            },
        }
    }

    /// Pretty-printed JSON embedded in the prompt.
    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
