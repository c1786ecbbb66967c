//! Dashboard analytics
//!
//! Pure functions over filtered readings. Each submodule feeds one dashboard
//! element:
//!
//! - `kpi`: KPI cards
//! - `maintenance_time`: stacked bar (elapsed minutes per status bucket)
//! - `status_ratio`: pie (status / failure-type frequencies)
//! - `scatter`: scatter points and the report summary
//! - `gauge`: remaining-life gauge

pub mod gauge;
pub mod kpi;
pub mod maintenance_time;
pub mod scatter;
pub mod status_ratio;

pub use gauge::{classify, select_gauge, GaugeLevel, GaugeReading};
pub use kpi::{extract_kpis, KpiCard, KpiValue};
pub use maintenance_time::{
    aggregate, attribute_elapsed, maintenance_time_by_status, AttributedRow, ElapsedTracker,
    MaintenanceTimeRecord,
};
pub use scatter::{scatter_points, summarize, ScatterPoint, ScatterSummary};
pub use status_ratio::{ratio_label, status_ratio, StatusRatioRecord};
