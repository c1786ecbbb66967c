//! Shared data structures for machine maintenance telemetry
//!
//! - `SensorReading`: one validated CSV row for one machine at one instant
//! - `MaintenanceStatus`: the binary `maintenance_required` flag
//! - `Metric`: the numeric channels carried by a reading

mod metric;
mod reading;
mod status;

pub use metric::*;
pub use reading::*;
pub use status::*;
