//! Smart Factory: Machine Maintenance Dashboard
//!
//! Loads a machine sensor log from CSV, filters it by machine, date range and
//! time of day, and derives the dashboard: KPI cards, elapsed maintenance time
//! per status, status/failure ratios, a maintenance timeline and a
//! remaining-life gauge. A report generator renders the charts to PNG and asks
//! an OpenAI-compatible chat endpoint for a markdown maintenance report.
//!
//! ## Architecture
//!
//! - **Sensors / Cache**: CSV ingestion with one schema check, memoized load
//! - **Filter**: selection resolution against the loaded log
//! - **Analytics**: pure per-view computations
//! - **Charts**: PNG rendering with plotters
//! - **Report / LLM**: prompt assembly, chat completion, report persistence
//! - **API**: axum HTTP surface over all of the above

pub mod analytics;
pub mod api;
pub mod cache;
pub mod charts;
pub mod config;
pub mod dashboard;
pub mod filter;
pub mod llm;
pub mod report;
pub mod sensors;
pub mod types;

pub use config::DashboardConfig;

pub use types::{MaintenanceStatus, Metric, SensorReading};

pub use cache::LoadCache;
pub use dashboard::{build_view, DashboardView};
pub use filter::{FilterQuery, FilterSelection};
pub use sensors::{LoadError, SensorLog};

pub use llm::{ChatCompletion, OpenAiClient};
pub use report::{GeneratedReport, ReportError, ReportService};
