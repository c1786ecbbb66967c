//! System-wide default constants.
//!
//! Grouped by subsystem for easy discovery.

// ============================================================================
// Data
// ============================================================================

/// Sensor log read when no path is configured.
pub const DEFAULT_CSV_PATH: &str = "smart_manufacturing_data.csv";

// ============================================================================
// Server
// ============================================================================

/// HTTP bind address.
pub const DEFAULT_SERVER_ADDR: &str = "0.0.0.0:8080";

// ============================================================================
// Report
// ============================================================================

/// Directory that receives chart images and report files.
pub const DEFAULT_REPORT_DIR: &str = "./reports";

/// Report file name prefix: `{prefix}_{machine}_{start}_{end}.md`.
pub const DEFAULT_REPORT_PREFIX: &str = "smart_factory_report";

/// Language the generated report is written in.
pub const DEFAULT_REPORT_LANGUAGE: &str = "English";

// ============================================================================
// LLM
// ============================================================================

/// OpenAI-compatible chat completion endpoint.
pub const DEFAULT_LLM_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

pub const DEFAULT_LLM_MODEL: &str = "gpt-4o";

// ============================================================================
// Charts
// ============================================================================

/// Chart image size in pixels.
pub const DEFAULT_CHART_WIDTH: u32 = 1000;
pub const DEFAULT_CHART_HEIGHT: u32 = 600;

// ============================================================================
// Gauge
// ============================================================================

/// Remaining life at or below this value is critical.
pub const DEFAULT_GAUGE_CRITICAL_THRESHOLD: f64 = 100.0;

/// Upper end of the remaining-life gauge axis.
pub const DEFAULT_GAUGE_MAX: f64 = 500.0;
