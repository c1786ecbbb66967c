//! Dashboard Configuration - data source, server, report and chart settings
//!
//! Each struct implements `Default` with the values in `defaults.rs`, so a
//! missing config file behaves exactly like an empty one.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::defaults;

/// Environment variable naming a config file.
pub const CONFIG_ENV_VAR: &str = "SMART_FACTORY_CONFIG";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "smart_factory.toml";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration.
///
/// Load with `DashboardConfig::load()` which searches:
/// 1. an explicit path (`--config`)
/// 2. `$SMART_FACTORY_CONFIG`
/// 3. `./smart_factory.toml`
/// 4. Built-in defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub report: ReportConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub charts: ChartConfig,

    #[serde(default)]
    pub gauge: GaugeConfig,
}

impl DashboardConfig {
    /// Load configuration using the standard search order.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        // 1. Explicit path is authoritative: failures are fatal
        if let Some(path) = explicit {
            let config = Self::load_from_file(path)?;
            info!(path = %path.display(), "Loaded config from --config");
            return Ok(config);
        }

        // 2. Env var
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded config from {}", CONFIG_ENV_VAR);
                        return Ok(config);
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from {}, falling back", CONFIG_ENV_VAR);
                    }
                }
            } else {
                warn!(path = %path, "{} points to non-existent file, falling back", CONFIG_ENV_VAR);
            }
        }

        // 3. Local file
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded config from ./{}", LOCAL_CONFIG_FILE);
                    return Ok(config);
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{}, using defaults", LOCAL_CONFIG_FILE);
                }
            }
        }

        // 4. Defaults
        info!("No {} found, using built-in defaults", LOCAL_CONFIG_FILE);
        Ok(Self::default())
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, inner) => ConfigError::Parse(path.to_path_buf(), inner),
            other => other,
        })
    }

    /// Parse and validate TOML text. Unknown keys are logged, not rejected.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self = toml::from_str(contents)
            .map_err(|e| ConfigError::Parse(PathBuf::from("<inline>"), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Check values that would make the dashboard misbehave.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        if self.charts.width == 0 || self.charts.height == 0 {
            errors.push(format!(
                "charts: width and height must be > 0 (got {}x{})",
                self.charts.width, self.charts.height
            ));
        }

        if self.gauge.max_value <= 0.0 || !self.gauge.max_value.is_finite() {
            errors.push(format!(
                "gauge.max_value = {} must be a positive number",
                self.gauge.max_value
            ));
        }
        if !(0.0..=self.gauge.max_value).contains(&self.gauge.critical_threshold) {
            errors.push(format!(
                "gauge.critical_threshold = {} must lie within 0..={}",
                self.gauge.critical_threshold, self.gauge.max_value
            ));
        }

        if self.report.file_prefix.trim().is_empty() {
            errors.push("report.file_prefix must not be empty".to_string());
        }
        if self.report.file_prefix.contains(['/', '\\']) {
            errors.push(format!(
                "report.file_prefix = '{}' must not contain path separators",
                self.report.file_prefix
            ));
        }

        if self.report.language.trim().is_empty() {
            errors.push("report.language must not be empty".to_string());
        }

        if self.llm.model.trim().is_empty() {
            errors.push("llm.model must not be empty".to_string());
        }
        if !(self.llm.endpoint.starts_with("http://") || self.llm.endpoint.starts_with("https://")) {
            errors.push(format!(
                "llm.endpoint = '{}' must be an http(s) URL",
                self.llm.endpoint
            ));
        }
        if self.llm.timeout_secs == Some(0) {
            errors.push("llm.timeout_secs must be > 0 when set".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

/// Config loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config I/O error ({}): {}", .0.display(), .1)]
    Io(PathBuf, #[source] std::io::Error),
    #[error("Config parse error ({}): {}", .0.display(), .1)]
    Parse(PathBuf, #[source] toml::de::Error),
    #[error("Config serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation failed:\n  - {}", .0.join("\n  - "))]
    Validation(Vec<String>),
}

// ============================================================================
// Sections
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    /// Sensor log CSV
    #[serde(default = "default_csv_path")]
    pub csv_path: PathBuf,
}

fn default_csv_path() -> PathBuf {
    PathBuf::from(defaults::DEFAULT_CSV_PATH)
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            csv_path: default_csv_path(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address, overridden by `SMART_FACTORY_ADDR` and `--addr`
    #[serde(default = "default_addr")]
    pub addr: String,
}

fn default_addr() -> String {
    defaults::DEFAULT_SERVER_ADDR.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Receives chart PNGs and markdown reports
    #[serde(default = "default_report_dir")]
    pub output_dir: PathBuf,

    #[serde(default = "default_report_prefix")]
    pub file_prefix: String,

    /// Language the model is asked to write the report in
    #[serde(default = "default_report_language")]
    pub language: String,
}

fn default_report_dir() -> PathBuf {
    PathBuf::from(defaults::DEFAULT_REPORT_DIR)
}
fn default_report_prefix() -> String {
    defaults::DEFAULT_REPORT_PREFIX.to_string()
}
fn default_report_language() -> String {
    defaults::DEFAULT_REPORT_LANGUAGE.to_string()
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_report_dir(),
            file_prefix: default_report_prefix(),
            language: default_report_language(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_llm_model")]
    pub model: String,

    /// Request timeout; unset means wait indefinitely
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_llm_endpoint() -> String {
    defaults::DEFAULT_LLM_ENDPOINT.to_string()
}
fn default_llm_model() -> String {
    defaults::DEFAULT_LLM_MODEL.to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: default_llm_endpoint(),
            model: default_llm_model(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartConfig {
    #[serde(default = "default_chart_width")]
    pub width: u32,

    #[serde(default = "default_chart_height")]
    pub height: u32,
}

const fn default_chart_width() -> u32 {
    defaults::DEFAULT_CHART_WIDTH
}
const fn default_chart_height() -> u32 {
    defaults::DEFAULT_CHART_HEIGHT
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: default_chart_width(),
            height: default_chart_height(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GaugeConfig {
    /// Values at or below are critical
    #[serde(default = "default_gauge_threshold")]
    pub critical_threshold: f64,

    #[serde(default = "default_gauge_max")]
    pub max_value: f64,
}

const fn default_gauge_threshold() -> f64 {
    defaults::DEFAULT_GAUGE_CRITICAL_THRESHOLD
}
const fn default_gauge_max() -> f64 {
    defaults::DEFAULT_GAUGE_MAX
}

impl Default for GaugeConfig {
    fn default() -> Self {
        Self {
            critical_threshold: default_gauge_threshold(),
            max_value: default_gauge_max(),
        }
    }
}
