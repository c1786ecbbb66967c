//! LLM maintenance report generation
//!
//! Pipeline for one report:
//!
//! 1. Reject an empty API key before touching the disk or network
//! 2. Render the four charts into `{output_dir}/{report_stem}/`
//! 3. Serialize the view summary and wrap it in the prompt template
//! 4. Send the prompt to the chat backend
//! 5. Persist the reply as `{report_stem}.md` next to the chart directory
//!
//! `report_stem` is `{prefix}_{machine}_{start}_{end}`. Reports for different
//! selections never share chart files, so concurrent requests cannot link
//! each other's images.
//!
//! The reply is treated as opaque markdown. Nothing is retried.

pub mod data;
pub mod prompt;
pub mod writer;

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::charts::{self, ChartError, ChartFiles, ChartStyle};
use crate::config::{DashboardConfig, GaugeConfig};
use crate::dashboard::DashboardView;
use crate::llm::{ApiError, ChatCompletion};

pub use data::{ChartData, ReportData};
pub use prompt::{build_prompt, PromptContext, REPORT_TITLE};
pub use writer::{is_servable_report_name, report_file_name, report_stem, write_report};

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("an API key is required to generate a report")]
    MissingCredential,
    #[error("chart rendering failed: {0}")]
    Render(#[from] ChartError),
    #[error("chat completion failed: {0}")]
    Api(#[from] ApiError),
    #[error("report I/O error ({}): {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("report serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("report worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// A written report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedReport {
    pub file_name: String,
    pub path: PathBuf,
    /// Directory holding this report's chart images
    pub chart_dir: PathBuf,
    pub text: String,
}

/// Produces reports for dashboard views.
#[derive(Clone)]
pub struct ReportService {
    output_dir: PathBuf,
    file_prefix: String,
    language: String,
    chart_style: ChartStyle,
    gauge: GaugeConfig,
    client: Arc<dyn ChatCompletion>,
}

impl ReportService {
    pub fn new(config: &DashboardConfig, client: Arc<dyn ChatCompletion>) -> Self {
        Self {
            output_dir: config.report.output_dir.clone(),
            file_prefix: config.report.file_prefix.clone(),
            language: config.report.language.clone(),
            chart_style: config.charts.into(),
            gauge: config.gauge,
            client,
        }
    }

    pub fn output_dir(&self) -> &std::path::Path {
        &self.output_dir
    }

    /// Generate, persist and return a report for `view`.
    pub async fn generate(
        &self,
        api_key: &str,
        view: &DashboardView,
    ) -> Result<GeneratedReport, ReportError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            warn!(machine = %view.banner.machine, "Report requested without an API key");
            return Err(ReportError::MissingCredential);
        }

        let stem = report_stem(&self.file_prefix, &view.selection);
        let chart_dir = self.output_dir.join(&stem);
        let files = self.render_charts(view, chart_dir.clone()).await?;

        let data = ReportData::from_view(view);
        let ctx = PromptContext {
            image_dir: &stem,
            language: &self.language,
        };
        let prompt = build_prompt(&data.to_pretty_json()?, &self.gauge, &ctx);

        info!(
            machine = %view.banner.machine,
            backend = self.client.backend_name(),
            prompt_chars = prompt.len(),
            "Requesting maintenance report"
        );
        let text = self.client.complete(api_key, &prompt).await?;

        let file_name = report_file_name(&self.file_prefix, &view.selection);
        let path = self.persist(&file_name, &text).await?;

        info!(
            file = %file_name,
            charts = files.iter().count(),
            "Maintenance report written"
        );
        Ok(GeneratedReport {
            file_name,
            path,
            chart_dir,
            text,
        })
    }

    async fn render_charts(&self, view: &DashboardView, dir: PathBuf) -> Result<ChartFiles, ReportError> {
        let view = view.clone();
        let style = self.chart_style;
        let files = tokio::task::spawn_blocking(move || charts::render_all(&view, &dir, &style)).await??;
        Ok(files)
    }

    async fn persist(&self, file_name: &str, text: &str) -> Result<PathBuf, ReportError> {
        let dir = self.output_dir.clone();
        let name = file_name.to_string();
        let body = text.to_string();
        let target = dir.join(&name);
        tokio::task::spawn_blocking(move || write_report(&dir, &name, &body))
            .await?
            .map_err(|source| ReportError::Io {
                path: target,
                source,
            })
    }

    /// Read a previously generated report for download.
    pub async fn read(&self, file_name: &str) -> Result<Option<String>, ReportError> {
        if !is_servable_report_name(file_name) {
            return Ok(None);
        }
        let path = self.output_dir.join(file_name);
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(ReportError::Io { path, source }),
        }
    }
}
