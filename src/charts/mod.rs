//! Chart rendering (PNG)
//!
//! Four independent renderers, one per dashboard chart. Each takes the
//! dashboard view, an output path and a style, and writes a PNG. Inputs with
//! nothing to plot produce a titled "no data" image rather than an error, so
//! a report always has four images to reference.

mod backend;
pub mod bar;
pub mod gauge;
pub mod pie;
pub mod scatter;

use std::path::{Path, PathBuf};

use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use plotters::style::{FontDesc, FontFamily, FontStyle};
use plotters_backend::text_anchor::{HPos, Pos, VPos};
use tracing::debug;

use crate::config::ChartConfig;
use crate::dashboard::DashboardView;

pub use backend::TextSafeBackend;

// ============================================================================
// Titles and file names
// ============================================================================

pub const BAR_TITLE: &str = "Elapsed Time by Maintenance Status (min)";
pub const PIE_TITLE: &str = "Maintenance Status and Failure Type Ratio";
pub const SCATTER_TITLE: &str = "Maintenance Over Time";
pub const GAUGE_TITLE: &str = "Predicted Remaining Life";

pub const BAR_FILE: &str = "graph_bar.png";
pub const PIE_FILE: &str = "graph_pie.png";
pub const GAUGE_FILE: &str = "graph_gauge.png";
pub const SCATTER_FILE: &str = "graph_dot.png";

const MUTED: RGBColor = RGBColor(0x80, 0x80, 0x80);

/// Qualitative eight-color palette (ColorBrewer Set2).
pub const PALETTE: [RGBColor; 8] = [
    RGBColor(0x66, 0xc2, 0xa5),
    RGBColor(0xfc, 0x8d, 0x62),
    RGBColor(0x8d, 0xa0, 0xcb),
    RGBColor(0xe7, 0x8a, 0xc3),
    RGBColor(0xa6, 0xd8, 0x54),
    RGBColor(0xff, 0xd9, 0x2f),
    RGBColor(0xe5, 0xc4, 0x94),
    RGBColor(0xb3, 0xb3, 0xb3),
];

/// Sans-serif font at `size` points.
pub(crate) fn font(size: f64) -> FontDesc<'static> {
    FontDesc::new(FontFamily::SansSerif, size, FontStyle::Normal)
}

/// Palette color for series `index`, cycling.
pub fn palette_color(index: usize) -> RGBColor {
    PALETTE[index % PALETTE.len()]
}

// ============================================================================
// Errors and style
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ChartError {
    #[error("chart drawing failed: {0}")]
    Drawing(String),
    #[error("chart output error ({}): {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for ChartError {
    fn from(e: DrawingAreaErrorKind<E>) -> Self {
        Self::Drawing(e.to_string())
    }
}

/// Image size shared by all charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartStyle {
    pub width: u32,
    pub height: u32,
}

impl Default for ChartStyle {
    fn default() -> Self {
        ChartConfig::default().into()
    }
}

impl From<ChartConfig> for ChartStyle {
    fn from(config: ChartConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
        }
    }
}

pub(crate) type Canvas<'a> = DrawingArea<TextSafeBackend<BitMapBackend<'a>>, Shift>;

/// White canvas backed by a PNG file at `path`.
pub(crate) fn canvas<'a>(path: &'a Path, style: &ChartStyle) -> Result<Canvas<'a>, ChartError> {
    let root = TextSafeBackend::new(BitMapBackend::new(path, (style.width, style.height)))
        .into_drawing_area();
    root.fill(&WHITE)?;
    Ok(root)
}

/// Title plus a centered "no data" notice.
pub(crate) fn draw_placeholder(root: &Canvas<'_>, title: &str) -> Result<(), ChartError> {
    let body = root.titled(title, font(28.0))?;
    let (w, h) = body.dim_in_pixel();
    let style = font(24.0)
        .color(&MUTED)
        .pos(Pos::new(HPos::Center, VPos::Center));
    body.draw(&Text::new(
        "no data",
        (i32::try_from(w / 2).unwrap_or(0), i32::try_from(h / 2).unwrap_or(0)),
        style,
    ))?;
    root.present()?;
    debug!(title, "Rendered placeholder chart");
    Ok(())
}

// ============================================================================
// Render all
// ============================================================================

/// Paths of the four rendered chart images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartFiles {
    pub bar: PathBuf,
    pub pie: PathBuf,
    pub gauge: PathBuf,
    pub scatter: PathBuf,
}

impl ChartFiles {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            bar: dir.join(BAR_FILE),
            pie: dir.join(PIE_FILE),
            gauge: dir.join(GAUGE_FILE),
            scatter: dir.join(SCATTER_FILE),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        [&self.bar, &self.pie, &self.gauge, &self.scatter]
            .into_iter()
            .map(PathBuf::as_path)
    }
}

/// Render all four charts into `dir` under their fixed file names.
pub fn render_all(view: &DashboardView, dir: &Path, style: &ChartStyle) -> Result<ChartFiles, ChartError> {
    std::fs::create_dir_all(dir).map_err(|source| ChartError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let files = ChartFiles::in_dir(dir);
    bar::render(view, &files.bar, style)?;
    pie::render(view, &files.pie, style)?;
    scatter::render(view, &files.scatter, style)?;
    gauge::render(view, &files.gauge, style)?;

    tracing::info!(dir = %dir.display(), machine = %view.banner.machine, "Rendered dashboard charts");
    Ok(files)
}
