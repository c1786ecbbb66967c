//! Scatter: maintenance status over time, colored by failure type

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, NaiveDateTime};
use plotters::prelude::*;

use super::{
    canvas, draw_placeholder, font, palette_color, ChartError, ChartStyle, SCATTER_TITLE,
};
use crate::dashboard::DashboardView;
use crate::types::MaintenanceStatus;

/// Half-width of the diamond marker in pixels.
const MARKER: i32 = 7;

/// Padding applied when every point shares one timestamp.
const SINGLE_POINT_PAD_SECS: f64 = 3600.0;

#[allow(clippy::cast_precision_loss)]
fn epoch_secs(ts: NaiveDateTime) -> f64 {
    ts.and_utc().timestamp() as f64
}

#[allow(clippy::cast_possible_truncation)]
fn date_tick(secs: f64) -> String {
    DateTime::from_timestamp(secs.round() as i64, 0)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn status_tick(v: f64) -> String {
    if v.abs() < 1e-9 {
        "normal (0)".to_string()
    } else if (v - 1.0).abs() < 1e-9 {
        "maintenance required (1)".to_string()
    } else {
        String::new()
    }
}

pub fn render(view: &DashboardView, path: &Path, style: &ChartStyle) -> Result<(), ChartError> {
    let root = canvas(path, style)?;
    if view.scatter.is_empty() {
        return draw_placeholder(&root, SCATTER_TITLE);
    }

    let mut series: BTreeMap<&str, Vec<(f64, f64)>> = BTreeMap::new();
    for p in &view.scatter {
        let y = match p.maintenance_required {
            MaintenanceStatus::Normal => 0.0,
            MaintenanceStatus::Required => 1.0,
        };
        series
            .entry(p.failure_type.as_str())
            .or_default()
            .push((epoch_secs(p.timestamp), y));
    }

    let (mut x_min, mut x_max) = view
        .scatter
        .iter()
        .map(|p| epoch_secs(p.timestamp))
        .fold((f64::MAX, f64::MIN), |(lo, hi), x| (lo.min(x), hi.max(x)));
    if x_max - x_min < 1.0 {
        x_min -= SINGLE_POINT_PAD_SECS;
        x_max += SINGLE_POINT_PAD_SECS;
    }
    let pad = (x_max - x_min) * 0.03;

    let mut chart = ChartBuilder::on(&root)
        .caption(SCATTER_TITLE, font(28.0))
        .margin(20)
        .x_label_area_size(45)
        .y_label_area_size(190)
        .build_cartesian_2d((x_min - pad)..(x_max + pad), -0.5..1.5)?;

    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc("Maintenance")
        .x_labels(6)
        .y_labels(5)
        .x_label_formatter(&|x| date_tick(*x))
        .y_label_formatter(&|y| status_tick(*y))
        .label_style(font(14.0))
        .draw()?;

    for (idx, (failure_type, points)) in series.iter().enumerate() {
        let color = palette_color(idx);
        chart
            .draw_series(points.iter().map(|&coord| {
                EmptyElement::at(coord)
                    + Polygon::new(
                        vec![(0, -MARKER), (MARKER, 0), (0, MARKER), (-MARKER, 0)],
                        color.filled(),
                    )
            }))?
            .label(*failure_type)
            .legend(move |(x, y)| {
                Polygon::new(
                    vec![(x + 6, y - 6), (x + 12, y), (x + 6, y + 6), (x, y)],
                    color.filled(),
                )
            });
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .label_font(font(14.0))
        .background_style(&WHITE.mix(0.85))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    tracing::debug!(path = %path.display(), series = series.len(), "Rendered scatter chart");
    Ok(())
}
