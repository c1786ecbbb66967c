//! Pie: share of each maintenance status / failure type label

use std::path::Path;

use plotters::element::Pie;
use plotters::prelude::*;

use super::{canvas, draw_placeholder, font, palette_color, ChartError, ChartStyle, PIE_TITLE};
use crate::dashboard::DashboardView;

pub fn render(view: &DashboardView, path: &Path, style: &ChartStyle) -> Result<(), ChartError> {
    let root = canvas(path, style)?;
    if view.status_ratio.is_empty() {
        return draw_placeholder(&root, PIE_TITLE);
    }

    let body = root.titled(PIE_TITLE, font(28.0))?;
    let (w, h) = body.dim_in_pixel();

    #[allow(clippy::cast_precision_loss)]
    let sizes: Vec<f64> = view.status_ratio.iter().map(|r| r.count as f64).collect();
    let colors: Vec<RGBColor> = (0..sizes.len()).map(palette_color).collect();
    let labels: Vec<&str> = view.status_ratio.iter().map(|r| r.status.as_str()).collect();

    let center = (
        i32::try_from(w / 2).unwrap_or(0),
        i32::try_from(h / 2).unwrap_or(0),
    );
    let radius = f64::from(w.min(h)) * 0.32;

    let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
    pie.start_angle(-90.0);
    pie.label_style(font(15.0).color(&BLACK));
    pie.percentages(font(16.0).color(&BLACK));
    body.draw(&pie)?;

    root.present()?;
    tracing::debug!(path = %path.display(), slices = sizes.len(), "Rendered pie chart");
    Ok(())
}
