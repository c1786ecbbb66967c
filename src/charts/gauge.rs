//! Gauge: latest predicted remaining life on a half-circle dial

use std::f64::consts::PI;
use std::path::Path;

use plotters::prelude::*;
use plotters_backend::text_anchor::{HPos, Pos, VPos};

use super::{canvas, draw_placeholder, font, ChartError, ChartStyle, GAUGE_TITLE};
use crate::dashboard::DashboardView;

const TRACK: RGBColor = RGBColor(0xe6, 0xe6, 0xe6);
const ARC_STEPS: usize = 96;
const TICKS: u32 = 5;

/// Fraction of the dial covered by `value`, clamped to `[0, 1]`.
pub fn dial_fraction(value: f64, axis_max: f64) -> f64 {
    if axis_max <= 0.0 || !value.is_finite() {
        return 0.0;
    }
    (value / axis_max).clamp(0.0, 1.0)
}

#[allow(clippy::cast_possible_truncation)]
fn polar(center: (i32, i32), radius: f64, angle: f64) -> (i32, i32) {
    (
        center.0 + (radius * angle.cos()).round() as i32,
        center.1 - (radius * angle.sin()).round() as i32,
    )
}

/// Annular sector from angle `from` to `to` (radians, counter-clockwise from
/// the positive x axis), as a closed polygon.
#[allow(clippy::cast_precision_loss)]
fn band(center: (i32, i32), inner: f64, outer: f64, from: f64, to: f64) -> Vec<(i32, i32)> {
    let step = (to - from) / ARC_STEPS as f64;
    let outer_edge = (0..=ARC_STEPS).map(|i| polar(center, outer, from + step * i as f64));
    let inner_edge = (0..=ARC_STEPS)
        .rev()
        .map(|i| polar(center, inner, from + step * i as f64));
    outer_edge.chain(inner_edge).collect()
}

pub fn render(view: &DashboardView, path: &Path, style: &ChartStyle) -> Result<(), ChartError> {
    let root = canvas(path, style)?;
    let Some(gauge) = view.gauge else {
        return draw_placeholder(&root, GAUGE_TITLE);
    };

    let body = root.titled(GAUGE_TITLE, font(28.0))?;
    let (w, h) = body.dim_in_pixel();
    let center = (
        i32::try_from(w / 2).unwrap_or(0),
        i32::try_from(h * 3 / 4).unwrap_or(0),
    );
    let outer = (f64::from(w) / 2.0).min(f64::from(h) * 0.7) * 0.8;
    let inner = outer * 0.62;

    // Dial runs from PI (left, 0) to 0 (right, axis_max)
    body.draw(&Polygon::new(band(center, inner, outer, PI, 0.0), TRACK.filled()))?;

    let fraction = dial_fraction(gauge.value, gauge.axis_max);
    if fraction > 0.0 {
        let (r, g, b) = gauge.level.rgb();
        body.draw(&Polygon::new(
            band(center, inner, outer, PI, PI * (1.0 - fraction)),
            RGBColor(r, g, b).filled(),
        ))?;
    }

    let tick_style = font(14.0)
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Center));
    for i in 0..=TICKS {
        let f = f64::from(i) / f64::from(TICKS);
        let label = format!("{:.0}", gauge.axis_max * f);
        let at = polar(center, outer + 22.0, PI * (1.0 - f));
        body.draw(&Text::new(label, at, tick_style.clone()))?;
    }

    let value_style = font(48.0)
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Bottom));
    body.draw(&Text::new(format!("{:.1}", gauge.value), center, value_style))?;

    root.present()?;
    tracing::debug!(
        path = %path.display(),
        value = gauge.value,
        level = gauge.level.color_name(),
        "Rendered gauge chart"
    );
    Ok(())
}
