//! Stacked bar: elapsed minutes per maintenance status, stacked by failure type

use std::collections::BTreeSet;
use std::path::Path;

use plotters::prelude::*;

use super::{canvas, draw_placeholder, font, palette_color, ChartError, ChartStyle, BAR_TITLE};
use crate::analytics::MaintenanceTimeRecord;
use crate::dashboard::DashboardView;
use crate::types::MaintenanceStatus;

/// One x-axis category and its stacked segments, bottom to top.
struct Column<'a> {
    label: &'static str,
    segments: Vec<(&'a str, f64)>,
}

impl Column<'_> {
    fn total(&self) -> f64 {
        self.segments.iter().map(|(_, m)| m).sum()
    }
}

fn columns(records: &[MaintenanceTimeRecord]) -> Vec<Column<'_>> {
    [MaintenanceStatus::Normal, MaintenanceStatus::Required]
        .into_iter()
        .filter_map(|status| {
            let segments: Vec<(&str, f64)> = records
                .iter()
                .filter(|r| r.status == status)
                .map(|r| (r.failure_type.as_str(), r.diff_minutes))
                .collect();
            (!segments.is_empty()).then(|| Column {
                label: status.bucket_label(),
                segments,
            })
        })
        .collect()
}

pub fn render(view: &DashboardView, path: &Path, style: &ChartStyle) -> Result<(), ChartError> {
    let root = canvas(path, style)?;
    let columns = columns(&view.maintenance_time);
    if columns.is_empty() {
        return draw_placeholder(&root, BAR_TITLE);
    }

    // Failure types sorted so each keeps one color across both columns
    let failure_types: Vec<&str> = view
        .maintenance_time
        .iter()
        .map(|r| r.failure_type.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let y_max = columns.iter().map(Column::total).fold(0.0_f64, f64::max).max(1.0) * 1.15;
    let n = u32::try_from(columns.len()).unwrap_or(u32::MAX);

    let mut chart = ChartBuilder::on(&root)
        .caption(BAR_TITLE, font(28.0))
        .margin(20)
        .x_label_area_size(45)
        .y_label_area_size(70)
        .build_cartesian_2d((0u32..n).into_segmented(), 0.0..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Maintenance status")
        .y_desc("Cumulative time (min)")
        .x_label_formatter(&|v| match v {
            SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => columns
                .get(*i as usize)
                .map(|c| c.label.to_string())
                .unwrap_or_default(),
            SegmentValue::Last => String::new(),
        })
        .y_label_formatter(&|v| format!("{v:.0}"))
        .label_style(font(14.0))
        .draw()?;

    for (idx, ft) in failure_types.iter().enumerate() {
        let color = palette_color(idx);
        let mut bars = Vec::new();
        for (i, column) in (0u32..).zip(&columns) {
            let mut base = 0.0;
            for (seg_ft, minutes) in &column.segments {
                if seg_ft == ft {
                    let mut bar = Rectangle::new(
                        [
                            (SegmentValue::Exact(i), base),
                            (SegmentValue::Exact(i + 1), base + minutes),
                        ],
                        color.filled(),
                    );
                    bar.set_margin(0, 0, 40, 40);
                    bars.push(bar);
                }
                base += minutes;
            }
        }
        chart
            .draw_series(bars)?
            .label(*ft)
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], color.filled()));
    }

    // Bar totals above each column
    chart.draw_series((0u32..).zip(&columns).map(|(i, column)| {
        let total = column.total();
        Text::new(
            format!("{total:.0}"),
            (SegmentValue::CenterOf(i), total + y_max * 0.02),
            font(16.0),
        )
    }))?;

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .label_font(font(14.0))
        .background_style(&WHITE.mix(0.85))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    tracing::debug!(path = %path.display(), columns = columns.len(), "Rendered bar chart");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    #[test]
    fn test_columns_follow_status_order() {
        let view = populated_view();
        let cols = columns(&view.maintenance_time);
        let labels: Vec<&str> = cols.iter().map(|c| c.label).collect();
        assert_eq!(labels, vec!["maintenance not required", "maintenance required"]);
        // Bearing 08:00 -> 09:00 on day 1, Overheat day 1 10:00 -> day 2 08:00
        assert_eq!(cols[1].segments, vec![("Bearing", 60.0), ("Overheat", 1320.0)]);
        assert_eq!(cols[1].total(), 1380.0);
    }

    #[test]
    fn test_render_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bar.png");
        render(&populated_view(), &path, &ChartStyle::default()).unwrap();
        assert!(is_png(&path));
    }

    #[test]
    fn test_empty_view_renders_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bar.png");
        render(&empty_view(), &path, &ChartStyle::default()).unwrap();
        assert!(is_png(&path));
    }
}
