//! Scatter plots of individual scans against exam date.

use std::path::Path;

use plotters::prelude::*;

use crate::error::{BmdError, Result};
use crate::plot::plot_err;

/// One point with its colour group and marker group
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    pub color: usize,
    pub marker: usize,
}

pub struct ScatterSpec<'a> {
    pub title: &'a str,
    pub x_desc: &'a str,
    pub y_desc: &'a str,
    pub color_labels: &'a [String],
    /// A single empty label means all points share one marker
    pub marker_labels: &'a [String],
    pub colors: &'a [RGBColor],
    pub alpha: f64,
}

/// Padded axis range over finite values
pub(crate) fn padded_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !lo.is_finite() {
        return (0.0, 1.0);
    }
    let pad = ((hi - lo) * 0.05).max(0.5);
    (lo - pad, hi + pad)
}

/// Finite coordinates of the points in one colour and marker group
///
/// Points with a missing date or score are not drawn.
pub(crate) fn group_points(points: &[ScatterPoint], color: usize, marker: usize) -> Vec<(f64, f64)> {
    points
        .iter()
        .filter(|p| p.color == color && p.marker == marker)
        .filter(|p| p.x.is_finite() && p.y.is_finite())
        .map(|p| (p.x, p.y))
        .collect()
}

/// Render a scatter plot to a PNG file
pub fn render_scatter(path: &Path, spec: &ScatterSpec<'_>, points: &[ScatterPoint]) -> Result<()> {
    if !points.iter().any(|p| p.x.is_finite() && p.y.is_finite()) {
        return Err(BmdError::PlotError(format!("{}: no data to plot", spec.title)));
    }

    let root = BitMapBackend::new(path, (1100, 700)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let (x_min, x_max) = padded_range(points.iter().map(|p| p.x));
    let (y_min, y_max) = padded_range(points.iter().map(|p| p.y));

    let mut chart = ChartBuilder::on(&root)
        .caption(spec.title, ("sans-serif", 26))
        .margin(16)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .x_desc(spec.x_desc)
        .y_desc(spec.y_desc)
        .x_label_formatter(&|x| format!("{x:.0}"))
        .draw()
        .map_err(plot_err)?;

    let show_markers = spec.marker_labels.len() > 1;
    for (color_idx, color_label) in spec.color_labels.iter().enumerate() {
        let color = spec.colors[color_idx % spec.colors.len().max(1)];
        let style = color.mix(spec.alpha).filled();
        for (marker_idx, marker_label) in spec.marker_labels.iter().enumerate() {
            let group = group_points(points, color_idx, marker_idx);
            if group.is_empty() {
                continue;
            }
            let label = if show_markers {
                format!("{color_label}, {marker_label}")
            } else {
                color_label.clone()
            };

            // One element type per marker shape
            let anno = match marker_idx % 3 {
                0 => chart
                    .draw_series(group.iter().map(|p| Circle::new(*p, 3, style)))
                    .map_err(plot_err)?,
                1 => chart
                    .draw_series(group.iter().map(|p| TriangleMarker::new(*p, 4, style)))
                    .map_err(plot_err)?,
                _ => chart
                    .draw_series(group.iter().map(|p| Cross::new(*p, 3, style)))
                    .map_err(plot_err)?,
            };
            let legend_style = color.filled();
            anno.label(label)
                .legend(move |(x, y)| Circle::new((x + 10, y), 4, legend_style));
        }
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.85))
        .border_style(BLACK)
        .draw()
        .map_err(plot_err)?;

    root.present().map_err(plot_err)?;
    Ok(())
}
