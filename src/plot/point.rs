//! Point plots: mean score per category with confidence intervals,
//! one connected line per hue level, optionally split into facets.

use std::path::Path;

use plotters::prelude::*;

use crate::error::{BmdError, Result};
use crate::plot::plot_err;
use crate::plot::estimates::PointEstimate;

/// Everything a point plot needs besides the estimates
pub struct PointPlotSpec<'a> {
    pub title: &'a str,
    pub x_desc: &'a str,
    pub y_desc: &'a str,
    pub x_labels: &'a [String],
    pub hue_labels: &'a [String],
    /// One label per facet; a single empty label draws one panel
    pub facet_labels: &'a [String],
    pub colors: &'a [RGBColor],
}

fn y_range(estimates: &[PointEstimate]) -> (f64, f64) {
    let lo = estimates
        .iter()
        .map(|e| e.lower.min(e.mean))
        .fold(f64::INFINITY, f64::min);
    let hi = estimates
        .iter()
        .map(|e| e.upper.max(e.mean))
        .fold(f64::NEG_INFINITY, f64::max);
    if !lo.is_finite() || !hi.is_finite() {
        return (-1.0, 1.0);
    }
    let pad = ((hi - lo) * 0.08).max(0.1);
    (lo - pad, hi + pad)
}

/// Render a point plot to a PNG file
pub fn render_point_plot(
    path: &Path,
    spec: &PointPlotSpec<'_>,
    estimates: &[PointEstimate],
) -> Result<()> {
    if estimates.is_empty() {
        return Err(BmdError::PlotError(format!(
            "{}: no data to plot",
            spec.title
        )));
    }

    let panels = spec.facet_labels.len().max(1);
    let width = 420 * panels as u32 + 180;
    let root = BitMapBackend::new(path, (width, 620)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;
    let root = root
        .titled(spec.title, ("sans-serif", 26))
        .map_err(plot_err)?;

    let (y_min, y_max) = y_range(estimates);
    let n_x = spec.x_labels.len() as i32;
    let x_labels = spec.x_labels;
    let x_formatter = |x: &i32| {
        usize::try_from(*x)
            .ok()
            .and_then(|i| x_labels.get(i))
            .cloned()
            .unwrap_or_default()
    };

    for (facet, area) in root.split_evenly((1, panels)).iter().enumerate() {
        let caption = spec.facet_labels.get(facet).cloned().unwrap_or_default();
        let mut chart = ChartBuilder::on(area)
            .caption(caption, ("sans-serif", 20))
            .margin(12)
            .x_label_area_size(70)
            .y_label_area_size(if facet == 0 { 60 } else { 30 })
            .build_cartesian_2d(-1..n_x, y_min..y_max)
            .map_err(plot_err)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(spec.x_labels.len() + 2)
            .x_label_formatter(&x_formatter)
            .x_label_style(
                ("sans-serif", 13)
                    .into_font()
                    .transform(FontTransform::Rotate90),
            )
            .x_desc(spec.x_desc)
            .y_desc(if facet == 0 { spec.y_desc } else { "" })
            .draw()
            .map_err(plot_err)?;

        for (hue, hue_label) in spec.hue_labels.iter().enumerate() {
            let color = spec.colors[hue % spec.colors.len().max(1)];
            let cells: Vec<&PointEstimate> = estimates
                .iter()
                .filter(|e| e.facet == facet && e.hue == hue)
                .collect();
            if cells.is_empty() {
                continue;
            }

            chart
                .draw_series(cells.iter().map(|e| {
                    PathElement::new(
                        vec![(e.x as i32, e.lower), (e.x as i32, e.upper)],
                        color.stroke_width(2),
                    )
                }))
                .map_err(plot_err)?;

            let line = chart
                .draw_series(LineSeries::new(
                    cells.iter().map(|e| (e.x as i32, e.mean)),
                    color.stroke_width(2),
                ))
                .map_err(plot_err)?;
            if facet + 1 == panels {
                line.label(hue_label.as_str()).legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
                });
            }

            chart
                .draw_series(
                    cells
                        .iter()
                        .map(|e| Circle::new((e.x as i32, e.mean), 4, color.filled())),
                )
                .map_err(plot_err)?;
        }

        if facet + 1 == panels && spec.hue_labels.len() > 1 {
            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperRight)
                .background_style(WHITE.mix(0.85))
                .border_style(BLACK)
                .label_font(("sans-serif", 13))
                .draw()
                .map_err(plot_err)?;
        }
    }

    root.present().map_err(plot_err)?;
    Ok(())
}
