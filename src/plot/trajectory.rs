//! Individual score trajectories: one faint line per subject.

use std::path::Path;

use plotters::prelude::*;

use crate::error::{BmdError, Result};
use crate::plot::plot_err;
use crate::plot::scatter::padded_range;

/// One subject's (decimal year, score) sequence
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryLine {
    pub points: Vec<(f64, f64)>,
    pub group: usize,
}

/// Render all trajectories to a PNG file
pub fn render_trajectories(
    path: &Path,
    title: &str,
    group_labels: &[String],
    colors: &[RGBColor],
    alpha: f64,
    lines: &[TrajectoryLine],
) -> Result<()> {
    if lines.is_empty() {
        return Err(BmdError::PlotError(format!("{title}: no data to plot")));
    }

    let root = BitMapBackend::new(path, (1100, 700)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let (x_min, x_max) = padded_range(lines.iter().flat_map(|l| l.points.iter().map(|p| p.0)));
    let (y_min, y_max) = padded_range(lines.iter().flat_map(|l| l.points.iter().map(|p| p.1)));

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 26))
        .margin(16)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .x_desc("Exam date")
        .y_desc("T-Score")
        .x_label_formatter(&|x| format!("{x:.0}"))
        .draw()
        .map_err(plot_err)?;

    let mut labelled = vec![false; group_labels.len()];
    for line in lines {
        let color = colors[line.group % colors.len().max(1)];
        let points = line.points.iter().copied().filter(|(x, y)| x.is_finite() && y.is_finite());
        let anno = chart
            .draw_series(LineSeries::new(points, color.mix(alpha).stroke_width(1)))
            .map_err(plot_err)?;
        if let Some(done) = labelled.get_mut(line.group) {
            if !*done {
                *done = true;
                anno.label(group_labels[line.group].as_str()).legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
                });
            }
        }
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.85))
        .border_style(BLACK)
        .draw()
        .map_err(plot_err)?;

    root.present().map_err(plot_err)?;
    Ok(())
}
