//! Histogram with a kernel density overlay.

use super::ChartStyle;
use super::fonts::FONT_FAMILY;
use crate::analyser::logic::profiling::{calculate_histogram, gaussian_kde};
use anyhow::bail;
use plotters::prelude::*;
use std::path::Path;

const BIN_COLOR: RGBColor = RGBColor(76, 114, 176);
const CURVE_COLOR: RGBColor = RGBColor(221, 132, 82);
const CURVE_SAMPLES: usize = 200;

/// Draws the distribution of `values`. The density curve is scaled to counts
/// (`n * bin_width`) so it sits on the bars.
pub fn draw_histogram(
    path: &Path,
    values: &[f64],
    column: &str,
    style: &ChartStyle,
) -> anyhow::Result<()> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        bail!("column '{column}' has no numeric values");
    }
    sorted.sort_by(f64::total_cmp);

    let (bin_width, bins) = calculate_histogram(&sorted);
    let (Some(first), Some(last)) = (bins.first(), bins.last()) else {
        bail!("no histogram bins for '{column}'");
    };
    let x_min = first.0;
    let x_max = last.0 + bin_width;

    let xs: Vec<f64> = (0..CURVE_SAMPLES)
        .map(|i| x_min + (x_max - x_min) * i as f64 / (CURVE_SAMPLES - 1) as f64)
        .collect();
    let scale = sorted.len() as f64 * bin_width;
    let curve: Vec<(f64, f64)> = xs
        .iter()
        .zip(gaussian_kde(&sorted, &xs))
        .map(|(&x, d)| (x, d * scale))
        .collect();

    let max_count = bins.iter().map(|b| b.1).max().unwrap_or(0) as f64;
    let max_curve = curve.iter().map(|p| p.1).fold(0.0, f64::max);
    let y_max = max_count.max(max_curve).max(1.0) * 1.1;

    let root = BitMapBackend::new(path, (style.width, style.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut builder = ChartBuilder::on(&root);
    builder.margin(20);
    if style.text {
        builder
            .caption(format!("Distribution of {column}"), (FONT_FAMILY, 24))
            .x_label_area_size(50)
            .y_label_area_size(60);
    }
    let mut chart = builder.build_cartesian_2d(x_min..x_max, 0.0..y_max)?;

    let mut mesh = chart.configure_mesh();
    if style.text {
        mesh.x_desc(column).y_desc("Count");
    } else {
        mesh.x_labels(0).y_labels(0);
    }
    mesh.draw()?;

    chart.draw_series(bins.iter().map(|&(start, count)| {
        Rectangle::new(
            [(start, 0.0), (start + bin_width, count as f64)],
            BIN_COLOR.mix(0.6).filled(),
        )
    }))?;
    chart.draw_series(bins.iter().map(|&(start, count)| {
        Rectangle::new([(start, 0.0), (start + bin_width, count as f64)], WHITE.stroke_width(1))
    }))?;

    if !curve.is_empty() {
        chart.draw_series(LineSeries::new(curve, CURVE_COLOR.stroke_width(2)))?;
    }

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_text() -> ChartStyle {
        ChartStyle {
            width: 400,
            height: 300,
            text: false,
        }
    }

    #[test]
    fn test_histogram_renders() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("hist.png");
        let values: Vec<f64> = (0..100).map(|i| (i % 17) as f64 * 1.5).collect();

        draw_histogram(&path, &values, "Weight", &no_text())?;
        assert!(path.exists());
        Ok(())
    }

    #[test]
    fn test_constant_column_renders_single_bin() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("flat.png");

        draw_histogram(&path, &[3.0, 3.0, 3.0], "Flat", &no_text())?;
        assert!(path.exists());
        Ok(())
    }

    #[test]
    fn test_empty_values_fail() {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("{e}"));
        let path = dir.path().join("none.png");
        assert!(draw_histogram(&path, &[f64::NAN], "Empty", &no_text()).is_err());
        assert!(!path.exists());
    }
}
