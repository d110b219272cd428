//! Correlation heatmap.
//!
//! Cells run from blue (-1) through grey (0) to red (+1), and each is
//! annotated with its coefficient when text is available. Undefined
//! coefficients are drawn in a neutral light grey with no annotation.

use super::fonts::FONT_FAMILY;
use super::{ChartStyle, short_label};
use crate::analyser::logic::CorrelationMatrix;
use anyhow::bail;
use plotters::coord::ranged1d::SegmentValue;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::Path;

const COOL: (f64, f64, f64) = (59.0, 76.0, 192.0);
const NEUTRAL: (f64, f64, f64) = (221.0, 221.0, 221.0);
const WARM: (f64, f64, f64) = (180.0, 4.0, 38.0);
const UNDEFINED: RGBColor = RGBColor(240, 240, 240);

/// Diverging colour for a coefficient in `[-1, 1]`.
pub fn coefficient_color(value: f64) -> RGBColor {
    if !value.is_finite() {
        return UNDEFINED;
    }
    let t = (value.clamp(-1.0, 1.0) + 1.0) / 2.0;
    let (from, to, u) = if t < 0.5 {
        (COOL, NEUTRAL, t * 2.0)
    } else {
        (NEUTRAL, WARM, (t - 0.5) * 2.0)
    };
    let lerp = |a: f64, b: f64| (a + (b - a) * u).round().clamp(0.0, 255.0) as u8;
    RGBColor(lerp(from.0, to.0), lerp(from.1, to.1), lerp(from.2, to.2))
}

pub fn draw_heatmap(
    path: &Path,
    matrix: &CorrelationMatrix,
    title: &str,
    style: &ChartStyle,
) -> anyhow::Result<()> {
    let n = matrix.columns.len();
    if n == 0 {
        bail!("correlation matrix is empty");
    }

    let root = BitMapBackend::new(path, (style.width, style.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut builder = ChartBuilder::on(&root);
    builder.margin(20);
    if style.text {
        builder
            .caption(title, (FONT_FAMILY, 24))
            .x_label_area_size(140)
            .y_label_area_size(140);
    }
    let mut chart = builder.build_cartesian_2d((0..n).into_segmented(), (0..n).into_segmented())?;

    // Row 0 is drawn at the top.
    let row_label = |v: &SegmentValue<usize>| match v {
        SegmentValue::Exact(i) | SegmentValue::CenterOf(i) => (n - 1)
            .checked_sub(*i)
            .and_then(|row| matrix.columns.get(row))
            .map(|name| short_label(name))
            .unwrap_or_default(),
        SegmentValue::Last => String::new(),
    };
    let col_label = |v: &SegmentValue<usize>| match v {
        SegmentValue::Exact(i) | SegmentValue::CenterOf(i) => {
            matrix.columns.get(*i).map(|name| short_label(name)).unwrap_or_default()
        }
        SegmentValue::Last => String::new(),
    };

    let mut mesh = chart.configure_mesh();
    mesh.disable_mesh();
    if style.text {
        mesh.x_labels(n)
            .y_labels(n)
            .x_label_formatter(&col_label)
            .y_label_formatter(&row_label)
            .x_label_style((FONT_FAMILY, 12).into_font().transform(FontTransform::Rotate90))
            .y_label_style((FONT_FAMILY, 12));
    } else {
        mesh.x_labels(0).y_labels(0);
    }
    mesh.draw()?;

    let cells: Vec<(usize, usize, f64)> = (0..n)
        .flat_map(|i| (0..n).map(move |j| (i, j)))
        .map(|(i, j)| {
            let value = matrix.data.get(i).and_then(|row| row.get(j)).copied();
            (i, j, value.unwrap_or(f64::NAN))
        })
        .collect();

    chart.draw_series(cells.iter().map(|&(i, j, value)| {
        let y = n - 1 - i;
        Rectangle::new(
            [
                (SegmentValue::Exact(j), SegmentValue::Exact(y)),
                (SegmentValue::Exact(j + 1), SegmentValue::Exact(y + 1)),
            ],
            coefficient_color(value).filled(),
        )
    }))?;

    if style.text {
        let font_size = if n > 12 { 10 } else { 14 };
        let text_style = (FONT_FAMILY, font_size)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Center));
        chart.draw_series(cells.iter().filter(|c| c.2.is_finite()).map(|&(i, j, value)| {
            Text::new(
                format!("{value:.2}"),
                (SegmentValue::CenterOf(j), SegmentValue::CenterOf(n - 1 - i)),
                text_style.clone(),
            )
        }))?;
    }

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coefficient_color_endpoints() {
        assert_eq!(coefficient_color(-1.0), RGBColor(59, 76, 192));
        assert_eq!(coefficient_color(0.0), RGBColor(221, 221, 221));
        assert_eq!(coefficient_color(1.0), RGBColor(180, 4, 38));
        assert_eq!(coefficient_color(f64::NAN), UNDEFINED);
        // Out of range values are clamped.
        assert_eq!(coefficient_color(3.0), coefficient_color(1.0));
    }

    #[test]
    fn test_heatmap_renders() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("heatmap.png");
        let matrix = CorrelationMatrix {
            columns: vec!["a".into(), "b".into()],
            data: vec![vec![1.0, -0.5], vec![-0.5, 1.0]],
        };
        let style = ChartStyle {
            width: 400,
            height: 400,
            text: false,
        };

        draw_heatmap(&path, &matrix, "Correlation", &style)?;
        assert!(path.exists());
        Ok(())
    }
}
