//! Bar and line charts over categorical or ordered x values.

use super::fonts::FONT_FAMILY;
use super::{AxisLabels, ChartStyle, short_label, value_range};
use crate::analyser::logic::profiling::{numeric_values_aligned, text_values};
use anyhow::{Context as _, bail};
use plotters::coord::ranged1d::SegmentValue;
use plotters::prelude::*;
use polars::prelude::*;
use std::collections::HashMap;
use std::path::Path;

const BAR_COLOR: RGBColor = RGBColor(76, 114, 176);

/// One aggregated x value.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryPoint {
    pub label: String,
    pub value: f64,
}

impl CategoryPoint {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryOrder {
    /// Order in which each x value first appears
    FirstSeen,
    /// Ascending x; numeric and date columns sort by value, text by label
    SortedByX,
}

struct Group {
    label: String,
    key: Option<f64>,
    sum: f64,
    count: usize,
}

/// Mean of `y_col` for each distinct non-null `x_col` value. Rows with a null
/// x or y are ignored.
pub fn mean_by_category(
    df: &DataFrame,
    x_col: &str,
    y_col: &str,
    order: CategoryOrder,
) -> anyhow::Result<Vec<CategoryPoint>> {
    let x = df
        .column(x_col)
        .with_context(|| format!("column '{x_col}' not found"))?;
    let y = df
        .column(y_col)
        .with_context(|| format!("column '{y_col}' not found"))?;

    let labels = text_values(x)?;
    let keys = sort_keys(x)?;
    let values = numeric_values_aligned(y)?;

    let mut groups: Vec<Group> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for (row, (label, value)) in labels.into_iter().zip(values).enumerate() {
        let (Some(label), Some(value)) = (label, value) else {
            continue;
        };
        let slot = *index.entry(label.clone()).or_insert_with(|| {
            groups.push(Group {
                label,
                key: keys.as_ref().and_then(|k| k.get(row).copied().flatten()),
                sum: 0.0,
                count: 0,
            });
            groups.len() - 1
        });
        if let Some(group) = groups.get_mut(slot) {
            group.sum += value;
            group.count += 1;
        }
    }

    if groups.is_empty() {
        bail!("no rows with both '{x_col}' and a numeric '{y_col}' value");
    }

    if order == CategoryOrder::SortedByX {
        groups.sort_by(|a, b| match (a.key, b.key) {
            (Some(ka), Some(kb)) => ka.total_cmp(&kb),
            _ => a.label.cmp(&b.label),
        });
    }

    Ok(groups
        .into_iter()
        .map(|g| CategoryPoint::new(g.label, g.sum / g.count as f64))
        .collect())
}

/// Numeric sort keys for numeric and date columns; `None` for text.
fn sort_keys(column: &Column) -> anyhow::Result<Option<Vec<Option<f64>>>> {
    let dtype = column.dtype();
    if dtype.is_primitive_numeric() {
        return Ok(Some(numeric_values_aligned(column)?));
    }
    if dtype.is_temporal() {
        let physical = column.as_materialized_series().to_physical_repr();
        let casted = physical.cast(&DataType::Float64)?;
        return Ok(Some(casted.f64()?.into_iter().collect()));
    }
    Ok(None)
}

pub fn draw_bars(
    path: &Path,
    points: &[CategoryPoint],
    labels: &AxisLabels<'_>,
    style: &ChartStyle,
) -> anyhow::Result<()> {
    if points.is_empty() {
        bail!("nothing to plot");
    }
    let root = BitMapBackend::new(path, (style.width, style.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let (lo, hi) = value_range(points.iter().map(|p| p.value), true);
    let mut builder = ChartBuilder::on(&root);
    builder.margin(20);
    if style.text {
        builder
            .caption(labels.title, (FONT_FAMILY, 24))
            .x_label_area_size(140)
            .y_label_area_size(70);
    }
    let mut chart = builder.build_cartesian_2d((0..points.len()).into_segmented(), lo..hi)?;

    let tick = |v: &SegmentValue<usize>| match v {
        SegmentValue::Exact(i) | SegmentValue::CenterOf(i) => {
            points.get(*i).map(|p| short_label(&p.label)).unwrap_or_default()
        }
        SegmentValue::Last => String::new(),
    };
    let mut mesh = chart.configure_mesh();
    mesh.disable_x_mesh();
    if style.text {
        mesh.x_labels(points.len().min(60))
            .x_label_formatter(&tick)
            .x_label_style((FONT_FAMILY, 12).into_font().transform(FontTransform::Rotate90))
            .x_desc(labels.x)
            .y_desc(labels.y);
    } else {
        mesh.x_labels(0).y_labels(0);
    }
    mesh.draw()?;

    chart.draw_series(
        Histogram::vertical(&chart)
            .style(BAR_COLOR.filled())
            .margin(6)
            .data(points.iter().enumerate().map(|(i, p)| (i, p.value))),
    )?;

    root.present()?;
    Ok(())
}

pub fn draw_line(
    path: &Path,
    points: &[CategoryPoint],
    labels: &AxisLabels<'_>,
    style: &ChartStyle,
) -> anyhow::Result<()> {
    if points.is_empty() {
        bail!("nothing to plot");
    }
    let root = BitMapBackend::new(path, (style.width, style.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let (lo, hi) = value_range(points.iter().map(|p| p.value), false);
    let mut builder = ChartBuilder::on(&root);
    builder.margin(20);
    if style.text {
        builder
            .caption(labels.title, (FONT_FAMILY, 24))
            .x_label_area_size(140)
            .y_label_area_size(70);
    }
    let mut chart = builder.build_cartesian_2d((0..points.len()).into_segmented(), lo..hi)?;

    let tick = |v: &SegmentValue<usize>| match v {
        SegmentValue::Exact(i) | SegmentValue::CenterOf(i) => {
            points.get(*i).map(|p| short_label(&p.label)).unwrap_or_default()
        }
        SegmentValue::Last => String::new(),
    };
    let mut mesh = chart.configure_mesh();
    if style.text {
        mesh.x_labels(points.len().min(60))
            .x_label_formatter(&tick)
            .x_label_style((FONT_FAMILY, 12).into_font().transform(FontTransform::Rotate90))
            .x_desc(labels.x)
            .y_desc(labels.y);
    } else {
        mesh.x_labels(0).y_labels(0);
    }
    mesh.draw()?;

    let coords: Vec<(SegmentValue<usize>, f64)> = points
        .iter()
        .enumerate()
        .map(|(i, p)| (SegmentValue::CenterOf(i), p.value))
        .collect();
    chart.draw_series(LineSeries::new(coords.iter().cloned(), BAR_COLOR.stroke_width(2)))?;
    chart.draw_series(
        coords
            .iter()
            .map(|(x, y)| Circle::new((x.clone(), *y), 4, BAR_COLOR.filled())),
    )?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_by_category_first_seen() -> anyhow::Result<()> {
        let df = df![
            "Region" => [Some("North"), Some("South"), Some("North"), None],
            "Sales" => [Some(10.0), Some(20.0), Some(30.0), Some(99.0)],
        ]?;

        let points = mean_by_category(&df, "Region", "Sales", CategoryOrder::FirstSeen)?;
        assert_eq!(
            points,
            vec![CategoryPoint::new("North", 20.0), CategoryPoint::new("South", 20.0)]
        );
        Ok(())
    }

    #[test]
    fn test_mean_by_category_sorts_numeric_x_by_value() -> anyhow::Result<()> {
        let df = df![
            "Size" => [10i64, 9, 100, 9],
            "Cost" => [1.0, 2.0, 3.0, 4.0],
        ]?;

        let points = mean_by_category(&df, "Size", "Cost", CategoryOrder::SortedByX)?;
        let labels: Vec<&str> = points.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, ["9", "10", "100"]);
        assert_eq!(points.first().map(|p| p.value), Some(3.0));
        Ok(())
    }

    #[test]
    fn test_mean_by_category_skips_null_y() -> anyhow::Result<()> {
        let df = df![
            "Kind" => ["a", "a", "b"],
            "Cost" => [Some(1.0), None, None],
        ]?;

        let points = mean_by_category(&df, "Kind", "Cost", CategoryOrder::FirstSeen)?;
        assert_eq!(points, vec![CategoryPoint::new("a", 1.0)]);
        Ok(())
    }

    #[test]
    fn test_mean_by_category_errors_without_values() -> anyhow::Result<()> {
        let df = df!["Kind" => ["a", "b"], "Note" => ["x", "y"]]?;
        assert!(mean_by_category(&df, "Kind", "Note", CategoryOrder::FirstSeen).is_err());
        assert!(mean_by_category(&df, "Missing", "Note", CategoryOrder::FirstSeen).is_err());
        Ok(())
    }
}
