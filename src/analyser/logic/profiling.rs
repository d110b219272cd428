//! Per-column statistics.
//!
//! Numeric descriptors follow the usual "describe" conventions: sample
//! standard deviation (ddof = 1) and linearly interpolated quartiles. Text
//! and date columns get count/unique/top/freq, where `top` is the most frequent
//! value and ties go to the value seen first.

use super::types::{ColumnKind, ColumnStats, ColumnSummary, NumericStats, TextStats};
use crate::error::Result;
use polars::prelude::*;
use std::collections::HashMap;

pub fn analyse_column(column: &Column) -> Result<ColumnSummary> {
    let kind = ColumnKind::from_dtype(column.dtype());
    let stats = match kind {
        ColumnKind::Numeric => ColumnStats::Numeric(analyse_numeric(column)?),
        ColumnKind::Text | ColumnKind::Temporal => ColumnStats::Text(analyse_text(column, kind)?),
    };
    Ok(ColumnSummary {
        name: column.name().to_string(),
        kind,
        nulls: column.null_count(),
        stats,
    })
}

/// Non-null values of a column cast to `f64`. Values that fail to cast are
/// dropped.
pub fn numeric_values(column: &Column) -> Result<Vec<f64>> {
    let casted = column.as_materialized_series().cast(&DataType::Float64)?;
    Ok(casted.f64()?.into_iter().flatten().filter(|v| !v.is_nan()).collect())
}

/// Values cast to `f64`, keeping row positions (`None` for nulls).
pub fn numeric_values_aligned(column: &Column) -> Result<Vec<Option<f64>>> {
    let casted = column.as_materialized_series().cast(&DataType::Float64)?;
    Ok(casted
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect())
}

/// Values cast to text, keeping row positions (`None` for nulls).
pub fn text_values(column: &Column) -> Result<Vec<Option<String>>> {
    let casted = column.as_materialized_series().cast(&DataType::String)?;
    Ok(casted
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_owned))
        .collect())
}

pub fn analyse_numeric(column: &Column) -> Result<NumericStats> {
    let mut values = numeric_values(column)?;
    values.sort_by(f64::total_cmp);
    Ok(describe_sorted(&values))
}

/// Describes already sorted values.
pub fn describe_sorted(sorted: &[f64]) -> NumericStats {
    let count = sorted.len();
    let mean = mean(sorted);
    NumericStats {
        count,
        mean,
        std_dev: std_dev(sorted, mean),
        min: sorted.first().copied(),
        q1: quantile(sorted, 0.25),
        median: quantile(sorted, 0.5),
        q3: quantile(sorted, 0.75),
        max: sorted.last().copied(),
    }
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Sample standard deviation; undefined below two values.
pub fn std_dev(values: &[f64], mean: Option<f64>) -> Option<f64> {
    let mean = mean?;
    if values.len() < 2 {
        return None;
    }
    let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    Some((ss / (values.len() - 1) as f64).sqrt())
}

/// Linear interpolation between closest ranks.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let pos = q.clamp(0.0, 1.0) * last as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let lo_v = *sorted.get(lo)?;
    let hi_v = *sorted.get(hi)?;
    Some(lo_v + (hi_v - lo_v) * (pos - lo as f64))
}

pub fn analyse_text(column: &Column, kind: ColumnKind) -> Result<TextStats> {
    let values = text_values(column)?;

    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    for value in values.into_iter().flatten() {
        let entry = counts.entry(value.clone()).or_insert(0);
        if *entry == 0 {
            order.push(value);
        }
        *entry += 1;
    }

    let mut top: Option<(String, usize)> = None;
    for value in &order {
        let count = counts.get(value).copied().unwrap_or(0);
        if top.as_ref().is_none_or(|(_, best)| count > *best) {
            top = Some((value.clone(), count));
        }
    }

    let range = if kind == ColumnKind::Temporal {
        temporal_range(column)?
    } else {
        None
    };

    Ok(TextStats {
        count: column.len() - column.null_count(),
        unique: order.len(),
        top,
        range,
    })
}

/// Earliest and latest value of a date column, rendered as text.
fn temporal_range(column: &Column) -> Result<Option<(String, String)>> {
    let series = column.as_materialized_series().drop_nulls();
    if series.is_empty() {
        return Ok(None);
    }
    let sorted = series.sort(SortOptions::default())?;
    let as_text = sorted.cast(&DataType::String)?;
    let ca = as_text.str()?;
    let first = ca.get(0).map(str::to_owned);
    let last = ca.get(ca.len() - 1).map(str::to_owned);
    Ok(first.zip(last))
}

/// Histogram bins as `(bin_start, count)` plus the bin width.
///
/// Bin width follows the Freedman-Diaconis rule, falling back to
/// `range / sqrt(n)` when the IQR is zero; the bin count is clamped to 5..=50.
/// A constant column gets a single unit-width bin.
pub fn calculate_histogram(sorted: &[f64]) -> (f64, Vec<(f64, usize)>) {
    let (Some(&min_v), Some(&max_v)) = (sorted.first(), sorted.last()) else {
        return (0.0, Vec::new());
    };

    if (max_v - min_v).abs() < f64::EPSILON {
        return (1.0, vec![(min_v - 0.5, sorted.len())]);
    }

    let n = sorted.len();
    let iqr = quantile(sorted, 0.75).unwrap_or(max_v) - quantile(sorted, 0.25).unwrap_or(min_v);
    let h = if iqr > 0.0 {
        2.0 * iqr / (n as f64).cbrt()
    } else {
        (max_v - min_v) / (n as f64).sqrt()
    };

    let num_bins = (((max_v - min_v) / h).ceil() as usize).clamp(5, 50);
    let bin_width = (max_v - min_v) / num_bins as f64;

    let mut bins = vec![0; num_bins];
    for &val in sorted {
        let idx = (((val - min_v) / bin_width).floor() as usize).min(num_bins - 1);
        if let Some(bin) = bins.get_mut(idx) {
            *bin += 1;
        }
    }

    let histogram = bins
        .into_iter()
        .enumerate()
        .map(|(i, count)| (min_v + i as f64 * bin_width, count))
        .collect();
    (bin_width, histogram)
}

/// Gaussian kernel density estimate at `points`, using Scott's bandwidth.
/// Empty when the spread is zero.
pub fn gaussian_kde(values: &[f64], points: &[f64]) -> Vec<f64> {
    let n = values.len();
    let Some(sd) = std_dev(values, mean(values)) else {
        return Vec::new();
    };
    if sd <= 0.0 {
        return Vec::new();
    }

    let bandwidth = sd * (n as f64).powf(-0.2);
    let norm = 1.0 / ((n as f64) * bandwidth * (2.0 * std::f64::consts::PI).sqrt());
    points
        .iter()
        .map(|&x| {
            values
                .iter()
                .map(|&v| (-0.5 * ((x - v) / bandwidth).powi(2)).exp())
                .sum::<f64>()
                * norm
        })
        .collect()
}
