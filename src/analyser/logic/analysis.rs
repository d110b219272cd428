use super::naming;
use super::profiling;
use super::types::{
    ColumnKind, ColumnStats, ColumnSummary, CorrelationMatrix, DESCRIBE_ROWS,
    NUMERIC_DESCRIBE_ROWS, NumericStats,
};
use crate::error::{Result, ResultExt as _};
use crate::utils::{fmt_fixed, fmt_stat};
use polars::prelude::*;

pub fn analyse_df(df: &DataFrame) -> Result<Vec<ColumnSummary>> {
    df.get_columns()
        .iter()
        .map(|col| {
            profiling::analyse_column(col)
                .with_context(|| format!("Analysis failed for column '{}'", col.name()))
        })
        .collect()
}

/// Numeric column names in source order.
pub fn numeric_columns(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|c| c.dtype().is_primitive_numeric())
        .map(|c| c.name().to_string())
        .collect()
}

pub fn non_numeric_columns(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|c| !c.dtype().is_primitive_numeric())
        .map(|c| c.name().to_string())
        .collect()
}

/// Builds the describe table: a `statistic` column labelled with
/// [`DESCRIBE_ROWS`] and one text column per source column. Cells that do not
/// apply to a column's type are null.
pub fn describe_df(df: &DataFrame) -> Result<DataFrame> {
    let summaries = analyse_df(df)?;

    let names = label_first("statistic", summaries.iter().map(|s| s.name.clone()));
    let mut columns = Vec::with_capacity(summaries.len() + 1);
    columns.push(Column::from(Series::new(
        names.first().map(String::as_str).unwrap_or("statistic").into(),
        DESCRIBE_ROWS.iter().map(|s| (*s).to_owned()).collect::<Vec<_>>(),
    )));

    for (summary, name) in summaries.iter().zip(names.iter().skip(1)) {
        let cells = describe_cells(summary);
        columns.push(Column::from(Series::new(name.as_str().into(), cells)));
    }

    Ok(DataFrame::new(columns)?)
}

fn describe_cells(summary: &ColumnSummary) -> Vec<Option<String>> {
    let mut cells: Vec<Option<String>> = vec![None; DESCRIBE_ROWS.len()];
    let mut set = |label: &str, value: String| {
        if let Some(idx) = DESCRIBE_ROWS.iter().position(|r| *r == label)
            && let Some(cell) = cells.get_mut(idx)
            && !value.is_empty()
        {
            *cell = Some(value);
        }
    };

    match &summary.stats {
        ColumnStats::Numeric(s) => {
            set("count", s.count.to_string());
            for (label, value) in numeric_rows(s).into_iter().skip(1) {
                set(label, fmt_stat(value));
            }
        }
        ColumnStats::Text(s) => {
            set("count", s.count.to_string());
            set("unique", s.unique.to_string());
            if let Some((value, freq)) = &s.top {
                set("top", value.clone());
                set("freq", freq.to_string());
            }
            if let Some((first, last)) = &s.range {
                set("min", first.clone());
                set("max", last.clone());
            }
        }
    }
    cells
}

/// `(label, value)` pairs in [`NUMERIC_DESCRIBE_ROWS`] order.
fn numeric_rows(s: &NumericStats) -> [(&'static str, Option<f64>); 8] {
    [
        ("count", Some(s.count as f64)),
        ("mean", s.mean),
        ("std", s.std_dev),
        ("min", s.min),
        ("25%", s.q1),
        ("50%", s.median),
        ("75%", s.q3),
        ("max", s.max),
    ]
}

/// Fixed-width text rendering of the numeric-only describe block, or `None`
/// when the frame has no numeric columns.
pub fn numeric_describe_text(df: &DataFrame) -> Result<Option<String>> {
    let summaries: Vec<ColumnSummary> = analyse_df(df)?
        .into_iter()
        .filter(|s| s.kind == ColumnKind::Numeric)
        .collect();
    if summaries.is_empty() {
        return Ok(None);
    }

    let mut grid: Vec<Vec<String>> = Vec::with_capacity(summaries.len());
    for summary in &summaries {
        let ColumnStats::Numeric(stats) = &summary.stats else {
            continue;
        };
        let mut col = vec![summary.name.clone()];
        col.extend(numeric_rows(stats).iter().map(|(_, v)| fmt_fixed(*v)));
        grid.push(col);
    }

    let label_width = NUMERIC_DESCRIBE_ROWS.iter().map(|s| s.len()).max().unwrap_or(0);
    let widths: Vec<usize> = grid
        .iter()
        .map(|col| col.iter().map(String::len).max().unwrap_or(0))
        .collect();

    let mut out = String::new();
    for row in 0..=NUMERIC_DESCRIBE_ROWS.len() {
        let label = if row == 0 {
            ""
        } else {
            NUMERIC_DESCRIBE_ROWS.get(row - 1).copied().unwrap_or("")
        };
        out.push_str(&format!("{label:<label_width$}"));
        for (col, width) in grid.iter().zip(&widths) {
            let cell = col.get(row).map(String::as_str).unwrap_or("");
            out.push_str(&format!("  {cell:>width$}"));
        }
        out.push('\n');
    }
    Ok(Some(out))
}

/// Pearson correlation over numeric columns, using the rows where both values
/// of a pair are present. `None` when the frame has no numeric column.
pub fn calculate_correlation_matrix(df: &DataFrame) -> Result<Option<CorrelationMatrix>> {
    let numeric_cols = numeric_columns(df);
    if numeric_cols.is_empty() {
        return Ok(None);
    }

    let values = numeric_cols
        .iter()
        .map(|name| profiling::numeric_values_aligned(df.column(name)?))
        .collect::<Result<Vec<_>>>()?;

    let mut matrix = Vec::with_capacity(values.len());
    for (i, xs) in values.iter().enumerate() {
        let mut row = Vec::with_capacity(values.len());
        for (j, ys) in values.iter().enumerate() {
            let corr = pearson(xs, ys).unwrap_or(f64::NAN);
            // Exact 1.0 on the diagonal wherever it is defined.
            row.push(if i == j && corr.is_finite() { 1.0 } else { corr });
        }
        matrix.push(row);
    }

    Ok(Some(CorrelationMatrix {
        columns: numeric_cols,
        data: matrix,
    }))
}

pub fn pearson(xs: &[Option<f64>], ys: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denom = (var_x * var_y).sqrt();
    if denom <= 0.0 {
        return None;
    }
    Some((cov / denom).clamp(-1.0, 1.0))
}

/// Frame form of a correlation matrix: a `column` label column followed by one
/// `Float64` column per numeric column.
pub fn correlation_to_df(matrix: &CorrelationMatrix) -> Result<DataFrame> {
    let names = label_first("column", matrix.columns.iter().cloned());
    let mut columns = Vec::with_capacity(matrix.columns.len() + 1);
    columns.push(Column::from(Series::new(
        names.first().map(String::as_str).unwrap_or("column").into(),
        matrix.columns.clone(),
    )));
    for (j, name) in names.iter().skip(1).enumerate() {
        let values: Vec<Option<f64>> = matrix
            .data
            .iter()
            .map(|row| row.get(j).copied().filter(|v| v.is_finite()))
            .collect();
        columns.push(Column::from(Series::new(name.as_str().into(), values)));
    }
    Ok(DataFrame::new(columns)?)
}

/// `[label, names...]` made unique. When a source column already uses the
/// label name, the source column gets the suffix.
fn label_first(label: &str, names: impl Iterator<Item = String>) -> Vec<String> {
    let all: Vec<String> = std::iter::once(label.to_owned()).chain(names).collect();
    naming::make_unique(&all)
}
