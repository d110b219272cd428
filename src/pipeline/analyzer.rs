//! Statistics, correlation and distribution charts for cleaned tables.

use super::loader::{CleanedTable, LoadReport, load_existing};
use crate::analyser::logic::{
    calculate_correlation_matrix, correlation_to_df, describe_df, list_tabular_files, naming,
    numeric_columns, profiling, save_df,
};
use crate::charts;
use crate::config::PipelineConfig;
use crate::error::{Result, ResultExt as _};
use crate::workspace::OutputDir;
use polars::prelude::DataFrame;
use std::path::{Path, PathBuf};

/// Artifacts written for one table. Steps that failed are listed in
/// `errors`; the ones after them still ran.
#[derive(Debug, Clone, Default)]
pub struct AnalysisOutcome {
    pub name: String,
    pub summary: Option<PathBuf>,
    pub correlation: Option<PathBuf>,
    pub heatmap: Option<PathBuf>,
    pub histograms: Vec<PathBuf>,
    pub errors: Vec<String>,
}

impl AnalysisOutcome {
    /// Every file written for this table.
    pub fn artifacts(&self) -> Vec<&Path> {
        self.summary
            .iter()
            .chain(&self.correlation)
            .chain(&self.heatmap)
            .chain(&self.histograms)
            .map(PathBuf::as_path)
            .collect()
    }
}

pub fn analyze_all(
    tables: &[CleanedTable],
    out: &OutputDir,
    config: &PipelineConfig,
) -> Vec<AnalysisOutcome> {
    tables
        .iter()
        .map(|table| analyze_table(&table.name, &table.df, out, config))
        .collect()
}

/// Writes `summary_<name>`, then `correlation_<name>` with its heatmap, then
/// up to `histogram_limit` histograms.
pub fn analyze_table(
    name: &str,
    df: &DataFrame,
    out: &OutputDir,
    config: &PipelineConfig,
) -> AnalysisOutcome {
    tracing::info!(file = name, rows = df.height(), cols = df.width(), "Analyzing table");
    let mut outcome = AnalysisOutcome {
        name: name.to_owned(),
        ..Default::default()
    };

    match write_summary(name, df, out) {
        Ok(path) => outcome.summary = Some(path),
        Err(e) => {
            tracing::error!(file = name, "Summary failed: {e}");
            outcome.errors.push(format!("summary: {e}"));
        }
    }

    match write_correlation(name, df, out, config) {
        Ok(Some((path, heatmap))) => {
            outcome.correlation = Some(path);
            outcome.heatmap = heatmap;
        }
        Ok(None) => {
            tracing::info!(file = name, "No numeric columns; correlation skipped");
        }
        Err(e) => {
            tracing::error!(file = name, "Correlation failed: {e}");
            outcome.errors.push(format!("correlation: {e}"));
        }
    }

    outcome.histograms = write_histograms(name, df, out, config);
    outcome
}

fn write_summary(name: &str, df: &DataFrame, out: &OutputDir) -> Result<PathBuf> {
    let mut summary = describe_df(df)?;
    let path = out.join(naming::summary_file_name(name));
    save_df(&mut summary, &path).with_context(|| format!("Failed to save {}", path.display()))?;
    tracing::info!(file = %path.display(), "Saved summary");
    Ok(path)
}

fn write_correlation(
    name: &str,
    df: &DataFrame,
    out: &OutputDir,
    config: &PipelineConfig,
) -> Result<Option<(PathBuf, Option<PathBuf>)>> {
    let Some(matrix) = calculate_correlation_matrix(df)? else {
        return Ok(None);
    };

    let mut frame = correlation_to_df(&matrix)?;
    let path = out.join(naming::correlation_file_name(name));
    save_df(&mut frame, &path).with_context(|| format!("Failed to save {}", path.display()))?;
    tracing::info!(file = %path.display(), "Saved correlation matrix");

    let heatmap = charts::plot_heatmap(
        &matrix,
        &format!("Correlation Heatmap - {name}"),
        &out.join(naming::heatmap_file_name(name)),
        &config.chart,
    );
    Ok(Some((path, heatmap)))
}

fn write_histograms(
    name: &str,
    df: &DataFrame,
    out: &OutputDir,
    config: &PipelineConfig,
) -> Vec<PathBuf> {
    let columns = numeric_columns(df);
    if columns.is_empty() {
        tracing::info!(file = name, "No numeric data for histograms");
        return Vec::new();
    }

    let mut written = Vec::new();
    for column in columns.iter().take(config.histogram_limit) {
        let values = match df.column(column).map_err(Into::into).and_then(profiling::numeric_values) {
            Ok(values) => values,
            Err(e) => {
                tracing::warn!(file = name, column = %column, "Histogram skipped: {e}");
                continue;
            }
        };
        if values.is_empty() {
            tracing::info!(file = name, column = %column, "Histogram skipped: no values");
            continue;
        }
        let path = out.join(naming::histogram_file_name(name, column));
        if let Some(path) = charts::plot_histogram(&values, column, &path, &config.chart) {
            written.push(path);
        }
    }
    written
}

/// Loads every `cleaned_*` tabular file of `dir`, in file-name order.
pub fn discover_cleaned(dir: &Path) -> Result<LoadReport> {
    let files: Vec<PathBuf> = list_tabular_files(dir)?
        .into_iter()
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(naming::is_cleaned_file_name)
        })
        .collect();
    Ok(load_existing(files))
}
