//! The full run: clean, analyse, chart the focus table, answer queries and
//! write the report.

use super::analyzer::{AnalysisOutcome, analyze_all};
use super::loader::{LoadReport, load_and_clean_all};
use crate::analyser::logic::cleaning::strip_column_line_breaks;
use crate::analyser::logic::{list_tabular_files, load_df, non_numeric_columns, numeric_columns};
use crate::charts::Visualizer;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::query::{QueryEngine, repl};
use crate::report;
use crate::workspace::Workspace;
use polars::prelude::DataFrame;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Table used for charts, queries and the report
    pub focus_file: Option<PathBuf>,
    /// Whether to read queries before writing the report
    pub interactive: bool,
}

#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub load: LoadReport,
    pub analyses: Vec<AnalysisOutcome>,
    pub focus_file: Option<PathBuf>,
    pub charts: Vec<PathBuf>,
    pub queries_answered: usize,
    pub report: Option<PathBuf>,
}

/// The focus file: the explicit option, then `config.focus_file`, then the
/// first tabular file of the input directory.
pub fn resolve_focus_file(config: &PipelineConfig, options: &RunOptions) -> Option<PathBuf> {
    if let Some(path) = options.focus_file.clone().or_else(|| config.focus_file.clone()) {
        return Some(path);
    }
    match list_tabular_files(&config.input_dir) {
        Ok(files) => files.into_iter().next(),
        Err(e) => {
            tracing::warn!(dir = %config.input_dir.display(), "No focus file: {e}");
            None
        }
    }
}

/// Loads the focus table. Line breaks and tabs are stripped from its column
/// names; it is otherwise used as loaded.
pub fn load_focus_table(path: &Path) -> Result<DataFrame> {
    let df = strip_column_line_breaks(load_df(path)?)?;
    tracing::info!(
        file = %path.display(),
        rows = df.height(),
        cols = df.width(),
        "Loaded focus table"
    );
    Ok(df)
}

/// Runs every stage. Progress lines and query responses go to `output`;
/// queries are read from `input` when `options.interactive` is set.
///
/// Only workspace setup and writes to `output` are errors. Stage failures are
/// logged and leave the later stages running.
pub fn run<R: BufRead, W: Write>(
    config: &PipelineConfig,
    options: &RunOptions,
    input: R,
    mut output: W,
) -> Result<RunSummary> {
    let workspace = Workspace::prepare(config)?;
    let mut summary = RunSummary::default();

    writeln!(output, "Cleaning files in {}", workspace.input_dir.display())?;
    summary.load = match load_and_clean_all(&workspace.input_dir, &workspace.output) {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(dir = %workspace.input_dir.display(), "Loading failed: {e}");
            LoadReport::default()
        }
    };
    writeln!(output, "{}", summary.load.summary())?;

    summary.analyses = analyze_all(&summary.load.cleaned, &workspace.output, config);
    let artifacts: usize = summary.analyses.iter().map(|a| a.artifacts().len()).sum();
    writeln!(
        output,
        "Analyzed {} table(s), {artifacts} artifact(s) in {}",
        summary.analyses.len(),
        workspace.output.path().display()
    )?;

    summary.focus_file = resolve_focus_file(config, options);
    let Some(focus_path) = summary.focus_file.clone() else {
        tracing::warn!("No focus table; skipping charts, queries and report");
        writeln!(output, "No focus table found; skipping charts, queries and report")?;
        return Ok(summary);
    };
    let df = match load_focus_table(&focus_path) {
        Ok(df) => df,
        Err(e) => {
            tracing::error!(file = %focus_path.display(), "Focus table failed to load: {e}");
            writeln!(output, "Could not load {}: {e}", focus_path.display())?;
            return Ok(summary);
        }
    };
    writeln!(output, "Columns: {:?}", df.get_column_names_str())?;

    let visualizer = Visualizer::new(workspace.output.clone(), &config.chart);
    summary.charts = focus_charts(&df, &visualizer);
    writeln!(output, "Generated {} chart(s)", summary.charts.len())?;

    let engine = QueryEngine::new(df, visualizer);
    if options.interactive {
        writeln!(output, "Type your query (type 'exit' to quit):")?;
        summary.queries_answered = repl::run(&engine, input, &mut output)?;
    }

    let report_path = workspace.reports.join(&config.report_file_name);
    match report::generate_pdf(engine.table(), workspace.output.path(), &report_path) {
        Ok(outcome) => {
            writeln!(
                output,
                "Report written to {} ({} page(s))",
                outcome.path.display(),
                outcome.pages
            )?;
            summary.report = Some(outcome.path);
        }
        Err(e) => {
            tracing::error!(file = %report_path.display(), "Report failed: {e}");
            writeln!(output, "Report failed: {e}")?;
        }
    }

    Ok(summary)
}

/// Bar and line chart of the first numeric column against the first
/// non-numeric one.
fn focus_charts(df: &DataFrame, visualizer: &Visualizer) -> Vec<PathBuf> {
    let numeric = numeric_columns(df);
    let other = non_numeric_columns(df);
    tracing::debug!(numeric = ?numeric, non_numeric = ?other, "Focus table columns");

    let (Some(x), Some(y)) = (other.first(), numeric.first()) else {
        tracing::info!("Not enough valid columns for visualization");
        return Vec::new();
    };

    [
        visualizer.plot_bar(df, x, y, &format!("Bar Chart: {y} by {x}")),
        visualizer.plot_line(df, x, y, &format!("Line Chart: {y} over {x}")),
    ]
    .into_iter()
    .flatten()
    .collect()
}
