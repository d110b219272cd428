//! PNG chart rendering.
//!
//! Every public entry point catches its own failures: a chart that cannot be
//! drawn is logged at `warn` and reported as `None`, never as an error.

pub mod categorical;
pub mod distribution;
pub mod fonts;
pub mod heatmap;

pub use categorical::{CategoryPoint, CategoryOrder, mean_by_category};

use crate::analyser::logic::{CorrelationMatrix, naming};
use crate::config::ChartSettings;
use crate::workspace::OutputDir;
use polars::prelude::DataFrame;
use std::path::{Path, PathBuf};

/// Resolved drawing options for one chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartStyle {
    pub width: u32,
    pub height: u32,
    /// Whether captions and tick labels are drawn
    pub text: bool,
}

impl ChartStyle {
    pub fn from_settings(settings: &ChartSettings) -> Self {
        Self {
            width: settings.width.max(200),
            height: settings.height.max(150),
            text: fonts::ensure_registered(settings),
        }
    }
}

/// Renders bar and line charts into one output directory.
#[derive(Debug, Clone)]
pub struct Visualizer {
    out: OutputDir,
    style: ChartStyle,
}

impl Visualizer {
    pub fn new(out: OutputDir, settings: &ChartSettings) -> Self {
        Self {
            out,
            style: ChartStyle::from_settings(settings),
        }
    }

    pub fn output_dir(&self) -> &OutputDir {
        &self.out
    }

    /// Bar chart of the mean of `y_col` per distinct `x_col` value, in
    /// first-seen order.
    pub fn plot_bar(&self, df: &DataFrame, x_col: &str, y_col: &str, title: &str) -> Option<PathBuf> {
        let points = match mean_by_category(df, x_col, y_col, CategoryOrder::FirstSeen) {
            Ok(points) => points,
            Err(e) => {
                tracing::warn!(x = x_col, y = y_col, "Bar chart skipped: {e:#}");
                return None;
            }
        };
        self.plot_bar_points(&points, x_col, y_col, title)
    }

    /// Bar chart of already aggregated points.
    pub fn plot_bar_points(
        &self,
        points: &[CategoryPoint],
        x_col: &str,
        y_col: &str,
        title: &str,
    ) -> Option<PathBuf> {
        let path = self.out.join(naming::bar_chart_file_name(y_col, x_col));
        let labels = AxisLabels { title, x: x_col, y: y_col };
        finish(
            categorical::draw_bars(&path, points, &labels, &self.style),
            path,
            "bar chart",
        )
    }

    /// Line chart of the mean of `y_col` per distinct `x_col` value, sorted by x.
    pub fn plot_line(&self, df: &DataFrame, x_col: &str, y_col: &str, title: &str) -> Option<PathBuf> {
        let points = match mean_by_category(df, x_col, y_col, CategoryOrder::SortedByX) {
            Ok(points) => points,
            Err(e) => {
                tracing::warn!(x = x_col, y = y_col, "Line chart skipped: {e:#}");
                return None;
            }
        };
        let path = self.out.join(naming::line_chart_file_name(y_col, x_col));
        let labels = AxisLabels { title, x: x_col, y: y_col };
        finish(
            categorical::draw_line(&path, &points, &labels, &self.style),
            path,
            "line chart",
        )
    }
}

/// Caption and axis descriptions.
#[derive(Debug, Clone, Copy)]
pub struct AxisLabels<'a> {
    pub title: &'a str,
    pub x: &'a str,
    pub y: &'a str,
}

/// Histogram with a density curve for one numeric column.
pub fn plot_histogram(
    values: &[f64],
    column: &str,
    path: &Path,
    settings: &ChartSettings,
) -> Option<PathBuf> {
    let style = ChartStyle::from_settings(settings);
    finish(
        distribution::draw_histogram(path, values, column, &style),
        path.to_path_buf(),
        "histogram",
    )
}

/// Annotated correlation heatmap.
pub fn plot_heatmap(
    matrix: &CorrelationMatrix,
    title: &str,
    path: &Path,
    settings: &ChartSettings,
) -> Option<PathBuf> {
    let style = ChartStyle::from_settings(settings);
    finish(
        heatmap::draw_heatmap(path, matrix, title, &style),
        path.to_path_buf(),
        "heatmap",
    )
}

fn finish(result: anyhow::Result<()>, path: PathBuf, kind: &str) -> Option<PathBuf> {
    match result {
        Ok(()) => {
            tracing::info!(file = %path.display(), "Saved {kind}");
            Some(path)
        }
        Err(e) => {
            tracing::warn!(file = %path.display(), "Failed to render {kind}: {e:#}");
            // A half-written image must not reach the report.
            if path.exists() {
                let _ = std::fs::remove_file(&path);
            }
            None
        }
    }
}

/// `(low, high)` axis bounds covering `values`, padded by a tenth of the span.
/// With `include_zero` the range always reaches the baseline.
pub(crate) fn value_range(values: impl Iterator<Item = f64>, include_zero: bool) -> (f64, f64) {
    let (mut lo, mut hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    if include_zero {
        lo = lo.min(0.0);
        hi = hi.max(0.0);
    }
    let span = hi - lo;
    if span <= f64::EPSILON {
        return (lo - 1.0, hi + 1.0);
    }
    let pad = span * 0.1;
    let lo = if include_zero && lo == 0.0 { 0.0 } else { lo - pad };
    let hi = if include_zero && hi == 0.0 { 0.0 } else { hi + pad };
    (lo, hi)
}

/// Shortens long tick labels so rotated text stays inside the label area.
pub(crate) fn short_label(label: &str) -> String {
    const MAX_CHARS: usize = 18;
    if label.chars().count() <= MAX_CHARS {
        label.to_owned()
    } else {
        let head: String = label.chars().take(MAX_CHARS - 1).collect();
        format!("{head}…")
    }
}

#[cfg(test)]
mod tests {
    #![expect(clippy::unwrap_used)]

    use super::*;
    use polars::prelude::*;

    fn visualizer(dir: &Path) -> Visualizer {
        Visualizer::new(OutputDir::ensure(dir).unwrap(), &ChartSettings::default())
    }

    #[test]
    fn test_plot_bar_writes_convention_name() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let df = df![
            "Region" => ["North", "South", "North", "East"],
            "Sales" => [10.0, 20.0, 30.0, 5.0],
        ]?;

        let path = visualizer(dir.path()).plot_bar(&df, "Region", "Sales", "Sales by region");
        let path = path.unwrap();
        assert_eq!(path, dir.path().join("BarChart_Sales_by_Region.png"));
        assert!(path.exists());
        Ok(())
    }

    #[test]
    fn test_plot_line_writes_convention_name() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let df = df![
            "Year" => [2021i64, 2020, 2022, 2020],
            "Output" => [3.0, 1.0, 4.0, 2.0],
        ]?;

        let path = visualizer(dir.path()).plot_line(&df, "Year", "Output", "Output over time");
        assert_eq!(path, Some(dir.path().join("LineChart_Output_over_Year.png")));
        assert!(dir.path().join("LineChart_Output_over_Year.png").exists());
        Ok(())
    }

    #[test]
    fn test_missing_column_gives_none_and_no_file() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let df = df!["Region" => ["a", "b"], "Sales" => [1.0, 2.0]]?;

        let viz = visualizer(dir.path());
        assert!(viz.plot_bar(&df, "Region", "Missing", "t").is_none());
        assert!(viz.plot_line(&df, "Missing", "Sales", "t").is_none());
        assert_eq!(std::fs::read_dir(dir.path())?.count(), 0);
        Ok(())
    }

    #[test]
    fn test_non_numeric_y_gives_none() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let df = df!["Region" => ["a", "b"], "Name" => ["x", "y"]]?;

        assert!(visualizer(dir.path()).plot_bar(&df, "Region", "Name", "t").is_none());
        assert!(!dir.path().join("BarChart_Name_by_Region.png").exists());
        Ok(())
    }

    #[test]
    fn test_unsafe_characters_replaced_in_file_name() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let df = df!["Kind/Type" => ["a", "b"], "Cost: USD" => [1.0, 2.0]]?;

        let path = visualizer(dir.path()).plot_bar(&df, "Kind/Type", "Cost: USD", "t");
        assert_eq!(path, Some(dir.path().join("BarChart_Cost_ USD_by_Kind_Type.png")));
        Ok(())
    }

    #[test]
    fn test_value_range_includes_baseline() {
        let (lo, hi) = value_range([2.0, 4.0].into_iter(), true);
        assert_eq!(lo, 0.0);
        assert!((hi - 4.4).abs() < 1e-9);
        let (lo, hi) = value_range([5.0, 5.0].into_iter(), false);
        assert_eq!((lo, hi), (4.0, 6.0));
        assert_eq!(value_range(std::iter::empty(), true), (0.0, 1.0));
    }

    #[test]
    fn test_short_label() {
        assert_eq!(short_label("short"), "short");
        let long = short_label("a very long category label indeed");
        assert_eq!(long.chars().count(), 18);
        assert!(long.ends_with('…'));
    }
}
