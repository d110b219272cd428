//! Load and clean every tabular file of the input directory.

use crate::analyser::logic::{clean_df, list_tabular_files, load_df, naming, save_df};
use crate::error::Result;
use crate::workspace::OutputDir;
use polars::prelude::DataFrame;
use std::path::{Path, PathBuf};

/// A cleaned table, already written to the output directory.
#[derive(Debug, Clone)]
pub struct CleanedTable {
    /// File name of the cleaned file (`cleaned_<original>`); artifacts derived
    /// from this table are named after it
    pub name: String,
    pub source: PathBuf,
    pub path: PathBuf,
    pub df: DataFrame,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of one loader run
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub cleaned: Vec<CleanedTable>,
    pub failures: Vec<LoadFailure>,
}

impl LoadReport {
    pub fn summary(&self) -> String {
        format!(
            "Cleaned {} file(s), {} failed",
            self.cleaned.len(),
            self.failures.len()
        )
    }

    fn record_failure(&mut self, path: &Path, err: &dyn std::fmt::Display) {
        tracing::error!(file = %path.display(), "Skipping file: {err}");
        self.failures.push(LoadFailure {
            path: path.to_path_buf(),
            reason: err.to_string(),
        });
    }
}

/// Loads, cleans and saves one file as `cleaned_<name>` in `out`.
pub fn clean_file(path: &Path, out: &OutputDir) -> Result<CleanedTable> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_owned)
        .ok_or_else(|| {
            crate::error::AnalysisError::InvalidPath(format!("no file name: {}", path.display()))
        })?;

    let raw = load_df(path)?;
    let (rows, cols) = raw.shape();
    let mut df = clean_df(raw)?;

    let name = naming::cleaned_file_name(&file_name);
    let cleaned_path = out.join(&name);
    save_df(&mut df, &cleaned_path)?;

    tracing::info!(
        file = %file_name,
        rows_before = rows,
        cols_before = cols,
        rows = df.height(),
        cols = df.width(),
        "Saved {}",
        cleaned_path.display()
    );

    Ok(CleanedTable {
        name,
        source: path.to_path_buf(),
        path: cleaned_path,
        df,
    })
}

/// Cleans every `csv`/`xlsx` file of `input_dir` in file-name order.
///
/// A file that cannot be loaded, cleaned or saved is logged and recorded in
/// [`LoadReport::failures`]; the remaining files are still processed. Only an
/// unreadable input directory is an error.
pub fn load_and_clean_all(input_dir: &Path, out: &OutputDir) -> Result<LoadReport> {
    let files = list_tabular_files(input_dir)?;
    tracing::info!(dir = %input_dir.display(), count = files.len(), "Found input files");

    let mut report = LoadReport::default();
    for path in files {
        match clean_file(&path, out) {
            Ok(table) => report.cleaned.push(table),
            Err(e) => report.record_failure(&path, &e),
        }
    }
    Ok(report)
}

/// Loads already cleaned files without cleaning them again.
pub(crate) fn load_existing(paths: Vec<PathBuf>) -> LoadReport {
    let mut report = LoadReport::default();
    for path in paths {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_owned();
        match load_df(&path) {
            Ok(df) => {
                tracing::info!(file = %name, rows = df.height(), cols = df.width(), "Loaded cleaned file");
                report.cleaned.push(CleanedTable {
                    name,
                    source: path.clone(),
                    path,
                    df,
                });
            }
            Err(e) => report.record_failure(&path, &e),
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    #[test]
    fn test_bad_file_is_recorded_and_others_continue() -> anyhow::Result<()> {
        let input = tempfile::tempdir()?;
        let output = tempfile::tempdir()?;
        std::fs::write(input.path().join("a_good.csv"), "x,y\n1,2\n3,4\n")?;
        std::fs::write(input.path().join("b_broken.xlsx"), "not a workbook")?;
        std::fs::write(input.path().join("notes.txt"), "ignored")?;

        let out = OutputDir::ensure(output.path())?;
        let report = load_and_clean_all(input.path(), &out)?;

        assert_eq!(report.cleaned.len(), 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(
            report.failures.first().map(|f| f.path.clone()),
            Some(input.path().join("b_broken.xlsx"))
        );
        assert!(output.path().join("cleaned_a_good.csv").exists());
        assert!(!output.path().join("cleaned_b_broken.xlsx").exists());
        assert_eq!(report.summary(), "Cleaned 1 file(s), 1 failed");
        Ok(())
    }

    #[test]
    fn test_clean_file_drops_placeholder_columns() -> anyhow::Result<()> {
        let input = tempfile::tempdir()?;
        let output = tempfile::tempdir()?;
        let path = input.path().join("ships.csv");
        std::fs::write(&path, "Ship,,Hours\nAlpha,,3\n,,\nBeta,,5\n")?;

        let table = clean_file(&path, &OutputDir::ensure(output.path())?)?;
        assert_eq!(table.name, "cleaned_ships.csv");
        assert_eq!(table.df.get_column_names_str(), ["Ship", "Hours"]);
        assert_eq!(table.df.height(), 2);

        let reloaded = load_df(&table.path)?;
        assert_eq!(reloaded.shape(), (2, 2));
        Ok(())
    }

    #[test]
    fn test_missing_input_dir_is_an_error() -> anyhow::Result<()> {
        let output = tempfile::tempdir()?;
        let out = OutputDir::ensure(output.path())?;
        assert!(load_and_clean_all(Path::new("/no/such/input"), &out).is_err());
        Ok(())
    }
}
