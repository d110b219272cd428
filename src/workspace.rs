//! Output directory handles.
//!
//! Every directory a stage writes into is created once, up front, through
//! [`OutputDir::ensure`]. Stages receive the handle and never create
//! directories themselves.

use crate::config::PipelineConfig;
use crate::error::{Result, ResultExt as _};
use std::path::{Path, PathBuf};

/// A directory known to exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDir {
    path: PathBuf,
}

impl OutputDir {
    /// Creates the directory (and parents) if absent.
    pub fn ensure(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        std::fs::create_dir_all(&path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn join(&self, file_name: impl AsRef<Path>) -> PathBuf {
        self.path.join(file_name)
    }
}

impl AsRef<Path> for OutputDir {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

/// The directories one pipeline run works with.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub input_dir: PathBuf,
    /// Cleaned files, statistics and every chart
    pub output: OutputDir,
    /// PDF reports
    pub reports: OutputDir,
}

impl Workspace {
    /// Creates the output and report directories.
    ///
    /// The input directory is only read, so it is not created.
    pub fn prepare(config: &PipelineConfig) -> Result<Self> {
        let output = OutputDir::ensure(&config.output_dir)?;
        let reports = OutputDir::ensure(&config.report_dir)?;
        tracing::debug!(
            output = %output.path().display(),
            reports = %reports.path().display(),
            "Workspace prepared"
        );
        Ok(Self {
            input_dir: config.input_dir.clone(),
            output,
            reports,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_creates_output_dirs() -> anyhow::Result<()> {
        let root = tempfile::tempdir()?;
        let config = PipelineConfig {
            input_dir: root.path().join("data"),
            output_dir: root.path().join("out").join("nested"),
            report_dir: root.path().join("reports"),
            ..Default::default()
        };

        let workspace = Workspace::prepare(&config)?;
        assert!(workspace.output.path().is_dir());
        assert!(workspace.reports.path().is_dir());
        assert!(!workspace.input_dir.exists());
        assert_eq!(
            workspace.output.join("cleaned_a.csv"),
            root.path().join("out/nested/cleaned_a.csv")
        );
        Ok(())
    }
}
