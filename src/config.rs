//! Pipeline configuration.
//!
//! Settings are stored as JSON. Missing fields fall back to their defaults, so
//! a config file only needs the values it changes.

use crate::error::{AnalysisError, Result, ResultExt as _};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Chart rendering settings shared by the analyzer and the visualizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartSettings {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// TrueType font used for captions and labels. When unset, common
    /// system locations are searched.
    pub font_path: Option<PathBuf>,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 600,
            font_path: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory holding the raw spreadsheet/CSV files
    pub input_dir: PathBuf,
    /// Directory receiving cleaned files, statistics and charts
    pub output_dir: PathBuf,
    /// Directory receiving the PDF report
    pub report_dir: PathBuf,
    pub report_file_name: String,
    /// File used for charts, queries and the report. Defaults to the first
    /// tabular file in `input_dir`.
    pub focus_file: Option<PathBuf>,
    /// Number of numeric columns that get a histogram
    pub histogram_limit: usize,
    pub chart: ChartSettings,
    /// Log directory; `<data_dir>/tablesight/logs` when unset
    pub log_dir: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("data"),
            output_dir: PathBuf::from("output"),
            report_dir: PathBuf::from("reports"),
            report_file_name: "Data_Report.pdf".to_owned(),
            focus_file: None,
            histogram_limit: 5,
            chart: ChartSettings::default(),
            log_dir: None,
        }
    }
}

impl PipelineConfig {
    /// Default config file location (`<config_dir>/tablesight/config.json`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tablesight").join("config.json"))
    }

    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, the default location is used
    /// when present and built-in defaults otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(AnalysisError::InvalidPath(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
                path.to_path_buf()
            }
            None => match Self::default_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(Self::default()),
            },
        };

        Self::from_file(&path)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        let config: Self = serde_json::from_str(&contents)?;
        tracing::debug!(path = %path.display(), "Loaded pipeline config");
        Ok(config)
    }

    /// Save configuration as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        Ok(())
    }

    pub fn report_path(&self) -> PathBuf {
        self.report_dir.join(&self.report_file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() -> anyhow::Result<()> {
        let config: PipelineConfig =
            serde_json::from_str(r#"{ "output_dir": "out", "chart": { "width": 640 } }"#)?;
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.input_dir, PathBuf::from("data"));
        assert_eq!(config.chart.width, 640);
        assert_eq!(config.chart.height, 600);
        assert_eq!(config.histogram_limit, 5);
        Ok(())
    }

    #[test]
    fn test_save_and_reload() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested").join("config.json");

        let config = PipelineConfig {
            focus_file: Some(PathBuf::from("data/ships.xlsx")),
            histogram_limit: 3,
            ..Default::default()
        };
        config.save(&path)?;

        let loaded = PipelineConfig::load(Some(&path))?;
        assert_eq!(loaded, config);
        Ok(())
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let result = PipelineConfig::load(Some(Path::new("/definitely/not/here.json")));
        assert!(matches!(result, Err(AnalysisError::InvalidPath(_))));
    }

    #[test]
    fn test_report_path() {
        let config = PipelineConfig::default();
        assert_eq!(config.report_path(), PathBuf::from("reports/Data_Report.pdf"));
    }
}
