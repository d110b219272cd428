//! Centralized error handling for tablesight.
//!
//! Library code returns [`Result<T>`] with an [`AnalysisError`]. The `From`
//! impls let `?` lift polars, calamine, xlsx-writer and I/O errors into it:
//!
//! ```no_run
//! use tablesight::error::{Result, ResultExt as _};
//!
//! fn read_notes(path: &str) -> Result<String> {
//!     std::fs::read_to_string(path).context("Failed to read notes")
//! }
//! ```

use std::fmt;

/// Main error type for tablesight operations.
#[derive(Debug)]
pub enum AnalysisError {
    /// I/O errors (file operations)
    Io(std::io::Error),

    /// Data processing errors (Polars casting, frame construction)
    DataProcessing(String),

    /// Spreadsheet read/write errors
    Spreadsheet(String),

    /// Chart rendering errors
    Render(String),

    /// PDF assembly errors
    Pdf(String),

    /// Configuration errors
    Config(String),

    /// File not found or invalid path
    InvalidPath(String),

    /// File extension is not a supported tabular format
    UnsupportedFormat(String),

    /// Generic error with context
    Other(String),
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::DataProcessing(msg) => write!(f, "Data processing error: {msg}"),
            Self::Spreadsheet(msg) => write!(f, "Spreadsheet error: {msg}"),
            Self::Render(msg) => write!(f, "Render error: {msg}"),
            Self::Pdf(msg) => write!(f, "PDF error: {msg}"),
            Self::Config(msg) => write!(f, "Configuration error: {msg}"),
            Self::InvalidPath(msg) => write!(f, "Invalid path: {msg}"),
            Self::UnsupportedFormat(ext) => write!(f, "Unsupported file extension: {ext}"),
            Self::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for AnalysisError {}

impl From<std::io::Error> for AnalysisError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<anyhow::Error> for AnalysisError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(format!("{err:#}"))
    }
}

impl From<serde_json::Error> for AnalysisError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(format!("JSON error: {err}"))
    }
}

impl From<polars::error::PolarsError> for AnalysisError {
    fn from(err: polars::error::PolarsError) -> Self {
        Self::DataProcessing(err.to_string())
    }
}

impl From<calamine::Error> for AnalysisError {
    fn from(err: calamine::Error) -> Self {
        Self::Spreadsheet(err.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for AnalysisError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        Self::Spreadsheet(err.to_string())
    }
}

impl From<printpdf::Error> for AnalysisError {
    fn from(err: printpdf::Error) -> Self {
        Self::Pdf(err.to_string())
    }
}

/// Result type alias for tablesight operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Extension trait to add context to results.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, msg: impl Into<String>) -> Result<T>;

    /// Add context using a closure (lazy evaluation).
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<AnalysisError>,
{
    fn context(self, msg: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let err: AnalysisError = e.into();
            AnalysisError::Other(format!("{}: {}", msg.into(), err))
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err: AnalysisError = e.into();
            AnalysisError::Other(format!("{}: {}", f(), err))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AnalysisError::UnsupportedFormat("txt".to_owned());
        assert_eq!(err.to_string(), "Unsupported file extension: txt");
    }

    #[test]
    fn test_polars_error_becomes_data_processing() {
        let err: AnalysisError =
            polars::error::PolarsError::ColumnNotFound("price".into()).into();
        assert!(matches!(err, AnalysisError::DataProcessing(_)));
        assert!(err.to_string().contains("price"));
    }

    #[test]
    fn test_result_context() {
        let result: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "sales.xlsx",
        ));

        let result: Result<()> = result.context("Failed to open workbook");
        let message = result.expect_err("context keeps the error").to_string();
        assert!(message.contains("Failed to open workbook"));
        assert!(message.contains("sales.xlsx"));
    }
}
