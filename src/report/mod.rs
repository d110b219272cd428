//! Text summary and PDF report for the focus table.

pub mod pdf;
pub mod summary;

pub use pdf::{ReportOutcome, chart_images, generate_pdf};
pub use summary::summarize;
