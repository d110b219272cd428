//! The batch pipeline: load and clean every input file, analyse the cleaned
//! tables, then chart, query and report on one focus table.
//!
//! Stages hand data to each other in memory ([`LoadReport`] feeds
//! [`analyze_all`]). The standalone `analyze` command rebuilds the same input
//! from disk with [`discover_cleaned`].

pub mod analyzer;
pub mod loader;
pub mod runner;

pub use analyzer::{AnalysisOutcome, analyze_all, analyze_table, discover_cleaned};
pub use loader::{CleanedTable, LoadFailure, LoadReport, clean_file, load_and_clean_all};
pub use runner::{RunOptions, RunSummary, load_focus_table, resolve_focus_file, run};
