//! # tablesight
//!
//! Batch analysis for local spreadsheet and CSV files. Every file in an input
//! directory is cleaned and profiled; one focus table is then charted,
//! queried with simple keyword sentences and summarised in a PDF report.
//!
//! ```no_run
//! use tablesight::config::PipelineConfig;
//! use tablesight::pipeline::{RunOptions, run};
//!
//! let config = PipelineConfig::default();
//! let options = RunOptions { focus_file: None, interactive: false };
//! let summary = run(&config, &options, std::io::empty(), std::io::stdout())?;
//! println!("{}", summary.load.summary());
//! # Ok::<(), tablesight::error::AnalysisError>(())
//! ```
//!
//! ## Modules
//!
//! - [`analyser`]: loading, cleaning and per-column statistics
//! - [`charts`]: PNG bar, line, histogram and heatmap charts
//! - [`pipeline`]: the batch stages and the full run
//! - [`query`]: keyword queries and the interactive loop
//! - [`report`]: summary text and the PDF report
//! - [`config`], [`logging`], [`error`], [`workspace`], [`utils`]

#![warn(clippy::all, rust_2018_idioms)]

pub mod analyser;
pub mod charts;
pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod query;
pub mod report;
pub mod utils;
pub mod workspace;
