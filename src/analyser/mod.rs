//! Table loading, cleaning and statistics.
//!
//! [`logic`] holds the frame-level operations; the pipeline stages in
//! [`crate::pipeline`] drive them file by file.

pub mod logic;
