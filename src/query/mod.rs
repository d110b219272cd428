//! Keyword queries over a single table.

pub mod engine;
pub mod intent;
pub mod repl;

pub use engine::QueryEngine;
pub use intent::Intent;
