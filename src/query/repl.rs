//! Line-oriented query loop.

use super::engine::QueryEngine;
use crate::error::Result;
use std::io::{BufRead, Write};

pub const PROMPT: &str = ">> ";

fn is_exit(line: &str) -> bool {
    let line = line.trim();
    line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit")
}

/// Prompts, reads a line and writes its answer until `exit`/`quit` or end of
/// input. Returns the number of queries answered.
pub fn run<R: BufRead, W: Write>(engine: &QueryEngine, reader: R, mut writer: W) -> Result<usize> {
    let mut answered = 0;
    let mut lines = reader.lines();
    loop {
        write!(writer, "{PROMPT}")?;
        writer.flush()?;

        let Some(line) = lines.next() else {
            writeln!(writer)?;
            break;
        };
        let line = line?;
        if is_exit(&line) {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }

        writeln!(writer, "{}", engine.answer(&line))?;
        answered += 1;
    }
    tracing::info!(answered, "Query session ended");
    Ok(answered)
}
