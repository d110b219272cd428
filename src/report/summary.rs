use crate::analyser::logic::numeric_describe_text;
use crate::error::Result;
use polars::prelude::DataFrame;

pub const HEADING: &str = "DATA SUMMARY REPORT";

/// Plain-text overview: shape, total missing cells and the numeric
/// statistics block.
pub fn summarize(df: &DataFrame) -> Result<String> {
    let missing: usize = df.get_columns().iter().map(|c| c.null_count()).sum();
    let stats = numeric_describe_text(df)?.unwrap_or_else(|| "No numeric data.\n".to_owned());

    Ok(format!(
        "{HEADING}\n\nTotal Rows: {}\nTotal Columns: {}\nMissing Values: {missing}\n\nNumeric Summary:\n{stats}",
        df.height(),
        df.width(),
    ))
}
