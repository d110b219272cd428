use super::naming;
use crate::error::Result;
use polars::prelude::*;
use regex::Regex;
use std::sync::LazyLock;

/// Names spreadsheet tools generate for header cells left blank.
static PLACEHOLDER_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:Unnamed|\s*$)").unwrap_or_else(|e| panic!("invalid placeholder regex: {e}"))
});

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s+").unwrap_or_else(|e| panic!("invalid whitespace regex: {e}"))
});

static LINE_BREAKS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\n\r\t]+").unwrap_or_else(|e| panic!("invalid line break regex: {e}"))
});

/// True for names produced by a blank header cell.
pub fn is_placeholder_name(name: &str) -> bool {
    PLACEHOLDER_NAME.is_match(name)
}

/// Line breaks become spaces, whitespace runs collapse, ends are trimmed.
pub fn normalise_column_name(name: &str) -> String {
    let spaced = name.replace(['\r', '\n'], " ");
    WHITESPACE_RUN.replace_all(&spaced, " ").trim().to_owned()
}

/// Removes line breaks and tabs outright (no replacement space) and trims.
/// Used for the single table loaded for charts, queries and the report.
pub fn strip_line_breaks(name: &str) -> String {
    LINE_BREAKS.replace_all(name, "").trim().to_owned()
}

/// Cleans a freshly loaded table.
///
/// 1. drops placeholder-named columns (judged on the normalised name)
/// 2. drops rows where every cell is null
/// 3. drops columns where every cell is null
/// 4. normalises the remaining names, keeping them unique
///
/// Running it twice gives the same frame as running it once.
pub fn clean_df(df: DataFrame) -> Result<DataFrame> {
    let rows_before = df.height();
    let cols_before = df.width();

    let named: Vec<Column> = df
        .get_columns()
        .iter()
        .filter(|c| !is_placeholder_name(&normalise_column_name(c.name())))
        .cloned()
        .collect();
    let df = DataFrame::new(named)?;

    let df = drop_empty_rows(&df)?;

    let filled: Vec<Column> = df
        .get_columns()
        .iter()
        .filter(|c| c.null_count() < c.len())
        .cloned()
        .collect();

    let names: Vec<String> = filled
        .iter()
        .map(|c| normalise_column_name(c.name()))
        .collect();
    let names = naming::make_unique(&names);

    let renamed: Vec<Column> = filled
        .into_iter()
        .zip(names)
        .map(|(column, name)| column.with_name(name.into()))
        .collect();
    let cleaned = DataFrame::new(renamed)?;

    tracing::debug!(
        rows_before,
        rows_after = cleaned.height(),
        cols_before,
        cols_after = cleaned.width(),
        "Cleaned table"
    );
    Ok(cleaned)
}

/// Keeps only rows with at least one non-null cell.
pub fn drop_empty_rows(df: &DataFrame) -> Result<DataFrame> {
    if df.width() == 0 {
        return Ok(df.clone());
    }

    let mut keep = BooleanChunked::full("keep".into(), false, df.height());
    for column in df.get_columns() {
        keep = &keep | &column.is_not_null();
    }

    if keep.all() {
        return Ok(df.clone());
    }
    Ok(df.filter(&keep)?)
}

/// Applies [`strip_line_breaks`] to every column name.
pub fn strip_column_line_breaks(df: DataFrame) -> Result<DataFrame> {
    let names: Vec<String> = df
        .get_columns()
        .iter()
        .map(|c| strip_line_breaks(c.name()))
        .collect();
    let names = naming::make_unique(&names);

    let columns: Vec<Column> = df
        .take_columns()
        .into_iter()
        .zip(names)
        .map(|(column, name)| column.with_name(name.into()))
        .collect();
    Ok(DataFrame::new(columns)?)
}
