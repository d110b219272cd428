//! Column-name uniqueness and artifact file names.
//!
//! The file names here are the only link between stages that hand files to
//! each other (charts to the report, cleaned files to a standalone analyze run),
//! so every stage builds them through these helpers.

use crate::utils::sanitize_file_component;
use std::collections::HashSet;
use std::path::Path;

pub const CLEANED_PREFIX: &str = "cleaned_";

/// Makes names unique by suffixing later duplicates with `_1`, `_2`, ...
/// Names that are already unique come back unchanged.
pub fn make_unique(names: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut result = Vec::with_capacity(names.len());

    for name in names {
        let mut candidate = name.clone();
        let mut count = 0;
        while seen.contains(&candidate) {
            count += 1;
            candidate = format!("{name}_{count}");
        }
        seen.insert(candidate.clone());
        result.push(candidate);
    }
    result
}

/// `<stem>` of a file name, or the whole name when there is no extension.
pub fn file_stem(file_name: &str) -> String {
    Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name)
        .to_owned()
}

pub fn cleaned_file_name(original: &str) -> String {
    format!("{CLEANED_PREFIX}{original}")
}

pub fn is_cleaned_file_name(file_name: &str) -> bool {
    file_name.starts_with(CLEANED_PREFIX)
}

pub fn summary_file_name(source: &str) -> String {
    format!("summary_{source}")
}

pub fn correlation_file_name(source: &str) -> String {
    format!("correlation_{source}")
}

pub fn heatmap_file_name(source: &str) -> String {
    format!("heatmap_{}.png", sanitize_file_component(&file_stem(source)))
}

pub fn histogram_file_name(source: &str, column: &str) -> String {
    format!(
        "{}_{}_hist.png",
        sanitize_file_component(&file_stem(source)),
        sanitize_file_component(column)
    )
}

pub fn bar_chart_file_name(y_col: &str, x_col: &str) -> String {
    format!(
        "BarChart_{}_by_{}.png",
        sanitize_file_component(y_col),
        sanitize_file_component(x_col)
    )
}

pub fn line_chart_file_name(y_col: &str, x_col: &str) -> String {
    format!(
        "LineChart_{}_over_{}.png",
        sanitize_file_component(y_col),
        sanitize_file_component(x_col)
    )
}
