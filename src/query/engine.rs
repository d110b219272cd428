//! Answers keyword queries against one table.

use super::intent::Intent;
use crate::analyser::logic::profiling::{mean, numeric_values, text_values};
use crate::charts::{CategoryPoint, Visualizer};
use crate::error::Result;
use polars::prelude::*;
use std::collections::{HashMap, HashSet};

pub const HELP: &str = "Sorry, I didn't understand that query. Try:\n - 'show columns'\n - 'total rows'\n - 'show total maintenance by user'\n - 'average done unit'\n - 'unique service'";

#[derive(Debug, Clone)]
pub struct QueryEngine {
    df: DataFrame,
    visualizer: Visualizer,
}

impl QueryEngine {
    pub fn new(df: DataFrame, visualizer: Visualizer) -> Self {
        Self { df, visualizer }
    }

    pub fn table(&self) -> &DataFrame {
        &self.df
    }

    /// First column whose name contains `keyword`, ignoring case.
    pub fn find_column(&self, keyword: &str) -> Option<String> {
        let keyword = keyword.to_lowercase();
        self.df
            .get_column_names()
            .into_iter()
            .find(|name| name.to_lowercase().contains(&keyword))
            .map(|name| name.to_string())
    }

    /// Text response for one query. Unknown columns and unmatched queries are
    /// answered, not reported as errors.
    pub fn answer(&self, query: &str) -> String {
        let intent = Intent::parse(query);
        tracing::debug!(query, ?intent, "Parsed query");

        let response = match &intent {
            Intent::ListColumns => Ok(format!(
                "Columns in dataset:\n{}",
                quoted_list(self.df.get_column_names().iter().map(|n| n.as_str()))
            )),
            Intent::RowCount => Ok(format!("Total records: {}", self.df.height())),
            Intent::Average(token) => self.average(token),
            Intent::GroupCount { target, by } => self.group_count(target, by),
            Intent::Unique(token) => self.unique(token),
            Intent::Unrecognized => Ok(HELP.to_owned()),
        };

        response.unwrap_or_else(|e| {
            tracing::warn!(query, "Query failed: {e}");
            format!("Query failed: {e}")
        })
    }

    fn average(&self, token: &str) -> Result<String> {
        let Some(name) = self.find_column(token) else {
            return Ok("Column not found.".to_owned());
        };
        let column = self.df.column(&name)?;
        if !column.dtype().is_primitive_numeric() {
            return Ok(format!("Column '{name}' is not numeric."));
        }
        Ok(match mean(&numeric_values(column)?) {
            Some(avg) => format!("Average of '{name}' = {avg:.2}"),
            None => format!("Column '{name}' has no values to average."),
        })
    }

    fn group_count(&self, target: &str, by: &str) -> Result<String> {
        let (Some(y_col), Some(x_col)) = (self.find_column(target), self.find_column(by)) else {
            return Ok("Could not interpret columns.".to_owned());
        };

        let points = count_by(
            &text_values(self.df.column(&x_col)?)?,
            self.df.column(&y_col)?,
        );
        let title = format!("{y_col} by {x_col}");
        Ok(
            match self.visualizer.plot_bar_points(&points, &x_col, &y_col, &title) {
                Some(_) => format!("Chart generated: {title}"),
                None => format!("Chart could not be rendered: {title}"),
            },
        )
    }

    fn unique(&self, token: &str) -> Result<String> {
        let Some(name) = self.find_column(token) else {
            return Ok("Column not found.".to_owned());
        };
        let mut seen = HashSet::new();
        let distinct: Vec<String> = text_values(self.df.column(&name)?)?
            .into_iter()
            .flatten()
            .filter(|v| seen.insert(v.clone()))
            .collect();
        Ok(format!(
            "Unique values in '{name}':\n{}",
            quoted_list(distinct.iter().map(String::as_str))
        ))
    }
}

/// Non-null `target` values counted per non-null group key, first-seen order.
fn count_by(keys: &[Option<String>], target: &Column) -> Vec<CategoryPoint> {
    let has_value = target.is_not_null();
    let mut points: Vec<CategoryPoint> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for (key, present) in keys.iter().zip(has_value.into_iter()) {
        let Some(key) = key.as_deref() else {
            continue;
        };
        let slot = *index.entry(key).or_insert_with(|| {
            points.push(CategoryPoint::new(key, 0.0));
            points.len() - 1
        });
        if present == Some(true)
            && let Some(point) = points.get_mut(slot)
        {
            point.value += 1.0;
        }
    }
    points
}

/// `["x", "y"]`
fn quoted_list<'a>(items: impl Iterator<Item = &'a str>) -> String {
    let parts: Vec<String> = items.map(|s| format!("{s:?}")).collect();
    format!("[{}]", parts.join(", "))
}
