use crate::analyser::logic::analysis::pearson;
use crate::analyser::logic::{
    calculate_correlation_matrix, correlation_to_df, describe_df, non_numeric_columns,
    numeric_columns, numeric_describe_text,
};
use anyhow::Result;
use polars::prelude::*;

fn ships() -> Result<DataFrame> {
    Ok(df![
        "Ship" => ["Alpha", "Beta", "Alpha", "Gamma"],
        "Hours" => [Some(1.0), Some(2.0), Some(3.0), None],
        "Cost" => [Some(10i64), Some(20), Some(30), Some(40)],
    ]?)
}

#[test]
fn test_numeric_and_other_columns() -> Result<()> {
    let df = ships()?;
    assert_eq!(numeric_columns(&df), ["Hours", "Cost"]);
    assert_eq!(non_numeric_columns(&df), ["Ship"]);
    Ok(())
}

#[test]
fn test_describe_layout() -> Result<()> {
    let summary = describe_df(&ships()?)?;
    assert_eq!(summary.get_column_names_str(), ["statistic", "Ship", "Hours", "Cost"]);
    assert_eq!(summary.height(), 11);

    let labels = summary.column("statistic")?.str()?.clone();
    let at = |label: &str| {
        labels
            .into_iter()
            .position(|l| l == Some(label))
            .unwrap_or(usize::MAX)
    };

    let hours = summary.column("Hours")?.str()?.clone();
    assert_eq!(hours.get(at("count")), Some("3"));
    assert_eq!(hours.get(at("mean")), Some("2"));
    assert_eq!(hours.get(at("std")), Some("1"));
    assert_eq!(hours.get(at("50%")), Some("2"));
    assert_eq!(hours.get(at("top")), None);

    let ship = summary.column("Ship")?.str()?.clone();
    assert_eq!(ship.get(at("count")), Some("4"));
    assert_eq!(ship.get(at("unique")), Some("3"));
    assert_eq!(ship.get(at("top")), Some("Alpha"));
    assert_eq!(ship.get(at("freq")), Some("2"));
    assert_eq!(ship.get(at("mean")), None);
    Ok(())
}

#[test]
fn test_describe_label_does_not_clash() -> Result<()> {
    let df = df!["statistic" => [1.0, 2.0]]?;
    let summary = describe_df(&df)?;
    assert_eq!(summary.get_column_names_str(), ["statistic", "statistic_1"]);
    Ok(())
}

#[test]
fn test_correlation_absent_without_numeric_columns() -> Result<()> {
    let df = df!["a" => ["x", "y"], "b" => ["p", "q"]]?;
    assert!(calculate_correlation_matrix(&df)?.is_none());
    assert!(numeric_describe_text(&df)?.is_none());
    Ok(())
}

#[test]
fn test_correlation_pairwise_complete() -> Result<()> {
    let matrix = calculate_correlation_matrix(&ships()?)?.expect("numeric columns");
    assert_eq!(matrix.columns, ["Hours", "Cost"]);
    assert_eq!(matrix.get("Hours", "Hours"), Some(1.0));
    // Rows 0..3 pair up exactly, the null Hours row is ignored.
    let r = matrix.get("Hours", "Cost").unwrap_or(f64::NAN);
    assert!((r - 1.0).abs() < 1e-12, "r = {r}");
    assert_eq!(matrix.get("Hours", "Cost"), matrix.get("Cost", "Hours"));
    Ok(())
}

#[test]
fn test_constant_column_correlation_is_undefined() -> Result<()> {
    let df = df!["flat" => [1.0, 1.0, 1.0], "up" => [1.0, 2.0, 3.0]]?;
    let matrix = calculate_correlation_matrix(&df)?.expect("numeric columns");
    assert!(matrix.get("flat", "up").is_some_and(f64::is_nan));
    assert!(matrix.get("flat", "flat").is_some_and(f64::is_nan));

    let frame = correlation_to_df(&matrix)?;
    assert_eq!(frame.get_column_names_str(), ["column", "flat", "up"]);
    assert_eq!(frame.column("flat")?.null_count(), 2);
    assert_eq!(frame.column("up")?.f64()?.get(1), Some(1.0));
    Ok(())
}

#[test]
fn test_pearson() {
    let xs = [Some(1.0), Some(2.0), Some(3.0), None];
    let ys = [Some(3.0), Some(2.0), Some(1.0), Some(9.0)];
    let r = pearson(&xs, &ys).unwrap_or(f64::NAN);
    assert!((r + 1.0).abs() < 1e-12);
    assert_eq!(pearson(&[Some(1.0)], &[Some(2.0)]), None);
}

#[test]
fn test_numeric_describe_text_block() -> Result<()> {
    let text = numeric_describe_text(&ships()?)?.expect("numeric columns");
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 9);
    assert!(lines[0].contains("Hours") && lines[0].contains("Cost"));
    assert!(lines[1].starts_with("count"));
    assert!(lines[2].contains("2.000000"));
    assert!(lines[8].starts_with("max"));
    Ok(())
}
