#![expect(
    clippy::unwrap_used,
    clippy::panic,
    clippy::expect_used,
    clippy::indexing_slicing
)]
use super::*;
use anyhow::Result;
use polars::prelude::*;

mod analysis;

#[test]
fn test_column_kinds() -> Result<()> {
    let df = df![
        "count" => [1i64, 2],
        "ratio" => [0.5, 1.5],
        "label" => ["a", "b"],
        "flag" => [true, false],
    ]?;
    let kinds: Vec<ColumnKind> = analyse_df(&df)?.iter().map(|s| s.kind).collect();
    assert_eq!(
        kinds,
        [ColumnKind::Numeric, ColumnKind::Numeric, ColumnKind::Text, ColumnKind::Text]
    );
    Ok(())
}

#[test]
fn test_numeric_stats_ignore_nulls() -> Result<()> {
    let s = Series::new("col".into(), vec![Some(1.0), None, Some(3.0), Some(5.0)]);
    let df = DataFrame::new(vec![Column::from(s)])?;
    let summaries = analyse_df(&df)?;
    let summary = summaries.first().expect("Summary exists");
    assert_eq!(summary.nulls, 1);

    let ColumnStats::Numeric(stats) = &summary.stats else {
        panic!("Expected numeric stats");
    };
    assert_eq!(stats.count, 3);
    assert_eq!(stats.mean, Some(3.0));
    assert_eq!(stats.std_dev, Some(2.0));
    assert_eq!(stats.min, Some(1.0));
    assert_eq!(stats.q1, Some(2.0));
    assert_eq!(stats.median, Some(3.0));
    assert_eq!(stats.q3, Some(4.0));
    assert_eq!(stats.max, Some(5.0));
    Ok(())
}

#[test]
fn test_single_value_has_no_std() {
    let stats = profiling::describe_sorted(&[7.0]);
    assert_eq!(stats.count, 1);
    assert_eq!(stats.std_dev, None);
    assert_eq!(stats.median, Some(7.0));
}

#[test]
fn test_text_top_prefers_first_seen_on_tie() -> Result<()> {
    let df = df!["service" => ["oil", "filter", "filter", "oil", "pump"]]?;
    let summaries = analyse_df(&df)?;
    let ColumnStats::Text(stats) = &summaries[0].stats else {
        panic!("Expected text stats");
    };
    assert_eq!(stats.count, 5);
    assert_eq!(stats.unique, 3);
    assert_eq!(stats.top, Some(("oil".to_owned(), 2)));
    Ok(())
}

#[test]
fn test_histogram_calculation() {
    let sorted = [1.0, 1.0, 2.0, 3.0, 10.0];
    let (width, bins) = profiling::calculate_histogram(&sorted);
    assert!(bins.len() >= 5 && bins.len() <= 50);
    assert!(width > 0.0);
    assert_eq!(bins.iter().map(|b| b.1).sum::<usize>(), sorted.len());
    assert_eq!(bins[0].0, 1.0);
    // The maximum lands in the last bin.
    assert_eq!(bins.last().unwrap().1, 1);
}

#[test]
fn test_histogram_constant_values() {
    let (width, bins) = profiling::calculate_histogram(&[4.0, 4.0, 4.0]);
    assert_eq!(width, 1.0);
    assert_eq!(bins, vec![(3.5, 3)]);
}

#[test]
fn test_histogram_bin_count_is_clamped() {
    // A far outlier makes Freedman-Diaconis ask for thousands of bins.
    let many: Vec<f64> = (0..1000).map(f64::from).chain(std::iter::once(1.0e6)).collect();
    let (_, bins) = profiling::calculate_histogram(&many);
    assert_eq!(bins.len(), 50);
}

#[test]
fn test_kde_integrates_to_one() {
    let values = [1.0, 2.0, 2.5, 3.0, 7.0];
    let xs: Vec<f64> = (0..5000).map(|i| -20.0 + f64::from(i) * 0.01).collect();
    let density = profiling::gaussian_kde(&values, &xs);
    let area: f64 = density.iter().sum::<f64>() * 0.01;
    assert!((area - 1.0).abs() < 1e-3, "area = {area}");
    assert!(profiling::gaussian_kde(&[2.0, 2.0], &xs).is_empty());
}

#[test]
fn test_make_unique() {
    let names: Vec<String> = ["a", "b", "a", "a", "a_1"].iter().map(|s| (*s).to_owned()).collect();
    assert_eq!(naming::make_unique(&names), ["a", "b", "a_1", "a_2", "a_1_1"]);
}

#[test]
fn test_artifact_names() {
    assert_eq!(naming::cleaned_file_name("ships.xlsx"), "cleaned_ships.xlsx");
    assert_eq!(naming::summary_file_name("cleaned_ships.xlsx"), "summary_cleaned_ships.xlsx");
    assert_eq!(naming::heatmap_file_name("cleaned_ships.xlsx"), "heatmap_cleaned_ships.png");
    assert_eq!(
        naming::histogram_file_name("cleaned_ships.xlsx", "Run Hours"),
        "cleaned_ships_Run Hours_hist.png"
    );
    assert_eq!(naming::bar_chart_file_name("Hours", "A/B"), "BarChart_Hours_by_A_B.png");
    assert_eq!(naming::line_chart_file_name("Hours", "Date"), "LineChart_Hours_over_Date.png");
    assert!(naming::is_cleaned_file_name("cleaned_x.csv"));
    assert!(!naming::is_cleaned_file_name("summary_cleaned_x.csv"));
}

#[test]
fn test_table_format_from_path() {
    use std::path::Path;
    assert_eq!(TableFormat::from_path(Path::new("a.CSV")), Some(TableFormat::Csv));
    assert_eq!(TableFormat::from_path(Path::new("b.xlsx")), Some(TableFormat::Xlsx));
    assert_eq!(TableFormat::from_path(Path::new("c.txt")), None);
    assert_eq!(TableFormat::from_path(Path::new("noext")), None);
}
