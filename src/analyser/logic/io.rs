use super::types::TableFormat;
use crate::error::{AnalysisError, Result, ResultExt as _};
use calamine::{Data, Reader as _, open_workbook_auto};
use polars::prelude::*;
use rust_xlsxwriter::{Format, Workbook};
use std::path::{Path, PathBuf};

/// Excel serial day number of 1970-01-01.
const EXCEL_UNIX_EPOCH: f64 = 25_569.0;
const MS_PER_DAY: f64 = 86_400_000.0;

/// Loads a tabular file, picking the reader by extension.
///
/// Blank header cells are named `Unnamed: <index>` for both formats, and
/// string columns whose every value parses as a datetime become `Datetime`.
pub fn load_df(path: &Path) -> Result<DataFrame> {
    let format = TableFormat::from_path(path).ok_or_else(|| {
        AnalysisError::UnsupportedFormat(
            path.extension()
                .and_then(|s| s.to_str())
                .unwrap_or("")
                .to_owned(),
        )
    })?;

    let df = match format {
        TableFormat::Csv => {
            let df = LazyCsvReader::new(path)
                .with_infer_schema_length(Some(10000))
                .with_has_header(true)
                .with_try_parse_dates(true)
                .finish()?
                .collect()
                .with_context(|| format!("Failed to read CSV {}", path.display()))?;
            label_unnamed_columns(df)?
        }
        TableFormat::Xlsx => read_xlsx(path)?,
    };

    try_parse_temporal_columns(df)
}

/// Names blank CSV header fields the way spreadsheet readers do.
///
/// The polars reader keeps the first blank header as `""` and names later
/// blanks `_duplicated_<n>`. A real header such as `column_2` is left alone.
pub fn label_unnamed_columns(df: DataFrame) -> Result<DataFrame> {
    let needs_label = |name: &str| {
        name.trim().is_empty()
            || name
                .strip_prefix("_duplicated_")
                .is_some_and(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()))
    };

    let columns = df.get_columns();
    if !columns.iter().any(|c| needs_label(c.name().as_str())) {
        return Ok(df);
    }

    let columns = columns
        .iter()
        .enumerate()
        .map(|(idx, column)| {
            if needs_label(column.name().as_str()) {
                column.clone().with_name(format!("Unnamed: {idx}").into())
            } else {
                column.clone()
            }
        })
        .collect::<Vec<_>>();

    Ok(DataFrame::new(columns)?)
}

pub fn try_parse_temporal_columns(df: DataFrame) -> Result<DataFrame> {
    let mut df = df;
    let candidates: Vec<String> = df
        .get_columns()
        .iter()
        .filter(|c| matches!(c.dtype(), DataType::String))
        .map(|c| c.name().to_string())
        .collect();

    for name in candidates {
        let series = df.column(&name)?.as_materialized_series().clone();
        if series.null_count() == series.len() {
            continue;
        }
        if let Ok(casted) = series.cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
            && casted.null_count() == series.null_count()
        {
            tracing::debug!(column = %name, "Parsed text column as datetime");
            df.replace(&name, casted)?;
        }
    }
    Ok(df)
}

enum Cell {
    Empty,
    Number(f64),
    Date(i64),
    Text(String),
}

impl Cell {
    fn from_data(data: &Data) -> Self {
        match data {
            Data::Empty | Data::Error(_) => Self::Empty,
            Data::Int(i) => Self::Number(*i as f64),
            Data::Float(f) => Self::Number(*f),
            Data::DateTime(dt) => {
                Self::Date(((dt.as_f64() - EXCEL_UNIX_EPOCH) * MS_PER_DAY).round() as i64)
            }
            Data::String(s) if s.trim().is_empty() => Self::Empty,
            other => Self::Text(other.to_string()),
        }
    }

    fn as_text(&self) -> Option<String> {
        match self {
            Self::Empty => None,
            Self::Number(n) => Some(n.to_string()),
            Self::Date(ms) => Some(
                chrono::DateTime::from_timestamp_millis(*ms)
                    .map(|dt| dt.naive_utc().format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_else(|| ms.to_string()),
            ),
            Self::Text(s) => Some(s.clone()),
        }
    }
}

/// Reads the first worksheet. Row one is the header.
pub fn read_xlsx(path: &Path) -> Result<DataFrame> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("Failed to open workbook {}", path.display()))?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| AnalysisError::Spreadsheet(format!("{} has no sheets", path.display())))?;
    let range = workbook.worksheet_range(&sheet)?;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(DataFrame::empty());
    };
    let body: Vec<&[Data]> = rows.collect();

    let names: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(idx, cell)| match Cell::from_data(cell).as_text() {
            Some(name) => name,
            None => format!("Unnamed: {idx}"),
        })
        .collect();
    let names = super::naming::make_unique(&names);

    let mut columns = Vec::with_capacity(names.len());
    for (idx, name) in names.iter().enumerate() {
        let cells: Vec<Cell> = body
            .iter()
            .map(|row| row.get(idx).map_or(Cell::Empty, Cell::from_data))
            .collect();
        columns.push(build_column(name, &cells)?);
    }

    Ok(DataFrame::new(columns)?)
}

/// Infers one type per column from its non-empty cells.
fn build_column(name: &str, cells: &[Cell]) -> Result<Column> {
    let filled = cells.iter().filter(|c| !matches!(c, Cell::Empty));
    let mut any = false;
    let (mut all_numbers, mut all_integral, mut all_dates) = (true, true, true);
    for cell in filled {
        any = true;
        match cell {
            Cell::Number(n) => {
                all_dates = false;
                if n.fract() != 0.0 || n.abs() > 9.0e15 {
                    all_integral = false;
                }
            }
            Cell::Date(_) => {
                all_numbers = false;
            }
            Cell::Text(_) | Cell::Empty => {
                all_numbers = false;
                all_dates = false;
            }
        }
    }

    let series = if any && all_numbers && all_integral {
        let values: Vec<Option<i64>> = cells
            .iter()
            .map(|c| match c {
                Cell::Number(n) => Some(*n as i64),
                _ => None,
            })
            .collect();
        Series::new(name.into(), values)
    } else if any && all_numbers {
        let values: Vec<Option<f64>> = cells
            .iter()
            .map(|c| match c {
                Cell::Number(n) => Some(*n),
                _ => None,
            })
            .collect();
        Series::new(name.into(), values)
    } else if any && all_dates {
        let values: Vec<Option<i64>> = cells
            .iter()
            .map(|c| match c {
                Cell::Date(ms) => Some(*ms),
                _ => None,
            })
            .collect();
        Series::new(name.into(), values)
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
    } else {
        let values: Vec<Option<String>> = cells.iter().map(Cell::as_text).collect();
        Series::new(name.into(), values)
    };

    Ok(Column::from(series))
}

/// Saves a frame, picking the writer by extension.
pub fn save_df(df: &mut DataFrame, path: &Path) -> Result<()> {
    match TableFormat::from_path(path) {
        Some(TableFormat::Xlsx) => write_xlsx(df, path),
        Some(TableFormat::Csv) => {
            let file = std::fs::File::create(path).context("Failed to create CSV file")?;
            CsvWriter::new(file)
                .include_header(true)
                .finish(df)
                .context("Failed to write CSV file")
        }
        None => Err(AnalysisError::UnsupportedFormat(path.display().to_string())),
    }
}

/// Writes one worksheet: a header row, then numbers, booleans, dates (as
/// Excel serials with a date format) and text.
pub fn write_xlsx(df: &DataFrame, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");
    let worksheet = workbook.add_worksheet();

    let row_num = |idx: usize| {
        u32::try_from(idx + 1)
            .map_err(|_| AnalysisError::Spreadsheet(format!("row {idx} out of range")))
    };

    for (j, column) in df.get_columns().iter().enumerate() {
        let col_num = u16::try_from(j)
            .map_err(|_| AnalysisError::Spreadsheet(format!("too many columns ({})", df.width())))?;
        worksheet.write_string(0, col_num, column.name().as_str())?;
        let series = column.as_materialized_series();

        match series.dtype() {
            DataType::Boolean => {
                for (i, value) in series.bool()?.into_iter().enumerate() {
                    if let Some(v) = value {
                        worksheet.write_boolean(row_num(i)?, col_num, v)?;
                    }
                }
            }
            DataType::Date | DataType::Datetime(_, _) => {
                let casted = series.cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?;
                let physical = casted.to_physical_repr();
                for (i, value) in physical.i64()?.into_iter().enumerate() {
                    if let Some(ms) = value {
                        let serial = ms as f64 / MS_PER_DAY + EXCEL_UNIX_EPOCH;
                        worksheet.write_number_with_format(row_num(i)?, col_num, serial, &date_format)?;
                    }
                }
            }
            dtype if dtype.is_primitive_numeric() => {
                let casted = series.cast(&DataType::Float64)?;
                for (i, value) in casted.f64()?.into_iter().enumerate() {
                    if let Some(v) = value.filter(|v| v.is_finite()) {
                        worksheet.write_number(row_num(i)?, col_num, v)?;
                    }
                }
            }
            _ => {
                let casted = series.cast(&DataType::String)?;
                for (i, value) in casted.str()?.into_iter().enumerate() {
                    if let Some(v) = value {
                        worksheet.write_string(row_num(i)?, col_num, v)?;
                    }
                }
            }
        }
    }

    workbook
        .save(path)
        .with_context(|| format!("Failed to write workbook {}", path.display()))
}

/// Lists the tabular files of a directory, sorted by file name.
pub fn list_tabular_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory {}", dir.display()))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && TableFormat::from_path(p).is_some())
        .filter(|p| {
            // Office lock files share the workbook's extension.
            !p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("~$"))
        })
        .collect::<Vec<_>>();
    files.sort();
    Ok(files)
}
