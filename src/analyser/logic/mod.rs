pub mod analysis;
pub mod cleaning;
pub mod io;
pub mod naming;
pub mod profiling;
pub mod types;

pub use analysis::{
    analyse_df, calculate_correlation_matrix, correlation_to_df, describe_df, non_numeric_columns,
    numeric_columns, numeric_describe_text,
};
pub use cleaning::{clean_df, is_placeholder_name, normalise_column_name};
pub use io::{list_tabular_files, load_df, save_df};
pub use types::{
    ColumnKind, ColumnStats, ColumnSummary, CorrelationMatrix, NumericStats, TableFormat,
    TextStats,
};

#[cfg(test)]
mod tests;
