pub mod describe;
pub mod table;

pub use describe::{
    coefficient_of_variation, describe, describe_series, format_stat, textual_summary,
    ColumnKind, ColumnSummary, STATS_HEADER,
};
pub use table::{ColumnValues, ColumnVector, Table};
