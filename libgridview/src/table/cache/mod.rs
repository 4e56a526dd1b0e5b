mod builder;
mod export;
mod state;

pub use builder::{build_working_rows, row_filter_text};
pub use export::{CSV_DELIMITER, format_rows_as_csv};
pub use state::{TableRuntimeState, WorkingRow, WorkingRowSet, WorkingSetKey};
