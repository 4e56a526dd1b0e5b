//! The grid widget: data model, working-set pipeline, pagination, inline
//! editing and the egui view.

pub mod cache;
pub mod edit;
pub mod model;
pub mod pagination;
pub mod view;

pub use cache::{
    CSV_DELIMITER, TableRuntimeState, WorkingRow, WorkingRowSet, WorkingSetKey,
    build_working_rows, format_rows_as_csv, row_filter_text,
};
pub use edit::{EditCursor, EditState};
pub use model::{
    CellFormatter, CommitHandler, EditCommit, FieldDescriptor, FilterState, InputType, Record,
    RowFilter, RowFilterOperator, SortKeyExtractor, TableCell, TableSortDirection, TableSortKey,
    TableSortSpec, TextExtractor, sort_indicator, sort_spec_on_click,
};
pub use pagination::{PaginationMode, PaginationState, SentinelOutcome};
