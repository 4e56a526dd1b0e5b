use derive_more::Debug;
use std::path::PathBuf;

use crate::table::{Record, RowFilter};

/// Everything that changes a [`crate::TableView`].
///
/// The view pushes messages while drawing; they are applied with
/// [`crate::TableView::update`] once the frame is done. Hosts send the same
/// messages to feed records.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Replaces the record array.
    SetRecords(#[debug(skip)] Vec<Record>),
    /// Appends records delivered for a fetch-more request.
    AppendRecords(#[debug(skip)] Vec<Record>),
    /// Header click on the field with this identifier.
    SortByField(String),
    SetFilterText(String),
    SetRowFilter(Option<RowFilter>),
    /// Clears the global filter and the row filter.
    ResetFilters,
    /// Whether the sentinel row below the last visible row was drawn this frame.
    SentinelVisibility(bool),
    BeginEdit {
        row: usize,
        field: String,
    },
    /// A keystroke in the active editor.
    EditCell {
        row: usize,
        field: String,
        value: serde_json::Value,
    },
    /// The active editor lost focus.
    CommitEdit,
    ToggleExpansion(usize),
    /// Export the working set. Without a path a save dialog is shown.
    Download {
        path: Option<PathBuf>,
    },
}
