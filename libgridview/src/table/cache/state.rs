use super::super::edit::EditState;
use super::super::model::{FilterState, Record, TableSortSpec};
use super::super::pagination::PaginationState;
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Key of the inputs a working set was built from.
///
/// The working set is rebuilt only when this changes, so edits written into
/// it survive until the source, the filters or the sort change.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkingSetKey {
    /// Filter after applying the enable flags of the config.
    pub filter: FilterState,
    pub sort: Option<TableSortSpec>,
    /// Bumped whenever the host replaces or extends the record array.
    pub generation: u64,
}

/// One row of the working set.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkingRow {
    /// Index of the row in the host's record array.
    pub base_index: usize,
    pub record: Arc<Record>,
}

/// Filtered and sorted rows in display order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkingRowSet {
    pub rows: Vec<WorkingRow>,
}

impl WorkingRowSet {
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&WorkingRow> {
        self.rows.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &WorkingRow> {
        self.rows.iter()
    }

    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.rows.iter().map(|row| row.record.as_ref())
    }

    /// Writes `value` into one cell.
    ///
    /// The row is cloned on its first write, so the host's record behind the
    /// shared handle is never touched. Returns false for an unknown row.
    pub fn write_cell(&mut self, index: usize, field: &str, value: Value) -> bool {
        let Some(row) = self.rows.get_mut(index) else {
            return false;
        };
        Arc::make_mut(&mut row.record).insert(field, value);
        true
    }
}

/// Runtime state of a table (not persisted).
#[derive(Debug)]
pub struct TableRuntimeState {
    pub key: Option<WorkingSetKey>,
    pub rows: WorkingRowSet,
    pub edit: EditState,
    /// Positional indices of expanded rows.
    pub expanded: BTreeSet<usize>,
    pub pagination: PaginationState,
}

impl TableRuntimeState {
    #[must_use]
    pub fn new(page_size: usize) -> Self {
        Self {
            key: None,
            rows: WorkingRowSet::default(),
            edit: EditState::default(),
            expanded: BTreeSet::new(),
            pagination: PaginationState::new(page_size),
        }
    }

    /// Flips the expansion of the row at `index`. Returns true if it is now expanded.
    pub fn toggle_expansion(&mut self, index: usize) -> bool {
        if self.expanded.remove(&index) {
            false
        } else {
            self.expanded.insert(index);
            true
        }
    }

    /// Number of working-set rows below the pagination cutoff.
    #[must_use]
    pub fn visible_row_count(&self) -> usize {
        self.pagination.visible_len(self.rows.len())
    }
}
