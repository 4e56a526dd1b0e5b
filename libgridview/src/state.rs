use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::GridConfig;
use crate::i18n::{self, Locale};
use crate::message::Message;
use crate::query_state::QueryState;
use crate::table::{
    EditCommit, EditCursor, FieldDescriptor, FilterState, Record, SentinelOutcome,
    TableRuntimeState, TableSortSpec, WorkingRow, WorkingRowSet, WorkingSetKey,
    build_working_rows, format_rows_as_csv, sort_spec_on_click,
};

/// Draws the detail of an expanded row: `(ui, working-set index, row)`.
pub type ExpansionRenderer = Box<dyn FnMut(&mut egui::Ui, usize, &Record)>;
/// Asks the host for more records. Answered with [`Message::AppendRecords`].
pub type FetchMoreHandler = Box<dyn FnMut()>;
/// Replaces the CSV download.
pub type DownloadHandler = Box<dyn FnMut(&WorkingRowSet)>;

#[derive(Debug, Error)]
pub enum GridError {
    #[error("Field identifier '{0}' is used by more than one field")]
    DuplicateField(String),
}

/// The table view controller.
///
/// Owns the filter, sort, pagination, edit and expansion state of one grid
/// and the working set derived from the host's records.
pub struct TableView {
    pub(crate) config: GridConfig,
    pub(crate) fields: Vec<FieldDescriptor>,
    /// The host's records, shared with the working set until a row is edited.
    pub(crate) source: Vec<Arc<Record>>,
    /// Bumped on every change of `source`.
    pub(crate) generation: u64,
    pub(crate) sort: Option<TableSortSpec>,
    pub(crate) filter: FilterState,
    pub(crate) runtime: TableRuntimeState,
    pub(crate) locale: &'static Locale,
    pub(crate) query_state: Option<Box<dyn QueryState>>,
    pub(crate) expansion: Option<ExpansionRenderer>,
    pub(crate) fetch_more: Option<FetchMoreHandler>,
    pub(crate) download_handler: Option<DownloadHandler>,
}

impl TableView {
    pub fn new(fields: Vec<FieldDescriptor>, config: GridConfig) -> Result<Self, GridError> {
        let mut seen = HashSet::new();
        if let Some(dup) = fields.iter().find(|field| !seen.insert(field.identifier.as_str())) {
            return Err(GridError::DuplicateField(dup.identifier.clone()));
        }

        let lang = config.lang.clone().unwrap_or_else(i18n::system_language);
        let locale = i18n::locale(&lang);
        let runtime = TableRuntimeState::new(config.page_size);

        let mut view = Self {
            config,
            fields,
            source: vec![],
            generation: 0,
            sort: None,
            filter: FilterState::default(),
            runtime,
            locale,
            query_state: None,
            expansion: None,
            fetch_more: None,
            download_handler: None,
        };
        view.refresh();
        Ok(view)
    }

    #[must_use]
    pub fn with_records(mut self, records: Vec<Record>) -> Self {
        self.update(Message::SetRecords(records));
        self
    }

    /// Restores the filters persisted in `state` and keeps it up to date.
    #[must_use]
    pub fn with_query_state(mut self, state: impl QueryState + 'static) -> Self {
        self.filter = FilterState::load(&state, &self.config);
        self.query_state = Some(Box::new(state));
        self.refresh();
        self
    }

    /// Installs the expansion renderer, which also enables the expander column.
    #[must_use]
    pub fn on_expand(
        mut self,
        renderer: impl FnMut(&mut egui::Ui, usize, &Record) + 'static,
    ) -> Self {
        self.expansion = Some(Box::new(renderer));
        self
    }

    #[must_use]
    pub fn on_fetch_more(mut self, handler: impl FnMut() + 'static) -> Self {
        self.fetch_more = Some(Box::new(handler));
        self
    }

    /// Installs a download function that receives the working set instead of
    /// writing a CSV file.
    #[must_use]
    pub fn on_download(mut self, handler: impl FnMut(&WorkingRowSet) + 'static) -> Self {
        self.download_handler = Some(Box::new(handler));
        self
    }

    pub fn update(&mut self, message: Message) {
        match message {
            Message::SetRecords(records) => {
                self.source = records.into_iter().map(Arc::new).collect();
                self.source_changed();
            }
            Message::AppendRecords(records) => {
                self.source.extend(records.into_iter().map(Arc::new));
                self.source_changed();
            }
            Message::SortByField(identifier) => {
                let Some(field) = self.field(&identifier) else {
                    warn!("Cannot sort by unknown field '{identifier}'");
                    return;
                };
                let sort = sort_spec_on_click(self.sort.as_ref(), field);
                self.sort = sort;
                self.refresh();
            }
            Message::SetFilterText(text) => {
                self.filter.text = text;
                self.filter_changed();
            }
            Message::SetRowFilter(row_filter) => {
                self.filter.row_filter = row_filter;
                self.filter_changed();
            }
            Message::ResetFilters => {
                self.filter = FilterState::default();
                self.filter_changed();
            }
            Message::SentinelVisibility(visible) => self.sentinel_visibility(visible),
            Message::BeginEdit { row, field } => {
                if !self.field(&field).is_some_and(|f| f.editable) {
                    debug!("Field '{field}' is not editable");
                    return;
                }
                if let Some(abandoned) = self.runtime.edit.begin(row, field) {
                    debug!(
                        "Abandoned edit of row {} field '{}'",
                        abandoned.row, abandoned.field
                    );
                }
            }
            Message::EditCell { row, field, value } => {
                if !self.runtime.edit.is_editing(row, &field) {
                    warn!("Ignoring edit of row {row} field '{field}', which is not being edited");
                    return;
                }
                if !self.runtime.rows.write_cell(row, &field, value) {
                    warn!("Ignoring edit of row {row}, which is not in the table");
                }
            }
            Message::CommitEdit => {
                self.commit_edit();
            }
            Message::ToggleExpansion(index) => {
                if self.expansion.is_none() {
                    debug!("Row expansion is disabled");
                    return;
                }
                self.runtime.toggle_expansion(index);
            }
            Message::Download { path } => {
                crate::try_log_error!(self.download(path), "Failed to export table");
            }
        }
    }

    fn field(&self, identifier: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.identifier == identifier)
    }

    fn source_changed(&mut self) {
        self.generation += 1;
        self.runtime.pagination.fetch_completed();
        self.refresh();
    }

    fn filter_changed(&mut self) {
        if let Some(state) = self.query_state.as_deref_mut() {
            self.filter.store(state, &self.config);
        }
        self.refresh();
    }

    /// The filter with the stages disabled in the config removed.
    fn effective_filter(&self) -> FilterState {
        FilterState {
            text: if self.config.show_filter {
                self.filter.text.clone()
            } else {
                String::new()
            },
            row_filter: if self.config.show_row_filters {
                self.filter.row_filter.clone()
            } else {
                None
            },
        }
    }

    /// Rebuilds the working set if its inputs changed.
    fn refresh(&mut self) {
        let key = WorkingSetKey {
            filter: self.effective_filter(),
            sort: self.sort.clone(),
            generation: self.generation,
        };
        if self.runtime.key.as_ref() == Some(&key) {
            return;
        }

        self.runtime.rows =
            build_working_rows(&self.source, &self.fields, &key.filter, key.sort.as_ref());
        debug!(
            "Rebuilt working set: {} of {} records",
            self.runtime.rows.len(),
            self.source.len()
        );
        self.runtime.key = Some(key);
        // A visible sentinel has to act again on the new rows.
        self.runtime.pagination.rearm();
    }

    fn sentinel_visibility(&mut self, visible: bool) {
        let more_upstream = self
            .config
            .expected_total
            .is_none_or(|total| self.source.len() < total);
        let outcome = self.runtime.pagination.on_sentinel_visibility(
            visible,
            self.config.pagination,
            self.runtime.rows.len(),
            more_upstream,
        );
        if outcome == SentinelOutcome::FetchMore {
            match &mut self.fetch_more {
                Some(fetch_more) => {
                    info!("Requesting more records from the host");
                    fetch_more();
                }
                None => warn!("Host-fed pagination without a fetch-more handler"),
            }
        }
    }

    /// Ends the current edit and hands the edited value to the field's commit
    /// handler. Returns true if a handler was called.
    pub fn commit_edit(&mut self) -> bool {
        let Some(EditCursor { row, field }) = self.runtime.edit.finish() else {
            return false;
        };
        let Some(descriptor) = self.field(&field) else {
            return false;
        };
        let Some(working_row) = self.runtime.rows.get(row) else {
            warn!("Edited row {row} is no longer in the table");
            return false;
        };
        let Some(on_commit) = &descriptor.on_commit else {
            return false;
        };

        on_commit(EditCommit {
            value: working_row.record.value(&field),
            field: descriptor,
            row: working_row.record.as_ref(),
            index: row,
            source_index: working_row.base_index,
        });
        true
    }

    /// Re-enables fetching after a fetch-more request that delivered no records.
    pub fn fetch_completed(&mut self) {
        self.runtime.pagination.fetch_completed();
    }

    /// CSV of the whole working set, ignoring pagination.
    #[must_use]
    pub fn export_csv(&self) -> String {
        format_rows_as_csv(&self.fields, &self.runtime.rows)
    }

    #[must_use]
    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    #[must_use]
    pub fn locale(&self) -> &'static Locale {
        self.locale
    }

    #[must_use]
    pub fn source_len(&self) -> usize {
        self.source.len()
    }

    #[must_use]
    pub fn working_rows(&self) -> &WorkingRowSet {
        &self.runtime.rows
    }

    /// Working-set rows below the pagination cutoff.
    #[must_use]
    pub fn visible_rows(&self) -> &[WorkingRow] {
        &self.runtime.rows.rows[..self.runtime.visible_row_count()]
    }

    #[must_use]
    pub fn cutoff(&self) -> usize {
        self.runtime.pagination.cutoff()
    }

    /// Number shown next to the results label.
    #[must_use]
    pub fn result_count(&self) -> usize {
        match self.config.expected_total {
            Some(total) if !self.effective_filter().is_active() => total,
            _ => self.runtime.rows.len(),
        }
    }

    #[must_use]
    pub fn sort(&self) -> Option<&TableSortSpec> {
        self.sort.as_ref()
    }

    #[must_use]
    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    #[must_use]
    pub fn edit_cursor(&self) -> Option<&EditCursor> {
        self.runtime.edit.cursor()
    }

    #[must_use]
    pub fn expanded(&self) -> &BTreeSet<usize> {
        &self.runtime.expanded
    }

    #[must_use]
    pub fn is_expanded(&self, index: usize) -> bool {
        self.runtime.expanded.contains(&index)
    }

    #[must_use]
    pub fn has_expansion(&self) -> bool {
        self.expansion.is_some()
    }

    #[must_use]
    pub fn fetch_in_flight(&self) -> bool {
        self.runtime.pagination.fetch_in_flight()
    }
}
