use super::super::model::{
    FieldDescriptor, FilterState, Record, TableSortDirection, TableSortKey, TableSortSpec,
};
use super::state::{WorkingRow, WorkingRowSet};
use std::cmp::Ordering;
use std::sync::Arc;

/// Case-insensitive substring filter over a row's composite filter text.
#[derive(Debug, Clone)]
struct GlobalFilter {
    text_lower: String,
}

impl GlobalFilter {
    fn new(text: &str) -> Self {
        Self {
            text_lower: text.to_lowercase(),
        }
    }

    fn is_active(&self) -> bool {
        !self.text_lower.is_empty()
    }

    fn matches(&self, haystack: &str) -> bool {
        !self.is_active() || haystack.contains(&self.text_lower)
    }
}

/// Lowercased filter texts of all fields, space separated.
#[must_use]
pub fn row_filter_text(fields: &[FieldDescriptor], record: &Record) -> String {
    fields
        .iter()
        .map(|field| field.filter_text(record).to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

struct RowEntry {
    row: WorkingRow,
    sort_key: TableSortKey,
}

fn sort_key_rank(key: &TableSortKey) -> u8 {
    match key {
        TableSortKey::None => 2,
        TableSortKey::Numeric(_) => 0,
        TableSortKey::Text(_) => 1,
    }
}

fn compare_sort_keys(a: &TableSortKey, b: &TableSortKey) -> Ordering {
    let rank_a = sort_key_rank(a);
    let rank_b = sort_key_rank(b);
    if rank_a != rank_b {
        return rank_a.cmp(&rank_b);
    }

    match (a, b) {
        (TableSortKey::None, TableSortKey::None) => Ordering::Equal,
        (TableSortKey::Numeric(left), TableSortKey::Numeric(right)) => left.total_cmp(right),
        (TableSortKey::Text(left), TableSortKey::Text(right)) => numeric_sort::cmp(left, right),
        _ => Ordering::Equal,
    }
}

/// Build the working row set by filtering and sorting the source records.
///
/// Stages run in order: global text filter, row filter, sort. The result is
/// always rebuilt from `source`; ties in the sort keep source order.
#[must_use]
pub fn build_working_rows(
    source: &[Arc<Record>],
    fields: &[FieldDescriptor],
    filter: &FilterState,
    sort: Option<&TableSortSpec>,
) -> WorkingRowSet {
    let global = GlobalFilter::new(&filter.text);
    let row_filter = filter.row_filter.as_ref().filter(|rf| rf.is_active());
    let sort_column = sort.and_then(|spec| {
        fields
            .iter()
            .find(|field| field.identifier == spec.key)
            .map(|field| (field, spec.direction))
    });

    let mut rows: Vec<RowEntry> = source
        .iter()
        .enumerate()
        .filter(|(_, record)| {
            !global.is_active() || global.matches(&row_filter_text(fields, record))
        })
        .filter(|(_, record)| row_filter.is_none_or(|rf| rf.passes(fields, record)))
        .map(|(base_index, record)| RowEntry {
            sort_key: sort_column.map_or(TableSortKey::None, |(field, _)| {
                field.sort_key_for(record)
            }),
            row: WorkingRow {
                base_index,
                record: Arc::clone(record),
            },
        })
        .collect();

    if let Some((_, direction)) = sort_column {
        rows.sort_by(|left, right| {
            let ord = compare_sort_keys(&left.sort_key, &right.sort_key);
            let ord = match direction {
                TableSortDirection::Ascending => ord,
                TableSortDirection::Descending => ord.reverse(),
            };
            ord.then(left.row.base_index.cmp(&right.row.base_index))
        });
    }

    WorkingRowSet {
        rows: rows.into_iter().map(|entry| entry.row).collect(),
    }
}
