use derive_more::Display;
use egui::RichText;
use enum_iterator::Sequence;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Field value used when a record has no entry for a field.
static MISSING: Value = Value::Null;

/// One host record: field identifier to JSON value.
///
/// The grid reads field values through [`Record::value`]; the host keeps
/// ownership of its originals and the grid holds shared handles to them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(field.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Returns the value for `field`, or `Value::Null` when it is absent.
    #[must_use]
    pub fn value(&self, field: &str) -> &Value {
        self.0.get(field).unwrap_or(&MISSING)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Interprets a JSON object as a record. Other JSON values yield `None`.
    #[must_use]
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// Stringifies a field value the way it is shown, filtered and compared.
/// Missing and null values become the empty string.
#[must_use]
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// True for null, missing, empty strings and empty containers.
#[must_use]
pub fn is_empty_value(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Object(map)) => map.is_empty(),
        Some(Value::Bool(_) | Value::Number(_)) => false,
    }
}

/// Display-ready cell content.
#[derive(Debug, Clone)]
pub enum TableCell {
    Text(String),
    RichText(RichText),
}

impl TableCell {
    /// Plain text of the cell, dropping any styling.
    #[must_use]
    pub fn text(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::RichText(rt) => rt.text().to_string(),
        }
    }
}

impl From<String> for TableCell {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for TableCell {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// Sortable value for ordering rows.
#[derive(Debug, Clone, PartialEq)]
pub enum TableSortKey {
    None,
    Numeric(f64),
    Text(String),
}

impl TableSortKey {
    /// Default key for a raw value: numbers sort numerically, everything
    /// else by its text.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Number(n) => n
                .as_f64()
                .map_or_else(|| Self::Text(n.to_string()), Self::Numeric),
            other => Self::Text(value_text(other)),
        }
    }
}

/// Editor hint for editable fields.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Sequence,
)]
pub enum InputType {
    #[default]
    Text,
    Number,
    Email,
    Password,
    Search,
    Tel,
    Url,
    Date,
    DateTime,
    Month,
    Week,
    Time,
    Color,
    Checkbox,
}

pub type CellFormatter = Arc<dyn Fn(&Value, &Record) -> TableCell + Send + Sync>;
pub type TextExtractor = Arc<dyn Fn(&Value, &Record) -> String + Send + Sync>;
pub type SortKeyExtractor = Arc<dyn Fn(&Value, &Record) -> TableSortKey + Send + Sync>;
pub type CommitHandler = Arc<dyn Fn(EditCommit<'_>) + Send + Sync>;

/// Payload handed to a field's commit handler when an edited cell loses focus.
#[derive(Debug, Clone, Copy)]
pub struct EditCommit<'a> {
    pub value: &'a Value,
    pub field: &'a FieldDescriptor,
    pub row: &'a Record,
    /// Position of the row in the current working set.
    pub index: usize,
    /// Position of the row in the host's record array.
    pub source_index: usize,
}

/// A table column definition.
#[derive(Clone)]
pub struct FieldDescriptor {
    /// Header text.
    pub name: String,
    /// Key into each record. Unique within a table.
    pub identifier: String,
    pub width: Option<f32>,
    pub formatter: Option<CellFormatter>,
    pub csv_formatter: Option<TextExtractor>,
    pub sort_key: Option<SortKeyExtractor>,
    pub filter_key: Option<TextExtractor>,
    pub editable: bool,
    pub on_commit: Option<CommitHandler>,
    pub disable_sort: bool,
    pub input_type: InputType,
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("identifier", &self.identifier)
            .field("width", &self.width)
            .field("formatter", &self.formatter.as_ref().map(|_| "..."))
            .field("csv_formatter", &self.csv_formatter.as_ref().map(|_| "..."))
            .field("sort_key", &self.sort_key.as_ref().map(|_| "..."))
            .field("filter_key", &self.filter_key.as_ref().map(|_| "..."))
            .field("editable", &self.editable)
            .field("on_commit", &self.on_commit.as_ref().map(|_| "..."))
            .field("disable_sort", &self.disable_sort)
            .field("input_type", &self.input_type)
            .finish()
    }
}

impl FieldDescriptor {
    /// Create a new field with the given identifier and header.
    pub fn new(identifier: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            identifier: identifier.into(),
            width: None,
            formatter: None,
            csv_formatter: None,
            sort_key: None,
            filter_key: None,
            editable: false,
            on_commit: None,
            disable_sort: false,
            input_type: InputType::Text,
        }
    }

    #[must_use]
    pub fn width(mut self, width: f32) -> Self {
        self.width = Some(width);
        self
    }

    #[must_use]
    pub fn formatter(
        mut self,
        f: impl Fn(&Value, &Record) -> TableCell + Send + Sync + 'static,
    ) -> Self {
        self.formatter = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn csv_formatter(
        mut self,
        f: impl Fn(&Value, &Record) -> String + Send + Sync + 'static,
    ) -> Self {
        self.csv_formatter = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn sort_key(
        mut self,
        f: impl Fn(&Value, &Record) -> TableSortKey + Send + Sync + 'static,
    ) -> Self {
        self.sort_key = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn filter_key(
        mut self,
        f: impl Fn(&Value, &Record) -> String + Send + Sync + 'static,
    ) -> Self {
        self.filter_key = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn editable(mut self, input_type: InputType) -> Self {
        self.editable = true;
        self.input_type = input_type;
        self
    }

    #[must_use]
    pub fn on_commit(mut self, f: impl Fn(EditCommit<'_>) + Send + Sync + 'static) -> Self {
        self.on_commit = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn unsortable(mut self) -> Self {
        self.disable_sort = true;
        self
    }

    /// Cell content for `record`: the formatter output, or the raw value.
    #[must_use]
    pub fn display(&self, record: &Record) -> TableCell {
        let value = record.value(&self.identifier);
        match &self.formatter {
            Some(formatter) => formatter(value, record),
            None => TableCell::Text(value_text(value)),
        }
    }

    /// Text written to CSV exports.
    #[must_use]
    pub fn csv_text(&self, record: &Record) -> String {
        match &self.csv_formatter {
            Some(formatter) => formatter(record.value(&self.identifier), record),
            None => self.display(record).text(),
        }
    }

    /// Text the global and row filters match against.
    #[must_use]
    pub fn filter_text(&self, record: &Record) -> String {
        let value = record.value(&self.identifier);
        match &self.filter_key {
            Some(extractor) => extractor(value, record),
            None => value_text(value),
        }
    }

    #[must_use]
    pub fn sort_key_for(&self, record: &Record) -> TableSortKey {
        let value = record.value(&self.identifier);
        match &self.sort_key {
            Some(extractor) => extractor(value, record),
            None => TableSortKey::from_value(value),
        }
    }
}

/// Column sort specification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableSortSpec {
    pub key: String,
    pub direction: TableSortDirection,
}

/// Sort order for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TableSortDirection {
    Ascending,
    Descending,
}

/// Row filter operators offered next to the field selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Sequence)]
#[serde(rename_all = "lowercase")]
pub enum RowFilterOperator {
    #[default]
    #[serde(alias = "isequal")]
    Equals,
    #[serde(rename = "isempty")]
    IsEmpty,
}

impl RowFilterOperator {
    /// Localization key of the operator label.
    #[must_use]
    pub fn label_key(self) -> &'static str {
        match self {
            Self::Equals => "isequal",
            Self::IsEmpty => "isempty",
        }
    }
}

/// Structured single-field filter.
///
/// Every field is checked; only the targeted field sees the operand; the
/// others compare against the empty operand and pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RowFilter {
    pub field: String,
    pub operator: RowFilterOperator,
    pub operand: String,
}

impl RowFilter {
    #[must_use]
    pub fn new(
        field: impl Into<String>,
        operator: RowFilterOperator,
        operand: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            operator,
            operand: operand.into(),
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.field.is_empty() && !self.operand.is_empty()
    }

    #[must_use]
    pub fn passes(&self, fields: &[FieldDescriptor], record: &Record) -> bool {
        fields.iter().all(|field| {
            let operand = if field.identifier == self.field {
                self.operand.as_str()
            } else {
                ""
            };
            if operand.is_empty() {
                return true;
            }
            match self.operator {
                RowFilterOperator::Equals => field.filter_text(record) == operand,
                RowFilterOperator::IsEmpty => is_empty_value(record.get(&field.identifier)),
            }
        })
    }
}

/// Global text filter plus the optional row filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterState {
    pub text: String,
    pub row_filter: Option<RowFilter>,
}

impl FilterState {
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.text.is_empty() || self.row_filter.as_ref().is_some_and(RowFilter::is_active)
    }
}

/// Computes the new sort spec when a column header is clicked.
/// - Sort disabled on the field: unchanged
/// - Field is the active sort: toggle direction
/// - Otherwise: sort by the field, ascending
#[must_use]
pub fn sort_spec_on_click(
    current: Option<&TableSortSpec>,
    field: &FieldDescriptor,
) -> Option<TableSortSpec> {
    if field.disable_sort {
        return current.cloned();
    }

    match current {
        Some(spec) if spec.key == field.identifier => Some(TableSortSpec {
            key: spec.key.clone(),
            direction: match spec.direction {
                TableSortDirection::Ascending => TableSortDirection::Descending,
                TableSortDirection::Descending => TableSortDirection::Ascending,
            },
        }),
        _ => Some(TableSortSpec {
            key: field.identifier.clone(),
            direction: TableSortDirection::Ascending,
        }),
    }
}

/// Returns the sort indicator text for a column header, if it is sorted.
///
/// Uses arrow symbols that are included in the default egui fonts.
#[must_use]
pub fn sort_indicator(sort: Option<&TableSortSpec>, key: &str) -> Option<&'static str> {
    let spec = sort.filter(|spec| spec.key == key)?;
    Some(match spec.direction {
        TableSortDirection::Ascending => "⬆",
        TableSortDirection::Descending => "⬇",
    })
}
