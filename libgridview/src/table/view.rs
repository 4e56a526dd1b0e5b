use std::collections::BTreeSet;

use egui::{Id, Label, RichText, TextEdit, UiBuilder};
use egui_extras::{Column, TableBuilder, TableRow};
use egui_remixicon::icons;
use serde_json::Value;

use crate::message::Message;
use crate::state::{ExpansionRenderer, TableView};
use crate::table::model::value_text;
use crate::table::{
    EditState, FieldDescriptor, InputType, Record, RowFilter, RowFilterOperator, TableCell,
    TableSortSpec, WorkingRow, sort_indicator,
};

/// Row height for dense mode (smaller text, less padding).
const ROW_HEIGHT_DENSE: f32 = 16.0;
/// Height of the row that marks the end of the rendered rows.
const SENTINEL_HEIGHT: f32 = 1.0;
const EXPANDER_WIDTH: f32 = 24.0;

/// A row of the table body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DisplayRow {
    /// Working-set row at this index.
    Record(usize),
    /// Detail of the expanded working-set row at this index.
    Expansion(usize),
    Sentinel,
}

struct BodyLayout<'a> {
    fields: &'a [FieldDescriptor],
    rows: &'a [WorkingRow],
    edit: &'a EditState,
    dense_rows: bool,
    has_expander: bool,
}

impl TableView {
    /// Draws the table and applies the messages produced while drawing.
    pub fn show(&mut self, ui: &mut egui::Ui) {
        let mut msgs = vec![];
        self.draw(ui, &mut msgs);

        let cutoff = self.cutoff();
        for msg in msgs {
            self.update(msg);
        }
        // The sentinel may still be visible after the table grew.
        if self.cutoff() != cutoff {
            ui.ctx().request_repaint();
        }
    }

    /// Draws the table, pushing the resulting messages to `msgs`.
    pub fn draw(&mut self, ui: &mut egui::Ui, msgs: &mut Vec<Message>) {
        ui.vertical(|ui| {
            self.render_toolbar(ui, msgs);
            self.render_table(ui, msgs);
        });
    }

    fn render_toolbar(&self, ui: &mut egui::Ui, msgs: &mut Vec<Message>) {
        let config = &self.config;
        let locale = self.locale;
        if !config.show_filter
            && !config.show_row_filters
            && !config.show_download
            && config.hide_result_count
        {
            return;
        }

        ui.horizontal(|ui| {
            if config.show_filter {
                ui.label(format!("{} {}", icons::FILTER_FILL, locale.get("filter")));
                let mut text = self.filter.text.clone();
                let response = ui.add(
                    TextEdit::singleline(&mut text)
                        .hint_text(locale.get("filter"))
                        .desired_width(150.0),
                );
                if response.changed() {
                    msgs.push(Message::SetFilterText(text));
                }
            }

            if config.show_row_filters {
                self.render_row_filter(ui, msgs);
            }

            if (config.show_filter || config.show_row_filters)
                && ui
                    .add_enabled(
                        self.filter.is_active(),
                        egui::Button::new(format!(
                            "{} {}",
                            icons::REFRESH_LINE,
                            locale.get("resetfilters")
                        )),
                    )
                    .clicked()
            {
                msgs.push(Message::ResetFilters);
            }

            if config.show_download
                && ui
                    .button(format!("{} {}", icons::SAVE_FILL, locale.get("download")))
                    .clicked()
            {
                msgs.push(Message::Download { path: None });
            }

            if !config.hide_result_count {
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(format!("{} {}", self.result_count(), locale.get("results")));
                });
            }
        });

        ui.separator();
    }

    fn render_row_filter(&self, ui: &mut egui::Ui, msgs: &mut Vec<Message>) {
        let locale = self.locale;
        let current = self.filter.row_filter.clone().unwrap_or_default();
        let mut new = current.clone();

        let field_name = self
            .fields
            .iter()
            .find(|field| field.identifier == current.field)
            .map_or(locale.get("field"), |field| field.name.as_str());
        egui::ComboBox::from_id_salt("gridview_row_filter_field")
            .selected_text(field_name)
            .show_ui(ui, |ui| {
                ui.selectable_value(&mut new.field, String::new(), "-");
                for field in &self.fields {
                    ui.selectable_value(&mut new.field, field.identifier.clone(), field.name.as_str());
                }
            });

        egui::ComboBox::from_id_salt("gridview_row_filter_operator")
            .selected_text(locale.get(current.operator.label_key()))
            .show_ui(ui, |ui| {
                for operator in enum_iterator::all::<RowFilterOperator>() {
                    ui.selectable_value(
                        &mut new.operator,
                        operator,
                        locale.get(operator.label_key()),
                    );
                }
            });

        match new.operator {
            RowFilterOperator::IsEmpty => {
                let mut enabled = !new.operand.is_empty();
                if ui.checkbox(&mut enabled, locale.get("value")).changed() {
                    new.operand = if enabled { "1".to_string() } else { String::new() };
                }
            }
            RowFilterOperator::Equals => {
                ui.add(
                    TextEdit::singleline(&mut new.operand)
                        .hint_text(locale.get("value"))
                        .desired_width(100.0),
                );
            }
        }

        if new != current {
            msgs.push(Message::SetRowFilter(row_filter_or_none(new)));
        }
    }

    fn render_table(&mut self, ui: &mut egui::Ui, msgs: &mut Vec<Message>) {
        let visible_len = self.runtime.visible_row_count();
        let Self {
            config,
            fields,
            sort,
            runtime,
            expansion,
            ..
        } = self;

        let layout = BodyLayout {
            fields: fields.as_slice(),
            rows: &runtime.rows.rows[..visible_len],
            edit: &runtime.edit,
            dense_rows: config.dense_rows,
            has_expander: expansion.is_some(),
        };
        let row_height = if config.dense_rows {
            ROW_HEIGHT_DENSE
        } else {
            config.row_height
        };

        let body_rows = display_rows(visible_len, &runtime.expanded, layout.has_expander);
        let heights = body_rows.iter().map(|row| match row {
            DisplayRow::Record(_) => row_height,
            DisplayRow::Expansion(_) => config.expansion_height,
            DisplayRow::Sentinel => SENTINEL_HEIGHT,
        });

        let mut builder = TableBuilder::new(ui)
            .striped(true)
            .vscroll(true)
            .sense(egui::Sense::click())
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center));
        if layout.has_expander {
            builder = builder.column(Column::exact(EXPANDER_WIDTH).clip(false));
        }
        for field in layout.fields {
            let width = field.width.unwrap_or(config.default_column_width);
            builder = builder.column(Column::initial(width).resizable(true).clip(true));
        }

        let mut sentinel_visible = false;
        builder
            .header(row_height, |mut header| {
                if layout.has_expander {
                    header.col(|_| {});
                }
                for field in layout.fields {
                    header.col(|ui| {
                        render_header_cell(ui, msgs, field, sort.as_ref(), layout.dense_rows);
                    });
                }
            })
            .body(|body| {
                body.heterogeneous_rows(heights, |mut row| match body_rows[row.index()] {
                    DisplayRow::Record(index) => {
                        render_record_row(&mut row, msgs, &layout, index, &runtime.expanded);
                    }
                    DisplayRow::Expansion(index) => {
                        if let (Some(renderer), Some(working_row)) =
                            (expansion.as_mut(), layout.rows.get(index))
                        {
                            render_expansion_row(&mut row, renderer, index, &working_row.record);
                        }
                    }
                    DisplayRow::Sentinel => sentinel_visible = true,
                });
            });

        msgs.push(Message::SentinelVisibility(sentinel_visible));
    }
}

fn row_filter_or_none(row_filter: RowFilter) -> Option<RowFilter> {
    if row_filter.field.is_empty() && row_filter.operand.is_empty() {
        None
    } else {
        Some(row_filter)
    }
}

/// Record rows in order, each followed by its detail row if expanded, then the sentinel.
fn display_rows(
    visible_len: usize,
    expanded: &BTreeSet<usize>,
    has_expander: bool,
) -> Vec<DisplayRow> {
    let mut rows = Vec::with_capacity(visible_len + expanded.len() + 1);
    for index in 0..visible_len {
        rows.push(DisplayRow::Record(index));
        if has_expander && expanded.contains(&index) {
            rows.push(DisplayRow::Expansion(index));
        }
    }
    rows.push(DisplayRow::Sentinel);
    rows
}

fn render_header_cell(
    ui: &mut egui::Ui,
    msgs: &mut Vec<Message>,
    field: &FieldDescriptor,
    sort: Option<&TableSortSpec>,
    dense_rows: bool,
) {
    let header_text = match sort_indicator(sort, &field.identifier) {
        Some(indicator) => format!("{} {}", field.name, indicator),
        None => field.name.clone(),
    };
    let label = if dense_rows {
        RichText::new(header_text).small()
    } else {
        RichText::new(header_text).strong()
    };

    if field.disable_sort {
        ui.add(Label::new(label).selectable(false));
        return;
    }

    let response = ui.add(
        Label::new(label)
            .selectable(false)
            .sense(egui::Sense::click()),
    );
    if response.clicked() {
        msgs.push(Message::SortByField(field.identifier.clone()));
    }
}

fn render_record_row(
    row: &mut TableRow,
    msgs: &mut Vec<Message>,
    layout: &BodyLayout,
    index: usize,
    expanded: &BTreeSet<usize>,
) {
    let Some(working_row) = layout.rows.get(index) else {
        return;
    };
    let record = working_row.record.as_ref();

    if layout.has_expander {
        row.col(|ui| {
            let icon = if expanded.contains(&index) {
                icons::SUBTRACT_FILL
            } else {
                icons::ADD_FILL
            };
            if ui.add(egui::Button::new(icon).frame(false)).clicked() {
                msgs.push(Message::ToggleExpansion(index));
            }
        });
    }

    for field in layout.fields {
        let editing = layout.edit.is_editing(index, &field.identifier);
        let (_, response) = row.col(|ui| {
            if editing {
                render_editor(ui, msgs, index, field, record);
            } else {
                render_cell(ui, field, record, layout.dense_rows);
            }
        });
        if !editing && field.editable && response.double_clicked() {
            msgs.push(Message::BeginEdit {
                row: index,
                field: field.identifier.clone(),
            });
        }
    }
}

fn render_expansion_row(
    row: &mut TableRow,
    renderer: &mut ExpansionRenderer,
    index: usize,
    record: &Record,
) {
    row.col(|ui| {
        let cell = ui.max_rect();
        let full_width = egui::Rect::from_min_max(
            cell.min,
            egui::pos2(ui.clip_rect().max.x.max(cell.max.x), cell.max.y),
        );
        ui.scope_builder(UiBuilder::new().max_rect(full_width), |ui| {
            renderer(ui, index, record);
        });
    });
}

fn render_cell(ui: &mut egui::Ui, field: &FieldDescriptor, record: &Record, dense_rows: bool) {
    let text = match field.display(record) {
        TableCell::Text(s) => s,
        TableCell::RichText(rt) => {
            ui.add(Label::new(rt).selectable(false));
            return;
        }
    };
    let label = if dense_rows {
        RichText::new(text).small()
    } else {
        RichText::new(text)
    };
    ui.add(Label::new(label).selectable(false));
}

fn render_editor(
    ui: &mut egui::Ui,
    msgs: &mut Vec<Message>,
    row: usize,
    field: &FieldDescriptor,
    record: &Record,
) {
    let value = record.value(&field.identifier);
    let response = match field.input_type {
        InputType::Checkbox => {
            let mut checked = value_as_bool(value);
            let response = ui.checkbox(&mut checked, "");
            if response.changed() {
                msgs.push(Message::EditCell {
                    row,
                    field: field.identifier.clone(),
                    value: Value::Bool(checked),
                });
            }
            response
        }
        input_type => {
            let mut text = value_text(value);
            let response = ui.add(
                TextEdit::singleline(&mut text)
                    .password(input_type == InputType::Password)
                    .desired_width(f32::INFINITY),
            );
            if response.changed() {
                msgs.push(Message::EditCell {
                    row,
                    field: field.identifier.clone(),
                    value: parse_input(input_type, text),
                });
            }
            response
        }
    };

    // Focus the editor on its first frame only, so that it can lose focus.
    let focus_id = Id::new("gridview_edit_focus");
    let cell = (row, field.identifier.clone());
    if ui.data(|data| data.get_temp::<(usize, String)>(focus_id)) != Some(cell.clone()) {
        response.request_focus();
        ui.data_mut(|data| data.insert_temp(focus_id, cell));
    }

    if response.lost_focus() || response.clicked_elsewhere() {
        ui.data_mut(|data| data.remove::<(usize, String)>(focus_id));
        msgs.push(Message::CommitEdit);
    }
}

/// Value written for the text entered into an editor.
fn parse_input(input_type: InputType, text: String) -> Value {
    match input_type {
        InputType::Number => text
            .trim()
            .parse::<serde_json::Number>()
            .map_or(Value::String(text), Value::Number),
        _ => Value::String(text),
    }
}

fn value_as_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => matches!(s.to_lowercase().as_str(), "true" | "1" | "yes" | "on"),
        Value::Null | Value::Array(_) | Value::Object(_) => false,
    }
}
