use super::support::*;
use super::*;
use test_log::test;

fn email_fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::new("name", "name"),
        FieldDescriptor::new("email", "email"),
    ]
}

fn working_set(records: Vec<Record>, fields: &[FieldDescriptor]) -> WorkingRowSet {
    build_working_rows(&shared(records), fields, &FilterState::default(), None)
}

#[test]
fn two_records_export_as_header_and_lines() {
    let fields = email_fields();
    let rows = working_set(
        vec![
            record(json!({"name": "Ann", "email": "ann@example.com"})),
            record(json!({"name": "Bob", "email": "bob@example.com"})),
        ],
        &fields,
    );
    assert_eq!(
        format_rows_as_csv(&fields, &rows),
        "name,email\nAnn,ann@example.com\nBob,bob@example.com"
    );
}

#[test]
fn empty_working_set_exports_header_only() {
    let fields = email_fields();
    let rows = working_set(vec![], &fields);
    assert_eq!(format_rows_as_csv(&fields, &rows), "name,email");
}

#[test]
fn values_with_delimiters_quotes_or_newlines_are_quoted() {
    let fields = email_fields();
    let rows = working_set(
        vec![record(json!({
            "name": "Doe, \"Jay\"",
            "email": "line\nbreak",
        }))],
        &fields,
    );
    assert_eq!(
        format_rows_as_csv(&fields, &rows),
        "name,email\n\"Doe, \"\"Jay\"\"\",\"line\nbreak\""
    );
}

#[test]
fn header_names_are_quoted_too() {
    let fields = vec![FieldDescriptor::new("a", "last, first")];
    let rows = working_set(vec![record(json!({"a": "x"}))], &fields);
    assert_eq!(format_rows_as_csv(&fields, &rows), "\"last, first\"\nx");
}

#[test]
fn csv_formatter_wins_over_display_formatter() {
    let fields = vec![
        FieldDescriptor::new("price", "price")
            .formatter(|value, _| TableCell::Text(format!("€ {value}")))
            .csv_formatter(|value, _| model::value_text(value)),
        FieldDescriptor::new("qty", "qty")
            .formatter(|value, _| TableCell::RichText(format!("{value} pcs").into())),
    ];
    let rows = working_set(vec![record(json!({"price": 3, "qty": 2}))], &fields);
    assert_eq!(format_rows_as_csv(&fields, &rows), "price,qty\n3,2 pcs");
}

#[test]
fn missing_values_export_empty() {
    let fields = email_fields();
    let rows = working_set(vec![record(json!({"name": "Ann"}))], &fields);
    assert_eq!(format_rows_as_csv(&fields, &rows), "name,email\nAnn,");
}

#[test]
fn export_covers_rows_beyond_the_cutoff() {
    let view = crate::state::TableView::new(person_fields(), test_config())
        .expect("valid fields")
        .with_records(numbered_records(5));
    assert_eq!(view.visible_rows().len(), 2);
    assert_eq!(view.export_csv().lines().count(), 6);
}
