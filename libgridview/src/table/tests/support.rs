use super::*;
use crate::config::GridConfig;
use std::sync::Arc;

pub(super) fn record(value: Value) -> Record {
    Record::from_json(value).expect("record must be a JSON object")
}

/// `[{id:1,name:"b"},{id:2,name:"a"},{id:3,name:"c"}]`
pub(super) fn scenario_records() -> Vec<Record> {
    vec![
        record(json!({"id": 1, "name": "b"})),
        record(json!({"id": 2, "name": "a"})),
        record(json!({"id": 3, "name": "c"})),
    ]
}

pub(super) fn scenario_fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::new("id", "Id"),
        FieldDescriptor::new("name", "Name"),
    ]
}

/// `count` records with ids from 0, a name and an email.
pub(super) fn numbered_records(count: usize) -> Vec<Record> {
    (0..count)
        .map(|i| {
            record(json!({
                "id": i,
                "name": format!("user {i}"),
                "email": format!("user{i}@example.com"),
            }))
        })
        .collect()
}

pub(super) fn person_fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::new("id", "Id"),
        FieldDescriptor::new("name", "Name"),
        FieldDescriptor::new("email", "Email"),
    ]
}

pub(super) fn shared(records: Vec<Record>) -> Vec<Arc<Record>> {
    records.into_iter().map(Arc::new).collect()
}

pub(super) fn ids<'a>(records: impl Iterator<Item = &'a Record>) -> Vec<i64> {
    records
        .map(|record| record.value("id").as_i64().expect("numeric id"))
        .collect()
}

pub(super) fn names<'a>(records: impl Iterator<Item = &'a Record>) -> Vec<String> {
    records
        .map(|record| model::value_text(record.value("name")))
        .collect()
}

/// English, both filters shown, small pages.
pub(super) fn test_config() -> GridConfig {
    let mut config = GridConfig::default().with_lang("en").with_page_size(2);
    config.show_filter = true;
    config.show_row_filters = true;
    config
}
