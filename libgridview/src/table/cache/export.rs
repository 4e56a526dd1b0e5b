use super::super::model::FieldDescriptor;
use super::state::WorkingRowSet;
use std::borrow::Cow;

pub const CSV_DELIMITER: char = ',';

/// Quotes a CSV field when it contains the delimiter, a quote or a line break.
fn escape_csv_field(text: &str) -> Cow<'_, str> {
    if text.contains([CSV_DELIMITER, '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", text.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(text)
    }
}

fn push_line<'a>(output: &mut String, cells: impl Iterator<Item = Cow<'a, str>>) {
    for (col_num, cell) in cells.enumerate() {
        if col_num > 0 {
            output.push(CSV_DELIMITER);
        }
        output.push_str(&cell);
    }
}

/// Formats rows as comma separated values with a header of field names.
///
/// Rows are written in working-set order, ignoring the pagination cutoff.
/// Lines are separated by `\n` without a trailing newline.
#[must_use]
pub fn format_rows_as_csv(fields: &[FieldDescriptor], rows: &WorkingRowSet) -> String {
    let mut output = String::new();

    push_line(
        &mut output,
        fields.iter().map(|field| escape_csv_field(&field.name)),
    );

    for record in rows.records() {
        output.push('\n');
        let texts: Vec<String> = fields.iter().map(|field| field.csv_text(record)).collect();
        push_line(&mut output, texts.iter().map(|text| escape_csv_field(text)));
    }

    output
}
