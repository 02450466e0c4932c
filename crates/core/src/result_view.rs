use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::blob::{display_value, is_blob_type};

/// What the result panel shows after a load or submit: a plain message
/// (errors, validation failures, acks, affected-row counts) or a tabular
/// result set. The two never coexist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultView {
    Message(String),
    Table {
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    },
}

impl ResultView {
    #[must_use]
    pub fn message(text: impl Into<String>) -> Self {
        Self::Message(text.into())
    }
}

/// Projects a result set into a table: headers from the first record's keys,
/// one row per record. When a column-type map was gathered beforehand, blob
/// cells are base64-decoded; without one, values render raw.
#[must_use]
pub fn table_from_records(
    records: &[Map<String, Value>],
    column_types: Option<&HashMap<String, String>>,
) -> ResultView {
    let headers: Vec<String> = records
        .first()
        .map(|record| record.keys().cloned().collect())
        .unwrap_or_default();

    let rows = records
        .iter()
        .map(|record| {
            headers
                .iter()
                .map(|column| {
                    let raw = record
                        .get(column)
                        .map(value_to_display)
                        .unwrap_or_default();
                    match column_types.and_then(|types| types.get(column)) {
                        Some(column_type) if is_blob_type(column_type) => {
                            display_value(column_type, &raw)
                        }
                        _ => raw,
                    }
                })
                .collect()
        })
        .collect();

    ResultView::Table { headers, rows }
}

fn value_to_display(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde_json::{json, Map, Value};

    use super::{table_from_records, ResultView};

    fn record(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn headers_come_from_the_first_record() {
        let records = vec![
            record(&[("id", json!(1)), ("name", json!("ada"))]),
            record(&[("id", json!(2)), ("name", json!("grace"))]),
        ];

        let view = table_from_records(&records, None);
        let ResultView::Table { headers, rows } = view else {
            panic!("expected a table");
        };
        assert_eq!(headers, vec!["id".to_string(), "name".to_string()]);
        assert_eq!(rows[0], vec!["1".to_string(), "ada".to_string()]);
        assert_eq!(rows[1], vec!["2".to_string(), "grace".to_string()]);
    }

    #[test]
    fn empty_result_set_renders_an_empty_table() {
        let view = table_from_records(&[], None);
        assert_eq!(
            view,
            ResultView::Table {
                headers: Vec::new(),
                rows: Vec::new()
            }
        );
    }

    #[test]
    fn blob_columns_decode_when_a_type_map_is_available() {
        let records = vec![record(&[
            ("payload", json!("aGVsbG8=")),
            ("name", json!("ada")),
        ])];
        let mut types = HashMap::new();
        types.insert("payload".to_string(), "BLOB".to_string());
        types.insert("name".to_string(), "varchar(255)".to_string());

        let ResultView::Table { rows, .. } = table_from_records(&records, Some(&types)) else {
            panic!("expected a table");
        };
        assert_eq!(rows[0], vec!["ada".to_string(), "hello".to_string()]);
    }

    #[test]
    fn without_a_type_map_values_render_raw() {
        let records = vec![record(&[("payload", json!("aGVsbG8="))])];
        let ResultView::Table { rows, .. } = table_from_records(&records, None) else {
            panic!("expected a table");
        };
        assert_eq!(rows[0], vec!["aGVsbG8=".to_string()]);
    }

    #[test]
    fn null_and_numeric_cells_render_like_the_original_panel() {
        let records = vec![record(&[("age", json!(null)), ("count", json!(3.5))])];
        let ResultView::Table { rows, .. } = table_from_records(&records, None) else {
            panic!("expected a table");
        };
        assert_eq!(rows[0], vec!["null".to_string(), "3.5".to_string()]);
    }
}
