//! Record representation shared by both engines.

use serde_json::{Map, Value};

use crate::error::{ForgeError, Result};

/// One unit of fixture data: a string-keyed, arbitrarily nested mapping.
pub type Record = Map<String, Value>;

/// Reserved key holding a record's tag set.
pub const TAGS_KEY: &str = "tags";

/// Convert a dynamic value into an owned list of records.
///
/// Fails unless `value` is an array whose every element is an object.
pub fn records_from_value(value: &Value) -> Result<Vec<Record>> {
    let items = value.as_array().ok_or(ForgeError::InvalidData)?;
    items
        .iter()
        .map(|item| item.as_object().cloned().ok_or(ForgeError::InvalidData))
        .collect()
}

/// Wrap records back into a JSON array.
pub fn records_to_value(records: &[Record]) -> Value {
    Value::Array(records.iter().cloned().map(Value::Object).collect())
}

/// Drop the `tags` key from every record.
pub fn strip_tags(mut records: Vec<Record>) -> Vec<Record> {
    for record in &mut records {
        record.shift_remove(TAGS_KEY);
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_list_of_objects() {
        let records = records_from_value(&json!([{"id": 1}, {"id": 2}])).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["id"], json!(2));
    }

    #[test]
    fn rejects_non_object_items() {
        let err = records_from_value(&json!([{"id": 1}, ""])).unwrap_err();
        assert_eq!(err.to_string(), "the provided data must be a list of mappings");
        assert!(records_from_value(&json!({"id": 1})).is_err());
    }

    #[test]
    fn strip_tags_keeps_other_keys_in_order() {
        let records = records_from_value(&json!([
            {"key": "a", "tags": {"type": "text"}, "data": {"text": "x"}, "size": 1},
            {"key": "b", "data": {"text": "y"}}
        ]))
        .unwrap();
        let stripped = strip_tags(records);
        assert_eq!(
            records_to_value(&stripped),
            json!([{"key": "a", "data": {"text": "x"}, "size": 1}, {"key": "b", "data": {"text": "y"}}])
        );
        let keys: Vec<&str> = stripped[0].keys().map(String::as_str).collect();
        assert_eq!(keys, ["key", "data", "size"]);
    }

    #[test]
    fn round_trips_through_value() {
        let value = json!([{"b": 1, "a": {"c": [1, 2]}}]);
        let records = records_from_value(&value).unwrap();
        assert_eq!(records_to_value(&records), value);
    }
}
