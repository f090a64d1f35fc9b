//! Dataset record shape

use serde_json::{Map, Value};

/// One input line: an opaque JSON object, key order preserved
pub type Record = Map<String, Value>;

/// Borrow a string field from a record, if present and a string
pub fn string_field<'a>(record: &'a Record, field: &str) -> Option<&'a str> {
  record.get(field).and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_string_field() {
    let record: Record = serde_json::from_value(json!({"correct_code": "print(1)", "n": 3})).unwrap();
    assert_eq!(string_field(&record, "correct_code"), Some("print(1)"));
    assert_eq!(string_field(&record, "n"), None);
    assert_eq!(string_field(&record, "missing"), None);
  }

  #[test]
  fn test_key_order_preserved() {
    let line = r#"{"z":1,"a":"ñandú","m":null}"#;
    let record: Record = serde_json::from_str(line).unwrap();
    assert_eq!(serde_json::to_string(&record).unwrap(), line);
  }
}
