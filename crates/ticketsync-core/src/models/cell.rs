//! Spreadsheet cells arrive as strings, numbers or booleans depending on how
//! the sheet formats them. Everything is normalized to a string.

use serde::{de, Deserialize, Deserializer};
use serde_json::Value;

pub(crate) fn cell<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(de::Error::custom(format!(
            "expected a scalar cell value, got {}",
            other
        ))),
    }
}
