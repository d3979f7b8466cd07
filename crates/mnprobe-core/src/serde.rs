use std::collections::BTreeMap;
use std::iter::FromIterator;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::errors::{ErrorInfo, ProbeError};

fn serde_error(code: &str, err: impl ToString) -> ProbeError {
    ProbeError::Serde(ErrorInfo::new(code, err.to_string()))
}

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let ordered = map
                .into_iter()
                .map(|(key, value)| (key, canonicalize(value)))
                .collect::<BTreeMap<_, _>>();
            Value::Object(Map::from_iter(ordered))
        }
        Value::Array(values) => Value::Array(values.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

/// Serializes a value into pretty-printed JSON with deterministic key ordering.
pub fn to_canonical_json_pretty<T: Serialize>(value: &T) -> Result<String, ProbeError> {
    let value = serde_json::to_value(value).map_err(|err| serde_error("json_serialize", err))?;
    serde_json::to_string_pretty(&canonicalize(value))
        .map_err(|err| serde_error("json_write", err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_keys_are_sorted() {
        let value = serde_json::json!({"b": {"z": 1, "a": [{"y": 2, "x": 3}]}, "a": 0});
        let text = to_canonical_json_pretty(&value).unwrap();
        let positions: Vec<usize> = ["\"a\": 0", "\"b\"", "\"a\": [", "\"z\"", "\"x\"", "\"y\""]
            .iter()
            .map(|needle| text.find(needle).unwrap())
            .collect();
        assert!(positions[0] < positions[1]);
        assert!(positions[2] < positions[3]);
        assert!(positions[4] < positions[5]);
    }
}
