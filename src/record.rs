//! Log records accepted by the sink and their batch serialisation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One decoded JSON log object.
///
/// Records are created from the raw bytes handed over by the logging
/// facility and are never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Decode `bytes` as a single JSON object.
    ///
    /// Arrays, scalars and malformed input are rejected. Surrounding
    /// whitespace, including a trailing newline, is accepted.
    pub fn from_slice(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }

    /// Borrow the decoded fields.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Look up a single top-level field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Serialise a pending batch as one JSON array, preserving order.
pub(crate) fn serialise_batch(records: &[Record]) -> serde_json::Result<String> {
    serde_json::to_string(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn decodes_nested_object() {
        let record = Record::from_slice(br#"{"level":"info","ctx":{"user":1}}"#).expect("decode");
        assert_eq!(record.get("level"), Some(&json!("info")));
        assert_eq!(record.get("ctx"), Some(&json!({"user": 1})));
    }

    #[rstest]
    fn accepts_trailing_newline() {
        let record = Record::from_slice(b"{\"msg\":\"hi\"}\n").expect("decode");
        assert_eq!(record.get("msg"), Some(&json!("hi")));
    }

    #[rstest]
    #[case(b"not-json".as_slice())]
    #[case(b"[1,2]".as_slice())]
    #[case(b"42".as_slice())]
    #[case(b"".as_slice())]
    #[case(b"{\"a\":1".as_slice())]
    fn rejects_non_objects(#[case] input: &[u8]) {
        assert!(Record::from_slice(input).is_err());
    }

    #[rstest]
    fn batch_serialises_as_array_in_order() {
        let batch = vec![
            Record::from_slice(br#"{"a":1}"#).expect("decode"),
            Record::from_slice(br#"{"b":2}"#).expect("decode"),
        ];
        assert_eq!(serialise_batch(&batch).expect("encode"), r#"[{"a":1},{"b":2}]"#);
    }
}
