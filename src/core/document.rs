//! Purpose: Extract root specifications from a parsed input document.
//! Exports: `RootDocument`, `RootSpec`.
//! Role: Schema boundary between raw JSON and the decoding pipeline.
//! Invariants: Only entries `"1"..="k"` are read; anything else in the document is ignored.
//! Invariants: `base` and `k`/`n` accept a JSON number or a base-10 string.
//! Invariants: Schema failures name the JSON path that was missing or ill-typed.
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::error::{Error, ErrorKind};
use crate::json::parse;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RootSpec {
    /// 1-based key of the entry in the document.
    pub index: u64,
    pub base: u32,
    pub value: String,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RootDocument {
    pub k: u64,
    pub n: Option<u64>,
    pub roots: Vec<RootSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum IntField {
    Number(u64),
    Text(String),
}

impl IntField {
    fn to_u64(&self, field: &str) -> Result<u64, Error> {
        match self {
            IntField::Number(n) => Ok(*n),
            IntField::Text(text) => text.trim().parse::<u64>().map_err(|err| {
                schema_error(format!(
                    "`{field}` must be a base-10 integer, got {text:?}"
                ))
                .with_source(err)
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct KeysRecord {
    k: IntField,
    #[serde(default)]
    n: Option<IntField>,
}

#[derive(Debug, Deserialize)]
struct EntryRecord {
    base: IntField,
    value: String,
}

impl RootDocument {
    /// Parses JSON text and extracts the document in one step.
    pub fn parse(input: &str) -> Result<Self, Error> {
        let value: Value = parse::from_str(input).map_err(|err| {
            Error::new(ErrorKind::Parse)
                .with_message("input is not valid JSON")
                .with_hint(parse::hint_for_error(&err, "input document"))
                .with_source(err)
        })?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self, Error> {
        let object = value
            .as_object()
            .ok_or_else(|| schema_error("top-level value must be a JSON object"))?;

        let keys: KeysRecord = record(object, "keys")?;
        let k = keys.k.to_u64("keys.k")?;
        let n = keys.n.as_ref().map(|n| n.to_u64("keys.n")).transpose()?;
        tracing::debug!(k, ?n, "read document keys");
        if n.is_some_and(|n| n < k) {
            tracing::warn!(k, ?n, "keys.n is smaller than keys.k");
        }

        let capacity = usize::try_from(k).unwrap_or(usize::MAX).min(object.len());
        let mut roots = Vec::with_capacity(capacity);
        for index in 1..=k {
            let key = index.to_string();
            let entry: EntryRecord = record(object, &key)?;
            let base_field = format!("{key}.base");
            let base = entry.base.to_u64(&base_field)?;
            let base = u32::try_from(base).map_err(|err| {
                schema_error(format!("`{base_field}` is too large: {base}")).with_source(err)
            })?;
            roots.push(RootSpec {
                index,
                base,
                value: entry.value,
            });
        }

        Ok(Self { k, n, roots })
    }
}

fn record<T: DeserializeOwned>(object: &Map<String, Value>, key: &str) -> Result<T, Error> {
    let raw = object
        .get(key)
        .ok_or_else(|| schema_error(format!("missing `{key}` entry")))?;
    if !raw.is_object() {
        return Err(schema_error(format!("`{key}` must be a JSON object")));
    }
    T::deserialize(raw)
        .map_err(|err| schema_error(format!("`{key}` has an invalid shape: {err}")).with_source(err))
}

fn schema_error(message: impl Into<String>) -> Error {
    Error::new(ErrorKind::Schema)
        .with_message(message)
        .with_hint("Expected {\"keys\":{\"k\":<int>},\"1\":{\"base\":\"<int>\",\"value\":\"<digits>\"},...}.")
}

#[cfg(test)]
mod tests {
    use super::{RootDocument, RootSpec};
    use crate::core::error::ErrorKind;
    use serde_json::json;

    #[test]
    fn reads_first_k_entries_and_ignores_the_rest() {
        let value = json!({
            "keys": {"n": 4, "k": 2},
            "1": {"base": "10", "value": "4"},
            "2": {"base": 16, "value": "ff"},
            "3": {"base": "2", "value": "111"},
            "extra": true
        });
        let doc = RootDocument::from_value(&value).expect("document");
        assert_eq!(doc.k, 2);
        assert_eq!(doc.n, Some(4));
        assert_eq!(
            doc.roots,
            vec![
                RootSpec {
                    index: 1,
                    base: 10,
                    value: "4".to_string()
                },
                RootSpec {
                    index: 2,
                    base: 16,
                    value: "ff".to_string()
                },
            ]
        );
    }

    #[test]
    fn string_fields_are_base_ten_after_trim() {
        let value = json!({
            "keys": {"k": " 1 "},
            "1": {"base": " 036", "value": "z"}
        });
        let doc = RootDocument::from_value(&value).expect("document");
        assert_eq!(doc.k, 1);
        assert_eq!(doc.n, None);
        assert_eq!(doc.roots[0].base, 36);
    }

    #[test]
    fn zero_roots_is_an_empty_document() {
        let doc = RootDocument::from_value(&json!({"keys": {"k": 0}})).expect("document");
        assert!(doc.roots.is_empty());
    }

    #[test]
    fn missing_entry_names_the_key() {
        let value = json!({
            "keys": {"k": 3},
            "1": {"base": "10", "value": "4"},
            "2": {"base": "10", "value": "7"}
        });
        let err = RootDocument::from_value(&value).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Schema);
        assert!(err.message().unwrap().contains("`3`"));
    }

    #[test]
    fn ill_typed_fields_are_schema_errors() {
        let cases = [
            json!([1, 2]),
            json!({"1": {"base": "10", "value": "4"}}),
            json!({"keys": {"k": -1}}),
            json!({"keys": {"k": "two"}}),
            json!({"keys": {"k": 1}, "1": {"base": "ten", "value": "4"}}),
            json!({"keys": {"k": 1}, "1": {"base": "10", "value": 4}}),
            json!({"keys": {"k": 1}, "1": "4"}),
            json!({"keys": {"k": 1}, "1": {"base": 99999999999u64, "value": "4"}}),
        ];
        for case in cases {
            let err = RootDocument::from_value(&case).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Schema, "{case}");
            assert!(err.hint().is_some());
        }
    }

    #[test]
    fn malformed_text_is_a_parse_error_with_category_hint() {
        let err = RootDocument::parse(r#"{"keys": {"k": 1},"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
        let hint = err.hint().expect("hint");
        assert!(hint.contains("parse category: eof"), "{hint}");
        assert!(hint.contains("context: input document"));
    }
}
