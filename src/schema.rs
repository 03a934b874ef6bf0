//! The shape of a schema document.
//!
//! Each definition is split by destructuring into its reserved fields and the pass-through options forwarded to the engine.
use argschema_engine::Value as EngineValue;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::SchemaShapeError;

const ROOT: &str = "<root>";

/// The top level of a schema document.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct SchemaDocument {
    #[serde(default)]
    pub(crate) parser: Map<String, Value>,
    #[serde(default)]
    pub(crate) arguments: Map<String, Value>,
    #[serde(default)]
    pub(crate) groups: Map<String, Value>,
}

impl SchemaDocument {
    pub(crate) fn from_value(value: Value) -> Result<Self, SchemaShapeError> {
        decode_mapping(ROOT, value)
    }
}

/// An argument: the engine options, plus the framework's `aliases`.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ArgumentDefinition {
    #[serde(default)]
    pub(crate) aliases: Vec<String>,
    #[serde(flatten)]
    pub(crate) options: Map<String, Value>,
}

impl ArgumentDefinition {
    pub(crate) fn from_value(path: &str, value: Value) -> Result<Self, SchemaShapeError> {
        decode_mapping(path, value)
    }
}

/// A group: its members and kind, plus the group construction options.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct GroupDefinition {
    #[serde(default)]
    pub(crate) arguments: Map<String, Value>,
    #[serde(default)]
    pub(crate) mutually_exclusive: bool,
    #[serde(flatten)]
    pub(crate) options: Map<String, Value>,
}

impl GroupDefinition {
    pub(crate) fn from_value(path: &str, value: Value) -> Result<Self, SchemaShapeError> {
        decode_mapping(path, value)
    }
}

// Definitions are mappings; the derived deserializers would also take a sequence.
fn decode_mapping<T: DeserializeOwned>(path: &str, value: Value) -> Result<T, SchemaShapeError> {
    if !value.is_object() {
        return Err(SchemaShapeError::new(path, "expected a mapping"));
    }

    serde_json::from_value(value).map_err(|e| SchemaShapeError::new(path, e.to_string()))
}

pub(crate) fn expect_string(value: Value) -> Result<String, String> {
    match value {
        Value::String(text) => Ok(text),
        other => Err(format!("expected a string, got {other}")),
    }
}

pub(crate) fn expect_bool(value: Value) -> Result<bool, String> {
    match value {
        Value::Bool(flag) => Ok(flag),
        other => Err(format!("expected a boolean, got {other}")),
    }
}

/// Convert a document value into a parser value (for `default`, `const`, `choices`, etc).
pub(crate) fn to_engine_value(value: Value) -> Result<EngineValue, String> {
    match value {
        Value::Null => Ok(EngineValue::None),
        Value::Bool(flag) => Ok(EngineValue::Bool(flag)),
        Value::Number(number) => match (number.as_i64(), number.as_f64()) {
            (Some(integer), _) => Ok(EngineValue::Int(integer)),
            (None, Some(float)) => Ok(EngineValue::Float(float)),
            (None, None) => Err(format!("unsupported number {number}")),
        },
        Value::String(text) => Ok(EngineValue::Str(text)),
        Value::Array(items) => items
            .into_iter()
            .map(to_engine_value)
            .collect::<Result<Vec<EngineValue>, String>>()
            .map(EngineValue::List),
        Value::Object(_) => Err("mappings are not supported as values".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn document_empty() {
        let document = SchemaDocument::from_value(json!({})).unwrap();
        assert!(document.parser.is_empty());
        assert!(document.arguments.is_empty());
        assert!(document.groups.is_empty());
    }

    #[rstest]
    #[case(json!({"parsers": {}}))]
    #[case(json!({"arguments": []}))]
    #[case(json!({"groups": "none"}))]
    #[case(json!("arguments"))]
    #[case(json!([1, 2]))]
    fn document_invalid(#[case] value: Value) {
        let error = SchemaDocument::from_value(value).unwrap_err();
        assert_eq!(error.path, "<root>");
    }

    #[rstest]
    #[case(json!([]))]
    #[case(json!([{}, {}, {}]))]
    #[case(json!([{"prog": "x"}, {"--a": {"action": "store_true"}}]))]
    #[case(json!(null))]
    fn document_not_mapping(#[case] value: Value) {
        let error = SchemaDocument::from_value(value).unwrap_err();
        assert_eq!(
            error,
            SchemaShapeError::new("<root>", "expected a mapping")
        );
    }

    #[rstest]
    #[case(json!([]))]
    #[case(json!([["-v"]]))]
    #[case(json!(true))]
    fn definitions_not_mapping(#[case] value: Value) {
        let error = ArgumentDefinition::from_value("arguments.--x", value.clone()).unwrap_err();
        assert_eq!(
            error,
            SchemaShapeError::new("arguments.--x", "expected a mapping")
        );

        let error = GroupDefinition::from_value("groups.g", value).unwrap_err();
        assert_eq!(error, SchemaShapeError::new("groups.g", "expected a mapping"));
    }

    #[test]
    fn argument_split() {
        let definition = ArgumentDefinition::from_value(
            "arguments.--verbose",
            json!({"aliases": ["-v"], "action": "count", "help": "Louder."}),
        )
        .unwrap();
        assert_eq!(definition.aliases, vec!["-v".to_string()]);
        assert_eq!(
            definition.options.keys().collect::<Vec<&String>>(),
            vec!["action", "help"]
        );
    }

    #[rstest]
    #[case(json!({"aliases": "-v"}))]
    #[case(json!({"aliases": [1]}))]
    #[case(json!(null))]
    #[case(json!("store_true"))]
    fn argument_invalid(#[case] value: Value) {
        let error = ArgumentDefinition::from_value("arguments.--verbose", value).unwrap_err();
        assert_eq!(error.path, "arguments.--verbose");
    }

    #[test]
    fn group_split() {
        let definition = GroupDefinition::from_value(
            "groups.mode",
            json!({
                "mutually_exclusive": true,
                "required": true,
                "arguments": {"--fast": {}, "--slow": {}},
            }),
        )
        .unwrap();
        assert!(definition.mutually_exclusive);
        assert_eq!(
            definition.arguments.keys().collect::<Vec<&String>>(),
            vec!["--fast", "--slow"]
        );
        assert_eq!(definition.options.get("required"), Some(&json!(true)));
        assert!(!definition.options.contains_key("arguments"));
    }

    #[test]
    fn group_defaults() {
        let definition = GroupDefinition::from_value("groups.g", json!({})).unwrap();
        assert!(!definition.mutually_exclusive);
        assert!(definition.arguments.is_empty());
        assert!(definition.options.is_empty());
    }

    #[rstest]
    #[case(json!(null), Ok(EngineValue::None))]
    #[case(json!(true), Ok(EngineValue::Bool(true)))]
    #[case(json!(-3), Ok(EngineValue::Int(-3)))]
    #[case(json!(1.5), Ok(EngineValue::Float(1.5)))]
    #[case(json!("a"), Ok(EngineValue::from("a")))]
    #[case(json!(["a", 1]), Ok(EngineValue::List(vec![EngineValue::from("a"), EngineValue::Int(1)])))]
    #[case(json!({"a": 1}), Err("mappings are not supported as values".to_string()))]
    fn engine_values(#[case] value: Value, #[case] expected: Result<EngineValue, String>) {
        assert_eq!(to_engine_value(value), expected);
    }

    #[test]
    fn group_invalid() {
        let error =
            GroupDefinition::from_value("groups.g", json!({"mutually_exclusive": "yes"}))
                .unwrap_err();
        assert_eq!(error.path, "groups.g");
    }
}
