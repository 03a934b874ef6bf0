use serde_json::Value;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

#[cfg(feature = "tracing_debug")]
use tracing::debug;

use crate::error::{LoadAttempt, SchemaLoadError};

/// The encoding of a schema document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchemaFormat {
    /// JSON, via `serde_json`.
    #[default]
    Json,
    /// YAML, via `serde_yaml`.
    Yaml,
}

impl SchemaFormat {
    // Paths ending in `.yaml`/`.yml` are always YAML.
    fn for_path(path: &Path, fallback: SchemaFormat) -> SchemaFormat {
        match path.extension().and_then(|extension| extension.to_str()) {
            Some("yaml") | Some("yml") => SchemaFormat::Yaml,
            _ => fallback,
        }
    }

    fn decode_reader(&self, reader: impl Read) -> Result<Value, String> {
        let decoded = match self {
            SchemaFormat::Json => serde_json::from_reader(reader).map_err(|e| e.to_string()),
            SchemaFormat::Yaml => serde_yaml::from_reader(reader).map_err(|e| e.to_string()),
        };
        decoded.and_then(non_empty)
    }

    fn decode_text(&self, text: &str) -> Result<Value, String> {
        let decoded = match self {
            SchemaFormat::Json => serde_json::from_str(text).map_err(|e| e.to_string()),
            SchemaFormat::Yaml => serde_yaml::from_str(text).map_err(|e| e.to_string()),
        };
        decoded.and_then(non_empty)
    }
}

fn non_empty(value: Value) -> Result<Value, String> {
    if value.is_null() {
        Err("the document is empty".to_string())
    } else {
        Ok(value)
    }
}

/// Where the schema document comes from.
///
/// `&str`/`String` convert into [`SchemaSource::Unresolved`], which is first tried as a path and then as literal text.
pub enum SchemaSource {
    /// An already decoded document.
    Document(Value),
    /// A stream holding the encoded document (ex: an open file, or a `std::io::Cursor` over bytes).
    Reader(Box<dyn Read>),
    /// A file holding the encoded document.
    Path(PathBuf),
    /// The encoded document itself.
    Text(String),
    /// Either a path or the encoded document.
    Unresolved(String),
}

impl std::fmt::Debug for SchemaSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaSource::Document(value) => f.debug_tuple("Document").field(value).finish(),
            SchemaSource::Reader(_) => f.debug_tuple("Reader").finish(),
            SchemaSource::Path(path) => f.debug_tuple("Path").field(path).finish(),
            SchemaSource::Text(text) => f.debug_tuple("Text").field(text).finish(),
            SchemaSource::Unresolved(text) => f.debug_tuple("Unresolved").field(text).finish(),
        }
    }
}

impl From<Value> for SchemaSource {
    fn from(value: Value) -> Self {
        SchemaSource::Document(value)
    }
}

impl From<&str> for SchemaSource {
    fn from(value: &str) -> Self {
        SchemaSource::Unresolved(value.to_string())
    }
}

impl From<String> for SchemaSource {
    fn from(value: String) -> Self {
        SchemaSource::Unresolved(value)
    }
}

impl From<PathBuf> for SchemaSource {
    fn from(value: PathBuf) -> Self {
        SchemaSource::Path(value)
    }
}

impl From<&Path> for SchemaSource {
    fn from(value: &Path) -> Self {
        SchemaSource::Path(value.to_path_buf())
    }
}

impl From<Box<dyn Read>> for SchemaSource {
    fn from(value: Box<dyn Read>) -> Self {
        SchemaSource::Reader(value)
    }
}

/// Load the schema document, decoding with [`SchemaFormat::Json`].
pub fn load(source: impl Into<SchemaSource>) -> Result<Value, SchemaLoadError> {
    load_as(source, SchemaFormat::default())
}

/// Load the schema document, decoding with `format` (except for `.yaml`/`.yml` paths, which are always YAML).
pub fn load_as(
    source: impl Into<SchemaSource>,
    format: SchemaFormat,
) -> Result<Value, SchemaLoadError> {
    let attempt = |interpretation, reason| {
        SchemaLoadError::new(vec![LoadAttempt {
            interpretation,
            reason,
        }])
    };

    match source.into() {
        SchemaSource::Document(value) => non_empty(value).map_err(|e| attempt("document", e)),
        SchemaSource::Reader(reader) => format
            .decode_reader(reader)
            .map_err(|e| attempt("reader", e)),
        SchemaSource::Path(path) => load_path(&path, format).map_err(|e| attempt("path", e)),
        SchemaSource::Text(text) => format.decode_text(&text).map_err(|e| attempt("text", e)),
        SchemaSource::Unresolved(value) => {
            let path = Path::new(&value);

            if path.is_file() {
                #[cfg(feature = "tracing_debug")]
                {
                    debug!("Resolved the schema source as the path {path:?}.");
                }

                return load_path(path, format).map_err(|e| attempt("path", e));
            }

            #[cfg(feature = "tracing_debug")]
            {
                debug!("The schema source is not a file, falling back to text.");
            }

            format.decode_text(&value).map_err(|e| {
                SchemaLoadError::new(vec![
                    LoadAttempt {
                        interpretation: "path",
                        reason: "no such file".to_string(),
                    },
                    LoadAttempt {
                        interpretation: "text",
                        reason: e,
                    },
                ])
            })
        }
    }
}

// The file is closed when `reader` drops, on every return.
fn load_path(path: &Path, format: SchemaFormat) -> Result<Value, String> {
    let file = File::open(path).map_err(|e| format!("{}: {e}", path.display()))?;
    let reader = BufReader::new(file);
    SchemaFormat::for_path(path, format).decode_reader(reader)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;
    use std::io::{Cursor, Write};
    use tempfile::NamedTempFile;

    const JSON: &str = r#"{"arguments": {"--x": {"action": "store_true"}}}"#;
    const YAML: &str = "arguments:\n  --x:\n    action: store_true\n";

    fn expected() -> Value {
        json!({"arguments": {"--x": {"action": "store_true"}}})
    }

    fn temp_file(suffix: &str, content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn load_document() {
        assert_eq!(load(expected()).unwrap(), expected());
    }

    #[rstest]
    #[case(SchemaFormat::Json, JSON)]
    #[case(SchemaFormat::Yaml, YAML)]
    fn load_text(#[case] format: SchemaFormat, #[case] text: &str) {
        assert_eq!(
            load_as(SchemaSource::Text(text.to_string()), format).unwrap(),
            expected()
        );
        assert_eq!(load_as(text, format).unwrap(), expected());
    }

    #[rstest]
    #[case(SchemaFormat::Json, JSON)]
    #[case(SchemaFormat::Yaml, YAML)]
    fn load_reader(#[case] format: SchemaFormat, #[case] text: &str) {
        let reader: Box<dyn Read> = Box::new(Cursor::new(text.as_bytes().to_vec()));
        assert_eq!(load_as(reader, format).unwrap(), expected());
    }

    #[rstest]
    #[case(".json", JSON)]
    #[case(".yaml", YAML)]
    #[case(".yml", YAML)]
    fn load_file(#[case] suffix: &str, #[case] content: &str) {
        let file = temp_file(suffix, content);

        assert_eq!(load(file.path()).unwrap(), expected());
        assert_eq!(
            load(file.path().to_string_lossy().to_string()).unwrap(),
            expected()
        );
    }

    #[test]
    fn load_path_invalid() {
        let file = temp_file(".json", "{ not json");
        let error = load(file.path().to_string_lossy().to_string()).unwrap_err();

        // An existing file doesn't fall back to text.
        assert_eq!(error.attempts.len(), 1);
        assert_eq!(error.attempts[0].interpretation, "path");
    }

    #[test]
    fn load_missing_path_invalid_text() {
        let error = load("/no/such/schema.json").unwrap_err();
        let interpretations: Vec<&str> = error.attempts.iter().map(|a| a.interpretation).collect();
        assert_eq!(interpretations, vec!["path", "text"]);
        assert_eq!(error.attempts[0].reason, "no such file");
    }

    #[rstest]
    #[case(SchemaSource::Text("".to_string()))]
    #[case(SchemaSource::Text("null".to_string()))]
    #[case(SchemaSource::Document(Value::Null))]
    #[case(SchemaSource::Path(PathBuf::from("/no/such/schema.json")))]
    fn load_fails(#[case] source: SchemaSource) {
        assert!(load(source).is_err());
    }

    #[test]
    fn load_preserves_order() {
        let value = load(r#"{"arguments": {"b": {}, "a": {}, "c": {}}}"#).unwrap();
        let keys: Vec<&String> = value["arguments"].as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }
}
