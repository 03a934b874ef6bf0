use argschema_engine::{ConsoleInterface, GeneralParser, Namespace, UserInterface, Value};
use serde_json::{Map, Number};

#[cfg(feature = "tracing_debug")]
use tracing::debug;

use crate::builder::build_parser;
use crate::error::{ArgumentParseError, SchemaError};
use crate::registrar::{register_arguments, register_groups};
use crate::schema::SchemaDocument;
use crate::source::{load_as, SchemaFormat, SchemaSource};

/// Build a command line parser from the schema document.
///
/// The `source` may be a decoded [`serde_json::Value`], a path, a reader, or text (see [`SchemaSource`]).
///
/// ### Example
/// ```
/// # use argschema::*;
/// let parser = new_parser(r#"{
///     "parser": {"prog": "summer"},
///     "arguments": {
///         "items": {"nargs": "+", "type": "int", "help": "The items to sum."},
///         "--verbose": {"aliases": ["-v"], "action": "store_true"}
///     }
/// }"#).unwrap();
///
/// let result = parser.parse_tokens(&["-v", "1", "2"]).unwrap();
/// assert_eq!(result.get_bool("verbose"), Some(true));
/// assert_eq!(result.get("items"), Some(&Value::List(vec![Value::Int(1), Value::Int(2)])));
/// ```
pub fn new_parser(source: impl Into<SchemaSource>) -> Result<SchemaParser, SchemaError> {
    SchemaParser::builder(source).build()
}

/// A command line parser configured by a schema document.
pub struct SchemaParser {
    parser: GeneralParser,
}

impl SchemaParser {
    /// Configure the construction beyond the schema document itself.
    pub fn builder(source: impl Into<SchemaSource>) -> SchemaParserBuilder {
        SchemaParserBuilder {
            source: source.into(),
            format: SchemaFormat::default(),
            overrides: Map::default(),
            user_interface: None,
        }
    }

    /// The program name.
    pub fn program(&self) -> &str {
        self.parser.program()
    }

    /// The result of parsing no tokens, without checking for required arguments.
    pub fn defaults(&self) -> ParsedResult {
        ParsedResult::new(self.parser.defaults())
    }

    /// Print the help message.
    pub fn print_help(&self) {
        self.parser.print_help();
    }

    /// Parse the tokens (excluding the program name).
    ///
    /// Errors, as well as help/version requests, are printed before returning the [`ArgumentParseError`].
    pub fn parse_tokens(&self, tokens: &[&str]) -> Result<ParsedResult, ArgumentParseError> {
        Ok(ParsedResult::new(self.parser.parse_tokens(tokens)?))
    }

    /// Parse the tokens, collecting the tokens that match nothing instead of failing on them.
    pub fn parse_known_tokens(
        &self,
        tokens: &[&str],
    ) -> Result<(ParsedResult, Vec<String>), ArgumentParseError> {
        let (namespace, unrecognized) = self.parser.parse_known_tokens(tokens)?;
        Ok((ParsedResult::new(namespace), unrecognized))
    }

    /// Parse the Cli [`std::env::args`].
    ///
    /// Help/version exit the process with code `0`, and failures with code `2`.
    /// With `exit_on_error: false`, failures are returned instead.
    pub fn parse(&self) -> Result<ParsedResult, ArgumentParseError> {
        Ok(ParsedResult::new(self.parser.parse()?))
    }
}

/// Options for constructing a [`SchemaParser`].
///
/// ### Example
/// ```
/// # use argschema::*;
/// let parser = SchemaParser::builder("parser:\n  prog: first\narguments:\n  --x: {}\n")
///     .format(SchemaFormat::Yaml)
///     .parser_option("prog", "second")
///     .build()
///     .unwrap();
/// assert_eq!(parser.program(), "second");
/// ```
pub struct SchemaParserBuilder {
    source: SchemaSource,
    format: SchemaFormat,
    overrides: Map<String, serde_json::Value>,
    user_interface: Option<Box<dyn UserInterface>>,
}

impl SchemaParserBuilder {
    /// Decode the source with this format (default [`SchemaFormat::Json`]).
    pub fn format(mut self, format: SchemaFormat) -> Self {
        self.format = format;
        self
    }

    /// Set a `parser` option, taking precedence over the document's own value.
    pub fn parser_option(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.overrides.insert(key.into(), value.into());
        self
    }

    /// Send the help, version, and error output to this [`UserInterface`] (default [`ConsoleInterface`]).
    pub fn user_interface(mut self, user_interface: Box<dyn UserInterface>) -> Self {
        self.user_interface.replace(user_interface);
        self
    }

    /// Load the schema document, and build the parser from it.
    pub fn build(self) -> Result<SchemaParser, SchemaError> {
        let SchemaParserBuilder {
            source,
            format,
            overrides,
            user_interface,
        } = self;
        let document = load_as(source, format)?;
        let SchemaDocument {
            mut parser,
            arguments,
            groups,
        } = SchemaDocument::from_value(document)?;
        parser.extend(overrides);

        #[cfg(feature = "tracing_debug")]
        {
            debug!(
                "Building from {} parser options, {} arguments, and {} groups.",
                parser.len(),
                arguments.len(),
                groups.len()
            );
        }

        let mut argument_parser = build_parser(parser)?;
        register_arguments(&mut argument_parser, arguments)?;
        register_groups(&mut argument_parser, groups)?;
        let user_interface: Box<dyn UserInterface> = match user_interface {
            Some(user_interface) => user_interface,
            None => Box::<ConsoleInterface>::default(),
        };

        Ok(SchemaParser {
            parser: argument_parser.build_with_interface(user_interface)?,
        })
    }
}

/// The parsed values, by destination.
///
/// Every destination is present (either parsed, or its default), in the order it was registered.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedResult {
    namespace: Namespace,
}

impl ParsedResult {
    fn new(namespace: Namespace) -> Self {
        Self { namespace }
    }

    /// The value of the destination.
    pub fn get(&self, dest: &str) -> Option<&Value> {
        self.namespace.get(dest)
    }

    /// The destination as a flag.
    pub fn get_bool(&self, dest: &str) -> Option<bool> {
        self.get(dest).and_then(Value::as_bool)
    }

    /// The destination as an integer.
    pub fn get_int(&self, dest: &str) -> Option<i64> {
        self.get(dest).and_then(Value::as_int)
    }

    /// The destination as a number (integers included).
    pub fn get_float(&self, dest: &str) -> Option<f64> {
        self.get(dest).and_then(Value::as_float)
    }

    /// The destination as a string.
    pub fn get_str(&self, dest: &str) -> Option<&str> {
        self.get(dest).and_then(Value::as_str)
    }

    /// The destination as a list.
    pub fn get_list(&self, dest: &str) -> Option<&[Value]> {
        self.get(dest).and_then(Value::as_list)
    }

    /// Whether the destination exists.
    pub fn contains(&self, dest: &str) -> bool {
        self.namespace.contains(dest)
    }

    /// Iterate over the destinations and their values.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.namespace.iter()
    }

    /// The number of destinations.
    pub fn len(&self) -> usize {
        self.namespace.len()
    }

    /// Whether there are no destinations.
    pub fn is_empty(&self) -> bool {
        self.namespace.is_empty()
    }

    /// The destinations as a JSON object, in order.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.iter()
                .map(|(dest, value)| (dest.to_string(), json_value(value)))
                .collect(),
        )
    }
}

fn json_value(value: &Value) -> serde_json::Value {
    match value {
        Value::None => serde_json::Value::Null,
        Value::Bool(flag) => serde_json::Value::Bool(*flag),
        Value::Int(integer) => serde_json::Value::from(*integer),
        // NaN and infinities have no JSON form.
        Value::Float(float) => Number::from_f64(*float)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Str(text) => serde_json::Value::String(text.clone()),
        Value::List(items) => serde_json::Value::Array(items.iter().map(json_value).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::assert_contains;
    use argschema_engine::InMemoryInterface;
    use rstest::rstest;
    use serde_json::json;

    fn schema() -> serde_json::Value {
        json!({
            "parser": {"prog": "tool", "exit_on_error": false},
            "arguments": {
                "--count": {"type": "int", "default": 1},
                "--ratio": {"type": "float"},
                "--name": {"aliases": ["-n"]},
                "--flag": {"action": "store_true"},
                "items": {"nargs": "*"},
            },
        })
    }

    fn parser(interface: &InMemoryInterface) -> SchemaParser {
        SchemaParser::builder(schema())
            .user_interface(Box::new(interface.clone()))
            .build()
            .unwrap()
    }

    #[test]
    fn parse_tokens_getters() {
        let interface = InMemoryInterface::default();
        let parser = parser(&interface);

        let result = parser
            .parse_tokens(&["--count", "3", "--ratio", "0.5", "-n", "x", "--flag", "a", "b"])
            .unwrap();
        assert_eq!(result.get_int("count"), Some(3));
        assert_eq!(result.get_float("count"), Some(3.0));
        assert_eq!(result.get_float("ratio"), Some(0.5));
        assert_eq!(result.get_str("name"), Some("x"));
        assert_eq!(result.get_bool("flag"), Some(true));
        assert_eq!(
            result.get_list("items"),
            Some(&[Value::from("a"), Value::from("b")][..])
        );
        assert_eq!(result.get_str("count"), None);
        assert_eq!(result.get("missing"), None);
        assert!(result.contains("items"));
        assert!(!result.contains("missing"));
        assert_eq!(result.len(), 5);
        assert!(!result.is_empty());
        assert_eq!(
            result.iter().map(|(dest, _)| dest).collect::<Vec<&str>>(),
            vec!["count", "ratio", "name", "flag", "items"]
        );
    }

    #[test]
    fn to_json() {
        let interface = InMemoryInterface::default();
        let parser = parser(&interface);

        let result = parser.parse_tokens(&["--ratio", "2.5", "a"]).unwrap();
        assert_eq!(
            result.to_json(),
            json!({"count": 1, "ratio": 2.5, "name": null, "flag": false, "items": ["a"]})
        );
        assert_eq!(
            serde_json::to_string(&result.to_json()).unwrap(),
            r#"{"count":1,"ratio":2.5,"name":null,"flag":false,"items":["a"]}"#
        );
    }

    #[rstest]
    #[case(Value::Float(f64::NAN), json!(null))]
    #[case(Value::List(vec![Value::None, Value::Int(-1)]), json!([null, -1]))]
    fn json_values(#[case] value: Value, #[case] expected: serde_json::Value) {
        assert_eq!(json_value(&value), expected);
    }

    #[test]
    fn defaults() {
        let interface = InMemoryInterface::default();
        let parser = parser(&interface);

        let defaults = parser.defaults();
        assert_eq!(defaults.get_int("count"), Some(1));
        assert_eq!(defaults.get("items"), Some(&Value::None));
        assert_eq!(defaults.get_bool("flag"), Some(false));
    }

    #[test]
    fn parse_tokens_error() {
        let interface = InMemoryInterface::default();
        let parser = parser(&interface);

        let error = parser.parse_tokens(&["--count", "x"]).unwrap_err();
        assert_eq!(error.message(), "argument --count: invalid int value: 'x'");
        assert_eq!(error.exit_code(), 2);
        assert!(!error.is_exit_request());
        assert_eq!(
            interface.error(),
            Some("error: argument --count: invalid int value: 'x'".to_string())
        );
    }

    #[test]
    fn parse_tokens_help() {
        let interface = InMemoryInterface::default();
        let parser = parser(&interface);

        let error = parser.parse_tokens(&["--help"]).unwrap_err();
        assert_eq!(error.exit_code(), 0);
        assert!(error.is_exit_request());
        assert_contains!(
            interface.message().unwrap(),
            "usage: tool [-h] [--count COUNT] [--ratio RATIO] [--name NAME] [--flag]"
        );
    }

    #[test]
    fn parse_known_tokens() {
        let interface = InMemoryInterface::default();
        let parser = parser(&interface);

        let (result, unrecognized) = parser
            .parse_known_tokens(&["--other", "a", "--flag"])
            .unwrap();
        assert_eq!(result.get_bool("flag"), Some(true));
        assert_eq!(unrecognized, vec!["--other".to_string()]);
    }

    #[test]
    fn parser_option_overrides() {
        let parser = SchemaParser::builder(schema())
            .parser_option("prog", "other")
            .parser_option("description", "Overridden.")
            .build()
            .unwrap();
        assert_eq!(parser.program(), "other");

        let error = SchemaParser::builder(schema())
            .parser_option("bogus", true)
            .build()
            .err()
            .unwrap();
        assert_eq!(
            error,
            SchemaError::InvalidOption {
                subject: "parser".to_string(),
                reason: "unsupported option 'bogus'".to_string(),
            }
        );
    }

    #[test]
    fn builder_format() {
        let parser = SchemaParser::builder("arguments:\n  --x:\n    action: store_true\n")
            .format(SchemaFormat::Yaml)
            .build()
            .unwrap();
        let result = parser.parse_tokens(&["--x"]).unwrap();
        assert_eq!(result.get_bool("x"), Some(true));
    }

    #[rstest]
    #[case(json!("text"))]
    #[case(json!([]))]
    #[case(json!({"parser": {}, "extra": {}}))]
    fn new_parser_shape_invalid(#[case] document: serde_json::Value) {
        assert_matches!(new_parser(document).err(), Some(SchemaError::Shape(_)));
    }
}
