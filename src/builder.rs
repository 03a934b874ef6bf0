use argschema_engine::ArgumentParser;
use serde_json::{Map, Value};
use std::env;
use std::path::Path;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

use crate::error::SchemaError;
use crate::schema::{expect_bool, expect_string, to_engine_value};

const PARSER: &str = "parser";
const FALLBACK_PROGRAM: &str = "program";

/// Create the engine parser from the `parser` section of the schema document.
///
/// Every key is forwarded to its namesake construction option, so an unknown key (or a wrongly typed value) fails.
pub(crate) fn build_parser(mut options: Map<String, Value>) -> Result<ArgumentParser, SchemaError> {
    let program = match options.remove("prog") {
        Some(value) => expect_string(value).map_err(|e| invalid("prog", e))?,
        None => default_program(),
    };
    let mut parser = ArgumentParser::new(program);

    for (key, value) in options {
        #[cfg(feature = "tracing_debug")]
        {
            debug!("Forwarding parser option '{key}': {value}.");
        }

        parser = match key.as_str() {
            "usage" => parser.usage(expect_string(value).map_err(|e| invalid(&key, e))?),
            "description" => {
                parser.description(expect_string(value).map_err(|e| invalid(&key, e))?)
            }
            "epilog" => parser.epilog(expect_string(value).map_err(|e| invalid(&key, e))?),
            "add_help" => parser.add_help(expect_bool(value).map_err(|e| invalid(&key, e))?),
            "allow_abbrev" => {
                parser.allow_abbrev(expect_bool(value).map_err(|e| invalid(&key, e))?)
            }
            "exit_on_error" => {
                parser.exit_on_error(expect_bool(value).map_err(|e| invalid(&key, e))?)
            }
            "argument_default" => {
                parser.argument_default(to_engine_value(value).map_err(|e| invalid(&key, e))?)
            }
            _ => {
                return Err(SchemaError::invalid_option(
                    PARSER,
                    format!("unsupported option '{key}'"),
                ));
            }
        };
    }

    Ok(parser)
}

fn invalid(key: &str, reason: String) -> SchemaError {
    SchemaError::invalid_option(PARSER, format!("option '{key}' {reason}"))
}

// The file name of the running executable, as argparse derives `prog` from `sys.argv[0]`.
fn default_program() -> String {
    env::args_os()
        .next()
        .and_then(|argument| {
            Path::new(&argument)
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
        })
        .or_else(|| {
            env::current_exe().ok().and_then(|path| {
                path.file_name()
                    .map(|name| name.to_string_lossy().to_string())
            })
        })
        .unwrap_or_else(|| FALLBACK_PROGRAM.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use argschema_engine::{InMemoryInterface, Value as EngineValue};
    use rstest::rstest;
    use serde_json::json;

    fn options(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn build_parser_empty() {
        let parser = build_parser(Map::default()).unwrap();
        assert!(!parser.program().is_empty());
    }

    #[test]
    fn build_parser_forwards() {
        let parser = build_parser(options(json!({
            "prog": "tool",
            "usage": "%(prog)s [stuff]",
            "description": "Does things.",
            "epilog": "The end.",
            "add_help": false,
            "allow_abbrev": false,
            "exit_on_error": false,
            "argument_default": 7,
        })))
        .unwrap();
        assert_eq!(parser.program(), "tool");

        let interface = InMemoryInterface::default();
        let general_parser = parser
            .build_with_interface(Box::new(interface.clone()))
            .unwrap();
        general_parser.print_help();
        assert_eq!(
            interface.message(),
            Some("usage: tool [stuff]\n\nDoes things.\n\nThe end.".to_string())
        );
        assert_eq!(general_parser.defaults().len(), 0);
        assert!(general_parser.parse_tokens(&["-h"]).is_err());
    }

    #[test]
    fn build_parser_argument_default() {
        let mut parser = build_parser(options(json!({"prog": "tool", "argument_default": 7}))).unwrap();
        parser
            .add_argument(argschema_engine::Parameter::new(["--x"]))
            .unwrap();
        let general_parser = parser.build_parser().unwrap();
        assert_eq!(
            general_parser.defaults().get("x"),
            Some(&EngineValue::Int(7))
        );
    }

    #[rstest]
    #[case(json!({"program": "tool"}), "parser: unsupported option 'program'")]
    #[case(json!({"prog": 1}), "parser: option 'prog' expected a string, got 1")]
    #[case(json!({"add_help": "no"}), "parser: option 'add_help' expected a boolean, got \"no\"")]
    #[case(json!({"argument_default": {}}), "parser: option 'argument_default' mappings are not supported as values")]
    fn build_parser_invalid(#[case] value: Value, #[case] expected: &str) {
        let error = build_parser(options(value)).unwrap_err();
        assert_eq!(error.to_string(), format!("Invalid option error: {expected}."));
    }
}
