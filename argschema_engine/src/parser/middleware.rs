use std::env;
use thiserror::Error;

use crate::constant::PROGRAM_PLACEHOLDER;
use crate::model::Namespace;
use crate::parser::base::*;
use crate::parser::interface::UserInterface;
use crate::parser::printer::Printer;
use crate::parser::ErrorContext;

/// Why parsing stopped short of a namespace.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseExit {
    /// The tokens could not be parsed (already reported to the [`UserInterface`]).
    #[error("{0}")]
    Error(ParseError),

    /// The help message was requested, and printed.
    #[error("help requested")]
    Help,

    /// The version was requested, and printed.
    #[error("{0}")]
    Version(String),
}

impl ParseExit {
    /// The process exit code matching this outcome: `2` for errors, `0` otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            ParseExit::Error(_) => 2,
            ParseExit::Help | ParseExit::Version(_) => 0,
        }
    }
}

/// The configured command line parser.
/// Built via [`ArgumentParser::build`](crate::ArgumentParser::build).
///
/// Parsing is repeatable: each parse starts from the defaults.
pub struct GeneralParser {
    program: String,
    parser: Parser,
    printer: Printer,
    exit_on_error: bool,
    user_interface: Box<dyn UserInterface>,
}

impl GeneralParser {
    pub(crate) fn new(
        program: impl Into<String>,
        parser: Parser,
        printer: Printer,
        exit_on_error: bool,
        user_interface: Box<dyn UserInterface>,
    ) -> Self {
        Self {
            program: program.into(),
            parser,
            printer,
            exit_on_error,
            user_interface,
        }
    }

    /// The program name.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// The namespace produced by parsing no tokens, without checking the required parameters.
    pub fn defaults(&self) -> Namespace {
        self.parser.defaults()
    }

    /// Print the help message to the [`UserInterface`].
    pub fn print_help(&self) {
        self.printer.print_help(&*self.user_interface);
    }

    fn invoke(
        &self,
        tokens: &[&str],
        known_only: bool,
    ) -> Result<(Namespace, Vec<String>), ParseExit> {
        match self.parser.consume(tokens, known_only) {
            Ok(Outcome::Complete {
                namespace,
                unrecognized,
            }) => Ok((namespace, unrecognized)),
            Ok(Outcome::PrintHelp) => {
                self.print_help();
                Err(ParseExit::Help)
            }
            Ok(Outcome::PrintVersion(version)) => {
                let version = version.replace(PROGRAM_PLACEHOLDER, &self.program);
                self.user_interface.print(version.clone());
                Err(ParseExit::Version(version))
            }
            Err((offset, parse_error)) => {
                self.user_interface.print_error(&parse_error);
                self.user_interface
                    .print_error_context(ErrorContext::new(offset, tokens));
                Err(ParseExit::Error(parse_error))
            }
        }
    }

    /// Run the argument parser against the input tokens.
    ///
    /// Parsing happens in two phases:
    /// 1. Token matching aligns the tokens to the options and positional arguments.
    /// 2. Each match is converted and applied to the namespace by its action, in command line order.
    ///
    /// Errors are reported via the [`UserInterface`] before returning [`ParseExit::Error`].
    /// If the help (or version) is requested, it is printed and the parse returns [`ParseExit::Help`] (or [`ParseExit::Version`]),
    /// regardless of any other problems in the tokens.
    pub fn parse_tokens(&self, tokens: &[&str]) -> Result<Namespace, ParseExit> {
        self.invoke(tokens, false).map(|(namespace, _)| namespace)
    }

    /// Run the argument parser against the input tokens, returning the unrecognized tokens instead of failing on them.
    pub fn parse_known_tokens(
        &self,
        tokens: &[&str],
    ) -> Result<(Namespace, Vec<String>), ParseExit> {
        self.invoke(tokens, true)
    }

    /// Run the argument parser against the Cli [`env::args`].
    ///
    /// The help and version exit with code `0` (via [`std::process::exit`]).
    /// An error exits with code `2`, unless `exit_on_error` is disabled, in which case it is returned.
    pub fn parse(&self) -> Result<Namespace, ParseExit> {
        let command_input: Vec<String> = env::args().skip(1).collect();
        let tokens: Vec<&str> = command_input.iter().map(AsRef::as_ref).collect();

        match self.parse_tokens(tokens.as_slice()) {
            Ok(namespace) => Ok(namespace),
            Err(ParseExit::Error(error)) if !self.exit_on_error => Err(ParseExit::Error(error)),
            Err(exit) => std::process::exit(exit.exit_code()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Parameter;
    use crate::model::{Action, Nargs, Value, ValueType};
    use crate::parser::InMemoryInterface;
    use crate::test::assert_contains;
    use crate::ArgumentParser;
    use rstest::rstest;

    fn general_parser(interface: &InMemoryInterface) -> GeneralParser {
        let mut parser = ArgumentParser::new("tool");
        parser
            .add_argument(
                Parameter::new(["-V", "--version"])
                    .action(Action::Version)
                    .version("%(prog)s 2.1"),
            )
            .unwrap();
        parser
            .add_argument(Parameter::new(["--count"]).value_type(ValueType::Int))
            .unwrap();
        parser
            .add_argument(Parameter::new(["items"]).nargs(Nargs::Any))
            .unwrap();
        parser
            .build_with_interface(Box::new(interface.clone()))
            .unwrap()
    }

    #[test]
    fn parse_tokens_empty() {
        let interface = InMemoryInterface::default();
        let general_parser = general_parser(&interface);

        let namespace = general_parser.parse_tokens(&[]).unwrap();
        assert_eq!(general_parser.defaults().get("items"), Some(&Value::None));
        assert_eq!(namespace.get("count"), Some(&Value::None));
        assert_eq!(namespace.get("items"), Some(&Value::List(vec![])));
        assert_eq!(interface.message(), None);
        assert_eq!(interface.error(), None);
    }

    #[test]
    fn parse_tokens_repeatable() {
        let interface = InMemoryInterface::default();
        let general_parser = general_parser(&interface);

        let first = general_parser.parse_tokens(&["--count", "1", "a"]).unwrap();
        let second = general_parser.parse_tokens(&["b"]).unwrap();
        assert_eq!(first.get("count"), Some(&Value::Int(1)));
        assert_eq!(second.get("count"), Some(&Value::None));
        assert_eq!(second.get("items"), Some(&Value::from(vec!["b"])));
    }

    #[rstest]
    #[case(vec!["-h"])]
    #[case(vec!["--count", "x", "--help"])]
    fn parse_tokens_help(#[case] tokens: Vec<&str>) {
        let interface = InMemoryInterface::default();
        let general_parser = general_parser(&interface);

        let exit = general_parser.parse_tokens(&tokens).unwrap_err();
        assert_eq!(exit, ParseExit::Help);
        assert_eq!(exit.exit_code(), 0);
        let message = interface.message().unwrap();
        assert_contains!(message, "usage: tool [-h] [-V] [--count COUNT] [items ...]");
        assert_eq!(interface.error(), None);
    }

    #[test]
    fn parse_tokens_version() {
        let interface = InMemoryInterface::default();
        let general_parser = general_parser(&interface);

        let exit = general_parser.parse_tokens(&["--version"]).unwrap_err();
        assert_eq!(exit, ParseExit::Version("tool 2.1".to_string()));
        assert_eq!(exit.exit_code(), 0);
        assert_eq!(interface.message(), Some("tool 2.1".to_string()));
    }

    #[test]
    fn parse_tokens_error() {
        let interface = InMemoryInterface::default();
        let general_parser = general_parser(&interface);

        let exit = general_parser.parse_tokens(&["a", "--count", "x"]).unwrap_err();
        assert_matches!(exit, ParseExit::Error(ref error) => {
            assert_eq!(error.message(), "argument --count: invalid int value: 'x'");
        });
        assert_eq!(exit.exit_code(), 2);
        assert_eq!(interface.message(), None);
        assert_eq!(
            interface.error(),
            Some("error: argument --count: invalid int value: 'x'".to_string())
        );
        assert_eq!(
            interface.error_context().unwrap().to_string(),
            "a --count x\n          ^"
        );
    }

    #[test]
    fn parse_known_tokens() {
        let interface = InMemoryInterface::default();
        let general_parser = general_parser(&interface);

        let (namespace, unrecognized) = general_parser
            .parse_known_tokens(&["a", "--other", "--count", "2"])
            .unwrap();
        assert_eq!(namespace.get("count"), Some(&Value::Int(2)));
        assert_eq!(namespace.get("items"), Some(&Value::from(vec!["a"])));
        assert_eq!(unrecognized, vec!["--other".to_string()]);

        let exit = general_parser
            .parse_tokens(&["a", "--other", "--count", "2"])
            .unwrap_err();
        assert_matches!(exit, ParseExit::Error(ref error) => {
            assert_eq!(error.message(), "unrecognized arguments: --other");
        });
    }
}
