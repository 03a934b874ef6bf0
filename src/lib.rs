//! `argschema` builds argparse style command line parsers from a declarative schema document.
//!
//! Rather than registering each argument with imperative calls, the whole Cli is described by a nested mapping.
//! We built `argschema` so that a program's command line can live next to (or inside) its other configuration files, and be reviewed as data.
//! Specifically, `argschema` attempts to prioritize the following design concerns:
//! * *Familiar semantics*:
//! The schema options mirror their namesakes in Python's argparse, and parsing follows argparse's rules.
//! Anyone who knows `add_argument` can read a schema document.
//! * *Fail at construction*:
//! Every problem in the schema (unknown options, name collisions, invalid groups) is reported when the parser is built, never during parsing.
//! * *Detailed yet basic UX*:
//! The help and error output is argparse-like, without colour or shell completions.
//!
//! # Usage
//! ```
//! # use argschema::*;
//! let parser = new_parser(r#"{
//!     "parser": {"prog": "summer", "description": "Sums the items."},
//!     "arguments": {
//!         "items": {"nargs": "+", "type": "int", "metavar": "ITEM", "help": "The items to sum."},
//!         "--verbose": {"aliases": ["-v"], "action": "count", "default": 0}
//!     },
//!     "groups": {
//!         "output": {
//!             "mutually_exclusive": true,
//!             "arguments": {
//!                 "--json": {"action": "store_true"},
//!                 "--plain": {"action": "store_true"}
//!             }
//!         }
//!     }
//! }"#).unwrap();
//!
//! let result = parser.parse_tokens(&["-vv", "1", "2", "3", "--json"]).unwrap();
//! assert_eq!(result.get_int("verbose"), Some(2));
//! assert_eq!(result.get_bool("json"), Some(true));
//! let total: i64 = result
//!     .get_list("items")
//!     .unwrap()
//!     .iter()
//!     .filter_map(Value::as_int)
//!     .sum();
//! assert_eq!(total, 6);
//! ```
//!
//! This generates the following Cli program:
//! ```console
//! $ summer -h
//! usage: summer [-h] [--verbose] [--json | --plain] ITEM [ITEM ...]
//!
//! Sums the items.
//!
//! positional arguments:
//!   ITEM           The items to sum.
//!
//! options:
//!   -h, --help     show this help message and exit
//!   --verbose, -v
//!   --json
//!   --plain
//!
//! $ summer 1 blah
//! error: argument items: invalid int value: 'blah'
//! 1 blah
//!   ^
//!
//! $ summer 1 --json --plain
//! error: argument --plain: not allowed with argument --json
//! 1 --json --plain
//!          ^
//! ```
//!
//! # Schema Document
//! The document is a mapping with (up to) three sections, all of which are optional.
//!
//! **`parser`**</br>
//! The construction options of the parser: `prog`, `usage`, `description`, `epilog`, `add_help`, `allow_abbrev`, `exit_on_error`, and `argument_default`.
//! When `prog` is absent, the file name of the running executable is used.
//! Options may also be layered over the document via [`SchemaParserBuilder::parser_option`].
//!
//! **`arguments`**</br>
//! A mapping from the primary name of each argument to its options.
//! Names starting with `-` are options, anything else is a positional argument (matched in document order).
//! The options are `action`, `nargs`, `const`, `default`, `type`, `choices`, `required`, `help`, `metavar`, `dest`, and `version`.
//! Additionally, `aliases` lists the other names of an option (ex: `["-v"]` for `--verbose`).
//!
//! The `nargs` may be an integer, `?`, `*`, `+`, or the remainder token `argparse.REMAINDER` (alternatively `...`).
//! The `type` may be `str`, `int`, or `float`.
//! For boolean flags, use the `store_true`/`store_false` actions instead.
//!
//! **`groups`**</br>
//! A mapping from group names to groups.
//! Each group holds its own `arguments` mapping (with the same shape as above), and is mutually exclusive when `mutually_exclusive: true`.
//! A plain group is listed as its own section in the help message, titled by `title` (defaulting to the group name) and described by `description`.
//! A mutually exclusive group additionally accepts `required`, in which case exactly one of its members must be present.
//!
//! Names and aliases must be unique across the whole document, including between `arguments` and `groups`.
//!
//! ### Sources
//! The document may come from any [`SchemaSource`]: an already decoded [`serde_json::Value`], a path, a reader, or text.
//! A `&str`/`String` is first tried as a path, and then as the text of the document.
//! Documents are JSON by default; YAML is selected via [`SchemaParserBuilder::format`], or by a `.yaml`/`.yml` path.
//!
//! # Cli Semantics
//! Tokens are parsed according to argparse's rules.
//! * Options are matched by name, or by any unique prefix of a long name (unless `allow_abbrev: false`).
//! * The value of an option may be attached with `=` (ex: `--key=123`), or directly to a short name (ex: `-k123`).
//! * Multiple short flags may be combined into a single token (ex: `-abc`).
//! * Positional arguments take the tokens that aren't claimed by any option, in order.
//! * A token that looks like a negative number is a value, unless the parser has options that look like negative numbers.
//! * A token of `--` ends option matching: every subsequent token is positional.
//!
//! Help (`-h/--help`) and version requests take precedence over any problem in the tokens.
//!
//! # Features
//! * `unit_test`: Exposes [`InMemoryInterface`] for capturing the parser output in tests.
//! Downstream test suites may instead depend on `argschema_engine` with its own `unit_test` feature, as this crate's integration tests do.
//! * `tracing_debug`: Emits `tracing` debug events during construction and parsing.
mod builder;
mod error;
mod parser;
mod registrar;
mod schema;
mod source;

pub use error::*;
pub use parser::*;
pub use source::{load, load_as, SchemaFormat, SchemaSource};

pub use argschema_engine::{
    Action, ConsoleInterface, ErrorContext, Nargs, ParseError, UserInterface, Value, ValueType,
};

#[cfg(any(test, feature = "unit_test"))]
pub use argschema_engine::InMemoryInterface;

#[cfg(test)]
#[macro_use]
extern crate assert_matches;
