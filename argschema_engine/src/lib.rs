//! Engine module for `argschema`.
//! See [documentation root](https://docs.rs/argschema/latest/argschema/index.html) for full details.
#![deny(missing_docs)]
mod api;
mod constant;
mod matcher;
mod model;
mod parser;
#[allow(missing_docs)]
pub mod prelude;

pub use api::*;
pub use model::*;
pub use parser::{
    ConfigError, ConsoleInterface, ErrorContext, GeneralParser, ParseError, ParseExit,
    UserInterface,
};

#[cfg(any(test, feature = "unit_test"))]
pub use parser::InMemoryInterface;

#[cfg(test)]
#[macro_use]
extern crate assert_matches;
