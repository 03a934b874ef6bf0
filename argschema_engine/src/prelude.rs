//! Traits which, typically, may be imported without concern: `use argschema_engine::prelude::*`.
use crate::api::{ArgumentGroup, ArgumentParser, Parameter};
use crate::parser::ConfigError;

/// Behaviour for anything that arguments can be registered against.
// Needs to be imported in order to register generically against parsers and groups.
pub trait ArgumentContainer {
    /// Register a parameter against this container.
    fn add_argument(&mut self, parameter: Parameter) -> Result<(), ConfigError>;
}

impl ArgumentContainer for ArgumentParser {
    fn add_argument(&mut self, parameter: Parameter) -> Result<(), ConfigError> {
        ArgumentParser::add_argument(self, parameter)
    }
}

impl<'p> ArgumentContainer for ArgumentGroup<'p> {
    fn add_argument(&mut self, parameter: Parameter) -> Result<(), ConfigError> {
        ArgumentGroup::add_argument(self, parameter)
    }
}
