use crate::api::{ArgumentParser, Parameter};
use crate::parser::ConfigError;

/// The settings of an argument group.
///
/// A plain group only changes the help message, listing its members under their own titled section.
/// A mutually exclusive group allows at most one of its members on the command line
/// (and exactly one when `required`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Group {
    title: Option<String>,
    description: Option<String>,
    required: Option<bool>,
}

impl Group {
    /// Create an untitled group.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title of the help section.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title.replace(title.into());
        self
    }

    /// Document the group in its help section.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description.replace(description.into());
        self
    }

    /// Require one member of a mutually exclusive group.
    pub fn required(mut self, required: bool) -> Self {
        self.required.replace(required);
        self
    }

    pub(crate) fn label(&self) -> String {
        self.title.clone().unwrap_or_else(|| "group".to_string())
    }

    pub(crate) fn consume(self) -> (Option<String>, Option<String>, Option<bool>) {
        (self.title, self.description, self.required)
    }
}

/// A titled help section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Section {
    pub(crate) title: String,
    pub(crate) description: Option<String>,
}

/// The members of a mutually exclusive group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Exclusion {
    pub(crate) label: String,
    pub(crate) required: bool,
    pub(crate) members: Vec<usize>,
}

/// A handle for registering parameters into a group.
/// Created via [`ArgumentParser::add_argument_group`] or [`ArgumentParser::add_mutually_exclusive_group`].
///
/// ### Example
/// ```
/// # use argschema_engine::*;
/// let mut parser = ArgumentParser::new("program");
/// let mut group = parser
///     .add_mutually_exclusive_group(Group::new().required(true))
///     .unwrap();
/// group
///     .add_argument(Parameter::new(["--fast"]).action(Action::StoreTrue))
///     .unwrap();
/// group
///     .add_argument(Parameter::new(["--slow"]).action(Action::StoreTrue))
///     .unwrap();
/// ```
#[derive(Debug)]
pub struct ArgumentGroup<'p> {
    parser: &'p mut ArgumentParser,
    section: Option<usize>,
    exclusion: Option<usize>,
}

impl<'p> ArgumentGroup<'p> {
    pub(crate) fn new(
        parser: &'p mut ArgumentParser,
        section: Option<usize>,
        exclusion: Option<usize>,
    ) -> Self {
        Self {
            parser,
            section,
            exclusion,
        }
    }

    /// Add an argument/option to the group.
    pub fn add_argument(&mut self, parameter: Parameter) -> Result<(), ConfigError> {
        self.parser
            .register(parameter, self.section, self.exclusion)
    }
}
