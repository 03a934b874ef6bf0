use crate::api::{Argument, ArgumentGroup, Exclusion, Group, Parameter, Section};
use crate::constant::*;
use crate::model::{Action, Value};
use crate::parser::{ConfigError, ConsoleInterface, GeneralParser, Parser, Printer, UserInterface};

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// The argparse style argument parser.
///
/// Configure the parser, register its parameters/groups, and then build it into a [`GeneralParser`].
///
/// ### Example
/// ```
/// # use argschema_engine::*;
/// let mut parser = ArgumentParser::new("program")
///     .description("Sums the items.");
/// parser
///     .add_argument(Parameter::new(["items"]).nargs(Nargs::AtLeastOne).value_type(ValueType::Int))
///     .unwrap();
/// let parser = parser.build_parser().unwrap();
///
/// let namespace = parser.parse_tokens(vec!["1", "2"].as_slice()).unwrap();
/// assert_eq!(
///     namespace.get("items"),
///     Some(&Value::List(vec![Value::Int(1), Value::Int(2)]))
/// );
/// ```
#[derive(Debug)]
pub struct ArgumentParser {
    program: String,
    usage: Option<String>,
    description: Option<String>,
    epilog: Option<String>,
    add_help: bool,
    allow_abbrev: bool,
    exit_on_error: bool,
    argument_default: Option<Value>,
    arguments: Vec<Argument>,
    sections: Vec<Section>,
    exclusions: Vec<Exclusion>,
    help: Option<usize>,
    next_id: usize,
}

impl ArgumentParser {
    /// Create an argument parser for the `program`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            usage: None,
            description: None,
            epilog: None,
            add_help: true,
            allow_abbrev: true,
            exit_on_error: true,
            argument_default: None,
            arguments: Vec::default(),
            sections: Vec::default(),
            exclusions: Vec::default(),
            help: None,
            next_id: 0,
        }
    }

    /// Replace the generated usage line.
    /// The placeholder `%(prog)s` is replaced by the program name.
    pub fn usage(mut self, usage: impl Into<String>) -> Self {
        self.usage.replace(usage.into());
        self
    }

    /// Document the program, displayed after the usage line of the help message.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description.replace(description.into());
        self
    }

    /// Text displayed at the end of the help message.
    pub fn epilog(mut self, epilog: impl Into<String>) -> Self {
        self.epilog.replace(epilog.into());
        self
    }

    /// Whether to add the `-h/--help` option (default `true`).
    pub fn add_help(mut self, add_help: bool) -> Self {
        self.add_help = add_help;

        if !add_help {
            if let Some(id) = self.help.take() {
                self.arguments.retain(|argument| argument.id != id);
            }
        }

        self
    }

    /// Whether long options may be abbreviated to any unique prefix (default `true`).
    pub fn allow_abbrev(mut self, allow_abbrev: bool) -> Self {
        self.allow_abbrev = allow_abbrev;
        self
    }

    /// Whether [`GeneralParser::parse`] exits the process on a parse error (default `true`).
    pub fn exit_on_error(mut self, exit_on_error: bool) -> Self {
        self.exit_on_error = exit_on_error;
        self
    }

    /// The default for every parameter without its own default.
    pub fn argument_default(mut self, argument_default: impl Into<Value>) -> Self {
        self.argument_default.replace(argument_default.into());
        self
    }

    /// The program name.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Add an argument/option to the parser.
    ///
    /// The order of positional arguments corresponds to their positional order during parsing.
    /// Fails when any of its names are already taken, or when its settings are inconsistent.
    pub fn add_argument(&mut self, parameter: Parameter) -> Result<(), ConfigError> {
        self.register(parameter, None, None)
    }

    /// Add a titled group, listed as its own section in the help message.
    pub fn add_argument_group(&mut self, group: Group) -> Result<ArgumentGroup<'_>, ConfigError> {
        let label = group.label();
        let (title, description, required) = group.consume();

        if required.is_some() {
            return Err(ConfigError::InvalidGroup {
                group: label,
                reason: "'required' is only valid for mutually exclusive groups".to_string(),
            });
        }

        self.ensure_help()?;
        self.sections.push(Section {
            title: title.unwrap_or(label),
            description,
        });
        let section = self.sections.len() - 1;

        #[cfg(feature = "tracing_debug")]
        {
            debug!("Added group section {section}.");
        }

        Ok(ArgumentGroup::new(self, Some(section), None))
    }

    /// Add a mutually exclusive group.
    /// When titled, its members are also listed as their own section in the help message.
    pub fn add_mutually_exclusive_group(
        &mut self,
        group: Group,
    ) -> Result<ArgumentGroup<'_>, ConfigError> {
        let label = group.label();
        let (title, description, required) = group.consume();
        self.ensure_help()?;
        let section = match title {
            Some(title) => {
                self.sections.push(Section { title, description });
                Some(self.sections.len() - 1)
            }
            None => {
                if description.is_some() {
                    return Err(ConfigError::InvalidGroup {
                        group: label,
                        reason: "'description' requires a 'title'".to_string(),
                    });
                }

                None
            }
        };
        self.exclusions.push(Exclusion {
            label,
            required: required.unwrap_or(false),
            members: Vec::default(),
        });
        let exclusion = self.exclusions.len() - 1;

        #[cfg(feature = "tracing_debug")]
        {
            debug!("Added mutually exclusive group {exclusion} (section {section:?}).");
        }

        Ok(ArgumentGroup::new(self, section, Some(exclusion)))
    }

    fn ensure_help(&mut self) -> Result<(), ConfigError> {
        if self.add_help && self.help.is_none() {
            let id = self.insert(
                Parameter::new([HELP_SHORT, HELP_NAME])
                    .action(Action::Help)
                    .help(HELP_MESSAGE),
                None,
                None,
            )?;
            self.help.replace(id);
        }

        Ok(())
    }

    pub(crate) fn register(
        &mut self,
        parameter: Parameter,
        section: Option<usize>,
        exclusion: Option<usize>,
    ) -> Result<(), ConfigError> {
        self.ensure_help()?;
        self.insert(parameter, section, exclusion)?;
        Ok(())
    }

    fn insert(
        &mut self,
        parameter: Parameter,
        section: Option<usize>,
        exclusion: Option<usize>,
    ) -> Result<usize, ConfigError> {
        let id = self.next_id;
        let mut argument = parameter.resolve(id)?;

        for name in argument.names() {
            let taken = self
                .arguments
                .iter()
                .any(|existing| existing.names().contains(&name));

            if taken || argument.names().iter().filter(|n| *n == &name).count() > 1 {
                return Err(ConfigError::DuplicateArgument(name));
            }
        }

        if let Some(index) = exclusion {
            let exclusion = &mut self.exclusions[index];

            if argument.is_required() {
                return Err(ConfigError::InvalidGroup {
                    group: exclusion.label.clone(),
                    reason: format!(
                        "mutually exclusive arguments must be optional ({})",
                        argument.name()
                    ),
                });
            }

            exclusion.members.push(id);
        }

        #[cfg(feature = "tracing_debug")]
        {
            debug!(
                "Registered argument {} (id={id}, dest={}, action={}).",
                argument.name(),
                argument.dest,
                argument.action
            );
        }

        argument.section = section;
        self.arguments.push(argument);
        self.next_id += 1;
        Ok(id)
    }

    /// Build the argument parser with a custom [`UserInterface`].
    /// This finalizes the configuration.
    pub fn build_with_interface(
        mut self,
        user_interface: Box<dyn UserInterface>,
    ) -> Result<GeneralParser, ConfigError> {
        self.ensure_help()?;
        let ArgumentParser {
            program,
            usage,
            description,
            epilog,
            allow_abbrev,
            exit_on_error,
            argument_default,
            arguments,
            sections,
            exclusions,
            ..
        } = self;
        let parser = Parser::new(
            arguments.clone(),
            exclusions.clone(),
            argument_default.clone(),
            allow_abbrev,
        )?;
        let printer = Printer::terminal(
            program.clone(),
            usage,
            description,
            epilog,
            arguments,
            argument_default,
            sections,
            exclusions,
        );
        Ok(GeneralParser::new(
            program,
            parser,
            printer,
            exit_on_error,
            user_interface,
        ))
    }

    /// Build the argument parser as a Result.
    /// This finalizes the configuration and checks for errors.
    pub fn build_parser(self) -> Result<GeneralParser, ConfigError> {
        self.build_with_interface(Box::<ConsoleInterface>::default())
    }

    /// Build the argument parser.
    /// This finalizes the configuration and checks for errors.
    /// If an error is encountered, exits with error code `1` (via [`std::process::exit`]).
    pub fn build(self) -> GeneralParser {
        match self.build_parser() {
            Ok(gp) => gp,
            Err(e) => {
                eprintln!("{e}");
                std::process::exit(1);
            }
        }
    }
}
