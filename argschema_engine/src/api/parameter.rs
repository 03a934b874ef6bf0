use crate::matcher::Bound;
use crate::model::{Action, Nargs, Value, ValueType};
use crate::parser::ConfigError;

/// An argument/option definition for the [`ArgumentParser`](crate::ArgumentParser).
///
/// The first name decides the kind of parameter:
/// names starting with `-` make an *option*, anything else makes a positional *argument*.
/// Every setting mirrors its namesake in argparse: <https://docs.python.org/3/library/argparse.html#the-add-argument-method>
///
/// ### Example
/// ```
/// # use argschema_engine::*;
/// let verbose = Parameter::new(["-v", "--verbose"])
///     .action(Action::Count)
///     .help("Increase the verbosity.");
/// let items = Parameter::new(["items"])
///     .nargs(Nargs::AtLeastOne)
///     .value_type(ValueType::Int);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameter {
    names: Vec<String>,
    action: Option<Action>,
    nargs: Option<Nargs>,
    constant: Option<Value>,
    default: Option<Value>,
    value_type: Option<ValueType>,
    choices: Option<Vec<Value>>,
    required: Option<bool>,
    help: Option<String>,
    metavar: Option<String>,
    dest: Option<String>,
    version: Option<String>,
}

impl Parameter {
    /// Create a parameter from its names (ex: `["-f", "--flag"]` or `["item"]`).
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            ..<Self as Default>::default()
        }
    }

    /// The names of this parameter.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Set the action taken when matched.
    /// Defaults to [`Action::Store`].
    pub fn action(mut self, action: Action) -> Self {
        self.action.replace(action);
        self
    }

    /// Set the number of values to match.
    pub fn nargs(mut self, nargs: Nargs) -> Self {
        self.nargs.replace(nargs);
        self
    }

    /// Set the constant used by `store_const`, `append_const`, and `?` options.
    pub fn constant(mut self, constant: impl Into<Value>) -> Self {
        self.constant.replace(constant.into());
        self
    }

    /// Set the value used when the parameter is absent.
    pub fn default(mut self, default: impl Into<Value>) -> Self {
        self.default.replace(default.into());
        self
    }

    /// Set the conversion applied to each value.
    pub fn value_type(mut self, value_type: ValueType) -> Self {
        self.value_type.replace(value_type);
        self
    }

    /// Restrict the (converted) values to these choices.
    pub fn choices<I, V>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.choices
            .replace(choices.into_iter().map(Into::into).collect());
        self
    }

    /// Require an option to be present.
    pub fn required(mut self, required: bool) -> Self {
        self.required.replace(required);
        self
    }

    /// Document the parameter.
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help.replace(help.into());
        self
    }

    /// Set the name used for the values in the help message.
    pub fn metavar(mut self, metavar: impl Into<String>) -> Self {
        self.metavar.replace(metavar.into());
        self
    }

    /// Set the destination of an option.
    pub fn dest(mut self, dest: impl Into<String>) -> Self {
        self.dest.replace(dest.into());
        self
    }

    /// Set the version string printed by [`Action::Version`].
    /// The placeholder `%(prog)s` is replaced by the program name.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version.replace(version.into());
        self
    }

    pub(crate) fn resolve(self, id: usize) -> Result<Argument, ConfigError> {
        let Parameter {
            names,
            action,
            nargs,
            constant,
            default,
            value_type,
            choices,
            required,
            help,
            metavar,
            dest,
            version,
        } = self;
        let action = action.unwrap_or_default();
        let first = match names.first() {
            Some(first) => first.clone(),
            None => {
                return Err(ConfigError::InvalidOption {
                    argument: "<unnamed>".to_string(),
                    reason: "must have at least one name".to_string(),
                });
            }
        };
        let positional = !first.starts_with('-');
        let argument = if positional {
            first.clone()
        } else {
            names.join("/")
        };
        let invalid = |reason: String| ConfigError::InvalidOption {
            argument: argument.clone(),
            reason,
        };

        if positional {
            if names.len() > 1 {
                return Err(invalid(
                    "a positional argument cannot have aliases".to_string(),
                ));
            }

            if required.is_some() {
                return Err(invalid(
                    "'required' is an invalid argument for positionals".to_string(),
                ));
            }

            if dest.is_some() {
                return Err(invalid(
                    "dest supplied twice for positional argument".to_string(),
                ));
            }

            if !action.takes_values() {
                return Err(invalid(format!(
                    "action '{action}' is invalid for positionals"
                )));
            }
        } else {
            for name in &names {
                if !name.starts_with('-') || name.len() < 2 {
                    return Err(invalid(format!(
                        "invalid option string '{name}': must start with a character '-'"
                    )));
                }
            }
        }

        if action.takes_values() {
            if nargs == Some(Nargs::Precisely(0)) {
                return Err(invalid(format!(
                    "nargs for {action} actions must be != 0; if you have nothing to {action}, actions such as store true or store const may be more appropriate"
                )));
            }
        } else {
            if nargs.is_some() {
                return Err(invalid(format!("nargs is invalid for action '{action}'")));
            }

            if value_type.is_some() {
                return Err(invalid(format!("type is invalid for action '{action}'")));
            }

            if choices.is_some() {
                return Err(invalid(format!(
                    "choices is invalid for action '{action}'"
                )));
            }
        }

        if constant.is_some()
            && !matches!(action, Action::StoreConst | Action::AppendConst)
            && !(action.takes_values() && nargs == Some(Nargs::Optional))
        {
            return Err(invalid(
                "const is only valid with actions 'store_const'/'append_const' or nargs '?'"
                    .to_string(),
            ));
        }

        match (action, &version) {
            (Action::Version, None) => {
                return Err(invalid(
                    "action 'version' requires a version string".to_string(),
                ));
            }
            (Action::Version, Some(_)) | (_, None) => {}
            (_, Some(_)) => {
                return Err(invalid(
                    "version is only valid with action 'version'".to_string(),
                ));
            }
        };

        let (kind, dest) = if positional {
            (ArgumentKind::Positional, first)
        } else {
            let dest = match dest {
                Some(dest) => dest,
                None => {
                    let derived = derive_dest(&names);

                    if derived.is_empty() {
                        return Err(invalid(format!(
                            "dest= is required for options like '{first}'"
                        )));
                    }

                    derived
                }
            };
            (ArgumentKind::Optional { flags: names }, dest)
        };

        Ok(Argument {
            id,
            kind,
            dest,
            action,
            nargs,
            constant: constant.unwrap_or_default(),
            default,
            value_type: value_type.unwrap_or_default(),
            choices,
            required: required.unwrap_or(false),
            help,
            metavar,
            version,
            section: None,
        })
    }
}

// The first long flag (otherwise the first flag), without its leading dashes.
fn derive_dest(flags: &[String]) -> String {
    let flag = flags
        .iter()
        .find(|flag| flag.starts_with("--"))
        .or_else(|| flags.first());

    match flag {
        Some(flag) => flag.trim_start_matches('-').replace('-', "_"),
        None => String::default(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ArgumentKind {
    Positional,
    Optional { flags: Vec<String> },
}

/// A validated parameter, as registered against the parser.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Argument {
    pub(crate) id: usize,
    pub(crate) kind: ArgumentKind,
    pub(crate) dest: String,
    pub(crate) action: Action,
    pub(crate) nargs: Option<Nargs>,
    pub(crate) constant: Value,
    pub(crate) default: Option<Value>,
    pub(crate) value_type: ValueType,
    pub(crate) choices: Option<Vec<Value>>,
    pub(crate) required: bool,
    pub(crate) help: Option<String>,
    pub(crate) metavar: Option<String>,
    pub(crate) version: Option<String>,
    pub(crate) section: Option<usize>,
}

impl Argument {
    pub(crate) fn is_positional(&self) -> bool {
        self.kind == ArgumentKind::Positional
    }

    pub(crate) fn flags(&self) -> &[String] {
        match &self.kind {
            ArgumentKind::Positional => &[],
            ArgumentKind::Optional { flags } => flags,
        }
    }

    /// Every name this argument occupies on the command line.
    pub(crate) fn names(&self) -> Vec<String> {
        match &self.kind {
            ArgumentKind::Positional => vec![self.dest.clone()],
            ArgumentKind::Optional { flags } => flags.clone(),
        }
    }

    /// The name used to refer to this argument in error messages.
    pub(crate) fn name(&self) -> String {
        match &self.kind {
            ArgumentKind::Positional => self.metavar.clone().unwrap_or(self.dest.clone()),
            ArgumentKind::Optional { flags } => flags.join("/"),
        }
    }

    pub(crate) fn bound(&self) -> Bound {
        if self.action.takes_values() {
            match self.nargs {
                Some(nargs) => Bound::from(nargs),
                None => Bound::Range(1, 1),
            }
        } else {
            Bound::Range(0, 0)
        }
    }

    pub(crate) fn is_required(&self) -> bool {
        match &self.kind {
            ArgumentKind::Positional => self.bound().minimum() > 0,
            ArgumentKind::Optional { .. } => self.required,
        }
    }

    /// Whether the argument writes to the namespace at all.
    pub(crate) fn has_destination(&self) -> bool {
        !matches!(self.action, Action::Help | Action::Version)
    }

    /// Convert a raw value and check it against the choices.
    pub(crate) fn convert(&self, token: &str) -> Result<Value, String> {
        let value = self
            .value_type
            .convert(token)
            .map_err(|error| error.to_string())?;
        self.check_choice(&value)?;
        Ok(value)
    }

    pub(crate) fn check_choice(&self, value: &Value) -> Result<(), String> {
        if let Some(choices) = &self.choices {
            if !choices.iter().any(|choice| same_value(choice, value)) {
                return Err(format!(
                    "invalid choice: {} (choose from {})",
                    quoted(value),
                    choices
                        .iter()
                        .map(quoted)
                        .collect::<Vec<String>>()
                        .join(", ")
                ));
            }
        }

        Ok(())
    }
}

fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Int(i), Value::Float(x)) | (Value::Float(x), Value::Int(i)) => *i as f64 == *x,
        _ => a == b,
    }
}

pub(crate) fn quoted(value: &Value) -> String {
    match value {
        Value::Str(s) => format!("'{s}'"),
        other => other.to_string(),
    }
}
