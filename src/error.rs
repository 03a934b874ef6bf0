use argschema_engine::{ConfigError, ParseExit};
use thiserror::Error;

/// One failed interpretation of a schema source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadAttempt {
    /// How the source was interpreted (ex: `path`, `text`).
    pub interpretation: &'static str,
    /// Why the interpretation failed.
    pub reason: String,
}

impl std::fmt::Display for LoadAttempt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "as {}: {}", self.interpretation, self.reason)
    }
}

/// The schema source could not be turned into a document, under any interpretation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "Schema load error: expected a document, a path, a reader, or text with schema data ({}).",
    .attempts.iter().map(|a| a.to_string()).collect::<Vec<String>>().join("; ")
)]
pub struct SchemaLoadError {
    /// Every interpretation attempted, in order.
    pub attempts: Vec<LoadAttempt>,
}

impl SchemaLoadError {
    pub(crate) fn new(attempts: Vec<LoadAttempt>) -> Self {
        Self { attempts }
    }
}

/// The document does not have the shape of a schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Schema shape error: '{path}': {expected}.")]
pub struct SchemaShapeError {
    /// The offending key path (ex: `groups.mode`).
    pub path: String,
    /// What was expected there.
    pub expected: String,
}

impl SchemaShapeError {
    pub(crate) fn new(path: impl Into<String>, expected: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            expected: expected.into(),
        }
    }
}

/// A failure to construct a [`SchemaParser`](crate::SchemaParser).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// See [`SchemaLoadError`].
    #[error(transparent)]
    Load(#[from] SchemaLoadError),

    /// See [`SchemaShapeError`].
    #[error(transparent)]
    Shape(#[from] SchemaShapeError),

    /// A name or alias is used by more than one argument.
    #[error("Duplicate argument error: '{name}' is defined more than once.")]
    DuplicateArgument {
        /// The colliding name.
        name: String,
    },

    /// An option is unsupported, or has a value the parser rejects.
    #[error("Invalid option error: {subject}: {reason}.")]
    InvalidOption {
        /// What the option belongs to (ex: `argument --verbose`, `parser`).
        subject: String,
        /// The explanation.
        reason: String,
    },

    /// A group option is unsupported, or a member is not allowed in the group.
    #[error("Invalid group error: {group}: {reason}.")]
    InvalidGroup {
        /// The group name.
        group: String,
        /// The explanation.
        reason: String,
    },
}

impl SchemaError {
    pub(crate) fn invalid_option(subject: impl Into<String>, reason: impl Into<String>) -> Self {
        SchemaError::InvalidOption {
            subject: subject.into(),
            reason: reason.into(),
        }
    }
}

impl From<ConfigError> for SchemaError {
    fn from(error: ConfigError) -> Self {
        match error {
            ConfigError::DuplicateArgument(name) => SchemaError::DuplicateArgument { name },
            ConfigError::InvalidOption { argument, reason } => SchemaError::InvalidOption {
                subject: format!("argument {argument}"),
                reason,
            },
            ConfigError::InvalidGroup { group, reason } => {
                SchemaError::InvalidGroup { group, reason }
            }
        }
    }
}

/// Parsing stopped short of a [`ParsedResult`](crate::ParsedResult).
///
/// This is either a genuine failure (exit code `2`), or a request for help/version (exit code `0`).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ArgumentParseError {
    message: String,
    exit_code: i32,
}

impl ArgumentParseError {
    /// The message describing the failure.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The process exit code for this failure.
    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }

    /// Whether the parse stopped because help or version was requested.
    pub fn is_exit_request(&self) -> bool {
        self.exit_code == 0
    }
}

impl From<ParseExit> for ArgumentParseError {
    fn from(exit: ParseExit) -> Self {
        let exit_code = exit.exit_code();
        let message = match exit {
            ParseExit::Error(error) => error.message().to_string(),
            ParseExit::Help => "help requested".to_string(),
            ParseExit::Version(version) => version,
        };

        Self { message, exit_code }
    }
}
