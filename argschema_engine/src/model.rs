use std::str::FromStr;
use thiserror::Error;

/// A name that does not correspond to any variant of a model enum.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("'{value}' is not a valid {kind}.")]
pub struct InvalidVariant {
    kind: &'static str,
    value: String,
}

impl InvalidVariant {
    fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

/// The cardinality of inputs to match for an argument/option.
///
/// Inspired by argparse: <https://docs.python.org/3/library/argparse.html#nargs>
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nargs {
    /// `N`: Precisely `N` values, collected into a list.
    Precisely(u8),
    /// `?`: Zero or one value.
    Optional,
    /// `*`: May be any number of values, including `0`.
    Any,
    /// `+`: At least one value must be specified.
    AtLeastOne,
    /// `...`: Every remaining token, captured literally (even those that look like options).
    Remainder,
}

impl std::fmt::Display for Nargs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Nargs::Precisely(n) => write!(f, "{n}"),
            Nargs::Optional => write!(f, "?"),
            Nargs::Any => write!(f, "*"),
            Nargs::AtLeastOne => write!(f, "+"),
            Nargs::Remainder => write!(f, "..."),
        }
    }
}

impl FromStr for Nargs {
    type Err = InvalidVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "?" => Ok(Nargs::Optional),
            "*" => Ok(Nargs::Any),
            "+" => Ok(Nargs::AtLeastOne),
            "..." => Ok(Nargs::Remainder),
            other => other
                .parse::<u8>()
                .map(Nargs::Precisely)
                .map_err(|_| InvalidVariant::new("nargs", other)),
        }
    }
}

/// What to do with an argument once it is matched on the Cli.
///
/// Inspired by argparse: <https://docs.python.org/3/library/argparse.html#action>
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Action {
    /// Store the value(s).
    #[default]
    Store,
    /// Store the constant.
    StoreConst,
    /// Store `true`.
    StoreTrue,
    /// Store `false`.
    StoreFalse,
    /// Append the value(s) to a list, once per occurrence.
    Append,
    /// Append the constant to a list, once per occurrence.
    AppendConst,
    /// Extend a list with the values.
    Extend,
    /// Count the occurrences.
    Count,
    /// Print the help message and exit.
    Help,
    /// Print the version and exit.
    Version,
}

impl Action {
    /// Whether the action consumes values from the Cli.
    pub fn takes_values(&self) -> bool {
        matches!(self, Action::Store | Action::Append | Action::Extend)
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Action::Store => "store",
            Action::StoreConst => "store_const",
            Action::StoreTrue => "store_true",
            Action::StoreFalse => "store_false",
            Action::Append => "append",
            Action::AppendConst => "append_const",
            Action::Extend => "extend",
            Action::Count => "count",
            Action::Help => "help",
            Action::Version => "version",
        };
        write!(f, "{name}")
    }
}

impl FromStr for Action {
    type Err = InvalidVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "store" => Ok(Action::Store),
            "store_const" => Ok(Action::StoreConst),
            "store_true" => Ok(Action::StoreTrue),
            "store_false" => Ok(Action::StoreFalse),
            "append" => Ok(Action::Append),
            "append_const" => Ok(Action::AppendConst),
            "extend" => Ok(Action::Extend),
            "count" => Ok(Action::Count),
            "help" => Ok(Action::Help),
            "version" => Ok(Action::Version),
            other => Err(InvalidVariant::new("action", other)),
        }
    }
}

/// The conversion applied to each raw Cli token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueType {
    /// Keep the token as a string.
    #[default]
    Str,
    /// Parse the token as a signed integer.
    Int,
    /// Parse the token as a floating point number.
    Float,
}

impl ValueType {
    /// Convert a raw token into a [`Value`] of this type.
    pub fn convert(&self, token: &str) -> Result<Value, InvalidConversion> {
        match self {
            ValueType::Str => Ok(Value::Str(token.to_string())),
            ValueType::Int => token
                .trim()
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| InvalidConversion::new(token, *self)),
            ValueType::Float => token
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| InvalidConversion::new(token, *self)),
        }
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ValueType::Str => "str",
            ValueType::Int => "int",
            ValueType::Float => "float",
        };
        write!(f, "{name}")
    }
}

impl FromStr for ValueType {
    type Err = InvalidVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "str" => Ok(ValueType::Str),
            "int" => Ok(ValueType::Int),
            "float" => Ok(ValueType::Float),
            other => Err(InvalidVariant::new("type", other)),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid {value_type} value: '{token}'")]
#[doc(hidden)]
pub struct InvalidConversion {
    token: String,
    value_type: ValueType,
}

impl InvalidConversion {
    fn new(token: &str, value_type: ValueType) -> Self {
        Self {
            token: token.to_string(),
            value_type,
        }
    }
}

/// A parsed (or default) value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// No value.
    #[default]
    None,
    /// A flag state.
    Bool(bool),
    /// An integer.
    Int(i64),
    /// A floating point number.
    Float(f64),
    /// A string.
    Str(String),
    /// Multiple values.
    List(Vec<Value>),
}

impl Value {
    /// Whether this is [`Value::None`].
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// The flag state, if this is a [`Value::Bool`].
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The integer, if this is a [`Value::Int`].
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// The number, if this is a [`Value::Float`] or [`Value::Int`].
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(x) => Some(*x),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// The string, if this is a [`Value::Str`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// The items, if this is a [`Value::List`].
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::None => write!(f, "None"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::List(items) => write!(
                f,
                "[{}]",
                items
                    .iter()
                    .map(|v| v.to_string())
                    .collect::<Vec<String>>()
                    .join(", ")
            ),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Value::List(value.into_iter().map(Into::into).collect())
    }
}

/// The parsed values, keyed by destination.
///
/// Destinations appear in the order their arguments were registered.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Namespace {
    entries: Vec<(String, Value)>,
}

impl Namespace {
    /// Get the value stored under the destination `dest`.
    pub fn get(&self, dest: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(key, _)| key == dest)
            .map(|(_, value)| value)
    }

    /// Whether the destination `dest` exists.
    pub fn contains(&self, dest: &str) -> bool {
        self.get(dest).is_some()
    }

    /// Iterate the destinations and their values.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// The number of destinations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no destinations.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consume into the destination/value pairs.
    pub fn into_entries(self) -> Vec<(String, Value)> {
        self.entries
    }

    pub(crate) fn upsert(&mut self, dest: &str, value: Value) {
        match self.entries.iter_mut().find(|(key, _)| key == dest) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((dest.to_string(), value)),
        }
    }

    pub(crate) fn take(&mut self, dest: &str) -> Value {
        match self.entries.iter_mut().find(|(key, _)| key == dest) {
            Some((_, existing)) => std::mem::take(existing),
            None => Value::None,
        }
    }
}
