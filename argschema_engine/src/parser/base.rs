use std::collections::HashSet;
use thiserror::Error;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

use crate::api::{Argument, Exclusion};
use crate::matcher::*;
use crate::model::{Action, Namespace, Nargs, Value, ValueType};

/// A misconfiguration of the [`ArgumentParser`](crate::ArgumentParser).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A name (flag or positional) is registered more than once.
    #[error("Config error: Cannot duplicate the argument '{0}'.")]
    DuplicateArgument(String),

    /// A parameter setting is unsupported or inconsistent.
    #[error("Config error: argument {argument}: {reason}.")]
    InvalidOption {
        /// The offending argument.
        argument: String,
        /// The explanation.
        reason: String,
    },

    /// A group setting/member is unsupported.
    #[error("Config error: group {group}: {reason}.")]
    InvalidGroup {
        /// The offending group.
        group: String,
        /// The explanation.
        reason: String,
    },
}

impl From<GrammarError> for ConfigError {
    fn from(error: GrammarError) -> Self {
        match error {
            GrammarError::DuplicateOption(name) => ConfigError::DuplicateArgument(name),
        }
    }
}

/// A failure to parse the command line tokens.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("error: {0}")]
pub struct ParseError(pub(crate) String);

impl ParseError {
    /// The message, without the `error:` prefix.
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl From<MatchError> for ParseError {
    fn from(error: MatchError) -> Self {
        ParseError(error.to_string())
    }
}

#[derive(Debug, PartialEq)]
pub(crate) enum Outcome {
    Complete {
        namespace: Namespace,
        unrecognized: Vec<String>,
    },
    PrintHelp,
    PrintVersion(String),
}

#[derive(Debug)]
pub(crate) struct Parser {
    grammar: Grammar,
    arguments: Vec<Argument>,
    exclusions: Vec<Exclusion>,
    argument_default: Option<Value>,
}

impl Parser {
    #[cfg(test)]
    pub(crate) fn empty() -> Self {
        Self::new(Vec::default(), Vec::default(), None, true).unwrap()
    }

    pub(crate) fn new(
        arguments: Vec<Argument>,
        exclusions: Vec<Exclusion>,
        argument_default: Option<Value>,
        allow_abbrev: bool,
    ) -> Result<Self, ConfigError> {
        let mut option_configs = Vec::default();
        let mut argument_configs = Vec::default();

        for argument in &arguments {
            if argument.is_positional() {
                argument_configs.push(ArgumentConfig::new(argument.id, argument.bound()));
            } else {
                option_configs.push(OptionConfig::new(
                    argument.id,
                    argument.flags().to_vec(),
                    argument.bound(),
                ));
            }
        }

        let grammar = Grammar::new(option_configs, argument_configs, allow_abbrev)?;

        Ok(Self {
            grammar,
            arguments,
            exclusions,
            argument_default,
        })
    }

    fn argument(&self, id: usize) -> &Argument {
        match self.arguments.iter().find(|argument| argument.id == id) {
            Some(argument) => argument,
            None => unreachable!("internal error - mismatch between matches and arguments"),
        }
    }

    /// The default of an argument, before any conversion.
    fn default_of(&self, argument: &Argument) -> Value {
        if let Some(default) = &argument.default {
            return default.clone();
        }

        if let Some(default) = &self.argument_default {
            return default.clone();
        }

        match argument.action {
            Action::StoreTrue => Value::Bool(false),
            Action::StoreFalse => Value::Bool(true),
            _ => Value::None,
        }
    }

    /// The namespace holding only the defaults.
    /// When multiple arguments share a destination, the first registered default wins.
    pub(crate) fn defaults(&self) -> Namespace {
        let mut namespace = Namespace::default();

        for argument in &self.arguments {
            if argument.has_destination() && !namespace.contains(&argument.dest) {
                namespace.upsert(&argument.dest, self.default_of(argument));
            }
        }

        namespace
    }

    // Help and version exit at the first place they are matched.
    fn early_exit(&self, matched: &[MatchTokens]) -> Option<Outcome> {
        for match_tokens in matched {
            let argument = self.argument(match_tokens.id);

            match argument.action {
                Action::Help => return Some(Outcome::PrintHelp),
                Action::Version => {
                    return Some(Outcome::PrintVersion(
                        argument.version.clone().unwrap_or_default(),
                    ));
                }
                _ => {}
            };
        }

        None
    }

    pub(crate) fn consume(
        &self,
        tokens: &[&str],
        known_only: bool,
    ) -> Result<Outcome, (usize, ParseError)> {
        // 1. Feed the raw token strings to the matcher.
        let mut token_matcher = TokenMatcher::new(&self.grammar);
        let mut fed = 0;

        for token in tokens {
            if let Err(error) = token_matcher.feed(token) {
                return match self.early_exit(token_matcher.matched()) {
                    Some(outcome) => Ok(outcome),
                    None => Err((fed, ParseError::from(error))),
                };
            }

            fed += token.len();
        }

        let matches = match token_matcher.close() {
            Ok(matches) => matches,
            Err((offset, error, matches)) => {
                return match self.early_exit(&matches.values) {
                    Some(outcome) => Ok(outcome),
                    None => Err((offset, ParseError::from(error))),
                };
            }
        };

        if let Some(outcome) = self.early_exit(&matches.values) {
            return Ok(outcome);
        }

        // 2. Apply each match in command line order.
        let mut namespace = self.defaults();
        let mut seen: HashSet<usize> = HashSet::default();
        let mut matched: HashSet<usize> = HashSet::default();

        for match_tokens in &matches.values {
            let argument = self.argument(match_tokens.id);
            matched.insert(argument.id);

            if !(argument.is_positional() && match_tokens.values.is_empty()) {
                self.check_exclusions(argument, &seen)
                    .map_err(|error| (match_tokens.offset, error))?;
                seen.insert(argument.id);
            }

            self.apply(argument, &match_tokens.values, &mut namespace)
                .map_err(|(offset, error)| (offset.unwrap_or(match_tokens.offset), error))?;
        }

        // 3. Check the required arguments, converting the defaults of the others.
        let mut missing = Vec::default();

        for argument in &self.arguments {
            if matched.contains(&argument.id) {
                continue;
            }

            if argument.is_required() {
                missing.push(argument.name());
            } else if argument.has_destination() {
                self.convert_default(argument, &mut namespace)
                    .map_err(|error| (fed, error))?;
            }
        }

        if !missing.is_empty() {
            return Err((
                fed,
                ParseError(format!(
                    "the following arguments are required: {}",
                    missing.join(", ")
                )),
            ));
        }

        for exclusion in &self.exclusions {
            if exclusion.required && !exclusion.members.iter().any(|id| seen.contains(id)) {
                return Err((
                    fed,
                    ParseError(format!(
                        "one of the arguments {} is required",
                        exclusion
                            .members
                            .iter()
                            .map(|id| self.argument(*id).name())
                            .collect::<Vec<String>>()
                            .join(" ")
                    )),
                ));
            }
        }

        // 4. Report the left over tokens.
        if !known_only {
            if let Some((offset, _)) = matches.unrecognized.first() {
                return Err((
                    *offset,
                    ParseError(format!(
                        "unrecognized arguments: {}",
                        matches
                            .unrecognized
                            .iter()
                            .map(|(_, value)| value.as_str())
                            .collect::<Vec<&str>>()
                            .join(" ")
                    )),
                ));
            }
        }

        #[cfg(feature = "tracing_debug")]
        {
            debug!(
                "Parsed {} destinations, with {} unrecognized tokens.",
                namespace.len(),
                matches.unrecognized.len()
            );
        }

        Ok(Outcome::Complete {
            namespace,
            unrecognized: matches
                .unrecognized
                .into_iter()
                .map(|(_, value)| value)
                .collect(),
        })
    }

    fn check_exclusions(&self, argument: &Argument, seen: &HashSet<usize>) -> Result<(), ParseError> {
        for exclusion in &self.exclusions {
            if !exclusion.members.contains(&argument.id) {
                continue;
            }

            for other in &exclusion.members {
                if *other != argument.id && seen.contains(other) {
                    return Err(ParseError(format!(
                        "argument {}: not allowed with argument {}",
                        argument.name(),
                        self.argument(*other).name()
                    )));
                }
            }
        }

        Ok(())
    }

    fn apply(
        &self,
        argument: &Argument,
        values: &[OffsetValue],
        namespace: &mut Namespace,
    ) -> Result<(), (Option<usize>, ParseError)> {
        let name = argument.name();
        let mut converted = Vec::default();

        for (offset, value) in values {
            // Remainder values skip the choices.
            let value = if argument.nargs == Some(Nargs::Remainder) {
                argument
                    .value_type
                    .convert(value)
                    .map_err(|error| error.to_string())
            } else {
                argument.convert(value)
            };
            converted.push(value.map_err(|reason| {
                (Some(*offset), ParseError(format!("argument {name}: {reason}")))
            })?);
        }

        let shaped = match argument.nargs {
            None => converted.pop().unwrap_or_default(),
            Some(Nargs::Optional) => match converted.pop() {
                Some(value) => value,
                None if argument.is_positional() => self
                    .converted_default(argument)
                    .map_err(|error| (None, error))?,
                None => argument.constant.clone(),
            },
            Some(Nargs::Any) if argument.is_positional() && converted.is_empty() => {
                match self.default_of(argument) {
                    Value::None => Value::List(Vec::default()),
                    default => default,
                }
            }
            Some(_) => Value::List(converted),
        };
        let dest = argument.dest.as_str();

        match argument.action {
            Action::Store => namespace.upsert(dest, shaped),
            Action::StoreConst => namespace.upsert(dest, argument.constant.clone()),
            Action::StoreTrue => namespace.upsert(dest, Value::Bool(true)),
            Action::StoreFalse => namespace.upsert(dest, Value::Bool(false)),
            Action::Append => {
                let mut items = into_items(namespace.take(dest));
                items.push(shaped);
                namespace.upsert(dest, Value::List(items));
            }
            Action::AppendConst => {
                let mut items = into_items(namespace.take(dest));
                items.push(argument.constant.clone());
                namespace.upsert(dest, Value::List(items));
            }
            Action::Extend => {
                let mut items = into_items(namespace.take(dest));
                items.extend(into_items(shaped));
                namespace.upsert(dest, Value::List(items));
            }
            Action::Count => {
                let count = match namespace.take(dest) {
                    Value::Int(count) => count + 1,
                    _ => 1,
                };
                namespace.upsert(dest, Value::Int(count));
            }
            Action::Help | Action::Version => {
                unreachable!("internal error - exit actions must be handled before applying")
            }
        };

        Ok(())
    }

    fn converted_default(&self, argument: &Argument) -> Result<Value, ParseError> {
        match self.default_of(argument) {
            Value::Str(default) if argument.value_type != ValueType::Str => argument
                .value_type
                .convert(&default)
                .map_err(|error| ParseError(format!("argument {}: {error}", argument.name()))),
            default => Ok(default),
        }
    }

    // String defaults are converted only when still in place.
    fn convert_default(&self, argument: &Argument, namespace: &mut Namespace) -> Result<(), ParseError> {
        let default = self.default_of(argument);

        if matches!(default, Value::Str(_)) && namespace.get(&argument.dest) == Some(&default) {
            let converted = self.converted_default(argument)?;
            namespace.upsert(&argument.dest, converted);
        }

        Ok(())
    }
}

fn into_items(value: Value) -> Vec<Value> {
    match value {
        Value::None => Vec::default(),
        Value::List(items) => items,
        other => vec![other],
    }
}
