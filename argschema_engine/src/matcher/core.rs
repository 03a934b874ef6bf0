use std::collections::{HashMap, VecDeque};
use thiserror::Error;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

use crate::matcher::api::*;
use crate::matcher::model::*;

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum GrammarError {
    #[error("Cannot duplicate the option '{0}'.")]
    DuplicateOption(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum MatchError {
    #[error("argument {name}: {}", .bound.expected_message())]
    ExpectedValues { name: String, bound: Bound },

    #[error("argument {name}: ignored explicit argument '{value}'")]
    ExplicitArgument { name: String, value: String },

    #[error("ambiguous option: {token} could match {}", .candidates.join(", "))]
    AmbiguousOption {
        token: String,
        candidates: Vec<String>,
    },
}

impl From<CloseError> for MatchError {
    fn from(error: CloseError) -> Self {
        match error {
            CloseError::TooFewValues { name, bound, .. } => {
                MatchError::ExpectedValues { name, bound }
            }
        }
    }
}

impl Bound {
    fn expected_message(&self) -> String {
        match self {
            Bound::Range(1, 1) => "expected one argument".to_string(),
            Bound::Range(i, j) if i == j => format!("expected {i} arguments"),
            Bound::Range(1, _) | Bound::Lower(1) => "expected at least one argument".to_string(),
            Bound::Range(n, _) | Bound::Lower(n) => format!("expected at least {n} arguments"),
            Bound::Remainder => "expected arguments".to_string(),
        }
    }
}

/// The option/argument layout of a parser, resolved once at build time.
#[derive(Debug)]
pub(crate) struct Grammar {
    flags: HashMap<String, usize>,
    options: Vec<OptionConfig>,
    arguments: Vec<ArgumentConfig>,
    allow_abbrev: bool,
    negative_flags: bool,
    // The number of positional values after which a remainder argument takes over.
    remainder_threshold: Option<usize>,
}

impl Grammar {
    pub(crate) fn new(
        options: Vec<OptionConfig>,
        arguments: Vec<ArgumentConfig>,
        allow_abbrev: bool,
    ) -> Result<Self, GrammarError> {
        let mut flags = HashMap::default();

        for (index, option_config) in options.iter().enumerate() {
            for flag in option_config.flags() {
                if flags.insert(flag.clone(), index).is_some() {
                    return Err(GrammarError::DuplicateOption(flag.clone()));
                }
            }
        }

        let negative_flags = flags.keys().any(|flag| looks_negative(flag));
        let mut remainder_threshold = None;
        let mut threshold = Some(0);

        for argument_config in &arguments {
            if argument_config.bound() == Bound::Remainder {
                remainder_threshold = threshold;
                break;
            }

            threshold = match (threshold, argument_config.bound().maximum()) {
                (Some(total), Some(maximum)) => Some(total + maximum),
                _ => None,
            };
        }

        #[cfg(feature = "tracing_debug")]
        {
            debug!(
                "Grammar with {} options, {} arguments, remainder threshold {remainder_threshold:?}.",
                options.len(),
                arguments.len()
            );
        }

        Ok(Self {
            flags,
            options,
            arguments,
            allow_abbrev,
            negative_flags,
            remainder_threshold,
        })
    }

    pub(crate) fn arguments(&self) -> &[ArgumentConfig] {
        &self.arguments
    }

    fn classify(&self, token: &str) -> Result<Classified, MatchError> {
        // A lone '-' (typically meaning stdin) is never an option.
        if !token.starts_with('-') || token.len() < 2 {
            return Ok(Classified::Value);
        }

        if let Some(index) = self.flags.get(token) {
            return Ok(Classified::Option {
                index: *index,
                flag: token.to_string(),
                attached: None,
            });
        }

        if let Some((name, value)) = token.split_once('=') {
            if let Some(index) = self.flags.get(name) {
                return Ok(Classified::Option {
                    index: *index,
                    flag: name.to_string(),
                    attached: Some(Attached::Equals(value.to_string())),
                });
            }
        }

        let mut candidates = self.candidates(token);

        if candidates.len() > 1 {
            return Err(MatchError::AmbiguousOption {
                token: token.to_string(),
                candidates: candidates.into_iter().map(|(_, flag, _)| flag).collect(),
            });
        }

        if let Some((index, flag, attached)) = candidates.pop() {
            return Ok(Classified::Option {
                index,
                flag,
                attached,
            });
        }

        if looks_negative(token) && !self.negative_flags {
            return Ok(Classified::Value);
        }

        if token.contains(' ') {
            return Ok(Classified::Value);
        }

        Ok(Classified::Unknown)
    }

    fn candidates(&self, token: &str) -> Vec<(usize, String, Option<Attached>)> {
        let mut candidates = Vec::default();

        if token.starts_with("--") {
            if self.allow_abbrev {
                let (prefix, value) = match token.split_once('=') {
                    Some((prefix, value)) => (prefix, Some(value)),
                    None => (token, None),
                };

                for (index, option_config) in self.options.iter().enumerate() {
                    for flag in option_config.flags() {
                        if flag.starts_with(prefix) {
                            candidates.push((
                                index,
                                flag.clone(),
                                value.map(|v| Attached::Equals(v.to_string())),
                            ));
                        }
                    }
                }
            }
        } else {
            let split = token
                .char_indices()
                .nth(2)
                .map(|(i, _)| i)
                .unwrap_or(token.len());
            let (short, suffix) = token.split_at(split);

            for (index, option_config) in self.options.iter().enumerate() {
                for flag in option_config.flags() {
                    if flag == short {
                        candidates.push((
                            index,
                            flag.clone(),
                            Some(Attached::Suffix(suffix.to_string())),
                        ));
                    } else if self.allow_abbrev && flag.starts_with(token) {
                        candidates.push((index, flag.clone(), None));
                    }
                }
            }
        }

        candidates
    }
}

fn looks_negative(token: &str) -> bool {
    match token.strip_prefix('-') {
        Some(rest) => {
            !rest.is_empty()
                && rest.chars().all(|c| c.is_ascii_digit() || c == '.')
                && rest.parse::<f64>().is_ok()
        }
        None => false,
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Attached {
    // --flag=value
    Equals(String),
    // -fvalue
    Suffix(String),
}

#[derive(Debug, PartialEq, Eq)]
enum Classified {
    Value,
    Option {
        index: usize,
        flag: String,
        attached: Option<Attached>,
    },
    Unknown,
}

#[derive(Debug)]
pub(crate) struct TokenMatcher<'g> {
    grammar: &'g Grammar,
    fed: usize,
    matches: Vec<MatchTokens>,
    buffer: Option<MatchBuffer>,
    positionals: Vec<OffsetValue>,
    remainder: Option<Vec<OffsetValue>>,
    options_ended: bool,
    unrecognized: Vec<OffsetValue>,
}

impl<'g> TokenMatcher<'g> {
    pub(crate) fn new(grammar: &'g Grammar) -> Self {
        Self {
            grammar,
            fed: 0,
            matches: Vec::default(),
            buffer: None,
            positionals: Vec::default(),
            remainder: None,
            options_ended: false,
            unrecognized: Vec::default(),
        }
    }

    /// The options matched so far.
    pub(crate) fn matched(&self) -> &[MatchTokens] {
        &self.matches
    }

    pub(crate) fn feed(&mut self, token: &str) -> Result<(), MatchError> {
        let offset = self.fed;
        let result = self.feed_at(offset, token);
        self.fed += token.len();
        result
    }

    fn feed_at(&mut self, offset: usize, token: &str) -> Result<(), MatchError> {
        // 1. Literal capture, such as:
        //  PROGRAM ARGS...    (remainder argument, after PROGRAM)
        //  --exec ARGS...     (remainder option)
        if let Some(remainder) = self.remainder.as_mut() {
            remainder.push((offset, token.to_string()));
            return Ok(());
        }

        if let Some(match_buffer) = self.buffer.as_mut() {
            if match_buffer.is_literal() {
                match_buffer.push(offset, token.to_string());
                return Ok(());
            }
        }

        if matches!(self.grammar.remainder_threshold, Some(t) if t > 0 && self.positionals.len() >= t)
        {
            return self.start_remainder(offset, token);
        }

        // 2. Option processing, such as:
        //  --
        //  --flag, --flag=..
        //  --fl (abbreviation)
        //  -f, -f.., -f=.., -abc (short clusters)
        if !self.options_ended {
            if token == "--" {
                #[cfg(feature = "tracing_debug")]
                {
                    debug!("Options ended at offset {offset}.");
                }

                self.options_ended = true;
                return self.update_buffer(None);
            }

            match self.grammar.classify(token)? {
                Classified::Option {
                    index,
                    flag,
                    attached,
                } => {
                    return self.open_option(offset + token.len(), index, &flag, attached, offset);
                }
                Classified::Unknown => {
                    self.update_buffer(None)?;
                    self.unrecognized.push((offset, token.to_string()));
                    return Ok(());
                }
                Classified::Value => {}
            };
        }

        // 3. Values, either for the open option or positionally.
        if !self.options_ended {
            if let Some(match_buffer) = self.buffer.as_mut() {
                if match_buffer.is_open() {
                    match_buffer.push(offset, token.to_string());
                    return Ok(());
                }
            }
        }

        self.update_buffer(None)?;

        if matches!(self.grammar.remainder_threshold, Some(t) if self.positionals.len() >= t) {
            self.start_remainder(offset, token)
        } else {
            self.positionals.push((offset, token.to_string()));
            Ok(())
        }
    }

    fn start_remainder(&mut self, offset: usize, token: &str) -> Result<(), MatchError> {
        #[cfg(feature = "tracing_debug")]
        {
            debug!("Remainder starts at offset {offset}.");
        }

        self.update_buffer(None)?;
        self.remainder.replace(vec![(offset, token.to_string())]);
        Ok(())
    }

    fn open_option(
        &mut self,
        token_end: usize,
        index: usize,
        flag: &str,
        attached: Option<Attached>,
        offset: usize,
    ) -> Result<(), MatchError> {
        self.update_buffer(None)?;
        let grammar = self.grammar;
        let option_config = &grammar.options[index];
        let bound = option_config.bound();
        let mut match_buffer = MatchBuffer::new(option_config.id(), option_config.name(), bound, offset);

        #[cfg(feature = "tracing_debug")]
        {
            debug!("Matched option {flag} ({bound:?}) with attached {attached:?}.");
        }

        let (value, clustered) = match attached {
            None => {
                if self.buffer.replace(match_buffer).is_some() {
                    unreachable!("internal error - the buffer is expected to be None");
                }

                return Ok(());
            }
            Some(Attached::Equals(value)) => (value, false),
            Some(Attached::Suffix(value)) => (value, true),
        };

        if bound.maximum() == Some(0) {
            // Only a switch with its short flag may be clustered (ex: -abc).
            if !clustered || value.is_empty() || value.starts_with('-') || flag.starts_with("--") {
                return Err(MatchError::ExplicitArgument {
                    name: option_config.name(),
                    value,
                });
            }

            self.matches.push(match_buffer.close()?);
            let mut characters = value.chars();
            let next_flag = match characters.next() {
                Some(c) => format!("-{c}"),
                None => unreachable!("internal error - clustered value must be non-empty"),
            };
            let rest = characters.as_str();

            match grammar.flags.get(&next_flag) {
                Some(next_index) => {
                    let next_attached = if rest.is_empty() {
                        None
                    } else if let Some(v) = rest.strip_prefix('=') {
                        Some(Attached::Equals(v.to_string()))
                    } else {
                        Some(Attached::Suffix(rest.to_string()))
                    };
                    self.open_option(token_end, *next_index, &next_flag, next_attached, offset)
                }
                None => {
                    self.unrecognized.push((offset, format!("-{value}")));
                    Ok(())
                }
            }
        } else if bound.minimum() > 1 {
            Err(MatchError::ExpectedValues {
                name: option_config.name(),
                bound,
            })
        } else {
            // Options using attached values cannot follow up with more values afterwards.
            match_buffer.push(token_end - value.len(), value);
            self.matches.push(match_buffer.close()?);
            Ok(())
        }
    }

    fn update_buffer(&mut self, next_buffer: Option<MatchBuffer>) -> Result<(), MatchError> {
        let previous_buffer = std::mem::replace(&mut self.buffer, next_buffer);

        if let Some(match_buffer) = previous_buffer {
            let match_tokens = match_buffer.close()?;
            self.matches.push(match_tokens);
        }

        Ok(())
    }

    /// Close out the matching, allocating the positional values across the arguments.
    ///
    /// Arguments which cannot be satisfied are left out of the matches.
    pub(crate) fn close(mut self) -> Result<Matches, (usize, MatchError, Matches)> {
        let mut close_error: Option<CloseError> = None;

        if let Some(match_buffer) = self.buffer.take() {
            match match_buffer.close() {
                Ok(match_tokens) => self.matches.push(match_tokens),
                Err(error) => {
                    close_error.replace(error);
                }
            };
        }

        let grammar = self.grammar;
        let arguments = grammar.arguments();
        let mut available: VecDeque<OffsetValue> = self.positionals.into();
        // Only the longest prefix of arguments whose minimums can be met are matched.
        let mut satisfiable = arguments.len();

        while satisfiable > 0
            && arguments[..satisfiable]
                .iter()
                .map(|ac| ac.bound().minimum())
                .sum::<usize>()
                > available.len()
        {
            satisfiable -= 1;
        }

        #[cfg(feature = "tracing_debug")]
        {
            debug!(
                "Satisfiable arguments {satisfiable} of {}, with {} positional values.",
                arguments.len(),
                available.len()
            );
        }

        for (i, argument_config) in arguments[..satisfiable].iter().enumerate() {
            let bound = argument_config.bound();
            let values: Vec<OffsetValue> = if bound == Bound::Remainder {
                let mut values: Vec<OffsetValue> = available.drain(..).collect();
                values.extend(self.remainder.take().unwrap_or_default());
                values
            } else {
                // Leave enough values to satisfy the arguments that follow.
                let demand: usize = arguments[i + 1..satisfiable]
                    .iter()
                    .map(|ac| ac.bound().minimum())
                    .sum();
                let supply = available.len().saturating_sub(demand);
                let take = match bound.maximum() {
                    Some(maximum) => std::cmp::min(maximum, supply),
                    None => supply,
                };
                available.drain(..take).collect()
            };

            let offset = values.first().map(|(o, _)| *o).unwrap_or(self.fed);
            self.matches.push(MatchTokens {
                id: argument_config.id(),
                offset,
                values,
            });
        }

        self.unrecognized.extend(available);
        self.unrecognized
            .extend(self.remainder.take().unwrap_or_default());
        self.unrecognized.sort_by_key(|(offset, _)| *offset);
        self.matches.sort_by_key(|match_tokens| match_tokens.offset);
        let matches = Matches {
            values: self.matches,
            unrecognized: self.unrecognized,
        };

        match close_error {
            Some(error) => Err((self.fed, MatchError::from(error), matches)),
            None => Ok(matches),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn grammar(options: Vec<(Vec<&str>, Bound)>, arguments: Vec<(&str, Bound)>) -> Grammar {
        let option_count = options.len();
        Grammar::new(
            options
                .into_iter()
                .enumerate()
                .map(|(id, (flags, bound))| {
                    OptionConfig::new(id, flags.into_iter().map(String::from).collect(), bound)
                })
                .collect(),
            arguments
                .into_iter()
                .enumerate()
                .map(|(i, (_, bound))| ArgumentConfig::new(option_count + i, bound))
                .collect(),
            true,
        )
        .unwrap()
    }

    fn run(grammar: &Grammar, tokens: &[&str]) -> Result<Matches, MatchError> {
        let mut token_matcher = TokenMatcher::new(grammar);

        for token in tokens {
            token_matcher.feed(token)?;
        }

        token_matcher.close().map_err(|(_, error, _)| error)
    }

    fn simplify(matches: &Matches) -> Vec<(usize, Vec<&str>)> {
        matches
            .values
            .iter()
            .map(|mt| (mt.id, mt.values.iter().map(|(_, v)| v.as_str()).collect()))
            .collect()
    }

    fn unrecognized(matches: &Matches) -> Vec<&str> {
        matches
            .unrecognized
            .iter()
            .map(|(_, v)| v.as_str())
            .collect()
    }

    #[test]
    fn grammar_duplicate() {
        let error = Grammar::new(
            vec![
                OptionConfig::new(0, vec!["--abc".to_string()], Bound::Range(1, 1)),
                OptionConfig::new(1, vec!["-a".to_string(), "--abc".to_string()], Bound::Range(1, 1)),
            ],
            Vec::default(),
            true,
        )
        .unwrap_err();
        assert_eq!(error, GrammarError::DuplicateOption("--abc".to_string()));
    }

    #[rstest]
    #[case(vec![], Some(0))]
    #[case(vec![("a", Bound::Range(1, 1))], Some(1))]
    #[case(vec![("a", Bound::Range(0, 1)), ("b", Bound::Range(2, 2))], Some(3))]
    #[case(vec![("a", Bound::Lower(1))], None)]
    fn grammar_remainder_threshold(
        #[case] prior: Vec<(&str, Bound)>,
        #[case] expected: Option<usize>,
    ) {
        let mut arguments = prior;
        arguments.push(("rest", Bound::Remainder));
        assert_eq!(grammar(vec![], arguments).remainder_threshold, expected);
        assert_eq!(
            grammar(vec![], vec![("a", Bound::Range(1, 1))]).remainder_threshold,
            None
        );
    }

    #[rstest]
    #[case(vec!["--initial", "1"], vec![(0, vec!["1"])])]
    #[case(vec!["--initial=1"], vec![(0, vec!["1"])])]
    #[case(vec!["--initial="], vec![(0, vec![""])])]
    #[case(vec!["--init", "1"], vec![(0, vec!["1"])])]
    #[case(vec!["--ini=1"], vec![(0, vec!["1"])])]
    #[case(vec!["-i", "1"], vec![(0, vec!["1"])])]
    #[case(vec!["-i1"], vec![(0, vec!["1"])])]
    #[case(vec!["-i=1"], vec![(0, vec!["1"])])]
    #[case(vec!["-i", "-1"], vec![(0, vec!["-1"])])]
    #[case(vec!["-i", "1", "-i", "2"], vec![(0, vec!["1"]), (0, vec!["2"])])]
    fn option_single_value(
        #[case] tokens: Vec<&str>,
        #[case] expected: Vec<(usize, Vec<&str>)>,
    ) {
        let grammar = grammar(vec![(vec!["-i", "--initial"], Bound::Range(1, 1))], vec![]);
        let matches = run(&grammar, &tokens).unwrap();
        assert_eq!(simplify(&matches), expected);
        assert!(matches.unrecognized.is_empty());
    }

    #[rstest]
    #[case(Bound::Range(1, 1), vec!["--items"], "argument --items: expected one argument")]
    #[case(Bound::Range(2, 2), vec!["--items", "a"], "argument --items: expected 2 arguments")]
    #[case(Bound::Range(2, 2), vec!["--items=a"], "argument --items: expected 2 arguments")]
    #[case(Bound::Lower(1), vec!["--items", "--"], "argument --items: expected at least one argument")]
    #[case(Bound::Range(0, 0), vec!["--items=a"], "argument --items: ignored explicit argument 'a'")]
    fn option_errors(#[case] bound: Bound, #[case] tokens: Vec<&str>, #[case] expected: &str) {
        let grammar = grammar(vec![(vec!["--items"], bound)], vec![]);
        let error = run(&grammar, &tokens).unwrap_err();
        assert_eq!(error.to_string(), expected);
    }

    #[rstest]
    #[case(Bound::Range(0, 1), vec!["--items"], vec![])]
    #[case(Bound::Range(0, 1), vec!["--items", "a"], vec!["a"])]
    #[case(Bound::Lower(0), vec!["--items"], vec![])]
    #[case(Bound::Lower(0), vec!["--items", "a", "b"], vec!["a", "b"])]
    #[case(Bound::Lower(1), vec!["--items", "a", "b"], vec!["a", "b"])]
    #[case(Bound::Range(2, 2), vec!["--items", "a", "b"], vec!["a", "b"])]
    #[case(Bound::Remainder, vec!["--items", "a", "--other", "-x"], vec!["a", "--other", "-x"])]
    fn option_bounds(#[case] bound: Bound, #[case] tokens: Vec<&str>, #[case] expected: Vec<&str>) {
        let grammar = grammar(
            vec![(vec!["--items"], bound), (vec!["--other"], Bound::Range(0, 0))],
            vec![],
        );
        let matches = run(&grammar, &tokens).unwrap();
        assert_eq!(simplify(&matches), vec![(0, expected)]);
    }

    #[test]
    fn option_ambiguous() {
        let grammar = grammar(
            vec![
                (vec!["--prefix"], Bound::Range(1, 1)),
                (vec!["--preview"], Bound::Range(0, 0)),
            ],
            vec![],
        );
        let error = run(&grammar, &["--pre"]).unwrap_err();
        assert_eq!(
            error.to_string(),
            "ambiguous option: --pre could match --prefix, --preview"
        );

        let matches = run(&grammar, &["--pref", "x", "--prev"]).unwrap();
        assert_eq!(simplify(&matches), vec![(0, vec!["x"]), (1, vec![])]);
    }

    #[test]
    fn option_abbreviation_disabled() {
        let grammar = Grammar::new(
            vec![OptionConfig::new(0, vec!["--verbose".to_string()], Bound::Range(0, 0))],
            Vec::default(),
            false,
        )
        .unwrap();
        let matches = run(&grammar, &["--verb"]).unwrap();
        assert!(matches.values.is_empty());
        assert_eq!(unrecognized(&matches), vec!["--verb"]);
    }

    #[rstest]
    #[case(vec!["-abc"], vec![(0, vec![]), (1, vec![]), (2, vec![])], vec![])]
    #[case(vec!["-ac"], vec![(0, vec![]), (2, vec![])], vec![])]
    #[case(vec!["-avalue"], vec![(0, vec![])], vec!["-value"])]
    #[case(vec!["-afile"], vec![(0, vec![]), (3, vec!["ile"])], vec![])]
    #[case(vec!["-af=x"], vec![(0, vec![]), (3, vec!["x"])], vec![])]
    #[case(vec!["-af", "x"], vec![(0, vec![]), (3, vec!["x"])], vec![])]
    fn short_clusters(
        #[case] tokens: Vec<&str>,
        #[case] expected: Vec<(usize, Vec<&str>)>,
        #[case] expected_unrecognized: Vec<&str>,
    ) {
        let grammar = grammar(
            vec![
                (vec!["-a"], Bound::Range(0, 0)),
                (vec!["-b"], Bound::Range(0, 0)),
                (vec!["-c"], Bound::Range(0, 0)),
                (vec!["-f"], Bound::Range(1, 1)),
            ],
            vec![],
        );
        let matches = run(&grammar, &tokens).unwrap();
        assert_eq!(simplify(&matches), expected);
        assert_eq!(unrecognized(&matches), expected_unrecognized);
    }

    #[test]
    fn short_cluster_explicit_dash() {
        let grammar = grammar(vec![(vec!["-a"], Bound::Range(0, 0))], vec![]);
        let error = run(&grammar, &["-a-b"]).unwrap_err();
        assert_eq!(error.to_string(), "argument -a: ignored explicit argument '-b'");
    }

    #[rstest]
    #[case(vec!["-1"], vec![(1, vec!["-1"])], vec![])]
    #[case(vec!["-2.5"], vec![(1, vec!["-2.5"])], vec![])]
    #[case(vec!["-"], vec![(1, vec!["-"])], vec![])]
    #[case(vec!["a b"], vec![(1, vec!["a b"])], vec![])]
    #[case(vec!["-x", "1"], vec![(1, vec!["1"])], vec!["-x"])]
    #[case(vec!["--", "-x"], vec![(1, vec!["-x"])], vec![])]
    #[case(vec!["--", "--"], vec![(1, vec!["--"])], vec![])]
    fn positional_like(
        #[case] tokens: Vec<&str>,
        #[case] expected: Vec<(usize, Vec<&str>)>,
        #[case] expected_unrecognized: Vec<&str>,
    ) {
        let grammar = grammar(
            vec![(vec!["-v"], Bound::Range(0, 0))],
            vec![("value", Bound::Range(1, 1))],
        );
        let matches = run(&grammar, &tokens).unwrap();
        assert_eq!(simplify(&matches), expected);
        assert_eq!(unrecognized(&matches), expected_unrecognized);
    }

    #[test]
    fn negative_number_flags() {
        let grammar = grammar(
            vec![(vec!["-1"], Bound::Range(0, 0))],
            vec![("value", Bound::Range(0, 1))],
        );
        let matches = run(&grammar, &["-1", "-2"]).unwrap();
        assert_eq!(simplify(&matches), vec![(0, vec![]), (1, vec![])]);
        assert_eq!(unrecognized(&matches), vec!["-2"]);
    }

    #[rstest]
    #[case(vec!["a"], vec![(0, vec![]), (1, vec!["a"])])]
    #[case(vec!["a", "b"], vec![(0, vec!["a"]), (1, vec!["b"])])]
    #[case(vec!["a", "b", "c"], vec![(0, vec!["a", "b"]), (1, vec!["c"])])]
    fn positional_allocation(
        #[case] tokens: Vec<&str>,
        #[case] expected: Vec<(usize, Vec<&str>)>,
    ) {
        let grammar = grammar(
            vec![],
            vec![("src", Bound::Lower(0)), ("dst", Bound::Range(1, 1))],
        );
        let matches = run(&grammar, &tokens).unwrap();
        let mut actual = simplify(&matches);
        actual.sort_by_key(|(id, _)| *id);
        assert_eq!(actual, expected);
    }

    #[test]
    fn positional_unsatisfied() {
        let grammar = grammar(
            vec![],
            vec![("a", Bound::Range(1, 1)), ("b", Bound::Range(2, 2))],
        );
        let matches = run(&grammar, &["x", "y"]).unwrap();
        assert_eq!(simplify(&matches), vec![(0, vec!["x"])]);
        assert_eq!(unrecognized(&matches), vec!["y"]);
    }

    #[rstest]
    #[case(vec!["mod"], vec![(1, vec!["mod"]), (2, vec![])])]
    #[case(vec!["mod", "-v", "--x", "a"], vec![(1, vec!["mod"]), (2, vec!["-v", "--x", "a"])])]
    #[case(vec!["-v", "mod", "-v"], vec![(0, vec![]), (1, vec!["mod"]), (2, vec!["-v"])])]
    #[case(vec!["mod", "--", "a"], vec![(1, vec!["mod"]), (2, vec!["--", "a"])])]
    fn positional_remainder(
        #[case] tokens: Vec<&str>,
        #[case] expected: Vec<(usize, Vec<&str>)>,
    ) {
        let grammar = grammar(
            vec![(vec!["-v"], Bound::Range(0, 0))],
            vec![("module", Bound::Range(1, 1)), ("args", Bound::Remainder)],
        );
        let matches = run(&grammar, &tokens).unwrap();
        assert_eq!(simplify(&matches), expected);
        assert!(matches.unrecognized.is_empty());
    }

    #[test]
    fn positional_remainder_first() {
        let grammar = grammar(
            vec![(vec!["-v"], Bound::Range(0, 0))],
            vec![("args", Bound::Remainder)],
        );
        let matches = run(&grammar, &["-v", "--unknown", "a", "-v"]).unwrap();
        assert_eq!(simplify(&matches), vec![(0, vec![]), (1, vec!["a", "-v"])]);
        assert_eq!(unrecognized(&matches), vec!["--unknown"]);
    }

    #[test]
    fn close_error_keeps_matches() {
        let grammar = grammar(
            vec![
                (vec!["-h"], Bound::Range(0, 0)),
                (vec!["--value"], Bound::Range(1, 1)),
            ],
            vec![],
        );
        let mut token_matcher = TokenMatcher::new(&grammar);
        token_matcher.feed("-h").unwrap();
        token_matcher.feed("--value").unwrap();
        assert_eq!(token_matcher.matched().len(), 1);
        let (offset, error, matches) = token_matcher.close().unwrap_err();
        assert_eq!(offset, 9);
        assert_matches!(error, MatchError::ExpectedValues { .. });
        assert!(matches.values.iter().any(|mt| mt.id == 0));
    }

    #[rstest]
    #[case("-1", true)]
    #[case("-1.5", true)]
    #[case("-.5", true)]
    #[case("-", false)]
    #[case("-x", false)]
    #[case("-1e5", false)]
    #[case("1", false)]
    fn negative(#[case] token: &str, #[case] expected: bool) {
        assert_eq!(looks_negative(token), expected);
    }
}
