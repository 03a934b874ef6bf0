use terminal_size::{terminal_size, Width};

use crate::api::{Argument, Exclusion, Section};
use crate::constant::*;
use crate::model::{Nargs, Value};
use crate::parser::interface::{chunk, UserInterface};
use crate::parser::{ColumnRenderer, LeftWidth, MiddleWidth, PaddingWidth, TotalWidth};

const DEFAULT_TOTAL_WIDTH: usize = 80;
const MAIN_INDENT: usize = 2;
const PADDING_WIDTH: usize = 2;
const MAX_HELP_POSITION: usize = 24;
const DEFAULT_PLACEHOLDER: &str = "%(default)s";

#[derive(Debug)]
pub(crate) struct Printer {
    program: String,
    usage: Option<String>,
    description: Option<String>,
    epilog: Option<String>,
    arguments: Vec<Argument>,
    argument_default: Option<Value>,
    sections: Vec<Section>,
    exclusions: Vec<Exclusion>,
    terminal_width: Option<usize>,
}

impl Printer {
    #[cfg(test)]
    pub(crate) fn empty() -> Self {
        Self::new(
            "program".to_string(),
            None,
            None,
            None,
            Vec::default(),
            None,
            Vec::default(),
            Vec::default(),
            None,
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn terminal(
        program: String,
        usage: Option<String>,
        description: Option<String>,
        epilog: Option<String>,
        arguments: Vec<Argument>,
        argument_default: Option<Value>,
        sections: Vec<Section>,
        exclusions: Vec<Exclusion>,
    ) -> Self {
        let terminal_width = if let Some((Width(terminal_width), _)) = terminal_size() {
            Some(terminal_width as usize)
        } else {
            None
        };

        Self::new(
            program,
            usage,
            description,
            epilog,
            arguments,
            argument_default,
            sections,
            exclusions,
            terminal_width,
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        program: String,
        usage: Option<String>,
        description: Option<String>,
        epilog: Option<String>,
        arguments: Vec<Argument>,
        argument_default: Option<Value>,
        sections: Vec<Section>,
        exclusions: Vec<Exclusion>,
        terminal_width: Option<usize>,
    ) -> Self {
        Self {
            program,
            usage,
            description,
            epilog,
            arguments,
            argument_default,
            sections,
            exclusions,
            terminal_width,
        }
    }

    fn width(&self) -> usize {
        // Leave a margin, as argparse does.
        std::cmp::max(
            self.terminal_width
                .unwrap_or(DEFAULT_TOTAL_WIDTH)
                .saturating_sub(2),
            MAX_HELP_POSITION,
        )
    }

    fn substitute(&self, text: &str) -> String {
        text.replace(PROGRAM_PLACEHOLDER, &self.program)
    }

    pub(crate) fn print_help(&self, user_interface: &(impl UserInterface + ?Sized)) {
        let width = self.width();

        for line in self.usage_lines(width) {
            user_interface.print(line);
        }

        if let Some(description) = &self.description {
            user_interface.print("".to_string());

            for line in chunk(&self.substitute(description), width) {
                user_interface.print(line);
            }
        }

        let column_renderer = self.column_renderer(width);
        let mut sections: Vec<(String, Option<String>, Vec<&Argument>)> = vec![
            (
                POSITIONAL_TITLE.to_string(),
                None,
                self.arguments
                    .iter()
                    .filter(|a| a.section.is_none() && a.is_positional())
                    .collect(),
            ),
            (
                OPTIONS_TITLE.to_string(),
                None,
                self.arguments
                    .iter()
                    .filter(|a| a.section.is_none() && !a.is_positional())
                    .collect(),
            ),
        ];

        for (index, Section { title, description }) in self.sections.iter().enumerate() {
            sections.push((
                title.clone(),
                description.clone(),
                self.arguments
                    .iter()
                    .filter(|a| a.section == Some(index))
                    .collect(),
            ));
        }

        for (title, description, members) in sections {
            if members.is_empty() && description.is_none() {
                continue;
            }

            user_interface.print("".to_string());
            user_interface.print(format!("{title}:"));

            if let Some(description) = description {
                for line in chunk(
                    &self.substitute(&description),
                    width.saturating_sub(MAIN_INDENT),
                ) {
                    user_interface.print(format!("{:width$}{line}", "", width = MAIN_INDENT));
                }

                if !members.is_empty() {
                    user_interface.print("".to_string());
                }
            }

            if let Some(column_renderer) = &column_renderer {
                for argument in members {
                    let invocation = invocation(argument);
                    let help = self.help_text(argument);

                    if invocation.chars().count() <= column_renderer.left_width() {
                        for line in column_renderer.render(MAIN_INDENT, &invocation, &help) {
                            user_interface.print(line);
                        }
                    } else {
                        // The help moves to its own line(s) when the invocation is too wide.
                        user_interface.print(format!("{:width$}{invocation}", "", width = MAIN_INDENT));

                        if !help.is_empty() {
                            for line in column_renderer.render(MAIN_INDENT, "", &help) {
                                user_interface.print(line);
                            }
                        }
                    }
                }
            }
        }

        if let Some(epilog) = &self.epilog {
            user_interface.print("".to_string());

            for line in chunk(&self.substitute(epilog), width) {
                user_interface.print(line);
            }
        }
    }

    fn column_renderer(&self, width: usize) -> Option<ColumnRenderer> {
        if self.arguments.is_empty() {
            return None;
        }

        let max_help_position = std::cmp::min(
            MAX_HELP_POSITION,
            std::cmp::max(width.saturating_sub(20), MAIN_INDENT * 2),
        );
        let invocation_width = self
            .arguments
            .iter()
            .map(|a| invocation(a).chars().count())
            .max()
            .unwrap_or_default();
        let help_position = std::cmp::min(
            invocation_width + MAIN_INDENT + PADDING_WIDTH,
            max_help_position,
        );
        let help_width = self
            .arguments
            .iter()
            .map(|a| self.help_text(a).chars().count())
            .max()
            .unwrap_or_default();

        match (
            PaddingWidth::new(PADDING_WIDTH),
            LeftWidth::new(std::cmp::max(help_position - MAIN_INDENT - PADDING_WIDTH, 1)),
            MiddleWidth::new(std::cmp::max(help_width, 2) + MAIN_INDENT),
        ) {
            (Ok(padding), Ok(left), Ok(middle)) => Some(ColumnRenderer::guided(
                padding,
                left,
                middle,
                TotalWidth(width),
            )),
            _ => unreachable!("internal error - column widths are always within bounds"),
        }
    }

    fn help_text(&self, argument: &Argument) -> String {
        match &argument.help {
            Some(help) => {
                let mut help = self.substitute(help);

                if help.contains(DEFAULT_PLACEHOLDER) {
                    help = help.replace(DEFAULT_PLACEHOLDER, &self.default_of(argument).to_string());
                }

                help
            }
            None => String::default(),
        }
    }

    fn default_of(&self, argument: &Argument) -> Value {
        argument
            .default
            .clone()
            .or_else(|| self.argument_default.clone())
            .unwrap_or_else(|| match argument.action {
                crate::model::Action::StoreTrue => Value::Bool(false),
                crate::model::Action::StoreFalse => Value::Bool(true),
                _ => Value::None,
            })
    }

    fn usage_lines(&self, width: usize) -> Vec<String> {
        if let Some(usage) = &self.usage {
            return vec![format!("usage: {}", self.substitute(usage))];
        }

        let mut optional_parts = Vec::default();
        let mut positional_parts = Vec::default();
        let mut grouped: Vec<usize> = Vec::default();
        let ordered = self
            .arguments
            .iter()
            .filter(|a| !a.is_positional())
            .chain(self.arguments.iter().filter(|a| a.is_positional()));

        for argument in ordered {
            if grouped.contains(&argument.id) {
                continue;
            }

            let parts = if argument.is_positional() {
                &mut positional_parts
            } else {
                &mut optional_parts
            };

            match self
                .exclusions
                .iter()
                .find(|e| e.members.contains(&argument.id))
            {
                Some(exclusion) => {
                    let members: Vec<String> = exclusion
                        .members
                        .iter()
                        .filter_map(|id| self.arguments.iter().find(|a| a.id == *id))
                        .map(|a| usage_part(a, false))
                        .collect();
                    grouped.extend(exclusion.members.iter().copied());

                    if exclusion.required {
                        parts.push(format!("({})", members.join(" | ")));
                    } else {
                        parts.push(format!("[{}]", members.join(" | ")));
                    }
                }
                None => parts.push(usage_part(argument, true)),
            };
        }

        let prefix = format!("usage: {} ", self.program);
        let all: Vec<&String> = optional_parts.iter().chain(positional_parts.iter()).collect();
        let single = all
            .iter()
            .map(|part| part.as_str())
            .collect::<Vec<&str>>()
            .join(" ");

        if prefix.chars().count() + single.chars().count() <= width {
            return vec![format!("{prefix}{single}").trim_end().to_string()];
        }

        // Too long: the optionals and positionals each wrap onto aligned lines.
        let indent = prefix.chars().count();
        let mut lines = Vec::default();

        for parts in [&optional_parts, &positional_parts] {
            let mut current = String::default();

            for part in parts {
                if !current.is_empty()
                    && indent + current.chars().count() + 1 + part.chars().count() > width
                {
                    lines.push(current);
                    current = String::default();
                }

                if !current.is_empty() {
                    current.push(' ');
                }

                current.push_str(part);
            }

            if !current.is_empty() {
                lines.push(current);
            }
        }

        lines
            .into_iter()
            .enumerate()
            .map(|(i, line)| {
                if i == 0 {
                    format!("{prefix}{line}")
                } else {
                    format!("{:indent$}{line}", "")
                }
            })
            .collect()
    }
}

fn metavar(argument: &Argument) -> String {
    if let Some(metavar) = &argument.metavar {
        return metavar.clone();
    }

    if let Some(choices) = &argument.choices {
        return format!(
            "{{{}}}",
            choices
                .iter()
                .map(|c| c.to_string())
                .collect::<Vec<String>>()
                .join(",")
        );
    }

    if argument.is_positional() {
        argument.dest.clone()
    } else {
        argument.dest.to_uppercase()
    }
}

// The value grammar of an argument, ex: `FOO [FOO ...]`.
fn format_values(argument: &Argument) -> String {
    if !argument.action.takes_values() {
        return String::default();
    }

    let metavar = metavar(argument);

    match argument.nargs {
        None => metavar,
        Some(Nargs::Optional) => format!("[{metavar}]"),
        Some(Nargs::Any) => format!("[{metavar} ...]"),
        Some(Nargs::AtLeastOne) => format!("{metavar} [{metavar} ...]"),
        Some(Nargs::Remainder) => "...".to_string(),
        Some(Nargs::Precisely(n)) => (0..n)
            .map(|_| metavar.clone())
            .collect::<Vec<String>>()
            .join(" "),
    }
}

// How the argument shows in the help listing, ex: `-f FOO, --foo FOO`.
fn invocation(argument: &Argument) -> String {
    if argument.is_positional() {
        return metavar(argument);
    }

    let values = format_values(argument);

    if values.is_empty() {
        argument.flags().join(", ")
    } else {
        argument
            .flags()
            .iter()
            .map(|flag| format!("{flag} {values}"))
            .collect::<Vec<String>>()
            .join(", ")
    }
}

// How the argument shows in the usage line, ex: `[--foo FOO]`.
fn usage_part(argument: &Argument, bracketed: bool) -> String {
    if argument.is_positional() {
        let values = format_values(argument);

        // Exclusive positionals are always optional, so the brackets are redundant.
        if !bracketed && values.starts_with('[') && values.ends_with(']') && !values.contains(' ') {
            return values[1..values.len() - 1].to_string();
        }

        return values;
    }

    let flag = match argument.flags().first() {
        Some(flag) => flag.clone(),
        None => unreachable!("internal error - options always have a flag"),
    };
    let values = format_values(argument);
    let part = if values.is_empty() {
        flag
    } else {
        format!("{flag} {values}")
    };

    if bracketed && !argument.required {
        format!("[{part}]")
    } else {
        part
    }
}

/// Where, on the command line, a parse error occurred.
///
/// Displays the tokens with a caret underneath the offending position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    offset: usize,
    tokens: Vec<String>,
}

impl ErrorContext {
    pub(crate) fn new(offset: usize, tokens: &[&str]) -> Self {
        Self {
            offset,
            tokens: tokens.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl std::fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut tokens_length = 0;
        let mut projection = String::default();
        let mut projection_offset = 0;

        for (i, token) in self.tokens.iter().enumerate() {
            tokens_length += token.len();
            projection.push_str(token);

            if i + 1 < self.tokens.len() {
                projection.push(' ');

                if tokens_length <= self.offset {
                    projection_offset += 1;
                }
            }
        }

        write!(
            f,
            "{projection}\n{:width$}^",
            "",
            width = std::cmp::min(self.offset, tokens_length.saturating_sub(1)) + projection_offset
        )
    }
}
