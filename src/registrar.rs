use argschema_engine::prelude::*;
use argschema_engine::{Action, ArgumentParser, Group, Nargs, Parameter, ValueType};
use serde_json::{Map, Value};

#[cfg(feature = "tracing_debug")]
use tracing::debug;

use crate::error::SchemaError;
use crate::schema::{
    expect_bool, expect_string, to_engine_value, ArgumentDefinition, GroupDefinition,
};

/// The spelling of the remainder sentinel in schema documents.
pub(crate) const REMAINDER_TOKEN: &str = "argparse.REMAINDER";

/// Register the `arguments` section of the schema document, in document order.
pub(crate) fn register_arguments(
    container: &mut impl ArgumentContainer,
    arguments: Map<String, Value>,
) -> Result<(), SchemaError> {
    register_members(container, arguments, "arguments")
}

/// Register the `groups` section of the schema document, creating each group before its members.
pub(crate) fn register_groups(
    parser: &mut ArgumentParser,
    groups: Map<String, Value>,
) -> Result<(), SchemaError> {
    for (name, value) in groups {
        let path = format!("groups.{name}");
        let GroupDefinition {
            arguments,
            mutually_exclusive,
            options,
        } = GroupDefinition::from_value(&path, value)?;
        let mut group = Group::new();
        let mut titled = false;

        for (key, value) in options {
            let invalid = |reason: String| SchemaError::InvalidGroup {
                group: name.clone(),
                reason: format!("option '{key}' {reason}"),
            };

            group = match key.as_str() {
                "title" => {
                    titled = true;
                    group.title(expect_string(value).map_err(invalid)?)
                }
                "description" => group.description(expect_string(value).map_err(invalid)?),
                "required" => group.required(expect_bool(value).map_err(invalid)?),
                _ => {
                    return Err(SchemaError::InvalidGroup {
                        group: name,
                        reason: format!("unsupported option '{key}'"),
                    });
                }
            };
        }

        // Engine errors name the group by its title, or generically when untitled.
        let within = |error: SchemaError| match error {
            SchemaError::InvalidGroup { reason, .. } => SchemaError::InvalidGroup {
                group: name.clone(),
                reason,
            },
            other => other,
        };

        #[cfg(feature = "tracing_debug")]
        {
            debug!("Registering group '{name}' (mutually exclusive: {mutually_exclusive}).");
        }

        let mut handle = if mutually_exclusive {
            parser
                .add_mutually_exclusive_group(group)
                .map_err(|e| within(e.into()))?
        } else {
            if !titled {
                group = group.title(name.clone());
            }

            parser
                .add_argument_group(group)
                .map_err(|e| within(e.into()))?
        };
        register_members(&mut handle, arguments, &format!("{path}.arguments")).map_err(within)?;
    }

    Ok(())
}

fn register_members(
    container: &mut impl ArgumentContainer,
    arguments: Map<String, Value>,
    path: &str,
) -> Result<(), SchemaError> {
    for (name, value) in arguments {
        let definition = ArgumentDefinition::from_value(&format!("{path}.{name}"), value)?;
        let parameter = parameter(&name, definition)?;

        #[cfg(feature = "tracing_debug")]
        {
            debug!("Registering argument {:?}.", parameter.names());
        }

        container.add_argument(parameter)?;
    }

    Ok(())
}

fn parameter(name: &str, definition: ArgumentDefinition) -> Result<Parameter, SchemaError> {
    let ArgumentDefinition { aliases, options } = definition;
    let mut parameter = Parameter::new(std::iter::once(name.to_string()).chain(aliases));

    for (key, value) in options {
        parameter = apply_option(parameter, &key, value).map_err(|reason| {
            SchemaError::invalid_option(format!("argument {name}"), format!("option '{key}' {reason}"))
        })?;
    }

    Ok(parameter)
}

fn apply_option(parameter: Parameter, key: &str, value: Value) -> Result<Parameter, String> {
    Ok(match key {
        "action" => parameter.action(
            expect_string(value)?
                .parse::<Action>()
                .map_err(|e| variant_reason(&e))?,
        ),
        "nargs" => parameter.nargs(nargs(value)?),
        "const" => parameter.constant(to_engine_value(value)?),
        "default" => parameter.default(to_engine_value(value)?),
        "type" => parameter.value_type(
            expect_string(value)?
                .parse::<ValueType>()
                .map_err(|e| variant_reason(&e))?,
        ),
        "choices" => match value {
            Value::Array(items) => parameter.choices(
                items
                    .into_iter()
                    .map(to_engine_value)
                    .collect::<Result<Vec<_>, String>>()?,
            ),
            other => return Err(format!("expected a sequence, got {other}")),
        },
        "required" => parameter.required(expect_bool(value)?),
        "help" => parameter.help(expect_string(value)?),
        "metavar" => parameter.metavar(expect_string(value)?),
        "dest" => parameter.dest(expect_string(value)?),
        "version" => parameter.version(expect_string(value)?),
        _ => return Err("is not supported".to_string()),
    })
}

fn nargs(value: Value) -> Result<Nargs, String> {
    match value {
        Value::String(text) if text == REMAINDER_TOKEN => Ok(Nargs::Remainder),
        Value::String(text) => text.parse::<Nargs>().map_err(|e| variant_reason(&e)),
        Value::Number(number) => number
            .as_u64()
            .and_then(|n| u8::try_from(n).ok())
            .map(Nargs::Precisely)
            .ok_or_else(|| format!("'{number}' is not a valid nargs")),
        other => Err(format!("expected a string or an integer, got {other}")),
    }
}

fn variant_reason(error: &impl std::fmt::Display) -> String {
    error.to_string().trim_end_matches('.').to_string()
}
