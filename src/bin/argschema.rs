use argschema::{SchemaFormat, SchemaParser, SchemaSource, Value};

const CLI_SCHEMA: &str = include_str!("argschema.json");

fn main() {
    #[cfg(feature = "tracing_debug")]
    {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(std::io::stderr)
            .init();
    }

    let cli = build_or_exit(SchemaParser::builder(SchemaSource::Text(
        CLI_SCHEMA.to_string(),
    )));
    let arguments = match cli.parse() {
        Ok(arguments) => arguments,
        Err(error) => std::process::exit(error.exit_code()),
    };

    let format = match arguments.get_str("format") {
        Some("yaml") => SchemaFormat::Yaml,
        _ => SchemaFormat::Json,
    };
    let schema = arguments.get_str("schema").unwrap_or_default();
    let tokens: Vec<&str> = arguments
        .get_list("tokens")
        .unwrap_or_default()
        .iter()
        .filter_map(Value::as_str)
        .collect();

    let parser = build_or_exit(SchemaParser::builder(schema).format(format));
    let result = match parser.parse_tokens(&tokens) {
        Ok(result) => result,
        Err(error) => std::process::exit(error.exit_code()),
    };

    if arguments.get_bool("quiet") == Some(true) {
        return;
    }

    let rendered = if arguments.get_bool("compact") == Some(true) {
        serde_json::to_string(&result.to_json())
    } else {
        serde_json::to_string_pretty(&result.to_json())
    };

    match rendered {
        Ok(text) => println!("{text}"),
        Err(error) => {
            eprintln!("{error}");
            std::process::exit(1);
        }
    }
}

fn build_or_exit(builder: argschema::SchemaParserBuilder) -> SchemaParser {
    match builder.build() {
        Ok(parser) => parser,
        Err(error) => {
            eprintln!("{error}");
            std::process::exit(1);
        }
    }
}
