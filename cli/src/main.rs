use std::fs::File;
use std::io::{self, Read, Write};
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use inspector::{InspectorConfig, InspectorModel, OfflineClient, PropertiesProvider, PropertyTable, ViewNode};
use protocol::{Command as WireCommand, Property, PropertyEvent, PropertyType, Resource, StringEntry};
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("invalid configuration: {0}")]
    Config(#[from] inspector::ConfigError),
    #[error("invalid log filter: {0}")]
    LogFilter(#[from] tracing_subscriber::filter::ParseError),
    #[error("failed to {action} {path}: {source}")]
    Io {
        action: &'static str,
        path: String,
        source: io::Error,
    },
    #[error("event decode failed: {0}")]
    Decode(#[from] protocol::CodecError),
    #[error("invalid JSON output: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "inspector-cli", about = "Layout inspector property decoding CLI")]
struct Cli {
    /// Namespace of the inspected module; its resources print without a prefix.
    /// Falls back to `INSPECTOR_MODULE_NAMESPACE`.
    #[arg(long)]
    module_namespace: Option<String>,

    /// `tracing` filter directive for stderr logging. Falls back to `INSPECTOR_LOG`.
    #[arg(long)]
    log: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode a protobuf property event and print its property table.
    Decode {
        #[arg(long, default_value = "-", help = "Input file path, or - for stdin")]
        input: String,
        /// Draw id of the view the event was requested for.
        #[arg(long, allow_hyphen_values = true)]
        view_id: i64,
        #[arg(long, default_value = "android.view.View")]
        class_name: String,
        /// Display string of the view's layout, e.g. `@layout/activity_main`.
        #[arg(long)]
        layout: Option<String>,
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Print the encoded GET_PROPERTIES command for a view as hex.
    Request {
        #[arg(long, allow_hyphen_values = true)]
        view_id: i64,
    },
    /// Write an example property event in protobuf form.
    Sample {
        #[arg(long, default_value = "-", help = "Output file path, or - for stdout")]
        output: String,
        #[arg(long, default_value_t = 1, allow_hyphen_values = true)]
        view_id: i64,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let config = InspectorConfig::from_env_with(cli.module_namespace.as_deref(), cli.log.as_deref())?;
    init_tracing(&config)?;

    match cli.command {
        Command::Decode {
            input,
            view_id,
            class_name,
            layout,
            format,
        } => {
            let mut view = ViewNode::new(view_id, class_name);
            view.layout = layout;
            run_decode(&config, &input, &view, format)
        }
        Command::Request { view_id } => {
            println!("{}", to_hex(&protocol::encode_command(&WireCommand::get_properties(view_id))));
            Ok(())
        }
        Command::Sample { output, view_id } => run_sample(&output, view_id),
    }
}

fn init_tracing(config: &InspectorConfig) -> Result<(), CliError> {
    let filter = EnvFilter::try_new(&config.log_filter)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
    Ok(())
}

fn run_decode(config: &InspectorConfig, input: &str, view: &ViewNode, format: Format) -> Result<(), CliError> {
    let bytes = read_input(input)?;
    let event = protocol::decode_event(&bytes)?;
    tracing::info!(
        view_id = event.view_id,
        strings = event.strings.len(),
        properties = event.properties.len(),
        "decoded property event"
    );
    if view.draw_id != Some(event.view_id) {
        tracing::warn!(requested = ?view.draw_id, received = event.view_id, "event belongs to another view");
    }

    let model = InspectorModel::new(config.module_namespace.clone(), Arc::new(OfflineClient));
    model.add_view(view.clone());
    let provider = PropertiesProvider::new(model);
    let table = provider.decode_for(&event, view);

    match format {
        Format::Text => print!("{}", render_text(&table)),
        Format::Json => println!("{}", serde_json::to_string_pretty(&*table)?),
    }
    Ok(())
}

fn run_sample(output: &str, view_id: i64) -> Result<(), CliError> {
    let bytes = protocol::encode_event(&sample_event(view_id));
    if output == "-" {
        io::stdout()
            .write_all(&bytes)
            .map_err(|source| io_error("write", output, source))
    } else {
        File::create(output)
            .and_then(|mut file| file.write_all(&bytes))
            .map_err(|source| io_error("write", output, source))
    }
}

fn read_input(input: &str) -> Result<Vec<u8>, CliError> {
    let mut bytes = Vec::new();
    let result = if input == "-" {
        io::stdin().read_to_end(&mut bytes)
    } else {
        File::open(input).and_then(|mut file| file.read_to_end(&mut bytes))
    };
    result.map_err(|source| io_error("read", input, source))?;
    Ok(bytes)
}

fn io_error(action: &'static str, path: &str, source: io::Error) -> CliError {
    CliError::Io {
        action,
        path: path.to_owned(),
        source,
    }
}

/// One line per property: `name = value`, with a `*` for declared values and
/// the source resource in brackets.
fn render_text(table: &PropertyTable) -> String {
    let mut out = String::new();
    for item in table {
        let marker = if item.declared { "*" } else { " " };
        let value = item.value.as_deref().unwrap_or("<null>");
        out.push_str(&format!("{marker} {} = {value}", item.name));
        if let Some(source) = &item.source {
            out.push_str(&format!("  [{source}]"));
        }
        out.push('\n');
    }
    out
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{byte:02x}")).collect()
}

/// A small event for `view_id`: one declared string, one inherited boolean,
/// a resource reference and an unset integer.
fn sample_event(view_id: i64) -> PropertyEvent {
    let layout = Resource::new(4, 5, 6);
    PropertyEvent {
        view_id,
        layout: Some(layout),
        strings: vec![
            StringEntry::new(1, "android"),
            StringEntry::new(2, "width"),
            StringEntry::new(3, "wrap_content"),
            StringEntry::new(4, "com.example"),
            StringEntry::new(5, "layout"),
            StringEntry::new(6, "activity_main"),
            StringEntry::new(7, "enabled"),
            StringEntry::new(8, "text"),
            StringEntry::new(9, "string"),
            StringEntry::new(10, "app_name"),
            StringEntry::new(11, "minHeight"),
        ],
        properties: vec![
            Property {
                name: 2,
                r#type: PropertyType::String as i32,
                source: Some(layout),
                int32_value: Some(3),
                ..Default::default()
            },
            Property {
                name: 7,
                r#type: PropertyType::Boolean as i32,
                int32_value: Some(1),
                ..Default::default()
            },
            Property {
                name: 8,
                r#type: PropertyType::Resource as i32,
                source: Some(layout),
                resource_value: Some(Resource::new(4, 9, 10)),
                ..Default::default()
            },
            Property {
                name: 11,
                r#type: PropertyType::Int32 as i32,
                ..Default::default()
            },
        ],
    }
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
