use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde_json::{Map, Value, json};
use std::io::{self, BufRead, Write};
use std::process;

mod config;
mod context;
mod document;
mod error;
mod input;
mod mcp;
mod params;
mod policy;
mod registry;
mod schema;
mod tools;

use config::GlobalArgs;
use mcp::Dispatcher;
use mcp::contracts::{TOOL_EXTRACT_TEXT, TOOL_INSPECT_METADATA, TOOL_SUMMARIZE_STRUCTURE};

#[derive(Parser)]
#[command(name = "hwp-ops")]
#[command(
    version,
    about = "HWP document operations over MCP stdio and the command line"
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
#[command(
    group(
        clap::ArgGroup::new("input")
            .required(true)
            .multiple(false)
            .args(["path", "base64"])
    )
)]
struct InputArgs {
    /// Path to the HWP/HWPX file
    #[arg(long)]
    path: Option<String>,
    /// Base64-encoded HWP/HWPX bytes
    #[arg(long)]
    base64: Option<String>,
    /// Input format override
    #[arg(long, value_enum)]
    format: Option<FormatArg>,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Auto,
    Hwp,
    Hwpx,
}

impl FormatArg {
    fn as_str(self) -> &'static str {
        match self {
            FormatArg::Auto => "auto",
            FormatArg::Hwp => "hwp",
            FormatArg::Hwpx => "hwpx",
        }
    }
}

#[derive(Args, Clone)]
struct ExtractTextArgs {
    #[command(flatten)]
    input: InputArgs,
    /// Output JSON structuredContent
    #[arg(long)]
    json: bool,
    /// Maximum characters to return
    #[arg(long)]
    max_chars: Option<u64>,
    /// Preserve newline characters (true/false)
    #[arg(long)]
    include_newlines: Option<bool>,
    /// Normalize whitespace (true/false)
    #[arg(long)]
    normalize_whitespace: Option<bool>,
}

#[derive(Args, Clone)]
struct InspectMetadataArgs {
    #[command(flatten)]
    input: InputArgs,
    /// Output JSON structuredContent
    #[arg(long)]
    json: bool,
}

#[derive(Args, Clone)]
struct SummarizeStructureArgs {
    #[command(flatten)]
    input: InputArgs,
    /// Output JSON structuredContent
    #[arg(long)]
    json: bool,
    /// Maximum sections to return
    #[arg(long)]
    max_sections: Option<u64>,
    /// Maximum paragraphs per section
    #[arg(long)]
    max_paragraphs_per_section: Option<u64>,
    /// Preview character length
    #[arg(long)]
    preview_chars: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start MCP stdio server
    Serve {
        /// Serve MCP over stdio (NDJSON)
        #[arg(long)]
        stdio: bool,
    },
    /// Extract text from HWP inputs
    ExtractText(ExtractTextArgs),
    /// Inspect HWP metadata
    InspectMetadata(InspectMetadataArgs),
    /// Summarize document structure
    SummarizeStructure(SummarizeStructureArgs),
    /// Call any operation with JSON arguments
    Call {
        /// Operation name (case-insensitive)
        operation: String,
        /// Arguments object as JSON
        #[arg(long, default_value = "{}")]
        args: String,
    },
    /// Print synthesized output schemas
    Schema {
        /// Schema of a single operation
        #[arg(long, conflicts_with = "group")]
        operation: Option<String>,
        /// Union schema of every operation in a group
        #[arg(long)]
        group: Option<String>,
    },
    /// List enabled operations by group
    List,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    config::init_logging(&cli.global.log)?;

    let dispatcher = Dispatcher::new(cli.global.policy()).context("failed to build registry")?;

    match cli.command {
        Commands::Serve { stdio } => {
            if stdio {
                run_stdio_server(&dispatcher)
            } else {
                anyhow::bail!("only --stdio transport is supported")
            }
        }
        Commands::ExtractText(args) => run_extract_text(&dispatcher, args),
        Commands::InspectMetadata(args) => run_inspect_metadata(&dispatcher, args),
        Commands::SummarizeStructure(args) => run_summarize_structure(&dispatcher, args),
        Commands::Call { operation, args } => {
            let arguments: Value =
                serde_json::from_str(&args).context("--args must be valid JSON")?;
            let result = mcp::call_tool(&dispatcher, &operation, &arguments);
            print_tool_result(result, true)
        }
        Commands::Schema { operation, group } => run_schema(&dispatcher, operation, group),
        Commands::List => run_list(&dispatcher),
    }
}

fn run_extract_text(dispatcher: &Dispatcher, args: ExtractTextArgs) -> Result<()> {
    let mut map = build_input_args(&args.input);
    if let Some(max_chars) = args.max_chars {
        map.insert("max_chars".to_string(), json!(max_chars));
    }
    if let Some(include_newlines) = args.include_newlines {
        map.insert("include_newlines".to_string(), json!(include_newlines));
    }
    if let Some(normalize_whitespace) = args.normalize_whitespace {
        map.insert(
            "normalize_whitespace".to_string(),
            json!(normalize_whitespace),
        );
    }
    let result = mcp::call_tool(dispatcher, TOOL_EXTRACT_TEXT, &Value::Object(map));
    print_tool_result(result, args.json)
}

fn run_inspect_metadata(dispatcher: &Dispatcher, args: InspectMetadataArgs) -> Result<()> {
    let map = build_input_args(&args.input);
    let result = mcp::call_tool(dispatcher, TOOL_INSPECT_METADATA, &Value::Object(map));
    print_tool_result(result, args.json)
}

fn run_summarize_structure(dispatcher: &Dispatcher, args: SummarizeStructureArgs) -> Result<()> {
    let mut map = build_input_args(&args.input);
    if let Some(max_sections) = args.max_sections {
        map.insert("max_sections".to_string(), json!(max_sections));
    }
    if let Some(max_paragraphs_per_section) = args.max_paragraphs_per_section {
        map.insert(
            "max_paragraphs_per_section".to_string(),
            json!(max_paragraphs_per_section),
        );
    }
    if let Some(preview_chars) = args.preview_chars {
        map.insert("preview_chars".to_string(), json!(preview_chars));
    }
    let result = mcp::call_tool(dispatcher, TOOL_SUMMARIZE_STRUCTURE, &Value::Object(map));
    print_tool_result(result, args.json)
}

fn run_schema(
    dispatcher: &Dispatcher,
    operation: Option<String>,
    group: Option<String>,
) -> Result<()> {
    let schema = match (operation, group) {
        (Some(operation), _) => {
            if !dispatcher.is_enabled(&operation) {
                return Err(error::OpsError::Disabled(operation).into());
            }
            let handler = dispatcher.registry().get_handler(&operation)?;
            dispatcher
                .catalog()
                .operation_schema(handler.name())
                .cloned()
                .with_context(|| format!("no schema compiled for {}", handler.name()))?
        }
        (None, Some(group)) => {
            match dispatcher
                .catalog()
                .group_schema(dispatcher.registry(), &group)?
            {
                Some(schema) => schema,
                None => {
                    eprintln!("no operations in group: {group}");
                    process::exit(1);
                }
            }
        }
        (None, None) => {
            let mut all = Map::new();
            for handler in dispatcher.registry().handlers() {
                if !dispatcher.is_enabled(handler.name()) {
                    continue;
                }
                if let Some(schema) = dispatcher.catalog().operation_schema(handler.name()) {
                    all.insert(handler.name().to_string(), schema.clone());
                }
            }
            Value::Object(all)
        }
    };
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

fn run_list(dispatcher: &Dispatcher) -> Result<()> {
    let registry = dispatcher.registry();
    for group in registry.groups() {
        let names: Vec<&str> = registry
            .handlers_in_group(group)
            .into_iter()
            .map(|handler| handler.name())
            .filter(|name| dispatcher.is_enabled(name))
            .collect();
        if names.is_empty() {
            continue;
        }
        println!("{group}:");
        for name in names {
            println!("  {name}");
        }
    }
    Ok(())
}

fn build_input_args(input: &InputArgs) -> Map<String, Value> {
    let mut map = Map::new();
    if let Some(path) = &input.path {
        map.insert("path".to_string(), json!(path));
    }
    if let Some(base64) = &input.base64 {
        map.insert("base64".to_string(), json!(base64));
    }
    if let Some(format) = input.format {
        map.insert("format".to_string(), json!(format.as_str()));
    }
    map
}

fn print_tool_result(result: Value, json_output: bool) -> Result<()> {
    let is_error = result
        .get("isError")
        .and_then(|value| value.as_bool())
        .unwrap_or(false);

    if is_error {
        let message = result
            .get("structuredContent")
            .and_then(|value| value.get("error"))
            .and_then(|value| value.get("message"))
            .and_then(|value| value.as_str())
            .unwrap_or("tool error");
        eprintln!("{message}");
        process::exit(1);
    }

    if json_output {
        let structured = result
            .get("structuredContent")
            .cloned()
            .unwrap_or_else(|| json!({}));
        let output = serde_json::to_string_pretty(&structured)?;
        println!("{output}");
        return Ok(());
    }

    let text = result
        .get("content")
        .and_then(|value| value.as_array())
        .and_then(|arr| arr.first())
        .and_then(|value| value.get("text"))
        .and_then(|value| value.as_str())
        .unwrap_or("");
    println!("{text}");
    Ok(())
}

fn run_stdio_server(dispatcher: &Dispatcher) -> Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let reader = stdin.lock().lines();
    let mut writer = io::BufWriter::new(stdout.lock());

    tracing::info!("serving MCP over stdio");

    for line in reader {
        let line = line.context("failed to read stdin")?;
        if line.trim().is_empty() {
            continue;
        }

        let request: Value = match serde_json::from_str(&line) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(error = %err, "skipping unparsable request");
                continue;
            }
        };

        let method = request.get("method").and_then(|value| value.as_str());
        let id = request.get("id").cloned();
        let response = match (method, id) {
            (Some("initialize"), Some(id)) => Some(json!({
                "jsonrpc": "2.0",
                "id": id,
                "result": {
                    "protocolVersion": "2025-11-25",
                    "capabilities": {
                        "tools": {}
                    },
                    "serverInfo": {
                        "name": env!("CARGO_PKG_NAME"),
                        "version": env!("CARGO_PKG_VERSION")
                    }
                }
            })),
            (Some("tools/list"), Some(id)) => Some(json!({
                "jsonrpc": "2.0",
                "id": id,
                "result": {
                    "tools": mcp::tool_definitions(dispatcher)
                }
            })),
            (Some("tools/call"), Some(id)) => {
                let result = handle_tool_call(dispatcher, &request);
                Some(json!({
                    "jsonrpc": "2.0",
                    "id": id,
                    "result": result
                }))
            }
            (method, _) => {
                tracing::debug!(method = ?method, "ignoring message");
                None
            }
        };

        if let Some(response) = response {
            let serialized =
                serde_json::to_string(&response).context("failed to serialize response")?;
            writeln!(writer, "{serialized}").context("failed to write response")?;
            writer.flush().context("failed to flush response")?;
        }
    }

    Ok(())
}

fn handle_tool_call(dispatcher: &Dispatcher, request: &Value) -> Value {
    let params = request.get("params");
    let Some(params) = params.and_then(|value| value.as_object()) else {
        return mcp::error_result(
            &error::OpsError::validation("params", "params must be an object"),
            None,
        );
    };

    // A missing or non-string name resolves like an empty one: not found.
    let name = params
        .get("name")
        .and_then(|value| value.as_str())
        .unwrap_or_default();
    let args = params.get("arguments").cloned().unwrap_or(Value::Null);

    mcp::call_tool(dispatcher, name, &args)
}
