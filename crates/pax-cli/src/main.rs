// crates/pax-cli/src/main.rs
// ============================================================================
// Module: PAX CLI Entry Point
// Description: Command dispatcher for converting, searching and validating trees.
// Purpose: Expose the pax-core codecs as a fail-closed command-line tool.
// Dependencies: clap, pax-config, pax-core, thiserror
// ============================================================================

//! ## Overview
//! The `pax` binary reads XML or JSON documents, converts between the two
//! forms, resolves slash-separated search paths and reports tree statistics.
//! Formats are inferred from file extensions unless given explicitly.
//! Configuration comes from `pax.toml` (see `pax-config`) and event records
//! go to the configured log sink. Security posture: inputs are untrusted and
//! are read under the configured size and depth limits.

// ============================================================================
// SECTION: Modules
// ============================================================================

#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use pax_config::LogSinkKind;
use pax_config::LoggingConfig;
use pax_config::PaxConfig;
use pax_core::Document;
use pax_core::DocumentFormat;
use pax_core::EventSink;
use pax_core::FileWriter;
use pax_core::LogSink;
use pax_core::NodeRef;
use pax_core::NoopSink;
use pax_core::PaxEvent;
use pax_core::io::format_of;
use pax_core::io::read_document;
use pax_core::json::to_json;
use pax_core::xml::to_xml;
use pax_core::xml::to_xml_lined;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Paths searched by the `demo` command; the first of each pair hits.
const DEMO_SEARCHES: [&str; 4] =
    ["/root/child1/child4/", "/root/child1/child5/", "./child1/child4/", "./child1/child5/"];

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "pax", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Config file path (defaults to `PAX_CONFIG` or ./pax.toml when present).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert a document between XML and JSON.
    Convert(ConvertCommand),
    /// Print the subtree found at a path.
    Search(SearchCommand),
    /// Parse a document and report its size.
    Validate(ValidateCommand),
    /// Build, write, re-read and search the sample tree.
    Demo(DemoCommand),
}

/// Document formats accepted on the command line.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
enum FormatArg {
    /// XML document.
    Xml,
    /// Self-describing JSON document.
    Json,
}

impl From<FormatArg> for DocumentFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Xml => Self::Xml,
            FormatArg::Json => Self::Json,
        }
    }
}

/// Arguments for `convert`.
#[derive(Args, Debug)]
struct ConvertCommand {
    /// Input document.
    #[arg(value_name = "INPUT")]
    input: PathBuf,
    /// Input format (inferred from the extension when omitted).
    #[arg(long, value_enum, value_name = "FORMAT")]
    from: Option<FormatArg>,
    /// Output format (inferred from --output, else the other format).
    #[arg(long, value_enum, value_name = "FORMAT")]
    to: Option<FormatArg>,
    /// Output file (defaults to stdout).
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,
    /// Emit XML without indentation or line breaks.
    #[arg(long, action = ArgAction::SetTrue, conflicts_with = "output")]
    lined: bool,
}

/// Arguments for `search`.
#[derive(Args, Debug)]
struct SearchCommand {
    /// Input document.
    #[arg(value_name = "INPUT")]
    input: PathBuf,
    /// Absolute (`/root/a`) or relative (`./a`) path.
    #[arg(value_name = "PATH")]
    path: String,
    /// Input format (inferred from the extension when omitted).
    #[arg(long, value_enum, value_name = "FORMAT")]
    from: Option<FormatArg>,
}

/// Arguments for `validate`.
#[derive(Args, Debug)]
struct ValidateCommand {
    /// Input document.
    #[arg(value_name = "INPUT")]
    input: PathBuf,
    /// Input format (inferred from the extension when omitted).
    #[arg(long, value_enum, value_name = "FORMAT")]
    from: Option<FormatArg>,
}

/// Arguments for `demo`.
#[derive(Args, Debug)]
struct DemoCommand {
    /// Directory receiving `root.xml`.
    #[arg(long, value_name = "DIR", default_value = ".")]
    output_dir: PathBuf,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&format!("pax {version}"))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    let context = Context::load(cli.config.as_deref())?;
    match command {
        Commands::Convert(command) => command_convert(&context, &command),
        Commands::Search(command) => command_search(&context, &command),
        Commands::Validate(command) => command_validate(&context, &command),
        Commands::Demo(command) => command_demo(&context, &command),
    }
}

/// Emits the top-level help message for the CLI.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(())
}

// ============================================================================
// SECTION: Context
// ============================================================================

/// Loaded configuration plus the event sink it selects.
struct Context {
    /// Validated configuration.
    config: PaxConfig,
    /// Destination of event records.
    sink: Box<dyn EventSink>,
}

impl Context {
    /// Loads configuration and opens the configured sink.
    fn load(path: Option<&Path>) -> CliResult<Self> {
        let config = PaxConfig::load(path)
            .map_err(|err| CliError::new(format!("Failed to load config: {err}")))?;
        let sink = build_sink(&config.logging)?;
        Ok(Self {
            config,
            sink,
        })
    }

    /// Returns the event sink.
    fn sink(&self) -> &dyn EventSink {
        &*self.sink
    }

    /// Returns a file writer using the configured options and sink.
    fn writer(&self) -> FileWriter<'_> {
        FileWriter::new()
            .with_xml_options(self.config.xml_options())
            .with_json_options(self.config.json_options())
            .with_sink(self.sink())
    }

    /// Reads `input` as `format` under the configured limits.
    fn read(&self, input: &Path, format: DocumentFormat) -> CliResult<Document> {
        read_document(input, format, self.config.read_limits(), self.sink()).map_err(|err| {
            CliError::new(format!("Failed to read {}: {err}", input.display()))
        })
    }

    /// Renders `node` as `format` and reports the generated document.
    fn render(&self, node: NodeRef<'_>, format: DocumentFormat, lined: bool) -> CliResult<String> {
        let text = match format {
            DocumentFormat::Xml if lined => to_xml_lined(node),
            DocumentFormat::Xml => to_xml(node, &self.config.xml_options()),
            DocumentFormat::Json => to_json(node, &self.config.json_options())
                .map_err(|err| CliError::new(format!("Failed to render json: {err}")))?,
        };
        self.sink().record(&PaxEvent::DocumentGenerated {
            format,
            nodes: node.subtree_size(),
            bytes: text.len(),
        });
        Ok(text)
    }
}

/// Builds the event sink selected by `logging`.
fn build_sink(logging: &LoggingConfig) -> CliResult<Box<dyn EventSink>> {
    match logging.sink {
        LogSinkKind::None => Ok(Box::new(NoopSink)),
        LogSinkKind::Stderr => Ok(Box::new(LogSink::new(std::io::stderr()))),
        LogSinkKind::File => {
            let path = logging.path.as_deref().map(str::trim).ok_or_else(|| {
                CliError::new("logging.path is required for the file sink".to_string())
            })?;
            let file = OpenOptions::new().create(true).append(true).open(path).map_err(|err| {
                CliError::new(format!("Failed to open log file {path}: {err}"))
            })?;
            Ok(Box::new(LogSink::new(file)))
        }
    }
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Executes the convert command.
fn command_convert(context: &Context, command: &ConvertCommand) -> CliResult<ExitCode> {
    let from = input_format(&command.input, command.from)?;
    let to = output_format(from, command.to, command.output.as_deref());
    if command.lined && to != DocumentFormat::Xml {
        return Err(CliError::new("--lined applies to xml output only".to_string()));
    }
    let document = context.read(&command.input, from)?;
    let root = document.root_node();
    if let Some(output) = &command.output {
        let writer = context.writer();
        let written = match to {
            DocumentFormat::Xml => writer.write_xml(root, output),
            DocumentFormat::Json => writer.write_json(root, output),
        }
        .map_err(|err| CliError::new(err.to_string()))?;
        write_stdout_line(&format!("wrote {}", written.display()))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }
    let text = context.render(root, to, command.lined)?;
    write_stdout_text(&text).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the search command.
fn command_search(context: &Context, command: &SearchCommand) -> CliResult<ExitCode> {
    let format = input_format(&command.input, command.from)?;
    let document = context.read(&command.input, format)?;
    let found = document.search(&command.path);
    context.sink().record(&PaxEvent::SearchResolved {
        path: command.path.clone(),
        found: found.is_some(),
    });
    let Some(node) = found else {
        return Err(CliError::new(format!("No node found at {}", command.path)));
    };
    let text = context.render(node, DocumentFormat::Xml, false)?;
    write_stdout_text(&text).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the validate command.
fn command_validate(context: &Context, command: &ValidateCommand) -> CliResult<ExitCode> {
    let format = input_format(&command.input, command.from)?;
    let document = context.read(&command.input, format)?;
    let counts = TreeCounts::of(document.root_node());
    write_stdout_line(&format!(
        "Valid {} document: {} nodes, {} attributes",
        format.as_str(),
        counts.nodes,
        counts.attributes
    ))
    .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the demo command.
fn command_demo(context: &Context, command: &DemoCommand) -> CliResult<ExitCode> {
    let document = demo_tree();
    let text = context.render(document.root_node(), DocumentFormat::Xml, false)?;
    write_stdout_text(&text).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    let written = context
        .writer()
        .write_xml_into(document.root_node(), &command.output_dir)
        .map_err(|err| CliError::new(err.to_string()))?;
    write_stdout_line(&format!("wrote {}", written.display()))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    let reread = context.read(&written, DocumentFormat::Xml)?;
    let reloaded = context.render(reread.root_node(), DocumentFormat::Xml, false)?;
    write_stdout_text(&reloaded).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    for path in DEMO_SEARCHES {
        let found = reread.search(path);
        context.sink().record(&PaxEvent::SearchResolved {
            path: path.to_string(),
            found: found.is_some(),
        });
        let outcome = found.and_then(|node| node.tag()).map_or("miss".to_string(), |tag| {
            format!("hit <{tag}>")
        });
        write_stdout_line(&format!("{path}: {outcome}"))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the input format from an explicit choice or the file extension.
fn input_format(input: &Path, explicit: Option<FormatArg>) -> CliResult<DocumentFormat> {
    explicit.map(DocumentFormat::from).or_else(|| format_of(input)).ok_or_else(|| {
        CliError::new(format!("Cannot infer the format of {}; pass --from", input.display()))
    })
}

/// Resolves the output format; converting defaults to the other format.
fn output_format(
    from: DocumentFormat,
    explicit: Option<FormatArg>,
    output: Option<&Path>,
) -> DocumentFormat {
    if let Some(format) = explicit {
        return format.into();
    }
    if let Some(format) = output.and_then(format_of) {
        return format;
    }
    match from {
        DocumentFormat::Xml => DocumentFormat::Json,
        DocumentFormat::Json => DocumentFormat::Xml,
    }
}

/// Node and attribute totals of a subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TreeCounts {
    /// Number of nodes.
    nodes: usize,
    /// Number of attributes over all nodes.
    attributes: usize,
}

impl TreeCounts {
    /// Counts the subtree rooted at `node` without recursion.
    fn of(node: NodeRef<'_>) -> Self {
        let mut counts = Self {
            nodes: 0,
            attributes: 0,
        };
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            counts.nodes += 1;
            counts.attributes += current.attributes().len();
            stack.extend(current.children().iter());
        }
        counts
    }
}

/// Builds the sample tree used by the demo command.
fn demo_tree() -> Document {
    let mut document = Document::new("root");
    let mut root = document.root_mut();
    root.add_child("child1");
    root.add_child("child2");
    root.add_child("child3");
    if let Some(mut child2) = root.child_mut("child2") {
        child2.attributes_mut().add("is", Some("active"));
    }
    if let Some(mut child3) = root.child_mut("child3") {
        child3.attributes_mut().add("is", Some("inactive"));
    }
    if let Some(mut child1) = root.child_mut("child1") {
        child1.add_child("child4");
        if let Some(mut child4) = child1.child_mut("child4") {
            child4.attributes_mut().add("is", Some("active"));
        }
    }
    document
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes rendered text to stdout, terminating it with a newline.
fn write_stdout_text(text: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(text.as_bytes())?;
    if !text.ends_with('\n') {
        stdout.write_all(b"\n")?;
    }
    stdout.flush()
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("Failed to write to {stream}: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
