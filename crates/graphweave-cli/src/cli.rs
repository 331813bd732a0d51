//! Command-line interface for the graphweave utility
//!
//! Reads DOT, GDL/VCG or native diagram text and prints the parsed graph as
//! JSON.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use tracing::debug;

use graphweave::core::logging::init_logging;
use graphweave::plugins::Orchestrator;
use graphweave::{Format, Graph};

/// Graphweave - Parse graph description languages into one graph model
#[derive(Parser)]
#[command(name = "graphweave")]
#[command(about = "Parse Graphviz DOT, GDL/VCG and bracket/arrow diagrams into a common graph")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Set log level (trace|debug|info|warn|error)
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,

    /// Set log format (compact|pretty|json)
    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Log level options
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Log format options
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse input and print the graph as JSON
    Parse {
        /// Input file (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file for the JSON graph (use - for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Input format, detected from the content by default
        #[arg(long, value_enum, default_value_t = FormatChoice::Auto)]
        format: FormatChoice,

        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Detect the format of the input
    Detect {
        /// Input file to analyze (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Show supported input formats
    Formats {
        /// Show in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Check that the input parses
    Validate {
        /// Input file to validate (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Input format, detected from the content by default
        #[arg(long, value_enum, default_value_t = FormatChoice::Auto)]
        format: FormatChoice,
    },
}

/// Input format selection
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq, Default)]
pub enum FormatChoice {
    /// Detect from the content
    #[default]
    Auto,
    /// Bracket/arrow diagram language
    Txt,
    /// Graphviz DOT
    Graphviz,
    /// GDL/VCG
    Gdl,
}

impl FormatChoice {
    /// The explicit format, `None` for auto-detection
    pub fn format(self) -> Option<Format> {
        match self {
            FormatChoice::Auto => None,
            FormatChoice::Txt => Some(Format::Txt),
            FormatChoice::Graphviz => Some(Format::Graphviz),
            FormatChoice::Gdl => Some(Format::Gdl),
        }
    }
}

/// One line of the `formats` listing
const FORMAT_DESCRIPTIONS: &[(Format, &str)] = &[
    (Format::Txt, "Bracket/arrow diagrams: [ A ] -> [ B ]"),
    (Format::Graphviz, "Graphviz DOT graphs and digraphs"),
    (Format::Gdl, "GDL/VCG graph descriptions"),
];

/// Main CLI application
pub struct GraphweaveApp {
    orchestrator: Orchestrator,
}

impl GraphweaveApp {
    /// Create a new application instance with all parsers registered
    pub fn new() -> Self {
        Self {
            orchestrator: Orchestrator::with_all_plugins(),
        }
    }

    /// Run the application with the given CLI arguments
    pub fn run(&self, cli: Cli) -> Result<()> {
        // Environment variables take precedence over the flag defaults
        let log_level = std::env::var("GRAPHWEAVE_LOG_LEVEL")
            .ok()
            .or_else(|| std::env::var("RUST_LOG").ok())
            .unwrap_or_else(|| cli.log_level.as_str().to_string());
        let log_format = std::env::var("GRAPHWEAVE_LOG_FORMAT")
            .ok()
            .unwrap_or_else(|| cli.log_format.as_str().to_string());

        if let Err(e) = init_logging(Some(&log_level), Some(&log_format)) {
            eprintln!("Warning: Failed to initialize logging: {}", e);
        }

        if cli.verbose {
            eprintln!("Graphweave v{}", env!("CARGO_PKG_VERSION"));
        }

        match cli.command {
            Commands::Parse {
                input,
                output,
                format,
                pretty,
            } => self.parse_command(input, output, format, pretty, cli.verbose),
            Commands::Detect { input } => self.detect_command(input, cli.verbose),
            Commands::Formats { json } => self.formats_command(json),
            Commands::Validate { input, format } => {
                self.validate_command(input, format, cli.verbose)
            }
        }
    }

    /// Resolve the format and parse `content`
    fn parse_content(&self, content: &str, choice: FormatChoice) -> Result<(Format, Graph)> {
        let format = choice
            .format()
            .unwrap_or_else(|| self.orchestrator.detect_format(content));
        debug!(%format, "Parsing input");
        let graph = self
            .orchestrator
            .parse_as(content, format)
            .map_err(|e| anyhow!("Invalid {} input: {}", format, e))?;
        Ok((format, graph))
    }

    /// Handle the parse command
    fn parse_command(
        &self,
        input: Option<PathBuf>,
        output: Option<PathBuf>,
        format: FormatChoice,
        pretty: bool,
        verbose: bool,
    ) -> Result<()> {
        let content = self.read_input(input)?;

        if verbose {
            eprintln!("Read {} bytes of input", content.len());
        }

        let (format, graph) = self.parse_content(&content, format)?;

        if verbose {
            eprintln!(
                "Parsed {} input: {} nodes, {} edges, {} groups",
                format,
                graph.node_count(),
                graph.edge_count(),
                graph.group_count()
            );
        }

        let json = if pretty {
            serde_json::to_string_pretty(&graph)
        } else {
            serde_json::to_string(&graph)
        }
        .context("Failed to serialize graph")?;

        self.write_output(output, &json)
    }

    /// Handle the detect command
    fn detect_command(&self, input: Option<PathBuf>, verbose: bool) -> Result<()> {
        let content = self.read_input(input)?;

        if verbose {
            eprintln!("Read {} bytes of input", content.len());
        }

        println!("{}", self.orchestrator.detect_format(&content));
        Ok(())
    }

    /// Handle the formats command
    fn formats_command(&self, json: bool) -> Result<()> {
        let supported = self.orchestrator.detectors();

        if json {
            let formats: Vec<_> = FORMAT_DESCRIPTIONS
                .iter()
                .filter(|(format, _)| supported.contains(format))
                .map(|(format, description)| {
                    serde_json::json!({
                        "name": format.as_str(),
                        "description": description,
                    })
                })
                .collect();
            let listing = serde_json::json!({
                "supported_formats": formats,
                "total": formats.len(),
            });
            println!("{}", serde_json::to_string_pretty(&listing)?);
        } else {
            println!("Supported input formats:");
            let mut total = 0;
            for (format, description) in FORMAT_DESCRIPTIONS {
                if supported.contains(format) {
                    println!("  {:<9} - {}", format.as_str(), description);
                    total += 1;
                }
            }
            println!();
            println!("Total: {} formats supported", total);
        }

        Ok(())
    }

    /// Handle the validate command
    fn validate_command(
        &self,
        input: Option<PathBuf>,
        format: FormatChoice,
        verbose: bool,
    ) -> Result<()> {
        let content = self.read_input(input)?;

        if verbose {
            eprintln!("Read {} bytes of input", content.len());
        }

        match self.parse_content(&content, format) {
            Ok((format, graph)) => {
                println!(
                    "✓ Valid {} input: {} nodes, {} edges, {} groups",
                    format,
                    graph.node_count(),
                    graph.edge_count(),
                    graph.group_count()
                );
                Ok(())
            }
            Err(e) => {
                println!("✗ {}", e);
                Err(e)
            }
        }
    }

    /// Read input from file or stdin
    pub fn read_input(&self, input: Option<PathBuf>) -> Result<String> {
        match input {
            Some(path) if path.to_string_lossy() != "-" => fs::read_to_string(&path)
                .map_err(|e| anyhow!("Failed to read input file '{}': {}", path.display(), e)),
            _ => {
                let mut content = String::new();
                io::stdin()
                    .read_to_string(&mut content)
                    .context("Failed to read stdin")?;
                Ok(content)
            }
        }
    }

    /// Write output to file or stdout
    pub fn write_output(&self, output: Option<PathBuf>, content: &str) -> Result<()> {
        match output {
            Some(path) if path.to_string_lossy() != "-" => {
                fs::write(&path, content).map_err(|e| {
                    anyhow!("Failed to write output file '{}': {}", path.display(), e)
                })?;
            }
            _ => {
                let mut stdout = io::stdout().lock();
                stdout.write_all(content.as_bytes())?;
                if !content.is_empty() && !content.ends_with('\n') {
                    stdout.write_all(b"\n")?;
                }
                stdout.flush()?;
            }
        }
        Ok(())
    }
}

impl Default for GraphweaveApp {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_cli_parsing_parse_command() {
        let args = vec![
            "graphweave",
            "parse",
            "--input",
            "map.dot",
            "--output",
            "map.json",
            "--format",
            "graphviz",
            "--pretty",
        ];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Parse {
                input,
                output,
                format,
                pretty,
            } => {
                assert_eq!(input.unwrap().to_string_lossy(), "map.dot");
                assert_eq!(output.unwrap().to_string_lossy(), "map.json");
                assert_eq!(format, FormatChoice::Graphviz);
                assert!(pretty);
            }
            _ => panic!("Expected Parse command"),
        }
    }

    #[test]
    fn test_cli_parsing_defaults() {
        let cli = Cli::try_parse_from(["graphweave", "parse"]).unwrap();
        assert_eq!(cli.log_level, LogLevel::Warn);
        assert_eq!(cli.log_format, LogFormat::Compact);
        match cli.command {
            Commands::Parse { input, format, pretty, .. } => {
                assert!(input.is_none());
                assert_eq!(format, FormatChoice::Auto);
                assert!(!pretty);
            }
            _ => panic!("Expected Parse command"),
        }
    }

    #[test]
    fn test_cli_parsing_global_flags() {
        let args = vec![
            "graphweave",
            "--verbose",
            "--log-level",
            "trace",
            "--log-format",
            "json",
            "detect",
        ];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.log_level, LogLevel::Trace);
        assert_eq!(cli.log_format, LogFormat::Json);
    }

    #[test]
    fn test_cli_parsing_formats_and_validate() {
        let cli = Cli::try_parse_from(["graphweave", "formats", "--json"]).unwrap();
        assert!(matches!(cli.command, Commands::Formats { json: true }));

        let cli = Cli::try_parse_from(["graphweave", "validate", "-i", "-", "--format", "gdl"])
            .unwrap();
        match cli.command {
            Commands::Validate { input, format } => {
                assert_eq!(input.unwrap().to_string_lossy(), "-");
                assert_eq!(format, FormatChoice::Gdl);
            }
            _ => panic!("Expected Validate command"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["graphweave", "parse", "--format", "mermaid"]).is_err());
    }

    #[test]
    fn test_format_choice_mapping() {
        assert_eq!(FormatChoice::Auto.format(), None);
        assert_eq!(FormatChoice::Txt.format(), Some(Format::Txt));
        assert_eq!(FormatChoice::Graphviz.format(), Some(Format::Graphviz));
        assert_eq!(FormatChoice::Gdl.format(), Some(Format::Gdl));
    }

    #[test]
    fn test_parse_content_detects_and_overrides() {
        let app = GraphweaveApp::new();
        let (format, graph) = app
            .parse_content("digraph { a -> b }", FormatChoice::Auto)
            .unwrap();
        assert_eq!(format, Format::Graphviz);
        assert_eq!(graph.edge_count(), 1);

        let (format, _) = app.parse_content("[ A ]", FormatChoice::Txt).unwrap();
        assert_eq!(format, Format::Txt);
    }

    #[test]
    fn test_parse_content_error_names_format() {
        let app = GraphweaveApp::new();
        let err = app
            .parse_content("digraph { a -> ", FormatChoice::Auto)
            .unwrap_err();
        assert!(err.to_string().starts_with("Invalid graphviz input"));
    }

    #[test]
    fn test_read_input_from_file() {
        let app = GraphweaveApp::new();
        let input = "[ A ] -> [ B ]";

        let dir = tempdir().unwrap();
        let file_path = dir.path().join("input.txt");
        fs::write(&file_path, input).unwrap();

        let content = app.read_input(Some(file_path)).unwrap();
        assert_eq!(content, input);
    }

    #[test]
    fn test_read_input_missing_file() {
        let app = GraphweaveApp::new();
        let dir = tempdir().unwrap();
        let err = app
            .read_input(Some(dir.path().join("missing.dot")))
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read input file"));
    }

    #[test]
    fn test_write_output_to_file() {
        let app = GraphweaveApp::new();
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("graph.json");

        app.write_output(Some(file_path.clone()), "{}").unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "{}");
    }

    #[test]
    fn test_formats_command() {
        let app = GraphweaveApp::new();
        assert!(app.formats_command(true).is_ok());
        assert!(app.formats_command(false).is_ok());
    }
}
