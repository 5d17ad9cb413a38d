//! edifact-inbound CLI - deserialise registration interchanges to JSON
//!
//! Reads an interchange from a file or stdin, deserialises it with an optional
//! YAML parser configuration and writes the tree to stdout.

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;

use edifact_inbound::serialization::{write_interchange, OutputFormat};
use edifact_inbound::{validate, Deserialiser, Interchange, ParseMode, ParserConfig};

#[derive(Parser)]
#[command(name = "edifact-inbound")]
#[command(version, about = "Deserialise EDIFACT registration interchanges", long_about = None)]
struct Cli {
    /// Default log filter when LOG_LEVEL and RUST_LOG are unset
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Correlation id attached to every log line of this run (default: random)
    #[arg(long, global = true)]
    correlation_id: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Deserialise an interchange and print it
    Parse {
        #[command(flatten)]
        input: InputArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: Format,
    },

    /// Deserialise an interchange and check its trailer counts
    Validate {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Load and validate a parser configuration file
    CheckConfig {
        /// Path to the YAML configuration
        config: PathBuf,
    },
}

#[derive(clap::Args)]
struct InputArgs {
    /// Interchange file, or `-` for stdin
    #[arg(default_value = "-")]
    input: PathBuf,

    /// YAML parser configuration (default: built-in registration layout)
    #[arg(short, long, env = "EDIFACT_CONFIG")]
    config: Option<PathBuf>,

    /// Reject unterminated messages and interchanges instead of dropping them
    #[arg(short, long)]
    strict: bool,

    /// Treat every input line as one segment instead of splitting on the terminator
    #[arg(long)]
    lines: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Ndjson,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Json => OutputFormat::Json,
            Format::Ndjson => OutputFormat::Ndjson,
        }
    }
}

fn main() {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    edifact_inbound::logging::init(&cli.log_level);

    let correlation_id = cli
        .correlation_id
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let span = tracing::info_span!("run", correlation_id = %correlation_id);
    let _guard = span.enter();

    let result = match cli.command {
        Commands::Parse { input, format } => parse(input, format.into(), &correlation_id),
        Commands::Validate { input } => validate_interchange(input),
        Commands::CheckConfig { config } => check_config(config),
    };

    if let Err(e) = result {
        tracing::error!("{}", e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Deserialise the input and write it to stdout
fn parse(input: InputArgs, format: OutputFormat, correlation_id: &str) -> Result<(), String> {
    let interchange = deserialise(&input)?;

    let stdout = io::stdout();
    write_interchange(stdout.lock(), &interchange, format, Some(correlation_id))
        .map_err(|e| format!("Failed to write output: {}", e))
}

/// Deserialise the input and report trailer count mismatches
fn validate_interchange(input: InputArgs) -> Result<(), String> {
    let interchange = deserialise(&input)?;
    let report = validate(&interchange);

    if report.is_valid() {
        println!(
            "✅ {} messages, {} transactions, trailer counts match",
            interchange.messages().len(),
            interchange.transaction_count()
        );
        return Ok(());
    }

    for fault in report.faults() {
        println!("  ✗ {}", fault);
    }
    Err(format!("{} structural faults", report.faults().len()))
}

/// Load a configuration file and print a summary
fn check_config(path: PathBuf) -> Result<(), String> {
    println!("🔍 Checking configuration {}...", path.display());

    let config = ParserConfig::load_from_file(&path).map_err(|e| e.to_string())?;

    println!("  ✓ mode: {:?}", config.mode);
    for (role, tag) in config.tags.entries() {
        match role.record_kind() {
            Some(kind) => println!("  ✓ {} -> {} ({} fields)", tag, kind, config.schemas.get(kind).len()),
            None => println!("  ✓ {} -> {:?} (boundary only)", tag, role),
        }
    }

    println!("✅ Configuration is valid!");
    Ok(())
}

fn deserialise(input: &InputArgs) -> Result<Interchange, String> {
    let mut config = match &input.config {
        Some(path) => {
            tracing::info!("Loading parser configuration from {}", path.display());
            ParserConfig::load_from_file(path).map_err(|e| e.to_string())?
        }
        None => ParserConfig::default(),
    };
    if input.strict {
        config.mode = ParseMode::Strict;
    }

    let text = read_input(&input.input)?;
    let deserialiser = Deserialiser::new(config);

    let result = if input.lines {
        let lines: Vec<&str> = text.lines().collect();
        deserialiser.convert(&lines)
    } else {
        deserialiser.convert_text(&text)
    };

    result
        .map_err(|e| format!("Failed to deserialise {}: {}", input.input.display(), e))?
        .ok_or_else(|| format!("No complete interchange in {}", input.input.display()))
}

fn read_input(path: &Path) -> Result<String, String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .map_err(|e| format!("Failed to read stdin: {}", e))?;
        return Ok(text);
    }

    fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path.display(), e))
}
