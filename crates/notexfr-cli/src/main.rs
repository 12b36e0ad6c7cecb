//! notexfr: Command-line tool for moving notes between services.
//!
//! Converts exports of the source service into import files for the target
//! service, and reconciles records already imported on both sides.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use notexfr_core::logging::{COMPONENT, ERROR_MSG, ITEM_COUNT, MATCHED_COUNT, SUBSYSTEM};
use notexfr_reconcile::{
    BackfillOptions, ConvertOptions, EnexOptions, MatchOptions, ReconcileConfig, Reconciler,
    SourceFiles,
};

#[derive(Parser)]
#[command(name = "notexfr")]
#[command(author, version, about = "Convert and reconcile note exports")]
#[command(propagate_version = true)]
struct Cli {
    /// Log decisions and report dropped or ambiguous matches
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to a TOML config file (default: <config dir>/notexfr/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile records already imported into the target service
    Backfill {
        #[command(subcommand)]
        command: BackfillCommands,
    },

    /// Convert a source export into a target import file
    Convert {
        #[command(subcommand)]
        command: ConvertCommands,
    },

    /// Inspect XML (ENEX) exports
    Enex {
        #[command(subcommand)]
        command: EnexCommands,
    },

    /// Print version information
    Version,
}

#[derive(Subcommand)]
enum BackfillCommands {
    /// Link target notes to source notes and add notebook references
    EnToSn {
        /// Target conversion file
        #[arg(long)]
        input_sn: PathBuf,

        #[command(flatten)]
        source: SourceArgs,

        /// Output file for backfilled notes (default: stdout)
        #[arg(long)]
        output_notes: Option<PathBuf>,
    },

    /// Pair target tags with source tags by name
    MatchTags {
        /// Target conversion file
        #[arg(long)]
        input_sn: PathBuf,

        /// Source tags export
        #[arg(long)]
        input_en_tags: PathBuf,

        /// Output file (default: stdout)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Pair target notes with source notes by creation time
    MatchNotes {
        /// Target conversion file
        #[arg(long)]
        input_sn: PathBuf,

        /// Source notes export
        #[arg(long)]
        input_en_notes: PathBuf,

        /// Output file (default: stdout)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Build target tags standing in for source notebooks
    Notebooks {
        /// Target conversion file
        #[arg(long)]
        input_sn: PathBuf,

        /// Source notebooks export
        #[arg(long)]
        input_en_notebooks: PathBuf,

        /// Output file (default: stdout)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Prefix for notebooks whose name is taken by a target tag
        #[arg(long)]
        conflict_prefix: Option<String>,
    },
}

#[derive(Subcommand)]
enum ConvertCommands {
    /// Convert an API export (JSON) into a target import file
    EdamToSn {
        #[command(flatten)]
        source: SourceArgs,

        /// Output file (default: stdout)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Convert an XML export (ENEX) into a target import file
    EnexToSn {
        /// ENEX file
        #[arg(short, long)]
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum EnexCommands {
    /// Dump the notes of an ENEX file as JSON
    ToJson {
        /// ENEX file
        #[arg(short, long)]
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the parsed notes of an ENEX file as Rust values
    Inspect {
        /// ENEX file
        #[arg(short, long)]
        input: PathBuf,

        /// One multi-line block per note
        #[arg(long)]
        pretty: bool,
    },
}

/// API export files, one per entity kind.
#[derive(Args)]
struct SourceArgs {
    /// Source notebooks export
    #[arg(long)]
    input_en_notebooks: PathBuf,

    /// Source notes export
    #[arg(long)]
    input_en_notes: PathBuf,

    /// Source tags export
    #[arg(long)]
    input_en_tags: PathBuf,
}

impl From<SourceArgs> for SourceFiles {
    fn from(args: SourceArgs) -> Self {
        Self {
            notebooks: args.input_en_notebooks,
            notes: args.input_en_notes,
            tags: args.input_en_tags,
        }
    }
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let _log_guard = init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let message = format!("{:#}", e);
            error!({ SUBSYSTEM } = "cli", { ERROR_MSG } = %message, "Command failed");
            eprintln!("Error: {}", message);
            ExitCode::FAILURE
        }
    }
}

/// Initialize tracing with configurable output.
///
/// Environment variables:
///   LOG_FORMAT  - "json" or "text" (default: "text")
///   LOG_FILE    - path to log file (optional, replaces console logging)
///   RUST_LOG    - standard env filter (default: "notexfr=info", or
///                 "notexfr=debug" with --verbose)
///
/// Console logs go to stderr; stdout is reserved for JSON output.
fn init_logging(verbose: bool) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();

    let default_filter = if verbose { "notexfr=debug" } else { "notexfr=info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    let registry = tracing_subscriber::registry().with(env_filter);

    let guard = if let Some(ref path) = log_file {
        let path = Path::new(path);
        let file_dir = path.parent().unwrap_or(Path::new("."));
        let file_name = path
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("notexfr.log");
        let file_appender = tracing_appender::rolling::never(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(tracing_subscriber::fmt::layer().json().with_writer(non_blocking))
                .init();
        } else {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(non_blocking)
                        .with_ansi(false),
                )
                .init();
        }
        Some(guard)
    } else {
        if log_format == "json" {
            registry
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        } else {
            registry
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
        None
    };

    debug!(
        log_format = %log_format,
        log_file = log_file.as_deref().unwrap_or("(stderr)"),
        "Logging initialized"
    );
    guard
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ReconcileConfig> {
    let config = ReconcileConfig::load_from(path).context("loading configuration")?;
    debug!(
        conflict_prefix = %config.conflict_prefix,
        match_timeout_secs = config.match_timeout_secs,
        backfill_timeout_secs = config.backfill_timeout_secs,
        convert_timeout_secs = config.convert_timeout_secs,
        "Configuration loaded"
    );
    Ok(config)
}

fn run(cli: Cli) -> anyhow::Result<()> {
    if let Commands::Version = cli.command {
        println!("notexfr {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Backfill { command } => cmd_backfill(command, config, cli.verbose),
        Commands::Convert { command } => cmd_convert(command, config, cli.verbose),
        Commands::Enex { command } => cmd_enex(command, config, cli.verbose),
        Commands::Version => Ok(()),
    }
}

fn cmd_backfill(
    command: BackfillCommands,
    mut config: ReconcileConfig,
    verbose: bool,
) -> anyhow::Result<()> {
    match command {
        BackfillCommands::EnToSn {
            input_sn,
            source,
            output_notes,
        } => {
            let out = Reconciler::new(config)
                .verbose(verbose)
                .backfill_notes(&BackfillOptions {
                    source: source.into(),
                    target: input_sn,
                    output: output_notes,
                })
                .context("backfilling notes")?;
            info!(
                { SUBSYSTEM } = "cli",
                { COMPONENT } = "backfill",
                { MATCHED_COUNT } = out.len(),
                "Backfilled notes"
            );
        }
        BackfillCommands::MatchTags {
            input_sn,
            input_en_tags,
            output,
        } => {
            let out = Reconciler::new(config)
                .verbose(verbose)
                .match_tags(&MatchOptions {
                    source: input_en_tags,
                    target: input_sn,
                    output,
                })
                .context("matching tags")?;
            info!(
                { SUBSYSTEM } = "cli",
                { COMPONENT } = "backfill",
                { MATCHED_COUNT } = out.len(),
                "Matched tags"
            );
        }
        BackfillCommands::MatchNotes {
            input_sn,
            input_en_notes,
            output,
        } => {
            let out = Reconciler::new(config)
                .verbose(verbose)
                .match_notes(&MatchOptions {
                    source: input_en_notes,
                    target: input_sn,
                    output,
                })
                .context("matching notes")?;
            info!(
                { SUBSYSTEM } = "cli",
                { COMPONENT } = "backfill",
                { MATCHED_COUNT } = out.len(),
                "Matched notes"
            );
        }
        BackfillCommands::Notebooks {
            input_sn,
            input_en_notebooks,
            output,
            conflict_prefix,
        } => {
            if let Some(prefix) = conflict_prefix {
                config.conflict_prefix = prefix;
                config.validate().context("invalid --conflict-prefix")?;
            }
            let out = Reconciler::new(config)
                .verbose(verbose)
                .reconcile_notebooks(&MatchOptions {
                    source: input_en_notebooks,
                    target: input_sn,
                    output,
                })
                .context("reconciling notebooks")?;
            info!(
                { SUBSYSTEM } = "cli",
                { COMPONENT } = "backfill",
                { ITEM_COUNT } = out.len(),
                "Reconciled notebooks"
            );
        }
    }
    Ok(())
}

fn cmd_convert(
    command: ConvertCommands,
    config: ReconcileConfig,
    verbose: bool,
) -> anyhow::Result<()> {
    let mut reconciler = Reconciler::new(config).verbose(verbose);
    let list = match command {
        ConvertCommands::EdamToSn { source, output } => reconciler
            .convert_edam(&ConvertOptions {
                source: source.into(),
                output,
            })
            .context("converting API export")?,
        ConvertCommands::EnexToSn { input, output } => reconciler
            .convert_enex(&EnexOptions { input, output })
            .context("converting ENEX export")?,
    };
    info!(
        { SUBSYSTEM } = "cli",
        { COMPONENT } = "convert",
        { ITEM_COUNT } = list.items.len(),
        "Converted items"
    );
    Ok(())
}

fn cmd_enex(
    command: EnexCommands,
    config: ReconcileConfig,
    verbose: bool,
) -> anyhow::Result<()> {
    match command {
        EnexCommands::ToJson { input, output } => {
            let notes = Reconciler::new(config)
                .verbose(verbose)
                .enex_to_json(&EnexOptions { input, output })
                .context("reading ENEX export")?;
            info!(
                { SUBSYSTEM } = "cli",
                { COMPONENT } = "enex",
                { ITEM_COUNT } = notes.len(),
                "Dumped ENEX notes"
            );
        }
        EnexCommands::Inspect { input, pretty } => {
            let rendered = Reconciler::new(config)
                .verbose(verbose)
                .inspect_enex(&input, pretty)
                .context("inspecting ENEX export")?;
            println!("{rendered}");
        }
    }
    Ok(())
}
