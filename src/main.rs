use anyhow::Result;
use autohub_migrate::{run, MigrationConfig, NumberPolicy, RunOutcome, SourceOrder};
use clap::error::ErrorKind;
use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Export one AutoHub v1 account as an AutoHub v2 import file
#[derive(Parser, Debug)]
#[command(name = "autohub-migrate", version, about, long_about = None)]
struct Cli {
    /// Email address of the v1 account
    email: String,

    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON dump of the v1 store
    #[arg(long)]
    source: Option<PathBuf>,

    /// Export file to write
    #[arg(long)]
    output: Option<PathBuf>,

    /// Run log to append to
    #[arg(long)]
    log: Option<PathBuf>,

    /// Abort on unparseable numbers instead of writing 0
    #[arg(long)]
    strict_numbers: bool,

    /// Process records sorted by v1 id instead of store order
    #[arg(long)]
    sorted: bool,
}

/// What the command line asks for
#[derive(Debug)]
enum Invocation {
    Migrate(Cli),
    /// `--help` / `--version`: clap prints and exits
    Info(clap::Error),
    /// Wrong arguments: print this usage line and exit 0
    Usage(String),
}

fn parse_args(args: Vec<OsString>) -> Invocation {
    let program = args
        .first()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|| "autohub-migrate".to_string());

    match Cli::try_parse_from(args) {
        Ok(cli) => Invocation::Migrate(cli),
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            Invocation::Info(e)
        }
        Err(_) => Invocation::Usage(format!("Usage: {} <autohub v1 email>", program)),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = match parse_args(std::env::args_os().collect()) {
        Invocation::Migrate(cli) => cli,
        Invocation::Info(e) => e.exit(),
        Invocation::Usage(usage) => {
            // Bad arguments are not treated as a failure
            println!("{}", usage);
            std::process::exit(0);
        }
    };

    if let Err(e) = migrate(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn migrate(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => MigrationConfig::load(path)?,
        None => MigrationConfig::default(),
    };

    // Override from CLI args
    if let Some(source) = cli.source {
        config.source_path = source;
    }
    if let Some(output) = cli.output {
        config.output_path = output;
    }
    if let Some(log) = cli.log {
        config.log_path = log;
    }
    if cli.strict_numbers {
        config.number_policy = NumberPolicy::Strict;
    }
    if cli.sorted {
        config.order = SourceOrder::SourceId;
    }

    // A failed run is reported in the log only; the exit status stays 0
    match run(&cli.email, &config)? {
        RunOutcome::Completed(stats) => tracing::info!("{}", stats.summary()),
        RunOutcome::Failed { stage, .. } => tracing::warn!(%stage, "migration failed"),
    }

    Ok(())
}
