// ordermart CLI - consolidate two order stores into the reporting warehouse

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use ordermart_cli::exit_codes::{
    outcome_exit_code, EXIT_CONFIG_INVALID, EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE,
};
use ordermart_cli::{run_pipeline, Level, PipelineReport};
use ordermart_config::EtlConfig;
use ordermart_io::{FileSource, OrderSource, ServerSource, SqliteWarehouse};

#[derive(Parser)]
#[command(name = "ordermart")]
#[command(about = "Extract, merge and model order records into a star-schema warehouse")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Log debug detail (loader stage transitions, per-source rows)
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full extract, transform and load pipeline
    #[command(after_help = "\
Examples:
  ordermart run
  ordermart run --config etl.toml --json
  ordermart run --export-csv orders.csv
  RUST_LOG=ordermart_io=debug ordermart run")]
    Run {
        /// Config file (defaults to <config dir>/ordermart/etl.toml)
        #[arg(long, short = 'c', env = "ORDERMART_CONFIG")]
        config: Option<PathBuf>,

        /// Print the run report as JSON on stdout
        #[arg(long)]
        json: bool,

        /// Also write the denormalized fact table to this CSV file
        #[arg(long, value_name = "PATH")]
        export_csv: Option<PathBuf>,
    },

    /// Check a config file without touching any database
    #[command(after_help = "\
Examples:
  ordermart validate
  ordermart validate --config etl.toml")]
    Validate {
        /// Config file (defaults to <config dir>/ordermart/etl.toml)
        #[arg(long, short = 'c', env = "ORDERMART_CONFIG")]
        config: Option<PathBuf>,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("ORDERMART_GIT_HASH"), ")",
        "\nengine:  ordermart-engine ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("ORDERMART_TARGET"),
    )
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Run { config, json, export_csv } => cmd_run(config, json, export_csv),
        Commands::Validate { config } => cmd_validate(config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

/// Logs go to stderr so `--json` stdout stays a single document.
fn init_tracing(verbose: bool, quiet: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else if quiet {
        EnvFilter::new("warn")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

// ============================================================================
// config
// ============================================================================

fn load_config(path: Option<PathBuf>) -> Result<(PathBuf, EtlConfig), CliError> {
    let explicit = path.is_some();
    let path = path.unwrap_or_else(EtlConfig::default_path);

    match EtlConfig::load(&path) {
        Ok(config) => Ok((path, config)),
        Err(e) => {
            let err = CliError::new(EXIT_CONFIG_INVALID, e.to_string());
            Err(if explicit {
                err
            } else {
                err.with_hint(format!(
                    "create {} or pass --config / ORDERMART_CONFIG",
                    path.display()
                ))
            })
        }
    }
}

// ============================================================================
// validate
// ============================================================================

fn cmd_validate(config: Option<PathBuf>) -> Result<(), CliError> {
    let (path, config) = load_config(config)?;

    eprintln!("config ok: {}", path.display());
    report_target("source_a", &config.source_a.db_path());
    report_target("source_b", &config.source_b.path);
    eprintln!("  warehouse  {}", config.warehouse.db_path().display());
    if config.pipeline.strict_sources {
        eprintln!("  strict_sources = true");
    }
    Ok(())
}

fn report_target(name: &str, path: &Path) {
    let state = if path.exists() { "" } else { "  (not found)" };
    eprintln!("  {name:<10} {}{state}", path.display());
}

// ============================================================================
// run
// ============================================================================

fn cmd_run(config: Option<PathBuf>, json: bool, export_csv: Option<PathBuf>) -> Result<(), CliError> {
    let (path, config) = load_config(config)?;
    tracing::info!(config = %path.display(), "starting run");

    let source_a = ServerSource::new(config.source_a.clone());
    let source_b = FileSource::new(config.source_b.clone());
    let sources: [&dyn OrderSource; 2] = [&source_a, &source_b];
    let mut warehouse = SqliteWarehouse::new(config.warehouse.clone());

    let report = run_pipeline(&sources, &mut warehouse, &config.pipeline);

    if let Some(csv_path) = &export_csv {
        export_fact(&report, csv_path)?;
    }

    if json {
        let out = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::new(EXIT_ERROR, format!("JSON serialization error: {e}")))?;
        println!("{out}");
    }

    print_summary(&report);

    if report.is_success() {
        return Ok(());
    }
    let message = report
        .diagnostics
        .iter()
        .rev()
        .find(|d| d.level == Level::Error)
        .map(|d| d.message.clone())
        .unwrap_or_else(|| "run did not complete".to_string());
    Err(CliError::new(outcome_exit_code(report.outcome), message))
}

fn export_fact(report: &PipelineReport, csv_path: &Path) -> Result<(), CliError> {
    let Some(star) = &report.schema else {
        tracing::warn!(path = %csv_path.display(), "nothing transformed, CSV export skipped");
        return Ok(());
    };

    let file = File::create(csv_path).map_err(|e| {
        CliError::new(EXIT_USAGE, format!("cannot create {}: {e}", csv_path.display()))
    })?;
    let rows = ordermart_io::export::write_fact_csv(&star.fact, BufWriter::new(file))
        .map_err(|e| CliError::new(EXIT_ERROR, format!("CSV export failed: {e}")))?;
    eprintln!("wrote {} ({rows} rows)", csv_path.display());
    Ok(())
}

/// Human summary to stderr.
fn print_summary(report: &PipelineReport) {
    for source in &report.sources {
        match &source.error {
            Some(err) => eprintln!("{}: 0 rows ({err})", source.source),
            None => eprintln!("{}: {} rows", source.source, source.rows),
        }
    }

    if let Some(star) = &report.star {
        let dim = |n: Option<usize>| n.map_or_else(|| "skipped".to_string(), |n| n.to_string());
        eprintln!(
            "star schema: {} facts, {} dates, {} employees, {} customers",
            star.fact,
            dim(star.dim_date),
            dim(star.dim_employee),
            dim(star.dim_customer),
        );
    }

    if let Some(s) = &report.summary {
        eprintln!(
            "delivery: {} delivered, {} not delivered ({:.1}% delivered)",
            s.delivered, s.not_delivered, s.delivery_rate,
        );
    }

    if let Some(load) = &report.load {
        let verified = load.tables.iter().filter(|t| t.is_verified()).count();
        eprintln!(
            "warehouse: {:?}, {} of {} tables verified",
            load.stage,
            verified,
            load.tables.len()
        );
    }
}
