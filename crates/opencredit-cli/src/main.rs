//! opencredit CLI: pick a source location, get a dated creditor report.

use clap::{Args, Parser, Subcommand};
use opencredit_core::config::{OutputFormat, ReportConfig, SourceFormat};
use opencredit_exec::{Engine, ReportWorker, Stage};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "opencredit")]
#[command(about = "Open-order creditor report: joins open orders to cashiers and writes a dated spreadsheet", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the report next to the source tables
    Run {
        #[command(flatten)]
        source: SourceArgs,

        /// Report file format (overrides config)
        #[arg(long)]
        output_format: Option<OutputFormat>,

        /// Directory the report is written to (defaults to the source directory)
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Write a header row before the data
        #[arg(long)]
        header: bool,

        /// Write the run manifest as JSON to this path
        #[arg(long)]
        manifest: Option<PathBuf>,
    },

    /// Load and join without writing a report
    Check {
        #[command(flatten)]
        source: SourceArgs,
    },
}

#[derive(Args)]
struct SourceArgs {
    /// Source directory, or any file inside it (e.g. the database file)
    #[arg(short, long)]
    source: PathBuf,

    /// YAML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Source adapter (overrides config)
    #[arg(long)]
    format: Option<SourceFormat>,

    /// Status code that marks an order as open (overrides config)
    #[arg(long)]
    open_status: Option<String>,
}

/// Output-related flags; all optional so config values survive when unset.
#[derive(Default)]
struct OutputOverrides {
    format: Option<OutputFormat>,
    directory: Option<PathBuf>,
    header: bool,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            source,
            output_format,
            output_dir,
            header,
            manifest,
        } => {
            let overrides = OutputOverrides {
                format: output_format,
                directory: output_dir,
                header,
            };
            if let Err(e) = run_report(&source, overrides, manifest.as_deref()) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Check { source } => {
            if let Err(e) = check_source(&source) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    }
}

/// Logs go to stderr so stdout carries only the result lines.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env("OPENCREDIT_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run_report(
    args: &SourceArgs,
    output: OutputOverrides,
    manifest_path: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = load_config(args)?;
    apply_output_overrides(&mut config, output);

    let engine = Engine::new(config)?;
    let handle = ReportWorker::spawn(engine, args.source.clone())?;
    let manifest = handle.wait_with(|stage| {
        let name = match stage {
            Stage::Resolved => "resolved",
            Stage::Loaded => "loaded",
            Stage::Joined => "joined",
            Stage::Written => "written",
        };
        tracing::debug!(stage = name, "report progress");
    })?;

    if let Some(path) = &manifest.output_path {
        println!(
            "✓ Report written: {} ({} rows)",
            path.display(),
            manifest.rows_written
        );
    }
    if manifest.stats.missing_employee > 0 {
        println!(
            "  Skipped {} open orders with no matching employee",
            manifest.stats.missing_employee
        );
    }
    println!("  Duration: {}ms", manifest.duration_ms());

    if let Some(path) = manifest_path {
        fs::write(path, serde_json::to_string_pretty(&manifest)?)?;
        println!("  Manifest: {}", path.display());
    }
    Ok(())
}

fn check_source(args: &SourceArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(args)?;
    let engine = Engine::new(config)?;
    let (location, out) = engine.check(&args.source)?;

    println!("✓ Source is readable");
    println!("  Directory: {}", location.dir.display());
    println!("  Format: {:?}", location.format);
    println!("  Orders: {}", out.stats.orders_seen);
    println!("  Employees: {}", out.stats.employees_seen);
    println!("  Open orders: {}", out.stats.open_orders);
    println!("  Report rows: {}", out.table.len());
    println!("  Missing employee: {}", out.stats.missing_employee);
    println!("  Overwritten ids: {}", out.stats.overwritten);
    Ok(())
}

/// Defaults, then `OPENCREDIT_*` env vars, then the YAML file, then flags.
fn load_config(args: &SourceArgs) -> Result<ReportConfig, Box<dyn std::error::Error>> {
    let mut config = ReportConfig::from_env();
    if let Some(path) = &args.config {
        let doc = ReportConfig::from_yaml_file(path)?;
        config.apply_file_config(&doc);
    }
    apply_source_overrides(&mut config, args);
    Ok(config)
}

fn apply_source_overrides(config: &mut ReportConfig, args: &SourceArgs) {
    if let Some(format) = args.format {
        config.source.format = format;
    }
    if let Some(status) = &args.open_status {
        config.open_status = status.clone();
    }
}

fn apply_output_overrides(config: &mut ReportConfig, output: OutputOverrides) {
    if let Some(format) = output.format {
        config.output.format = format;
    }
    if let Some(dir) = output.directory {
        config.output.directory = Some(dir);
    }
    if output.header {
        config.output.include_header = true;
    }
}
