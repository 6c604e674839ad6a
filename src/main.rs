//! CLI entry point for the stack height analysis tool.
//!
//! Loads the emissions inventory and SCC reference table named in a YAML
//! config, then charts and tabulates stack heights for every configured
//! analysis category, optionally grouped by design capacity.

use anyhow::{Context, Result};
use clap::Parser;
use stack_height_analysis::analysis::{
    STATISTICS_FILE, analyze_stack_heights, analyze_stack_heights_by_capacity, log_available_units,
};
use stack_height_analysis::config::AppConfig;
use stack_height_analysis::ingest::DataReader;
use stack_height_analysis::output::reset_file;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    filter::LevelFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "stack_height_analysis")]
#[command(about = "Analyze emission stack heights from an emissions inventory", long_about = None)]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: PathBuf,

    /// Also analyze stack heights binned by design capacity
    #[arg(long, default_value_t = false)]
    capacity: bool,

    /// Design capacity unit used by the capacity analysis
    #[arg(long, default_value = "MW")]
    target_unit: String,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/stack_height_analysis.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("stack_height_analysis.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("RUST_LOG")
                .from_env_lossy(),
        );

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::DEBUG.into())
                .with_env_var("RUST_LOG_JSON")
                .from_env_lossy(),
        );

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    run(&cli)
}

fn run(cli: &Cli) -> Result<()> {
    let config = AppConfig::load(&cli.config)?;
    let save_dir = &config.data.save_dir;
    std::fs::create_dir_all(save_dir)
        .with_context(|| format!("creating save directory {}", save_dir.display()))?;
    reset_file(&save_dir.join(STATISTICS_FILE))?;

    info!("Reading data");
    let mut reader = DataReader::new(
        &config.data.input_dir,
        &config.data.scc_dir,
        &config.data.scc_filename,
    );
    reader.log_directory_structure();
    reader
        .read_and_combine_data()
        .context("combining inventory files")?;
    reader
        .read_scc_data()
        .with_context(|| format!("reading SCC file {}", config.scc_path().display()))?;

    let scc = reader
        .scc()
        .context("SCC reference table was not loaded")?;
    match reader.combined() {
        Some(combined) => {
            let (rows, cols) = combined.shape();
            info!(rows, cols, "Combined table");
        }
        None => error!("No data: no inventory CSV file could be read"),
    }

    let categories = config.categories();
    for category in &categories {
        info!(category = %category.name, "Analyzing stack heights");
        if let Err(e) = analyze_stack_heights(reader.combined(), scc, category, save_dir) {
            error!(category = %category.name, error = %format!("{e:#}"), "Stack height analysis failed");
        }
    }

    if cli.capacity {
        info!(target_unit = %cli.target_unit, "Analyzing stack heights by design capacity");
        for category in &categories {
            match analyze_stack_heights_by_capacity(
                reader.combined(),
                scc,
                category,
                &cli.target_unit,
                save_dir,
            ) {
                Ok(Some(summary)) => info!(
                    category = %category.name,
                    records = summary.records.len(),
                    "Capacity analysis saved"
                ),
                Ok(None) => info!(category = %category.name, "Capacity analysis found no data"),
                Err(e) => error!(
                    category = %category.name,
                    error = %format!("{e:#}"),
                    "Capacity analysis failed"
                ),
            }
        }
        log_available_units(reader.combined());
    }

    info!(save_dir = %save_dir.display(), "Finished analysis");
    Ok(())
}
