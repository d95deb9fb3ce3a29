pub mod cli;
pub mod coerce;
pub mod config;
pub mod dataset;
pub mod error;
pub mod io_utils;
pub mod loader;
pub mod pipeline;
pub mod reader;
pub mod schema;
pub mod store;
pub mod table;
pub mod web;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, info};
use sqlx::postgres::PgPoolOptions;

use crate::{
    cli::{Cli, Commands},
    config::DbConfig,
    pipeline::{DatasetOutcome, ImportReport},
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("course_catalog", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Starting async runtime")?;
    runtime.block_on(async {
        match cli.command {
            Commands::Serve(args) => handle_serve(&args).await,
            Commands::Import(args) => handle_import(&args).await,
        }
    })
}

async fn handle_serve(args: &cli::ServeArgs) -> Result<()> {
    let config = DbConfig::from(&args.db);
    if let Some(report) = pipeline::init_database(&config, &args.data_dir).await {
        log_report(&report);
    }
    let pool = PgPoolOptions::new()
        .max_connections(4)
        .connect_lazy_with(config.connect_options());
    web::serve(args.bind, web::AppState::new(pool)).await
}

async fn handle_import(args: &cli::ImportArgs) -> Result<()> {
    let result = if args.dry_run {
        info!("Validating CSV files in {:?}", args.data_dir);
        pipeline::dry_run(&args.data_dir).await
    } else {
        let config = DbConfig::from(&args.db);
        pipeline::run_import(&config, &args.data_dir).await
    };
    let report = result.with_context(|| format!("Importing datasets from {:?}", args.data_dir))?;

    if args.json {
        let rendered = serde_json::to_string_pretty(&report).context("Rendering report JSON")?;
        println!("{rendered}");
    } else {
        log_report(&report);
    }
    Ok(())
}

fn log_report(report: &ImportReport) {
    for dataset in &report.datasets {
        let status = match &dataset.outcome {
            DatasetOutcome::Loaded => "loaded",
            DatasetOutcome::NothingToInsert => "nothing to insert",
            DatasetOutcome::FileMissing => "file missing",
            DatasetOutcome::FileError(_) => "file error",
            DatasetOutcome::InsertError(_) => "insert failed",
        };
        info!(
            "{}: {} accepted of {} read ({} blank, {} malformed, {} invalid), {} affected, {status}",
            dataset.dataset,
            dataset.tally.accepted,
            dataset.tally.read,
            dataset.tally.blank,
            dataset.tally.malformed,
            dataset.tally.invalid,
            dataset.affected
        );
    }
    info!("{} row(s) affected in total", report.total_affected());
}
