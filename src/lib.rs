pub mod chart;
pub mod cli;
pub mod data;
pub mod error;
pub mod io_utils;
pub mod parser;
pub mod preview;
pub mod regression;
pub mod render;
pub mod source;
pub mod stats;
pub mod table;
pub mod workbook;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

use crate::cli::{Cli, Commands};

pub use crate::data::{Value, normalize_cell};
pub use crate::error::AnalysisError;
pub use crate::table::{Row, TypedTable};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("csv_insight", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Preview(args) => preview::execute(&args),
        Commands::Sheets(args) => preview::execute_sheets(&args),
        Commands::Stats(args) => stats::execute(&args),
        Commands::Correlate(args) => regression::execute(&args),
        Commands::Chart(args) => chart::execute(&args),
    }
}
