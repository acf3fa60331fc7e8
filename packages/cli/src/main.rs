#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Know Your Risk: past natural catastrophe declarations around a French
//! address.
//!
//! Without a subcommand, starts an interactive session that prompts for an
//! address and a search radius. `georisk query` runs a single lookup.
//!
//! Uses `indicatif-log-bridge` (via [`georisk_cli_utils::init_logger`])
//! to route `log` output through `indicatif::MultiProgress` so that log
//! lines and spinners never fight for the terminal.

mod interactive;
mod pipeline;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use georisk_cli_utils::MultiProgress;
use georisk_reference::paths;
use georisk_risk_models::{Query, RiskCategory, SearchRadius};

use crate::pipeline::{HttpBackend, QueryContext};

#[derive(Parser)]
#[command(
    name = "georisk",
    about = "Past natural catastrophe declarations around a French address"
)]
struct Cli {
    /// Commune reference CSV (overrides `GEORISK_REFERENCE_CSV`)
    #[arg(long, global = true)]
    reference: Option<PathBuf>,
    /// Directory for the rendered map (default: `data/generated`)
    #[arg(long, global = true)]
    output: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up a single address
    Query {
        /// Free-text postal address
        #[arg(long)]
        address: String,
        /// Search radius in metres (100-5000)
        #[arg(long, default_value_t = SearchRadius::DEFAULT.meters(), value_parser = parse_radius)]
        radius: u32,
        /// Registry category to query
        #[arg(long, default_value_t = RiskCategory::default())]
        category: RiskCategory,
    },
    /// List the registry categories that can be queried
    Categories,
}

fn parse_radius(raw: &str) -> Result<u32, String> {
    let meters: u32 = raw.trim().parse().map_err(|e| format!("invalid radius {raw:?}: {e}"))?;
    SearchRadius::new(meters)
        .map(SearchRadius::meters)
        .map_err(|e| e.to_string())
}

fn build_context(
    reference: Option<PathBuf>,
    output: Option<PathBuf>,
    multi: MultiProgress,
) -> Result<QueryContext<'static, HttpBackend>, Box<dyn std::error::Error>> {
    let reference = reference.unwrap_or_else(paths::reference_csv_path);
    let table = georisk_reference::shared(&reference)?;
    log::info!(
        "Loaded {} communes from {}",
        table.len(),
        reference.display()
    );

    Ok(QueryContext {
        backend: HttpBackend::from_env()?,
        table,
        output_dir: output.unwrap_or_else(paths::generated_dir),
        multi,
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = georisk_cli_utils::init_logger();
    let cli = Cli::parse();

    match cli.command {
        None => {
            let ctx = build_context(cli.reference, cli.output, multi)?;
            interactive::run(&ctx).await?;
        }
        Some(Commands::Query {
            address,
            radius,
            category,
        }) => {
            let ctx = build_context(cli.reference, cli.output, multi)?;
            let query = Query {
                address,
                radius: SearchRadius::new(radius)?,
                category,
            };
            let state = pipeline::run_query(&ctx, &query).await?;
            pipeline::print_state(&state);
        }
        Some(Commands::Categories) => {
            println!("{:<12} DESCRIPTION", "CATEGORY");
            println!("{}", "-".repeat(50));
            for category in RiskCategory::all() {
                println!("{:<12} {}", category.to_string(), category.label());
            }
        }
    }

    Ok(())
}
