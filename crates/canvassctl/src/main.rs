//! canvassctl - command-line canvassing client
//!
//! Confirms addresses against a local working set of markers and reports new
//! ones to the canvassing server.

use canvass_common::address::Coordinates;
use canvass_common::config::CanvassConfig;
use canvassctl::cli::{Cli, Commands};
use canvassctl::commands::{self, CommandResult};
use canvassctl::errors::EXIT_GENERAL_ERROR;
use canvassctl::logging::{self, LogEntry};
use clap::Parser;
use std::time::Instant;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_tracing();

    let start = Instant::now();
    let mut entry = LogEntry::new(LogEntry::generate_req_id(), cli.command.name());

    let exit_code = match run(cli).await {
        Ok(result) => {
            entry.outcome = Some(result.outcome.to_string());
            result.exit_code
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            entry.ok = false;
            entry.error = Some(format!("{:#}", e));
            EXIT_GENERAL_ERROR
        }
    };

    entry.exit_code = exit_code;
    entry.duration_ms = start.elapsed().as_millis() as u64;
    entry.write();

    std::process::exit(exit_code);
}

async fn run(cli: Cli) -> anyhow::Result<CommandResult> {
    let mut config = CanvassConfig::load()?;
    if let Some(server) = cli.server {
        config.server.base_url = server;
    }

    match cli.command {
        Commands::Confirm {
            markers,
            address,
            lon,
            lat,
            save,
        } => {
            commands::confirm(&config, &markers, &address, Coordinates::new(lon, lat), save).await
        }
        Commands::AddUnit {
            markers,
            address_id,
            unit,
            lon,
            lat,
            save,
        } => {
            commands::add_unit(
                &config,
                &markers,
                &address_id,
                &unit,
                Coordinates::new(lon, lat),
                save,
            )
            .await
        }
        Commands::Normalize { address, json } => commands::normalize_cmd(&address, json),
        Commands::Config => commands::config_cmd(&config),
    }
}
