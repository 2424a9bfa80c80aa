//! CLI - Command-line argument parsing
//!
//! Keeps argument parsing separate from execution logic.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Canvassing client
#[derive(Parser, Debug)]
#[command(name = "canvassctl")]
#[command(about = "Confirm canvassed addresses and sync them to the server", long_about = None)]
#[command(version)]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    /// Backend base URL (overrides config and $CANVASS_SERVER_URL)
    #[arg(long, global = true)]
    pub server: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Street, city, state and zip as typed into the dialog
#[derive(Args, Debug, Clone)]
pub struct AddressArgs {
    #[arg(long)]
    pub street: Option<String>,

    #[arg(long)]
    pub city: Option<String>,

    #[arg(long)]
    pub state: Option<String>,

    #[arg(long)]
    pub zip: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Confirm an address: reuse a matching marker or create and register one
    Confirm {
        /// Working set file (JSON array of markers)
        #[arg(long)]
        markers: PathBuf,

        #[command(flatten)]
        address: AddressArgs,

        /// Longitude of the picked location
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// Latitude of the picked location
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Write the updated working set back to the file
        #[arg(long)]
        save: bool,
    },

    /// Record a unit under an existing marker
    AddUnit {
        #[arg(long)]
        markers: PathBuf,

        /// Address id of the marker
        #[arg(long)]
        address_id: String,

        /// Unit name, e.g. "Apt 2B"
        #[arg(long)]
        unit: String,

        /// Device longitude
        #[arg(long, allow_hyphen_values = true, default_value_t = 0.0)]
        lon: f64,

        /// Device latitude
        #[arg(long, allow_hyphen_values = true, default_value_t = 0.0)]
        lat: f64,

        #[arg(long)]
        save: bool,
    },

    /// Print the normalized comparison key and address id (no network)
    Normalize {
        #[command(flatten)]
        address: AddressArgs,

        /// Output JSON only
        #[arg(long)]
        json: bool,
    },

    /// Show the effective configuration
    Config,
}

impl Commands {
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Confirm { .. } => "confirm",
            Commands::AddUnit { .. } => "add-unit",
            Commands::Normalize { .. } => "normalize",
            Commands::Config => "config",
        }
    }
}
