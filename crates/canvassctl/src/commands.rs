//! Command handlers for canvassctl

use anyhow::{anyhow, Context, Result};
use canvass_common::address::{Address, AddressId, Coordinates};
use canvass_common::config::CanvassConfig;
use canvass_common::error::CanvassError;
use canvass_common::form::{AddressForm, CityFields, StateZipFields, StreetFields, UnitFields};
use canvass_common::marker::{Marker, MarkerSet};
use canvass_common::normalize::{normalize, NormalizedAddress};
use canvass_common::registrar::HttpRegistrar;
use canvass_common::workflow::{AddressOutcome, Session, UnitOutcome, Workflow};
use serde::Serialize;
use std::path::Path;
use tracing::warn;

use crate::cli::AddressArgs;
use crate::errors::{EXIT_INVALID_INPUT, EXIT_NOT_FOUND, EXIT_SUCCESS};

/// What a command did, for the exit status and the invocation log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub exit_code: i32,
    pub outcome: &'static str,
}

impl CommandResult {
    fn new(exit_code: i32, outcome: &'static str) -> Self {
        Self { exit_code, outcome }
    }
}

impl From<&AddressArgs> for AddressForm {
    fn from(args: &AddressArgs) -> Self {
        AddressForm {
            street: StreetFields {
                street: args.street.clone(),
            },
            city: CityFields {
                city: args.city.clone(),
            },
            state_zip: StateZipFields {
                state: args.state.clone(),
                zip: args.zip.clone(),
            },
        }
    }
}

/// Session for this invocation. A missing device id is replaced by a fresh
/// one; a missing form id is an error since the server files visits by form.
pub fn session_from_config(config: &CanvassConfig, position: Coordinates) -> Result<Session> {
    let device_id = match &config.canvasser.device_id {
        Some(id) => id.clone(),
        None => {
            let id = uuid::Uuid::new_v4().to_string();
            warn!("no device id configured, using {}", id);
            id
        }
    };

    let form_id = config.canvasser.form_id.clone().ok_or_else(|| {
        anyhow!("No active form. Set canvasser.form_id in config.toml or $CANVASS_FORM_ID.")
    })?;

    Ok(Session {
        device_id,
        form_id,
        position,
    })
}

fn load_markers(path: &Path) -> Result<MarkerSet> {
    if !path.exists() {
        return Ok(MarkerSet::new());
    }
    MarkerSet::load_from_path(path)
        .with_context(|| format!("Failed to load markers from {}", path.display()))
}

fn save_markers(markers: &MarkerSet, path: &Path) -> Result<()> {
    markers
        .save_to_path(path)
        .with_context(|| format!("Failed to save markers to {}", path.display()))
}

fn workflow(config: &CanvassConfig, session: Session) -> Result<Workflow<HttpRegistrar>> {
    let registrar = HttpRegistrar::new(&config.server)
        .map_err(|e| anyhow!("Cannot set up registration client: {}", e))?;
    Ok(Workflow::new(session, registrar))
}

fn print_marker(marker: &Marker) {
    let id = marker.id().map(AddressId::as_str).unwrap_or("-");
    println!("{}  {}", id, marker.address);
    println!(
        "  units: {}  people: {}",
        marker.units.len(),
        marker.people.len()
    );
}

pub async fn confirm(
    config: &CanvassConfig,
    markers_path: &Path,
    address: &AddressArgs,
    at: Coordinates,
    save: bool,
) -> Result<CommandResult> {
    let mut markers = load_markers(markers_path)?;
    let form = AddressForm::from(address);

    // Reject before requiring a session so bad input never needs config
    if let Err(e) = form.validate() {
        eprintln!("Address not confirmed: {}", e);
        return Ok(CommandResult::new(EXIT_INVALID_INPUT, "rejected"));
    }

    let wf = workflow(config, session_from_config(config, at)?)?;
    let outcome = wf
        .confirm_address(&form, at, &mut markers, print_marker)
        .await;

    let result = match outcome {
        AddressOutcome::Rejected(e) => {
            eprintln!("Address not confirmed: {}", e);
            return Ok(CommandResult::new(EXIT_INVALID_INPUT, "rejected"));
        }
        AddressOutcome::Existing { .. } => {
            println!("Address already on the map.");
            CommandResult::new(EXIT_SUCCESS, "existing")
        }
        AddressOutcome::Created { registration, .. } => {
            match registration {
                Ok(()) => println!("New address registered."),
                Err(e) => eprintln!(
                    "New address kept locally, but the server was not told: {}",
                    e
                ),
            }
            CommandResult::new(EXIT_SUCCESS, "created")
        }
    };

    if save {
        save_markers(&markers, markers_path)?;
    }

    Ok(result)
}

pub async fn add_unit(
    config: &CanvassConfig,
    markers_path: &Path,
    address_id: &str,
    unit: &str,
    device_position: Coordinates,
    save: bool,
) -> Result<CommandResult> {
    let mut markers = load_markers(markers_path)?;
    let id = AddressId::from(address_id);

    let index = match markers.position_by_id(&id) {
        Ok(index) => index,
        Err(e @ CanvassError::MarkerNotFound(_)) => {
            eprintln!("{}", e);
            return Ok(CommandResult::new(EXIT_NOT_FOUND, "not_found"));
        }
        Err(e) => return Err(e.into()),
    };

    let wf = workflow(config, session_from_config(config, device_position)?)?;
    let marker = markers
        .get_mut(index)
        .ok_or_else(|| anyhow!("marker #{} vanished", index))?;

    let result = match wf.add_unit(&UnitFields::new(unit), marker).await {
        UnitOutcome::Rejected(e) => {
            eprintln!("Unit not added: {}", e);
            return Ok(CommandResult::new(EXIT_INVALID_INPUT, "rejected"));
        }
        UnitOutcome::Duplicate => {
            println!("Unit already recorded.");
            CommandResult::new(EXIT_SUCCESS, "duplicate")
        }
        UnitOutcome::Created { registration } => {
            match registration {
                Ok(()) => println!("New unit registered."),
                Err(e) => eprintln!("New unit kept locally, but the server was not told: {}", e),
            }
            CommandResult::new(EXIT_SUCCESS, "created")
        }
    };

    print_marker(marker);

    if save {
        save_markers(&markers, markers_path)?;
    }

    Ok(result)
}

/// Normalized key plus the id it hashes to
#[derive(Debug, Serialize)]
pub struct NormalizeReport {
    pub key: NormalizedAddress,
    pub id: AddressId,
}

pub fn normalize_report(address: &AddressArgs) -> NormalizeReport {
    let key = normalize(&Address {
        street: address.street.clone(),
        city: address.city.clone(),
        state: address.state.clone(),
        zip: address.zip.clone(),
        ..Address::default()
    });
    let id = key.id();
    NormalizeReport { key, id }
}

pub fn normalize_cmd(address: &AddressArgs, json: bool) -> Result<CommandResult> {
    let report = normalize_report(address);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("street: {}", report.key.street);
        println!("city:   {}", report.key.city);
        println!("state:  {}", report.key.state);
        println!("zip:    {}", report.key.zip);
        println!("id:     {}", report.id);
    }

    Ok(CommandResult::new(EXIT_SUCCESS, "ok"))
}

pub fn config_cmd(config: &CanvassConfig) -> Result<CommandResult> {
    print!("{}", config.to_toml()?);
    Ok(CommandResult::new(EXIT_SUCCESS, "ok"))
}
