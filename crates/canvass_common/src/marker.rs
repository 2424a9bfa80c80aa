//! Markers: one physical address and what canvassers recorded there.
//!
//! The working set is an ordered list owned by the caller. Workflows search
//! it and append to it, they never remove entries.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::address::{Address, AddressId};
use crate::error::CanvassError;
use crate::normalize::{normalize, NormalizedAddress};

/// Someone recorded at an address or unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Survey answers and other recorded attributes, carried through as-is
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

/// A unit (apartment, suite) inside an address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub name: String,

    #[serde(default)]
    pub people: Vec<Person>,
}

impl Unit {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            people: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub address: Address,

    #[serde(default)]
    pub units: Vec<Unit>,

    #[serde(default)]
    pub people: Vec<Person>,
}

impl Marker {
    /// New marker for a confirmed address, with no units or people
    pub fn new(address: Address) -> Self {
        Self {
            address,
            units: Vec::new(),
            people: Vec::new(),
        }
    }

    pub fn key(&self) -> NormalizedAddress {
        normalize(&self.address)
    }

    pub fn id(&self) -> Option<&AddressId> {
        self.address.id.as_ref()
    }

    /// Stored id, or the one derived from the address when none was stored
    pub fn effective_id(&self) -> AddressId {
        self.id().cloned().unwrap_or_else(|| self.key().id())
    }

    /// Unit whose name matches case-insensitively
    pub fn find_unit(&self, name: &str) -> Option<&Unit> {
        let wanted = name.to_lowercase();
        self.units.iter().find(|u| u.name.to_lowercase() == wanted)
    }
}

/// The caller's ordered working set of markers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarkerSet {
    markers: Vec<Marker>,
}

impl MarkerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the first marker whose stored address normalizes to `key`.
    ///
    /// First match wins. Missing stored fields compare as "" without
    /// touching the stored data.
    pub fn find_duplicate(&self, key: &NormalizedAddress) -> Option<usize> {
        let found = self.markers.iter().position(|m| &m.key() == key);
        debug!(?key, ?found, "duplicate lookup over {} markers", self.markers.len());
        found
    }

    /// Index of the first marker with this id, stored or derived
    pub fn position_by_id(&self, id: &AddressId) -> Result<usize, CanvassError> {
        self.markers
            .iter()
            .position(|m| &m.effective_id() == id)
            .ok_or_else(|| CanvassError::MarkerNotFound(id.to_string()))
    }

    /// Append a marker and return its index
    pub fn push(&mut self, marker: Marker) -> usize {
        self.markers.push(marker);
        self.markers.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&Marker> {
        self.markers.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Marker> {
        self.markers.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Read a working set from a JSON array file
    pub fn load_from_path(path: &Path) -> Result<Self, CanvassError> {
        let contents = fs::read_to_string(path)?;
        if contents.trim().is_empty() {
            return Ok(Self::new());
        }
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), CanvassError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

impl From<Vec<Marker>> for MarkerSet {
    fn from(markers: Vec<Marker>) -> Self {
        Self { markers }
    }
}

impl From<MarkerSet> for Vec<Marker> {
    fn from(set: MarkerSet) -> Self {
        set.markers
    }
}
