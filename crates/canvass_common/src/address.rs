//! Address records as canvassers see them on the map.
//!
//! Stored addresses come from the server or from earlier sessions and may be
//! missing any of the text fields, so every field is optional here. Use
//! [`crate::normalize`] before comparing two addresses.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::normalize::NormalizedAddress;

/// A point on the map (WGS84 degrees)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinates {
    pub longitude: f64,
    pub latitude: f64,
}

impl Coordinates {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }
}

/// Content-derived address identifier.
///
/// MD5 over the UTF-8 bytes of `street ++ city ++ state ++ zip` taken from
/// the normalized key (no separators), as 32 lowercase hex characters. This
/// is the id the server and older clients compute for the same address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AddressId(String);

impl AddressId {
    pub fn derive(key: &NormalizedAddress) -> Self {
        use md5::{Digest, Md5};

        let mut hasher = Md5::new();
        hasher.update(key.street.as_bytes());
        hasher.update(key.city.as_bytes());
        hasher.update(key.state.as_bytes());
        hasher.update(key.zip.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for AddressId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for AddressId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for AddressId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A street address with its map position
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<AddressId>,

    #[serde(default)]
    pub street: Option<String>,

    #[serde(default)]
    pub city: Option<String>,

    #[serde(default)]
    pub state: Option<String>,

    #[serde(default)]
    pub zip: Option<String>,

    #[serde(default)]
    pub longitude: f64,

    #[serde(default)]
    pub latitude: f64,
}

impl Address {
    /// Build a fully populated address (no id yet)
    pub fn new(
        street: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        zip: impl Into<String>,
        at: Coordinates,
    ) -> Self {
        Self {
            id: None,
            street: Some(street.into()),
            city: Some(city.into()),
            state: Some(state.into()),
            zip: Some(zip.into()),
            longitude: at.longitude,
            latitude: at.latitude,
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.longitude, self.latitude)
    }

    pub fn street(&self) -> &str {
        self.street.as_deref().unwrap_or("")
    }

    pub fn city(&self) -> &str {
        self.city.as_deref().unwrap_or("")
    }

    pub fn state(&self) -> &str {
        self.state.as_deref().unwrap_or("")
    }

    pub fn zip(&self) -> &str {
        self.zip.as_deref().unwrap_or("")
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}, {} {}",
            self.street(),
            self.city(),
            self.state(),
            self.zip()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_read_as_empty() {
        let addr: Address = serde_json::from_str(r#"{"street": "1 Elm", "city": null}"#).unwrap();
        assert_eq!(addr.street(), "1 Elm");
        assert_eq!(addr.city(), "");
        assert_eq!(addr.zip(), "");
        assert_eq!(addr.coordinates(), Coordinates::default());
    }

    #[test]
    fn test_address_id_is_hex_md5() {
        let key = NormalizedAddress {
            street: String::new(),
            city: String::new(),
            state: String::new(),
            zip: String::new(),
        };
        // MD5 of the empty string
        assert_eq!(AddressId::derive(&key).as_str(), "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn test_address_id_matches_server_id() {
        let key = NormalizedAddress {
            street: "100 main st".to_string(),
            city: "springfield".to_string(),
            state: "il".to_string(),
            zip: "62701".to_string(),
        };
        assert_eq!(AddressId::derive(&key).as_str(), "6fc1cdf6e87a17733abd5267ccc1c0da");
    }

    #[test]
    fn test_address_id_serializes_as_plain_string() {
        let id = AddressId::from("abc");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc\"");
    }
}
