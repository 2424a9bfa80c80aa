//! Typed form fragments and their validation.
//!
//! The address dialog is made of three independent fragments: street, city,
//! and state+zip. Each validates on its own; a required field that is absent
//! or blank fails. Valid values come back trimmed.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreetFields {
    #[serde(default)]
    pub street: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityFields {
    #[serde(default)]
    pub city: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateZipFields {
    #[serde(default)]
    pub state: Option<String>,

    #[serde(default)]
    pub zip: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitFields {
    #[serde(default)]
    pub unit: Option<String>,
}

/// All three address fragments as entered
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressForm {
    pub street: StreetFields,
    pub city: CityFields,
    pub state_zip: StateZipFields,
}

impl AddressForm {
    pub fn new(
        street: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        zip: impl Into<String>,
    ) -> Self {
        Self {
            street: StreetFields {
                street: Some(street.into()),
            },
            city: CityFields {
                city: Some(city.into()),
            },
            state_zip: StateZipFields {
                state: Some(state.into()),
                zip: Some(zip.into()),
            },
        }
    }

    /// Validate every fragment. The first failure is returned.
    pub fn validate(&self) -> Result<ValidAddress, ValidationError> {
        let street = self.street.validate();
        let city = self.city.validate();
        let state_zip = self.state_zip.validate();

        let street = street?;
        let city = city?;
        let (state, zip) = state_zip?;

        Ok(ValidAddress {
            street,
            city,
            state,
            zip,
        })
    }
}

/// Trimmed address fields that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

impl StreetFields {
    pub fn validate(&self) -> Result<String, ValidationError> {
        required("street", self.street.as_deref())
    }
}

impl CityFields {
    pub fn validate(&self) -> Result<String, ValidationError> {
        required("city", self.city.as_deref())
    }
}

impl StateZipFields {
    pub fn validate(&self) -> Result<(String, String), ValidationError> {
        let state = required("state", self.state.as_deref());
        let zip = required("zip", self.zip.as_deref());
        Ok((state?, zip?))
    }
}

impl UnitFields {
    pub fn new(unit: impl Into<String>) -> Self {
        Self {
            unit: Some(unit.into()),
        }
    }

    pub fn validate(&self) -> Result<String, ValidationError> {
        required("unit", self.unit.as_deref())
    }
}

fn required(field: &'static str, value: Option<&str>) -> Result<String, ValidationError> {
    let value = value.ok_or(ValidationError::Missing(field))?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Blank(field));
    }
    Ok(trimmed.to_string())
}
