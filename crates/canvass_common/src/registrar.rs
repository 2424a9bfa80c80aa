//! Reporting new addresses and units to the canvassing backend.
//!
//! Production code uses [`HttpRegistrar`], which posts JSON to the server.
//! Tests use [`FakeRegistrar`], which records every call and can be told to
//! fail. Each call is made once; nothing here retries.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::debug;

use crate::address::AddressId;
use crate::config::ServerConfig;
use crate::error::RegistrationError;

pub const LOCATION_PATH: &str = "/address/add/location";
pub const UNIT_PATH: &str = "/address/add/unit";

/// Payload for a newly confirmed address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationRegistration {
    pub device_id: String,
    pub form_id: String,
    pub timestamp: i64,
    pub longitude: f64,
    pub latitude: f64,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

/// Payload for a new unit under a known address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitRegistration {
    pub device_id: String,
    pub form_id: String,
    pub timestamp: i64,
    pub longitude: f64,
    pub latitude: f64,
    pub unit: String,
    pub address_id: AddressId,
}

#[async_trait]
pub trait Registrar: Send + Sync {
    async fn register_location(&self, input: &LocationRegistration) -> Result<(), RegistrationError>;

    async fn register_unit(&self, input: &UnitRegistration) -> Result<(), RegistrationError>;
}

// ============================================================================
// HTTP Registrar (Production)
// ============================================================================

pub struct HttpRegistrar {
    client: reqwest::Client,
    base_url: String,
    timeout_secs: u64,
}

impl HttpRegistrar {
    pub fn new(config: &ServerConfig) -> Result<Self, RegistrationError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RegistrationError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout_secs: config.timeout_secs,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<T: Serialize + Sync>(&self, path: &str, body: &T) -> Result<(), RegistrationError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RegistrationError::Timeout(self.timeout_secs)
                } else {
                    RegistrationError::Http(format!("Request failed: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RegistrationError::Status {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl Registrar for HttpRegistrar {
    async fn register_location(&self, input: &LocationRegistration) -> Result<(), RegistrationError> {
        self.post(LOCATION_PATH, input).await
    }

    async fn register_unit(&self, input: &UnitRegistration) -> Result<(), RegistrationError> {
        self.post(UNIT_PATH, input).await
    }
}

// ============================================================================
// Fake Registrar (Testing)
// ============================================================================

/// A call seen by [`FakeRegistrar`]
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    Location(LocationRegistration),
    Unit(UnitRegistration),
}

/// Records calls in memory. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct FakeRegistrar {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    fail_with: Option<RegistrationError>,
}

impl FakeRegistrar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call is recorded, then answered with `err`
    pub fn failing(err: RegistrationError) -> Self {
        Self {
            calls: Arc::default(),
            fail_with: Some(err),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }

    fn record(&self, call: RecordedCall) -> Result<(), RegistrationError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
        match &self.fail_with {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Registrar for FakeRegistrar {
    async fn register_location(&self, input: &LocationRegistration) -> Result<(), RegistrationError> {
        self.record(RecordedCall::Location(input.clone()))
    }

    async fn register_unit(&self, input: &UnitRegistration) -> Result<(), RegistrationError> {
        self.record(RecordedCall::Unit(input.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_payload_field_names() {
        let input = LocationRegistration {
            device_id: "dev".into(),
            form_id: "form".into(),
            timestamp: 1,
            longitude: -89.6,
            latitude: 39.8,
            street: "1 Oak".into(),
            city: "Springfield".into(),
            state: "IL".into(),
            zip: "62701".into(),
        };
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["deviceId"], "dev");
        assert_eq!(json["formId"], "form");
        assert_eq!(json["zip"], "62701");
        assert!(json.get("device_id").is_none());
    }

    #[test]
    fn test_unit_payload_field_names() {
        let input = UnitRegistration {
            device_id: "dev".into(),
            form_id: "form".into(),
            timestamp: 1,
            longitude: 0.0,
            latitude: 0.0,
            unit: "2B".into(),
            address_id: AddressId::from("abc"),
        };
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["addressId"], "abc");
        assert_eq!(json["unit"], "2B");
    }

    #[test]
    fn test_base_url_trailing_slash_dropped() {
        let registrar = HttpRegistrar::new(&ServerConfig {
            base_url: "http://example.org/api/".into(),
            timeout_secs: 1,
        })
        .unwrap();
        assert_eq!(registrar.base_url(), "http://example.org/api");
    }

    #[tokio::test]
    async fn test_fake_records_even_when_failing() {
        let fake = FakeRegistrar::failing(RegistrationError::Timeout(3));
        let input = UnitRegistration {
            device_id: "d".into(),
            form_id: "f".into(),
            timestamp: 0,
            longitude: 0.0,
            latitude: 0.0,
            unit: "1".into(),
            address_id: AddressId::from("x"),
        };
        assert!(fake.register_unit(&input).await.is_err());
        assert_eq!(fake.call_count(), 1);
    }
}
