//! Address and unit confirmation.
//!
//! Confirming an address either reuses the marker already in the working set
//! for that physical address, or creates a new marker and reports it to the
//! backend. The new marker is appended before the registration call settles
//! and is kept even if the call fails; nothing reconciles the two sides
//! afterwards.
//!
//! The working set is borrowed mutably for one confirmation at a time. Two
//! confirmations of the same new address running against separate copies of
//! the working set will each create a marker, and the backend will see two
//! registrations. That race is not guarded against here.

use tracing::{debug, info, warn};

use crate::address::{Address, Coordinates};
use crate::clock::{Clock, SystemClock};
use crate::error::{RegistrationError, ValidationError};
use crate::form::{AddressForm, UnitFields};
use crate::marker::{Marker, MarkerSet, Unit};
use crate::normalize::NormalizedAddress;
use crate::registrar::{LocationRegistration, Registrar, UnitRegistration};

/// Who is canvassing, with which form, and where the device is
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub device_id: String,
    pub form_id: String,
    pub position: Coordinates,
}

/// Result of confirming an address
#[derive(Debug)]
pub enum AddressOutcome {
    /// A fragment failed validation. Nothing changed, nothing was sent.
    Rejected(ValidationError),

    /// The working set already had this address
    Existing { index: usize },

    /// A marker was appended. `registration` is the backend's answer, which
    /// does not affect the append.
    Created {
        index: usize,
        registration: Result<(), RegistrationError>,
    },
}

impl AddressOutcome {
    /// Index of the resolved marker, if any
    pub fn index(&self) -> Option<usize> {
        match self {
            AddressOutcome::Rejected(_) => None,
            AddressOutcome::Existing { index } | AddressOutcome::Created { index, .. } => {
                Some(*index)
            }
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, AddressOutcome::Created { .. })
    }
}

/// Result of adding a unit to a marker
#[derive(Debug)]
pub enum UnitOutcome {
    Rejected(ValidationError),

    /// The marker already has a unit with this name (ignoring case)
    Duplicate,

    Created {
        registration: Result<(), RegistrationError>,
    },
}

pub struct Workflow<R: Registrar, C: Clock = SystemClock> {
    session: Session,
    registrar: R,
    clock: C,
}

impl<R: Registrar> Workflow<R, SystemClock> {
    pub fn new(session: Session, registrar: R) -> Self {
        Self::with_clock(session, registrar, SystemClock)
    }
}

impl<R: Registrar, C: Clock> Workflow<R, C> {
    pub fn with_clock(session: Session, registrar: R, clock: C) -> Self {
        Self {
            session,
            registrar,
            clock,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn registrar(&self) -> &R {
        &self.registrar
    }

    /// Confirm an address entered at `at`.
    ///
    /// `notify` receives the resolved marker (new or existing). It is not
    /// called when validation fails.
    pub async fn confirm_address<F>(
        &self,
        form: &AddressForm,
        at: Coordinates,
        markers: &mut MarkerSet,
        notify: F,
    ) -> AddressOutcome
    where
        F: FnOnce(&Marker),
    {
        let valid = match form.validate() {
            Ok(valid) => valid,
            Err(e) => {
                debug!("address form rejected: {}", e);
                return AddressOutcome::Rejected(e);
            }
        };

        let key = NormalizedAddress::from_parts(
            Some(&valid.street),
            Some(&valid.city),
            Some(&valid.state),
            Some(&valid.zip),
        );

        if let Some(index) = markers.find_duplicate(&key) {
            debug!("address matches marker #{}", index);
            if let Some(marker) = markers.get(index) {
                notify(marker);
            }
            return AddressOutcome::Existing { index };
        }

        let mut address = Address::new(valid.street, valid.city, valid.state, valid.zip, at);
        address.id = Some(key.id());

        let input = LocationRegistration {
            device_id: self.session.device_id.clone(),
            form_id: self.session.form_id.clone(),
            timestamp: self.clock.now_millis(),
            longitude: at.longitude,
            latitude: at.latitude,
            street: address.street().to_string(),
            city: address.city().to_string(),
            state: address.state().to_string(),
            zip: address.zip().to_string(),
        };

        let index = markers.push(Marker::new(address));
        info!("new marker #{} for {}", index, input.street);

        let registration = self.registrar.register_location(&input).await;
        if let Err(e) = &registration {
            warn!("address registration failed, keeping local marker: {}", e);
        }

        if let Some(marker) = markers.get(index) {
            notify(marker);
        }

        AddressOutcome::Created {
            index,
            registration,
        }
    }

    /// Record a new unit under `marker` at the device's current position.
    pub async fn add_unit(&self, fields: &UnitFields, marker: &mut Marker) -> UnitOutcome {
        let name = match fields.validate() {
            Ok(name) => name,
            Err(e) => {
                debug!("unit form rejected: {}", e);
                return UnitOutcome::Rejected(e);
            }
        };

        if marker.find_unit(&name).is_some() {
            debug!("unit {} already recorded", name);
            return UnitOutcome::Duplicate;
        }

        let address_id = marker.effective_id();
        let input = UnitRegistration {
            device_id: self.session.device_id.clone(),
            form_id: self.session.form_id.clone(),
            timestamp: self.clock.now_millis(),
            longitude: self.session.position.longitude,
            latitude: self.session.position.latitude,
            unit: name.clone(),
            address_id,
        };

        let registration = self.registrar.register_unit(&input).await;
        if let Err(e) = &registration {
            warn!("unit registration failed, keeping local unit: {}", e);
        }

        info!("new unit {} at {}", name, marker.address);
        marker.units.push(Unit::new(name));

        UnitOutcome::Created { registration }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::registrar::{FakeRegistrar, RecordedCall};

    fn session() -> Session {
        Session {
            device_id: "device-1".into(),
            form_id: "form-1".into(),
            position: Coordinates::new(-89.65, 39.78),
        }
    }

    fn workflow() -> Workflow<FakeRegistrar, FixedClock> {
        Workflow::with_clock(session(), FakeRegistrar::new(), FixedClock(1_700_000_000_000))
    }

    #[tokio::test]
    async fn test_new_marker_gets_content_id() {
        let wf = workflow();
        let mut markers = MarkerSet::new();
        let form = AddressForm::new("100 Main St", "Springfield", "IL", "62701");

        let outcome = wf
            .confirm_address(&form, Coordinates::new(1.0, 2.0), &mut markers, |_| {})
            .await;

        let index = outcome.index().unwrap();
        let marker = markers.get(index).unwrap();
        let expected = NormalizedAddress::from_parts(
            Some("100 main st"),
            Some("springfield"),
            Some("il"),
            Some("62701"),
        )
        .id();
        assert_eq!(marker.id(), Some(&expected));
        assert!(marker.units.is_empty());
        assert!(marker.people.is_empty());
        assert_eq!(marker.address.coordinates(), Coordinates::new(1.0, 2.0));
    }

    #[tokio::test]
    async fn test_registration_payload() {
        let wf = workflow();
        let mut markers = MarkerSet::new();
        let form = AddressForm::new(" 100 Main St ", "Springfield", "IL", "62701-1234");

        wf.confirm_address(&form, Coordinates::new(1.0, 2.0), &mut markers, |_| {})
            .await;

        let calls = wf.registrar().calls();
        assert_eq!(calls.len(), 1);
        match &calls[0] {
            RecordedCall::Location(input) => {
                assert_eq!(input.device_id, "device-1");
                assert_eq!(input.form_id, "form-1");
                assert_eq!(input.timestamp, 1_700_000_000_000);
                assert_eq!(input.longitude, 1.0);
                assert_eq!(input.latitude, 2.0);
                assert_eq!(input.street, "100 Main St");
                assert_eq!(input.zip, "62701-1234");
            }
            other => panic!("unexpected call {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unit_uses_device_position_and_marker_id() {
        let wf = workflow();
        let mut marker = Marker::new(Address::new("1 Oak", "X", "Y", "1", Coordinates::default()));
        marker.address.id = Some("addr-1".into());

        let outcome = wf.add_unit(&UnitFields::new("2B"), &mut marker).await;
        assert!(matches!(outcome, UnitOutcome::Created { registration: Ok(()) }));
        assert_eq!(marker.units.len(), 1);

        match &wf.registrar().calls()[0] {
            RecordedCall::Unit(input) => {
                assert_eq!(input.address_id.as_str(), "addr-1");
                assert_eq!(input.longitude, -89.65);
                assert_eq!(input.latitude, 39.78);
            }
            other => panic!("unexpected call {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unit_without_stored_id_derives_one() {
        let wf = workflow();
        let mut marker = Marker::new(Address::new("1 Oak", "X", "Y", "1", Coordinates::default()));
        let derived = marker.key().id();

        wf.add_unit(&UnitFields::new("3"), &mut marker).await;

        match &wf.registrar().calls()[0] {
            RecordedCall::Unit(input) => assert_eq!(input.address_id, derived),
            other => panic!("unexpected call {:?}", other),
        }
    }
}
