//! Shared types and workflows for canvass clients.
//!
//! Address confirmation: validate the dialog fragments, normalize, look for a
//! duplicate marker in the working set, otherwise create and register one.

pub mod address;
pub mod clock;
pub mod config;
pub mod error;
pub mod form;
pub mod marker;
pub mod normalize;
pub mod registrar;
pub mod workflow;

pub use address::{Address, AddressId, Coordinates};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::CanvassConfig;
pub use error::{CanvassError, RegistrationError, ValidationError};
pub use form::{AddressForm, UnitFields};
pub use marker::{Marker, MarkerSet, Person, Unit};
pub use normalize::{normalize, NormalizedAddress};
pub use registrar::{FakeRegistrar, HttpRegistrar, Registrar};
pub use workflow::{AddressOutcome, Session, UnitOutcome, Workflow};
