//! Canonical comparison keys for addresses.

use serde::{Deserialize, Serialize};

use crate::address::{Address, AddressId};

/// Number of zip characters that take part in comparison
pub const ZIP_PREFIX_LEN: usize = 5;

/// Case-folded, zip-truncated, null-defaulted form of an address.
///
/// Two addresses with equal keys are the same physical address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NormalizedAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

impl NormalizedAddress {
    /// Normalize raw field values. `None` is treated as "".
    pub fn from_parts(
        street: Option<&str>,
        city: Option<&str>,
        state: Option<&str>,
        zip: Option<&str>,
    ) -> Self {
        Self {
            street: fold(street),
            city: fold(city),
            state: fold(state),
            zip: zip_prefix(zip),
        }
    }

    pub fn id(&self) -> AddressId {
        AddressId::derive(self)
    }
}

/// Normalize an address. Pure and idempotent.
pub fn normalize(address: &Address) -> NormalizedAddress {
    NormalizedAddress::from_parts(
        address.street.as_deref(),
        address.city.as_deref(),
        address.state.as_deref(),
        address.zip.as_deref(),
    )
}

fn fold(value: Option<&str>) -> String {
    value.unwrap_or("").trim().to_lowercase()
}

// Zip is compared case-sensitively; only the prefix matters. Trimming again
// after the cut keeps the result stable when re-normalized.
fn zip_prefix(value: Option<&str>) -> String {
    let prefix: String = value
        .unwrap_or("")
        .trim()
        .chars()
        .take(ZIP_PREFIX_LEN)
        .collect();
    prefix.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::Coordinates;

    fn addr(street: &str, city: &str, state: &str, zip: &str) -> Address {
        Address::new(street, city, state, zip, Coordinates::default())
    }

    #[test]
    fn test_lowercases_street_city_state() {
        let key = normalize(&addr("100 Main St", "Springfield", "IL", "62701"));
        assert_eq!(key.street, "100 main st");
        assert_eq!(key.city, "springfield");
        assert_eq!(key.state, "il");
        assert_eq!(key.zip, "62701");
    }

    #[test]
    fn test_zip_truncated_to_five() {
        let key = normalize(&addr("a", "b", "c", "62701-1234"));
        assert_eq!(key.zip, "62701");
    }

    #[test]
    fn test_short_zip_kept() {
        let key = normalize(&addr("a", "b", "c", "627"));
        assert_eq!(key.zip, "627");
    }

    #[test]
    fn test_missing_fields_become_empty() {
        let key = normalize(&Address::default());
        assert_eq!(key, NormalizedAddress::from_parts(None, None, None, None));
        assert_eq!(key.street, "");
        assert_eq!(key.zip, "");
    }

    #[test]
    fn test_zip_case_preserved() {
        let key = normalize(&addr("a", "b", "c", "k1a0b1"));
        let upper = normalize(&addr("a", "b", "c", "K1A0B1"));
        assert_ne!(key.zip, upper.zip);
    }

    #[test]
    fn test_idempotent_with_awkward_zip() {
        let once = NormalizedAddress::from_parts(Some(" X "), Some("Y"), Some("Z"), Some(" 6270 1"));
        let twice = NormalizedAddress::from_parts(
            Some(&once.street),
            Some(&once.city),
            Some(&once.state),
            Some(&once.zip),
        );
        assert_eq!(once, twice);
        assert_eq!(once.zip, "6270");
    }

    #[test]
    fn test_equal_keys_equal_ids() {
        let a = normalize(&addr("100 Main St", "Springfield", "IL", "62701-1234"));
        let b = normalize(&addr("100 MAIN ST", "springfield", "il", "62701"));
        assert_eq!(a.id(), b.id());
    }
}
