//! Address components from the external autocomplete service.
//!
//! Geocoding and suggestion matching happen entirely in the third-party
//! places widget. What comes back is a list of typed components for the
//! place the user picked; [`compose_full_address`] flattens them into the
//! single `full_address` string the signup endpoint expects.

use serde::{Deserialize, Serialize};

/// One component of a geocoded place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressComponent {
    pub long_name: String,
    pub short_name: String,
    /// Component types, most specific first (e.g. `["locality", "political"]`).
    pub types: Vec<String>,
}

impl AddressComponent {
    #[must_use]
    pub fn new(long_name: &str, short_name: &str, kind: &str) -> Self {
        Self {
            long_name: long_name.to_owned(),
            short_name: short_name.to_owned(),
            types: vec![kind.to_owned()],
        }
    }

    fn kind(&self) -> Option<&str> {
        self.types.first().map(String::as_str)
    }
}

/// Flatten a place's components into one address line.
///
/// Components are consumed in the order given. The street number is
/// prefixed to whatever has been built so far, the route is appended
/// directly, and locality, region, country and postal code are each
/// appended after a comma. Other component types are skipped.
///
/// ```
/// use marketplace_core::{AddressComponent, compose_full_address};
///
/// let place = [
///     AddressComponent::new("12", "12", "street_number"),
///     AddressComponent::new("Herzl Street", "Herzl St", "route"),
///     AddressComponent::new("Haifa", "Haifa", "locality"),
///     AddressComponent::new("Israel", "IL", "country"),
/// ];
/// assert_eq!(compose_full_address(&place), "12 Herzl St, Haifa, Israel");
/// ```
#[must_use]
pub fn compose_full_address(components: &[AddressComponent]) -> String {
    let mut full = String::new();
    for component in components {
        match component.kind() {
            Some("street_number") => full = format!("{} {full}", component.long_name),
            Some("route") => full.push_str(&component.short_name),
            Some("locality" | "country" | "postal_code") => {
                full.push_str(", ");
                full.push_str(&component.long_name);
            }
            Some("administrative_area_level_1") => {
                full.push_str(", ");
                full.push_str(&component.short_name);
            }
            _ => {}
        }
    }
    full
}
