//! Addresses

/// Destination descriptor for a shipment.
///
/// Only the postal code and state participate in zone eligibility matching;
/// city and country are carried for display. Field-name synonyms coming from
/// upstream payloads (`zip`, `zipcode`, `postalCode`) are normalized at the
/// fixture boundary, never here.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Address {
    postal_code: String,
    state: String,
    city: String,
    country: String,
}

impl Address {
    /// Create a new address. All fields are stored trimmed.
    pub fn new(
        postal_code: impl Into<String>,
        state: impl Into<String>,
        city: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            postal_code: postal_code.into().trim().to_string(),
            state: state.into().trim().to_string(),
            city: city.into().trim().to_string(),
            country: country.into().trim().to_string(),
        }
    }

    /// Return the postal code.
    #[must_use]
    pub fn postal_code(&self) -> &str {
        &self.postal_code
    }

    /// Return the state.
    #[must_use]
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Return the city.
    #[must_use]
    pub fn city(&self) -> &str {
        &self.city
    }

    /// Return the country.
    #[must_use]
    pub fn country(&self) -> &str {
        &self.country
    }
}
