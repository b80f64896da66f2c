//! Reverse-geocoding providers.
//!
//! `ReverseGeocoder` is the single seam between the selection loop and the
//! outside world; `NominatimReverse` is the live OpenStreetMap-backed
//! implementation. Tests inject deterministic fakes instead.

use super::types::{Coordinate, GeocodeError, GeocodeResult};
use serde::Deserialize;
use std::time::Duration;

/// The oracle: one query operation, may fail or come back empty.
pub trait ReverseGeocoder {
    fn reverse(&self, coordinate: Coordinate) -> Result<GeocodeResult, GeocodeError>;
}

// ─── Nominatim provider ─────────────────────────────────────────

const NOMINATIM_ENDPOINT: &str = "https://nominatim.openstreetmap.org/reverse";
/// City-level detail; finer zooms return street addresses.
const NOMINATIM_ZOOM: u8 = 10;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Deserialize, Debug)]
struct NominatimReverseResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    address: Option<NominatimAddress>,
}

#[derive(Deserialize, Debug, Default)]
struct NominatimAddress {
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    town: Option<String>,
    #[serde(default)]
    village: Option<String>,
    #[serde(default)]
    hamlet: Option<String>,
    #[serde(default)]
    suburb: Option<String>,
    #[serde(default)]
    neighbourhood: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    province: Option<String>,
    #[serde(default)]
    county: Option<String>,
    #[serde(default)]
    country: Option<String>,
}

impl NominatimAddress {
    fn into_geocode(self) -> GeocodeResult {
        GeocodeResult {
            locality: self.city.or(self.town).or(self.village).or(self.hamlet),
            sub_locality: self.suburb.or(self.neighbourhood),
            admin_area: self.state.or(self.province).or(self.county),
            country: self.country,
        }
        .normalized()
    }
}

/// Live reverse geocoding via OpenStreetMap Nominatim.
pub struct NominatimReverse {
    endpoint: String,
    timeout: Duration,
}

impl NominatimReverse {
    pub fn new() -> Self {
        Self {
            endpoint: NOMINATIM_ENDPOINT.to_string(),
            timeout: REQUEST_TIMEOUT,
        }
    }

    /// Point at a different endpoint (self-hosted instances).
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: REQUEST_TIMEOUT,
        }
    }
}

impl Default for NominatimReverse {
    fn default() -> Self {
        Self::new()
    }
}

impl ReverseGeocoder for NominatimReverse {
    fn reverse(&self, coordinate: Coordinate) -> Result<GeocodeResult, GeocodeError> {
        let url = format!(
            "{}?lat={}&lon={}&format=jsonv2&addressdetails=1&zoom={}",
            self.endpoint, coordinate.lat, coordinate.lon, NOMINATIM_ZOOM,
        );

        let response = ureq::get(&url)
            .set("User-Agent", "TerraDart/0.3 (target-selection)")
            .timeout(self.timeout)
            .call()
            .map_err(|e| GeocodeError::Network(e.to_string()))?;

        let parsed: NominatimReverseResponse = response
            .into_json()
            .map_err(|e| GeocodeError::InvalidResponse(e.to_string()))?;

        // "Unable to geocode" is Nominatim's open-water answer, not a failure.
        if parsed.error.is_some() {
            return Ok(GeocodeResult::default());
        }

        Ok(parsed.address.unwrap_or_default().into_geocode())
    }
}
