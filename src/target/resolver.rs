//! Habitability resolver.
//!
//! Turns an oracle answer into a display name, or nothing when the
//! coordinate is not a plausibly inhabited place. The ocean-keyword filter
//! is a heuristic, not a landmask; false positives are accepted.

use super::providers::ReverseGeocoder;
use super::types::{Coordinate, GeocodeResult};

/// Keywords marking open water, matched as substrings of the joined,
/// lower-cased geocode fields.
pub const DEFAULT_OCEAN_KEYWORDS: &[&str] = &[
    "ocean", "sea", "pacific", "atlantic", "indian", "arctic", "southern",
];

/// Country whose targets are labeled with their administrative area instead
/// of a redundant country suffix.
pub const DEFAULT_HOME_COUNTRY: &str = "United States";

pub struct HabitabilityResolver {
    home_country: String,
    keywords: Vec<String>,
}

impl HabitabilityResolver {
    pub fn new() -> Self {
        Self::with_home_country(DEFAULT_HOME_COUNTRY)
    }

    pub fn with_home_country(home_country: impl Into<String>) -> Self {
        Self {
            home_country: home_country.into(),
            keywords: DEFAULT_OCEAN_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        }
    }

    /// Replace the ocean keyword list.
    pub fn with_keywords(mut self, keywords: Vec<String>) -> Self {
        self.keywords = keywords.into_iter().map(|k| k.to_lowercase()).collect();
        self
    }

    /// Query the oracle and classify the answer. Oracle failures count as
    /// "no result": logged, never propagated.
    pub fn resolve<G: ReverseGeocoder>(
        &self,
        oracle: &G,
        coordinate: Coordinate,
    ) -> Option<String> {
        let result = match oracle.reverse(coordinate) {
            Ok(result) => result.normalized(),
            Err(e) => {
                eprintln!("  geocode failed at {}: {}", coordinate, e);
                return None;
            }
        };
        self.classify(&result)
    }

    /// Classification without the oracle round-trip: a usable name, or
    /// nothing when extraction fails or the filter rejects the point.
    pub fn classify(&self, result: &GeocodeResult) -> Option<String> {
        let name = self.display_name(result)?;
        if name.is_empty() || self.is_uninhabited(result) {
            return None;
        }
        Some(name)
    }

    /// Priority cascade: locality, sub-locality, administrative area,
    /// country. A home-country locality gets its administrative area as the
    /// suffix; everything else gets the country when present.
    fn display_name(&self, result: &GeocodeResult) -> Option<String> {
        if let Some(locality) = &result.locality {
            let home = result
                .country
                .as_deref()
                .is_some_and(|c| c.eq_ignore_ascii_case(&self.home_country));
            let suffix = if home {
                result.admin_area.as_deref()
            } else {
                result.country.as_deref()
            };
            return Some(match suffix {
                Some(suffix) => format!("{}, {}", locality, suffix),
                None => locality.clone(),
            });
        }
        if let Some(sub_locality) = &result.sub_locality {
            return Some(with_country(sub_locality, result.country.as_deref()));
        }
        if let Some(admin_area) = &result.admin_area {
            return Some(with_country(admin_area, result.country.as_deref()));
        }
        result.country.clone()
    }

    /// Uninhabited when there is no locality-level detail at all, or any
    /// field mentions open water.
    fn is_uninhabited(&self, result: &GeocodeResult) -> bool {
        if result.locality.is_none()
            && result.sub_locality.is_none()
            && result.admin_area.is_none()
        {
            return true;
        }
        let joined = [
            result.locality.as_deref(),
            result.sub_locality.as_deref(),
            result.admin_area.as_deref(),
            result.country.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
        self.keywords.iter().any(|keyword| joined.contains(keyword.as_str()))
    }
}

impl Default for HabitabilityResolver {
    fn default() -> Self {
        Self::new()
    }
}

fn with_country(name: &str, country: Option<&str>) -> String {
    match country {
        Some(country) => format!("{}, {}", name, country),
        None => name.to_string(),
    }
}
