//! Core types for the target-selection subsystem.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A point on the globe. Immutable value; construction checks the ranges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        assert!((-90.0..=90.0).contains(&lat), "Latitude must be between -90 and 90");
        assert!((-180.0..=180.0).contains(&lon), "Longitude must be between -180 and 180");
        Self { lat, lon }
    }

    /// Range check without constructing — for validating external input.
    pub fn in_range(lat: f64, lon: f64) -> bool {
        (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ns = if self.lat >= 0.0 { 'N' } else { 'S' };
        let ew = if self.lon >= 0.0 { 'E' } else { 'W' };
        write!(
            f,
            "{:.4}\u{00B0}{}, {:.4}\u{00B0}{}",
            self.lat.abs(),
            ns,
            self.lon.abs(),
            ew
        )
    }
}

/// What the reverse-geocoding oracle knows about a coordinate.
///
/// All fields optional. Absence of every field means "no resolvable place".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    #[serde(default)]
    pub locality: Option<String>,
    #[serde(default)]
    pub sub_locality: Option<String>,
    #[serde(default)]
    pub admin_area: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

impl GeocodeResult {
    /// Collapse empty and whitespace-only fields to absent.
    pub fn normalized(self) -> Self {
        fn clean(field: Option<String>) -> Option<String> {
            field.filter(|s| !s.trim().is_empty())
        }
        Self {
            locality: clean(self.locality),
            sub_locality: clean(self.sub_locality),
            admin_area: clean(self.admin_area),
            country: clean(self.country),
        }
    }
}

/// How a target was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetSource {
    Geocoded,
    Fallback,
}

impl fmt::Display for TargetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Geocoded => write!(f, "Geocoded"),
            Self::Fallback => write!(f, "Built-in"),
        }
    }
}

/// A selected target: the only externally visible artifact of a selection.
///
/// Immutable once returned; a later selection supersedes it, never mutates it.
/// The name is always a resolved place name or a catalog name, never empty
/// and never a raw coordinate string.
#[derive(Debug, Clone, Serialize)]
pub struct TargetLocation {
    pub name: String,
    pub coordinate: Coordinate,
    pub source: TargetSource,
    /// Oracle queries spent producing this target. Zero for a direct
    /// catalog pick.
    pub attempts: u32,
}

/// Oracle failures. Always recovered by the selection loop, never surfaced.
#[derive(Debug)]
pub enum GeocodeError {
    Network(String),
    InvalidResponse(String),
}

impl fmt::Display for GeocodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(msg) => write!(f, "Network error: {}", msg),
            Self::InvalidResponse(msg) => write!(f, "Invalid API response: {}", msg),
        }
    }
}

impl std::error::Error for GeocodeError {}

/// Catalog loading failures.
#[derive(Debug)]
pub enum CatalogError {
    Io(String),
    Parse(String),
    Empty,
    InvalidEntry(String),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "Cannot read catalog: {}", msg),
            Self::Parse(msg) => write!(f, "Malformed catalog: {}", msg),
            Self::Empty => write!(f, "Catalog has no entries"),
            Self::InvalidEntry(msg) => write!(f, "Invalid catalog entry: {}", msg),
        }
    }
}

impl std::error::Error for CatalogError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_display() {
        assert_eq!(
            Coordinate::new(48.8566, 2.3522).to_string(),
            "48.8566\u{00B0}N, 2.3522\u{00B0}E"
        );
        assert_eq!(
            Coordinate::new(-41.2866, -174.7756).to_string(),
            "41.2866\u{00B0}S, 174.7756\u{00B0}W"
        );
    }

    #[test]
    fn test_coordinate_in_range() {
        assert!(Coordinate::in_range(90.0, 180.0));
        assert!(Coordinate::in_range(-90.0, -180.0));
        assert!(!Coordinate::in_range(90.1, 0.0));
        assert!(!Coordinate::in_range(0.0, -180.5));
    }

    #[test]
    #[should_panic(expected = "Latitude")]
    fn test_coordinate_rejects_bad_latitude() {
        Coordinate::new(91.0, 0.0);
    }

    #[test]
    fn test_geocode_normalization() {
        let result = GeocodeResult {
            locality: Some("".into()),
            sub_locality: Some("   ".into()),
            admin_area: Some("Bavaria".into()),
            country: Some("Germany".into()),
        }
        .normalized();
        assert!(result.locality.is_none());
        assert!(result.sub_locality.is_none());
        assert_eq!(result.admin_area.as_deref(), Some("Bavaria"));
        assert_eq!(result.country.as_deref(), Some("Germany"));
    }
}
