//! Fallback catalog: curated named coordinates used when probabilistic
//! sampling fails to find an acceptable target within the attempt ceiling.
//!
//! The built-in list is compiled in; a JSON file (explicit path, or
//! ~/.terradart/catalog.json) can replace it without touching the selection
//! algorithm.

use super::types::{CatalogError, Coordinate};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// One curated location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackEntry {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

impl FallbackEntry {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lon)
    }
}

// Spread across continents and hemispheres so fallback games still vary.
const BUILTIN_TARGETS: &[(&str, f64, f64)] = &[
    ("Reykjavik, Iceland", 64.1466, -21.9426),
    ("Nairobi, Kenya", -1.2921, 36.8219),
    ("Wellington, New Zealand", -41.2866, 174.7756),
    ("Ushuaia, Argentina", -54.8019, -68.3030),
    ("Tromso, Norway", 69.6492, 18.9553),
    ("Kathmandu, Nepal", 27.7172, 85.3240),
    ("Cusco, Peru", -13.5320, -71.9675),
    ("Marrakesh, Morocco", 31.6295, -7.9811),
    ("Ulaanbaatar, Mongolia", 47.8864, 106.9057),
    ("Suva, Fiji", -18.1416, 178.4419),
    ("Anchorage, Alaska", 61.2181, -149.9003),
    ("Dakar, Senegal", 14.7167, -17.4677),
    ("Hobart, Tasmania", -42.8821, 147.3272),
    ("Tbilisi, Georgia", 41.7151, 44.8271),
    ("Windhoek, Namibia", -22.5609, 17.0658),
    ("Quito, Ecuador", -0.1807, -78.4678),
    ("Luang Prabang, Laos", 19.8867, 102.1350),
    ("Nuuk, Greenland", 64.1835, -51.7216),
];

/// The fixed, read-only set of known-good targets.
#[derive(Debug, Clone)]
pub struct FallbackCatalog {
    entries: Vec<FallbackEntry>,
}

impl FallbackCatalog {
    /// The compiled-in catalog.
    pub fn builtin() -> Self {
        let entries = BUILTIN_TARGETS
            .iter()
            .map(|&(name, lat, lon)| FallbackEntry {
                name: name.to_string(),
                lat,
                lon,
            })
            .collect();
        Self { entries }
    }

    /// Load from a JSON file: an array of `{ name, lat, lon }`.
    pub fn from_json_file(path: &Path) -> Result<Self, CatalogError> {
        let data = fs::read_to_string(path).map_err(|e| CatalogError::Io(e.to_string()))?;
        let entries: Vec<FallbackEntry> =
            serde_json::from_str(&data).map_err(|e| CatalogError::Parse(e.to_string()))?;
        Self::from_entries(entries)
    }

    /// Validate and wrap a list of entries.
    pub fn from_entries(entries: Vec<FallbackEntry>) -> Result<Self, CatalogError> {
        if entries.is_empty() {
            return Err(CatalogError::Empty);
        }
        for entry in &entries {
            if entry.name.trim().is_empty() {
                return Err(CatalogError::InvalidEntry(format!(
                    "unnamed entry at {:.4}, {:.4}",
                    entry.lat, entry.lon
                )));
            }
            if !Coordinate::in_range(entry.lat, entry.lon) {
                return Err(CatalogError::InvalidEntry(format!(
                    "'{}' has out-of-range coordinates",
                    entry.name
                )));
            }
        }
        Ok(Self { entries })
    }

    /// Load the catalog: explicit path, then the home-dir override, then
    /// the built-in list.
    pub fn load(explicit: Option<&Path>) -> Result<Self, CatalogError> {
        if let Some(path) = explicit {
            return Self::from_json_file(path);
        }
        if let Some(path) = Self::override_path() {
            if path.exists() {
                return Self::from_json_file(&path);
            }
        }
        Ok(Self::builtin())
    }

    fn override_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".terradart").join("catalog.json"))
    }

    pub fn entries(&self) -> &[FallbackEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Uniform pick.
    pub fn pick(&self, rng: &mut impl Rng) -> &FallbackEntry {
        &self.entries[rng.gen_range(0..self.entries.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;
    use tempfile::TempDir;

    #[test]
    fn test_builtin_is_valid() {
        let catalog = FallbackCatalog::builtin();
        assert!(!catalog.is_empty());
        for entry in catalog.entries() {
            assert!(!entry.name.trim().is_empty());
            assert!(Coordinate::in_range(entry.lat, entry.lon));
        }
    }

    #[test]
    fn test_json_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catalog.json");
        let json = serde_json::to_string_pretty(FallbackCatalog::builtin().entries()).unwrap();
        fs::write(&path, json).unwrap();

        let loaded = FallbackCatalog::from_json_file(&path).unwrap();
        assert_eq!(loaded.entries(), FallbackCatalog::builtin().entries());
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.json");
        fs::write(&path, r#"[{"name": "Lone Pine", "lat": 36.6, "lon": -118.06}]"#).unwrap();

        let catalog = FallbackCatalog::load(Some(&path)).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.entries()[0].name, "Lone Pine");
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = FallbackCatalog::from_json_file(&dir.path().join("absent.json"));
        assert!(matches!(result, Err(CatalogError::Io(_))));
    }

    #[test]
    fn test_malformed_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            FallbackCatalog::from_json_file(&path),
            Err(CatalogError::Parse(_))
        ));
    }

    #[test]
    fn test_empty_catalog_rejected() {
        assert!(matches!(
            FallbackCatalog::from_entries(vec![]),
            Err(CatalogError::Empty)
        ));
    }

    #[test]
    fn test_unnamed_entry_rejected() {
        let entries = vec![FallbackEntry {
            name: "  ".into(),
            lat: 0.0,
            lon: 0.0,
        }];
        assert!(matches!(
            FallbackCatalog::from_entries(entries),
            Err(CatalogError::InvalidEntry(_))
        ));
    }

    #[test]
    fn test_out_of_range_entry_rejected() {
        let entries = vec![FallbackEntry {
            name: "Nowhere".into(),
            lat: 95.0,
            lon: 0.0,
        }];
        assert!(matches!(
            FallbackCatalog::from_entries(entries),
            Err(CatalogError::InvalidEntry(_))
        ));
    }

    #[test]
    fn test_pick_is_a_member_and_varies() {
        let catalog = FallbackCatalog::builtin();
        let mut rng = StdRng::seed_from_u64(99);
        let mut seen = HashSet::new();
        for _ in 0..200 {
            let entry = catalog.pick(&mut rng);
            assert!(catalog.entries().contains(entry));
            seen.insert(entry.name.clone());
        }
        assert!(seen.len() > 1);
    }
}
