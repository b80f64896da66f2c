//! Weighted coordinate sampler.
//!
//! Uniform sampling over the globe spends most draws on ocean and polar
//! terrain, so latitude comes from a three-tier mixture biased toward the
//! bands people actually live in. Longitude is uniform.

use crate::target::types::Coordinate;
use rand::Rng;

// ─── Mixture configuration ──────────────────────────────────────

/// Share of draws taken uniformly from the temperate band.
pub const TEMPERATE_WEIGHT: f64 = 0.75;
/// Share of draws taken uniformly from the tropical band.
pub const TROPICAL_WEIGHT: f64 = 0.18;
// The remaining share is uniform over the full latitude range.

/// Temperate band, where the bulk of the world's population lives.
pub const TEMPERATE_BAND: (f64, f64) = (-40.0, 60.0);
/// Tropical band, between the tropics.
pub const TROPICAL_BAND: (f64, f64) = (-23.5, 23.5);

/// Draw one candidate coordinate.
pub fn sample(rng: &mut impl Rng) -> Coordinate {
    let lon = rng.gen_range(-180.0..=180.0);
    let roll: f64 = rng.gen();
    let lat = if roll < TEMPERATE_WEIGHT {
        rng.gen_range(TEMPERATE_BAND.0..=TEMPERATE_BAND.1)
    } else if roll < TEMPERATE_WEIGHT + TROPICAL_WEIGHT {
        rng.gen_range(TROPICAL_BAND.0..=TROPICAL_BAND.1)
    } else {
        rng.gen_range(-90.0..=90.0)
    };
    Coordinate::new(lat, lon)
}

/// Measured latitude-band shares over `n` samples. Drives `--debug-bands`.
#[derive(Debug, Clone, Copy)]
pub struct BandDistribution {
    pub temperate: f64,
    pub tropical: f64,
    pub outside: f64,
}

pub fn band_distribution(rng: &mut impl Rng, n: usize) -> BandDistribution {
    let mut temperate = 0usize;
    let mut tropical = 0usize;
    for _ in 0..n {
        let c = sample(rng);
        if (TEMPERATE_BAND.0..=TEMPERATE_BAND.1).contains(&c.lat) {
            temperate += 1;
        }
        if (TROPICAL_BAND.0..=TROPICAL_BAND.1).contains(&c.lat) {
            tropical += 1;
        }
    }
    BandDistribution {
        temperate: temperate as f64 / n as f64,
        tropical: tropical as f64 / n as f64,
        outside: (n - temperate) as f64 / n as f64,
    }
}
