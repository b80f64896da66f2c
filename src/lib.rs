//! Terra Dart — weighted random target selection for the inhabited world.
//!
//! Draws coordinates biased toward populated latitude bands, classifies them
//! through a reverse-geocoding oracle, and falls back to a curated catalog
//! when sampling fails to find a named, land-based place within the attempt
//! ceiling.

pub mod sampler;
pub mod server;
pub mod target;
