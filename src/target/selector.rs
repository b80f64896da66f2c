//! Target selection loop.
//!
//! sample → resolve → accept or retry, bounded by the attempt ceiling, with
//! the fallback catalog as the terminal path. Selection is total: it always
//! yields a target. Attempts are strictly sequential so at most one oracle
//! request is ever in flight.

use super::catalog::FallbackCatalog;
use super::providers::ReverseGeocoder;
use super::resolver::HabitabilityResolver;
use super::types::{Coordinate, TargetLocation, TargetSource};
use crate::sampler;
use rand::Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Attempt ceiling. Each attempt may cost a full oracle round-trip, so this
/// bounds worst-case selection latency.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 12;

/// Cooperative cancellation flag, checked between attempts.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

pub struct TargetSelector<G> {
    oracle: G,
    resolver: HabitabilityResolver,
    catalog: FallbackCatalog,
    max_attempts: u32,
}

impl<G: ReverseGeocoder> TargetSelector<G> {
    pub fn new(oracle: G, resolver: HabitabilityResolver, catalog: FallbackCatalog) -> Self {
        Self {
            oracle,
            resolver,
            catalog,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        assert!(max_attempts > 0, "attempt ceiling must be positive");
        self.max_attempts = max_attempts;
        self
    }

    pub fn catalog(&self) -> &FallbackCatalog {
        &self.catalog
    }

    /// Select a target with the configured ceiling. Total: falls back to
    /// the catalog on exhaustion, never fails outward.
    pub fn select(&self, rng: &mut impl Rng) -> TargetLocation {
        self.select_with_attempts(rng, self.max_attempts)
    }

    /// Select with an explicit ceiling for this run.
    pub fn select_with_attempts(&self, rng: &mut impl Rng, ceiling: u32) -> TargetLocation {
        self.run(rng, &CancelToken::new(), ceiling)
            .unwrap_or_else(|| self.catalog_pick(rng, ceiling))
    }

    /// The same loop, abandoning once `cancel` is set. A cancelled run
    /// yields nothing and mutates nothing.
    pub fn select_cancellable(
        &self,
        rng: &mut impl Rng,
        cancel: &CancelToken,
    ) -> Option<TargetLocation> {
        self.run(rng, cancel, self.max_attempts)
    }

    /// Classify a specific coordinate through the oracle.
    pub fn resolve(&self, coordinate: Coordinate) -> Option<String> {
        self.resolver.resolve(&self.oracle, coordinate)
    }

    /// Uniform catalog pick. Terminal path of the loop, and the whole path
    /// in offline mode.
    pub fn fallback(&self, rng: &mut impl Rng) -> TargetLocation {
        self.catalog_pick(rng, 0)
    }

    fn run(
        &self,
        rng: &mut impl Rng,
        cancel: &CancelToken,
        ceiling: u32,
    ) -> Option<TargetLocation> {
        for attempt in 1..=ceiling {
            if cancel.is_cancelled() {
                return None;
            }
            let candidate = sampler::sample(rng);
            if let Some(name) = self.resolver.resolve(&self.oracle, candidate) {
                return Some(TargetLocation {
                    name,
                    coordinate: candidate,
                    source: TargetSource::Geocoded,
                    attempts: attempt,
                });
            }
        }
        if cancel.is_cancelled() {
            return None;
        }
        Some(self.catalog_pick(rng, ceiling))
    }

    fn catalog_pick(&self, rng: &mut impl Rng, attempts: u32) -> TargetLocation {
        let entry = self.catalog.pick(rng);
        TargetLocation {
            name: entry.name.clone(),
            coordinate: entry.coordinate(),
            source: TargetSource::Fallback,
            attempts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::types::{GeocodeError, GeocodeResult};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::cell::Cell;

    fn selector<G: ReverseGeocoder>(oracle: G) -> TargetSelector<G> {
        TargetSelector::new(oracle, HabitabilityResolver::new(), FallbackCatalog::builtin())
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    fn habitable() -> GeocodeResult {
        GeocodeResult {
            locality: Some("Reykjavik".into()),
            country: Some("Iceland".into()),
            ..Default::default()
        }
    }

    struct FailingOracle {
        calls: Cell<u32>,
    }

    impl FailingOracle {
        fn new() -> Self {
            Self { calls: Cell::new(0) }
        }
    }

    impl ReverseGeocoder for FailingOracle {
        fn reverse(&self, _: Coordinate) -> Result<GeocodeResult, GeocodeError> {
            self.calls.set(self.calls.get() + 1);
            Err(GeocodeError::Network("timeout".into()))
        }
    }

    /// Succeeds with a habitable result from the nth call on.
    struct SucceedsOnNth {
        nth: u32,
        calls: Cell<u32>,
    }

    impl SucceedsOnNth {
        fn new(nth: u32) -> Self {
            Self { nth, calls: Cell::new(0) }
        }
    }

    impl ReverseGeocoder for SucceedsOnNth {
        fn reverse(&self, _: Coordinate) -> Result<GeocodeResult, GeocodeError> {
            self.calls.set(self.calls.get() + 1);
            if self.calls.get() >= self.nth {
                Ok(habitable())
            } else {
                Ok(GeocodeResult::default())
            }
        }
    }

    #[test]
    fn test_oracle_exhaustion_falls_back_to_catalog() {
        let selector = selector(FailingOracle::new()).with_max_attempts(10);
        let target = selector.select(&mut rng());

        assert_eq!(selector.oracle.calls.get(), 10);
        assert_eq!(target.source, TargetSource::Fallback);
        assert_eq!(target.attempts, 10);

        // The fallback is an exact catalog entry.
        let matched = selector.catalog().entries().iter().any(|entry| {
            entry.name == target.name
                && entry.lat == target.coordinate.lat
                && entry.lon == target.coordinate.lon
        });
        assert!(matched);
    }

    #[test]
    fn test_empty_oracle_results_also_fall_back() {
        let selector = selector(SucceedsOnNth::new(u32::MAX)).with_max_attempts(5);
        let target = selector.select(&mut rng());
        assert_eq!(selector.oracle.calls.get(), 5);
        assert_eq!(target.source, TargetSource::Fallback);
    }

    #[test]
    fn test_first_attempt_accepted() {
        let selector = selector(SucceedsOnNth::new(1));
        let target = selector.select(&mut rng());

        assert_eq!(selector.oracle.calls.get(), 1);
        assert_eq!(target.source, TargetSource::Geocoded);
        assert_eq!(target.name, "Reykjavik, Iceland");
        assert_eq!(target.attempts, 1);
        assert!(Coordinate::in_range(target.coordinate.lat, target.coordinate.lon));
    }

    #[test]
    fn test_retry_until_acceptance() {
        let selector = selector(SucceedsOnNth::new(5));
        let target = selector.select(&mut rng());
        assert_eq!(selector.oracle.calls.get(), 5);
        assert_eq!(target.attempts, 5);
        assert_eq!(target.source, TargetSource::Geocoded);
    }

    #[test]
    fn test_explicit_ceiling_overrides_configured_one() {
        let selector = selector(FailingOracle::new()).with_max_attempts(10);
        let target = selector.select_with_attempts(&mut rng(), 3);
        assert_eq!(selector.oracle.calls.get(), 3);
        assert_eq!(target.attempts, 3);
    }

    #[test]
    fn test_name_is_never_empty() {
        let selector = selector(SucceedsOnNth::new(3)).with_max_attempts(4);
        let mut rng = rng();
        for _ in 0..50 {
            let target = selector.select(&mut rng);
            assert!(!target.name.is_empty());
        }
    }

    #[test]
    fn test_cancelled_before_start_yields_nothing() {
        let selector = selector(FailingOracle::new());
        let cancel = CancelToken::new();
        cancel.cancel();

        assert!(selector.select_cancellable(&mut rng(), &cancel).is_none());
        assert_eq!(selector.oracle.calls.get(), 0);
    }

    #[test]
    fn test_uncancelled_token_selects_normally() {
        let selector = selector(SucceedsOnNth::new(1));
        let target = selector.select_cancellable(&mut rng(), &CancelToken::new());
        assert_eq!(target.unwrap().source, TargetSource::Geocoded);
    }

    #[test]
    fn test_offline_fallback_skips_oracle() {
        let selector = selector(FailingOracle::new());
        let target = selector.fallback(&mut rng());
        assert_eq!(selector.oracle.calls.get(), 0);
        assert_eq!(target.source, TargetSource::Fallback);
        assert_eq!(target.attempts, 0);
    }

    #[test]
    fn test_resolve_specific_coordinate() {
        let selector = selector(SucceedsOnNth::new(1));
        let name = selector.resolve(Coordinate::new(64.14, -21.94));
        assert_eq!(name.as_deref(), Some("Reykjavik, Iceland"));
    }
}
