//! Seeded synthetic catalogs for benchmarks and scale tests.
//!
//! Produces a [`RawCatalog`] whose shape resembles a real steward worksheet:
//! repair times between 2 and 24 hours, scenario likelihoods between 0.0001 and
//! 0.9, and each steward faulting in a scenario with probability `fault_rate`.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::RawCatalog;

/// Generate a catalog of `stewards` x `scenarios` from `seed`.
///
/// The same arguments always produce the same catalog.
pub fn synthetic_catalog(
    stewards: usize,
    scenarios: usize,
    fault_rate: f64,
    seed: u64,
) -> RawCatalog {
    let mut rng = StdRng::seed_from_u64(seed);
    let fault_rate = fault_rate.clamp(0.0, 1.0);

    let scenario_names = (0..scenarios).map(|i| format!("scenario {i}")).collect();
    let likelihoods = (0..scenarios)
        .map(|_| {
            let raw: f64 = rng.gen_range(0.0001..0.9);
            (raw * 10_000.0).round() / 10_000.0
        })
        .collect();
    let steward_names = (0..stewards).map(|i| format!("Steward {i}")).collect();
    let repair_times = (0..stewards)
        .map(|_| rng.gen_range(2..=24) as f64)
        .collect();
    let fault_matrix = (0..stewards)
        .map(|_| {
            (0..scenarios)
                .map(|_| u8::from(rng.gen_bool(fault_rate)))
                .collect()
        })
        .collect();

    RawCatalog {
        f: 0,
        scenario_names,
        likelihoods,
        steward_names,
        repair_times,
        fault_matrix,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FaultCatalog;

    #[test]
    fn same_seed_same_catalog() {
        assert_eq!(
            synthetic_catalog(9, 12, 0.3, 7),
            synthetic_catalog(9, 12, 0.3, 7)
        );
        assert_ne!(
            synthetic_catalog(9, 12, 0.3, 7),
            synthetic_catalog(9, 12, 0.3, 8)
        );
    }

    #[test]
    fn synthetic_catalog_validates() {
        let raw = synthetic_catalog(13, 20, 0.25, 42);
        let catalog = FaultCatalog::from_raw(&raw).unwrap();
        assert_eq!(catalog.steward_count(), 13);
        assert_eq!(catalog.scenario_count(), 20);
    }
}
