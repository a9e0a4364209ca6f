use crate::error::{SimError, SimResult};
use rand::{Rng, seq::index};
use rand_distr::{Distribution, Normal};

/// Number of searchers to place in a system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearcherCount {
    /// Nominal number of searchers.
    pub mean: usize,
    /// Spread of the actual number around `mean`; fixed count when absent.
    pub std_dev: Option<f64>,
}

/// Draw the number of searchers of one system.
///
/// A normal draw is truncated toward zero and clamped to `[1, n_sites]`.
pub fn draw_n_searchers<R: Rng + ?Sized>(
    n_sites: usize,
    count: SearcherCount,
    rng: &mut R,
) -> SimResult<usize> {
    if n_sites == 0 {
        return Err(SimError::InvalidConfiguration(
            "number of sites must be positive".to_string(),
        ));
    }
    match count.std_dev {
        None => {
            if !(1..=n_sites).contains(&count.mean) {
                return Err(SimError::InvalidConfiguration(format!(
                    "number of searchers must be in the range 1..={n_sites}, but is {}",
                    count.mean
                )));
            }
            Ok(count.mean)
        }
        Some(std_dev) => {
            let dist = Normal::new(count.mean as f64, std_dev).map_err(|err| {
                SimError::InvalidConfiguration(format!("invalid searcher spread: {err}"))
            })?;
            let n = dist.sample(rng).trunc() as i64;
            Ok(n.clamp(1, n_sites as i64) as usize)
        }
    }
}

/// Build an occupancy vector with searchers on distinct random sites.
pub fn init_occupancy<R: Rng + ?Sized>(
    n_sites: usize,
    count: SearcherCount,
    rng: &mut R,
) -> SimResult<Vec<bool>> {
    let n_searchers = draw_n_searchers(n_sites, count, rng)?;
    let mut occ = vec![false; n_sites];
    for site in index::sample(rng, n_sites, n_searchers) {
        occ[site] = true;
    }
    Ok(occ)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;

    fn n_occupied(occ: &[bool]) -> usize {
        occ.iter().filter(|&&is_occ| is_occ).count()
    }

    #[test]
    fn places_fixed_count() {
        let mut rng = ChaCha12Rng::seed_from_u64(5);
        let count = SearcherCount {
            mean: 7,
            std_dev: None,
        };
        for _ in 0..20 {
            let occ = init_occupancy(10, count, &mut rng).unwrap();
            assert_eq!(occ.len(), 10);
            assert_eq!(n_occupied(&occ), 7);
        }
    }

    #[test]
    fn clamps_normal_count() {
        let mut rng = ChaCha12Rng::seed_from_u64(5);
        let count = SearcherCount {
            mean: 3,
            std_dev: Some(10.0),
        };
        for _ in 0..200 {
            let occ = init_occupancy(6, count, &mut rng).unwrap();
            let n = n_occupied(&occ);
            assert!((1..=6).contains(&n), "count {n}");
        }
    }

    #[test]
    fn zero_spread_matches_mean() {
        let mut rng = ChaCha12Rng::seed_from_u64(5);
        let count = SearcherCount {
            mean: 4,
            std_dev: Some(0.0),
        };
        assert_eq!(draw_n_searchers(10, count, &mut rng).unwrap(), 4);
    }

    #[test]
    fn rejects_invalid_counts() {
        let mut rng = ChaCha12Rng::seed_from_u64(5);
        for count in [
            SearcherCount { mean: 0, std_dev: None },
            SearcherCount { mean: 11, std_dev: None },
            SearcherCount { mean: 2, std_dev: Some(-1.0) },
        ] {
            let result = init_occupancy(10, count, &mut rng);
            assert!(matches!(result, Err(SimError::InvalidConfiguration(_))));
        }
    }
}
