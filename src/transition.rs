use crate::error::{SimError, SimResult};
use crate::lattice::Lattice;
use rand::Rng;
use rand_distr::{Distribution, weighted::WeightedIndex};

/// Draws destinations among free sites.
///
/// Reuses one buffer for the masked weights across draws.
pub struct TransitionSampler {
    weights: Vec<f64>,
}

impl TransitionSampler {
    pub fn new(n_sites: usize) -> Self {
        Self {
            weights: vec![0.0; n_sites],
        }
    }

    /// Draw the destination of a searcher leaving `origin` at `step`.
    ///
    /// `row` is the origin's row of the transition matrix. Occupied sites,
    /// the origin included, get zero weight before normalization.
    pub fn sample<R: Rng + ?Sized>(
        &mut self,
        origin: usize,
        row: &[f64],
        lattice: &Lattice,
        step: usize,
        rng: &mut R,
    ) -> SimResult<usize> {
        self.weights.fill(0.0);
        for site in lattice.free_sites() {
            self.weights[site] = row[site];
        }

        let degenerate = SimError::DegenerateTransition { site: origin, step };
        let sum: f64 = self.weights.iter().sum();
        if !(sum.is_finite() && sum > 0.0) {
            return Err(degenerate);
        }

        let dist = WeightedIndex::new(&self.weights).map_err(|_| degenerate)?;
        Ok(dist.sample(rng))
    }
}
