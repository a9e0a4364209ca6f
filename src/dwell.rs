use crate::config::ModelConfig;
use crate::error::{SimError, SimResult};
use crate::model::Registry;
use rand::Rng;
use rand_distr::{Distribution, Exp};
use serde::{Deserialize, Serialize};

/// How dwell times are drawn from the per-site means.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DwellMode {
    /// Dwell equals the site mean.
    Fixed,
    /// Dwell is exponentially distributed around the site mean.
    #[default]
    Exponential,
}

/// Contact graph between sites and the dwell multiplier it triggers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactBoost {
    /// Ordered neighbor sites of every site.
    pub neighbors: Vec<Vec<usize>>,
    /// Factor applied to the dwell of both searchers in contact.
    pub boost_factor: f64,
}

impl ContactBoost {
    /// Searcher on the first occupied neighbor of `site`, other than `idx`.
    ///
    /// Neighbors are scanned in their configured order and the scan stops at
    /// the first match.
    pub fn partner(&self, site: usize, idx: usize, registry: &Registry) -> Option<usize> {
        self.neighbors[site]
            .iter()
            .filter_map(|&nb| registry.owner(nb))
            .find(|&other| other != idx)
    }
}

pub struct DwellPolicy<'a> {
    mode: DwellMode,
    dwell_times: &'a [f64],
    exp_dists: Vec<Exp<f64>>,
    boost: Option<&'a ContactBoost>,
}

impl<'a> DwellPolicy<'a> {
    pub fn new(model: &'a ModelConfig) -> SimResult<Self> {
        let exp_dists = match model.dwell_mode {
            DwellMode::Fixed => Vec::new(),
            DwellMode::Exponential => model
                .dwell_times
                .iter()
                .map(|&mean| Exp::new(1.0 / mean))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|err| {
                    SimError::InvalidConfiguration(format!("invalid dwell time: {err}"))
                })?,
        };
        Ok(Self {
            mode: model.dwell_mode,
            dwell_times: &model.dwell_times,
            exp_dists,
            boost: model.contact.as_ref(),
        })
    }

    /// Draw a dwell time for `site`, without any boost.
    pub fn draw<R: Rng + ?Sized>(&self, site: usize, rng: &mut R) -> f64 {
        match self.mode {
            DwellMode::Fixed => self.dwell_times[site],
            DwellMode::Exponential => self.exp_dists[site].sample(rng),
        }
    }

    /// Schedule the next deadline of searcher `idx`, which just jumped at `step`.
    ///
    /// With a contact graph, the dwell is multiplied by the boost factor when
    /// the new site has an occupied neighbor, and that neighbor's deadline is
    /// replaced by the same boosted deadline. Returns the dwell assigned to
    /// `idx`.
    pub fn assign<R: Rng + ?Sized>(
        &self,
        idx: usize,
        step: usize,
        registry: &mut Registry,
        rng: &mut R,
    ) -> f64 {
        let site = registry.searcher(idx).site();
        let mut dwell = self.draw(site, rng);

        if let Some(boost) = self.boost {
            if let Some(partner) = boost.partner(site, idx, registry) {
                dwell *= boost.boost_factor;
                registry.set_deadline(partner, step as f64 + dwell);
            }
        }

        registry.set_deadline(idx, step as f64 + dwell);
        dwell
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;

    fn model(mode: DwellMode, contact: Option<ContactBoost>) -> ModelConfig {
        ModelConfig {
            trans_weights: vec![vec![1.0; 4]; 4],
            dwell_times: vec![1.0, 2.0, 3.0, 4.0],
            dwell_mode: mode,
            eligibility: Default::default(),
            contact,
        }
    }

    fn chain_boost(boost_factor: f64) -> ContactBoost {
        ContactBoost {
            neighbors: vec![vec![1], vec![0, 2], vec![1, 3], vec![2]],
            boost_factor,
        }
    }

    #[test]
    fn fixed_dwell_is_site_mean() {
        let model = model(DwellMode::Fixed, None);
        let policy = DwellPolicy::new(&model).unwrap();
        let mut rng = ChaCha12Rng::seed_from_u64(7);
        for site in 0..4 {
            assert_eq!(policy.draw(site, &mut rng), model.dwell_times[site]);
        }
    }

    #[test]
    fn exponential_dwell_matches_mean() {
        let model = model(DwellMode::Exponential, None);
        let policy = DwellPolicy::new(&model).unwrap();
        let mut rng = ChaCha12Rng::seed_from_u64(7);
        let n_draws = 20_000;
        let mean = (0..n_draws).map(|_| policy.draw(3, &mut rng)).sum::<f64>() / n_draws as f64;
        assert!((mean - 4.0).abs() < 0.2, "mean {mean}");
    }

    #[test]
    fn boost_applies_to_both_searchers() {
        let model = model(DwellMode::Fixed, Some(chain_boost(3.0)));
        let policy = DwellPolicy::new(&model).unwrap();
        let mut rng = ChaCha12Rng::seed_from_u64(0);
        let mut registry = Registry::new(&[true, false, false, true], &policy, &mut rng);

        registry.relocate(0, 2);
        let dwell = policy.assign(0, 5, &mut registry, &mut rng);

        assert_eq!(dwell, 9.0);
        assert_eq!(registry.searcher(0).deadline(), 14.0);
        assert_eq!(registry.searcher(1).deadline(), 14.0);
    }

    #[test]
    fn boost_draws_once_per_arrival() {
        let model = model(DwellMode::Exponential, Some(chain_boost(2.0)));
        let policy = DwellPolicy::new(&model).unwrap();
        let mut rng = ChaCha12Rng::seed_from_u64(11);
        let mut registry = Registry::new(&[true, false, false, true], &policy, &mut rng);
        registry.relocate(0, 2);

        let mut rng_ref = rng.clone();
        let dwell = policy.assign(0, 3, &mut registry, &mut rng);

        assert_eq!(dwell, 2.0 * policy.draw(2, &mut rng_ref));
        assert_eq!(registry.searcher(1).deadline(), 3.0 + dwell);
        assert_eq!(rng, rng_ref);
    }

    #[test]
    fn no_boost_without_occupied_neighbor() {
        let model = model(DwellMode::Fixed, Some(chain_boost(3.0)));
        let policy = DwellPolicy::new(&model).unwrap();
        let mut rng = ChaCha12Rng::seed_from_u64(0);
        let mut registry = Registry::new(&[false, false, true, false], &policy, &mut rng);

        registry.relocate(0, 0);
        let dwell = policy.assign(0, 5, &mut registry, &mut rng);

        assert_eq!(dwell, 1.0);
        assert_eq!(registry.searcher(0).deadline(), 6.0);
    }

    #[test]
    fn partner_is_first_neighbor_in_order() {
        let model = model(DwellMode::Fixed, Some(chain_boost(2.0)));
        let policy = DwellPolicy::new(&model).unwrap();
        let mut rng = ChaCha12Rng::seed_from_u64(0);
        let mut registry = Registry::new(&[true, false, true, false], &policy, &mut rng);

        let boost = model.contact.as_ref().unwrap();
        registry.relocate(1, 1);
        assert_eq!(boost.partner(1, 1, &registry), Some(0));

        registry.relocate(0, 2);
        assert_eq!(boost.partner(1, 1, &registry), Some(0));
        assert_eq!(boost.partner(3, 5, &registry), Some(0));
        assert_eq!(boost.partner(3, 0, &registry), None);
    }
}
