use crate::config::Config;
use crate::engine::{Engine, RunOutput};
use crate::error::SimResult;
use crate::init::{SearcherCount, init_occupancy};
use crate::sampling::{class_mean, occupancy_prob};
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Runs of every system of one searcher configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigResult {
    /// Nominal number of searchers.
    pub mu: usize,
    /// Seed of the sweep the runs belong to.
    pub seed: u64,
    /// One output per independent system.
    pub systems: Vec<RunOutput>,
}

impl ConfigResult {
    /// Run every system of configuration `mu`.
    ///
    /// System `i_sys` uses stream `mu * n_systems + i_sys` of the sweep seed,
    /// both to place its searchers and to run.
    pub fn run(cfg: &Config, mu: usize, seed: u64) -> SimResult<Self> {
        let n_sites = cfg.model.n_sites();
        let n_systems = cfg.init.n_systems;
        let count = SearcherCount {
            mean: mu,
            std_dev: cfg.init.std_dev,
        };

        let mut systems = Vec::with_capacity(n_systems);
        for i_sys in 0..n_systems {
            let mut rng = ChaCha12Rng::seed_from_u64(seed);
            rng.set_stream((mu * n_systems + i_sys) as u64);

            let init_occ = init_occupancy(n_sites, count, &mut rng)?;
            let output = Engine::new(&cfg.model, &cfg.run, &init_occ, rng)?.run()?;
            systems.push(output);
        }

        Ok(Self { mu, seed, systems })
    }

    pub fn n_sites(&self) -> usize {
        self.systems.first().map_or(0, |output| output.final_occ.len())
    }

    /// Time-averaged occupancy probability of every site, pooling the
    /// samples of all systems.
    pub fn occupancy_prob(&self) -> Vec<f64> {
        let samples = self.systems.iter().flat_map(|output| &output.samples);
        occupancy_prob(samples, self.n_sites())
    }

    /// Number of systems with each site occupied at the end of the run.
    pub fn final_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.n_sites()];
        for output in &self.systems {
            for (count, &is_occ) in counts.iter_mut().zip(&output.final_occ) {
                *count += is_occ as usize;
            }
        }
        counts
    }

    /// Jump counts summed over systems.
    pub fn total_jumps(&self) -> Vec<Vec<u64>> {
        let n_sites = self.n_sites();
        let mut jumps = vec![vec![0; n_sites]; n_sites];
        for output in &self.systems {
            for (row, out_row) in jumps.iter_mut().zip(&output.jumps) {
                for (count, &out_count) in row.iter_mut().zip(out_row) {
                    *count += out_count;
                }
            }
        }
        jumps
    }
}

/// Class means and their ratio for every configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioTable {
    pub num_means: BTreeMap<usize, f64>,
    pub den_means: BTreeMap<usize, f64>,
    pub ratios: BTreeMap<usize, f64>,
    /// Configurations in ascending order.
    pub mus: Vec<usize>,
    /// Ratios aligned with `mus`.
    pub ratio_vec: Vec<f64>,
}

/// Results of a sweep over searcher configurations, keyed by `mu`.
#[derive(Debug, Default)]
pub struct JumpingModel {
    results: BTreeMap<usize, ConfigResult>,
}

impl JumpingModel {
    /// Run every configuration of `cfg` with the sweep seed `seed`.
    ///
    /// Configurations run in parallel; results do not depend on scheduling
    /// since every system owns its random stream.
    pub fn run(cfg: &Config, seed: u64) -> SimResult<Self> {
        let results = cfg
            .init
            .n_searchers
            .par_iter()
            .map(|&mu| -> SimResult<ConfigResult> {
                let result = ConfigResult::run(cfg, mu, seed)?;
                log::info!("finished configuration with {mu} searchers");
                Ok(result)
            })
            .collect::<SimResult<Vec<_>>>()?;

        let mut model = Self::default();
        for result in results {
            model.insert(result);
        }
        Ok(model)
    }

    pub fn insert(&mut self, result: ConfigResult) {
        self.results.insert(result.mu, result);
    }

    pub fn get(&self, mu: usize) -> Option<&ConfigResult> {
        self.results.get(&mu)
    }

    /// Results in ascending order of `mu`.
    pub fn results(&self) -> impl Iterator<Item = &ConfigResult> {
        self.results.values()
    }

    pub fn mus(&self) -> Vec<usize> {
        self.results.keys().copied().collect()
    }

    /// Ratio of the mean occupancy of `num_sites` to that of `den_sites`.
    pub fn ratio_table(&self, num_sites: &[usize], den_sites: &[usize]) -> RatioTable {
        let mut num_means = BTreeMap::new();
        let mut den_means = BTreeMap::new();
        let mut ratios = BTreeMap::new();
        for (&mu, result) in &self.results {
            let prob = result.occupancy_prob();
            let num_mean = class_mean(&prob, num_sites);
            let den_mean = class_mean(&prob, den_sites);
            num_means.insert(mu, num_mean);
            den_means.insert(mu, den_mean);
            ratios.insert(mu, num_mean / den_mean);
        }
        RatioTable {
            num_means,
            den_means,
            mus: ratios.keys().copied().collect(),
            ratio_vec: ratios.values().copied().collect(),
            ratios,
        }
    }
}
