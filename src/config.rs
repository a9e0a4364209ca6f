use crate::dwell::{ContactBoost, DwellMode};
use crate::engine::Eligibility;
use crate::utils::{check_idxs, check_mat, check_num, check_vec};
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fs, path::Path};

/// Simulation configuration parameters.
///
/// Loaded from a TOML file and validated before use.
/// See [`Config::from_file`] for loading.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Sites, affinities and dwell behavior.
    pub model: ModelConfig,
    /// Searcher configurations of the sweep.
    pub init: InitConfig,
    /// Length and sampling of every run.
    pub run: RunConfig,
    /// Site classes compared by the analysis.
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Transition weights (matrix `n_sites x n_sites`).
    pub trans_weights: Vec<Vec<f64>>,
    /// Mean dwell time of every site.
    pub dwell_times: Vec<f64>,

    #[serde(default)]
    pub dwell_mode: DwellMode,
    #[serde(default)]
    pub eligibility: Eligibility,

    /// Optional contact graph boosting the dwell of neighboring searchers.
    pub contact: Option<ContactBoost>,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct InitConfig {
    /// Nominal number of searchers of each configuration.
    pub n_searchers: Vec<usize>,
    /// Spread of the per-system number of searchers around the nominal one.
    pub std_dev: Option<f64>,
    /// Number of independent systems per configuration.
    #[serde(default = "default_n_systems")]
    pub n_systems: usize,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Number of steps of every run.
    pub n_steps: usize,
    /// Number of initial steps excluded from sampling.
    #[serde(default)]
    pub equil_steps: usize,
    /// Number of steps between occupancy samples.
    #[serde(default = "default_sample_stride")]
    pub sample_stride: usize,
    /// Seed of the sweep; drawn at random when absent.
    pub seed: Option<u64>,
}

#[derive(Debug, Default, PartialEq, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Named site classes, e.g. `high` and `low` affinity sites.
    #[serde(default)]
    pub classes: BTreeMap<String, Vec<usize>>,
    /// Pairs of class names `(numerator, denominator)` to compare.
    #[serde(default)]
    pub ratios: Vec<(String, String)>,
}

fn default_n_systems() -> usize {
    1
}

fn default_sample_stride() -> usize {
    1
}

impl Config {
    /// Load a [`Config`] from a file.
    ///
    /// The file must be TOML-encoded and contain a serialized [`Config`].
    /// Performs validation on all parameters before returning.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, deserialized,
    /// or if the configuration values are invalid.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let contents =
            fs::read_to_string(file).with_context(|| format!("failed to read {file:?}"))?;

        let config: Config = toml::from_str(&contents).context("failed to deserialize config")?;

        config.validate().context("failed to validate config")?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.model.validate().context("invalid model")?;
        self.init
            .validate(self.model.n_sites())
            .context("invalid initial condition")?;
        self.run.validate().context("invalid run parameters")?;
        self.analysis
            .validate(self.model.n_sites())
            .context("invalid analysis parameters")?;
        Ok(())
    }
}

impl ModelConfig {
    pub fn n_sites(&self) -> usize {
        self.dwell_times.len()
    }

    pub fn validate(&self) -> Result<()> {
        let n_sites = self.n_sites();
        check_num(n_sites, 1..).context("invalid number of sites")?;

        check_vec(&self.dwell_times, n_sites, true).context("invalid dwell times")?;
        check_mat(&self.trans_weights, (n_sites, n_sites))
            .context("invalid transition weights")?;

        if let Some(contact) = &self.contact {
            let n_rows = contact.neighbors.len();
            if n_rows != n_sites {
                bail!("contact graph must have {n_sites} rows, but has {n_rows}");
            }
            for (site, nbs) in contact.neighbors.iter().enumerate() {
                check_idxs(nbs, n_sites)
                    .with_context(|| format!("invalid neighbors of site {site}"))?;
            }
            check_vec(&[contact.boost_factor], 1, true).context("invalid boost factor")?;
        }

        Ok(())
    }
}

impl InitConfig {
    fn validate(&self, n_sites: usize) -> Result<()> {
        if self.n_searchers.is_empty() {
            bail!("at least one number of searchers is required");
        }
        for &mu in &self.n_searchers {
            check_num(mu, 1..=n_sites).context("invalid number of searchers")?;
        }
        let mut sorted = self.n_searchers.clone();
        sorted.sort_unstable();
        if sorted.windows(2).any(|pair| pair[0] == pair[1]) {
            bail!("numbers of searchers must be unique");
        }
        if let Some(std_dev) = self.std_dev {
            check_num(std_dev, 0.0..f64::INFINITY).context("invalid searcher spread")?;
        }
        check_num(self.n_systems, 1..100_000).context("invalid number of systems")?;
        Ok(())
    }
}

impl RunConfig {
    pub fn validate(&self) -> Result<()> {
        check_num(self.n_steps, 1..).context("invalid number of steps")?;
        check_num(self.equil_steps, 0..self.n_steps)
            .context("invalid number of equilibration steps")?;
        check_num(self.sample_stride, 1..).context("invalid sample stride")?;
        Ok(())
    }
}

impl AnalysisConfig {
    fn validate(&self, n_sites: usize) -> Result<()> {
        for (name, sites) in &self.classes {
            if sites.is_empty() {
                bail!("class {name:?} must have at least one site");
            }
            check_idxs(sites, n_sites).with_context(|| format!("invalid sites of {name:?}"))?;
        }
        for (num, den) in &self.ratios {
            for name in [num, den] {
                if !self.classes.contains_key(name) {
                    bail!("ratio refers to undefined class {name:?}");
                }
            }
        }
        Ok(())
    }
}
