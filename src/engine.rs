use crate::config::{ModelConfig, RunConfig};
use crate::dwell::DwellPolicy;
use crate::error::{SimError, SimResult};
use crate::model::Registry;
use crate::sampling::SampleTrace;
use crate::transition::TransitionSampler;
use anyhow::{Context, bail};
use rand_chacha::ChaCha12Rng;
use serde::{Deserialize, Serialize};

/// When a searcher becomes eligible to jump relative to its deadline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Eligibility {
    /// Eligible once `step > deadline`.
    #[default]
    AfterDeadline,
    /// Eligible once `step >= deadline`.
    AtDeadline,
}

impl Eligibility {
    pub fn is_eligible(self, step: usize, deadline: f64) -> bool {
        let step = step as f64;
        match self {
            Eligibility::AfterDeadline => step > deadline,
            Eligibility::AtDeadline => step >= deadline,
        }
    }
}

/// Result of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutput {
    /// Occupancy after the last step.
    pub final_occ: Vec<bool>,
    /// Number of jumps between every pair of sites (matrix `n_sites x n_sites`).
    pub jumps: Vec<Vec<u64>>,
    /// Occupancy samples taken after equilibration.
    pub samples: Vec<Vec<bool>>,
    /// Total number of jumps performed.
    pub n_jumps: u64,
}

/// Simulation engine.
///
/// Holds the searcher registry, jump counts, sample trace and the random
/// number generator of a single run. An engine is consumed by [`Engine::run`],
/// so a run can neither be resumed nor repeated.
pub struct Engine<'a> {
    model: &'a ModelConfig,
    run: &'a RunConfig,
    registry: Registry,
    sampler: TransitionSampler,
    dwell: DwellPolicy<'a>,
    trace: SampleTrace,
    jumps: Vec<Vec<u64>>,
    n_jumps: u64,
    rng: ChaCha12Rng,
}

impl<'a> Engine<'a> {
    /// Create an engine with one searcher per occupied site of `init_occ`.
    ///
    /// `rng` is the only source of randomness of the run, used for both
    /// initial deadlines and every later draw.
    ///
    /// # Errors
    /// Returns [`SimError::InvalidConfiguration`] if the inputs are malformed.
    pub fn new(
        model: &'a ModelConfig,
        run: &'a RunConfig,
        init_occ: &[bool],
        mut rng: ChaCha12Rng,
    ) -> SimResult<Self> {
        check_inputs(model, run, init_occ)
            .map_err(|err| SimError::InvalidConfiguration(format!("{err:#}")))?;

        let n_sites = model.n_sites();
        let dwell = DwellPolicy::new(model)?;
        let registry = Registry::new(init_occ, &dwell, &mut rng);

        Ok(Self {
            model,
            run,
            registry,
            sampler: TransitionSampler::new(n_sites),
            dwell,
            trace: SampleTrace::new(run),
            jumps: vec![vec![0; n_sites]; n_sites],
            n_jumps: 0,
            rng,
        })
    }

    /// Perform every step of the run.
    ///
    /// # Errors
    /// Returns [`SimError::DegenerateTransition`] if a searcher has nowhere to
    /// go; the partial run is discarded.
    pub fn run(mut self) -> SimResult<RunOutput> {
        let n_steps = self.run.n_steps;
        let log_every = n_steps.div_ceil(10);

        for step in 1..=n_steps {
            self.perform_step(step)?;

            if step % log_every == 0 || step == n_steps {
                let progress = 100.0 * step as f64 / n_steps as f64;
                log::debug!("completed {progress:06.2}%");
            }
        }

        Ok(RunOutput {
            final_occ: self.registry.into_lattice().as_slice().to_vec(),
            jumps: self.jumps,
            samples: self.trace.into_samples(),
            n_jumps: self.n_jumps,
        })
    }

    fn perform_step(&mut self, step: usize) -> SimResult<()> {
        // Searchers move one after the other and see the moves made earlier
        // in the same step.
        for idx in 0..self.registry.len() {
            let searcher = self.registry.searcher(idx);
            if !self.model.eligibility.is_eligible(step, searcher.deadline()) {
                continue;
            }

            let origin = searcher.site();
            let dest = self.sampler.sample(
                origin,
                &self.model.trans_weights[origin],
                self.registry.lattice(),
                step,
                &mut self.rng,
            )?;

            self.registry.relocate(idx, dest);
            self.jumps[origin][dest] += 1;
            self.n_jumps += 1;

            self.dwell.assign(idx, step, &mut self.registry, &mut self.rng);
        }

        self.trace.record(step, self.registry.lattice().as_slice());

        Ok(())
    }
}

fn check_inputs(model: &ModelConfig, run: &RunConfig, init_occ: &[bool]) -> anyhow::Result<()> {
    model.validate().context("invalid model")?;
    run.validate().context("invalid run parameters")?;

    let n_sites = model.n_sites();
    let len = init_occ.len();
    if len != n_sites {
        bail!("initial occupancy length must be {n_sites}, but is {len}");
    }
    let n_occ = init_occ.iter().filter(|&&is_occ| is_occ).count();
    if !(1..=n_sites).contains(&n_occ) {
        bail!("number of searchers must be in the range 1..={n_sites}, but is {n_occ}");
    }

    Ok(())
}
