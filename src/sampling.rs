use crate::config::RunConfig;

/// Occupancy snapshots taken at a fixed stride after equilibration.
pub struct SampleTrace {
    equil_steps: usize,
    sample_stride: usize,
    samples: Vec<Vec<bool>>,
}

impl SampleTrace {
    pub fn new(run: &RunConfig) -> Self {
        Self {
            equil_steps: run.equil_steps,
            sample_stride: run.sample_stride,
            samples: Vec::with_capacity(Self::expected_len(run)),
        }
    }

    /// Number of samples a complete run records.
    pub fn expected_len(run: &RunConfig) -> usize {
        run.n_steps.saturating_sub(run.equil_steps) / run.sample_stride
    }

    pub fn is_sample_step(&self, step: usize) -> bool {
        step > self.equil_steps && (step - self.equil_steps) % self.sample_stride == 0
    }

    /// Append `occ` if `step` is a sampling step.
    pub fn record(&mut self, step: usize, occ: &[bool]) {
        if self.is_sample_step(step) {
            self.samples.push(occ.to_vec());
        }
    }

    pub fn into_samples(self) -> Vec<Vec<bool>> {
        self.samples
    }
}

/// Fraction of samples in which each site is occupied.
///
/// Sites get NaN when there are no samples.
pub fn occupancy_prob<'a, I>(samples: I, n_sites: usize) -> Vec<f64>
where
    I: IntoIterator<Item = &'a Vec<bool>>,
{
    let mut counts = vec![0usize; n_sites];
    let mut n_samples = 0;
    for sample in samples {
        n_samples += 1;
        for (count, &is_occ) in counts.iter_mut().zip(sample) {
            *count += is_occ as usize;
        }
    }
    counts
        .into_iter()
        .map(|count| count as f64 / n_samples as f64)
        .collect()
}

/// Mean of `vals` over a subset of sites.
pub fn class_mean(vals: &[f64], sites: &[usize]) -> f64 {
    sites.iter().map(|&site| vals[site]).sum::<f64>() / sites.len() as f64
}
