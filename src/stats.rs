use serde::{Deserialize, Serialize};

/// Mean and spread of a quantity over independent systems.
///
/// Values are folded in one at a time with Welford's update, so systems can
/// be added as they are read back.
#[derive(Debug, Clone, Default)]
pub struct Accumulator {
    n_vals: usize,
    mean: f64,
    m2: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccumulatorReport {
    pub n_vals: usize,
    pub mean: f64,
    pub std_dev: f64,
    /// Standard error of the mean, treating the values as independent.
    pub sem: f64,
}

impl Accumulator {
    pub fn add(&mut self, val: f64) {
        self.n_vals += 1;
        let delta = val - self.mean;
        self.mean += delta / self.n_vals as f64;
        self.m2 += delta * (val - self.mean);
    }

    pub fn n_vals(&self) -> usize {
        self.n_vals
    }

    /// NaN until a value has been added.
    pub fn mean(&self) -> f64 {
        match self.n_vals {
            0 => f64::NAN,
            _ => self.mean,
        }
    }

    /// Sample standard deviation, NaN with fewer than two values.
    pub fn std_dev(&self) -> f64 {
        match self.n_vals {
            0 | 1 => f64::NAN,
            n => (self.m2 / (n - 1) as f64).sqrt(),
        }
    }

    pub fn sem(&self) -> f64 {
        self.std_dev() / (self.n_vals as f64).sqrt()
    }

    pub fn report(&self) -> AccumulatorReport {
        AccumulatorReport {
            n_vals: self.n_vals,
            mean: self.mean(),
            std_dev: self.std_dev(),
            sem: self.sem(),
        }
    }
}

impl Extend<f64> for Accumulator {
    fn extend<I: IntoIterator<Item = f64>>(&mut self, iter: I) {
        for val in iter {
            self.add(val);
        }
    }
}

impl FromIterator<f64> for Accumulator {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut acc = Self::default();
        acc.extend(iter);
        acc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_mean_and_spread() {
        let acc: Accumulator = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0].into_iter().collect();
        let report = acc.report();
        assert_eq!(report.n_vals, 8);
        assert!((report.mean - 5.0).abs() < 1e-12);
        assert!((report.std_dev - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
        assert!((report.sem - (32.0f64 / 56.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn empty_and_single_values_report_nan() {
        let mut acc = Accumulator::default();
        assert!(acc.mean().is_nan());
        assert!(acc.std_dev().is_nan());

        acc.add(1.5);
        let report = acc.report();
        assert_eq!(report.mean, 1.5);
        assert!(report.std_dev.is_nan());
        assert!(report.sem.is_nan());
    }
}
