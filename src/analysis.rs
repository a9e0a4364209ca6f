use crate::config::{AnalysisConfig, Config};
use crate::engine::RunOutput;
use crate::sampling::{class_mean, occupancy_prob};
use crate::stats::Accumulator;
use crate::sweep::{ConfigResult, JumpingModel};
use anyhow::{Context, Result};
use std::{fs::File, io::BufWriter, path::Path};

/// Observable computed from the systems of one configuration.
pub trait Obs {
    fn update(&mut self, output: &RunOutput);
    fn report(&self) -> serde_json::Value;
}

/// Per-site occupancy probability, averaged over systems.
pub struct SiteOccupancy {
    acc_vec: Vec<Accumulator>,
}

impl SiteOccupancy {
    pub fn new(n_sites: usize) -> Self {
        let mut acc_vec = Vec::new();
        acc_vec.resize_with(n_sites, Accumulator::default);
        Self { acc_vec }
    }
}

impl Obs for SiteOccupancy {
    fn update(&mut self, output: &RunOutput) {
        let prob = occupancy_prob(&output.samples, self.acc_vec.len());
        for (acc, prob) in self.acc_vec.iter_mut().zip(prob) {
            acc.add(prob);
        }
    }

    fn report(&self) -> serde_json::Value {
        let reports: Vec<_> = self.acc_vec.iter().map(Accumulator::report).collect();
        serde_json::json!({ "site_occupancy": reports })
    }
}

/// Time-averaged mean occupancy of a site class, with its spread over systems.
pub struct ClassOccupancy {
    name: String,
    sites: Vec<usize>,
    n_sites: usize,
    acc: Accumulator,
}

impl ClassOccupancy {
    pub fn new(name: &str, sites: &[usize], n_sites: usize) -> Self {
        Self {
            name: name.to_string(),
            sites: sites.to_vec(),
            n_sites,
            acc: Accumulator::default(),
        }
    }
}

impl Obs for ClassOccupancy {
    fn update(&mut self, output: &RunOutput) {
        let prob = occupancy_prob(&output.samples, self.n_sites);
        self.acc.add(class_mean(&prob, &self.sites));
    }

    fn report(&self) -> serde_json::Value {
        serde_json::json!({ "class_occupancy": { &self.name: self.acc.report() } })
    }
}

pub struct Analyzer {
    obs_ptr_vec: Vec<Box<dyn Obs>>,
}

impl Analyzer {
    pub fn new(n_sites: usize, analysis: &AnalysisConfig) -> Self {
        let mut obs_ptr_vec: Vec<Box<dyn Obs>> = Vec::new();
        obs_ptr_vec.push(Box::new(SiteOccupancy::new(n_sites)));
        for (name, sites) in &analysis.classes {
            obs_ptr_vec.push(Box::new(ClassOccupancy::new(name, sites, n_sites)));
        }
        Self { obs_ptr_vec }
    }

    pub fn add_result(&mut self, result: &ConfigResult) {
        for output in &result.systems {
            for obs in &mut self.obs_ptr_vec {
                obs.update(output);
            }
        }
    }

    pub fn report(&self) -> serde_json::Value {
        let reports: Vec<_> = self.obs_ptr_vec.iter().map(|obs| obs.report()).collect();
        serde_json::Value::Array(reports)
    }
}

/// Analyze every configuration of a sweep and compare the configured classes.
pub fn analyze_model(cfg: &Config, model: &JumpingModel) -> serde_json::Value {
    let n_sites = cfg.model.n_sites();

    let configs: Vec<_> = model
        .results()
        .map(|result| {
            let mut analyzer = Analyzer::new(n_sites, &cfg.analysis);
            analyzer.add_result(result);
            serde_json::json!({
                "mu": result.mu,
                "seed": result.seed,
                "observables": analyzer.report(),
                "final_occupancy": result.final_counts(),
                "jumps": result.total_jumps(),
            })
        })
        .collect();

    let classes = &cfg.analysis.classes;
    let ratios: Vec<_> = cfg
        .analysis
        .ratios
        .iter()
        .filter_map(|(num, den)| {
            let table = model.ratio_table(classes.get(num)?, classes.get(den)?);
            Some(serde_json::json!({
                "numerator": num,
                "denominator": den,
                "table": table,
            }))
        })
        .collect();

    serde_json::json!({ "configs": configs, "ratios": ratios })
}

pub fn save_results<P: AsRef<Path>>(results: &serde_json::Value, file: P) -> Result<()> {
    let file = file.as_ref();
    let file = File::create(file).with_context(|| format!("failed to create {file:?}"))?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, results).context("failed to serialize results")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(samples: Vec<Vec<bool>>, jumps: Vec<Vec<u64>>) -> RunOutput {
        let n_jumps = jumps.iter().flatten().sum();
        RunOutput {
            final_occ: samples.last().cloned().unwrap_or_default(),
            jumps,
            samples,
            n_jumps,
        }
    }

    #[test]
    fn averages_site_occupancy_over_systems() {
        let mut obs = SiteOccupancy::new(2);
        obs.update(&output(vec![vec![true, false], vec![true, false]], vec![vec![0; 2]; 2]));
        obs.update(&output(vec![vec![false, true], vec![true, false]], vec![vec![0; 2]; 2]));

        let report = obs.report();
        let sites = report["site_occupancy"].as_array().unwrap();
        assert_eq!(sites[0]["mean"], 0.75);
        assert_eq!(sites[1]["mean"], 0.25);
    }

    #[test]
    fn averages_class_occupancy_over_systems() {
        let mut obs = ClassOccupancy::new("high", &[0, 1], 3);
        let samples_a = (0..64).map(|i| vec![true, i % 2 == 0, false]).collect();
        let samples_b = (0..64).map(|_| vec![true, false, true]).collect();
        obs.update(&output(samples_a, vec![vec![0; 3]; 3]));
        obs.update(&output(samples_b, vec![vec![0; 3]; 3]));

        let report = obs.report();
        let class = &report["class_occupancy"]["high"];
        assert_eq!(class["n_vals"], 2);
        assert!((class["mean"].as_f64().unwrap() - 0.625).abs() < 1e-12);
        let std_dev = class["std_dev"].as_f64().unwrap();
        assert!((std_dev - 0.125 * 2.0f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn reports_configs_and_ratios() {
        let cfg: Config = toml::from_str(
            r#"
[model]
trans_weights = [[0.0, 1.0], [1.0, 0.0]]
dwell_times = [2.0, 1.0]

[init]
n_searchers = [1, 2]

[run]
n_steps = 10

[analysis]
classes = { high = [0], low = [1] }
ratios = [["high", "low"]]
"#,
        )
        .unwrap();

        let mut model = JumpingModel::default();
        for mu in [2, 1] {
            let samples = vec![vec![true, false], vec![true, true]];
            let systems = vec![output(samples, vec![vec![0, 1], vec![1, 0]])];
            model.insert(ConfigResult {
                mu,
                seed: 3,
                systems,
            });
        }

        let results = analyze_model(&cfg, &model);
        assert_eq!(results["configs"][0]["mu"], 1);
        assert_eq!(results["configs"][1]["mu"], 2);
        assert_eq!(results["configs"][0]["final_occupancy"][1], 1);
        assert_eq!(results["configs"][0]["jumps"][0][1], 1);
        assert_eq!(results["ratios"][0]["numerator"], "high");
        let ratio_vec = results["ratios"][0]["table"]["ratio_vec"].as_array().unwrap();
        assert_eq!(ratio_vec.len(), 2);
        assert_eq!(ratio_vec[0], 2.0);
    }
}
