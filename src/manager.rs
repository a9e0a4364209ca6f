use crate::analysis::{analyze_model, save_results};
use crate::config::Config;
use crate::sweep::{ConfigResult, JumpingModel};
use anyhow::{Context, Result, bail};
use glob::glob;
use rand::Rng;
use rmp_serde::{decode, encode};
use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

pub struct Manager {
    sim_dir: PathBuf,
    cfg: Config,
}

impl Manager {
    pub fn new<P: AsRef<Path>>(sim_dir: P) -> Result<Self> {
        let sim_dir = sim_dir.as_ref().to_path_buf();

        let cfg =
            Config::from_file(sim_dir.join("config.toml")).context("failed to construct cfg")?;
        log::info!("{cfg:#?}");

        Ok(Self { sim_dir, cfg })
    }

    /// Run the sweep and save one result file per configuration.
    ///
    /// `seed` takes precedence over the configured seed; without either a
    /// random seed is drawn and logged so the sweep can be replayed.
    pub fn run_sweep(&self, seed: Option<u64>) -> Result<()> {
        let seed = match seed.or(self.cfg.run.seed) {
            Some(seed) => seed,
            None => rand::rng().random(),
        };
        log::info!("running sweep with seed {seed}");

        let sweep_dir = self.sweep_dir();
        if sweep_dir.exists() {
            fs::remove_dir_all(&sweep_dir)
                .with_context(|| format!("failed to remove {sweep_dir:?}"))?;
            log::info!("removed previous results in {sweep_dir:?}");
        }

        let model = JumpingModel::run(&self.cfg, seed).context("failed to run sweep")?;

        fs::create_dir_all(&sweep_dir).with_context(|| format!("failed to create {sweep_dir:?}"))?;

        for result in model.results() {
            let file = self.result_file(result.mu);
            save_result(result, &file).with_context(|| format!("failed to save {file:?}"))?;
            log::info!("saved {file:?}");
        }

        Ok(())
    }

    pub fn analyze_sweep(&self) -> Result<()> {
        let files = self.collect_result_files().context("failed to collect result files")?;
        if files.is_empty() {
            bail!("no results found, run the sweep first");
        }

        let mut model = JumpingModel::default();
        for file in files {
            let result = load_result(&file).with_context(|| format!("failed to load {file:?}"))?;
            model.insert(result);
        }
        check_model(&self.cfg, &model).context("results do not match the config")?;

        let results = analyze_model(&self.cfg, &model);

        let file = self.analysis_file();
        save_results(&results, &file).with_context(|| format!("failed to save {file:?}"))?;
        log::info!("saved {file:?}");

        Ok(())
    }

    pub fn clean_sweep(&self) -> Result<()> {
        let sweep_dir = self.sweep_dir();
        if sweep_dir.exists() {
            fs::remove_dir_all(&sweep_dir)
                .with_context(|| format!("failed to remove {sweep_dir:?}"))?;
            log::info!("removed {sweep_dir:?}");
        }

        let file = self.analysis_file();
        if file.exists() {
            fs::remove_file(&file).with_context(|| format!("failed to remove {file:?}"))?;
            log::info!("removed {file:?}");
        }

        Ok(())
    }

    fn collect_result_files(&self) -> Result<Vec<PathBuf>> {
        let pattern = self.sweep_dir().join("mu-*.msgpack");
        let pattern = pattern.to_str().context("pattern is not valid UTF-8")?;
        let files = glob(pattern)
            .context("failed to glob result files")?
            .filter_map(Result::ok)
            .collect();
        Ok(files)
    }

    fn sweep_dir(&self) -> PathBuf {
        self.sim_dir.join("sweep")
    }

    fn result_file(&self, mu: usize) -> PathBuf {
        self.sweep_dir().join(format!("mu-{mu:04}.msgpack"))
    }

    fn analysis_file(&self) -> PathBuf {
        self.sim_dir.join("analysis.json")
    }
}

/// Check that `model` holds one result per configured searcher count, all
/// from the same sweep and on the configured lattice.
fn check_model(cfg: &Config, model: &JumpingModel) -> Result<()> {
    let n_sites = cfg.model.n_sites();
    let mut seed = None;
    for result in model.results() {
        let mu = result.mu;
        if !cfg.init.n_searchers.contains(&mu) {
            bail!("result for {mu} searchers is not configured");
        }
        if result.n_sites() != n_sites {
            let n = result.n_sites();
            bail!("result for {mu} searchers has {n} sites instead of {n_sites}");
        }
        match seed {
            None => seed = Some(result.seed),
            Some(seed) if seed != result.seed => {
                bail!("result for {mu} searchers has seed {}, not {seed}", result.seed);
            }
            Some(_) => {}
        }
    }
    for &mu in &cfg.init.n_searchers {
        if model.get(mu).is_none() {
            bail!("missing result for {mu} searchers");
        }
    }
    Ok(())
}

fn save_result(result: &ConfigResult, file: &Path) -> Result<()> {
    let file = File::create(file).with_context(|| format!("failed to create {file:?}"))?;
    let mut writer = BufWriter::new(file);
    encode::write(&mut writer, result).context("failed to serialize result")?;
    writer.flush().context("failed to flush writer stream")?;
    Ok(())
}

fn load_result(file: &Path) -> Result<ConfigResult> {
    let file = File::open(file).with_context(|| format!("failed to open {file:?}"))?;
    let mut reader = BufReader::new(file);
    let result = decode::from_read(&mut reader).context("failed to deserialize result")?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::RunOutput;

    fn cfg() -> Config {
        toml::from_str(
            r#"
[model]
trans_weights = [[0.0, 1.0], [1.0, 0.0]]
dwell_times = [2.0, 1.0]

[init]
n_searchers = [1, 2]

[run]
n_steps = 10
"#,
        )
        .unwrap()
    }

    fn result(mu: usize, seed: u64, n_sites: usize) -> ConfigResult {
        let output = RunOutput {
            final_occ: vec![false; n_sites],
            jumps: vec![vec![0; n_sites]; n_sites],
            samples: Vec::new(),
            n_jumps: 0,
        };
        ConfigResult {
            mu,
            seed,
            systems: vec![output],
        }
    }

    fn model(results: Vec<ConfigResult>) -> JumpingModel {
        let mut model = JumpingModel::default();
        for result in results {
            model.insert(result);
        }
        model
    }

    #[test]
    fn accepts_matching_results() {
        let model = model(vec![result(1, 4, 2), result(2, 4, 2)]);
        assert!(check_model(&cfg(), &model).is_ok());
    }

    #[test]
    fn rejects_mismatched_results() {
        let cfg = cfg();
        let unconfigured = model(vec![result(1, 4, 2), result(2, 4, 2), result(3, 4, 2)]);
        assert!(check_model(&cfg, &unconfigured).is_err());
        let wrong_sites = model(vec![result(1, 4, 2), result(2, 4, 3)]);
        assert!(check_model(&cfg, &wrong_sites).is_err());
        let mixed_seeds = model(vec![result(1, 4, 2), result(2, 9, 2)]);
        assert!(check_model(&cfg, &mixed_seeds).is_err());
        let missing = model(vec![result(2, 4, 2)]);
        assert!(check_model(&cfg, &missing).is_err());
    }
}
