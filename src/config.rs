//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.learnsweep.toml` files.

use crate::cli::OutputFormat;
use crate::data::DatasetSpec;
use crate::sweep::SweepPlan;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".learnsweep.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Sweep settings.
    #[serde(default)]
    pub sweep: SweepConfig,

    /// Synthetic datasets to benchmark on.
    #[serde(default = "default_datasets")]
    pub datasets: Vec<DatasetSpec>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            sweep: SweepConfig::default(),
            datasets: default_datasets(),
        }
    }
}

fn default_datasets() -> Vec<DatasetSpec> {
    vec![
        DatasetSpec::named("blobs", 1),
        DatasetSpec {
            instances: 500,
            features: 20,
            informative: 5,
            classes: 2,
            separation: 1.0,
            ..DatasetSpec::named("sparse-signal", 2)
        },
        DatasetSpec {
            instances: 150,
            features: 4,
            informative: 4,
            classes: 3,
            separation: 3.0,
            ..DatasetSpec::named("compact", 3)
        },
    ]
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Report output file path; empty means stdout.
    #[serde(default)]
    pub output: String,

    /// Report format.
    #[serde(default)]
    pub format: OutputFormat,
}

/// Sweep settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Fraction of each dataset used for learning.
    #[serde(default = "default_learning_proportion")]
    pub learning_proportion: f64,

    /// Training fractions to sweep.
    #[serde(default = "default_learn_subsets")]
    pub learn_subsets: Vec<f64>,

    /// Feature fractions to sweep.
    #[serde(default = "default_feature_subsets")]
    pub feature_subsets: Vec<f64>,

    /// Trials per configuration.
    #[serde(default = "default_repeats")]
    pub repeats: usize,

    /// Base random seed.
    #[serde(default)]
    pub seed: u64,

    /// Draw instance splits at random instead of taking leading rows.
    #[serde(default = "default_shuffle")]
    pub shuffle: bool,

    /// Learners to benchmark, by registry name.
    #[serde(default = "default_learners")]
    pub learners: Vec<String>,
}

impl Default for SweepConfig {
    fn default() -> Self {
        let plan = SweepPlan::default();
        Self {
            learning_proportion: plan.learning_proportion,
            learn_subsets: plan.learn_subsets,
            feature_subsets: plan.feature_subsets,
            repeats: plan.repeats,
            seed: plan.seed,
            shuffle: plan.shuffle,
            learners: default_learners(),
        }
    }
}

fn default_learning_proportion() -> f64 {
    SweepPlan::default().learning_proportion
}

fn default_learn_subsets() -> Vec<f64> {
    SweepPlan::default().learn_subsets
}

fn default_feature_subsets() -> Vec<f64> {
    SweepPlan::default().feature_subsets
}

fn default_repeats() -> usize {
    SweepPlan::default().repeats
}

fn default_shuffle() -> bool {
    true
}

fn default_learners() -> Vec<String> {
    crate::learner::KNOWN_LEARNERS
        .iter()
        .map(|name| name.to_string())
        .collect()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location in `dir`.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(DEFAULT_CONFIG_FILE);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Try to load configuration from the working directory.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given explicitly.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) -> Result<()> {
        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }
        if let Some(format) = args.format {
            self.general.format = format;
        }

        if let Some(repeats) = args.repeats {
            self.sweep.repeats = repeats;
        }
        if let Some(seed) = args.seed {
            self.sweep.seed = seed;
        }
        if let Some(p) = args.learning_proportion {
            self.sweep.learning_proportion = p;
        }
        if let Some(ref subsets) = args.learn_subsets {
            self.sweep.learn_subsets = subsets.clone();
        }
        if let Some(ref subsets) = args.feature_subsets {
            self.sweep.feature_subsets = subsets.clone();
        }
        if args.no_shuffle {
            self.sweep.shuffle = false;
        }
        if let Some(ref learners) = args.learners {
            self.sweep.learners = learners.clone();
        }

        // Dataset filter keeps config order
        if let Some(ref names) = args.datasets {
            if let Some(missing) = names
                .iter()
                .find(|n| !self.datasets.iter().any(|d| &d.name == *n))
            {
                bail!("Dataset not found in configuration: {}", missing);
            }
            self.datasets.retain(|d| names.contains(&d.name));
        }

        Ok(())
    }

    /// Output path, or `None` for stdout.
    pub fn output_path(&self) -> Option<PathBuf> {
        if self.general.output.is_empty() {
            None
        } else {
            Some(PathBuf::from(&self.general.output))
        }
    }

    /// The sweep plan described by this configuration.
    pub fn to_plan(&self) -> SweepPlan {
        SweepPlan {
            datasets: self.datasets.iter().map(|d| d.name.clone()).collect(),
            learning_proportion: self.sweep.learning_proportion,
            learn_subsets: self.sweep.learn_subsets.clone(),
            feature_subsets: self.sweep.feature_subsets.clone(),
            repeats: self.sweep.repeats,
            seed: self.sweep.seed,
            shuffle: self.sweep.shuffle,
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.sweep.repeats, 10);
        assert_eq!(config.sweep.learners, vec!["bayes", "knn", "tree", "majority"]);
        assert!(config.sweep.shuffle);
        assert_eq!(config.datasets.len(), 3);
        assert!(config.output_path().is_none());
        assert_eq!(config.general.format, OutputFormat::Text);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
output = "results.md"
format = "markdown"

[sweep]
repeats = 3
learn_subsets = [1.0, 0.5]
seed = 42

[[datasets]]
name = "tiny"
instances = 20
features = 3
informative = 1
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.output_path(), Some(PathBuf::from("results.md")));
        assert_eq!(config.general.format, OutputFormat::Markdown);
        assert_eq!(config.sweep.repeats, 3);
        assert_eq!(config.sweep.learn_subsets, vec![1.0, 0.5]);
        assert_eq!(config.sweep.feature_subsets, vec![1.0, 0.8, 0.6, 0.4, 0.2]);
        assert_eq!(config.sweep.learning_proportion, 0.7);

        assert_eq!(config.datasets.len(), 1);
        let tiny = &config.datasets[0];
        assert_eq!(tiny.instances, 20);
        assert_eq!(tiny.classes, 3);
        assert_eq!(tiny.seed, 0);

        let plan = config.to_plan();
        assert_eq!(plan.datasets, vec!["tiny"]);
        assert_eq!(plan.seed, 42);
    }

    #[test]
    fn test_merge_with_args() {
        let mut config = Config::default();
        let args = crate::cli::Args::try_parse_from([
            "learnsweep",
            "--repeats",
            "2",
            "--feature-subsets",
            "1.0",
            "--datasets",
            "compact,blobs",
            "--output",
            "out.json",
            "--no-shuffle",
        ])
        .unwrap();

        config.merge_with_args(&args).unwrap();
        assert_eq!(config.sweep.repeats, 2);
        assert_eq!(config.sweep.feature_subsets, vec![1.0]);
        assert_eq!(config.sweep.learn_subsets.len(), 6);
        assert_eq!(config.output_path(), Some(PathBuf::from("out.json")));
        assert!(!config.to_plan().shuffle);

        let names: Vec<&str> = config.datasets.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["blobs", "compact"]);
    }

    #[test]
    fn test_merge_unknown_dataset() {
        let mut config = Config::default();
        let args =
            crate::cli::Args::try_parse_from(["learnsweep", "--datasets", "iris"]).unwrap();
        assert!(config.merge_with_args(&args).is_err());
    }

    #[test]
    fn test_duplicate_dataset_names_rejected() {
        let toml_content = r#"
[[datasets]]
name = "d"
instances = 50

[[datasets]]
name = "d"
instances = 500
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(
            config.to_plan().validate(),
            Err(crate::error::PlanError::DuplicateDataset("d".to_string()))
        );
    }

    #[test]
    fn test_load_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load_from_dir(dir.path()).unwrap().is_none());

        std::fs::write(
            dir.path().join(DEFAULT_CONFIG_FILE),
            "[sweep]\nrepeats = 7\n",
        )
        .unwrap();
        let config = Config::load_from_dir(dir.path()).unwrap().unwrap();
        assert_eq!(config.sweep.repeats, 7);
        assert_eq!(config.datasets.len(), 3);

        std::fs::write(dir.path().join(DEFAULT_CONFIG_FILE), "[sweep\n").unwrap();
        assert!(Config::load_from_dir(dir.path()).is_err());
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[sweep]"));
        assert!(toml_str.contains("[[datasets]]"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.datasets, Config::default().datasets);
    }
}
