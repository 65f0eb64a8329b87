//! Synthetic Gaussian-blob datasets.
//!
//! Each class gets a random centroid over the informative features; rows
//! are drawn with unit-variance Gaussian noise around their class centroid
//! and the remaining features are pure noise. Generation is fully
//! determined by the spec's seed.

use super::{Dataset, DatasetProvider, Instance};
use crate::error::DataError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

/// Description of one synthetic dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSpec {
    /// Dataset name used in reports.
    pub name: String,

    /// Number of instances.
    #[serde(default = "default_instances")]
    pub instances: usize,

    /// Total number of features.
    #[serde(default = "default_features")]
    pub features: usize,

    /// How many of the features carry class signal.
    #[serde(default = "default_informative")]
    pub informative: usize,

    /// Number of classes.
    #[serde(default = "default_classes")]
    pub classes: usize,

    /// Scale of the class centroids relative to the unit noise.
    #[serde(default = "default_separation")]
    pub separation: f64,

    /// Generator seed.
    #[serde(default)]
    pub seed: u64,
}

fn default_instances() -> usize {
    300
}

fn default_features() -> usize {
    10
}

fn default_informative() -> usize {
    4
}

fn default_classes() -> usize {
    3
}

fn default_separation() -> f64 {
    2.0
}

impl DatasetSpec {
    /// A spec with default shape and the given name and seed.
    pub fn named(name: &str, seed: u64) -> Self {
        Self {
            name: name.to_string(),
            instances: default_instances(),
            features: default_features(),
            informative: default_informative(),
            classes: default_classes(),
            separation: default_separation(),
            seed,
        }
    }

    fn invalid(&self, reason: &str) -> DataError {
        DataError::InvalidSpec {
            name: self.name.clone(),
            reason: reason.to_string(),
        }
    }

    /// Check that the spec describes a buildable dataset.
    pub fn validate(&self) -> Result<(), DataError> {
        if self.instances == 0 {
            return Err(self.invalid("instances must be at least 1"));
        }
        if self.features == 0 {
            return Err(self.invalid("features must be at least 1"));
        }
        if self.classes == 0 {
            return Err(self.invalid("classes must be at least 1"));
        }
        if self.informative > self.features {
            return Err(self.invalid("informative cannot exceed features"));
        }
        if !self.separation.is_finite() || self.separation < 0.0 {
            return Err(self.invalid("separation must be a non-negative number"));
        }
        Ok(())
    }

    /// Generate the dataset.
    pub fn generate(&self) -> Result<Dataset, DataError> {
        self.validate()?;

        let mut rng = StdRng::seed_from_u64(self.seed);

        let centroids: Vec<Vec<f64>> = (0..self.classes)
            .map(|_| {
                (0..self.informative)
                    .map(|_| rng.gen_range(-1.0f64..=1.0) * self.separation)
                    .collect()
            })
            .collect();

        let rows = (0..self.instances)
            .map(|i| {
                let class = i % self.classes;
                let features = (0..self.features)
                    .map(|j| {
                        let noise: f64 = rng.sample(StandardNormal);
                        match centroids[class].get(j) {
                            Some(center) => center + noise,
                            None => noise,
                        }
                    })
                    .collect();
                Instance { features, class }
            })
            .collect();

        Ok(Dataset {
            name: self.name.clone(),
            feature_names: (0..self.features).map(|j| format!("x{}", j + 1)).collect(),
            class_names: (0..self.classes).map(|c| format!("c{}", c)).collect(),
            rows,
        })
    }
}

/// Provider serving datasets generated from a list of specs.
#[derive(Debug, Clone, Default)]
pub struct SyntheticProvider {
    specs: Vec<DatasetSpec>,
}

impl SyntheticProvider {
    pub fn new(specs: Vec<DatasetSpec>) -> Self {
        Self { specs }
    }
}

impl DatasetProvider for SyntheticProvider {
    fn names(&self) -> Vec<String> {
        self.specs.iter().map(|s| s.name.clone()).collect()
    }

    fn load(&self, name: &str) -> Result<Dataset, DataError> {
        self.specs
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| DataError::UnknownDataset(name.to_string()))?
            .generate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_shape() {
        let spec = DatasetSpec {
            instances: 31,
            features: 6,
            informative: 2,
            classes: 4,
            ..DatasetSpec::named("blobs", 5)
        };

        let data = spec.generate().unwrap();
        assert_eq!(data.len(), 31);
        assert_eq!(data.n_features(), 6);
        assert_eq!(data.n_classes(), 4);
        assert!(data.rows.iter().all(|r| r.features.len() == 6 && r.class < 4));
        assert_eq!(data.feature_names[0], "x1");
    }

    #[test]
    fn test_generate_is_deterministic() {
        let spec = DatasetSpec::named("blobs", 17);
        assert_eq!(spec.generate().unwrap(), spec.generate().unwrap());

        let other = DatasetSpec::named("blobs", 18);
        assert_ne!(spec.generate().unwrap(), other.generate().unwrap());
    }

    #[test]
    fn test_invalid_specs() {
        let base = DatasetSpec::named("bad", 0);

        let cases = [
            DatasetSpec {
                instances: 0,
                ..base.clone()
            },
            DatasetSpec {
                features: 0,
                informative: 0,
                ..base.clone()
            },
            DatasetSpec {
                classes: 0,
                ..base.clone()
            },
            DatasetSpec {
                informative: 11,
                ..base.clone()
            },
            DatasetSpec {
                separation: f64::NAN,
                ..base.clone()
            },
        ];

        for spec in cases {
            assert!(matches!(
                spec.generate(),
                Err(DataError::InvalidSpec { .. })
            ));
        }
    }

    #[test]
    fn test_provider_load() {
        let provider = SyntheticProvider::new(vec![
            DatasetSpec::named("first", 1),
            DatasetSpec::named("second", 2),
        ]);

        assert_eq!(provider.names(), vec!["first", "second"]);
        assert_eq!(provider.load("second").unwrap().name, "second");
        assert_eq!(
            provider.load("missing"),
            Err(DataError::UnknownDataset("missing".to_string()))
        );
    }
}
