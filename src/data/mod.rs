//! In-memory classification datasets.
//!
//! A [`Dataset`] is a table of numeric feature rows with a discrete class.
//! Datasets are obtained through a [`DatasetProvider`]; the sweep only
//! ever projects them by row and by feature.

pub mod synthetic;

pub use synthetic::{DatasetSpec, SyntheticProvider};

use crate::error::DataError;

/// A single labelled example.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    pub features: Vec<f64>,
    pub class: usize,
}

/// A classification dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub name: String,
    pub feature_names: Vec<String>,
    pub class_names: Vec<String>,
    pub rows: Vec<Instance>,
}

impl Dataset {
    /// Number of instances.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of features, not counting the class.
    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    pub fn n_classes(&self) -> usize {
        self.class_names.len()
    }

    /// Class labels of all rows, in row order.
    pub fn classes(&self) -> Vec<usize> {
        self.rows.iter().map(|r| r.class).collect()
    }

    /// A new dataset holding the given rows, in the given order.
    pub fn subset(&self, indices: &[usize]) -> Result<Dataset, DataError> {
        let rows = indices
            .iter()
            .map(|&i| {
                self.rows.get(i).cloned().ok_or(DataError::IndexOutOfRange {
                    kind: "row",
                    index: i,
                    len: self.rows.len(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Dataset {
            name: self.name.clone(),
            feature_names: self.feature_names.clone(),
            class_names: self.class_names.clone(),
            rows,
        })
    }

    /// A new dataset keeping only the given feature columns. The class is
    /// always kept.
    pub fn select_features(&self, indices: &[usize]) -> Result<Dataset, DataError> {
        let n = self.n_features();
        if let Some(&bad) = indices.iter().find(|&&i| i >= n) {
            return Err(DataError::IndexOutOfRange {
                kind: "feature",
                index: bad,
                len: n,
            });
        }

        let rows = self
            .rows
            .iter()
            .map(|row| Instance {
                features: indices.iter().map(|&i| row.features[i]).collect(),
                class: row.class,
            })
            .collect();

        Ok(Dataset {
            name: self.name.clone(),
            feature_names: indices
                .iter()
                .map(|&i| self.feature_names[i].clone())
                .collect(),
            class_names: self.class_names.clone(),
            rows,
        })
    }
}

/// Source of named datasets for a sweep.
pub trait DatasetProvider {
    /// Names of all datasets this provider can load, in sweep order.
    fn names(&self) -> Vec<String>;

    /// Load a dataset by name.
    fn load(&self, name: &str) -> Result<Dataset, DataError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_dataset() -> Dataset {
        Dataset {
            name: "tiny".to_string(),
            feature_names: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            class_names: vec!["no".to_string(), "yes".to_string()],
            rows: vec![
                Instance {
                    features: vec![1.0, 2.0, 3.0],
                    class: 0,
                },
                Instance {
                    features: vec![4.0, 5.0, 6.0],
                    class: 1,
                },
                Instance {
                    features: vec![7.0, 8.0, 9.0],
                    class: 1,
                },
            ],
        }
    }

    #[test]
    fn test_subset_keeps_order() {
        let data = tiny_dataset();
        let subset = data.subset(&[2, 0]).unwrap();

        assert_eq!(subset.len(), 2);
        assert_eq!(subset.rows[0].features, vec![7.0, 8.0, 9.0]);
        assert_eq!(subset.classes(), vec![1, 0]);
        assert_eq!(subset.n_features(), 3);
    }

    #[test]
    fn test_subset_out_of_range() {
        let data = tiny_dataset();
        assert_eq!(
            data.subset(&[0, 3]),
            Err(DataError::IndexOutOfRange {
                kind: "row",
                index: 3,
                len: 3
            })
        );
    }

    #[test]
    fn test_select_features() {
        let data = tiny_dataset();
        let projected = data.select_features(&[0, 2]).unwrap();

        assert_eq!(projected.feature_names, vec!["a", "c"]);
        assert_eq!(projected.rows[1].features, vec![4.0, 6.0]);
        assert_eq!(projected.classes(), data.classes());
        assert!(data.select_features(&[5]).is_err());
    }
}
