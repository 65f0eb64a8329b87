//! Classic learners backed by aprender.
//!
//! Each learner converts the dataset into an aprender [`Matrix`], fits the
//! library model and keeps it behind [`Classifier`].

use super::{Classifier, Learner};
use crate::data::Dataset;
use crate::error::LearnerError;
use aprender::classification::{GaussianNB, KNearestNeighbors};
use aprender::primitives::Matrix;
use aprender::tree::DecisionTreeClassifier;

/// Neighbours consulted by the default kNN learner.
pub const DEFAULT_K: usize = 5;

/// Learning algorithm behind a [`ClassicLearner`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Algorithm {
    NaiveBayes,
    /// k nearest neighbours; `k` is capped at the training set size.
    Knn { k: usize },
    Tree { max_depth: Option<usize> },
}

/// A named aprender classifier.
#[derive(Debug, Clone)]
pub struct ClassicLearner {
    name: String,
    algorithm: Algorithm,
}

impl ClassicLearner {
    pub fn new(name: impl Into<String>, algorithm: Algorithm) -> Self {
        Self {
            name: name.into(),
            algorithm,
        }
    }

    pub fn bayes() -> Self {
        Self::new("bayes", Algorithm::NaiveBayes)
    }

    pub fn knn() -> Self {
        Self::new("knn", Algorithm::Knn { k: DEFAULT_K })
    }

    pub fn tree() -> Self {
        Self::new("tree", Algorithm::Tree { max_depth: None })
    }

    fn backend_error(&self, reason: impl ToString) -> LearnerError {
        backend_error(&self.name, reason)
    }
}

fn backend_error(learner: &str, reason: impl ToString) -> LearnerError {
    LearnerError::Backend {
        learner: learner.to_string(),
        reason: reason.to_string(),
    }
}

/// Feature rows of `data` as a row-major `f32` matrix.
fn to_matrix(data: &Dataset) -> Result<Matrix<f32>, &'static str> {
    let values = data
        .rows
        .iter()
        .flat_map(|row| row.features.iter().map(|&v| v as f32))
        .collect();
    Matrix::from_vec(data.len(), data.n_features(), values)
}

/// The only class present in `labels`, if there is exactly one.
fn single_class(labels: &[usize]) -> Option<usize> {
    let (&first, rest) = labels.split_first()?;
    rest.iter().all(|&c| c == first).then_some(first)
}

enum FittedModel {
    /// Training data held a single class.
    Constant(usize),
    Bayes(GaussianNB),
    Knn(KNearestNeighbors),
    Tree(DecisionTreeClassifier),
}

struct FittedClassifier {
    learner: String,
    model: FittedModel,
}

impl FittedClassifier {
    fn matrix(&self, data: &Dataset) -> Result<Matrix<f32>, LearnerError> {
        to_matrix(data).map_err(|e| backend_error(&self.learner, e))
    }
}

impl Classifier for FittedClassifier {
    fn predict(&self, data: &Dataset) -> Result<Vec<usize>, LearnerError> {
        match &self.model {
            FittedModel::Constant(class) => Ok(vec![*class; data.len()]),
            FittedModel::Bayes(model) => model
                .predict(&self.matrix(data)?)
                .map_err(|e| backend_error(&self.learner, e)),
            FittedModel::Knn(model) => model
                .predict(&self.matrix(data)?)
                .map_err(|e| backend_error(&self.learner, e)),
            FittedModel::Tree(model) => Ok(model.predict(&self.matrix(data)?)),
        }
    }
}

impl Learner for ClassicLearner {
    fn name(&self) -> &str {
        &self.name
    }

    fn fit(&self, data: &Dataset) -> Result<Box<dyn Classifier>, LearnerError> {
        if data.is_empty() {
            return Err(LearnerError::EmptyTrainingSet(self.name.clone()));
        }

        let labels = data.classes();
        let model = match single_class(&labels) {
            // Naive Bayes needs two classes; every model would predict this one
            Some(class) => FittedModel::Constant(class),
            None => {
                let x = to_matrix(data).map_err(|e| self.backend_error(e))?;
                match self.algorithm {
                    Algorithm::NaiveBayes => {
                        let mut model = GaussianNB::new();
                        model.fit(&x, &labels).map_err(|e| self.backend_error(e))?;
                        FittedModel::Bayes(model)
                    }
                    Algorithm::Knn { k } => {
                        let mut model = KNearestNeighbors::new(k.clamp(1, data.len()));
                        model.fit(&x, &labels).map_err(|e| self.backend_error(e))?;
                        FittedModel::Knn(model)
                    }
                    Algorithm::Tree { max_depth } => {
                        let mut model = DecisionTreeClassifier::new();
                        if let Some(depth) = max_depth {
                            model = model.with_max_depth(depth);
                        }
                        model.fit(&x, &labels).map_err(|e| self.backend_error(e))?;
                        FittedModel::Tree(model)
                    }
                }
            }
        };

        Ok(Box::new(FittedClassifier {
            learner: self.name.clone(),
            model,
        }))
    }
}
