//! Learner interface and built-in baseline.
//!
//! A [`Learner`] is fitted on a training [`Dataset`] and produces a
//! [`Classifier`]. The sweep treats learners opaquely; only their names
//! appear in the results.

pub mod classic;

pub use classic::ClassicLearner;

use crate::data::Dataset;
use crate::error::LearnerError;
use std::collections::HashSet;

/// A fitted model that assigns a class to every row of a dataset.
pub trait Classifier {
    /// Predicted class per row, in row order.
    fn predict(&self, data: &Dataset) -> Result<Vec<usize>, LearnerError>;
}

/// A named learning algorithm.
pub trait Learner {
    /// Name the learner's results are reported under.
    fn name(&self) -> &str;

    /// Fit a classifier on the training data.
    fn fit(&self, data: &Dataset) -> Result<Box<dyn Classifier>, LearnerError>;
}

/// Baseline that always predicts the most frequent training class.
#[derive(Debug, Clone)]
pub struct MajorityLearner {
    name: String,
}

impl MajorityLearner {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for MajorityLearner {
    fn default() -> Self {
        Self::new("majority")
    }
}

struct ConstantClassifier {
    class: usize,
}

impl Classifier for ConstantClassifier {
    fn predict(&self, data: &Dataset) -> Result<Vec<usize>, LearnerError> {
        Ok(vec![self.class; data.len()])
    }
}

impl Learner for MajorityLearner {
    fn name(&self) -> &str {
        &self.name
    }

    fn fit(&self, data: &Dataset) -> Result<Box<dyn Classifier>, LearnerError> {
        if data.is_empty() {
            return Err(LearnerError::EmptyTrainingSet(self.name.clone()));
        }

        let n_classes = data
            .rows
            .iter()
            .map(|r| r.class + 1)
            .max()
            .unwrap_or(0)
            .max(data.n_classes());
        let mut counts = vec![0usize; n_classes];
        for row in &data.rows {
            counts[row.class] += 1;
        }

        // Ties go to the lowest class index
        let class = counts
            .iter()
            .enumerate()
            .fold((0, 0), |best, (class, &count)| {
                if count > best.1 {
                    (class, count)
                } else {
                    best
                }
            })
            .0;

        Ok(Box::new(ConstantClassifier { class }))
    }
}

/// Names accepted by [`build_learners`], in the default benchmark order.
pub const KNOWN_LEARNERS: &[&str] = &["bayes", "knn", "tree", "majority"];

/// Build learners from their registry names.
pub fn build_learners(names: &[String]) -> Result<Vec<Box<dyn Learner>>, LearnerError> {
    let mut seen = HashSet::new();
    let mut learners: Vec<Box<dyn Learner>> = Vec::with_capacity(names.len());

    for name in names {
        if !seen.insert(name.as_str()) {
            return Err(LearnerError::DuplicateLearner(name.clone()));
        }
        match name.as_str() {
            "bayes" => learners.push(Box::new(ClassicLearner::bayes())),
            "knn" => learners.push(Box::new(ClassicLearner::knn())),
            "tree" => learners.push(Box::new(ClassicLearner::tree())),
            "majority" => learners.push(Box::new(MajorityLearner::new(name.clone()))),
            other => return Err(LearnerError::UnknownLearner(other.to_string())),
        }
    }

    Ok(learners)
}
