//! Learn-and-test evaluation of learners.
//!
//! Each learner is fitted on the training set and scored on the test set.
//! The result of one trial is a [`Record`] of the form
//! `{ learner: { "CA": (accuracy, standard_error) } }`.

use crate::data::Dataset;
use crate::error::EvalError;
use crate::learner::Learner;
use crate::models::{Record, Score, CA_KEY};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Classification accuracy with its binomial standard error.
///
/// Returns `None` when there is nothing to score or the slices differ in
/// length.
pub fn classification_accuracy(predicted: &[usize], actual: &[usize]) -> Option<Score> {
    if actual.is_empty() || predicted.len() != actual.len() {
        return None;
    }

    let n = actual.len() as f64;
    let correct = predicted
        .iter()
        .zip(actual)
        .filter(|(p, a)| p == a)
        .count() as f64;

    let ca = correct / n;
    Some(Score {
        mean: ca,
        se: (ca * (1.0 - ca) / n).sqrt(),
    })
}

/// Fit every learner on `train` and score it on `test`.
///
/// A learner that fails to fit or predict is logged and left out of the
/// record. The trial fails when no learner succeeds.
pub fn evaluate_learners(
    learners: &[Box<dyn Learner>],
    train: &Dataset,
    test: &Dataset,
) -> Result<Record, EvalError> {
    if test.is_empty() {
        return Err(EvalError::EmptyTestSet);
    }

    let actual = test.classes();
    let mut results = BTreeMap::new();

    for learner in learners {
        let predicted = match learner.fit(train).and_then(|model| model.predict(test)) {
            Ok(predicted) => predicted,
            Err(e) => {
                warn!("Learner {} failed: {}", learner.name(), e);
                continue;
            }
        };

        let Some(score) = classification_accuracy(&predicted, &actual) else {
            warn!(
                "Learner {} returned {} predictions for {} test instances",
                learner.name(),
                predicted.len(),
                actual.len()
            );
            continue;
        };
        debug!("{} on {}: CA {}", learner.name(), test.name, score);

        results.insert(
            learner.name().to_string(),
            Record::map([(CA_KEY, Record::from(score))]),
        );
    }

    // A trial without any learner result carries no information
    if results.is_empty() {
        return Err(EvalError::NoLearnerSucceeded);
    }

    Ok(Record::Map(results))
}
