//! Error types for the sweep library modules.
//!
//! Each stage of a sweep has its own error enum so callers can decide
//! which failures are confined to a single result slot.

use crate::models::RecordKind;
use thiserror::Error;

/// Errors produced by the recursive mean aggregator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AggregateError {
    /// The batch contained no records, so no mean exists.
    #[error("cannot aggregate an empty batch")]
    EmptyBatch,

    /// A record in the batch disagrees with the first record's shape.
    #[error("shape mismatch at {path}: expected {expected}, found {found}")]
    ShapeMismatch {
        /// Dotted key path of the offending node.
        path: String,
        /// Shape of the first record at that node.
        expected: String,
        /// Shape of the disagreeing record.
        found: String,
    },
}

impl AggregateError {
    pub(crate) fn kind_mismatch(path: &str, expected: RecordKind, found: RecordKind) -> Self {
        AggregateError::ShapeMismatch {
            path: path.to_string(),
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }
}

/// Errors produced by the sampling utilities.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SamplingError {
    #[error("proportion must be within [0, 1], got {0}")]
    InvalidProportion(f64),
}

/// Errors produced while building or projecting datasets.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    #[error("unknown dataset: {0}")]
    UnknownDataset(String),

    #[error("invalid dataset spec '{name}': {reason}")]
    InvalidSpec { name: String, reason: String },

    #[error("{kind} index {index} out of range (len {len})")]
    IndexOutOfRange {
        kind: &'static str,
        index: usize,
        len: usize,
    },
}

/// Errors produced by learners.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LearnerError {
    #[error("unknown learner: {0}")]
    UnknownLearner(String),

    #[error("duplicate learner name: {0}")]
    DuplicateLearner(String),

    #[error("learner '{0}' cannot be fitted on an empty training set")]
    EmptyTrainingSet(String),

    #[error("learner '{learner}' failed: {reason}")]
    Backend { learner: String, reason: String },
}

/// Errors that fail a whole trial.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("test set is empty")]
    EmptyTestSet,

    #[error("no learner produced a result")]
    NoLearnerSucceeded,

    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Sampling(#[from] SamplingError),
}

/// Errors that fail one configuration slot of a sweep.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SlotError {
    #[error(transparent)]
    Eval(#[from] EvalError),

    #[error(transparent)]
    Aggregate(#[from] AggregateError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Sampling(#[from] SamplingError),
}

/// Errors in a sweep plan, detected before anything runs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    #[error("{0} must not be empty")]
    EmptyList(&'static str),

    #[error("dataset listed more than once: {0}")]
    DuplicateDataset(String),

    #[error("repeats must be at least 1")]
    ZeroRepeats,

    #[error("{name} must be within [0, 1], got {value}")]
    InvalidProportion { name: &'static str, value: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_mismatch_message() {
        let err = AggregateError::kind_mismatch("knn.CA", RecordKind::Tuple, RecordKind::Scalar);
        assert_eq!(
            err.to_string(),
            "shape mismatch at knn.CA: expected tuple, found scalar"
        );
    }

    #[test]
    fn test_eval_error_from_data_error() {
        let err: EvalError = DataError::UnknownDataset("iris".to_string()).into();
        assert_eq!(err.to_string(), "unknown dataset: iris");
    }
}
