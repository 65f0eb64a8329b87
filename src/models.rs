//! Data models for the benchmark sweep.
//!
//! This module contains the core data structures shared across the
//! application: evaluation records, accuracy scores, and the report
//! wrapper written at the end of a sweep.

use crate::sweep::SweepResults;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Key under which the evaluator stores classification accuracy.
pub const CA_KEY: &str = "CA";

/// A possibly nested evaluation value produced by one trial.
///
/// Serialized untagged: scalars as numbers, tuples as arrays and maps as
/// objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Record {
    /// A single numeric value.
    Scalar(f64),
    /// A fixed-size ordered sequence of numbers.
    Tuple(Vec<f64>),
    /// A mapping from key to nested record.
    Map(BTreeMap<String, Record>),
}

/// Discriminant of a [`Record`], used when reporting shape mismatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Scalar,
    Tuple,
    Map,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Scalar => write!(f, "scalar"),
            RecordKind::Tuple => write!(f, "tuple"),
            RecordKind::Map => write!(f, "map"),
        }
    }
}

impl Record {
    /// Builds a map record from key/value pairs.
    pub fn map<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Record)>,
    {
        Record::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Returns the discriminant of this record.
    pub fn kind(&self) -> RecordKind {
        match self {
            Record::Scalar(_) => RecordKind::Scalar,
            Record::Tuple(_) => RecordKind::Tuple,
            Record::Map(_) => RecordKind::Map,
        }
    }

    /// Looks up a key in a map record.
    pub fn get(&self, key: &str) -> Option<&Record> {
        match self {
            Record::Map(entries) => entries.get(key),
            _ => None,
        }
    }

    /// Returns the value of a scalar record.
    #[cfg(test)]
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Record::Scalar(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the elements of a tuple record.
    pub fn as_tuple(&self) -> Option<&[f64]> {
        match self {
            Record::Tuple(values) => Some(values),
            _ => None,
        }
    }

    /// Returns the keys of a map record in order.
    #[cfg(test)]
    pub fn keys(&self) -> Vec<&str> {
        match self {
            Record::Map(entries) => entries.keys().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }
}

impl From<f64> for Record {
    fn from(value: f64) -> Self {
        Record::Scalar(value)
    }
}

impl From<(f64, f64)> for Record {
    fn from((a, b): (f64, f64)) -> Self {
        Record::Tuple(vec![a, b])
    }
}

impl From<Vec<f64>> for Record {
    fn from(values: Vec<f64>) -> Self {
        Record::Tuple(values)
    }
}

/// A mean value together with its standard error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub mean: f64,
    pub se: f64,
}

impl Score {
    /// Reads a score back from a two-element tuple record.
    pub fn from_record(record: &Record) -> Option<Self> {
        match record.as_tuple()? {
            [mean, se] => Some(Self {
                mean: *mean,
                se: *se,
            }),
            _ => None,
        }
    }
}

impl From<Score> for Record {
    fn from(score: Score) -> Self {
        Record::Tuple(vec![score.mean, score.se])
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:5.3}+-{:5.3}", self.mean, self.se)
    }
}

/// Metadata about a sweep report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Date and time the sweep finished.
    pub generated_at: DateTime<Utc>,
    /// Seed the sweep was run with.
    pub seed: u64,
    /// Number of trials per configuration.
    pub repeats: usize,
    /// Fraction of each dataset used for learning.
    pub learning_proportion: f64,
    /// Names of the benchmarked learners.
    pub learners: Vec<String>,
    /// Number of configuration slots evaluated.
    pub slots: usize,
    /// Number of slots that failed.
    pub failed_slots: usize,
    /// Duration of the sweep in seconds.
    pub duration_seconds: f64,
}

/// The complete sweep report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepReport {
    pub metadata: ReportMetadata,
    pub results: SweepResults,
}
