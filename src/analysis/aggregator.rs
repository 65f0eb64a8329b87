//! Recursive mean aggregation of trial records.
//!
//! A batch of structurally identical records is collapsed into one record
//! of the same shape in which every scalar leaf is the mean of that leaf
//! across the batch.

use crate::error::AggregateError;
use crate::models::Record;
use std::collections::BTreeMap;

/// Path label used for the top-level record in error messages.
const ROOT_PATH: &str = "<root>";

/// Aggregate a batch of records into their leaf-wise mean.
///
/// Fails with [`AggregateError::EmptyBatch`] on an empty batch and with
/// [`AggregateError::ShapeMismatch`] when any record differs from the first
/// in variant, key set or tuple length at any nesting level.
pub fn aggregate(batch: &[Record]) -> Result<Record, AggregateError> {
    let refs: Vec<&Record> = batch.iter().collect();
    aggregate_at(ROOT_PATH, &refs)
}

fn aggregate_at(path: &str, batch: &[&Record]) -> Result<Record, AggregateError> {
    let first = *batch.first().ok_or(AggregateError::EmptyBatch)?;

    match first {
        Record::Map(first_entries) => {
            let mut columns: Vec<Vec<&Record>> = first_entries
                .keys()
                .map(|_| Vec::with_capacity(batch.len()))
                .collect();

            for record in batch {
                let Record::Map(entries) = record else {
                    return Err(AggregateError::kind_mismatch(path, first.kind(), record.kind()));
                };
                // BTreeMap keys iterate sorted, so equal sequences mean equal key sets
                if !entries.keys().eq(first_entries.keys()) {
                    return Err(AggregateError::ShapeMismatch {
                        path: path.to_string(),
                        expected: describe_keys(first_entries),
                        found: describe_keys(entries),
                    });
                }
                for (column, value) in columns.iter_mut().zip(entries.values()) {
                    column.push(value);
                }
            }

            let mut out = BTreeMap::new();
            for (key, column) in first_entries.keys().zip(columns) {
                let value = aggregate_at(&child_path(path, key), &column)?;
                out.insert(key.clone(), value);
            }
            Ok(Record::Map(out))
        }
        Record::Tuple(first_values) => {
            let mut sums = vec![0.0; first_values.len()];

            for record in batch {
                let Record::Tuple(values) = record else {
                    return Err(AggregateError::kind_mismatch(path, first.kind(), record.kind()));
                };
                if values.len() != first_values.len() {
                    return Err(AggregateError::ShapeMismatch {
                        path: path.to_string(),
                        expected: format!("tuple of length {}", first_values.len()),
                        found: format!("tuple of length {}", values.len()),
                    });
                }
                for (sum, value) in sums.iter_mut().zip(values) {
                    *sum += value;
                }
            }

            let n = batch.len() as f64;
            Ok(Record::Tuple(sums.into_iter().map(|s| s / n).collect()))
        }
        Record::Scalar(_) => {
            let mut sum = 0.0;

            for record in batch {
                let Record::Scalar(value) = record else {
                    return Err(AggregateError::kind_mismatch(path, first.kind(), record.kind()));
                };
                sum += value;
            }

            Ok(Record::Scalar(sum / batch.len() as f64))
        }
    }
}

fn child_path(path: &str, key: &str) -> String {
    if path == ROOT_PATH {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

fn describe_keys(entries: &BTreeMap<String, Record>) -> String {
    let keys: Vec<&str> = entries.keys().map(String::as_str).collect();
    format!("keys [{}]", keys.join(", "))
}
