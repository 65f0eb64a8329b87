//! Benchmark sweep orchestration.
//!
//! Levels: dataset, training subset, feature subset, learner. Each
//! (dataset, training fraction, feature fraction) slot runs `repeats`
//! trials and aggregates their records into one mean record.

use crate::analysis::aggregate;
use crate::data::{Dataset, DatasetProvider};
use crate::error::{PlanError, SamplingError, SlotError};
use crate::evaluation::evaluate_learners;
use crate::learner::Learner;
use crate::models::Record;
use crate::sampling::{select_features_proportion, split_ordered, split_random, Split};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Parameters of a sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepPlan {
    /// Datasets to run, by provider name, in order.
    pub datasets: Vec<String>,
    /// Fraction of each dataset used for learning; the rest is the test set.
    pub learning_proportion: f64,
    /// Fractions of the learning part used to train.
    pub learn_subsets: Vec<f64>,
    /// Fractions of the features kept per trial.
    pub feature_subsets: Vec<f64>,
    /// Trials per slot.
    pub repeats: usize,
    /// Base seed; each dataset derives its own generator from it.
    pub seed: u64,
    /// Draw instance splits at random; otherwise take leading rows.
    pub shuffle: bool,
}

impl Default for SweepPlan {
    fn default() -> Self {
        Self {
            datasets: Vec::new(),
            learning_proportion: 0.7,
            learn_subsets: vec![1.0, 0.3, 0.2, 0.1, 0.075, 0.05],
            feature_subsets: vec![1.0, 0.8, 0.6, 0.4, 0.2],
            repeats: 10,
            seed: 0,
            shuffle: true,
        }
    }
}

fn check_proportion(name: &'static str, value: f64) -> Result<(), PlanError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(PlanError::InvalidProportion { name, value })
    }
}

impl SweepPlan {
    /// Reject plans that cannot produce any result.
    pub fn validate(&self) -> Result<(), PlanError> {
        if self.datasets.is_empty() {
            return Err(PlanError::EmptyList("datasets"));
        }
        if self.learn_subsets.is_empty() {
            return Err(PlanError::EmptyList("learn_subsets"));
        }
        if self.feature_subsets.is_empty() {
            return Err(PlanError::EmptyList("feature_subsets"));
        }
        if self.repeats == 0 {
            return Err(PlanError::ZeroRepeats);
        }

        let mut seen = HashSet::new();
        if let Some(name) = self.datasets.iter().find(|n| !seen.insert(n.as_str())) {
            return Err(PlanError::DuplicateDataset(name.clone()));
        }

        check_proportion("learning_proportion", self.learning_proportion)?;
        for &p in &self.learn_subsets {
            check_proportion("learn_subsets", p)?;
        }
        for &p in &self.feature_subsets {
            check_proportion("feature_subsets", p)?;
        }
        Ok(())
    }

    /// Number of result slots the plan produces.
    pub fn slot_count(&self) -> usize {
        self.datasets.len() * self.learn_subsets.len() * self.feature_subsets.len()
    }
}

/// Outcome of one configuration slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotOutcome {
    /// Mean record over all trials.
    Ok(Record),
    /// Why the slot produced no result.
    Failed(String),
}

impl SlotOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, SlotOutcome::Failed(_))
    }

    #[cfg(test)]
    pub fn record(&self) -> Option<&Record> {
        match self {
            SlotOutcome::Ok(record) => Some(record),
            SlotOutcome::Failed(_) => None,
        }
    }
}

/// Identifies a slot while the sweep runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotKey<'a> {
    pub dataset: &'a str,
    pub learn_proportion: f64,
    pub feature_proportion: f64,
}

/// Result for one feature fraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSubsetResult {
    pub proportion: f64,
    pub outcome: SlotOutcome,
}

/// Results for one training fraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnSubsetResult {
    pub proportion: f64,
    /// Number of training instances drawn for this fraction.
    pub train_size: usize,
    pub feature_subsets: Vec<FeatureSubsetResult>,
}

/// Results for one dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetResult {
    pub name: String,
    /// Set when the dataset could not be loaded or split.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
    pub test_size: usize,
    pub learn_subsets: Vec<LearnSubsetResult>,
}

/// Nested results of a whole sweep, in plan order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SweepResults {
    pub datasets: Vec<DatasetResult>,
}

impl SweepResults {
    fn slots(&self) -> impl Iterator<Item = &FeatureSubsetResult> {
        self.datasets
            .iter()
            .flat_map(|d| &d.learn_subsets)
            .flat_map(|l| &l.feature_subsets)
    }

    /// Total number of slots.
    pub fn slot_count(&self) -> usize {
        self.slots().count()
    }

    /// Number of slots that failed.
    pub fn failed_slots(&self) -> usize {
        self.slots().filter(|s| s.outcome.is_failed()).count()
    }

    /// Look up the outcome of one slot.
    #[cfg(test)]
    pub fn get(
        &self,
        dataset: &str,
        learn_proportion: f64,
        feature_proportion: f64,
    ) -> Option<&SlotOutcome> {
        self.datasets
            .iter()
            .find(|d| d.name == dataset)?
            .learn_subsets
            .iter()
            .find(|l| l.proportion == learn_proportion)?
            .feature_subsets
            .iter()
            .find(|f| f.proportion == feature_proportion)
            .map(|f| &f.outcome)
    }
}

/// Run the sweep described by `plan`.
///
/// Failures are confined to their slot; `on_slot` is called once for every
/// slot as it finishes, failed or not.
pub fn run_sweep<F>(
    plan: &SweepPlan,
    provider: &dyn DatasetProvider,
    learners: &[Box<dyn Learner>],
    mut on_slot: F,
) -> SweepResults
where
    F: FnMut(&SlotKey<'_>, &SlotOutcome),
{
    let mut results = SweepResults::default();

    for (position, name) in plan.datasets.iter().enumerate() {
        info!("Running dataset: {}", name);
        let mut rng = StdRng::seed_from_u64(plan.seed.wrapping_add(position as u64));

        let prepared = provider
            .load(name)
            .map_err(SlotError::from)
            .and_then(|data| learn_test_split(&data, plan, &mut rng));

        let dataset_result = match prepared {
            Ok((learn, test)) => {
                run_dataset(plan, name, &learn, &test, learners, &mut rng, &mut on_slot)
            }
            Err(e) => {
                warn!("Dataset {} failed: {}", name, e);
                failed_dataset(plan, name, &e.to_string(), &mut on_slot)
            }
        };
        results.datasets.push(dataset_result);
    }

    results
}

/// Instance split used for both the learn/test split and training subsets.
fn draw_split(
    len: usize,
    p: f64,
    shuffle: bool,
    rng: &mut StdRng,
) -> Result<Split, SamplingError> {
    if shuffle {
        split_random(len, p, rng)
    } else {
        split_ordered(len, p)
    }
}

fn learn_test_split(
    data: &Dataset,
    plan: &SweepPlan,
    rng: &mut StdRng,
) -> Result<(Dataset, Dataset), SlotError> {
    let split = draw_split(data.len(), plan.learning_proportion, plan.shuffle, rng)?;
    let learn = data.subset(&split.selected)?;
    let test = data.subset(&split.remainder)?;
    debug!(
        "{}: {} learning, {} test instances",
        data.name,
        learn.len(),
        test.len()
    );
    Ok((learn, test))
}

fn run_dataset<F>(
    plan: &SweepPlan,
    name: &str,
    learn: &Dataset,
    test: &Dataset,
    learners: &[Box<dyn Learner>],
    rng: &mut StdRng,
    on_slot: &mut F,
) -> DatasetResult
where
    F: FnMut(&SlotKey<'_>, &SlotOutcome),
{
    let mut learn_subsets = Vec::with_capacity(plan.learn_subsets.len());

    for &learn_proportion in &plan.learn_subsets {
        let train = draw_split(learn.len(), learn_proportion, plan.shuffle, rng)
            .map_err(SlotError::from)
            .and_then(|split| Ok(learn.subset(&split.selected)?));

        let train_size = train.as_ref().map(Dataset::len).unwrap_or(0);
        let mut feature_subsets = Vec::with_capacity(plan.feature_subsets.len());

        for &feature_proportion in &plan.feature_subsets {
            let outcome = match &train {
                Ok(train) => {
                    match run_slot(plan.repeats, feature_proportion, train, test, learners, rng) {
                        Ok(record) => SlotOutcome::Ok(record),
                        Err(e) => SlotOutcome::Failed(e.to_string()),
                    }
                }
                Err(e) => SlotOutcome::Failed(e.to_string()),
            };

            let key = SlotKey {
                dataset: name,
                learn_proportion,
                feature_proportion,
            };
            match &outcome {
                SlotOutcome::Ok(_) => debug!(
                    "{} learn={} features={}: done",
                    name, learn_proportion, feature_proportion
                ),
                SlotOutcome::Failed(reason) => warn!(
                    "{} learn={} features={}: {}",
                    name, learn_proportion, feature_proportion, reason
                ),
            }
            on_slot(&key, &outcome);

            feature_subsets.push(FeatureSubsetResult {
                proportion: feature_proportion,
                outcome,
            });
        }

        learn_subsets.push(LearnSubsetResult {
            proportion: learn_proportion,
            train_size,
            feature_subsets,
        });
    }

    DatasetResult {
        name: name.to_string(),
        error: None,
        test_size: test.len(),
        learn_subsets,
    }
}

/// Run `repeats` trials of one slot and aggregate them.
fn run_slot(
    repeats: usize,
    feature_proportion: f64,
    train: &Dataset,
    test: &Dataset,
    learners: &[Box<dyn Learner>],
    rng: &mut StdRng,
) -> Result<Record, SlotError> {
    let mut batch = Vec::with_capacity(repeats);

    for _ in 0..repeats {
        let features = select_features_proportion(train.n_features(), feature_proportion, rng)?;
        let train = train.select_features(&features)?;
        let test = test.select_features(&features)?;
        batch.push(evaluate_learners(learners, &train, &test)?);
    }

    Ok(aggregate(&batch)?)
}

fn failed_dataset<F>(plan: &SweepPlan, name: &str, reason: &str, on_slot: &mut F) -> DatasetResult
where
    F: FnMut(&SlotKey<'_>, &SlotOutcome),
{
    let learn_subsets = plan
        .learn_subsets
        .iter()
        .map(|&learn_proportion| {
            let feature_subsets = plan
                .feature_subsets
                .iter()
                .map(|&feature_proportion| {
                    let outcome = SlotOutcome::Failed(reason.to_string());
                    let key = SlotKey {
                        dataset: name,
                        learn_proportion,
                        feature_proportion,
                    };
                    on_slot(&key, &outcome);
                    FeatureSubsetResult {
                        proportion: feature_proportion,
                        outcome,
                    }
                })
                .collect();
            LearnSubsetResult {
                proportion: learn_proportion,
                train_size: 0,
                feature_subsets,
            }
        })
        .collect();

    DatasetResult {
        name: name.to_string(),
        error: Some(reason.to_string()),
        test_size: 0,
        learn_subsets,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DatasetSpec, SyntheticProvider};
    use crate::error::LearnerError;
    use crate::learner::{Classifier, MajorityLearner};
    use crate::models::{Score, CA_KEY};
    use std::cell::Cell;

    fn small_plan(datasets: &[&str]) -> SweepPlan {
        SweepPlan {
            datasets: datasets.iter().map(|s| s.to_string()).collect(),
            learn_subsets: vec![1.0, 0.5],
            feature_subsets: vec![1.0, 0.5],
            repeats: 3,
            ..SweepPlan::default()
        }
    }

    fn provider() -> SyntheticProvider {
        SyntheticProvider::new(vec![
            DatasetSpec {
                instances: 60,
                features: 4,
                informative: 2,
                classes: 2,
                ..DatasetSpec::named("blobs", 1)
            },
            DatasetSpec {
                instances: 40,
                ..DatasetSpec::named("wide", 2)
            },
        ])
    }

    fn majority() -> Vec<Box<dyn Learner>> {
        vec![Box::new(MajorityLearner::default())]
    }

    /// Fails on every other call to `fit`.
    struct FlakyLearner {
        calls: Cell<usize>,
    }

    struct FirstClass;

    impl Classifier for FirstClass {
        fn predict(&self, data: &Dataset) -> Result<Vec<usize>, LearnerError> {
            Ok(vec![0; data.len()])
        }
    }

    impl Learner for FlakyLearner {
        fn name(&self) -> &str {
            "flaky"
        }

        fn fit(&self, _data: &Dataset) -> Result<Box<dyn Classifier>, LearnerError> {
            let n = self.calls.get();
            self.calls.set(n + 1);
            if n % 2 == 1 {
                Err(LearnerError::EmptyTrainingSet("flaky".to_string()))
            } else {
                Ok(Box::new(FirstClass))
            }
        }
    }

    #[test]
    fn test_default_plan_matches_experiment() {
        let plan = SweepPlan::default();
        assert_eq!(plan.learning_proportion, 0.7);
        assert_eq!(plan.learn_subsets, vec![1.0, 0.3, 0.2, 0.1, 0.075, 0.05]);
        assert_eq!(plan.feature_subsets, vec![1.0, 0.8, 0.6, 0.4, 0.2]);
        assert_eq!(plan.repeats, 10);
    }

    #[test]
    fn test_plan_validation() {
        assert!(small_plan(&["blobs"]).validate().is_ok());
        assert_eq!(
            small_plan(&[]).validate(),
            Err(PlanError::EmptyList("datasets"))
        );

        let mut plan = small_plan(&["blobs"]);
        plan.repeats = 0;
        assert_eq!(plan.validate(), Err(PlanError::ZeroRepeats));

        let mut plan = small_plan(&["blobs"]);
        plan.feature_subsets.push(1.2);
        assert!(matches!(
            plan.validate(),
            Err(PlanError::InvalidProportion {
                name: "feature_subsets",
                ..
            })
        ));

        let mut plan = small_plan(&["blobs"]);
        plan.learn_subsets.clear();
        assert_eq!(plan.validate(), Err(PlanError::EmptyList("learn_subsets")));

        assert_eq!(
            small_plan(&["blobs", "wide", "blobs"]).validate(),
            Err(PlanError::DuplicateDataset("blobs".to_string()))
        );
    }

    #[test]
    fn test_sweep_structure_follows_plan() {
        let plan = small_plan(&["blobs", "wide"]);
        let mut seen = 0;
        let results = run_sweep(&plan, &provider(), &majority(), |_, _| seen += 1);

        assert_eq!(seen, plan.slot_count());
        assert_eq!(results.slot_count(), 8);
        assert_eq!(results.failed_slots(), 0);

        let blobs = &results.datasets[0];
        assert_eq!(blobs.name, "blobs");
        assert_eq!(blobs.test_size, 18);
        assert_eq!(blobs.learn_subsets[0].train_size, 42);
        assert_eq!(blobs.learn_subsets[1].train_size, 21);
        assert_eq!(blobs.learn_subsets[1].feature_subsets[1].proportion, 0.5);

        let outcome = results.get("wide", 0.5, 1.0).unwrap();
        let ca = outcome
            .record()
            .and_then(|r| r.get("majority"))
            .and_then(|r| r.get(CA_KEY))
            .and_then(Score::from_record)
            .unwrap();
        assert!((0.0..=1.0).contains(&ca.mean));
    }

    #[test]
    fn test_sweep_is_reproducible() {
        let plan = small_plan(&["blobs", "wide"]);
        let a = run_sweep(&plan, &provider(), &majority(), |_, _| {});
        let b = run_sweep(&plan, &provider(), &majority(), |_, _| {});
        assert_eq!(a, b);
    }

    #[test]
    fn test_unknown_dataset_is_confined() {
        let plan = small_plan(&["missing", "blobs"]);
        let results = run_sweep(&plan, &provider(), &majority(), |_, _| {});

        assert_eq!(results.datasets.len(), 2);
        assert_eq!(
            results.datasets[0].error.as_deref(),
            Some("unknown dataset: missing")
        );
        assert_eq!(results.failed_slots(), 4);
        assert!(results
            .get("blobs", 1.0, 1.0)
            .is_some_and(|o| !o.is_failed()));
    }

    #[test]
    fn test_inconsistent_learner_fails_slot() {
        let plan = small_plan(&["blobs"]);
        let learners: Vec<Box<dyn Learner>> = vec![
            Box::new(FlakyLearner {
                calls: Cell::new(0),
            }),
            Box::new(MajorityLearner::default()),
        ];

        let results = run_sweep(&plan, &provider(), &learners, |_, _| {});
        let outcome = results.get("blobs", 1.0, 1.0).unwrap();
        match outcome {
            SlotOutcome::Failed(reason) => assert!(reason.contains("shape mismatch")),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_failed_learners_fail_slot() {
        let provider = SyntheticProvider::new(vec![DatasetSpec {
            instances: 10,
            ..DatasetSpec::named("tiny", 4)
        }]);
        let mut plan = small_plan(&["tiny"]);
        plan.learn_subsets = vec![0.1];
        plan.feature_subsets = vec![1.0];

        let results = run_sweep(&plan, &provider, &majority(), |_, _| {});
        assert_eq!(results.datasets[0].learn_subsets[0].train_size, 0);
        assert_eq!(results.failed_slots(), 1);
        assert_eq!(
            results.get("tiny", 0.1, 1.0),
            Some(&SlotOutcome::Failed("no learner produced a result".to_string()))
        );
    }

    #[test]
    fn test_ordered_splits_take_leading_rows() {
        let mut plan = small_plan(&["blobs"]);
        plan.shuffle = false;
        let a = run_sweep(&plan, &provider(), &majority(), |_, _| {});
        plan.seed = 99;
        let b = run_sweep(&plan, &provider(), &majority(), |_, _| {});

        assert_eq!(a.failed_slots(), 0);
        assert_eq!(a.datasets[0].test_size, 18);
        assert_eq!(a.datasets[0].learn_subsets[1].train_size, 21);
        // Majority ignores features, so only the instance split matters
        assert_eq!(
            a.get("blobs", 0.5, 1.0).and_then(SlotOutcome::record),
            b.get("blobs", 0.5, 1.0).and_then(SlotOutcome::record)
        );
    }

    #[test]
    fn test_empty_learning_part_fails_slots() {
        let mut plan = small_plan(&["blobs"]);
        plan.learning_proportion = 1.0;
        let results = run_sweep(&plan, &provider(), &majority(), |_, _| {});

        assert_eq!(results.failed_slots(), 4);
        assert_eq!(
            results.get("blobs", 1.0, 1.0),
            Some(&SlotOutcome::Failed("test set is empty".to_string()))
        );
    }
}
