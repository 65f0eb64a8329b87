//! Report generation.
//!
//! This module renders sweep results as a plain-text listing, a Markdown
//! document with one table per dataset, or JSON.

use crate::models::{Record, ReportMetadata, Score, SweepReport, CA_KEY};
use crate::sweep::{DatasetResult, SlotOutcome};
use anyhow::Result;

/// Mean accuracy of one learner inside a slot record.
fn learner_score(record: &Record, learner: &str) -> Option<Score> {
    record
        .get(learner)
        .and_then(|r| r.get(CA_KEY))
        .and_then(Score::from_record)
}

/// Generate the plain-text report.
///
/// One block per dataset, training fraction and feature fraction, with a
/// `name mean+-se` line per learner.
pub fn generate_text_report(report: &SweepReport) -> String {
    let learners = &report.metadata.learners;
    let mut output = String::new();

    for dataset in &report.results.datasets {
        output.push('\n');
        output.push_str(&format!("{}:\n", dataset.name));

        if let Some(ref error) = dataset.error {
            output.push_str(&format!("FAILED: {}\n", error));
            continue;
        }

        for learn in &dataset.learn_subsets {
            output.push('\n');
            output.push_str(&format!("Data subset {:.6}:\n", learn.proportion));

            for features in &learn.feature_subsets {
                output.push_str(&format!("Feature subset {:.6}:\n", features.proportion));

                match &features.outcome {
                    SlotOutcome::Ok(record) => {
                        for learner in learners {
                            match learner_score(record, learner) {
                                Some(score) => {
                                    output.push_str(&format!("{} {}\n", learner, score))
                                }
                                None => output.push_str(&format!("{} n/a\n", learner)),
                            }
                        }
                    }
                    SlotOutcome::Failed(reason) => {
                        output.push_str(&format!("FAILED: {}\n", reason));
                    }
                }
            }
        }
    }

    output
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &SweepReport) -> String {
    let mut output = String::new();

    // Title
    output.push_str("# Learnsweep Report\n\n");

    // Metadata section
    output.push_str(&generate_metadata_section(&report.metadata));

    // Results
    output.push_str("## Results\n\n");
    for dataset in &report.results.datasets {
        output.push_str(&generate_dataset_section(dataset, &report.metadata.learners));
    }

    // Footer
    output.push_str("---\n\n");
    output.push_str("*Report generated by learnsweep*\n");

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Seed:** {}\n", metadata.seed));
    section.push_str(&format!(
        "- **Trials per configuration:** {}\n",
        metadata.repeats
    ));
    section.push_str(&format!(
        "- **Learning proportion:** {}\n",
        metadata.learning_proportion
    ));
    let learners: Vec<String> = metadata
        .learners
        .iter()
        .map(|l| format!("`{}`", l))
        .collect();
    section.push_str(&format!("- **Learners:** {}\n", learners.join(", ")));
    section.push_str(&format!("- **Configurations:** {}\n", metadata.slots));
    if metadata.failed_slots > 0 {
        section.push_str(&format!(
            "- **Failed configurations:** {}\n",
            metadata.failed_slots
        ));
    }
    section.push_str(&format!(
        "- **Duration:** {:.1}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

/// Generate the results table for one dataset.
fn generate_dataset_section(dataset: &DatasetResult, learners: &[String]) -> String {
    let mut section = String::new();

    section.push_str(&format!("### {}\n\n", dataset.name));

    if let Some(ref error) = dataset.error {
        section.push_str(&format!("> **Failed:** {}\n\n", error));
        return section;
    }

    section.push_str(&format!("*Test instances: {}*\n\n", dataset.test_size));

    section.push_str("| Training subset | Train size | Feature subset |");
    for learner in learners {
        section.push_str(&format!(" {} |", learner));
    }
    section.push('\n');
    section.push_str("|:---:|:---:|:---:|");
    for _ in learners {
        section.push_str(":---:|");
    }
    section.push('\n');

    for learn in &dataset.learn_subsets {
        for features in &learn.feature_subsets {
            section.push_str(&format!(
                "| {:.3} | {} | {:.3} |",
                learn.proportion, learn.train_size, features.proportion
            ));

            match &features.outcome {
                SlotOutcome::Ok(record) => {
                    for learner in learners {
                        let cell = match learner_score(record, learner) {
                            Some(score) => format!("{:.3} ± {:.3}", score.mean, score.se),
                            None => "n/a".to_string(),
                        };
                        section.push_str(&format!(" {} |", cell));
                    }
                }
                SlotOutcome::Failed(reason) => {
                    section.push_str(&format!(" failed: {} |", reason.replace('|', "\\|")));
                    for _ in learners.iter().skip(1) {
                        section.push_str("  |");
                    }
                }
            }
            section.push('\n');
        }
    }
    section.push('\n');

    section
}

/// Generate a JSON report.
pub fn generate_json_report(report: &SweepReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}
