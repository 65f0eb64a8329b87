//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// learnsweep - benchmark sweep for classification learners
///
/// Runs every learner over every dataset while varying the fraction of
/// training examples and the fraction of features, repeating each
/// configuration with random subsampling, and reports mean classification
/// accuracy with standard error.
///
/// Examples:
///   learnsweep
///   learnsweep --config sweep.toml --format markdown --output report.md
///   learnsweep --repeats 5 --learn-subsets 1.0,0.5 --feature-subsets 1.0,0.5
///   learnsweep --dry-run
///   learnsweep --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to configuration file
    ///
    /// If not specified, looks for .learnsweep.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output file path for the report
    ///
    /// If not specified, the report is printed to stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (text, markdown, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Number of trials per configuration
    #[arg(long, value_name = "COUNT")]
    pub repeats: Option<usize>,

    /// Base random seed
    #[arg(long, value_name = "SEED", env = "LEARNSWEEP_SEED")]
    pub seed: Option<u64>,

    /// Fraction of each dataset used for learning (the rest is the test set)
    #[arg(long, value_name = "P")]
    pub learning_proportion: Option<f64>,

    /// Training fractions to sweep (comma-separated)
    ///
    /// Example: --learn-subsets 1.0,0.3,0.1
    #[arg(long, value_name = "LIST", value_delimiter = ',')]
    pub learn_subsets: Option<Vec<f64>>,

    /// Feature fractions to sweep (comma-separated)
    ///
    /// Example: --feature-subsets 1.0,0.5
    #[arg(long, value_name = "LIST", value_delimiter = ',')]
    pub feature_subsets: Option<Vec<f64>>,

    /// Take leading rows for every split instead of sampling at random
    #[arg(long)]
    pub no_shuffle: bool,

    /// Learners to benchmark (comma-separated)
    #[arg(long, value_name = "NAMES", value_delimiter = ',')]
    pub learners: Option<Vec<String>>,

    /// Only run the named datasets from the configuration (comma-separated)
    #[arg(long, value_name = "NAMES", value_delimiter = ',')]
    pub datasets: Option<Vec<String>>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Exit with code 2 if any configuration failed
    #[arg(long)]
    pub strict: bool,

    /// Dry run: print the sweep plan without evaluating anything
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .learnsweep.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Plain text listing (default)
    #[default]
    Text,
    /// Markdown tables
    Markdown,
    /// JSON format
    Json,
}

fn check_proportion(name: &str, value: f64) -> Result<(), String> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(format!("{} must be between 0.0 and 1.0, got {}", name, value))
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.repeats == Some(0) {
            return Err("Repeats must be at least 1".to_string());
        }

        if let Some(p) = self.learning_proportion {
            check_proportion("Learning proportion", p)?;
        }

        for (name, list) in [
            ("Learn subsets", &self.learn_subsets),
            ("Feature subsets", &self.feature_subsets),
        ] {
            if let Some(values) = list {
                if values.is_empty() {
                    return Err(format!("{} must not be empty", name));
                }
                for &p in values {
                    check_proportion(name, p)?;
                }
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            config: None,
            output: None,
            format: None,
            repeats: None,
            seed: None,
            learning_proportion: None,
            learn_subsets: None,
            feature_subsets: None,
            no_shuffle: false,
            learners: None,
            datasets: None,
            verbose: false,
            quiet: false,
            strict: false,
            dry_run: false,
            init_config: false,
        }
    }

    #[test]
    fn test_parse_lists() {
        let args = Args::try_parse_from([
            "learnsweep",
            "--learn-subsets",
            "1.0,0.3",
            "--learners",
            "majority",
            "--format",
            "markdown",
            "--repeats",
            "4",
        ])
        .unwrap();

        assert_eq!(args.learn_subsets, Some(vec![1.0, 0.3]));
        assert_eq!(args.learners, Some(vec!["majority".to_string()]));
        assert_eq!(args.format, Some(OutputFormat::Markdown));
        assert_eq!(args.repeats, Some(4));
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_proportions() {
        let mut args = make_args();
        args.learning_proportion = Some(1.5);
        assert!(args.validate().is_err());

        let mut args = make_args();
        args.feature_subsets = Some(vec![1.0, -0.2]);
        assert!(args.validate().is_err());

        let mut args = make_args();
        args.repeats = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_init_config_skips_validation() {
        let mut args = make_args();
        args.init_config = true;
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
