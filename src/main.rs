//! learnsweep - benchmark sweep for classification learners
//!
//! Evaluates a set of learners across datasets while varying the fraction
//! of training examples and of features, averaging repeated random trials
//! per configuration.
//!
//! Exit codes:
//!   0 - Success (or failed configurations without --strict)
//!   1 - Runtime error (configuration, output, etc.)
//!   2 - Some configurations failed and --strict was set

mod analysis;
mod cli;
mod config;
mod data;
mod error;
mod evaluation;
mod learner;
mod models;
mod report;
mod sampling;
mod sweep;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::{Config, DEFAULT_CONFIG_FILE};
use data::SyntheticProvider;
use indicatif::{ProgressBar, ProgressStyle};
use models::{ReportMetadata, SweepReport};
use std::time::Instant;
use sweep::{SlotKey, SlotOutcome, SweepPlan};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("learnsweep v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run_benchmark(args) {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Sweep failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .learnsweep.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            DEFAULT_CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", DEFAULT_CONFIG_FILE);
    println!("   Edit it to customize datasets, learners, and subset fractions.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// `RUST_LOG` wins over `--verbose`/`--quiet` when set. Logs go to stderr
/// so a report printed to stdout stays clean.
fn init_logging(args: &Args) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_level().as_str().to_lowercase()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete sweep workflow. Returns exit code (0 or 2).
fn run_benchmark(args: Args) -> Result<i32> {
    let start_time = Instant::now();

    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args)?;

    let plan = config.to_plan();
    plan.validate().context("Invalid sweep plan")?;

    let learners =
        learner::build_learners(&config.sweep.learners).context("Invalid learner list")?;
    if learners.is_empty() {
        bail!("At least one learner is required");
    }

    // Handle --dry-run: print the plan and exit
    if args.dry_run {
        return handle_dry_run(&plan, &config);
    }

    if !args.quiet {
        eprintln!("🔬 Running sweep...");
        eprintln!("   Datasets: {}", plan.datasets.join(", "));
        eprintln!("   Learners: {}", config.sweep.learners.join(", "));
        eprintln!(
            "   Configurations: {} x {} trials",
            plan.slot_count(),
            plan.repeats
        );
    }

    let provider = SyntheticProvider::new(config.datasets.clone());
    let progress = progress_bar(plan.slot_count() as u64, args.quiet);

    let results = sweep::run_sweep(
        &plan,
        &provider,
        &learners,
        |key: &SlotKey<'_>, outcome: &SlotOutcome| {
            progress.set_message(format!(
                "{} learn={} features={}",
                key.dataset, key.learn_proportion, key.feature_proportion
            ));
            if outcome.is_failed() {
                progress.println(format!(
                    "   ⚠️  {} learn={} features={} failed",
                    key.dataset, key.learn_proportion, key.feature_proportion
                ));
            }
            progress.inc(1);
        },
    );
    progress.finish_and_clear();

    let duration = start_time.elapsed().as_secs_f64();
    let failed = results.failed_slots();
    if failed > 0 {
        warn!("{} of {} configurations failed", failed, results.slot_count());
    }

    let metadata = ReportMetadata {
        generated_at: Utc::now(),
        seed: plan.seed,
        repeats: plan.repeats,
        learning_proportion: plan.learning_proportion,
        learners: learners.iter().map(|l| l.name().to_string()).collect(),
        slots: results.slot_count(),
        failed_slots: failed,
        duration_seconds: duration,
    };
    let report = SweepReport { metadata, results };

    // Generate and write the report
    let output = match config.general.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report),
        OutputFormat::Text => report::generate_text_report(&report),
    };

    match config.output_path() {
        Some(path) => {
            std::fs::write(&path, &output)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            if !args.quiet {
                eprintln!("\n✅ Sweep complete! Report saved to: {}", path.display());
            }
        }
        None => print!("{}", output),
    }

    if !args.quiet {
        eprintln!("\n📊 Sweep Summary:");
        eprintln!("   Configurations: {}", report.metadata.slots);
        eprintln!("   Failed: {}", failed);
        eprintln!("   Duration: {:.1}s", duration);
    }

    // Check --strict
    if args.strict && failed > 0 {
        eprintln!(
            "\n⛔ {} configurations failed. Failing (exit code 2).",
            failed
        );
        return Ok(2);
    }

    Ok(0)
}

/// Handle --dry-run: print what would be evaluated, exit.
fn handle_dry_run(plan: &SweepPlan, config: &Config) -> Result<i32> {
    println!("\n🔍 Dry run: sweep plan (no evaluation)...\n");

    for spec in &config.datasets {
        println!(
            "   📄 {} ({} instances, {} features, {} classes, seed {})",
            spec.name, spec.instances, spec.features, spec.classes, spec.seed
        );
    }

    println!(
        "\n   Learners: {} (available: {})",
        config.sweep.learners.join(", "),
        learner::KNOWN_LEARNERS.join(", ")
    );
    println!("   Learning proportion: {}", plan.learning_proportion);
    println!(
        "   Instance splits: {}",
        if plan.shuffle { "random" } else { "leading rows" }
    );
    println!("   Training subsets: {:?}", plan.learn_subsets);
    println!("   Feature subsets: {:?}", plan.feature_subsets);
    println!(
        "   Configurations: {} ({} trials each, {} evaluations)",
        plan.slot_count(),
        plan.repeats,
        plan.slot_count() * plan.repeats * config.sweep.learners.len()
    );

    println!("\n✅ Dry run complete. Nothing was evaluated.");
    Ok(0)
}

/// Progress bar over configuration slots, hidden in quiet mode.
fn progress_bar(len: u64, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", DEFAULT_CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {:#}", e);
            Ok(Config::default())
        }
    }
}
