//! fxpca command-line tool
//!
//! ```bash
//! # Score one feature vector
//! fxpca score --model pca_model.json --features 0.1,0,0,0,10,5,...
//!
//! # Build a seeded test-vector suite and its golden reference
//! fxpca vectors --n-features 28 --seed 42 --out vectors.json
//! fxpca golden --model pca_model.json --vectors vectors.json --out golden.json
//!
//! # Compare a hardware trace (exit status 0 on match, 1 otherwise)
//! fxpca compare --golden golden.json --trace trace.json --tolerance 10
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fxpca_harness::{
    verify_trace, ComparisonReport, GoldenPipeline, HardwareTrace, HarnessConfig, IndexBase,
    TestVectorSet, VectorBuilder,
};
use fxpca_kernel::{threshold, GoldenScorer};
use fxpca_model::{GoldenReference, PcaModel};

#[derive(Parser)]
#[command(name = "fxpca")]
#[command(version)]
#[command(about = "Bit-exact fixed-point PCA golden reference and hardware comparator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score one feature vector
    Score {
        /// Model JSON file
        #[arg(short, long, env = "FXPCA_MODEL")]
        model: PathBuf,

        /// Comma-separated raw feature values
        #[arg(short, long, allow_hyphen_values = true)]
        features: String,

        /// Print every intermediate register
        #[arg(long, default_value = "false")]
        trace: bool,

        /// Emit the result as JSON
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Generate a seeded test-vector suite
    Vectors {
        /// Features per vector
        #[arg(short, long, default_value = "28")]
        n_features: usize,

        /// PRNG seed (defaults to FXPCA_SEED, then 42)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Output file
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Generate a golden reference
    Golden {
        /// Model JSON file
        #[arg(short, long, env = "FXPCA_MODEL")]
        model: PathBuf,

        /// Test-vector file; a fresh suite is built when omitted
        #[arg(short, long)]
        vectors: Option<PathBuf>,

        /// Seed for the generated suite when no vector file is given
        #[arg(short, long)]
        seed: Option<u64>,

        /// Output file
        #[arg(short, long)]
        out: PathBuf,

        /// Also record float scores (model must carry float parameters)
        #[arg(long, default_value = "false")]
        with_float: bool,
    },

    /// Compare a hardware trace against a golden reference
    Compare {
        /// Golden reference file
        #[arg(short, long)]
        golden: PathBuf,

        /// Hardware trace file
        #[arg(short, long)]
        trace: PathBuf,

        /// Allowed score difference in raw units (or FXPCA_TOLERANCE)
        #[arg(long)]
        tolerance: Option<u64>,

        /// Trace test-id numbering: one or zero (or FXPCA_INDEX_BASE)
        #[arg(long, value_parser = parse_index_base)]
        index_base: Option<IndexBase>,

        /// Mismatches to list (or FXPCA_MAX_LISTED_MISMATCHES)
        #[arg(long)]
        max_listed: Option<usize>,

        /// Write the report as JSON
        #[arg(short, long)]
        report: Option<PathBuf>,
    },

    /// Re-score a golden reference and check it against its model
    Check {
        /// Model JSON file
        #[arg(short, long, env = "FXPCA_MODEL")]
        model: PathBuf,

        /// Golden reference file
        #[arg(short, long)]
        golden: PathBuf,
    },

    /// Show model dimensions and number format
    Inspect {
        /// Model JSON file
        #[arg(short, long, env = "FXPCA_MODEL")]
        model: PathBuf,
    },
}

/// Used when `RUST_LOG` is unset
const DEFAULT_LOG_FILTER: &str =
    "fxpca=info,fxpca_model=info,fxpca_harness=info,fxpca_kernel=warn";

fn parse_index_base(s: &str) -> std::result::Result<IndexBase, String> {
    IndexBase::from_str(s).ok_or_else(|| format!("expected 'one' or 'zero', got '{}'", s))
}

fn parse_features(s: &str) -> Result<Vec<f64>> {
    s.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| {
            t.parse::<f64>()
                .with_context(|| format!("invalid feature value '{}'", t))
        })
        .collect()
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = HarnessConfig::from_env();

    let outcome = match cli.command {
        Commands::Score {
            model,
            features,
            trace,
            json,
        } => run_score(&model, &features, trace, json),
        Commands::Vectors {
            n_features,
            seed,
            out,
        } => run_vectors(n_features, seed.unwrap_or(config.seed), &out),
        Commands::Golden {
            model,
            vectors,
            seed,
            out,
            with_float,
        } => run_golden(
            &model,
            vectors.as_deref(),
            seed.unwrap_or(config.seed),
            &out,
            with_float,
        ),
        Commands::Compare {
            golden,
            trace,
            tolerance,
            index_base,
            max_listed,
            report,
        } => {
            let mut config = config;
            if tolerance.is_some() {
                config.tolerance = tolerance;
            }
            if let Some(base) = index_base {
                config.index_base = base;
            }
            if let Some(max) = max_listed {
                config.max_listed_mismatches = max;
            }
            run_compare(&golden, &trace, &config, report.as_deref())
        }
        Commands::Check { model, golden } => run_check(&model, &golden),
        Commands::Inspect { model } => run_inspect(&model),
    };

    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{} {:#}", style("[ERROR]").red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run_score(model_path: &Path, features: &str, show_trace: bool, json: bool) -> Result<bool> {
    let scorer = GoldenScorer::new(PcaModel::from_json_file(model_path)?)?;
    let features = parse_features(features)?;
    let frac_bits = scorer.model().frac_bits();
    let quantizer = scorer.quantizer();

    let trace = scorer.trace_features(&features)?;
    let result = trace.result;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(true);
    }

    if show_trace {
        println!("Centered:      {:?}", trace.centered.data);
        println!("Major proj:    {:?}", trace.major_proj.data);
        println!("Minor proj:    {:?}", trace.minor_proj.data);
        println!("Reconstructed: {:?}", trace.recon.data);
        println!("Residual:      {:?}", trace.residual.data);
        println!();
    }

    let verdict = if result.attack_detected {
        style("ATTACK").red().bold()
    } else {
        style("NORMAL").green().bold()
    };
    println!(
        "Major score:  {:>12}  ({:.4})",
        result.major_score,
        quantizer.dequantize(result.major_score)
    );
    println!(
        "Minor score:  {:>12}  ({:.4})",
        result.minor_score,
        quantizer.dequantize(result.minor_score)
    );
    println!("Threshold:    {:>12}", threshold(frac_bits));
    println!("Decision:     {}", verdict);
    Ok(true)
}

fn run_vectors(n_features: usize, seed: u64, out: &Path) -> Result<bool> {
    if n_features == 0 {
        bail!("--n-features must be at least 1");
    }
    let set = VectorBuilder::new(n_features, seed).diverse_suite();
    set.to_json_file(out)
        .with_context(|| format!("writing {}", out.display()))?;
    println!(
        "{} Wrote {} vectors (seed {}) to {}",
        style("[OK]").green().bold(),
        set.len(),
        seed,
        out.display()
    );
    Ok(true)
}

fn run_golden(
    model_path: &Path,
    vectors_path: Option<&Path>,
    seed: u64,
    out: &Path,
    with_float: bool,
) -> Result<bool> {
    let pipeline = GoldenPipeline::from_model_file(model_path)?.with_float(with_float);
    let n_features = pipeline.scorer().model().n_features();

    let set = match vectors_path {
        Some(path) => TestVectorSet::from_json_file(path)?,
        None => VectorBuilder::new(n_features, seed).diverse_suite(),
    };

    let golden = pipeline.generate(&set.vectors)?;
    golden
        .to_json_file(out)
        .with_context(|| format!("writing {}", out.display()))?;

    println!(
        "{} Wrote {} golden results ({} attacks) to {}",
        style("[OK]").green().bold(),
        golden.len(),
        golden.attack_count(),
        out.display()
    );
    Ok(true)
}

fn run_compare(
    golden_path: &Path,
    trace_path: &Path,
    config: &HarnessConfig,
    report_path: Option<&Path>,
) -> Result<bool> {
    let tolerance = config.require_tolerance()?;
    let golden = GoldenReference::from_json_file(golden_path)?;
    let trace = HardwareTrace::from_json_file(trace_path)?;

    let batch = verify_trace(&golden, &trace, tolerance, config.index_base);
    let report = ComparisonReport::from_batch(&batch, tolerance, config.max_listed_mismatches);

    println!("{}", style("Hardware vs Golden Comparison").cyan().bold());
    println!("========================================");
    print!("{}", report);

    if let Some(path) = report_path {
        std::fs::write(path, serde_json::to_string_pretty(&report)?)
            .with_context(|| format!("writing {}", path.display()))?;
    }

    if report.passed() {
        println!("\n{} All compared tests match", style("[PASS]").green().bold());
    } else if report.total == 0 {
        println!("\n{} No hardware results were compared", style("[FAIL]").red().bold());
    } else {
        println!("\n{} {} tests differ", style("[FAIL]").red().bold(), report.failed);
    }
    Ok(report.passed())
}

fn run_check(model_path: &Path, golden_path: &Path) -> Result<bool> {
    let pipeline = GoldenPipeline::from_model_file(model_path)?;
    let golden = GoldenReference::from_json_file(golden_path)?;
    let batch = pipeline.self_check(&golden)?;

    if batch.passed() {
        println!(
            "{} {} golden results reproduce exactly",
            style("[OK]").green().bold(),
            batch.total()
        );
    } else if batch.total() == 0 {
        println!("{} Golden reference has no results to check", style("[FAIL]").red().bold());
    } else {
        println!(
            "{} {} of {} golden results do not reproduce",
            style("[FAIL]").red().bold(),
            batch.fail_count,
            batch.total()
        );
        for m in batch.mismatches.iter().take(10) {
            println!(
                "  sample {}: stored ({}, {}, {}) rescored ({}, {}, {})",
                m.test_id,
                m.golden.major_score,
                m.golden.minor_score,
                m.golden.attack_detected,
                m.observed.major_score,
                m.observed.minor_score,
                m.observed.attack_detected
            );
        }
    }
    Ok(batch.passed())
}

fn run_inspect(model_path: &Path) -> Result<bool> {
    let model = PcaModel::from_json_file(model_path)?;
    let config = model.config();

    println!("Model: {}", model_path.display());
    println!("  Features:          {}", config.n_features);
    println!("  Major components:  {}", config.n_major_components);
    println!("  Minor components:  {}", config.n_minor_components);
    println!("  Format:            {} ({} bits)", config.q_format(), config.total_bits);
    println!("  Quantize mode:     {:?}", config.quantize_mode);
    println!("  Threshold:         {}", threshold(config.frac_bits));
    println!(
        "  Float parameters:  {}",
        if model.float_params().is_some() { "yes" } else { "no" }
    );
    Ok(true)
}
