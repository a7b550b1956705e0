//! Dimfuse: dimension extraction core for engineering drawings.
//!
//! Dimfuse turns the raw text detections of several recognition engines
//! into typed, consolidated dimensions and links each one to the drawing
//! feature it measures.
//!
//! # Modules
//!
//! - [`ir`]: Data model (BoundingBox, Dimension, SymbolNode, relations, JSON I/O)
//! - [`parse`]: Text classification, tolerance/unit extraction, quality gate
//! - [`consolidate`]: Deduplication and weighted-vote merging across engines
//! - [`link`]: Three-tier geometric relation linking
//! - [`pipeline`]: The end-to-end transform for one drawing
//! - [`validation`]: Caller-contract checks over drawing inputs
//! - [`review`]: Human-review queue over pipeline results
//! - [`config`]: YAML-loadable thresholds for every stage
//! - [`error`]: Error types for dimfuse operations

pub mod config;
pub mod consolidate;
pub mod error;
pub mod ir;
pub mod link;
pub mod parse;
pub mod pipeline;
pub mod review;
pub mod validation;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::warn;

pub use config::Config;
pub use error::DimfuseError;
pub use pipeline::process_drawing;

/// The dimfuse CLI application.
#[derive(Parser)]
#[command(name = "dimfuse")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Classify dimension text tokens.
    Classify(ClassifyArgs),
    /// Validate a drawing input for errors and warnings.
    Validate(ValidateArgs),
    /// Run the full pipeline over a drawing input.
    Run(RunArgs),
    /// Show the human-review queue of a pipeline result.
    Review(ReviewArgs),
}

/// Arguments for the classify subcommand.
#[derive(clap::Args)]
struct ClassifyArgs {
    /// Text tokens to classify.
    #[arg(required = true)]
    text: Vec<String>,

    /// Output format ('text' or 'json').
    #[arg(long, default_value = "text")]
    output: String,
}

/// Arguments for the validate subcommand.
#[derive(clap::Args)]
struct ValidateArgs {
    /// Drawing input JSON file to validate.
    input: PathBuf,

    /// Treat warnings as errors (exit non-zero if any warnings).
    #[arg(long)]
    strict: bool,

    /// YAML config supplying the engine weight table.
    #[arg(long, env = "DIMFUSE_CONFIG")]
    config: Option<PathBuf>,

    /// Output format for the report ('text' or 'json').
    #[arg(long, default_value = "text")]
    output: String,
}

/// Arguments for the run subcommand.
#[derive(clap::Args)]
struct RunArgs {
    /// Drawing input JSON file.
    input: PathBuf,

    /// Where to write the result JSON (stdout when omitted).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// YAML config overriding default thresholds.
    #[arg(long, env = "DIMFUSE_CONFIG")]
    config: Option<PathBuf>,
}

/// Arguments for the review subcommand.
#[derive(clap::Args)]
struct ReviewArgs {
    /// Result JSON file written by 'dimfuse run'.
    input: PathBuf,

    /// Confidence threshold below which items are flagged.
    #[arg(long)]
    threshold: Option<f64>,

    /// YAML config supplying the default threshold.
    #[arg(long, env = "DIMFUSE_CONFIG")]
    config: Option<PathBuf>,

    /// Output format ('text' or 'json').
    #[arg(long, default_value = "text")]
    output: String,
}

/// Run the dimfuse CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), DimfuseError> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Some(Commands::Classify(args)) => run_classify(args),
        Some(Commands::Validate(args)) => run_validate(args),
        Some(Commands::Run(args)) => run_pipeline(args),
        Some(Commands::Review(args)) => run_review(args),
        None => {
            println!("dimfuse {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Dimension extraction core for engineering drawings.");
            println!();
            println!("Run 'dimfuse --help' for usage information.");
            Ok(())
        }
    }
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let default_level = match verbose {
        0 => "dimfuse=warn",
        1 => "dimfuse=info",
        _ => "dimfuse=debug",
    };
    // Ignore the error when a subscriber is already installed (tests).
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

fn load_config(path: Option<&Path>) -> Result<Config, DimfuseError> {
    match path {
        Some(path) => Config::load(path),
        None => Ok(Config::default()),
    }
}

fn check_output_format(output: &str) -> Result<(), DimfuseError> {
    match output {
        "text" | "json" => Ok(()),
        other => Err(DimfuseError::UnsupportedFormat(format!(
            "'{}' (supported: text, json)",
            other
        ))),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), DimfuseError> {
    let json = serde_json::to_string_pretty(value).map_err(|source| DimfuseError::JsonWrite {
        path: PathBuf::from("<stdout>"),
        source,
    })?;
    println!("{}", json);
    Ok(())
}

/// One classified token as printed by `dimfuse classify`.
#[derive(Serialize)]
struct ClassifyRow {
    text: String,
    dimension_type: ir::DimensionType,
    value: String,
    tolerance: Option<String>,
    unit: Option<&'static str>,
}

/// Execute the classify subcommand.
fn run_classify(args: ClassifyArgs) -> Result<(), DimfuseError> {
    check_output_format(&args.output)?;

    let rows: Vec<ClassifyRow> = args
        .text
        .into_iter()
        .map(|text| {
            let (dimension_type, value, tolerance) = parse::classify_and_parse(&text);
            let unit = parse::extract_unit(&text);
            ClassifyRow {
                text,
                dimension_type,
                value,
                tolerance,
                unit,
            }
        })
        .collect();

    if args.output == "json" {
        return print_json(&rows);
    }

    for row in &rows {
        println!(
            "{:<20} {:<15} {:<20} tolerance={} unit={}",
            row.text,
            row.dimension_type.as_str(),
            row.value,
            row.tolerance.as_deref().unwrap_or("-"),
            row.unit.unwrap_or("-")
        );
    }
    Ok(())
}

/// Execute the validate subcommand.
fn run_validate(args: ValidateArgs) -> Result<(), DimfuseError> {
    check_output_format(&args.output)?;

    let input = ir::io_json::read_drawing_input(&args.input)?;
    let config = load_config(args.config.as_deref())?;

    let opts = validation::ValidateOptions {
        strict: args.strict,
        weights: config.consolidation.weights,
    };
    let report = validation::validate_input(&input, &opts);

    if args.output == "json" {
        #[derive(Serialize)]
        struct JsonReport<'a> {
            error_count: usize,
            warning_count: usize,
            issues: &'a [validation::ValidationIssue],
        }
        print_json(&JsonReport {
            error_count: report.error_count(),
            warning_count: report.warning_count(),
            issues: &report.issues,
        })?;
    } else {
        print!("{}", report);
    }

    let has_errors = report.error_count() > 0;
    let has_warnings = report.warning_count() > 0;

    if has_errors || (opts.strict && has_warnings) {
        Err(DimfuseError::ValidationFailed {
            error_count: report.error_count(),
            warning_count: report.warning_count(),
            report,
        })
    } else {
        Ok(())
    }
}

/// Execute the run subcommand.
fn run_pipeline(args: RunArgs) -> Result<(), DimfuseError> {
    let input = ir::io_json::read_drawing_input(&args.input)?;
    let config = load_config(args.config.as_deref())?;

    let report = validation::validate_input(
        &input,
        &validation::ValidateOptions {
            strict: false,
            weights: config.consolidation.weights.clone(),
        },
    );
    for issue in report.issues.iter().filter(|i| i.severity == validation::Severity::Warning) {
        warn!("{}", issue);
    }
    if !report.is_ok() {
        return Err(DimfuseError::ValidationFailed {
            error_count: report.error_count(),
            warning_count: report.warning_count(),
            report,
        });
    }

    let result = process_drawing(&input, &config)?;

    match &args.output {
        Some(path) => {
            ir::io_json::write_drawing_result(path, &result)?;
            println!(
                "Wrote {} dimension(s) and {} relation(s) to {}",
                result.dimensions.len(),
                result.relations.len(),
                path.display()
            );
        }
        None => {
            let json = ir::io_json::result_to_json_string(&result).map_err(|source| {
                DimfuseError::JsonWrite {
                    path: PathBuf::from("<stdout>"),
                    source,
                }
            })?;
            println!("{}", json);
        }
    }
    Ok(())
}

/// Execute the review subcommand.
fn run_review(args: ReviewArgs) -> Result<(), DimfuseError> {
    check_output_format(&args.output)?;

    let result = ir::io_json::read_drawing_result(&args.input)?;
    let mut opts = load_config(args.config.as_deref())?.review;
    if let Some(threshold) = args.threshold {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(DimfuseError::InvalidConfig(format!(
                "--threshold must lie in [0, 1], got {}",
                threshold
            )));
        }
        opts.confidence_threshold = threshold;
    }

    let report = review::build_review_queue(&result.dimensions, &result.relations, &opts);
    if args.output == "json" {
        print_json(&report)
    } else {
        print!("{}", report);
        Ok(())
    }
}
