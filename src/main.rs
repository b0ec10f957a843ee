use std::path::Path;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use log::{info, warn};

use triangle_features_lib::config::Config;
use triangle_features_lib::dataset::read_feature_table;
use triangle_features_lib::feature_extraction::FeatureMode;
use triangle_features_lib::output::{write_feature_csv, write_report_json};
use triangle_features_lib::pipeline::build_training_set;

const DEFAULT_CONFIG: &str = "config.toml";

/// Command-line arguments
#[derive(Parser, Debug)]
#[clap(author, version, about = "Triangle silhouette feature extraction")]
struct Args {
    /// Directory with equilateral/, isosceles/ and scalene/ sample folders
    #[clap(short, long)]
    input: Option<String>,

    /// Path of the feature CSV
    #[clap(short, long)]
    output: Option<String>,

    /// Path to configuration file (config.toml is used when present)
    #[clap(short, long)]
    config: Option<String>,

    /// Feature vector to extract (overwrites config)
    #[clap(short, long)]
    mode: Option<ModeArg>,

    /// Log per-image details and write overlay images next to the processed dumps
    #[clap(short, long)]
    debug: bool,

    /// Process the images of a category in parallel
    #[clap(short, long)]
    parallel: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Bbox,
    Points,
}

fn load_config(args: &Args) -> anyhow::Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_file(path).with_context(|| format!("loading {}", path))?,
        None if Path::new(DEFAULT_CONFIG).is_file() => Config::from_file(DEFAULT_CONFIG)
            .with_context(|| format!("loading {}", DEFAULT_CONFIG))?,
        None => Config::default(),
    };

    // Override config with command-line arguments
    if let Some(input) = &args.input {
        config.input_dir = input.clone();
    }

    if let Some(output) = &args.output {
        config.output_csv = output.clone();
    }

    if let Some(mode) = args.mode {
        config.feature_mode = match mode {
            ModeArg::Bbox => FeatureMode::BoundingBox,
            ModeArg::Points => FeatureMode::PrincipalPoints,
        };
    }

    if args.parallel {
        config.use_parallel = true;
    }

    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    let config = load_config(&args)?;
    let start_time = Instant::now();

    info!("Processing samples in {}", config.input_dir);
    let training_set = build_training_set(&config, args.debug)
        .with_context(|| format!("processing samples in {}", config.input_dir))?;

    let written = write_feature_csv(&config.output_csv, config.feature_mode, training_set.rows())
        .with_context(|| format!("writing {}", config.output_csv))?;
    info!("{} rows written to {}", written, config.output_csv);

    let report = training_set.report(config.feature_mode);
    if report.total_skipped > 0 {
        warn!("{} images skipped", report.total_skipped);
    }

    if let Some(path) = &config.report_json {
        write_report_json(&report, path).with_context(|| format!("writing {}", path))?;
        info!("Batch report written to {}", path);
    }

    // Read the table back the way the training side consumes it
    let table = read_feature_table(&config.output_csv)
        .with_context(|| format!("reading back {}", config.output_csv))?;
    for (category, count) in table.label_counts() {
        info!("{}: {} training examples", category, count);
    }

    let elapsed = start_time.elapsed();
    info!("Processing completed in {:.2} seconds", elapsed.as_secs_f64());

    Ok(())
}
