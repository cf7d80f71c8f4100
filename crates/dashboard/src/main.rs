//! Interest dashboard binary
//!
//! Serves the web dashboard by default; `predict`, `batch` and `inspect`
//! run the same operations once from the command line.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use interest_dashboard::config::{DashboardConfig, Overrides, ENV_PREFIX};
use interest_dashboard::telemetry::{self, MODEL_LOADED};
use interest_dashboard::{start_server, AppState};
use interest_predictor::{BatchReport, FeatureVector, Predictor, SampleDataset};
use metrics::gauge;
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "interest-dashboard")]
#[command(author = "Interest Predictor Contributors")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Predict Animation, Action or Drama interest from age and gender", long_about = None)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Listen host
    #[arg(long, global = true)]
    host: Option<String>,

    /// Listen port
    #[arg(short, long, global = true)]
    port: Option<u16>,

    /// Model artifact path
    #[arg(short, long, global = true)]
    model: Option<PathBuf>,

    /// Sample CSV for batch predictions
    #[arg(short, long, global = true)]
    samples: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP dashboard (default)
    Serve,
    /// Print one prediction
    Predict {
        #[arg(long)]
        age: String,
        /// male/female, m/f or 1/0
        #[arg(long)]
        gender: String,
    },
    /// Run a sample CSV through the model
    Batch {
        /// Defaults to the configured sample file
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
    /// Print the model summary and tree diagram
    Inspect,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            host: self.host.clone(),
            port: self.port,
            model_path: self.model.clone(),
            sample_path: self.samples.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let source = DashboardConfig::locate(cli.config.as_deref())?;
    let mut config = DashboardConfig::load_from(source.as_deref(), ENV_PREFIX)?;
    config.apply(cli.overrides());
    config.validate()?;

    telemetry::init_logging(&config.log_level, &config.log_format)?;
    match &source {
        Some(path) => info!("Loaded configuration from {}", path.display()),
        None => info!("No configuration file; using defaults and environment"),
    }

    if let Err(err) = run(cli, config).await {
        error!("{:#}", err);
        return Err(err);
    }
    Ok(())
}

async fn run(cli: Cli, config: DashboardConfig) -> Result<()> {
    let predictor = load_predictor(&config)?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config, predictor).await,
        Command::Predict { age, gender } => {
            let input = FeatureVector::parse(&age, &gender)?;
            let result = predictor.predict(&input)?;
            println!(
                "{} {} (confidence {:.1}%)",
                result.label.emoji(),
                result.label,
                result.confidence() * 100.0
            );
            for (label, p) in result.ranked() {
                println!("  {:<10} {:>6.1}%", label.as_str(), p * 100.0);
            }
            Ok(())
        }
        Command::Batch { input } => {
            let path = input
                .or(config.sample_path)
                .context("No sample file given; pass --input or configure sample_path")?;
            let dataset = SampleDataset::from_csv(&path)?;
            print_report(&predictor.predict_samples(&dataset));
            Ok(())
        }
        Command::Inspect => {
            let summary = predictor.summary();
            println!("fingerprint: {}", summary.fingerprint);
            println!(
                "depth: {}  leaves: {}  nodes: {}",
                summary.depth, summary.leaf_count, summary.node_count
            );
            println!("feature importances:");
            for item in &summary.feature_importances {
                println!("  {:<8} {:.4}", item.feature, item.importance);
            }
            println!();
            print!("{}", predictor.render_tree());
            Ok(())
        }
    }
}

/// Load the artifact; any failure here stops the process before a listener exists
fn load_predictor(config: &DashboardConfig) -> Result<Predictor> {
    Predictor::load_verified(&config.model_path, config.expected_model_hash.as_deref())
        .with_context(|| {
            format!(
                "Failed to load model artifact {}",
                config.model_path.display()
            )
        })
}

async fn serve(config: DashboardConfig, predictor: Predictor) -> Result<()> {
    let metrics = telemetry::init_metrics(config.metrics_enabled);
    gauge!(MODEL_LOADED).set(1.0);

    info!(
        "Serving model {} (sample file: {})",
        predictor.fingerprint(),
        config
            .sample_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "none".to_string())
    );

    let state = AppState::new(predictor)
        .with_sample_path(config.sample_path.clone())
        .with_metrics(metrics);
    start_server(state, &config.bind_addr()).await
}

fn print_report(report: &BatchReport) {
    for entry in &report.entries {
        match &entry.outcome {
            Ok(prediction) => {
                let expected = entry
                    .expected
                    .map(|label| format!(" (actual {label})"))
                    .unwrap_or_default();
                println!(
                    "row {:>3}: {} {:.1}%{}",
                    entry.row,
                    prediction.label,
                    prediction.confidence() * 100.0,
                    expected
                );
            }
            Err(err) => println!("row {:>3}: error: {}", entry.row, err),
        }
    }

    let stats = report.stats();
    println!(
        "{} rows, {} predicted, {} failed",
        stats.total, stats.succeeded, stats.failed
    );
    if let Some(accuracy) = stats.accuracy {
        println!("accuracy: {:.1}%", accuracy * 100.0);
    }
}
