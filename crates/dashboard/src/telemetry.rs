//! Logging and metrics setup

use anyhow::Result;
use metrics::{describe_counter, describe_gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const PREDICTIONS_TOTAL: &str = "interest_predictions_total";
pub const PREDICTION_FAILURES_TOTAL: &str = "interest_prediction_failures_total";
pub const BATCH_ROWS_TOTAL: &str = "interest_batch_rows_total";
pub const MODEL_LOADED: &str = "interest_model_loaded";

/// `RUST_LOG` wins over the configured level.
pub fn init_logging(level: &str, format: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        "pretty" => registry.with(tracing_subscriber::fmt::layer().pretty()).try_init()?,
        "compact" => registry.with(tracing_subscriber::fmt::layer().compact()).try_init()?,
        _ => registry.with(tracing_subscriber::fmt::layer()).try_init()?,
    }

    Ok(())
}

pub fn init_metrics(enabled: bool) -> Option<PrometheusHandle> {
    if !enabled {
        info!("Prometheus metrics exporter disabled via configuration");
        return None;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            info!("Prometheus metrics exporter registered");
            describe_counter!(PREDICTIONS_TOTAL, "Successful predictions by label");
            describe_counter!(
                PREDICTION_FAILURES_TOTAL,
                "Predictions rejected because of invalid input"
            );
            describe_counter!(BATCH_ROWS_TOTAL, "Rows processed by batch predictions");
            describe_gauge!(MODEL_LOADED, "1 once the model artifact has been loaded");
            Some(handle)
        }
        Err(err) => {
            warn!("Failed to install Prometheus metrics exporter: {}", err);
            None
        }
    }
}
