//! Application entry point for the `gfs-forecast-sensor` add-on.
//!
//! This binary runs the start-up half of the sensor lifecycle:
//! - Loading configuration from environment variables or `.env`
//! - Initializing structured logging/tracing
//! - Resolving the hub location and timezone (fatal if unavailable)
//! - Re-publishing the last persisted sensor document so the hub shows the
//!   last known-good forecast again after a restart
//!
//! # Environment Variables
//! - `SUPERVISOR_TOKEN` (**required**) – hub API token
//! - `HUB_API_URL`, `SENSOR_ENTITY_ID`, `UNIT_SYSTEM`, `SENSOR_DATA_DIR` (optional)
//! - `SENSOR_LOG_LEVEL` (optional) – log verbosity (default: `info`)
//! - `SENSOR_SPAN_EVENTS` (optional) – span event mode for tracing
use std::{env, io::IsTerminal};

use anyhow::Result;
use dotenvy::dotenv;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

use gfs_forecast_sensor::{config, ForecastSensor, HubClient, RetryPolicy, StateStore, SyncOutcome};

// ---

#[tokio::main]
async fn main() -> Result<()> {
    // ---
    // .env must be loaded first so it can set the logging variables
    dotenv().ok();
    init_tracing();

    let cfg = config::load_from_env()?;
    cfg.log_config();

    let hub = HubClient::new(&cfg.api_url, &cfg.api_token);
    let location = hub.fetch_location(RetryPolicy::default()).await?;

    let store = StateStore::new(&cfg.data_dir, &cfg.entity_id);
    let mut sensor = ForecastSensor::new(hub, store, &cfg.entity_id, cfg.unit_system, location);

    let (latitude, longitude) = sensor.position();
    tracing::info!("Forecast location: {} {}", latitude, longitude);

    match sensor.republish().await? {
        SyncOutcome::Persisted => {
            tracing::info!("Restored {} ({})", cfg.entity_id, sensor.document().state)
        }
        SyncOutcome::PublishFailed(failed) => {
            tracing::warn!("Could not restore {} on the hub: {}", cfg.entity_id, failed)
        }
    }

    Ok(())
}

// ---

/// Initialize the global tracing subscriber for structured logging.
///
/// This function configures the [`tracing_subscriber`] with:
/// - Log target, file, and line number output enabled
/// - Color output controlled by TTY detection and `FORCE_COLOR` env var:
///   - `FORCE_COLOR=1|true|yes`: force colors on
///   - `FORCE_COLOR=0|false|no`: force colors off
///   - unset or other values: auto-detect TTY
/// - Span event emission mode controlled by the `SENSOR_SPAN_EVENTS` env var:
///   - `"full"`       : emit ENTER, EXIT, and CLOSE events with timing
///   - `"enter_exit"` : emit ENTER and EXIT only
///   - unset or other values: emit CLOSE events only (default)
/// - Log level controlled by the `SENSOR_LOG_LEVEL` env var
///
/// This should be called once at process startup before any logging
/// or tracing macros are invoked.
fn init_tracing() {
    // ---
    let span_events = match env::var("SENSOR_SPAN_EVENTS").as_deref() {
        Ok("full") => FmtSpan::FULL,
        Ok("enter_exit") => FmtSpan::ENTER | FmtSpan::EXIT,
        _ => FmtSpan::CLOSE,
    };

    // Determine if we should use colors
    let use_color = match env::var("FORCE_COLOR").as_deref() {
        Ok("1") | Ok("true") | Ok("yes") => true,
        Ok("0") | Ok("false") | Ok("no") => false,
        _ => std::io::stdout().is_terminal(),
    };

    // Use RUST_LOG if available, otherwise fall back to SENSOR_LOG_LEVEL
    let env_filter = if env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match env::var("SENSOR_LOG_LEVEL").ok().as_deref() {
            Some("trace") => "trace",
            Some("debug") => "debug",
            Some("info") => "info",
            Some("warn") => "warn",
            Some("error") => "error",
            _ => "info",
        };
        EnvFilter::new(format!("{level},hyper=warn,reqwest=warn"))
    };

    tracing_subscriber::fmt()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(span_events)
        .with_env_filter(env_filter)
        .with_ansi(use_color)
        .compact()
        .init();
}
