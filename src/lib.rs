//! Synchronizes the GFS forecast sensor entity of a home-automation hub.
//!
//! The ingestion pipeline reports three events per model run (new run,
//! progress, finished). [`ForecastSensor`] turns each into a sensor
//! document, pushes it to the hub and persists it locally so the last
//! known-good state survives restarts.

pub mod config;
pub mod error;
pub mod hub;
pub mod models;
pub mod sensor;
pub mod store;
pub mod units;

pub use config::Config;
pub use error::{PublishFailed, SyncError, SyncOutcome};
pub use hub::{HubClient, HubLocation, RetryPolicy};
pub use models::{DailyAggregate, RawSample, RunData, RunIdentity, RunInfo, SensorDocument, SensorState};
pub use sensor::ForecastSensor;
pub use store::StateStore;
pub use units::UnitSystem;
