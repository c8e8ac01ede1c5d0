//! The forecast sensor state machine.
//!
//! Each transition follows the same sequence: restore the persisted
//! document, apply the transition to that copy, push it to the hub, and
//! persist it only when the hub accepted it. A refused push therefore
//! leaves the previous snapshot on disk and the next attempt replays the
//! same transition.
//!
//! ```text
//!  Uninitialized ──set_base_data──▶ Initializing ──tick──▶ Loading ──complete_run──▶ Finished
//!                                        ▲                                              │
//!                                        └──────────── set_base_data (new run) ─────────┘
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{info, instrument, warn};

use crate::error::{SyncError, SyncOutcome};
use crate::hub::{HubClient, HubLocation};
use crate::models::{
    CompletedRun, CurrentRun, DailyAggregate, Loading, RunData, RunIdentity, SensorDocument,
    SensorState,
};
use crate::store::StateStore;
use crate::units::UnitSystem;

// ---

pub struct ForecastSensor {
    hub: HubClient,
    store: StateStore,
    entity_id: String,
    units: UnitSystem,
    location: HubLocation,
    document: SensorDocument,
}

impl ForecastSensor {
    pub fn new(
        hub: HubClient,
        store: StateStore,
        entity_id: &str,
        units: UnitSystem,
        location: HubLocation,
    ) -> Self {
        // ---
        Self {
            hub,
            store,
            entity_id: entity_id.to_string(),
            units,
            location,
            document: SensorDocument::default(),
        }
    }

    /// Hub coordinates as `(latitude, longitude)`.
    pub fn position(&self) -> (f64, f64) {
        (self.location.latitude, self.location.longitude)
    }

    /// The document produced by the most recent transition, pushed or not.
    pub fn document(&self) -> &SensorDocument {
        &self.document
    }

    /// Re-announce the persisted document unchanged, e.g. after the hub
    /// or the add-on restarted.
    #[instrument(skip(self), level = "info")]
    pub async fn republish(&mut self) -> Result<SyncOutcome, SyncError> {
        // ---
        let doc = self.store.restore()?;
        self.commit(doc).await
    }

    /// A new model run is available upstream.
    #[instrument(skip(self, run), fields(run = %run), level = "info")]
    pub async fn set_base_data(&mut self, run: RunIdentity) -> Result<SyncOutcome, SyncError> {
        // ---
        let mut doc = self.store.restore()?;
        announce_run(&mut doc, run);
        self.commit(doc).await
    }

    /// Ingestion progressed to hour `offset` of `run`.
    #[instrument(skip(self, run), fields(run = %run), level = "info")]
    pub async fn tick(&mut self, run: RunIdentity, offset: u32) -> Result<SyncOutcome, SyncError> {
        // ---
        let mut doc = self.store.restore()?;
        record_progress(&mut doc, run, offset);
        self.commit(doc).await
    }

    /// The run finished ingesting; rebuild the forecast from its data.
    pub async fn complete_run(
        &mut self,
        data: &RunData,
        daily: &BTreeMap<NaiveDate, DailyAggregate>,
        detailed: bool,
    ) -> Result<SyncOutcome, SyncError> {
        self.complete_run_at(data, daily, detailed, Utc::now()).await
    }

    /// [`complete_run`](Self::complete_run) with an explicit wall-clock time.
    #[instrument(skip(self, data, daily), fields(run = %data.info.identity()), level = "info")]
    pub async fn complete_run_at(
        &mut self,
        data: &RunData,
        daily: &BTreeMap<NaiveDate, DailyAggregate>,
        detailed: bool,
        now: DateTime<Utc>,
    ) -> Result<SyncOutcome, SyncError> {
        // ---
        let mut doc = self.store.restore()?;
        let context = FinishContext {
            units: self.units,
            location: self.location,
            now,
        };
        finish_run(&mut doc, &context, data, daily, detailed);
        self.commit(doc).await
    }

    /// Push `doc`, then persist it if the hub accepted it.
    async fn commit(&mut self, doc: SensorDocument) -> Result<SyncOutcome, SyncError> {
        // ---
        self.document = doc;

        match self.hub.publish(&self.entity_id, &self.document).await {
            Ok(()) => {
                self.store.save(&self.document)?;
                info!("Sensor {} is now {}", self.entity_id, self.document.state);
                Ok(SyncOutcome::Persisted)
            }
            Err(failed) => {
                warn!(
                    "Sensor {} not updated to {}, keeping persisted state",
                    self.entity_id, self.document.state
                );
                Ok(SyncOutcome::PublishFailed(failed))
            }
        }
    }
}

// ---

/// Mark `run` as initializing unless it is already the current run.
///
/// An empty `current` is first seeded with the unknown placeholder. The
/// placeholder never equals a real run, so a fresh install always moves
/// to `Initializing`.
fn announce_run(doc: &mut SensorDocument, run: RunIdentity) {
    // ---
    let attrs = &mut doc.attributes;
    if attrs.current == CurrentRun::Unset {
        attrs.current = CurrentRun::Unknown;
    }

    if attrs.current.is_run(run) {
        return;
    }
    doc.state = SensorState::Initializing;
    attrs.loading = Loading::Announced(run);
}

/// Record progress. The run is taken on trust: it is not checked against
/// the run that was announced.
fn record_progress(doc: &mut SensorDocument, run: RunIdentity, offset: u32) {
    // ---
    doc.state = SensorState::Loading;
    doc.attributes.loading = Loading::Progress { run, offset };
}

struct FinishContext {
    units: UnitSystem,
    location: HubLocation,
    now: DateTime<Utc>,
}

fn finish_run(
    doc: &mut SensorDocument,
    ctx: &FinishContext,
    data: &RunData,
    daily: &BTreeMap<NaiveDate, DailyAggregate>,
    detailed: bool,
) {
    // ---
    let tz = ctx.location.time_zone;
    let local_now = ctx.now.with_timezone(&tz);
    let today = local_now.date_naive();
    let attrs = &mut doc.attributes;

    doc.state = SensorState::Finished;
    attrs.current = CurrentRun::Completed(CompletedRun {
        run: data.info.identity(),
        used_latitude: data.info.used_latitude,
        used_longitude: data.info.used_longitude,
    });
    attrs.set_units(ctx.units);
    attrs.loading = Loading::Idle;
    attrs.last_updated = Some(local_now.fixed_offset());

    attrs.detailed_forecast = detailed.then(|| {
        let base = data.info.base_time(tz);
        data.samples
            .iter()
            .map(|(offset, sample)| sample.to_detailed(base, *offset, ctx.units))
            .collect()
    });

    attrs.forecast = daily
        .iter()
        .filter(|(date, _)| **date > today)
        .map(|(date, aggregate)| aggregate.to_forecast(*date, tz, ctx.units))
        .collect();
}
