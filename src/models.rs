//! Data models for the forecast sensor.
//!
//! [`SensorDocument`] is the unit that is both pushed to the hub and
//! persisted locally. The raw upstream inputs (run info, per-offset
//! samples and per-day aggregates) are defined here too, together with the
//! transformations that turn them into published forecast records.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::units::{self, Condition, UnitSystem};

// ---

pub const DEFAULT_NAME: &str = "GFS forecast";
pub const DEFAULT_ICON: &str = "mdi:weather-partly-cloudy";

/// Placeholder written for both `date` and `pass` before any run completes.
pub const UNKNOWN: &str = "unknown";

/// Daily maxima at or below this are "no data".
pub const NO_DATA_MAX: f64 = -999.0;

/// Daily minima at or above this are "no data".
pub const NO_DATA_MIN: f64 = 999.0;

// ---

/// Published sensor state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SensorState {
    #[default]
    #[serde(rename = "")]
    Uninitialized,
    Initializing,
    Loading,
    Finished,
}

impl fmt::Display for SensorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // ---
        let label = match self {
            Self::Uninitialized => "Uninitialized",
            Self::Initializing => "Initializing",
            Self::Loading => "Loading",
            Self::Finished => "Finished",
        };
        f.write_str(label)
    }
}

/// Identity of one model run: calendar date plus forecast cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunIdentity {
    pub date: NaiveDate,
    pub pass: u32,
}

impl RunIdentity {
    pub fn new(date: NaiveDate, pass: u32) -> Self {
        Self { date, pass }
    }
}

impl fmt::Display for RunIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{:02}", self.date, self.pass)
    }
}

// ---

/// The last run that reached `Finished`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletedRun {
    pub run: RunIdentity,
    pub used_latitude: f64,
    pub used_longitude: f64,
}

/// `attributes.current` of the document.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "CurrentRepr", into = "CurrentRepr")]
pub enum CurrentRun {
    /// Empty object, as written by a fresh default document.
    #[default]
    Unset,
    /// `{"date": "unknown", "pass": "unknown"}`.
    Unknown,
    Completed(CompletedRun),
}

impl CurrentRun {
    /// Whether this records exactly `run`. The sentinels never match.
    pub fn is_run(&self, run: RunIdentity) -> bool {
        matches!(self, Self::Completed(done) if done.run == run)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CurrentRepr {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pass: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    used_latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    used_longitude: Option<f64>,
}

impl TryFrom<CurrentRepr> for CurrentRun {
    type Error = String;

    fn try_from(repr: CurrentRepr) -> Result<Self, Self::Error> {
        // ---
        let (date, pass) = match (repr.date, repr.pass) {
            (Some(date), Some(pass)) => (date, pass),
            _ => return Ok(Self::Unset),
        };
        if date == UNKNOWN {
            return Ok(Self::Unknown);
        }

        let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
            .map_err(|e| format!("invalid current.date '{date}': {e}"))?;
        let pass = pass
            .as_u64()
            .and_then(|p| u32::try_from(p).ok())
            .ok_or_else(|| format!("invalid current.pass '{pass}'"))?;

        let (used_latitude, used_longitude) = match (repr.used_latitude, repr.used_longitude) {
            (Some(lat), Some(lon)) => (lat, lon),
            _ => return Err(format!("current run {date}/{pass} has no grid position")),
        };

        Ok(Self::Completed(CompletedRun {
            run: RunIdentity::new(date, pass),
            used_latitude,
            used_longitude,
        }))
    }
}

impl From<CurrentRun> for CurrentRepr {
    fn from(current: CurrentRun) -> Self {
        // ---
        match current {
            CurrentRun::Unset => CurrentRepr::default(),
            CurrentRun::Unknown => CurrentRepr {
                date: Some(UNKNOWN.to_string()),
                pass: Some(serde_json::Value::from(UNKNOWN)),
                ..Default::default()
            },
            CurrentRun::Completed(done) => CurrentRepr {
                date: Some(done.run.date.to_string()),
                pass: Some(serde_json::Value::from(done.run.pass)),
                used_latitude: Some(done.used_latitude),
                used_longitude: Some(done.used_longitude),
            },
        }
    }
}

// ---

/// `attributes.loading`: what run (if any) is being ingested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "LoadingRepr", into = "LoadingRepr")]
pub enum Loading {
    #[default]
    Idle,
    /// A new run was announced, no samples yet.
    Announced(RunIdentity),
    /// Samples are arriving; `offset` is the last hour offset processed.
    Progress { run: RunIdentity, offset: u32 },
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct LoadingRepr {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pass: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    offset: Option<u32>,
}

impl From<LoadingRepr> for Loading {
    fn from(repr: LoadingRepr) -> Self {
        // ---
        match (repr.date, repr.pass, repr.offset) {
            (Some(date), Some(pass), Some(offset)) => Self::Progress {
                run: RunIdentity::new(date, pass),
                offset,
            },
            (Some(date), Some(pass), None) => Self::Announced(RunIdentity::new(date, pass)),
            _ => Self::Idle,
        }
    }
}

impl From<Loading> for LoadingRepr {
    fn from(loading: Loading) -> Self {
        // ---
        match loading {
            Loading::Idle => LoadingRepr::default(),
            Loading::Announced(run) => LoadingRepr {
                date: Some(run.date),
                pass: Some(run.pass),
                offset: None,
            },
            Loading::Progress { run, offset } => LoadingRepr {
                date: Some(run.date),
                pass: Some(run.pass),
                offset: Some(offset),
            },
        }
    }
}

// ---

/// One daily forecast entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRecord {
    pub datetime: DateTime<FixedOffset>,
    pub condition: Condition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub templow: Option<i64>,
    pub precipitation: i64,
    pub wind_speed: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_speed_bft: Option<u8>,
    pub wind_rose: String,
    pub wind_bearing: i64,
    pub chance_of_sun: i64,
    pub chance_of_rain: i64,
}

/// One per-offset forecast entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedForecastRecord {
    pub datetime: DateTime<FixedOffset>,
    pub windspeed: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub windspeed_bft: Option<u8>,
    pub windangle: i64,
    pub windrose: String,
    pub gust: i64,
    pub temperature: i64,
    pub rain: i64,
    pub pressure: f64,
    pub visibility: i64,
    pub cldhigh: i64,
    pub cldmid: i64,
    pub cldlow: i64,
    pub cldtotal: i64,
    pub tmp500hpa: i64,
    pub cape: i64,
    pub liftedindex: i64,
    pub offset: u32,
}

// ---

/// Everything under `attributes` of the published entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attributes {
    pub icon: String,
    pub friendly_name: String,
    #[serde(default)]
    pub current: CurrentRun,
    #[serde(default)]
    pub forecast: Vec<ForecastRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detailed_forecast: Option<Vec<DetailedForecastRecord>>,
    #[serde(default)]
    pub loading: Loading,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure_unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_speed_unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precipitation_unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<FixedOffset>>,
}

impl Attributes {
    /// Write the four unit labels implied by `units`.
    pub fn set_units(&mut self, units: UnitSystem) {
        // ---
        let labels = units.labels();
        self.pressure_unit = Some(labels.pressure.to_string());
        self.wind_speed_unit = Some(labels.wind_speed.to_string());
        self.precipitation_unit = Some(labels.precipitation.to_string());
        self.temperature_unit = Some(labels.temperature.to_string());
    }
}

/// The entity state document exchanged with the hub and the local store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorDocument {
    pub state: SensorState,
    pub name: String,
    pub attributes: Attributes,
}

impl Default for SensorDocument {
    /// Seed document used when nothing is persisted yet.
    fn default() -> Self {
        // ---
        Self {
            state: SensorState::Uninitialized,
            name: DEFAULT_NAME.to_string(),
            attributes: Attributes {
                icon: DEFAULT_ICON.to_string(),
                friendly_name: DEFAULT_NAME.to_string(),
                current: CurrentRun::Unset,
                forecast: Vec::new(),
                detailed_forecast: None,
                loading: Loading::Idle,
                pressure_unit: None,
                wind_speed_unit: None,
                precipitation_unit: None,
                temperature_unit: None,
                last_updated: None,
            },
        }
    }
}

// ---

/// Identity and grid point of a completed run, as reported upstream.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct RunInfo {
    pub date: NaiveDate,
    pub pass: u32,
    pub used_latitude: f64,
    pub used_longitude: f64,
}

impl RunInfo {
    pub fn identity(&self) -> RunIdentity {
        RunIdentity::new(self.date, self.pass)
    }
}

/// Raw model values at one hour offset. All SI: m/s, °C, mm, Pa, m, %.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct RawSample {
    pub uwind: f64,
    pub vwind: f64,
    pub gust: f64,
    pub tmp: f64,
    pub rain: f64,
    pub pres: f64,
    pub vis: f64,
    pub cldhigh: f64,
    pub cldmid: f64,
    pub cldlow: f64,
    pub cldtotal: f64,
    pub tmp500hpa: f64,
    pub cape: f64,
    pub liftedindex: f64,
}

/// A fully ingested run: identity plus samples keyed by hour offset.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RunData {
    pub info: RunInfo,
    pub samples: BTreeMap<u32, RawSample>,
}

/// Per-day aggregate computed upstream. Temperatures use
/// [`NO_DATA_MAX`]/[`NO_DATA_MIN`] when the day has no samples.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct DailyAggregate {
    pub chance_of_sun: f64,
    pub chance_of_rain: f64,
    pub rain: f64,
    pub min_temperature_daytime: f64,
    pub temperature_max: f64,
    pub temperature_min: f64,
    /// Mean wind speed in m/s.
    pub windspeed: f64,
    pub windangle: f64,
}

// ---

/// Localize a wall-clock time in `tz`.
///
/// A time skipped by a DST jump is read with the offset in force before
/// the jump, which lands on the first valid instant after the gap and
/// keeps the calendar date.
pub fn localize(tz: Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    // ---
    if let Some(dt) = tz.from_local_datetime(&naive).earliest() {
        return dt;
    }

    let offset = tz
        .offset_from_local_datetime(&(naive - Duration::days(1)))
        .earliest()
        .map(|o| o.fix().local_minus_utc())
        .unwrap_or(0);
    tz.from_utc_datetime(&(naive - Duration::seconds(i64::from(offset))))
}

impl DailyAggregate {
    pub fn to_forecast(&self, date: NaiveDate, tz: Tz, units: UnitSystem) -> ForecastRecord {
        // ---
        let condition = units::classify_condition(
            self.chance_of_sun,
            self.rain,
            self.min_temperature_daytime,
        );
        let temperature = (self.temperature_max > NO_DATA_MAX)
            .then(|| units::round_half(units.temperature(self.temperature_max)));
        let templow = (self.temperature_min < NO_DATA_MIN)
            .then(|| units::round_half(units.temperature(self.temperature_min)));

        ForecastRecord {
            datetime: localize(tz, date.and_time(NaiveTime::MIN)).fixed_offset(),
            condition,
            temperature,
            templow,
            precipitation: units::round_half(units.precipitation(self.rain)),
            wind_speed: units::round_half(units.wind_speed(self.windspeed)),
            wind_speed_bft: units.is_metric().then(|| units::beaufort(self.windspeed)),
            wind_rose: units::wind_rose(self.windangle).to_string(),
            wind_bearing: units::round_bearing(self.windangle),
            chance_of_sun: units::round_half(self.chance_of_sun),
            chance_of_rain: units::round_half(self.chance_of_rain),
        }
    }
}

impl RawSample {
    /// Build the detailed record for this sample. `base` is the run's
    /// start time (run date at hour `pass`) in the configured timezone.
    pub fn to_detailed(
        &self,
        base: DateTime<Tz>,
        offset: u32,
        units: UnitSystem,
    ) -> DetailedForecastRecord {
        // ---
        let wind = units::wind_from_components(self.vwind, self.uwind, units);

        DetailedForecastRecord {
            datetime: (base + Duration::hours(i64::from(offset))).fixed_offset(),
            windspeed: units::round_half(wind.speed),
            windspeed_bft: units.is_metric().then(|| units::beaufort(wind.speed_ms)),
            windangle: units::round_bearing(wind.bearing),
            windrose: units::wind_rose(wind.bearing).to_string(),
            gust: units.gust(self.gust),
            temperature: units::round_half(units.temperature(self.tmp)),
            rain: units::round_half(units.precipitation(self.rain)),
            pressure: units.pressure(self.pres),
            visibility: units::round_half(self.vis),
            cldhigh: units::round_half(self.cldhigh),
            cldmid: units::round_half(self.cldmid),
            cldlow: units::round_half(self.cldlow),
            cldtotal: units::round_half(self.cldtotal),
            tmp500hpa: units::round_half(units.temperature(self.tmp500hpa)),
            cape: units::round_half(self.cape),
            liftedindex: units::round_half(self.liftedindex),
            offset,
        }
    }
}

impl RunInfo {
    /// Start of the run: its date at hour `pass`, localized in `tz`.
    pub fn base_time(&self, tz: Tz) -> DateTime<Tz> {
        // ---
        let naive = self.date.and_time(NaiveTime::MIN) + Duration::hours(i64::from(self.pass));
        localize(tz, naive)
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use serde_json::json;

    fn create_test_aggregate() -> DailyAggregate {
        // ---
        DailyAggregate {
            chance_of_sun: 82.4,
            chance_of_rain: 10.6,
            rain: 0.4,
            min_temperature_daytime: 12.0,
            temperature_max: 21.6,
            temperature_min: 9.4,
            windspeed: 4.2,
            windangle: 225.0,
        }
    }

    fn create_test_sample() -> RawSample {
        // ---
        RawSample {
            uwind: 3.0,
            vwind: 4.0,
            gust: 10.0,
            tmp: 18.4,
            rain: 1.6,
            pres: 101_325.0,
            vis: 24_100.3,
            cldhigh: 12.5,
            cldmid: 40.2,
            cldlow: 0.0,
            cldtotal: 55.5,
            tmp500hpa: -21.3,
            cape: 310.7,
            liftedindex: -1.2,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_default_document_shape() {
        // ---
        let json = serde_json::to_value(SensorDocument::default()).unwrap();
        assert_eq!(
            json,
            json!({
                "state": "",
                "name": "GFS forecast",
                "attributes": {
                    "icon": "mdi:weather-partly-cloudy",
                    "friendly_name": "GFS forecast",
                    "current": {},
                    "forecast": [],
                    "loading": {}
                }
            })
        );
    }

    #[test]
    fn test_state_labels() {
        // ---
        assert_eq!(serde_json::to_value(SensorState::Uninitialized).unwrap(), json!(""));
        assert_eq!(serde_json::to_value(SensorState::Initializing).unwrap(), json!("Initializing"));
        assert_eq!(serde_json::to_value(SensorState::Loading).unwrap(), json!("Loading"));
        assert_eq!(serde_json::to_value(SensorState::Finished).unwrap(), json!("Finished"));
        assert!(serde_json::from_value::<SensorState>(json!("Initialising")).is_err());
    }

    #[test]
    fn test_current_run_forms() {
        // ---
        let unknown: CurrentRun = serde_json::from_value(json!({"date": "unknown", "pass": "unknown"})).unwrap();
        assert_eq!(unknown, CurrentRun::Unknown);
        assert_eq!(serde_json::to_value(unknown).unwrap(), json!({"date": "unknown", "pass": "unknown"}));

        let unset: CurrentRun = serde_json::from_value(json!({})).unwrap();
        assert_eq!(unset, CurrentRun::Unset);

        let done: CurrentRun = serde_json::from_value(json!({
            "date": "2024-01-01", "pass": 6, "used_latitude": 52.25, "used_longitude": 4.5
        }))
        .unwrap();
        assert!(done.is_run(RunIdentity::new(date(2024, 1, 1), 6)));
        assert!(!done.is_run(RunIdentity::new(date(2024, 1, 1), 12)));
        assert!(!CurrentRun::Unknown.is_run(RunIdentity::new(date(2024, 1, 1), 6)));

        assert!(serde_json::from_value::<CurrentRun>(json!({"date": "yesterday", "pass": 0})).is_err());
    }

    #[test]
    fn test_loading_forms() {
        // ---
        let run = RunIdentity::new(date(2024, 1, 1), 0);
        assert_eq!(serde_json::to_value(Loading::Idle).unwrap(), json!({}));
        assert_eq!(
            serde_json::to_value(Loading::Announced(run)).unwrap(),
            json!({"date": "2024-01-01", "pass": 0})
        );
        assert_eq!(
            serde_json::to_value(Loading::Progress { run, offset: 6 }).unwrap(),
            json!({"date": "2024-01-01", "pass": 0, "offset": 6})
        );

        let parsed: Loading = serde_json::from_value(json!({"date": "2024-01-01", "pass": 0, "offset": 6})).unwrap();
        assert_eq!(parsed, Loading::Progress { run, offset: 6 });
    }

    #[test]
    fn test_daily_forecast_metric() {
        // ---
        let record = create_test_aggregate().to_forecast(date(2024, 1, 2), Tz::Europe__Amsterdam, UnitSystem::Metric);

        assert_eq!(record.datetime.to_rfc3339(), "2024-01-02T00:00:00+01:00");
        assert_eq!(record.condition, Condition::Sunny);
        assert_eq!(record.temperature, Some(22));
        assert_eq!(record.templow, Some(9));
        assert_eq!(record.precipitation, 0);
        assert_eq!(record.wind_speed, 4);
        assert_eq!(record.wind_speed_bft, Some(3));
        assert_eq!(record.wind_rose, "SW");
        assert_eq!(record.wind_bearing, 225);
        assert_eq!(record.chance_of_sun, 82);
        assert_eq!(record.chance_of_rain, 11);
    }

    #[test]
    fn test_daily_forecast_imperial() {
        // ---
        let record = create_test_aggregate().to_forecast(date(2024, 7, 2), Tz::America__New_York, UnitSystem::Imperial);

        assert_eq!(record.datetime.to_rfc3339(), "2024-07-02T00:00:00-04:00");
        assert_eq!(record.temperature, Some(71));
        assert_eq!(record.templow, Some(49));
        assert_eq!(record.wind_speed, 9);
        assert_eq!(record.wind_speed_bft, None);

        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("wind_speed_bft").is_none());
    }

    #[test]
    fn test_daily_forecast_sentinels_omit_temperatures() {
        // ---
        let mut aggregate = create_test_aggregate();
        aggregate.temperature_max = -999.0;
        aggregate.temperature_min = 999.0;

        let record = aggregate.to_forecast(date(2024, 1, 2), Tz::UTC, UnitSystem::Metric);
        assert_eq!(record.temperature, None);
        assert_eq!(record.templow, None);

        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("temperature").is_none());
        assert!(json.get("templow").is_none());
    }

    #[test]
    fn test_detailed_record_metric() {
        // ---
        let info = RunInfo {
            date: date(2024, 1, 1),
            pass: 6,
            used_latitude: 52.25,
            used_longitude: 4.5,
        };
        let base = info.base_time(Tz::UTC);
        let record = create_test_sample().to_detailed(base, 27, UnitSystem::Metric);

        assert_eq!(record.datetime.to_rfc3339(), "2024-01-02T09:00:00+00:00");
        assert_eq!(record.windspeed, 5);
        assert_eq!(record.windspeed_bft, Some(3));
        // u=3, v=4: blowing towards the north-east, so from the south-west.
        assert_eq!(record.windangle, 217);
        assert_eq!(record.windrose, "SW");
        assert_eq!(record.gust, 36);
        assert_eq!(record.temperature, 18);
        assert_eq!(record.rain, 2);
        assert_eq!(record.pressure, 1013.3);
        assert_eq!(record.visibility, 24_100);
        assert_eq!(record.cldhigh, 13);
        assert_eq!(record.cldmid, 40);
        assert_eq!(record.cldlow, 0);
        assert_eq!(record.cldtotal, 56);
        assert_eq!(record.tmp500hpa, -21);
        assert_eq!(record.cape, 311);
        assert_eq!(record.liftedindex, -1);
        assert_eq!(record.offset, 27);
    }

    #[test]
    fn test_detailed_record_imperial() {
        // ---
        let info = RunInfo {
            date: date(2024, 1, 1),
            pass: 0,
            used_latitude: 40.75,
            used_longitude: -74.0,
        };
        let base = info.base_time(Tz::America__New_York);
        let record = create_test_sample().to_detailed(base, 3, UnitSystem::Imperial);

        assert_eq!(record.datetime.to_rfc3339(), "2024-01-01T03:00:00-05:00");
        assert_eq!(record.windspeed, 11);
        assert_eq!(record.windspeed_bft, None);
        assert_eq!(record.gust, 22);
        assert_eq!(record.temperature, 65);
        assert_eq!(record.pressure, 29.9);
    }

    #[test]
    fn test_localize_skipped_midnight_keeps_date() {
        // ---
        // Santiago skips from 00:00 to 01:00 when DST starts.
        let naive = date(2024, 9, 8).and_time(NaiveTime::MIN);
        let dt = localize(Tz::America__Santiago, naive).fixed_offset();
        assert_eq!(dt.to_rfc3339(), "2024-09-08T01:00:00-03:00");

        let record = create_test_aggregate().to_forecast(date(2024, 9, 8), Tz::America__Santiago, UnitSystem::Metric);
        assert_eq!(record.datetime.date_naive(), date(2024, 9, 8));
    }

    #[test]
    fn test_localize_ambiguous_takes_earliest() {
        // ---
        // 02:30 happens twice when Amsterdam leaves DST.
        let naive = date(2024, 10, 27).and_hms_opt(2, 30, 0).unwrap();
        let dt = localize(Tz::Europe__Amsterdam, naive).fixed_offset();
        assert_eq!(dt.to_rfc3339(), "2024-10-27T02:30:00+02:00");
    }

    #[test]
    fn test_detailed_record_across_dst_change() {
        // ---
        let info = RunInfo {
            date: date(2024, 3, 30),
            pass: 0,
            used_latitude: 52.25,
            used_longitude: 4.5,
        };
        let base = info.base_time(Tz::Europe__Amsterdam);

        let before = create_test_sample().to_detailed(base, 24, UnitSystem::Metric);
        assert_eq!(before.datetime.to_rfc3339(), "2024-03-31T00:00:00+01:00");

        let after = create_test_sample().to_detailed(base, 48, UnitSystem::Metric);
        assert_eq!(after.datetime.to_rfc3339(), "2024-04-01T01:00:00+02:00");
    }

    #[test]
    fn test_completed_run_without_position_is_rejected() {
        // ---
        let result = serde_json::from_value::<CurrentRun>(json!({"date": "2024-01-01", "pass": 6}));
        assert!(result.is_err());

        let result = serde_json::from_value::<CurrentRun>(json!({
            "date": "2024-01-01", "pass": 6, "used_latitude": 52.25
        }));
        assert!(result.is_err());
    }
}
