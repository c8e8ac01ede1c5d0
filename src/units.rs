//! Derived-value helpers for turning raw model quantities into the
//! presentation values published on the sensor.
//!
//! Everything here is pure. Raw inputs are always SI (m/s, Pa, °C, mm);
//! the [`UnitSystem`] decides what the published numbers are expressed in.

use serde::{Deserialize, Serialize};

// ---

/// 1 m/s expressed in mph.
pub const MS_TO_MPH: f64 = 2.236_936;

/// 1 m/s expressed in km/h.
pub const MS_TO_KMH: f64 = 3.6;

/// 1 Pa expressed in inches of mercury.
pub const PA_TO_INHG: f64 = 0.000_295_299_83;

/// 1 mm expressed in inches.
pub const MM_TO_INCH: f64 = 1.0 / 25.4;

/// Upper bounds (exclusive, m/s) of Beaufort forces 0 through 11.
/// Anything at or above the last bound is force 12.
pub const BEAUFORT_LIMITS_MS: [f64; 12] = [
    0.3, 1.6, 3.4, 5.5, 8.0, 10.8, 13.9, 17.2, 20.8, 24.5, 28.5, 32.7,
];

/// 16-point compass labels, clockwise from north.
pub const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// Daily rain (mm) at which a day counts as wet.
pub const RAIN_THRESHOLD_MM: f64 = 1.0;

/// Daily rain (mm) at which a wet day counts as pouring.
pub const POURING_THRESHOLD_MM: f64 = 10.0;

/// Minimum daytime temperature (°C) at or below which precipitation is snow.
pub const SNOW_TEMPERATURE_C: f64 = 0.0;

/// Chance of sun (%) at or above which a dry day is sunny.
pub const SUNNY_MIN_CHANCE: f64 = 70.0;

/// Chance of sun (%) at or above which a dry day is partly cloudy.
pub const PARTLY_CLOUDY_MIN_CHANCE: f64 = 30.0;

// ---

/// Measurement system selected for the published document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

/// Unit labels written next to the forecast values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitLabels {
    pub pressure: &'static str,
    pub wind_speed: &'static str,
    pub precipitation: &'static str,
    pub temperature: &'static str,
}

impl UnitSystem {
    /// Parse the add-on setting. Only the exact value `Metric` selects
    /// metric output; anything else is imperial.
    pub fn from_setting(value: &str) -> Self {
        // ---
        if value == "Metric" {
            Self::Metric
        } else {
            Self::Imperial
        }
    }

    pub fn is_metric(self) -> bool {
        self == Self::Metric
    }

    pub fn labels(self) -> UnitLabels {
        // ---
        match self {
            Self::Metric => UnitLabels {
                pressure: "hPa",
                wind_speed: "m/s",
                precipitation: "mm",
                temperature: "°C",
            },
            Self::Imperial => UnitLabels {
                pressure: "inHg",
                wind_speed: "mph",
                precipitation: "inch",
                temperature: "°F",
            },
        }
    }

    /// Wind speed in the published unit, unrounded.
    pub fn wind_speed(self, speed_ms: f64) -> f64 {
        match self {
            Self::Metric => speed_ms,
            Self::Imperial => speed_ms * MS_TO_MPH,
        }
    }

    /// Gust speed, rounded. Metric gusts are published in km/h.
    pub fn gust(self, speed_ms: f64) -> i64 {
        match self {
            Self::Metric => round_half(speed_ms * MS_TO_KMH),
            Self::Imperial => round_half(speed_ms * MS_TO_MPH),
        }
    }

    pub fn temperature(self, celsius: f64) -> f64 {
        match self {
            Self::Metric => celsius,
            Self::Imperial => celsius * 9.0 / 5.0 + 32.0,
        }
    }

    pub fn precipitation(self, mm: f64) -> f64 {
        match self {
            Self::Metric => mm,
            Self::Imperial => mm * MM_TO_INCH,
        }
    }

    /// Pressure from Pa, rounded to one decimal.
    pub fn pressure(self, pa: f64) -> f64 {
        // ---
        let value = match self {
            Self::Metric => pa / 100.0,
            Self::Imperial => pa * PA_TO_INHG,
        };
        (value * 10.0).round() / 10.0
    }
}

// ---

/// Speed and meteorological bearing derived from a wind vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wind {
    /// Speed in the configured unit system, unrounded.
    pub speed: f64,
    /// Raw speed in m/s, kept for the Beaufort classification.
    pub speed_ms: f64,
    /// Direction the wind blows from, degrees clockwise from north in `[0, 360)`.
    pub bearing: f64,
}

/// Derive speed and bearing from the `v` (northward) and `u` (eastward)
/// wind components, both in m/s.
pub fn wind_from_components(v: f64, u: f64, units: UnitSystem) -> Wind {
    // ---
    let speed_ms = u.hypot(v);
    let bearing = if speed_ms == 0.0 {
        0.0
    } else {
        (-u).atan2(-v).to_degrees().rem_euclid(360.0)
    };

    Wind {
        speed: units.wind_speed(speed_ms),
        speed_ms,
        bearing,
    }
}

/// Beaufort force for a speed in m/s.
pub fn beaufort(speed_ms: f64) -> u8 {
    // ---
    BEAUFORT_LIMITS_MS
        .iter()
        .position(|limit| speed_ms < *limit)
        .unwrap_or(BEAUFORT_LIMITS_MS.len()) as u8
}

/// 16-point compass label for a bearing. Each sector spans 22.5° centred on
/// its point, so north covers `[348.75, 11.25)`.
pub fn wind_rose(bearing: f64) -> &'static str {
    // ---
    let sector = ((bearing.rem_euclid(360.0) + 11.25) / 22.5).floor() as usize;
    COMPASS_POINTS[sector % COMPASS_POINTS.len()]
}

/// Bearing rounded to whole degrees, folding 360 back to 0.
pub fn round_bearing(bearing: f64) -> i64 {
    round_half(bearing.rem_euclid(360.0)) % 360
}

/// Round half away from zero to the nearest integer.
pub fn round_half(value: f64) -> i64 {
    value.round() as i64
}

// ---

/// Day-level weather condition, using the hub's weather vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    Sunny,
    #[serde(rename = "partlycloudy")]
    PartlyCloudy,
    Cloudy,
    Rainy,
    Pouring,
    Snowy,
}

/// Classify a day from its chance of sun (%), rain total (mm) and the
/// lowest daytime temperature (°C).
pub fn classify_condition(chance_of_sun: f64, rain_mm: f64, min_daytime_temp_c: f64) -> Condition {
    // ---
    if rain_mm >= RAIN_THRESHOLD_MM {
        if min_daytime_temp_c <= SNOW_TEMPERATURE_C {
            Condition::Snowy
        } else if rain_mm >= POURING_THRESHOLD_MM {
            Condition::Pouring
        } else {
            Condition::Rainy
        }
    } else if chance_of_sun >= SUNNY_MIN_CHANCE {
        Condition::Sunny
    } else if chance_of_sun >= PARTLY_CLOUDY_MIN_CHANCE {
        Condition::PartlyCloudy
    } else {
        Condition::Cloudy
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-6,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_wind_direction_from_components() {
        // ---
        // Wind blowing towards the south comes from the north.
        let north = wind_from_components(-5.0, 0.0, UnitSystem::Metric);
        assert_close(north.bearing, 0.0);
        assert_close(north.speed, 5.0);

        // Blowing towards the west: from the east.
        let east = wind_from_components(0.0, -3.0, UnitSystem::Metric);
        assert_close(east.bearing, 90.0);

        let south = wind_from_components(4.0, 0.0, UnitSystem::Metric);
        assert_close(south.bearing, 180.0);

        let west = wind_from_components(0.0, 2.0, UnitSystem::Metric);
        assert_close(west.bearing, 270.0);

        let calm = wind_from_components(0.0, 0.0, UnitSystem::Metric);
        assert_close(calm.bearing, 0.0);
        assert_close(calm.speed, 0.0);
    }

    #[test]
    fn test_wind_speed_units() {
        // ---
        let metric = wind_from_components(3.0, 4.0, UnitSystem::Metric);
        assert_close(metric.speed, 5.0);
        assert_close(metric.speed_ms, 5.0);

        let imperial = wind_from_components(3.0, 4.0, UnitSystem::Imperial);
        assert_close(imperial.speed, 5.0 * MS_TO_MPH);
        assert_close(imperial.speed_ms, 5.0);
    }

    #[test]
    fn test_beaufort_breakpoints() {
        // ---
        assert_eq!(beaufort(0.0), 0);
        assert_eq!(beaufort(0.29), 0);
        assert_eq!(beaufort(0.3), 1);
        assert_eq!(beaufort(3.3), 2);
        assert_eq!(beaufort(5.5), 4);
        assert_eq!(beaufort(10.0), 5);
        assert_eq!(beaufort(32.6), 11);
        assert_eq!(beaufort(32.7), 12);
        assert_eq!(beaufort(60.0), 12);
    }

    #[test]
    fn test_wind_rose_sectors() {
        // ---
        assert_eq!(wind_rose(0.0), "N");
        assert_eq!(wind_rose(348.75), "N");
        assert_eq!(wind_rose(359.9), "N");
        assert_eq!(wind_rose(11.24), "N");
        assert_eq!(wind_rose(11.25), "NNE");
        assert_eq!(wind_rose(33.74), "NNE");
        assert_eq!(wind_rose(33.75), "NE");
        assert_eq!(wind_rose(90.0), "E");
        assert_eq!(wind_rose(180.0), "S");
        assert_eq!(wind_rose(270.0), "W");
        assert_eq!(wind_rose(348.74), "NNW");
        assert_eq!(wind_rose(360.0), "N");
        assert_eq!(wind_rose(-22.5), "NNW");
    }

    #[test]
    fn test_wind_rose_covers_every_sector_once() {
        // ---
        for (i, label) in COMPASS_POINTS.iter().enumerate() {
            let centre = i as f64 * 22.5;
            assert_eq!(wind_rose(centre), *label);
            assert_eq!(wind_rose(centre + 11.2), *label);
            assert_eq!(wind_rose(centre - 11.25), *label);
        }
    }

    #[test]
    fn test_round_bearing_wraps() {
        // ---
        assert_eq!(round_bearing(359.6), 0);
        assert_eq!(round_bearing(359.4), 359);
        assert_eq!(round_bearing(44.5), 45);
    }

    #[test]
    fn test_pressure_conversion() {
        // ---
        assert_close(UnitSystem::Metric.pressure(101_325.0), 1013.3);
        assert_close(UnitSystem::Metric.pressure(99_960.0), 999.6);
        assert_close(UnitSystem::Imperial.pressure(101_325.0), 29.9);
    }

    #[test]
    fn test_gust_conversion() {
        // ---
        assert_eq!(UnitSystem::Metric.gust(10.0), 36);
        assert_eq!(UnitSystem::Metric.gust(2.5), 9);
        assert_eq!(UnitSystem::Imperial.gust(10.0), 22);
    }

    #[test]
    fn test_temperature_and_precipitation_conversion() {
        // ---
        assert_close(UnitSystem::Metric.temperature(21.5), 21.5);
        assert_close(UnitSystem::Imperial.temperature(100.0), 212.0);
        assert_close(UnitSystem::Imperial.temperature(-40.0), -40.0);
        assert_close(UnitSystem::Imperial.precipitation(25.4), 1.0);
        assert_close(UnitSystem::Metric.precipitation(3.2), 3.2);
    }

    #[test]
    fn test_unit_labels() {
        // ---
        let metric = UnitSystem::Metric.labels();
        assert_eq!(metric.pressure, "hPa");
        assert_eq!(metric.wind_speed, "m/s");
        assert_eq!(metric.precipitation, "mm");
        assert_eq!(metric.temperature, "°C");

        let imperial = UnitSystem::Imperial.labels();
        assert_eq!(imperial.pressure, "inHg");
        assert_eq!(imperial.wind_speed, "mph");
        assert_eq!(imperial.precipitation, "inch");
        assert_eq!(imperial.temperature, "°F");
    }

    #[test]
    fn test_unit_system_setting() {
        // ---
        assert_eq!(UnitSystem::from_setting("Metric"), UnitSystem::Metric);
        assert_eq!(UnitSystem::from_setting("metric"), UnitSystem::Imperial);
        assert_eq!(UnitSystem::from_setting("US"), UnitSystem::Imperial);
    }

    #[test]
    fn test_condition_classification() {
        // ---
        assert_eq!(classify_condition(90.0, 0.0, 15.0), Condition::Sunny);
        assert_eq!(classify_condition(SUNNY_MIN_CHANCE, 0.0, 15.0), Condition::Sunny);
        assert_eq!(classify_condition(50.0, 0.5, 15.0), Condition::PartlyCloudy);
        assert_eq!(classify_condition(10.0, 0.0, 15.0), Condition::Cloudy);
        assert_eq!(classify_condition(10.0, RAIN_THRESHOLD_MM, 15.0), Condition::Rainy);
        assert_eq!(classify_condition(80.0, 25.0, 15.0), Condition::Pouring);
        assert_eq!(classify_condition(0.0, 4.0, SNOW_TEMPERATURE_C), Condition::Snowy);
        assert_eq!(classify_condition(0.0, 30.0, -5.0), Condition::Snowy);
    }

    #[test]
    fn test_condition_serializes_as_hub_vocabulary() {
        // ---
        let json = serde_json::to_string(&Condition::PartlyCloudy).unwrap();
        assert_eq!(json, "\"partlycloudy\"");
        let json = serde_json::to_string(&Condition::Pouring).unwrap();
        assert_eq!(json, "\"pouring\"");
    }
}
