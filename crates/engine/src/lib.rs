//! Ripening prediction engine.
//!
//! Every call to [`predict`] produces two independent forecasts from the same
//! reading: a kinetic estimate (temperature, humidity and ethylene effects
//! multiplied into a shelf-life figure) and a threshold estimate extrapolated
//! from the recent ethylene slope. Nothing here holds state or performs I/O.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Only the most recent entries of the ethylene history feed the slope.
pub const HISTORY_WINDOW: usize = 10;

pub const MIN_DAYS: u32 = 1;
pub const MAX_DAYS: u32 = 15;
pub const MIN_NEXT_PHASE_DAYS: u32 = 1;
pub const MAX_NEXT_PHASE_DAYS: u32 = 7;

const BASE_SHELF_LIFE_DAYS: f64 = 15.0;
const ACTIVATION_ENERGY: f64 = 45_000.0; // J/mol
const GAS_CONSTANT: f64 = 8.314;
const KELVIN_OFFSET: f64 = 273.15;
const TEMP_OPTIMAL_K: f64 = 293.15;
const HUMIDITY_OPTIMAL: f64 = 60.0;
const HUMIDITY_SPREAD: f64 = 50.0;
const ETHYLENE_SENSITIVITY: f64 = 0.008;
const ETHYLENE_ACCELERATION: f64 = 0.15;
const RATE_MIN: f64 = 0.1;
const RATE_MAX: f64 = 2.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    /// ppm, raw (zero point not yet subtracted)
    pub ethylene: f64,
    /// °C
    pub temperature: f64,
    /// % relative
    pub humidity: f64,
    /// Informational only.
    #[serde(default)]
    pub timestamp_ms: u64,
}

impl SensorReading {
    pub fn new(ethylene: f64, temperature: f64, humidity: f64) -> Self {
        Self {
            ethylene,
            temperature,
            humidity,
            timestamp_ms: 0,
        }
    }
}

/// Ethylene boundaries in ppm plus the sensor's zero-point offset.
///
/// Expected to satisfy `0 < fresh < ripe < overripe`; [`predict`] assumes it
/// does, so check [`ThresholdConfig::validate`] before handing one over.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdConfig {
    pub fresh: f64,
    pub ripe: f64,
    pub overripe: f64,
    #[serde(default)]
    pub zero_point: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            fresh: 50.0,
            ripe: 100.0,
            overripe: 150.0,
            zero_point: 0.0,
        }
    }
}

impl ThresholdConfig {
    /// Reports the first ordering clause the configuration breaks.
    pub fn validate(&self) -> Result<(), ThresholdViolation> {
        // Negated comparisons so NaN fails every clause.
        if !(self.fresh > 0.0) {
            return Err(ThresholdViolation::FreshNotPositive);
        }
        if !(self.fresh < self.ripe) {
            return Err(ThresholdViolation::FreshNotBelowRipe);
        }
        if !(self.ripe < self.overripe) {
            return Err(ThresholdViolation::RipeNotBelowOverripe);
        }
        if !self.zero_point.is_finite() {
            return Err(ThresholdViolation::ZeroPointNotFinite);
        }
        Ok(())
    }

    /// Boundary that ends `phase`. Spoiled has no successor and reuses `overripe`.
    pub fn upper_bound(&self, phase: RipeningPhase) -> f64 {
        match phase {
            RipeningPhase::Fresh => self.fresh,
            RipeningPhase::Ripe => self.ripe,
            RipeningPhase::VeryRipe | RipeningPhase::Spoiled => self.overripe,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ThresholdViolation {
    #[error("fresh threshold must be greater than 0")]
    FreshNotPositive,
    #[error("fresh threshold must be below ripe")]
    FreshNotBelowRipe,
    #[error("ripe threshold must be below overripe")]
    RipeNotBelowOverripe,
    #[error("zero point must be a finite number")]
    ZeroPointNotFinite,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RipeningPhase {
    Fresh,
    Ripe,
    VeryRipe,
    Spoiled,
}

impl RipeningPhase {
    pub fn label(self) -> &'static str {
        match self {
            Self::Fresh => "Fresh",
            Self::Ripe => "Ripe",
            Self::VeryRipe => "Very ripe",
            Self::Spoiled => "Spoiled",
        }
    }

    pub fn recommendation(self) -> &'static str {
        match self {
            Self::Fresh => "Store as usual",
            Self::Ripe => "Best eaten within the next few days",
            Self::VeryRipe => "Eat now or refrigerate to slow ripening",
            Self::Spoiled => "Discard",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RipeningTrend {
    Slow,
    Normal,
    Fast,
    Accelerated,
}

impl RipeningTrend {
    /// Bucket boundaries belong to the faster trend.
    pub fn from_rate(rate: f64) -> Self {
        if rate < 0.8 {
            Self::Slow
        } else if rate < 1.2 {
            Self::Normal
        } else if rate < 1.5 {
            Self::Fast
        } else {
            Self::Accelerated
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct KineticPrediction {
    pub days_left: u32,
    /// 0 once spoiled.
    pub days_to_next_phase: u32,
    pub current_phase: RipeningPhase,
    pub ripening_rate: f64,
    pub ripening_trend: RipeningTrend,
}

impl KineticPrediction {
    /// Result for readings at or below the zero point.
    pub const MAXIMALLY_FRESH: Self = Self {
        days_left: MAX_DAYS,
        days_to_next_phase: MAX_NEXT_PHASE_DAYS,
        current_phase: RipeningPhase::Fresh,
        ripening_rate: 0.0,
        ripening_trend: RipeningTrend::Slow,
    };
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdPrediction {
    pub days_to_next_phase: u32,
    pub days_to_spoilage: u32,
}

impl ThresholdPrediction {
    /// Used when the history shows no upward slope.
    pub const NO_SIGNAL: Self = Self {
        days_to_next_phase: MAX_NEXT_PHASE_DAYS,
        days_to_spoilage: MAX_DAYS,
    };
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub kinetic: KineticPrediction,
    pub threshold: ThresholdPrediction,
}

/// Runs both models against one reading.
///
/// `history` is oldest-first; only its last [`HISTORY_WINDOW`] entries matter.
/// Total over its numeric domain: out-of-range physical inputs still produce
/// clamped day counts rather than errors.
pub fn predict(reading: &SensorReading, history: &[f64], thresholds: &ThresholdConfig) -> Prediction {
    Prediction {
        kinetic: kinetic_prediction(reading, thresholds),
        threshold: threshold_prediction(reading, history, thresholds),
    }
}

/// Strict less-than against each boundary in ascending order.
pub fn determine_phase(ethylene: f64, thresholds: &ThresholdConfig) -> RipeningPhase {
    if ethylene < thresholds.fresh {
        RipeningPhase::Fresh
    } else if ethylene < thresholds.ripe {
        RipeningPhase::Ripe
    } else if ethylene < thresholds.overripe {
        RipeningPhase::VeryRipe
    } else {
        RipeningPhase::Spoiled
    }
}

/// Arrhenius multiplier relative to 20 °C.
pub fn temperature_effect(temperature_c: f64) -> f64 {
    let kelvin = temperature_c + KELVIN_OFFSET;
    (-ACTIVATION_ENERGY * (1.0 / kelvin - 1.0 / TEMP_OPTIMAL_K) / GAS_CONSTANT).exp()
}

/// Logistic in the humidity deviation; 0.5 at the optimum.
pub fn humidity_effect(humidity: f64) -> f64 {
    let deviation = (humidity - HUMIDITY_OPTIMAL) / HUMIDITY_SPREAD;
    1.0 / (1.0 + (deviation * 2.0).exp())
}

pub fn ethylene_effect(adjusted_ethylene: f64) -> f64 {
    (-ETHYLENE_SENSITIVITY * adjusted_ethylene).exp()
}

/// Coarse slope over the last [`HISTORY_WINDOW`] readings: `(last - first) / count`.
/// Sampling is assumed uniform; fewer than two readings give 0.
pub fn ethylene_rate(history: &[f64]) -> f64 {
    let window = &history[history.len().saturating_sub(HISTORY_WINDOW)..];
    match window {
        [first, .., last] => (last - first) / window.len() as f64,
        _ => 0.0,
    }
}

pub fn kinetic_prediction(reading: &SensorReading, thresholds: &ThresholdConfig) -> KineticPrediction {
    let adjusted = reading.ethylene - thresholds.zero_point;
    if adjusted <= 0.0 {
        log::trace!("adjusted ethylene {adjusted} at or below zero point, reporting fresh");
        return KineticPrediction::MAXIMALLY_FRESH;
    }

    let current_phase = determine_phase(adjusted, thresholds);
    let temp_effect = temperature_effect(reading.temperature);
    let eth_effect = ethylene_effect(adjusted);

    let remaining = BASE_SHELF_LIFE_DAYS * temp_effect * humidity_effect(reading.humidity) * eth_effect;
    let ripening_rate = (1.0 / eth_effect).clamp(RATE_MIN, RATE_MAX);

    KineticPrediction {
        days_left: truncate_days(remaining, MIN_DAYS, MAX_DAYS),
        days_to_next_phase: kinetic_days_to_next_phase(current_phase, adjusted, thresholds, temp_effect),
        current_phase,
        ripening_rate,
        ripening_trend: RipeningTrend::from_rate(ripening_rate),
    }
}

fn kinetic_days_to_next_phase(
    phase: RipeningPhase,
    adjusted: f64,
    thresholds: &ThresholdConfig,
    temp_effect: f64,
) -> u32 {
    if phase == RipeningPhase::Spoiled {
        return 0;
    }

    let diff = thresholds.upper_bound(phase) - adjusted;
    if diff <= 0.0 {
        return MIN_NEXT_PHASE_DAYS;
    }

    let days = (diff / (ETHYLENE_ACCELERATION * temp_effect)) * (1.0 + adjusted * 0.01);
    truncate_days(days, MIN_NEXT_PHASE_DAYS, MAX_NEXT_PHASE_DAYS)
}

/// Linear extrapolation of the history slope to the configured boundaries.
///
/// Unlike the kinetic model, negative adjusted ethylene is passed through
/// as-is.
pub fn threshold_prediction(
    reading: &SensorReading,
    history: &[f64],
    thresholds: &ThresholdConfig,
) -> ThresholdPrediction {
    let current = reading.ethylene - thresholds.zero_point;
    let phase = determine_phase(current, thresholds);
    let rate = ethylene_rate(history);

    if !(rate > 0.0) {
        log::trace!("ethylene slope {rate} over {} readings, no forecast signal", history.len());
        return ThresholdPrediction::NO_SIGNAL;
    }

    let to_next = (thresholds.upper_bound(phase) - current) / rate;
    let to_spoilage = (thresholds.overripe - current) / rate;

    ThresholdPrediction {
        days_to_next_phase: truncate_days(to_next, MIN_NEXT_PHASE_DAYS, MAX_NEXT_PHASE_DAYS),
        days_to_spoilage: truncate_days(to_spoilage, MIN_DAYS, MAX_DAYS),
    }
}

/// Truncates toward zero, then clamps. The float-to-int cast saturates and maps
/// NaN to 0, so the result is always within `[min, max]`.
fn truncate_days(days: f64, min: u32, max: u32) -> u32 {
    (days as u32).clamp(min, max)
}
