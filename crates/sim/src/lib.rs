//! Synthetic ethylene feed for exercising the ripening engine without hardware.

use engine::SensorReading;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

mod food;
mod history;

pub use food::{FoodProfile, FoodType};
pub use history::RollingHistory;

const MS_PER_DAY: f64 = 86_400_000.0;

#[derive(Clone, Copy, Debug)]
pub struct ProduceParams {
    pub profile: FoodProfile,
    pub ambient_c: f64,
    pub humidity: f64,
    /// ppm/day emitted by generic produce at its optimal temperature with no ethylene present
    pub emission_scale: f64,
}

impl Default for ProduceParams {
    fn default() -> Self {
        Self::for_food(FoodType::Generic, 20.0)
    }
}

impl ProduceParams {
    /// Storage humidity starts at the profile's optimum.
    pub fn for_food(food: FoodType, ambient_c: f64) -> Self {
        let profile = food.profile();
        Self {
            profile,
            ambient_c,
            humidity: profile.optimal_humidity,
            emission_scale: 10.0,
        }
    }

    /// ppm/day at the given concentration.
    pub fn emission_rate(&self, ethylene_ppm: f64) -> f64 {
        let p = &self.profile;
        let temp_factor = (p.temperature_sensitivity * (self.ambient_c - p.optimal_temp_c)).exp();
        let autocatalysis = 1.0 + p.ethylene_sensitivity * ethylene_ppm.max(0.0);
        p.base_ripening_rate * self.emission_scale * temp_factor * autocatalysis
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ProduceState {
    pub ethylene_ppm: f64,
    pub age_days: f64,
}

impl Default for ProduceState {
    fn default() -> Self {
        Self {
            ethylene_ppm: 5.0,
            age_days: 0.0,
        }
    }
}

impl ProduceState {
    /// Euler step of the emission model: dC/dt = emission_rate(C).
    pub fn step(&mut self, p: &ProduceParams, dt_days: f64) {
        self.ethylene_ppm += p.emission_rate(self.ethylene_ppm) * dt_days;
        self.age_days += dt_days;

        if self.ethylene_ppm.is_nan() {
            self.ethylene_ppm = 0.0;
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub enum SensorFault {
    None,
    Stuck { value: f64 },
    Bias { value: f64 },
    /// Baseline creeps upward over time.
    Drift { per_day: f64 },
    DropoutEvery { n: u64 },
}

/// Heated ethylene sensor: a resting baseline on top of the true
/// concentration, gaussian noise, a warm-up period and a full-scale ceiling.
#[derive(Clone, Debug)]
pub struct Sensor {
    pub noise_std: f64,
    pub fault: SensorFault,
    /// Output with no ethylene present; the threshold zero point calibrates it out.
    pub baseline_ppm: f64,
    /// Readings saturate here.
    pub full_scale_ppm: f64,
    /// Samples discarded while the sensing element heats up.
    pub warmup_samples: u64,
    rng: StdRng,
    samples: u64,
    elapsed_days: f64,
}

impl Sensor {
    pub fn new(seed: u64) -> Self {
        Self {
            noise_std: 0.5,
            fault: SensorFault::None,
            baseline_ppm: 0.0,
            full_scale_ppm: 1000.0,
            warmup_samples: 0,
            rng: StdRng::seed_from_u64(seed),
            samples: 0,
            elapsed_days: 0.0,
        }
    }

    pub fn is_warmed_up(&self) -> bool {
        self.samples > self.warmup_samples
    }

    pub fn read_ethylene(&mut self, true_ppm: f64, dt_days: f64) -> f64 {
        self.samples += 1;
        self.elapsed_days += dt_days;

        let baseline = match self.fault {
            SensorFault::Drift { per_day } => self.baseline_ppm + per_day * self.elapsed_days,
            _ => self.baseline_ppm,
        };

        let mut v = match self.fault {
            SensorFault::Stuck { value } => return value,
            SensorFault::Bias { value } => true_ppm + baseline + value,
            SensorFault::DropoutEvery { n } if n > 0 && self.samples % n == 0 => {
                log::debug!("sensor dropout at sample {}", self.samples);
                return f64::NAN;
            }
            _ => true_ppm + baseline,
        };

        if self.noise_std > 0.0 {
            if let Ok(normal) = Normal::new(0.0, self.noise_std) {
                v += normal.sample(&mut self.rng);
            }
        }

        v.min(self.full_scale_ppm)
    }

    /// Finite and past warm-up. Saturated readings still count.
    pub fn is_valid(&self, value: f64) -> bool {
        value.is_finite() && self.is_warmed_up()
    }
}

/// Produce, sensor and rolling history wired together, standing in for the
/// live sensor subscription.
#[derive(Clone, Debug)]
pub struct Feed {
    pub params: ProduceParams,
    pub state: ProduceState,
    pub sensor: Sensor,
    history: RollingHistory,
}

impl Feed {
    pub fn new(params: ProduceParams, sensor: Sensor, history: RollingHistory) -> Self {
        Self {
            params,
            state: ProduceState::default(),
            sensor,
            history,
        }
    }

    /// Samples the sensor, records the sample and advances the produce by
    /// `dt_days`. Returns `None` when the sample is invalid; the produce still
    /// ages in that case.
    pub fn next_reading(&mut self, dt_days: f64) -> Option<SensorReading> {
        let ppm = self.sensor.read_ethylene(self.state.ethylene_ppm, dt_days);
        let reading = if self.sensor.is_valid(ppm) {
            self.history.push(ppm);
            Some(SensorReading {
                ethylene: ppm,
                temperature: self.params.ambient_c,
                humidity: self.params.humidity,
                timestamp_ms: (self.state.age_days * MS_PER_DAY) as u64,
            })
        } else {
            log::debug!("discarding invalid ethylene sample {ppm}");
            None
        };

        self.state.step(&self.params, dt_days);
        reading
    }

    pub fn history(&mut self) -> &[f64] {
        self.history.as_slice()
    }

    /// Mean of the recorded history relative to `zero_point`, floored at 0.
    pub fn average_ethylene(&self, zero_point: f64) -> Option<f64> {
        self.history.average().map(|avg| (avg - zero_point).max(0.0))
    }
}
