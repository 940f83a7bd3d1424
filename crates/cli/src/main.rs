use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use engine::{Prediction, RipeningPhase, SensorReading, ThresholdConfig};
use sim::{Feed, FoodType, ProduceParams, RollingHistory, Sensor, SensorFault};
use thresholds::ThresholdStore;

#[derive(Clone, Debug, ValueEnum)]
enum Food {
    Banana,
    Apple,
    Avocado,
    Tomato,
    Generic,
}

impl From<Food> for FoodType {
    fn from(food: Food) -> Self {
        match food {
            Food::Banana => FoodType::Banana,
            Food::Apple => FoodType::Apple,
            Food::Avocado => FoodType::Avocado,
            Food::Tomato => FoodType::Tomato,
            Food::Generic => FoodType::Generic,
        }
    }
}

#[derive(Clone, Debug, ValueEnum)]
enum Fault {
    None,
    Stuck,
    Bias,
    Drift,
    Dropout,
}

#[derive(Parser, Debug)]
#[command(
    name = "freshguard",
    version,
    about = "Shelf-life estimates for perishable food from ethylene readings"
)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Predict from a single reading
    Predict {
        /// Ethylene concentration (ppm)
        #[arg(long, allow_negative_numbers = true)]
        ethylene: f64,

        /// Temperature (°C)
        #[arg(long, default_value_t = 20.0, allow_negative_numbers = true)]
        temperature: f64,

        /// Relative humidity (%)
        #[arg(long, default_value_t = 60.0, allow_negative_numbers = true)]
        humidity: f64,

        /// Recent ethylene readings, oldest first
        #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
        history: Vec<f64>,

        /// Threshold file; defaults apply when omitted
        #[arg(long)]
        thresholds: Option<PathBuf>,
    },

    /// Show or edit the persisted thresholds
    Thresholds {
        #[arg(long, default_value = "thresholds.json")]
        file: PathBuf,

        #[command(subcommand)]
        action: ThresholdAction,
    },

    /// Stream a simulated ripening run as JSON lines
    Simulate(SimulateOpts),
}

#[derive(clap::Args, Debug)]
struct SimulateOpts {
    #[arg(value_enum, long, default_value = "generic")]
    food: Food,

    /// Simulated duration in days
    #[arg(long, default_value_t = 10.0)]
    days: f64,

    /// Time between sensor samples in hours
    #[arg(long, default_value_t = 6.0)]
    step_hours: f64,

    /// Storage temperature (°C)
    #[arg(long, default_value_t = 20.0, allow_negative_numbers = true)]
    temperature: f64,

    /// Storage humidity (%); the food's optimum when omitted
    #[arg(long, allow_negative_numbers = true)]
    humidity: Option<f64>,

    #[arg(value_enum, long, default_value = "none")]
    fault: Fault,

    /// Sensor output with no ethylene present (ppm)
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    baseline: f64,

    /// Samples discarded while the sensor warms up
    #[arg(long, default_value_t = 0)]
    warmup_samples: u64,

    /// RNG seed for deterministic runs
    #[arg(long, default_value_t = 12345)]
    seed: u64,

    #[arg(long)]
    thresholds: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum ThresholdAction {
    Show,
    /// Overlay the given fields and save; the result must stay ordered
    Set {
        #[arg(long)]
        fresh: Option<f64>,
        #[arg(long)]
        ripe: Option<f64>,
        #[arg(long)]
        overripe: Option<f64>,
        #[arg(long, allow_negative_numbers = true)]
        zero_point: Option<f64>,
    },
}

#[derive(serde::Serialize)]
struct PredictOutput {
    reading: SensorReading,
    status: &'static str,
    recommendation: &'static str,
    prediction: Prediction,
}

#[derive(serde::Serialize)]
struct TraceRow {
    food: FoodType,
    t_days: f64,
    true_ethylene_ppm: f64,
    reading: Option<SensorReading>,
    /// History mean minus the zero point, floored at 0
    average_ethylene_ppm: Option<f64>,
    prediction: Option<Prediction>,
}

fn main() -> Result<()> {
    // RUST_LOG overrides the default; stderr keeps stdout clean JSON
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();

    match Args::parse().command {
        Command::Predict {
            ethylene,
            temperature,
            humidity,
            history,
            thresholds,
        } => {
            let config = load_thresholds(thresholds)?;
            let reading = SensorReading::new(ethylene, temperature, humidity);
            let prediction = engine::predict(&reading, &history, &config);
            let phase = prediction.kinetic.current_phase;

            let out = PredictOutput {
                reading,
                status: phase.label(),
                recommendation: phase.recommendation(),
                prediction,
            };
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Command::Thresholds { file, action } => {
            let mut store = ThresholdStore::load(&file)?;
            if let ThresholdAction::Set {
                fresh,
                ripe,
                overripe,
                zero_point,
            } = action
            {
                let current = store.config();
                let candidate = ThresholdConfig {
                    fresh: fresh.unwrap_or(current.fresh),
                    ripe: ripe.unwrap_or(current.ripe),
                    overripe: overripe.unwrap_or(current.overripe),
                    zero_point: zero_point.unwrap_or(current.zero_point),
                };
                store
                    .replace(candidate)
                    .with_context(|| format!("thresholds in {} left unchanged", file.display()))?;
            }
            println!("{}", serde_json::to_string_pretty(&store.config())?);
        }
        Command::Simulate(opts) => {
            let config = load_thresholds(opts.thresholds.clone())?;
            simulate(&opts, &config)?;
        }
    }

    Ok(())
}

/// Validates before anything reaches the engine, which assumes ordered thresholds.
fn load_thresholds(path: Option<PathBuf>) -> Result<ThresholdConfig> {
    let config = match path {
        Some(path) => ThresholdStore::load(path)?.config(),
        None => ThresholdConfig::default(),
    };
    config
        .validate()
        .context("thresholds must satisfy 0 < fresh < ripe < overripe")?;
    Ok(config)
}

fn simulate(opts: &SimulateOpts, config: &ThresholdConfig) -> Result<()> {
    anyhow::ensure!(opts.step_hours > 0.0, "--step-hours must be positive");

    let food = FoodType::from(opts.food.clone());
    let dt_days = opts.step_hours / 24.0;
    let steps = (opts.days / dt_days).ceil() as u64;

    let mut params = ProduceParams::for_food(food, opts.temperature);
    if let Some(humidity) = opts.humidity {
        params.humidity = humidity;
    }

    let mut sensor = Sensor::new(opts.seed);
    sensor.baseline_ppm = opts.baseline;
    sensor.warmup_samples = opts.warmup_samples;
    apply_fault(&opts.fault, &mut sensor);

    let mut feed = Feed::new(params, sensor, RollingHistory::default());

    // One JSON object per line on stdout
    for k in 0..steps {
        let t_days = (k as f64) * dt_days;
        let true_ethylene_ppm = feed.state.ethylene_ppm;

        let reading = feed.next_reading(dt_days);
        let prediction = reading.map(|r| engine::predict(&r, feed.history(), config));

        let row = TraceRow {
            food,
            t_days,
            true_ethylene_ppm,
            reading,
            average_ethylene_ppm: feed.average_ethylene(config.zero_point),
            prediction,
        };
        println!("{}", serde_json::to_string(&row)?);

        if prediction.is_some_and(|p| p.kinetic.current_phase == RipeningPhase::Spoiled) {
            log::info!("{} spoiled after {t_days:.2} days", food.profile().name);
            break;
        }
    }

    Ok(())
}

fn apply_fault(fault: &Fault, sensor: &mut Sensor) {
    sensor.fault = match fault {
        Fault::None => SensorFault::None,
        Fault::Stuck => SensorFault::Stuck { value: 40.0 },
        Fault::Bias => SensorFault::Bias { value: 25.0 },
        Fault::Drift => SensorFault::Drift { per_day: 5.0 },
        Fault::Dropout => SensorFault::DropoutEvery { n: 5 },
    };
}
