use freshguard as fg;

fn run_until_spoiled(food: fg::FoodType, ambient_c: f64, max_days: f64) -> Option<f64> {
    let dt_days = 0.25;
    let steps = (max_days / dt_days) as u64;

    let thresholds = fg::ThresholdConfig::default();
    let params = fg::ProduceParams::for_food(food, ambient_c);
    let mut sensor = fg::Sensor::new(11);
    sensor.noise_std = 0.2;
    let mut feed = fg::Feed::new(params, sensor, fg::RollingHistory::default());

    let mut last_phase = fg::RipeningPhase::Fresh;
    for k in 0..steps {
        let Some(reading) = feed.next_reading(dt_days) else {
            continue;
        };
        let p = fg::predict(&reading, feed.history(), &thresholds);

        assert!(p.kinetic.current_phase >= last_phase, "phase went backwards at step {k}");
        last_phase = p.kinetic.current_phase;

        assert!((1..=15).contains(&p.kinetic.days_left));
        assert!((1..=7).contains(&p.threshold.days_to_next_phase));
        assert!((1..=15).contains(&p.threshold.days_to_spoilage));

        if last_phase == fg::RipeningPhase::Spoiled {
            assert_eq!(p.kinetic.days_to_next_phase, 0);
            return Some(k as f64 * dt_days);
        }
    }
    None
}

#[test]
fn warm_banana_spoils_before_cold_banana() {
    let warm = run_until_spoiled(fg::FoodType::Banana, 25.0, 20.0).expect("warm banana should spoil");
    let cold = run_until_spoiled(fg::FoodType::Banana, 13.0, 20.0).expect("cold banana should spoil");

    assert!(warm < cold, "warm {warm} vs cold {cold}");
    assert!(warm < 5.0);
}

#[test]
fn rising_history_produces_a_forecast() {
    let thresholds = fg::ThresholdConfig::default();
    let mut feed = fg::Feed::new(
        fg::ProduceParams::for_food(fg::FoodType::Avocado, 22.0),
        fg::Sensor::new(5),
        fg::RollingHistory::default(),
    );

    let mut last = None;
    for _ in 0..8 {
        if let Some(reading) = feed.next_reading(0.25) {
            last = Some(fg::predict(&reading, feed.history(), &thresholds));
        }
    }

    let p = last.expect("at least one valid reading");
    assert!(fg::ethylene_rate(feed.history()) > 0.0);
    assert_ne!(p.threshold, fg::ThresholdPrediction::NO_SIGNAL);
}

#[test]
fn zero_point_cancels_sensor_bias() {
    let biased_thresholds = fg::ThresholdConfig {
        zero_point: 25.0,
        ..Default::default()
    };

    let mut clean = fg::Sensor::new(9);
    clean.noise_std = 0.0;
    let mut biased = clean.clone();
    biased.fault = fg::SensorFault::Bias { value: 25.0 };

    let params = fg::ProduceParams::for_food(fg::FoodType::Tomato, 18.0);
    let mut a = fg::Feed::new(params, clean, fg::RollingHistory::default());
    let mut b = fg::Feed::new(params, biased, fg::RollingHistory::default());

    for _ in 0..12 {
        let (Some(ra), Some(rb)) = (a.next_reading(0.5), b.next_reading(0.5)) else {
            panic!("noise-free sensors never drop samples");
        };
        let pa = fg::predict(&ra, a.history(), &fg::ThresholdConfig::default());
        let pb = fg::predict(&rb, b.history(), &biased_thresholds);

        assert_eq!(pa.kinetic.current_phase, pb.kinetic.current_phase);
        assert_eq!(pa.kinetic.days_left, pb.kinetic.days_left);
    }
}

#[test]
fn edited_thresholds_feed_the_engine() {
    let dir = tempfile::TempDir::new().unwrap();
    let mut store = fg::ThresholdStore::load(dir.path().join("thresholds.json")).unwrap();

    let reading = fg::SensorReading::new(60.0, 20.0, 60.0);
    let before = fg::predict(&reading, &[], &store.config());
    assert_eq!(before.kinetic.current_phase, fg::RipeningPhase::Ripe);

    store.set_fresh(80.0).unwrap();
    let after = fg::predict(&reading, &[], &store.config());
    assert_eq!(after.kinetic.current_phase, fg::RipeningPhase::Fresh);

    // A rejected edit keeps the previous snapshot in force.
    assert!(store.set_ripe(70.0).is_err());
    assert_eq!(fg::predict(&reading, &[], &store.config()), after);
}
