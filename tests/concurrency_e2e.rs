use std::sync::Arc;
use std::thread;

use fuzzy_satisfaction::{
    BatchEvaluator, EngineConfig, InputValues, SatisfactionModel, SharedSimulation, Simulation,
    CUSTOMER_SATISFACTION, FOOD_QUALITY, SERVICE_SPEED,
};

fn inputs(speed: f64, quality: f64) -> InputValues {
    [(SERVICE_SPEED.to_string(), speed), (FOOD_QUALITY.to_string(), quality)]
        .into_iter()
        .collect()
}

#[test]
fn independent_simulations_do_not_interfere() {
    let model = SatisfactionModel::new().unwrap();
    let expected_low = model.score(0.0, 0.0).unwrap();
    let expected_high = model.score(10.0, 10.0).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let system = Arc::clone(model.system());
            thread::spawn(move || {
                let (speed, quality) = if i % 2 == 0 { (0.0, 0.0) } else { (10.0, 10.0) };
                let mut sim = Simulation::new(system);
                let mut outputs = Vec::new();
                for _ in 0..200 {
                    sim.set_input(SERVICE_SPEED, speed).unwrap();
                    sim.set_input(FOOD_QUALITY, quality).unwrap();
                    sim.compute().unwrap();
                    outputs.push(sim.get_output(CUSTOMER_SATISFACTION).unwrap());
                }
                (i, outputs)
            })
        })
        .collect();

    for handle in handles {
        let (i, outputs) = handle.join().unwrap();
        let expected = if i % 2 == 0 { expected_low } else { expected_high };
        assert!(outputs.iter().all(|&o| o == expected), "thread {i} saw a foreign result");
    }
}

#[test]
fn shared_simulation_serializes_callers() {
    let model = SatisfactionModel::new().unwrap();
    let expected_low = model.score(0.0, 0.0).unwrap();
    let expected_high = model.score(10.0, 10.0).unwrap();
    let shared = Arc::new(SharedSimulation::new(Arc::clone(model.system())));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let shared = Arc::clone(&shared);
            thread::spawn(move || {
                let (speed, quality, expected) = if i % 2 == 0 {
                    (0.0, 0.0, expected_low)
                } else {
                    (10.0, 10.0, expected_high)
                };
                for _ in 0..200 {
                    let out = shared
                        .run([(SERVICE_SPEED, speed), (FOOD_QUALITY, quality)])
                        .unwrap();
                    assert_eq!(out, expected);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn batch_matches_sequential_scores() {
    let model = SatisfactionModel::new().unwrap();
    let config = EngineConfig {
        workers: 4,
        queue_capacity: 8,
        ..EngineConfig::default()
    };
    let pool = BatchEvaluator::from_config(Arc::clone(model.system()), &config).unwrap();
    assert_eq!(pool.workers(), 4);

    let grid: Vec<(f64, f64)> = (0..=10)
        .flat_map(|s| (0..=10).map(move |q| (f64::from(s), f64::from(q))))
        .collect();
    let results = pool
        .evaluate_all(grid.iter().map(|&(s, q)| inputs(s, q)))
        .unwrap();

    assert_eq!(results.len(), grid.len());
    for (&(s, q), result) in grid.iter().zip(results) {
        assert_eq!(result.unwrap(), model.score(s, q).unwrap(), "({s}, {q})");
    }
}
