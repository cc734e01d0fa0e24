use fuzzy_satisfaction::{
    customer_satisfaction_system, Defuzzification, EngineConfig, EvaluationError,
    SatisfactionModel, Simulation, CUSTOMER_SATISFACTION, FOOD_QUALITY, SERVICE_SPEED,
};
use std::sync::Arc;

fn model() -> SatisfactionModel {
    SatisfactionModel::new().unwrap()
}

fn score(speed: f64, quality: f64) -> f64 {
    model().score(speed, quality).unwrap()
}

#[test]
fn fast_and_excellent_lands_in_high_region() {
    let out = score(10.0, 10.0);
    assert!((8.3..=8.5).contains(&out), "got {out}");
}

#[test]
fn slow_and_bad_lands_in_low_region() {
    let out = score(0.0, 0.0);
    assert!((1.5..=1.7).contains(&out), "got {out}");
}

#[test]
fn normal_and_good_lands_at_medium_center() {
    let out = score(5.0, 5.0);
    assert!((out - 5.0).abs() < 1e-9, "got {out}");
}

#[test]
fn slow_but_excellent_is_medium() {
    let out = score(0.0, 10.0);
    assert!((4.0..=6.0).contains(&out), "got {out}");
}

#[test]
fn speed_improves_score_at_excellent_quality() {
    assert!(score(10.0, 10.0) >= score(0.0, 10.0));
}

#[test]
fn rule_table_is_not_symmetric() {
    // slow + good -> medium, but normal + bad -> low.
    let m = model();
    let slow_good = m.score(0.0, 5.0).unwrap();
    let normal_bad = m.score(5.0, 0.0).unwrap();
    assert!((slow_good - 5.0).abs() < 1e-9, "got {slow_good}");
    assert!((normal_bad - 5.0 / 3.0).abs() < 1e-9, "got {normal_bad}");
}

#[test]
fn fast_but_bad_is_medium() {
    let out = score(10.0, 0.0);
    assert!((out - 5.0).abs() < 1e-9, "got {out}");
}

#[test]
fn every_grid_point_is_bounded() {
    let m = model();
    for s in 0..=20 {
        for q in 0..=20 {
            let (speed, quality) = (f64::from(s) * 0.5, f64::from(q) * 0.5);
            let out = m.score(speed, quality).unwrap();
            assert!(
                (0.0..=10.0).contains(&out),
                "({speed}, {quality}) -> {out}"
            );
        }
    }
}

#[test]
fn compute_is_idempotent() {
    let system = Arc::new(customer_satisfaction_system(1.0, Defuzzification::Centroid).unwrap());
    let mut sim = Simulation::new(system);
    sim.set_input(SERVICE_SPEED, 6.3).unwrap();
    sim.set_input(FOOD_QUALITY, 2.7).unwrap();
    let first = sim.compute().unwrap();
    let second = sim.compute().unwrap();
    assert_eq!(first.to_bits(), second.to_bits());
    assert_eq!(sim.get_output(CUSTOMER_SATISFACTION).unwrap(), second);
}

#[test]
fn upper_boundary_does_not_fail() {
    let m = model();
    assert!(m.score(10.0, 5.0).is_ok());
    assert!(m.score(5.0, 10.0).is_ok());
    assert!(m.score(0.0, 0.0).is_ok());
}

#[test]
fn out_of_universe_inputs_signal_no_rule_fired() {
    let err = model().score(-3.0, 5.0).unwrap_err();
    assert_eq!(
        err,
        EvaluationError::NoRuleFired {
            variable: CUSTOMER_SATISFACTION.to_string()
        }
    );
    assert!(matches!(
        model().score(5.0, 12.0),
        Err(EvaluationError::NoRuleFired { .. })
    ));
}

#[test]
fn finer_step_keeps_reference_centroids() {
    let fine = SatisfactionModel::from_config(&EngineConfig {
        universe_step: 0.1,
        ..EngineConfig::default()
    })
    .unwrap();
    let high = fine.score(10.0, 10.0).unwrap();
    assert!((high - 25.0 / 3.0).abs() < 1e-6, "got {high}");
    let low = fine.score(0.0, 0.0).unwrap();
    assert!((low - 5.0 / 3.0).abs() < 1e-6, "got {low}");
}

#[test]
fn weighted_mean_follows_sample_formula() {
    let m = SatisfactionModel::from_config(&EngineConfig {
        defuzzification: Defuzzification::WeightedMean,
        ..EngineConfig::default()
    })
    .unwrap();
    // high = (5, 10, 10) sampled at 5..=10: sum(x*mu) = 26, sum(mu) = 3.
    let out = m.score(10.0, 10.0).unwrap();
    assert!((out - 26.0 / 3.0).abs() < 1e-9, "got {out}");
}

#[test]
fn partial_activation_is_blended() {
    // speed 3.5: slow 0.3, normal 0.5; quality 3.5: bad 0.3, good 0.5.
    // Only normal+good reaches 0.5 (medium); the low rules stop at 0.3.
    let eval = model()
        .evaluate(fuzzy_satisfaction::SatisfactionInputs {
            service_speed: 3.5,
            food_quality: 3.5,
        })
        .unwrap();
    assert!((eval.term_activation()["low"] - 0.3).abs() < 1e-12);
    assert!((eval.term_activation()["medium"] - 0.5).abs() < 1e-12);
    assert_eq!(eval.term_activation()["high"], 0.0);
    assert!(eval.output() > 2.0 && eval.output() < 5.0);
}
