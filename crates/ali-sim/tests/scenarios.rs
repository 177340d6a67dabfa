//! Integration tests: scenario and incident behaviour of the engine.
//!
//! All runs use `ZeroNoise` so environmental jitter is off and manual
//! top-offs land exactly on target.

use ali_sim::{
    ChamberConstants, ControllerGains, FailureCause, HISTORY_CAPACITY, Incident, NextAdjustment,
    Scenario, Series, SimulationEngine, ZeroNoise,
};

fn quiet_engine() -> SimulationEngine {
    SimulationEngine::with_defaults()
        .expect("default engine")
        .with_noise(ZeroNoise)
}

#[test]
fn temperature_spike_climbs_to_cap_and_holds() {
    let mut engine = quiet_engine();
    engine.trigger_incident(Some(Incident::TemperatureSpike));

    let mut temps = vec![engine.state().environment.temperature];
    for _ in 0..30 {
        engine.step(0.05);
        temps.push(engine.state().environment.temperature);
    }

    assert!(temps.windows(2).all(|w| w[1] >= w[0]));
    assert_eq!(temps[10], 42.0);
    assert!(temps[10..].iter().all(|&t| t == 42.0));
    // 42 °C is survivable
    assert!(engine.state().culture_alive);
}

#[test]
fn heater_failure_kills_controlled_culture() {
    let mut engine = quiet_engine();
    engine.set_scenario(Scenario::Temperature);

    while engine.state().time < 3.9 {
        engine.step(0.1);
        assert!(engine.state().culture_alive);
        assert_eq!(engine.state().environment.temperature, 37.0);
    }
    while engine.state().time < 6.0 {
        engine.step(0.1);
    }

    let state = engine.state();
    assert!((25.0..=27.0).contains(&state.environment.temperature));
    assert!(!state.culture_alive);
    assert!(matches!(
        state.failure_cause,
        Some(FailureCause::Temperature { .. })
    ));
    // The pump stops with the culture it feeds
    assert_eq!(state.pump_flow, 0.0);
    assert!(!state.pump_active);
}

#[test]
fn contamination_acidifies_until_lethal() {
    let mut engine = quiet_engine();
    engine.set_scenario(Scenario::Contamination);

    for _ in 0..200 {
        engine.step(0.1);
    }
    // Onset at 2 h, 0.02 pH/h
    let ph = engine.state().environment.ph;
    assert!((ph - (7.35 - 0.02 * 18.0)).abs() < 0.01, "ph = {ph}");
    assert!(engine.state().culture_alive);

    while engine.state().culture_alive && engine.state().time < 100.0 {
        engine.step(0.1);
    }
    let state = engine.state();
    assert!(!state.culture_alive);
    assert!(matches!(state.failure_cause, Some(FailureCause::Ph { .. })));
    assert!(state.environment.ph < 6.5);
}

#[test]
fn pump_compensates_accelerated_evaporation() {
    let mut engine = quiet_engine();
    engine.set_scenario(Scenario::Evaporation);

    for _ in 0..480 {
        engine.step(0.05);
    }
    let state = engine.state();
    assert!(state.culture_alive);
    assert!(!state.culture_alive_without_control);
    assert!((state.volume - 1.5).abs() < 0.1);
    assert!(state.total_pump_volume > 3.0);
    let failed_at = state
        .failure_time_without_control
        .expect("uncontrolled failure time");
    // Roughly 0.2 mL at 0.15-0.2 mL/h
    assert!(failed_at < 2.0, "failed at {failed_at}");
}

#[test]
fn terminated_engine_ignores_steps() {
    let mut engine = quiet_engine();
    engine.set_scenario(Scenario::Temperature);
    while !engine.state().terminated() {
        engine.step(0.1);
        assert!(engine.state().time < 50.0, "run did not terminate");
    }

    let before = engine.state().clone();
    for _ in 0..10 {
        engine.step(0.5);
    }
    assert_eq!(engine.state(), &before);
}

#[test]
fn history_is_capped_and_ordered() {
    let mut engine = quiet_engine();
    for _ in 0..3000 {
        engine.step(0.1);
    }
    assert!(engine.state().culture_alive);

    let history = engine.history();
    assert_eq!(history.len(), HISTORY_CAPACITY);
    let times = history.series(Series::Time);
    assert!(times.windows(2).all(|w| w[0] < w[1]));
    let last = *times.last().expect("non-empty history");
    assert!((last - 300.0).abs() < 1e-6);
    // Sampled every half hour
    assert!((times[1] - times[0] - 0.5).abs() < 1e-6);
}

#[test]
fn next_adjustment_in_minutes_under_dry_air() {
    let mut engine = quiet_engine();
    engine.set_scenario(Scenario::Evaporation);
    engine.step(0.001);
    // 0.1 mL margin against 0.186 mL/h is about 32 minutes
    assert_eq!(engine.predict_next_adjustment(), NextAdjustment::InMinutes(32));
    let snap = engine.snapshot();
    assert_eq!(snap.prediction.next_adjustment, NextAdjustment::InMinutes(32));
}

#[test]
fn next_adjustment_not_applicable_without_losses() {
    let constants = ChamberConstants {
        base_evaporation_rate: 0.0,
        base_cell_consumption_rate: 0.0,
        ..ChamberConstants::default()
    };
    let engine = SimulationEngine::new(constants, ControllerGains::default())
        .expect("engine")
        .with_noise(ZeroNoise);
    assert_eq!(
        engine.predict_next_adjustment(),
        NextAdjustment::NotApplicable
    );
    assert_eq!(engine.predict_next_adjustment().to_string(), "N/A");
}

#[test]
fn scenario_raises_predicted_risk() {
    let mut engine = quiet_engine();
    let baseline = engine.predict_viability(72.0);
    engine.set_scenario(Scenario::Contamination);
    let flagged = engine.predict_viability(72.0);
    assert!((flagged.risk_score - baseline.risk_score - 10.0).abs() < 1e-9);
    assert!(flagged.viability < baseline.viability);
}
