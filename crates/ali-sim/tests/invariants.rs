//! Property tests: engine invariants under arbitrary command sequences.

use ali_sim::{EnvironmentLimits, Incident, Scenario, SeededNoise, SimulationEngine, ZeroNoise};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Command {
    Step(f64),
    SetScenario(Scenario),
    Trigger(Option<Incident>),
    Stop,
}

fn command() -> impl Strategy<Value = Command> {
    prop_oneof![
        8 => (0.001_f64..2.0).prop_map(Command::Step),
        1 => prop::sample::select(Scenario::ALL.to_vec()).prop_map(Command::SetScenario),
        1 => prop::option::of(prop::sample::select(Incident::ALL.to_vec()))
            .prop_map(Command::Trigger),
        1 => Just(Command::Stop),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn step_invariants_hold(
        seed in any::<u64>(),
        commands in prop::collection::vec(command(), 1..400),
    ) {
        let mut engine = SimulationEngine::with_defaults()
            .expect("default engine")
            .with_noise(SeededNoise::from_seed_u64(seed));
        let limits = EnvironmentLimits::default();

        for cmd in commands {
            let before = engine.state().clone();
            match cmd {
                Command::Step(dt) => {
                    engine.step(dt);
                    let after = engine.state();
                    if before.terminated() {
                        prop_assert_eq!(after, &before);
                    } else {
                        prop_assert_eq!(after.time, before.time + dt);
                    }
                    // At most one sample per step, however many boundaries it spans
                    prop_assert!(after.history.len() <= before.history.len() + 1);
                }
                Command::SetScenario(s) => engine.set_scenario(s),
                Command::Trigger(i) => engine.trigger_incident(i),
                Command::Stop => engine.stop_incident(),
            }

            let after = engine.state();
            prop_assert!(after.volume >= 0.0);
            prop_assert!(after.volume_without_control >= 0.0);
            prop_assert!(limits.contains(&after.environment));
            prop_assert!(after.time >= before.time);

            // One-way viability
            prop_assert!(before.culture_alive || !after.culture_alive);
            prop_assert!(
                before.culture_alive_without_control || !after.culture_alive_without_control
            );

            // Failure time latched once
            if before.failure_time_without_control.is_some() {
                prop_assert_eq!(
                    after.failure_time_without_control,
                    before.failure_time_without_control
                );
            }
            prop_assert_eq!(
                after.failure_time_without_control.is_some(),
                !after.culture_alive_without_control
            );

            prop_assert!(after.total_pump_volume >= before.total_pump_volume);
            prop_assert!(after.adjustment_count >= before.adjustment_count);
            prop_assert!(after.pump_flow >= 0.0 && after.pump_flow <= 0.1);
            prop_assert_eq!(after.pump_active, after.pump_flow > 0.001);

            let history = engine.history();
            prop_assert!(history.len() <= 500);
            let times: Vec<f64> = history.iter().map(|s| s.time).collect();
            prop_assert!(times.windows(2).all(|w| w[0] < w[1]));

            prop_assert!(engine.controller_state().integral.abs() <= 1.0);
        }
    }

    #[test]
    fn reset_restores_initial_state(
        seed in any::<u64>(),
        steps in prop::collection::vec(0.01_f64..1.0, 0..100),
    ) {
        let mut engine = SimulationEngine::with_defaults()
            .expect("default engine")
            .with_noise(SeededNoise::from_seed_u64(seed));
        let initial = engine.state().clone();
        engine.set_scenario(Scenario::Evaporation);
        engine.trigger_incident(Some(Incident::PhDrop));
        for dt in steps {
            engine.step(dt);
        }
        engine.reset();
        prop_assert_eq!(engine.state(), &initial);
    }
}

#[test]
fn step_spanning_several_history_periods_records_one_sample() {
    let mut engine = SimulationEngine::with_defaults()
        .expect("default engine")
        .with_noise(ZeroNoise);
    assert_eq!(engine.history().len(), 1);

    // Crosses the 0.5, 1.0, 1.5 and 2.0 h boundaries
    engine.step(2.0);
    assert_eq!(engine.history().len(), 2);
    let latest = engine.history().latest().expect("sample");
    assert_eq!(latest.time, 2.0);

    // The next boundary is 2.5 h, not one of the skipped ones
    engine.step(0.25);
    assert_eq!(engine.history().len(), 2);
    engine.step(0.25);
    assert_eq!(engine.history().len(), 3);
}
