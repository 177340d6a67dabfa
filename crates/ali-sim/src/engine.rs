//! The simulation engine.
//!
//! A driver calls [`SimulationEngine::step`] with elapsed simulated hours and
//! reads [`SimulationEngine::snapshot`] to render. Two cultures evolve side by
//! side under the same environment: one fed by the PI-controlled pump, one
//! only topped off by hand every twelve hours.

use ali_controls::{PIController, PIControllerState, SampleClock};
use ali_core::{Real, units};
use serde::Serialize;

use crate::constants::{ChamberConstants, ControllerGains};
use crate::environment::{
    Environment, EnvironmentLimits, Incident, Scenario, apply_rules, resolve_rules,
};
use crate::error::SimResult;
use crate::history::{History, HistorySample};
use crate::noise::{NoiseSource, SeededNoise};
use crate::physics::{LossRates, integrate_volume};
use crate::prediction::{self, DEFAULT_HORIZON_HOURS, NextAdjustment, Prediction};
use crate::snapshot::{EngineSnapshot, round_millis};
use crate::viability::{FailureCause, ViabilityRules};

/// Interval between manual top-offs of the uncontrolled culture (h).
pub const MANUAL_TOP_OFF_PERIOD: Real = 12.0;
/// Interval between history samples (h).
pub const HISTORY_PERIOD: Real = 0.5;
/// Pump flow above which the pump counts as running (mL/min).
pub const PUMP_ACTIVE_THRESHOLD: Real = 0.001;
/// Top-offs land within ±20 % of the intended correction.
pub const TOP_OFF_ACCURACY: (Real, Real) = (0.8, 1.2);

/// Mutable state of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationState {
    /// Elapsed simulated time (h).
    pub time: Real,
    /// Controlled culture medium volume (mL).
    pub volume: Real,
    /// Uncontrolled culture medium volume (mL).
    pub volume_without_control: Real,
    #[serde(flatten)]
    pub environment: Environment,
    /// Commanded pump flow (mL/min). Forced to zero, with `pump_active`
    /// cleared, once the controlled culture has failed.
    pub pump_flow: Real,
    pub pump_active: bool,
    /// Medium delivered by the pump since reset (mL).
    pub total_pump_volume: Real,
    /// Steps during which the pump was running.
    pub adjustment_count: u64,
    pub culture_alive: bool,
    pub culture_alive_without_control: bool,
    pub failure_time_without_control: Option<Real>,
    pub failure_cause: Option<FailureCause>,
    pub scenario: Scenario,
    pub incident: Option<Incident>,
    pub history: History,
}

impl SimulationState {
    fn initial(constants: &ChamberConstants) -> Self {
        Self {
            time: 0.0,
            volume: constants.target_volume,
            volume_without_control: constants.target_volume,
            environment: constants.optimal_environment(),
            pump_flow: 0.0,
            pump_active: false,
            total_pump_volume: 0.0,
            adjustment_count: 0,
            culture_alive: true,
            culture_alive_without_control: true,
            failure_time_without_control: None,
            failure_cause: None,
            scenario: Scenario::Normal,
            incident: None,
            history: History::default(),
        }
    }

    pub fn incident_active(&self) -> bool {
        self.incident.is_some()
    }

    /// Both cultures have failed; stepping no longer changes anything.
    pub fn terminated(&self) -> bool {
        !self.culture_alive && !self.culture_alive_without_control
    }

    fn sample(&self) -> HistorySample {
        HistorySample {
            time: self.time,
            volume_with_control: self.volume,
            volume_without_control: self.volume_without_control,
            pump_flow: self.pump_flow,
            temperature: self.environment.temperature,
            co2: self.environment.co2,
            humidity: self.environment.humidity,
            ph: self.environment.ph,
        }
    }
}

/// Owns constants, state, controller and history for one chamber.
#[derive(Debug)]
pub struct SimulationEngine {
    constants: ChamberConstants,
    gains: ControllerGains,
    controller: PIController,
    limits: EnvironmentLimits,
    rules: ViabilityRules,
    state: SimulationState,
    pid: PIControllerState,
    top_off_clock: SampleClock,
    history_clock: SampleClock,
    noise: Box<dyn NoiseSource>,
}

impl SimulationEngine {
    /// Build an engine with validated constants and gains, then reset it.
    pub fn new(constants: ChamberConstants, gains: ControllerGains) -> SimResult<Self> {
        constants.validate()?;
        let controller = gains.build(constants.max_pump_flow)?;
        let state = SimulationState::initial(&constants);
        let mut engine = Self {
            constants,
            gains,
            controller,
            limits: EnvironmentLimits::default(),
            rules: ViabilityRules::default(),
            state,
            pid: PIControllerState::default(),
            top_off_clock: SampleClock::starting_at(MANUAL_TOP_OFF_PERIOD, 0)?,
            history_clock: SampleClock::new(HISTORY_PERIOD)?,
            noise: Box::new(SeededNoise::default()),
        };
        engine.reset();
        Ok(engine)
    }

    /// Engine with default constants and gains.
    pub fn with_defaults() -> SimResult<Self> {
        Self::new(ChamberConstants::default(), ControllerGains::default())
    }

    /// Replace the randomness source.
    pub fn with_noise(mut self, noise: impl NoiseSource + 'static) -> Self {
        self.noise = Box::new(noise);
        self
    }

    /// Replace the viability thresholds.
    pub fn with_viability_rules(mut self, rules: ViabilityRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn constants(&self) -> &ChamberConstants {
        &self.constants
    }

    pub fn gains(&self) -> &ControllerGains {
        &self.gains
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn controller_state(&self) -> &PIControllerState {
        &self.pid
    }

    pub fn history(&self) -> &History {
        &self.state.history
    }

    /// Randomness shared with the driver, e.g. to pick an incident.
    pub fn noise_mut(&mut self) -> &mut dyn NoiseSource {
        self.noise.as_mut()
    }

    /// Restore defaults and record the initial history sample.
    pub fn reset(&mut self) {
        self.state = SimulationState::initial(&self.constants);
        self.pid = PIControllerState::default();
        self.top_off_clock.reset();
        self.history_clock.reset();
        self.record_history();
        tracing::debug!("simulation reset");
    }

    /// Advance the simulation by `dt_hours`.
    ///
    /// Does nothing once both cultures have failed, and ignores non-positive
    /// or non-finite steps.
    pub fn step(&mut self, dt_hours: Real) {
        if !dt_hours.is_finite() || dt_hours <= 0.0 {
            tracing::warn!(dt_hours, "ignoring invalid simulation step");
            return;
        }
        if self.state.terminated() {
            return;
        }
        let dt = dt_hours;
        let time = self.state.time;

        let rules = resolve_rules(self.state.scenario, self.state.incident, time);
        apply_rules(
            &mut self.state.environment,
            &rules,
            &self.limits,
            time,
            dt,
            self.noise.as_mut(),
        );

        let loss = self.loss_rates();

        if self.state.culture_alive_without_control {
            self.step_uncontrolled(&loss, time, dt);
        }

        if self.state.culture_alive {
            self.step_controlled(&loss, dt);
        }

        self.check_viability();

        self.state.time = time + dt;

        if self.history_clock.crossings(self.state.time) > 0 {
            self.record_history();
        }
    }

    fn step_uncontrolled(&mut self, loss: &LossRates, time: Real, dt: Real) {
        let state = &mut self.state;
        state.volume_without_control =
            integrate_volume(state.volume_without_control, -loss.total(), dt);

        // Checked against the pre-step time, so the first step counts
        if self.top_off_clock.crossings(time) > 0 {
            let (lo, hi) = TOP_OFF_ACCURACY;
            let intended = self.constants.target_volume - state.volume_without_control;
            let factor = self.noise.uniform(lo, hi);
            state.volume_without_control =
                (state.volume_without_control + intended * factor).max(0.0);
            tracing::debug!(
                time,
                intended,
                factor,
                volume = state.volume_without_control,
                "manual top-off"
            );
        }
    }

    fn step_controlled(&mut self, loss: &LossRates, dt: Real) {
        let (pid, flow) = self.controller.update(
            &self.pid,
            self.state.volume,
            self.constants.target_volume,
            dt,
        );
        self.pid = pid;

        let state = &mut self.state;
        state.pump_flow = flow;
        state.pump_active = flow > PUMP_ACTIVE_THRESHOLD;

        let inflow = units::ml_per_hour_from_ml_per_min(flow);
        state.volume = integrate_volume(state.volume, inflow - loss.total(), dt);
        state.total_pump_volume += units::delivered_ml(flow, dt);
        if state.pump_active {
            state.adjustment_count += 1;
        }
    }

    fn check_viability(&mut self) {
        let state = &mut self.state;
        if state.culture_alive {
            if let Some(cause) =
                self.rules
                    .controlled_failure(&self.constants, state.volume, &state.environment)
            {
                state.culture_alive = false;
                state.failure_cause = Some(cause);
                state.pump_flow = 0.0;
                state.pump_active = false;
                tracing::warn!(time = state.time, ?cause, "controlled culture failed");
            }
        }

        if state.culture_alive_without_control {
            if let Some(cause) = self
                .rules
                .uncontrolled_failure(&self.constants, state.volume_without_control)
            {
                state.culture_alive_without_control = false;
                if state.failure_time_without_control.is_none() {
                    state.failure_time_without_control = Some(state.time);
                }
                tracing::warn!(time = state.time, ?cause, "uncontrolled culture failed");
            }
        }
    }

    fn record_history(&mut self) {
        let sample = self.state.sample();
        self.state.history.push(sample);
    }

    pub fn set_scenario(&mut self, scenario: Scenario) {
        if self.state.scenario != scenario {
            tracing::info!(time = self.state.time, %scenario, "scenario changed");
        }
        self.state.scenario = scenario;
    }

    /// Set the scenario from its name. Unknown names leave the state untouched.
    pub fn set_scenario_by_name(&mut self, name: &str) -> SimResult<()> {
        let scenario = name.parse()?;
        self.set_scenario(scenario);
        Ok(())
    }

    /// Start an incident, replacing any active one. Defaults to a humidity drop.
    pub fn trigger_incident(&mut self, incident: Option<Incident>) {
        let incident = incident.unwrap_or_default();
        tracing::info!(time = self.state.time, %incident, "incident triggered");
        self.state.incident = Some(incident);
    }

    /// Start an incident by name. Unknown names leave the state untouched.
    pub fn trigger_incident_by_name(&mut self, name: Option<&str>) -> SimResult<()> {
        let incident = name.map(str::parse::<Incident>).transpose()?;
        self.trigger_incident(incident);
        Ok(())
    }

    pub fn stop_incident(&mut self) {
        if let Some(incident) = self.state.incident.take() {
            tracing::info!(time = self.state.time, %incident, "incident stopped");
        }
    }

    /// Loss rates for the current state.
    pub fn loss_rates(&self) -> LossRates {
        LossRates::evaluate(
            &self.constants,
            &self.state.environment,
            self.state.culture_alive,
        )
    }

    pub fn evaporation_rate(&self) -> Real {
        self.loss_rates().evaporation
    }

    pub fn consumption_rate(&self) -> Real {
        self.loss_rates().consumption
    }

    pub fn predict_viability(&self, hours_ahead: Real) -> Prediction {
        prediction::predict(
            &self.constants,
            &self.state.environment,
            self.state.volume,
            self.state.scenario,
            self.loss_rates().total(),
            hours_ahead,
        )
    }

    pub fn predict_next_adjustment(&self) -> NextAdjustment {
        NextAdjustment::estimate(
            &self.constants,
            self.state.volume,
            self.loss_rates().total(),
        )
    }

    /// Owned snapshot of the state with the default-horizon prediction.
    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            state: self.state.clone(),
            prediction: self.predict_viability(DEFAULT_HORIZON_HOURS),
            level_deviation: round_millis(self.state.volume - self.constants.target_volume),
            target_volume: self.constants.target_volume,
            tolerance_volume: self.constants.tolerance_volume,
        }
    }
}
