//! Headless session: engine plus the per-session policy around it.

use ali_project::{
    ProjectError, RunDef, SessionConfig, TimelineAction, TimelineEvent, validate_config,
};
use ali_sim::{
    DEFAULT_HORIZON_HOURS, EngineSnapshot, Environment, FailureCause, Incident, Prediction,
    Scenario, SeededNoise, SimulationEngine,
};
use serde::Serialize;

use crate::alerts::AlertMonitor;
use crate::error::{AppError, AppResult};
use crate::event_log::{EventLog, LogLevel};
use crate::status::{EnvironmentStatus, NominalBands, format_sim_time, risk_label};

/// Slack when comparing accumulated simulated time against scheduled times (h).
const TIME_SLACK: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionOptions {
    /// Largest simulated step taken at once (h).
    pub dt_hours: f64,
    /// Simulated hours before an incident is stopped automatically.
    pub incident_duration_hours: f64,
    /// Simulated minutes per wall-clock second.
    pub speed: f64,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::from(&RunDef::default())
    }
}

impl From<&RunDef> for SessionOptions {
    fn from(run: &RunDef) -> Self {
        Self {
            dt_hours: run.dt_hours,
            incident_duration_hours: run.incident_duration_hours,
            speed: run.speed,
        }
    }
}

impl SessionOptions {
    fn validate(&self) -> AppResult<()> {
        let checks = [
            ("dt_hours", self.dt_hours),
            ("incident_duration_hours", self.incident_duration_hours),
            ("speed", self.speed),
        ];
        for (what, value) in checks {
            if !value.is_finite() || value <= 0.0 {
                return Err(AppError::InvalidInput(format!(
                    "{what} must be positive and finite, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// End-of-run figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub name: String,
    pub hours: f64,
    pub scenario: Scenario,
    pub volume: f64,
    pub volume_without_control: f64,
    pub culture_alive: bool,
    pub culture_alive_without_control: bool,
    pub failure_cause: Option<FailureCause>,
    pub failure_time_without_control: Option<f64>,
    pub total_pump_volume: f64,
    pub adjustment_count: u64,
    pub environment: Environment,
    pub status: EnvironmentStatus,
    pub prediction: Prediction,
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if !self.name.is_empty() {
            writeln!(f, "Session: {}", self.name)?;
        }
        writeln!(f, "Simulated time:      {}", format_sim_time(self.hours))?;
        writeln!(f, "Scenario:            {}", self.scenario)?;
        let controlled = if self.culture_alive {
            "alive".to_string()
        } else {
            match &self.failure_cause {
                Some(cause) => format!("failed ({cause})"),
                None => "failed".to_string(),
            }
        };
        writeln!(
            f,
            "Controlled culture:  {controlled}, {:.3} mL",
            self.volume
        )?;
        let reference = match self.failure_time_without_control {
            Some(at) if !self.culture_alive_without_control => format!("failed at {at:.1} h"),
            _ => "alive".to_string(),
        };
        writeln!(
            f,
            "Reference culture:   {reference}, {:.3} mL",
            self.volume_without_control
        )?;
        writeln!(
            f,
            "Pump:                {:.3} mL delivered over {} adjustments",
            self.total_pump_volume, self.adjustment_count
        )?;
        let env = &self.environment;
        let status = &self.status;
        writeln!(f, "Environment:         {} overall", status.worst().label())?;
        writeln!(f, "  temperature {:>6.1} °C  {}", env.temperature, status.temperature.label())?;
        writeln!(f, "  CO2         {:>6.1} %   {}", env.co2, status.co2.label())?;
        writeln!(f, "  pH          {:>6.2}     {}", env.ph, status.ph.label())?;
        writeln!(f, "  humidity    {:>6.1} %   {}", env.humidity, status.humidity.label())?;
        write!(
            f,
            "Prediction:          {:.0} % viability at {:.0} h, risk {}, next adjustment {}",
            self.prediction.viability,
            self.prediction.hours_ahead,
            risk_label(self.prediction.risk_level),
            self.prediction.next_adjustment
        )
    }
}

/// Drives one engine: scripted timeline, incident timer, alerts and the event log.
#[derive(Debug)]
pub struct Session {
    name: String,
    engine: SimulationEngine,
    options: SessionOptions,
    alerts: AlertMonitor,
    log: EventLog,
    /// Simulated hours left before the active incident is stopped.
    incident_remaining: Option<f64>,
    timeline: Vec<TimelineEvent>,
    cursor: usize,
    initial_scenario: Scenario,
}

impl Session {
    pub fn new(engine: SimulationEngine, options: SessionOptions) -> AppResult<Self> {
        options.validate()?;
        let initial_scenario = engine.state().scenario;
        Ok(Self {
            name: String::new(),
            engine,
            options,
            alerts: AlertMonitor::default(),
            log: EventLog::default(),
            incident_remaining: None,
            timeline: Vec::new(),
            cursor: 0,
            initial_scenario,
        })
    }

    /// Build a session from a validated configuration.
    pub fn from_config(config: &SessionConfig) -> AppResult<Self> {
        validate_config(config).map_err(ProjectError::from)?;
        let noise = config
            .run
            .seed
            .map(SeededNoise::from_seed_u64)
            .unwrap_or_default();
        let engine = SimulationEngine::new(config.constants.clone(), config.gains.clone())?
            .with_noise(noise);
        let mut session = Self::new(engine, SessionOptions::from(&config.run))?;
        session.name = config.name.clone();
        session.timeline = config.timeline.clone();
        session.initial_scenario = config.scenario;
        session.engine.set_scenario(config.scenario);
        tracing::info!(
            name = %session.name,
            seed = ?config.run.seed,
            events = session.timeline.len(),
            "session created"
        );
        Ok(session)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn engine(&self) -> &SimulationEngine {
        &self.engine
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn time(&self) -> f64 {
        self.engine.state().time
    }

    pub fn incident_remaining(&self) -> Option<f64> {
        self.incident_remaining
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        self.engine.snapshot()
    }

    /// One engine step of `dt_hours`, with the session policy around it.
    pub fn advance(&mut self, dt_hours: f64) {
        if !dt_hours.is_finite() || dt_hours <= 0.0 {
            tracing::warn!(dt_hours, "ignoring invalid session step");
            return;
        }
        self.apply_due_events();
        self.engine.step(dt_hours);
        self.tick_incident(dt_hours);

        let state = self.engine.state();
        let time = state.time;
        for alert in self.alerts.evaluate(state) {
            self.log.push(time, alert.level(), alert.message());
        }
    }

    /// Advance by wall-clock seconds scaled by the session speed.
    ///
    /// Returns the simulated hours requested.
    pub fn advance_wall(&mut self, real_seconds: f64) -> f64 {
        if !real_seconds.is_finite() || real_seconds <= 0.0 {
            return 0.0;
        }
        let hours = real_seconds * self.options.speed / 60.0;
        self.run_for(hours);
        hours
    }

    /// Advance `hours` in steps of at most `dt_hours`, stopping early once
    /// both cultures have failed.
    pub fn run_for(&mut self, hours: f64) {
        if !hours.is_finite() || hours <= 0.0 {
            return;
        }
        let end = self.time() + hours;
        while !self.engine.state().terminated() {
            let remaining = end - self.time();
            if remaining <= TIME_SLACK {
                break;
            }
            self.advance(remaining.min(self.options.dt_hours));
        }
    }

    pub fn set_scenario(&mut self, scenario: Scenario) {
        self.engine.set_scenario(scenario);
        self.log.push(
            self.time(),
            LogLevel::Info,
            format!("Scenario set to {scenario}"),
        );
    }

    /// Start an incident that stops on its own after the configured duration.
    pub fn trigger_incident(&mut self, incident: Option<Incident>) {
        let incident = incident.unwrap_or_default();
        self.engine.trigger_incident(Some(incident));
        self.incident_remaining = Some(self.options.incident_duration_hours);
        self.log.push(
            self.time(),
            LogLevel::Danger,
            format!("INCIDENT: {incident}"),
        );
    }

    /// Start an incident chosen by the engine's noise source.
    pub fn trigger_random_incident(&mut self) -> Incident {
        let index = self.engine.noise_mut().pick(Incident::ALL.len());
        let incident = Incident::ALL[index];
        self.trigger_incident(Some(incident));
        incident
    }

    pub fn stop_incident(&mut self) {
        self.incident_remaining = None;
        if self.engine.state().incident_active() {
            self.engine.stop_incident();
            self.log
                .push(self.time(), LogLevel::Success, "Incident stopped");
        }
    }

    /// Rewind engine, timeline, alerts and log to the session start.
    pub fn reset(&mut self) {
        self.engine.reset();
        self.engine.set_scenario(self.initial_scenario);
        self.alerts.reset();
        self.log.clear();
        self.incident_remaining = None;
        self.cursor = 0;
        self.log.push(0.0, LogLevel::Info, "Simulation reset");
    }

    pub fn summary(&self) -> RunSummary {
        let state = self.engine.state();
        RunSummary {
            name: self.name.clone(),
            hours: state.time,
            scenario: state.scenario,
            volume: state.volume,
            volume_without_control: state.volume_without_control,
            culture_alive: state.culture_alive,
            culture_alive_without_control: state.culture_alive_without_control,
            failure_cause: state.failure_cause,
            failure_time_without_control: state.failure_time_without_control,
            total_pump_volume: state.total_pump_volume,
            adjustment_count: state.adjustment_count,
            environment: state.environment,
            status: EnvironmentStatus::evaluate(&state.environment, &NominalBands::default()),
            prediction: self.engine.predict_viability(DEFAULT_HORIZON_HOURS),
        }
    }

    fn apply_due_events(&mut self) {
        while let Some(event) = self.timeline.get(self.cursor) {
            if event.at_hours > self.time() + TIME_SLACK {
                break;
            }
            let action = event.action.clone();
            self.cursor += 1;
            match action {
                TimelineAction::SetScenario { scenario } => self.set_scenario(scenario),
                TimelineAction::TriggerIncident { incident } => self.trigger_incident(incident),
                TimelineAction::StopIncident => self.stop_incident(),
            }
        }
    }

    fn tick_incident(&mut self, dt_hours: f64) {
        let Some(remaining) = self.incident_remaining else {
            return;
        };
        let remaining = remaining - dt_hours;
        if remaining <= TIME_SLACK {
            self.incident_remaining = None;
            if self.engine.state().incident_active() {
                self.engine.stop_incident();
                self.log.push(
                    self.time(),
                    LogLevel::Warning,
                    "Incident resolved by the system",
                );
            }
        } else {
            self.incident_remaining = Some(remaining);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::StatusBand;
    use ali_sim::{FixedNoise, ZeroNoise};

    fn quiet_session(options: SessionOptions) -> Session {
        let engine = SimulationEngine::with_defaults()
            .unwrap()
            .with_noise(ZeroNoise);
        Session::new(engine, options).unwrap()
    }

    #[test]
    fn wall_time_scales_by_speed() {
        let mut session = quiet_session(SessionOptions::default());
        // 6 s at 10 simulated minutes per second
        let hours = session.advance_wall(6.0);
        assert!((hours - 1.0).abs() < 1e-12);
        assert!((session.time() - 1.0).abs() < 1e-9);
        assert_eq!(session.advance_wall(-1.0), 0.0);
    }

    #[test]
    fn incident_stops_after_its_duration() {
        let mut session = quiet_session(SessionOptions {
            incident_duration_hours: 0.5,
            ..SessionOptions::default()
        });
        session.trigger_incident(Some(Incident::PhDrop));
        session.run_for(0.25);
        assert!(session.engine().state().incident_active());

        session.run_for(0.5);
        assert!(!session.engine().state().incident_active());
        assert_eq!(session.incident_remaining(), None);
        assert!(
            session
                .log()
                .iter()
                .any(|e| e.message == "Incident resolved by the system")
        );
    }

    #[test]
    fn manual_stop_clears_timer() {
        let mut session = quiet_session(SessionOptions::default());
        session.trigger_incident(None);
        assert_eq!(
            session.engine().state().incident,
            Some(Incident::HumidityDrop)
        );
        session.stop_incident();
        assert_eq!(session.incident_remaining(), None);
        assert!(!session.engine().state().incident_active());
        assert_eq!(session.log().last().map(|e| e.level), Some(LogLevel::Success));
    }

    #[test]
    fn random_incident_uses_engine_noise() {
        let engine = SimulationEngine::with_defaults()
            .unwrap()
            .with_noise(FixedNoise(0.99));
        let mut session = Session::new(engine, SessionOptions::default()).unwrap();
        let incident = session.trigger_random_incident();
        assert_eq!(incident, Incident::ALL[2]);
        assert_eq!(session.engine().state().incident, Some(incident));
    }

    #[test]
    fn timeline_replays_after_reset() {
        let mut config = SessionConfig::default();
        config.run.seed = Some(3);
        config.timeline.push(TimelineEvent {
            at_hours: 0.5,
            action: TimelineAction::SetScenario {
                scenario: Scenario::Evaporation,
            },
        });
        let mut session = Session::from_config(&config).unwrap();

        session.run_for(0.4);
        assert_eq!(session.engine().state().scenario, Scenario::Normal);
        session.run_for(0.2);
        assert_eq!(session.engine().state().scenario, Scenario::Evaporation);

        session.reset();
        assert_eq!(session.time(), 0.0);
        assert_eq!(session.engine().state().scenario, Scenario::Normal);
        assert_eq!(session.log().len(), 1);

        session.run_for(1.0);
        assert_eq!(session.engine().state().scenario, Scenario::Evaporation);
    }

    #[test]
    fn rejects_bad_options() {
        let engine = SimulationEngine::with_defaults().unwrap();
        let err = Session::new(
            engine,
            SessionOptions {
                dt_hours: 0.0,
                ..SessionOptions::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn rejects_invalid_config() {
        let mut config = SessionConfig::default();
        config.constants.target_volume = -1.0;
        assert!(matches!(
            Session::from_config(&config),
            Err(AppError::Project(_))
        ));
    }

    #[test]
    fn summary_reports_healthy_run() {
        let mut session = quiet_session(SessionOptions::default());
        session.run_for(2.0);
        let summary = session.summary();
        assert!(summary.culture_alive);
        assert!(summary.culture_alive_without_control);
        assert!((summary.hours - 2.0).abs() < 1e-9);
        let text = summary.to_string();
        assert!(text.contains("Simulated time:      02:00:00"));
        assert!(text.contains("Controlled culture:  alive"));
        assert_eq!(summary.status.worst(), StatusBand::Ok);
        assert!(text.contains("Environment:         OK overall"));
    }
}
