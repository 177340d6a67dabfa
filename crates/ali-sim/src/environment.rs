//! Chamber environment and the rules that disturb it.
//!
//! Each step the engine asks [`resolve_rules`] which rules apply for the
//! current scenario, incident and time, then applies them in the returned
//! order. Scenario rules always come before the incident rule, so an incident
//! touching the same field has the last word. Hard limits are applied after
//! every rule has run.

use std::fmt;
use std::str::FromStr;

use ali_core::{Band, Real};
use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::noise::NoiseSource;

/// Half-amplitude of the per-step temperature jitter in the normal scenario (°C).
pub const TEMPERATURE_JITTER: Real = 0.05;
/// Half-amplitude of the per-step CO2 jitter (%).
pub const CO2_JITTER: Real = 0.025;
/// Half-amplitude of the per-step humidity jitter (%).
pub const HUMIDITY_JITTER: Real = 0.25;
/// Half-amplitude of the per-step pH jitter.
pub const PH_JITTER: Real = 0.005;

/// Scenario time after which the incubator heater is considered failed (h).
pub const HEATER_FAILURE_AFTER: Real = 4.0;
/// Scenario time after which contamination starts acidifying the medium (h).
pub const CONTAMINATION_ONSET: Real = 2.0;

/// Environmental readings inside the chamber.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    /// °C
    pub temperature: Real,
    /// %
    pub co2: Real,
    /// Relative humidity, %
    pub humidity: Real,
    pub ph: Real,
}

/// Hard physical ranges, enforced after every environment update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentLimits {
    pub temperature: Band,
    pub co2: Band,
    pub humidity: Band,
    pub ph: Band,
}

impl Default for EnvironmentLimits {
    fn default() -> Self {
        Self {
            temperature: Band::new(20.0, 45.0),
            co2: Band::new(0.0, 10.0),
            humidity: Band::new(40.0, 100.0),
            ph: Band::new(5.5, 8.5),
        }
    }
}

impl EnvironmentLimits {
    pub fn clamp(&self, env: &mut Environment) {
        env.temperature = self.temperature.clamp(env.temperature);
        env.co2 = self.co2.clamp(env.co2);
        env.humidity = self.humidity.clamp(env.humidity);
        env.ph = self.ph.clamp(env.ph);
    }

    pub fn contains(&self, env: &Environment) -> bool {
        self.temperature.contains(env.temperature)
            && self.co2.contains(env.co2)
            && self.humidity.contains(env.humidity)
            && self.ph.contains(env.ph)
    }
}

/// Background condition of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    /// Small random fluctuations around the setpoints.
    #[default]
    Normal,
    /// Humidity held low, accelerating evaporation.
    Evaporation,
    /// Heater failure: the chamber drifts to room temperature.
    Temperature,
    /// Medium acidifies.
    Contamination,
}

impl Scenario {
    pub const ALL: [Scenario; 4] = [
        Scenario::Normal,
        Scenario::Evaporation,
        Scenario::Temperature,
        Scenario::Contamination,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Scenario::Normal => "normal",
            Scenario::Evaporation => "evaporation",
            Scenario::Temperature => "temperature",
            Scenario::Contamination => "contamination",
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scenario {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scenario::ALL
            .into_iter()
            .find(|sc| sc.name() == s.trim())
            .ok_or_else(|| SimError::UnknownScenario {
                name: s.to_string(),
            })
    }
}

/// Manually triggered disturbance, applied on top of the scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Incident {
    /// Humidity falls by 2 % per step, down to 50 %.
    #[default]
    HumidityDrop,
    /// Temperature rises by 0.5 °C per step, up to 42 °C.
    TemperatureSpike,
    /// pH falls by 0.05 per step, down to 6.0.
    PhDrop,
}

impl Incident {
    pub const ALL: [Incident; 3] = [
        Incident::HumidityDrop,
        Incident::TemperatureSpike,
        Incident::PhDrop,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Incident::HumidityDrop => "humidity_drop",
            Incident::TemperatureSpike => "temperature_spike",
            Incident::PhDrop => "ph_drop",
        }
    }
}

impl fmt::Display for Incident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Incident {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Incident::ALL
            .into_iter()
            .find(|inc| inc.name() == s.trim())
            .ok_or_else(|| SimError::UnknownIncident {
                name: s.to_string(),
            })
    }
}

/// One environment mutation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnvironmentRule {
    /// Independent uniform jitter on every reading.
    Fluctuate,
    /// Humidity follows `max(60, 70 + 5 sin(0.5 t))`.
    OscillateHumidity,
    /// Temperature set to room temperature, `25 + U(0, 2)`.
    AmbientTemperature,
    /// pH falls by `0.02` per hour, down to 6.0.
    Acidify,
    Incident(Incident),
}

/// Ordered rules for the given scenario, incident and scenario time.
pub fn resolve_rules(
    scenario: Scenario,
    incident: Option<Incident>,
    time: Real,
) -> Vec<EnvironmentRule> {
    let mut rules = Vec::with_capacity(2);
    match scenario {
        Scenario::Normal if incident.is_none() => rules.push(EnvironmentRule::Fluctuate),
        Scenario::Normal => {}
        Scenario::Evaporation => rules.push(EnvironmentRule::OscillateHumidity),
        Scenario::Temperature if time > HEATER_FAILURE_AFTER => {
            rules.push(EnvironmentRule::AmbientTemperature)
        }
        Scenario::Contamination if time > CONTAMINATION_ONSET => {
            rules.push(EnvironmentRule::Acidify)
        }
        Scenario::Temperature | Scenario::Contamination => {}
    }
    if let Some(incident) = incident {
        rules.push(EnvironmentRule::Incident(incident));
    }
    rules
}

impl EnvironmentRule {
    /// Apply this rule to `env` at scenario time `time` over a step of `dt` hours.
    pub fn apply(&self, env: &mut Environment, time: Real, dt: Real, noise: &mut dyn NoiseSource) {
        match self {
            EnvironmentRule::Fluctuate => {
                env.temperature += noise.uniform(-TEMPERATURE_JITTER, TEMPERATURE_JITTER);
                env.co2 += noise.uniform(-CO2_JITTER, CO2_JITTER);
                env.humidity += noise.uniform(-HUMIDITY_JITTER, HUMIDITY_JITTER);
                env.ph += noise.uniform(-PH_JITTER, PH_JITTER);
            }
            EnvironmentRule::OscillateHumidity => {
                env.humidity = (70.0 + 5.0 * (0.5 * time).sin()).max(60.0);
            }
            EnvironmentRule::AmbientTemperature => {
                env.temperature = 25.0 + noise.uniform(0.0, 2.0);
            }
            EnvironmentRule::Acidify => {
                env.ph = (env.ph - 0.02 * dt).max(6.0);
            }
            EnvironmentRule::Incident(Incident::HumidityDrop) => {
                env.humidity = (env.humidity - 2.0).max(50.0);
            }
            EnvironmentRule::Incident(Incident::TemperatureSpike) => {
                env.temperature = (env.temperature + 0.5).min(42.0);
            }
            EnvironmentRule::Incident(Incident::PhDrop) => {
                env.ph = (env.ph - 0.05).max(6.0);
            }
        }
    }
}

/// Apply `rules` in order, then clamp to `limits`.
pub fn apply_rules(
    env: &mut Environment,
    rules: &[EnvironmentRule],
    limits: &EnvironmentLimits,
    time: Real,
    dt: Real,
    noise: &mut dyn NoiseSource,
) {
    for rule in rules {
        rule.apply(env, time, dt, noise);
    }
    limits.clamp(env);
}
