//! Bounded time series of engine samples.
//!
//! One record per timestamp keeps every series aligned; the parallel views a
//! chart wants are produced on demand by [`History::series`].

use std::collections::VecDeque;

use ali_core::Real;
use serde::{Deserialize, Serialize, Serializer};

/// Maximum number of retained samples.
pub const HISTORY_CAPACITY: usize = 500;

/// Engine readings at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistorySample {
    /// h
    pub time: Real,
    /// mL
    pub volume_with_control: Real,
    /// mL
    pub volume_without_control: Real,
    /// mL/min
    pub pump_flow: Real,
    pub temperature: Real,
    pub co2: Real,
    pub humidity: Real,
    pub ph: Real,
}

/// Selects one column of the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Series {
    Time,
    VolumeWithControl,
    VolumeWithoutControl,
    PumpFlow,
    Temperature,
    Co2,
    Humidity,
    Ph,
}

impl Series {
    pub const ALL: [Series; 8] = [
        Series::Time,
        Series::VolumeWithControl,
        Series::VolumeWithoutControl,
        Series::PumpFlow,
        Series::Temperature,
        Series::Co2,
        Series::Humidity,
        Series::Ph,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Series::Time => "time",
            Series::VolumeWithControl => "volume_with_control",
            Series::VolumeWithoutControl => "volume_without_control",
            Series::PumpFlow => "pump_flow",
            Series::Temperature => "temperature",
            Series::Co2 => "co2",
            Series::Humidity => "humidity",
            Series::Ph => "ph",
        }
    }

    pub fn value(&self, sample: &HistorySample) -> Real {
        match self {
            Series::Time => sample.time,
            Series::VolumeWithControl => sample.volume_with_control,
            Series::VolumeWithoutControl => sample.volume_without_control,
            Series::PumpFlow => sample.pump_flow,
            Series::Temperature => sample.temperature,
            Series::Co2 => sample.co2,
            Series::Humidity => sample.humidity,
            Series::Ph => sample.ph,
        }
    }
}

/// Ring buffer of samples, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct History {
    samples: VecDeque<HistorySample>,
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }
}

impl History {
    /// History keeping at most `capacity` samples (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a sample, dropping the oldest once full.
    pub fn push(&mut self, sample: HistorySample) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistorySample> {
        self.samples.iter()
    }

    pub fn latest(&self) -> Option<&HistorySample> {
        self.samples.back()
    }

    /// One column, oldest first.
    pub fn series(&self, series: Series) -> Vec<Real> {
        self.samples.iter().map(|s| series.value(s)).collect()
    }
}

impl Serialize for History {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.samples.iter())
    }
}
