//! Sample scheduling against simulated time.
//!
//! Periodic events (history sampling, scheduled manual top-offs) fire when
//! simulated time reaches a multiple of a fixed period. Boundary times are
//! derived from an integer index, `index * period`, so repeated addition of
//! small steps never shifts the schedule.

use ali_core::Real;
use serde::{Deserialize, Serialize};

use crate::error::{ControlError, ControlResult};

/// Slack applied when comparing accumulated time with a boundary.
///
/// Summing steps such as `0.1` ten times lands a hair below `1.0`; without
/// slack that boundary would be reported one step late.
pub const BOUNDARY_SLACK: Real = 1e-9;

/// Sample clock tracks when a periodic event is due.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleClock {
    /// Sample period, in the same unit as the times passed in.
    pub period: Real,
    /// Index of the next boundary (`next_index * period`).
    pub next_index: u64,
    first_index: u64,
}

impl SampleClock {
    /// Create a clock whose first boundary is at `period`.
    pub fn new(period: Real) -> ControlResult<Self> {
        Self::starting_at(period, 1)
    }

    /// Create a clock whose first boundary is at `first_index * period`.
    pub fn starting_at(period: Real, first_index: u64) -> ControlResult<Self> {
        if !period.is_finite() || period <= 0.0 {
            return Err(ControlError::InvalidArg {
                what: "sample period must be positive and finite",
            });
        }
        Ok(Self {
            period,
            next_index: first_index,
            first_index,
        })
    }

    /// Time of the next scheduled boundary.
    pub fn next_boundary(&self) -> Real {
        self.next_index as Real * self.period
    }

    /// Check whether the next boundary has been reached at `time`.
    pub fn is_due(&self, time: Real) -> bool {
        time + BOUNDARY_SLACK >= self.next_boundary()
    }

    /// Consume every boundary at or before `time` and return how many there were.
    pub fn crossings(&mut self, time: Real) -> u64 {
        if !self.is_due(time) {
            return 0;
        }
        let reached = ((time + BOUNDARY_SLACK) / self.period).floor() as u64;
        let count = reached + 1 - self.next_index;
        self.next_index = reached + 1;
        count
    }

    /// Restore the clock to its initial schedule.
    pub fn reset(&mut self) {
        self.next_index = self.first_index;
    }
}
