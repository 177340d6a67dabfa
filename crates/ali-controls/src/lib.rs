//! Feedback control primitives for the ALI chamber.
//!
//! This crate holds the pieces of the control loop that do not depend on the
//! chamber model itself:
//! - A PI controller with integral clamping, output clamping and a dead-band
//! - A sample clock that schedules periodic events against simulated time
//!
//! Controllers are pure: `update` takes the previous state by reference and
//! returns the next state together with the output, so callers decide when a
//! new state is committed.

pub mod controller;
pub mod error;
pub mod sampled;

pub use controller::{PIController, PIControllerState};
pub use error::{ControlError, ControlResult};
pub use sampled::SampleClock;
