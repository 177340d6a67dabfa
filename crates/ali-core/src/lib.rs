//! ali-core: shared foundation for the ALI chamber controller.
//!
//! Contains:
//! - units (uom SI types + constructors for mL, mL/min, hours)
//! - numeric (Real + tolerances + closed bands)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod units;

pub use error::{CoreError, CoreResult};
pub use numeric::*;
pub use units::*;
