use crate::{CoreError, CoreResult};

/// Floating point type used throughout the system
pub type Real = f64;

/// One tolerance for everything
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> CoreResult<Real> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

/// Closed interval `[min, max]`.
///
/// Used for hard clamp ranges on environmental readings and for lethal
/// limits in viability checks.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Band {
    pub min: Real,
    pub max: Real,
}

impl Band {
    pub const fn new(min: Real, max: Real) -> Self {
        Self { min, max }
    }

    /// Band of `center ± half_width`.
    pub fn around(center: Real, half_width: Real) -> Self {
        Self {
            min: center - half_width,
            max: center + half_width,
        }
    }

    pub fn contains(&self, v: Real) -> bool {
        v >= self.min && v <= self.max
    }

    pub fn clamp(&self, v: Real) -> Real {
        v.clamp(self.min, self.max)
    }

    pub fn width(&self) -> Real {
        self.max - self.min
    }

    /// Band widened by `margin` on both sides.
    pub fn widened(&self, margin: Real) -> Self {
        Self {
            min: self.min - margin,
            max: self.max + margin,
        }
    }
}
