// ali-core/src/units.rs

use uom::si::f64::{Time as UomTime, Volume as UomVolume, VolumeRate as UomVolumeRate};

// Public canonical unit types (SI, f64)
pub type Time = UomTime;
pub type Volume = UomVolume;
pub type VolumeRate = UomVolumeRate;

#[inline]
pub fn ml_per_min(v: f64) -> VolumeRate {
    use uom::si::volume_rate::liter_per_minute;
    VolumeRate::new::<liter_per_minute>(v * 1.0e-3)
}

#[inline]
pub fn hours(v: f64) -> Time {
    use uom::si::time::hour;
    Time::new::<hour>(v)
}

#[inline]
pub fn as_ml(v: Volume) -> f64 {
    use uom::si::volume::milliliter;
    v.get::<milliliter>()
}

#[inline]
pub fn as_ml_per_hour(v: VolumeRate) -> f64 {
    use uom::si::volume_rate::cubic_meter_per_hour;
    v.get::<cubic_meter_per_hour>() * 1.0e6
}

/// Pump flow is specified in mL/min while volumes integrate per hour.
#[inline]
pub fn ml_per_hour_from_ml_per_min(v: f64) -> f64 {
    as_ml_per_hour(ml_per_min(v))
}

/// Volume delivered by a constant flow (mL/min) over `dt_hours`.
#[inline]
pub fn delivered_ml(flow_ml_per_min: f64, dt_hours: f64) -> f64 {
    as_ml(ml_per_min(flow_ml_per_min) * hours(dt_hours))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Tolerances, nearly_equal};

    #[test]
    fn pump_flow_converts_minutes_to_hours() {
        let tol = Tolerances {
            abs: 1e-12,
            rel: 1e-9,
        };
        assert!(nearly_equal(ml_per_hour_from_ml_per_min(0.1), 6.0, tol));
        assert!(nearly_equal(ml_per_hour_from_ml_per_min(1.0), 60.0, tol));
        assert_eq!(ml_per_hour_from_ml_per_min(0.0), 0.0);
    }

    #[test]
    fn delivered_volume_over_half_hour() {
        let tol = Tolerances {
            abs: 1e-12,
            rel: 1e-9,
        };
        // 0.05 mL/min for 30 min
        assert!(nearly_equal(delivered_ml(0.05, 0.5), 1.5, tol));
    }

    #[test]
    fn round_trips_through_uom() {
        let tol = Tolerances::default();
        assert!(nearly_equal(as_ml(ml_per_min(1.5) * hours(1.0 / 60.0)), 1.5, tol));
        assert!(nearly_equal(as_ml_per_hour(ml_per_min(0.5)), 30.0, tol));
    }
}
