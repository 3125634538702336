use std::f64::consts::PI;

use super::error::{LocalizerError, Result};

/// Converts encoder ticks into linear distance travelled at the wheel rim.
///
/// The scale is linear, so the same function converts positions (ticks) and
/// velocities (ticks per second).
///
/// # Arguments
///
/// * `ticks` - Encoder ticks, or ticks per unit time.
/// * `wheel_radius` - Tracking wheel radius.
/// * `gear_ratio` - Wheel revolutions per encoder revolution.
/// * `ticks_per_rev` - Encoder ticks per encoder revolution.
///
/// # Returns
///
/// The distance (or speed) in the units of `wheel_radius`.
///
/// # Examples
///
/// ```rust
/// use deadwheel::common::units::ticks_to_distance;
///
/// let one_rev = ticks_to_distance(8192.0, 1.0, 1.0, 8192.0);
/// assert_eq!(one_rev, 2.0 * std::f64::consts::PI);
/// ```
pub fn ticks_to_distance(ticks: f64, wheel_radius: f64, gear_ratio: f64, ticks_per_rev: f64) -> f64 {
    wheel_radius * 2.0 * PI * gear_ratio * ticks / ticks_per_rev
}

/// Validated conversion constants shared by every tracking wheel channel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EncoderUnits {
    wheel_radius: f64,
    gear_ratio: f64,
    ticks_per_rev: f64,
}

impl EncoderUnits {
    /// Creates a new `EncoderUnits` instance.
    ///
    /// # Errors
    ///
    /// Returns a [`LocalizerError`] if any constant is zero, negative or not finite.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use deadwheel::common::units::EncoderUnits;
    ///
    /// assert!(EncoderUnits::new(1.0, 1.0, 0.0).is_err());
    /// ```
    pub fn new(wheel_radius: f64, gear_ratio: f64, ticks_per_rev: f64) -> Result<Self> {
        if !(wheel_radius.is_finite() && wheel_radius > 0.0) {
            return Err(LocalizerError::InvalidWheelRadius(wheel_radius));
        }
        if !(gear_ratio.is_finite() && gear_ratio > 0.0) {
            return Err(LocalizerError::InvalidGearRatio(gear_ratio));
        }
        if !(ticks_per_rev.is_finite() && ticks_per_rev > 0.0) {
            return Err(LocalizerError::InvalidTicksPerRev(ticks_per_rev));
        }
        Ok(Self {
            wheel_radius,
            gear_ratio,
            ticks_per_rev,
        })
    }

    pub fn wheel_radius(&self) -> f64 {
        self.wheel_radius
    }

    pub fn gear_ratio(&self) -> f64 {
        self.gear_ratio
    }

    pub fn ticks_per_rev(&self) -> f64 {
        self.ticks_per_rev
    }

    /// Converts ticks (or ticks per second) with these constants.
    pub fn ticks_to_distance(&self, ticks: f64) -> f64 {
        ticks_to_distance(ticks, self.wheel_radius, self.gear_ratio, self.ticks_per_rev)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_zero_ticks_is_zero_distance() {
        let units = EncoderUnits::new(1.5, 0.75, 2048.0).unwrap();
        assert_eq!(units.ticks_to_distance(0.0), 0.0);
    }

    #[test]
    fn test_conversion_is_odd() {
        let units = EncoderUnits::new(1.5, 0.75, 2048.0).unwrap();
        for ticks in [1.0, 17.0, 2048.0, 123_456.0] {
            assert_eq!(units.ticks_to_distance(-ticks), -units.ticks_to_distance(ticks));
        }
    }

    #[test]
    fn test_conversion_is_linear() {
        let units = EncoderUnits::new(1.5, 0.75, 2048.0).unwrap();
        let sum = units.ticks_to_distance(300.0) + units.ticks_to_distance(700.0);
        assert_abs_diff_eq!(units.ticks_to_distance(1000.0), sum, epsilon = 1e-12);
        assert_abs_diff_eq!(
            units.ticks_to_distance(900.0),
            3.0 * units.ticks_to_distance(300.0),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_one_revolution_is_one_circumference() {
        let units = EncoderUnits::new(1.0, 1.0, 8192.0).unwrap();
        assert_abs_diff_eq!(
            units.ticks_to_distance(8192.0),
            2.0 * PI,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_gear_ratio_scales_distance() {
        let units = EncoderUnits::new(2.0, 0.5, 100.0).unwrap();
        assert_abs_diff_eq!(units.ticks_to_distance(100.0), 2.0 * PI, epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_constants_are_rejected() {
        assert_eq!(
            EncoderUnits::new(0.0, 1.0, 8192.0),
            Err(LocalizerError::InvalidWheelRadius(0.0))
        );
        assert_eq!(
            EncoderUnits::new(-1.0, 1.0, 8192.0),
            Err(LocalizerError::InvalidWheelRadius(-1.0))
        );
        assert_eq!(
            EncoderUnits::new(1.0, 0.0, 8192.0),
            Err(LocalizerError::InvalidGearRatio(0.0))
        );
        assert_eq!(
            EncoderUnits::new(1.0, 1.0, 0.0),
            Err(LocalizerError::InvalidTicksPerRev(0.0))
        );
        assert_eq!(
            EncoderUnits::new(1.0, 1.0, -8192.0),
            Err(LocalizerError::InvalidTicksPerRev(-8192.0))
        );
        assert!(EncoderUnits::new(f64::NAN, 1.0, 8192.0).is_err());
    }
}
