//! Tracking wheel layout and encoder constants.

use serde::{Deserialize, Serialize};

use super::encoder::Direction;
use crate::common::error::{LocalizerError, Result};
use crate::common::geometry::Pose2d;
use crate::common::units::EncoderUnits;

/// Orientation vectors whose cross product is below this are treated as parallel.
pub(crate) const PARALLEL_TOLERANCE: f64 = 1e-9;

/// Geometry and encoder constants for a two-wheel tracking layout.
///
/// Wheel poses are given in the robot frame relative to the tracking centre:
/// `x` forward, `y` to the left, heading along the wheel's rolling direction.
///
/// # Examples
///
/// ```rust
/// use deadwheel::common::geometry::Pose2d;
/// use deadwheel::localization::config::TrackingConfig;
///
/// let config = TrackingConfig {
///     parallel: Pose2d::from_degrees(0.0, 3.0, 0.0),
///     perpendicular: Pose2d::from_degrees(-2.0, 0.0, 90.0),
///     ..TrackingConfig::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Tracking wheel radius. Sets the distance unit of every output.
    pub wheel_radius: f64,
    /// Wheel revolutions per encoder revolution.
    pub gear_ratio: f64,
    /// Encoder ticks per encoder revolution.
    pub ticks_per_rev: f64,
    /// Pose of the forward-rolling wheel.
    pub parallel: Pose2d,
    /// Pose of the strafe-rolling wheel.
    pub perpendicular: Pose2d,
    pub parallel_direction: Direction,
    pub perpendicular_direction: Direction,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            wheel_radius: 1.0,
            gear_ratio: 1.0,
            // REV Through Bore encoder
            ticks_per_rev: 8192.0,
            parallel: Pose2d::from_degrees(5.0, 5.0, -45.0),
            perpendicular: Pose2d::from_degrees(-5.0, 5.0, 45.0),
            parallel_direction: Direction::Reverse,
            perpendicular_direction: Direction::Reverse,
        }
    }
}

impl TrackingConfig {
    /// Wheel poses in solver order: parallel first, perpendicular second.
    pub fn wheel_poses(&self) -> [Pose2d; 2] {
        [self.parallel, self.perpendicular]
    }

    /// Channel directions in the same order as [`wheel_poses`](Self::wheel_poses).
    pub fn directions(&self) -> [Direction; 2] {
        [self.parallel_direction, self.perpendicular_direction]
    }

    /// Checks every invariant of the layout.
    ///
    /// # Returns
    ///
    /// The validated conversion constants.
    ///
    /// # Errors
    ///
    /// Returns a [`LocalizerError`] for non-positive or non-finite constants,
    /// non-finite wheel poses, or wheels that roll along parallel axes.
    pub fn validate(&self) -> Result<EncoderUnits> {
        let units = EncoderUnits::new(self.wheel_radius, self.gear_ratio, self.ticks_per_rev)?;
        check_wheel_poses(&self.wheel_poses())?;
        Ok(units)
    }
}

/// Rejects non-finite poses and any pair of wheels with parallel rolling axes.
pub(crate) fn check_wheel_poses(poses: &[Pose2d]) -> Result<()> {
    if let Some(index) = poses.iter().position(|pose| !pose.is_finite()) {
        return Err(LocalizerError::NonFiniteWheelPose { index });
    }

    for (first, a) in poses.iter().enumerate() {
        for (offset, b) in poses[first + 1..].iter().enumerate() {
            let (ax, ay) = a.heading_vec();
            let (bx, by) = b.heading_vec();
            if (ax * by - ay * bx).abs() < PARALLEL_TOLERANCE {
                return Err(LocalizerError::ParallelWheels {
                    first,
                    second: first + 1 + offset,
                });
            }
        }
    }
    Ok(())
}
