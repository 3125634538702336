use std::f64::consts::{PI, TAU};

use serde::{Deserialize, Serialize};

/// Heading deltas smaller than this are integrated with the series expansion.
const EPSILON: f64 = 1e-6;

/// A planar pose: position plus heading in radians.
///
/// Used for three things: the placement of a tracking wheel in the robot frame,
/// a robot-frame displacement or twist, and the global pose estimate.
///
/// # Examples
///
/// ```rust
/// use deadwheel::common::geometry::Pose2d;
///
/// let wheel = Pose2d::from_degrees(5.0, 5.0, -45.0);
/// assert!((wheel.heading + std::f64::consts::FRAC_PI_4).abs() < 1e-12);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose2d {
    /// Forward coordinate.
    pub x: f64,
    /// Strafe coordinate.
    pub y: f64,
    /// Heading in radians, counter-clockwise positive.
    pub heading: f64,
}

impl Pose2d {
    pub const fn new(x: f64, y: f64, heading: f64) -> Self {
        Self { x, y, heading }
    }

    /// Creates a pose whose heading is given in degrees.
    pub fn from_degrees(x: f64, y: f64, heading_deg: f64) -> Self {
        Self::new(x, y, heading_deg.to_radians())
    }

    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Unit vector pointing along `heading`.
    pub fn heading_vec(&self) -> (f64, f64) {
        (self.heading.cos(), self.heading.sin())
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.heading.is_finite()
    }
}

/// Wraps an angle into `[0, 2π)`.
///
/// # Examples
///
/// ```rust
/// use deadwheel::common::geometry::norm_angle;
///
/// assert!((norm_angle(-std::f64::consts::FRAC_PI_2) - 1.5 * std::f64::consts::PI).abs() < 1e-12);
/// ```
pub fn norm_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Wraps an angle difference into `(-π, π]`.
pub fn norm_delta(delta: f64) -> f64 {
    let wrapped = norm_angle(delta);
    if wrapped > PI {
        wrapped - TAU
    } else {
        wrapped
    }
}

/// Rotates a vector counter-clockwise by `angle` radians.
pub fn rotate(x: f64, y: f64, angle: f64) -> (f64, f64) {
    let (sin, cos) = angle.sin_cos();
    (x * cos - y * sin, x * sin + y * cos)
}

/// Advances a field-frame pose by a robot-frame displacement.
///
/// The robot is assumed to move along a constant-curvature arc during the
/// step, which is exact for a constant twist. Small heading changes use the
/// series expansion of `sin(θ)/θ` and `(1 - cos(θ))/θ`.
///
/// # Arguments
///
/// * `field_pose` - The pose before the step, in the field frame.
/// * `robot_delta` - The displacement measured in the robot frame at the start of the step.
///
/// # Returns
///
/// The pose after the step with its heading wrapped into `[0, 2π)`.
///
/// # Examples
///
/// ```rust
/// use deadwheel::common::geometry::{relative_odometry_update, Pose2d};
///
/// let start = Pose2d::zero();
/// let moved = relative_odometry_update(start, Pose2d::new(10.0, 0.0, 0.0));
/// assert!((moved.x - 10.0).abs() < 1e-12);
/// ```
pub fn relative_odometry_update(field_pose: Pose2d, robot_delta: Pose2d) -> Pose2d {
    let dtheta = robot_delta.heading;
    let (sine_term, cos_term) = if dtheta.abs() < EPSILON {
        (1.0 - dtheta * dtheta / 6.0, dtheta / 2.0)
    } else {
        (dtheta.sin() / dtheta, (1.0 - dtheta.cos()) / dtheta)
    };

    let arc_x = sine_term * robot_delta.x - cos_term * robot_delta.y;
    let arc_y = cos_term * robot_delta.x + sine_term * robot_delta.y;
    let (dx, dy) = rotate(arc_x, arc_y, field_pose.heading);

    Pose2d::new(
        field_pose.x + dx,
        field_pose.y + dy,
        norm_angle(field_pose.heading + dtheta),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_rotate_quarter_turn() {
        let (x, y) = rotate(1.0, 3.0, FRAC_PI_2);
        assert_abs_diff_eq!(x, -3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_norm_angle_range() {
        assert_abs_diff_eq!(norm_angle(TAU + 0.5), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(norm_angle(-0.5), TAU - 0.5, epsilon = 1e-12);
        assert_eq!(norm_angle(0.0), 0.0);
        assert!(norm_angle(-1e-18) < TAU);
    }

    #[test]
    fn test_norm_delta_takes_short_way_round() {
        assert_abs_diff_eq!(norm_delta(0.1 - (TAU - 0.1)), 0.2, epsilon = 1e-12);
        assert_abs_diff_eq!(norm_delta(-0.2), -0.2, epsilon = 1e-12);
        assert_abs_diff_eq!(norm_delta(PI), PI, epsilon = 1e-12);
    }

    #[test]
    fn test_straight_line_update() {
        let start = Pose2d::new(1.0, 2.0, FRAC_PI_2);
        let end = relative_odometry_update(start, Pose2d::new(3.0, 0.0, 0.0));

        assert_abs_diff_eq!(end.x, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(end.y, 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(end.heading, FRAC_PI_2, epsilon = 1e-12);
    }

    #[test]
    fn test_quarter_arc_update() {
        // Quarter circle of unit radius turning left.
        let delta = Pose2d::new(FRAC_PI_2, 0.0, FRAC_PI_2);
        let end = relative_odometry_update(Pose2d::zero(), delta);

        assert_abs_diff_eq!(end.x, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(end.y, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(end.heading, FRAC_PI_2, epsilon = 1e-12);
    }

    #[test]
    fn test_small_heading_series_matches_closed_form() {
        let dtheta = 5e-7;
        let delta = Pose2d::new(2.0, 1.0, dtheta);
        let end = relative_odometry_update(Pose2d::zero(), delta);

        let expected_x = dtheta.sin() / dtheta * 2.0 - (1.0 - dtheta.cos()) / dtheta * 1.0;
        let expected_y = (1.0 - dtheta.cos()) / dtheta * 2.0 + dtheta.sin() / dtheta * 1.0;
        assert_abs_diff_eq!(end.x, expected_x, epsilon = 1e-9);
        assert_abs_diff_eq!(end.y, expected_y, epsilon = 1e-9);
    }

    #[test]
    fn test_heading_wraps_after_update() {
        let start = Pose2d::new(0.0, 0.0, TAU - 0.1);
        let end = relative_odometry_update(start, Pose2d::new(0.0, 0.0, 0.3));
        assert_abs_diff_eq!(end.heading, 0.2, epsilon = 1e-12);
    }
}
