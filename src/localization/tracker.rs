//! Global pose tracking from heading-aided tracking wheels.

use log::{debug, trace, warn};

use super::solver::TrackingWheelSolver;
use crate::common::error::Result;
use crate::common::geometry::{norm_angle, norm_delta, relative_odometry_update, Pose2d};

/// Measurements a [`PoseTracker`] polls once per update.
///
/// Implementors return values in a fixed wheel order that matches the wheel
/// poses the tracker was built with.
pub trait WheelMeasurements<const N: usize> {
    /// Cumulative wheel travel, in distance units.
    fn wheel_positions(&mut self) -> [f64; N];

    /// Wheel speeds, in distance units per second.
    fn wheel_velocities(&mut self) -> [f64; N];

    /// Heading in radians.
    fn heading(&mut self) -> f64;

    /// Heading rate in radians per second, if available.
    fn heading_velocity(&mut self) -> Option<f64>;
}

/// Result of one [`PoseTracker::update`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PoseDelta {
    /// Robot-frame displacement since the previous update.
    pub displacement: Pose2d,
    /// Robot-frame velocity, when a heading rate could be obtained.
    pub velocity: Option<Pose2d>,
}

/// Dead-reckoning tracker.
///
/// Each update differences the wheel positions and heading against the
/// previous update, solves for the robot-frame displacement and integrates it
/// into the global pose along a constant-curvature arc.
///
/// # Examples
///
/// ```rust
/// use deadwheel::common::geometry::Pose2d;
/// use deadwheel::localization::tracker::{PoseTracker, WheelMeasurements};
///
/// struct Rig { forward: f64 }
///
/// impl WheelMeasurements<2> for Rig {
///     fn wheel_positions(&mut self) -> [f64; 2] { [self.forward, 0.0] }
///     fn wheel_velocities(&mut self) -> [f64; 2] { [0.0, 0.0] }
///     fn heading(&mut self) -> f64 { 0.0 }
///     fn heading_velocity(&mut self) -> Option<f64> { Some(0.0) }
/// }
///
/// let wheels = [Pose2d::from_degrees(0.0, 2.0, 0.0), Pose2d::from_degrees(-3.0, 0.0, 90.0)];
/// let mut tracker = PoseTracker::new(Rig { forward: 0.0 }, &wheels).unwrap();
///
/// tracker.update(0.01);
/// tracker.source_mut().forward = 12.0;
/// tracker.update(0.01);
///
/// assert!((tracker.pose_estimate().x - 12.0).abs() < 1e-9);
/// ```
#[derive(Debug)]
pub struct PoseTracker<S, const N: usize> {
    source: S,
    solver: TrackingWheelSolver<N>,
    pose_estimate: Pose2d,
    pose_velocity: Option<Pose2d>,
    last_wheel_positions: Option<[f64; N]>,
    last_heading: Option<f64>,
}

impl<S: WheelMeasurements<N>, const N: usize> PoseTracker<S, N> {
    /// Creates a tracker at the origin.
    ///
    /// # Errors
    ///
    /// Fails if the wheel layout cannot support full localization; see
    /// [`TrackingWheelSolver::new`].
    pub fn new(source: S, wheel_poses: &[Pose2d; N]) -> Result<Self> {
        Ok(Self::with_solver(source, TrackingWheelSolver::new(wheel_poses)?))
    }

    pub fn with_solver(source: S, solver: TrackingWheelSolver<N>) -> Self {
        Self {
            source,
            solver,
            pose_estimate: Pose2d::zero(),
            pose_velocity: None,
            last_wheel_positions: None,
            last_heading: None,
        }
    }

    pub fn pose_estimate(&self) -> Pose2d {
        self.pose_estimate
    }

    /// Overrides the global pose.
    ///
    /// Previous samples are discarded, so the next update only re-seeds and
    /// reports no displacement.
    pub fn set_pose_estimate(&mut self, pose: Pose2d) {
        self.pose_estimate = pose;
        self.last_wheel_positions = None;
        self.last_heading = None;
    }

    /// Robot-frame velocity from the most recent update that could compute one.
    pub fn pose_velocity(&self) -> Option<Pose2d> {
        self.pose_velocity
    }

    pub fn solver(&self) -> &TrackingWheelSolver<N> {
        &self.solver
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn into_source(self) -> S {
        self.source
    }

    /// Polls the measurements and advances the pose estimate.
    ///
    /// # Arguments
    ///
    /// * `dt` - Seconds since the previous update. Only used to differentiate
    ///   the heading when the sensor reports no heading rate.
    ///
    /// # Returns
    ///
    /// The robot-frame displacement (zero on the first update after a reset)
    /// and velocity.
    pub fn update(&mut self, dt: f64) -> PoseDelta {
        let wheel_positions = self.source.wheel_positions();
        let heading = norm_angle(self.source.heading());

        let mut displacement = Pose2d::zero();
        let mut heading_delta = None;
        if let (Some(last_positions), Some(last_heading)) =
            (self.last_wheel_positions, self.last_heading)
        {
            let mut wheel_deltas = [0.0; N];
            for (delta, (now, before)) in wheel_deltas
                .iter_mut()
                .zip(wheel_positions.iter().zip(last_positions.iter()))
            {
                *delta = now - before;
            }
            let dtheta = norm_delta(heading - last_heading);
            displacement = self.solver.solve(&wheel_deltas, dtheta);
            self.pose_estimate = relative_odometry_update(self.pose_estimate, displacement);
            heading_delta = Some(dtheta);
        }

        let wheel_velocities = self.source.wheel_velocities();
        let heading_velocity = match self.source.heading_velocity() {
            Some(rate) => Some(rate),
            None => match (heading_delta, dt > 0.0) {
                (Some(dtheta), true) => {
                    debug!("heading rate unavailable, differentiating heading over {dt}s");
                    Some(dtheta / dt)
                }
                (Some(_), false) => {
                    warn!("heading rate unavailable and dt = {dt} is not positive, velocity not updated");
                    None
                }
                (None, _) => {
                    debug!("heading rate unavailable and no previous heading yet, velocity not updated");
                    None
                }
            },
        };

        let velocity = heading_velocity.map(|rate| self.solver.solve(&wheel_velocities, rate));
        if velocity.is_some() {
            self.pose_velocity = velocity;
        }

        self.last_wheel_positions = Some(wheel_positions);
        self.last_heading = Some(heading);

        trace!(
            "pose ({:.4}, {:.4}, {:.4}) after displacement ({:.4}, {:.4}, {:.4})",
            self.pose_estimate.x,
            self.pose_estimate.y,
            self.pose_estimate.heading,
            displacement.x,
            displacement.y,
            displacement.heading
        );

        PoseDelta {
            displacement,
            velocity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::{FRAC_PI_2, TAU};

    /// Standard layout: d_par = dx - 2 dθ, d_perp = dy - 3 dθ.
    const WHEELS: [Pose2d; 2] = [
        Pose2d::new(0.0, 2.0, 0.0),
        Pose2d::new(-3.0, 0.0, FRAC_PI_2),
    ];

    #[derive(Default)]
    struct Rig {
        positions: [f64; 2],
        velocities: [f64; 2],
        heading: f64,
        heading_velocity: Option<f64>,
    }

    impl WheelMeasurements<2> for Rig {
        fn wheel_positions(&mut self) -> [f64; 2] {
            self.positions
        }

        fn wheel_velocities(&mut self) -> [f64; 2] {
            self.velocities
        }

        fn heading(&mut self) -> f64 {
            self.heading
        }

        fn heading_velocity(&mut self) -> Option<f64> {
            self.heading_velocity
        }
    }

    fn tracker() -> PoseTracker<Rig, 2> {
        PoseTracker::new(Rig::default(), &WHEELS).unwrap()
    }

    #[test]
    fn test_first_update_only_seeds() {
        let mut tracker = tracker();
        tracker.source_mut().positions = [100.0, -40.0];
        tracker.source_mut().heading = 1.0;

        let delta = tracker.update(0.01);

        assert_eq!(delta.displacement, Pose2d::zero());
        assert_eq!(tracker.pose_estimate(), Pose2d::zero());
    }

    #[test]
    fn test_forward_then_turned_forward() {
        let mut tracker = tracker();
        tracker.update(0.01);

        tracker.source_mut().positions = [10.0, 0.0];
        tracker.update(0.01);
        assert_abs_diff_eq!(tracker.pose_estimate().x, 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(tracker.pose_estimate().y, 0.0, epsilon = 1e-9);

        // Re-seed facing +y and drive forward again.
        tracker.set_pose_estimate(Pose2d::new(10.0, 0.0, FRAC_PI_2));
        tracker.source_mut().heading = FRAC_PI_2;
        tracker.update(0.01);
        tracker.source_mut().positions = [15.0, 0.0];
        tracker.update(0.01);

        let pose = tracker.pose_estimate();
        assert_abs_diff_eq!(pose.x, 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(pose.y, 5.0, epsilon = 1e-9);
        assert_abs_diff_eq!(pose.heading, FRAC_PI_2, epsilon = 1e-12);
    }

    #[test]
    fn test_turn_in_place_is_not_mistaken_for_translation() {
        let mut tracker = tracker();
        tracker.update(0.01);

        let dtheta = 0.3;
        tracker.source_mut().positions = [-2.0 * dtheta, -3.0 * dtheta];
        tracker.source_mut().heading = dtheta;
        let delta = tracker.update(0.01);

        assert_abs_diff_eq!(delta.displacement.x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(delta.displacement.y, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(delta.displacement.heading, dtheta, epsilon = 1e-12);
        assert_abs_diff_eq!(tracker.pose_estimate().heading, dtheta, epsilon = 1e-12);
    }

    #[test]
    fn test_heading_delta_wraps_across_zero() {
        let mut tracker = tracker();
        tracker.source_mut().heading = TAU - 0.05;
        tracker.update(0.01);

        tracker.source_mut().heading = 0.05;
        tracker.source_mut().positions = [-2.0 * 0.1, -3.0 * 0.1];
        let delta = tracker.update(0.01);

        assert_abs_diff_eq!(delta.displacement.heading, 0.1, epsilon = 1e-9);
        assert_abs_diff_eq!(delta.displacement.x, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_velocity_uses_sensor_rate() {
        let mut tracker = tracker();
        tracker.source_mut().velocities = [3.0, 1.0];
        tracker.source_mut().heading_velocity = Some(0.5);

        let delta = tracker.update(0.01);
        let velocity = delta.velocity.unwrap();

        assert_abs_diff_eq!(velocity.x, 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(velocity.y, 2.5, epsilon = 1e-12);
        assert_abs_diff_eq!(velocity.heading, 0.5, epsilon = 1e-12);
        assert_eq!(tracker.pose_velocity(), Some(velocity));
    }

    #[test]
    fn test_zero_rate_is_a_real_reading() {
        let mut tracker = tracker();
        tracker.source_mut().heading_velocity = Some(0.0);
        tracker.update(0.01);
        tracker.source_mut().heading = 0.2;

        let delta = tracker.update(0.1);
        assert_eq!(delta.velocity.map(|v| v.heading), Some(0.0));
    }

    #[test]
    fn test_missing_rate_on_first_update_yields_no_velocity() {
        let mut tracker = tracker();
        tracker.source_mut().velocities = [3.0, 1.0];

        let delta = tracker.update(0.01);

        assert_eq!(delta.velocity, None);
        assert_eq!(tracker.pose_velocity(), None);
    }

    #[test]
    fn test_missing_rate_falls_back_to_differentiated_heading() {
        let mut tracker = tracker();
        tracker.update(0.1);

        tracker.source_mut().heading = 0.05;
        let delta = tracker.update(0.1);

        assert_abs_diff_eq!(delta.velocity.unwrap().heading, 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_missing_rate_with_non_positive_dt_yields_no_velocity() {
        let mut tracker = tracker();
        tracker.source_mut().velocities = [3.0, 1.0];
        tracker.update(0.01);

        tracker.source_mut().heading = 0.05;
        let delta = tracker.update(0.0);

        assert_eq!(delta.velocity, None);
        assert_eq!(tracker.pose_velocity(), None);
        assert_abs_diff_eq!(tracker.pose_estimate().heading, 0.05, epsilon = 1e-12);
    }

    #[test]
    fn test_missing_rate_keeps_previous_velocity() {
        let mut tracker = tracker();
        tracker.source_mut().heading_velocity = Some(0.25);
        tracker.update(0.01);
        let previous = tracker.pose_velocity();

        tracker.source_mut().heading_velocity = None;
        tracker.set_pose_estimate(Pose2d::zero());
        let delta = tracker.update(0.01);

        assert_eq!(delta.velocity, None);
        assert_eq!(tracker.pose_velocity(), previous);
    }
}
