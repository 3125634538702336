//! Linear solve from tracking wheel measurements to robot-frame motion.
//!
//! A wheel at `(x, y)` rolling along heading `h` measures the component of
//! the contact point's motion along its rolling direction:
//!
//! ```text
//! d = cos(h) * dx + sin(h) * dy + (x * sin(h) - y * cos(h)) * dθ
//! ```
//!
//! One such row per wheel, plus the row `dθ = heading delta` from the
//! external heading sensor, gives a square system for `(dx, dy, dθ)`.

use log::debug;
use nalgebra::{Matrix3, Vector3};

use super::config::check_wheel_poses;
use crate::common::error::{LocalizerError, Result};
use crate::common::geometry::Pose2d;

/// Unknowns of a planar twist: forward, strafe, heading.
const DOF: usize = 3;

/// Layouts whose measurement matrix has a smaller determinant are rejected.
const SINGULARITY_THRESHOLD: f64 = 1e-11;

/// Solver for `N` heading-aided tracking wheels.
///
/// The system matrix depends only on wheel placement, so it is inverted once
/// at construction and every [`solve`](Self::solve) is a matrix-vector product.
///
/// # Examples
///
/// ```rust
/// use deadwheel::common::geometry::Pose2d;
/// use deadwheel::localization::solver::TrackingWheelSolver;
///
/// let solver = TrackingWheelSolver::new(&[
///     Pose2d::from_degrees(0.0, 2.0, 0.0),
///     Pose2d::from_degrees(-3.0, 0.0, 90.0),
/// ])
/// .unwrap();
///
/// let delta = solver.solve(&[1.0, 0.0], 0.0);
/// assert!((delta.x - 1.0).abs() < 1e-12);
/// ```
#[derive(Clone, Debug)]
pub struct TrackingWheelSolver<const N: usize> {
    wheel_poses: [Pose2d; N],
    inverse: Matrix3<f64>,
}

impl<const N: usize> TrackingWheelSolver<N> {
    /// Builds and inverts the measurement system.
    ///
    /// # Errors
    ///
    /// * [`LocalizerError::RowCount`] if `N` wheels plus the heading row do not make three rows.
    /// * [`LocalizerError::NonFiniteWheelPose`] or [`LocalizerError::ParallelWheels`] for a bad layout.
    /// * [`LocalizerError::Singular`] if the layout cannot resolve all three unknowns.
    pub fn new(wheel_poses: &[Pose2d; N]) -> Result<Self> {
        if N + 1 != DOF {
            return Err(LocalizerError::RowCount {
                expected: DOF,
                found: N + 1,
            });
        }
        check_wheel_poses(wheel_poses)?;

        let matrix = measurement_matrix(wheel_poses);
        let determinant = matrix.determinant();
        if determinant.abs() < SINGULARITY_THRESHOLD {
            return Err(LocalizerError::Singular);
        }
        let Some(inverse) = matrix.try_inverse() else {
            return Err(LocalizerError::Singular);
        };
        debug!(
            "tracking wheel solver ready for {} wheels, det = {:.6}",
            N, determinant
        );

        Ok(Self {
            wheel_poses: *wheel_poses,
            inverse,
        })
    }

    pub fn wheel_poses(&self) -> &[Pose2d; N] {
        &self.wheel_poses
    }

    /// Solves for the robot-frame motion.
    ///
    /// Works for displacements (wheel deltas and heading delta) and for
    /// velocities (wheel speeds and heading rate) alike.
    ///
    /// # Arguments
    ///
    /// * `wheel_measurements` - One value per wheel, in constructor order.
    /// * `heading_measurement` - Heading delta or heading rate.
    ///
    /// # Returns
    ///
    /// The robot-frame `(forward, strafe, heading)` triple.
    pub fn solve(&self, wheel_measurements: &[f64; N], heading_measurement: f64) -> Pose2d {
        // N + 1 == DOF holds for every constructed solver.
        let mut rhs = Vector3::zeros();
        for (row, measurement) in wheel_measurements.iter().enumerate() {
            rhs[row] = *measurement;
        }
        rhs[N] = heading_measurement;

        let twist = self.inverse * rhs;
        Pose2d::new(twist.x, twist.y, twist.z)
    }
}

/// One row per wheel, then the heading row. Expects two wheels.
fn measurement_matrix(wheel_poses: &[Pose2d]) -> Matrix3<f64> {
    let mut matrix = Matrix3::zeros();
    for (row, pose) in wheel_poses.iter().enumerate().take(DOF - 1) {
        let (cos, sin) = pose.heading_vec();
        matrix[(row, 0)] = cos;
        matrix[(row, 1)] = sin;
        matrix[(row, 2)] = pose.x * sin - pose.y * cos;
    }
    matrix[(DOF - 1, 2)] = 1.0;
    matrix
}
