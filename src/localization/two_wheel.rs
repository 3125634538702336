//! Two tracking wheels plus an external heading sensor.
//!
//! ```text
//!        (forward, +x)
//!    /--------------\
//!    |     ____     |
//!    |     ----     |    <- perpendicular wheel
//!    |           || |
//!    |           || |    <- parallel wheel
//!    |              |
//!    \--------------/
//!    <---- (+y) ----
//! ```

use log::debug;

use super::config::TrackingConfig;
use super::encoder::TickSource;
use super::heading::HeadingSource;
use super::tracker::{PoseTracker, WheelMeasurements};
use crate::common::error::Result;
use crate::common::geometry::Pose2d;
use crate::common::units::EncoderUnits;

/// Converts two encoder channels and a heading sensor into the measurements
/// a [`PoseTracker`] consumes.
///
/// Holds no state besides its configuration: every query is a fresh read of
/// the sensors.
///
/// # Examples
///
/// ```rust
/// use deadwheel::localization::config::TrackingConfig;
/// use deadwheel::localization::encoder::{Direction, TickSource};
/// use deadwheel::localization::heading::HeadingCallbacks;
/// use deadwheel::localization::two_wheel::TwoWheelLocalizer;
///
/// struct Channel { ticks: i32, sign: i32 }
///
/// impl TickSource for Channel {
///     fn position(&mut self) -> i32 { self.sign * self.ticks }
///     fn velocity(&mut self) -> f64 { 0.0 }
///     fn set_direction(&mut self, direction: Direction) { self.sign = direction.multiplier() }
/// }
///
/// let config = TrackingConfig {
///     parallel_direction: Direction::Forward,
///     perpendicular_direction: Direction::Forward,
///     ..TrackingConfig::default()
/// };
/// let mut localizer = TwoWheelLocalizer::new(
///     config,
///     Channel { ticks: 8192, sign: 1 },
///     Channel { ticks: 0, sign: 1 },
///     HeadingCallbacks::new(|| 0.0, || None),
/// )
/// .unwrap();
///
/// let [parallel, perpendicular] = localizer.wheel_positions();
/// assert!((parallel - 2.0 * std::f64::consts::PI).abs() < 1e-9);
/// assert_eq!(perpendicular, 0.0);
/// ```
#[derive(Debug)]
pub struct TwoWheelLocalizer<P, Q, H> {
    config: TrackingConfig,
    units: EncoderUnits,
    parallel_encoder: P,
    perpendicular_encoder: Q,
    heading_source: H,
}

impl<P, Q, H> TwoWheelLocalizer<P, Q, H>
where
    P: TickSource,
    Q: TickSource,
    H: HeadingSource,
{
    /// Validates `config` and applies each channel's direction.
    ///
    /// # Errors
    ///
    /// Returns a [`LocalizerError`](crate::common::error::LocalizerError) for
    /// non-positive constants or a wheel layout that cannot be solved.
    pub fn new(
        config: TrackingConfig,
        mut parallel_encoder: P,
        mut perpendicular_encoder: Q,
        heading_source: H,
    ) -> Result<Self> {
        let units = config.validate()?;
        parallel_encoder.set_direction(config.parallel_direction);
        perpendicular_encoder.set_direction(config.perpendicular_direction);

        debug!(
            "two-wheel localizer: parallel {:?}, perpendicular {:?}, {:.4} per tick",
            config.parallel,
            config.perpendicular,
            units.ticks_to_distance(1.0)
        );

        Ok(Self {
            config,
            units,
            parallel_encoder,
            perpendicular_encoder,
            heading_source,
        })
    }

    pub fn config(&self) -> &TrackingConfig {
        &self.config
    }

    pub fn units(&self) -> &EncoderUnits {
        &self.units
    }

    /// Parallel then perpendicular.
    pub fn wheel_poses(&self) -> [Pose2d; 2] {
        self.config.wheel_poses()
    }

    /// Distance travelled by each wheel: `[parallel, perpendicular]`.
    pub fn wheel_positions(&mut self) -> [f64; 2] {
        [
            self.units
                .ticks_to_distance(f64::from(self.parallel_encoder.position())),
            self.units
                .ticks_to_distance(f64::from(self.perpendicular_encoder.position())),
        ]
    }

    /// Speed of each wheel: `[parallel, perpendicular]`.
    pub fn wheel_velocities(&mut self) -> [f64; 2] {
        [
            self.units
                .ticks_to_distance(self.parallel_encoder.velocity()),
            self.units
                .ticks_to_distance(self.perpendicular_encoder.velocity()),
        ]
    }

    pub fn heading(&mut self) -> f64 {
        self.heading_source.heading()
    }

    /// `None` when the heading sensor has no rate to offer.
    pub fn heading_velocity(&mut self) -> Option<f64> {
        self.heading_source.heading_velocity()
    }

    /// Wraps the localizer in a [`PoseTracker`] using its own wheel layout.
    pub fn into_tracker(self) -> Result<PoseTracker<Self, 2>> {
        let wheel_poses = self.wheel_poses();
        PoseTracker::new(self, &wheel_poses)
    }

    pub fn into_parts(self) -> (P, Q, H) {
        (
            self.parallel_encoder,
            self.perpendicular_encoder,
            self.heading_source,
        )
    }
}

impl<P, Q, H> WheelMeasurements<2> for TwoWheelLocalizer<P, Q, H>
where
    P: TickSource,
    Q: TickSource,
    H: HeadingSource,
{
    fn wheel_positions(&mut self) -> [f64; 2] {
        TwoWheelLocalizer::wheel_positions(self)
    }

    fn wheel_velocities(&mut self) -> [f64; 2] {
        TwoWheelLocalizer::wheel_velocities(self)
    }

    fn heading(&mut self) -> f64 {
        TwoWheelLocalizer::heading(self)
    }

    fn heading_velocity(&mut self) -> Option<f64> {
        TwoWheelLocalizer::heading_velocity(self)
    }
}
