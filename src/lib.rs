//! # deadwheel
//!
//! `deadwheel` is a Rust crate for dead-reckoning localization of mobile robots from two unpowered
//! tracking wheels and an external heading sensor. It converts encoder ticks into wheel travel, solves
//! the fixed linear relationship between wheel motion and robot-frame motion, and integrates the result
//! into a global pose estimate.
//!
//! ## Modules
//!
//! `deadwheel` is organized into several modules, each serving a specific purpose:
//!
//! - [Pose2d](common/geometry/struct.Pose2d.html): A planar pose, used for wheel placement, robot-frame
//!   motion and the global estimate.
//!
//! - [EncoderUnits](common/units/struct.EncoderUnits.html): Validated tick-to-distance conversion.
//!
//! - [TrackingConfig](localization/config/struct.TrackingConfig.html): Wheel layout and encoder constants.
//!
//! - [Encoder](localization/encoder/struct.Encoder.html): Direction-aware encoder adapter with optional
//!   velocity overflow correction.
//!
//! - [TwoWheelLocalizer](localization/two_wheel/struct.TwoWheelLocalizer.html): Supplies converted wheel
//!   measurements and heading in a fixed order.
//!
//! - [TrackingWheelSolver](localization/solver/struct.TrackingWheelSolver.html): Robot-frame motion from
//!   wheel measurements.
//!
//! - [PoseTracker](localization/tracker/struct.PoseTracker.html): Integrates robot-frame motion into a
//!   global pose.
//!
//! ## Usage
//!
//! To use the `deadwheel` crate in your project, add the following line to your `Cargo.toml` file:
//!
//! ```toml
//! [dependencies]
//! deadwheel = "0.1.0"
//! ```
//!
//! ## Example
//!
//! ```rust
//! use deadwheel::common::geometry::Pose2d;
//! use deadwheel::localization::config::TrackingConfig;
//! use deadwheel::localization::encoder::{Direction, TickSource};
//! use deadwheel::localization::heading::HeadingCallbacks;
//! use deadwheel::localization::two_wheel::TwoWheelLocalizer;
//!
//! // A channel that always reads the same tick count.
//! struct Fixed(i32, i32);
//!
//! impl TickSource for Fixed {
//!     fn position(&mut self) -> i32 { self.0 * self.1 }
//!     fn velocity(&mut self) -> f64 { 0.0 }
//!     fn set_direction(&mut self, direction: Direction) { self.1 = direction.multiplier() }
//! }
//!
//! let config = TrackingConfig {
//!     parallel: Pose2d::from_degrees(0.0, 3.0, 0.0),
//!     perpendicular: Pose2d::from_degrees(-2.0, 0.0, 90.0),
//!     parallel_direction: Direction::Forward,
//!     perpendicular_direction: Direction::Forward,
//!     ..TrackingConfig::default()
//! };
//!
//! let localizer = TwoWheelLocalizer::new(
//!     config,
//!     Fixed(0, 1),
//!     Fixed(0, 1),
//!     HeadingCallbacks::new(|| 0.0, || Some(0.0)),
//! )
//! .unwrap();
//!
//! // Create a tracker and poll it once per control cycle
//! let mut tracker = localizer.into_tracker().unwrap();
//! let delta = tracker.update(0.01);
//!
//! assert_eq!(delta.displacement, Pose2d::zero());
//! assert_eq!(tracker.pose_estimate(), Pose2d::zero());
//! ```
//!
//! ## Logging
//!
//! The crate reports through the [`log`](https://docs.rs/log) facade and installs no logger of its own.
//!
//! ## License
//!
//! This project is licensed under the [MIT License](LICENSE).

pub mod common;
pub mod localization;
