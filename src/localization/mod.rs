//! Tracking wheel localization.
//!
//! [`two_wheel::TwoWheelLocalizer`] turns two encoder channels and a heading
//! sensor into distances and rates; [`tracker::PoseTracker`] integrates them
//! into a global pose through [`solver::TrackingWheelSolver`].

pub mod config;
pub mod encoder;
pub mod heading;
pub mod solver;
pub mod tracker;
pub mod two_wheel;
