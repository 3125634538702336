//! Encoder channels for tracking wheels.
//!
//! The localizer reads every wheel through [`TickSource`]. [`Encoder`] is the
//! stock adapter: it wraps a hardware counter ([`MotorEncoder`]), applies the
//! configured [`Direction`] and can undo the 16-bit overflow some hubs apply to
//! reported velocities.

use std::time::Instant;

use serde::{Deserialize, Serialize};

/// Hubs report velocity as a signed 16-bit value, so it aliases modulo this step.
const CPS_STEP: f64 = 0x10000 as f64;

/// Counting direction of an encoder channel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Forward,
    Reverse,
}

impl Direction {
    pub fn multiplier(self) -> i32 {
        match self {
            Direction::Forward => 1,
            Direction::Reverse => -1,
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            Direction::Forward => Direction::Reverse,
            Direction::Reverse => Direction::Forward,
        }
    }
}

/// A direction-corrected tick counter for one tracking wheel.
pub trait TickSource {
    /// Cumulative signed ticks since the last reset.
    fn position(&mut self) -> i32;

    /// Signed ticks per second, already unwrapped from any counter overflow.
    fn velocity(&mut self) -> f64;

    fn set_direction(&mut self, direction: Direction);
}

impl<T: TickSource + ?Sized> TickSource for &mut T {
    fn position(&mut self) -> i32 {
        (**self).position()
    }

    fn velocity(&mut self) -> f64 {
        (**self).velocity()
    }

    fn set_direction(&mut self, direction: Direction) {
        (**self).set_direction(direction)
    }
}

/// The raw counter on a motor port or encoder input.
pub trait MotorEncoder {
    /// Raw tick count as reported by the hardware.
    fn current_position(&mut self) -> i32;

    /// Raw tick rate; may alias at the 16-bit boundary.
    fn velocity(&mut self) -> f64;

    /// Direction the motor port itself is configured for.
    fn direction(&self) -> Direction {
        Direction::Forward
    }
}

/// Monotonic time source in seconds.
pub trait Clock {
    fn seconds(&self) -> f64;
}

/// [`Clock`] backed by [`Instant`], counting from its creation.
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn seconds(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

/// Which velocity an [`Encoder`] reports through [`TickSource::velocity`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VelocityMode {
    /// Hardware velocity as reported. Fine below 32767 ticks per second.
    #[default]
    Raw,
    /// Hardware velocity unwrapped against finite-difference estimates.
    Corrected,
}

/// Tracking wheel encoder adapter.
///
/// # Examples
///
/// ```rust
/// use deadwheel::localization::encoder::{Direction, Encoder, MotorEncoder, TickSource};
///
/// struct Port(i32);
///
/// impl MotorEncoder for Port {
///     fn current_position(&mut self) -> i32 { self.0 }
///     fn velocity(&mut self) -> f64 { 0.0 }
/// }
///
/// let mut encoder = Encoder::new(Port(100));
/// encoder.set_direction(Direction::Reverse);
/// assert_eq!(encoder.position(), -100);
/// ```
#[derive(Debug)]
pub struct Encoder<M, C = SystemClock> {
    motor: M,
    clock: C,
    direction: Direction,
    velocity_mode: VelocityMode,
    last_position: i32,
    last_update_time: f64,
    velocity_estimates: [f64; 3],
    velocity_estimate_idx: usize,
}

impl<M: MotorEncoder> Encoder<M> {
    pub fn new(motor: M) -> Self {
        Self::with_clock(motor, SystemClock::new())
    }
}

impl<M: MotorEncoder, C: Clock> Encoder<M, C> {
    pub fn with_clock(motor: M, clock: C) -> Self {
        let last_update_time = clock.seconds();
        Self {
            motor,
            clock,
            direction: Direction::Forward,
            velocity_mode: VelocityMode::Raw,
            last_position: 0,
            last_update_time,
            velocity_estimates: [0.0; 3],
            velocity_estimate_idx: 0,
        }
    }

    pub fn with_velocity_mode(mut self, mode: VelocityMode) -> Self {
        self.velocity_mode = mode;
        self
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn velocity_mode(&self) -> VelocityMode {
        self.velocity_mode
    }

    pub fn set_velocity_mode(&mut self, mode: VelocityMode) {
        self.velocity_mode = mode;
    }

    pub fn motor(&self) -> &M {
        &self.motor
    }

    pub fn motor_mut(&mut self) -> &mut M {
        &mut self.motor
    }

    fn multiplier(&self) -> i32 {
        self.direction.multiplier() * self.motor.direction().multiplier()
    }

    /// Direction-corrected position.
    ///
    /// Also feeds the finite-difference estimates used by
    /// [`corrected_velocity`](Self::corrected_velocity), so it should be polled
    /// every control cycle when corrected velocities are wanted.
    pub fn current_position(&mut self) -> i32 {
        let position = self.motor.current_position().wrapping_mul(self.multiplier());
        if position != self.last_position {
            let now = self.clock.seconds();
            let dt = now - self.last_update_time;
            if dt > 0.0 {
                self.velocity_estimates[self.velocity_estimate_idx] =
                    f64::from(position.wrapping_sub(self.last_position)) / dt;
                self.velocity_estimate_idx = (self.velocity_estimate_idx + 1) % 3;
            }
            self.last_position = position;
            self.last_update_time = now;
        }
        position
    }

    /// Direction-corrected hardware velocity, possibly aliased.
    pub fn raw_velocity(&mut self) -> f64 {
        f64::from(self.multiplier()) * self.motor.velocity()
    }

    /// Hardware velocity shifted by whole 16-bit periods toward the median of
    /// the recent finite-difference estimates.
    pub fn corrected_velocity(&mut self) -> f64 {
        let [a, b, c] = self.velocity_estimates;
        inverse_overflow(self.raw_velocity(), median3(a, b, c))
    }
}

impl<M: MotorEncoder, C: Clock> TickSource for Encoder<M, C> {
    fn position(&mut self) -> i32 {
        self.current_position()
    }

    fn velocity(&mut self) -> f64 {
        match self.velocity_mode {
            VelocityMode::Raw => self.raw_velocity(),
            VelocityMode::Corrected => self.corrected_velocity(),
        }
    }

    fn set_direction(&mut self, direction: Direction) {
        if direction != self.direction {
            // Keep the finite-difference history in the new sign convention.
            self.last_position = self.last_position.wrapping_neg();
            for estimate in &mut self.velocity_estimates {
                *estimate = -*estimate;
            }
        }
        self.direction = direction;
    }
}

fn median3(a: f64, b: f64, c: f64) -> f64 {
    a.min(b).max(a.max(b).min(c))
}

fn inverse_overflow(input: f64, estimate: f64) -> f64 {
    if !estimate.is_finite() {
        return input;
    }
    let periods = ((estimate - input) / CPS_STEP).round();
    input + periods * CPS_STEP
}
