/// An external heading sensor, typically an IMU.
///
/// The rate is optional: sensors that cannot report it return `None`, and
/// the caller decides how to cope. It is never replaced by zero here.
pub trait HeadingSource {
    /// Heading in radians.
    fn heading(&mut self) -> f64;

    /// Heading rate in radians per second, if the sensor provides one.
    fn heading_velocity(&mut self) -> Option<f64> {
        None
    }
}

impl<T: HeadingSource + ?Sized> HeadingSource for &mut T {
    fn heading(&mut self) -> f64 {
        (**self).heading()
    }

    fn heading_velocity(&mut self) -> Option<f64> {
        (**self).heading_velocity()
    }
}

/// Adapts a pair of closures into a [`HeadingSource`].
///
/// Useful when the heading lives inside another subsystem (a drive base that
/// owns the IMU, for instance) and only a query handle should be lent out.
///
/// # Examples
///
/// ```rust
/// use deadwheel::localization::heading::{HeadingCallbacks, HeadingSource};
///
/// let mut imu = HeadingCallbacks::new(|| 0.5, || None);
/// assert_eq!(imu.heading(), 0.5);
/// assert_eq!(imu.heading_velocity(), None);
/// ```
pub struct HeadingCallbacks<F, G> {
    heading: F,
    heading_velocity: G,
}

impl<F, G> HeadingCallbacks<F, G>
where
    F: FnMut() -> f64,
    G: FnMut() -> Option<f64>,
{
    pub fn new(heading: F, heading_velocity: G) -> Self {
        Self {
            heading,
            heading_velocity,
        }
    }
}

impl<F, G> HeadingSource for HeadingCallbacks<F, G>
where
    F: FnMut() -> f64,
    G: FnMut() -> Option<f64>,
{
    fn heading(&mut self) -> f64 {
        (self.heading)()
    }

    fn heading_velocity(&mut self) -> Option<f64> {
        (self.heading_velocity)()
    }
}
