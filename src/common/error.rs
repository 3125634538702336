use thiserror::Error;

/// Errors raised while building a localizer.
///
/// Every variant describes a configuration fault. They are reported once, at
/// construction, and never per update: a bad wheel layout produces
/// systematically wrong poses rather than a visible crash, so it must not be
/// tolerated silently.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LocalizerError {
    #[error("wheel radius must be positive and finite, got {0}")]
    InvalidWheelRadius(f64),

    #[error("gear ratio must be positive and finite, got {0}")]
    InvalidGearRatio(f64),

    #[error("ticks per revolution must be positive and finite, got {0}")]
    InvalidTicksPerRev(f64),

    #[error("wheel pose {index} has a non-finite component")]
    NonFiniteWheelPose { index: usize },

    #[error("tracking wheels {first} and {second} roll along parallel axes")]
    ParallelWheels { first: usize, second: usize },

    #[error("expected {expected} measurement rows, got {found}")]
    RowCount { expected: usize, found: usize },

    #[error("the specified configuration cannot support full localization")]
    Singular,
}

pub type Result<T> = std::result::Result<T, LocalizerError>;
