use thiserror::Error;

/// Error type for invalid operations.
#[derive(Error, Debug)]
pub enum TrafficError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Trace sequences differ in length. velocity={velocity}, acceleration={acceleration}, duration={duration}")]
    LengthMismatch {
        velocity: usize,
        acceleration: usize,
        duration: usize,
    },
    #[error("{name} must lie in [0, 1], got {value}")]
    RatioOutOfRange { name: String, value: f64 },
    #[error("Invalid emission rate table: {0}")]
    InvalidEmissionRates(String),
    #[error("Could not parse configuration: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TrafficError {
    /// Shorthand for [`TrafficError::InvalidInput`]
    pub fn invalid(message: impl Into<String>) -> Self {
        TrafficError::InvalidInput(message.into())
    }
}

impl From<toml::de::Error> for TrafficError {
    fn from(value: toml::de::Error) -> Self {
        TrafficError::Config(value.to_string())
    }
}

/// Convenience type for `Result<T, TrafficError>`.
pub type TrafficResult<T> = Result<T, TrafficError>;

/// Check that a ratio lies in the closed unit interval.
pub fn ensure_unit_ratio(name: &str, value: f64) -> TrafficResult<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(TrafficError::RatioOutOfRange {
            name: name.to_string(),
            value,
        });
    }
    Ok(())
}
