use thiserror::Error;

use crate::houses::HouseSystem;

/// Everything that can go wrong while building a chart.
///
/// The pipeline is a pure function of its input, so none of these are
/// transient: callers should surface them rather than retry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChartError {
    #[error("invalid birth input: {0}")]
    InvalidBirthInput(String),

    #[error("julian day {julian_day:.4} is outside the ephemeris range {min:.1}..={max:.1}")]
    DateOutOfRange { julian_day: f64, min: f64, max: f64 },

    #[error("unknown ayanamsa model: {0}")]
    UnknownAyanamsaModel(String),

    #[error("unknown house system: {0}")]
    UnknownHouseSystem(String),

    #[error("{system} houses are undefined at latitude {latitude:.4}")]
    HouseSystemUndefinedAtLatitude { system: HouseSystem, latitude: f64 },

    #[error("internal computation invariant violated: {0}")]
    InternalComputationInvariant(String),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T, E = ChartError> = std::result::Result<T, E>;

impl From<toml::de::Error> for ChartError {
    fn from(err: toml::de::Error) -> Self {
        ChartError::Config(err.to_string())
    }
}

impl From<std::io::Error> for ChartError {
    fn from(err: std::io::Error) -> Self {
        ChartError::Config(err.to_string())
    }
}
