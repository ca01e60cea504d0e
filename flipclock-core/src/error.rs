/// Error types for the clock core
use thiserror::Error;

/// A persisted integer that does not decode to a known setting
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingError {
    #[error("unknown world mode {0}")]
    UnknownWorldMode(i32),
    #[error("unknown transparency mode {0}")]
    UnknownTransparency(i32),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorldError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type WorldResult<T> = Result<T, WorldError>;
