use thiserror::Error;

/// Errors raised while applying or persisting state
#[derive(Debug, Error)]
pub enum StateError {
    #[error("storage error: {0}")]
    Storage(#[from] healthwatch_core::Error),

    #[error("invalid location: {0}")]
    Location(#[from] healthwatch_geo::GeoError),

    #[error("invalid settings: {0}")]
    Settings(String),
}

pub type Result<T> = std::result::Result<T, StateError>;
