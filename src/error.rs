use thiserror::Error;

use crate::coordinate::Coordinate;

/// Main error type for grid placement and search
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlacementError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Precondition violated: {0}")]
    Precondition(#[from] PreconditionViolation),

    #[error("Invalid state: {message}")]
    InvalidState { message: String },
}

/// Problem setups that can never produce a valid run
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("grid must be at least 1x1, got {height}x{width}")]
    EmptyGrid { height: usize, width: usize },

    #[error("at least one hospital is required")]
    NoHospitals,

    #[error("cannot place {requested} hospitals, only {available} cells are free")]
    InsufficientSpace { requested: usize, available: usize },
}

/// Caller mistakes when populating the grid
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PreconditionViolation {
    #[error("{coordinate} lies outside the {height}x{width} grid")]
    OutOfBounds {
        coordinate: Coordinate,
        height: usize,
        width: usize,
    },

    #[error("{coordinate} is already occupied")]
    Occupied { coordinate: Coordinate },

    #[error("expected {expected} hospitals, got {actual}")]
    HospitalCount { expected: usize, actual: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Precondition,
    InvalidState,
}

impl PlacementError {
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Precondition(_) => ErrorKind::Precondition,
            Self::InvalidState { .. } => ErrorKind::InvalidState,
        }
    }
}

pub type Result<T> = std::result::Result<T, PlacementError>;
