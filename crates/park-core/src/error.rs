//! Error types for the park

use thiserror::Error;

use crate::{DocumentAddress, SessionId};

/// Core park errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParkError {
    // Address errors
    #[error("Invalid document address: {0:?}")]
    InvalidAddress(String),

    #[error("Document not found: {0}")]
    DocumentNotFound(DocumentAddress),

    // Relay errors
    #[error("Relay unavailable")]
    RelayUnavailable,

    // Record errors
    #[error("Unknown action tag: {0:?}")]
    UnknownAction(String),

    #[error("Avatar not found: {0}")]
    AvatarNotFound(SessionId),

    #[error("No local avatar registered")]
    NoLocalAvatar,

    #[error("Not attached to a document")]
    NotAttached,

    // Scene errors
    #[error("Unknown object: {0}")]
    UnknownObject(String),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for park operations
pub type ParkResult<T> = Result<T, ParkError>;
