//! Error types for the canvas model

use crate::ids::{ContainerId, TokenId};
use thiserror::Error;

/// Errors raised by workspace mutations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// No container with this ID exists
    #[error("Unknown container: {0}")]
    UnknownContainer(ContainerId),

    /// No token with this ID exists
    #[error("Unknown token: {0}")]
    UnknownToken(TokenId),

    /// At least one container must always exist
    #[error("Cannot remove the last container")]
    LastContainerRemovalRefused,

    /// Every container is already occupied
    #[error("Please add a new container first")]
    NoFreeContainer,
}

/// Result type for canvas model operations
pub type ModelResult<T> = Result<T, ModelError>;
