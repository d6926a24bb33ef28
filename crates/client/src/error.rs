//! Crate-wide error type.
//!
//! Each store reports its own error enum. [`ClientError`] wraps them for
//! callers that drive several stores and want a single `?` target.

use thiserror::Error;

use crate::api::RemoteError;
use crate::config::ConfigError;
use crate::delivery::LocationError;
use crate::storage::StorageError;
use crate::stores::{CartError, FavoriteError, SessionError};

/// Any error produced by the client library.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// A cart mutation was rejected.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// A favorite toggle failed and was rolled back.
    #[error("Favorite error: {0}")]
    Favorite(#[from] FavoriteError),

    /// A session operation failed.
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// A remote call failed.
    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    /// Persistence failed outside a session operation.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The current position is unavailable.
    #[error("Location error: {0}")]
    Location(#[from] LocationError),
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions_keep_message() {
        let err: ClientError = CartError::InvalidArgument("quantity must be positive".into()).into();
        assert_eq!(
            err.to_string(),
            "Cart error: invalid argument: quantity must be positive"
        );

        let err: ClientError = SessionError::NotAuthenticated.into();
        assert!(matches!(err, ClientError::Session(_)));
    }
}
