//! Remote collaborators.
//!
//! # Favorites
//!
//! [`FavoriteService`] is the contract the favorite store depends on. The
//! server is the source of truth for membership; the client never reads
//! back the result of a toggle.
//!
//! # HTTP
//!
//! [`ApiClient`] implements the contract over the REST API with `reqwest`
//! and also serves paginated restaurant and product listings.

mod client;

pub use client::ApiClient;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::FavoriteKind;

/// Errors reported by remote collaborators.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// HTTP request failed (connection, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status.
    #[error("server returned {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Error message from the body, truncated.
        message: String,
    },

    /// Response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The collaborator is not reachable or refused the call.
    #[error("service unavailable: {0}")]
    Unavailable(String),
}

/// Remote favorite service.
#[async_trait]
pub trait FavoriteService: Send + Sync {
    /// Ids the user has favorited for `kind`. Order is irrelevant.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError` if the ids cannot be fetched.
    async fn favorite_ids(&self, kind: FavoriteKind) -> Result<Vec<i32>, RemoteError>;

    /// Flip membership of `id` on the server.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError` if the server did not apply the toggle.
    async fn toggle_favorite(&self, kind: FavoriteKind, id: i32) -> Result<(), RemoteError>;
}
