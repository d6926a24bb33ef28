//! Authenticated session.
//!
//! The session is mirrored in two places: in memory for the running app and
//! in a [`KeyValueStore`] so it survives restarts. Storage is always written
//! first; memory only reports an authenticated session once both the token
//! and the user are persisted.
//!
//! Lifecycle: unknown (cold start) -> restoring -> authenticated or
//! anonymous. `set_user` and `logout` move between the last two. Only
//! `logout` clears memory; restoring an incomplete session does not.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::models::User;
use crate::models::session::{AUTH_TOKEN, USER};
use crate::storage::{KeyValueStore, StorageError};

/// Errors returned by session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Reading or writing the persisted session failed.
    #[error("session persistence failed: {0}")]
    Persistence(#[from] StorageError),

    /// The persisted user could not be encoded or decoded.
    #[error("persisted user is corrupt: {0}")]
    CorruptUser(#[from] serde_json::Error),

    /// The operation requires a logged-in user.
    #[error("no authenticated session")]
    NotAuthenticated,
}

/// In-memory session.
#[derive(Default)]
pub struct SessionState {
    pub user: Option<User>,
    pub token: Option<SecretString>,
    pending_restores: usize,
}

impl std::fmt::Debug for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionState")
            .field("user", &self.user)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("pending_restores", &self.pending_restores)
            .finish()
    }
}

impl SessionState {
    /// Both a user and a token are present.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.token.is_some()
    }

    /// At least one restore is in progress.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.pending_restores > 0
    }

    fn clear(&mut self) {
        self.user = None;
        self.token = None;
    }
}

/// Marks a restore in progress for as long as it is alive.
///
/// Dropping it, on any path including cancellation, ends the restore.
struct RestoreGuard<'a> {
    state: &'a watch::Sender<SessionState>,
}

impl<'a> RestoreGuard<'a> {
    fn enter(state: &'a watch::Sender<SessionState>) -> Self {
        state.send_modify(|s| s.pending_restores += 1);
        Self { state }
    }
}

impl Drop for RestoreGuard<'_> {
    fn drop(&mut self) {
        self.state
            .send_modify(|s| s.pending_restores = s.pending_restores.saturating_sub(1));
    }
}

/// Observable session backed by persistent storage.
pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
    state: watch::Sender<SessionState>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Create a store with no session in memory. Call
    /// [`restore_session`](Self::restore_session) to load a persisted one.
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            state: watch::Sender::new(SessionState::default()),
        }
    }

    /// Receive every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading()
    }

    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.state.borrow().user.clone()
    }

    #[must_use]
    pub fn token(&self) -> Option<SecretString> {
        self.state
            .borrow()
            .token
            .as_ref()
            .map(|token| SecretString::from(token.expose_secret().to_owned()))
    }

    /// Log in: persist the token and user, then publish them.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Persistence` if either write fails. Memory is
    /// left as it was and whatever was already written is undone on a best
    /// effort basis.
    #[instrument(skip(self, user, token), fields(user_id = %user.id))]
    pub async fn set_user(&self, user: User, token: SecretString) -> Result<(), SessionError> {
        let user_json = serde_json::to_string(&user)?;

        if let Err(e) = self.persist(token.expose_secret(), &user_json).await {
            warn!(error = %e, "failed to persist session, rolling back storage");
            self.undo_partial_write().await;
            return Err(e.into());
        }

        self.state.send_modify(|state| {
            state.user = Some(user);
            state.token = Some(token);
        });
        info!("session established");
        Ok(())
    }

    /// Replace the stored user of an authenticated session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotAuthenticated` without a session, or
    /// `SessionError::Persistence` if the write fails (memory unchanged).
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn update_user(&self, user: User) -> Result<(), SessionError> {
        if !self.is_authenticated() {
            return Err(SessionError::NotAuthenticated);
        }
        let user_json = serde_json::to_string(&user)?;
        self.storage.set(USER, &user_json).await?;
        self.state.send_modify(|state| state.user = Some(user));
        debug!("user updated");
        Ok(())
    }

    /// Log out: remove the persisted session, then clear memory.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Persistence` if removal fails. The session stays
    /// authenticated in memory so it keeps agreeing with storage.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), SessionError> {
        if let Err(e) = self.remove_persisted().await {
            warn!(error = %e, "failed to remove persisted session, staying logged in");
            return Err(e.into());
        }
        self.state.send_modify(SessionState::clear);
        info!("logged out");
        Ok(())
    }

    /// Load the persisted session into memory.
    ///
    /// Returns `true` if a complete session was found. A missing token or
    /// user leaves memory as it is: a cold start is already anonymous, and a
    /// login that lands while the keys are being read must not be undone.
    /// `is_loading` reports `true` until every concurrent restore has
    /// finished.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Persistence` if storage cannot be read and
    /// `SessionError::CorruptUser` if the stored user does not parse. In both
    /// cases memory is left as it was.
    #[instrument(skip(self))]
    pub async fn restore_session(&self) -> Result<bool, SessionError> {
        let _guard = RestoreGuard::enter(&self.state);

        let token = self.storage.get(AUTH_TOKEN).await?;
        let user_json = self.storage.get(USER).await?;

        match (token, user_json) {
            (Some(token), Some(user_json)) => {
                let user: User = serde_json::from_str(&user_json).map_err(|e| {
                    warn!(error = %e, "persisted user does not parse");
                    SessionError::CorruptUser(e)
                })?;
                debug!(user_id = %user.id, "session restored");
                self.state.send_modify(|state| {
                    state.user = Some(user);
                    state.token = Some(SecretString::from(token));
                });
                Ok(true)
            }
            _ => {
                debug!("no complete persisted session");
                Ok(false)
            }
        }
    }

    async fn persist(&self, token: &str, user_json: &str) -> Result<(), StorageError> {
        self.storage.set(AUTH_TOKEN, token).await?;
        self.storage.set(USER, user_json).await
    }

    async fn remove_persisted(&self) -> Result<(), StorageError> {
        self.storage.remove(AUTH_TOKEN).await?;
        self.storage.remove(USER).await
    }

    /// Put storage back in line with memory after a failed `set_user`.
    async fn undo_partial_write(&self) {
        let previous = {
            let state = self.state.borrow();
            match (&state.user, &state.token) {
                (Some(user), Some(token)) => serde_json::to_string(user)
                    .ok()
                    .map(|json| (token.expose_secret().to_owned(), json)),
                _ => None,
            }
        };

        let result = match previous {
            Some((token, user_json)) => self.persist(&token, &user_json).await,
            None => self.remove_persisted().await,
        };
        if let Err(e) = result {
            warn!(error = %e, "could not undo partial session write");
        }
    }
}
