//! Command implementations.

pub mod favorites;
pub mod fee;
pub mod restaurants;
pub mod session;

use std::sync::Arc;

use async_trait::async_trait;
use hungry_owl_client::api::ApiClient;
use hungry_owl_client::config::ClientConfig;
use hungry_owl_client::delivery::{LocationError, LocationProvider, StaticLocation};
use hungry_owl_client::storage::FileStore;
use hungry_owl_client::stores::SessionStore;
use hungry_owl_client::{ClientState, Result};
use hungry_owl_core::GeoCoordinate;

/// Configuration and storage shared by every command.
pub struct Context {
    pub config: ClientConfig,
    pub storage: Arc<FileStore>,
}

impl Context {
    /// Load configuration from the environment.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Config` if a variable does not parse.
    pub fn load() -> Result<Self> {
        let config = ClientConfig::from_env()?;
        let storage = Arc::new(FileStore::new(config.storage_path.clone()));
        tracing::debug!(path = %storage.path().display(), "using session file");
        Ok(Self { config, storage })
    }

    /// The persisted session, restored.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Session` if the session file cannot be read.
    pub async fn session(&self) -> Result<SessionStore> {
        let session = SessionStore::new(self.storage.clone());
        session.restore_session().await?;
        Ok(session)
    }

    /// An API client carrying the persisted token, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be read or the HTTP client
    /// cannot be built.
    pub async fn api(&self) -> Result<ApiClient> {
        let api = match self.session().await?.token() {
            Some(token) => ApiClient::with_token(&self.config.api, token)?,
            None => {
                tracing::info!("No session stored, calling the API anonymously");
                ApiClient::new(&self.config.api)?
            }
        };
        Ok(api)
    }

    /// Full application state wired to the HTTP API and the session file.
    ///
    /// # Errors
    ///
    /// Same as [`Self::api`].
    pub async fn state(&self) -> Result<ClientState> {
        let api = self.api().await?;
        let location: Arc<dyn LocationProvider> = match self.config.default_location {
            Some(position) => Arc::new(StaticLocation(position)),
            None => Arc::new(Unconfigured),
        };

        let state = ClientState::new(
            self.config.clone(),
            self.storage.clone(),
            Arc::new(api),
            location,
        );
        state.session().restore_session().await?;
        Ok(state)
    }
}

/// Location source used when no default position is configured.
struct Unconfigured;

#[async_trait]
impl LocationProvider for Unconfigured {
    async fn current_location(&self) -> std::result::Result<GeoCoordinate, LocationError> {
        Err(LocationError::Unavailable(
            "pass --customer or set HUNGRY_OWL_DEFAULT_LOCATION".to_string(),
        ))
    }
}
