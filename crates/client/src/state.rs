//! Application state shared across screens.

use std::sync::Arc;

use tracing::instrument;

use crate::api::FavoriteService;
use crate::config::ClientConfig;
use crate::delivery::{DeliveryEstimator, LocationProvider};
use crate::query::{ListFetcher, ListQuery};
use crate::storage::KeyValueStore;
use crate::stores::{CartStore, FavoriteStore, SessionError, SessionStore};

/// Owns every store of one signed-in device.
///
/// This struct is cheaply cloneable via `Arc`; clones share the same stores.
#[derive(Clone)]
pub struct ClientState {
    inner: Arc<ClientStateInner>,
}

struct ClientStateInner {
    config: ClientConfig,
    session: SessionStore,
    cart: CartStore,
    favorites: FavoriteStore,
    delivery: DeliveryEstimator,
}

impl std::fmt::Debug for ClientState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientState")
            .field("config", &self.inner.config)
            .field("session", &self.inner.session)
            .finish_non_exhaustive()
    }
}

impl ClientState {
    /// Create the application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Client configuration
    /// * `storage` - Where the session is persisted
    /// * `favorites` - Remote favorite service
    /// * `location` - Source of the device position for delivery quotes
    #[must_use]
    pub fn new(
        config: ClientConfig,
        storage: Arc<dyn KeyValueStore>,
        favorites: Arc<dyn FavoriteService>,
        location: Arc<dyn LocationProvider>,
    ) -> Self {
        let delivery = DeliveryEstimator::new(location, config.fee_schedule, config.currency);
        Self {
            inner: Arc::new(ClientStateInner {
                session: SessionStore::new(storage),
                cart: CartStore::new(),
                favorites: FavoriteStore::new(favorites),
                delivery,
                config,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    #[must_use]
    pub fn favorites(&self) -> &FavoriteStore {
        &self.inner.favorites
    }

    #[must_use]
    pub fn delivery(&self) -> &DeliveryEstimator {
        &self.inner.delivery
    }

    /// A list query using the configured page size.
    #[must_use]
    pub fn list_query<T>(&self, fetcher: Arc<dyn ListFetcher<T>>) -> ListQuery<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        ListQuery::new(fetcher, self.inner.config.page_size)
    }

    /// Log out and drop per-user data.
    ///
    /// The cart and favorites are cleared only once the session is gone from
    /// storage.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the persisted session could not be removed.
    /// Nothing is cleared in that case.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), SessionError> {
        self.inner.session.logout().await?;
        self.inner.cart.clear_cart();
        self.inner.favorites.clear();
        Ok(())
    }
}
