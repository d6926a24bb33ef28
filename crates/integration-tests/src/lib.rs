//! Integration tests for Hungry Owl.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p hungry-owl-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_flow` - Cart mutations and totals through the public API
//! - `favorites_flow` - Optimistic toggles against a scripted server
//! - `session_flow` - Session persistence across store instances
//! - `list_query` - Pagination, filters and stale responses
//! - `delivery_fees` - Fee schedule and quotes
//! - `client_state` - Stores composed in `ClientState`
//!
//! Everything runs in-process: storage is a `MemoryStore` or a temporary
//! `FileStore`, and the remote favorite service is [`ScriptedFavorites`].

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use hungry_owl_client::api::{FavoriteService, RemoteError};
use hungry_owl_client::config::ClientConfig;
use hungry_owl_client::delivery::StaticLocation;
use hungry_owl_client::models::{FavoriteKind, User};
use hungry_owl_client::storage::{KeyValueStore, MemoryStore};
use hungry_owl_client::ClientState;
use hungry_owl_core::{GeoCoordinate, Product, ProductId, RestaurantId, UserId};
use rust_decimal::Decimal;

/// District 1, Ho Chi Minh City.
pub const HOME: GeoCoordinate = GeoCoordinate::new(10.7769, 106.7009);

/// In-process favorite service.
///
/// Keeps its own membership sets like a real server. Toggle results can be
/// scripted: each queued entry decides the outcome of one toggle call, and
/// an empty queue means success.
#[derive(Debug, Default)]
pub struct ScriptedFavorites {
    sets: Mutex<HashMap<FavoriteKind, HashSet<i32>>>,
    toggle_results: Mutex<VecDeque<bool>>,
    fetch_fails: Mutex<bool>,
    toggle_calls: Mutex<usize>,
}

impl ScriptedFavorites {
    #[must_use]
    pub fn new(restaurants: &[i32], products: &[i32]) -> Self {
        let service = Self::default();
        {
            let mut sets = service.sets.lock().unwrap_or_else(PoisonError::into_inner);
            sets.insert(FavoriteKind::Restaurant, restaurants.iter().copied().collect());
            sets.insert(FavoriteKind::Product, products.iter().copied().collect());
        }
        service
    }

    /// Queue outcomes for upcoming toggles (`false` = server error).
    pub fn script_toggles(&self, outcomes: impl IntoIterator<Item = bool>) {
        self.toggle_results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(outcomes);
    }

    /// Make every subsequent fetch fail.
    pub fn fail_fetches(&self) {
        *self.fetch_fails.lock().unwrap_or_else(PoisonError::into_inner) = true;
    }

    /// Server-side membership, sorted.
    #[must_use]
    pub fn server_ids(&self, kind: FavoriteKind) -> Vec<i32> {
        let sets = self.sets.lock().unwrap_or_else(PoisonError::into_inner);
        let mut ids: Vec<i32> = sets.get(&kind).into_iter().flatten().copied().collect();
        ids.sort_unstable();
        ids
    }

    #[must_use]
    pub fn toggle_calls(&self) -> usize {
        *self.toggle_calls.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl FavoriteService for ScriptedFavorites {
    async fn favorite_ids(&self, kind: FavoriteKind) -> Result<Vec<i32>, RemoteError> {
        if *self.fetch_fails.lock().unwrap_or_else(PoisonError::into_inner) {
            return Err(RemoteError::Unavailable("favorites offline".to_string()));
        }
        Ok(self.server_ids(kind))
    }

    async fn toggle_favorite(&self, kind: FavoriteKind, id: i32) -> Result<(), RemoteError> {
        *self.toggle_calls.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        let succeed = self
            .toggle_results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or(true);
        if !succeed {
            return Err(RemoteError::Status {
                status: 503,
                message: "try again later".to_string(),
            });
        }

        let mut sets = self.sets.lock().unwrap_or_else(PoisonError::into_inner);
        let set = sets.entry(kind).or_default();
        if !set.remove(&id) {
            set.insert(id);
        }
        Ok(())
    }
}

/// A product priced in whole dong.
#[must_use]
pub fn product(id: i32, price: i64, discount: i64) -> Product {
    Product {
        id: ProductId::new(id),
        restaurant_id: RestaurantId::new(1),
        name: format!("Dish {id}"),
        price: Decimal::from(price),
        discount: Decimal::from(discount),
        category_id: None,
        image_url: None,
    }
}

#[must_use]
pub fn user(id: i32) -> User {
    User {
        id: UserId::new(id),
        full_name: format!("Customer {id}"),
        email: format!("customer{id}@example.com"),
        phone: None,
        address: None,
        avatar_url: None,
    }
}

/// Default configuration with [`HOME`] as the device position.
#[must_use]
pub fn config() -> ClientConfig {
    let mut config =
        ClientConfig::from_lookup(|_| None).unwrap_or_else(|e| panic!("default config: {e}"));
    config.default_location = Some(HOME);
    config
}

/// Application state over the given collaborators, located at [`HOME`].
#[must_use]
pub fn client_state(
    storage: Arc<dyn KeyValueStore>,
    favorites: Arc<ScriptedFavorites>,
) -> ClientState {
    ClientState::new(config(), storage, favorites, Arc::new(StaticLocation(HOME)))
}

/// Application state over a fresh `MemoryStore`.
#[must_use]
pub fn memory_state(favorites: Arc<ScriptedFavorites>) -> (ClientState, Arc<MemoryStore>) {
    let storage = Arc::new(MemoryStore::new());
    (client_state(storage.clone(), favorites), storage)
}
