//! Favorite restaurants and products.
//!
//! Membership is mirrored from the server. Toggles are applied locally
//! before the server confirms them and reverted if it refuses.
//!
//! Toggles are not serialized per id. Two overlapping toggles of the same
//! target each roll back to the set they captured, so a failure of the
//! first can undo the second's flip.

use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, instrument, warn};

use hungry_owl_core::{ProductId, RestaurantId};

use super::optimistic::with_rollback;
use crate::api::{FavoriteService, RemoteError};
use crate::models::{FavoriteKind, FavoriteTarget};

/// Errors returned by favorite mutations.
#[derive(Debug, Error)]
pub enum FavoriteError {
    /// The server did not apply the toggle. Local state was rolled back.
    #[error("favorite toggle failed: {0}")]
    Remote(#[from] RemoteError),
}

/// Favorite ids per kind plus fetch status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FavoriteState {
    pub restaurants: HashSet<RestaurantId>,
    pub products: HashSet<ProductId>,
    /// A fetch is in flight.
    pub is_loading: bool,
    /// Message of the last failed fetch, cleared by the next success.
    pub error: Option<String>,
}

/// Checkpoint of one kind's id set.
#[derive(Debug)]
enum KindSnapshot {
    Restaurants(HashSet<RestaurantId>),
    Products(HashSet<ProductId>),
}

impl FavoriteState {
    #[must_use]
    pub fn contains(&self, target: FavoriteTarget) -> bool {
        match target {
            FavoriteTarget::Restaurant(id) => self.restaurants.contains(&id),
            FavoriteTarget::Product(id) => self.products.contains(&id),
        }
    }

    /// Sorted raw ids of `kind`.
    #[must_use]
    pub fn ids(&self, kind: FavoriteKind) -> Vec<i32> {
        let mut ids: Vec<i32> = match kind {
            FavoriteKind::Restaurant => self.restaurants.iter().map(RestaurantId::as_i32).collect(),
            FavoriteKind::Product => self.products.iter().map(ProductId::as_i32).collect(),
        };
        ids.sort_unstable();
        ids
    }

    #[must_use]
    pub fn count(&self, kind: FavoriteKind) -> usize {
        match kind {
            FavoriteKind::Restaurant => self.restaurants.len(),
            FavoriteKind::Product => self.products.len(),
        }
    }

    /// Flip membership and return the new value.
    fn flip(&mut self, target: FavoriteTarget) -> bool {
        fn flip_in<T: Eq + std::hash::Hash>(set: &mut HashSet<T>, id: T) -> bool {
            if set.remove(&id) {
                false
            } else {
                set.insert(id);
                true
            }
        }

        match target {
            FavoriteTarget::Restaurant(id) => flip_in(&mut self.restaurants, id),
            FavoriteTarget::Product(id) => flip_in(&mut self.products, id),
        }
    }

    fn snapshot(&self, kind: FavoriteKind) -> KindSnapshot {
        match kind {
            FavoriteKind::Restaurant => KindSnapshot::Restaurants(self.restaurants.clone()),
            FavoriteKind::Product => KindSnapshot::Products(self.products.clone()),
        }
    }

    fn restore(&mut self, snapshot: KindSnapshot) {
        match snapshot {
            KindSnapshot::Restaurants(set) => self.restaurants = set,
            KindSnapshot::Products(set) => self.products = set,
        }
    }
}

/// Observable favorite sets backed by a [`FavoriteService`].
pub struct FavoriteStore {
    service: Arc<dyn FavoriteService>,
    state: watch::Sender<FavoriteState>,
}

impl std::fmt::Debug for FavoriteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FavoriteStore")
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

impl FavoriteStore {
    #[must_use]
    pub fn new(service: Arc<dyn FavoriteService>) -> Self {
        Self {
            service,
            state: watch::Sender::new(FavoriteState::default()),
        }
    }

    /// Receive every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<FavoriteState> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn snapshot(&self) -> FavoriteState {
        self.state.borrow().clone()
    }

    /// Load both id sets from the server.
    ///
    /// Both kinds are fetched concurrently and replaced together. If either
    /// request fails the previous sets are kept and the message is stored in
    /// [`FavoriteState::error`]; the failure is not returned.
    #[instrument(skip(self))]
    pub async fn fetch_favorites(&self) {
        self.state.send_modify(|state| state.is_loading = true);

        let fetched = tokio::try_join!(
            self.service.favorite_ids(FavoriteKind::Restaurant),
            self.service.favorite_ids(FavoriteKind::Product),
        );

        match fetched {
            Ok((restaurants, products)) => {
                debug!(
                    restaurants = restaurants.len(),
                    products = products.len(),
                    "favorites loaded"
                );
                self.state.send_modify(|state| {
                    state.restaurants = restaurants.into_iter().map(RestaurantId::new).collect();
                    state.products = products.into_iter().map(ProductId::new).collect();
                    state.is_loading = false;
                    state.error = None;
                });
            }
            Err(e) => {
                warn!(error = %e, "failed to fetch favorites, keeping previous sets");
                let message = e.to_string();
                self.state.send_modify(|state| {
                    state.is_loading = false;
                    state.error = Some(message);
                });
            }
        }
    }

    /// Flip membership of `target`, optimistically.
    ///
    /// The flipped set is visible to readers before the server answers.
    /// Returns whether the target is now a favorite.
    ///
    /// # Errors
    ///
    /// Returns `FavoriteError::Remote` if the server rejects the toggle. The
    /// set for the target's kind is restored to what it was before the call.
    #[instrument(skip(self), fields(target = %target))]
    pub async fn toggle_favorite(&self, target: FavoriteTarget) -> Result<bool, FavoriteError> {
        let kind = target.kind();
        let mut now_favorite = false;

        let result = with_rollback(
            &self.state,
            |state| state.snapshot(kind),
            |state| now_favorite = state.flip(target),
            |state, snapshot| state.restore(snapshot),
            self.service.toggle_favorite(kind, target.raw_id()),
        )
        .await;

        match result {
            Ok(()) => {
                debug!(now_favorite, "favorite toggled");
                Ok(now_favorite)
            }
            Err(e) => {
                warn!(error = %e, "favorite toggle rejected, rolled back");
                Err(e.into())
            }
        }
    }

    /// Local membership check. Never touches the network.
    #[must_use]
    pub fn is_favorite(&self, target: impl Into<FavoriteTarget>) -> bool {
        self.state.borrow().contains(target.into())
    }

    /// Sorted raw ids of `kind`.
    #[must_use]
    pub fn ids(&self, kind: FavoriteKind) -> Vec<i32> {
        self.state.borrow().ids(kind)
    }

    #[must_use]
    pub fn count(&self, kind: FavoriteKind) -> usize {
        self.state.borrow().count(kind)
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    /// Forget every favorite locally. The server is not contacted.
    pub fn clear(&self) {
        self.state.send_modify(|state| {
            state.restaurants.clear();
            state.products.clear();
            state.error = None;
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tokio::sync::Notify;

    use super::*;

    /// Server double: keeps its own sets and can refuse calls.
    #[derive(Default)]
    struct FakeService {
        sets: Mutex<HashMap<FavoriteKind, HashSet<i32>>>,
        fail_toggle: Mutex<bool>,
        fail_fetch: Mutex<Option<FavoriteKind>>,
        gate: Option<Arc<Notify>>,
    }

    impl FakeService {
        fn with(restaurants: &[i32], products: &[i32]) -> Self {
            let sets = HashMap::from([
                (FavoriteKind::Restaurant, restaurants.iter().copied().collect()),
                (FavoriteKind::Product, products.iter().copied().collect()),
            ]);
            Self {
                sets: Mutex::new(sets),
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl FavoriteService for FakeService {
        async fn favorite_ids(&self, kind: FavoriteKind) -> Result<Vec<i32>, RemoteError> {
            if *self.fail_fetch.lock().unwrap() == Some(kind) {
                return Err(RemoteError::Unavailable("favorites down".to_string()));
            }
            let sets = self.sets.lock().unwrap();
            Ok(sets.get(&kind).map(|s| s.iter().copied().collect()).unwrap_or_default())
        }

        async fn toggle_favorite(&self, kind: FavoriteKind, id: i32) -> Result<(), RemoteError> {
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            if *self.fail_toggle.lock().unwrap() {
                return Err(RemoteError::Status {
                    status: 500,
                    message: "toggle failed".to_string(),
                });
            }
            let mut sets = self.sets.lock().unwrap();
            let set = sets.entry(kind).or_default();
            if !set.remove(&id) {
                set.insert(id);
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_fetch_replaces_sets() {
        let store = FavoriteStore::new(Arc::new(FakeService::with(&[3, 1], &[7])));
        store.fetch_favorites().await;

        assert_eq!(store.ids(FavoriteKind::Restaurant), vec![1, 3]);
        assert!(store.is_favorite(ProductId::new(7)));
        assert!(!store.is_favorite(RestaurantId::new(7)));
        assert!(!store.is_loading());
        assert!(store.error().is_none());
    }

    #[tokio::test]
    async fn test_fetch_failure_keeps_last_known_good() {
        let service = Arc::new(FakeService::with(&[1], &[2]));
        let store = FavoriteStore::new(service.clone());
        store.fetch_favorites().await;

        *service.fail_fetch.lock().unwrap() = Some(FavoriteKind::Product);
        service.sets.lock().unwrap().clear();
        store.fetch_favorites().await;

        assert_eq!(store.ids(FavoriteKind::Restaurant), vec![1]);
        assert_eq!(store.ids(FavoriteKind::Product), vec![2]);
        assert!(store.error().unwrap().contains("favorites down"));
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_toggle_success_flips_membership() {
        let store = FavoriteStore::new(Arc::new(FakeService::default()));
        let target = FavoriteTarget::Product(ProductId::new(5));

        assert!(store.toggle_favorite(target).await.unwrap());
        assert!(store.is_favorite(target));
        assert!(!store.toggle_favorite(target).await.unwrap());
        assert!(!store.is_favorite(target));
    }

    #[tokio::test]
    async fn test_toggle_failure_rolls_back() {
        let service = Arc::new(FakeService::with(&[4], &[]));
        *service.fail_toggle.lock().unwrap() = true;
        let store = FavoriteStore::new(service);
        store.fetch_favorites().await;

        let err = store
            .toggle_favorite(FavoriteTarget::Restaurant(RestaurantId::new(4)))
            .await
            .unwrap_err();
        assert!(matches!(err, FavoriteError::Remote(RemoteError::Status { status: 500, .. })));
        assert!(store.is_favorite(RestaurantId::new(4)));

        assert!(store
            .toggle_favorite(FavoriteTarget::Product(ProductId::new(9)))
            .await
            .is_err());
        assert_eq!(store.count(FavoriteKind::Product), 0);
    }

    #[tokio::test]
    async fn test_optimistic_flip_is_visible_before_confirmation() {
        let gate = Arc::new(Notify::new());
        let service = FakeService {
            gate: Some(gate.clone()),
            ..FakeService::default()
        };
        let store = FavoriteStore::new(Arc::new(service));
        let target = FavoriteTarget::Restaurant(RestaurantId::new(2));
        let mut rx = store.subscribe();

        let (toggled, seen) = tokio::join!(store.toggle_favorite(target), async {
            rx.changed().await.unwrap();
            let seen = rx.borrow_and_update().contains(target);
            gate.notify_one();
            seen
        });

        assert!(seen);
        assert!(toggled.unwrap());
    }

    #[tokio::test]
    async fn test_rollback_only_touches_target_kind() {
        let service = Arc::new(FakeService::with(&[1], &[2]));
        let store = FavoriteStore::new(service.clone());
        store.fetch_favorites().await;
        *service.fail_toggle.lock().unwrap() = true;

        store
            .toggle_favorite(FavoriteTarget::Product(ProductId::new(2)))
            .await
            .unwrap_err();

        assert_eq!(store.ids(FavoriteKind::Restaurant), vec![1]);
        assert_eq!(store.ids(FavoriteKind::Product), vec![2]);
    }

    #[tokio::test]
    async fn test_clear_forgets_everything() {
        let store = FavoriteStore::new(Arc::new(FakeService::with(&[1, 2], &[3])));
        store.fetch_favorites().await;
        store.clear();
        assert_eq!(store.count(FavoriteKind::Restaurant), 0);
        assert_eq!(store.count(FavoriteKind::Product), 0);
    }
}
