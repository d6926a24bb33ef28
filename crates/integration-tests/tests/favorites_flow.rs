//! Favorite toggles against a scripted server.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use hungry_owl_client::api::RemoteError;
use hungry_owl_client::models::{FavoriteKind, FavoriteTarget};
use hungry_owl_client::stores::{FavoriteError, FavoriteStore};
use hungry_owl_core::{ProductId, RestaurantId};
use hungry_owl_integration_tests::ScriptedFavorites;

#[tokio::test]
async fn test_local_and_server_state_agree_after_toggles() {
    let server = Arc::new(ScriptedFavorites::new(&[1, 2], &[10]));
    let store = FavoriteStore::new(server.clone());
    store.fetch_favorites().await;

    assert!(!store.toggle_favorite(RestaurantId::new(2).into()).await.unwrap());
    assert!(store.toggle_favorite(ProductId::new(11).into()).await.unwrap());

    assert_eq!(store.ids(FavoriteKind::Restaurant), server.server_ids(FavoriteKind::Restaurant));
    assert_eq!(store.ids(FavoriteKind::Product), vec![10, 11]);
    assert_eq!(server.toggle_calls(), 2);
}

#[tokio::test]
async fn test_rejected_toggle_restores_previous_membership() {
    let server = Arc::new(ScriptedFavorites::new(&[5], &[]));
    server.script_toggles([false]);
    let store = FavoriteStore::new(server.clone());
    store.fetch_favorites().await;

    let target = FavoriteTarget::Restaurant(RestaurantId::new(5));
    let err = store.toggle_favorite(target).await.unwrap_err();

    assert!(
        matches!(err, FavoriteError::Remote(RemoteError::Status { status: 503, .. })),
        "unexpected error: {err}"
    );
    assert!(store.is_favorite(target));
    assert_eq!(server.server_ids(FavoriteKind::Restaurant), vec![5]);

    // A retry goes through.
    assert!(!store.toggle_favorite(target).await.unwrap());
    assert!(!store.is_favorite(target));
}

#[tokio::test]
async fn test_failed_refresh_keeps_sets_and_reports_error() {
    let server = Arc::new(ScriptedFavorites::new(&[1], &[2, 3]));
    let store = FavoriteStore::new(server.clone());
    store.fetch_favorites().await;

    server.fail_fetches();
    store.fetch_favorites().await;

    assert_eq!(store.count(FavoriteKind::Product), 2);
    assert!(store.error().unwrap().contains("favorites offline"));
    assert!(!store.is_loading());
}

#[tokio::test]
async fn test_toggles_of_different_kinds_are_independent() {
    let server = Arc::new(ScriptedFavorites::new(&[], &[]));
    server.script_toggles([true, false]);
    let store = FavoriteStore::new(server);

    let restaurant = FavoriteTarget::new(FavoriteKind::Restaurant, 1);
    let product = FavoriteTarget::new(FavoriteKind::Product, 1);
    let (a, b) = tokio::join!(
        store.toggle_favorite(restaurant),
        store.toggle_favorite(product)
    );

    assert!(a.unwrap());
    assert!(b.is_err());
    assert!(store.is_favorite(restaurant));
    assert!(!store.is_favorite(product));
}
