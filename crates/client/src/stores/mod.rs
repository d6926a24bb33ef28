//! State containers.
//!
//! Each store owns a `tokio::sync::watch` channel holding its state.
//! Readers either take a snapshot through the store's query methods or
//! [`subscribe`](cart::CartStore::subscribe) to be notified of every change.

pub mod cart;
pub mod favorites;
pub mod optimistic;
pub mod session;

pub use cart::{Cart, CartError, CartItem, CartStore};
pub use favorites::{FavoriteError, FavoriteState, FavoriteStore};
pub use session::{SessionError, SessionState, SessionStore};
