//! Hungry Owl client state library.
//!
//! In-memory mirrors of server state for the ordering app, kept consistent
//! with the backend under optimistic mutation, partial failure and
//! overlapping fetches.
//!
//! # Architecture
//!
//! - [`stores`] - Cart, favorites and session state containers
//! - [`query`] - Paginated, filtered list fetching with stale-response discarding
//! - [`delivery`] - Delivery fee quotes from the current location
//! - [`storage`] - Key-value persistence collaborator and adapters
//! - [`api`] - Remote favorite service and HTTP client
//! - [`state`] - Composition root that owns the stores
//!
//! Every store publishes its state through a `tokio::sync::watch` channel.
//! Mutations are synchronous and never hold the state across an `.await`.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod delivery;
pub mod error;
pub mod models;
pub mod query;
pub mod state;
pub mod storage;
pub mod stores;

pub use error::{ClientError, Result};
pub use state::ClientState;
