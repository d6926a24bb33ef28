//! Hungry Owl Core - Shared types library.
//!
//! This crate provides the types every Hungry Owl component agrees on:
//! - `client` - Client-side state stores and list coordination
//! - `cli` - Command-line tools for fee estimation and session management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! persistence, no HTTP clients. This keeps it lightweight and allows it to
//! be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Typed ids, prices, catalog snapshots and coordinates
//! - [`delivery`] - Haversine distance and the tiered delivery fee schedule

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod delivery;
pub mod types;

pub use delivery::{FeeSchedule, delivery_fee, distance_km, haversine_km};
pub use types::*;
