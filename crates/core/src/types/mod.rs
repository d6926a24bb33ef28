//! Core types for Hungry Owl.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod catalog;
pub mod geo;
pub mod id;
pub mod price;

pub use catalog::{Product, Restaurant};
pub use geo::{GeoCoordinate, GeoError};
pub use id::*;
pub use price::{CurrencyCode, Price};
