//! Newtype IDs for type-safe entity references.
//!
//! Server-assigned entities use the `define_id!` macro so a restaurant id can
//! never be passed where a product id is expected. Cart lines are identified
//! locally with [`CartItemId`], which never leaves the device.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to define a type-safe ID wrapper around a server-assigned `i32`.
///
/// The generated type is `Copy`, hashable, serializes transparently, and
/// parses from its decimal representation.
///
/// # Example
///
/// ```rust
/// # use hungry_owl_core::define_id;
/// define_id!(DriverId);
/// define_id!(VoucherId);
///
/// let driver = DriverId::new(7);
/// assert_eq!(driver.as_i32(), 7);
/// assert_eq!("7".parse::<DriverId>().ok(), Some(driver));
///
/// // These are different types, so this won't compile:
/// // let _: DriverId = VoucherId::new(7);
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Wrap a raw server id.
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            /// The raw server id.
            #[must_use]
            pub const fn as_i32(&self) -> i32 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = ::core::num::ParseIntError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                s.trim().parse::<i32>().map(Self)
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id!(UserId);
define_id!(RestaurantId);
define_id!(ProductId);
define_id!(CategoryId);

/// Locally generated identifier of a cart line.
///
/// Unique within a cart; generated from a random v4 UUID when a product is
/// first added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartItemId(Uuid);

impl CartItemId {
    /// Generate a fresh random id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// The underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for CartItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CartItemId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_id_parse_and_display() {
        let id: RestaurantId = " 42".parse().unwrap();
        assert_eq!(id, RestaurantId::new(42));
        assert_eq!(id.to_string(), "42");
        assert!("abc".parse::<ProductId>().is_err());
    }

    #[test]
    fn test_id_serializes_transparently() {
        let json = serde_json::to_string(&ProductId::new(9)).unwrap();
        assert_eq!(json, "9");
        let back: ProductId = serde_json::from_str(&json).unwrap();
        assert_eq!(back.as_i32(), 9);
    }

    #[test]
    fn test_cart_item_ids_are_unique() {
        let a = CartItemId::generate();
        let b = CartItemId::generate();
        assert_ne!(a, b);
        assert_eq!(a.to_string().parse::<CartItemId>().unwrap(), a);
    }
}
