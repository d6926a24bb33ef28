//! Favorite kinds and targets.

use core::fmt;

use serde::{Deserialize, Serialize};

use hungry_owl_core::{ProductId, RestaurantId};

/// The two kinds of entity a user can favorite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FavoriteKind {
    Restaurant,
    Product,
}

impl FavoriteKind {
    /// Both kinds, in fetch order.
    pub const ALL: [Self; 2] = [Self::Restaurant, Self::Product];

    /// Plural path segment used by the API.
    #[must_use]
    pub const fn path_segment(self) -> &'static str {
        match self {
            Self::Restaurant => "restaurants",
            Self::Product => "products",
        }
    }
}

impl fmt::Display for FavoriteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Restaurant => f.write_str("restaurant"),
            Self::Product => f.write_str("product"),
        }
    }
}

impl core::str::FromStr for FavoriteKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "restaurant" | "restaurants" => Ok(Self::Restaurant),
            "product" | "products" => Ok(Self::Product),
            other => Err(format!("unknown favorite kind: {other}")),
        }
    }
}

/// A specific entity that can be favorited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FavoriteTarget {
    Restaurant(RestaurantId),
    Product(ProductId),
}

impl FavoriteTarget {
    /// Build a target from a kind and a raw id.
    #[must_use]
    pub const fn new(kind: FavoriteKind, id: i32) -> Self {
        match kind {
            FavoriteKind::Restaurant => Self::Restaurant(RestaurantId::new(id)),
            FavoriteKind::Product => Self::Product(ProductId::new(id)),
        }
    }

    /// The target's kind.
    #[must_use]
    pub const fn kind(&self) -> FavoriteKind {
        match self {
            Self::Restaurant(_) => FavoriteKind::Restaurant,
            Self::Product(_) => FavoriteKind::Product,
        }
    }

    /// The raw server id.
    #[must_use]
    pub const fn raw_id(&self) -> i32 {
        match self {
            Self::Restaurant(id) => id.as_i32(),
            Self::Product(id) => id.as_i32(),
        }
    }
}

impl From<RestaurantId> for FavoriteTarget {
    fn from(id: RestaurantId) -> Self {
        Self::Restaurant(id)
    }
}

impl From<ProductId> for FavoriteTarget {
    fn from(id: ProductId) -> Self {
        Self::Product(id)
    }
}

impl fmt::Display for FavoriteTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.raw_id())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_target_kind_and_id() {
        let target = FavoriteTarget::new(FavoriteKind::Product, 8);
        assert_eq!(target, FavoriteTarget::Product(ProductId::new(8)));
        assert_eq!(target.kind(), FavoriteKind::Product);
        assert_eq!(target.raw_id(), 8);
        assert_eq!(target.to_string(), "product 8");
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!(
            "Restaurants".parse::<FavoriteKind>().unwrap(),
            FavoriteKind::Restaurant
        );
        assert!("drinks".parse::<FavoriteKind>().is_err());
    }
}
