//! Catalog snapshots received from the API.
//!
//! These are read-only copies of server records. The cart keeps a
//! [`Product`] snapshot per line so totals can be derived offline.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::geo::GeoCoordinate;
use super::id::{CategoryId, ProductId, RestaurantId};

/// A dish or item sold by a restaurant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Server id.
    pub id: ProductId,
    /// Restaurant selling the product.
    pub restaurant_id: RestaurantId,
    /// Display name.
    pub name: String,
    /// Unit price before discount, in the currency's standard unit.
    pub price: Decimal,
    /// Discount percentage, nominally in `[0, 100]`.
    ///
    /// Not validated: values outside the range are passed through as
    /// received.
    #[serde(default)]
    pub discount: Decimal,
    /// Optional category.
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    /// Image URL.
    #[serde(default)]
    pub image_url: Option<String>,
}

impl Product {
    /// Unit price after applying the percentage discount.
    ///
    /// Exact; no rounding is applied.
    #[must_use]
    pub fn effective_price(&self) -> Decimal {
        self.price * (Decimal::ONE - self.discount / Decimal::ONE_HUNDRED)
    }
}

/// A restaurant listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    /// Server id.
    pub id: RestaurantId,
    /// Display name.
    pub name: String,
    /// Street address.
    #[serde(default)]
    pub address: String,
    /// Pickup location used for delivery fee estimation.
    pub location: GeoCoordinate,
    /// Average rating, if any reviews exist.
    #[serde(default)]
    pub rating: Option<f64>,
    /// Image URL.
    #[serde(default)]
    pub image_url: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(price: i64, discount: i64) -> Product {
        Product {
            id: ProductId::new(1),
            restaurant_id: RestaurantId::new(1),
            name: "Pho bo".to_string(),
            price: Decimal::from(price),
            discount: Decimal::from(discount),
            category_id: None,
            image_url: None,
        }
    }

    #[test]
    fn test_effective_price() {
        assert_eq!(product(50_000, 0).effective_price(), Decimal::from(50_000));
        assert_eq!(product(50_000, 10).effective_price(), Decimal::from(45_000));
        assert_eq!(product(50_000, 100).effective_price(), Decimal::ZERO);
    }

    #[test]
    fn test_out_of_range_discount_passes_through() {
        assert_eq!(product(1_000, 150).effective_price(), Decimal::from(-500));
    }

    #[test]
    fn test_product_deserializes_from_api_shape() {
        let json = r#"{
            "id": 12,
            "restaurantId": 3,
            "name": "Banh mi",
            "price": "25000",
            "discount": "15"
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, ProductId::new(12));
        assert_eq!(product.discount, Decimal::from(15));
        assert!(product.image_url.is_none());
    }
}
