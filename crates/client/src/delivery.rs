//! Delivery quotes.
//!
//! Combines the device's current position with a restaurant's location and
//! the configured [`FeeSchedule`].

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, instrument};

use hungry_owl_core::{CurrencyCode, FeeSchedule, GeoCoordinate, Price, distance_km};

/// Errors reported by a [`LocationProvider`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    /// The user refused location access.
    #[error("location permission denied")]
    PermissionDenied,

    /// No position could be determined.
    #[error("location unavailable: {0}")]
    Unavailable(String),
}

/// Source of the device's current position.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// # Errors
    ///
    /// Returns `LocationError` if no position is available.
    async fn current_location(&self) -> Result<GeoCoordinate, LocationError>;
}

/// A provider that always reports the same position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticLocation(pub GeoCoordinate);

#[async_trait]
impl LocationProvider for StaticLocation {
    async fn current_location(&self) -> Result<GeoCoordinate, LocationError> {
        Ok(self.0)
    }
}

/// Distance and fee for delivering from one restaurant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryQuote {
    pub distance_km: f64,
    pub fee: Price,
}

/// Quotes delivery fees from the current location.
#[derive(Clone)]
pub struct DeliveryEstimator {
    location: Arc<dyn LocationProvider>,
    schedule: FeeSchedule,
    currency: CurrencyCode,
}

impl std::fmt::Debug for DeliveryEstimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeliveryEstimator")
            .field("schedule", &self.schedule)
            .field("currency", &self.currency)
            .finish_non_exhaustive()
    }
}

impl DeliveryEstimator {
    #[must_use]
    pub fn new(
        location: Arc<dyn LocationProvider>,
        schedule: FeeSchedule,
        currency: CurrencyCode,
    ) -> Self {
        Self {
            location,
            schedule,
            currency,
        }
    }

    #[must_use]
    pub const fn schedule(&self) -> &FeeSchedule {
        &self.schedule
    }

    /// Quote a delivery from `restaurant` to wherever the device is.
    ///
    /// # Errors
    ///
    /// Returns `LocationError` if the current position is unavailable.
    #[instrument(skip(self))]
    pub async fn estimate(&self, restaurant: GeoCoordinate) -> Result<DeliveryQuote, LocationError> {
        let here = self.location.current_location().await?;
        let quote = self.quote(restaurant, here);
        debug!(distance_km = quote.distance_km, fee = %quote.fee, "delivery quoted");
        Ok(quote)
    }

    /// Quote a delivery between two known points.
    #[must_use]
    pub fn quote(&self, from: GeoCoordinate, to: GeoCoordinate) -> DeliveryQuote {
        let distance_km = distance_km(from, to);
        DeliveryQuote {
            distance_km,
            fee: Price::rounded(self.schedule.fee_for(distance_km), self.currency),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    struct Denied;

    #[async_trait]
    impl LocationProvider for Denied {
        async fn current_location(&self) -> Result<GeoCoordinate, LocationError> {
            Err(LocationError::PermissionDenied)
        }
    }

    #[tokio::test]
    async fn test_estimate_same_point_is_base_fee() {
        let here = GeoCoordinate::new(10.7769, 106.7009);
        let estimator = DeliveryEstimator::new(
            Arc::new(StaticLocation(here)),
            FeeSchedule::default(),
            CurrencyCode::VND,
        );

        let quote = estimator.estimate(here).await.unwrap();
        assert!(quote.distance_km.abs() < f64::EPSILON);
        assert_eq!(quote.fee.amount, Decimal::from(15_000));
        assert_eq!(quote.fee.display(), "15,000₫");
    }

    #[tokio::test]
    async fn test_estimate_uses_distance_tier() {
        // Roughly 3.3 km apart along a meridian.
        let restaurant = GeoCoordinate::new(10.7769, 106.7009);
        let customer = GeoCoordinate::new(10.8066, 106.7009);
        let estimator = DeliveryEstimator::new(
            Arc::new(StaticLocation(customer)),
            FeeSchedule::default(),
            CurrencyCode::VND,
        );

        let quote = estimator.estimate(restaurant).await.unwrap();
        assert!((quote.distance_km - 3.3).abs() < 0.05, "got {}", quote.distance_km);
        assert_eq!(quote.fee.amount, Decimal::from(25_000));
    }

    #[tokio::test]
    async fn test_estimate_without_location() {
        let estimator = DeliveryEstimator::new(
            Arc::new(Denied),
            FeeSchedule::default(),
            CurrencyCode::VND,
        );
        let err = estimator
            .estimate(GeoCoordinate::new(0.0, 0.0))
            .await
            .unwrap_err();
        assert_eq!(err, LocationError::PermissionDenied);
    }
}
