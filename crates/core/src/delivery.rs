//! Delivery distance and fee calculation.
//!
//! Distance is the great-circle (haversine) distance between the restaurant
//! and the customer. The fee is tiered:
//!
//! | Rounded distance | Fee |
//! |------------------|-----|
//! | `d <= 2 km` | base fee |
//! | `2 < d <= 5 km` | base + `ceil(d - 2)` x per-km fee |
//! | `d > 5 km` | base + 3 x per-km fee + `ceil(d - 5)` x extra per-km fee |
//!
//! The distance is rounded to one decimal place before the tier is chosen,
//! and the ceiling is taken on that rounded value, so 2.04 km and 2.00 km
//! cost the same.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::GeoCoordinate;

/// Mean Earth radius used for distance calculation.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Default flat fee for short deliveries.
pub const BASE_FEE: Decimal = Decimal::from_parts(15_000, 0, 0, false, 0);
/// Default fee per started kilometer between the base and standard radius.
pub const PER_KM_FEE: Decimal = Decimal::from_parts(5_000, 0, 0, false, 0);
/// Default fee per started kilometer beyond the standard radius.
pub const EXTRA_PER_KM_FEE: Decimal = Decimal::from_parts(7_000, 0, 0, false, 0);

/// Great-circle distance between two points given in decimal degrees.
#[must_use]
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Great-circle distance between two coordinates in kilometers.
#[must_use]
pub fn distance_km(from: GeoCoordinate, to: GeoCoordinate) -> f64 {
    haversine_km(from.latitude, from.longitude, to.latitude, to.longitude)
}

/// Delivery fee for a distance using the default schedule.
#[must_use]
pub fn delivery_fee(distance_km: f64) -> Decimal {
    FeeSchedule::default().fee_for(distance_km)
}

/// Tiered delivery fee schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    /// Flat fee charged up to `base_radius_km`.
    pub base_fee: Decimal,
    /// Fee per started kilometer up to `standard_radius_km`.
    pub per_km_fee: Decimal,
    /// Fee per started kilometer beyond `standard_radius_km`.
    pub extra_per_km_fee: Decimal,
    /// Radius covered by the base fee.
    pub base_radius_km: u32,
    /// Radius after which the extra rate applies.
    pub standard_radius_km: u32,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            base_fee: BASE_FEE,
            per_km_fee: PER_KM_FEE,
            extra_per_km_fee: EXTRA_PER_KM_FEE,
            base_radius_km: 2,
            standard_radius_km: 5,
        }
    }
}

impl FeeSchedule {
    /// Fee for a delivery of `distance_km`.
    ///
    /// Non-finite and negative distances are charged the base fee. Results
    /// that would overflow saturate at `Decimal::MAX`.
    #[must_use]
    pub fn fee_for(&self, distance_km: f64) -> Decimal {
        let tenths = rounded_tenths(distance_km);
        let base_tenths = i64::from(self.base_radius_km) * 10;
        let standard_tenths = i64::from(self.standard_radius_km.max(self.base_radius_km)) * 10;

        if tenths <= base_tenths {
            return self.base_fee;
        }

        if tenths <= standard_tenths {
            let started_km = ceil_km(tenths - base_tenths);
            return charge(self.base_fee, &[(self.per_km_fee, started_km)]);
        }

        let standard_km = i64::from(self.standard_radius_km.saturating_sub(self.base_radius_km));
        let extra_km = ceil_km(tenths - standard_tenths);
        charge(
            self.base_fee,
            &[
                (self.per_km_fee, standard_km),
                (self.extra_per_km_fee, extra_km),
            ],
        )
    }
}

/// Distance rounded half away from zero to one decimal, in tenths of a km.
#[allow(clippy::cast_possible_truncation)]
fn rounded_tenths(distance_km: f64) -> i64 {
    if !distance_km.is_finite() || distance_km <= 0.0 {
        return 0;
    }
    // Float-to-int `as` saturates, which is what we want for absurd inputs.
    (distance_km * 10.0).round() as i64
}

/// Number of started kilometers in a positive span of tenths.
fn ceil_km(tenths: i64) -> i64 {
    tenths / 10 + i64::from(tenths % 10 != 0)
}

fn charge(base: Decimal, rates: &[(Decimal, i64)]) -> Decimal {
    rates
        .iter()
        .try_fold(base, |total, &(rate, km)| {
            rate.checked_mul(Decimal::from(km))
                .and_then(|part| total.checked_add(part))
        })
        .unwrap_or(Decimal::MAX)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn fee(km: f64) -> i64 {
        delivery_fee(km).try_into().unwrap()
    }

    #[test]
    fn test_base_tier() {
        assert_eq!(fee(0.0), 15_000);
        assert_eq!(fee(1.5), 15_000);
        assert_eq!(fee(2.0), 15_000);
    }

    #[test]
    fn test_rounding_happens_before_tiering() {
        // 2.04 rounds to 2.0 and stays in the base tier
        assert_eq!(fee(2.04), 15_000);
        // 2.06 rounds to 2.1, one started kilometer
        assert_eq!(fee(2.06), 20_000);
    }

    #[test]
    fn test_standard_tier() {
        assert_eq!(fee(3.2), 25_000);
        assert_eq!(fee(3.0), 20_000);
        assert_eq!(fee(5.0), 30_000);
    }

    #[test]
    fn test_extra_tier() {
        assert_eq!(fee(6.0), 37_000);
        assert_eq!(fee(5.1), 37_000);
        assert_eq!(fee(7.25), 51_000);
    }

    #[test]
    fn test_degenerate_distances() {
        assert_eq!(fee(-3.0), 15_000);
        assert_eq!(fee(f64::NAN), 15_000);
        assert_eq!(fee(f64::INFINITY), 15_000);
    }

    #[test]
    fn test_overflow_saturates() {
        let schedule = FeeSchedule {
            extra_per_km_fee: Decimal::MAX,
            ..FeeSchedule::default()
        };
        assert_eq!(schedule.fee_for(1_000.0), Decimal::MAX);
    }

    #[test]
    fn test_custom_schedule() {
        let schedule = FeeSchedule {
            base_fee: Decimal::from(10_000),
            per_km_fee: Decimal::from(4_000),
            extra_per_km_fee: Decimal::from(6_000),
            base_radius_km: 1,
            standard_radius_km: 3,
        };
        assert_eq!(schedule.fee_for(1.0), Decimal::from(10_000));
        assert_eq!(schedule.fee_for(2.5), Decimal::from(18_000));
        assert_eq!(schedule.fee_for(4.2), Decimal::from(30_000));
    }

    #[test]
    fn test_distance_identical_points_is_zero() {
        assert!(haversine_km(10.7769, 106.7009, 10.7769, 106.7009).abs() < f64::EPSILON);
        assert!(haversine_km(-33.9, 151.2, -33.9, 151.2).abs() < f64::EPSILON);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let forward = haversine_km(10.7769, 106.7009, 21.0285, 105.8542);
        let backward = haversine_km(21.0285, 105.8542, 10.7769, 106.7009);
        assert!((forward - backward).abs() < 1e-9);
    }

    #[test]
    fn test_distance_known_value() {
        // Paris to London
        let km = distance_km(
            GeoCoordinate::new(48.8566, 2.3522),
            GeoCoordinate::new(51.5074, -0.1278),
        );
        assert!((km - 343.5).abs() < 2.0, "got {km}");
    }
}
