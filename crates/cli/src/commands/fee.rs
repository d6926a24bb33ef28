//! Delivery fee estimates.
//!
//! # Usage
//!
//! ```bash
//! ho-cli fee --distance 6
//! ho-cli fee --restaurant 10.7769,106.7009 --customer 10.8066,106.7009
//! ```

use hungry_owl_client::Result;
use hungry_owl_client::delivery::DeliveryQuote;
use hungry_owl_core::{GeoCoordinate, Price};

use super::Context;

/// Print the fee for a distance under the configured schedule.
#[allow(clippy::print_stdout)]
pub fn for_distance(ctx: &Context, distance_km: f64) {
    let fee = Price::rounded(
        ctx.config.fee_schedule.fee_for(distance_km),
        ctx.config.currency,
    );
    println!("Distance: {distance_km:.1} km");
    println!("Fee:      {fee}");
}

/// Print the distance and fee between a restaurant and a customer.
///
/// Without `customer`, the configured default location is used.
pub async fn between(
    ctx: &Context,
    restaurant: GeoCoordinate,
    customer: Option<GeoCoordinate>,
) -> Result<()> {
    let state = ctx.state().await?;
    let quote = match customer {
        Some(customer) => state.delivery().quote(restaurant, customer),
        None => state.delivery().estimate(restaurant).await?,
    };
    print_quote(&quote);
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_quote(quote: &DeliveryQuote) {
    println!("Distance: {:.2} km", quote.distance_km);
    println!("Fee:      {}", quote.fee);
}
