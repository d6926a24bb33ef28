//! Restaurant listing.
//!
//! # Usage
//!
//! ```bash
//! ho-cli restaurants --page 2 --limit 20 --filter open=true --filter q=pho
//! ```

use std::num::NonZeroU32;
use std::sync::Arc;

use hungry_owl_client::api::RemoteError;
use hungry_owl_client::query::{ExecuteOutcome, ListFetcher, PageRequest};
use hungry_owl_client::{ClientError, Result};
use hungry_owl_core::Restaurant;
use serde_json::Value;

use super::Context;

/// Fetch and print one page of restaurants.
#[allow(clippy::print_stdout)]
pub async fn list(
    ctx: &Context,
    page: u32,
    limit: Option<u32>,
    filters: Vec<(String, Value)>,
) -> Result<()> {
    let state = ctx.state().await?;
    let api = ctx.api().await?;
    let fetcher: Arc<dyn ListFetcher<Restaurant>> = Arc::new(move |request: PageRequest| {
        let api = api.clone();
        async move { api.restaurants(&request).await }
    });

    let query = state.list_query(fetcher);
    if let Some(limit) = limit.and_then(NonZeroU32::new) {
        query.set_limit(limit);
    }
    query.update_filters(filters);

    // The total is unknown before the first fetch, so jumping to a later
    // page takes a second request.
    let mut outcome = query.execute().await;
    if page > 1 && matches!(outcome, ExecuteOutcome::Applied { .. }) {
        query.set_page(page);
        if query.page() != 1 {
            outcome = query.execute().await;
        }
    }

    if let ExecuteOutcome::Failed(message) = outcome {
        return Err(ClientError::Remote(RemoteError::Unavailable(message)));
    }

    for restaurant in query.items() {
        let rating = restaurant
            .rating
            .map_or_else(|| "-".to_string(), |r| format!("{r:.1}"));
        println!(
            "{:>6}  {:<32}  {:>4}  {}",
            restaurant.id.as_i32(),
            restaurant.name,
            rating,
            restaurant.address
        );
    }
    println!(
        "Page {} of {} ({} restaurants)",
        query.page(),
        query.total_pages().max(1),
        query.total()
    );
    Ok(())
}
