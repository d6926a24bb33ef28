//! List coordination with pagination, filters and overlapping fetches.

#![allow(clippy::unwrap_used)]

use std::num::NonZeroU32;
use std::sync::{Arc, Mutex};

use hungry_owl_client::api::RemoteError;
use hungry_owl_client::query::{
    ExecuteOutcome, FetchStatus, ListFetcher, ListQuery, Page, PageRequest,
};
use serde_json::json;
use tokio::sync::oneshot;

/// Server double: 45 dishes, filterable by `max_price`.
fn catalog() -> Arc<dyn ListFetcher<u32>> {
    Arc::new(|request: PageRequest| async move {
        let max = request
            .filters
            .get("max_price")
            .and_then(serde_json::Value::as_u64)
            .unwrap_or(u64::MAX);
        let matching: Vec<u32> = (1..=45_u32)
            .filter(|id| u64::from(*id) * 1_000 <= max)
            .collect();
        let total = matching.len() as u64;
        let skip = ((request.page - 1) * request.limit) as usize;
        let items: Vec<u32> = matching
            .into_iter()
            .skip(skip)
            .take(request.limit as usize)
            .collect();
        Ok::<_, RemoteError>(Page::new(items, total))
    })
}

fn limit(n: u32) -> NonZeroU32 {
    NonZeroU32::new(n).unwrap()
}

#[tokio::test]
async fn test_paging_through_results() {
    let query = ListQuery::new(catalog(), limit(20));
    query.execute().await;
    assert_eq!(query.total(), 45);
    assert_eq!(query.total_pages(), 3);
    assert!(query.has_next_page());
    assert!(!query.has_prev_page());

    query.next_page();
    query.next_page();
    query.next_page();
    query.execute().await;
    assert_eq!(query.page(), 3);
    assert_eq!(query.items(), (41..=45).collect::<Vec<_>>());
    assert!(!query.has_next_page());

    query.prev_page();
    assert_eq!(query.page(), 2);
}

#[tokio::test]
async fn test_filter_narrows_and_resets_page() {
    let query = ListQuery::new(catalog(), limit(10));
    query.execute().await;
    query.set_page(4);
    query.execute().await;
    assert_eq!(query.items().first(), Some(&31));

    query.update_filter("max_price", 15_000);
    assert_eq!(query.page(), 1);
    query.execute().await;
    assert_eq!(query.total(), 15);
    assert_eq!(query.total_pages(), 2);

    query.set_limit(limit(5));
    assert_eq!(query.page(), 1);
    query.execute().await;
    assert_eq!(query.total_pages(), 3);
}

#[tokio::test]
async fn test_empty_result_pins_page_to_one() {
    let query = ListQuery::new(catalog(), limit(10));
    query.update_filter("max_price", 0);
    query.execute().await;

    assert_eq!(query.total(), 0);
    query.next_page();
    assert_eq!(query.page(), 1);
    assert_eq!(query.status(), FetchStatus::Success);
}

#[tokio::test]
async fn test_typing_fast_shows_only_latest_search() {
    let (release, gate) = oneshot::channel::<()>();
    let gate = Arc::new(Mutex::new(Some(gate)));
    let fetcher: Arc<dyn ListFetcher<String>> = Arc::new(move |request: PageRequest| {
        let term = request.filters.get("q").cloned().unwrap_or(json!(""));
        let wait = if term == json!("ph") {
            gate.lock().unwrap().take()
        } else {
            None
        };
        async move {
            if let Some(wait) = wait {
                let _ = wait.await;
            }
            Ok::<_, RemoteError>(Page::new(vec![format!("results for {term}")], 1))
        }
    });
    let query = ListQuery::new(fetcher, limit(10));

    query.update_filter("q", "ph");
    let slow = query.execute();
    query.update_filter("q", "pho");
    let fast = query.execute();

    let (slow, fast) = tokio::join!(slow, async {
        let outcome = fast.await;
        release.send(()).unwrap();
        outcome
    });

    assert_eq!(fast, ExecuteOutcome::Applied { items: 1, total: 1 });
    assert_eq!(slow, ExecuteOutcome::Stale);
    assert_eq!(query.items(), vec![r#"results for "pho""#.to_string()]);
}
