//! REST client for the ordering backend.
//!
//! Uses `reqwest` with a per-request timeout taken from configuration.
//! Timeouts surface as ordinary [`RemoteError::Http`] failures.

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use hungry_owl_core::{Product, Restaurant};

use super::{FavoriteService, RemoteError};
use crate::config::ApiConfig;
use crate::models::FavoriteKind;
use crate::query::{Page, PageRequest};

/// Maximum number of body characters kept in error messages.
const ERROR_BODY_LIMIT: usize = 200;

/// Client for the ordering REST API.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    token: Option<SecretString>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("token", &self.inner.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl ApiClient {
    /// Create an anonymous client.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError::Http` if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, RemoteError> {
        Self::build(config, None)
    }

    /// Create a client that authenticates with a bearer token.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError::Http` if the HTTP client cannot be built.
    pub fn with_token(config: &ApiConfig, token: SecretString) -> Result<Self, RemoteError> {
        Self::build(config, Some(token))
    }

    fn build(config: &ApiConfig, token: Option<SecretString>) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        // A trailing slash makes `Url::join` append instead of replacing the
        // last path segment.
        let mut base_url = config.base_url.clone();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url,
                token,
            }),
        })
    }

    /// Whether requests carry a bearer token.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner.token.is_some()
    }

    /// Fetch one page of restaurants.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError` on transport, status or decoding failure.
    pub async fn restaurants(&self, request: &PageRequest) -> Result<Page<Restaurant>, RemoteError> {
        self.get_page("restaurants", request).await
    }

    /// Fetch one page of products.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError` on transport, status or decoding failure.
    pub async fn products(&self, request: &PageRequest) -> Result<Page<Product>, RemoteError> {
        self.get_page("products", request).await
    }

    fn url(&self, path: &str) -> Result<Url, RemoteError> {
        self.inner
            .base_url
            .join(path)
            .map_err(|e| RemoteError::Unavailable(format!("invalid request path {path}: {e}")))
    }

    fn request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        let builder = self.inner.client.request(method, url);
        match &self.inner.token {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    #[instrument(skip(self, request), fields(page = request.page, limit = request.limit))]
    async fn get_page<T: DeserializeOwned>(
        &self,
        path: &str,
        request: &PageRequest,
    ) -> Result<Page<T>, RemoteError> {
        let mut url = self.url(path)?;
        url.query_pairs_mut()
            .append_pair("page", &request.page.to_string())
            .append_pair("limit", &request.limit.to_string())
            .extend_pairs(request.filters.to_query_pairs());

        let builder = self.request(reqwest::Method::GET, url);
        self.send_json(builder).await
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<String, RemoteError> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!(
                status = %status,
                body = %body.chars().take(ERROR_BODY_LIMIT).collect::<String>(),
                "API returned non-success status"
            );
            return Err(RemoteError::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        Ok(body)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, RemoteError> {
        let body = self.send(builder).await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(error = %e, "failed to decode API response");
            RemoteError::Parse(e)
        })
    }
}

/// Pull a human-readable message out of an error body.
///
/// Prefers a JSON `message` or `error` field and falls back to the raw body.
fn error_message(body: &str) -> String {
    let from_json = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            ["message", "error"]
                .iter()
                .find_map(|key| value.get(key).and_then(|v| v.as_str()).map(String::from))
        });

    from_json.unwrap_or_else(|| body.chars().take(ERROR_BODY_LIMIT).collect())
}

#[async_trait]
impl FavoriteService for ApiClient {
    #[instrument(skip(self))]
    async fn favorite_ids(&self, kind: FavoriteKind) -> Result<Vec<i32>, RemoteError> {
        let url = self.url(&format!("favorites/{}", kind.path_segment()))?;
        let ids: Vec<i32> = self.send_json(self.request(reqwest::Method::GET, url)).await?;
        debug!(count = ids.len(), "fetched favorite ids");
        Ok(ids)
    }

    #[instrument(skip(self))]
    async fn toggle_favorite(&self, kind: FavoriteKind, id: i32) -> Result<(), RemoteError> {
        let url = self.url(&format!("favorites/{}/{id}/toggle", kind.path_segment()))?;
        self.send(self.request(reqwest::Method::POST, url)).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config(base: &str) -> ApiConfig {
        ApiConfig {
            base_url: Url::parse(base).unwrap(),
            timeout: std::time::Duration::from_secs(5),
        }
    }

    #[test]
    fn test_url_joins_below_base_path() {
        let client = ApiClient::new(&config("https://api.example.com/v1")).unwrap();
        assert_eq!(
            client.url("favorites/products").unwrap().as_str(),
            "https://api.example.com/v1/favorites/products"
        );
    }

    #[test]
    fn test_debug_redacts_token() {
        let client = ApiClient::with_token(
            &config("https://api.example.com/"),
            SecretString::from("super-secret-token"),
        )
        .unwrap();
        let debug = format!("{client:?}");
        assert!(client.is_authenticated());
        assert!(!debug.contains("super-secret-token"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(error_message(r#"{"message":"Not allowed"}"#), "Not allowed");
        assert_eq!(error_message(r#"{"error":"Expired token"}"#), "Expired token");
        assert_eq!(error_message("Bad Gateway"), "Bad Gateway");
    }
}
