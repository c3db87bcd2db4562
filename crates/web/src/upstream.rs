//! Upstream product API client
//!
//! [`ProductClient`] wraps `{base_url}/products` with a time-bounded cache.
//! Any failure (network, status, decode) degrades to the built-in fallback
//! list so pages always have something to show.

use async_trait::async_trait;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use storefront_common::seed;
use storefront_common::{Error, FilterParams, Product, ProductFetcher, Result};

use crate::config::UpstreamConfig;

struct CacheEntry {
    products: Vec<Product>,
    fetched_at: Instant,
}

/// Cached client for the upstream product list
pub struct ProductClient {
    http: reqwest::Client,
    base_url: String,
    ttl: Duration,
    cache: RwLock<Option<CacheEntry>>,
}

impl ProductClient {
    pub fn new(cfg: &UpstreamConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(cfg.timeout())
            .user_agent(concat!("storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            ttl: cfg.cache_ttl(),
            cache: RwLock::new(None),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// All products. Serves from cache while fresh; never fails.
    pub async fn get_products(&self, use_cache: bool) -> Vec<Product> {
        if use_cache {
            let cache = self.cache.read().await;
            if let Some(entry) = cache.as_ref() {
                if entry.fetched_at.elapsed() < self.ttl {
                    debug!("Serving {} products from cache", entry.products.len());
                    return entry.products.clone();
                }
            }
        }

        match self.fetch_products().await {
            Ok(products) => {
                info!("Fetched {} products from {}", products.len(), self.base_url);
                let mut cache = self.cache.write().await;
                *cache = Some(CacheEntry {
                    products: products.clone(),
                    fetched_at: Instant::now(),
                });
                products
            }
            Err(e) => {
                warn!("Product API unavailable, using fallback products: {}", e);
                seed::fallback_products()
            }
        }
    }

    async fn fetch_products(&self) -> std::result::Result<Vec<Product>, reqwest::Error> {
        let url = format!("{}/products", self.base_url);
        self.http
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<Product>>()
            .await
    }

    /// Look up a product by its upstream id.
    pub async fn get_product_by_id(&self, id: u64) -> Option<Product> {
        self.get_products(true)
            .await
            .into_iter()
            .find(|p| p.id == Some(id))
    }

    pub async fn clear_cache(&self) {
        *self.cache.write().await = None;
        info!("Product cache cleared");
    }
}

#[async_trait]
impl ProductFetcher for ProductClient {
    async fn fetch(&self, params: &FilterParams) -> Result<Vec<Product>> {
        Ok(params.apply(&self.get_products(true).await))
    }

    fn describe(&self) -> String {
        format!("{}/products", self.base_url)
    }
}

/// Client for a remote filtering endpoint (`?category=&search=&sort=`).
///
/// Unlike [`ProductClient`] this surfaces failures, so a catalog load keeps
/// its prior view instead of swapping in fallback data.
pub struct FilterEndpointClient {
    http: reqwest::Client,
    url: String,
}

impl FilterEndpointClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }
}

#[async_trait]
impl ProductFetcher for FilterEndpointClient {
    async fn fetch(&self, params: &FilterParams) -> Result<Vec<Product>> {
        let resp = self
            .http
            .get(&self.url)
            .query(params)
            .send()
            .await
            .map_err(|e| Error::Fetch(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Fetch(format!("{} returned {}", self.url, status)));
        }

        let body = resp.text().await.map_err(|e| Error::Fetch(e.to_string()))?;
        Ok(serde_json::from_str(&body)?)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
    use std::net::SocketAddr;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct Upstream {
        hits: AtomicUsize,
    }

    async fn products_handler(State(up): State<Arc<Upstream>>) -> Json<serde_json::Value> {
        up.hits.fetch_add(1, Ordering::SeqCst);
        Json(serde_json::json!([
            {"id": 1, "title": "Rain Jacket", "price": 59.5, "category": "men's clothing",
             "image": "https://img.example/1.jpg", "rating": {"rate": 4.1, "count": 20}},
            {"id": 2, "title": "Opal Ring", "price": 120.0, "category": "jewelery",
             "image": "https://img.example/2.jpg"}
        ]))
    }

    async fn spawn(router: Router) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        addr
    }

    async fn spawn_upstream() -> (SocketAddr, Arc<Upstream>) {
        let up = Arc::new(Upstream::default());
        let router = Router::new()
            .route("/products", get(products_handler))
            .with_state(up.clone());
        (spawn(router).await, up)
    }

    fn client_for(addr: SocketAddr, ttl_secs: u64) -> ProductClient {
        ProductClient::new(&UpstreamConfig {
            base_url: format!("http://{}/", addr),
            timeout_secs: 5,
            cache_ttl_secs: ttl_secs,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_products_are_cached() {
        let (addr, up) = spawn_upstream().await;
        let client = client_for(addr, 300);

        let first = client.get_products(true).await;
        let second = client.get_products(true).await;

        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
        assert_eq!(up.hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_bypass_and_clear_cache() {
        let (addr, up) = spawn_upstream().await;
        let client = client_for(addr, 300);

        client.get_products(true).await;
        client.get_products(false).await;
        assert_eq!(up.hits.load(Ordering::SeqCst), 2);

        client.clear_cache().await;
        client.get_products(true).await;
        assert_eq!(up.hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_expired_cache_refetches() {
        let (addr, up) = spawn_upstream().await;
        let client = client_for(addr, 0);

        client.get_products(true).await;
        client.get_products(true).await;
        assert_eq!(up.hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_forbidden_falls_back() {
        let router = Router::new().route("/products", get(|| async { StatusCode::FORBIDDEN }));
        let addr = spawn(router).await;
        let client = client_for(addr, 300);

        let products = client.get_products(true).await;
        assert_eq!(products, seed::fallback_products());
    }

    #[tokio::test]
    async fn test_unreachable_falls_back() {
        let client = ProductClient::new(&UpstreamConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 2,
            cache_ttl_secs: 300,
        })
        .unwrap();

        assert_eq!(client.get_products(true).await.len(), 8);
        assert_eq!(
            client.get_product_by_id(4).await.map(|p| p.title),
            Some("Summer Dress".to_string())
        );
        assert!(client.get_product_by_id(99).await.is_none());
    }

    #[tokio::test]
    async fn test_fetch_applies_filter_params() {
        let (addr, _) = spawn_upstream().await;
        let client = client_for(addr, 300);

        let params = FilterParams {
            category: "men".to_string(),
            ..FilterParams::default()
        };
        let products = client.fetch(&params).await.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].title, "Rain Jacket");
        assert_eq!(products[0].price.cents(), 5950);
    }

    #[tokio::test]
    async fn test_filter_endpoint_error_surfaces() {
        let router = Router::new().route(
            "/filter",
            get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        );
        let addr = spawn(router).await;
        let client =
            FilterEndpointClient::new(format!("http://{}/filter", addr), Duration::from_secs(5))
                .unwrap();

        let err = client.fetch(&FilterParams::default()).await.unwrap_err();
        assert!(matches!(err, Error::Fetch(_)));
    }

    #[tokio::test]
    async fn test_filter_endpoint_malformed_body() {
        let router = Router::new().route("/filter", get(|| async { "<html>oops</html>" }));
        let addr = spawn(router).await;
        let client =
            FilterEndpointClient::new(format!("http://{}/filter", addr), Duration::from_secs(5))
                .unwrap();

        let err = client.fetch(&FilterParams::default()).await.unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
        assert!(!err.is_recoverable());
    }

    #[tokio::test]
    async fn test_filter_endpoint_sends_query() {
        async fn echo(
            axum::extract::Query(params): axum::extract::Query<FilterParams>,
        ) -> Json<serde_json::Value> {
            Json(serde_json::json!([
                {"title": format!("{}|{}|{}", params.category, params.search, params.sort),
                 "price": 1.0}
            ]))
        }
        let addr = spawn(Router::new().route("/filter", get(echo))).await;
        let client =
            FilterEndpointClient::new(format!("http://{}/filter", addr), Duration::from_secs(5))
                .unwrap();

        let params = FilterParams {
            category: "women".to_string(),
            search: "silk dress".to_string(),
            sort: "price-asc".to_string(),
        };
        let products = client.fetch(&params).await.unwrap();
        assert_eq!(products[0].title, "women|silk dress|price-asc");
    }
}
