//! Web server implementation

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use storefront_common::catalog::ALL;
use storefront_common::seed;
use storefront_common::view::{CartView, ProductCardView};
use storefront_common::{
    CatalogSource, Event, FilterParams, Product, ProductFetcher, RegionId, SortKey,
    StaticFetcher, Storefront, Surface, ViewQuery,
};

use crate::config::{CatalogConfig, StoreConfig};
use crate::contact::{notifier_from_config, ContactError, ContactForm, Notifier};
use crate::pages;
use crate::static_files::StaticFiles;
use crate::upstream::{FilterEndpointClient, ProductClient};

/// Web server state
#[derive(Clone)]
pub struct WebServer {
    state: Arc<WebServerState>,
}

struct WebServerState {
    /// Cart and catalog view. Each event is applied and rendered under one
    /// write guard.
    store: RwLock<Storefront>,
    /// Source for full catalog loads
    source: CatalogSource,
    /// Backs `/api/products/filter`
    products: Arc<dyn ProductFetcher>,
    /// Present when the upstream API is the catalog source
    upstream: Option<Arc<ProductClient>>,
    notifier: Arc<dyn Notifier>,
    static_files: StaticFiles,
    cfg: StoreConfig,
}

pub async fn serve(cfg: StoreConfig) -> anyhow::Result<()> {
    let addr = cfg.listen_addr()?;
    let server = WebServer::new(cfg)?;
    server.load_catalog().await;
    server.serve(addr).await
}

impl WebServer {
    /// Create a server wired to the sources the configuration names
    pub fn new(cfg: StoreConfig) -> anyhow::Result<Self> {
        let notifier = notifier_from_config(&cfg.contact)?;

        let server = match cfg.catalog.clone() {
            CatalogConfig::Embedded => {
                let products = seed::embedded_catalog();
                let fetcher = Arc::new(StaticFetcher::new(products.clone()));
                Self::from_parts(cfg, CatalogSource::Embedded(products), fetcher, notifier, None)
            }
            CatalogConfig::Upstream => {
                let client = Arc::new(ProductClient::new(&cfg.upstream)?);
                Self::from_parts(
                    cfg,
                    CatalogSource::Remote(client.clone()),
                    client.clone(),
                    notifier,
                    Some(client),
                )
            }
            CatalogConfig::FilterEndpoint { url } => {
                let client = Arc::new(FilterEndpointClient::new(url, cfg.upstream.timeout())?);
                Self::from_parts(cfg, CatalogSource::Remote(client.clone()), client, notifier, None)
            }
        };

        Ok(server)
    }

    /// Create a server over an explicit fetcher and notifier
    pub fn with_fetcher(
        cfg: StoreConfig,
        fetcher: Arc<dyn ProductFetcher>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self::from_parts(cfg, CatalogSource::Remote(fetcher.clone()), fetcher, notifier, None)
    }

    fn from_parts(
        cfg: StoreConfig,
        source: CatalogSource,
        products: Arc<dyn ProductFetcher>,
        notifier: Arc<dyn Notifier>,
        upstream: Option<Arc<ProductClient>>,
    ) -> Self {
        info!(
            "Catalog source: {:?}, contact delivery: {}",
            source,
            notifier.name()
        );
        let store = Storefront::new(Vec::new(), cfg.display.storefront_options());

        Self {
            state: Arc::new(WebServerState {
                store: RwLock::new(store),
                source,
                products,
                upstream,
                notifier,
                static_files: StaticFiles::new(),
                cfg,
            }),
        }
    }

    /// Load the catalog from the configured source. A failed load leaves the
    /// current catalog in place.
    pub async fn load_catalog(&self) -> bool {
        let mut surface = Surface::default();
        reload(&self.state, &mut surface).await
    }

    /// Create router
    pub fn router(&self) -> Router {
        Router::new()
            // Pages
            .route("/", get(home_handler))
            .route("/home", get(home_handler))
            .route("/shop", get(shop_handler))
            .route("/detail", get(detail_handler))
            .route("/contact", get(contact_handler))
            .route("/contact/submit", post(contact_submit_handler))
            // Storefront API
            .route("/api/events", post(events_handler))
            .route("/api/cart", get(cart_handler))
            .route("/api/catalog", get(catalog_handler))
            .route("/api/catalog/reload", post(reload_handler))
            .route("/api/products/filter", get(filter_products_handler))
            .route("/api/products/:id", get(product_handler))
            .route("/api/health", get(health_handler))
            .route("/static/*path", get(static_handler))
            .fallback(not_found_handler)
            .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Start the web server
    pub async fn serve(self, addr: SocketAddr) -> anyhow::Result<()> {
        info!("Storefront listening on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, self.router()).await?;

        Ok(())
    }
}

/// Two-phase catalog load. The fetch runs without holding the store lock.
async fn reload(state: &WebServerState, surface: &mut Surface) -> bool {
    state.store.write().await.begin_load(surface);

    if let Some(upstream) = &state.upstream {
        upstream.clear_cache().await;
    }
    let result = state.source.fetch(&FilterParams::default()).await;

    state.store.write().await.finish_load(result, surface)
}

fn json_error(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(serde_json::json!({ "error": message.into() })),
    )
        .into_response()
}

// ============================================================================
// Pages
// ============================================================================

async fn home_handler(State(state): State<Arc<WebServerState>>) -> Html<String> {
    let store = state.store.read().await;
    Html(pages::home_page(&store, state.cfg.display.home_count))
}

#[derive(Debug, Default, Deserialize)]
struct ShopQuery {
    category: Option<String>,
    search: Option<String>,
}

/// A full page load resets the view, then applies any query filters.
async fn shop_handler(
    State(state): State<Arc<WebServerState>>,
    Query(query): Query<ShopQuery>,
) -> Html<String> {
    let mut store = state.store.write().await;
    store.reset_view();

    if query.category.is_some() || query.search.is_some() {
        let event = Event::ApplyFilters {
            category: query.category.unwrap_or_else(|| ALL.to_string()),
            subcategory: ALL.to_string(),
            search: query.search.unwrap_or_default(),
        };
        if let Err(e) = store.apply(&event) {
            warn!("Ignoring shop query: {}", e);
        }
    }

    Html(pages::shop_page(&store))
}

#[derive(Debug, Default, Deserialize)]
struct DetailQuery {
    name: Option<String>,
    #[serde(rename = "product-title")]
    product_title: Option<String>,
    id: Option<String>,
}

/// Lookup order: title (`name`, then `product-title`), then `id`, then the
/// first catalog product.
async fn detail_handler(
    State(state): State<Arc<WebServerState>>,
    Query(query): Query<DetailQuery>,
) -> Html<String> {
    let store = state.store.read().await;
    let catalog = store.catalog();

    let by_title = query
        .name
        .as_deref()
        .or(query.product_title.as_deref())
        .and_then(|title| catalog.find_by_title(title));
    let by_id = || {
        query
            .id
            .as_deref()
            .and_then(|id| id.trim().parse::<u64>().ok())
            .and_then(|id| catalog.find_by_id(id))
    };
    let product = by_title
        .or_else(by_id)
        .or_else(|| catalog.products().first());

    if product.is_none() {
        debug!("Detail requested with an empty catalog");
    }
    Html(pages::detail_page(&store, product))
}

async fn contact_handler(State(state): State<Arc<WebServerState>>) -> Html<String> {
    let store = state.store.read().await;
    Html(pages::contact_page(&store))
}

async fn contact_submit_handler(
    State(state): State<Arc<WebServerState>>,
    Form(form): Form<ContactForm>,
) -> Response {
    let message = match form.validate() {
        Ok(message) => message,
        Err(e) => {
            warn!("Contact form submitted with missing fields");
            return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
        }
    };

    info!("Processing contact form from {} ({})", message.name, message.email);

    match state.notifier.send(&message).await {
        Ok(()) => {
            info!("Contact message from {} delivered via {}", message.name, state.notifier.name());
            Redirect::to("/contact").into_response()
        }
        Err(ContactError::Timeout) => {
            error!("Timeout delivering contact message");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                ContactError::Timeout.to_string(),
            )
                .into_response()
        }
        Err(e) => {
            error!("Failed to deliver contact message: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to send message. Please try again later.",
            )
                .into_response()
        }
    }
}

// ============================================================================
// Storefront API
// ============================================================================

#[derive(Debug, Deserialize)]
struct EventRequest {
    event: Event,
    /// Regions mounted on the sending page; all regions when absent.
    #[serde(default)]
    regions: Option<Vec<RegionId>>,
}

#[derive(Debug, Serialize)]
struct CartSummary {
    total: String,
    item_count: u32,
}

#[derive(Debug, Serialize)]
struct EventResponse {
    /// Rendered HTML keyed by element id
    fragments: BTreeMap<&'static str, String>,
    cart: CartSummary,
}

fn surface_for(regions: Option<Vec<RegionId>>) -> Surface {
    match regions {
        Some(regions) => Surface::new(regions),
        None => Surface::full(),
    }
}

async fn events_handler(
    State(state): State<Arc<WebServerState>>,
    Json(req): Json<EventRequest>,
) -> Json<EventResponse> {
    let mut surface = surface_for(req.regions);

    let mut store = state.store.write().await;
    store.dispatch(&req.event, &mut surface);
    let totals = store.cart().totals();

    Json(EventResponse {
        fragments: surface.fragments(),
        cart: CartSummary {
            total: totals.total.to_string(),
            item_count: totals.item_count,
        },
    })
}

async fn cart_handler(State(state): State<Arc<WebServerState>>) -> Json<CartView> {
    Json(state.store.read().await.cart_view())
}

#[derive(Debug, Serialize)]
struct CatalogSnapshot {
    query: ViewQuery,
    sort: Option<SortKey>,
    total: usize,
    matching: usize,
    has_more: bool,
    loading: bool,
    visible: Vec<ProductCardView>,
}

async fn catalog_handler(State(state): State<Arc<WebServerState>>) -> Json<CatalogSnapshot> {
    let store = state.store.read().await;
    let catalog = store.catalog();

    Json(CatalogSnapshot {
        query: catalog.query().clone(),
        sort: catalog.sort(),
        total: catalog.products().len(),
        matching: catalog.len(),
        has_more: catalog.has_more(),
        loading: catalog.is_loading(),
        visible: catalog
            .visible_entries()
            .map(|(i, p)| ProductCardView::from_entry(i, p))
            .collect(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ReloadRequest {
    #[serde(default)]
    regions: Option<Vec<RegionId>>,
}

#[derive(Debug, Serialize)]
struct ReloadResponse {
    loaded: bool,
    products: usize,
    fragments: BTreeMap<&'static str, String>,
}

async fn reload_handler(
    State(state): State<Arc<WebServerState>>,
    body: Option<Json<ReloadRequest>>,
) -> Json<ReloadResponse> {
    let req = body.map(|Json(r)| r).unwrap_or_default();
    let mut surface = surface_for(req.regions);

    let loaded = reload(&state, &mut surface).await;
    let products = state.store.read().await.catalog().products().len();

    Json(ReloadResponse {
        loaded,
        products,
        fragments: surface.fragments(),
    })
}

async fn filter_products_handler(
    State(state): State<Arc<WebServerState>>,
    Query(params): Query<FilterParams>,
) -> Json<Vec<Product>> {
    match state.products.fetch(&params).await {
        Ok(products) => Json(products),
        Err(e) => {
            error!("Product filter failed ({}): {}", state.products.describe(), e);
            Json(Vec::new())
        }
    }
}

async fn product_handler(
    State(state): State<Arc<WebServerState>>,
    Path(id): Path<u64>,
) -> Response {
    let product = match &state.upstream {
        Some(upstream) => upstream.get_product_by_id(id).await,
        None => state.store.read().await.catalog().find_by_id(id).cloned(),
    };

    match product {
        Some(product) => Json(product).into_response(),
        None => json_error(StatusCode::NOT_FOUND, format!("product {} not found", id)),
    }
}

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "storefront",
        "version": storefront_common::VERSION,
    }))
}

async fn static_handler(
    State(state): State<Arc<WebServerState>>,
    Path(path): Path<String>,
) -> Response {
    state.static_files.serve(&path)
}

async fn not_found_handler() -> Response {
    json_error(StatusCode::NOT_FOUND, "not found")
}
