//! HTTP-level tests against a running storefront server

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

use storefront_common::seed;
use storefront_common::StaticFetcher;
use storefront_web::contact::{ContactError, ContactMessage, Notifier};
use storefront_web::{StoreConfig, WebServer};

struct Harness {
    base: String,
    http: reqwest::Client,
}

impl Harness {
    async fn start(server: WebServer) -> Self {
        assert!(server.load_catalog().await);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let router = server.router();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap();
        Self {
            base: format!("http://{}", addr),
            http,
        }
    }

    async fn embedded() -> Self {
        Self::start(WebServer::new(StoreConfig::default()).unwrap()).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn get_json(&self, path: &str) -> Value {
        let resp = self.http.get(self.url(path)).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK, "GET {path}");
        resp.json().await.unwrap()
    }

    async fn get_text(&self, path: &str) -> String {
        let resp = self.http.get(self.url(path)).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK, "GET {path}");
        resp.text().await.unwrap()
    }

    async fn event(&self, event: Value, regions: Option<Value>) -> Value {
        let mut body = json!({ "event": event });
        if let Some(regions) = regions {
            body["regions"] = regions;
        }
        let resp = self
            .http
            .post(self.url("/api/events"))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        resp.json().await.unwrap()
    }
}

fn titles(products: &Value) -> Vec<String> {
    products
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["title"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_health() {
    let h = Harness::embedded().await;
    let body = h.get_json("/api/health").await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "storefront");
}

#[tokio::test]
async fn test_add_to_cart_twice() {
    let h = Harness::embedded().await;
    let add = json!({ "action": "add_to_cart", "title": "hoodie" });

    h.event(add.clone(), None).await;
    let body = h.event(add, None).await;

    assert_eq!(body["fragments"]["cart-count"], "2");
    assert_eq!(body["fragments"]["cart-total"], "<h4>$24.00</h4>");
    assert_eq!(body["cart"]["item_count"], 2);
    // Cart events leave the grid alone.
    assert!(body["fragments"].get("product-grid").is_none());

    let cart = h.get_json("/api/cart").await;
    assert_eq!(cart["rows"].as_array().unwrap().len(), 1);
    assert_eq!(cart["rows"][0]["quantity"], 2);
    assert_eq!(cart["total"], "$24.00");
}

#[tokio::test]
async fn test_cart_stepper_and_remove() {
    let h = Harness::embedded().await;
    h.event(json!({ "action": "add_to_cart", "title": "hoodie" }), None).await;
    h.event(json!({ "action": "add_to_cart", "title": "T-Shirt" }), None).await;

    let body = h
        .event(json!({ "action": "change_quantity", "index": 0, "delta": 1 }), None)
        .await;
    assert_eq!(body["fragments"]["cart-total"], "<h4>$36.00</h4>");
    assert_eq!(body["fragments"]["cart-count"], "3");

    let body = h
        .event(json!({ "action": "change_quantity", "index": 1, "delta": -5 }), None)
        .await;
    assert_eq!(body["cart"]["item_count"], 3);

    h.event(json!({ "action": "remove_item", "index": 0 }), None).await;
    let body = h.event(json!({ "action": "remove_item", "index": 0 }), None).await;
    assert_eq!(body["fragments"]["cart-count"], "0");
    assert!(body["fragments"]["cart-body"]
        .as_str()
        .unwrap()
        .contains("Your cart is empty."));
}

#[tokio::test]
async fn test_events_render_only_mounted_regions() {
    let h = Harness::embedded().await;
    let body = h
        .event(
            json!({ "action": "add_to_cart", "title": "Midi Dress" }),
            Some(json!(["cart_body", "cart_badge"])),
        )
        .await;

    let fragments = body["fragments"].as_object().unwrap();
    assert!(fragments.contains_key("cart-body"));
    assert!(fragments.contains_key("cart-count"));
    assert!(!fragments.contains_key("cart-total"));

    // Without the cart body nothing in the cart panel is rendered, but the
    // cart still changes.
    let body = h
        .event(
            json!({ "action": "add_to_cart", "title": "Midi Dress" }),
            Some(json!(["cart_badge"])),
        )
        .await;
    assert!(body["fragments"].as_object().unwrap().is_empty());
    assert_eq!(body["cart"]["item_count"], 2);
}

#[tokio::test]
async fn test_unknown_product_is_ignored() {
    let h = Harness::embedded().await;
    let body = h
        .event(json!({ "action": "add_to_cart", "title": "Ghost Jacket" }), None)
        .await;
    assert_eq!(body["fragments"]["cart-count"], "0");
}

#[tokio::test]
async fn test_card_event_adds_clicked_variant() {
    let h = Harness::embedded().await;
    h.event(
        json!({ "action": "apply_filters", "category": "lady", "search": "T-Shirt With Print" }),
        None,
    )
    .await;

    let catalog = h.get_json("/api/catalog").await;
    let card = catalog["visible"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["title"] == "T-Shirt With Print")
        .unwrap()
        .clone();
    assert_eq!(card["price"], "$10.00");

    let body = h.event(card["add"].clone(), None).await;
    assert_eq!(body["fragments"]["cart-total"], "<h4>$10.00</h4>");

    let cart = h.get_json("/api/cart").await;
    assert_eq!(cart["rows"][0]["image_url"], card["image_url"]);
}

#[tokio::test]
async fn test_huge_quantity_delta_is_capped() {
    let h = Harness::embedded().await;
    h.event(json!({ "action": "add_to_cart", "title": "hoodie" }), None).await;
    h.event(json!({ "action": "add_to_cart", "title": "Midi Dress" }), None).await;
    for _ in 0..3 {
        h.event(
            json!({ "action": "change_quantity", "index": 0, "delta": i32::MAX }),
            None,
        )
        .await;
    }

    let cart = h.get_json("/api/cart").await;
    assert_eq!(cart["rows"][0]["quantity"], 999);
    assert_eq!(cart["badge"], "1000");
}

#[tokio::test]
async fn test_malformed_event_rejected() {
    let h = Harness::embedded().await;
    let resp = h
        .http
        .post(h.url("/api/events"))
        .json(&json!({ "event": { "action": "teleport" } }))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_client_error());
}

#[tokio::test]
async fn test_show_more_reveals_everything() {
    let h = Harness::embedded().await;
    h.get_text("/shop").await;

    let catalog = h.get_json("/api/catalog").await;
    assert_eq!(catalog["visible"].as_array().unwrap().len(), 8);
    assert_eq!(catalog["has_more"], true);

    let body = h.event(json!({ "action": "show_more" }), None).await;
    assert_eq!(body["fragments"]["show-more"], "");
    assert_eq!(
        body["fragments"]["product-grid"]
            .as_str()
            .unwrap()
            .matches("product-card")
            .count(),
        seed::embedded_catalog().len()
    );

    let catalog = h.get_json("/api/catalog").await;
    assert_eq!(catalog["has_more"], false);
}

#[tokio::test]
async fn test_filter_sort_and_clear() {
    let h = Harness::embedded().await;
    h.event(
        json!({ "action": "apply_filters", "category": "lady", "subcategory": "dress" }),
        None,
    )
    .await;
    let body = h.event(json!({ "action": "apply_sort", "key": "price-desc" }), None).await;
    assert!(body["fragments"]["filter-controls"]
        .as_str()
        .unwrap()
        .contains(r#"<option value="price-desc" selected>"#));

    let catalog = h.get_json("/api/catalog").await;
    assert_eq!(catalog["matching"], 4);
    assert_eq!(catalog["sort"], "price-desc");
    let visible = titles(&catalog["visible"]);
    assert_eq!(visible[0], "Cami Mini Dress");
    assert_eq!(visible[3], "Midi Dress");

    h.event(json!({ "action": "clear_filters" }), None).await;
    let catalog = h.get_json("/api/catalog").await;
    assert_eq!(catalog["matching"], catalog["total"]);
    assert_eq!(catalog["sort"], Value::Null);
}

#[tokio::test]
async fn test_shop_page_query_and_reset() {
    let h = Harness::embedded().await;

    let html = h.get_text("/shop?search=dress").await;
    assert_eq!(html.matches("product-card").count(), 4);
    let catalog = h.get_json("/api/catalog").await;
    assert_eq!(catalog["query"]["search"], "dress");

    h.event(json!({ "action": "add_to_cart", "title": "Midi Dress" }), None).await;

    // A plain reload resets the view but keeps the cart.
    let html = h.get_text("/shop").await;
    assert_eq!(html.matches("product-card").count(), 8);
    assert!(html.contains(r#"id="cart-count" class="icons count badge rounded-pill bg-danger">1<"#));
    let catalog = h.get_json("/api/catalog").await;
    assert_eq!(catalog["query"]["search"], "");
}

#[tokio::test]
async fn test_products_filter_endpoint() {
    let h = Harness::embedded().await;

    let products = h
        .get_json("/api/products/filter?category=lady&search=shirt&sort=price-asc")
        .await;
    let prices: Vec<f64> = products
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["price"].as_f64().unwrap())
        .collect();
    assert!(!prices.is_empty());
    assert!(prices.windows(2).all(|w| w[0] <= w[1]));
    assert!(titles(&products)
        .iter()
        .all(|t| t.to_lowercase().contains("shirt")));

    let all = h.get_json("/api/products/filter").await;
    assert_eq!(all.as_array().unwrap().len(), seed::embedded_catalog().len());
}

#[tokio::test]
async fn test_products_filter_men_excludes_women() {
    let server = WebServer::with_fetcher(
        StoreConfig::default(),
        Arc::new(StaticFetcher::new(seed::fallback_products())),
        Arc::new(storefront_web::contact::LogNotifier),
    );
    let h = Harness::start(server).await;

    let men = h.get_json("/api/products/filter?category=men").await;
    assert_eq!(
        titles(&men),
        vec!["Classic White T-Shirt", "Slim Fit Jeans", "Casual Sneakers"]
    );

    let product = h.get_json("/api/products/4").await;
    assert_eq!(product["title"], "Summer Dress");
    assert_eq!(product["price"], 59.99);

    let resp = h.http.get(h.url("/api/products/404")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_detail_lookup() {
    let h = Harness::embedded().await;

    let html = h.get_text("/detail?name=Wide%20Leg%20Sweatpants").await;
    assert!(html.contains("<h1 class=\"h2\">Wide Leg Sweatpants</h1>"));

    let html = h.get_text("/detail?product-title=Midi%20Dress").await;
    assert!(html.contains("<h1 class=\"h2\">Midi Dress</h1>"));

    // Unknown title and no id: first product.
    let html = h.get_text("/detail?name=nothing&id=abc").await;
    assert!(html.contains("<h1 class=\"h2\">hoodie</h1>"));
}

#[tokio::test]
async fn test_reload_returns_fragments() {
    let h = Harness::embedded().await;
    let resp = h
        .http
        .post(h.url("/api/catalog/reload"))
        .json(&json!({ "regions": ["product_grid", "show_more", "loading"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["loaded"], true);
    assert_eq!(body["products"], seed::embedded_catalog().len());
    assert_eq!(body["fragments"]["loading-indicator"], "");
    assert!(body["fragments"]["product-grid"]
        .as_str()
        .unwrap()
        .contains("product-card"));
}

#[tokio::test]
async fn test_pages_and_assets() {
    let h = Harness::embedded().await;

    for path in ["/", "/home", "/contact"] {
        let html = h.get_text(path).await;
        assert!(html.contains(r#"id="cart-body""#), "{path}");
        assert!(html.contains("/static/storefront.js"), "{path}");
    }

    let js = h.get_text("/static/storefront.js").await;
    assert!(js.contains("/api/events"));

    let resp = h.http.get(h.url("/nope")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "not found");
}

struct ScriptedNotifier {
    outcome: fn() -> Result<(), ContactError>,
}

#[async_trait]
impl Notifier for ScriptedNotifier {
    async fn send(&self, _message: &ContactMessage) -> Result<(), ContactError> {
        (self.outcome)()
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

async fn contact_harness(outcome: fn() -> Result<(), ContactError>) -> Harness {
    let server = WebServer::with_fetcher(
        StoreConfig::default(),
        Arc::new(StaticFetcher::new(seed::embedded_catalog())),
        Arc::new(ScriptedNotifier { outcome }),
    );
    Harness::start(server).await
}

async fn submit(h: &Harness, fields: &[(&str, &str)]) -> reqwest::Response {
    let body = fields
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");
    h.http
        .post(h.url("/contact/submit"))
        .header("content-type", "application/x-www-form-urlencoded")
        .body(body)
        .send()
        .await
        .unwrap()
}

const FULL_FORM: [(&str, &str); 3] = [
    ("name", "Ann"),
    ("email", "ann@example.com"),
    ("message", "Do you restock hoodies?"),
];

#[tokio::test]
async fn test_contact_missing_fields() {
    let h = contact_harness(|| Ok(())).await;
    let resp = submit(&h, &[("name", "Ann"), ("email", "ann@example.com")]).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(resp.text().await.unwrap(), "Missing required fields");
}

#[tokio::test]
async fn test_contact_success_redirects() {
    let h = contact_harness(|| Ok(())).await;
    let resp = submit(&h, &FULL_FORM).await;
    assert!(resp.status().is_redirection());
    assert_eq!(resp.headers()["location"], "/contact");
}

#[tokio::test]
async fn test_contact_timeout_is_503() {
    let h = contact_harness(|| Err(ContactError::Timeout)).await;
    let resp = submit(&h, &FULL_FORM).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_contact_delivery_failure_is_500() {
    let h = contact_harness(|| Err(ContactError::Delivery("bad gateway".to_string()))).await;
    let resp = submit(&h, &FULL_FORM).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
