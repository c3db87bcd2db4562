//! Server-rendered pages
//!
//! Every page shares the navbar and the cart offcanvas, so every page mounts
//! the cart regions. The regions a page mounts are listed on `<body>` for the
//! client script to send back with each event.

use storefront_common::render::{escape, event_attr, grid_html};
use storefront_common::view::{detail_href, GridView};
use storefront_common::{Event, Product, RegionId, Storefront, Surface};

pub const HOME_REGIONS: [RegionId; 4] = [
    RegionId::CartBody,
    RegionId::CartTotal,
    RegionId::CartBadge,
    RegionId::Featured,
];

pub const SHOP_REGIONS: [RegionId; 7] = [
    RegionId::CartBody,
    RegionId::CartTotal,
    RegionId::CartBadge,
    RegionId::ProductGrid,
    RegionId::ShowMore,
    RegionId::Filters,
    RegionId::Loading,
];

pub const BASIC_REGIONS: [RegionId; 3] = RegionId::CART;

/// Related products shown under a product detail.
const RELATED_COUNT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Nav {
    Home,
    Shop,
    Contact,
    None,
}

pub fn home_page(store: &Storefront, home_count: usize) -> String {
    let surface = rendered(store, &HOME_REGIONS);
    let popular = GridView::from_entries(store.catalog().entries().take(home_count));

    let body = format!(
        r#"<section class="hero py-5 text-center">
    <h1 class="display-5 fw-bold">New season, new style</h1>
    <p class="lead">Fresh arrivals for every wardrobe.</p>
    <a href="/shop" class="btn btn-primary btn-lg">Shop now</a>
</section>
<section class="container py-4">
    <h2 class="mb-4">New Arrivals</h2>
    <div class="row con" id="featured-grid">{featured}</div>
</section>
<section class="container py-4">
    <h2 class="mb-4">Popular</h2>
    <div class="row">{popular}</div>
</section>"#,
        featured = slot(&surface, RegionId::Featured),
        popular = grid_html(&popular),
    );

    layout("Home", Nav::Home, &HOME_REGIONS, &surface, &body)
}

pub fn shop_page(store: &Storefront) -> String {
    let surface = rendered(store, &SHOP_REGIONS);

    let body = format!(
        r#"<section class="container py-4">
    <div class="d-flex justify-content-between align-items-center mb-3">
        <h2 class="mb-0">Shop</h2>
        <button type="button" id="reloadCatalog" class="btn btn-link">Refresh</button>
    </div>
    <div id="filter-controls" class="mb-4">{filters}</div>
    <div id="loading-indicator" class="text-center">{loading}</div>
    <div class="row" id="product-grid">{grid}</div>
    <div class="text-center mt-3" id="show-more">{show_more}</div>
</section>"#,
        filters = slot(&surface, RegionId::Filters),
        loading = slot(&surface, RegionId::Loading),
        grid = slot(&surface, RegionId::ProductGrid),
        show_more = slot(&surface, RegionId::ShowMore),
    );

    layout("Shop", Nav::Shop, &SHOP_REGIONS, &surface, &body)
}

/// Detail page for `product`, or a placeholder if the catalog is empty.
pub fn detail_page(store: &Storefront, product: Option<&Product>) -> String {
    let surface = rendered(store, &BASIC_REGIONS);

    let body = match product {
        Some(product) => {
            let related = GridView::from_entries(
                store
                    .catalog()
                    .entries()
                    .filter(|(_, p)| p.category == product.category && p.title != product.title)
                    .take(RELATED_COUNT),
            );
            let description = product
                .description
                .as_deref()
                .map(|d| format!(r#"<p class="product-description">{}</p>"#, escape(d)))
                .unwrap_or_default();
            let rating = product
                .rating
                .as_ref()
                .map(|r| {
                    format!(
                        r#"<p class="text-muted small">Rated {:.1} / 5 ({} reviews)</p>"#,
                        r.rate, r.count
                    )
                })
                .unwrap_or_default();
            let add = Event::AddToCart {
                title: product.title.clone(),
                position: store.catalog().position_of(product),
            };

            format!(
                r#"<section class="container py-5 product-detail">
    <div class="row">
        <div class="col-md-6"><img src="{img}" class="img-fluid rounded" alt="{title}"></div>
        <div class="col-md-6">
            <p class="text-muted text-uppercase small">{category}</p>
            <h1 class="h2">{title}</h1>
            <p class="fs-3 fw-bold product-price">{price}</p>
            {rating}
            {description}
            <button type="button" class="btn btn-primary btn-lg add-to-cart-btn" {add}>Add to cart</button>
            <a class="btn btn-link" href="{self_href}">Permalink</a>
        </div>
    </div>
</section>
<section class="container py-4">
    <h3 class="mb-4">You may also like</h3>
    <div class="row">{related}</div>
</section>"#,
                img = escape(&product.image_url()),
                title = escape(&product.title),
                category = escape(&product.category_label()),
                price = product.price,
                rating = rating,
                description = description,
                add = event_attr(&add),
                self_href = escape(&detail_href(product)),
                related = grid_html(&related),
            )
        }
        None => r#"<section class="container py-5 text-center"><p class="text-muted fs-4">Product not found.</p><a href="/shop" class="btn btn-primary">Back to shop</a></section>"#.to_string(),
    };

    layout("Product", Nav::None, &BASIC_REGIONS, &surface, &body)
}

pub fn contact_page(store: &Storefront) -> String {
    let surface = rendered(store, &BASIC_REGIONS);
    layout("Contact", Nav::Contact, &BASIC_REGIONS, &surface, CONTACT_BODY)
}

fn rendered(store: &Storefront, regions: &[RegionId]) -> Surface {
    let mut surface = Surface::new(regions.iter().copied());
    store.render_all(&mut surface);
    surface
}

fn slot(surface: &Surface, region: RegionId) -> &str {
    surface.get(region).unwrap_or_default()
}

fn layout(
    title: &str,
    nav: Nav,
    regions: &[RegionId],
    surface: &Surface,
    body: &str,
) -> String {
    let active = |n: Nav| if n == nav { " active" } else { "" };
    let regions_json = serde_json::to_string(regions).unwrap_or_else(|_| "[]".to_string());

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} | Storefront</title>
    <link href="https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/css/bootstrap.min.css" rel="stylesheet">
    <link href="https://cdnjs.cloudflare.com/ajax/libs/font-awesome/4.7.0/css/font-awesome.min.css" rel="stylesheet">
    <link href="/static/storefront.css" rel="stylesheet">
</head>
<body data-regions="{regions}">
<nav id="mainNavbar" class="navbar navbar-expand-lg fixed-top">
    <div class="container">
        <a class="navbar-brand fw-bold" href="/">Storefront</a>
        <ul class="navbar-nav me-auto">
            <li class="nav-item"><a class="nav-link{home}" href="/">Home</a></li>
            <li class="nav-item"><a class="nav-link{shop}" href="/shop">Shop</a></li>
            <li class="nav-item"><a class="nav-link{contact}" href="/contact">Contact</a></li>
        </ul>
        <a class="position-relative" data-bs-toggle="offcanvas" href="#offcanvasCart" role="button" aria-controls="offcanvasCart">
            <i class="fa fa-shopping-bag fs-4"></i>
            <span id="cart-count" class="icons count badge rounded-pill bg-danger">{badge}</span>
        </a>
    </div>
</nav>
<div class="offcanvas offcanvas-end" tabindex="-1" id="offcanvasCart" aria-labelledby="offcanvasCartLabel">
    <div class="offcanvas-header">
        <h5 class="offcanvas-title" id="offcanvasCartLabel">Your Cart</h5>
        <button type="button" class="btn-close" data-bs-dismiss="offcanvas" aria-label="Close"></button>
    </div>
    <div id="cart-body" class="offcanvas-body">{cart_body}</div>
    <div class="offcanvas-footer p-3 border-top d-flex justify-content-between align-items-center">
        <span>Total</span>
        <div id="cart-total" class="total">{cart_total}</div>
    </div>
</div>
<main class="pt-5 mt-4">
{body}
</main>
<footer class="py-4 text-center text-muted small">Storefront {version}</footer>
<script src="https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/js/bootstrap.bundle.min.js"></script>
<script src="/static/storefront.js"></script>
</body>
</html>
"##,
        title = escape(title),
        regions = escape(&regions_json),
        home = active(Nav::Home),
        shop = active(Nav::Shop),
        contact = active(Nav::Contact),
        badge = slot(surface, RegionId::CartBadge),
        cart_body = slot(surface, RegionId::CartBody),
        cart_total = slot(surface, RegionId::CartTotal),
        body = body,
        version = storefront_common::VERSION,
    )
}

const CONTACT_BODY: &str = r#"<section class="container py-5" style="max-width: 640px;">
    <h2 class="mb-4">Contact us</h2>
    <form id="contactForm" method="post" action="/contact/submit">
        <div class="mb-3">
            <label for="name" class="form-label">Name</label>
            <input type="text" class="form-control" id="name" name="name" required>
        </div>
        <div class="mb-3">
            <label for="email" class="form-label">Email</label>
            <input type="email" class="form-control" id="email" name="email" required>
        </div>
        <div class="mb-3">
            <label for="message" class="form-label">Message</label>
            <textarea class="form-control" id="message" name="message" rows="5" required></textarea>
        </div>
        <button type="submit" class="btn btn-primary">Send</button>
    </form>
</section>"#;

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_common::seed;
    use storefront_common::StorefrontOptions;

    fn store() -> Storefront {
        Storefront::new(seed::embedded_catalog(), StorefrontOptions::default())
    }

    #[test]
    fn test_shop_page_mounts_regions() {
        let html = shop_page(&store());
        for id in ["product-grid", "show-more", "filter-controls", "cart-body", "cart-count"] {
            assert!(html.contains(&format!(r#"id="{id}""#)), "missing {id}");
        }
        assert_eq!(html.matches("product-card").count(), 8);
        assert!(html.contains("showMoreBtn"));
        assert!(html.contains("&quot;product_grid&quot;"));
    }

    #[test]
    fn test_home_page_has_featured_and_popular() {
        let store = store();
        let html = home_page(&store, 4);
        assert!(html.contains(r#"id="featured-grid""#));
        assert!(!html.contains(r#"id="product-grid""#));
        let first = &store.catalog().products()[0].title;
        assert!(html.contains(&escape(first)));
    }

    #[test]
    fn test_detail_page_related_excludes_self() {
        let store = store();
        let product = store.catalog().products()[0].clone();
        let html = detail_page(&store, Some(&product));

        assert!(html.contains("add-to-cart-btn"));
        let related_section = html.split("You may also like").nth(1).unwrap();
        assert!(!related_section.contains(&format!(r#"alt="{}""#, escape(&product.title))));
        assert!(related_section.matches("product-card").count() <= RELATED_COUNT);
    }

    #[test]
    fn test_detail_page_without_product() {
        let empty = Storefront::new(Vec::new(), StorefrontOptions::default());
        assert!(detail_page(&empty, None).contains("Product not found."));
    }

    #[test]
    fn test_contact_page_form() {
        let html = contact_page(&store());
        assert!(html.contains(r#"action="/contact/submit""#));
        assert!(html.contains(r#"class="nav-link active" href="/contact""#));
        assert!(html.contains("Your cart is empty."));
    }
}
