//! Static file serving

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

/// Embedded client assets
#[derive(Debug, Default)]
pub struct StaticFiles;

impl StaticFiles {
    pub fn new() -> Self {
        Self
    }

    /// Serve a static file
    pub fn serve(&self, path: &str) -> Response {
        let content_type = guess_content_type(path);

        match path.trim_start_matches('/') {
            "storefront.js" => serve_embedded(STOREFRONT_JS, content_type),
            "storefront.css" => serve_embedded(STOREFRONT_CSS, content_type),
            _ => (StatusCode::NOT_FOUND, "File not found").into_response(),
        }
    }
}

fn guess_content_type(path: &str) -> &'static str {
    if path.ends_with(".js") {
        "application/javascript"
    } else if path.ends_with(".css") {
        "text/css"
    } else {
        "application/octet-stream"
    }
}

fn serve_embedded(content: &'static str, content_type: &'static str) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        content,
    )
        .into_response()
}

/// Binds `[data-event]` controls and swaps region fragments returned by
/// `/api/events`.
const STOREFRONT_JS: &str = r#"
(function () {
    'use strict';

    function mountedRegions() {
        try {
            return JSON.parse(document.body.dataset.regions || '[]');
        } catch (e) {
            console.error('Invalid region list', e);
            return [];
        }
    }

    function applyFragments(fragments) {
        Object.entries(fragments || {}).forEach(function ([id, html]) {
            const el = document.getElementById(id);
            if (!el) {
                console.error('Region not found:', id);
                return;
            }
            el.innerHTML = html;
            bind(el);
        });
    }

    async function post(url, body) {
        const res = await fetch(url, {
            method: 'POST',
            headers: { 'content-type': 'application/json', 'accept': 'application/json' },
            body: JSON.stringify(body),
        });
        if (!res.ok) {
            throw new Error(url + ' returned ' + res.status);
        }
        return res.json();
    }

    // Events are sent one at a time so each sees the previous result.
    let queue = Promise.resolve();

    function dispatch(event) {
        queue = queue
            .then(function () {
                return post('/api/events', { event: event, regions: mountedRegions() });
            })
            .then(function (body) { applyFragments(body.fragments); })
            .catch(function (err) { console.error('Event failed:', err); });
        return queue;
    }

    function reloadCatalog() {
        queue = queue
            .then(function () {
                return post('/api/catalog/reload', { regions: mountedRegions() });
            })
            .then(function (body) { applyFragments(body.fragments); })
            .catch(function (err) { console.error('Catalog reload failed:', err); });
    }

    function bind(root) {
        root.querySelectorAll('[data-event]').forEach(function (el) {
            if (el.dataset.bound) return;
            el.dataset.bound = '1';
            el.addEventListener('click', function (e) {
                e.preventDefault();
                try {
                    dispatch(JSON.parse(el.dataset.event));
                } catch (err) {
                    console.error('Invalid event payload', err);
                }
            });
        });

        const form = root.id === 'filterForm' ? root : root.querySelector('#filterForm');
        if (form && !form.dataset.bound) {
            form.dataset.bound = '1';
            form.addEventListener('submit', function (e) {
                e.preventDefault();
                dispatch({
                    action: 'apply_filters',
                    category: form.elements.category.value,
                    subcategory: form.elements.subcategory.value,
                    search: form.elements.search.value,
                });
            });
            const sort = form.querySelector('#sortSelect');
            if (sort) {
                sort.addEventListener('change', function () {
                    dispatch({ action: 'apply_sort', key: sort.value });
                });
            }
        }
    }

    document.addEventListener('DOMContentLoaded', function () {
        bind(document);

        const reload = document.getElementById('reloadCatalog');
        if (reload) {
            reload.addEventListener('click', function (e) {
                e.preventDefault();
                reloadCatalog();
            });
        }

        const mainNavbar = document.getElementById('mainNavbar');
        if (mainNavbar) {
            window.addEventListener('scroll', function () {
                mainNavbar.classList.toggle('scrolled', window.scrollY > 50);
            });
        }
    });
})();
"#;

const STOREFRONT_CSS: &str = r#"
#mainNavbar { background: transparent; transition: background-color .3s, box-shadow .3s; }
#mainNavbar.scrolled { background: #fff; box-shadow: 0 2px 8px rgba(0, 0, 0, .08); }
.product-card .card { position: relative; height: 100%; }
.product-card .card-img-top { aspect-ratio: 3 / 4; object-fit: cover; }
.product-badge { position: absolute; top: .5rem; left: .5rem; padding: .15rem .5rem; border-radius: .25rem; font-size: .75rem; color: #fff; z-index: 1; }
.new-badge { background: #198754; }
.sale-badge { background: #dc3545; }
.icons.count { position: absolute; top: -6px; right: -10px; font-size: .7rem; }
"#;
