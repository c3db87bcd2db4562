//! Server configuration

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use storefront_common::{SearchScope, StorefrontOptions};

/// Storefront server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// HTTP listen address
    pub listen: String,

    /// Where the catalog comes from
    pub catalog: CatalogConfig,

    /// Upstream product API settings
    pub upstream: UpstreamConfig,

    /// Grid and home page settings
    pub display: DisplayConfig,

    /// Contact form delivery
    pub contact: ContactConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:5000".to_string(),
            catalog: CatalogConfig::default(),
            upstream: UpstreamConfig::default(),
            display: DisplayConfig::default(),
            contact: ContactConfig::default(),
        }
    }
}

/// Catalog source selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CatalogConfig {
    /// Built-in clothing catalog
    Embedded,
    /// Upstream product API (`{base_url}/products`), cached with fallback
    Upstream,
    /// A filtering endpoint accepting `category`, `search`, `sort`
    FilterEndpoint { url: String },
}

impl Default for CatalogConfig {
    fn default() -> Self {
        CatalogConfig::Embedded
    }
}

/// Upstream product API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub cache_ttl_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "https://fakestoreapi.com".to_string(),
            timeout_secs: 10,
            cache_ttl_secs: 300,
        }
    }
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

/// Display configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Cards before "show more" on the shop page (0 = no limit)
    pub page_size: usize,
    /// New arrivals on the home page
    pub featured_count: usize,
    /// Products in the home page "popular" strip
    pub home_count: usize,
    /// Also match the search text against the category
    pub search_categories: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            page_size: 8,
            featured_count: 8,
            home_count: 4,
            search_categories: false,
        }
    }
}

impl DisplayConfig {
    pub fn storefront_options(&self) -> StorefrontOptions {
        StorefrontOptions {
            page_size: (self.page_size > 0).then_some(self.page_size),
            featured_count: self.featured_count,
            search_scope: if self.search_categories {
                SearchScope::TitleAndCategory
            } else {
                SearchScope::Title
            },
        }
    }
}

/// Contact form delivery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactConfig {
    /// Telegram bot token; without it submissions are only logged
    pub telegram_token: Option<String>,
    /// Telegram chat id or channel name
    pub telegram_chat_id: Option<String>,
    pub telegram_api_base: String,
    pub timeout_secs: u64,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            telegram_token: None,
            telegram_chat_id: None,
            telegram_api_base: "https://api.telegram.org".to_string(),
            timeout_secs: 10,
        }
    }
}

impl StoreConfig {
    /// Load configuration from file, falling back to defaults if absent
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Apply environment overrides
    pub fn apply_env(&mut self) {
        if let Some(v) = env_non_empty("STOREFRONT_ADDR") {
            self.listen = v;
        }
        if let Some(v) = env_non_empty("STOREFRONT_UPSTREAM_URL") {
            self.upstream.base_url = v;
        }
        if let Some(v) = env_non_empty("TELEGRAM_BOT_TOKEN") {
            self.contact.telegram_token = Some(v);
        }
        if let Some(v) = env_non_empty("TELEGRAM_CHAT_ID") {
            self.contact.telegram_chat_id = Some(v);
        }
    }

    pub fn listen_addr(&self) -> anyhow::Result<SocketAddr> {
        self.listen
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid listen address '{}': {}", self.listen, e))
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.listen_addr()?;
        if let CatalogConfig::FilterEndpoint { url } = &self.catalog {
            if url.trim().is_empty() {
                anyhow::bail!("catalog.url is required for the filter_endpoint source");
            }
        }
        if self.contact.telegram_token.is_some() && self.contact.telegram_chat_id.is_none() {
            anyhow::bail!("contact.telegram_chat_id is required when a bot token is set");
        }
        Ok(())
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
