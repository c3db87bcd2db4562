//! Storefront web server

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use storefront_web::config::{CatalogConfig, StoreConfig};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CatalogKind {
    Embedded,
    Upstream,
}

#[derive(Parser)]
#[command(name = "storefront")]
#[command(about = "Storefront - product catalog and shopping cart web server")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "storefront.toml")]
    config: PathBuf,

    /// HTTP listen address
    #[arg(short, long)]
    listen: Option<String>,

    /// Catalog source
    #[arg(long, value_enum)]
    catalog: Option<CatalogKind>,

    /// Upstream product API base URL
    #[arg(long)]
    upstream_url: Option<String>,

    /// Load the catalog from a filtering endpoint
    #[arg(long, conflicts_with = "catalog")]
    filter_url: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(filter)
            .init();
    }

    info!("Storefront v{}", storefront_common::VERSION);

    // File, then environment, then flags
    let mut cfg = StoreConfig::load(&cli.config)?;
    cfg.apply_env();

    if let Some(listen) = cli.listen {
        cfg.listen = listen;
    }
    if let Some(url) = cli.upstream_url {
        cfg.upstream.base_url = url;
    }
    match (cli.catalog, cli.filter_url) {
        (_, Some(url)) => cfg.catalog = CatalogConfig::FilterEndpoint { url },
        (Some(CatalogKind::Embedded), None) => cfg.catalog = CatalogConfig::Embedded,
        (Some(CatalogKind::Upstream), None) => cfg.catalog = CatalogConfig::Upstream,
        (None, None) => {}
    }

    cfg.validate()?;

    storefront_web::server::serve(cfg).await
}
