//! Storefront Web Server
//!
//! Server-rendered shop pages, a JSON event endpoint that applies cart and
//! catalog interactions, and a product filtering API.

pub mod config;
pub mod contact;
pub mod pages;
pub mod server;
pub mod static_files;
pub mod upstream;

pub use config::StoreConfig;
pub use server::WebServer;
