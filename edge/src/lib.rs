//! The storefront edge.
//!
//! Sits in front of the page renderer and routes every request before it is
//! rendered: template previews are served from the vendor's regular routes, and
//! navigation that leaves a preview is redirected back into it. The path the
//! renderer should treat as current is passed along in a request header.

pub mod config;
pub mod edge_service;
pub mod errors;
pub mod matcher;
pub mod metrics_defs;
pub mod preview_router;
mod upstream;

#[cfg(test)]
mod testutils;

pub use edge_service::EdgeService;
pub use errors::EdgeError;

use shared::admin_service::AdminService;
use shared::http::run_http_service;

pub async fn run(config: config::Config) -> Result<(), EdgeError> {
    let edge_service = EdgeService::new(&config)?;
    tracing::info!(upstream = %config.upstream.url, "Starting edge");

    let edge_task = run_http_service(&config.listener.host, config.listener.port, edge_service);
    let admin_task = run_http_service(
        &config.admin_listener.host,
        config.admin_listener.port,
        AdminService::<_, EdgeError>::new(|| true),
    );

    tokio::try_join!(edge_task, admin_task)?;
    Ok(())
}
