//! HTTP boundary of the workbench.
//!
//! ## Endpoints
//! - GET  /_/keys - Classified key lists
//! - GET  /_/translation - Source values and translation of one key
//! - POST /_/translation - Store a translation
//! - POST /_/save - Write the data file
//! - POST /_/save_and_build - Write the data file and build localisation files
//! - GET  /healthz

mod handlers;
pub mod response;

use std::net::SocketAddr;

use axum::Router;
use axum::routing::{
    get,
    post,
};

pub use response::ApiResponse;

use crate::service::ServerState;

/// Creates the workbench router.
pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/_/keys", get(handlers::list_keys))
        .route("/_/translation", get(handlers::get_translation).post(handlers::put_translation))
        .route("/_/save", post(handlers::save))
        .route("/_/save_and_build", post(handlers::save_and_build))
        .with_state(state)
}

/// Serves the router on `addr` until Ctrl-C.
///
/// # Errors
/// Fails when the address cannot be bound.
pub async fn serve(state: ServerState, addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Workbench listening");

    axum::serve(listener, router(state)).with_graceful_shutdown(shutdown_signal()).await?;

    tracing::info!("Workbench stopped");
    Ok(())
}

/// Resolves on Ctrl-C.
async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(%error, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
