//! webbaby-server - HTTP surface for Web Baby
//!
//! Exposes command handling, teaching and the knowledge store over a JSON
//! API. Domain errors are mapped to status codes in [`error::ApiError`].

pub mod error;
pub mod http;
mod state;

use std::sync::Arc;

use tokio::net::TcpListener;

pub use error::{ApiError, ServerError};
pub use http::create_router;
pub use state::AppState;

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(addr: &str, state: AppState) -> Result<(), ServerError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::Bind {
            addr: addr.to_string(),
            source: e,
        })?;

    tracing::info!("webbaby server listening on {}", addr);

    let router = create_router(Arc::new(state));
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))?;

    tracing::info!("webbaby server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
