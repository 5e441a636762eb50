//! HTTP prediction service.
//!
//! Serves a [`CostPredictor`] trained once at startup. Every request reads
//! the same immutable model, so answers never depend on request order.

mod error;
pub mod server;

use std::net::SocketAddr;
use std::sync::Arc;

use costpred_pipeline::CostPredictor;
pub use error::ServerError;
use tracing::info;

/// Serves the JSON API on `addr` until the process is terminated.
///
/// Port 0 binds an ephemeral port; the bound address is logged either way.
pub async fn run_server(
    predictor: CostPredictor,
    addr: SocketAddr,
) -> Result<(), ServerError> {
    let state = Arc::new(server::AppState { predictor });
    let app = server::build_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::bind(addr, e))?;
    let local = listener.local_addr()?;
    info!(addr = %local, "listening on http://{local}");

    axum::serve(listener, app).await.map_err(ServerError::io)?;

    Ok(())
}
