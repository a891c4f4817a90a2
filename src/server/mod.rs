//! HTTP server (A4, §6): wires every external-interface endpoint onto
//! `AppContext`. Grounded on the teacher's `server::start_server`/
//! `shutdown_signal` (ctrl_c + SIGTERM, `axum::serve` with graceful
//! shutdown), extended with the drain deadline §4.12 asks for — the
//! teacher's own shutdown never needed one because Lodestarr has no
//! long-running plugin calls to wait out.

mod download;
mod ops;
mod stremio;
mod torznab;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::app::AppContext;

/// Upper bound on how long graceful shutdown waits for in-flight plugin
/// calls and HTTP connections to finish before the process exits anyway.
const DRAIN_DEADLINE: Duration = Duration::from_secs(30);

pub fn router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/api/v1/torznab/indexers", get(torznab::list_indexers))
        .route("/api/v1/torznab/{plugin}", get(torznab::torznab_endpoint))
        .route("/api/v1/torznab/{plugin}/health", get(torznab::health))
        .route("/api/v1/download/{job_id}", get(download::download))
        .route("/api/v1/download/{job_id}/info", get(download::info))
        .route("/api/v1/stremio/manifest.json", get(stremio::manifest))
        .route("/api/v1/stremio/catalog/{kind}/{id}.json", get(stremio::catalog))
        .route("/api/v1/stremio/stream/{kind}/{id}.json", get(stremio::stream_list))
        .route("/api/v1/stremio/play/{stream_id}", get(stremio::play))
        .route("/healthz", get(ops::healthz))
        .route("/readyz", get(ops::readyz))
        .route("/stats/metrics", get(ops::metrics))
        .route("/stats/plugin-scores", get(ops::plugin_scores))
        .with_state(ctx)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

pub async fn start_server(ctx: Arc<AppContext>) -> anyhow::Result<()> {
    let addr = format!("{}:{}", ctx.config.bind_host, ctx.config.bind_port);
    let app = router(ctx.clone());

    tracing::info!(addr = %addr, "starting http server");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    let serve = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());
    match tokio::time::timeout(DRAIN_DEADLINE, serve).await {
        Ok(result) => result?,
        Err(_) => tracing::warn!("drain deadline elapsed, forcing shutdown"),
    }

    ctx.shutdown().await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("signal received, starting graceful shutdown");
}
