use anyhow::Result;
use axum::{
    middleware,
    routing::get,
    Router,
};
use opentelemetry::global;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{
    config::Config,
    handlers::tasks::{self, AppState},
    metrics::{self, RequestMetrics},
    signals::setup_signal_handlers,
    store::TaskStore,
};

/// How long in-flight requests may run after a shutdown signal
const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(5);

/// Start the task service
///
/// This function:
/// 1. Sets up signal handlers for graceful shutdown
/// 2. Builds handler state and the Axum application
/// 3. Binds to the configured port
/// 4. Serves requests, draining in-flight work within a bounded grace period
pub async fn start_server(config: &Config, store: Arc<dyn TaskStore>) -> Result<()> {
    let (shutdown_tx, signal_handle) = setup_signal_handlers();
    let mut shutdown_rx = shutdown_tx.subscribe();
    let mut drain_rx = shutdown_tx.subscribe();

    let state = AppState {
        store,
        tracer: Arc::new(global::tracer("taskmaster/handlers")),
        metrics: RequestMetrics::new(&global::meter("taskmaster")),
    };
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server starting on port {}", config.port);

    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = drain_rx.recv().await;
                info!("Shutdown signal received, draining connections...");
            })
            .await
    });

    tokio::select! {
        // Listener failed before any signal arrived
        res = &mut server => {
            res??;
            return Ok(());
        }
        _ = shutdown_rx.recv() => {}
    }

    // Bounded grace period for in-flight requests
    match tokio::time::timeout(SHUTDOWN_GRACE_PERIOD, &mut server).await {
        Ok(res) => res??,
        Err(_) => {
            server.abort();
            anyhow::bail!(
                "Server forced to shutdown after {}s grace period",
                SHUTDOWN_GRACE_PERIOD.as_secs()
            );
        }
    }

    signal_handle.await?;
    info!("Server stopped gracefully");

    Ok(())
}

/// Create the Axum router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/tasks",
            get(tasks::list_tasks).post(tasks::create_task),
        )
        .route(
            "/tasks/:id",
            get(tasks::get_task)
                .put(tasks::update_task)
                .delete(tasks::delete_task),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            metrics::track_requests,
        ))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
