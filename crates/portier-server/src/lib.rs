pub mod auth;
pub mod error;
pub mod invoker;
pub mod routes;
pub mod scheduler;
pub mod state;

use axum::middleware;
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Build the axum Router with all routes and middleware.
/// Used by `serve_on()` and available for integration testing.
pub fn build_router(app_state: AppState) -> Router {
    let timer_api = Router::new()
        .route("/api/timers", get(routes::timers::list_timers))
        .route(
            "/api/timer",
            get(routes::timers::get_timer)
                .post(routes::timers::arm_timer)
                .delete(routes::timers::cancel_timer),
        )
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            auth::require_auth,
        ));

    Router::new()
        .route("/api/health", get(routes::health::health))
        .merge(timer_api)
        // Every other path is an unlock request keyed by that path.
        .fallback(routes::unlock::unlock)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Serve on a pre-bound listener until `shutdown` resolves.
///
/// Persisted timers are re-armed before the first request is accepted.
pub async fn serve_on(
    app_state: AppState,
    listener: tokio::net::TcpListener,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let recovered = app_state.scheduler.recover()?;
    let addr = listener.local_addr()?;
    let app = build_router(app_state);

    tracing::info!(%addr, recovered, "portier listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}
