// rest/mod.rs — Public REST API server.
//
// Axum HTTP server; JSON request/response throughout. Static frontend
// assets (if present) are served as the router fallback.
//
// Endpoints:
//   POST   /auth/register
//   POST   /auth/login
//   GET    /tasks              (optional view query parameters)
//   POST   /tasks
//   PUT    /tasks/{id}
//   DELETE /tasks/{id}
//   GET    /tasks/categories
//   GET    /health

pub mod auth;
pub mod error;
pub mod routes;

use anyhow::Result;
use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::info;

use crate::AppContext;

pub async fn start_rest_server(ctx: Arc<AppContext>) -> Result<()> {
    let bind = format!("{}:{}", ctx.config.bind_address, ctx.config.port);
    let addr: SocketAddr = bind.parse()?;

    let router = build_router(ctx);

    info!("REST API listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}

pub fn build_router(ctx: Arc<AppContext>) -> Router {
    // Everything under /tasks requires a verified bearer token.
    let tasks = Router::new()
        .route(
            "/tasks",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route("/tasks/categories", get(routes::tasks::list_categories))
        .route(
            "/tasks/{id}",
            put(routes::tasks::update_task).delete(routes::tasks::delete_task),
        )
        .route_layer(middleware::from_fn_with_state(
            ctx.clone(),
            auth::require_auth,
        ));

    Router::new()
        // Health (no auth)
        .route("/health", get(routes::health))
        // Accounts
        .route("/auth/register", post(routes::auth::register))
        .route("/auth/login", post(routes::auth::login))
        .merge(tasks)
        // Static frontend, same-origin with the API
        .fallback_service(ServeDir::new(&ctx.config.static_dir))
        .layer(CorsLayer::permissive())
        .with_state(ctx)
}
