//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, patch, post},
    Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::docs::ApiDoc;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    // If configuration fails the service must not start
    let app_state = AppState::new().await?;

    sqlx::migrate!().run(&app_state.db_pool).await?;
    tracing::info!("✅ Migrations exécutées.");

    // Public
    let auth_routes = Router::new().route("/login", post(handlers::auth::login));

    let user_routes = Router::new()
        .route("/", post(handlers::auth::create_user))
        .route("/me", get(handlers::auth::get_me));

    let access_routes = Router::new()
        .route("/capabilities", get(handlers::access::list_capabilities))
        .route("/check", post(handlers::access::check_capability));

    let receiving_routes = Router::new()
        .route("/", get(handlers::receiving::get_receiving))
        .route(
            "/purchases/{purchase_id}/arrival",
            post(handlers::receiving::record_arrival),
        )
        .route(
            "/transfers/{transfer_id}/reception",
            post(handlers::receiving::record_reception),
        )
        .route(
            "/transfers/{transfer_id}/reject",
            post(handlers::receiving::reject_transfer),
        );

    let sales_routes = Router::new()
        .route("/{sale_id}", patch(handlers::sales::update_sale_meta))
        .route("/{sale_id}/cancel", post(handlers::sales::cancel_sale))
        .route("/{sale_id}/resolve-error", post(handlers::sales::resolve_sale_error))
        .route("/{sale_id}/returns", post(handlers::sales::create_return));

    // Everything below requires a valid bearer token
    let protected = Router::new()
        .nest("/users", user_routes)
        .nest("/access", access_routes)
        .nest("/receiving", receiving_routes)
        .nest("/sales", sales_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let bind_addr = app_state.settings.bind_addr.clone();

    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api", protected)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state);

    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("🚀 Serveur à l'écoute sur {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
