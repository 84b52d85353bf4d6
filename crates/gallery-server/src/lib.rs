//! HTTP API for the gallery wall.
//!
//! Visitors read the wall state and layout; the owner uploads artwork and
//! edits placements through pin-guarded routes. All placement changes go
//! through one [`gallery_wall::Wall`] behind a mutex.

mod admin;
mod api;
pub mod config;
pub mod error;
pub mod state;
mod upload;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::services::ServeDir;

pub use config::ServerConfig;
pub use error::ApiError;
pub use state::{AppState, ADMIN_PIN_HEADER};

pub fn build_router(state: AppState) -> Router {
    let uploads = ServeDir::new(&state.upload_dir);
    let static_files = ServeDir::new(&state.static_dir);

    let admin = Router::new()
        .route("/assign_many", post(admin::assign_many))
        .route("/clear_tile", post(admin::clear_tile))
        .route("/clear_all_tiles", post(admin::clear_all_tiles))
        .route("/move_tile_asset", post(admin::move_tile_asset))
        .route("/shuffle", post(admin::shuffle))
        .route("/undo", post(admin::undo))
        .route("/undo_shuffle", post(admin::undo_shuffle))
        .route("/history_status", get(admin::history_status))
        .route("/tile_info", get(admin::tile_info))
        .route("/asset_meta", post(admin::asset_meta))
        .route("/reload_layout", post(admin::reload_layout))
        .route("/reconcile", post(admin::reconcile));

    Router::new()
        .route("/health", get(api::health))
        .route("/api/wall_state", get(api::wall_state))
        .route("/api/layout", get(api::layout))
        .route(
            "/api/grid-color",
            get(api::get_grid_color).post(api::set_grid_color),
        )
        .route(
            "/api/upload_assets",
            post(upload::upload_assets).layer(DefaultBodyLimit::max(upload::UPLOAD_LIMIT_BYTES)),
        )
        .route("/api/assign_tile", post(api::assign_tile))
        .nest("/api/admin", admin)
        .nest_service("/uploads", uploads)
        .fallback_service(static_files)
        .with_state(Arc::new(state))
}

pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    serve_listener(listener, config, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await?;
    Ok(())
}

pub async fn serve_listener(
    listener: tokio::net::TcpListener,
    config: ServerConfig,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> anyhow::Result<SocketAddr> {
    let state = AppState::open(&config)?;
    let app = build_router(state);
    let addr = listener.local_addr()?;
    tracing::info!(%addr, diagram = %config.diagram.display(), "gallery wall listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(addr)
}
