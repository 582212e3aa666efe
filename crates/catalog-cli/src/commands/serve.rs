use crate::commands::{sheets_client, wishlist_store};
use crate::output::Output;
use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use catalog_config::Config;
use catalog_core::{Wishlist, WishlistError, WishlistStore};
use catalog_models::{NewWishlistEntry, WishlistEntry, WishlistPatch};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

type SharedWishlist = Arc<Mutex<Wishlist<Box<dyn WishlistStore>>>>;

#[derive(Clone)]
pub struct AppState {
    wishlist: SharedWishlist,
}

impl AppState {
    pub fn new(store: Box<dyn WishlistStore>) -> Self {
        Self {
            wishlist: Arc::new(Mutex::new(Wishlist::new(store))),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("Invalid index")]
    InvalidIndex,
    #[error(transparent)]
    Wishlist(#[from] WishlistError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::InvalidIndex | ApiError::Wishlist(WishlistError::IndexOutOfRange { .. }) => {
                (StatusCode::NOT_FOUND, "Invalid index".to_string())
            }
            ApiError::Wishlist(WishlistError::NotFound(_)) => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::Wishlist(WishlistError::MissingTitle) => {
                (StatusCode::BAD_REQUEST, "Title is required".to_string())
            }
            ApiError::Wishlist(WishlistError::Store(err)) => {
                error!("Wishlist store failed: {:#}", err);
                (StatusCode::BAD_GATEWAY, format!("{:#}", err))
            }
        };
        if status != StatusCode::BAD_GATEWAY {
            warn!("request error: {}", message);
        }
        (status, Json(json!({"error": message}))).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/wishlist", get(list_entries).post(add_entry))
        .route("/wishlist/:index", put(update_entry).delete(delete_entry))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

async fn list_entries(State(state): State<AppState>) -> Result<Json<Vec<WishlistEntry>>, ApiError> {
    let entries = state.wishlist.lock().await.list().await?;
    Ok(Json(entries))
}

async fn add_entry(
    State(state): State<AppState>,
    body: Result<Json<NewWishlistEntry>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(new_entry) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let entry = state.wishlist.lock().await.add(new_entry).await?;
    info!("Wishlist item added: {}", entry.title);
    Ok((
        StatusCode::CREATED,
        Json(json!({"message": "Item added", "entry": entry})),
    ))
}

async fn update_entry(
    State(state): State<AppState>,
    index: Result<Path<usize>, PathRejection>,
    body: Result<Json<WishlistPatch>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(index) = index.map_err(|_| ApiError::InvalidIndex)?;
    let Json(patch) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let entry = state.wishlist.lock().await.update_at(index, patch).await?;
    info!("Wishlist item {} updated", index);
    Ok(Json(json!({"message": "Item updated", "entry": entry})))
}

async fn delete_entry(
    State(state): State<AppState>,
    index: Result<Path<usize>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(index) = index.map_err(|_| ApiError::InvalidIndex)?;
    let entry = state.wishlist.lock().await.delete_at(index).await?;
    info!("Wishlist item {} deleted: {}", index, entry.title);
    Ok(Json(json!({"message": "Item deleted"})))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

pub async fn run_serve(config: &Config, bind: Option<String>, output: &Output) -> Result<()> {
    let sheets = sheets_client(config).map_err(|e| eyre!("{:#}", e))?;
    let store = wishlist_store(config, sheets).map_err(|e| eyre!("{:#}", e))?;
    let store_name = store.describe();
    let app = router(AppState::new(store));

    let addr = bind.unwrap_or_else(|| config.server.bind.clone());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| eyre!("Failed to bind {}: {}", addr, e))?;
    info!("Wishlist API listening on {} (store: {})", addr, store_name);
    output.success(format!("Serving the wishlist on http://{}", addr));

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| eyre!("Server error: {}", e))?;
    Ok(())
}

#[cfg(test)]
mod tests;
