use axum::{
    http::{Method, Uri},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use crate::{
    error::AppError,
    handlers::{accounts, auth, transfer},
    AppState,
};

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn unknown_route(uri: Uri) -> AppError {
    AppError::NotFound(format!("route {}", uri.path()))
}

async fn method_not_allowed(method: Method, uri: Uri) -> AppError {
    AppError::MethodNotAllowed {
        method: method.to_string(),
        path: uri.path().to_string(),
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health).fallback(method_not_allowed))
        .route(
            "/account",
            get(accounts::list)
                .post(auth::register)
                .fallback(method_not_allowed),
        )
        .route(
            "/account/:id",
            get(accounts::get)
                .delete(accounts::delete)
                .fallback(method_not_allowed),
        )
        .route("/login", post(auth::login).fallback(method_not_allowed))
        .route(
            "/transfer",
            get(transfer::history)
                .post(transfer::create)
                .fallback(method_not_allowed),
        )
        .route("/me", get(accounts::me).fallback(method_not_allowed))
        .fallback(unknown_route)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
