use axum::{extract::State, http::StatusCode, Json};

use crate::{
    auth::AuthSession,
    db,
    error::AppError,
    handlers::AppPath,
    models::account::Account,
    AppState,
};

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Account>>, AppError> {
    let accounts = db::list_accounts(&state.db).await?;
    Ok(Json(accounts))
}

pub async fn get(
    State(state): State<AppState>,
    _session: AuthSession,
    AppPath(id): AppPath<i64>,
) -> Result<Json<Account>, AppError> {
    let account = db::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("account {}", id)))?;
    Ok(Json(account))
}

pub async fn delete(
    State(state): State<AppState>,
    session: AuthSession,
    AppPath(id): AppPath<i64>,
) -> Result<StatusCode, AppError> {
    if !db::delete_account(&state.db, id).await? {
        return Err(AppError::NotFound(format!("account {}", id)));
    }
    tracing::info!(account_id = id, by = %session.email, "account deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// The caller's own account.
pub async fn me(
    State(state): State<AppState>,
    session: AuthSession,
) -> Result<Json<Account>, AppError> {
    let account = db::find_by_id(&state.db, session.account_id)
        .await?
        .ok_or_else(|| AppError::unauthorized(format!("no account for {}", session.email)))?;
    Ok(Json(account))
}
