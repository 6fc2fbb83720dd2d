use axum::{extract::State, Json};

use crate::{
    auth::AuthSession,
    db,
    error::AppError,
    handlers::AppJson,
    models::ledger::{LedgerEntry, TransferReceipt, TransferRequest},
    transfer::{self, TransferOutcome},
    AppState,
};

pub async fn create(
    State(state): State<AppState>,
    session: AuthSession,
    AppJson(req): AppJson<TransferRequest>,
) -> Result<Json<TransferReceipt>, AppError> {
    match transfer::transfer(&state.db, &session.email, &req.to, req.amount).await? {
        TransferOutcome::Completed(receipt) => Ok(Json(receipt)),
        TransferOutcome::RecipientNotFound => Err(AppError::RecipientNotFound(req.to)),
    }
}

pub async fn history(
    State(state): State<AppState>,
    session: AuthSession,
) -> Result<Json<Vec<LedgerEntry>>, AppError> {
    let entries = db::transfers_for(&state.db, session.account_id).await?;
    Ok(Json(entries))
}
