use axum::{extract::State, http::StatusCode, Json};

use crate::{
    auth::{self, hash_password, verify_password},
    db,
    error::AppError,
    handlers::AppJson,
    models::account::{Account, AuthResponse, CreateAccount, LoginPayload, NewAccount, STARTING_BALANCE},
    validate, AppState,
};

pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateAccount>,
) -> Result<(StatusCode, Json<Account>), AppError> {
    validate::registration(&payload)?;

    let password_hash = hash_password(&payload.password)?;

    let account = db::insert_account(
        &state.db,
        &NewAccount {
            first_name: payload.first_name,
            last_name: payload.last_name,
            email: payload.email,
            password_hash,
            balance: STARTING_BALANCE,
            created_at: chrono::Utc::now(),
        },
    )
    .await?;

    tracing::info!(account_id = account.id, email = %account.email, "account registered");

    Ok((StatusCode::CREATED, Json(account)))
}

pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginPayload>,
) -> Result<Json<AuthResponse>, AppError> {
    validate::login(&payload)?;

    let Some(account) = db::find_by_email(&state.db, &payload.email).await? else {
        auth::verify_against_dummy(&payload.password);
        return Err(AppError::LoginFail);
    };

    if !verify_password(&payload.password, &account.password_hash)? {
        return Err(AppError::LoginFail);
    }

    let token = state.keys.issue(&account.email)?;

    Ok(Json(AuthResponse {
        token,
        email: account.email,
    }))
}
