//! Session tokens, password hashing and the request gate for protected routes.
//!
//! Tokens are HS256 JWTs carrying the account email in `sub`. They are
//! stateless: nothing is stored server side and they lapse after
//! [`TOKEN_TTL_HOURS`].

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::{db, error::AppError, AppState};

pub const TOKEN_TTL_HOURS: i64 = 12;

const ALGORITHM: Algorithm = Algorithm::HS256;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // email
    pub iat: i64,
    pub exp: i64,
}

/// Signing material derived from the process secret. Built once at startup.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl JwtKeys {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(ALGORITHM);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    pub fn issue(&self, email: &str) -> Result<String, AppError> {
        self.issue_at(email, Utc::now())
    }

    pub fn issue_at(&self, email: &str, issued_at: DateTime<Utc>) -> Result<String, AppError> {
        let claims = Claims {
            sub: email.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + chrono::Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
        };

        let token = encode(&Header::new(ALGORITHM), &claims, &self.encoding)?;
        Ok(token)
    }

    /// Returns the email the token was issued for.
    ///
    /// Only HS256 is accepted; a token announcing any other algorithm is
    /// rejected before its signature is looked at.
    pub fn verify(&self, token: &str) -> Result<String, AppError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|e| AppError::unauthorized(format!("invalid token: {}", e)))?;

        // jsonwebtoken still accepts exp == now
        if data.claims.exp <= Utc::now().timestamp() {
            return Err(AppError::unauthorized("token expired"));
        }

        Ok(data.claims.sub)
    }
}

/// The authenticated caller, handed to protected handlers.
///
/// Extraction verifies the bearer token and re-loads the account on every
/// request, so a token outliving its account is refused.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub account_id: i64,
    pub email: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthSession {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;
        let email = state.keys.verify(token)?;

        let account = db::find_by_email(&state.db, &email)
            .await?
            .ok_or_else(|| AppError::unauthorized(format!("no account for {}", email)))?;

        Ok(AuthSession {
            account_id: account.id,
            email: account.email,
        })
    }
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| AppError::unauthorized("missing authorization header"))?
        .to_str()
        .map_err(|_| AppError::unauthorized("authorization header is not ascii"))?;

    let mut parts = value.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Ok(token),
        _ => Err(AppError::unauthorized("malformed authorization header")),
    }
}

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string();
    Ok(hash)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let parsed_hash = PasswordHash::new(hash)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

static DUMMY_HASH: Lazy<Option<String>> = Lazy::new(|| hash_password("not a real password").ok());

/// Computes the decoy hash up front so the first unknown-email login costs
/// no more than any other.
pub fn prepare_login_decoy() {
    if Lazy::force(&DUMMY_HASH).is_none() {
        tracing::error!("could not compute the login decoy hash");
    }
}

/// Spends the same work as a real check, for logins naming an unknown email.
pub fn verify_against_dummy(password: &str) {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = verify_password(password, hash);
    }
}
