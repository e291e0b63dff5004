//! Bearer-JWT authentication: token mint/verify and the request extractor.
//!
//! Tokens are HS256 with a shared secret and a 7-day expiry. The payload
//! carries the subject id, email, and display name; handlers read the
//! authenticated identity from the [`CurrentUser`] extractor and never touch
//! the header themselves.

use axum::{
  Json,
  extract::{FromRequestParts, State},
  http::{header::AUTHORIZATION, request::Parts},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use trellis_core::{store::GraphStore, user::User};
use uuid::Uuid;

use crate::{AppState, envelope, error::ApiError};

/// Token lifetime.
const TOKEN_TTL_DAYS: i64 = 7;

// ─── Claims ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
  /// The user id.
  pub sub:   Uuid,
  pub email: String,
  pub name:  Option<String>,
  pub iat:   i64,
  pub exp:   i64,
}

// ─── Config ──────────────────────────────────────────────────────────────────

/// Signing configuration carried in [`AppState`].
#[derive(Clone)]
pub struct TokenConfig {
  secret: String,
}

impl TokenConfig {
  pub fn new(secret: impl Into<String>) -> Self {
    Self { secret: secret.into() }
  }

  /// Mint a token for `user`, expiring in [`TOKEN_TTL_DAYS`].
  pub fn issue(&self, user: &User) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
      sub:   user.id,
      email: user.email.clone(),
      name:  user.display_name.clone().or_else(|| Some(user.username.clone())),
      iat:   now.timestamp(),
      exp:   (now + Duration::days(TOKEN_TTL_DAYS)).timestamp(),
    };
    encode(
      &Header::default(),
      &claims,
      &EncodingKey::from_secret(self.secret.as_bytes()),
    )
  }

  /// Validate a token and return its claims. Expiry is checked.
  pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let data = decode::<Claims>(
      token,
      &DecodingKey::from_secret(self.secret.as_bytes()),
      &Validation::default(),
    )?;
    Ok(data.claims)
  }
}

// ─── Extractor ───────────────────────────────────────────────────────────────

/// The authenticated caller, decoded from the `Authorization` header.
/// Present in a handler signature means the request carried a valid token.
#[derive(Debug, Clone)]
pub struct CurrentUser {
  pub id:    Uuid,
  pub email: String,
  pub name:  Option<String>,
}

impl<S> FromRequestParts<AppState<S>> for CurrentUser
where
  S: GraphStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let header = parts
      .headers
      .get(AUTHORIZATION)
      .and_then(|v| v.to_str().ok())
      .ok_or_else(|| {
        ApiError::Unauthorized("missing Authorization header".to_owned())
      })?;

    let token = header.strip_prefix("Bearer ").ok_or_else(|| {
      ApiError::Unauthorized("expected a Bearer token".to_owned())
    })?;

    let claims = state
      .tokens
      .verify(token)
      .map_err(|e| ApiError::Unauthorized(format!("invalid token: {e}")))?;

    Ok(CurrentUser {
      id:    claims.sub,
      email: claims.email,
      name:  claims.name,
    })
  }
}

// ─── Handlers ────────────────────────────────────────────────────────────────

/// `GET /auth/me` — the authenticated user's stored record.
pub async fn me<S>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
) -> Result<Json<envelope::DataEnvelope<User>>, ApiError>
where
  S: GraphStore + 'static,
{
  let user = state.store.get_user(user.id).await?;
  Ok(envelope::data(user))
}
