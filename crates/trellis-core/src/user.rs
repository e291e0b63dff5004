//! Users and their linked OAuth identities.
//!
//! Every owned entity (domain, node) references its creator here. Users are
//! only ever created through [`crate::store::GraphStore::upsert_oauth_user`];
//! there is no password login.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An account holder. Exactly one record per identity (email is unique).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
  pub id:                Uuid,
  pub email:             String,
  pub username:          String,
  pub display_name:      Option<String>,
  pub avatar_url:        Option<String>,
  /// Role tags, e.g. `["user"]`; not interpreted by the store.
  pub roles:             Vec<String>,
  pub is_active:         bool,
  pub is_email_verified: bool,
  pub last_login_at:     Option<DateTime<Utc>>,
  pub created_at:        DateTime<Utc>,
  pub updated_at:        DateTime<Utc>,
}

/// The slimmed-down creator view attached to domain reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
  pub id:           Uuid,
  pub username:     String,
  pub display_name: Option<String>,
  pub avatar_url:   Option<String>,
}

/// A linked external identity. `(provider, provider_user_id)` is the natural
/// key used for lookup on sign-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthAccount {
  pub id:               Uuid,
  pub user_id:          Uuid,
  pub provider:         String,
  pub provider_user_id: String,
  pub provider_email:   Option<String>,
  pub display_name:     Option<String>,
  pub avatar_url:       Option<String>,
  pub access_token:     Option<String>,
  pub refresh_token:    Option<String>,
  pub token_expires_at: Option<DateTime<Utc>>,
  pub last_used_at:     DateTime<Utc>,
  pub created_at:       DateTime<Utc>,
  pub updated_at:       DateTime<Utc>,
}

/// The profile an OAuth callback hands to
/// [`crate::store::GraphStore::upsert_oauth_user`].
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthProfile {
  pub provider:         String,
  pub provider_user_id: String,
  pub email:            String,
  pub display_name:     Option<String>,
  pub avatar_url:       Option<String>,
  pub access_token:     Option<String>,
  pub refresh_token:    Option<String>,
  pub token_expires_at: Option<DateTime<Utc>>,
}

impl OAuthProfile {
  /// Username fallback when creating a fresh user: the email local part.
  pub fn derived_username(&self) -> String {
    match self.email.split_once('@') {
      Some((local, _)) => local.to_owned(),
      None => self.email.clone(),
    }
  }
}
