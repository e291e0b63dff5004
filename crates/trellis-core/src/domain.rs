//! Domain — the top-level namespace that owns every other graph entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{document::Document, user::UserSummary};

/// A named, owned namespace partitioning a set of node types, edge types,
/// and nodes. The slug is globally unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Domain {
  pub id:           Uuid,
  pub name:         String,
  pub slug:         String,
  pub description:  Option<String>,
  /// Map of locale → `{name, description}` overrides; opaque to the store.
  pub translations: Document,
  pub is_public:    bool,
  pub is_active:    bool,
  pub settings:     Document,
  pub creator_id:   Uuid,
  pub created_at:   DateTime<Utc>,
  pub updated_at:   DateTime<Utc>,
}

/// A domain bundled with its creator's summary — the read model for domain
/// endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainRecord {
  #[serde(flatten)]
  pub domain:  Domain,
  pub creator: UserSummary,
}

/// Input to [`crate::store::GraphStore::create_domain`].
/// `creator_id` and timestamps are stamped by the store.
#[derive(Debug, Clone, Deserialize)]
pub struct NewDomain {
  pub name:         String,
  /// Used verbatim when supplied; otherwise derived from `name`.
  pub slug:         Option<String>,
  pub description:  Option<String>,
  #[serde(default)]
  pub translations: Document,
  #[serde(default = "default_true")]
  pub is_public:    bool,
  #[serde(default)]
  pub settings:     Document,
}

/// Partial update for a domain; absent fields are left untouched.
/// Renaming does not re-derive the slug — supply `slug` explicitly to
/// change it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DomainPatch {
  pub name:         Option<String>,
  pub slug:         Option<String>,
  pub description:  Option<String>,
  pub translations: Option<Document>,
  pub is_public:    Option<bool>,
  pub is_active:    Option<bool>,
  pub settings:     Option<Document>,
}

fn default_true() -> bool { true }
