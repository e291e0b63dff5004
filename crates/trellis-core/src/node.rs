//! Node — a content entity belonging to one domain and one node type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::document::Document;

/// Lifecycle status of a node. Transitions exposed by the store:
/// draft → published → archived, and draft → archived directly. There is no
/// path back to draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
  #[default]
  Draft,
  Published,
  Archived,
}

/// A content entity (article/concept). The slug is globally unique across
/// all domains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
  pub id:           Uuid,
  pub title:        String,
  pub slug:         String,
  /// Short teaser text; also a search target alongside the title.
  pub excerpt:      Option<String>,
  /// Structured document body; opaque to the store.
  pub content:      Document,
  pub tags:         Vec<String>,
  pub status:       NodeStatus,
  pub domain_id:    Uuid,
  pub type_id:      Uuid,
  pub creator_id:   Uuid,
  /// Set once, on the first transition to `published`.
  pub published_at: Option<DateTime<Utc>>,
  pub created_at:   DateTime<Utc>,
  pub updated_at:   DateTime<Utc>,
}

/// Input to [`crate::store::GraphStore::create_node`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewNode {
  pub title:     String,
  /// Used verbatim when supplied; otherwise derived from `title`.
  pub slug:      Option<String>,
  pub excerpt:   Option<String>,
  #[serde(default)]
  pub content:   Document,
  #[serde(default)]
  pub tags:      Vec<String>,
  #[serde(default)]
  pub status:    NodeStatus,
  pub domain_id: Uuid,
  pub type_id:   Uuid,
}

/// Partial update for a node. `status` is deliberately absent — lifecycle
/// transitions go through `publish_node`/`archive_node` only.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NodePatch {
  pub title:     Option<String>,
  pub slug:      Option<String>,
  pub excerpt:   Option<String>,
  pub content:   Option<Document>,
  pub tags:      Option<Vec<String>>,
  pub domain_id: Option<Uuid>,
  pub type_id:   Option<Uuid>,
}
