//! EdgeType — the per-domain classification record governing relationships.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The semantic classification of a relationship kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticType {
  Supports,
  Contradicts,
  DerivesFrom,
  PartOf,
  Requires,
  #[default]
  Custom,
}

/// Describes one kind of edge a domain allows. `weight` is a signed factor
/// reserved for rating math — the sign encodes relationship polarity (e.g.
/// negative for "contradicts"); nothing reads it yet. `(domain_id, slug)` is
/// unique; deletion is blocked while edges of this type exist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeType {
  pub id:            Uuid,
  pub name:          String,
  pub slug:          String,
  pub description:   Option<String>,
  pub icon:          Option<String>,
  pub color:         String,
  pub semantic_type: SemanticType,
  pub weight:        f64,
  pub is_directed:   bool,
  pub domain_id:     Uuid,
  pub created_at:    DateTime<Utc>,
  pub updated_at:    DateTime<Utc>,
}

pub const DEFAULT_EDGE_TYPE_COLOR: &str = "#52c41a";

/// Input to [`crate::store::GraphStore::create_edge_type`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewEdgeType {
  pub name:          String,
  pub slug:          Option<String>,
  pub description:   Option<String>,
  pub icon:          Option<String>,
  #[serde(default = "default_edge_type_color")]
  pub color:         String,
  #[serde(default)]
  pub semantic_type: SemanticType,
  #[serde(default)]
  pub weight:        f64,
  #[serde(default = "default_directed")]
  pub is_directed:   bool,
  pub domain_id:     Uuid,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EdgeTypePatch {
  pub name:          Option<String>,
  pub slug:          Option<String>,
  pub description:   Option<String>,
  pub icon:          Option<String>,
  pub color:         Option<String>,
  pub semantic_type: Option<SemanticType>,
  pub weight:        Option<f64>,
  pub is_directed:   Option<bool>,
}

fn default_edge_type_color() -> String { DEFAULT_EDGE_TYPE_COLOR.to_owned() }

fn default_directed() -> bool { true }
