//! NodeType — the per-domain schema record governing node shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::document::Document;

/// Describes one kind of node a domain allows: display metadata plus a
/// free-form JSON schema for the node's custom fields. `(domain_id, slug)`
/// is unique; deletion is blocked while nodes of this type exist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeType {
  pub id:          Uuid,
  pub name:        String,
  pub slug:        String,
  pub description: Option<String>,
  pub icon:        Option<String>,
  pub color:       String,
  /// Caller-defined field schema; opaque to the store.
  pub schema:      Document,
  /// Sort key for UI listings; lower sorts first.
  pub sort_order:  i64,
  pub domain_id:   Uuid,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
}

pub const DEFAULT_NODE_TYPE_COLOR: &str = "#1890ff";

/// Input to [`crate::store::GraphStore::create_node_type`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewNodeType {
  pub name:        String,
  pub slug:        Option<String>,
  pub description: Option<String>,
  pub icon:        Option<String>,
  #[serde(default = "default_node_type_color")]
  pub color:       String,
  #[serde(default)]
  pub schema:      Document,
  #[serde(default)]
  pub sort_order:  i64,
  pub domain_id:   Uuid,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NodeTypePatch {
  pub name:        Option<String>,
  pub slug:        Option<String>,
  pub description: Option<String>,
  pub icon:        Option<String>,
  pub color:       Option<String>,
  pub schema:      Option<Document>,
  pub sort_order:  Option<i64>,
}

fn default_node_type_color() -> String { DEFAULT_NODE_TYPE_COLOR.to_owned() }
