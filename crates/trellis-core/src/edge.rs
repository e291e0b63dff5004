//! Edge — a directed relationship record between two nodes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::document::Document;

/// A relationship from `source_id` to `target_id`, classified by an edge
/// type. `(source_id, target_id, type_id)` is unique and self-loops are
/// rejected before the row is ever written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
  pub id:          Uuid,
  pub source_id:   Uuid,
  pub target_id:   Uuid,
  pub type_id:     Uuid,
  pub description: Option<String>,
  pub metadata:    Document,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
}

/// Input to [`crate::store::GraphStore::create_edge`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewEdge {
  pub source_id:   Uuid,
  pub target_id:   Uuid,
  pub type_id:     Uuid,
  pub description: Option<String>,
  #[serde(default)]
  pub metadata:    Document,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EdgePatch {
  pub description: Option<String>,
  pub metadata:    Option<Document>,
}

/// Both adjacency lists of a node, as returned by
/// [`crate::store::GraphStore::node_edges`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeEdges {
  /// Edges where the node is the source, newest first.
  pub outgoing: Vec<Edge>,
  /// Edges where the node is the target, newest first.
  pub incoming: Vec<Edge>,
}
