//! Rating — a stored, per-node, per-metric score.
//!
//! Storage only: no computation lives anywhere in this workspace. The
//! `details` bag carries whatever provenance a future scorer records
//! (supporting/contradicting edge counts, algorithm tag, factor weights).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::document::Document;

/// The derived metric a score measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricType {
  Consistency,
  Coherence,
  Connectivity,
  Overall,
}

/// One recorded score. No uniqueness across `(node_id, metric_type)`:
/// historical scores for the same metric coexist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rating {
  pub id:          Uuid,
  pub node_id:     Uuid,
  pub metric_type: MetricType,
  pub score:       f64,
  pub details:     Document,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
}

/// Input to [`crate::store::GraphStore::create_rating`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewRating {
  pub node_id:     Uuid,
  pub metric_type: MetricType,
  pub score:       f64,
  #[serde(default)]
  pub details:     Document,
}
