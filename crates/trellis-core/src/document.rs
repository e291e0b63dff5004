//! Opaque JSON documents.
//!
//! Several columns (`settings`, `schema`, `translations`, `content`,
//! `metadata`, `details`) carry arbitrarily-nested caller-defined data. They
//! are validated structurally — a JSON object — at the serde boundary and
//! never interpreted semantically.

/// An arbitrarily-nested JSON object with no compile-time schema.
pub type Document = serde_json::Map<String, serde_json::Value>;
