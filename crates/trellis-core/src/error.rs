//! Error types for `trellis-core`.
//!
//! One enum covers the whole store contract. The variants partition into the
//! four families the API layer maps to HTTP statuses: not-found, forbidden,
//! validation, and conflict; `Storage`/`Serialization` are the catch-all for
//! backend faults.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  // ── Not found ─────────────────────────────────────────────────────────

  #[error("user not found: {0}")]
  UserNotFound(Uuid),

  #[error("domain not found: {0}")]
  DomainNotFound(Uuid),

  #[error("domain not found: slug {0:?}")]
  DomainSlugNotFound(String),

  #[error("node type not found: {0}")]
  NodeTypeNotFound(Uuid),

  #[error("edge type not found: {0}")]
  EdgeTypeNotFound(Uuid),

  #[error("node not found: {0}")]
  NodeNotFound(Uuid),

  #[error("node not found: slug {0:?}")]
  NodeSlugNotFound(String),

  #[error("edge not found: {0}")]
  EdgeNotFound(Uuid),

  // ── Forbidden ─────────────────────────────────────────────────────────

  /// The caller is not the creator of the resource (or of the resource that
  /// owns it).
  #[error("you can only modify your own {0}")]
  NotOwner(&'static str),

  // ── Validation ────────────────────────────────────────────────────────

  #[error("self-loops are not allowed: source and target must be different nodes")]
  SelfLoop,

  #[error("missing required field: {0}")]
  MissingField(&'static str),

  /// A node's type must belong to the node's own domain.
  #[error("node type {type_id} does not belong to domain {domain_id}")]
  TypeDomainMismatch { type_id: Uuid, domain_id: Uuid },

  // ── Conflict ──────────────────────────────────────────────────────────

  /// A unique constraint rejected the write (duplicate slug, duplicate
  /// edge triple, ...). Never pre-checked; the storage layer is the arbiter.
  #[error("conflict: {0}")]
  Conflict(String),

  /// A RESTRICT foreign key blocked a delete — the row is still referenced.
  #[error("{0} is still referenced and cannot be deleted")]
  Restricted(&'static str),

  // ── Faults ────────────────────────────────────────────────────────────

  #[error("storage error: {0}")]
  Storage(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
