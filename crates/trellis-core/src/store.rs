//! The `GraphStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g.
//! `trellis-store-sqlite`). The API layer depends on this abstraction, not
//! on any concrete backend.
//!
//! Business rules live behind these methods, not in HTTP handlers: ownership
//! checks, self-loop rejection, and the cross-domain type check all happen
//! here so every caller gets the same contract. Methods that mutate an owned
//! resource take a `caller_id` and fail with [`Error::NotOwner`] when the
//! caller did not create the resource (for types: the owning domain; for
//! edges: the source node).

use std::future::Future;

use uuid::Uuid;

use crate::{
  domain::{Domain, DomainPatch, DomainRecord, NewDomain},
  edge::{Edge, EdgePatch, NewEdge, NodeEdges},
  edge_type::{EdgeType, EdgeTypePatch, NewEdgeType},
  error::Error,
  node::{NewNode, Node, NodePatch, NodeStatus},
  node_type::{NewNodeType, NodeType, NodeTypePatch},
  rating::{MetricType, NewRating, Rating},
  user::{OAuthProfile, User},
};

// ─── Query types ─────────────────────────────────────────────────────────────

/// Combinable filters for [`GraphStore::list_nodes`].
#[derive(Debug, Clone, Default)]
pub struct NodeQuery {
  pub domain_id: Option<Uuid>,
  pub type_id:   Option<Uuid>,
  pub status:    Option<NodeStatus>,
  /// Set-overlap filter: match nodes whose tag set shares at least one tag
  /// with this list. Empty means no tag filtering.
  pub tags:      Vec<String>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Trellis graph store backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`). Every method is a
/// single unit of work — no cross-call transactions; unique constraints are
/// the arbiter for races and surface as [`Error::Conflict`].
pub trait GraphStore: Send + Sync {
  // ── Identity ──────────────────────────────────────────────────────────

  /// Find-or-create the user behind an OAuth profile.
  ///
  /// Lookup order: an existing account with the same
  /// `(provider, provider_user_id)` (profile fields refreshed), then an
  /// existing user with the same email (account linked), then a fresh user.
  fn upsert_oauth_user(
    &self,
    profile: OAuthProfile,
  ) -> impl Future<Output = Result<User, Error>> + Send + '_;

  fn get_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<User, Error>> + Send + '_;

  // ── Domains ───────────────────────────────────────────────────────────

  /// Store a new domain owned by `creator_id`. Derives the slug from the
  /// name when none is supplied; a duplicate slug is a conflict.
  fn create_domain(
    &self,
    input: NewDomain,
    creator_id: Uuid,
  ) -> impl Future<Output = Result<Domain, Error>> + Send + '_;

  /// All domains, newest first, each with its creator's summary.
  fn list_domains(
    &self,
    is_public: Option<bool>,
  ) -> impl Future<Output = Result<Vec<DomainRecord>, Error>> + Send + '_;

  fn get_domain(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<DomainRecord, Error>> + Send + '_;

  fn get_domain_by_slug<'a>(
    &'a self,
    slug: &'a str,
  ) -> impl Future<Output = Result<DomainRecord, Error>> + Send + 'a;

  /// Shallow-merge `patch`; creator only.
  fn update_domain(
    &self,
    id: Uuid,
    patch: DomainPatch,
    caller_id: Uuid,
  ) -> impl Future<Output = Result<Domain, Error>> + Send + '_;

  /// Hard delete; creator only. Storage cascades to the domain's node
  /// types, edge types and nodes (and transitively edges and ratings).
  fn delete_domain(
    &self,
    id: Uuid,
    caller_id: Uuid,
  ) -> impl Future<Output = Result<(), Error>> + Send + '_;

  // ── Node types ────────────────────────────────────────────────────────

  /// Caller must be the creator of the owning domain.
  fn create_node_type(
    &self,
    input: NewNodeType,
    caller_id: Uuid,
  ) -> impl Future<Output = Result<NodeType, Error>> + Send + '_;

  /// Ordered by `sort_order`, then name.
  fn list_node_types(
    &self,
    domain_id: Option<Uuid>,
  ) -> impl Future<Output = Result<Vec<NodeType>, Error>> + Send + '_;

  fn get_node_type(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<NodeType, Error>> + Send + '_;

  fn update_node_type(
    &self,
    id: Uuid,
    patch: NodeTypePatch,
    caller_id: Uuid,
  ) -> impl Future<Output = Result<NodeType, Error>> + Send + '_;

  /// Fails with [`Error::Restricted`] while any node references the type.
  fn delete_node_type(
    &self,
    id: Uuid,
    caller_id: Uuid,
  ) -> impl Future<Output = Result<(), Error>> + Send + '_;

  // ── Edge types ────────────────────────────────────────────────────────

  fn create_edge_type(
    &self,
    input: NewEdgeType,
    caller_id: Uuid,
  ) -> impl Future<Output = Result<EdgeType, Error>> + Send + '_;

  fn list_edge_types(
    &self,
    domain_id: Option<Uuid>,
  ) -> impl Future<Output = Result<Vec<EdgeType>, Error>> + Send + '_;

  fn get_edge_type(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<EdgeType, Error>> + Send + '_;

  fn update_edge_type(
    &self,
    id: Uuid,
    patch: EdgeTypePatch,
    caller_id: Uuid,
  ) -> impl Future<Output = Result<EdgeType, Error>> + Send + '_;

  /// Fails with [`Error::Restricted`] while any edge references the type.
  fn delete_edge_type(
    &self,
    id: Uuid,
    caller_id: Uuid,
  ) -> impl Future<Output = Result<(), Error>> + Send + '_;

  // ── Nodes ─────────────────────────────────────────────────────────────

  /// Store a new node owned by `creator_id`. The referenced type must
  /// belong to the referenced domain ([`Error::TypeDomainMismatch`]
  /// otherwise); the globally-unique slug is derived from the title when
  /// none is supplied.
  fn create_node(
    &self,
    input: NewNode,
    creator_id: Uuid,
  ) -> impl Future<Output = Result<Node, Error>> + Send + '_;

  /// Filtered listing, newest first. See [`NodeQuery`].
  fn list_nodes<'a>(
    &'a self,
    query: &'a NodeQuery,
  ) -> impl Future<Output = Result<Vec<Node>, Error>> + Send + 'a;

  /// Case-insensitive substring match against title or excerpt.
  fn search_nodes<'a>(
    &'a self,
    text: &'a str,
  ) -> impl Future<Output = Result<Vec<Node>, Error>> + Send + 'a;

  fn get_node(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Node, Error>> + Send + '_;

  fn get_node_by_slug<'a>(
    &'a self,
    slug: &'a str,
  ) -> impl Future<Output = Result<Node, Error>> + Send + 'a;

  /// Shallow-merge `patch`; creator only. Re-runs the cross-domain type
  /// check when the patch moves the node between types or domains.
  fn update_node(
    &self,
    id: Uuid,
    patch: NodePatch,
    caller_id: Uuid,
  ) -> impl Future<Output = Result<Node, Error>> + Send + '_;

  /// Set status to published and stamp `published_at`; creator only.
  fn publish_node(
    &self,
    id: Uuid,
    caller_id: Uuid,
  ) -> impl Future<Output = Result<Node, Error>> + Send + '_;

  /// Set status to archived, leaving `published_at` untouched; creator
  /// only.
  fn archive_node(
    &self,
    id: Uuid,
    caller_id: Uuid,
  ) -> impl Future<Output = Result<Node, Error>> + Send + '_;

  /// Hard delete; creator only. Storage cascades to edges touching the
  /// node (either endpoint) and its ratings.
  fn delete_node(
    &self,
    id: Uuid,
    caller_id: Uuid,
  ) -> impl Future<Output = Result<(), Error>> + Send + '_;

  // ── Edges ─────────────────────────────────────────────────────────────

  /// Store a new relationship. Self-loops fail with [`Error::SelfLoop`];
  /// the caller must have created the source node; a duplicate
  /// `(source, target, type)` triple is a conflict, decided by the unique
  /// constraint rather than a pre-check.
  fn create_edge(
    &self,
    input: NewEdge,
    caller_id: Uuid,
  ) -> impl Future<Output = Result<Edge, Error>> + Send + '_;

  /// `node_id` matches edges where the node is source OR target;
  /// `domain_id` restricts to edges whose source node is in that domain.
  fn list_edges(
    &self,
    node_id: Option<Uuid>,
    domain_id: Option<Uuid>,
  ) -> impl Future<Output = Result<Vec<Edge>, Error>> + Send + '_;

  fn get_edge(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Edge, Error>> + Send + '_;

  fn update_edge(
    &self,
    id: Uuid,
    patch: EdgePatch,
    caller_id: Uuid,
  ) -> impl Future<Output = Result<Edge, Error>> + Send + '_;

  fn delete_edge(
    &self,
    id: Uuid,
    caller_id: Uuid,
  ) -> impl Future<Output = Result<(), Error>> + Send + '_;

  /// Edges where the node is the source, newest first.
  fn outgoing_edges(
    &self,
    node_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Edge>, Error>> + Send + '_;

  /// Edges where the node is the target, newest first.
  fn incoming_edges(
    &self,
    node_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Edge>, Error>> + Send + '_;

  /// Both adjacency lists in one call.
  fn node_edges(
    &self,
    node_id: Uuid,
  ) -> impl Future<Output = Result<NodeEdges, Error>> + Send + '_;

  // ── Ratings ───────────────────────────────────────────────────────────

  /// Record a score for a node. The node must exist.
  fn create_rating(
    &self,
    input: NewRating,
  ) -> impl Future<Output = Result<Rating, Error>> + Send + '_;

  /// All scores for a node, newest first.
  fn list_ratings(
    &self,
    node_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Rating>, Error>> + Send + '_;

  /// Scores for one metric of a node, newest first.
  fn list_ratings_by_metric(
    &self,
    node_id: Uuid,
    metric: MetricType,
  ) -> impl Future<Output = Result<Vec<Rating>, Error>> + Send + '_;
}
