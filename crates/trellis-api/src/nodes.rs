//! Handlers for `/nodes` endpoints.
//!
//! | Method      | Path                  | Notes |
//! |-------------|-----------------------|-------|
//! | `GET`       | `/nodes`              | `?domain_id=&type_id=&status=&tags=a,b` |
//! | `GET`       | `/nodes/search`       | `?q=` substring over title/excerpt |
//! | `GET`       | `/nodes/by-domain/:id`| Optional `?status=` |
//! | `GET`       | `/nodes/by-type/:id`  | Optional `?status=` |
//! | `GET`       | `/nodes/by-tags`      | `?tags=a,b` set-overlap |
//! | `GET`       | `/nodes/slug/:slug`   | |
//! | `GET`       | `/nodes/:id`          | |
//! | `POST`      | `/nodes`              | 201 |
//! | `PUT/PATCH` | `/nodes/:id`          | Creator only |
//! | `PATCH`     | `/nodes/:id/publish`  | Creator only; stamps `published_at` |
//! | `PATCH`     | `/nodes/:id/archive`  | Creator only |
//! | `DELETE`    | `/nodes/:id`          | Creator only; cascades |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use trellis_core::{
  node::{NewNode, Node, NodePatch, NodeStatus},
  store::{GraphStore, NodeQuery},
};
use uuid::Uuid;

use crate::{AppState, auth::CurrentUser, envelope, error::ApiError};

fn split_tags(tags: Option<&str>) -> Vec<String> {
  tags
    .map(|s| {
      s.split(',')
        .map(|t| t.trim().to_owned())
        .filter(|t| !t.is_empty())
        .collect()
    })
    .unwrap_or_default()
}

// ─── List / search ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub domain_id: Option<Uuid>,
  pub type_id:   Option<Uuid>,
  pub status:    Option<NodeStatus>,
  /// Comma-separated; matches nodes sharing at least one tag.
  pub tags:      Option<String>,
}

/// `GET /nodes[?domain_id=...][&type_id=...][&status=...][&tags=a,b]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  _user: CurrentUser,
  Query(params): Query<ListParams>,
) -> Result<Json<envelope::ListEnvelope<Node>>, ApiError>
where
  S: GraphStore + 'static,
{
  let query = NodeQuery {
    domain_id: params.domain_id,
    type_id:   params.type_id,
    status:    params.status,
    tags:      split_tags(params.tags.as_deref()),
  };
  let nodes = state.store.list_nodes(&query).await?;
  Ok(envelope::list(nodes))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
  pub q: String,
}

/// `GET /nodes/search?q=<text>`
pub async fn search<S>(
  State(state): State<AppState<S>>,
  _user: CurrentUser,
  Query(params): Query<SearchParams>,
) -> Result<Json<envelope::ListEnvelope<Node>>, ApiError>
where
  S: GraphStore + 'static,
{
  let nodes = state.store.search_nodes(&params.q).await?;
  Ok(envelope::list(nodes))
}

#[derive(Debug, Deserialize)]
pub struct StatusParams {
  pub status: Option<NodeStatus>,
}

/// `GET /nodes/by-domain/:domain_id[?status=...]`
pub async fn by_domain<S>(
  State(state): State<AppState<S>>,
  _user: CurrentUser,
  Path(domain_id): Path<Uuid>,
  Query(params): Query<StatusParams>,
) -> Result<Json<envelope::ListEnvelope<Node>>, ApiError>
where
  S: GraphStore + 'static,
{
  let query = NodeQuery {
    domain_id: Some(domain_id),
    status: params.status,
    ..Default::default()
  };
  let nodes = state.store.list_nodes(&query).await?;
  Ok(envelope::list(nodes))
}

/// `GET /nodes/by-type/:type_id[?status=...]`
pub async fn by_type<S>(
  State(state): State<AppState<S>>,
  _user: CurrentUser,
  Path(type_id): Path<Uuid>,
  Query(params): Query<StatusParams>,
) -> Result<Json<envelope::ListEnvelope<Node>>, ApiError>
where
  S: GraphStore + 'static,
{
  let query = NodeQuery {
    type_id: Some(type_id),
    status: params.status,
    ..Default::default()
  };
  let nodes = state.store.list_nodes(&query).await?;
  Ok(envelope::list(nodes))
}

#[derive(Debug, Deserialize)]
pub struct TagsParams {
  pub tags: String,
}

/// `GET /nodes/by-tags?tags=a,b`
pub async fn by_tags<S>(
  State(state): State<AppState<S>>,
  _user: CurrentUser,
  Query(params): Query<TagsParams>,
) -> Result<Json<envelope::ListEnvelope<Node>>, ApiError>
where
  S: GraphStore + 'static,
{
  let query = NodeQuery {
    tags: split_tags(Some(&params.tags)),
    ..Default::default()
  };
  let nodes = state.store.list_nodes(&query).await?;
  Ok(envelope::list(nodes))
}

// ─── Single reads ────────────────────────────────────────────────────────────

/// `GET /nodes/slug/:slug`
pub async fn get_by_slug<S>(
  State(state): State<AppState<S>>,
  _user: CurrentUser,
  Path(slug): Path<String>,
) -> Result<Json<envelope::DataEnvelope<Node>>, ApiError>
where
  S: GraphStore + 'static,
{
  let node = state.store.get_node_by_slug(&slug).await?;
  Ok(envelope::data(node))
}

/// `GET /nodes/:id`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  _user: CurrentUser,
  Path(id): Path<Uuid>,
) -> Result<Json<envelope::DataEnvelope<Node>>, ApiError>
where
  S: GraphStore + 'static,
{
  let node = state.store.get_node(id).await?;
  Ok(envelope::data(node))
}

// ─── Mutations ───────────────────────────────────────────────────────────────

/// `POST /nodes`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Json(body): Json<NewNode>,
) -> Result<impl IntoResponse, ApiError>
where
  S: GraphStore + 'static,
{
  let node = state.store.create_node(body, user.id).await?;
  Ok((
    StatusCode::CREATED,
    envelope::message_data("Node created successfully", node),
  ))
}

/// `PUT|PATCH /nodes/:id` — creator only.
pub async fn update<S>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Path(id): Path<Uuid>,
  Json(body): Json<NodePatch>,
) -> Result<Json<envelope::DataEnvelope<Node>>, ApiError>
where
  S: GraphStore + 'static,
{
  let node = state.store.update_node(id, body, user.id).await?;
  Ok(envelope::message_data("Node updated successfully", node))
}

/// `PATCH /nodes/:id/publish` — creator only.
pub async fn publish<S>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Path(id): Path<Uuid>,
) -> Result<Json<envelope::DataEnvelope<Node>>, ApiError>
where
  S: GraphStore + 'static,
{
  let node = state.store.publish_node(id, user.id).await?;
  Ok(envelope::message_data("Node published successfully", node))
}

/// `PATCH /nodes/:id/archive` — creator only.
pub async fn archive<S>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Path(id): Path<Uuid>,
) -> Result<Json<envelope::DataEnvelope<Node>>, ApiError>
where
  S: GraphStore + 'static,
{
  let node = state.store.archive_node(id, user.id).await?;
  Ok(envelope::message_data("Node archived successfully", node))
}

/// `DELETE /nodes/:id` — creator only; cascades to edges and ratings.
pub async fn remove<S>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Path(id): Path<Uuid>,
) -> Result<Json<envelope::MessageEnvelope>, ApiError>
where
  S: GraphStore + 'static,
{
  state.store.delete_node(id, user.id).await?;
  Ok(envelope::message("Node deleted successfully"))
}
