//! Handlers for `/edges` endpoints.
//!
//! | Method      | Path                        | Notes |
//! |-------------|-----------------------------|-------|
//! | `GET`       | `/edges`                    | `?node_id=` (either endpoint), `?domain_id=` (source's domain) |
//! | `POST`      | `/edges`                    | 400 on self-loop, 409 on duplicate triple |
//! | `GET`       | `/edges/:id`                | |
//! | `PUT/PATCH` | `/edges/:id`                | Source-node creator only |
//! | `DELETE`    | `/edges/:id`                | Source-node creator only |
//! | `GET`       | `/edges/node/:id`           | Both directions + counts |
//! | `GET`       | `/edges/node/:id/outgoing`  | |
//! | `GET`       | `/edges/node/:id/incoming`  | |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use trellis_core::{
  edge::{Edge, EdgePatch, NewEdge, NodeEdges},
  store::GraphStore,
};
use uuid::Uuid;

use crate::{AppState, auth::CurrentUser, envelope, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub node_id:   Option<Uuid>,
  pub domain_id: Option<Uuid>,
}

/// `GET /edges[?node_id=...][&domain_id=...]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  _user: CurrentUser,
  Query(params): Query<ListParams>,
) -> Result<Json<envelope::ListEnvelope<Edge>>, ApiError>
where
  S: GraphStore + 'static,
{
  let edges = state
    .store
    .list_edges(params.node_id, params.domain_id)
    .await?;
  Ok(envelope::list(edges))
}

/// `POST /edges`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Json(body): Json<NewEdge>,
) -> Result<impl IntoResponse, ApiError>
where
  S: GraphStore + 'static,
{
  let edge = state.store.create_edge(body, user.id).await?;
  Ok((
    StatusCode::CREATED,
    envelope::message_data("Edge created successfully", edge),
  ))
}

/// `GET /edges/:id`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  _user: CurrentUser,
  Path(id): Path<Uuid>,
) -> Result<Json<envelope::DataEnvelope<Edge>>, ApiError>
where
  S: GraphStore + 'static,
{
  let edge = state.store.get_edge(id).await?;
  Ok(envelope::data(edge))
}

/// `PUT|PATCH /edges/:id`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Path(id): Path<Uuid>,
  Json(body): Json<EdgePatch>,
) -> Result<Json<envelope::DataEnvelope<Edge>>, ApiError>
where
  S: GraphStore + 'static,
{
  let edge = state.store.update_edge(id, body, user.id).await?;
  Ok(envelope::message_data("Edge updated successfully", edge))
}

/// `DELETE /edges/:id`
pub async fn remove<S>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Path(id): Path<Uuid>,
) -> Result<Json<envelope::MessageEnvelope>, ApiError>
where
  S: GraphStore + 'static,
{
  state.store.delete_edge(id, user.id).await?;
  Ok(envelope::message("Edge deleted successfully"))
}

// ─── Adjacency ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct EdgeCounts {
  pub outgoing: usize,
  pub incoming: usize,
  pub total:    usize,
}

#[derive(Debug, Serialize)]
pub struct NodeEdgesEnvelope {
  pub success: bool,
  pub count:   EdgeCounts,
  pub data:    NodeEdges,
}

/// `GET /edges/node/:node_id` — both adjacency lists with counts.
pub async fn node_edges<S>(
  State(state): State<AppState<S>>,
  _user: CurrentUser,
  Path(node_id): Path<Uuid>,
) -> Result<Json<NodeEdgesEnvelope>, ApiError>
where
  S: GraphStore + 'static,
{
  let edges = state.store.node_edges(node_id).await?;
  let count = EdgeCounts {
    outgoing: edges.outgoing.len(),
    incoming: edges.incoming.len(),
    total:    edges.outgoing.len() + edges.incoming.len(),
  };
  Ok(Json(NodeEdgesEnvelope { success: true, count, data: edges }))
}

/// `GET /edges/node/:node_id/outgoing`
pub async fn outgoing<S>(
  State(state): State<AppState<S>>,
  _user: CurrentUser,
  Path(node_id): Path<Uuid>,
) -> Result<Json<envelope::ListEnvelope<Edge>>, ApiError>
where
  S: GraphStore + 'static,
{
  let edges = state.store.outgoing_edges(node_id).await?;
  Ok(envelope::list(edges))
}

/// `GET /edges/node/:node_id/incoming`
pub async fn incoming<S>(
  State(state): State<AppState<S>>,
  _user: CurrentUser,
  Path(node_id): Path<Uuid>,
) -> Result<Json<envelope::ListEnvelope<Edge>>, ApiError>
where
  S: GraphStore + 'static,
{
  let edges = state.store.incoming_edges(node_id).await?;
  Ok(envelope::list(edges))
}
