//! Handlers for `/node-types` endpoints.
//!
//! Mutations require the caller to be the creator of the owning domain.

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use trellis_core::{
  node_type::{NewNodeType, NodeType, NodeTypePatch},
  store::GraphStore,
};
use uuid::Uuid;

use crate::{AppState, auth::CurrentUser, envelope, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub domain_id: Option<Uuid>,
}

/// `GET /node-types[?domain_id=<id>]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  _user: CurrentUser,
  Query(params): Query<ListParams>,
) -> Result<Json<envelope::ListEnvelope<NodeType>>, ApiError>
where
  S: GraphStore + 'static,
{
  let types = state.store.list_node_types(params.domain_id).await?;
  Ok(envelope::list(types))
}

/// `GET /node-types/by-domain/:domain_id`
pub async fn by_domain<S>(
  State(state): State<AppState<S>>,
  _user: CurrentUser,
  Path(domain_id): Path<Uuid>,
) -> Result<Json<envelope::ListEnvelope<NodeType>>, ApiError>
where
  S: GraphStore + 'static,
{
  let types = state.store.list_node_types(Some(domain_id)).await?;
  Ok(envelope::list(types))
}

/// `GET /node-types/:id`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  _user: CurrentUser,
  Path(id): Path<Uuid>,
) -> Result<Json<envelope::DataEnvelope<NodeType>>, ApiError>
where
  S: GraphStore + 'static,
{
  let node_type = state.store.get_node_type(id).await?;
  Ok(envelope::data(node_type))
}

/// `POST /node-types`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Json(body): Json<NewNodeType>,
) -> Result<impl IntoResponse, ApiError>
where
  S: GraphStore + 'static,
{
  let node_type = state.store.create_node_type(body, user.id).await?;
  Ok((
    StatusCode::CREATED,
    envelope::message_data("Node type created successfully", node_type),
  ))
}

/// `PUT|PATCH /node-types/:id`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Path(id): Path<Uuid>,
  Json(body): Json<NodeTypePatch>,
) -> Result<Json<envelope::DataEnvelope<NodeType>>, ApiError>
where
  S: GraphStore + 'static,
{
  let node_type = state.store.update_node_type(id, body, user.id).await?;
  Ok(envelope::message_data("Node type updated successfully", node_type))
}

/// `DELETE /node-types/:id` — 409 while nodes still use the type.
pub async fn remove<S>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Path(id): Path<Uuid>,
) -> Result<Json<envelope::MessageEnvelope>, ApiError>
where
  S: GraphStore + 'static,
{
  state.store.delete_node_type(id, user.id).await?;
  Ok(envelope::message("Node type deleted successfully"))
}
