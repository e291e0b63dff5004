//! Handlers for `/edge-types` endpoints.
//!
//! Mirrors `/node-types`; mutations require the caller to be the creator of
//! the owning domain.

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use trellis_core::{
  edge_type::{EdgeType, EdgeTypePatch, NewEdgeType},
  store::GraphStore,
};
use uuid::Uuid;

use crate::{AppState, auth::CurrentUser, envelope, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub domain_id: Option<Uuid>,
}

/// `GET /edge-types[?domain_id=<id>]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  _user: CurrentUser,
  Query(params): Query<ListParams>,
) -> Result<Json<envelope::ListEnvelope<EdgeType>>, ApiError>
where
  S: GraphStore + 'static,
{
  let types = state.store.list_edge_types(params.domain_id).await?;
  Ok(envelope::list(types))
}

/// `GET /edge-types/by-domain/:domain_id`
pub async fn by_domain<S>(
  State(state): State<AppState<S>>,
  _user: CurrentUser,
  Path(domain_id): Path<Uuid>,
) -> Result<Json<envelope::ListEnvelope<EdgeType>>, ApiError>
where
  S: GraphStore + 'static,
{
  let types = state.store.list_edge_types(Some(domain_id)).await?;
  Ok(envelope::list(types))
}

/// `GET /edge-types/:id`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  _user: CurrentUser,
  Path(id): Path<Uuid>,
) -> Result<Json<envelope::DataEnvelope<EdgeType>>, ApiError>
where
  S: GraphStore + 'static,
{
  let edge_type = state.store.get_edge_type(id).await?;
  Ok(envelope::data(edge_type))
}

/// `POST /edge-types`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Json(body): Json<NewEdgeType>,
) -> Result<impl IntoResponse, ApiError>
where
  S: GraphStore + 'static,
{
  let edge_type = state.store.create_edge_type(body, user.id).await?;
  Ok((
    StatusCode::CREATED,
    envelope::message_data("Edge type created successfully", edge_type),
  ))
}

/// `PUT|PATCH /edge-types/:id`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Path(id): Path<Uuid>,
  Json(body): Json<EdgeTypePatch>,
) -> Result<Json<envelope::DataEnvelope<EdgeType>>, ApiError>
where
  S: GraphStore + 'static,
{
  let edge_type = state.store.update_edge_type(id, body, user.id).await?;
  Ok(envelope::message_data("Edge type updated successfully", edge_type))
}

/// `DELETE /edge-types/:id` — 409 while edges still use the type.
pub async fn remove<S>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Path(id): Path<Uuid>,
) -> Result<Json<envelope::MessageEnvelope>, ApiError>
where
  S: GraphStore + 'static,
{
  state.store.delete_edge_type(id, user.id).await?;
  Ok(envelope::message("Edge type deleted successfully"))
}
