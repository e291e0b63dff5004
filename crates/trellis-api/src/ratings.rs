//! Handlers for `/ratings` endpoints.
//!
//! Storage only — scores are written by external tooling and read back; no
//! computation happens here.

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use trellis_core::{
  rating::{MetricType, NewRating, Rating},
  store::GraphStore,
};
use uuid::Uuid;

use crate::{AppState, auth::CurrentUser, envelope, error::ApiError};

/// `POST /ratings`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  _user: CurrentUser,
  Json(body): Json<NewRating>,
) -> Result<impl IntoResponse, ApiError>
where
  S: GraphStore + 'static,
{
  let rating = state.store.create_rating(body).await?;
  Ok((
    StatusCode::CREATED,
    envelope::message_data("Rating created successfully", rating),
  ))
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub metric: Option<MetricType>,
}

/// `GET /ratings/node/:node_id[?metric=consistency|coherence|connectivity|overall]`
pub async fn by_node<S>(
  State(state): State<AppState<S>>,
  _user: CurrentUser,
  Path(node_id): Path<Uuid>,
  Query(params): Query<ListParams>,
) -> Result<Json<envelope::ListEnvelope<Rating>>, ApiError>
where
  S: GraphStore + 'static,
{
  let ratings = match params.metric {
    Some(metric) => {
      state.store.list_ratings_by_metric(node_id, metric).await?
    }
    None => state.store.list_ratings(node_id).await?,
  };
  Ok(envelope::list(ratings))
}
