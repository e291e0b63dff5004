//! Handlers for `/domains` endpoints.
//!
//! | Method      | Path                  | Notes |
//! |-------------|-----------------------|-------|
//! | `GET`       | `/domains`            | Optional `?public=true\|false` |
//! | `POST`      | `/domains`            | Body: [`NewDomain`]; 201 |
//! | `GET`       | `/domains/:id`        | 404 if not found |
//! | `GET`       | `/domains/slug/:slug` | Lookup by slug |
//! | `PUT/PATCH` | `/domains/:id`        | Owner only |
//! | `DELETE`    | `/domains/:id`        | Owner only; cascades |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use trellis_core::{
  domain::{Domain, DomainPatch, DomainRecord, NewDomain},
  store::GraphStore,
};
use uuid::Uuid;

use crate::{AppState, auth::CurrentUser, envelope, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub public: Option<bool>,
}

/// `GET /domains[?public=true|false]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  _user: CurrentUser,
  Query(params): Query<ListParams>,
) -> Result<Json<envelope::ListEnvelope<DomainRecord>>, ApiError>
where
  S: GraphStore + 'static,
{
  let domains = state.store.list_domains(params.public).await?;
  Ok(envelope::list(domains))
}

/// `POST /domains`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Json(body): Json<NewDomain>,
) -> Result<impl IntoResponse, ApiError>
where
  S: GraphStore + 'static,
{
  let domain = state.store.create_domain(body, user.id).await?;
  Ok((
    StatusCode::CREATED,
    envelope::message_data("Domain created successfully", domain),
  ))
}

/// `GET /domains/:id`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  _user: CurrentUser,
  Path(id): Path<Uuid>,
) -> Result<Json<envelope::DataEnvelope<DomainRecord>>, ApiError>
where
  S: GraphStore + 'static,
{
  let domain = state.store.get_domain(id).await?;
  Ok(envelope::data(domain))
}

/// `GET /domains/slug/:slug`
pub async fn get_by_slug<S>(
  State(state): State<AppState<S>>,
  _user: CurrentUser,
  Path(slug): Path<String>,
) -> Result<Json<envelope::DataEnvelope<DomainRecord>>, ApiError>
where
  S: GraphStore + 'static,
{
  let domain = state.store.get_domain_by_slug(&slug).await?;
  Ok(envelope::data(domain))
}

/// `PUT|PATCH /domains/:id` — owner only.
pub async fn update<S>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Path(id): Path<Uuid>,
  Json(body): Json<DomainPatch>,
) -> Result<Json<envelope::DataEnvelope<Domain>>, ApiError>
where
  S: GraphStore + 'static,
{
  let domain = state.store.update_domain(id, body, user.id).await?;
  Ok(envelope::message_data("Domain updated successfully", domain))
}

/// `DELETE /domains/:id` — owner only; cascades to the domain's types and
/// nodes.
pub async fn remove<S>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Path(id): Path<Uuid>,
) -> Result<Json<envelope::MessageEnvelope>, ApiError>
where
  S: GraphStore + 'static,
{
  state.store.delete_domain(id, user.id).await?;
  Ok(envelope::message("Domain deleted successfully"))
}
