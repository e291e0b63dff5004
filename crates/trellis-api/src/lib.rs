//! JSON REST API for Trellis.
//!
//! Exposes an axum [`Router`] backed by any [`trellis_core::store::GraphStore`].
//! Every route requires a Bearer JWT; TLS and transport concerns are the
//! caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let state = AppState::new(store, TokenConfig::new(secret));
//! .nest("/api", trellis_api::api_router(state))
//! ```

pub mod auth;
pub mod domains;
pub mod edge_types;
pub mod edges;
pub mod envelope;
pub mod error;
pub mod node_types;
pub mod nodes;
pub mod ratings;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, patch, post},
};
use trellis_core::store::GraphStore;

pub use auth::{CurrentUser, TokenConfig};
pub use error::ApiError;

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct AppState<S> {
  pub store:  Arc<S>,
  pub tokens: Arc<TokenConfig>,
}

impl<S> AppState<S> {
  pub fn new(store: S, tokens: TokenConfig) -> Self {
    Self { store: Arc::new(store), tokens: Arc::new(tokens) }
  }
}

// Manual impl: `S` itself need not be `Clone` behind the `Arc`s.
impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self { store: self.store.clone(), tokens: self.tokens.clone() }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: GraphStore + 'static,
{
  Router::new()
    // Auth
    .route("/auth/me", get(auth::me::<S>))
    // Domains
    .route("/domains", get(domains::list::<S>).post(domains::create::<S>))
    .route(
      "/domains/{id}",
      get(domains::get_one::<S>)
        .put(domains::update::<S>)
        .patch(domains::update::<S>)
        .delete(domains::remove::<S>),
    )
    .route("/domains/slug/{slug}", get(domains::get_by_slug::<S>))
    // Node types
    .route(
      "/node-types",
      get(node_types::list::<S>).post(node_types::create::<S>),
    )
    .route(
      "/node-types/{id}",
      get(node_types::get_one::<S>)
        .put(node_types::update::<S>)
        .patch(node_types::update::<S>)
        .delete(node_types::remove::<S>),
    )
    .route(
      "/node-types/by-domain/{domain_id}",
      get(node_types::by_domain::<S>),
    )
    // Edge types
    .route(
      "/edge-types",
      get(edge_types::list::<S>).post(edge_types::create::<S>),
    )
    .route(
      "/edge-types/{id}",
      get(edge_types::get_one::<S>)
        .put(edge_types::update::<S>)
        .patch(edge_types::update::<S>)
        .delete(edge_types::remove::<S>),
    )
    .route(
      "/edge-types/by-domain/{domain_id}",
      get(edge_types::by_domain::<S>),
    )
    // Nodes
    .route("/nodes", get(nodes::list::<S>).post(nodes::create::<S>))
    .route("/nodes/search", get(nodes::search::<S>))
    .route("/nodes/by-domain/{domain_id}", get(nodes::by_domain::<S>))
    .route("/nodes/by-type/{type_id}", get(nodes::by_type::<S>))
    .route("/nodes/by-tags", get(nodes::by_tags::<S>))
    .route("/nodes/slug/{slug}", get(nodes::get_by_slug::<S>))
    .route(
      "/nodes/{id}",
      get(nodes::get_one::<S>)
        .put(nodes::update::<S>)
        .patch(nodes::update::<S>)
        .delete(nodes::remove::<S>),
    )
    .route("/nodes/{id}/publish", patch(nodes::publish::<S>))
    .route("/nodes/{id}/archive", patch(nodes::archive::<S>))
    // Edges
    .route("/edges", get(edges::list::<S>).post(edges::create::<S>))
    .route(
      "/edges/{id}",
      get(edges::get_one::<S>)
        .put(edges::update::<S>)
        .patch(edges::update::<S>)
        .delete(edges::remove::<S>),
    )
    .route("/edges/node/{node_id}", get(edges::node_edges::<S>))
    .route("/edges/node/{node_id}/outgoing", get(edges::outgoing::<S>))
    .route("/edges/node/{node_id}/incoming", get(edges::incoming::<S>))
    // Ratings
    .route("/ratings", post(ratings::create::<S>))
    .route("/ratings/node/{node_id}", get(ratings::by_node::<S>))
    .with_state(state)
}

// ─── Integration tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use serde_json::{Value, json};
  use tower::ServiceExt as _;
  use trellis_core::user::{OAuthProfile, User};
  use trellis_store_sqlite::SqliteStore;
  use uuid::Uuid;

  async fn make_state() -> AppState<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    AppState::new(store, TokenConfig::new("test-secret"))
  }

  /// Create a user through the OAuth upsert path and mint a token for it.
  async fn seed_user(state: &AppState<SqliteStore>, email: &str) -> (User, String) {
    use trellis_core::store::GraphStore as _;
    let user = state
      .store
      .upsert_oauth_user(OAuthProfile {
        provider:         "google".into(),
        provider_user_id: format!("google-{email}"),
        email:            email.into(),
        display_name:     None,
        avatar_url:       None,
        access_token:     None,
        refresh_token:    None,
        token_expires_at: None,
      })
      .await
      .unwrap();
    let token = state.tokens.issue(&user).unwrap();
    (user, token)
  }

  async fn send(
    state: AppState<SqliteStore>,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
      builder = builder.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    let req = match body {
      Some(v) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(v.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };

    let resp = api_router(state).oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
  }

  /// Create a domain and return its id.
  async fn seed_domain(
    state: &AppState<SqliteStore>,
    token: &str,
    name: &str,
  ) -> Uuid {
    let (status, body) = send(
      state.clone(),
      "POST",
      "/domains",
      Some(token),
      Some(json!({ "name": name })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["data"]["id"].as_str().unwrap().parse().unwrap()
  }

  async fn seed_node_type(
    state: &AppState<SqliteStore>,
    token: &str,
    domain_id: Uuid,
    name: &str,
  ) -> Uuid {
    let (status, body) = send(
      state.clone(),
      "POST",
      "/node-types",
      Some(token),
      Some(json!({ "name": name, "domain_id": domain_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["data"]["id"].as_str().unwrap().parse().unwrap()
  }

  async fn seed_node(
    state: &AppState<SqliteStore>,
    token: &str,
    domain_id: Uuid,
    type_id: Uuid,
    title: &str,
  ) -> Uuid {
    let (status, body) = send(
      state.clone(),
      "POST",
      "/nodes",
      Some(token),
      Some(json!({ "title": title, "domain_id": domain_id, "type_id": type_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["data"]["id"].as_str().unwrap().parse().unwrap()
  }

  // ── Auth ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn unauthenticated_request_returns_401() {
    let state = make_state().await;
    let (status, body) = send(state, "GET", "/domains", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], json!(false));
  }

  #[tokio::test]
  async fn garbage_token_returns_401() {
    let state = make_state().await;
    let (status, _) =
      send(state, "GET", "/domains", Some("not.a.token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn me_returns_the_stored_user() {
    let state = make_state().await;
    let (user, token) = seed_user(&state, "alice@example.com").await;
    let (status, body) = send(state, "GET", "/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], json!(user.id.to_string()));
    assert_eq!(body["data"]["email"], json!("alice@example.com"));
  }

  // ── Domains ─────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_domain_derives_slug_and_envelopes() {
    let state = make_state().await;
    let (_user, token) = seed_user(&state, "alice@example.com").await;

    let (status, body) = send(
      state.clone(),
      "POST",
      "/domains",
      Some(&token),
      Some(json!({ "name": "Physics Theories" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["slug"], json!("physics-theories"));

    let (status, body) = send(state, "GET", "/domains", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], json!(1));
    // Creator summary is attached to list reads.
    assert_eq!(body["data"][0]["creator"]["username"], json!("alice"));
  }

  #[tokio::test]
  async fn duplicate_domain_slug_is_a_conflict() {
    let state = make_state().await;
    let (_user, token) = seed_user(&state, "alice@example.com").await;
    seed_domain(&state, &token, "Physics").await;

    let (status, body) = send(
      state,
      "POST",
      "/domains",
      Some(&token),
      Some(json!({ "name": "physics" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");
    assert_eq!(body["success"], json!(false));
  }

  #[tokio::test]
  async fn get_domain_by_slug_and_missing_404() {
    let state = make_state().await;
    let (_user, token) = seed_user(&state, "alice@example.com").await;
    seed_domain(&state, &token, "Physics").await;

    let (status, body) =
      send(state.clone(), "GET", "/domains/slug/physics", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], json!("Physics"));

    let (status, _) = send(
      state,
      "GET",
      &format!("/domains/{}", Uuid::new_v4()),
      Some(&token),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn non_owner_update_is_forbidden() {
    let state = make_state().await;
    let (_alice, alice_token) = seed_user(&state, "alice@example.com").await;
    let (_mallory, mallory_token) = seed_user(&state, "mallory@example.com").await;
    let domain_id = seed_domain(&state, &alice_token, "Physics").await;

    let (status, body) = send(
      state.clone(),
      "PATCH",
      &format!("/domains/{domain_id}"),
      Some(&mallory_token),
      Some(json!({ "description": "mine now" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["success"], json!(false));

    // The owner still can.
    let (status, body) = send(
      state,
      "PUT",
      &format!("/domains/{domain_id}"),
      Some(&alice_token),
      Some(json!({ "description": "updated" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["description"], json!("updated"));
  }

  // ── Type registries ─────────────────────────────────────────────────────

  #[tokio::test]
  async fn node_type_mutation_requires_domain_owner() {
    let state = make_state().await;
    let (_alice, alice_token) = seed_user(&state, "alice@example.com").await;
    let (_mallory, mallory_token) = seed_user(&state, "mallory@example.com").await;
    let domain_id = seed_domain(&state, &alice_token, "Physics").await;

    let (status, _) = send(
      state.clone(),
      "POST",
      "/node-types",
      Some(&mallory_token),
      Some(json!({ "name": "Axiom", "domain_id": domain_id })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
      state,
      "POST",
      "/node-types",
      Some(&alice_token),
      Some(json!({ "name": "Axiom", "domain_id": domain_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["sort_order"], json!(0));
    assert_eq!(body["data"]["color"], json!("#1890ff"));
  }

  #[tokio::test]
  async fn deleting_a_node_type_in_use_is_a_conflict() {
    let state = make_state().await;
    let (_alice, token) = seed_user(&state, "alice@example.com").await;
    let domain_id = seed_domain(&state, &token, "Physics").await;
    let type_id = seed_node_type(&state, &token, domain_id, "Axiom").await;
    seed_node(&state, &token, domain_id, type_id, "First Law").await;

    let (status, body) = send(
      state,
      "DELETE",
      &format!("/node-types/{type_id}"),
      Some(&token),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");
  }

  // ── Nodes ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn node_type_from_another_domain_is_rejected() {
    let state = make_state().await;
    let (_alice, token) = seed_user(&state, "alice@example.com").await;
    let physics = seed_domain(&state, &token, "Physics").await;
    let biology = seed_domain(&state, &token, "Biology").await;
    let bio_type = seed_node_type(&state, &token, biology, "Species").await;

    let (status, body) = send(
      state,
      "POST",
      "/nodes",
      Some(&token),
      Some(json!({
        "title": "First Law",
        "domain_id": physics,
        "type_id": bio_type,
      })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
  }

  #[tokio::test]
  async fn publish_stamps_published_at() {
    let state = make_state().await;
    let (_alice, token) = seed_user(&state, "alice@example.com").await;
    let domain_id = seed_domain(&state, &token, "Physics").await;
    let type_id = seed_node_type(&state, &token, domain_id, "Axiom").await;
    let node_id = seed_node(&state, &token, domain_id, type_id, "First Law").await;

    let (status, body) = send(
      state.clone(),
      "PATCH",
      &format!("/nodes/{node_id}/publish"),
      Some(&token),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], json!("published"));
    assert!(!body["data"]["published_at"].is_null());
    let published_at = body["data"]["published_at"].clone();

    // Archiving keeps the publish timestamp.
    let (status, body) = send(
      state,
      "PATCH",
      &format!("/nodes/{node_id}/archive"),
      Some(&token),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], json!("archived"));
    assert_eq!(body["data"]["published_at"], published_at);
  }

  #[tokio::test]
  async fn node_search_and_tag_filters() {
    let state = make_state().await;
    let (_alice, token) = seed_user(&state, "alice@example.com").await;
    let domain_id = seed_domain(&state, &token, "Physics").await;
    let type_id = seed_node_type(&state, &token, domain_id, "Axiom").await;

    send(
      state.clone(),
      "POST",
      "/nodes",
      Some(&token),
      Some(json!({
        "title": "Thermodynamics Intro",
        "domain_id": domain_id,
        "type_id": type_id,
        "tags": ["heat", "energy"],
      })),
    )
    .await;
    send(
      state.clone(),
      "POST",
      "/nodes",
      Some(&token),
      Some(json!({
        "title": "Optics Basics",
        "domain_id": domain_id,
        "type_id": type_id,
        "tags": ["light"],
      })),
    )
    .await;

    let (status, body) = send(
      state.clone(),
      "GET",
      "/nodes/search?q=thermo",
      Some(&token),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], json!(1));
    assert_eq!(body["data"][0]["title"], json!("Thermodynamics Intro"));

    // Overlap: any shared tag matches.
    let (status, body) = send(
      state,
      "GET",
      "/nodes/by-tags?tags=light,sound",
      Some(&token),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], json!(1));
    assert_eq!(body["data"][0]["title"], json!("Optics Basics"));
  }

  // ── Edges ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn edge_rules_and_adjacency_counts() {
    let state = make_state().await;
    let (_alice, token) = seed_user(&state, "alice@example.com").await;
    let domain_id = seed_domain(&state, &token, "Physics").await;
    let type_id = seed_node_type(&state, &token, domain_id, "Axiom").await;
    let a = seed_node(&state, &token, domain_id, type_id, "Node A").await;
    let b = seed_node(&state, &token, domain_id, type_id, "Node B").await;

    let (status, body) = send(
      state.clone(),
      "POST",
      "/edge-types",
      Some(&token),
      Some(json!({
        "name": "Derives From",
        "domain_id": domain_id,
        "semantic_type": "derives_from",
        "weight": 1.0,
      })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let et: Uuid = body["data"]["id"].as_str().unwrap().parse().unwrap();

    // Self-loop → 400.
    let (status, body) = send(
      state.clone(),
      "POST",
      "/edges",
      Some(&token),
      Some(json!({ "source_id": a, "target_id": a, "type_id": et })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
      body["message"].as_str().unwrap().contains("elf-loops"),
      "{body}"
    );

    // A → B succeeds.
    let (status, _) = send(
      state.clone(),
      "POST",
      "/edges",
      Some(&token),
      Some(json!({ "source_id": a, "target_id": b, "type_id": et })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Duplicate triple → 409.
    let (status, _) = send(
      state.clone(),
      "POST",
      "/edges",
      Some(&token),
      Some(json!({ "source_id": a, "target_id": b, "type_id": et })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Adjacency of A: one outgoing, nothing incoming.
    let (status, body) = send(
      state,
      "GET",
      &format!("/edges/node/{a}"),
      Some(&token),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"]["outgoing"], json!(1));
    assert_eq!(body["count"]["incoming"], json!(0));
    assert_eq!(body["count"]["total"], json!(1));
    assert_eq!(body["data"]["outgoing"][0]["target_id"], json!(b.to_string()));
  }

  // ── Ratings ─────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn ratings_round_trip_by_metric() {
    let state = make_state().await;
    let (_alice, token) = seed_user(&state, "alice@example.com").await;
    let domain_id = seed_domain(&state, &token, "Physics").await;
    let type_id = seed_node_type(&state, &token, domain_id, "Axiom").await;
    let node_id = seed_node(&state, &token, domain_id, type_id, "First Law").await;

    let (status, _) = send(
      state.clone(),
      "POST",
      "/ratings",
      Some(&token),
      Some(json!({
        "node_id": node_id,
        "metric_type": "coherence",
        "score": 0.87,
        "details": { "algorithm": "none" },
      })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
      state,
      "GET",
      &format!("/ratings/node/{node_id}?metric=coherence"),
      Some(&token),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], json!(1));
    assert_eq!(body["data"][0]["score"], json!(0.87));
  }
}
