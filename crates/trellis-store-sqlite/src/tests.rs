//! Integration tests for `SqliteStore` against an in-memory database.

use trellis_core::{
  Error,
  document::Document,
  domain::{Domain, DomainPatch, NewDomain},
  edge::NewEdge,
  edge_type::{EdgeType, NewEdgeType, SemanticType},
  node::{NewNode, Node, NodeStatus},
  node_type::{NewNodeType, NodeType},
  rating::{MetricType, NewRating},
  store::{GraphStore, NodeQuery},
  user::{OAuthProfile, User},
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn profile(email: &str) -> OAuthProfile {
  OAuthProfile {
    provider:         "google".into(),
    provider_user_id: format!("google-{email}"),
    email:            email.into(),
    display_name:     None,
    avatar_url:       None,
    access_token:     None,
    refresh_token:    None,
    token_expires_at: None,
  }
}

async fn user(s: &SqliteStore, email: &str) -> User {
  s.upsert_oauth_user(profile(email)).await.unwrap()
}

fn new_domain(name: &str) -> NewDomain {
  NewDomain {
    name:         name.into(),
    slug:         None,
    description:  None,
    translations: Document::new(),
    is_public:    true,
    settings:     Document::new(),
  }
}

async fn domain(s: &SqliteStore, creator: &User, name: &str) -> Domain {
  s.create_domain(new_domain(name), creator.id).await.unwrap()
}

fn new_node_type(name: &str, domain_id: Uuid) -> NewNodeType {
  NewNodeType {
    name:        name.into(),
    slug:        None,
    description: None,
    icon:        None,
    color:       "#1890ff".into(),
    schema:      Document::new(),
    sort_order:  0,
    domain_id,
  }
}

async fn node_type(
  s: &SqliteStore,
  caller: &User,
  domain_id: Uuid,
  name: &str,
) -> NodeType {
  s.create_node_type(new_node_type(name, domain_id), caller.id)
    .await
    .unwrap()
}

fn new_edge_type(
  name: &str,
  domain_id: Uuid,
  semantic_type: SemanticType,
) -> NewEdgeType {
  NewEdgeType {
    name: name.into(),
    slug: None,
    description: None,
    icon: None,
    color: "#52c41a".into(),
    semantic_type,
    weight: 1.0,
    is_directed: true,
    domain_id,
  }
}

async fn edge_type(
  s: &SqliteStore,
  caller: &User,
  domain_id: Uuid,
  name: &str,
  semantic_type: SemanticType,
) -> EdgeType {
  s.create_edge_type(new_edge_type(name, domain_id, semantic_type), caller.id)
    .await
    .unwrap()
}

fn new_node(title: &str, domain_id: Uuid, type_id: Uuid) -> NewNode {
  NewNode {
    title:     title.into(),
    slug:      None,
    excerpt:   None,
    content:   Document::new(),
    tags:      Vec::new(),
    status:    NodeStatus::Draft,
    domain_id,
    type_id,
  }
}

async fn node(
  s: &SqliteStore,
  creator: &User,
  domain_id: Uuid,
  type_id: Uuid,
  title: &str,
) -> Node {
  s.create_node(new_node(title, domain_id, type_id), creator.id)
    .await
    .unwrap()
}

// ─── Identity ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn oauth_upsert_is_idempotent_per_identity() {
  let s = store().await;

  let first = user(&s, "alice@example.com").await;
  assert_eq!(first.username, "alice");
  assert!(first.is_email_verified);
  assert_eq!(first.roles, vec!["user".to_owned()]);

  // Same external identity maps to the same user.
  let again = s
    .upsert_oauth_user(profile("alice@example.com"))
    .await
    .unwrap();
  assert_eq!(again.id, first.id);
}

#[tokio::test]
async fn oauth_upsert_links_by_email_for_new_provider() {
  let s = store().await;
  let alice = user(&s, "alice@example.com").await;

  // Same email from a different provider links to the existing user.
  let mut p = profile("alice@example.com");
  p.provider = "github".into();
  p.provider_user_id = "gh-1".into();
  let linked = s.upsert_oauth_user(p).await.unwrap();
  assert_eq!(linked.id, alice.id);
}

#[tokio::test]
async fn get_user_missing_errors() {
  let s = store().await;
  let err = s.get_user(Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(err, Error::UserNotFound(_)));
}

// ─── Domains ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_domain_derives_slug_from_name() {
  let s = store().await;
  let alice = user(&s, "alice@example.com").await;

  let d = domain(&s, &alice, "Physics Theories").await;
  assert_eq!(d.slug, "physics-theories");
  assert_eq!(d.creator_id, alice.id);
  assert!(d.is_active);
}

#[tokio::test]
async fn caller_supplied_slug_is_used_verbatim() {
  let s = store().await;
  let alice = user(&s, "alice@example.com").await;

  let mut input = new_domain("Physics");
  input.slug = Some("phys".into());
  let d = s.create_domain(input, alice.id).await.unwrap();
  assert_eq!(d.slug, "phys");
}

#[tokio::test]
async fn duplicate_domain_slug_conflicts() {
  let s = store().await;
  let alice = user(&s, "alice@example.com").await;
  domain(&s, &alice, "Physics").await;

  // "physics" derives the same slug; the unique constraint decides.
  let err = s
    .create_domain(new_domain("physics"), alice.id)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Conflict(_)), "{err}");
}

#[tokio::test]
async fn blank_domain_name_is_a_validation_error() {
  let s = store().await;
  let alice = user(&s, "alice@example.com").await;

  let err = s
    .create_domain(new_domain("   "), alice.id)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::MissingField("name")));
}

#[tokio::test]
async fn list_domains_newest_first_with_creator_summary() {
  let s = store().await;
  let alice = user(&s, "alice@example.com").await;
  domain(&s, &alice, "Older").await;
  domain(&s, &alice, "Newer").await;

  let all = s.list_domains(None).await.unwrap();
  assert_eq!(all.len(), 2);
  assert_eq!(all[0].domain.name, "Newer");
  assert_eq!(all[1].domain.name, "Older");
  assert_eq!(all[0].creator.username, "alice");
}

#[tokio::test]
async fn list_domains_filters_by_visibility() {
  let s = store().await;
  let alice = user(&s, "alice@example.com").await;
  domain(&s, &alice, "Open").await;
  let mut input = new_domain("Closed");
  input.is_public = false;
  s.create_domain(input, alice.id).await.unwrap();

  let public = s.list_domains(Some(true)).await.unwrap();
  assert_eq!(public.len(), 1);
  assert_eq!(public[0].domain.name, "Open");

  let private = s.list_domains(Some(false)).await.unwrap();
  assert_eq!(private.len(), 1);
  assert_eq!(private[0].domain.name, "Closed");
}

#[tokio::test]
async fn get_domain_by_slug_missing_errors() {
  let s = store().await;
  let err = s.get_domain_by_slug("absent").await.unwrap_err();
  assert!(matches!(err, Error::DomainSlugNotFound(_)));
}

#[tokio::test]
async fn update_domain_is_owner_only_and_keeps_slug_on_rename() {
  let s = store().await;
  let alice = user(&s, "alice@example.com").await;
  let mallory = user(&s, "mallory@example.com").await;
  let d = domain(&s, &alice, "Physics").await;

  let err = s
    .update_domain(d.id, DomainPatch::default(), mallory.id)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NotOwner(_)));

  let patch = DomainPatch {
    name: Some("Physik".into()),
    description: Some("renamed".into()),
    ..Default::default()
  };
  let updated = s.update_domain(d.id, patch, alice.id).await.unwrap();
  assert_eq!(updated.name, "Physik");
  // Renames keep the slug stable; only an explicit slug patch changes it.
  assert_eq!(updated.slug, "physics");
  assert_eq!(updated.description.as_deref(), Some("renamed"));
  assert!(updated.updated_at > d.updated_at);
}

#[tokio::test]
async fn delete_domain_cascades_to_types_and_nodes() {
  let s = store().await;
  let alice = user(&s, "alice@example.com").await;
  let d = domain(&s, &alice, "Physics").await;
  let nt = node_type(&s, &alice, d.id, "Axiom").await;
  let et = edge_type(&s, &alice, d.id, "Supports", SemanticType::Supports).await;
  let a = node(&s, &alice, d.id, nt.id, "Node A").await;
  let b = node(&s, &alice, d.id, nt.id, "Node B").await;
  s.create_edge(
    NewEdge {
      source_id:   a.id,
      target_id:   b.id,
      type_id:     et.id,
      description: None,
      metadata:    Document::new(),
    },
    alice.id,
  )
  .await
  .unwrap();

  // Non-owner cannot delete.
  let mallory = user(&s, "mallory@example.com").await;
  let err = s.delete_domain(d.id, mallory.id).await.unwrap_err();
  assert!(matches!(err, Error::NotOwner(_)));

  s.delete_domain(d.id, alice.id).await.unwrap();

  assert!(matches!(
    s.get_domain(d.id).await.unwrap_err(),
    Error::DomainNotFound(_)
  ));
  assert!(matches!(
    s.get_node_type(nt.id).await.unwrap_err(),
    Error::NodeTypeNotFound(_)
  ));
  assert!(matches!(
    s.get_edge_type(et.id).await.unwrap_err(),
    Error::EdgeTypeNotFound(_)
  ));
  assert!(matches!(
    s.get_node(a.id).await.unwrap_err(),
    Error::NodeNotFound(_)
  ));
  assert!(s.list_edges(None, None).await.unwrap().is_empty());
}

// ─── Type registries ─────────────────────────────────────────────────────────

#[tokio::test]
async fn type_mutations_require_the_domain_owner() {
  let s = store().await;
  let alice = user(&s, "alice@example.com").await;
  let mallory = user(&s, "mallory@example.com").await;
  let d = domain(&s, &alice, "Physics").await;

  let err = s
    .create_node_type(new_node_type("Axiom", d.id), mallory.id)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NotOwner(_)));

  let nt = node_type(&s, &alice, d.id, "Axiom").await;
  let err = s
    .delete_node_type(nt.id, mallory.id)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NotOwner(_)));
}

#[tokio::test]
async fn type_slug_is_unique_per_domain_only() {
  let s = store().await;
  let alice = user(&s, "alice@example.com").await;
  let physics = domain(&s, &alice, "Physics").await;
  let biology = domain(&s, &alice, "Biology").await;

  node_type(&s, &alice, physics.id, "Axiom").await;

  // Same slug in the same domain conflicts.
  let err = s
    .create_node_type(new_node_type("Axiom", physics.id), alice.id)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Conflict(_)));

  // The same slug in another domain is fine.
  node_type(&s, &alice, biology.id, "Axiom").await;
}

#[tokio::test]
async fn list_node_types_orders_by_sort_order_then_name() {
  let s = store().await;
  let alice = user(&s, "alice@example.com").await;
  let d = domain(&s, &alice, "Physics").await;

  let mut late = new_node_type("Aardvark", d.id);
  late.sort_order = 5;
  s.create_node_type(late, alice.id).await.unwrap();
  node_type(&s, &alice, d.id, "Beta").await;
  node_type(&s, &alice, d.id, "Alpha").await;

  let types = s.list_node_types(Some(d.id)).await.unwrap();
  let names: Vec<_> = types.iter().map(|t| t.name.as_str()).collect();
  assert_eq!(names, ["Alpha", "Beta", "Aardvark"]);
}

#[tokio::test]
async fn delete_node_type_in_use_is_restricted() {
  let s = store().await;
  let alice = user(&s, "alice@example.com").await;
  let d = domain(&s, &alice, "Physics").await;
  let nt = node_type(&s, &alice, d.id, "Axiom").await;
  node(&s, &alice, d.id, nt.id, "First Law").await;

  let err = s.delete_node_type(nt.id, alice.id).await.unwrap_err();
  assert!(matches!(err, Error::Restricted(_)), "{err}");

  // Still present.
  assert!(s.get_node_type(nt.id).await.is_ok());
}

#[tokio::test]
async fn delete_edge_type_in_use_is_restricted() {
  let s = store().await;
  let alice = user(&s, "alice@example.com").await;
  let d = domain(&s, &alice, "Physics").await;
  let nt = node_type(&s, &alice, d.id, "Axiom").await;
  let et =
    edge_type(&s, &alice, d.id, "Derives From", SemanticType::DerivesFrom).await;
  let a = node(&s, &alice, d.id, nt.id, "Node A").await;
  let b = node(&s, &alice, d.id, nt.id, "Node B").await;
  s.create_edge(
    NewEdge {
      source_id:   a.id,
      target_id:   b.id,
      type_id:     et.id,
      description: None,
      metadata:    Document::new(),
    },
    alice.id,
  )
  .await
  .unwrap();

  let err = s.delete_edge_type(et.id, alice.id).await.unwrap_err();
  assert!(matches!(err, Error::Restricted(_)));
}

// ─── Nodes ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn node_slug_is_globally_unique_across_domains() {
  let s = store().await;
  let alice = user(&s, "alice@example.com").await;
  let physics = domain(&s, &alice, "Physics").await;
  let biology = domain(&s, &alice, "Biology").await;
  let pt = node_type(&s, &alice, physics.id, "Axiom").await;
  let bt = node_type(&s, &alice, biology.id, "Species").await;

  node(&s, &alice, physics.id, pt.id, "Entropy").await;

  let err = s
    .create_node(new_node("Entropy", biology.id, bt.id), alice.id)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Conflict(_)));
}

#[tokio::test]
async fn node_type_must_belong_to_the_node_domain() {
  let s = store().await;
  let alice = user(&s, "alice@example.com").await;
  let physics = domain(&s, &alice, "Physics").await;
  let biology = domain(&s, &alice, "Biology").await;
  let bio_type = node_type(&s, &alice, biology.id, "Species").await;

  let err = s
    .create_node(new_node("First Law", physics.id, bio_type.id), alice.id)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::TypeDomainMismatch { .. }));
}

#[tokio::test]
async fn update_node_recheck_runs_when_moving_types() {
  let s = store().await;
  let alice = user(&s, "alice@example.com").await;
  let physics = domain(&s, &alice, "Physics").await;
  let biology = domain(&s, &alice, "Biology").await;
  let pt = node_type(&s, &alice, physics.id, "Axiom").await;
  let bt = node_type(&s, &alice, biology.id, "Species").await;
  let n = node(&s, &alice, physics.id, pt.id, "Entropy").await;

  let patch = trellis_core::node::NodePatch {
    type_id: Some(bt.id),
    ..Default::default()
  };
  let err = s.update_node(n.id, patch, alice.id).await.unwrap_err();
  assert!(matches!(err, Error::TypeDomainMismatch { .. }));

  // Moving domain and type together is allowed.
  let patch = trellis_core::node::NodePatch {
    domain_id: Some(biology.id),
    type_id: Some(bt.id),
    ..Default::default()
  };
  let moved = s.update_node(n.id, patch, alice.id).await.unwrap();
  assert_eq!(moved.domain_id, biology.id);
  assert_eq!(moved.type_id, bt.id);
}

#[tokio::test]
async fn publish_stamps_and_archive_preserves_published_at() {
  let s = store().await;
  let alice = user(&s, "alice@example.com").await;
  let d = domain(&s, &alice, "Physics").await;
  let nt = node_type(&s, &alice, d.id, "Axiom").await;
  let n = node(&s, &alice, d.id, nt.id, "First Law").await;
  assert_eq!(n.status, NodeStatus::Draft);
  assert!(n.published_at.is_none());

  let published = s.publish_node(n.id, alice.id).await.unwrap();
  assert_eq!(published.status, NodeStatus::Published);
  let stamp = published.published_at.expect("published_at set");

  let archived = s.archive_node(n.id, alice.id).await.unwrap();
  assert_eq!(archived.status, NodeStatus::Archived);
  assert_eq!(archived.published_at, Some(stamp));
}

#[tokio::test]
async fn archive_straight_from_draft_leaves_published_at_null() {
  let s = store().await;
  let alice = user(&s, "alice@example.com").await;
  let d = domain(&s, &alice, "Physics").await;
  let nt = node_type(&s, &alice, d.id, "Axiom").await;
  let n = node(&s, &alice, d.id, nt.id, "Scratch").await;

  let archived = s.archive_node(n.id, alice.id).await.unwrap();
  assert_eq!(archived.status, NodeStatus::Archived);
  assert!(archived.published_at.is_none());
}

#[tokio::test]
async fn node_mutations_are_creator_only() {
  let s = store().await;
  let alice = user(&s, "alice@example.com").await;
  let mallory = user(&s, "mallory@example.com").await;
  let d = domain(&s, &alice, "Physics").await;
  let nt = node_type(&s, &alice, d.id, "Axiom").await;
  let n = node(&s, &alice, d.id, nt.id, "First Law").await;

  for result in [
    s.publish_node(n.id, mallory.id).await.err(),
    s.archive_node(n.id, mallory.id).await.err(),
    s.delete_node(n.id, mallory.id).await.err(),
  ] {
    assert!(matches!(result, Some(Error::NotOwner(_))));
  }
}

#[tokio::test]
async fn list_nodes_combines_filters_and_tag_overlap() {
  let s = store().await;
  let alice = user(&s, "alice@example.com").await;
  let d = domain(&s, &alice, "Physics").await;
  let nt = node_type(&s, &alice, d.id, "Axiom").await;

  let mut heat = new_node("Thermodynamics", d.id, nt.id);
  heat.tags = vec!["heat".into(), "energy".into()];
  let heat = s.create_node(heat, alice.id).await.unwrap();
  s.publish_node(heat.id, alice.id).await.unwrap();

  let mut light = new_node("Optics", d.id, nt.id);
  light.tags = vec!["light".into()];
  s.create_node(light, alice.id).await.unwrap();

  let published = s
    .list_nodes(&NodeQuery {
      domain_id: Some(d.id),
      status: Some(NodeStatus::Published),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(published.len(), 1);
  assert_eq!(published[0].title, "Thermodynamics");

  // Overlap, not subset: one shared tag is enough.
  let tagged = s
    .list_nodes(&NodeQuery {
      tags: vec!["energy".into(), "sound".into()],
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(tagged.len(), 1);
  assert_eq!(tagged[0].title, "Thermodynamics");
}

#[tokio::test]
async fn search_matches_title_or_excerpt_case_insensitively() {
  let s = store().await;
  let alice = user(&s, "alice@example.com").await;
  let d = domain(&s, &alice, "Physics").await;
  let nt = node_type(&s, &alice, d.id, "Axiom").await;

  node(&s, &alice, d.id, nt.id, "Thermodynamics Intro").await;
  let mut with_excerpt = new_node("Second Article", d.id, nt.id);
  with_excerpt.excerpt = Some("all about THERMO stuff".into());
  s.create_node(with_excerpt, alice.id).await.unwrap();
  node(&s, &alice, d.id, nt.id, "Optics").await;

  let hits = s.search_nodes("thermo").await.unwrap();
  assert_eq!(hits.len(), 2);
}

// ─── Edges ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn self_loops_are_rejected() {
  let s = store().await;
  let alice = user(&s, "alice@example.com").await;
  let d = domain(&s, &alice, "Physics").await;
  let nt = node_type(&s, &alice, d.id, "Axiom").await;
  let et =
    edge_type(&s, &alice, d.id, "Derives From", SemanticType::DerivesFrom).await;
  let a = node(&s, &alice, d.id, nt.id, "Node A").await;

  let err = s
    .create_edge(
      NewEdge {
        source_id:   a.id,
        target_id:   a.id,
        type_id:     et.id,
        description: None,
        metadata:    Document::new(),
      },
      alice.id,
    )
    .await
    .unwrap_err();
  assert!(matches!(err, Error::SelfLoop));
}

#[tokio::test]
async fn duplicate_edge_triple_conflicts() {
  let s = store().await;
  let alice = user(&s, "alice@example.com").await;
  let d = domain(&s, &alice, "Physics").await;
  let nt = node_type(&s, &alice, d.id, "Axiom").await;
  let et =
    edge_type(&s, &alice, d.id, "Derives From", SemanticType::DerivesFrom).await;
  let a = node(&s, &alice, d.id, nt.id, "Node A").await;
  let b = node(&s, &alice, d.id, nt.id, "Node B").await;

  let make = || NewEdge {
    source_id:   a.id,
    target_id:   b.id,
    type_id:     et.id,
    description: None,
    metadata:    Document::new(),
  };

  s.create_edge(make(), alice.id).await.unwrap();
  let err = s.create_edge(make(), alice.id).await.unwrap_err();
  assert!(matches!(err, Error::Conflict(_)));

  // The reverse direction is a different triple.
  s.create_edge(
    NewEdge {
      source_id:   b.id,
      target_id:   a.id,
      type_id:     et.id,
      description: None,
      metadata:    Document::new(),
    },
    alice.id,
  )
  .await
  .unwrap();
}

#[tokio::test]
async fn edge_mutations_follow_the_source_node_owner() {
  let s = store().await;
  let alice = user(&s, "alice@example.com").await;
  let mallory = user(&s, "mallory@example.com").await;
  let d = domain(&s, &alice, "Physics").await;
  let nt = node_type(&s, &alice, d.id, "Axiom").await;
  let et = edge_type(&s, &alice, d.id, "Supports", SemanticType::Supports).await;
  let a = node(&s, &alice, d.id, nt.id, "Node A").await;
  let b = node(&s, &alice, d.id, nt.id, "Node B").await;

  let input = NewEdge {
    source_id:   a.id,
    target_id:   b.id,
    type_id:     et.id,
    description: None,
    metadata:    Document::new(),
  };

  let err = s.create_edge(input.clone(), mallory.id).await.unwrap_err();
  assert!(matches!(err, Error::NotOwner(_)));

  let edge = s.create_edge(input, alice.id).await.unwrap();
  let err = s.delete_edge(edge.id, mallory.id).await.unwrap_err();
  assert!(matches!(err, Error::NotOwner(_)));
}

#[tokio::test]
async fn node_edges_returns_both_directions() {
  let s = store().await;
  let alice = user(&s, "alice@example.com").await;
  let d = domain(&s, &alice, "Physics").await;
  let nt = node_type(&s, &alice, d.id, "Axiom").await;
  let et =
    edge_type(&s, &alice, d.id, "Derives From", SemanticType::DerivesFrom).await;
  let a = node(&s, &alice, d.id, nt.id, "Node A").await;
  let b = node(&s, &alice, d.id, nt.id, "Node B").await;

  let edge = s
    .create_edge(
      NewEdge {
        source_id:   a.id,
        target_id:   b.id,
        type_id:     et.id,
        description: None,
        metadata:    Document::new(),
      },
      alice.id,
    )
    .await
    .unwrap();

  let of_a = s.node_edges(a.id).await.unwrap();
  assert_eq!(of_a.outgoing.len(), 1);
  assert_eq!(of_a.outgoing[0].id, edge.id);
  assert!(of_a.incoming.is_empty());

  let of_b = s.node_edges(b.id).await.unwrap();
  assert!(of_b.outgoing.is_empty());
  assert_eq!(of_b.incoming.len(), 1);

  // list_edges by node matches either endpoint.
  let touching_b = s.list_edges(Some(b.id), None).await.unwrap();
  assert_eq!(touching_b.len(), 1);
}

#[tokio::test]
async fn list_edges_filters_by_source_domain() {
  let s = store().await;
  let alice = user(&s, "alice@example.com").await;
  let physics = domain(&s, &alice, "Physics").await;
  let biology = domain(&s, &alice, "Biology").await;
  let pt = node_type(&s, &alice, physics.id, "Axiom").await;
  let bt = node_type(&s, &alice, biology.id, "Species").await;
  let pet =
    edge_type(&s, &alice, physics.id, "Supports", SemanticType::Supports).await;
  let bet =
    edge_type(&s, &alice, biology.id, "Part Of", SemanticType::PartOf).await;

  let pa = node(&s, &alice, physics.id, pt.id, "Phys A").await;
  let pb = node(&s, &alice, physics.id, pt.id, "Phys B").await;
  let ba = node(&s, &alice, biology.id, bt.id, "Bio A").await;
  let bb = node(&s, &alice, biology.id, bt.id, "Bio B").await;

  for (src, dst, et) in [(pa.id, pb.id, pet.id), (ba.id, bb.id, bet.id)] {
    s.create_edge(
      NewEdge {
        source_id:   src,
        target_id:   dst,
        type_id:     et,
        description: None,
        metadata:    Document::new(),
      },
      alice.id,
    )
    .await
    .unwrap();
  }

  let physics_edges = s.list_edges(None, Some(physics.id)).await.unwrap();
  assert_eq!(physics_edges.len(), 1);
  assert_eq!(physics_edges[0].source_id, pa.id);
}

#[tokio::test]
async fn deleting_a_node_cascades_its_edges_and_ratings() {
  let s = store().await;
  let alice = user(&s, "alice@example.com").await;
  let d = domain(&s, &alice, "Physics").await;
  let nt = node_type(&s, &alice, d.id, "Axiom").await;
  let et = edge_type(&s, &alice, d.id, "Supports", SemanticType::Supports).await;
  let a = node(&s, &alice, d.id, nt.id, "Node A").await;
  let b = node(&s, &alice, d.id, nt.id, "Node B").await;

  s.create_edge(
    NewEdge {
      source_id:   a.id,
      target_id:   b.id,
      type_id:     et.id,
      description: None,
      metadata:    Document::new(),
    },
    alice.id,
  )
  .await
  .unwrap();
  s.create_rating(NewRating {
    node_id:     a.id,
    metric_type: MetricType::Connectivity,
    score:       0.5,
    details:     Document::new(),
  })
  .await
  .unwrap();

  s.delete_node(a.id, alice.id).await.unwrap();

  assert!(s.list_edges(Some(b.id), None).await.unwrap().is_empty());
  assert!(s.list_ratings(a.id).await.unwrap().is_empty());
}

// ─── Ratings ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn rating_requires_an_existing_node() {
  let s = store().await;
  let err = s
    .create_rating(NewRating {
      node_id:     Uuid::new_v4(),
      metric_type: MetricType::Overall,
      score:       1.0,
      details:     Document::new(),
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NodeNotFound(_)));
}

#[tokio::test]
async fn historical_scores_for_one_metric_coexist() {
  let s = store().await;
  let alice = user(&s, "alice@example.com").await;
  let d = domain(&s, &alice, "Physics").await;
  let nt = node_type(&s, &alice, d.id, "Axiom").await;
  let n = node(&s, &alice, d.id, nt.id, "First Law").await;

  for score in [0.4, 0.6, 0.8] {
    s.create_rating(NewRating {
      node_id:     n.id,
      metric_type: MetricType::Coherence,
      score,
      details:     Document::new(),
    })
    .await
    .unwrap();
  }
  s.create_rating(NewRating {
    node_id:     n.id,
    metric_type: MetricType::Overall,
    score:       0.7,
    details:     Document::new(),
  })
  .await
  .unwrap();

  let all = s.list_ratings(n.id).await.unwrap();
  assert_eq!(all.len(), 4);

  let coherence = s
    .list_ratings_by_metric(n.id, MetricType::Coherence)
    .await
    .unwrap();
  assert_eq!(coherence.len(), 3);
  // Newest first.
  assert_eq!(coherence[0].score, 0.8);
}
