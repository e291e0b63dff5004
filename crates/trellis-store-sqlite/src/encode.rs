//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings (which makes string ordering
//! chronological). Documents and string lists are stored as compact JSON.
//! UUIDs are stored as hyphenated lowercase strings. Enum fields use their
//! serde snake_case tags.

use chrono::{DateTime, Utc};
use trellis_core::{
  Error, Result,
  document::Document,
  domain::{Domain, DomainRecord},
  edge::Edge,
  edge_type::{EdgeType, SemanticType},
  node::{Node, NodeStatus},
  node_type::NodeType,
  rating::{MetricType, Rating},
  user::{OAuthAccount, User, UserSummary},
};
use uuid::Uuid;

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> {
  Uuid::parse_str(s).map_err(|e| Error::Storage(format!("bad uuid {s:?}: {e}")))
}

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Storage(format!("bad timestamp {s:?}: {e}")))
}

pub fn decode_dt_opt(s: Option<&str>) -> Result<Option<DateTime<Utc>>> {
  s.map(decode_dt).transpose()
}

// ─── Enums ───────────────────────────────────────────────────────────────────

pub fn encode_node_status(s: NodeStatus) -> &'static str {
  match s {
    NodeStatus::Draft => "draft",
    NodeStatus::Published => "published",
    NodeStatus::Archived => "archived",
  }
}

pub fn decode_node_status(s: &str) -> Result<NodeStatus> {
  match s {
    "draft" => Ok(NodeStatus::Draft),
    "published" => Ok(NodeStatus::Published),
    "archived" => Ok(NodeStatus::Archived),
    other => Err(Error::Storage(format!("unknown node status: {other:?}"))),
  }
}

pub fn encode_semantic_type(s: SemanticType) -> &'static str {
  match s {
    SemanticType::Supports => "supports",
    SemanticType::Contradicts => "contradicts",
    SemanticType::DerivesFrom => "derives_from",
    SemanticType::PartOf => "part_of",
    SemanticType::Requires => "requires",
    SemanticType::Custom => "custom",
  }
}

pub fn decode_semantic_type(s: &str) -> Result<SemanticType> {
  match s {
    "supports" => Ok(SemanticType::Supports),
    "contradicts" => Ok(SemanticType::Contradicts),
    "derives_from" => Ok(SemanticType::DerivesFrom),
    "part_of" => Ok(SemanticType::PartOf),
    "requires" => Ok(SemanticType::Requires),
    "custom" => Ok(SemanticType::Custom),
    other => Err(Error::Storage(format!("unknown semantic type: {other:?}"))),
  }
}

pub fn encode_metric_type(m: MetricType) -> &'static str {
  match m {
    MetricType::Consistency => "consistency",
    MetricType::Coherence => "coherence",
    MetricType::Connectivity => "connectivity",
    MetricType::Overall => "overall",
  }
}

pub fn decode_metric_type(s: &str) -> Result<MetricType> {
  match s {
    "consistency" => Ok(MetricType::Consistency),
    "coherence" => Ok(MetricType::Coherence),
    "connectivity" => Ok(MetricType::Connectivity),
    "overall" => Ok(MetricType::Overall),
    other => Err(Error::Storage(format!("unknown metric type: {other:?}"))),
  }
}

// ─── Documents and string lists ──────────────────────────────────────────────

pub fn encode_document(doc: &Document) -> Result<String> {
  Ok(serde_json::to_string(doc)?)
}

pub fn decode_document(s: &str) -> Result<Document> {
  Ok(serde_json::from_str(s)?)
}

/// JSON array of strings; used for node tags and user roles.
pub fn encode_string_list(items: &[String]) -> Result<String> {
  Ok(serde_json::to_string(items)?)
}

pub fn decode_string_list(s: &str) -> Result<Vec<String>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub id:                String,
  pub email:             String,
  pub username:          String,
  pub display_name:      Option<String>,
  pub avatar_url:        Option<String>,
  pub roles:             String,
  pub is_active:         bool,
  pub is_email_verified: bool,
  pub last_login_at:     Option<String>,
  pub created_at:        String,
  pub updated_at:        String,
}

impl RawUser {
  pub const COLUMNS: &'static str = "id, email, username, display_name, \
     avatar_url, roles, is_active, is_email_verified, last_login_at, \
     created_at, updated_at";

  pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                row.get(0)?,
      email:             row.get(1)?,
      username:          row.get(2)?,
      display_name:      row.get(3)?,
      avatar_url:        row.get(4)?,
      roles:             row.get(5)?,
      is_active:         row.get(6)?,
      is_email_verified: row.get(7)?,
      last_login_at:     row.get(8)?,
      created_at:        row.get(9)?,
      updated_at:        row.get(10)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      id:                decode_uuid(&self.id)?,
      email:             self.email,
      username:          self.username,
      display_name:      self.display_name,
      avatar_url:        self.avatar_url,
      roles:             decode_string_list(&self.roles)?,
      is_active:         self.is_active,
      is_email_verified: self.is_email_verified,
      last_login_at:     decode_dt_opt(self.last_login_at.as_deref())?,
      created_at:        decode_dt(&self.created_at)?,
      updated_at:        decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from an `oauth_accounts` row.
pub struct RawOAuthAccount {
  pub id:               String,
  pub user_id:          String,
  pub provider:         String,
  pub provider_user_id: String,
  pub provider_email:   Option<String>,
  pub display_name:     Option<String>,
  pub avatar_url:       Option<String>,
  pub access_token:     Option<String>,
  pub refresh_token:    Option<String>,
  pub token_expires_at: Option<String>,
  pub last_used_at:     String,
  pub created_at:       String,
  pub updated_at:       String,
}

impl RawOAuthAccount {
  pub const COLUMNS: &'static str = "id, user_id, provider, \
     provider_user_id, provider_email, display_name, avatar_url, \
     access_token, refresh_token, token_expires_at, last_used_at, \
     created_at, updated_at";

  pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
    Ok(Self {
      id:               row.get(0)?,
      user_id:          row.get(1)?,
      provider:         row.get(2)?,
      provider_user_id: row.get(3)?,
      provider_email:   row.get(4)?,
      display_name:     row.get(5)?,
      avatar_url:       row.get(6)?,
      access_token:     row.get(7)?,
      refresh_token:    row.get(8)?,
      token_expires_at: row.get(9)?,
      last_used_at:     row.get(10)?,
      created_at:       row.get(11)?,
      updated_at:       row.get(12)?,
    })
  }

  pub fn into_account(self) -> Result<OAuthAccount> {
    Ok(OAuthAccount {
      id:               decode_uuid(&self.id)?,
      user_id:          decode_uuid(&self.user_id)?,
      provider:         self.provider,
      provider_user_id: self.provider_user_id,
      provider_email:   self.provider_email,
      display_name:     self.display_name,
      avatar_url:       self.avatar_url,
      access_token:     self.access_token,
      refresh_token:    self.refresh_token,
      token_expires_at: decode_dt_opt(self.token_expires_at.as_deref())?,
      last_used_at:     decode_dt(&self.last_used_at)?,
      created_at:       decode_dt(&self.created_at)?,
      updated_at:       decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from a `domains` row.
pub struct RawDomain {
  pub id:           String,
  pub name:         String,
  pub slug:         String,
  pub description:  Option<String>,
  pub translations: String,
  pub is_public:    bool,
  pub is_active:    bool,
  pub settings:     String,
  pub creator_id:   String,
  pub created_at:   String,
  pub updated_at:   String,
}

impl RawDomain {
  pub const COLUMNS: &'static str = "id, name, slug, description, \
     translations, is_public, is_active, settings, creator_id, created_at, \
     updated_at";

  pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
    Ok(Self {
      id:           row.get(0)?,
      name:         row.get(1)?,
      slug:         row.get(2)?,
      description:  row.get(3)?,
      translations: row.get(4)?,
      is_public:    row.get(5)?,
      is_active:    row.get(6)?,
      settings:     row.get(7)?,
      creator_id:   row.get(8)?,
      created_at:   row.get(9)?,
      updated_at:   row.get(10)?,
    })
  }

  pub fn into_domain(self) -> Result<Domain> {
    Ok(Domain {
      id:           decode_uuid(&self.id)?,
      name:         self.name,
      slug:         self.slug,
      description:  self.description,
      translations: decode_document(&self.translations)?,
      is_public:    self.is_public,
      is_active:    self.is_active,
      settings:     decode_document(&self.settings)?,
      creator_id:   decode_uuid(&self.creator_id)?,
      created_at:   decode_dt(&self.created_at)?,
      updated_at:   decode_dt(&self.updated_at)?,
    })
  }
}

/// A `domains` row joined with its creator's summary columns.
pub struct RawDomainRecord {
  pub domain:               RawDomain,
  pub creator_username:     String,
  pub creator_display_name: Option<String>,
  pub creator_avatar_url:   Option<String>,
}

impl RawDomainRecord {
  /// `RawDomain::COLUMNS` prefixed with `d.`, plus the joined creator
  /// columns; pairs with
  /// `FROM domains d JOIN users u ON u.id = d.creator_id`.
  pub const COLUMNS: &'static str = "d.id, d.name, d.slug, d.description, \
     d.translations, d.is_public, d.is_active, d.settings, d.creator_id, \
     d.created_at, d.updated_at, u.username, u.display_name, u.avatar_url";

  pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
    Ok(Self {
      domain:               RawDomain::from_row(row)?,
      creator_username:     row.get(11)?,
      creator_display_name: row.get(12)?,
      creator_avatar_url:   row.get(13)?,
    })
  }

  pub fn into_record(self) -> Result<DomainRecord> {
    let domain = self.domain.into_domain()?;
    let creator = UserSummary {
      id:           domain.creator_id,
      username:     self.creator_username,
      display_name: self.creator_display_name,
      avatar_url:   self.creator_avatar_url,
    };
    Ok(DomainRecord { domain, creator })
  }
}

/// Raw strings read directly from a `node_types` row.
pub struct RawNodeType {
  pub id:          String,
  pub name:        String,
  pub slug:        String,
  pub description: Option<String>,
  pub icon:        Option<String>,
  pub color:       String,
  pub schema:      String,
  pub sort_order:  i64,
  pub domain_id:   String,
  pub created_at:  String,
  pub updated_at:  String,
}

impl RawNodeType {
  pub const COLUMNS: &'static str = "id, name, slug, description, icon, \
     color, schema, sort_order, domain_id, created_at, updated_at";

  pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      name:        row.get(1)?,
      slug:        row.get(2)?,
      description: row.get(3)?,
      icon:        row.get(4)?,
      color:       row.get(5)?,
      schema:      row.get(6)?,
      sort_order:  row.get(7)?,
      domain_id:   row.get(8)?,
      created_at:  row.get(9)?,
      updated_at:  row.get(10)?,
    })
  }

  pub fn into_node_type(self) -> Result<NodeType> {
    Ok(NodeType {
      id:          decode_uuid(&self.id)?,
      name:        self.name,
      slug:        self.slug,
      description: self.description,
      icon:        self.icon,
      color:       self.color,
      schema:      decode_document(&self.schema)?,
      sort_order:  self.sort_order,
      domain_id:   decode_uuid(&self.domain_id)?,
      created_at:  decode_dt(&self.created_at)?,
      updated_at:  decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from an `edge_types` row.
pub struct RawEdgeType {
  pub id:            String,
  pub name:          String,
  pub slug:          String,
  pub description:   Option<String>,
  pub icon:          Option<String>,
  pub color:         String,
  pub semantic_type: String,
  pub weight:        f64,
  pub is_directed:   bool,
  pub domain_id:     String,
  pub created_at:    String,
  pub updated_at:    String,
}

impl RawEdgeType {
  pub const COLUMNS: &'static str = "id, name, slug, description, icon, \
     color, semantic_type, weight, is_directed, domain_id, created_at, \
     updated_at";

  pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
    Ok(Self {
      id:            row.get(0)?,
      name:          row.get(1)?,
      slug:          row.get(2)?,
      description:   row.get(3)?,
      icon:          row.get(4)?,
      color:         row.get(5)?,
      semantic_type: row.get(6)?,
      weight:        row.get(7)?,
      is_directed:   row.get(8)?,
      domain_id:     row.get(9)?,
      created_at:    row.get(10)?,
      updated_at:    row.get(11)?,
    })
  }

  pub fn into_edge_type(self) -> Result<EdgeType> {
    Ok(EdgeType {
      id:            decode_uuid(&self.id)?,
      name:          self.name,
      slug:          self.slug,
      description:   self.description,
      icon:          self.icon,
      color:         self.color,
      semantic_type: decode_semantic_type(&self.semantic_type)?,
      weight:        self.weight,
      is_directed:   self.is_directed,
      domain_id:     decode_uuid(&self.domain_id)?,
      created_at:    decode_dt(&self.created_at)?,
      updated_at:    decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from a `nodes` row.
pub struct RawNode {
  pub id:           String,
  pub title:        String,
  pub slug:         String,
  pub excerpt:      Option<String>,
  pub content:      String,
  pub tags:         String,
  pub status:       String,
  pub domain_id:    String,
  pub type_id:      String,
  pub creator_id:   String,
  pub published_at: Option<String>,
  pub created_at:   String,
  pub updated_at:   String,
}

impl RawNode {
  pub const COLUMNS: &'static str = "id, title, slug, excerpt, content, \
     tags, status, domain_id, type_id, creator_id, published_at, created_at, \
     updated_at";

  pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
    Ok(Self {
      id:           row.get(0)?,
      title:        row.get(1)?,
      slug:         row.get(2)?,
      excerpt:      row.get(3)?,
      content:      row.get(4)?,
      tags:         row.get(5)?,
      status:       row.get(6)?,
      domain_id:    row.get(7)?,
      type_id:      row.get(8)?,
      creator_id:   row.get(9)?,
      published_at: row.get(10)?,
      created_at:   row.get(11)?,
      updated_at:   row.get(12)?,
    })
  }

  pub fn into_node(self) -> Result<Node> {
    Ok(Node {
      id:           decode_uuid(&self.id)?,
      title:        self.title,
      slug:         self.slug,
      excerpt:      self.excerpt,
      content:      decode_document(&self.content)?,
      tags:         decode_string_list(&self.tags)?,
      status:       decode_node_status(&self.status)?,
      domain_id:    decode_uuid(&self.domain_id)?,
      type_id:      decode_uuid(&self.type_id)?,
      creator_id:   decode_uuid(&self.creator_id)?,
      published_at: decode_dt_opt(self.published_at.as_deref())?,
      created_at:   decode_dt(&self.created_at)?,
      updated_at:   decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from an `edges` row.
pub struct RawEdge {
  pub id:          String,
  pub source_id:   String,
  pub target_id:   String,
  pub type_id:     String,
  pub description: Option<String>,
  pub metadata:    String,
  pub created_at:  String,
  pub updated_at:  String,
}

impl RawEdge {
  pub const COLUMNS: &'static str =
    "id, source_id, target_id, type_id, description, metadata, created_at, \
     updated_at";

  /// `COLUMNS` prefixed with `e.` for queries that join `nodes`.
  pub const COLUMNS_PREFIXED: &'static str =
    "e.id, e.source_id, e.target_id, e.type_id, e.description, e.metadata, \
     e.created_at, e.updated_at";

  pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      source_id:   row.get(1)?,
      target_id:   row.get(2)?,
      type_id:     row.get(3)?,
      description: row.get(4)?,
      metadata:    row.get(5)?,
      created_at:  row.get(6)?,
      updated_at:  row.get(7)?,
    })
  }

  pub fn into_edge(self) -> Result<Edge> {
    Ok(Edge {
      id:          decode_uuid(&self.id)?,
      source_id:   decode_uuid(&self.source_id)?,
      target_id:   decode_uuid(&self.target_id)?,
      type_id:     decode_uuid(&self.type_id)?,
      description: self.description,
      metadata:    decode_document(&self.metadata)?,
      created_at:  decode_dt(&self.created_at)?,
      updated_at:  decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from a `ratings` row.
pub struct RawRating {
  pub id:          String,
  pub node_id:     String,
  pub metric_type: String,
  pub score:       f64,
  pub details:     String,
  pub created_at:  String,
  pub updated_at:  String,
}

impl RawRating {
  pub const COLUMNS: &'static str =
    "id, node_id, metric_type, score, details, created_at, updated_at";

  pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      node_id:     row.get(1)?,
      metric_type: row.get(2)?,
      score:       row.get(3)?,
      details:     row.get(4)?,
      created_at:  row.get(5)?,
      updated_at:  row.get(6)?,
    })
  }

  pub fn into_rating(self) -> Result<Rating> {
    Ok(Rating {
      id:          decode_uuid(&self.id)?,
      node_id:     decode_uuid(&self.node_id)?,
      metric_type: decode_metric_type(&self.metric_type)?,
      score:       self.score,
      details:     decode_document(&self.details)?,
      created_at:  decode_dt(&self.created_at)?,
      updated_at:  decode_dt(&self.updated_at)?,
    })
  }
}
