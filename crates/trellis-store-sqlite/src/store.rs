//! [`SqliteStore`] — the SQLite implementation of [`GraphStore`].
//!
//! Every trait method is a single unit of work: a handful of sequential
//! statements on one connection, no cross-call transactions. Unique
//! constraints (slugs, the edge triple) are not pre-checked; the schema
//! decides and the loser of a race gets a conflict.

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use trellis_core::{
  Error, Result,
  domain::{Domain, DomainPatch, DomainRecord, NewDomain},
  edge::{Edge, EdgePatch, NewEdge, NodeEdges},
  edge_type::{EdgeType, EdgeTypePatch, NewEdgeType},
  node::{NewNode, Node, NodePatch, NodeStatus},
  node_type::{NewNodeType, NodeType, NodeTypePatch},
  rating::{MetricType, NewRating, Rating},
  slug::derive_slug,
  store::{GraphStore, NodeQuery},
  user::{OAuthProfile, User},
};
use uuid::Uuid;

use crate::{
  encode::{
    RawDomain, RawDomainRecord, RawEdge, RawEdgeType, RawNode, RawNodeType,
    RawOAuthAccount, RawRating, RawUser, encode_document, encode_dt,
    encode_metric_type, encode_node_status, encode_semantic_type,
    encode_string_list, encode_uuid,
  },
  error::{db_err, storage},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Trellis graph store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path)
      .await
      .map_err(storage)?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory()
      .await
      .map_err(storage)?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await
      .map_err(storage)
  }

  // ── Single-row fetch helpers ──────────────────────────────────────────────

  async fn fetch_user(&self, id: Uuid) -> Result<User> {
    let id_str = encode_uuid(id);
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {} FROM users WHERE id = ?1", RawUser::COLUMNS),
              rusqlite::params![id_str],
              RawUser::from_row,
            )
            .optional()?,
        )
      })
      .await
      .map_err(storage)?;
    raw.ok_or(Error::UserNotFound(id))?.into_user()
  }

  async fn fetch_domain(&self, id: Uuid) -> Result<Domain> {
    let id_str = encode_uuid(id);
    let raw: Option<RawDomain> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {} FROM domains WHERE id = ?1",
                RawDomain::COLUMNS
              ),
              rusqlite::params![id_str],
              RawDomain::from_row,
            )
            .optional()?,
        )
      })
      .await
      .map_err(storage)?;
    raw.ok_or(Error::DomainNotFound(id))?.into_domain()
  }

  async fn fetch_node_type(&self, id: Uuid) -> Result<NodeType> {
    let id_str = encode_uuid(id);
    let raw: Option<RawNodeType> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {} FROM node_types WHERE id = ?1",
                RawNodeType::COLUMNS
              ),
              rusqlite::params![id_str],
              RawNodeType::from_row,
            )
            .optional()?,
        )
      })
      .await
      .map_err(storage)?;
    raw.ok_or(Error::NodeTypeNotFound(id))?.into_node_type()
  }

  async fn fetch_edge_type(&self, id: Uuid) -> Result<EdgeType> {
    let id_str = encode_uuid(id);
    let raw: Option<RawEdgeType> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {} FROM edge_types WHERE id = ?1",
                RawEdgeType::COLUMNS
              ),
              rusqlite::params![id_str],
              RawEdgeType::from_row,
            )
            .optional()?,
        )
      })
      .await
      .map_err(storage)?;
    raw.ok_or(Error::EdgeTypeNotFound(id))?.into_edge_type()
  }

  async fn fetch_node(&self, id: Uuid) -> Result<Node> {
    let id_str = encode_uuid(id);
    let raw: Option<RawNode> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {} FROM nodes WHERE id = ?1", RawNode::COLUMNS),
              rusqlite::params![id_str],
              RawNode::from_row,
            )
            .optional()?,
        )
      })
      .await
      .map_err(storage)?;
    raw.ok_or(Error::NodeNotFound(id))?.into_node()
  }

  async fn fetch_edge(&self, id: Uuid) -> Result<Edge> {
    let id_str = encode_uuid(id);
    let raw: Option<RawEdge> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {} FROM edges WHERE id = ?1", RawEdge::COLUMNS),
              rusqlite::params![id_str],
              RawEdge::from_row,
            )
            .optional()?,
        )
      })
      .await
      .map_err(storage)?;
    raw.ok_or(Error::EdgeNotFound(id))?.into_edge()
  }

  /// Load a domain and check that `caller_id` created it.
  async fn require_domain_owner(
    &self,
    domain_id: Uuid,
    caller_id: Uuid,
    what: &'static str,
  ) -> Result<Domain> {
    let domain = self.fetch_domain(domain_id).await?;
    if domain.creator_id != caller_id {
      return Err(Error::NotOwner(what));
    }
    Ok(domain)
  }

  /// Load an edge's source node and check that `caller_id` created it.
  /// Edge ownership follows the source node.
  async fn require_edge_owner(
    &self,
    edge: &Edge,
    caller_id: Uuid,
  ) -> Result<()> {
    let source = self.fetch_node(edge.source_id).await?;
    if source.creator_id != caller_id {
      return Err(Error::NotOwner("edges"));
    }
    Ok(())
  }

  // ── Row write helpers ─────────────────────────────────────────────────────

  async fn insert_user(&self, user: &User) -> Result<()> {
    let id_str         = encode_uuid(user.id);
    let email          = user.email.clone();
    let username       = user.username.clone();
    let display_name   = user.display_name.clone();
    let avatar_url     = user.avatar_url.clone();
    let roles_str      = encode_string_list(&user.roles)?;
    let is_active      = user.is_active;
    let is_verified    = user.is_email_verified;
    let last_login_str = user.last_login_at.map(encode_dt);
    let created_str    = encode_dt(user.created_at);
    let updated_str    = encode_dt(user.updated_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (
             id, email, username, display_name, avatar_url, roles,
             is_active, is_email_verified, last_login_at, created_at,
             updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
          rusqlite::params![
            id_str,
            email,
            username,
            display_name,
            avatar_url,
            roles_str,
            is_active,
            is_verified,
            last_login_str,
            created_str,
            updated_str,
          ],
        )?;
        Ok(())
      })
      .await
      .map_err(|e| db_err("user", e))
  }

  async fn insert_domain(&self, domain: &Domain) -> Result<()> {
    let id_str           = encode_uuid(domain.id);
    let name             = domain.name.clone();
    let slug             = domain.slug.clone();
    let description      = domain.description.clone();
    let translations_str = encode_document(&domain.translations)?;
    let is_public        = domain.is_public;
    let is_active        = domain.is_active;
    let settings_str     = encode_document(&domain.settings)?;
    let creator_str      = encode_uuid(domain.creator_id);
    let created_str      = encode_dt(domain.created_at);
    let updated_str      = encode_dt(domain.updated_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO domains (
             id, name, slug, description, translations, is_public,
             is_active, settings, creator_id, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
          rusqlite::params![
            id_str,
            name,
            slug,
            description,
            translations_str,
            is_public,
            is_active,
            settings_str,
            creator_str,
            created_str,
            updated_str,
          ],
        )?;
        Ok(())
      })
      .await
      .map_err(|e| db_err("domain", e))
  }

  async fn write_domain(&self, domain: &Domain) -> Result<()> {
    let id_str           = encode_uuid(domain.id);
    let name             = domain.name.clone();
    let slug             = domain.slug.clone();
    let description      = domain.description.clone();
    let translations_str = encode_document(&domain.translations)?;
    let is_public        = domain.is_public;
    let is_active        = domain.is_active;
    let settings_str     = encode_document(&domain.settings)?;
    let updated_str      = encode_dt(domain.updated_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE domains SET
             name = ?2, slug = ?3, description = ?4, translations = ?5,
             is_public = ?6, is_active = ?7, settings = ?8, updated_at = ?9
           WHERE id = ?1",
          rusqlite::params![
            id_str,
            name,
            slug,
            description,
            translations_str,
            is_public,
            is_active,
            settings_str,
            updated_str,
          ],
        )?;
        Ok(())
      })
      .await
      .map_err(|e| db_err("domain", e))
  }

  async fn insert_node_type(&self, nt: &NodeType) -> Result<()> {
    let id_str      = encode_uuid(nt.id);
    let name        = nt.name.clone();
    let slug        = nt.slug.clone();
    let description = nt.description.clone();
    let icon        = nt.icon.clone();
    let color       = nt.color.clone();
    let schema_str  = encode_document(&nt.schema)?;
    let sort_order  = nt.sort_order;
    let domain_str  = encode_uuid(nt.domain_id);
    let created_str = encode_dt(nt.created_at);
    let updated_str = encode_dt(nt.updated_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO node_types (
             id, name, slug, description, icon, color, schema, sort_order,
             domain_id, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
          rusqlite::params![
            id_str,
            name,
            slug,
            description,
            icon,
            color,
            schema_str,
            sort_order,
            domain_str,
            created_str,
            updated_str,
          ],
        )?;
        Ok(())
      })
      .await
      .map_err(|e| db_err("node type", e))
  }

  async fn write_node_type(&self, nt: &NodeType) -> Result<()> {
    let id_str      = encode_uuid(nt.id);
    let name        = nt.name.clone();
    let slug        = nt.slug.clone();
    let description = nt.description.clone();
    let icon        = nt.icon.clone();
    let color       = nt.color.clone();
    let schema_str  = encode_document(&nt.schema)?;
    let sort_order  = nt.sort_order;
    let updated_str = encode_dt(nt.updated_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE node_types SET
             name = ?2, slug = ?3, description = ?4, icon = ?5, color = ?6,
             schema = ?7, sort_order = ?8, updated_at = ?9
           WHERE id = ?1",
          rusqlite::params![
            id_str,
            name,
            slug,
            description,
            icon,
            color,
            schema_str,
            sort_order,
            updated_str,
          ],
        )?;
        Ok(())
      })
      .await
      .map_err(|e| db_err("node type", e))
  }

  async fn insert_edge_type(&self, et: &EdgeType) -> Result<()> {
    let id_str       = encode_uuid(et.id);
    let name         = et.name.clone();
    let slug         = et.slug.clone();
    let description  = et.description.clone();
    let icon         = et.icon.clone();
    let color        = et.color.clone();
    let semantic_str = encode_semantic_type(et.semantic_type).to_owned();
    let weight       = et.weight;
    let is_directed  = et.is_directed;
    let domain_str   = encode_uuid(et.domain_id);
    let created_str  = encode_dt(et.created_at);
    let updated_str  = encode_dt(et.updated_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO edge_types (
             id, name, slug, description, icon, color, semantic_type,
             weight, is_directed, domain_id, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
          rusqlite::params![
            id_str,
            name,
            slug,
            description,
            icon,
            color,
            semantic_str,
            weight,
            is_directed,
            domain_str,
            created_str,
            updated_str,
          ],
        )?;
        Ok(())
      })
      .await
      .map_err(|e| db_err("edge type", e))
  }

  async fn write_edge_type(&self, et: &EdgeType) -> Result<()> {
    let id_str       = encode_uuid(et.id);
    let name         = et.name.clone();
    let slug         = et.slug.clone();
    let description  = et.description.clone();
    let icon         = et.icon.clone();
    let color        = et.color.clone();
    let semantic_str = encode_semantic_type(et.semantic_type).to_owned();
    let weight       = et.weight;
    let is_directed  = et.is_directed;
    let updated_str  = encode_dt(et.updated_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE edge_types SET
             name = ?2, slug = ?3, description = ?4, icon = ?5, color = ?6,
             semantic_type = ?7, weight = ?8, is_directed = ?9,
             updated_at = ?10
           WHERE id = ?1",
          rusqlite::params![
            id_str,
            name,
            slug,
            description,
            icon,
            color,
            semantic_str,
            weight,
            is_directed,
            updated_str,
          ],
        )?;
        Ok(())
      })
      .await
      .map_err(|e| db_err("edge type", e))
  }

  async fn insert_node(&self, node: &Node) -> Result<()> {
    let id_str        = encode_uuid(node.id);
    let title         = node.title.clone();
    let slug          = node.slug.clone();
    let excerpt       = node.excerpt.clone();
    let content_str   = encode_document(&node.content)?;
    let tags_str      = encode_string_list(&node.tags)?;
    let status_str    = encode_node_status(node.status).to_owned();
    let domain_str    = encode_uuid(node.domain_id);
    let type_str      = encode_uuid(node.type_id);
    let creator_str   = encode_uuid(node.creator_id);
    let published_str = node.published_at.map(encode_dt);
    let created_str   = encode_dt(node.created_at);
    let updated_str   = encode_dt(node.updated_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO nodes (
             id, title, slug, excerpt, content, tags, status, domain_id,
             type_id, creator_id, published_at, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
          rusqlite::params![
            id_str,
            title,
            slug,
            excerpt,
            content_str,
            tags_str,
            status_str,
            domain_str,
            type_str,
            creator_str,
            published_str,
            created_str,
            updated_str,
          ],
        )?;
        Ok(())
      })
      .await
      .map_err(|e| db_err("node", e))
  }

  async fn write_node(&self, node: &Node) -> Result<()> {
    let id_str        = encode_uuid(node.id);
    let title         = node.title.clone();
    let slug          = node.slug.clone();
    let excerpt       = node.excerpt.clone();
    let content_str   = encode_document(&node.content)?;
    let tags_str      = encode_string_list(&node.tags)?;
    let status_str    = encode_node_status(node.status).to_owned();
    let domain_str    = encode_uuid(node.domain_id);
    let type_str      = encode_uuid(node.type_id);
    let published_str = node.published_at.map(encode_dt);
    let updated_str   = encode_dt(node.updated_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE nodes SET
             title = ?2, slug = ?3, excerpt = ?4, content = ?5, tags = ?6,
             status = ?7, domain_id = ?8, type_id = ?9, published_at = ?10,
             updated_at = ?11
           WHERE id = ?1",
          rusqlite::params![
            id_str,
            title,
            slug,
            excerpt,
            content_str,
            tags_str,
            status_str,
            domain_str,
            type_str,
            published_str,
            updated_str,
          ],
        )?;
        Ok(())
      })
      .await
      .map_err(|e| db_err("node", e))
  }

  async fn insert_edge(&self, edge: &Edge) -> Result<()> {
    let id_str       = encode_uuid(edge.id);
    let source_str   = encode_uuid(edge.source_id);
    let target_str   = encode_uuid(edge.target_id);
    let type_str     = encode_uuid(edge.type_id);
    let description  = edge.description.clone();
    let metadata_str = encode_document(&edge.metadata)?;
    let created_str  = encode_dt(edge.created_at);
    let updated_str  = encode_dt(edge.updated_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO edges (
             id, source_id, target_id, type_id, description, metadata,
             created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            id_str,
            source_str,
            target_str,
            type_str,
            description,
            metadata_str,
            created_str,
            updated_str,
          ],
        )?;
        Ok(())
      })
      .await
      .map_err(|e| db_err("edge", e))
  }

  /// One-directional adjacency list, newest first.
  async fn edges_where(
    &self,
    column: &'static str,
    node_id: Uuid,
  ) -> Result<Vec<Edge>> {
    let id_str = encode_uuid(node_id);
    let raws: Vec<RawEdge> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM edges WHERE {column} = ?1 ORDER BY created_at DESC",
          RawEdge::COLUMNS
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], RawEdge::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(storage)?;
    raws.into_iter().map(RawEdge::into_edge).collect()
  }
}

// ─── GraphStore impl ─────────────────────────────────────────────────────────

impl GraphStore for SqliteStore {
  // ── Identity ──────────────────────────────────────────────────────────────

  async fn upsert_oauth_user(&self, profile: OAuthProfile) -> Result<User> {
    let now = Utc::now();
    let now_str = encode_dt(now);

    // Existing account for this external identity?
    let provider = profile.provider.clone();
    let provider_uid = profile.provider_user_id.clone();
    let linked: Option<RawOAuthAccount> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {} FROM oauth_accounts
                 WHERE provider = ?1 AND provider_user_id = ?2",
                RawOAuthAccount::COLUMNS
              ),
              rusqlite::params![provider, provider_uid],
              RawOAuthAccount::from_row,
            )
            .optional()?,
        )
      })
      .await
      .map_err(storage)?;

    if let Some(raw) = linked {
      let account = raw.into_account()?;

      // Refresh the account's profile snapshot and stamp both sides.
      let account_id_str = encode_uuid(account.id);
      let user_id_str    = encode_uuid(account.user_id);
      let provider_email = profile.email.clone();
      let display_name   = profile.display_name.clone();
      let avatar_url     = profile.avatar_url.clone();
      let access_token   = profile.access_token.clone();
      let refresh_token  = profile.refresh_token.clone();
      let expires_str    = profile.token_expires_at.map(encode_dt);
      let stamp          = now_str.clone();

      self
        .conn
        .call(move |conn| {
          conn.execute(
            "UPDATE oauth_accounts SET
               provider_email = ?2, display_name = ?3, avatar_url = ?4,
               access_token = ?5, refresh_token = ?6, token_expires_at = ?7,
               last_used_at = ?8, updated_at = ?8
             WHERE id = ?1",
            rusqlite::params![
              account_id_str,
              provider_email,
              display_name,
              avatar_url,
              access_token,
              refresh_token,
              expires_str,
              stamp,
            ],
          )?;
          conn.execute(
            "UPDATE users SET last_login_at = ?2, updated_at = ?2 WHERE id = ?1",
            rusqlite::params![user_id_str, stamp],
          )?;
          Ok(())
        })
        .await
        .map_err(storage)?;

      return self.fetch_user(account.user_id).await;
    }

    // No account yet: link to an existing user by email, or create one.
    let email = profile.email.clone();
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {} FROM users WHERE email = ?1", RawUser::COLUMNS),
              rusqlite::params![email],
              RawUser::from_row,
            )
            .optional()?,
        )
      })
      .await
      .map_err(storage)?;

    let user = match raw {
      Some(raw) => raw.into_user()?,
      None => {
        let user = User {
          id:                Uuid::new_v4(),
          email:             profile.email.clone(),
          username:          profile.derived_username(),
          display_name:      profile.display_name.clone(),
          avatar_url:        profile.avatar_url.clone(),
          roles:             vec!["user".to_owned()],
          is_active:         true,
          // The provider has already verified the address.
          is_email_verified: true,
          last_login_at:     Some(now),
          created_at:        now,
          updated_at:        now,
        };
        self.insert_user(&user).await?;
        user
      }
    };

    let account_id     = encode_uuid(Uuid::new_v4());
    let user_id_str    = encode_uuid(user.id);
    let provider       = profile.provider;
    let provider_uid   = profile.provider_user_id;
    let provider_email = profile.email;
    let display_name   = profile.display_name;
    let avatar_url     = profile.avatar_url;
    let access_token   = profile.access_token;
    let refresh_token  = profile.refresh_token;
    let expires_str    = profile.token_expires_at.map(encode_dt);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO oauth_accounts (
             id, user_id, provider, provider_user_id, provider_email,
             display_name, avatar_url, access_token, refresh_token,
             token_expires_at, last_used_at, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11, ?11)",
          rusqlite::params![
            account_id,
            user_id_str,
            provider,
            provider_uid,
            provider_email,
            display_name,
            avatar_url,
            access_token,
            refresh_token,
            expires_str,
            now_str,
          ],
        )?;
        Ok(())
      })
      .await
      .map_err(|e| db_err("oauth account", e))?;

    Ok(user)
  }

  async fn get_user(&self, id: Uuid) -> Result<User> {
    self.fetch_user(id).await
  }

  // ── Domains ───────────────────────────────────────────────────────────────

  async fn create_domain(
    &self,
    input: NewDomain,
    creator_id: Uuid,
  ) -> Result<Domain> {
    if input.name.trim().is_empty() {
      return Err(Error::MissingField("name"));
    }
    let slug = match input.slug {
      Some(slug) => slug,
      None => derive_slug(&input.name),
    };
    if slug.is_empty() {
      return Err(Error::MissingField("slug"));
    }
    // Resolve the creator up front so a stale token reads as not-found
    // rather than a foreign-key failure.
    self.fetch_user(creator_id).await?;

    let now = Utc::now();
    let domain = Domain {
      id: Uuid::new_v4(),
      name: input.name,
      slug,
      description: input.description,
      translations: input.translations,
      is_public: input.is_public,
      is_active: true,
      settings: input.settings,
      creator_id,
      created_at: now,
      updated_at: now,
    };

    self.insert_domain(&domain).await?;
    Ok(domain)
  }

  async fn list_domains(
    &self,
    is_public: Option<bool>,
  ) -> Result<Vec<DomainRecord>> {
    let raws: Vec<RawDomainRecord> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM domains d JOIN users u ON u.id = d.creator_id
           WHERE (?1 IS NULL OR d.is_public = ?1)
           ORDER BY d.created_at DESC",
          RawDomainRecord::COLUMNS
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![is_public], RawDomainRecord::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(storage)?;
    raws.into_iter().map(RawDomainRecord::into_record).collect()
  }

  async fn get_domain(&self, id: Uuid) -> Result<DomainRecord> {
    let id_str = encode_uuid(id);
    let raw: Option<RawDomainRecord> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {} FROM domains d JOIN users u ON u.id = d.creator_id
                 WHERE d.id = ?1",
                RawDomainRecord::COLUMNS
              ),
              rusqlite::params![id_str],
              RawDomainRecord::from_row,
            )
            .optional()?,
        )
      })
      .await
      .map_err(storage)?;
    raw.ok_or(Error::DomainNotFound(id))?.into_record()
  }

  async fn get_domain_by_slug(&self, slug: &str) -> Result<DomainRecord> {
    let slug_owned = slug.to_owned();
    let raw: Option<RawDomainRecord> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {} FROM domains d JOIN users u ON u.id = d.creator_id
                 WHERE d.slug = ?1",
                RawDomainRecord::COLUMNS
              ),
              rusqlite::params![slug_owned],
              RawDomainRecord::from_row,
            )
            .optional()?,
        )
      })
      .await
      .map_err(storage)?;
    raw
      .ok_or_else(|| Error::DomainSlugNotFound(slug.to_owned()))?
      .into_record()
  }

  async fn update_domain(
    &self,
    id: Uuid,
    patch: DomainPatch,
    caller_id: Uuid,
  ) -> Result<Domain> {
    let mut domain = self.require_domain_owner(id, caller_id, "domains").await?;

    if let Some(name) = patch.name {
      domain.name = name;
    }
    if let Some(slug) = patch.slug {
      domain.slug = slug;
    }
    if let Some(description) = patch.description {
      domain.description = Some(description);
    }
    if let Some(translations) = patch.translations {
      domain.translations = translations;
    }
    if let Some(is_public) = patch.is_public {
      domain.is_public = is_public;
    }
    if let Some(is_active) = patch.is_active {
      domain.is_active = is_active;
    }
    if let Some(settings) = patch.settings {
      domain.settings = settings;
    }
    domain.updated_at = Utc::now();

    self.write_domain(&domain).await?;
    Ok(domain)
  }

  async fn delete_domain(&self, id: Uuid, caller_id: Uuid) -> Result<()> {
    self.require_domain_owner(id, caller_id, "domains").await?;

    let id_str = encode_uuid(id);
    self
      .conn
      .call(move |conn| {
        // Nodes go first: the cascade to node_types would otherwise trip
        // the RESTRICT from nodes.type_id while the domain's nodes still
        // reference them.
        conn.execute(
          "DELETE FROM nodes WHERE domain_id = ?1",
          rusqlite::params![id_str],
        )?;
        conn.execute(
          "DELETE FROM domains WHERE id = ?1",
          rusqlite::params![id_str],
        )?;
        Ok(())
      })
      .await
      .map_err(|e| db_err("domain", e))
  }

  // ── Node types ────────────────────────────────────────────────────────────

  async fn create_node_type(
    &self,
    input: NewNodeType,
    caller_id: Uuid,
  ) -> Result<NodeType> {
    if input.name.trim().is_empty() {
      return Err(Error::MissingField("name"));
    }
    let slug = match input.slug {
      Some(slug) => slug,
      None => derive_slug(&input.name),
    };
    if slug.is_empty() {
      return Err(Error::MissingField("slug"));
    }
    self
      .require_domain_owner(input.domain_id, caller_id, "node types")
      .await?;

    let now = Utc::now();
    let node_type = NodeType {
      id: Uuid::new_v4(),
      name: input.name,
      slug,
      description: input.description,
      icon: input.icon,
      color: input.color,
      schema: input.schema,
      sort_order: input.sort_order,
      domain_id: input.domain_id,
      created_at: now,
      updated_at: now,
    };

    self.insert_node_type(&node_type).await?;
    Ok(node_type)
  }

  async fn list_node_types(
    &self,
    domain_id: Option<Uuid>,
  ) -> Result<Vec<NodeType>> {
    let domain_str = domain_id.map(encode_uuid);
    let raws: Vec<RawNodeType> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM node_types
           WHERE (?1 IS NULL OR domain_id = ?1)
           ORDER BY sort_order ASC, name ASC",
          RawNodeType::COLUMNS
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![domain_str], RawNodeType::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(storage)?;
    raws.into_iter().map(RawNodeType::into_node_type).collect()
  }

  async fn get_node_type(&self, id: Uuid) -> Result<NodeType> {
    self.fetch_node_type(id).await
  }

  async fn update_node_type(
    &self,
    id: Uuid,
    patch: NodeTypePatch,
    caller_id: Uuid,
  ) -> Result<NodeType> {
    let mut node_type = self.fetch_node_type(id).await?;
    self
      .require_domain_owner(node_type.domain_id, caller_id, "node types")
      .await?;

    if let Some(name) = patch.name {
      node_type.name = name;
    }
    if let Some(slug) = patch.slug {
      node_type.slug = slug;
    }
    if let Some(description) = patch.description {
      node_type.description = Some(description);
    }
    if let Some(icon) = patch.icon {
      node_type.icon = Some(icon);
    }
    if let Some(color) = patch.color {
      node_type.color = color;
    }
    if let Some(schema) = patch.schema {
      node_type.schema = schema;
    }
    if let Some(sort_order) = patch.sort_order {
      node_type.sort_order = sort_order;
    }
    node_type.updated_at = Utc::now();

    self.write_node_type(&node_type).await?;
    Ok(node_type)
  }

  async fn delete_node_type(&self, id: Uuid, caller_id: Uuid) -> Result<()> {
    let node_type = self.fetch_node_type(id).await?;
    self
      .require_domain_owner(node_type.domain_id, caller_id, "node types")
      .await?;

    let id_str = encode_uuid(id);
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM node_types WHERE id = ?1",
          rusqlite::params![id_str],
        )?;
        Ok(())
      })
      .await
      // The RESTRICT from nodes.type_id lands here while nodes still use
      // the type.
      .map_err(|e| db_err("node type", e))
  }

  // ── Edge types ────────────────────────────────────────────────────────────

  async fn create_edge_type(
    &self,
    input: NewEdgeType,
    caller_id: Uuid,
  ) -> Result<EdgeType> {
    if input.name.trim().is_empty() {
      return Err(Error::MissingField("name"));
    }
    let slug = match input.slug {
      Some(slug) => slug,
      None => derive_slug(&input.name),
    };
    if slug.is_empty() {
      return Err(Error::MissingField("slug"));
    }
    self
      .require_domain_owner(input.domain_id, caller_id, "edge types")
      .await?;

    let now = Utc::now();
    let edge_type = EdgeType {
      id: Uuid::new_v4(),
      name: input.name,
      slug,
      description: input.description,
      icon: input.icon,
      color: input.color,
      semantic_type: input.semantic_type,
      weight: input.weight,
      is_directed: input.is_directed,
      domain_id: input.domain_id,
      created_at: now,
      updated_at: now,
    };

    self.insert_edge_type(&edge_type).await?;
    Ok(edge_type)
  }

  async fn list_edge_types(
    &self,
    domain_id: Option<Uuid>,
  ) -> Result<Vec<EdgeType>> {
    let domain_str = domain_id.map(encode_uuid);
    let raws: Vec<RawEdgeType> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM edge_types
           WHERE (?1 IS NULL OR domain_id = ?1)
           ORDER BY name ASC",
          RawEdgeType::COLUMNS
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![domain_str], RawEdgeType::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(storage)?;
    raws.into_iter().map(RawEdgeType::into_edge_type).collect()
  }

  async fn get_edge_type(&self, id: Uuid) -> Result<EdgeType> {
    self.fetch_edge_type(id).await
  }

  async fn update_edge_type(
    &self,
    id: Uuid,
    patch: EdgeTypePatch,
    caller_id: Uuid,
  ) -> Result<EdgeType> {
    let mut edge_type = self.fetch_edge_type(id).await?;
    self
      .require_domain_owner(edge_type.domain_id, caller_id, "edge types")
      .await?;

    if let Some(name) = patch.name {
      edge_type.name = name;
    }
    if let Some(slug) = patch.slug {
      edge_type.slug = slug;
    }
    if let Some(description) = patch.description {
      edge_type.description = Some(description);
    }
    if let Some(icon) = patch.icon {
      edge_type.icon = Some(icon);
    }
    if let Some(color) = patch.color {
      edge_type.color = color;
    }
    if let Some(semantic_type) = patch.semantic_type {
      edge_type.semantic_type = semantic_type;
    }
    if let Some(weight) = patch.weight {
      edge_type.weight = weight;
    }
    if let Some(is_directed) = patch.is_directed {
      edge_type.is_directed = is_directed;
    }
    edge_type.updated_at = Utc::now();

    self.write_edge_type(&edge_type).await?;
    Ok(edge_type)
  }

  async fn delete_edge_type(&self, id: Uuid, caller_id: Uuid) -> Result<()> {
    let edge_type = self.fetch_edge_type(id).await?;
    self
      .require_domain_owner(edge_type.domain_id, caller_id, "edge types")
      .await?;

    let id_str = encode_uuid(id);
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM edge_types WHERE id = ?1",
          rusqlite::params![id_str],
        )?;
        Ok(())
      })
      .await
      .map_err(|e| db_err("edge type", e))
  }

  // ── Nodes ─────────────────────────────────────────────────────────────────

  async fn create_node(&self, input: NewNode, creator_id: Uuid) -> Result<Node> {
    if input.title.trim().is_empty() {
      return Err(Error::MissingField("title"));
    }
    let slug = match input.slug {
      Some(slug) => slug,
      None => derive_slug(&input.title),
    };
    if slug.is_empty() {
      return Err(Error::MissingField("slug"));
    }

    self.fetch_user(creator_id).await?;
    self.fetch_domain(input.domain_id).await?;
    let node_type = self.fetch_node_type(input.type_id).await?;
    if node_type.domain_id != input.domain_id {
      return Err(Error::TypeDomainMismatch {
        type_id:   input.type_id,
        domain_id: input.domain_id,
      });
    }

    let now = Utc::now();
    let node = Node {
      id: Uuid::new_v4(),
      title: input.title,
      slug,
      excerpt: input.excerpt,
      content: input.content,
      tags: input.tags,
      status: input.status,
      domain_id: input.domain_id,
      type_id: input.type_id,
      creator_id,
      published_at: None,
      created_at: now,
      updated_at: now,
    };

    self.insert_node(&node).await?;
    Ok(node)
  }

  async fn list_nodes(&self, query: &NodeQuery) -> Result<Vec<Node>> {
    let domain_str = query.domain_id.map(encode_uuid);
    let type_str   = query.type_id.map(encode_uuid);
    let status_str = query.status.map(|s| encode_node_status(s).to_owned());

    let raws: Vec<RawNode> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM nodes
           WHERE (?1 IS NULL OR domain_id = ?1)
             AND (?2 IS NULL OR type_id = ?2)
             AND (?3 IS NULL OR status = ?3)
           ORDER BY created_at DESC",
          RawNode::COLUMNS
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![domain_str, type_str, status_str],
            RawNode::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(storage)?;

    let mut nodes: Vec<Node> = raws
      .into_iter()
      .map(RawNode::into_node)
      .collect::<Result<_>>()?;

    // Tag filter is set-overlap: keep nodes sharing at least one tag.
    if !query.tags.is_empty() {
      nodes.retain(|n| n.tags.iter().any(|t| query.tags.contains(t)));
    }

    Ok(nodes)
  }

  async fn search_nodes(&self, text: &str) -> Result<Vec<Node>> {
    let pattern = format!("%{text}%");
    let raws: Vec<RawNode> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM nodes
           WHERE title LIKE ?1 OR excerpt LIKE ?1
           ORDER BY created_at DESC",
          RawNode::COLUMNS
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![pattern], RawNode::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(storage)?;
    raws.into_iter().map(RawNode::into_node).collect()
  }

  async fn get_node(&self, id: Uuid) -> Result<Node> {
    self.fetch_node(id).await
  }

  async fn get_node_by_slug(&self, slug: &str) -> Result<Node> {
    let slug_owned = slug.to_owned();
    let raw: Option<RawNode> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {} FROM nodes WHERE slug = ?1", RawNode::COLUMNS),
              rusqlite::params![slug_owned],
              RawNode::from_row,
            )
            .optional()?,
        )
      })
      .await
      .map_err(storage)?;
    raw
      .ok_or_else(|| Error::NodeSlugNotFound(slug.to_owned()))?
      .into_node()
  }

  async fn update_node(
    &self,
    id: Uuid,
    patch: NodePatch,
    caller_id: Uuid,
  ) -> Result<Node> {
    let mut node = self.fetch_node(id).await?;
    if node.creator_id != caller_id {
      return Err(Error::NotOwner("nodes"));
    }

    let retyping = patch.type_id.is_some() || patch.domain_id.is_some();

    if let Some(title) = patch.title {
      node.title = title;
    }
    if let Some(slug) = patch.slug {
      node.slug = slug;
    }
    if let Some(excerpt) = patch.excerpt {
      node.excerpt = Some(excerpt);
    }
    if let Some(content) = patch.content {
      node.content = content;
    }
    if let Some(tags) = patch.tags {
      node.tags = tags;
    }
    if let Some(domain_id) = patch.domain_id {
      node.domain_id = domain_id;
    }
    if let Some(type_id) = patch.type_id {
      node.type_id = type_id;
    }

    // Moving between types or domains re-runs the cross-domain check on
    // the resulting pair.
    if retyping {
      self.fetch_domain(node.domain_id).await?;
      let node_type = self.fetch_node_type(node.type_id).await?;
      if node_type.domain_id != node.domain_id {
        return Err(Error::TypeDomainMismatch {
          type_id:   node.type_id,
          domain_id: node.domain_id,
        });
      }
    }

    node.updated_at = Utc::now();
    self.write_node(&node).await?;
    Ok(node)
  }

  async fn publish_node(&self, id: Uuid, caller_id: Uuid) -> Result<Node> {
    let mut node = self.fetch_node(id).await?;
    if node.creator_id != caller_id {
      return Err(Error::NotOwner("nodes"));
    }

    let now = Utc::now();
    node.status = NodeStatus::Published;
    node.published_at = Some(now);
    node.updated_at = now;

    self.write_node(&node).await?;
    Ok(node)
  }

  async fn archive_node(&self, id: Uuid, caller_id: Uuid) -> Result<Node> {
    let mut node = self.fetch_node(id).await?;
    if node.creator_id != caller_id {
      return Err(Error::NotOwner("nodes"));
    }

    // published_at keeps whatever value it had.
    node.status = NodeStatus::Archived;
    node.updated_at = Utc::now();

    self.write_node(&node).await?;
    Ok(node)
  }

  async fn delete_node(&self, id: Uuid, caller_id: Uuid) -> Result<()> {
    let node = self.fetch_node(id).await?;
    if node.creator_id != caller_id {
      return Err(Error::NotOwner("nodes"));
    }

    let id_str = encode_uuid(id);
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM nodes WHERE id = ?1",
          rusqlite::params![id_str],
        )?;
        Ok(())
      })
      .await
      .map_err(|e| db_err("node", e))
  }

  // ── Edges ─────────────────────────────────────────────────────────────────

  async fn create_edge(&self, input: NewEdge, caller_id: Uuid) -> Result<Edge> {
    if input.source_id == input.target_id {
      return Err(Error::SelfLoop);
    }

    let source = self.fetch_node(input.source_id).await?;
    if source.creator_id != caller_id {
      return Err(Error::NotOwner("edges"));
    }
    self.fetch_node(input.target_id).await?;
    self.fetch_edge_type(input.type_id).await?;

    let now = Utc::now();
    let edge = Edge {
      id: Uuid::new_v4(),
      source_id: input.source_id,
      target_id: input.target_id,
      type_id: input.type_id,
      description: input.description,
      metadata: input.metadata,
      created_at: now,
      updated_at: now,
    };

    // The (source, target, type) triple is decided by the unique
    // constraint; a concurrent duplicate loses with a conflict here.
    self.insert_edge(&edge).await?;
    Ok(edge)
  }

  async fn list_edges(
    &self,
    node_id: Option<Uuid>,
    domain_id: Option<Uuid>,
  ) -> Result<Vec<Edge>> {
    let node_str   = node_id.map(encode_uuid);
    let domain_str = domain_id.map(encode_uuid);

    let raws: Vec<RawEdge> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM edges e JOIN nodes s ON s.id = e.source_id
           WHERE (?1 IS NULL OR e.source_id = ?1 OR e.target_id = ?1)
             AND (?2 IS NULL OR s.domain_id = ?2)
           ORDER BY e.created_at DESC",
          RawEdge::COLUMNS_PREFIXED
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![node_str, domain_str], RawEdge::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(storage)?;
    raws.into_iter().map(RawEdge::into_edge).collect()
  }

  async fn get_edge(&self, id: Uuid) -> Result<Edge> {
    self.fetch_edge(id).await
  }

  async fn update_edge(
    &self,
    id: Uuid,
    patch: EdgePatch,
    caller_id: Uuid,
  ) -> Result<Edge> {
    let mut edge = self.fetch_edge(id).await?;
    self.require_edge_owner(&edge, caller_id).await?;

    if let Some(description) = patch.description {
      edge.description = Some(description);
    }
    if let Some(metadata) = patch.metadata {
      edge.metadata = metadata;
    }
    edge.updated_at = Utc::now();

    let id_str       = encode_uuid(edge.id);
    let description  = edge.description.clone();
    let metadata_str = encode_document(&edge.metadata)?;
    let updated_str  = encode_dt(edge.updated_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE edges SET description = ?2, metadata = ?3, updated_at = ?4
           WHERE id = ?1",
          rusqlite::params![id_str, description, metadata_str, updated_str],
        )?;
        Ok(())
      })
      .await
      .map_err(|e| db_err("edge", e))?;

    Ok(edge)
  }

  async fn delete_edge(&self, id: Uuid, caller_id: Uuid) -> Result<()> {
    let edge = self.fetch_edge(id).await?;
    self.require_edge_owner(&edge, caller_id).await?;

    let id_str = encode_uuid(id);
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM edges WHERE id = ?1",
          rusqlite::params![id_str],
        )?;
        Ok(())
      })
      .await
      .map_err(|e| db_err("edge", e))
  }

  async fn outgoing_edges(&self, node_id: Uuid) -> Result<Vec<Edge>> {
    self.edges_where("source_id", node_id).await
  }

  async fn incoming_edges(&self, node_id: Uuid) -> Result<Vec<Edge>> {
    self.edges_where("target_id", node_id).await
  }

  async fn node_edges(&self, node_id: Uuid) -> Result<NodeEdges> {
    let outgoing = self.outgoing_edges(node_id).await?;
    let incoming = self.incoming_edges(node_id).await?;
    Ok(NodeEdges { outgoing, incoming })
  }

  // ── Ratings ───────────────────────────────────────────────────────────────

  async fn create_rating(&self, input: NewRating) -> Result<Rating> {
    self.fetch_node(input.node_id).await?;

    let now = Utc::now();
    let rating = Rating {
      id: Uuid::new_v4(),
      node_id: input.node_id,
      metric_type: input.metric_type,
      score: input.score,
      details: input.details,
      created_at: now,
      updated_at: now,
    };

    let id_str      = encode_uuid(rating.id);
    let node_str    = encode_uuid(rating.node_id);
    let metric_str  = encode_metric_type(rating.metric_type).to_owned();
    let score       = rating.score;
    let details_str = encode_document(&rating.details)?;
    let created_str = encode_dt(rating.created_at);
    let updated_str = encode_dt(rating.updated_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO ratings (
             id, node_id, metric_type, score, details, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            id_str,
            node_str,
            metric_str,
            score,
            details_str,
            created_str,
            updated_str,
          ],
        )?;
        Ok(())
      })
      .await
      .map_err(|e| db_err("rating", e))?;

    Ok(rating)
  }

  async fn list_ratings(&self, node_id: Uuid) -> Result<Vec<Rating>> {
    let node_str = encode_uuid(node_id);
    let raws: Vec<RawRating> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM ratings WHERE node_id = ?1 ORDER BY created_at DESC",
          RawRating::COLUMNS
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![node_str], RawRating::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(storage)?;
    raws.into_iter().map(RawRating::into_rating).collect()
  }

  async fn list_ratings_by_metric(
    &self,
    node_id: Uuid,
    metric: MetricType,
  ) -> Result<Vec<Rating>> {
    let node_str   = encode_uuid(node_id);
    let metric_str = encode_metric_type(metric).to_owned();
    let raws: Vec<RawRating> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM ratings
           WHERE node_id = ?1 AND metric_type = ?2
           ORDER BY created_at DESC",
          RawRating::COLUMNS
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![node_str, metric_str],
            RawRating::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(storage)?;
    raws.into_iter().map(RawRating::into_rating).collect()
  }
}
