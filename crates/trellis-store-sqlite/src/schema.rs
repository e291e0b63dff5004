//! SQL schema for the Trellis SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! the `PRAGMA user_version` number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    id                TEXT PRIMARY KEY,
    email             TEXT NOT NULL UNIQUE,
    username          TEXT NOT NULL,
    display_name      TEXT,
    avatar_url        TEXT,
    roles             TEXT NOT NULL DEFAULT '[\"user\"]',  -- JSON array of role tags
    is_active         INTEGER NOT NULL DEFAULT 1,
    is_email_verified INTEGER NOT NULL DEFAULT 0,
    last_login_at     TEXT,
    created_at        TEXT NOT NULL,
    updated_at        TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS oauth_accounts (
    id               TEXT PRIMARY KEY,
    user_id          TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    provider         TEXT NOT NULL,
    provider_user_id TEXT NOT NULL,
    provider_email   TEXT,
    display_name     TEXT,
    avatar_url       TEXT,
    access_token     TEXT,
    refresh_token    TEXT,
    token_expires_at TEXT,
    last_used_at     TEXT NOT NULL,
    created_at       TEXT NOT NULL,
    updated_at       TEXT NOT NULL,
    UNIQUE (provider, provider_user_id)
);

CREATE TABLE IF NOT EXISTS domains (
    id           TEXT PRIMARY KEY,
    name         TEXT NOT NULL,
    slug         TEXT NOT NULL UNIQUE,
    description  TEXT,
    translations TEXT NOT NULL DEFAULT '{}',
    is_public    INTEGER NOT NULL DEFAULT 1,
    is_active    INTEGER NOT NULL DEFAULT 1,
    settings     TEXT NOT NULL DEFAULT '{}',
    creator_id   TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS node_types (
    id          TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    slug        TEXT NOT NULL,
    description TEXT,
    icon        TEXT,
    color       TEXT NOT NULL DEFAULT '#1890ff',
    schema      TEXT NOT NULL DEFAULT '{}',       -- caller-defined field schema
    sort_order  INTEGER NOT NULL DEFAULT 0,
    domain_id   TEXT NOT NULL REFERENCES domains(id) ON DELETE CASCADE,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL,
    UNIQUE (domain_id, slug)
);

CREATE TABLE IF NOT EXISTS edge_types (
    id            TEXT PRIMARY KEY,
    name          TEXT NOT NULL,
    slug          TEXT NOT NULL,
    description   TEXT,
    icon          TEXT,
    color         TEXT NOT NULL DEFAULT '#52c41a',
    semantic_type TEXT NOT NULL DEFAULT 'custom',  -- supports | contradicts | derives_from | part_of | requires | custom
    weight        REAL NOT NULL DEFAULT 0,         -- signed; sign encodes relationship polarity
    is_directed   INTEGER NOT NULL DEFAULT 1,
    domain_id     TEXT NOT NULL REFERENCES domains(id) ON DELETE CASCADE,
    created_at    TEXT NOT NULL,
    updated_at    TEXT NOT NULL,
    UNIQUE (domain_id, slug)
);

CREATE TABLE IF NOT EXISTS nodes (
    id           TEXT PRIMARY KEY,
    title        TEXT NOT NULL,
    slug         TEXT NOT NULL UNIQUE,
    excerpt      TEXT,
    content      TEXT NOT NULL DEFAULT '{}',
    tags         TEXT NOT NULL DEFAULT '[]',
    status       TEXT NOT NULL DEFAULT 'draft',    -- draft | published | archived
    domain_id    TEXT NOT NULL REFERENCES domains(id) ON DELETE CASCADE,
    type_id      TEXT NOT NULL REFERENCES node_types(id) ON DELETE RESTRICT,
    creator_id   TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    published_at TEXT,
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS edges (
    id          TEXT PRIMARY KEY,
    source_id   TEXT NOT NULL REFERENCES nodes(id) ON DELETE CASCADE,
    target_id   TEXT NOT NULL REFERENCES nodes(id) ON DELETE CASCADE,
    type_id     TEXT NOT NULL REFERENCES edge_types(id) ON DELETE RESTRICT,
    description TEXT,
    metadata    TEXT NOT NULL DEFAULT '{}',
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL,
    UNIQUE (source_id, target_id, type_id),
    CHECK  (source_id != target_id)
);

CREATE TABLE IF NOT EXISTS ratings (
    id          TEXT PRIMARY KEY,
    node_id     TEXT NOT NULL REFERENCES nodes(id) ON DELETE CASCADE,
    metric_type TEXT NOT NULL,   -- consistency | coherence | connectivity | overall
    score       REAL NOT NULL,
    details     TEXT NOT NULL DEFAULT '{}',
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS nodes_domain_idx        ON nodes(domain_id);
CREATE INDEX IF NOT EXISTS nodes_type_idx          ON nodes(type_id);
CREATE INDEX IF NOT EXISTS nodes_status_idx        ON nodes(status);
CREATE INDEX IF NOT EXISTS edges_source_idx        ON edges(source_id);
CREATE INDEX IF NOT EXISTS edges_target_idx        ON edges(target_id);
CREATE INDEX IF NOT EXISTS ratings_node_metric_idx ON ratings(node_id, metric_type);

PRAGMA user_version = 1;
";
