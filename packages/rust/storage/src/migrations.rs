//! SQL migration definitions for the Web Baby database.
//!
//! Migrations are applied in order on database open. Each migration has a
//! version number and a batch of SQL statements.

/// A database migration with a version and SQL statements.
pub(crate) struct Migration {
    pub version: u32,
    pub description: &'static str,
    pub sql: &'static str,
}

/// All migrations, in ascending version order.
pub(crate) fn all_migrations() -> Vec<Migration> {
    vec![Migration {
        version: 1,
        description: "Initial schema: concepts, experiences, web_knowledge",
        sql: r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_migrations (
    version    INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Manually taught words
CREATE TABLE IF NOT EXISTS concepts (
    word          TEXT PRIMARY KEY,
    label         TEXT NOT NULL,
    seen_count    INTEGER NOT NULL DEFAULT 0,
    correct_count INTEGER NOT NULL DEFAULT 0
);

-- Teaching event log (append-only)
CREATE TABLE IF NOT EXISTS experiences (
    id          TEXT PRIMARY KEY,
    word        TEXT NOT NULL,
    true_label  TEXT NOT NULL,
    ai_guess    TEXT NOT NULL,
    was_correct INTEGER NOT NULL DEFAULT 0,
    created_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_experiences_word ON experiences(word);

-- Fetched knowledge, one row per normalized topic
CREATE TABLE IF NOT EXISTS web_knowledge (
    topic      TEXT PRIMARY KEY,
    source     TEXT NOT NULL,
    summary    TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_web_knowledge_updated ON web_knowledge(updated_at);

INSERT INTO schema_migrations (version) VALUES (1);
"#,
    }]
}
