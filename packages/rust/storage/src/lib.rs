//! Embedded libSQL storage layer.
//!
//! The [`Storage`] struct wraps a libSQL database holding taught concepts, the
//! teaching log, and fetched web knowledge.
//!
//! Every table is keyed by its natural key (`word`, `topic`) except the
//! append-only experience log. Knowledge writes go through a single
//! `INSERT … ON CONFLICT DO UPDATE` statement, so concurrent upserts of one
//! topic resolve last-writer-wins.
//!
//! All handlers share one connection. Writes take `write_lock` so a statement
//! from one request never lands inside another request's open transaction.

mod migrations;

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use libsql::{Connection, Database, params};
use tokio::sync::Mutex;
use uuid::Uuid;
use webbaby_shared::{Concept, Experience, Result, WebBabyError, WebKnowledge};

/// Primary storage handle wrapping a libSQL database.
pub struct Storage {
    #[allow(dead_code)]
    db: Database,
    conn: Connection,
    write_lock: Mutex<()>,
}

impl Storage {
    /// Open or create a database at `path` and apply pending migrations.
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| WebBabyError::io(parent, e))?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(WebBabyError::storage)?;

        let conn = db.connect().map_err(WebBabyError::storage)?;

        let storage = Self {
            db,
            conn,
            write_lock: Mutex::new(()),
        };
        storage.run_migrations().await?;
        tracing::debug!(?path, "storage opened");
        Ok(storage)
    }

    /// Run pending schema migrations.
    async fn run_migrations(&self) -> Result<()> {
        let current_version = self.get_schema_version().await;

        for migration in migrations::all_migrations() {
            if migration.version > current_version {
                tracing::info!(
                    version = migration.version,
                    description = migration.description,
                    "applying migration"
                );
                self.conn.execute_batch(migration.sql).await.map_err(|e| {
                    WebBabyError::Storage(format!("migration v{} failed: {e}", migration.version))
                })?;
            }
        }
        Ok(())
    }

    /// Get the current schema version, or 0 if no migrations have been applied.
    async fn get_schema_version(&self) -> u32 {
        let result = self
            .conn
            .query("SELECT MAX(version) FROM schema_migrations", params![])
            .await;

        match result {
            Ok(mut rows) => {
                if let Ok(Some(row)) = rows.next().await {
                    row.get::<u32>(0).unwrap_or(0)
                } else {
                    0
                }
            }
            Err(_) => 0, // Table doesn't exist yet
        }
    }

    // -----------------------------------------------------------------------
    // Knowledge operations
    // -----------------------------------------------------------------------

    /// Insert or overwrite the record for `topic` and return the stored row.
    ///
    /// An existing row keeps its `created_at`; `source`, `summary` and
    /// `updated_at` are replaced.
    pub async fn upsert_knowledge(
        &self,
        topic: &str,
        summary: &str,
        source: &str,
    ) -> Result<WebKnowledge> {
        let _guard = self.write_lock.lock().await;
        let now = now_timestamp();
        self.conn
            .execute(
                "INSERT INTO web_knowledge (topic, source, summary, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(topic) DO UPDATE SET
                   source = excluded.source,
                   summary = excluded.summary,
                   updated_at = excluded.updated_at",
                params![topic, source, summary, now.as_str(), now.as_str()],
            )
            .await
            .map_err(WebBabyError::storage)?;

        tracing::debug!(topic, source, "knowledge upserted");
        self.get_knowledge(topic).await
    }

    /// Get the record for `topic`.
    pub async fn get_knowledge(&self, topic: &str) -> Result<WebKnowledge> {
        let mut rows = self
            .conn
            .query(
                "SELECT topic, source, summary, created_at, updated_at
                 FROM web_knowledge WHERE topic = ?1",
                params![topic],
            )
            .await
            .map_err(WebBabyError::storage)?;

        match rows.next().await.map_err(WebBabyError::storage)? {
            Some(row) => row_to_knowledge(&row),
            None => Err(WebBabyError::TopicNotFound(topic.to_string())),
        }
    }

    /// List up to `limit` records, most recently written first.
    pub async fn list_knowledge(&self, limit: u32) -> Result<Vec<WebKnowledge>> {
        let mut rows = self
            .conn
            .query(
                "SELECT topic, source, summary, created_at, updated_at
                 FROM web_knowledge
                 ORDER BY updated_at DESC, rowid DESC
                 LIMIT ?1",
                params![limit],
            )
            .await
            .map_err(WebBabyError::storage)?;

        let mut results = Vec::new();
        while let Some(row) = rows.next().await.map_err(WebBabyError::storage)? {
            results.push(row_to_knowledge(&row)?);
        }
        Ok(results)
    }

    /// Count stored knowledge records.
    pub async fn count_knowledge(&self) -> Result<u64> {
        let mut rows = self
            .conn
            .query("SELECT COUNT(*) FROM web_knowledge", params![])
            .await
            .map_err(WebBabyError::storage)?;

        match rows.next().await.map_err(WebBabyError::storage)? {
            Some(row) => Ok(row.get::<i64>(0).map_err(WebBabyError::storage)? as u64),
            None => Ok(0),
        }
    }

    /// Delete the record for `topic`.
    pub async fn delete_knowledge(&self, topic: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let affected = self
            .conn
            .execute("DELETE FROM web_knowledge WHERE topic = ?1", params![topic])
            .await
            .map_err(WebBabyError::storage)?;

        if affected == 0 {
            return Err(WebBabyError::TopicNotFound(topic.to_string()));
        }
        tracing::debug!(topic, "knowledge deleted");
        Ok(())
    }

    /// Delete every knowledge record. Returns how many were removed.
    pub async fn delete_all_knowledge(&self) -> Result<u64> {
        let _guard = self.write_lock.lock().await;
        let affected = self
            .conn
            .execute("DELETE FROM web_knowledge", params![])
            .await
            .map_err(WebBabyError::storage)?;
        tracing::info!(removed = affected, "knowledge cleared");
        Ok(affected)
    }

    // -----------------------------------------------------------------------
    // Teaching operations
    // -----------------------------------------------------------------------

    /// Record one teaching of `word` as `label`.
    ///
    /// Creates the concept on first teach (counts 1/1); afterwards overwrites
    /// the label and bumps both counts. Always appends an experience whose
    /// guess equals the true label. Both writes share one transaction.
    pub async fn teach(&self, word: &str, label: &str) -> Result<Concept> {
        let guard = self.write_lock.lock().await;
        let tx = self
            .conn
            .transaction()
            .await
            .map_err(WebBabyError::storage)?;

        tx.execute(
            "INSERT INTO concepts (word, label, seen_count, correct_count)
             VALUES (?1, ?2, 1, 1)
             ON CONFLICT(word) DO UPDATE SET
               label = excluded.label,
               seen_count = seen_count + 1,
               correct_count = correct_count + 1",
            params![word, label],
        )
        .await
        .map_err(WebBabyError::storage)?;

        let id = Uuid::now_v7().to_string();
        let now = now_timestamp();
        tx.execute(
            "INSERT INTO experiences (id, word, true_label, ai_guess, was_correct, created_at)
             VALUES (?1, ?2, ?3, ?4, 1, ?5)",
            params![id.as_str(), word, label, label, now.as_str()],
        )
        .await
        .map_err(WebBabyError::storage)?;

        tx.commit().await.map_err(WebBabyError::storage)?;
        drop(guard);

        tracing::debug!(word, label, "concept taught");
        self.get_concept(word).await
    }

    /// Get the concept for `word`.
    pub async fn get_concept(&self, word: &str) -> Result<Concept> {
        let mut rows = self
            .conn
            .query(
                "SELECT word, label, seen_count, correct_count FROM concepts WHERE word = ?1",
                params![word],
            )
            .await
            .map_err(WebBabyError::storage)?;

        match rows.next().await.map_err(WebBabyError::storage)? {
            Some(row) => row_to_concept(&row),
            None => Err(WebBabyError::ConceptNotFound(word.to_string())),
        }
    }

    /// List all concepts, ordered by word.
    pub async fn list_concepts(&self) -> Result<Vec<Concept>> {
        let mut rows = self
            .conn
            .query(
                "SELECT word, label, seen_count, correct_count FROM concepts ORDER BY word",
                params![],
            )
            .await
            .map_err(WebBabyError::storage)?;

        let mut results = Vec::new();
        while let Some(row) = rows.next().await.map_err(WebBabyError::storage)? {
            results.push(row_to_concept(&row)?);
        }
        Ok(results)
    }

    /// List up to `limit` teaching events, newest first.
    pub async fn list_experiences(&self, limit: u32) -> Result<Vec<Experience>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, word, true_label, ai_guess, was_correct, created_at
                 FROM experiences
                 ORDER BY rowid DESC
                 LIMIT ?1",
                params![limit],
            )
            .await
            .map_err(WebBabyError::storage)?;

        let mut results = Vec::new();
        while let Some(row) = rows.next().await.map_err(WebBabyError::storage)? {
            results.push(Experience {
                id: row.get::<String>(0).map_err(WebBabyError::storage)?,
                word: row.get::<String>(1).map_err(WebBabyError::storage)?,
                true_label: row.get::<String>(2).map_err(WebBabyError::storage)?,
                ai_guess: row.get::<String>(3).map_err(WebBabyError::storage)?,
                was_correct: row.get::<i64>(4).map_err(WebBabyError::storage)? != 0,
                created_at: parse_timestamp(&row, 5)?,
            });
        }
        Ok(results)
    }

    // -----------------------------------------------------------------------
    // Reset
    // -----------------------------------------------------------------------

    /// Wipe concepts, experiences and knowledge.
    pub async fn reset_all(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.conn
            .execute_batch(
                "DELETE FROM concepts;
                 DELETE FROM experiences;
                 DELETE FROM web_knowledge;",
            )
            .await
            .map_err(WebBabyError::storage)?;
        tracing::info!("all stored data reset");
        Ok(())
    }
}

/// Convert a database row to a [`WebKnowledge`].
fn row_to_knowledge(row: &libsql::Row) -> Result<WebKnowledge> {
    Ok(WebKnowledge {
        topic: row.get::<String>(0).map_err(WebBabyError::storage)?,
        source: row.get::<String>(1).map_err(WebBabyError::storage)?,
        summary: row.get::<String>(2).map_err(WebBabyError::storage)?,
        created_at: parse_timestamp(row, 3)?,
        updated_at: parse_timestamp(row, 4)?,
    })
}

/// Convert a database row to a [`Concept`].
fn row_to_concept(row: &libsql::Row) -> Result<Concept> {
    Ok(Concept {
        word: row.get::<String>(0).map_err(WebBabyError::storage)?,
        label: row.get::<String>(1).map_err(WebBabyError::storage)?,
        seen_count: row.get::<i64>(2).map_err(WebBabyError::storage)?,
        correct_count: row.get::<i64>(3).map_err(WebBabyError::storage)?,
    })
}

/// Fixed-width RFC 3339 so lexical order in SQL matches time order.
fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(row: &libsql::Row, idx: i32) -> Result<DateTime<Utc>> {
    let s: String = row.get(idx).map_err(WebBabyError::storage)?;
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| WebBabyError::Storage(format!("invalid date: {e}")))
}
