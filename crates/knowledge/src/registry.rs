//! SQLite-backed registry of ingested documents.

use crate::types::DocumentRecord;
use chrono::{DateTime, Utc};
use docqa_core::{AppError, AppResult};
use rusqlite::{params, Connection};
use std::path::Path;
use tokio::sync::Mutex;

/// Records one row per ingested document.
///
/// The connection is serialized behind an async mutex so the registry can be
/// shared across request handlers.
#[derive(Debug)]
pub struct DocumentRegistry {
    conn: Mutex<Connection>,
}

impl DocumentRegistry {
    /// Open the registry named by a database URL.
    ///
    /// Accepts `:memory:`, `sqlite:///<path>` (three slashes, the path is taken
    /// as written, so `sqlite:////abs.db` is absolute), `sqlite://<path>`,
    /// `sqlite:<path>` or a plain filesystem path. `:memory:` after any prefix
    /// opens an in-memory database.
    pub fn open(database_url: &str) -> AppResult<Self> {
        let conn = match sqlite_target(database_url) {
            None => Connection::open_in_memory().map_err(|e| {
                AppError::Knowledge(format!("Failed to open in-memory registry: {}", e))
            })?,
            Some(target) => {
                let path = Path::new(target);
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        AppError::Knowledge(format!("Failed to create registry directory: {}", e))
                    })?;
                }
                Connection::open(path).map_err(|e| {
                    AppError::Knowledge(format!("Failed to open SQLite registry: {}", e))
                })?
            }
        };

        init_schema(&conn)?;
        tracing::debug!("Opened document registry at {}", database_url);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Record a freshly ingested document.
    pub async fn record(
        &self,
        filename: &str,
        size_bytes: u64,
        chunk_count: usize,
    ) -> AppResult<DocumentRecord> {
        let record = DocumentRecord {
            id: uuid::Uuid::new_v4().to_string(),
            filename: filename.to_string(),
            size_bytes,
            chunk_count,
            ingested_at: Utc::now(),
        };

        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO documents (id, filename, size_bytes, chunk_count, ingested_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.id,
                record.filename,
                record.size_bytes as i64,
                record.chunk_count as i64,
                record.ingested_at.to_rfc3339(),
            ],
        )
        .map_err(|e| AppError::Knowledge(format!("Failed to insert document: {}", e)))?;

        Ok(record)
    }

    /// All documents in ingestion order.
    pub async fn list(&self) -> AppResult<Vec<DocumentRecord>> {
        let conn = self.conn.lock().await;

        let mut stmt = conn
            .prepare(
                "SELECT id, filename, size_bytes, chunk_count, ingested_at
                 FROM documents ORDER BY rowid",
            )
            .map_err(|e| AppError::Knowledge(format!("Failed to prepare query: {}", e)))?;

        let rows = stmt
            .query_map([], |row| {
                let ingested_at: String = row.get(4)?;
                let ingested_at = DateTime::parse_from_rfc3339(&ingested_at)
                    .map(|t| t.with_timezone(&Utc))
                    .map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(
                            4,
                            rusqlite::types::Type::Text,
                            Box::new(e),
                        )
                    })?;

                Ok(DocumentRecord {
                    id: row.get(0)?,
                    filename: row.get(1)?,
                    size_bytes: row.get::<_, i64>(2)? as u64,
                    chunk_count: row.get::<_, i64>(3)? as usize,
                    ingested_at,
                })
            })
            .map_err(|e| AppError::Knowledge(format!("Failed to query documents: {}", e)))?;

        let documents = rows
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::Knowledge(format!("Failed to read document row: {}", e)))?;

        Ok(documents)
    }

    /// Delete the row with `id`. Returns whether a row was removed.
    pub async fn remove(&self, id: &str) -> AppResult<bool> {
        let conn = self.conn.lock().await;
        let removed = conn
            .execute("DELETE FROM documents WHERE id = ?1", params![id])
            .map_err(|e| AppError::Knowledge(format!("Failed to delete document: {}", e)))?;
        Ok(removed > 0)
    }

    /// Number of recorded documents.
    pub async fn count(&self) -> AppResult<usize> {
        let conn = self.conn.lock().await;
        conn.query_row("SELECT COUNT(*) FROM documents", [], |row| {
            row.get::<_, i64>(0).map(|v| v as usize)
        })
        .map_err(|e| AppError::Knowledge(format!("Failed to count documents: {}", e)))
    }
}

/// File path named by `database_url`, or `None` for an in-memory database.
fn sqlite_target(database_url: &str) -> Option<&str> {
    let target = database_url
        .strip_prefix("sqlite:///")
        .or_else(|| database_url.strip_prefix("sqlite://"))
        .or_else(|| database_url.strip_prefix("sqlite:"))
        .unwrap_or(database_url);

    if target.is_empty() || target.trim_start_matches('/') == ":memory:" {
        None
    } else {
        Some(target)
    }
}

fn init_schema(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS documents (
            id TEXT PRIMARY KEY,
            filename TEXT NOT NULL,
            size_bytes INTEGER NOT NULL,
            chunk_count INTEGER NOT NULL,
            ingested_at TEXT NOT NULL
        );
        "#,
    )
    .map_err(|e| AppError::Knowledge(format!("Failed to create tables: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_record_and_list_in_memory() {
        let registry = DocumentRegistry::open(":memory:").unwrap();

        let first = registry.record("a.txt", 120, 3).await.unwrap();
        registry.record("b.md", 40, 1).await.unwrap();

        let docs = registry.list().await.unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].id, first.id);
        assert_eq!(docs[0].filename, "a.txt");
        assert_eq!(docs[0].size_bytes, 120);
        assert_eq!(docs[0].chunk_count, 3);
        assert_eq!(docs[1].filename, "b.md");
        assert_eq!(registry.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_file_backed_registry_persists() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("docqa.db");
        let url = format!("sqlite:///{}", path.display());

        {
            let registry = DocumentRegistry::open(&url).unwrap();
            registry.record("notes.txt", 10, 1).await.unwrap();
        }

        let reopened = DocumentRegistry::open(&url).unwrap();
        let docs = reopened.list().await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].filename, "notes.txt");
    }

    #[test]
    fn test_sqlite_target() {
        assert_eq!(sqlite_target(":memory:"), None);
        assert_eq!(sqlite_target("sqlite::memory:"), None);
        assert_eq!(sqlite_target("sqlite:///:memory:"), None);
        assert_eq!(sqlite_target("sqlite://:memory:"), None);
        assert_eq!(sqlite_target(""), None);

        assert_eq!(sqlite_target("sqlite:///relative.db"), Some("relative.db"));
        assert_eq!(sqlite_target("sqlite:////var/lib/docs.db"), Some("/var/lib/docs.db"));
        assert_eq!(sqlite_target("sqlite://docs.db"), Some("docs.db"));
        assert_eq!(sqlite_target("sqlite:data/docs.db"), Some("data/docs.db"));
        assert_eq!(sqlite_target("/tmp/docs.db"), Some("/tmp/docs.db"));
    }

    #[tokio::test]
    async fn test_three_slash_memory_url_is_in_memory() {
        let registry = DocumentRegistry::open("sqlite:///:memory:").unwrap();
        registry.record("a.txt", 1, 1).await.unwrap();

        // A second open starts from an empty database
        let other = DocumentRegistry::open("sqlite:///:memory:").unwrap();
        assert_eq!(other.count().await.unwrap(), 0);
        assert_eq!(registry.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_remove() {
        let registry = DocumentRegistry::open(":memory:").unwrap();
        let doc = registry.record("a.txt", 1, 1).await.unwrap();

        assert!(registry.remove(&doc.id).await.unwrap());
        assert!(!registry.remove(&doc.id).await.unwrap());
        assert!(registry.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_registry() {
        let registry = DocumentRegistry::open("sqlite::memory:").unwrap();
        assert!(registry.list().await.unwrap().is_empty());
        assert_eq!(registry.count().await.unwrap(), 0);
    }
}
