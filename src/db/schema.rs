use log::info;
use turso::Connection;

use super::DbResult;

/// Version the current code expects the database to be at
pub const SCHEMA_VERSION: i64 = 1;

const VERSION_KEY: &str = "schema_version";

/// Get SQL for the schema bookkeeping table
pub fn get_meta_table_sql() -> &'static str {
    "
    CREATE TABLE IF NOT EXISTS schema_meta (
        key TEXT PRIMARY KEY,
        value INTEGER NOT NULL
    );
    "
}

/// Get SQL for the file record store (version 1)
pub fn get_table_sql() -> &'static str {
    "
    -- One row per stored file; ids are never reused
    CREATE TABLE IF NOT EXISTS files (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        mime_type TEXT NOT NULL,
        size INTEGER NOT NULL,
        added INTEGER NOT NULL,
        blob BLOB,
        blob_type TEXT
    );

    -- Non-unique; nothing queries by name yet
    CREATE INDEX IF NOT EXISTS idx_files_name ON files(name);
    "
}

/// Read the stored schema version, 0 for a fresh database
pub async fn current_version(conn: &Connection) -> DbResult<i64> {
    let mut rows = conn
        .query(
            "SELECT value FROM schema_meta WHERE key = ?1",
            turso::params![VERSION_KEY],
        )
        .await?;

    if let Some(row) = rows.next().await? {
        Ok(row.get(0)?)
    } else {
        Ok(0)
    }
}

async fn set_version(conn: &Connection, version: i64) -> DbResult<()> {
    conn.execute(
        "INSERT INTO schema_meta (key, value) VALUES (?1, ?2)
         ON CONFLICT (key) DO UPDATE SET value = ?2",
        turso::params![VERSION_KEY, version],
    )
    .await?;
    Ok(())
}

/// Bring the database up to `target`, running upgrade steps only when the
/// stored version is older. Returns the version the database ends up at.
pub async fn ensure_schema(conn: &Connection, target: i64) -> DbResult<i64> {
    conn.execute_batch(get_meta_table_sql()).await?;

    let stored = current_version(conn).await?;
    if stored > target {
        return Err(format!(
            "database is at schema version {}, this build supports up to {}",
            stored, target
        )
        .into());
    }
    if stored == target {
        return Ok(stored);
    }

    for version in (stored + 1)..=target {
        upgrade_to(conn, version).await?;
    }
    set_version(conn, target).await?;
    info!("Upgraded file database schema from version {} to {}", stored, target);

    Ok(target)
}

async fn upgrade_to(conn: &Connection, version: i64) -> DbResult<()> {
    match version {
        1 => conn.execute_batch(get_table_sql()).await?,
        other => return Err(format!("no upgrade step for schema version {}", other).into()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use turso::Builder;

    async fn memory_connection() -> Connection {
        let db = Builder::new_local(":memory:").build().await.unwrap();
        db.connect().unwrap()
    }

    #[test]
    fn files_sql_contains_table_and_name_index() {
        let sql = get_table_sql();
        assert!(sql.contains("CREATE TABLE IF NOT EXISTS files"));
        assert!(sql.contains("AUTOINCREMENT"));
        assert!(sql.contains("idx_files_name"));
        assert!(!sql.contains("UNIQUE"));
    }

    #[tokio::test]
    async fn fresh_database_is_upgraded_to_current_version() {
        let conn = memory_connection().await;

        let version = ensure_schema(&conn, SCHEMA_VERSION).await.unwrap();
        assert_eq!(version, SCHEMA_VERSION);
        assert_eq!(current_version(&conn).await.unwrap(), SCHEMA_VERSION);
    }

    #[tokio::test]
    async fn ensure_schema_is_idempotent() {
        let conn = memory_connection().await;

        ensure_schema(&conn, SCHEMA_VERSION).await.unwrap();
        ensure_schema(&conn, SCHEMA_VERSION).await.unwrap();
        assert_eq!(current_version(&conn).await.unwrap(), SCHEMA_VERSION);
    }

    #[tokio::test]
    async fn newer_database_is_refused() {
        let conn = memory_connection().await;
        ensure_schema(&conn, SCHEMA_VERSION).await.unwrap();
        set_version(&conn, SCHEMA_VERSION + 1).await.unwrap();

        let err = ensure_schema(&conn, SCHEMA_VERSION).await.unwrap_err();
        assert!(err.to_string().contains("schema version"));
    }
}
