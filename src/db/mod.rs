use async_trait::async_trait;
use log::{debug, info};
use tokio::sync::{Mutex, OnceCell};
use turso::{Builder, Connection};

use crate::error::{StorageError, StorageResult};
use crate::store::FileStore;

// Custom error type for SQL-level operations
pub(crate) type DbResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

pub mod file_records;
pub mod schema;

pub use file_records::{Blob, FileRecord, IncomingFile, NewFileRecord};
pub use schema::SCHEMA_VERSION;

const IN_MEMORY: &str = ":memory:";

/// Handle to the local file database.
///
/// The connection is opened lazily by the first operation and then reused
/// for the rest of the session. Access is serialized through a mutex, so at
/// most one statement runs at a time.
pub struct Database {
    location: String,
    conn: OnceCell<Mutex<Connection>>,
}

impl Database {
    pub fn new(location: impl Into<String>) -> Self {
        Database {
            location: location.into(),
            conn: OnceCell::new(),
        }
    }

    /// A private database that lives only as long as this handle.
    pub fn in_memory() -> Self {
        Database::new(IN_MEMORY)
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn is_open(&self) -> bool {
        self.conn.initialized()
    }

    pub(crate) async fn connection(&self) -> StorageResult<&Mutex<Connection>> {
        self.conn
            .get_or_try_init(|| async {
                let conn = open_connection(&self.location)
                    .await
                    .map_err(|e| StorageError::Open(e.to_string()))?;
                Ok(Mutex::new(conn))
            })
            .await
    }
}

async fn open_connection(location: &str) -> DbResult<Connection> {
    let db = Builder::new_local(location).build().await?;
    let conn = db.connect()?;
    let version = schema::ensure_schema(&conn, SCHEMA_VERSION).await?;
    info!("Opened file database at {} (schema version {})", location, version);
    Ok(conn)
}

#[async_trait]
impl FileStore for Database {
    async fn add_file_entry(&self, file: IncomingFile) -> StorageResult<i64> {
        let record = NewFileRecord::from_incoming(file, chrono::Utc::now().timestamp_millis());
        self.insert_record(&record).await
    }

    async fn list_all_files(&self) -> StorageResult<Vec<FileRecord>> {
        let conn = self.connection().await?.lock().await;
        file_records::list_file_records(&conn)
            .await
            .map_err(|e| StorageError::Read(e.to_string()))
    }

    async fn get_file_by_id(&self, id: i64) -> StorageResult<Option<FileRecord>> {
        let conn = self.connection().await?.lock().await;
        file_records::get_file_record(&conn, id)
            .await
            .map_err(|e| StorageError::Read(e.to_string()))
    }

    async fn delete_file_by_id(&self, id: i64) -> StorageResult<()> {
        let conn = self.connection().await?.lock().await;
        let removed = file_records::delete_file_record(&conn, id)
            .await
            .map_err(|e| StorageError::Write(e.to_string()))?;
        debug!("delete_file_by_id: id {} removed {} row(s)", id, removed);
        Ok(())
    }

    async fn clear_all(&self) -> StorageResult<()> {
        let conn = self.connection().await?.lock().await;
        let removed = file_records::clear_file_records(&conn)
            .await
            .map_err(|e| StorageError::Write(e.to_string()))?;
        info!("clear_all: removed {} file(s)", removed);
        Ok(())
    }
}

impl Database {
    /// Persist a fully built record, keeping its `added` timestamp as given.
    pub async fn insert_record(&self, record: &NewFileRecord) -> StorageResult<i64> {
        let conn = self.connection().await?.lock().await;
        let id = file_records::insert_file_record(&conn, record)
            .await
            .map_err(|e| StorageError::Write(e.to_string()))?;
        debug!("Stored {} ({} bytes) as id {}", record.name, record.size, id);
        Ok(id)
    }
}
