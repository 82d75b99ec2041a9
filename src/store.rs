use async_trait::async_trait;

use crate::db::{FileRecord, IncomingFile};
use crate::error::StorageResult;

/// Persistent collection of file records.
///
/// Every call is its own short-lived unit of work; nothing spans several
/// records atomically except `clear_all`.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Store `file` as a new record and return the id assigned to it.
    async fn add_file_entry(&self, file: IncomingFile) -> StorageResult<i64>;

    /// Every record, in no particular order.
    async fn list_all_files(&self) -> StorageResult<Vec<FileRecord>>;

    /// `Ok(None)` when no record has this id.
    async fn get_file_by_id(&self, id: i64) -> StorageResult<Option<FileRecord>>;

    /// Removing an id that is not present succeeds.
    async fn delete_file_by_id(&self, id: i64) -> StorageResult<()>;

    async fn clear_all(&self) -> StorageResult<()>;
}
