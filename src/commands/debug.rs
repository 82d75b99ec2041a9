use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde_json::{json, Value};

use crate::db::FileRecord;
use crate::error::{StorageError, StorageResult, UploadError};
use crate::shelf::SelectedFile;
use crate::store::FileStore;

/// Raw store operations for manual use, bypassing the controllers.
/// Results are JSON so they can be printed as-is.
pub struct DebugApi<'a, S: FileStore + ?Sized> {
    store: &'a S,
}

fn record_json(record: &FileRecord, with_payload: bool) -> StorageResult<Value> {
    let mut value =
        serde_json::to_value(record).map_err(|e| StorageError::Read(e.to_string()))?;
    if with_payload {
        value["blob"] = match &record.blob {
            Some(blob) => json!({
                "type": blob.mime_type,
                "base64": BASE64.encode(&blob.bytes),
            }),
            None => Value::Null,
        };
    }
    Ok(value)
}

impl<'a, S: FileStore + ?Sized> DebugApi<'a, S> {
    pub fn new(store: &'a S) -> Self {
        DebugApi { store }
    }

    pub async fn add(&self, file: SelectedFile) -> Result<Value, UploadError> {
        let incoming = file.load().await?;
        let id = self.store.add_file_entry(incoming).await?;
        Ok(json!({ "id": id }))
    }

    pub async fn list(&self) -> StorageResult<Value> {
        let records = self.store.list_all_files().await?;
        let values = records
            .iter()
            .map(|r| record_json(r, false))
            .collect::<StorageResult<Vec<_>>>()?;
        Ok(Value::Array(values))
    }

    pub async fn get(&self, id: i64) -> StorageResult<Value> {
        let record = self.store.get_file_by_id(id).await?;
        match record {
            Some(r) => record_json(&r, true),
            None => Ok(Value::Null),
        }
    }

    pub async fn delete(&self, id: i64) -> StorageResult<Value> {
        self.store.delete_file_by_id(id).await?;
        Ok(json!({ "deleted": id }))
    }

    pub async fn clear(&self) -> StorageResult<Value> {
        self.store.clear_all().await?;
        Ok(json!({ "cleared": true }))
    }
}
