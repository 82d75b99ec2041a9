use serde::{Deserialize, Serialize};
use turso::{Connection, Value};

use super::DbResult;

// ============ File Record Structs ============

/// Raw payload bytes plus the MIME type they were stored with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub size: i64,
    /// Milliseconds since the Unix epoch
    pub added: i64,
    #[serde(skip)]
    pub blob: Option<Blob>,
}

/// A file handed to the store, before metadata is derived
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl IncomingFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        IncomingFile {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }
}

/// A record ready to insert; the id is assigned by the database
#[derive(Debug, Clone)]
pub struct NewFileRecord {
    pub name: String,
    pub mime_type: String,
    pub size: i64,
    pub added: i64,
    pub blob: Blob,
}

impl NewFileRecord {
    pub fn from_incoming(file: IncomingFile, added: i64) -> Self {
        NewFileRecord {
            size: file.bytes.len() as i64,
            blob: Blob {
                bytes: file.bytes,
                mime_type: file.mime_type.clone(),
            },
            name: file.name,
            mime_type: file.mime_type,
            added,
        }
    }
}

const SELECT_COLUMNS: &str = "SELECT id, name, mime_type, size, added, blob, blob_type FROM files";

fn record_from_row(row: &turso::Row) -> DbResult<FileRecord> {
    let blob_type: Option<String> = row.get(6)?;
    let blob = match row.get_value(5)? {
        Value::Blob(bytes) => Some(Blob {
            bytes,
            mime_type: blob_type.unwrap_or_default(),
        }),
        Value::Null => None,
        other => return Err(format!("unexpected payload column value: {:?}", other).into()),
    };

    Ok(FileRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        mime_type: row.get(2)?,
        size: row.get(3)?,
        added: row.get(4)?,
        blob,
    })
}

// ============ File Record Functions ============

/// Insert a record and return its new id
pub async fn insert_file_record(conn: &Connection, record: &NewFileRecord) -> DbResult<i64> {
    conn.execute(
        "INSERT INTO files (name, mime_type, size, added, blob, blob_type)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        turso::params![
            record.name.clone(),
            record.mime_type.clone(),
            record.size,
            record.added,
            Value::Blob(record.blob.bytes.clone()),
            record.blob.mime_type.clone(),
        ],
    )
    .await?;
    Ok(conn.last_insert_rowid())
}

/// Get every record, in storage order
pub async fn list_file_records(conn: &Connection) -> DbResult<Vec<FileRecord>> {
    let mut rows = conn.query(SELECT_COLUMNS, ()).await?;

    let mut records = Vec::new();
    while let Some(row) = rows.next().await? {
        records.push(record_from_row(&row)?);
    }
    Ok(records)
}

/// Get one record by id
pub async fn get_file_record(conn: &Connection, id: i64) -> DbResult<Option<FileRecord>> {
    let mut rows = conn
        .query(&format!("{} WHERE id = ?1", SELECT_COLUMNS), turso::params![id])
        .await?;

    if let Some(row) = rows.next().await? {
        Ok(Some(record_from_row(&row)?))
    } else {
        Ok(None)
    }
}

/// Delete one record, returning how many rows went away (0 or 1)
pub async fn delete_file_record(conn: &Connection, id: i64) -> DbResult<u64> {
    let removed = conn
        .execute("DELETE FROM files WHERE id = ?1", turso::params![id])
        .await?;
    Ok(removed)
}

/// Delete every record
pub async fn clear_file_records(conn: &Connection) -> DbResult<u64> {
    let removed = conn.execute("DELETE FROM files", ()).await?;
    Ok(removed)
}
