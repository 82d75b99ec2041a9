use chrono::{DateTime, Local};

use crate::db::FileRecord;
use crate::error::StorageResult;
use crate::store::FileStore;
use crate::ui::Ui;

pub const EMPTY_PLACEHOLDER: &str = "No files stored yet. Upload some to get started.";

const KB: f64 = 1024.0;
const MB: f64 = KB * 1024.0;
const GB: f64 = MB * 1024.0;

/// One rendered line of the file list
#[derive(Debug, Clone, PartialEq)]
pub struct FileRow {
    pub id: i64,
    pub name: String,
    pub mime_type: String,
    pub size: i64,
    pub size_label: String,
    pub added: i64,
    pub added_label: String,
}

impl From<&FileRecord> for FileRow {
    fn from(record: &FileRecord) -> Self {
        FileRow {
            id: record.id,
            name: record.name.clone(),
            mime_type: record.mime_type.clone(),
            size: record.size,
            size_label: human_size(record.size),
            added: record.added,
            added_label: format_timestamp(record.added),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ListView {
    Empty,
    Rows { rows: Vec<FileRow>, summary: String },
}

impl ListView {
    pub fn rows(&self) -> &[FileRow] {
        match self {
            ListView::Empty => &[],
            ListView::Rows { rows, .. } => rows,
        }
    }
}

/// Human-readable byte count: B, then KB/MB/GB with one decimal
pub fn human_size(bytes: i64) -> String {
    let value = bytes as f64;
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if value < MB {
        format!("{:.1} KB", value / KB)
    } else if value < GB {
        format!("{:.1} MB", value / MB)
    } else {
        format!("{:.1} GB", value / GB)
    }
}

/// Format epoch milliseconds in the local time zone
pub fn format_timestamp(millis: i64) -> String {
    match DateTime::from_timestamp_millis(millis) {
        Some(utc) => utc
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        None => millis.to_string(),
    }
}

/// Newest first. The sort is stable, so equal timestamps keep storage order.
pub fn sort_newest_first(records: &mut [FileRecord]) {
    records.sort_by(|a, b| b.added.cmp(&a.added));
}

pub fn build_view(mut records: Vec<FileRecord>) -> ListView {
    if records.is_empty() {
        return ListView::Empty;
    }

    sort_newest_first(&mut records);
    let total: i64 = records.iter().map(|r| r.size).sum();
    let summary = format!(
        "{} file{}, {}",
        records.len(),
        if records.len() == 1 { "" } else { "s" },
        human_size(total)
    );

    ListView::Rows {
        rows: records.iter().map(FileRow::from).collect(),
        summary,
    }
}

/// Redraws the full file list from the store on every call.
#[derive(Debug, Default, Clone, Copy)]
pub struct ListRenderer;

impl ListRenderer {
    pub async fn refresh<S>(&self, store: &S, ui: &dyn Ui) -> StorageResult<ListView>
    where
        S: FileStore + ?Sized,
    {
        let records = store.list_all_files().await?;
        let view = build_view(records);
        ui.render(&view);
        Ok(view)
    }
}
