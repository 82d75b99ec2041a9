use log::{info, warn};
use std::path::PathBuf;

use crate::store::FileStore;
use crate::ui::Ui;

use super::listing::ListRenderer;
use super::temp_ref::TempRefs;

pub const CLEAR_ALL_QUESTION: &str = "Delete all stored files? This cannot be undone.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Saved { id: i64, path: PathBuf },
    /// No record with this id, or the record has no payload
    Missing,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Cancelled,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClearOutcome {
    Cleared,
    Cancelled,
    Failed(String),
}

pub fn delete_question(name: &str) -> String {
    format!("Delete \"{}\"?", name)
}

/// Download and delete triggers attached to each rendered row.
#[derive(Debug, Clone)]
pub struct RowActions {
    temp_refs: TempRefs,
}

impl RowActions {
    pub fn new(temp_refs: TempRefs) -> Self {
        RowActions { temp_refs }
    }

    pub fn temp_refs(&self) -> &TempRefs {
        &self.temp_refs
    }

    /// Fetch the record fresh from the store and offer its payload for saving.
    pub async fn download<S>(&self, store: &S, ui: &dyn Ui, id: i64) -> DownloadOutcome
    where
        S: FileStore + ?Sized,
    {
        let record = match store.get_file_by_id(id).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                ui.alert("File not found. It may have been deleted.");
                return DownloadOutcome::Missing;
            }
            Err(e) => {
                ui.alert(&format!("Download failed: {}", e));
                return DownloadOutcome::Failed(e.to_string());
            }
        };

        let Some(blob) = record.blob.as_ref() else {
            warn!("download: record {} has no payload", id);
            ui.alert(&format!("The data for \"{}\" is missing.", record.name));
            return DownloadOutcome::Missing;
        };

        let temp = match self.temp_refs.materialize(&record.name, blob) {
            Ok(temp) => temp,
            Err(e) => {
                ui.alert(&format!("Download failed: {}", e));
                return DownloadOutcome::Failed(e.to_string());
            }
        };

        let saved = ui.save_as(&record.name, &temp);
        self.temp_refs.schedule_release(temp);

        match saved {
            Ok(path) => {
                info!("download: saved {} (id {}) to {}", record.name, id, path.display());
                DownloadOutcome::Saved { id, path }
            }
            Err(e) => {
                ui.alert(&format!("Download failed: {}", e));
                DownloadOutcome::Failed(e.to_string())
            }
        }
    }

    /// Ask before deleting; on yes, remove the record and redraw the list.
    pub async fn delete<S>(
        &self,
        store: &S,
        ui: &dyn Ui,
        renderer: &ListRenderer,
        id: i64,
        name: &str,
    ) -> DeleteOutcome
    where
        S: FileStore + ?Sized,
    {
        if !ui.confirm(&delete_question(name)) {
            return DeleteOutcome::Cancelled;
        }

        if let Err(e) = store.delete_file_by_id(id).await {
            ui.alert(&format!("Delete failed: {}", e));
            return DeleteOutcome::Failed(e.to_string());
        }
        info!("delete: removed {} (id {})", name, id);

        if let Err(e) = renderer.refresh(store, ui).await {
            ui.alert(&format!("Failed to refresh file list: {}", e));
        }
        DeleteOutcome::Deleted
    }
}

/// Empty the whole store after confirmation, then redraw the list.
pub async fn clear_all<S>(store: &S, ui: &dyn Ui, renderer: &ListRenderer) -> ClearOutcome
where
    S: FileStore + ?Sized,
{
    if !ui.confirm(CLEAR_ALL_QUESTION) {
        return ClearOutcome::Cancelled;
    }

    if let Err(e) = store.clear_all().await {
        ui.alert(&format!("Clear failed: {}", e));
        return ClearOutcome::Failed(e.to_string());
    }

    if let Err(e) = renderer.refresh(store, ui).await {
        ui.alert(&format!("Failed to refresh file list: {}", e));
    }
    ClearOutcome::Cleared
}
