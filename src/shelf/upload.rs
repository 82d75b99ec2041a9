use log::{info, warn};
use std::sync::Mutex;

use crate::error::UploadError;
use crate::store::FileStore;
use crate::ui::Ui;

use super::listing::ListRenderer;
use super::selection::SelectedFile;

pub const EMPTY_SELECTION_PROMPT: &str = "Please select at least one file to upload.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadState {
    Idle,
    Uploading,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// Every file was stored; ids in selection order
    Stored(Vec<i64>),
    /// Nothing was selected, nothing was stored
    EmptySelection,
    /// Another upload was still running
    Busy,
    /// The sequence stopped at the first failure; earlier files stay stored
    Failed { stored: Vec<i64>, error: String },
}

/// Stores a selection of files one after another.
#[derive(Debug)]
pub struct UploadController {
    state: Mutex<UploadState>,
}

impl Default for UploadController {
    fn default() -> Self {
        UploadController::new()
    }
}

/// Puts the controller back to idle and re-enables the trigger on every
/// exit path.
struct UploadingGuard<'a> {
    state: &'a Mutex<UploadState>,
    ui: &'a dyn Ui,
}

impl Drop for UploadingGuard<'_> {
    fn drop(&mut self) {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = UploadState::Idle;
        self.ui.set_upload_enabled(true);
    }
}

impl UploadController {
    pub fn new() -> Self {
        UploadController {
            state: Mutex::new(UploadState::Idle),
        }
    }

    pub fn state(&self) -> UploadState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn begin<'a>(&'a self, ui: &'a dyn Ui) -> Option<UploadingGuard<'a>> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if *state == UploadState::Uploading {
            return None;
        }
        *state = UploadState::Uploading;
        drop(state);

        ui.set_upload_enabled(false);
        Some(UploadingGuard {
            state: &self.state,
            ui,
        })
    }

    pub async fn upload<S>(
        &self,
        store: &S,
        ui: &dyn Ui,
        renderer: &ListRenderer,
        selection: Vec<SelectedFile>,
    ) -> UploadOutcome
    where
        S: FileStore + ?Sized,
    {
        if selection.is_empty() {
            ui.prompt(EMPTY_SELECTION_PROMPT);
            return UploadOutcome::EmptySelection;
        }

        let Some(_guard) = self.begin(ui) else {
            warn!("upload: ignored, another upload is still running");
            return UploadOutcome::Busy;
        };

        let total = selection.len();
        let mut stored = Vec::with_capacity(total);
        for file in selection {
            let name = file.name().to_string();
            match store_one(store, file).await {
                Ok(id) => {
                    info!("upload: stored {} as id {} ({}/{})", name, id, stored.len() + 1, total);
                    stored.push(id);
                }
                Err(e) => {
                    let error = e.to_string();
                    warn!("upload: stopped at {} after {} of {} file(s): {}", name, stored.len(), total, error);
                    ui.alert(&format!("Upload failed: {}", error));
                    return UploadOutcome::Failed { stored, error };
                }
            }
        }

        ui.clear_selection();
        if let Err(e) = renderer.refresh(store, ui).await {
            ui.alert(&format!("Failed to refresh file list: {}", e));
        }
        UploadOutcome::Stored(stored)
    }
}

async fn store_one<S>(store: &S, file: SelectedFile) -> Result<i64, UploadError>
where
    S: FileStore + ?Sized,
{
    let incoming = file.load().await?;
    Ok(store.add_file_entry(incoming).await?)
}
