//! Maps named UI events onto the controllers.
//!
//! - `debug`: direct access to the store for manual poking
//! - `parse`: turns console lines into commands

mod debug;
mod parse;

pub use debug::DebugApi;
pub use parse::{parse_line, split_args, ConsoleCommand, DebugCommand};

use log::debug;
use std::sync::Arc;

use crate::shelf::{
    clear_all, ClearOutcome, DeleteOutcome, DownloadOutcome, ListRenderer, ListView, RowActions,
    SelectedFile, TempRefs, UploadController, UploadOutcome,
};
use crate::store::FileStore;
use crate::ui::Ui;

#[derive(Debug)]
pub enum UiEvent {
    Upload(Vec<SelectedFile>),
    Refresh,
    ClearAll,
    Download { id: i64 },
    Delete { id: i64, name: String },
}

impl UiEvent {
    fn label(&self) -> &'static str {
        match self {
            UiEvent::Upload(_) => "upload",
            UiEvent::Refresh => "refresh",
            UiEvent::ClearAll => "clear_all",
            UiEvent::Download { .. } => "download",
            UiEvent::Delete { .. } => "delete",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventOutcome {
    Upload(UploadOutcome),
    /// `None` when the list could not be read
    Refresh(Option<ListView>),
    Clear(ClearOutcome),
    Download(DownloadOutcome),
    Delete(DeleteOutcome),
}

/// The file shelf wired to one store and one UI.
pub struct App<S: FileStore> {
    store: Arc<S>,
    ui: Arc<dyn Ui>,
    upload: UploadController,
    renderer: ListRenderer,
    rows: RowActions,
}

impl<S: FileStore> App<S> {
    pub fn new(store: Arc<S>, ui: Arc<dyn Ui>, temp_refs: TempRefs) -> Self {
        App {
            store,
            ui,
            upload: UploadController::new(),
            renderer: ListRenderer,
            rows: RowActions::new(temp_refs),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn debug(&self) -> DebugApi<'_, S> {
        DebugApi::new(self.store.as_ref())
    }

    pub async fn dispatch(&self, event: UiEvent) -> EventOutcome {
        debug!("dispatch: {}", event.label());
        let ui = self.ui.as_ref();
        let store = self.store.as_ref();

        match event {
            UiEvent::Upload(selection) => EventOutcome::Upload(
                self.upload
                    .upload(store, ui, &self.renderer, selection)
                    .await,
            ),
            UiEvent::Refresh => match self.renderer.refresh(store, ui).await {
                Ok(view) => EventOutcome::Refresh(Some(view)),
                Err(e) => {
                    ui.alert(&format!("Failed to load files: {}", e));
                    EventOutcome::Refresh(None)
                }
            },
            UiEvent::ClearAll => EventOutcome::Clear(clear_all(store, ui, &self.renderer).await),
            UiEvent::Download { id } => EventOutcome::Download(self.rows.download(store, ui, id).await),
            UiEvent::Delete { id, name } => EventOutcome::Delete(
                self.rows
                    .delete(store, ui, &self.renderer, id, &name)
                    .await,
            ),
        }
    }
}
