//! Test doubles shared by the controller and dispatch tests.

use async_trait::async_trait;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::db::{Database, FileRecord, IncomingFile};
use crate::error::{StorageError, StorageResult};
use crate::shelf::{ListView, TempRef};
use crate::store::FileStore;
use crate::ui::Ui;

#[derive(Debug, Clone, PartialEq)]
pub enum UiCall {
    Alert(String),
    Prompt(String),
    Confirm(String),
    Render(ListView),
    SetUploadEnabled(bool),
    ClearSelection,
    SaveAs(String),
}

/// Records every call and answers confirmations with a fixed reply.
pub struct RecordingUi {
    calls: Mutex<Vec<UiCall>>,
    saved: Mutex<Vec<(String, Vec<u8>)>>,
    confirm_reply: bool,
    save_dir: tempfile::TempDir,
}

impl RecordingUi {
    pub fn new() -> Self {
        Self::with_reply(true)
    }

    pub fn declining() -> Self {
        Self::with_reply(false)
    }

    fn with_reply(confirm_reply: bool) -> Self {
        RecordingUi {
            calls: Mutex::new(Vec::new()),
            saved: Mutex::new(Vec::new()),
            confirm_reply,
            save_dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn calls(&self) -> Vec<UiCall> {
        self.calls.lock().unwrap().clone()
    }

    /// (suggested name, saved bytes) for every save-as
    pub fn saved(&self) -> Vec<(String, Vec<u8>)> {
        self.saved.lock().unwrap().clone()
    }

    pub fn last_rendered(&self) -> Option<ListView> {
        self.calls().into_iter().rev().find_map(|call| match call {
            UiCall::Render(view) => Some(view),
            _ => None,
        })
    }

    fn push(&self, call: UiCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl Ui for RecordingUi {
    fn alert(&self, message: &str) {
        self.push(UiCall::Alert(message.to_string()));
    }

    fn prompt(&self, message: &str) {
        self.push(UiCall::Prompt(message.to_string()));
    }

    fn confirm(&self, message: &str) -> bool {
        self.push(UiCall::Confirm(message.to_string()));
        self.confirm_reply
    }

    fn render(&self, view: &ListView) {
        self.push(UiCall::Render(view.clone()));
    }

    fn set_upload_enabled(&self, enabled: bool) {
        self.push(UiCall::SetUploadEnabled(enabled));
    }

    fn clear_selection(&self) {
        self.push(UiCall::ClearSelection);
    }

    fn save_as(&self, suggested_name: &str, payload: &TempRef) -> io::Result<PathBuf> {
        self.push(UiCall::SaveAs(suggested_name.to_string()));
        let bytes = std::fs::read(payload.path())?;
        let count = self.saved.lock().unwrap().len();
        let target = self.save_dir.path().join(format!("{}-{}", count, suggested_name));
        std::fs::write(&target, &bytes)?;
        self.saved
            .lock()
            .unwrap()
            .push((suggested_name.to_string(), bytes));
        Ok(target)
    }
}

/// Wraps an in-memory database and injects failures.
pub struct FlakyStore {
    inner: Database,
    adds: AtomicUsize,
    fail_on_add: Option<usize>,
    fail_reads: bool,
}

impl FlakyStore {
    /// The `n`th add (1-based) fails with a write error.
    pub fn failing_on_add(n: usize) -> Self {
        FlakyStore {
            inner: Database::in_memory(),
            adds: AtomicUsize::new(0),
            fail_on_add: Some(n),
            fail_reads: false,
        }
    }

    pub fn failing_reads() -> Self {
        FlakyStore {
            inner: Database::in_memory(),
            adds: AtomicUsize::new(0),
            fail_on_add: None,
            fail_reads: true,
        }
    }

    pub fn inner(&self) -> &Database {
        &self.inner
    }

    fn check_read(&self) -> StorageResult<()> {
        if self.fail_reads {
            Err(StorageError::Read("io error".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl FileStore for FlakyStore {
    async fn add_file_entry(&self, file: IncomingFile) -> StorageResult<i64> {
        let n = self.adds.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on_add == Some(n) {
            return Err(StorageError::Write("disk full".to_string()));
        }
        self.inner.add_file_entry(file).await
    }

    async fn list_all_files(&self) -> StorageResult<Vec<FileRecord>> {
        self.check_read()?;
        self.inner.list_all_files().await
    }

    async fn get_file_by_id(&self, id: i64) -> StorageResult<Option<FileRecord>> {
        self.check_read()?;
        self.inner.get_file_by_id(id).await
    }

    async fn delete_file_by_id(&self, id: i64) -> StorageResult<()> {
        self.inner.delete_file_by_id(id).await
    }

    async fn clear_all(&self) -> StorageResult<()> {
        self.inner.clear_all().await
    }
}
