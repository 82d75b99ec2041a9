use log::debug;
use std::io::{self, Write};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::{Builder, NamedTempFile};
use tokio::task::JoinHandle;

use crate::db::Blob;

/// Short-lived handle to a payload copied out of the store for saving.
/// The backing file is removed when the handle is dropped.
pub struct TempRef {
    file: NamedTempFile,
    mime_type: String,
    _live: LiveGuard,
}

impl TempRef {
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }
}

impl std::fmt::Debug for TempRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TempRef")
            .field("path", &self.path())
            .field("mime_type", &self.mime_type)
            .finish()
    }
}

struct LiveGuard(Arc<AtomicUsize>);

impl Drop for LiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Creates temporary references and releases them after a fixed delay.
#[derive(Debug, Clone)]
pub struct TempRefs {
    live: Arc<AtomicUsize>,
    release_delay: Duration,
}

impl TempRefs {
    pub fn new(release_delay: Duration) -> Self {
        TempRefs {
            live: Arc::new(AtomicUsize::new(0)),
            release_delay,
        }
    }

    pub fn release_delay(&self) -> Duration {
        self.release_delay
    }

    /// Number of references not yet released.
    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Copy `blob` into a fresh temporary file named after `name`'s extension.
    pub fn materialize(&self, name: &str, blob: &Blob) -> io::Result<TempRef> {
        let suffix = Path::new(name)
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();

        let mut file = Builder::new()
            .prefix("blobshelf-")
            .suffix(&suffix)
            .tempfile()?;
        file.write_all(&blob.bytes)?;
        file.flush()?;

        self.live.fetch_add(1, Ordering::SeqCst);
        Ok(TempRef {
            file,
            mime_type: blob.mime_type.clone(),
            _live: LiveGuard(self.live.clone()),
        })
    }

    /// Drop `temp` once the release delay has passed, whether or not the
    /// consumer has finished with it.
    pub fn schedule_release(&self, temp: TempRef) -> JoinHandle<()> {
        let delay = self.release_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            debug!("Released temporary reference {}", temp.path().display());
            drop(temp);
        })
    }
}
