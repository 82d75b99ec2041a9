//! User-facing surface the controllers talk to.
//!
//! Controllers never print or read input themselves; they go through [`Ui`]
//! so they can run against the console front end or a test recorder.

use std::io;
use std::path::PathBuf;

use crate::shelf::{ListView, TempRef};

pub mod console;

pub use console::ConsoleUi;

pub trait Ui: Send + Sync {
    /// Report a failure to the user.
    fn alert(&self, message: &str);

    /// Ask the user to do something (not an error).
    fn prompt(&self, message: &str);

    /// Yes/no question; `false` means the user declined.
    fn confirm(&self, message: &str) -> bool;

    /// Replace whatever list is currently shown with `view`.
    fn render(&self, view: &ListView);

    /// Enable or disable the upload trigger.
    fn set_upload_enabled(&self, enabled: bool);

    /// Reset the file selection control.
    fn clear_selection(&self);

    /// Offer the payload behind `payload` for saving under `suggested_name`.
    /// Returns where it was saved.
    fn save_as(&self, suggested_name: &str, payload: &TempRef) -> io::Result<PathBuf>;
}
