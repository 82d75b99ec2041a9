//! Controllers behind the file shelf UI.
//!
//! - `upload`: stores a selection of files one at a time
//! - `listing`: reads all records and builds the rendered list
//! - `actions`: per-row download/delete, and clear-all
//! - `temp_ref`: temporary payload copies handed out for saving

mod actions;
mod listing;
mod selection;
mod temp_ref;
mod upload;

pub use actions::{
    clear_all, delete_question, ClearOutcome, DeleteOutcome, DownloadOutcome, RowActions,
    CLEAR_ALL_QUESTION,
};
pub use listing::{
    build_view, format_timestamp, human_size, sort_newest_first, FileRow, ListRenderer, ListView,
    EMPTY_PLACEHOLDER,
};
pub use selection::{detect_mime_type, SelectedFile};
pub use temp_ref::{TempRef, TempRefs};
pub use upload::{UploadController, UploadOutcome, UploadState, EMPTY_SELECTION_PROMPT};
