//! Line-oriented terminal front end.

use log::{debug, info};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::commands::{parse_line, App, ConsoleCommand, DebugCommand, UiEvent};
use crate::shelf::{FileRow, ListView, SelectedFile, TempRef, EMPTY_PLACEHOLDER};
use crate::store::FileStore;

use super::Ui;

type Input = Box<dyn BufRead + Send>;
type Output = Box<dyn Write + Send>;

pub struct ConsoleUi {
    input: Mutex<Input>,
    output: Mutex<Output>,
    download_dir: PathBuf,
    rows: Mutex<Vec<FileRow>>,
    upload_enabled: AtomicBool,
}

impl ConsoleUi {
    pub fn new(input: Input, output: Output, download_dir: impl Into<PathBuf>) -> Self {
        ConsoleUi {
            input: Mutex::new(input),
            output: Mutex::new(output),
            download_dir: download_dir.into(),
            rows: Mutex::new(Vec::new()),
            upload_enabled: AtomicBool::new(true),
        }
    }

    pub fn stdio(download_dir: impl Into<PathBuf>) -> Self {
        ConsoleUi::new(
            Box::new(io::BufReader::new(io::stdin())),
            Box::new(io::stdout()),
            download_dir,
        )
    }

    pub fn upload_enabled(&self) -> bool {
        self.upload_enabled.load(Ordering::SeqCst)
    }

    /// Name of a row from the last rendered list
    pub fn row_name(&self, id: i64) -> Option<String> {
        self.rows
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .find(|r| r.id == id)
            .map(|r| r.name.clone())
    }

    /// Next input line without its line ending, `None` at end of input.
    pub fn read_line(&self) -> io::Result<Option<String>> {
        let mut line = String::new();
        let read = self
            .input
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .read_line(&mut line)?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    pub fn print(&self, text: &str) {
        let mut out = self.output.lock().unwrap_or_else(|e| e.into_inner());
        // Nowhere left to report a failed console write
        let _ = writeln!(out, "{}", text);
        let _ = out.flush();
    }

    fn print_inline(&self, text: &str) {
        let mut out = self.output.lock().unwrap_or_else(|e| e.into_inner());
        let _ = write!(out, "{}", text);
        let _ = out.flush();
    }
}

/// Pick `dir/name`, or `dir/stem (n).ext` if that is taken.
pub fn unique_target(dir: &Path, name: &str) -> PathBuf {
    let candidate = dir.join(name);
    if !candidate.exists() {
        return candidate;
    }

    let requested = Path::new(name);
    let stem = requested
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.to_string());
    let extension = requested
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut n = 1;
    loop {
        let candidate = dir.join(format!("{} ({}){}", stem, n, extension));
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}

/// Strip directory components so a stored name cannot escape the download dir.
fn safe_file_name(name: &str) -> String {
    Path::new(name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "download".to_string())
}

fn format_rows(rows: &[FileRow]) -> Vec<String> {
    let name_width = rows
        .iter()
        .map(|r| r.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Name".len());
    let id_width = rows
        .iter()
        .map(|r| r.id.to_string().len())
        .max()
        .unwrap_or(0)
        .max("Id".len());

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(format!(
        "{:>iw$}  {:<nw$}  {:>10}  {}",
        "Id",
        "Name",
        "Size",
        "Added",
        iw = id_width,
        nw = name_width
    ));
    for row in rows {
        lines.push(format!(
            "{:>iw$}  {:<nw$}  {:>10}  {}",
            row.id,
            row.name,
            row.size_label,
            row.added_label,
            iw = id_width,
            nw = name_width
        ));
    }
    lines
}

impl Ui for ConsoleUi {
    fn alert(&self, message: &str) {
        self.print(&format!("! {}", message));
    }

    fn prompt(&self, message: &str) {
        self.print(message);
    }

    fn confirm(&self, message: &str) -> bool {
        self.print_inline(&format!("{} [y/N] ", message));
        match self.read_line() {
            Ok(Some(answer)) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            _ => false,
        }
    }

    fn render(&self, view: &ListView) {
        *self.rows.lock().unwrap_or_else(|e| e.into_inner()) = view.rows().to_vec();

        match view {
            ListView::Empty => self.print(EMPTY_PLACEHOLDER),
            ListView::Rows { rows, summary } => {
                for line in format_rows(rows) {
                    self.print(&line);
                }
                self.print(summary);
            }
        }
    }

    fn set_upload_enabled(&self, enabled: bool) {
        self.upload_enabled.store(enabled, Ordering::SeqCst);
        debug!("upload trigger {}", if enabled { "enabled" } else { "disabled" });
    }

    fn clear_selection(&self) {
        debug!("file selection cleared");
    }

    fn save_as(&self, suggested_name: &str, payload: &TempRef) -> io::Result<PathBuf> {
        std::fs::create_dir_all(&self.download_dir)?;
        let target = unique_target(&self.download_dir, &safe_file_name(suggested_name));
        std::fs::copy(payload.path(), &target)?;
        self.print(&format!("Saved {} to {}", suggested_name, target.display()));
        Ok(target)
    }
}

/// Read commands from the console until `quit` or end of input.
pub async fn run_session<S: FileStore>(app: &App<S>, console: &ConsoleUi) -> io::Result<()> {
    console.print("blobshelf - type `help` for commands");
    app.dispatch(UiEvent::Refresh).await;

    loop {
        console.print_inline("> ");
        let Some(line) = console.read_line()? else {
            break;
        };

        let command = match parse_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                let message = e.to_string();
                if e.use_stderr() {
                    console.alert(message.trim_end());
                } else {
                    console.print(message.trim_end());
                }
                continue;
            }
        };

        match command {
            ConsoleCommand::Quit => break,
            ConsoleCommand::Upload { paths } => {
                let selection = paths.into_iter().map(SelectedFile::from_path).collect();
                app.dispatch(UiEvent::Upload(selection)).await;
            }
            ConsoleCommand::List => {
                app.dispatch(UiEvent::Refresh).await;
            }
            ConsoleCommand::ClearAll => {
                app.dispatch(UiEvent::ClearAll).await;
            }
            ConsoleCommand::Download { id } => {
                app.dispatch(UiEvent::Download { id }).await;
            }
            ConsoleCommand::Delete { id } => match console.row_name(id) {
                Some(name) => {
                    app.dispatch(UiEvent::Delete { id, name }).await;
                }
                None => console.alert(&format!(
                    "No file with id {} in the current list. Run `list` to refresh.",
                    id
                )),
            },
            ConsoleCommand::Debug { op } => run_debug(app, console, op).await,
        }
    }

    info!("Console session ended");
    Ok(())
}

async fn run_debug<S: FileStore>(app: &App<S>, console: &ConsoleUi, op: DebugCommand) {
    let api = app.debug();
    let result = match op {
        DebugCommand::Add { path } => api
            .add(SelectedFile::from_path(path))
            .await
            .map_err(|e| e.to_string()),
        DebugCommand::List => api.list().await.map_err(|e| e.to_string()),
        DebugCommand::Get { id } => api.get(id).await.map_err(|e| e.to_string()),
        DebugCommand::Delete { id } => api.delete(id).await.map_err(|e| e.to_string()),
        DebugCommand::Clear => api.clear().await.map_err(|e| e.to_string()),
    };

    match result.and_then(|value| serde_json::to_string_pretty(&value).map_err(|e| e.to_string())) {
        Ok(json) => console.print(&json),
        Err(message) => console.alert(&message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::shelf::TempRefs;
    use std::io::Cursor;
    use std::sync::Arc;
    use std::time::Duration;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl SharedBuf {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn console(script: &str, download_dir: &Path) -> (Arc<ConsoleUi>, SharedBuf) {
        let out = SharedBuf::default();
        let ui = ConsoleUi::new(
            Box::new(Cursor::new(script.as_bytes().to_vec())),
            Box::new(out.clone()),
            download_dir,
        );
        (Arc::new(ui), out)
    }

    #[test]
    fn unique_target_avoids_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(unique_target(dir.path(), "a.txt"), dir.path().join("a.txt"));

        std::fs::write(dir.path().join("a.txt"), b"1").unwrap();
        std::fs::write(dir.path().join("a (1).txt"), b"2").unwrap();
        assert_eq!(unique_target(dir.path(), "a.txt"), dir.path().join("a (2).txt"));

        std::fs::write(dir.path().join("README"), b"3").unwrap();
        assert_eq!(unique_target(dir.path(), "README"), dir.path().join("README (1)"));
    }

    #[test]
    fn stored_names_cannot_escape_download_dir() {
        assert_eq!(safe_file_name("../../etc/passwd"), "passwd");
        assert_eq!(safe_file_name(".."), "download");
    }

    #[test]
    fn confirm_accepts_only_yes() {
        let dir = tempfile::tempdir().unwrap();
        let (ui, out) = console("y\nno\n\nYES\n", dir.path());

        assert!(ui.confirm("Delete?"));
        assert!(!ui.confirm("Delete?"));
        assert!(!ui.confirm("Delete?"));
        assert!(ui.confirm("Delete?"));
        // End of input declines
        assert!(!ui.confirm("Delete?"));
        assert!(out.text().contains("Delete? [y/N]"));
    }

    #[test]
    fn empty_view_prints_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let (ui, out) = console("", dir.path());

        ui.render(&ListView::Empty);
        assert!(out.text().contains(EMPTY_PLACEHOLDER));
        assert_eq!(ui.row_name(1), None);
    }

    #[tokio::test]
    async fn scripted_session_uploads_lists_downloads_and_deletes() {
        let work = tempfile::tempdir().unwrap();
        let source = work.path().join("a.txt");
        std::fs::write(&source, b"0123456789").unwrap();
        let downloads = work.path().join("downloads");

        let script = format!(
            "upload \"{}\"\ndownload 1\ndelete 1\ny\ndelete 1\nbogus\nhelp\nquit\n",
            source.display()
        );
        let (ui, out) = console(&script, &downloads);
        let app = App::new(
            Arc::new(Database::in_memory()),
            ui.clone(),
            TempRefs::new(Duration::from_millis(10)),
        );

        run_session(&app, &ui).await.unwrap();

        let text = out.text();
        assert!(text.contains(EMPTY_PLACEHOLDER));
        assert!(text.contains("a.txt"));
        assert!(text.contains("10 B"));
        assert!(text.contains("Delete \"a.txt\"? [y/N]"));
        assert!(text.contains("No file with id 1 in the current list"));
        assert!(text.contains("unrecognized subcommand 'bogus'"));
        assert!(text.contains("Save a stored file into the download directory"));
        assert_eq!(std::fs::read(downloads.join("a.txt")).unwrap(), b"0123456789");
        assert!(app.store().list_all_files().await.unwrap().is_empty());
        assert!(ui.upload_enabled());
    }

    #[tokio::test]
    async fn empty_upload_command_prompts() {
        let dir = tempfile::tempdir().unwrap();
        let (ui, out) = console("upload\n", dir.path());
        let app = App::new(
            Arc::new(Database::in_memory()),
            ui.clone(),
            TempRefs::new(Duration::from_millis(10)),
        );

        run_session(&app, &ui).await.unwrap();

        assert!(out.text().contains(crate::shelf::EMPTY_SELECTION_PROMPT));
    }

    #[tokio::test]
    async fn debug_commands_print_json() {
        let work = tempfile::tempdir().unwrap();
        let source = work.path().join("hi.txt");
        std::fs::write(&source, b"hi").unwrap();

        let script = format!("debug add \"{}\"\ndebug get 1\ndebug clear\ndebug list\n", source.display());
        let (ui, out) = console(&script, work.path());
        let app = App::new(
            Arc::new(Database::in_memory()),
            ui.clone(),
            TempRefs::new(Duration::from_millis(10)),
        );

        run_session(&app, &ui).await.unwrap();

        let text = out.text();
        assert!(text.contains("\"id\": 1"));
        assert!(text.contains("\"base64\": \"aGk=\""));
        assert!(text.contains("\"cleared\": true"));
        assert!(text.contains("[]"));
    }
}
