use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

/// One console line
#[derive(Parser, Debug)]
#[command(
    name = "blobshelf",
    about = "Keep files in a local database",
    no_binary_name = true,
    disable_version_flag = true
)]
struct Line {
    #[command(subcommand)]
    command: ConsoleCommand,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum DebugCommand {
    /// Store a file without refreshing the list
    Add { path: PathBuf },
    /// Print all records as JSON
    List,
    /// Print one record, payload as base64
    Get { id: i64 },
    /// Delete a record without asking
    Delete { id: i64 },
    /// Delete every record without asking
    Clear,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Store one or more files
    Upload { paths: Vec<PathBuf> },
    /// Redraw the file list
    #[command(alias = "refresh")]
    List,
    /// Delete every stored file (asks first)
    #[command(name = "clear")]
    ClearAll,
    /// Save a stored file into the download directory
    Download { id: i64 },
    /// Delete a listed file (asks first)
    Delete { id: i64 },
    /// Raw store operations
    Debug {
        #[command(subcommand)]
        op: DebugCommand,
    },
    /// Leave
    #[command(alias = "exit")]
    Quit,
}

/// Split a command line on whitespace, keeping double-quoted runs together.
pub fn split_args(line: &str) -> Result<Vec<String>, String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;

    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    args.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }

    if in_quotes {
        return Err("Unterminated quote".to_string());
    }
    if has_token {
        args.push(current);
    }
    Ok(args)
}

/// Parse one console line. Blank lines give `Ok(None)`.
///
/// `help` and `--help` come back as an error of kind `DisplayHelp`; check
/// `use_stderr()` to tell them apart from real mistakes.
pub fn parse_line(line: &str) -> Result<Option<ConsoleCommand>, clap::Error> {
    let args = split_args(line)
        .map_err(|message| Line::command().error(ErrorKind::InvalidValue, message))?;
    if args.is_empty() {
        return Ok(None);
    }
    Line::try_parse_from(args).map(|parsed| Some(parsed.command))
}
