//! Interactive database picker.
//!
//! This is intentionally kept separate from clap parsing:
//! - clap handles structured flags/subcommands
//! - the picker provides the "run `pulse` and choose a database" UX
//!
//! The picker searches for `*.db` / `*.sqlite` files under the current
//! working directory.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::AppError;

/// Default directory recursion depth for finding database files.
const DEFAULT_SEARCH_DEPTH: usize = 4;

const DB_EXTENSIONS: [&str; 3] = ["db", "sqlite", "sqlite3"];

/// Prompt the user to select a database file from the current directory tree.
///
/// Behavior:
/// - list discovered database files
/// - accept either a number (from the list) or an explicit path
/// - `q` cancels
pub fn prompt_for_db_path() -> Result<PathBuf, AppError> {
    let files = discover_db_files();
    if files.is_empty() {
        return Err(AppError::usage(
            "No database files found. Provide one with `--db <file.db>` or run `pulse seed`.",
        ));
    }

    println!("Found {} database file(s):", files.len());
    for (idx, path) in files.iter().enumerate() {
        println!("{:>3}) {}", idx + 1, pretty_path(path));
    }

    loop {
        print!(
            "Select a file by number (1-{}) or type a path (q to quit): ",
            files.len()
        );
        io::stdout()
            .flush()
            .map_err(|e| AppError::usage(format!("Failed to write prompt: {e}")))?;

        let mut input = String::new();
        let bytes = io::stdin()
            .read_line(&mut input)
            .map_err(|e| AppError::usage(format!("Failed to read input: {e}")))?;

        if bytes == 0 {
            return Err(AppError::usage(
                "No input received. Provide a database with `--db <file.db>`.",
            ));
        }

        let input = input.trim();
        if input.eq_ignore_ascii_case("q") {
            return Err(AppError::usage("Canceled."));
        }

        if let Ok(n) = input.parse::<usize>() {
            if (1..=files.len()).contains(&n) {
                return Ok(files[n - 1].clone());
            }
            println!("Out of range.");
            continue;
        }

        let path = PathBuf::from(input);
        if path.is_file() {
            return Ok(path);
        }
        println!("Not a file: {}", path.display());
    }
}

/// Find database files under the current directory, sorted for stable output.
fn discover_db_files() -> Vec<PathBuf> {
    let mut out = Vec::new();
    let root = PathBuf::from(".");
    walk(&root, 0, &mut out);
    out.sort();
    out
}

fn walk(dir: &Path, depth: usize, out: &mut Vec<PathBuf>) {
    if depth > DEFAULT_SEARCH_DEPTH {
        return;
    }
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            // Skip hidden directories and build output.
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with('.') || name == "target" {
                continue;
            }
            walk(&path, depth + 1, out);
        } else if is_db_file(&path) {
            out.push(path);
        }
    }
}

fn is_db_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| DB_EXTENSIONS.iter().any(|x| e.eq_ignore_ascii_case(x)))
        .unwrap_or(false)
}

fn pretty_path(path: &Path) -> String {
    path.strip_prefix(".")
        .unwrap_or(path)
        .display()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_database_extensions() {
        assert!(is_db_file(Path::new("sales_database.db")));
        assert!(is_db_file(Path::new("data/archive.SQLITE")));
        assert!(is_db_file(Path::new("x.sqlite3")));
        assert!(!is_db_file(Path::new("notes.txt")));
        assert!(!is_db_file(Path::new("no_extension")));
    }
}
