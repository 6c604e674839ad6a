//! Recursive discovery of CSV inputs.

use std::path::{Path, PathBuf};

use tracing::{info, warn};
use walkdir::WalkDir;

fn is_csv(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("csv")
}

/// Recursively collects every `.csv` file under `root`, in traversal order.
///
/// Unreadable directory entries are logged and skipped.
pub fn find_csv_files(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Skipping unreadable directory entry");
                continue;
            }
        };
        if entry.file_type().is_file() && is_csv(entry.path()) {
            files.push(entry.into_path());
        }
    }
    files
}

/// Logs the directory tree under `root`, listing only CSV files.
pub fn log_directory_structure(root: &Path) {
    info!(root = %root.display(), "Data directory structure");
    for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
        let indent = "  ".repeat(entry.depth());
        let name = entry.file_name().to_string_lossy();
        if entry.file_type().is_dir() {
            info!("{indent}{name}/");
        } else if is_csv(entry.path()) {
            info!("{indent}{name}");
        }
    }
}
