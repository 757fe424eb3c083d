use std::path::PathBuf;

use tracing::info;

use crate::config;
use crate::library::{self, FileBlob};

/// Read the files named on the command line.
///
/// Directories are walked; anything outside `library.accept` is dropped.
pub fn initial_selection(
    args: impl IntoIterator<Item = String>,
    settings: &config::Settings,
) -> Vec<FileBlob> {
    let selection: Vec<PathBuf> = args.into_iter().map(PathBuf::from).collect();
    if selection.is_empty() {
        return Vec::new();
    }

    let files = library::select(&selection, &settings.library);
    info!(
        requested = selection.len(),
        accepted = files.len(),
        "initial selection read"
    );
    files
}
