use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::LibrarySettings;

use super::blob::{FileBlob, is_accepted, media_type_for};

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

fn walk_dir(dir: &Path, settings: &LibrarySettings, out: &mut Vec<PathBuf>) {
    let mut walker = WalkDir::new(dir)
        .follow_links(settings.follow_links)
        .sort_by_file_name();

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
    {
        if entry.file_type().is_file() {
            out.push(entry.into_path());
        }
    }
}

/// Expand user selections into candidate file paths.
///
/// Files are taken as given, directories are walked. Anything whose media type
/// does not match `settings.accept` is dropped here, the way a file dialog
/// greys out files that don't match its filter.
pub fn collect_paths(selection: &[PathBuf], settings: &LibrarySettings) -> Vec<PathBuf> {
    let mut candidates: Vec<PathBuf> = Vec::new();

    for path in selection {
        if path.is_dir() {
            walk_dir(path, settings, &mut candidates);
        } else if path.is_file() {
            candidates.push(path.clone());
        } else {
            warn!(path = %path.display(), "selection does not exist, skipping");
        }
    }

    candidates.retain(|p| is_accepted(&media_type_for(p), &settings.accept));
    candidates
}

/// Read the selected files into memory.
pub fn select(selection: &[PathBuf], settings: &LibrarySettings) -> Vec<FileBlob> {
    collect_paths(selection, settings)
        .into_iter()
        .filter_map(|path| match FileBlob::read(&path) {
            Ok(blob) => {
                debug!(path = %path.display(), bytes = blob.len(), "file selected");
                Some(blob)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read selected file");
                None
            }
        })
        .collect()
}

/// Split a prompt line into paths. Whitespace separates entries; quote a path
/// with `"` to keep its spaces.
pub fn split_selection(line: &str) -> Vec<PathBuf> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut quoted = false;

    for c in line.chars() {
        match c {
            '"' => quoted = !quoted,
            c if c.is_whitespace() && !quoted => {
                if !current.is_empty() {
                    out.push(PathBuf::from(std::mem::take(&mut current)));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        out.push(PathBuf::from(current));
    }
    out
}
