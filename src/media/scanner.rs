use std::path::{Path, PathBuf};
use std::time::Instant;

use walkdir::WalkDir;

use crate::media::library::Playlist;
use crate::media::mime::is_supported;

/// Walk `root` recursively and return every supported audio file, ordered by
/// base name (case-insensitive, ascending).
///
/// A missing root yields an empty playlist, not an error. Symlinks are not
/// followed into directories; a symlink that resolves to a regular file is kept.
/// Unreadable entries log a warning and are skipped.
pub fn scan(root: &Path) -> Playlist {
    let start = Instant::now();

    if !root.is_dir() {
        tracing::warn!("Library root does not exist, nothing to index: {}", root.display());
        return Playlist::default();
    }

    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        match entry {
            Err(e) => {
                tracing::warn!("Cannot access entry: {}", e);
            }
            Ok(entry) => {
                let path = entry.path();
                // is_file() follows the link, so file symlinks pass and directory symlinks do not
                if path.is_file() && is_supported(path) {
                    paths.push(absolute(path));
                }
            }
        }
    }

    sort_by_file_name(&mut paths);

    tracing::info!(
        "Indexed {} audio files under {} in {:.1}s",
        paths.len(),
        root.display(),
        start.elapsed().as_secs_f64()
    );

    Playlist::new(paths)
}

/// Case-insensitive base-name order. Ties fall back to the full path so the
/// order is stable across runs.
pub fn sort_by_file_name(paths: &mut [PathBuf]) {
    paths.sort_by_cached_key(|p| {
        let name = p
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        (name, p.clone())
    });
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
