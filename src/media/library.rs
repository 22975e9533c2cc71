use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Metadata for one indexed audio file, as cached on disk and returned over RPC.
///
/// Every musical field is optional: extraction may fail for any given file, and a
/// failed extraction still yields a record with `full_path`, `filename`, `filesize`
/// and a title taken from the file stem.
/// `cover` stays `None` until the cover pass has run for this track.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackMetadata {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub album_artist: Option<String>,
    pub disc: Option<u32>,
    pub disc_total: Option<u32>,
    pub track: Option<u32>,
    pub track_total: Option<u32>,
    pub genre: Option<String>,
    pub year: Option<u32>,
    /// Seconds.
    pub duration: Option<f64>,
    /// Declared by the filename extension, never sniffed.
    pub mime_type: Option<String>,
    /// Canonical absolute path; also the cache key.
    pub full_path: String,
    /// Base name of the indexed path.
    pub filename: String,
    pub filesize: Option<u64>,
    /// kbps.
    pub bitrate: Option<u32>,
    pub sample_rate: Option<u32>,
    pub channel_count: Option<u8>,
    pub bit_depth: Option<u8>,
    /// Base64 (standard alphabet) image bytes.
    pub cover: Option<String>,
    pub cover_mime: Option<String>,
}

impl TrackMetadata {
    /// A record carrying only the file identity, used when tag extraction fails.
    pub fn placeholder(canonical: &Path) -> Self {
        Self {
            full_path: canonical.to_string_lossy().into_owned(),
            filename: file_name_of(canonical),
            ..Self::default()
        }
    }
}

/// Base name of `path` as an owned string (lossy for non-UTF-8 names).
pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// `path` relative to `root`, joined with `/`. This is the name a track is
/// served under and remembered by; paths outside `root` fall back to the base name.
pub fn relative_name(root: &Path, path: &Path) -> String {
    let Ok(rel) = path.strip_prefix(root) else {
        return file_name_of(path);
    };
    let segments: Vec<_> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy()),
            _ => None,
        })
        .collect();
    if segments.is_empty() {
        return file_name_of(path);
    }
    segments.join("/")
}

/// Filename stem, used as the title when a file has no title tag.
pub fn title_fallback(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name_of(path))
}

/// Ordered track paths built once at startup. Index `i` is the RPC handle for a
/// track for the lifetime of the process.
#[derive(Debug, Clone, Default)]
pub struct Playlist {
    paths: Vec<PathBuf>,
}

impl Playlist {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Bounds-checked lookup taking the signed index the RPC layer receives.
    pub fn get(&self, index: i64) -> Option<&Path> {
        let index = usize::try_from(index).ok()?;
        self.paths.get(index).map(PathBuf::as_path)
    }

    /// Position of the first track whose base name equals `filename`.
    pub fn position_of(&self, filename: &str) -> Option<usize> {
        self.paths
            .iter()
            .position(|p| p.file_name().is_some_and(|n| n == filename))
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter().map(PathBuf::as_path)
    }
}
