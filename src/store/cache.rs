use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::media::cover::FallbackCover;
use crate::media::library::TrackMetadata;
use crate::media::metadata::{encode_cover, extract_record, TagReader};
use crate::store::persist::{read_json, write_json, StoreError};

type Entries = BTreeMap<String, TrackMetadata>;

/// Persistent map from canonical path to [`TrackMetadata`].
///
/// A hit never touches the audio file. A miss runs tag extraction, stores the
/// record and rewrites the cache file. Entries for files that have since
/// disappeared from the library are kept.
///
/// Extraction runs outside the lock; insert-then-persist runs under it, so two
/// callers can never interleave writes to the cache file.
pub struct MetadataCache {
    path: PathBuf,
    entries: Mutex<Entries>,
    reader: Arc<dyn TagReader>,
    fallback: FallbackCover,
}

impl MetadataCache {
    /// Open the cache file at `path`. A missing file starts an empty cache; a
    /// corrupt one is logged and replaced on the next write.
    pub fn open(path: impl Into<PathBuf>, reader: Arc<dyn TagReader>, fallback: FallbackCover) -> Self {
        let path = path.into();
        let entries = match read_json::<Entries>(&path) {
            Ok(Some(entries)) => {
                tracing::debug!("Loaded {} cached tracks from {}", entries.len(), path.display());
                entries
            }
            Ok(None) => Entries::new(),
            Err(e) => {
                tracing::warn!("Ignoring unreadable metadata cache: {}", e);
                Entries::new()
            }
        };

        Self {
            path,
            entries: Mutex::new(entries),
            reader,
            fallback,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Cached record for `path`, without extracting on a miss.
    pub fn get(&self, path: &Path) -> Option<TrackMetadata> {
        self.lock().get(&cache_key(path)).cloned()
    }

    /// Cached record for `path`, extracting and persisting it on a miss.
    /// Extraction failures yield a placeholder record, never an error.
    pub fn get_or_extract(&self, path: &Path) -> TrackMetadata {
        let key = cache_key(path);
        if let Some(hit) = self.lock().get(&key) {
            return hit.clone();
        }

        let record = extract_record(self.reader.as_ref(), Path::new(&key));

        let mut entries = self.lock();
        // Another caller may have filled the entry while we were extracting; keep theirs.
        let stored = entries.entry(key).or_insert(record).clone();
        self.flush(&entries);
        stored
    }

    /// Startup bulk pass: extract every path not yet cached and persist once at
    /// the end instead of after every insertion. Returns the number of new entries.
    pub fn populate<'a>(&self, paths: impl IntoIterator<Item = &'a Path>) -> usize {
        let missing: Vec<String> = {
            let entries = self.lock();
            paths
                .into_iter()
                .map(cache_key)
                .filter(|k| !entries.contains_key(k))
                .collect()
        };
        if missing.is_empty() {
            return 0;
        }

        let records: Vec<(String, TrackMetadata)> = missing
            .into_iter()
            .map(|key| {
                let record = extract_record(self.reader.as_ref(), Path::new(&key));
                (key, record)
            })
            .collect();

        let mut entries = self.lock();
        let mut added = 0usize;
        for (key, record) in records {
            if !entries.contains_key(&key) {
                entries.insert(key, record);
                added += 1;
            }
        }
        self.flush(&entries);
        tracing::info!("Cached metadata for {} new tracks", added);
        added
    }

    /// Return `meta` with its cover populated.
    ///
    /// A record that already has a cover is returned as is. Otherwise the file's
    /// embedded artwork is read; on success it is stored in the cache and
    /// persisted. When the file has no artwork or cannot be read, the fallback
    /// image is returned but not cached, so the next call retries.
    pub fn fetch_cover(&self, mut meta: TrackMetadata) -> TrackMetadata {
        if meta.cover.is_some() {
            return meta;
        }

        let path = PathBuf::from(&meta.full_path);
        match self.reader.read_cover(&path) {
            Ok(Some(art)) => {
                meta.cover = Some(encode_cover(&art.data));
                meta.cover_mime = Some(art.mime.to_string());

                let mut entries = self.lock();
                match entries.get_mut(&meta.full_path) {
                    Some(cached) => {
                        cached.cover.clone_from(&meta.cover);
                        cached.cover_mime.clone_from(&meta.cover_mime);
                    }
                    None => {
                        entries.insert(meta.full_path.clone(), meta.clone());
                    }
                }
                self.flush(&entries);
            }
            Ok(None) => {
                tracing::debug!("No embedded cover in {}", path.display());
                self.fallback.apply(&mut meta);
            }
            Err(e) => {
                tracing::warn!("Cover extraction failed, using fallback: {}", e);
                self.fallback.apply(&mut meta);
            }
        }
        meta
    }

    /// Write the whole cache to disk.
    pub fn persist(&self) -> Result<(), StoreError> {
        let entries = self.lock();
        write_json(&self.path, &*entries, false)
    }

    fn flush(&self, entries: &Entries) {
        if let Err(e) = write_json(&self.path, entries, false) {
            tracing::error!("Failed to persist metadata cache, keeping in-memory state: {}", e);
        }
    }

    fn lock(&self) -> MutexGuard<'_, Entries> {
        // Entries are only ever inserted or have single fields replaced, so a
        // poisoned map is still consistent.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Canonical form of `path` as a string. Paths that cannot be canonicalized
/// (missing files) fall back to their absolute form.
pub fn cache_key(path: &Path) -> String {
    std::fs::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
        .to_string_lossy()
        .into_owned()
}
