use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use crate::context::AppContext;
use crate::media::library::{file_name_of, relative_name, Playlist, TrackMetadata};
use crate::media::metadata::TagReader;
use crate::media::scanner;
use crate::rpc::RpcError;
use crate::store::cache::MetadataCache;
use crate::store::config::ConfigStore;

/// One row of `get_playlist`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaylistEntry {
    pub index: usize,
    #[serde(flatten)]
    pub meta: TrackMetadata,
}

/// Result of `load_track`: the track's metadata with cover populated, plus the
/// URL the player should stream from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadedTrack {
    pub index: usize,
    #[serde(flatten)]
    pub meta: TrackMetadata,
    pub url: String,
}

/// The operations the host runtime calls. Owns the config store, the metadata
/// cache and the playlist built at startup.
pub struct Backend {
    ctx: Arc<AppContext>,
    config: ConfigStore,
    cache: MetadataCache,
    playlist: Playlist,
}

impl Backend {
    /// Startup sequence: load config, index the library, fill the metadata cache.
    pub fn start(ctx: Arc<AppContext>, reader: Arc<dyn TagReader>) -> Self {
        let config = ConfigStore::load_or_create(ctx.config_path());
        let root = library_root(&ctx, &config);
        tracing::info!("Audio library: {}", root.display());

        let playlist = scanner::scan(&root);
        let cache = MetadataCache::open(ctx.cache_path(), reader, ctx.fallback_cover.clone());
        cache.populate(playlist.iter());

        Self::from_parts(ctx, config, cache, playlist)
    }

    /// Directory the range server resolves request paths against.
    pub fn library_root(&self) -> PathBuf {
        library_root(&self.ctx, &self.config)
    }

    pub fn from_parts(
        ctx: Arc<AppContext>,
        config: ConfigStore,
        cache: MetadataCache,
        playlist: Playlist,
    ) -> Self {
        Self {
            ctx,
            config,
            cache,
            playlist,
        }
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    pub fn cache(&self) -> &MetadataCache {
        &self.cache
    }

    pub fn context(&self) -> &AppContext {
        &self.ctx
    }

    /// Every indexed track in playlist order.
    pub fn get_playlist(&self) -> Vec<PlaylistEntry> {
        self.playlist
            .iter()
            .enumerate()
            .map(|(index, path)| PlaylistEntry {
                index,
                meta: as_indexed(self.cache.get_or_extract(path), path),
            })
            .collect()
    }

    /// Playlist index of the persisted `last_played` track, or 0.
    ///
    /// `last_played` holds the root-relative name; a bare base name written by
    /// hand still matches the first track with that name.
    pub fn get_initial_track(&self) -> usize {
        let Some(name) = self.config.last_played() else {
            return 0;
        };
        self.playlist
            .iter()
            .position(|path| self.track_name(path) == name)
            .or_else(|| self.playlist.position_of(&name))
            .unwrap_or(0)
    }

    /// Root-relative, `/`-separated name of an indexed track.
    pub fn track_name(&self, path: &Path) -> String {
        let root = self.library_root();
        let root = std::path::absolute(&root).unwrap_or(root);
        relative_name(&root, path)
    }

    /// Resolve `index`, make sure its cover is populated, remember it as the
    /// last played track and return it with its stream URL.
    ///
    /// An out-of-range index is rejected before anything is written.
    pub fn load_track(&self, index: i64) -> Result<LoadedTrack, RpcError> {
        let path = self.playlist.get(index).ok_or(RpcError::IndexOutOfRange {
            index,
            len: self.playlist.len(),
        })?;
        // get() succeeded, so the index is non-negative and in range
        let index = index as usize;

        tracing::info!("Loading track: {}", path.display());
        let meta = self.cache.fetch_cover(self.cache.get_or_extract(path));

        // Relative to the root, so tracks sharing a base name stay distinct.
        let name = self.track_name(path);
        self.config.set_last_played(name.clone());

        Ok(LoadedTrack {
            index,
            url: self.ctx.track_url(&name),
            meta: as_indexed(meta, path),
        })
    }

    pub fn get_volume(&self) -> f64 {
        self.config.volume()
    }

    /// Clamp into [0.0, 1.0], persist, and return the stored value.
    pub fn set_volume(&self, volume: f64) -> f64 {
        self.config.set_volume(volume)
    }

    pub fn get_repeat(&self) -> bool {
        self.config.repeat()
    }

    pub fn set_repeat(&self, repeat: bool) -> bool {
        self.config.set_repeat(repeat);
        repeat
    }
}

/// The cache is keyed by canonical path, so a symlinked track's record names
/// the link target. Report the name the playlist indexed instead.
fn as_indexed(mut meta: TrackMetadata, path: &Path) -> TrackMetadata {
    meta.filename = file_name_of(path);
    meta
}

/// The run-only override if set, else the persisted `audio_library`.
fn library_root(ctx: &AppContext, config: &ConfigStore) -> PathBuf {
    ctx.library_override
        .clone()
        .unwrap_or_else(|| config.audio_library())
}
