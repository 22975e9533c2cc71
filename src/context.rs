use std::path::{Path, PathBuf};

use crate::media::cover::FallbackCover;
use crate::settings::Settings;

pub const CONFIG_FILE_NAME: &str = "config.json";
pub const CACHE_FILE_NAME: &str = "metadata_cache.json";

/// Process-wide state built once at startup and handed to every component that
/// needs it: data file locations, the fallback cover, and the server port.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub data_dir: PathBuf,
    pub port: u16,
    pub fallback_cover: FallbackCover,
    /// Overrides the persisted `audio_library` for this run only.
    pub library_override: Option<PathBuf>,
}

impl AppContext {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            data_dir: settings.data_dir.clone(),
            port: settings.port,
            fallback_cover: FallbackCover::load(settings.fallback_cover.as_deref()),
            library_override: settings.library.clone(),
        }
    }

    /// Context rooted at `data_dir` with the bundled cover, for embedding and tests.
    pub fn new(data_dir: impl Into<PathBuf>, port: u16) -> Self {
        Self {
            data_dir: data_dir.into(),
            port,
            fallback_cover: FallbackCover::bundled(),
            library_override: None,
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.data_dir.join(CONFIG_FILE_NAME)
    }

    pub fn cache_path(&self) -> PathBuf {
        self.data_dir.join(CACHE_FILE_NAME)
    }

    /// Playable URL on the loopback range server for a `/`-separated path
    /// relative to the library root. Each segment is percent-encoded.
    pub fn track_url(&self, name: &str) -> String {
        let encoded: Vec<_> = name.split('/').map(urlencoding::encode).collect();
        format!("http://127.0.0.1:{}/{}", self.port, encoded.join("/"))
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
