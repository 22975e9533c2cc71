use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use crate::store::persist::{read_json, write_json, StoreError};

/// User preferences and playback state persisted between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root directory of the audio library.
    pub audio_library: PathBuf,
    /// Base name of the last loaded track.
    pub last_played: Option<String>,
    /// Always within [0.0, 1.0].
    pub volume: f64,
    pub repeat: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            audio_library: default_library_dir(),
            last_played: None,
            volume: 1.0,
            repeat: false,
        }
    }
}

/// `~/Music` or the platform's audio directory.
pub fn default_library_dir() -> PathBuf {
    dirs::audio_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join("Music")))
        .unwrap_or_else(|| PathBuf::from("Music"))
}

/// Clamp a requested volume into [0.0, 1.0]. NaN maps to silence.
pub fn clamp_volume(volume: f64) -> f64 {
    if volume.is_nan() {
        0.0
    } else {
        volume.clamp(0.0, 1.0)
    }
}

/// Owner of the persisted [`Config`]. Every setter writes the whole record
/// back to disk before returning.
///
/// A failed write is logged and the in-memory value is kept, so the process
/// keeps serving the new value even if it could not be saved.
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    config: Mutex<Config>,
}

impl ConfigStore {
    /// Load the config at `path`, creating it with defaults on first run.
    ///
    /// A file that exists but cannot be parsed is left untouched on disk and
    /// defaults are used in memory until the next setter overwrites it.
    pub fn load_or_create(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let config = match read_json::<Config>(&path) {
            Ok(Some(mut config)) => {
                config.volume = clamp_volume(config.volume);
                tracing::debug!("Loaded config from {}", path.display());
                config
            }
            Ok(None) => {
                let config = Config::default();
                match write_json(&path, &config, true) {
                    Ok(()) => tracing::info!("Created default config at {}", path.display()),
                    Err(e) => tracing::error!("Failed to write default config: {}", e),
                }
                config
            }
            Err(e) => {
                tracing::warn!("Failed to load config, using defaults: {}", e);
                Config::default()
            }
        };

        Self {
            path,
            config: Mutex::new(config),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Snapshot of the current record.
    pub fn get(&self) -> Config {
        self.lock().clone()
    }

    /// Write `config` to disk, replacing the previous file atomically.
    pub fn save(&self, config: &Config) -> Result<(), StoreError> {
        write_json(&self.path, config, true)
    }

    pub fn volume(&self) -> f64 {
        self.lock().volume
    }

    /// Store the clamped volume and return the value actually kept.
    pub fn set_volume(&self, volume: f64) -> f64 {
        let volume = clamp_volume(volume);
        self.update(|c| c.volume = volume);
        volume
    }

    pub fn repeat(&self) -> bool {
        self.lock().repeat
    }

    pub fn set_repeat(&self, repeat: bool) {
        self.update(|c| c.repeat = repeat);
    }

    pub fn last_played(&self) -> Option<String> {
        self.lock().last_played.clone()
    }

    pub fn set_last_played(&self, filename: impl Into<String>) {
        let filename = filename.into();
        self.update(|c| c.last_played = Some(filename));
    }

    pub fn audio_library(&self) -> PathBuf {
        self.lock().audio_library.clone()
    }

    /// Apply `mutate` and persist while holding the lock, so two concurrent
    /// setters cannot write stale snapshots over each other.
    fn update(&self, mutate: impl FnOnce(&mut Config)) {
        let mut config = self.lock();
        mutate(&mut config);
        if let Err(e) = self.save(&config) {
            tracing::error!("Failed to persist config, keeping in-memory value: {}", e);
        }
    }

    fn lock(&self) -> MutexGuard<'_, Config> {
        // A poisoned lock still holds a consistent record: every mutation is a single field store.
        self.config.lock().unwrap_or_else(|e| e.into_inner())
    }
}
