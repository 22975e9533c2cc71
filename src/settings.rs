use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_PORT: u16 = 8765;
const APP_DIR: &str = "simpleaudio";

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Process settings read from `simpleaudio.toml`. Every key is optional.
#[derive(Deserialize, Default, Debug)]
pub struct FileSettings {
    pub port: Option<u16>,
    pub data_dir: Option<PathBuf>,
    pub library: Option<PathBuf>,
    pub fallback_cover: Option<PathBuf>,
}

/// Resolved process settings: CLI flag, then TOML file, then built-in default.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub port: u16,
    pub data_dir: PathBuf,
    pub library: Option<PathBuf>,
    pub fallback_cover: Option<PathBuf>,
}

impl Settings {
    pub fn resolve(file: Option<FileSettings>, args: &crate::cli::Args) -> Self {
        let file = file.unwrap_or_default();
        Settings {
            port: args.port.or(file.port).unwrap_or(DEFAULT_PORT),
            data_dir: args
                .data_dir
                .clone()
                .or(file.data_dir)
                .unwrap_or_else(default_data_dir),
            library: args.library.clone().or(file.library),
            fallback_cover: args.fallback_cover.clone().or(file.fallback_cover),
        }
    }
}

/// Locate the settings file: the explicit path if given, else `./simpleaudio.toml`,
/// else `<config dir>/simpleaudio/config.toml`.
pub fn find_settings_file(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_owned());
    }
    let cwd_file = PathBuf::from("simpleaudio.toml");
    if cwd_file.exists() {
        return Some(cwd_file);
    }
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR).join("config.toml"))
        .filter(|p| p.exists())
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse settings file: {0}")]
    Parse(#[from] toml::de::Error),
}

pub fn load_settings(path: &Path) -> Result<FileSettings, SettingsError> {
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}
