use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Default)]
#[command(
    name = "simpleaudio",
    about = "Audio library backend: indexes a music folder and serves it over a loopback range server",
    long_about = None,
    version = env!("SIMPLEAUDIO_VERSION"),
)]
pub struct Args {
    /// Loopback port for the track server [default: 8765]
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Directory holding config.json and metadata_cache.json
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Library root for this run only (the persisted audio_library is left unchanged)
    #[arg(short, long, value_name = "DIR")]
    pub library: Option<PathBuf>,

    /// Image used when a track has no embedded cover art
    #[arg(long, value_name = "FILE")]
    pub fallback_cover: Option<PathBuf>,

    /// Path to TOML settings file (overrides default search: ./simpleaudio.toml, ~/.config/simpleaudio/config.toml)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}
