use std::path::Path;

/// Audio extensions the indexer accepts, lowercase and without the dot.
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "flac", "m4a", "opus"];

/// Content-Type used for files the server is asked for but cannot classify.
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Classify a file path by its extension into the MIME type declared for it.
///
/// Returns `None` for anything outside [`AUDIO_EXTENSIONS`] (silent skip, no logging
/// at this layer). Extensions are matched case-insensitively.
pub fn classify(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();

    let mime = match ext.as_str() {
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        "flac" => "audio/flac",
        "m4a" => "audio/mp4",
        // Opus ships in an Ogg container; browsers sniff the codec themselves.
        "opus" => "audio/ogg",
        _ => return None,
    };

    Some(mime)
}

/// True when `path` carries one of the supported audio extensions.
pub fn is_supported(path: &Path) -> bool {
    classify(path).is_some()
}

/// Content-Type header value for a served file.
pub fn content_type_for(path: &Path) -> &'static str {
    classify(path).unwrap_or(FALLBACK_CONTENT_TYPE)
}
