use std::path::Path;

use crate::media::library::TrackMetadata;
use crate::media::metadata::encode_cover;

const BUNDLED_COVER: &[u8] = include_bytes!("../../assets/fallback-cover.svg");
const BUNDLED_COVER_MIME: &str = "image/svg+xml";

/// Placeholder artwork substituted whenever a track has no usable embedded cover.
/// Loaded once at startup and shared through the application context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackCover {
    /// Base64 image bytes, in the same encoding as `TrackMetadata::cover`.
    pub data: String,
    pub mime: String,
}

impl FallbackCover {
    /// The image compiled into the binary.
    pub fn bundled() -> Self {
        Self {
            data: encode_cover(BUNDLED_COVER),
            mime: BUNDLED_COVER_MIME.to_string(),
        }
    }

    /// Load a user-supplied image, falling back to the bundled one when the
    /// file is missing, unreadable, or of an unrecognised type.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::bundled();
        };

        let Some(mime) = image_mime(path) else {
            tracing::warn!(
                "Unrecognised fallback cover type {}, using bundled image",
                path.display()
            );
            return Self::bundled();
        };

        match std::fs::read(path) {
            Ok(bytes) => {
                tracing::debug!("Loaded fallback cover from {}", path.display());
                Self {
                    data: encode_cover(&bytes),
                    mime: mime.to_string(),
                }
            }
            Err(e) => {
                tracing::warn!(
                    "Cannot read fallback cover {}: {} -- using bundled image",
                    path.display(),
                    e
                );
                Self::bundled()
            }
        }
    }

    /// Fill `meta`'s cover fields with this image.
    pub fn apply(&self, meta: &mut TrackMetadata) {
        meta.cover = Some(self.data.clone());
        meta.cover_mime = Some(self.mime.clone());
    }
}

fn image_mime(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        _ => return None,
    };
    Some(mime)
}
