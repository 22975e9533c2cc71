use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use lofty::picture::MimeType;
use lofty::prelude::*;
use lofty::tag::Tag;

use crate::media::library::{file_name_of, title_fallback, TrackMetadata};
use crate::media::mime::classify;

/// Failure reading tags or artwork from an audio file.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: lofty::error::LoftyError,
    },
    #[error("failed to stat {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Text tags and stream properties of one file. Cover art is read separately.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedTags {
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
    pub duration: Option<f64>,
    pub bitrate: Option<u32>,
    pub sample_rate: Option<u32>,
    pub channel_count: Option<u8>,
    pub bit_depth: Option<u8>,
}

/// Raw embedded artwork.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverArt {
    pub data: Vec<u8>,
    pub mime: &'static str,
}

/// Source of tags and artwork for the metadata cache.
///
/// The cache calls `read_tags` once per new path and `read_cover` whenever a
/// cover is requested for a track that has none stored.
pub trait TagReader: Send + Sync {
    fn read_tags(&self, path: &Path) -> Result<ExtractedTags, ExtractError>;

    /// `Ok(None)` means the file was readable but carries no picture.
    fn read_cover(&self, path: &Path) -> Result<Option<CoverArt>, ExtractError>;
}

/// [`TagReader`] backed by lofty.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoftyReader;

impl TagReader for LoftyReader {
    fn read_tags(&self, path: &Path) -> Result<ExtractedTags, ExtractError> {
        let tagged = lofty::read_from_path(path).map_err(|source| ExtractError::Read {
            path: path.display().to_string(),
            source,
        })?;

        let props = tagged.properties();
        let mut tags = ExtractedTags {
            duration: Some(props.duration().as_secs_f64()),
            bitrate: props.audio_bitrate().or_else(|| props.overall_bitrate()),
            sample_rate: props.sample_rate(),
            channel_count: props.channels(),
            bit_depth: props.bit_depth(),
            ..ExtractedTags::default()
        };

        if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
            fill_from_tag(&mut tags, tag);
        }

        Ok(tags)
    }

    fn read_cover(&self, path: &Path) -> Result<Option<CoverArt>, ExtractError> {
        let tagged = lofty::read_from_path(path).map_err(|source| ExtractError::Read {
            path: path.display().to_string(),
            source,
        })?;

        // Prefer the primary tag's picture, then any tag that has one.
        let picture = tagged
            .primary_tag()
            .and_then(|t| t.pictures().first())
            .or_else(|| tagged.tags().iter().find_map(|t| t.pictures().first()));

        Ok(picture.map(|p| CoverArt {
            data: p.data().to_vec(),
            mime: picture_mime(p.mime_type()),
        }))
    }
}

fn fill_from_tag(tags: &mut ExtractedTags, tag: &Tag) {
    tags.title = non_blank(tag.title().as_deref());
    tags.artist = non_blank(tag.artist().as_deref());
    tags.album = non_blank(tag.album().as_deref());
    tags.album_artist = non_blank(tag.get_string(&ItemKey::AlbumArtist));
    tags.genre = non_blank(tag.genre().as_deref());
    tags.year = tag.year();
    tags.track = tag.track();
    tags.track_total = tag.track_total();
    tags.disc = tag.disk();
    tags.disc_total = tag.disk_total();
}

/// Trimmed owned string, or `None` when empty or whitespace only.
fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn picture_mime(mime: Option<&MimeType>) -> &'static str {
    match mime {
        Some(MimeType::Png) => "image/png",
        Some(MimeType::Gif) => "image/gif",
        Some(MimeType::Bmp) => "image/bmp",
        Some(MimeType::Tiff) => "image/tiff",
        _ => "image/jpeg",
    }
}

/// Build the cached record for `canonical` from extracted tags.
///
/// The title falls back to the filename stem. `cover` is left empty; artwork
/// is fetched lazily on top of the cache.
pub fn build_record(canonical: &Path, tags: ExtractedTags, filesize: Option<u64>) -> TrackMetadata {
    TrackMetadata {
        title: Some(tags.title.unwrap_or_else(|| title_fallback(canonical))),
        artist: tags.artist,
        album: tags.album,
        album_artist: tags.album_artist,
        disc: tags.disc,
        disc_total: tags.disc_total,
        track: tags.track,
        track_total: tags.track_total,
        genre: tags.genre,
        year: tags.year,
        duration: tags.duration,
        mime_type: classify(canonical).map(str::to_string),
        full_path: canonical.to_string_lossy().into_owned(),
        filename: file_name_of(canonical),
        filesize,
        bitrate: tags.bitrate,
        sample_rate: tags.sample_rate,
        channel_count: tags.channel_count,
        bit_depth: tags.bit_depth,
        cover: None,
        cover_mime: None,
    }
}

/// Read tags for `canonical` through `reader`, degrading to a placeholder
/// record titled after the file stem on any failure. Never returns an error.
pub fn extract_record(reader: &dyn TagReader, canonical: &Path) -> TrackMetadata {
    let filesize = match std::fs::metadata(canonical) {
        Ok(m) => Some(m.len()),
        Err(e) => {
            tracing::warn!("Cannot stat {}: {}", canonical.display(), e);
            None
        }
    };

    match reader.read_tags(canonical) {
        Ok(tags) => build_record(canonical, tags, filesize),
        Err(e) => {
            tracing::warn!("Tag extraction failed, using placeholder: {}", e);
            TrackMetadata {
                title: Some(title_fallback(canonical)),
                mime_type: classify(canonical).map(str::to_string),
                filesize,
                ..TrackMetadata::placeholder(canonical)
            }
        }
    }
}

/// Base64 (standard alphabet) encoding used for the `cover` field.
pub fn encode_cover(data: &[u8]) -> String {
    STANDARD.encode(data)
}
