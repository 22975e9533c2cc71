#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use simpleaudio::media::metadata::{CoverArt, ExtractError, ExtractedTags, TagReader};

/// Fake tag source that counts calls and can be told to fail.
#[derive(Default)]
pub struct CountingReader {
    pub tag_calls: AtomicUsize,
    pub cover_calls: AtomicUsize,
    pub fail_tags: bool,
    pub fail_cover: bool,
    pub cover: Option<CoverArt>,
}

impl CountingReader {
    pub fn with_cover(data: &[u8]) -> Self {
        Self {
            cover: Some(CoverArt {
                data: data.to_vec(),
                mime: "image/png",
            }),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_tags: true,
            fail_cover: true,
            ..Self::default()
        }
    }

    pub fn tag_calls(&self) -> usize {
        self.tag_calls.load(Ordering::SeqCst)
    }

    pub fn cover_calls(&self) -> usize {
        self.cover_calls.load(Ordering::SeqCst)
    }
}

fn io_failure(path: &Path) -> ExtractError {
    ExtractError::Io {
        path: path.display().to_string(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidData, "corrupt"),
    }
}

impl TagReader for CountingReader {
    fn read_tags(&self, path: &Path) -> Result<ExtractedTags, ExtractError> {
        self.tag_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_tags {
            return Err(io_failure(path));
        }
        Ok(ExtractedTags {
            artist: Some("Test Artist".into()),
            album: Some("Test Album".into()),
            track: Some(1),
            duration: Some(12.5),
            sample_rate: Some(44_100),
            ..ExtractedTags::default()
        })
    }

    fn read_cover(&self, path: &Path) -> Result<Option<CoverArt>, ExtractError> {
        self.cover_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_cover {
            return Err(io_failure(path));
        }
        Ok(self.cover.clone())
    }
}

/// Write `len` bytes of a repeating pattern to `path`.
pub fn write_patterned(path: &Path, len: usize) -> Vec<u8> {
    let bytes: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
    std::fs::write(path, &bytes).unwrap();
    bytes
}
