use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;

/// A selected file held entirely in memory.
///
/// Nothing keeps a path around after the bytes are read; the blob is the only
/// handle the rest of the app has on the user's file.
pub struct FileBlob {
    name: String,
    media_type: String,
    bytes: Arc<[u8]>,
}

impl FileBlob {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes: Arc::from(bytes),
        }
    }

    /// Read `path` into memory, deriving the media type from its extension.
    pub fn read(path: &Path) -> io::Result<Self> {
        let bytes = fs::read(path)?;
        let name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("UNKNOWN")
            .to_string();
        Ok(Self::new(name, media_type_for(path), bytes))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn bytes(&self) -> Arc<[u8]> {
        self.bytes.clone()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_audio(&self) -> bool {
        self.media_type.starts_with("audio/")
    }
}

impl fmt::Debug for FileBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileBlob")
            .field("name", &self.name)
            .field("media_type", &self.media_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Guess a media type from the file extension (case-insensitive).
pub fn media_type_for(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// Match a media type against `accept` patterns (`audio/*`, `audio/flac`, `*/*`).
pub fn is_accepted(media_type: &str, accept: &[String]) -> bool {
    accept.iter().map(|p| p.trim()).any(|pattern| {
        if pattern.is_empty() {
            return false;
        }
        if pattern == "*/*" {
            return true;
        }
        match pattern.strip_suffix("/*") {
            Some(top) => media_type
                .split_once('/')
                .is_some_and(|(t, _)| t.eq_ignore_ascii_case(top)),
            None => media_type.eq_ignore_ascii_case(pattern),
        }
    })
}
