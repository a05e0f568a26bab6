//! Audio artifact value object

use super::mime::MimeType;

/// A finished recording: the concatenated encoded chunks and the media type
/// the encoder actually produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioArtifact {
    data: Vec<u8>,
    mime_type: MimeType,
}

impl AudioArtifact {
    pub fn new(data: Vec<u8>, mime_type: MimeType) -> Self {
        Self { data, mime_type }
    }

    /// Concatenate chunks in order into a single artifact
    pub fn from_chunks(chunks: &[Vec<u8>], mime_type: MimeType) -> Self {
        Self {
            data: chunks.concat(),
            mime_type,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn mime_type(&self) -> &MimeType {
        &self.mime_type
    }

    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get human-readable size
    pub fn human_readable_size(&self) -> String {
        let bytes = self.size_bytes();
        if bytes < 1024 {
            format!("{} B", bytes)
        } else if bytes < 1024 * 1024 {
            format!("{:.1} KB", bytes as f64 / 1024.0)
        } else {
            format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
        }
    }
}
