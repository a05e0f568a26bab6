//! Recording session entity

use std::fmt;

use crate::domain::audio::{AudioArtifact, MimeType};

/// Identifies one recording cycle.
///
/// Capability events carry the id of the session that caused them, so
/// anything arriving for a superseded session can be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct SessionId(u64);

impl SessionId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Chunks captured during one recording and, once finalized, the artifact.
///
/// Chunks are append-only; finalizing moves them into the artifact.
#[derive(Debug, Default)]
pub struct Session {
    id: SessionId,
    chunks: Vec<Vec<u8>>,
    artifact: Option<AudioArtifact>,
}

impl Session {
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            chunks: Vec::new(),
            artifact: None,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Append a chunk. Empty chunks are dropped; returns whether it was kept.
    pub fn push_chunk(&mut self, chunk: Vec<u8>) -> bool {
        if chunk.is_empty() {
            return false;
        }
        self.chunks.push(chunk);
        true
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Concatenate all chunks into the artifact, leaving the chunk list empty
    pub fn finalize(&mut self, mime_type: MimeType) -> &AudioArtifact {
        let chunks = std::mem::take(&mut self.chunks);
        self.artifact.insert(AudioArtifact::from_chunks(&chunks, mime_type))
    }

    pub fn artifact(&self) -> Option<&AudioArtifact> {
        self.artifact.as_ref()
    }

    /// Drop chunks and artifact, keeping the id
    pub fn discard(&mut self) {
        self.chunks.clear();
        self.artifact = None;
    }
}
