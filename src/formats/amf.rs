//! # Audio Track Store (AMF)
//!
//! Encoded audio clips (GeneralPlus A18), one per track slot. The payloads are opaque here:
//! encoding happens out of process before a clip is handed to [`AudioStore::append`].
//!
//! Layout: u32 track count, u32 payload length per track, then the payloads back to back.

use std::io;

use tracing::info;

use crate::{
    binary_utils::{ByteReader, ByteWriter},
    dlc::SectionId,
    error::{DlcError, Result},
};

/// Codec frame/DMA alignment unit
pub const AUDIO_ALIGNMENT: usize = 8;
pub const DEFAULT_MINIFY_LEN: usize = 128;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AudioStore {
    pub tracks: Vec<Vec<u8>>,
    pub trailer: Vec<u8>,
}

fn malformed(e: io::Error) -> DlcError {
    DlcError::MalformedSection {
        id: SectionId::Amf,
        reason: e.to_string(),
    }
}

impl AudioStore {
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut reader = ByteReader::new(data);
        let count = reader.read_u32_le().map_err(malformed)? as usize;

        if count.saturating_mul(4) > reader.remaining() {
            return Err(DlcError::MalformedSection {
                id: SectionId::Amf,
                reason: format!(
                    "track table for {} tracks does not fit in {} bytes",
                    count,
                    reader.remaining()
                ),
            });
        }

        let mut lengths = Vec::with_capacity(count);
        for _ in 0..count {
            lengths.push(reader.read_u32_le().map_err(malformed)? as usize);
        }

        let mut tracks = Vec::with_capacity(count);
        for (i, len) in lengths.into_iter().enumerate() {
            let payload = reader.read_bytes(len).map_err(|e| DlcError::MalformedSection {
                id: SectionId::Amf,
                reason: format!("track {}: {}", i, e),
            })?;
            tracks.push(payload);
        }

        Ok(AudioStore {
            tracks,
            trailer: reader.read_rest(),
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let payload: usize = self.tracks.iter().map(Vec::len).sum();
        let mut writer =
            ByteWriter::with_capacity(4 + self.tracks.len() * 4 + payload + self.trailer.len());
        writer.write_u32_le(self.tracks.len() as u32);
        for track in &self.tracks {
            writer.write_u32_le(track.len() as u32);
        }
        for track in &self.tracks {
            writer.write_bytes(track);
        }
        writer.write_bytes(&self.trailer);
        writer.into_inner()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn track(&self, index: usize) -> Result<&[u8]> {
        self.tracks
            .get(index)
            .map(Vec::as_slice)
            .ok_or(DlcError::IndexOutOfRange {
                what: "track",
                index,
                len: self.tracks.len(),
            })
    }

    /// Store a new clip in a fresh slot and return its index.
    pub fn append(&mut self, payload: Vec<u8>) -> usize {
        self.tracks.push(payload);
        self.tracks.len() - 1
    }

    /// Truncate every track to at most `max_len` bytes. Sequence references are untouched.
    pub fn minify(&mut self, max_len: usize) -> Result<()> {
        if max_len % AUDIO_ALIGNMENT != 0 {
            return Err(DlcError::InvalidAlignment(max_len));
        }

        let before: usize = self.tracks.iter().map(Vec::len).sum();
        for track in self.tracks.iter_mut() {
            track.truncate(max_len);
        }
        let after: usize = self.tracks.iter().map(Vec::len).sum();

        info!(
            "Minified {} tracks to {} bytes: {} -> {} payload bytes",
            self.tracks.len(),
            max_len,
            before,
            after
        );
        Ok(())
    }
}
