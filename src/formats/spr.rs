//! # Sprite Frame Graph (SPR)
//!
//! A frame is a 128x128 sprite assembled from four 64x64 cels, each drawn with its own palette.
//! Playlists are ordered lists of frame indices that make up one animation loop (left eye,
//! right flame indicator, ...). Several playlists may share frames.
//!
//! Layout: u16 frame count, u16 playlist count, 8 x u16 per frame
//! (cel, palette pairs in TL, TR, BL, BR order), then per playlist a u16 length followed by
//! that many u16 frame indices.

use std::collections::BTreeSet;
use std::io;

use crate::{
    binary_utils::{ByteReader, ByteWriter},
    dlc::SectionId,
    error::{DlcError, Result},
};

pub const QUADRANTS: usize = 4;
pub const FRAME_WORDS: usize = QUADRANTS * 2;

/// One quarter of a frame: which cel to draw and which palette to draw it with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Quadrant {
    pub cel: u16,
    pub palette: u16,
}

impl Quadrant {
    pub fn new(cel: u16, palette: u16) -> Self {
        Quadrant { cel, palette }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Frame {
    pub quadrants: [Quadrant; QUADRANTS],
}

impl Frame {
    pub fn new(quadrants: [Quadrant; QUADRANTS]) -> Self {
        Frame { quadrants }
    }

    /// Four consecutive cels starting at `first_cel`, all drawn with one palette. This is the
    /// shape `CelStore::append` produces for a quarterized image. The run must end within u16
    /// range.
    pub fn from_cel_run(first_cel: u16, palette: u16) -> Result<Self> {
        let mut quadrants = [Quadrant::default(); QUADRANTS];
        for (i, quadrant) in quadrants.iter_mut().enumerate() {
            let cel = first_cel.checked_add(i as u16).ok_or(DlcError::IndexOutOfRange {
                what: "cel",
                index: first_cel as usize + i,
                len: u16::MAX as usize + 1,
            })?;
            *quadrant = Quadrant::new(cel, palette);
        }
        Ok(Frame { quadrants })
    }

    /// Every quadrant shows the same cel and palette.
    pub fn uniform(cel: u16, palette: u16) -> Self {
        Frame {
            quadrants: [Quadrant::new(cel, palette); QUADRANTS],
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Playlist {
    pub frame_indices: Vec<u16>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpriteGraph {
    pub frames: Vec<Frame>,
    pub playlists: Vec<Playlist>,
    /// Bytes after the last playlist, kept verbatim
    pub trailer: Vec<u8>,
}

fn malformed(e: io::Error) -> DlcError {
    DlcError::MalformedSection {
        id: SectionId::Spr,
        reason: e.to_string(),
    }
}

impl SpriteGraph {
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut reader = ByteReader::new(data);
        let frame_count = reader.read_u16_le().map_err(malformed)? as usize;
        let playlist_count = reader.read_u16_le().map_err(malformed)? as usize;

        if frame_count * FRAME_WORDS * 2 > reader.remaining() {
            return Err(DlcError::MalformedSection {
                id: SectionId::Spr,
                reason: format!(
                    "{} frames need {} bytes, only {} remain",
                    frame_count,
                    frame_count * FRAME_WORDS * 2,
                    reader.remaining()
                ),
            });
        }

        let mut frames = Vec::with_capacity(frame_count);
        for _ in 0..frame_count {
            let mut frame = Frame::default();
            for quadrant in frame.quadrants.iter_mut() {
                quadrant.cel = reader.read_u16_le().map_err(malformed)?;
                quadrant.palette = reader.read_u16_le().map_err(malformed)?;
            }
            frames.push(frame);
        }

        let mut playlists = Vec::with_capacity(playlist_count);
        for _ in 0..playlist_count {
            let len = reader.read_u16_le().map_err(malformed)? as usize;
            let mut frame_indices = Vec::with_capacity(len);
            for _ in 0..len {
                frame_indices.push(reader.read_u16_le().map_err(malformed)?);
            }
            playlists.push(Playlist { frame_indices });
        }

        Ok(SpriteGraph {
            frames,
            playlists,
            trailer: reader.read_rest(),
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = ByteWriter::with_capacity(4 + self.frames.len() * FRAME_WORDS * 2);
        writer.write_u16_le(self.frames.len() as u16);
        writer.write_u16_le(self.playlists.len() as u16);
        for frame in &self.frames {
            for quadrant in &frame.quadrants {
                writer.write_u16_le(quadrant.cel);
                writer.write_u16_le(quadrant.palette);
            }
        }
        for playlist in &self.playlists {
            writer.write_u16_le(playlist.frame_indices.len() as u16);
            for &frame in &playlist.frame_indices {
                writer.write_u16_le(frame);
            }
        }
        writer.write_bytes(&self.trailer);
        writer.into_inner()
    }

    pub fn frame(&self, index: usize) -> Result<&Frame> {
        self.frames.get(index).ok_or(DlcError::IndexOutOfRange {
            what: "frame",
            index,
            len: self.frames.len(),
        })
    }

    /// Overwrite the four (cel, palette) pairs of one frame.
    pub fn set_frame(&mut self, index: usize, quadrants: [Quadrant; QUADRANTS]) -> Result<()> {
        let len = self.frames.len();
        let frame = self.frames.get_mut(index).ok_or(DlcError::IndexOutOfRange {
            what: "frame",
            index,
            len,
        })?;
        frame.quadrants = quadrants;
        Ok(())
    }

    pub fn playlist(&self, id: usize) -> Result<&Playlist> {
        self.playlists.get(id).ok_or(DlcError::IndexOutOfRange {
            what: "playlist",
            index: id,
            len: self.playlists.len(),
        })
    }

    pub fn playlist_frames(&self, id: usize) -> Result<&[u16]> {
        Ok(&self.playlist(id)?.frame_indices)
    }

    pub fn set_playlist_frame(&mut self, id: usize, position: usize, frame: u16) -> Result<()> {
        let playlist_len = self.playlists.len();
        let playlist = self
            .playlists
            .get_mut(id)
            .ok_or(DlcError::IndexOutOfRange {
                what: "playlist",
                index: id,
                len: playlist_len,
            })?;
        let len = playlist.frame_indices.len();
        let slot = playlist
            .frame_indices
            .get_mut(position)
            .ok_or(DlcError::IndexOutOfRange {
                what: "playlist position",
                index: position,
                len,
            })?;
        *slot = frame;
        Ok(())
    }

    /// Point every frame referenced by `positions` of a playlist at new cels and palettes.
    ///
    /// All positions and the frames they name are checked before anything is written.
    pub fn retarget_playlist<I>(
        &mut self,
        id: usize,
        positions: I,
        quadrants: [Quadrant; QUADRANTS],
    ) -> Result<usize>
    where
        I: IntoIterator<Item = usize>,
    {
        let frame_indices = self.playlist_frames(id)?;
        let mut targets = Vec::new();
        for position in positions {
            let frame = *frame_indices
                .get(position)
                .ok_or(DlcError::IndexOutOfRange {
                    what: "playlist position",
                    index: position,
                    len: frame_indices.len(),
                })? as usize;
            self.frame(frame)?;
            targets.push(frame);
        }

        for &frame in &targets {
            self.frames[frame].quadrants = quadrants;
        }
        Ok(targets.len())
    }

    /// Sorted, distinct palette indices referenced by any frame.
    pub fn palettes_in_use(&self) -> Vec<u16> {
        self.frames
            .iter()
            .flat_map(|frame| frame.quadrants.iter().map(|q| q.palette))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Check every frame and playlist reference against the current list lengths.
    pub fn validate(&self, cel_count: usize, palette_count: usize) -> Result<()> {
        for (i, frame) in self.frames.iter().enumerate() {
            for quadrant in &frame.quadrants {
                if quadrant.cel as usize >= cel_count {
                    return Err(DlcError::DanglingReference {
                        owner: "frame",
                        owner_index: i,
                        target: "cel",
                        index: quadrant.cel as usize,
                        len: cel_count,
                    });
                }
                if quadrant.palette as usize >= palette_count {
                    return Err(DlcError::DanglingReference {
                        owner: "frame",
                        owner_index: i,
                        target: "palette",
                        index: quadrant.palette as usize,
                        len: palette_count,
                    });
                }
            }
        }

        for (i, playlist) in self.playlists.iter().enumerate() {
            if let Some(&bad) = playlist
                .frame_indices
                .iter()
                .find(|&&f| f as usize >= self.frames.len())
            {
                return Err(DlcError::DanglingReference {
                    owner: "playlist",
                    owner_index: i,
                    target: "frame",
                    index: bad as usize,
                    len: self.frames.len(),
                });
            }
        }
        Ok(())
    }
}
