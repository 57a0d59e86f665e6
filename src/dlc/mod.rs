//! # DLC Container
//!
//! A [`Dlc`] owns the header and the nine decoded sections of one content pack. It is loaded
//! once, mutated through the typed section accessors, and built back to disk once.
//!
//! An untouched document rebuilds byte-for-byte: sections are checked on load to re-encode to
//! their source bytes, and padding around them is carried in the [`Header`].

pub mod header;
pub mod sections;

pub use header::{DirectoryEntry, Header, SectionId, HEADER_LEN, SECTION_COUNT};
pub use sections::{Section, Sections};

use std::ffi::OsString;
use std::fs;
use std::hash::Hasher;
use std::io::Write;
use std::path::Path;

use tracing::{debug, info};
use twox_hash::XxHash64;

use crate::{
    error::{DlcError, Result},
    formats::{
        action::{ActionCode, ActionMap},
        amf::AudioStore,
        cel::CelStore,
        pal::PaletteTable,
        seq::SequenceTable,
        spr::SpriteGraph,
    },
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dlc {
    header: Option<Header>,
    sections: Option<Sections>,
}

impl Dlc {
    /// An empty document with no header and no sections.
    pub fn new() -> Self {
        Dlc::default()
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read(path)?;
        let dlc = Dlc::from_bytes(&data)?;
        info!(
            "Loaded {} ({} bytes, version {})",
            path.display(),
            data.len(),
            dlc.header.as_ref().map(Header::version).unwrap_or_default()
        );
        Ok(dlc)
    }

    /// Load and attach the action-code table in one step.
    pub fn load_with_actions<P: AsRef<Path>>(path: P, actions: ActionMap) -> Result<Self> {
        let mut dlc = Dlc::load(path)?;
        dlc.set_action_map(actions)?;
        Ok(dlc)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let header = Header::parse(data)?;
        let sections = Sections::decode(&header, data)?;
        Ok(Dlc {
            header: Some(header),
            sections: Some(sections),
        })
    }

    pub fn is_loaded(&self) -> bool {
        self.sections.is_some()
    }

    pub fn header(&self) -> Option<&Header> {
        self.header.as_ref()
    }

    /// Section identifiers in file order; empty for a document built with [`Dlc::new`].
    pub fn section_ids(&self) -> Vec<SectionId> {
        match &self.sections {
            Some(sections) => sections.iter().map(|s| s.id()).collect(),
            None => Vec::new(),
        }
    }

    pub fn sections(&self) -> Result<&Sections> {
        self.sections.as_ref().ok_or(DlcError::NotLoaded)
    }

    pub fn sections_mut(&mut self) -> Result<&mut Sections> {
        self.sections.as_mut().ok_or(DlcError::NotLoaded)
    }

    pub fn palettes(&self) -> Result<&PaletteTable> {
        Ok(&self.sections()?.pal)
    }

    pub fn palettes_mut(&mut self) -> Result<&mut PaletteTable> {
        Ok(&mut self.sections_mut()?.pal)
    }

    pub fn cels(&self) -> Result<&CelStore> {
        Ok(&self.sections()?.cel)
    }

    pub fn cels_mut(&mut self) -> Result<&mut CelStore> {
        Ok(&mut self.sections_mut()?.cel)
    }

    pub fn sprites(&self) -> Result<&SpriteGraph> {
        Ok(&self.sections()?.spr)
    }

    pub fn sprites_mut(&mut self) -> Result<&mut SpriteGraph> {
        Ok(&mut self.sections_mut()?.spr)
    }

    pub fn sequences(&self) -> Result<&SequenceTable> {
        Ok(&self.sections()?.seq)
    }

    pub fn sequences_mut(&mut self) -> Result<&mut SequenceTable> {
        Ok(&mut self.sections_mut()?.seq)
    }

    pub fn audio(&self) -> Result<&AudioStore> {
        Ok(&self.sections()?.amf)
    }

    pub fn audio_mut(&mut self) -> Result<&mut AudioStore> {
        Ok(&mut self.sections_mut()?.amf)
    }

    pub fn set_action_map(&mut self, actions: ActionMap) -> Result<()> {
        self.sequences_mut()?.set_action_map(actions)
    }

    pub fn lookup(&self, code: ActionCode) -> Result<usize> {
        self.sequences()?.lookup(code)
    }

    /// Append each encoded clip as a new track and point the sequence for `code` at them.
    ///
    /// Either every clip is stored and the sequence rewritten, or nothing changes. Returns the
    /// new track indices in input order.
    pub fn replace_audio(&mut self, code: ActionCode, clips: Vec<Vec<u8>>) -> Result<Vec<u16>> {
        let seq_index = self.lookup(code)?;
        let sections = self.sections_mut()?;

        let start = sections.amf.len();
        let available = free_track_slots(start, sections.seq.terminator);
        if clips.len() > available {
            return Err(DlcError::TooManyTracks {
                requested: clips.len(),
                available,
            });
        }

        // Bounded by `available`, so every index fits in u16 and misses the terminator
        let indices: Vec<u16> = (start..start + clips.len()).map(|i| i as u16).collect();
        sections.seq.set_audio_sequence(seq_index, &indices)?;
        for clip in clips {
            sections.amf.append(clip);
        }

        info!(
            "Action {} -> sequence {}: {} tracks {:?}",
            code,
            seq_index,
            indices.len(),
            indices
        );
        Ok(indices)
    }

    /// Read pre-encoded clips from disk, then [`Dlc::replace_audio`].
    pub fn replace_audio_files<P: AsRef<Path>>(
        &mut self,
        code: ActionCode,
        paths: &[P],
    ) -> Result<Vec<u16>> {
        let mut clips = Vec::with_capacity(paths.len());
        for path in paths {
            let path = path.as_ref();
            let clip = fs::read(path)?;
            debug!("Read {} ({} bytes)", path.display(), clip.len());
            clips.push(clip);
        }
        self.replace_audio(code, clips)
    }

    pub fn minify(&mut self, max_len: usize) -> Result<()> {
        self.audio_mut()?.minify(max_len)
    }

    pub fn validate(&self) -> Result<()> {
        self.sections()?.validate()
    }

    /// Encode the whole file in memory, with offsets recomputed from the current sections.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let (Some(header), Some(sections)) = (&self.header, &self.sections) else {
            return Err(DlcError::NotLoaded);
        };
        sections.validate()?;

        let encoded: Vec<Vec<u8>> = sections.iter().map(|s| s.to_bytes()).collect();
        let mut lengths = [0usize; SECTION_COUNT];
        for (len, bytes) in lengths.iter_mut().zip(&encoded) {
            *len = bytes.len();
        }
        let header = header.relayout(lengths)?;

        let total = HEADER_LEN
            + header.gaps.iter().map(Vec::len).sum::<usize>()
            + lengths.iter().sum::<usize>()
            + header.tail.len();
        let mut out = Vec::with_capacity(total);
        out.extend_from_slice(&header.to_bytes());
        for (gap, bytes) in header.gaps.iter().zip(&encoded) {
            out.extend_from_slice(gap);
            out.extend_from_slice(bytes);
        }
        out.extend_from_slice(&header.tail);
        Ok(out)
    }

    /// Write the document to `path`. The destination is replaced only once the new file is
    /// complete on disk.
    pub fn build<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let out = self.to_bytes()?;

        let tmp_path = match path.file_name() {
            Some(name) => {
                let mut tmp_name = OsString::from(name);
                tmp_name.push(".tmp");
                path.with_file_name(tmp_name)
            }
            None => {
                return Err(DlcError::Io(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "output path has no file name",
                )))
            }
        };

        if let Err(e) = write_then_replace(&tmp_path, path, &out) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }

        info!("Built {} ({} bytes)", path.display(), out.len());
        Ok(())
    }

    /// xxHash64 of every encoded section, in file order.
    pub fn fingerprints(&self) -> Result<Vec<(SectionId, u64)>> {
        Ok(self
            .sections()?
            .iter()
            .map(|section| {
                let mut hasher = XxHash64::with_seed(0);
                hasher.write(&section.to_bytes());
                (section.id(), hasher.finish())
            })
            .collect())
    }
}

/// Track indices that can still be appended contiguously from `len` without reaching the
/// terminator or leaving u16 range.
fn free_track_slots(len: usize, terminator: u16) -> usize {
    let limit = if terminator as usize >= len {
        terminator as usize
    } else {
        u16::MAX as usize + 1
    };
    limit.saturating_sub(len)
}

/// `fs::rename` replaces an existing destination in one step on every platform (on Windows it
/// is `MoveFileExW` with `MOVEFILE_REPLACE_EXISTING`), so the old file stays in place until the
/// new one is complete.
fn write_then_replace(tmp_path: &Path, path: &Path, data: &[u8]) -> std::io::Result<()> {
    {
        let mut f = fs::File::create(tmp_path)?;
        f.write_all(data)?;
        f.sync_all()?;
    }

    fs::rename(tmp_path, path)
}
