//! DLC header: identity bytes plus a fixed nine-entry section directory.
//!
//! ```text
//! 0x00  magic "DLC\0"
//! 0x04  u32 version
//! 0x08  9 x { tag[4], u32 offset, u32 length }
//! 0x74  first section (or padding)
//! ```
//!
//! Offsets are absolute. Any bytes between the header and a section, between two sections, or
//! after the last section are padding; they are kept and written back in place.

use std::fmt;

use tracing::warn;

use crate::binary_utils::{ByteReader, ByteWriter};
use crate::error::{DlcError, Result};

pub const DLC_MAGIC: [u8; 4] = *b"DLC\0";
pub const IDENTITY_LEN: usize = 8;
pub const SECTION_COUNT: usize = 9;
pub const DIRECTORY_ENTRY_LEN: usize = 12;
pub const HEADER_LEN: usize = IDENTITY_LEN + SECTION_COUNT * DIRECTORY_ENTRY_LEN;

/// The nine sections, in file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SectionId {
    Pal,
    Spr,
    Cel,
    Xls,
    Amf,
    Apl,
    Lps,
    Seq,
    Mtr,
}

impl SectionId {
    pub const ALL: [SectionId; SECTION_COUNT] = [
        SectionId::Pal,
        SectionId::Spr,
        SectionId::Cel,
        SectionId::Xls,
        SectionId::Amf,
        SectionId::Apl,
        SectionId::Lps,
        SectionId::Seq,
        SectionId::Mtr,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SectionId::Pal => "PAL",
            SectionId::Spr => "SPR",
            SectionId::Cel => "CEL",
            SectionId::Xls => "XLS",
            SectionId::Amf => "AMF",
            SectionId::Apl => "APL",
            SectionId::Lps => "LPS",
            SectionId::Seq => "SEQ",
            SectionId::Mtr => "MTR",
        }
    }

    /// Position in the directory and in the file.
    pub fn slot(self) -> usize {
        self as usize
    }

    pub fn tag(self) -> [u8; 4] {
        let name = self.name().as_bytes();
        [name[0], name[1], name[2], 0]
    }

    pub fn from_tag(tag: [u8; 4]) -> Option<Self> {
        SectionId::ALL.into_iter().find(|id| id.tag() == tag)
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub id: SectionId,
    pub offset: u32,
    pub length: u32,
}

impl DirectoryEntry {
    pub fn start(&self) -> usize {
        self.offset as usize
    }

    pub fn end(&self) -> usize {
        self.offset as usize + self.length as usize
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Magic and version, preserved as read
    pub identity: [u8; IDENTITY_LEN],
    pub directory: [DirectoryEntry; SECTION_COUNT],
    /// Padding found before each section
    pub gaps: [Vec<u8>; SECTION_COUNT],
    /// Bytes after the last section
    pub tail: Vec<u8>,
}

fn malformed(e: std::io::Error) -> DlcError {
    DlcError::MalformedHeader(e.to_string())
}

impl Header {
    /// Parse and validate the header and directory of a whole file.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_LEN {
            return Err(DlcError::MalformedHeader(format!(
                "file is {} bytes, header needs {}",
                data.len(),
                HEADER_LEN
            )));
        }

        let mut reader = ByteReader::new(data);
        let identity = reader.read_array::<IDENTITY_LEN>().map_err(malformed)?;
        if identity[..4] != DLC_MAGIC {
            return Err(DlcError::MalformedHeader(format!(
                "bad magic {:02x?}",
                &identity[..4]
            )));
        }

        let mut directory = [DirectoryEntry {
            id: SectionId::Pal,
            offset: 0,
            length: 0,
        }; SECTION_COUNT];

        for (slot, expected) in SectionId::ALL.into_iter().enumerate() {
            let tag = reader.read_array::<4>().map_err(malformed)?;
            let id = SectionId::from_tag(tag).ok_or_else(|| DlcError::UnknownSectionId {
                slot,
                tag: String::from_utf8_lossy(&tag).trim_end_matches('\0').to_string(),
            })?;
            if id != expected {
                return Err(DlcError::MalformedHeader(format!(
                    "directory slot {} holds {}, expected {}",
                    slot, id, expected
                )));
            }

            directory[slot] = DirectoryEntry {
                id,
                offset: reader.read_u32_le().map_err(malformed)?,
                length: reader.read_u32_le().map_err(malformed)?,
            };
        }

        let mut gaps: [Vec<u8>; SECTION_COUNT] = Default::default();
        let mut prev_end = HEADER_LEN;
        for entry in &directory {
            if entry.end() > data.len() {
                return Err(DlcError::TruncatedSection {
                    id: entry.id,
                    offset: entry.offset,
                    length: entry.length,
                    file_len: data.len(),
                });
            }
            if entry.start() < prev_end {
                return Err(DlcError::MalformedHeader(format!(
                    "{} at offset {} overlaps previous data ending at {}",
                    entry.id, entry.offset, prev_end
                )));
            }

            let gap = &data[prev_end..entry.start()];
            if !gap.is_empty() {
                warn!("{} bytes of padding before {}", gap.len(), entry.id);
            }
            gaps[entry.id.slot()] = gap.to_vec();
            prev_end = entry.end();
        }

        Ok(Header {
            identity,
            directory,
            gaps,
            tail: data[prev_end..].to_vec(),
        })
    }

    pub fn version(&self) -> u32 {
        u32::from_le_bytes([
            self.identity[4],
            self.identity[5],
            self.identity[6],
            self.identity[7],
        ])
    }

    pub fn entry(&self, id: SectionId) -> &DirectoryEntry {
        &self.directory[id.slot()]
    }

    /// Recompute every offset from new section lengths, keeping identity and padding.
    pub fn relayout(&self, lengths: [usize; SECTION_COUNT]) -> Result<Header> {
        let mut directory = self.directory;
        let mut cursor = HEADER_LEN;
        for (entry, length) in directory.iter_mut().zip(lengths) {
            cursor += self.gaps[entry.id.slot()].len();
            entry.offset = u32::try_from(cursor).map_err(|_| {
                DlcError::MalformedHeader(format!("{} offset {} exceeds u32", entry.id, cursor))
            })?;
            entry.length = u32::try_from(length).map_err(|_| {
                DlcError::MalformedHeader(format!("{} length {} exceeds u32", entry.id, length))
            })?;
            cursor += length;
        }

        Ok(Header {
            identity: self.identity,
            directory,
            gaps: self.gaps.clone(),
            tail: self.tail.clone(),
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = ByteWriter::with_capacity(HEADER_LEN);
        writer.write_bytes(&self.identity);
        for entry in &self.directory {
            writer.write_bytes(&entry.id.tag());
            writer.write_u32_le(entry.offset);
            writer.write_u32_le(entry.length);
        }
        writer.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_with(lengths: [u32; SECTION_COUNT], gap: usize) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend(DLC_MAGIC);
        out.extend(3u32.to_le_bytes());
        let mut offset = HEADER_LEN as u32;
        for (id, len) in SectionId::ALL.into_iter().zip(lengths) {
            offset += gap as u32;
            out.extend(id.tag());
            out.extend(offset.to_le_bytes());
            out.extend(len.to_le_bytes());
            offset += len;
        }
        for (i, len) in lengths.into_iter().enumerate() {
            out.extend(vec![0xEE; gap]);
            out.extend(vec![i as u8; len as usize]);
        }
        out
    }

    #[test]
    fn parses_contiguous_directory() {
        let data = file_with([4, 8, 0, 1, 2, 3, 4, 5, 6], 0);
        let header = Header::parse(&data).unwrap();

        assert_eq!(header.version(), 3);
        assert_eq!(header.entry(SectionId::Pal).offset as usize, HEADER_LEN);
        assert_eq!(header.entry(SectionId::Spr).offset as usize, HEADER_LEN + 4);
        assert_eq!(header.entry(SectionId::Mtr).length, 6);
        assert!(header.tail.is_empty());
        assert_eq!(header.to_bytes(), data[..HEADER_LEN]);
    }

    #[test]
    fn keeps_padding_between_sections() {
        let mut data = file_with([4; SECTION_COUNT], 2);
        data.extend([0x11, 0x22]);
        let header = Header::parse(&data).unwrap();

        assert!(header.gaps.iter().all(|g| g == &vec![0xEE, 0xEE]));
        assert_eq!(header.tail, vec![0x11, 0x22]);

        let moved = header.relayout([5; SECTION_COUNT]).unwrap();
        assert_eq!(moved.entry(SectionId::Pal).offset as usize, HEADER_LEN + 2);
        assert_eq!(moved.entry(SectionId::Spr).offset as usize, HEADER_LEN + 2 + 5 + 2);
    }

    #[test]
    fn rejects_bad_magic_and_short_files() {
        let mut data = file_with([0; SECTION_COUNT], 0);
        data[0] = b'X';
        assert!(matches!(Header::parse(&data), Err(DlcError::MalformedHeader(_))));
        assert!(matches!(
            Header::parse(&data[..HEADER_LEN - 1]),
            Err(DlcError::MalformedHeader(_))
        ));
    }

    #[test]
    fn rejects_unknown_and_misordered_tags() {
        let mut data = file_with([0; SECTION_COUNT], 0);
        data[IDENTITY_LEN + 3 * DIRECTORY_ENTRY_LEN..][..4].copy_from_slice(b"ZZZ\0");
        assert!(matches!(
            Header::parse(&data),
            Err(DlcError::UnknownSectionId { slot: 3, ref tag }) if tag == "ZZZ"
        ));

        let mut data = file_with([0; SECTION_COUNT], 0);
        data[IDENTITY_LEN..][..4].copy_from_slice(&SectionId::Spr.tag());
        data[IDENTITY_LEN + DIRECTORY_ENTRY_LEN..][..4].copy_from_slice(&SectionId::Pal.tag());
        assert!(matches!(Header::parse(&data), Err(DlcError::MalformedHeader(_))));
    }

    #[test]
    fn rejects_truncated_and_overlapping_sections() {
        let data = file_with([4; SECTION_COUNT], 0);
        assert!(matches!(
            Header::parse(&data[..data.len() - 1]),
            Err(DlcError::TruncatedSection { id: SectionId::Mtr, .. })
        ));

        let mut data = file_with([4; SECTION_COUNT], 0);
        // Pull CEL back by two bytes so it overlaps SPR
        let cel_offset = IDENTITY_LEN + 2 * DIRECTORY_ENTRY_LEN + 4;
        let moved = (HEADER_LEN as u32 + 6).to_le_bytes();
        data[cel_offset..cel_offset + 4].copy_from_slice(&moved);
        assert!(matches!(Header::parse(&data), Err(DlcError::MalformedHeader(_))));
    }
}
