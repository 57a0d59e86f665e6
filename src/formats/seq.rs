//! # Sequence Script Table (SEQ)
//!
//! Variable-length instruction lists, one per behaviour slot. Each list ends with a sentinel
//! word whose value is stored in the section header, so it survives a decode/encode cycle
//! unchanged.
//!
//! Layout: u16 sequence count, u16 terminator, then the sequences back to back.

use std::collections::BTreeSet;
use std::io;

use tracing::debug;

use crate::{
    binary_utils::{ByteReader, ByteWriter},
    dlc::SectionId,
    error::{DlcError, Result},
    formats::action::{ActionCode, ActionMap},
};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SequenceTable {
    pub terminator: u16,
    /// Instruction words per slot, without the terminator
    pub sequences: Vec<Vec<u16>>,
    pub trailer: Vec<u8>,
    /// Slots rewritten as audio playlists; their words are track indices
    audio_slots: BTreeSet<usize>,
    actions: ActionMap,
}

fn malformed(e: io::Error) -> DlcError {
    DlcError::MalformedSection {
        id: SectionId::Seq,
        reason: e.to_string(),
    }
}

impl SequenceTable {
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut reader = ByteReader::new(data);
        let count = reader.read_u16_le().map_err(malformed)? as usize;
        let terminator = reader.read_u16_le().map_err(malformed)?;

        let mut sequences = Vec::with_capacity(count);
        for index in 0..count {
            let mut words = Vec::new();
            loop {
                let word = reader.read_u16_le().map_err(|e| DlcError::MalformedSection {
                    id: SectionId::Seq,
                    reason: format!("sequence {} is not terminated: {}", index, e),
                })?;
                if word == terminator {
                    break;
                }
                words.push(word);
            }
            sequences.push(words);
        }

        debug!("SEQ: {} sequences, terminator {:#06x}", count, terminator);

        Ok(SequenceTable {
            terminator,
            sequences,
            trailer: reader.read_rest(),
            audio_slots: BTreeSet::new(),
            actions: ActionMap::new(),
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let words: usize = self.sequences.iter().map(|s| s.len() + 1).sum();
        let mut writer = ByteWriter::with_capacity(4 + words * 2 + self.trailer.len());
        writer.write_u16_le(self.sequences.len() as u16);
        writer.write_u16_le(self.terminator);
        for sequence in &self.sequences {
            for &word in sequence {
                writer.write_u16_le(word);
            }
            writer.write_u16_le(self.terminator);
        }
        writer.write_bytes(&self.trailer);
        writer.into_inner()
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    pub fn actions(&self) -> &ActionMap {
        &self.actions
    }

    /// Attach the action-code table. Every entry must name an existing slot.
    pub fn set_action_map(&mut self, actions: ActionMap) -> Result<()> {
        if let Some((_, index)) = actions.iter().find(|&(_, seq)| seq >= self.sequences.len()) {
            return Err(DlcError::IndexOutOfRange {
                what: "sequence",
                index,
                len: self.sequences.len(),
            });
        }
        self.actions = actions;
        Ok(())
    }

    pub fn lookup(&self, code: ActionCode) -> Result<usize> {
        self.actions
            .get(code)
            .ok_or(DlcError::UnknownActionCode(code))
    }

    pub fn sequence(&self, index: usize) -> Result<&[u16]> {
        self.sequences
            .get(index)
            .map(Vec::as_slice)
            .ok_or(DlcError::IndexOutOfRange {
                what: "sequence",
                index,
                len: self.sequences.len(),
            })
    }

    fn sequence_mut(&mut self, index: usize) -> Result<&mut Vec<u16>> {
        let len = self.sequences.len();
        self.sequences
            .get_mut(index)
            .ok_or(DlcError::IndexOutOfRange {
                what: "sequence",
                index,
                len,
            })
    }

    fn check_word(&self, word: u16) -> Result<()> {
        if word == self.terminator {
            return Err(DlcError::TerminatorCollision(word));
        }
        Ok(())
    }

    /// Replace a slot's instructions. The terminator is implied and must not appear in `words`.
    pub fn set_sequence(&mut self, index: usize, words: Vec<u16>) -> Result<()> {
        for &word in &words {
            self.check_word(word)?;
        }
        *self.sequence_mut(index)? = words;
        self.audio_slots.remove(&index);
        Ok(())
    }

    /// Make a slot play exactly `track_indices`, in order.
    pub fn set_audio_sequence(&mut self, index: usize, track_indices: &[u16]) -> Result<()> {
        self.set_sequence(index, track_indices.to_vec())?;
        self.audio_slots.insert(index);
        Ok(())
    }

    pub fn is_audio_sequence(&self, index: usize) -> bool {
        self.audio_slots.contains(&index)
    }

    pub fn set_instruction(&mut self, index: usize, position: usize, word: u16) -> Result<()> {
        self.check_word(word)?;
        let sequence = self.sequence_mut(index)?;
        let len = sequence.len();
        let slot = sequence
            .get_mut(position)
            .ok_or(DlcError::IndexOutOfRange {
                what: "instruction",
                index: position,
                len,
            })?;
        *slot = word;
        self.audio_slots.remove(&index);
        Ok(())
    }

    pub fn truncate_sequence(&mut self, index: usize, len: usize) -> Result<()> {
        self.sequence_mut(index)?.truncate(len);
        Ok(())
    }

    /// Audio slots may only name tracks that exist.
    pub fn validate(&self, track_count: usize) -> Result<()> {
        for &slot in &self.audio_slots {
            let Some(words) = self.sequences.get(slot) else {
                continue;
            };
            if let Some(&bad) = words.iter().find(|&&w| w as usize >= track_count) {
                return Err(DlcError::DanglingReference {
                    owner: "sequence",
                    owner_index: slot,
                    target: "track",
                    index: bad as usize,
                    len: track_count,
                });
            }
        }
        Ok(())
    }
}
