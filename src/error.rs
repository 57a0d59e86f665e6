//! Error type shared by every DLC operation.

use thiserror::Error;

use crate::dlc::SectionId;
use crate::formats::action::ActionCode;

/// The primary error type for loading, editing and building DLC files.
#[derive(Debug, Error)]
pub enum DlcError {
    /// An error originating from file I/O.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The header or section directory is structurally invalid.
    #[error("Malformed header: {0}")]
    MalformedHeader(String),

    /// A directory entry points past the end of the file.
    #[error("Section {id} is truncated: offset {offset} + length {length} exceeds file length {file_len}")]
    TruncatedSection {
        id: SectionId,
        offset: u32,
        length: u32,
        file_len: usize,
    },

    /// A directory entry carries a tag that is not one of the nine known sections.
    #[error("Unknown section id {tag:?} in directory slot {slot}")]
    UnknownSectionId { slot: usize, tag: String },

    /// A section's bytes could not be decoded into its typed model.
    #[error("Malformed {id} section: {reason}")]
    MalformedSection { id: SectionId, reason: String },

    /// A section accessor was used on a document created without a source file.
    #[error("No DLC loaded")]
    NotLoaded,

    /// A frame, playlist or sequence references a slot that does not exist.
    #[error("{owner} {owner_index} references {target} {index}, but only {len} exist")]
    DanglingReference {
        owner: &'static str,
        owner_index: usize,
        target: &'static str,
        index: usize,
        len: usize,
    },

    /// A caller addressed a slot that does not exist.
    #[error("{what} index {index} out of range (len {len})")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("Wrong image dimensions: expected {expected:?}, got {actual:?}")]
    WrongDimensions {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("Image uses {0} distinct colours, at most 64 are supported")]
    TooManyColors(usize),

    #[error("Pixel colour index {index} is outside the {palette_len}-entry palette")]
    PaletteMismatch { index: u8, palette_len: usize },

    #[error("Unsupported image format: {0}")]
    UnsupportedImageFormat(String),

    #[error("Audio length {0} is not a multiple of 8")]
    InvalidAlignment(usize),

    #[error("Unknown action code {0}")]
    UnknownActionCode(ActionCode),

    #[error("Cannot add {requested} tracks: only {available} track slots remain")]
    TooManyTracks { requested: usize, available: usize },

    #[error("Cannot add {requested} cels: only {available} cel slots remain")]
    TooManyCels { requested: usize, available: usize },

    #[error("Scale requires exactly {expected} tracks, got {found}")]
    ScaleArity { expected: usize, found: usize },

    #[error("Instruction word {0:#06x} collides with the sequence terminator")]
    TerminatorCollision(u16),

    #[error("Invalid action code {0:?}: expected category-subcategory-group-variant")]
    InvalidActionCode(String),

    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("PNG error: {0}")]
    Png(String),
}

/// A convenience `Result` alias using [`DlcError`].
pub type Result<T> = std::result::Result<T, DlcError>;
