//! # Palette Table (PAL)
//!
//! A flat list of 64-colour tables. Sprite frames reference a table by index for each of their
//! four quadrants.

use crate::{
    binary_utils::ByteReader,
    dlc::SectionId,
    error::{DlcError, Result},
    graphics::indexed::IndexedImage,
};

pub const PAL_COLOURS: usize = 64;
pub const PAL_BYTES_PER_COLOUR: usize = 4;
pub const PAL_BYTES: usize = PAL_COLOURS * PAL_BYTES_PER_COLOUR;

/// One palette entry. `x` is a fourth channel whose meaning is unknown; it is kept as read.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Colour {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub x: u8,
}

impl Colour {
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Colour { r, g, b, x: 0 }
    }
}

pub type Palette = [Colour; PAL_COLOURS];

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PaletteTable {
    pub palettes: Vec<Palette>,
}

impl PaletteTable {
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() % PAL_BYTES != 0 {
            return Err(DlcError::MalformedSection {
                id: SectionId::Pal,
                reason: format!(
                    "length {} not divisible by palette size {}",
                    data.len(),
                    PAL_BYTES
                ),
            });
        }

        let mut reader = ByteReader::new(data);
        let mut palettes = Vec::with_capacity(data.len() / PAL_BYTES);
        while reader.remaining() > 0 {
            let mut palette = [Colour::default(); PAL_COLOURS];
            for colour in palette.iter_mut() {
                let [r, g, b, x] = reader.read_array::<4>().map_err(|e| {
                    DlcError::MalformedSection {
                        id: SectionId::Pal,
                        reason: e.to_string(),
                    }
                })?;
                *colour = Colour { r, g, b, x };
            }
            palettes.push(palette);
        }

        Ok(PaletteTable { palettes })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.palettes
            .iter()
            .flat_map(|palette| palette.iter())
            .flat_map(|c| [c.r, c.g, c.b, c.x])
            .collect()
    }

    pub fn len(&self) -> usize {
        self.palettes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.palettes.is_empty()
    }

    pub fn palette(&self, index: usize) -> Result<&Palette> {
        self.palettes.get(index).ok_or(DlcError::IndexOutOfRange {
            what: "palette",
            index,
            len: self.palettes.len(),
        })
    }

    /// Overwrite the 64 entries of an existing slot. The table never grows here.
    pub fn replace(&mut self, index: usize, palette: Palette) -> Result<()> {
        let len = self.palettes.len();
        let slot = self
            .palettes
            .get_mut(index)
            .ok_or(DlcError::IndexOutOfRange {
                what: "palette",
                index,
                len,
            })?;
        *slot = palette;
        Ok(())
    }

    /// Add a new table at the end and return its index.
    pub fn append(&mut self, palette: Palette) -> usize {
        self.palettes.push(palette);
        self.palettes.len() - 1
    }

    /// Build a full 64-entry table from an imported image. Unused slots are padded with black.
    pub fn extract_palette(image: &IndexedImage) -> Result<Palette> {
        if image.palette.len() > PAL_COLOURS {
            return Err(DlcError::TooManyColors(image.palette.len()));
        }

        let mut palette = [Colour::default(); PAL_COLOURS];
        for (slot, &[r, g, b]) in palette.iter_mut().zip(&image.palette) {
            *slot = Colour::rgb(r, g, b);
        }
        Ok(palette)
    }
}
