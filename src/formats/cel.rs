//! # Cel Store (CEL)
//!
//! Raw, uncoloured 64x64 tiles. Each byte is an index into whichever palette the referencing
//! frame pairs the tile with.
//!
//! Slot 0 is the transparent tile and slot 1 a solid "blank" tile by convention; content packs
//! alias other tiles onto these slots to blank out parts of a sprite.

use crate::{
    dlc::SectionId,
    error::{DlcError, Result},
    graphics::indexed::IndexedImage,
};

pub const CEL_DIM: usize = 64;
pub const CEL_BYTES: usize = CEL_DIM * CEL_DIM;
/// Frames address cels with a u16
pub const MAX_CELS: usize = u16::MAX as usize + 1;

pub const TRANSPARENT_CEL: usize = 0;
pub const BLANK_CEL: usize = 1;

#[derive(Clone, PartialEq, Eq)]
pub struct Cel {
    pixels: Box<[u8; CEL_BYTES]>,
}

impl std::fmt::Debug for Cel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let used = self.pixels.iter().filter(|&&p| p != 0).count();
        write!(f, "Cel {{ {} non-zero pixels }}", used)
    }
}

impl Default for Cel {
    fn default() -> Self {
        Cel {
            pixels: Box::new([0u8; CEL_BYTES]),
        }
    }
}

impl Cel {
    pub fn filled(index: u8) -> Self {
        Cel {
            pixels: Box::new([index; CEL_BYTES]),
        }
    }

    pub fn from_slice(data: &[u8]) -> Option<Self> {
        if data.len() != CEL_BYTES {
            return None;
        }
        let mut pixels = Box::new([0u8; CEL_BYTES]);
        pixels.copy_from_slice(data);
        Some(Cel { pixels })
    }

    pub fn pixel(&self, x: usize, y: usize) -> u8 {
        self.pixels[y * CEL_DIM + x]
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, index: u8) {
        self.pixels[y * CEL_DIM + x] = index;
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels[..]
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CelStore {
    pub cels: Vec<Cel>,
}

impl CelStore {
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() % CEL_BYTES != 0 {
            return Err(DlcError::MalformedSection {
                id: SectionId::Cel,
                reason: format!(
                    "length {} not divisible by cel size {}",
                    data.len(),
                    CEL_BYTES
                ),
            });
        }

        let cels = data
            .chunks_exact(CEL_BYTES)
            .filter_map(Cel::from_slice)
            .collect();
        Ok(CelStore { cels })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.cels.len() * CEL_BYTES);
        for cel in &self.cels {
            out.extend_from_slice(cel.as_bytes());
        }
        out
    }

    pub fn len(&self) -> usize {
        self.cels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cels.is_empty()
    }

    pub fn cel(&self, index: usize) -> Result<&Cel> {
        self.cels.get(index).ok_or(DlcError::IndexOutOfRange {
            what: "cel",
            index,
            len: self.cels.len(),
        })
    }

    /// Split a 128x128 image into four 64x64 cels: top-left, top-right, bottom-left,
    /// bottom-right.
    ///
    /// Pixel values are the image's own colour indices, which line up with the palette
    /// [`PaletteTable::extract_palette`](super::pal::PaletteTable::extract_palette) builds from
    /// the same image.
    pub fn quarterize(image: &IndexedImage) -> Result<[Cel; 4]> {
        let expected = ((CEL_DIM * 2) as u32, (CEL_DIM * 2) as u32);
        if image.dimensions() != expected {
            return Err(DlcError::WrongDimensions {
                expected,
                actual: image.dimensions(),
            });
        }

        if let Some(&bad) = image
            .pixels
            .iter()
            .find(|&&index| index as usize >= image.palette.len())
        {
            return Err(DlcError::PaletteMismatch {
                index: bad,
                palette_len: image.palette.len(),
            });
        }

        let mut quarters: [Cel; 4] = Default::default();
        for (quadrant, cel) in quarters.iter_mut().enumerate() {
            let origin_x = (quadrant % 2) * CEL_DIM;
            let origin_y = (quadrant / 2) * CEL_DIM;
            for y in 0..CEL_DIM {
                for x in 0..CEL_DIM {
                    let index = image.index_at((origin_x + x) as u32, (origin_y + y) as u32);
                    cel.set_pixel(x, y, index);
                }
            }
        }
        Ok(quarters)
    }

    /// Append cels at the end of the store, returning the index of the first new one.
    pub fn append<I>(&mut self, cels: I) -> Result<usize>
    where
        I: IntoIterator<Item = Cel>,
    {
        let new: Vec<Cel> = cels.into_iter().collect();
        let available = MAX_CELS.saturating_sub(self.cels.len());
        if new.len() > available {
            return Err(DlcError::TooManyCels {
                requested: new.len(),
                available,
            });
        }

        let first = self.cels.len();
        self.cels.extend(new);
        Ok(first)
    }

    /// Copy the pixels of `src` over `dst`. The two slots stay independent afterwards.
    pub fn alias(&mut self, dst: usize, src: usize) -> Result<()> {
        let copy = self.cel(src)?.clone();
        let len = self.cels.len();
        let slot = self.cels.get_mut(dst).ok_or(DlcError::IndexOutOfRange {
            what: "cel",
            index: dst,
            len,
        })?;
        *slot = copy;
        Ok(())
    }

    /// Drop every cel from `len` onwards. Frames still pointing there fail the next build.
    pub fn truncate(&mut self, len: usize) {
        self.cels.truncate(len);
    }
}
