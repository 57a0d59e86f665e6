//! Indexed-colour view of an image file.
//!
//! The image crate hands back true-colour pixels, so the colour table is rebuilt here. Entry 0 is
//! held for transparency and distinct opaque colours follow in the order they first appear when
//! scanning rows top to bottom.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use image::RgbaImage;
use tracing::debug;

use crate::error::{DlcError, Result};
use crate::formats::pal::PAL_COLOURS;

/// Colour index reserved for fully transparent pixels.
pub const TRANSPARENT_INDEX: u8 = 0;

/// Palette entry stored at the transparent index.
const TRANSPARENT_PLACEHOLDER: [u8; 3] = [0, 0, 0];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexedImage {
    pub width: u32,
    pub height: u32,
    /// RGB colour table, at most 64 entries
    pub palette: Vec<[u8; 3]>,
    /// One colour index per pixel, row-major
    pub pixels: Vec<u8>,
}

impl IndexedImage {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let decoded = image::open(path).map_err(|e| {
            DlcError::UnsupportedImageFormat(format!("{}: {}", path.display(), e))
        })?;
        debug!("Decoded {} ({}x{})", path.display(), decoded.width(), decoded.height());
        Self::from_rgba(&decoded.to_rgba8())
    }

    /// Reduce a true-colour image to an indexed one.
    ///
    /// Index 0 draws as transparent, so it is kept for fully transparent pixels and opaque
    /// colours are numbered from 1. At most 63 opaque colours fit.
    pub fn from_rgba(image: &RgbaImage) -> Result<Self> {
        let mut lookup: HashMap<[u8; 3], u8> = HashMap::new();
        let mut palette: Vec<[u8; 3]> = vec![TRANSPARENT_PLACEHOLDER];
        let mut pixels = Vec::with_capacity((image.width() * image.height()) as usize);
        let mut overflowed = false;

        for pixel in image.pixels() {
            if pixel[3] == 0 {
                pixels.push(TRANSPARENT_INDEX);
                continue;
            }
            let rgb = [pixel[0], pixel[1], pixel[2]];
            if let Some(&index) = lookup.get(&rgb) {
                pixels.push(index);
                continue;
            }

            if palette.len() == PAL_COLOURS {
                overflowed = true;
                break;
            }
            let index = palette.len() as u8;
            lookup.insert(rgb, index);
            palette.push(rgb);
            pixels.push(index);
        }

        if overflowed {
            // Count the remaining colours so the error reports the real total.
            let total = image
                .pixels()
                .filter(|p| p[3] != 0)
                .map(|p| [p[0], p[1], p[2]])
                .collect::<HashSet<_>>()
                .len();
            return Err(DlcError::TooManyColors(total));
        }

        Ok(IndexedImage {
            width: image.width(),
            height: image.height(),
            palette,
            pixels,
        })
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn index_at(&self, x: u32, y: u32) -> u8 {
        self.pixels[(y * self.width + x) as usize]
    }
}
