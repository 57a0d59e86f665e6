//! Compose sprite frames into RGBA images and export them as optimised PNGs.

use std::{
    fs,
    path::{Path, PathBuf},
};

use image::{Rgba, RgbaImage};
use oxipng::{InFile, OutFile};
use tracing::{debug, info, warn};

use crate::{
    dlc::Dlc,
    error::{DlcError, Result},
    formats::{cel::CEL_DIM, spr::QUADRANTS},
    graphics::indexed::TRANSPARENT_INDEX,
};

pub const FRAME_DIM: u32 = (CEL_DIM * 2) as u32;

/// Render one frame at 128x128. Colour index 0 is transparent. A cel pixel past the end of its
/// palette fails with `PaletteMismatch`.
pub fn render_frame(dlc: &Dlc, frame_index: usize) -> Result<RgbaImage> {
    let frame = dlc.sprites()?.frame(frame_index)?;
    let cels = dlc.cels()?;
    let palettes = dlc.palettes()?;

    let mut image = RgbaImage::new(FRAME_DIM, FRAME_DIM);
    for (i, quadrant) in frame.quadrants.iter().enumerate().take(QUADRANTS) {
        let cel = cels.cel(quadrant.cel as usize)?;
        let palette = palettes.palette(quadrant.palette as usize)?;
        let origin_x = (i % 2) * CEL_DIM;
        let origin_y = (i / 2) * CEL_DIM;

        for y in 0..CEL_DIM {
            for x in 0..CEL_DIM {
                let index = cel.pixel(x, y);
                if index == TRANSPARENT_INDEX {
                    continue;
                }
                let colour = palette.get(index as usize).ok_or(DlcError::PaletteMismatch {
                    index,
                    palette_len: palette.len(),
                })?;
                image.put_pixel(
                    (origin_x + x) as u32,
                    (origin_y + y) as u32,
                    Rgba([colour.r, colour.g, colour.b, 255]),
                );
            }
        }
    }

    Ok(image)
}

/// Save every frame as `frame_NNNN.png` in `out_dir`. Returns the written paths.
pub fn export_frames<P: AsRef<Path>>(dlc: &Dlc, out_dir: P) -> Result<Vec<PathBuf>> {
    let out_dir = out_dir.as_ref();
    fs::create_dir_all(out_dir)?;

    let frame_count = dlc.sprites()?.frames.len();
    let mut written = Vec::with_capacity(frame_count);
    for index in 0..frame_count {
        let image = render_frame(dlc, index)?;
        let path = out_dir.join(format!("frame_{:04}.png", index));
        image
            .save(&path)
            .map_err(|e| DlcError::Png(format!("{}: {}", path.display(), e)))?;
        optimise_png(&path)?;
        debug!("Wrote {}", path.display());
        written.push(path);
    }

    info!("Exported {} frames to {}", written.len(), out_dir.display());
    Ok(written)
}

/// Optimises a PNG file in place using oxipng
fn optimise_png(path: &Path) -> Result<()> {
    let temp_path = path.with_extension("temp.png");
    fs::rename(path, &temp_path)?;

    let mut options = oxipng::Options::from_preset(4);
    options.bit_depth_reduction = true;

    oxipng::optimize(
        &InFile::Path(temp_path.clone()),
        &OutFile::Path(Some(path.to_path_buf())),
        &options,
    )
    .map_err(|e| DlcError::Png(format!("optimisation of {} failed: {}", path.display(), e)))?;

    if let Err(e) = fs::remove_file(&temp_path) {
        warn!("Failed to remove temporary file {}: {}", temp_path.display(), e);
    }

    Ok(())
}
