//! Audio helpers that sit on top of the AMF/SEQ sections.

pub mod scale;

pub use scale::{install_scale, install_scale_files, ScaleGenerator, C_MAJOR_SCALE};
