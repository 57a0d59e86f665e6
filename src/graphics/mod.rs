//! Image handling for the sprite sections
//!
//! Decoding source artwork into palette-indexed pixels for import, and rendering stored frames
//! back out to PNG.

pub mod indexed;
pub mod render;

pub use indexed::{IndexedImage, TRANSPARENT_INDEX};
pub use render::{export_frames, render_frame};
