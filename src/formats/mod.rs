//! Codecs for the typed DLC sections.

pub mod action;
pub mod amf;
pub mod cel;
pub mod opaque;
pub mod pal;
pub mod seq;
pub mod spr;
