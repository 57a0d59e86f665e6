//! Read, edit and rebuild Furby Connect DLC content packs.
//!
//! ```no_run
//! use furby_dlc::{ActionCode, Dlc, ToolConfig};
//!
//! # fn main() -> furby_dlc::Result<()> {
//! let config = ToolConfig::load("furby.json")?;
//! let mut dlc = Dlc::load_with_actions("tu003410.dlc", config.action_map())?;
//! dlc.minify(config.minify_length)?;
//! dlc.replace_audio_files(ActionCode::new(75, 0, 0, 3), &["hello.a18"])?;
//! dlc.build("tu003410_edited.dlc")?;
//! # Ok(())
//! # }
//! ```

pub mod audio;
pub mod binary_utils;
pub mod config;
pub mod dlc;
pub mod error;
pub mod formats;
pub mod graphics;

pub use config::ToolConfig;
pub use dlc::{Dlc, SectionId};
pub use error::{DlcError, Result};
pub use formats::action::{ActionCode, ActionMap};
