//! Tool configuration, read from a JSON file.
//!
//! ```json
//! {
//!   "minify_length": 128,
//!   "actions": [
//!     { "code": "75-0-0-3", "sequence": 22 },
//!     { "code": "75-0-4-4", "sequence": 15 }
//!   ]
//! }
//! ```

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::Result,
    formats::{
        action::{ActionEntry, ActionMap},
        amf::DEFAULT_MINIFY_LEN,
    },
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Track length used by `minify` when none is given
    pub minify_length: usize,
    /// Action code to sequence index table
    pub actions: Vec<ActionEntry>,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            minify_length: DEFAULT_MINIFY_LEN,
            actions: Vec::new(),
        }
    }
}

impl ToolConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let config: ToolConfig = serde_json::from_str(&text)?;
        debug!(
            "Config {}: {} action entries, minify length {}",
            path.display(),
            config.actions.len(),
            config.minify_length
        );
        Ok(config)
    }

    pub fn action_map(&self) -> ActionMap {
        ActionMap::from_entries(self.actions.iter().cloned())
    }
}
