//! Load configuration

use serde::{Deserialize, Serialize};

use crate::header::MAX_HEADER_SIZE;

/// Options applied while loading an archive
///
/// ```rust
/// use safeview::LoadConfig;
///
/// let config = LoadConfig::new().with_max_header_size(1024);
/// assert_eq!(config.max_header_size, 1024);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadConfig {
    /// Largest accepted JSON header, in bytes
    #[serde(default = "default_max_header_size")]
    pub max_header_size: u64,
}

fn default_max_header_size() -> u64 {
    MAX_HEADER_SIZE
}

impl LoadConfig {
    /// Create a config with default limits
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the header size ceiling
    #[must_use]
    pub fn with_max_header_size(mut self, max_header_size: u64) -> Self {
        self.max_header_size = max_header_size;
        self
    }
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            max_header_size: MAX_HEADER_SIZE,
        }
    }
}
