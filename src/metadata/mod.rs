//! Safetensors JSON header decoding
//!
//! ## Header Format
//!
//! ```text
//! {
//!   "__metadata__": { "key": "value", ... },       (optional)
//!   "tensor_name": {
//!     "dtype": "F32" | "F16" | "I32" | ...,
//!     "shape": [dim1, dim2, ...],
//!     "data_offsets": [start, end]
//!   },
//!   ...
//! }
//! ```
//!
//! Tensor records are kept in the order they appear in the JSON text. That
//! order is the payload layout order checked by [`Metadata::validate`].

use std::{collections::HashMap, fmt};

use serde::{
    de::{self, MapAccess, Visitor},
    Deserialize, Deserializer, Serialize,
};
use tracing::debug;

use crate::dtype::Dtype;
use crate::error::{Result, SafeviewError};

pub mod validation;

/// Reserved top-level key holding free-form string metadata
pub const METADATA_KEY: &str = "__metadata__";

/// Per-tensor record from the header, before validation
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TensorInfo {
    /// Element type
    pub dtype: Dtype,
    /// Dimensions (empty for a scalar)
    pub shape: Vec<u64>,
    /// Byte range `[start, end)` relative to the payload region
    pub data_offsets: [u64; 2],
}

/// Decoded header: tensor records in declaration order plus user metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    user_metadata: Option<HashMap<String, String>>,
    tensors: Vec<(String, TensorInfo)>,
    index_map: HashMap<String, usize>,
}

impl Metadata {
    /// Decode the raw JSON header bytes
    ///
    /// # Errors
    ///
    /// - `InvalidHeaderEncoding` if the bytes are not strict UTF-8
    /// - `InvalidHeaderJson` if the text is not a JSON object of tensor
    ///   records, names an unknown dtype, or repeats a tensor name
    pub fn from_json_bytes(json_bytes: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(json_bytes).map_err(SafeviewError::InvalidHeaderEncoding)?;
        let metadata: Metadata =
            serde_json::from_str(text).map_err(SafeviewError::InvalidHeaderJson)?;
        debug!("Decoded safetensors header: {} tensors", metadata.len());
        Ok(metadata)
    }

    /// Number of tensor records
    pub fn len(&self) -> usize {
        self.tensors.len()
    }

    /// True if the header declares no tensors
    pub fn is_empty(&self) -> bool {
        self.tensors.is_empty()
    }

    /// Tensor records in declaration order
    pub fn tensors(&self) -> &[(String, TensorInfo)] {
        &self.tensors
    }

    /// Record for `name`, if declared
    pub fn info(&self, name: &str) -> Option<&TensorInfo> {
        self.index_of(name).map(|i| &self.tensors[i].1)
    }

    /// Position of `name` in declaration order
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index_map.get(name).copied()
    }

    /// Contents of the `__metadata__` entry
    pub fn user_metadata(&self) -> Option<&HashMap<String, String>> {
        self.user_metadata.as_ref()
    }
}

struct MetadataVisitor;

impl<'de> Visitor<'de> for MetadataVisitor {
    type Value = Metadata;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "a JSON object of safetensors tensor records")
    }

    fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut user_metadata = None;
        let mut tensors = Vec::with_capacity(map.size_hint().unwrap_or(0));
        let mut index_map = HashMap::with_capacity(map.size_hint().unwrap_or(0));

        while let Some(name) = map.next_key::<String>()? {
            if name == METADATA_KEY {
                if user_metadata.is_some() {
                    return Err(de::Error::duplicate_field(METADATA_KEY));
                }
                user_metadata = Some(map.next_value::<HashMap<String, String>>()?);
                continue;
            }

            let info = map.next_value::<TensorInfo>()?;
            if index_map.insert(name.clone(), tensors.len()).is_some() {
                return Err(de::Error::custom(format!("duplicate tensor name '{name}'")));
            }
            tensors.push((name, info));
        }

        Ok(Metadata {
            user_metadata,
            tensors,
            index_map,
        })
    }
}

impl<'de> Deserialize<'de> for Metadata {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(MetadataVisitor)
    }
}
