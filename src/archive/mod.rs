//! Validated safetensors archives
//!
//! [`Archive`] owns the bytes of a safetensors file (a read-only memory map by
//! default, or any in-memory buffer) together with its decoded header. Loading
//! runs every check up front, so an `Archive` value is always fully valid and
//! lookups never fail on layout grounds.
//!
//! Tensor views borrow from the archive. Dropping the archive releases the
//! mapping, and the borrow checker rejects any view that would outlive it:
//!
//! ```compile_fail
//! use safeview::Archive;
//!
//! let view = {
//!     let archive = Archive::from_buffer(vec![2, 0, 0, 0, 0, 0, 0, 0, b'{', b'}']).unwrap();
//!     archive.get("weight").unwrap()
//! };
//! println!("{:?}", view.data());
//! ```

use std::{collections::HashMap, fmt, fs::File, ops::Range, path::Path};

use memmap2::{Mmap, MmapOptions};
use tracing::{debug, info};

use crate::config::LoadConfig;
use crate::error::{Result, SafeviewError};
use crate::header::{HeaderPrefix, N_LEN};
use crate::metadata::{validation::check_buffer_coverage, Metadata, TensorInfo};
use crate::view::{build_ranges, view_at, TensorView};

/// Immutable, validated safetensors archive
///
/// # Example
///
/// ```rust,ignore
/// let archive = Archive::deserialize("model.safetensors")?;
/// let weights = archive.get("layer1.weight")?;
/// // weights.data() is a zero-copy slice into the mapped file
/// ```
pub struct Archive<B = Mmap> {
    buffer: B,
    metadata: Metadata,
    header_len: u64,
    ranges: Vec<Range<usize>>,
}

impl Archive<Mmap> {
    /// Open, map and validate a safetensors file
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be opened or mapped, otherwise the
    /// first failure from header reading, decoding or validation.
    pub fn deserialize<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::deserialize_with(path, &LoadConfig::default())
    }

    /// Like [`Archive::deserialize`] with explicit limits
    ///
    /// # Errors
    ///
    /// See [`Archive::deserialize`].
    pub fn deserialize_with<P: AsRef<Path>>(path: P, config: &LoadConfig) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading safetensors archive from: {}", path.display());

        let file = File::open(path)?;
        let file_len = file.metadata()?.len();
        if file_len < N_LEN as u64 {
            return Err(SafeviewError::HeaderTooSmall { len: file_len });
        }

        // SAFETY: the map is read-only. Mutating the file while it is mapped is
        // outside what this type can guard against.
        let mmap = unsafe { MmapOptions::new().map(&file)? };

        Self::from_buffer_with(mmap, config)
    }
}

impl<B: AsRef<[u8]>> Archive<B> {
    /// Validate an in-memory safetensors buffer
    ///
    /// # Errors
    ///
    /// Returns the first failure from header reading, decoding or validation.
    pub fn from_buffer(buffer: B) -> Result<Self> {
        Self::from_buffer_with(buffer, &LoadConfig::default())
    }

    /// Like [`Archive::from_buffer`] with explicit limits
    ///
    /// # Errors
    ///
    /// See [`Archive::from_buffer`].
    pub fn from_buffer_with(buffer: B, config: &LoadConfig) -> Result<Self> {
        let bytes = buffer.as_ref();
        let prefix = HeaderPrefix::read(bytes, config.max_header_size)?;
        let metadata = Metadata::from_json_bytes(&bytes[prefix.json_range()])?;

        let payload_len = metadata.validate()?;
        check_buffer_coverage(payload_len, prefix.header_len(), bytes.len() as u64)?;

        let ranges = build_ranges(&metadata, prefix.data_start());
        debug!(
            "Built {} tensor views over {} payload bytes",
            ranges.len(),
            payload_len
        );

        Ok(Self {
            buffer,
            metadata,
            header_len: prefix.header_len(),
            ranges,
        })
    }

    /// View of tensor `name`
    ///
    /// # Errors
    ///
    /// Returns `TensorNotFound` if the header does not declare `name`.
    pub fn get(&self, name: &str) -> Result<TensorView<'_>> {
        let index = self
            .metadata
            .index_of(name)
            .ok_or_else(|| SafeviewError::TensorNotFound(name.to_string()))?;
        Ok(self.view(index))
    }

    /// True if the header declares `name`
    pub fn contains(&self, name: &str) -> bool {
        self.metadata.index_of(name).is_some()
    }

    /// Number of tensors
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// True if the archive holds no tensors
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Tensor names in declaration order
    pub fn names(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.metadata.tensors().iter().map(|(name, _)| name.as_str())
    }

    /// `(name, view)` pairs in declaration order
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            buffer: self.buffer.as_ref(),
            metadata: &self.metadata,
            ranges: self.ranges.iter().enumerate(),
        }
    }

    /// All `(name, view)` pairs collected in declaration order
    pub fn tensors(&self) -> Vec<(&str, TensorView<'_>)> {
        self.iter().collect()
    }

    /// Header record for `name`
    pub fn info(&self, name: &str) -> Option<&TensorInfo> {
        self.metadata.info(name)
    }

    /// Decoded header
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Contents of the `__metadata__` entry
    pub fn user_metadata(&self) -> Option<&HashMap<String, String>> {
        self.metadata.user_metadata()
    }

    /// Declared JSON header length
    pub fn header_len(&self) -> u64 {
        self.header_len
    }

    /// Absolute offset of the payload region
    pub fn data_offset(&self) -> usize {
        N_LEN + self.header_len as usize
    }

    /// Whole underlying file
    pub fn buffer(&self) -> &[u8] {
        self.buffer.as_ref()
    }

    fn view(&self, index: usize) -> TensorView<'_> {
        view_at(
            self.buffer.as_ref(),
            &self.metadata,
            index,
            self.ranges[index].clone(),
        )
    }
}

impl<B: AsRef<[u8]>> fmt::Debug for Archive<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Archive")
            .field("file_len", &self.buffer.as_ref().len())
            .field("header_len", &self.header_len)
            .field("tensors", &self.ranges.len())
            .finish()
    }
}

/// Iterator over `(name, view)` pairs of an [`Archive`]
#[derive(Clone)]
pub struct Iter<'a> {
    buffer: &'a [u8],
    metadata: &'a Metadata,
    ranges: std::iter::Enumerate<std::slice::Iter<'a, Range<usize>>>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, TensorView<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        let (index, range) = self.ranges.next()?;
        let name = self.metadata.tensors()[index].0.as_str();
        Some((
            name,
            view_at(self.buffer, self.metadata, index, range.clone()),
        ))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.ranges.size_hint()
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl fmt::Debug for Iter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter")
            .field("remaining", &self.ranges.len())
            .finish()
    }
}

impl<'a, B: AsRef<[u8]>> IntoIterator for &'a Archive<B> {
    type Item = (&'a str, TensorView<'a>);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
