//! Header length prefix
//!
//! ```text
//! [0, 8)        header_len: u64 (little-endian)
//! [8, 8+H)      JSON header
//! [8+H, EOF)    tensor payload
//! ```

use std::ops::Range;

use tracing::debug;

use crate::error::{Result, SafeviewError};

/// Size of the length prefix in bytes
pub const N_LEN: usize = 8;

/// Default ceiling for the JSON header (100 MB)
pub const MAX_HEADER_SIZE: u64 = 100_000_000;

/// Validated length prefix
///
/// Constructing one guarantees that bytes `[8, 8 + header_len)` exist in the
/// buffer it was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderPrefix {
    header_len: u64,
}

impl HeaderPrefix {
    /// Read and bounds-check the length prefix of `buffer`
    ///
    /// # Errors
    ///
    /// - `HeaderTooSmall` if the buffer is shorter than 8 bytes
    /// - `HeaderTooLarge` if the declared length exceeds `max_header_size`
    /// - `InvalidHeaderLength` if `8 + header_len` overflows or runs past the buffer
    pub fn read(buffer: &[u8], max_header_size: u64) -> Result<Self> {
        let file_len = buffer.len() as u64;
        let prefix = match buffer.get(..N_LEN).and_then(|b| <[u8; N_LEN]>::try_from(b).ok()) {
            Some(prefix) => prefix,
            None => return Err(SafeviewError::HeaderTooSmall { len: file_len }),
        };
        let header_len = u64::from_le_bytes(prefix);

        if header_len > max_header_size {
            return Err(SafeviewError::HeaderTooLarge {
                header_len,
                limit: max_header_size,
            });
        }

        let stop = header_len
            .checked_add(N_LEN as u64)
            .ok_or(SafeviewError::InvalidHeaderLength {
                header_len,
                file_len,
            })?;
        if stop > file_len {
            return Err(SafeviewError::InvalidHeaderLength {
                header_len,
                file_len,
            });
        }

        debug!("Read safetensors header prefix: {} bytes", header_len);
        Ok(Self { header_len })
    }

    /// Declared JSON header length
    pub fn header_len(&self) -> u64 {
        self.header_len
    }

    /// Absolute offset of the first payload byte
    pub fn data_start(&self) -> usize {
        // Bounded by the buffer length checked in `read`
        N_LEN + self.header_len as usize
    }

    /// Absolute byte range of the JSON header
    pub fn json_range(&self) -> Range<usize> {
        N_LEN..self.data_start()
    }
}
