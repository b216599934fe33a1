//! Layout validation for decoded headers
//!
//! A single forward pass over the tensor records in declaration order. Each
//! record must start exactly where the previous one ended, and its byte range
//! must equal `product(shape) * byte_width(dtype)`. After the pass the running
//! cursor is the payload length, which must account for every byte of the
//! file.
//!
//! All arithmetic on header values is checked: the header is untrusted input.

use tracing::debug;

use super::{Metadata, TensorInfo};
use crate::error::{Result, SafeviewError};
use crate::header::N_LEN;

impl Metadata {
    /// Check that tensor byte ranges tile the payload region in order
    ///
    /// Returns the total payload length in bytes.
    ///
    /// # Errors
    ///
    /// - `OffsetInvalid` if a range does not start where the previous one
    ///   ended, or ends before it starts
    /// - `ArithmeticOverflow` if the element or byte count overflows `u64`
    /// - `ShapeSizeMismatch` if a range length disagrees with shape and dtype
    pub fn validate(&self) -> Result<u64> {
        let mut expected_start = 0u64;

        for (index, (name, info)) in self.tensors.iter().enumerate() {
            let [start, end] = info.data_offsets;
            if start != expected_start || end < start {
                return Err(SafeviewError::OffsetInvalid {
                    name: name.clone(),
                    index,
                    start,
                    end,
                    expected_start,
                });
            }
            expected_start = end;

            let n_bytes = byte_count(info).ok_or_else(|| SafeviewError::ArithmeticOverflow {
                name: name.clone(),
                index,
            })?;

            let declared = end - start;
            if declared != n_bytes {
                return Err(SafeviewError::ShapeSizeMismatch {
                    name: name.clone(),
                    index,
                    expected: n_bytes,
                    declared,
                });
            }
        }

        debug!(
            "Validated {} tensors covering {} payload bytes",
            self.tensors.len(),
            expected_start
        );
        Ok(expected_start)
    }
}

/// `product(shape) * byte_width(dtype)`, or `None` on overflow
pub(crate) fn byte_count(info: &TensorInfo) -> Option<u64> {
    info.shape
        .iter()
        .try_fold(1u64, |acc, &dim| acc.checked_mul(dim))?
        .checked_mul(u64::from(info.dtype.byte_width()))
}

/// Require `8 + header_len + payload_len == file_len` exactly
///
/// # Errors
///
/// `BufferLengthMismatch` if the file is truncated or carries trailing bytes.
pub fn check_buffer_coverage(payload_len: u64, header_len: u64, file_len: u64) -> Result<()> {
    let expected = payload_len
        .checked_add(N_LEN as u64)
        .and_then(|n| n.checked_add(header_len));
    match expected {
        Some(expected) if expected == file_len => Ok(()),
        expected => Err(SafeviewError::BufferLengthMismatch {
            expected: expected.unwrap_or(u64::MAX),
            actual: file_len,
        }),
    }
}
