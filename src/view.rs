//! Zero-copy tensor views
//!
//! A [`TensorView`] borrows its bytes from the buffer backing an archive, so it
//! cannot outlive that archive. Views are built from validated metadata only,
//! which is what makes construction infallible.

use std::{fmt, ops::Range};

use crate::dtype::Dtype;
use crate::error::{Result, SafeviewError};
use crate::metadata::Metadata;

/// Borrowed view of one tensor's bytes
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct TensorView<'data> {
    dtype: Dtype,
    shape: &'data [u64],
    data: &'data [u8],
}

impl<'data> TensorView<'data> {
    /// Build a view over caller-supplied bytes
    ///
    /// # Errors
    ///
    /// Returns `InvalidTensorView` unless `data.len()` equals
    /// `product(shape) * dtype.byte_width()`.
    pub fn new(dtype: Dtype, shape: &'data [u64], data: &'data [u8]) -> Result<Self> {
        let n_bytes = shape
            .iter()
            .try_fold(1u64, |acc, &dim| acc.checked_mul(dim))
            .and_then(|n| n.checked_mul(u64::from(dtype.byte_width())));
        if n_bytes != Some(data.len() as u64) {
            return Err(SafeviewError::InvalidTensorView {
                dtype,
                shape: shape.to_vec(),
                len: data.len(),
            });
        }
        Ok(Self { dtype, shape, data })
    }

    /// Element type
    pub fn dtype(&self) -> Dtype {
        self.dtype
    }

    /// Dimensions (empty for a scalar)
    pub fn shape(&self) -> &'data [u64] {
        self.shape
    }

    /// Raw little-endian tensor bytes
    pub fn data(&self) -> &'data [u8] {
        self.data
    }

    /// Number of elements
    pub fn element_count(&self) -> u64 {
        self.shape.iter().product()
    }
}

impl fmt::Debug for TensorView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TensorView")
            .field("dtype", &self.dtype)
            .field("shape", &self.shape)
            .field("data_len", &self.data.len())
            .finish()
    }
}

/// Absolute byte ranges for each tensor, in declaration order
///
/// `metadata` must already have passed validation against a buffer whose
/// payload starts at `data_start`.
pub(crate) fn build_ranges(metadata: &Metadata, data_start: usize) -> Vec<Range<usize>> {
    metadata
        .tensors()
        .iter()
        .map(|(_, info)| {
            let [start, end] = info.data_offsets;
            // Validated offsets lie inside the buffer, so they fit in usize
            data_start + start as usize..data_start + end as usize
        })
        .collect()
}

/// View over an already validated record
pub(crate) fn view_at<'data>(
    buffer: &'data [u8],
    metadata: &'data Metadata,
    index: usize,
    range: Range<usize>,
) -> TensorView<'data> {
    let info = &metadata.tensors()[index].1;
    TensorView {
        dtype: info.dtype,
        shape: &info.shape,
        data: &buffer[range],
    }
}
