//! # Safeview
//!
//! Validating, zero-copy reader for safetensors archives.
//!
//! A safetensors file is an 8-byte little-endian header length, a JSON header
//! describing each tensor, and a flat payload holding every tensor's bytes back
//! to back. Safeview treats the file as untrusted input: the header is bounds
//! checked, decoded strictly, and validated in one forward pass before any
//! tensor is exposed. Tensor data is never copied; every [`TensorView`]
//! borrows straight from the memory-mapped file.
//!
//! ## Example
//!
//! ```rust
//! use safeview::{Archive, Dtype};
//!
//! let json = br#"{"test":{"dtype":"I32","shape":[],"data_offsets":[0,4]}}"#;
//! let mut bytes = (json.len() as u64).to_le_bytes().to_vec();
//! bytes.extend_from_slice(json);
//! bytes.extend_from_slice(&7i32.to_le_bytes());
//!
//! let archive = Archive::from_buffer(bytes).unwrap();
//! assert_eq!(archive.len(), 1);
//!
//! let view = archive.get("test").unwrap();
//! assert_eq!(view.dtype(), Dtype::I32);
//! assert!(view.shape().is_empty());
//! assert_eq!(view.data(), &7i32.to_le_bytes());
//! ```
//!
//! Files on disk are memory-mapped with [`Archive::deserialize`].
//!
//! ## Loading Pipeline
//!
//! 1. [`header`]: read and bounds-check the length prefix
//! 2. [`metadata`]: decode the JSON header, keeping declaration order
//! 3. [`metadata::validation`]: check contiguity, sizes and file coverage
//! 4. [`view`]: resolve absolute byte ranges for each tensor
//!
//! Any failure stops the pipeline and is returned as a [`SafeviewError`].

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
// Clippy allows (MUST come after deny/warn to override them)
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)] // u64 offsets are bounded by the buffer length
#![allow(clippy::must_use_candidate)] // Not all methods need #[must_use]
#![allow(clippy::doc_markdown)] // Allow technical terms without backticks
#![allow(clippy::missing_panics_doc)] // Allow missing Panics doc sections

pub mod archive;
pub mod config;
pub mod dtype;
pub mod error;
pub mod header;
pub mod metadata;
pub mod view;

pub use archive::{Archive, Iter};
pub use config::LoadConfig;
pub use dtype::Dtype;
pub use error::{Result, SafeviewError};
pub use metadata::{Metadata, TensorInfo};
pub use view::TensorView;
