//! End-to-end loading scenarios against files on disk
//!
//! Each case writes raw bytes to a temp file and loads it through the
//! memory-mapped entry point.

use std::io::Write;

use safeview::{Archive, Dtype, SafeviewError};

fn write_file(bytes: &[u8]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file creation");
    file.write_all(bytes).expect("write archive");
    file.flush().expect("flush file");
    file
}

fn with_len_prefix(header_len: u64, json: &[u8], payload: &[u8]) -> Vec<u8> {
    let mut data = header_len.to_le_bytes().to_vec();
    data.extend_from_slice(json);
    data.extend_from_slice(payload);
    data
}

fn archive_bytes(json: &[u8], payload: &[u8]) -> Vec<u8> {
    with_len_prefix(json.len() as u64, json, payload)
}

fn load(bytes: &[u8]) -> Result<Archive, SafeviewError> {
    let file = write_file(bytes);
    Archive::deserialize(file.path())
}

const TEST_2X2_I32: &[u8] = br#"{"test":{"dtype":"I32","shape":[2,2],"data_offsets":[0,16]}}"#;

#[test]
fn test_empty_shapes_allowed() {
    let json = br#"{"test":{"dtype":"I32","shape":[],"data_offsets":[0,4]}}"#;
    let archive = load(&archive_bytes(json, &[0; 4])).expect("valid");

    assert_eq!(archive.names().collect::<Vec<_>>(), vec!["test"]);
    let tensor = archive.get("test").expect("test");
    assert!(tensor.shape().is_empty());
    assert_eq!(tensor.dtype(), Dtype::I32);
    assert_eq!(tensor.data(), &[0, 0, 0, 0]);
}

#[test]
fn test_deserialization() {
    let archive = load(&archive_bytes(TEST_2X2_I32, &[0; 16])).expect("valid");

    assert_eq!(archive.len(), 1);
    let tensor = archive.get("test").expect("test");
    assert_eq!(tensor.shape(), &[2, 2]);
    assert_eq!(tensor.dtype(), Dtype::I32);
    assert_eq!(tensor.data(), &[0u8; 16]);
}

#[test]
fn test_metadata_missing_bytes() {
    // Two payload bytes short
    let err = load(&archive_bytes(TEST_2X2_I32, &[0; 14])).unwrap_err();
    assert!(matches!(err, SafeviewError::BufferLengthMismatch { .. }));
}

#[test]
fn test_polyglot_trailing_bytes_rejected() {
    let mut payload = vec![0u8; 16];
    payload.extend_from_slice(b"extra_bogus_data_for_polyglot_file");
    let err = load(&archive_bytes(TEST_2X2_I32, &payload)).unwrap_err();
    assert!(matches!(
        err,
        SafeviewError::BufferLengthMismatch { .. }
    ));
}

#[test]
fn test_header_too_large() {
    let err = load(&with_len_prefix(0xFFFF_FF00, TEST_2X2_I32, &[0; 16])).unwrap_err();
    assert!(matches!(err, SafeviewError::HeaderTooLarge { .. }));
}

#[test]
fn test_header_too_small() {
    let err = load(&[]).unwrap_err();
    assert!(matches!(err, SafeviewError::HeaderTooSmall { .. }));
}

#[test]
fn test_invalid_header_length() {
    let err = load(&with_len_prefix(60, &[], &[])).unwrap_err();
    assert!(matches!(err, SafeviewError::InvalidHeaderLength { .. }));
}

#[test]
fn test_invalid_header_non_utf8() {
    let err = load(&with_len_prefix(1, &[0xFF], &[])).unwrap_err();
    assert!(matches!(err, SafeviewError::InvalidHeaderEncoding(_)));
}

#[test]
fn test_invalid_header_not_json() {
    let err = load(&with_len_prefix(1, b"{", &[])).unwrap_err();
    assert!(matches!(err, SafeviewError::InvalidHeaderJson(_)));
}

#[test]
fn test_whitespace_padded_header() {
    let archive = load(&archive_bytes(b"{}\x0D\x20\x09\x0A", &[])).expect("valid");
    assert_eq!(archive.len(), 0);
    assert!(archive.is_empty());
}

#[test]
fn test_zero_sized_tensor() {
    let json = br#"{"test":{"dtype":"I32","shape":[2,0],"data_offsets":[0, 0]}}"#;
    let archive = load(&archive_bytes(json, &[])).expect("valid");

    assert_eq!(archive.names().collect::<Vec<_>>(), vec!["test"]);
    let tensor = archive.get("test").expect("test");
    assert_eq!(tensor.shape(), &[2, 0]);
    assert_eq!(tensor.dtype(), Dtype::I32);
    assert!(tensor.data().is_empty());
}

#[test]
fn test_invalid_info() {
    let json = br#"{"test":{"dtype":"I32","shape":[2,2],"data_offsets":[0, 4]}}"#;
    let err = load(&archive_bytes(json, &[])).unwrap_err();
    assert!(matches!(err, SafeviewError::ShapeSizeMismatch { .. }));
}

#[test]
fn test_validation_overflow_shape() {
    // Overflow the element count
    let json = br#"{"test":{"dtype":"I32","shape":[2,18446744073709551614],"data_offsets":[0,16]}}"#;
    let err = load(&archive_bytes(json, &[0; 16])).unwrap_err();
    assert!(matches!(err, SafeviewError::ArithmeticOverflow { .. }));
}

#[test]
fn test_validation_overflow_bytes() {
    // Element count fits, element count * dtype size does not
    let json = br#"{"test":{"dtype":"I32","shape":[2,9223372036854775807],"data_offsets":[0,16]}}"#;
    let err = load(&archive_bytes(json, &[0; 16])).unwrap_err();
    assert!(matches!(err, SafeviewError::ArithmeticOverflow { .. }));
}

#[test]
fn test_empty_archive() {
    let archive = load(&archive_bytes(b"{}", &[])).expect("valid");
    assert_eq!(archive.len(), 0);
    assert_eq!(archive.iter().count(), 0);
}

#[test]
fn test_unknown_tensor_lookup() {
    let archive = load(&archive_bytes(TEST_2X2_I32, &[0; 16])).expect("valid");
    assert!(matches!(
        archive.get("other").unwrap_err(),
        SafeviewError::TensorNotFound(_)
    ));
}

#[test]
fn test_mixed_dtypes_round_trip() {
    let json = br#"{
        "__metadata__":{"format":"pt"},
        "flag":{"dtype":"BOOL","shape":[2],"data_offsets":[0,2]},
        "fp8":{"dtype":"F8_E4M3","shape":[3],"data_offsets":[2,5]},
        "half":{"dtype":"BF16","shape":[1],"data_offsets":[5,7]},
        "ids":{"dtype":"U64","shape":[1,1],"data_offsets":[7,15]}
    }"#;
    let payload: Vec<u8> = (1..=15).collect();
    let archive = load(&archive_bytes(json, &payload)).expect("valid");

    assert_eq!(archive.len(), 4);
    assert_eq!(archive.get("flag").expect("flag").data(), &payload[0..2]);
    assert_eq!(archive.get("fp8").expect("fp8").data(), &payload[2..5]);
    assert_eq!(archive.get("half").expect("half").data(), &payload[5..7]);
    assert_eq!(archive.get("ids").expect("ids").data(), &payload[7..15]);
    assert_eq!(archive.get("fp8").expect("fp8").dtype(), Dtype::F8_E4M3);
    assert_eq!(
        archive
            .user_metadata()
            .and_then(|m| m.get("format"))
            .map(String::as_str),
        Some("pt")
    );
}
