use pretty_assertions::assert_eq;

use crate::test_utils::build_container;
use crate::{Container, FourCC, ReflectError};

#[test]
fn built_container_roundtrips() {
    let rdef = [1u8, 2, 3, 4, 5];
    let stat = [9u8; 12];
    let bytes = build_container(&[(FourCC::RDEF, &rdef), (FourCC::STAT, &stat)]);

    let container = Container::parse(&bytes).expect("built container should parse");
    assert_eq!(container.chunk_count(), 2);
    assert_eq!(container.checksum(), &[0u8; 16]);
    assert_eq!(container.chunk(FourCC::RDEF), Some(&rdef[..]));
    assert_eq!(container.chunk(FourCC::STAT), Some(&stat[..]));
    assert_eq!(container.chunk(FourCC::ISGN), None);

    let order: Vec<FourCC> = container.chunks().map(|(fourcc, _)| fourcc).collect();
    assert_eq!(order, vec![FourCC::RDEF, FourCC::STAT]);
}

#[test]
fn rejects_truncated_header() {
    let err = Container::parse(b"DXBC").unwrap_err();
    assert!(matches!(err, ReflectError::MalformedHeader { .. }));
}

#[test]
fn rejects_bad_magic() {
    let mut bytes = build_container(&[]);
    bytes[0..4].copy_from_slice(b"NOPE");
    let err = Container::parse(&bytes).unwrap_err();
    assert!(matches!(err, ReflectError::MalformedHeader { .. }));
}

#[test]
fn rejects_total_size_beyond_input() {
    let mut bytes = build_container(&[(FourCC::RDEF, &[0u8; 4])]);
    let huge = (bytes.len() as u32 + 1).to_le_bytes();
    bytes[24..28].copy_from_slice(&huge);
    let err = Container::parse(&bytes).unwrap_err();
    assert!(matches!(err, ReflectError::MalformedHeader { .. }));
}

#[test]
fn rejects_chunk_offset_outside_container() {
    let mut bytes = build_container(&[(FourCC::RDEF, &[0u8; 4])]);
    // Point the single chunk offset past the end of the container.
    let total = bytes.len() as u32;
    bytes[32..36].copy_from_slice(&total.to_le_bytes());
    let err = Container::parse(&bytes).unwrap_err();
    assert!(matches!(err, ReflectError::MalformedOffsets { .. }));
}

#[test]
fn rejects_chunk_size_overrunning_container() {
    let mut bytes = build_container(&[(FourCC::RDEF, &[0u8; 4])]);
    // Inflate the declared chunk size; the chunk header sits right after
    // the offset table (header 32 bytes + one 4-byte offset entry).
    let size_pos = 36 + 4;
    bytes[size_pos..size_pos + 4].copy_from_slice(&u32::MAX.to_le_bytes());
    let err = Container::parse(&bytes).unwrap_err();
    assert!(matches!(err, ReflectError::MalformedOffsets { .. }));
}

#[test]
fn rejects_excessive_chunk_count() {
    let mut bytes = build_container(&[]);
    bytes[28..32].copy_from_slice(&100_000u32.to_le_bytes());
    let err = Container::parse(&bytes).unwrap_err();
    assert!(matches!(err, ReflectError::MalformedOffsets { .. }));
}

#[test]
fn duplicate_chunks_resolve_to_first() {
    let first = [1u8; 4];
    let second = [2u8; 4];
    let bytes = build_container(&[(FourCC::RDEF, &first), (FourCC::RDEF, &second)]);

    let container = Container::parse(&bytes).expect("container should parse");
    assert_eq!(container.chunk_count(), 2);
    assert_eq!(container.chunk(FourCC::RDEF), Some(&first[..]));
}
