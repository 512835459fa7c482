use pretty_assertions::assert_eq;

use crate::signature::{parse_signature_chunk, ComponentKind, ComponentMask, SystemValue};
use crate::test_utils::SignatureBuilder;
use crate::{FourCC, ReflectError};

fn push_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_le_bytes());
}

#[test]
fn parses_hand_built_v0_entry() {
    // One POSITION0 element at register 0, float4, fully read.
    let mut chunk = Vec::new();
    push_u32(&mut chunk, 1); // element count
    push_u32(&mut chunk, 8); // table offset
    push_u32(&mut chunk, 8 + 24); // name offset (after the single entry)
    push_u32(&mut chunk, 0); // semantic index
    push_u32(&mut chunk, 1); // system value: position
    push_u32(&mut chunk, 3); // component type: float32
    push_u32(&mut chunk, 0); // register
    push_u32(&mut chunk, 0x0f | (0x0f << 8)); // mask / rw mask / stream / precision
    chunk.extend_from_slice(b"POSITION\0");

    let elements = parse_signature_chunk(FourCC::ISGN, &chunk).expect("chunk should parse");
    assert_eq!(elements.len(), 1);
    let element = &elements[0];
    assert_eq!(element.semantic_name, "POSITION");
    assert_eq!(element.semantic_index, 0);
    assert_eq!(element.register, 0);
    assert_eq!(element.system_value, SystemValue::Position);
    assert_eq!(element.component_type, ComponentKind::Float32);
    assert_eq!(element.mask, ComponentMask::all());
    assert_eq!(element.read_write_mask, ComponentMask::all());
    assert_eq!(element.stream, 0);
}

#[test]
fn parses_built_v0_elements_in_order() {
    let chunk = SignatureBuilder::new()
        .element("POSITION", 0, 0, 1, 3, 0x0f, 0x0f)
        .element("TEXCOORD", 2, 1, 0, 3, 0x03, 0x03)
        .build_v0();

    let elements = parse_signature_chunk(FourCC::ISGN, &chunk).expect("chunk should parse");
    assert_eq!(elements.len(), 2);
    assert_eq!(elements[0].semantic_name, "POSITION");
    assert_eq!(elements[1].semantic_name, "TEXCOORD");
    assert_eq!(elements[1].semantic_index, 2);
    assert_eq!(elements[1].register, 1);
    assert_eq!(elements[1].system_value, SystemValue::Undefined);
    assert_eq!(elements[1].mask, ComponentMask::X | ComponentMask::Y);
}

#[test]
fn parses_v1_layout_for_extended_fourcc() {
    let chunk = SignatureBuilder::new()
        .element("SV_Target", 0, 0, 64, 3, 0x0f, 0x00)
        .build_v1();

    let elements = parse_signature_chunk(FourCC::OSG1, &chunk).expect("chunk should parse");
    assert_eq!(elements.len(), 1);
    assert_eq!(elements[0].system_value, SystemValue::Target);
    assert_eq!(elements[0].mask, ComponentMask::all());
    assert_eq!(elements[0].read_write_mask, ComponentMask::empty());
    assert_eq!(elements[0].stream, 0);
}

#[test]
fn empty_signature_is_ok() {
    let chunk = SignatureBuilder::new().build_v0();
    let elements = parse_signature_chunk(FourCC::OSGN, &chunk).expect("chunk should parse");
    assert!(elements.is_empty());
}

#[test]
fn unknown_system_value_and_component_are_kept_verbatim() {
    let chunk = SignatureBuilder::new()
        .element("WEIRD", 0, 0, 1234, 77, 0x01, 0x01)
        .build_v0();

    let elements = parse_signature_chunk(FourCC::ISGN, &chunk).expect("chunk should parse");
    assert_eq!(elements[0].system_value, SystemValue::Other(1234));
    assert_eq!(elements[0].component_type, ComponentKind::Other(77));
}

#[test]
fn rejects_truncated_element_table() {
    let mut chunk = Vec::new();
    push_u32(&mut chunk, 3); // claims three elements
    push_u32(&mut chunk, 8);
    chunk.extend_from_slice(&[0u8; 24]); // room for only one

    let err = parse_signature_chunk(FourCC::ISGN, &chunk).unwrap_err();
    assert!(matches!(err, ReflectError::InvalidChunk { fourcc, .. } if fourcc == FourCC::ISGN));
}

#[test]
fn rejects_unterminated_semantic_name() {
    let mut chunk = SignatureBuilder::new()
        .element("POSITION", 0, 0, 1, 3, 0x0f, 0x0f)
        .build_v0();
    chunk.pop(); // drop the terminator

    let err = parse_signature_chunk(FourCC::ISGN, &chunk).unwrap_err();
    assert!(matches!(err, ReflectError::InvalidChunk { .. }));
}

#[test]
fn rejects_name_offset_inside_element_table() {
    let mut chunk = Vec::new();
    push_u32(&mut chunk, 1);
    push_u32(&mut chunk, 8);
    push_u32(&mut chunk, 12); // name offset points into the entry itself
    push_u32(&mut chunk, 0);
    push_u32(&mut chunk, 0);
    push_u32(&mut chunk, 0);
    push_u32(&mut chunk, 0);
    push_u32(&mut chunk, 0);

    let err = parse_signature_chunk(FourCC::ISGN, &chunk).unwrap_err();
    assert!(matches!(err, ReflectError::InvalidChunk { .. }));
}

#[test]
fn component_mask_displays_as_letters() {
    assert_eq!(ComponentMask::all().to_string(), "xyzw");
    assert_eq!((ComponentMask::X | ComponentMask::Z).to_string(), "xz");
    assert_eq!(ComponentMask::empty().to_string(), "-");
}
