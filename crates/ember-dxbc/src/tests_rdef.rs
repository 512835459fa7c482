use pretty_assertions::assert_eq;

use crate::rdef::{
    parse_rdef_chunk, BindRange, ConstantBufferKind, ResourceDimension, ResourceKind, ReturnType,
    ScalarKind, ShaderStage, ShapeClass, VariableFlags,
};
use crate::test_utils::{CbufferSpec, RdefBuilder, ResourceSpec, VarSpec};
use crate::ReflectError;

fn push_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_le_bytes());
}

#[test]
fn parses_hand_built_minimal_binding() {
    // A single texture bound at t3; no constant buffers.
    let mut chunk = Vec::new();
    push_u32(&mut chunk, 0); // cb count
    push_u32(&mut chunk, 0); // cb offset
    push_u32(&mut chunk, 1); // resource count
    push_u32(&mut chunk, 28); // resource offset
    push_u32(&mut chunk, 0xffff_0500); // pixel shader 5.0
    push_u32(&mut chunk, 0); // flags
    push_u32(&mut chunk, 0); // creator offset

    push_u32(&mut chunk, 60); // name offset
    push_u32(&mut chunk, 2); // kind: texture
    push_u32(&mut chunk, 5); // return type: float
    push_u32(&mut chunk, 4); // dimension: 2d
    push_u32(&mut chunk, 0); // sample count
    push_u32(&mut chunk, 3); // bind point
    push_u32(&mut chunk, 1); // bind count
    push_u32(&mut chunk, 0); // flags
    chunk.extend_from_slice(b"tex0\0");

    let rdef = parse_rdef_chunk(&chunk).expect("chunk should parse");
    assert_eq!(rdef.stage, ShaderStage::Pixel);
    assert_eq!(rdef.model.major, 5);
    assert_eq!(rdef.model.minor, 0);
    assert_eq!(rdef.creator, None);
    assert!(rdef.constant_buffers.is_empty());
    assert_eq!(rdef.bound_resources.len(), 1);

    let rb = &rdef.bound_resources[0];
    assert_eq!(rb.name, "tex0");
    assert_eq!(rb.kind, ResourceKind::Texture);
    assert_eq!(rb.return_type, Some(ReturnType::Float));
    assert_eq!(rb.dimension, ResourceDimension::Texture2D);
    assert_eq!(rb.bind_point, 3);
    assert_eq!(rb.bind_count, 1);
}

#[test]
fn parses_constant_buffer_layout() {
    let chunk = RdefBuilder::vertex()
        .creator("ember shader compiler")
        .cbuffer(
            CbufferSpec::new("PerObject", 144)
                .variable(VarSpec::matrix_columns("WorldMatrix", 0))
                .variable(VarSpec::matrix_rows("ViewMatrix", 64))
                .variable(VarSpec::vector("TintColor", 128)),
        )
        .resource(ResourceSpec::cbuffer("PerObject", 0))
        .build();

    let rdef = parse_rdef_chunk(&chunk).expect("chunk should parse");
    assert_eq!(rdef.stage, ShaderStage::Vertex);
    assert_eq!(rdef.creator.as_deref(), Some("ember shader compiler"));
    assert_eq!(rdef.constant_buffers.len(), 1);

    let cb = &rdef.constant_buffers[0];
    assert_eq!(cb.name, "PerObject");
    assert_eq!(cb.kind, ConstantBufferKind::ConstantBuffer);
    assert_eq!(cb.size, 144);
    assert_eq!(cb.variables.len(), 3);

    let world = &cb.variables[0];
    assert_eq!(world.name, "WorldMatrix");
    assert_eq!(world.start_offset, 0);
    assert_eq!(world.size, 64);
    assert_eq!(world.ty.class, ShapeClass::MatrixColumns);
    assert_eq!(world.ty.scalar, ScalarKind::Float);
    assert_eq!((world.ty.rows, world.ty.columns), (4, 4));
    assert!(world.flags.contains(VariableFlags::USED));

    assert_eq!(cb.variables[1].ty.class, ShapeClass::MatrixRows);
    let tint = &cb.variables[2];
    assert_eq!(tint.ty.class, ShapeClass::Vector);
    assert_eq!(tint.start_offset, 128);
    assert_eq!(tint.size, 16);

    assert_eq!(rdef.bound_resources[0].kind, ResourceKind::CBuffer);
}

#[test]
fn texture_buffer_kind_stays_distinct() {
    let chunk = RdefBuilder::pixel()
        .cbuffer(
            CbufferSpec::texture_buffer("BoneTable", 64)
                .variable(VarSpec::vector("Row0", 0)),
        )
        .resource(ResourceSpec::tbuffer("BoneTable", 0))
        .build();

    let rdef = parse_rdef_chunk(&chunk).expect("chunk should parse");
    assert_eq!(
        rdef.constant_buffers[0].kind,
        ConstantBufferKind::TextureBuffer
    );
    assert_eq!(rdef.bound_resources[0].kind, ResourceKind::TBuffer);
}

#[test]
fn all_uav_kind_values_decode() {
    let mut builder = RdefBuilder::compute();
    for (i, kind) in [4u32, 6, 8, 9, 10, 11].into_iter().enumerate() {
        builder = builder.resource(ResourceSpec::raw(&format!("uav{i}"), kind, i as u32));
    }
    let rdef = parse_rdef_chunk(&builder.build()).expect("chunk should parse");

    let kinds: Vec<ResourceKind> = rdef.bound_resources.iter().map(|rb| rb.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ResourceKind::UavRwTyped,
            ResourceKind::UavRwStructured,
            ResourceKind::UavRwByteAddress,
            ResourceKind::UavAppendStructured,
            ResourceKind::UavConsumeStructured,
            ResourceKind::UavRwStructuredWithCounter,
        ]
    );
}

#[test]
fn unsupported_resource_kind_value_is_rejected() {
    let chunk = RdefBuilder::pixel()
        .resource(ResourceSpec::raw("mystery", 12, 0))
        .build();

    let err = parse_rdef_chunk(&chunk).unwrap_err();
    match err {
        ReflectError::UnsupportedResourceKind { name, kind } => {
            assert_eq!(name, "mystery");
            assert_eq!(kind, 12);
        }
        other => panic!("expected UnsupportedResourceKind, got {other:?}"),
    }
}

#[test]
fn variable_escaping_its_buffer_is_rejected() {
    let chunk = RdefBuilder::vertex()
        .cbuffer(
            CbufferSpec::new("Small", 32)
                .variable(VarSpec::vector("Fits", 0))
                .variable(VarSpec::matrix_columns("Escapes", 16)),
        )
        .build();

    let err = parse_rdef_chunk(&chunk).unwrap_err();
    match err {
        ReflectError::VariableOutOfRange {
            buffer,
            variable,
            start,
            end,
            size,
        } => {
            assert_eq!(buffer, "Small");
            assert_eq!(variable, "Escapes");
            assert_eq!((start, end, size), (16, 80, 32));
        }
        other => panic!("expected VariableOutOfRange, got {other:?}"),
    }
}

#[test]
fn extended_layout_carries_ranges_and_type_names() {
    let chunk = RdefBuilder::pixel()
        .extended()
        .cbuffer(
            CbufferSpec::new("Material", 32)
                .variable(
                    VarSpec::vector("Albedo", 0)
                        .with_type_name("float4")
                        .with_texture_range(2, 1)
                        .with_sampler_range(0, 1),
                )
                .variable(VarSpec::vector("Emissive", 16)),
        )
        .build();

    let rdef = parse_rdef_chunk(&chunk).expect("chunk should parse");
    let albedo = &rdef.constant_buffers[0].variables[0];
    assert_eq!(albedo.ty.name.as_deref(), Some("float4"));
    assert_eq!(albedo.texture_range, Some(BindRange { start: 2, count: 1 }));
    assert_eq!(albedo.sampler_range, Some(BindRange { start: 0, count: 1 }));

    let emissive = &rdef.constant_buffers[0].variables[1];
    assert_eq!(emissive.ty.name, None);
    assert_eq!(emissive.texture_range, None);
    assert_eq!(emissive.sampler_range, None);
}

#[test]
fn stage_decodes_for_every_program_type() {
    let cases = [
        (0xfffeu16, ShaderStage::Vertex),
        (0xffff, ShaderStage::Pixel),
        (0x4753, ShaderStage::Geometry),
        (0x4853, ShaderStage::Hull),
        (0x4453, ShaderStage::Domain),
        (0x4353, ShaderStage::Compute),
    ];
    for (program_type, expected) in cases {
        let chunk = RdefBuilder::new(program_type, 5, 0).build();
        let rdef = parse_rdef_chunk(&chunk).expect("chunk should parse");
        assert_eq!(rdef.stage, expected);
    }
}

#[test]
fn unknown_program_type_is_rejected() {
    let chunk = RdefBuilder::vertex().raw_target(0x1234_0500).build();
    let err = parse_rdef_chunk(&chunk).unwrap_err();
    assert_eq!(err, ReflectError::UnknownStage(0x1234));
}

#[test]
fn truncated_chunk_is_rejected() {
    let err = parse_rdef_chunk(&[0u8; 12]).unwrap_err();
    assert!(matches!(err, ReflectError::InvalidChunk { .. }));
}
