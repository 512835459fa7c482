use pretty_assertions::assert_eq;

use crate::test_utils::{
    build_container, build_shader_blob, CbufferSpec, RdefBuilder, ResourceSpec, SignatureBuilder,
    VarSpec,
};
use crate::{FourCC, ReflectError, ShaderReflection, ShaderStage};

fn sample_blob() -> Vec<u8> {
    let rdef = RdefBuilder::pixel()
        .creator("ember shader compiler")
        .cbuffer(
            CbufferSpec::new("PerFrame", 80)
                .variable(VarSpec::matrix_columns("ViewProjection", 0))
                .variable(VarSpec::vector("CameraPosition", 64)),
        )
        .resource(ResourceSpec::cbuffer("PerFrame", 0))
        .resource(ResourceSpec::texture("AlbedoMap", 0))
        .resource(ResourceSpec::sampler("LinearSampler", 0));
    let input = SignatureBuilder::new()
        .element("SV_Position", 0, 0, 1, 3, 0x0f, 0x0f)
        .element("TEXCOORD", 0, 1, 0, 3, 0x03, 0x03);
    let output = SignatureBuilder::new().element("SV_Target", 0, 0, 64, 3, 0x0f, 0x00);
    build_shader_blob(&rdef, Some(&input), Some(&output))
}

#[test]
fn full_blob_parses_into_descriptor() {
    let refl = ShaderReflection::parse(&sample_blob()).expect("blob should parse");

    assert_eq!(refl.stage, ShaderStage::Pixel);
    assert_eq!((refl.model.major, refl.model.minor), (5, 0));
    assert_eq!(refl.creator.as_deref(), Some("ember shader compiler"));
    assert_eq!(refl.input_signature.len(), 2);
    assert_eq!(refl.output_signature.len(), 1);
    assert_eq!(refl.constant_buffers.len(), 1);
    assert_eq!(refl.resource_bindings.len(), 3);
    assert_eq!(refl.compiler_message, None);

    let cb = refl.constant_buffer("PerFrame").expect("buffer should exist");
    assert_eq!(cb.variables.len(), 2);
    assert!(refl.resource_binding("AlbedoMap").is_some());
    assert!(refl.resource_binding("NormalMap").is_none());
}

#[test]
fn missing_resource_definitions_is_an_error() {
    let input = SignatureBuilder::new()
        .element("SV_Position", 0, 0, 1, 3, 0x0f, 0x0f)
        .build_v0();
    let bytes = build_container(&[(FourCC::ISGN, &input)]);

    let err = ShaderReflection::parse(&bytes).unwrap_err();
    assert_eq!(
        err,
        ReflectError::MissingChunk {
            fourcc: FourCC::RDEF
        }
    );
}

#[test]
fn missing_signatures_yield_empty_signatures() {
    let rdef = RdefBuilder::compute()
        .resource(ResourceSpec::raw("Output", 4, 0))
        .build();
    let bytes = build_container(&[(FourCC::RDEF, &rdef)]);

    let refl = ShaderReflection::parse(&bytes).expect("blob should parse");
    assert_eq!(refl.stage, ShaderStage::Compute);
    assert!(refl.input_signature.is_empty());
    assert!(refl.output_signature.is_empty());
    assert_eq!(refl.resource_bindings.len(), 1);
}

#[test]
fn malformed_duplicate_resource_definitions_are_skipped() {
    let bad = [0u8; 4];
    let good = RdefBuilder::vertex().build();
    let bytes = build_container(&[(FourCC::RDEF, &bad), (FourCC::RDEF, &good)]);

    let refl = ShaderReflection::parse(&bytes).expect("good duplicate should win");
    assert_eq!(refl.stage, ShaderStage::Vertex);
}

#[test]
fn solely_malformed_resource_definitions_propagate_the_error() {
    let bad = [0u8; 4];
    let bytes = build_container(&[(FourCC::RDEF, &bad)]);

    let err = ShaderReflection::parse(&bytes).unwrap_err();
    assert!(matches!(err, ReflectError::InvalidChunk { .. }));
}

#[test]
fn extended_signature_chunk_is_used_when_present() {
    let rdef = RdefBuilder::pixel().build();
    let input = SignatureBuilder::new()
        .element("SV_Position", 0, 0, 1, 3, 0x0f, 0x0f)
        .build_v1();
    let bytes = build_container(&[(FourCC::ISG1, &input), (FourCC::RDEF, &rdef)]);

    let refl = ShaderReflection::parse(&bytes).expect("blob should parse");
    assert_eq!(refl.input_signature.len(), 1);
    assert_eq!(refl.input_signature[0].semantic_name, "SV_Position");
}

#[test]
fn compiler_message_attaches_to_descriptor() {
    let refl = ShaderReflection::parse(&sample_blob())
        .expect("blob should parse")
        .with_compiler_message("warning X4000: something mild");

    assert_eq!(
        refl.compiler_message.as_deref(),
        Some("warning X4000: something mild")
    );
}
