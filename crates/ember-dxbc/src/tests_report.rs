use crate::report::report_string;
use crate::test_utils::{build_shader_blob, CbufferSpec, RdefBuilder, ResourceSpec, SignatureBuilder, VarSpec};
use crate::ShaderReflection;

fn sample_reflection() -> ShaderReflection {
    let rdef = RdefBuilder::vertex()
        .creator("ember shader compiler")
        .cbuffer(
            CbufferSpec::new("PerObject", 96)
                .variable(VarSpec::matrix_columns("World", 0))
                .variable(VarSpec::vector("Tint", 64))
                .variable(VarSpec::vector("Misc", 80)),
        )
        .resource(ResourceSpec::texture("AlbedoMap", 0));
    let input = SignatureBuilder::new()
        .element("POSITION", 0, 0, 0, 3, 0x0f, 0x0f)
        .element("NORMAL", 0, 1, 0, 3, 0x07, 0x07);
    let bytes = build_shader_blob(&rdef, Some(&input), None);
    ShaderReflection::parse(&bytes).expect("blob should parse")
}

#[test]
fn sections_appear_in_order_with_exact_counts() {
    let refl = sample_reflection();
    let report = report_string("shaders/basic.vs", &refl);

    let header = report.find("Shader reflection: shaders/basic.vs").unwrap();
    let description = report.find("Description:").unwrap();
    let inputs = report.find("Input signature: 2 element(s)").unwrap();
    let outputs = report.find("Output signature: 0 element(s)").unwrap();
    let buffers = report.find("Constant buffers: 1").unwrap();
    let resources = report.find("Bound resources: 1").unwrap();
    let messages = report.find("Compiler messages:").unwrap();

    assert!(header < description);
    assert!(description < inputs);
    assert!(inputs < outputs);
    assert!(outputs < buffers);
    assert!(buffers < resources);
    assert!(resources < messages);

    // Exactly two input-element lines.
    let input_section = &report[inputs..outputs];
    let element_lines = input_section
        .lines()
        .filter(|line| line.starts_with("  ") && line.contains("register="))
        .count();
    assert_eq!(element_lines, 2);

    // One buffer block with three nested variable lines.
    let buffer_section = &report[buffers..resources];
    let buffer_lines = buffer_section
        .lines()
        .filter(|line| line.starts_with("  ") && line.contains("variables="))
        .count();
    let variable_lines = buffer_section
        .lines()
        .filter(|line| line.starts_with("    ") && line.contains("offset=") && !line.contains("type:"))
        .count();
    assert_eq!(buffer_lines, 1);
    assert_eq!(variable_lines, 3);

    // One resource-binding line.
    let resource_section = &report[resources..messages];
    let binding_lines = resource_section
        .lines()
        .filter(|line| line.starts_with("  ") && line.contains("slot="))
        .count();
    assert_eq!(binding_lines, 1);
}

#[test]
fn report_names_every_declared_item() {
    let refl = sample_reflection();
    let report = report_string("basic", &refl);

    for needle in ["POSITION0", "NORMAL0", "PerObject", "World", "Tint", "Misc", "AlbedoMap"] {
        assert!(report.contains(needle), "report is missing {needle:?}:\n{report}");
    }
}

#[test]
fn compiler_message_is_echoed_indented() {
    let refl = sample_reflection().with_compiler_message("line one\nline two");
    let report = report_string("basic", &refl);

    assert!(report.contains("\n  line one\n"));
    assert!(report.contains("\n  line two\n"));
    assert!(!report.contains("(none)"));
}

#[test]
fn missing_compiler_message_prints_placeholder() {
    let report = report_string("basic", &sample_reflection());
    assert!(report.contains("Compiler messages:\n  (none)"));
}
