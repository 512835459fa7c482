//! Human-readable dump of a shader's reflection data.
//!
//! Pure formatting: no device interaction, always succeeds for a valid
//! descriptor. Section ordering is fixed: header, shader description, input
//! signature, output signature, constant buffers (with nested variables and
//! types), resource bindings, compiler messages, footer.

use core::fmt::{self, Write};

use crate::rdef::{ConstantBufferDesc, ResourceBindingDesc, VariableDesc};
use crate::reflect::ShaderReflection;
use crate::signature::SignatureElement;

const RULE: &str = "----------------------------------------------------------------------";

/// Writes the full reflection report for `refl` to `w`.
///
/// `label` identifies the shader in the header, typically its source path
/// or debug name.
pub fn write_report<W: Write>(w: &mut W, label: &str, refl: &ShaderReflection) -> fmt::Result {
    writeln!(w, "{RULE}")?;
    writeln!(w, "Shader reflection: {label}")?;
    writeln!(w, "{RULE}")?;

    writeln!(w, "Description:")?;
    writeln!(
        w,
        "  stage: {:?}, model: {}.{}",
        refl.stage, refl.model.major, refl.model.minor
    )?;
    writeln!(
        w,
        "  creator: {}, flags: {:#x}",
        refl.creator.as_deref().unwrap_or("(unknown)"),
        refl.flags
    )?;
    writeln!(
        w,
        "  inputs: {}, outputs: {}, constant buffers: {}, bound resources: {}",
        refl.input_signature.len(),
        refl.output_signature.len(),
        refl.constant_buffers.len(),
        refl.resource_bindings.len()
    )?;
    writeln!(w)?;

    writeln!(w, "Input signature: {} element(s)", refl.input_signature.len())?;
    for element in &refl.input_signature {
        write_element(w, element)?;
    }
    writeln!(w)?;

    writeln!(
        w,
        "Output signature: {} element(s)",
        refl.output_signature.len()
    )?;
    for element in &refl.output_signature {
        write_element(w, element)?;
    }
    writeln!(w)?;

    writeln!(w, "Constant buffers: {}", refl.constant_buffers.len())?;
    for cb in &refl.constant_buffers {
        write_constant_buffer(w, cb)?;
    }
    writeln!(w)?;

    writeln!(w, "Bound resources: {}", refl.resource_bindings.len())?;
    for rb in &refl.resource_bindings {
        write_resource(w, rb)?;
    }
    writeln!(w)?;

    writeln!(w, "Compiler messages:")?;
    match refl.compiler_message.as_deref() {
        None | Some("") => writeln!(w, "  (none)")?,
        Some(message) => {
            for line in message.lines() {
                writeln!(w, "  {line}")?;
            }
        }
    }
    writeln!(w, "{RULE}")?;
    Ok(())
}

/// Formats the full reflection report into a `String`.
pub fn report_string(label: &str, refl: &ShaderReflection) -> String {
    let mut out = String::new();
    write_report(&mut out, label, refl).expect("writing to a String cannot fail");
    out
}

fn write_element<W: Write>(w: &mut W, element: &SignatureElement) -> fmt::Result {
    writeln!(
        w,
        "  {}{}: register={}, system value={:?}, component={:?}, mask={}, rw={}, stream={}",
        element.semantic_name,
        element.semantic_index,
        element.register,
        element.system_value,
        element.component_type,
        element.mask,
        element.read_write_mask,
        element.stream
    )
}

fn write_constant_buffer<W: Write>(w: &mut W, cb: &ConstantBufferDesc) -> fmt::Result {
    writeln!(
        w,
        "  {}: kind={:?}, size={}, flags={:#x}, variables={}",
        cb.name,
        cb.kind,
        cb.size,
        cb.flags,
        cb.variables.len()
    )?;
    for var in &cb.variables {
        write_variable(w, var)?;
    }
    Ok(())
}

fn write_variable<W: Write>(w: &mut W, var: &VariableDesc) -> fmt::Result {
    write!(
        w,
        "    {}: offset={}, size={}, flags={:?}",
        var.name, var.start_offset, var.size, var.flags
    )?;
    if let Some(range) = var.texture_range {
        write!(w, ", textures={}+{}", range.start, range.count)?;
    }
    if let Some(range) = var.sampler_range {
        write!(w, ", samplers={}+{}", range.start, range.count)?;
    }
    writeln!(w)?;
    writeln!(
        w,
        "      type: name={}, class={:?}, scalar={:?}, rows={}, columns={}, \
         elements={}, members={}, offset={}",
        var.ty.name.as_deref().unwrap_or("-"),
        var.ty.class,
        var.ty.scalar,
        var.ty.rows,
        var.ty.columns,
        var.ty.elements,
        var.ty.members,
        var.ty.offset
    )
}

fn write_resource<W: Write>(w: &mut W, rb: &ResourceBindingDesc) -> fmt::Result {
    writeln!(
        w,
        "  {}: kind={:?}, slot={}, count={}, return={}, dimension={:?}, samples={}, flags={:?}",
        rb.name,
        rb.kind,
        rb.bind_point,
        rb.bind_count,
        rb.return_type
            .map(|r| format!("{r:?}"))
            .unwrap_or_else(|| "-".to_owned()),
        rb.dimension,
        rb.sample_count,
        rb.flags
    )
}
