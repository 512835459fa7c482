//! The top-level reflection descriptor.

use crate::container::Container;
use crate::error::ReflectError;
use crate::fourcc::FourCC;
use crate::rdef::{
    parse_rdef_chunk, ConstantBufferDesc, ResourceBindingDesc, ShaderModel, ShaderStage,
};
use crate::signature::{parse_signature_chunk, SignatureElement};

/// Structured, immutable description of a compiled shader's resource
/// interface.
///
/// Built once after compilation and referenced — never mutated — for the
/// lifetime of the shader. Construction either yields a fully populated
/// descriptor or fails; there is no partial state.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderReflection {
    /// Stage the shader was compiled for.
    pub stage: ShaderStage,
    /// Shader model version.
    pub model: ShaderModel,
    /// Compiler identity string, when present.
    pub creator: Option<String>,
    /// Compile flag bits.
    pub flags: u32,
    /// Input signature elements, in declaration order.
    pub input_signature: Vec<SignatureElement>,
    /// Output signature elements, in declaration order.
    pub output_signature: Vec<SignatureElement>,
    /// Constant-buffer blocks, in declaration order.
    pub constant_buffers: Vec<ConstantBufferDesc>,
    /// Bound resources, in declaration order.
    pub resource_bindings: Vec<ResourceBindingDesc>,
    /// Raw compiler output attached at construction, echoed by the
    /// diagnostic report.
    pub compiler_message: Option<String>,
}

impl ShaderReflection {
    /// Parses a compiled-shader container into a reflection descriptor.
    ///
    /// The resource-definition chunk is required; signature chunks are
    /// optional and absence yields empty signatures (compute shaders
    /// commonly omit them). When a container carries several
    /// resource-definition chunks, malformed ones are skipped in favor of
    /// the first that parses.
    pub fn parse(bytes: &[u8]) -> Result<ShaderReflection, ReflectError> {
        let container = Container::parse(bytes)?;

        let mut rdef = None;
        let mut rdef_err = None;
        for (fourcc, data) in container.chunks() {
            if fourcc != FourCC::RDEF {
                continue;
            }
            match parse_rdef_chunk(data) {
                Ok(parsed) => {
                    rdef = Some(parsed);
                    break;
                }
                Err(err) => rdef_err = Some(err),
            }
        }
        let rdef = match (rdef, rdef_err) {
            (Some(rdef), _) => rdef,
            (None, Some(err)) => return Err(err),
            (None, None) => {
                return Err(ReflectError::MissingChunk {
                    fourcc: FourCC::RDEF,
                })
            }
        };

        let input_signature = parse_optional_signature(&container, FourCC::ISGN, FourCC::ISG1)?;
        let output_signature = parse_optional_signature(&container, FourCC::OSGN, FourCC::OSG1)?;

        Ok(ShaderReflection {
            stage: rdef.stage,
            model: rdef.model,
            creator: rdef.creator,
            flags: rdef.flags,
            input_signature,
            output_signature,
            constant_buffers: rdef.constant_buffers,
            resource_bindings: rdef.bound_resources,
            compiler_message: None,
        })
    }

    /// Attaches the compiler's textual output to the descriptor.
    pub fn with_compiler_message(mut self, message: impl Into<String>) -> Self {
        self.compiler_message = Some(message.into());
        self
    }

    /// Looks up a constant-buffer block by name.
    pub fn constant_buffer(&self, name: &str) -> Option<&ConstantBufferDesc> {
        self.constant_buffers.iter().find(|cb| cb.name == name)
    }

    /// Looks up a resource binding by name.
    pub fn resource_binding(&self, name: &str) -> Option<&ResourceBindingDesc> {
        self.resource_bindings.iter().find(|rb| rb.name == name)
    }
}

fn parse_optional_signature(
    container: &Container<'_>,
    v0: FourCC,
    v1: FourCC,
) -> Result<Vec<SignatureElement>, ReflectError> {
    for fourcc in [v0, v1] {
        if let Some(data) = container.chunk(fourcc) {
            return parse_signature_chunk(fourcc, data);
        }
    }
    Ok(Vec::new())
}
