use thiserror::Error;

use ember_dxbc::ResourceKind;

/// A declared resource had no matching entry in the parameter store at
/// bind time.
///
/// Recovered locally: the offending binding is skipped (leaving the slot as
/// previously bound or unbound) and the rest of the shader's bindings still
/// apply, favoring a visible-but-recoverable glitch over halting rendering.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("shader {shader:?} declares {kind:?} parameter {parameter:?} but no value is registered")]
pub struct MissingParameterError {
    /// Debug name of the shader being bound.
    pub shader: String,
    /// Name of the parameter with no registered value.
    pub parameter: String,
    /// Kind of resource the shader expected.
    pub kind: ResourceKind,
}
