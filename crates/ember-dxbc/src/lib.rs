//! A safe parser for compiled-shader reflection metadata.
//!
//! Compiled shaders ship as a chunked container holding, among other things,
//! the compiler's description of the shader's resource interface: input and
//! output signatures, constant-buffer layouts with per-variable offsets, and
//! the register slot of every bound resource. This crate parses that
//! metadata — treating the bytes as **untrusted**, without panicking or
//! reading out of bounds — into an immutable [`ShaderReflection`]
//! descriptor, and can format a descriptor as a human-readable report for
//! debugging.
//!
//! The descriptor is the contract consumed by the automatic shader binder in
//! `ember-shader`, and by render-pass setup code that wants to pre-declare
//! buffers.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod container;
mod error;
mod fourcc;
/// Parser for resource-definition chunks.
pub mod rdef;
/// The top-level reflection descriptor.
pub mod reflect;
/// Human-readable reflection reports.
pub mod report;
/// Parsers for input/output signature chunks.
pub mod signature;

/// Helpers for building synthetic shader containers in tests.
///
/// Only available when compiling this crate's own tests, or when the
/// `test-utils` feature is enabled. Not part of the stable parsing API.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

#[cfg(test)]
mod tests_container;
#[cfg(test)]
mod tests_rdef;
#[cfg(test)]
mod tests_reflect;
#[cfg(test)]
mod tests_report;
#[cfg(test)]
mod tests_signature;

pub use crate::container::Container;
pub use crate::error::ReflectError;
pub use crate::fourcc::FourCC;
pub use crate::rdef::{
    parse_rdef_chunk, BindRange, BindingFlags, ConstantBufferDesc, ConstantBufferKind,
    ResourceBindingDesc, ResourceDimension, ResourceKind, ResourceDefinitions, ReturnType,
    ScalarKind, ShaderModel, ShaderStage, ShapeClass, VariableDesc, VariableFlags,
    VariableTypeDesc,
};
pub use crate::reflect::ShaderReflection;
pub use crate::report::{report_string, write_report};
pub use crate::signature::{
    parse_signature_chunk, ComponentKind, ComponentMask, SignatureElement, SystemValue,
};
