//! Automatic shader-parameter binding for a string-keyed renderer.
//!
//! A renderer keeps its values — vectors, matrices, buffer and resource
//! handles — in a [`ParameterStore`] keyed by name. A compiled shader
//! declares, through its reflection descriptor, which names it consumes and
//! at which register slots. The [`ShaderBinder`] connects the two on every
//! activation: constant buffers are lazily created and filled with current
//! store values at their compiler-reported offsets, and every declared
//! resource is bound to its slot through the [`RenderDevice`] facade.
//!
//! Everything runs synchronously on the thread owning the device context;
//! bind-time problems are logged and reported, never fatal to the frame.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod binder;
mod device;
mod error;
mod params;

/// An in-memory recording device facade for tests.
#[cfg(any(test, feature = "test-utils"))]
pub mod testing;


pub use crate::binder::{BindReport, BufferUpdate, ShaderBinder, UnsupportedVariable};
pub use crate::device::{BufferConfig, DeviceError, MapMode, RenderDevice};
pub use crate::error::MissingParameterError;
pub use crate::params::{
    BufferIndex, ParamValue, ParameterStore, ResourceHandle, SamplerHandle,
};
