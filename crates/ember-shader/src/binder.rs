//! Automatic shader-parameter binding.
//!
//! Given a reflection descriptor, the binder bridges the string-keyed
//! parameter store to the slot-addressed device model on every activation:
//! it lazily creates backing buffers for constant buffers nobody declared,
//! uploads current vector/matrix values at their compiler-reported offsets,
//! and binds every declared resource to its stage slot.
//!
//! Bind-time problems never abort the frame. Missing parameters, variables
//! with shapes the updater cannot serialize, and facade failures are logged,
//! recorded in the returned [`BindReport`] and skipped, so the remaining
//! work for the shader still applies.

use bytemuck::bytes_of;
use glam::{Mat4, Vec4};
use tracing::{debug, warn};

use ember_dxbc::{
    ConstantBufferDesc, ConstantBufferKind, ResourceBindingDesc, ResourceKind, ShaderReflection,
    ShapeClass, VariableDesc,
};

use crate::device::{BufferConfig, DeviceError, MapMode, RenderDevice};
use crate::error::MissingParameterError;
use crate::params::{BufferIndex, ParameterStore};

/// One constant buffer touched during an activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferUpdate {
    /// Buffer name from the reflection descriptor.
    pub name: String,
    /// Index the buffer is registered under.
    pub index: BufferIndex,
    /// Whether this activation created the buffer (first touch) rather than
    /// reusing an existing registration.
    pub created: bool,
}

/// A constant-buffer variable whose shape the updater cannot serialize.
///
/// The variable's byte range is left untouched; sibling variables in the
/// same buffer are still updated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedVariable {
    /// Enclosing constant buffer.
    pub buffer: String,
    /// Variable name.
    pub variable: String,
    /// The shape that is not supported.
    pub class: ShapeClass,
}

/// Observable outcome of one activation.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BindReport {
    /// Constant buffers updated, with their created-vs-reused outcome.
    pub buffers: Vec<BufferUpdate>,
    /// Declared resources with no registered parameter value.
    pub missing: Vec<MissingParameterError>,
    /// Variables skipped because of their shape.
    pub unsupported: Vec<UnsupportedVariable>,
    /// Variables written as zeroes because the store held no value.
    pub defaulted: Vec<String>,
    /// Variables skipped because the mapped buffer was smaller than the
    /// declared layout (externally-created undersized buffer).
    pub skipped_writes: Vec<String>,
    /// Facade failures; the affected buffer or binding was skipped.
    pub device_errors: Vec<DeviceError>,
}

impl BindReport {
    /// Whether the activation completed with nothing skipped or defaulted.
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty()
            && self.unsupported.is_empty()
            && self.defaulted.is_empty()
            && self.skipped_writes.is_empty()
            && self.device_errors.is_empty()
    }
}

/// Binds a shader's declared resources from a parameter store.
///
/// The binder holds only references: it never caches buffer indices across
/// activations, so name-to-index mappings are re-resolved every time and
/// buffers created or destroyed externally between activations are picked
/// up. Construct one wherever a descriptor and a store meet; there is no
/// hidden shared state.
pub struct ShaderBinder<'a> {
    shader: &'a str,
    reflection: &'a ShaderReflection,
}

impl<'a> ShaderBinder<'a> {
    /// Creates a binder for `reflection`. `shader` is the debug name used
    /// in logs and errors.
    pub fn new(shader: &'a str, reflection: &'a ShaderReflection) -> Self {
        ShaderBinder { shader, reflection }
    }

    /// Performs one activation: updates every constant buffer, then binds
    /// every declared resource to its slot on the descriptor's stage.
    pub fn bind<D: RenderDevice>(
        &self,
        device: &mut D,
        params: &mut ParameterStore,
    ) -> BindReport {
        let mut report = BindReport::default();
        self.update_constant_buffers(device, params, &mut report);
        self.bind_resources(device, params, &mut report);
        report
    }

    /// Ensures a live buffer backs every constant-buffer block and uploads
    /// current parameter values into it.
    fn update_constant_buffers<D: RenderDevice>(
        &self,
        device: &mut D,
        params: &mut ParameterStore,
        report: &mut BindReport,
    ) {
        for cb in &self.reflection.constant_buffers {
            match cb.kind {
                // Texture buffers deliberately share the plain constant
                // buffer path; the kinds stay distinct in the descriptor.
                ConstantBufferKind::ConstantBuffer | ConstantBufferKind::TextureBuffer => {
                    self.update_buffer(cb, device, params, report);
                }
                ConstantBufferKind::InterfacePointers
                | ConstantBufferKind::ResourceBindInfo => {}
            }
        }
    }

    fn update_buffer<D: RenderDevice>(
        &self,
        cb: &ConstantBufferDesc,
        device: &mut D,
        params: &mut ParameterStore,
        report: &mut BindReport,
    ) {
        // Re-resolve the name every activation; never cache across reloads.
        let (index, created) = match params.constant_buffer(&cb.name) {
            Some(index) => (index, false),
            None => {
                let config = BufferConfig::constant_buffer(cb.size);
                match device.create_constant_buffer(&config) {
                    Ok(index) => {
                        debug!(
                            shader = self.shader,
                            buffer = cb.name.as_str(),
                            size = cb.size,
                            "created backing constant buffer"
                        );
                        params.set_constant_buffer(&cb.name, index);
                        (index, true)
                    }
                    Err(err) => {
                        warn!(
                            shader = self.shader,
                            buffer = cb.name.as_str(),
                            error = %err,
                            "failed to create backing constant buffer; skipping update"
                        );
                        report.device_errors.push(err);
                        return;
                    }
                }
            }
        };
        report.buffers.push(BufferUpdate {
            name: cb.name.clone(),
            index,
            created,
        });

        let span = match device.map_resource(index, 0, MapMode::WriteDiscard) {
            Ok(span) => span,
            Err(err) => {
                warn!(
                    shader = self.shader,
                    buffer = cb.name.as_str(),
                    error = %err,
                    "failed to map constant buffer; skipping update"
                );
                report.device_errors.push(err);
                return;
            }
        };

        for var in &cb.variables {
            match var.ty.class {
                ShapeClass::Vector => {
                    let value = match params.vector(&var.name) {
                        Some(value) => value,
                        None => {
                            report.defaulted.push(var.name.clone());
                            Vec4::ZERO
                        }
                    };
                    self.write_value(cb, var, span, bytes_of(&value), report);
                }
                // The store supplies matrices in the layout the shader
                // expects; the bytes go in verbatim, no transposition.
                ShapeClass::MatrixRows | ShapeClass::MatrixColumns => {
                    let value = match params.matrix(&var.name) {
                        Some(value) => value,
                        None => {
                            report.defaulted.push(var.name.clone());
                            Mat4::ZERO
                        }
                    };
                    self.write_value(cb, var, span, bytes_of(&value), report);
                }
                class => {
                    warn!(
                        shader = self.shader,
                        buffer = cb.name.as_str(),
                        variable = var.name.as_str(),
                        ?class,
                        "constant buffer variable has unsupported shape; leaving its bytes untouched"
                    );
                    report.unsupported.push(UnsupportedVariable {
                        buffer: cb.name.clone(),
                        variable: var.name.clone(),
                        class,
                    });
                }
            }
        }

        device.unmap_resource(index, 0);
    }

    fn write_value(
        &self,
        cb: &ConstantBufferDesc,
        var: &VariableDesc,
        span: &mut [u8],
        bytes: &[u8],
        report: &mut BindReport,
    ) {
        let start = var.start_offset as usize;
        let end = start.saturating_add(bytes.len());
        if end > span.len() {
            // The registered buffer may have been created externally with a
            // smaller size than the declared layout; tolerate it.
            warn!(
                shader = self.shader,
                buffer = cb.name.as_str(),
                variable = var.name.as_str(),
                "mapped buffer is smaller than the declared layout; skipping write"
            );
            report.skipped_writes.push(var.name.clone());
            return;
        }
        span[start..end].copy_from_slice(bytes);
    }

    /// Binds every declared resource to its reported slot, dispatched by
    /// resource kind.
    fn bind_resources<D: RenderDevice>(
        &self,
        device: &mut D,
        params: &ParameterStore,
        report: &mut BindReport,
    ) {
        let stage = self.reflection.stage;
        for rb in &self.reflection.resource_bindings {
            let slot = rb.bind_point;
            match rb.kind {
                ResourceKind::CBuffer | ResourceKind::TBuffer => {
                    match params.constant_buffer(&rb.name) {
                        Some(index) => device.bind_constant_buffer(stage, slot, index),
                        None => self.record_missing(rb, report),
                    }
                }
                ResourceKind::Texture | ResourceKind::Structured | ResourceKind::ByteAddress => {
                    match params.shader_resource(&rb.name) {
                        Some(handle) => device.bind_shader_resource(stage, slot, handle),
                        None => self.record_missing(rb, report),
                    }
                }
                ResourceKind::Sampler => match params.sampler(&rb.name) {
                    Some(handle) => device.bind_sampler(stage, slot, handle),
                    None => self.record_missing(rb, report),
                },
                ResourceKind::UavRwTyped
                | ResourceKind::UavRwStructured
                | ResourceKind::UavRwByteAddress
                | ResourceKind::UavAppendStructured
                | ResourceKind::UavConsumeStructured
                | ResourceKind::UavRwStructuredWithCounter => {
                    match params.unordered_access(&rb.name) {
                        Some(handle) => device.bind_unordered_access(stage, slot, handle),
                        None => self.record_missing(rb, report),
                    }
                }
            }
        }
    }

    fn record_missing(&self, rb: &ResourceBindingDesc, report: &mut BindReport) {
        let err = MissingParameterError {
            shader: self.shader.to_owned(),
            parameter: rb.name.clone(),
            kind: rb.kind,
        };
        warn!(error = %err, "skipping binding");
        report.missing.push(err);
    }
}
