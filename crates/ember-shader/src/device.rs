//! The device binding facade.
//!
//! The binder drives the GPU through this narrow interface; the real
//! implementation (buffer allocation, memory mapping, pipeline state) lives
//! with the device abstraction, outside this crate. Callers serialize access
//! to the device context themselves — binding assumes exclusive access for
//! the duration of a call.

use thiserror::Error;

use ember_dxbc::ShaderStage;

use crate::params::{BufferIndex, ResourceHandle, SamplerHandle};

/// How a resource is mapped into host-visible memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapMode {
    /// Read-only access.
    Read,
    /// Write access preserving prior contents.
    Write,
    /// Read and write access.
    ReadWrite,
    /// Write access discarding prior contents. The returned span must not
    /// be read.
    WriteDiscard,
    /// Write access promising not to touch regions the GPU may be reading.
    WriteNoOverwrite,
}

/// Creation parameters for a constant buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferConfig {
    /// Size of the buffer in bytes.
    pub size: u32,
    /// Whether the CPU may map and write the buffer.
    pub host_writable: bool,
}

impl BufferConfig {
    /// The default configuration for an automatically created constant
    /// buffer: host-writable, usable only as a constant buffer, exactly
    /// `size` bytes.
    pub fn constant_buffer(size: u32) -> Self {
        BufferConfig {
            size,
            host_writable: true,
        }
    }
}

/// Failures reported by the device facade.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceError {
    /// The buffer index is not registered with the device.
    #[error("buffer {0:?} is not registered with the device")]
    UnknownBuffer(BufferIndex),
    /// The buffer is already mapped.
    #[error("buffer {0:?} is already mapped")]
    AlreadyMapped(BufferIndex),
    /// The device could not allocate the requested buffer.
    #[error("constant buffer allocation of {size} bytes failed: {reason}")]
    CreateFailed {
        /// Requested size in bytes.
        size: u32,
        /// Device-reported reason.
        reason: String,
    },
    /// The buffer does not support the requested map mode.
    #[error("buffer {index:?} does not support {mode:?} mapping")]
    UnsupportedMap {
        /// The buffer being mapped.
        index: BufferIndex,
        /// The rejected mode.
        mode: MapMode,
    },
}

/// Creation, mapping and bind-by-slot operations consumed by the binder.
///
/// Rebinding the same stage/slot/handle combination is idempotent and
/// expected every activation; implementations must not assume diffing
/// against the previous frame.
pub trait RenderDevice {
    /// Creates a constant buffer and returns its index.
    fn create_constant_buffer(&mut self, config: &BufferConfig)
        -> Result<BufferIndex, DeviceError>;

    /// Maps a buffer subresource into host memory.
    fn map_resource(
        &mut self,
        buffer: BufferIndex,
        subresource: u32,
        mode: MapMode,
    ) -> Result<&mut [u8], DeviceError>;

    /// Unmaps a previously mapped subresource, making writes visible to the
    /// GPU.
    fn unmap_resource(&mut self, buffer: BufferIndex, subresource: u32);

    /// Binds a constant buffer to a stage slot.
    fn bind_constant_buffer(&mut self, stage: ShaderStage, slot: u32, buffer: BufferIndex);

    /// Binds a shader-resource view to a stage slot.
    fn bind_shader_resource(&mut self, stage: ShaderStage, slot: u32, resource: ResourceHandle);

    /// Binds a sampler state to a stage slot.
    fn bind_sampler(&mut self, stage: ShaderStage, slot: u32, sampler: SamplerHandle);

    /// Binds an unordered-access view to a stage slot.
    fn bind_unordered_access(&mut self, stage: ShaderStage, slot: u32, resource: ResourceHandle);
}
