//! An in-memory device facade for tests.
//!
//! Records every creation and bind call and backs buffers with plain byte
//! vectors so tests can assert on uploaded contents. Discard-mode mapping
//! intentionally leaves prior contents in place, which lets tests observe
//! byte ranges the binder skipped.

use ember_dxbc::ShaderStage;

use crate::device::{BufferConfig, DeviceError, MapMode, RenderDevice};
use crate::params::{BufferIndex, ResourceHandle, SamplerHandle};

/// One bind call observed by the recording device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindCall {
    /// `bind_constant_buffer`.
    ConstantBuffer {
        /// Target stage.
        stage: ShaderStage,
        /// Target slot.
        slot: u32,
        /// Bound buffer.
        buffer: BufferIndex,
    },
    /// `bind_shader_resource`.
    ShaderResource {
        /// Target stage.
        stage: ShaderStage,
        /// Target slot.
        slot: u32,
        /// Bound resource.
        resource: ResourceHandle,
    },
    /// `bind_sampler`.
    Sampler {
        /// Target stage.
        stage: ShaderStage,
        /// Target slot.
        slot: u32,
        /// Bound sampler.
        sampler: SamplerHandle,
    },
    /// `bind_unordered_access`.
    UnorderedAccess {
        /// Target stage.
        stage: ShaderStage,
        /// Target slot.
        slot: u32,
        /// Bound resource.
        resource: ResourceHandle,
    },
}

#[derive(Debug)]
struct FakeBuffer {
    data: Vec<u8>,
    mapped: bool,
}

/// A [`RenderDevice`] that records calls instead of touching a GPU.
#[derive(Debug, Default)]
pub struct RecordingDevice {
    buffers: Vec<FakeBuffer>,
    /// Configurations passed to `create_constant_buffer`, in call order.
    pub created: Vec<BufferConfig>,
    /// Bind calls, in call order.
    pub bind_calls: Vec<BindCall>,
    /// When set, `create_constant_buffer` fails.
    pub fail_creates: bool,
}

impl RecordingDevice {
    /// Creates an empty device.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a buffer as if it had been created externally, with the
    /// given backing contents.
    pub fn add_external_buffer(&mut self, contents: Vec<u8>) -> BufferIndex {
        self.buffers.push(FakeBuffer {
            data: contents,
            mapped: false,
        });
        BufferIndex(self.buffers.len() as u32 - 1)
    }

    /// Backing contents of a buffer.
    ///
    /// # Panics
    ///
    /// Panics when the index was never handed out by this device.
    pub fn buffer_contents(&self, index: BufferIndex) -> &[u8] {
        &self.buffers[index.0 as usize].data
    }
}

impl RenderDevice for RecordingDevice {
    fn create_constant_buffer(
        &mut self,
        config: &BufferConfig,
    ) -> Result<BufferIndex, DeviceError> {
        if self.fail_creates {
            return Err(DeviceError::CreateFailed {
                size: config.size,
                reason: "recording device was told to fail".to_owned(),
            });
        }
        self.created.push(*config);
        self.buffers.push(FakeBuffer {
            data: vec![0u8; config.size as usize],
            mapped: false,
        });
        Ok(BufferIndex(self.buffers.len() as u32 - 1))
    }

    fn map_resource(
        &mut self,
        buffer: BufferIndex,
        _subresource: u32,
        _mode: MapMode,
    ) -> Result<&mut [u8], DeviceError> {
        let fake = self
            .buffers
            .get_mut(buffer.0 as usize)
            .ok_or(DeviceError::UnknownBuffer(buffer))?;
        if fake.mapped {
            return Err(DeviceError::AlreadyMapped(buffer));
        }
        fake.mapped = true;
        Ok(&mut fake.data)
    }

    fn unmap_resource(&mut self, buffer: BufferIndex, _subresource: u32) {
        if let Some(fake) = self.buffers.get_mut(buffer.0 as usize) {
            fake.mapped = false;
        }
    }

    fn bind_constant_buffer(&mut self, stage: ShaderStage, slot: u32, buffer: BufferIndex) {
        self.bind_calls.push(BindCall::ConstantBuffer {
            stage,
            slot,
            buffer,
        });
    }

    fn bind_shader_resource(&mut self, stage: ShaderStage, slot: u32, resource: ResourceHandle) {
        self.bind_calls.push(BindCall::ShaderResource {
            stage,
            slot,
            resource,
        });
    }

    fn bind_sampler(&mut self, stage: ShaderStage, slot: u32, sampler: SamplerHandle) {
        self.bind_calls.push(BindCall::Sampler {
            stage,
            slot,
            sampler,
        });
    }

    fn bind_unordered_access(&mut self, stage: ShaderStage, slot: u32, resource: ResourceHandle) {
        self.bind_calls.push(BindCall::UnorderedAccess {
            stage,
            slot,
            resource,
        });
    }
}
