//! String-keyed parameter registry shared between the renderer and shader
//! binders.
//!
//! Shader metadata is inherently string-keyed, so the store keeps the
//! name-based lookup at its boundary but hands values out through typed
//! accessors. Values live in an arena of indexed slots with a name→index
//! lookup on top; removed slots are recycled explicitly rather than relying
//! on destruction order.

use std::collections::HashMap;

use glam::{Mat4, Vec4};

/// Index of a constant buffer registered with the device facade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferIndex(pub u32);

/// Handle to a shader-resource view owned by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceHandle(pub u32);

/// Handle to a sampler state owned by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SamplerHandle(pub u32);

/// A value registered under a parameter name.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
    /// Four-component vector.
    Vector(Vec4),
    /// 4x4 matrix, stored in the layout the consuming shader expects.
    Matrix(Mat4),
    /// Constant buffer registered with the device.
    ConstantBuffer(BufferIndex),
    /// Shader-resource view.
    ShaderResource(ResourceHandle),
    /// Sampler state.
    Sampler(SamplerHandle),
    /// Unordered-access view.
    UnorderedAccess(ResourceHandle),
}

#[derive(Debug, Clone)]
struct Slot {
    name: String,
    value: ParamValue,
}

/// The registry mapping parameter names to typed values.
#[derive(Debug, Default, Clone)]
pub struct ParameterStore {
    slots: Vec<Option<Slot>>,
    free: Vec<usize>,
    by_name: HashMap<String, usize>,
}

impl ParameterStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `value` under `name`, replacing any previous value in
    /// place (the slot index is stable across overwrites).
    pub fn set(&mut self, name: &str, value: ParamValue) {
        if let Some(&index) = self.by_name.get(name) {
            if let Some(slot) = self.slots[index].as_mut() {
                slot.value = value;
                return;
            }
        }
        let slot = Slot {
            name: name.to_owned(),
            value,
        };
        let index = match self.free.pop() {
            Some(index) => {
                self.slots[index] = Some(slot);
                index
            }
            None => {
                self.slots.push(Some(slot));
                self.slots.len() - 1
            }
        };
        self.by_name.insert(name.to_owned(), index);
    }

    /// Registers a vector value.
    pub fn set_vector(&mut self, name: &str, value: Vec4) {
        self.set(name, ParamValue::Vector(value));
    }

    /// Registers a matrix value.
    pub fn set_matrix(&mut self, name: &str, value: Mat4) {
        self.set(name, ParamValue::Matrix(value));
    }

    /// Registers a constant-buffer index.
    pub fn set_constant_buffer(&mut self, name: &str, index: BufferIndex) {
        self.set(name, ParamValue::ConstantBuffer(index));
    }

    /// Registers a shader-resource handle.
    pub fn set_shader_resource(&mut self, name: &str, handle: ResourceHandle) {
        self.set(name, ParamValue::ShaderResource(handle));
    }

    /// Registers a sampler handle.
    pub fn set_sampler(&mut self, name: &str, handle: SamplerHandle) {
        self.set(name, ParamValue::Sampler(handle));
    }

    /// Registers an unordered-access handle.
    pub fn set_unordered_access(&mut self, name: &str, handle: ResourceHandle) {
        self.set(name, ParamValue::UnorderedAccess(handle));
    }

    /// The tagged value registered under `name`, if any.
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        let &index = self.by_name.get(name)?;
        self.slots[index].as_ref().map(|slot| &slot.value)
    }

    /// The vector registered under `name`. `None` when absent or of a
    /// different type.
    pub fn vector(&self, name: &str) -> Option<Vec4> {
        match self.get(name) {
            Some(&ParamValue::Vector(v)) => Some(v),
            _ => None,
        }
    }

    /// The matrix registered under `name`.
    pub fn matrix(&self, name: &str) -> Option<Mat4> {
        match self.get(name) {
            Some(&ParamValue::Matrix(m)) => Some(m),
            _ => None,
        }
    }

    /// The constant-buffer index registered under `name`.
    pub fn constant_buffer(&self, name: &str) -> Option<BufferIndex> {
        match self.get(name) {
            Some(&ParamValue::ConstantBuffer(index)) => Some(index),
            _ => None,
        }
    }

    /// The shader-resource handle registered under `name`.
    pub fn shader_resource(&self, name: &str) -> Option<ResourceHandle> {
        match self.get(name) {
            Some(&ParamValue::ShaderResource(handle)) => Some(handle),
            _ => None,
        }
    }

    /// The sampler handle registered under `name`.
    pub fn sampler(&self, name: &str) -> Option<SamplerHandle> {
        match self.get(name) {
            Some(&ParamValue::Sampler(handle)) => Some(handle),
            _ => None,
        }
    }

    /// The unordered-access handle registered under `name`.
    pub fn unordered_access(&self, name: &str) -> Option<ResourceHandle> {
        match self.get(name) {
            Some(&ParamValue::UnorderedAccess(handle)) => Some(handle),
            _ => None,
        }
    }

    /// Unregisters `name`, recycling its slot for later insertions.
    pub fn remove(&mut self, name: &str) -> Option<ParamValue> {
        let index = self.by_name.remove(name)?;
        let slot = self.slots[index].take()?;
        self.free.push(index);
        Some(slot.value)
    }

    /// Number of registered parameters.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Total slots allocated, including recycled ones. Grows only when an
    /// insertion finds no free slot.
    pub fn slot_capacity(&self) -> usize {
        self.slots.len()
    }

    /// Iterates over registered names and values in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.slots
            .iter()
            .filter_map(|slot| slot.as_ref())
            .map(|slot| (slot.name.as_str(), &slot.value))
    }
}
