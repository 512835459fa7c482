//! Parser for resource-definition chunks (`RDEF`).
//!
//! The `RDEF` chunk describes a shader's resource interface: its constant
//! buffers (with per-variable offsets, sizes and type shapes) and every
//! bound resource (textures, samplers, buffers, UAVs) together with the
//! register slot the compiler assigned to it.
//!
//! Two record layouts exist. The original layout uses 24-byte variable
//! records and 16-byte type records. Newer compilers emit an `RD11`
//! sub-header directly after the chunk header and switch to 40-byte variable
//! records (adding embedded texture/sampler ranges) and 36-byte type records
//! (adding a type-name string). Both are accepted; offsets are absolute
//! within the chunk either way.

use bitflags::bitflags;

use crate::error::ReflectError;
use crate::fourcc::FourCC;

const RDEF_HEADER_LEN: usize = 28;
const RD11_MAGIC: &[u8; 4] = b"RD11";
const RD11_HEADER_LEN: usize = 32; // magic + 7 dwords of record sizes

const CBUFFER_RECORD_LEN: usize = 24;
const RESOURCE_RECORD_LEN: usize = 32;
const VARIABLE_RECORD_LEN_V4: usize = 24;
const VARIABLE_RECORD_LEN_V5: usize = 40;
const TYPE_RECORD_LEN_V4: usize = 16;
const TYPE_RECORD_LEN_V5: usize = 36;

/// The pipeline stage a shader runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// Vertex shader.
    Vertex,
    /// Hull shader.
    Hull,
    /// Domain shader.
    Domain,
    /// Geometry shader.
    Geometry,
    /// Pixel shader.
    Pixel,
    /// Compute shader.
    Compute,
}

impl ShaderStage {
    /// Decodes the program type stored in the high half of the `RDEF`
    /// target field.
    pub fn from_program_type(v: u16) -> Option<Self> {
        match v {
            0xfffe => Some(Self::Vertex),
            0xffff => Some(Self::Pixel),
            0x4753 => Some(Self::Geometry),
            0x4853 => Some(Self::Hull),
            0x4453 => Some(Self::Domain),
            0x4353 => Some(Self::Compute),
            _ => None,
        }
    }
}

/// Shader model version reported by the compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShaderModel {
    /// Major version.
    pub major: u8,
    /// Minor version.
    pub minor: u8,
}

bitflags! {
    /// Flags reported for a constant-buffer variable.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct VariableFlags: u32 {
        /// The variable was declared with an explicit register.
        const USERPACKED = 0x1;
        /// The variable is read by the shader.
        const USED = 0x2;
    }
}

bitflags! {
    /// Flags reported for a bound resource.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct BindingFlags: u32 {
        /// Bound to an explicit register.
        const USERPACKED = 0x1;
        /// Comparison sampler.
        const COMPARISON_SAMPLER = 0x2;
        /// First texture component flag.
        const TEXTURE_COMPONENT_0 = 0x4;
        /// Second texture component flag.
        const TEXTURE_COMPONENT_1 = 0x8;
    }
}

/// How a constant-buffer block is backed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstantBufferKind {
    /// Plain constant buffer.
    ConstantBuffer,
    /// Texture buffer. Kept distinct from plain constant buffers even though
    /// the binder updates both through the same path.
    TextureBuffer,
    /// Interface pointer table.
    InterfacePointers,
    /// Resource binding metadata block.
    ResourceBindInfo,
}

impl ConstantBufferKind {
    fn from_u32(v: u32) -> Option<Self> {
        match v {
            0 => Some(Self::ConstantBuffer),
            1 => Some(Self::TextureBuffer),
            2 => Some(Self::InterfacePointers),
            3 => Some(Self::ResourceBindInfo),
            _ => None,
        }
    }
}

/// Shape of a constant-buffer variable's type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeClass {
    /// Single scalar.
    Scalar,
    /// Up-to-four-component vector.
    Vector,
    /// Row-major matrix.
    MatrixRows,
    /// Column-major matrix.
    MatrixColumns,
    /// Opaque object (texture, sampler, string).
    Object,
    /// Structure with members.
    Struct,
    /// Interface class.
    InterfaceClass,
    /// Interface pointer.
    InterfacePointer,
}

impl ShapeClass {
    fn from_u16(v: u16) -> Option<Self> {
        match v {
            0 => Some(Self::Scalar),
            1 => Some(Self::Vector),
            2 => Some(Self::MatrixRows),
            3 => Some(Self::MatrixColumns),
            4 => Some(Self::Object),
            5 => Some(Self::Struct),
            6 => Some(Self::InterfaceClass),
            7 => Some(Self::InterfacePointer),
            _ => None,
        }
    }
}

/// Scalar element type of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    /// No type.
    Void,
    /// Boolean.
    Bool,
    /// 32-bit signed integer.
    Int,
    /// 32-bit float.
    Float,
    /// 32-bit unsigned integer.
    UInt,
    /// 64-bit float.
    Double,
    /// Any value this crate does not recognize, kept verbatim.
    Other(u16),
}

impl ScalarKind {
    fn from_u16(v: u16) -> Self {
        match v {
            0 => Self::Void,
            1 => Self::Bool,
            2 => Self::Int,
            3 => Self::Float,
            19 => Self::UInt,
            39 => Self::Double,
            other => Self::Other(other),
        }
    }
}

/// Type metadata attached to a constant-buffer variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableTypeDesc {
    /// Type name (e.g. `"float4"`), when the record layout carries one.
    pub name: Option<String>,
    /// Shape class.
    pub class: ShapeClass,
    /// Scalar element type.
    pub scalar: ScalarKind,
    /// Number of rows for matrix shapes.
    pub rows: u16,
    /// Number of columns for matrix and vector shapes.
    pub columns: u16,
    /// Array element count, zero for non-arrays.
    pub elements: u16,
    /// Number of structure members, zero for non-structs.
    pub members: u16,
    /// Byte offset of the type within its parent aggregate.
    pub offset: u32,
}

/// A register-slot range embedded in a variable record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindRange {
    /// First slot of the range.
    pub start: u32,
    /// Number of slots.
    pub count: u32,
}

/// A single variable within a constant buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableDesc {
    /// Variable name.
    pub name: String,
    /// Byte offset of the variable within the buffer.
    pub start_offset: u32,
    /// Size of the variable in bytes.
    pub size: u32,
    /// Usage flags.
    pub flags: VariableFlags,
    /// Type metadata.
    pub ty: VariableTypeDesc,
    /// Texture slots consumed by the variable, if any.
    pub texture_range: Option<BindRange>,
    /// Sampler slots consumed by the variable, if any.
    pub sampler_range: Option<BindRange>,
}

/// A constant-buffer block declared by the shader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantBufferDesc {
    /// Buffer name.
    pub name: String,
    /// Backing kind.
    pub kind: ConstantBufferKind,
    /// Declared size in bytes.
    pub size: u32,
    /// Raw flag bits.
    pub flags: u32,
    /// Variables laid out inside the buffer.
    pub variables: Vec<VariableDesc>,
}

/// Kind of a bound resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Constant buffer.
    CBuffer,
    /// Texture buffer.
    TBuffer,
    /// Texture of any dimensionality.
    Texture,
    /// Sampler state.
    Sampler,
    /// Read-write typed UAV.
    UavRwTyped,
    /// Read-only structured buffer.
    Structured,
    /// Read-write structured UAV.
    UavRwStructured,
    /// Read-only byte-address buffer.
    ByteAddress,
    /// Read-write byte-address UAV.
    UavRwByteAddress,
    /// Append-structured UAV.
    UavAppendStructured,
    /// Consume-structured UAV.
    UavConsumeStructured,
    /// Read-write structured UAV with a hidden counter.
    UavRwStructuredWithCounter,
}

impl ResourceKind {
    fn from_u32(v: u32) -> Option<Self> {
        match v {
            0 => Some(Self::CBuffer),
            1 => Some(Self::TBuffer),
            2 => Some(Self::Texture),
            3 => Some(Self::Sampler),
            4 => Some(Self::UavRwTyped),
            5 => Some(Self::Structured),
            6 => Some(Self::UavRwStructured),
            7 => Some(Self::ByteAddress),
            8 => Some(Self::UavRwByteAddress),
            9 => Some(Self::UavAppendStructured),
            10 => Some(Self::UavConsumeStructured),
            11 => Some(Self::UavRwStructuredWithCounter),
            _ => None,
        }
    }
}

/// Per-sample return type of a texture-like resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnType {
    /// Unsigned normalized.
    Unorm,
    /// Signed normalized.
    Snorm,
    /// Signed integer.
    SInt,
    /// Unsigned integer.
    UInt,
    /// Floating point.
    Float,
    /// Mixed formats.
    Mixed,
    /// Double precision.
    Double,
    /// Continued from previous entry.
    Continued,
}

impl ReturnType {
    fn from_u32(v: u32) -> Option<Self> {
        match v {
            1 => Some(Self::Unorm),
            2 => Some(Self::Snorm),
            3 => Some(Self::SInt),
            4 => Some(Self::UInt),
            5 => Some(Self::Float),
            6 => Some(Self::Mixed),
            7 => Some(Self::Double),
            8 => Some(Self::Continued),
            _ => None,
        }
    }
}

/// Dimensionality of a bound resource's view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceDimension {
    /// Not reported.
    Unknown,
    /// Typed buffer.
    Buffer,
    /// 1D texture.
    Texture1D,
    /// 1D texture array.
    Texture1DArray,
    /// 2D texture.
    Texture2D,
    /// 2D texture array.
    Texture2DArray,
    /// Multisampled 2D texture.
    Texture2DMs,
    /// Multisampled 2D texture array.
    Texture2DMsArray,
    /// 3D texture.
    Texture3D,
    /// Cube texture.
    TextureCube,
    /// Cube texture array.
    TextureCubeArray,
    /// Raw or structured buffer.
    BufferEx,
}

impl ResourceDimension {
    fn from_u32(v: u32) -> Self {
        match v {
            1 => Self::Buffer,
            2 => Self::Texture1D,
            3 => Self::Texture1DArray,
            4 => Self::Texture2D,
            5 => Self::Texture2DArray,
            6 => Self::Texture2DMs,
            7 => Self::Texture2DMsArray,
            8 => Self::Texture3D,
            9 => Self::TextureCube,
            10 => Self::TextureCubeArray,
            11 => Self::BufferEx,
            // Dimensionality never drives binding, so unreported or
            // out-of-range values degrade to Unknown instead of failing.
            _ => Self::Unknown,
        }
    }
}

/// A resource binding declared by the shader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceBindingDesc {
    /// Resource name.
    pub name: String,
    /// Resource kind.
    pub kind: ResourceKind,
    /// First register slot the resource is bound to.
    pub bind_point: u32,
    /// Number of consecutive slots.
    pub bind_count: u32,
    /// Binding flags.
    pub flags: BindingFlags,
    /// Per-sample return type, for texture-like resources.
    pub return_type: Option<ReturnType>,
    /// View dimensionality.
    pub dimension: ResourceDimension,
    /// Sample count for multisampled views, raw value otherwise.
    pub sample_count: u32,
}

/// A fully parsed resource-definition chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDefinitions {
    /// Stage the shader was compiled for.
    pub stage: ShaderStage,
    /// Shader model version.
    pub model: ShaderModel,
    /// Compile flag bits.
    pub flags: u32,
    /// Compiler identity string.
    pub creator: Option<String>,
    /// Constant-buffer blocks, in declaration order.
    pub constant_buffers: Vec<ConstantBufferDesc>,
    /// Bound resources, in declaration order.
    pub bound_resources: Vec<ResourceBindingDesc>,
}

/// Parses an `RDEF` chunk payload.
pub fn parse_rdef_chunk(bytes: &[u8]) -> Result<ResourceDefinitions, ReflectError> {
    let cb_count = read_u32(bytes, 0)?;
    let cb_offset = read_u32(bytes, 4)?;
    let rb_count = read_u32(bytes, 8)?;
    let rb_offset = read_u32(bytes, 12)?;
    let target = read_u32(bytes, 16)?;
    let flags = read_u32(bytes, 20)?;
    let creator_offset = read_u32(bytes, 24)?;

    let extended = bytes.len() >= RDEF_HEADER_LEN + RD11_HEADER_LEN
        && &bytes[RDEF_HEADER_LEN..RDEF_HEADER_LEN + 4] == RD11_MAGIC;

    let program_type = (target >> 16) as u16;
    let stage = ShaderStage::from_program_type(program_type)
        .ok_or(ReflectError::UnknownStage(program_type as u32))?;
    let model = ShaderModel {
        major: ((target >> 4) & 0xf) as u8,
        minor: (target & 0xf) as u8,
    };

    let creator = if creator_offset != 0 {
        Some(read_cstring(bytes, creator_offset as usize)?.to_owned())
    } else {
        None
    };

    let constant_buffers = parse_constant_buffers(bytes, cb_offset, cb_count, extended)?;
    let bound_resources = parse_bound_resources(bytes, rb_offset, rb_count)?;

    Ok(ResourceDefinitions {
        stage,
        model,
        flags,
        creator,
        constant_buffers,
        bound_resources,
    })
}

fn parse_constant_buffers(
    bytes: &[u8],
    table_offset: u32,
    count: u32,
    extended: bool,
) -> Result<Vec<ConstantBufferDesc>, ReflectError> {
    let mut out = Vec::with_capacity(count as usize);
    if count == 0 {
        return Ok(out);
    }
    check_table(bytes, table_offset, count, CBUFFER_RECORD_LEN, "constant buffer")?;

    for i in 0..count as usize {
        let base = table_offset as usize + i * CBUFFER_RECORD_LEN;
        let name_offset = read_u32(bytes, base)?;
        let var_count = read_u32(bytes, base + 4)?;
        let var_offset = read_u32(bytes, base + 8)?;
        let size = read_u32(bytes, base + 12)?;
        let cb_flags = read_u32(bytes, base + 16)?;
        let raw_kind = read_u32(bytes, base + 20)?;

        let name = read_cstring(bytes, name_offset as usize)?.to_owned();
        let kind = ConstantBufferKind::from_u32(raw_kind).ok_or_else(|| {
            ReflectError::invalid_chunk(
                FourCC::RDEF,
                format!("constant buffer {name:?} has unknown kind value {raw_kind}"),
            )
        })?;
        let variables = parse_variables(bytes, &name, size, var_offset, var_count, extended)?;

        out.push(ConstantBufferDesc {
            name,
            kind,
            size,
            flags: cb_flags,
            variables,
        });
    }

    Ok(out)
}

fn parse_variables(
    bytes: &[u8],
    buffer_name: &str,
    buffer_size: u32,
    table_offset: u32,
    count: u32,
    extended: bool,
) -> Result<Vec<VariableDesc>, ReflectError> {
    let mut out = Vec::with_capacity(count as usize);
    if count == 0 {
        return Ok(out);
    }
    let record_len = if extended {
        VARIABLE_RECORD_LEN_V5
    } else {
        VARIABLE_RECORD_LEN_V4
    };
    check_table(bytes, table_offset, count, record_len, "variable")?;

    for i in 0..count as usize {
        let base = table_offset as usize + i * record_len;
        let name_offset = read_u32(bytes, base)?;
        let start_offset = read_u32(bytes, base + 4)?;
        let size = read_u32(bytes, base + 8)?;
        let flags = read_u32(bytes, base + 12)?;
        let type_offset = read_u32(bytes, base + 16)?;
        let _default_value_offset = read_u32(bytes, base + 20)?;

        let (texture_range, sampler_range) = if extended {
            let tex = read_range(bytes, base + 24)?;
            let smp = read_range(bytes, base + 32)?;
            (tex, smp)
        } else {
            (None, None)
        };

        let name = read_cstring(bytes, name_offset as usize)?.to_owned();
        let ty = parse_type(bytes, type_offset as usize, extended)?;

        // Compiler-reported layouts are trusted as-is, but a variable that
        // escapes its buffer can never be written safely.
        let end = start_offset.checked_add(size).filter(|&end| end <= buffer_size);
        if end.is_none() {
            return Err(ReflectError::VariableOutOfRange {
                buffer: buffer_name.to_owned(),
                variable: name,
                start: start_offset,
                end: start_offset.saturating_add(size),
                size: buffer_size,
            });
        }

        out.push(VariableDesc {
            name,
            start_offset,
            size,
            flags: VariableFlags::from_bits_truncate(flags),
            ty,
            texture_range,
            sampler_range,
        });
    }

    Ok(out)
}

fn parse_type(
    bytes: &[u8],
    offset: usize,
    extended: bool,
) -> Result<VariableTypeDesc, ReflectError> {
    let record_len = if extended {
        TYPE_RECORD_LEN_V5
    } else {
        TYPE_RECORD_LEN_V4
    };
    if offset
        .checked_add(record_len)
        .map(|end| end > bytes.len())
        .unwrap_or(true)
    {
        return Err(ReflectError::invalid_chunk(
            FourCC::RDEF,
            format!("type record at {offset} is outside the chunk"),
        ));
    }

    let class_raw = read_u16(bytes, offset)?;
    let scalar_raw = read_u16(bytes, offset + 2)?;
    let rows = read_u16(bytes, offset + 4)?;
    let columns = read_u16(bytes, offset + 6)?;
    let elements = read_u16(bytes, offset + 8)?;
    let members = read_u16(bytes, offset + 10)?;
    let member_offset = read_u32(bytes, offset + 12)?;

    let class = ShapeClass::from_u16(class_raw).ok_or_else(|| {
        ReflectError::invalid_chunk(
            FourCC::RDEF,
            format!("type record at {offset} has unknown shape class {class_raw}"),
        )
    })?;

    // The extended record trails four reserved dwords and a name offset.
    let name = if extended {
        let name_offset = read_u32(bytes, offset + 32)?;
        if name_offset != 0 {
            Some(read_cstring(bytes, name_offset as usize)?.to_owned())
        } else {
            None
        }
    } else {
        None
    };

    Ok(VariableTypeDesc {
        name,
        class,
        scalar: ScalarKind::from_u16(scalar_raw),
        rows,
        columns,
        elements,
        members,
        offset: member_offset,
    })
}

fn parse_bound_resources(
    bytes: &[u8],
    table_offset: u32,
    count: u32,
) -> Result<Vec<ResourceBindingDesc>, ReflectError> {
    let mut out = Vec::with_capacity(count as usize);
    if count == 0 {
        return Ok(out);
    }
    check_table(bytes, table_offset, count, RESOURCE_RECORD_LEN, "resource")?;

    for i in 0..count as usize {
        let base = table_offset as usize + i * RESOURCE_RECORD_LEN;
        let name_offset = read_u32(bytes, base)?;
        let raw_kind = read_u32(bytes, base + 4)?;
        let raw_return = read_u32(bytes, base + 8)?;
        let raw_dimension = read_u32(bytes, base + 12)?;
        let sample_count = read_u32(bytes, base + 16)?;
        let bind_point = read_u32(bytes, base + 20)?;
        let bind_count = read_u32(bytes, base + 24)?;
        let raw_flags = read_u32(bytes, base + 28)?;

        let name = read_cstring(bytes, name_offset as usize)?.to_owned();
        let kind = ResourceKind::from_u32(raw_kind).ok_or(
            ReflectError::UnsupportedResourceKind {
                name: name.clone(),
                kind: raw_kind,
            },
        )?;
        let return_type = if raw_return == 0 {
            None
        } else {
            Some(ReturnType::from_u32(raw_return).ok_or_else(|| {
                ReflectError::invalid_chunk(
                    FourCC::RDEF,
                    format!("resource {name:?} has unknown return type value {raw_return}"),
                )
            })?)
        };

        out.push(ResourceBindingDesc {
            name,
            kind,
            bind_point,
            bind_count,
            flags: BindingFlags::from_bits_truncate(raw_flags),
            return_type,
            dimension: ResourceDimension::from_u32(raw_dimension),
            sample_count,
        });
    }

    Ok(out)
}

fn check_table(
    bytes: &[u8],
    offset: u32,
    count: u32,
    record_len: usize,
    what: &str,
) -> Result<(), ReflectError> {
    (count as usize)
        .checked_mul(record_len)
        .and_then(|len| (offset as usize).checked_add(len))
        .filter(|&end| end <= bytes.len())
        .map(|_| ())
        .ok_or_else(|| {
            ReflectError::invalid_chunk(
                FourCC::RDEF,
                format!("{what} table of {count} records at offset {offset} does not fit in chunk"),
            )
        })
}

fn read_u32(bytes: &[u8], offset: usize) -> Result<u32, ReflectError> {
    let end = offset
        .checked_add(4)
        .filter(|&end| end <= bytes.len())
        .ok_or_else(|| {
            ReflectError::invalid_chunk(
                FourCC::RDEF,
                format!(
                    "need 4 bytes at offset {offset}, but chunk is {} bytes",
                    bytes.len()
                ),
            )
        })?;
    let s = &bytes[offset..end];
    Ok(u32::from_le_bytes([s[0], s[1], s[2], s[3]]))
}

fn read_u16(bytes: &[u8], offset: usize) -> Result<u16, ReflectError> {
    let end = offset
        .checked_add(2)
        .filter(|&end| end <= bytes.len())
        .ok_or_else(|| {
            ReflectError::invalid_chunk(
                FourCC::RDEF,
                format!(
                    "need 2 bytes at offset {offset}, but chunk is {} bytes",
                    bytes.len()
                ),
            )
        })?;
    let s = &bytes[offset..end];
    Ok(u16::from_le_bytes([s[0], s[1]]))
}

fn read_range(bytes: &[u8], offset: usize) -> Result<Option<BindRange>, ReflectError> {
    let start = read_u32(bytes, offset)?;
    let count = read_u32(bytes, offset + 4)?;
    if start == u32::MAX {
        return Ok(None);
    }
    Ok(Some(BindRange { start, count }))
}

fn read_cstring(bytes: &[u8], offset: usize) -> Result<&str, ReflectError> {
    let tail = bytes.get(offset..).ok_or_else(|| {
        ReflectError::invalid_chunk(
            FourCC::RDEF,
            format!("string offset {offset} is outside the chunk"),
        )
    })?;
    let nul = tail.iter().position(|&b| b == 0).ok_or_else(|| {
        ReflectError::invalid_chunk(
            FourCC::RDEF,
            format!("string at offset {offset} has no terminator"),
        )
    })?;
    core::str::from_utf8(&tail[..nul]).map_err(|_| {
        ReflectError::invalid_chunk(
            FourCC::RDEF,
            format!("string at offset {offset} is not UTF-8"),
        )
    })
}
