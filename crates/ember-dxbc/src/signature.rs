//! Parsers for input/output signature chunks.
//!
//! Signature chunks map a shader's inputs and outputs to semantic names and
//! registers. Two encodings exist: the original 24-byte entry layout
//! (`ISGN`/`OSGN`) and the extended 32-byte layout (`ISG1`/`OSG1`) that adds
//! the stream index and a minimum-precision field.

use bitflags::bitflags;
use core::fmt;

use crate::error::ReflectError;
use crate::fourcc::FourCC;

const SIGNATURE_HEADER_LEN: usize = 8;
const ENTRY_LEN_V0: usize = 24;
const ENTRY_LEN_V1: usize = 32;

bitflags! {
    /// Which of the four register components an element occupies.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ComponentMask: u8 {
        /// First component.
        const X = 0b0001;
        /// Second component.
        const Y = 0b0010;
        /// Third component.
        const Z = 0b0100;
        /// Fourth component.
        const W = 0b1000;
    }
}

impl fmt::Display for ComponentMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "-");
        }
        for (flag, c) in [
            (ComponentMask::X, 'x'),
            (ComponentMask::Y, 'y'),
            (ComponentMask::Z, 'z'),
            (ComponentMask::W, 'w'),
        ] {
            if self.contains(flag) {
                write!(f, "{c}")?;
            }
        }
        Ok(())
    }
}

/// System-value semantic attached to a signature element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemValue {
    /// Ordinary user semantic.
    Undefined,
    /// Clip-space position.
    Position,
    /// Clip distance.
    ClipDistance,
    /// Cull distance.
    CullDistance,
    /// Render-target array index.
    RenderTargetArrayIndex,
    /// Viewport array index.
    ViewportArrayIndex,
    /// Vertex id.
    VertexId,
    /// Primitive id.
    PrimitiveId,
    /// Instance id.
    InstanceId,
    /// Front-facing flag.
    IsFrontFace,
    /// MSAA sample index.
    SampleIndex,
    /// Render-target output.
    Target,
    /// Depth output.
    Depth,
    /// Coverage mask output.
    Coverage,
    /// Conservative depth, greater-equal.
    DepthGreaterEqual,
    /// Conservative depth, less-equal.
    DepthLessEqual,
    /// Any value this crate does not recognize, kept verbatim.
    Other(u32),
}

impl SystemValue {
    fn from_u32(v: u32) -> Self {
        match v {
            0 => Self::Undefined,
            1 => Self::Position,
            2 => Self::ClipDistance,
            3 => Self::CullDistance,
            4 => Self::RenderTargetArrayIndex,
            5 => Self::ViewportArrayIndex,
            6 => Self::VertexId,
            7 => Self::PrimitiveId,
            8 => Self::InstanceId,
            9 => Self::IsFrontFace,
            10 => Self::SampleIndex,
            64 => Self::Target,
            65 => Self::Depth,
            66 => Self::Coverage,
            67 => Self::DepthGreaterEqual,
            68 => Self::DepthLessEqual,
            other => Self::Other(other),
        }
    }
}

/// Storage type of a signature element's register components.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    /// Type not reported.
    Unknown,
    /// 32-bit unsigned integer.
    UInt32,
    /// 32-bit signed integer.
    SInt32,
    /// 32-bit float.
    Float32,
    /// Any value this crate does not recognize, kept verbatim.
    Other(u32),
}

impl ComponentKind {
    fn from_u32(v: u32) -> Self {
        match v {
            0 => Self::Unknown,
            1 => Self::UInt32,
            2 => Self::SInt32,
            3 => Self::Float32,
            other => Self::Other(other),
        }
    }
}

/// A single element of an input or output signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureElement {
    /// The semantic name, e.g. `"POSITION"` or `"TEXCOORD"`.
    pub semantic_name: String,
    /// The semantic index, e.g. `1` for `TEXCOORD1`.
    pub semantic_index: u32,
    /// Register assigned by the compiler.
    pub register: u32,
    /// System-value kind.
    pub system_value: SystemValue,
    /// Component storage type.
    pub component_type: ComponentKind,
    /// Components declared by the element.
    pub mask: ComponentMask,
    /// Components actually read (inputs) or written (outputs).
    pub read_write_mask: ComponentMask,
    /// Geometry-shader stream index. Zero in the 24-byte encoding.
    pub stream: u32,
}

/// Parses a signature chunk payload into its elements.
///
/// The entry layout is selected by the chunk identifier: `ISG1`/`OSG1` use
/// the extended 32-byte entries, everything else the 24-byte entries.
pub fn parse_signature_chunk(
    fourcc: FourCC,
    bytes: &[u8],
) -> Result<Vec<SignatureElement>, ReflectError> {
    let entry_len = if fourcc == FourCC::ISG1 || fourcc == FourCC::OSG1 {
        ENTRY_LEN_V1
    } else {
        ENTRY_LEN_V0
    };

    if bytes.len() < SIGNATURE_HEADER_LEN {
        return Err(ReflectError::invalid_chunk(
            fourcc,
            format!("truncated header: {} bytes", bytes.len()),
        ));
    }

    let count = read_u32_le(fourcc, bytes, 0)? as usize;
    let table_offset = read_u32_le(fourcc, bytes, 4)? as usize;
    if count == 0 {
        return Ok(Vec::new());
    }

    let table_end = count
        .checked_mul(entry_len)
        .and_then(|len| table_offset.checked_add(len))
        .filter(|&end| end <= bytes.len())
        .ok_or_else(|| {
            ReflectError::invalid_chunk(
                fourcc,
                format!("element table for {count} entries does not fit in chunk"),
            )
        })?;
    if table_offset < SIGNATURE_HEADER_LEN {
        return Err(ReflectError::invalid_chunk(
            fourcc,
            format!("element table offset {table_offset} points into the header"),
        ));
    }

    let mut elements = Vec::with_capacity(count);
    for i in 0..count {
        let base = table_offset + i * entry_len;
        let name_offset = read_u32_le(fourcc, bytes, base)? as usize;
        if (table_offset..table_end).contains(&name_offset) {
            return Err(ReflectError::invalid_chunk(
                fourcc,
                format!("element {i} name offset {name_offset} points into the element table"),
            ));
        }
        let semantic_index = read_u32_le(fourcc, bytes, base + 4)?;
        let system_value = read_u32_le(fourcc, bytes, base + 8)?;
        let component_type = read_u32_le(fourcc, bytes, base + 12)?;
        let register = read_u32_le(fourcc, bytes, base + 16)?;

        let (mask, read_write_mask, stream) = if entry_len == ENTRY_LEN_V0 {
            // Packed dword: mask, read/write mask, stream, min-precision.
            let packed = read_u32_le(fourcc, bytes, base + 20)?;
            (
                (packed & 0xff) as u8,
                ((packed >> 8) & 0xff) as u8,
                (packed >> 16) & 0xff,
            )
        } else {
            let mask = bytes[base + 20];
            let read_write_mask = bytes[base + 21];
            let stream = read_u32_le(fourcc, bytes, base + 24)?;
            (mask, read_write_mask, stream)
        };

        let semantic_name = read_cstring(fourcc, bytes, name_offset)?.to_owned();

        elements.push(SignatureElement {
            semantic_name,
            semantic_index,
            register,
            system_value: SystemValue::from_u32(system_value),
            component_type: ComponentKind::from_u32(component_type),
            mask: ComponentMask::from_bits_truncate(mask),
            read_write_mask: ComponentMask::from_bits_truncate(read_write_mask),
            stream,
        });
    }

    Ok(elements)
}

fn read_u32_le(fourcc: FourCC, bytes: &[u8], offset: usize) -> Result<u32, ReflectError> {
    let end = offset
        .checked_add(4)
        .filter(|&end| end <= bytes.len())
        .ok_or_else(|| {
            ReflectError::invalid_chunk(
                fourcc,
                format!(
                    "need 4 bytes at offset {offset}, but chunk is {} bytes",
                    bytes.len()
                ),
            )
        })?;
    let s = &bytes[offset..end];
    Ok(u32::from_le_bytes([s[0], s[1], s[2], s[3]]))
}

fn read_cstring(fourcc: FourCC, bytes: &[u8], offset: usize) -> Result<&str, ReflectError> {
    let tail = bytes.get(offset..).ok_or_else(|| {
        ReflectError::invalid_chunk(
            fourcc,
            format!("string offset {offset} is outside the chunk"),
        )
    })?;
    let nul = tail.iter().position(|&b| b == 0).ok_or_else(|| {
        ReflectError::invalid_chunk(
            fourcc,
            format!("string at offset {offset} has no terminator"),
        )
    })?;
    core::str::from_utf8(&tail[..nul]).map_err(|_| {
        ReflectError::invalid_chunk(fourcc, format!("string at offset {offset} is not UTF-8"))
    })
}
