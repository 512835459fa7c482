//! Helpers for building synthetic shader containers in tests.
//!
//! Only available when compiling this crate's own tests or when the
//! `test-utils` feature is enabled; not part of the stable parsing API. The
//! builders emit structurally valid chunks with correct offset tables; the
//! container checksum is left zeroed since parsing never verifies it.

use crate::fourcc::FourCC;

/// Builds a minimal container holding the provided chunks.
///
/// The result has a valid header, a correct chunk offset table and a correct
/// total size.
pub fn build_container(chunks: &[(FourCC, &[u8])]) -> Vec<u8> {
    let header_len = 4 + 16 + 4 + 4 + 4 + 4 * chunks.len();
    let payload_len = chunks.iter().map(|(_, data)| 8 + data.len()).sum::<usize>();

    let mut out = Vec::with_capacity(header_len + payload_len);
    out.extend_from_slice(b"DXBC");
    out.extend_from_slice(&[0u8; 16]); // checksum, unused
    out.extend_from_slice(&1u32.to_le_bytes()); // reserved
    out.extend_from_slice(&0u32.to_le_bytes()); // total size, patched below
    out.extend_from_slice(&(chunks.len() as u32).to_le_bytes());

    let table_pos = out.len();
    out.resize(out.len() + 4 * chunks.len(), 0);

    for (i, (fourcc, data)) in chunks.iter().enumerate() {
        let offset = out.len() as u32;
        out[table_pos + i * 4..table_pos + i * 4 + 4].copy_from_slice(&offset.to_le_bytes());
        out.extend_from_slice(&fourcc.0);
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        out.extend_from_slice(data);
    }

    let total = out.len() as u32;
    out[24..28].copy_from_slice(&total.to_le_bytes());
    out
}

/// Builds signature chunk payloads.
#[derive(Debug, Default, Clone)]
pub struct SignatureBuilder {
    elements: Vec<ElementSpec>,
}

#[derive(Debug, Clone)]
struct ElementSpec {
    name: String,
    semantic_index: u32,
    register: u32,
    system_value: u32,
    component_type: u32,
    mask: u8,
    read_write_mask: u8,
    stream: u32,
}

impl SignatureBuilder {
    /// Creates an empty signature.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an element. Raw values are written verbatim.
    #[allow(clippy::too_many_arguments)]
    pub fn element(
        mut self,
        name: &str,
        semantic_index: u32,
        register: u32,
        system_value: u32,
        component_type: u32,
        mask: u8,
        read_write_mask: u8,
    ) -> Self {
        self.elements.push(ElementSpec {
            name: name.to_owned(),
            semantic_index,
            register,
            system_value,
            component_type,
            mask,
            read_write_mask,
            stream: 0,
        });
        self
    }

    /// Emits the 24-byte-entry chunk payload (`ISGN`/`OSGN`).
    pub fn build_v0(&self) -> Vec<u8> {
        self.build(false)
    }

    /// Emits the 32-byte-entry chunk payload (`ISG1`/`OSG1`).
    pub fn build_v1(&self) -> Vec<u8> {
        self.build(true)
    }

    fn build(&self, extended: bool) -> Vec<u8> {
        let entry_len = if extended { 32 } else { 24 };
        let table_offset = 8usize;
        let strings_offset = table_offset + self.elements.len() * entry_len;

        let mut strings = Vec::new();
        let mut name_offsets = Vec::with_capacity(self.elements.len());
        for spec in &self.elements {
            name_offsets.push((strings_offset + strings.len()) as u32);
            strings.extend_from_slice(spec.name.as_bytes());
            strings.push(0);
        }

        let mut out = Vec::new();
        push_u32(&mut out, self.elements.len() as u32);
        push_u32(&mut out, table_offset as u32);
        for (spec, &name_offset) in self.elements.iter().zip(&name_offsets) {
            push_u32(&mut out, name_offset);
            push_u32(&mut out, spec.semantic_index);
            push_u32(&mut out, spec.system_value);
            push_u32(&mut out, spec.component_type);
            push_u32(&mut out, spec.register);
            if extended {
                out.push(spec.mask);
                out.push(spec.read_write_mask);
                out.extend_from_slice(&[0u8; 2]);
                push_u32(&mut out, spec.stream);
                push_u32(&mut out, 0); // min precision
            } else {
                let packed = spec.mask as u32
                    | ((spec.read_write_mask as u32) << 8)
                    | ((spec.stream & 0xff) << 16);
                push_u32(&mut out, packed);
            }
        }
        out.extend_from_slice(&strings);
        out
    }
}

/// Specification of a constant-buffer variable for [`RdefBuilder`].
#[derive(Debug, Clone)]
pub struct VarSpec {
    /// Variable name.
    pub name: String,
    /// Byte offset within the buffer.
    pub offset: u32,
    /// Size in bytes.
    pub size: u32,
    /// Raw flag bits.
    pub flags: u32,
    /// Raw shape-class value.
    pub class: u16,
    /// Raw scalar-kind value.
    pub scalar: u16,
    /// Row count.
    pub rows: u16,
    /// Column count.
    pub columns: u16,
    /// Array element count.
    pub elements: u16,
    /// Type name, emitted only in the extended layout.
    pub type_name: Option<String>,
    /// Embedded texture range `(start, count)`, extended layout only.
    pub texture_range: Option<(u32, u32)>,
    /// Embedded sampler range `(start, count)`, extended layout only.
    pub sampler_range: Option<(u32, u32)>,
}

impl VarSpec {
    /// A used four-component float vector.
    pub fn vector(name: &str, offset: u32) -> Self {
        Self::raw(name, offset, 16, 1, 3, 1, 4)
    }

    /// A used 4x4 column-major float matrix.
    pub fn matrix_columns(name: &str, offset: u32) -> Self {
        Self::raw(name, offset, 64, 3, 3, 4, 4)
    }

    /// A used 4x4 row-major float matrix.
    pub fn matrix_rows(name: &str, offset: u32) -> Self {
        Self::raw(name, offset, 64, 2, 3, 4, 4)
    }

    /// A used float scalar.
    pub fn scalar(name: &str, offset: u32) -> Self {
        Self::raw(name, offset, 4, 0, 3, 1, 1)
    }

    /// A variable with explicit raw layout values.
    pub fn raw(
        name: &str,
        offset: u32,
        size: u32,
        class: u16,
        scalar: u16,
        rows: u16,
        columns: u16,
    ) -> Self {
        VarSpec {
            name: name.to_owned(),
            offset,
            size,
            flags: 0x2, // used
            class,
            scalar,
            rows,
            columns,
            elements: 0,
            type_name: None,
            texture_range: None,
            sampler_range: None,
        }
    }

    /// Sets the type name emitted in the extended layout.
    pub fn with_type_name(mut self, name: &str) -> Self {
        self.type_name = Some(name.to_owned());
        self
    }

    /// Sets the embedded texture range emitted in the extended layout.
    pub fn with_texture_range(mut self, start: u32, count: u32) -> Self {
        self.texture_range = Some((start, count));
        self
    }

    /// Sets the embedded sampler range emitted in the extended layout.
    pub fn with_sampler_range(mut self, start: u32, count: u32) -> Self {
        self.sampler_range = Some((start, count));
        self
    }
}

/// Specification of a constant buffer for [`RdefBuilder`].
#[derive(Debug, Clone)]
pub struct CbufferSpec {
    /// Buffer name.
    pub name: String,
    /// Raw kind value (0 = constant buffer, 1 = texture buffer).
    pub kind: u32,
    /// Declared size in bytes.
    pub size: u32,
    /// Raw flag bits.
    pub flags: u32,
    /// Variables laid out in the buffer.
    pub variables: Vec<VarSpec>,
}

impl CbufferSpec {
    /// A plain constant buffer.
    pub fn new(name: &str, size: u32) -> Self {
        CbufferSpec {
            name: name.to_owned(),
            kind: 0,
            size,
            flags: 0,
            variables: Vec::new(),
        }
    }

    /// A texture buffer.
    pub fn texture_buffer(name: &str, size: u32) -> Self {
        let mut spec = Self::new(name, size);
        spec.kind = 1;
        spec
    }

    /// Appends a variable.
    pub fn variable(mut self, var: VarSpec) -> Self {
        self.variables.push(var);
        self
    }
}

/// Specification of a bound resource for [`RdefBuilder`].
#[derive(Debug, Clone)]
pub struct ResourceSpec {
    /// Resource name.
    pub name: String,
    /// Raw kind value.
    pub kind: u32,
    /// Raw return-type value.
    pub return_type: u32,
    /// Raw dimension value.
    pub dimension: u32,
    /// Sample count.
    pub sample_count: u32,
    /// First bound slot.
    pub bind_point: u32,
    /// Number of consecutive slots.
    pub bind_count: u32,
    /// Raw flag bits.
    pub flags: u32,
}

impl ResourceSpec {
    /// A resource with an explicit raw kind.
    pub fn raw(name: &str, kind: u32, bind_point: u32) -> Self {
        ResourceSpec {
            name: name.to_owned(),
            kind,
            return_type: 0,
            dimension: 0,
            sample_count: 0,
            bind_point,
            bind_count: 1,
            flags: 0,
        }
    }

    /// A constant buffer bound at `bind_point`.
    pub fn cbuffer(name: &str, bind_point: u32) -> Self {
        Self::raw(name, 0, bind_point)
    }

    /// A texture buffer bound at `bind_point`.
    pub fn tbuffer(name: &str, bind_point: u32) -> Self {
        Self::raw(name, 1, bind_point)
    }

    /// A float 2D texture bound at `bind_point`.
    pub fn texture(name: &str, bind_point: u32) -> Self {
        let mut spec = Self::raw(name, 2, bind_point);
        spec.return_type = 5; // float
        spec.dimension = 4; // 2D
        spec
    }

    /// A sampler bound at `bind_point`.
    pub fn sampler(name: &str, bind_point: u32) -> Self {
        Self::raw(name, 3, bind_point)
    }
}

/// Builds resource-definition chunk payloads.
#[derive(Debug, Clone)]
pub struct RdefBuilder {
    target: u32,
    flags: u32,
    creator: Option<String>,
    extended: bool,
    cbuffers: Vec<CbufferSpec>,
    resources: Vec<ResourceSpec>,
}

impl RdefBuilder {
    /// Starts a chunk for the given program type (e.g. `0xfffe` for a
    /// vertex shader) and shader model.
    pub fn new(program_type: u16, major: u8, minor: u8) -> Self {
        RdefBuilder {
            target: ((program_type as u32) << 16)
                | (((major & 0xf) as u32) << 4)
                | ((minor & 0xf) as u32),
            flags: 0,
            creator: None,
            extended: false,
            cbuffers: Vec::new(),
            resources: Vec::new(),
        }
    }

    /// Starts a vertex-shader chunk, model 5.0.
    pub fn vertex() -> Self {
        Self::new(0xfffe, 5, 0)
    }

    /// Starts a pixel-shader chunk, model 5.0.
    pub fn pixel() -> Self {
        Self::new(0xffff, 5, 0)
    }

    /// Starts a compute-shader chunk, model 5.0.
    pub fn compute() -> Self {
        Self::new(0x4353, 5, 0)
    }

    /// Overrides the raw target dword, bypassing the stage/model encoding.
    pub fn raw_target(mut self, target: u32) -> Self {
        self.target = target;
        self
    }

    /// Sets the compile flag bits.
    pub fn flags(mut self, flags: u32) -> Self {
        self.flags = flags;
        self
    }

    /// Sets the compiler identity string.
    pub fn creator(mut self, creator: &str) -> Self {
        self.creator = Some(creator.to_owned());
        self
    }

    /// Switches to the extended record layout (`RD11` sub-header).
    pub fn extended(mut self) -> Self {
        self.extended = true;
        self
    }

    /// Appends a constant buffer.
    pub fn cbuffer(mut self, spec: CbufferSpec) -> Self {
        self.cbuffers.push(spec);
        self
    }

    /// Appends a bound resource.
    pub fn resource(mut self, spec: ResourceSpec) -> Self {
        self.resources.push(spec);
        self
    }

    /// Emits the chunk payload.
    pub fn build(&self) -> Vec<u8> {
        let var_record_len: usize = if self.extended { 40 } else { 24 };
        let type_record_len: usize = if self.extended { 36 } else { 16 };
        let header_len: usize = if self.extended { 28 + 32 } else { 28 };

        // Layout: header, cbuffer table, resource table, per-buffer variable
        // tables, type records, string table.
        let cb_table_offset = header_len;
        let rb_table_offset = cb_table_offset + self.cbuffers.len() * 24;
        let mut cursor = rb_table_offset + self.resources.len() * 32;

        let mut var_table_offsets = Vec::with_capacity(self.cbuffers.len());
        for cb in &self.cbuffers {
            var_table_offsets.push(cursor as u32);
            cursor += cb.variables.len() * var_record_len;
        }

        let mut type_offsets = Vec::new();
        for cb in &self.cbuffers {
            for _ in &cb.variables {
                type_offsets.push(cursor as u32);
                cursor += type_record_len;
            }
        }

        // String table, appended last; offsets assigned in emission order.
        let mut strings: Vec<u8> = Vec::new();
        let strings_base = cursor;
        let intern = |strings: &mut Vec<u8>, s: &str| -> u32 {
            let offset = (strings_base + strings.len()) as u32;
            strings.extend_from_slice(s.as_bytes());
            strings.push(0);
            offset
        };

        let creator_offset = match &self.creator {
            Some(creator) => intern(&mut strings, creator),
            None => 0,
        };
        let cb_name_offsets: Vec<u32> = self
            .cbuffers
            .iter()
            .map(|cb| intern(&mut strings, &cb.name))
            .collect();
        let var_name_offsets: Vec<u32> = self
            .cbuffers
            .iter()
            .flat_map(|cb| cb.variables.iter())
            .map(|v| intern(&mut strings, &v.name))
            .collect();
        let type_name_offsets: Vec<u32> = self
            .cbuffers
            .iter()
            .flat_map(|cb| cb.variables.iter())
            .map(|v| match (&v.type_name, self.extended) {
                (Some(name), true) => intern(&mut strings, name),
                _ => 0,
            })
            .collect();
        let rb_name_offsets: Vec<u32> = self
            .resources
            .iter()
            .map(|rb| intern(&mut strings, &rb.name))
            .collect();

        let mut out = Vec::with_capacity(cursor + strings.len());
        push_u32(&mut out, self.cbuffers.len() as u32);
        push_u32(&mut out, if self.cbuffers.is_empty() { 0 } else { cb_table_offset as u32 });
        push_u32(&mut out, self.resources.len() as u32);
        push_u32(&mut out, if self.resources.is_empty() { 0 } else { rb_table_offset as u32 });
        push_u32(&mut out, self.target);
        push_u32(&mut out, self.flags);
        push_u32(&mut out, creator_offset);
        if self.extended {
            out.extend_from_slice(b"RD11");
            for size in [60u32, 24, 32, 40, 36, 12, 0] {
                push_u32(&mut out, size);
            }
        }

        for (i, cb) in self.cbuffers.iter().enumerate() {
            push_u32(&mut out, cb_name_offsets[i]);
            push_u32(&mut out, cb.variables.len() as u32);
            push_u32(
                &mut out,
                if cb.variables.is_empty() { 0 } else { var_table_offsets[i] },
            );
            push_u32(&mut out, cb.size);
            push_u32(&mut out, cb.flags);
            push_u32(&mut out, cb.kind);
        }

        for (i, rb) in self.resources.iter().enumerate() {
            push_u32(&mut out, rb_name_offsets[i]);
            push_u32(&mut out, rb.kind);
            push_u32(&mut out, rb.return_type);
            push_u32(&mut out, rb.dimension);
            push_u32(&mut out, rb.sample_count);
            push_u32(&mut out, rb.bind_point);
            push_u32(&mut out, rb.bind_count);
            push_u32(&mut out, rb.flags);
        }

        let mut flat_index = 0usize;
        for cb in &self.cbuffers {
            for var in &cb.variables {
                push_u32(&mut out, var_name_offsets[flat_index]);
                push_u32(&mut out, var.offset);
                push_u32(&mut out, var.size);
                push_u32(&mut out, var.flags);
                push_u32(&mut out, type_offsets[flat_index]);
                push_u32(&mut out, 0); // default value offset
                if self.extended {
                    let (tex_start, tex_count) =
                        var.texture_range.unwrap_or((u32::MAX, 0));
                    let (smp_start, smp_count) =
                        var.sampler_range.unwrap_or((u32::MAX, 0));
                    push_u32(&mut out, tex_start);
                    push_u32(&mut out, tex_count);
                    push_u32(&mut out, smp_start);
                    push_u32(&mut out, smp_count);
                }
                flat_index += 1;
            }
        }

        let mut flat_index = 0usize;
        for cb in &self.cbuffers {
            for var in &cb.variables {
                push_u16(&mut out, var.class);
                push_u16(&mut out, var.scalar);
                push_u16(&mut out, var.rows);
                push_u16(&mut out, var.columns);
                push_u16(&mut out, var.elements);
                push_u16(&mut out, 0); // member count
                push_u32(&mut out, 0); // member offset
                if self.extended {
                    out.extend_from_slice(&[0u8; 16]); // reserved
                    push_u32(&mut out, type_name_offsets[flat_index]);
                }
                flat_index += 1;
            }
        }

        out.extend_from_slice(&strings);
        out
    }
}

/// Builds a complete container with the given resource definitions and
/// optional signatures.
pub fn build_shader_blob(
    rdef: &RdefBuilder,
    input: Option<&SignatureBuilder>,
    output: Option<&SignatureBuilder>,
) -> Vec<u8> {
    let rdef_chunk = rdef.build();
    let input_chunk = input.map(|b| b.build_v0());
    let output_chunk = output.map(|b| b.build_v0());

    let mut chunks: Vec<(FourCC, &[u8])> = Vec::new();
    if let Some(chunk) = input_chunk.as_deref() {
        chunks.push((FourCC::ISGN, chunk));
    }
    if let Some(chunk) = output_chunk.as_deref() {
        chunks.push((FourCC::OSGN, chunk));
    }
    chunks.push((FourCC::RDEF, &rdef_chunk));
    build_container(&chunks)
}

fn push_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn push_u16(out: &mut Vec<u8>, v: u16) {
    out.extend_from_slice(&v.to_le_bytes());
}
