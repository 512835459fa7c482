use crate::error::ReflectError;
use crate::fourcc::FourCC;

// magic + checksum + reserved + total_size + chunk_count
const HEADER_LEN: usize = 4 + 16 + 4 + 4 + 4;

// Real containers carry a single-digit number of chunks; anything near this
// cap is hostile or corrupt and not worth walking.
const MAX_CHUNK_COUNT: u32 = 256;

/// A parsed shader-bytecode container.
///
/// Input is treated as untrusted: every offset and size is validated against
/// the declared total size, and parsing never panics on malformed data.
#[derive(Debug, Clone)]
pub struct Container<'a> {
    checksum: [u8; 16],
    chunks: Vec<(FourCC, &'a [u8])>,
}

impl<'a> Container<'a> {
    /// Parses a container from `bytes`.
    pub fn parse(bytes: &'a [u8]) -> Result<Container<'a>, ReflectError> {
        if bytes.len() < HEADER_LEN {
            return Err(ReflectError::MalformedHeader {
                reason: format!("need at least {HEADER_LEN} bytes, got {}", bytes.len()),
            });
        }

        let magic = FourCC([bytes[0], bytes[1], bytes[2], bytes[3]]);
        if magic != FourCC::DXBC {
            return Err(ReflectError::MalformedHeader {
                reason: format!("bad magic {magic}, expected {}", FourCC::DXBC),
            });
        }

        let mut checksum = [0u8; 16];
        checksum.copy_from_slice(&bytes[4..20]);

        // The dword after the checksum is reserved and ignored.
        let total_size = read_u32_le(bytes, 24)?;
        let chunk_count = read_u32_le(bytes, 28)?;

        if chunk_count > MAX_CHUNK_COUNT {
            return Err(ReflectError::MalformedOffsets {
                reason: format!("chunk count {chunk_count} exceeds maximum {MAX_CHUNK_COUNT}"),
            });
        }
        if (total_size as usize) < HEADER_LEN {
            return Err(ReflectError::MalformedHeader {
                reason: format!("total size {total_size} is smaller than the header"),
            });
        }
        if total_size as usize > bytes.len() {
            return Err(ReflectError::MalformedHeader {
                reason: format!(
                    "total size {total_size} exceeds input length {}",
                    bytes.len()
                ),
            });
        }
        let bytes = &bytes[..total_size as usize];

        let table_end = HEADER_LEN
            .checked_add(chunk_count as usize * 4)
            .filter(|&end| end <= bytes.len())
            .ok_or_else(|| ReflectError::MalformedOffsets {
                reason: format!("offset table for {chunk_count} chunks does not fit"),
            })?;

        let mut chunks = Vec::with_capacity(chunk_count as usize);
        for i in 0..chunk_count as usize {
            let offset = read_u32_le(bytes, HEADER_LEN + i * 4)? as usize;
            if offset < table_end {
                return Err(ReflectError::MalformedOffsets {
                    reason: format!("chunk {i} offset {offset} points into the header"),
                });
            }
            let data_start =
                offset
                    .checked_add(8)
                    .ok_or_else(|| ReflectError::MalformedOffsets {
                        reason: format!("chunk {i} header offset overflows"),
                    })?;
            if data_start > bytes.len() {
                return Err(ReflectError::MalformedOffsets {
                    reason: format!("chunk {i} header at {offset} is outside the container"),
                });
            }
            let fourcc = FourCC([
                bytes[offset],
                bytes[offset + 1],
                bytes[offset + 2],
                bytes[offset + 3],
            ]);
            let size = read_u32_le(bytes, offset + 4)? as usize;
            let data_end =
                data_start
                    .checked_add(size)
                    .ok_or_else(|| ReflectError::MalformedOffsets {
                        reason: format!("chunk {i} size overflows"),
                    })?;
            if data_end > bytes.len() {
                return Err(ReflectError::MalformedOffsets {
                    reason: format!(
                        "chunk {i} ({fourcc}) data {data_start}..{data_end} is outside the \
                         container of {} bytes",
                        bytes.len()
                    ),
                });
            }
            chunks.push((fourcc, &bytes[data_start..data_end]));
        }

        Ok(Container { checksum, chunks })
    }

    /// The checksum stored in the container header. Not verified.
    pub fn checksum(&self) -> &[u8; 16] {
        &self.checksum
    }

    /// Number of chunks in the container.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Iterates over all chunks in container order.
    pub fn chunks(&self) -> impl Iterator<Item = (FourCC, &'a [u8])> + '_ {
        self.chunks.iter().copied()
    }

    /// Payload of the first chunk with the given identifier, if any.
    pub fn chunk(&self, fourcc: FourCC) -> Option<&'a [u8]> {
        self.chunks
            .iter()
            .find(|(id, _)| *id == fourcc)
            .map(|(_, data)| *data)
    }
}

fn read_u32_le(bytes: &[u8], offset: usize) -> Result<u32, ReflectError> {
    let end = offset
        .checked_add(4)
        .filter(|&end| end <= bytes.len())
        .ok_or_else(|| ReflectError::MalformedHeader {
            reason: format!(
                "need 4 bytes at offset {offset}, but input is {} bytes",
                bytes.len()
            ),
        })?;
    let slice = &bytes[offset..end];
    Ok(u32::from_le_bytes([slice[0], slice[1], slice[2], slice[3]]))
}
