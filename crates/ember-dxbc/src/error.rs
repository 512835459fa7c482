use thiserror::Error;

use crate::fourcc::FourCC;

/// Errors produced while parsing compiled-shader reflection metadata.
///
/// Any of these is fatal to descriptor construction: the caller never
/// receives a partially-populated descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReflectError {
    /// The container header is truncated or self-inconsistent.
    #[error("malformed container header: {reason}")]
    MalformedHeader {
        /// What exactly was wrong.
        reason: String,
    },
    /// The chunk offset table points outside the container.
    #[error("malformed chunk offset table: {reason}")]
    MalformedOffsets {
        /// What exactly was wrong.
        reason: String,
    },
    /// A chunk payload failed to parse.
    #[error("invalid {fourcc} chunk: {reason}")]
    InvalidChunk {
        /// Identifier of the offending chunk.
        fourcc: FourCC,
        /// What exactly was wrong.
        reason: String,
    },
    /// The container lacks a chunk required for reflection.
    #[error("container has no {fourcc} chunk")]
    MissingChunk {
        /// Identifier of the chunk that was expected.
        fourcc: FourCC,
    },
    /// A bound resource reported a kind value outside the known enumeration.
    #[error("bound resource {name:?} has unsupported kind value {kind}")]
    UnsupportedResourceKind {
        /// Name of the resource as reported by the compiler.
        name: String,
        /// The raw kind value.
        kind: u32,
    },
    /// A constant-buffer variable lies outside its buffer's declared size.
    #[error(
        "variable {variable:?} in constant buffer {buffer:?} occupies \
         {start}..{end} which is outside the buffer size {size}"
    )]
    VariableOutOfRange {
        /// Name of the enclosing constant buffer.
        buffer: String,
        /// Name of the offending variable.
        variable: String,
        /// First byte of the variable.
        start: u32,
        /// One past the last byte of the variable.
        end: u32,
        /// Declared size of the enclosing buffer.
        size: u32,
    },
    /// The resource definitions declare a program type this crate does not know.
    #[error("unknown shader stage value {0:#06x} in resource definitions")]
    UnknownStage(u32),
}

impl ReflectError {
    pub(crate) fn invalid_chunk(fourcc: FourCC, reason: impl Into<String>) -> Self {
        ReflectError::InvalidChunk {
            fourcc,
            reason: reason.into(),
        }
    }
}
