use core::fmt;

/// A four-character chunk identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FourCC(pub [u8; 4]);

impl FourCC {
    /// Container magic.
    pub const DXBC: FourCC = FourCC(*b"DXBC");
    /// Resource definition chunk: constant buffers and bound resources.
    pub const RDEF: FourCC = FourCC(*b"RDEF");
    /// Input signature chunk, 24-byte entries.
    pub const ISGN: FourCC = FourCC(*b"ISGN");
    /// Input signature chunk, 32-byte entries.
    pub const ISG1: FourCC = FourCC(*b"ISG1");
    /// Output signature chunk, 24-byte entries.
    pub const OSGN: FourCC = FourCC(*b"OSGN");
    /// Output signature chunk, 32-byte entries.
    pub const OSG1: FourCC = FourCC(*b"OSG1");
    /// Shader model 4 bytecode chunk.
    pub const SHDR: FourCC = FourCC(*b"SHDR");
    /// Shader model 5 bytecode chunk.
    pub const SHEX: FourCC = FourCC(*b"SHEX");
    /// Statistics chunk emitted by the compiler.
    pub const STAT: FourCC = FourCC(*b"STAT");
}

impl fmt::Display for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            if b.is_ascii_graphic() || b == b' ' {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{b:02x}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FourCC({self})")
    }
}
