//! # Stroke IO
//!
//! Readers and writers for the at-rest forms of canvas data.

pub mod chunk;

pub use chunk::{decode, encode, peek_header, try_encode, ChunkFlags, ChunkHeader, StrokeChunk};

/// A format revision packed into one byte: major in the high nibble, minor in the low nibble.
///
/// Minor revisions only ever *append* data, so a reader understanding `major.m` can read
/// any `major.n` where `n >= m` by ignoring what it doesn't understand.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
}
impl Version {
    /// Get the version from its packed byte form.
    #[must_use]
    pub const fn from_byte(byte: u8) -> Self {
        Self {
            major: byte >> 4,
            minor: byte & 0x0F,
        }
    }
    /// Pack into one byte. Fields are truncated to four bits.
    #[must_use]
    pub const fn to_byte(self) -> u8 {
        (self.major << 4) | (self.minor & 0x0F)
    }
    /// Can a reader written against `self` make sense of data written as `other`?
    #[must_use]
    pub fn can_read(self, other: Self) -> bool {
        self.major == other.major && other.minor >= self.minor
    }
}
impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}
