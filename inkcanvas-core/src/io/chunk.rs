//! # Stroke chunks
//!
//! The binary form of one stroke's samples, little-endian:
//!
//! | offset | field         | type  |
//! |--------|---------------|-------|
//! | 0      | version       | u8    |
//! | 1      | flags         | u8    |
//! | 2      | sample count  | u32   |
//! | 6      | records       | count × record |
//!
//! Each record is `x: f32, y: f32` followed by `pressure: f32` if [`ChunkFlags::PRESSURE`] is set.
//! Bytes past the final record are ignored, leaving room for minor revisions to append data.

use az::CheckedAs;

use super::Version;
use crate::error::{ChunkError, Result};
use crate::stroke::{StrokeSample, DEFAULT_PRESSURE};

/// The revision written by this encoder, and the oldest one its decoder accepts.
pub const CURRENT_VERSION: Version = Version { major: 0, minor: 1 };
pub const HEADER_SIZE: usize = std::mem::size_of::<RawHeader>();

bitflags::bitflags! {
    /// Which optional fields each record carries.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, bytemuck::Pod, bytemuck::Zeroable, Debug)]
    #[rustfmt::skip]
    #[repr(transparent)]
    pub struct ChunkFlags : u8 {
        /// Records report an f32 normalized pressure after the position.
        const PRESSURE = 0b0000_0001;
    }
}
impl ChunkFlags {
    /// How many f32 elements does a record with these flags occupy?
    #[must_use]
    pub const fn elements(self) -> usize {
        // Position is always present.
        2 + self.bits().count_ones() as usize
    }
    #[must_use]
    pub const fn record_size(self) -> usize {
        self.elements() * std::mem::size_of::<f32>()
    }
}

// Repr (C, packed) for matching layout in the chunk. Take care for endianness!
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C, packed)]
struct RawHeader {
    version: u8,
    flags: u8,
    sample_count: u32,
}

/// The validated header of a chunk.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct ChunkHeader {
    pub version: Version,
    pub flags: ChunkFlags,
    pub sample_count: u32,
}
impl ChunkHeader {
    /// Total bytes the header and records occupy, or `None` if that overflows.
    #[must_use]
    pub fn required_len(&self) -> Option<usize> {
        (self.sample_count as usize)
            .checked_mul(self.flags.record_size())?
            .checked_add(HEADER_SIZE)
    }
}

/// An encoded stroke, owned. Derefs to the raw bytes.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct StrokeChunk {
    bytes: Box<[u8]>,
}
impl StrokeChunk {
    /// Take ownership of the bytes, e.g. to hand them to storage.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes.into_vec()
    }
    /// Number of samples the chunk declares.
    #[must_use]
    pub fn sample_count(&self) -> u32 {
        // Encoder-produced, so the header is always present and valid.
        peek_header(&self.bytes).map_or(0, |header| header.sample_count)
    }
    /// Decode back into samples. Only fails if the chunk was corrupted in memory.
    pub fn decode(&self) -> Result<Vec<StrokeSample>> {
        decode(&self.bytes)
    }
}
impl std::ops::Deref for StrokeChunk {
    type Target = [u8];
    fn deref(&self) -> &Self::Target {
        &self.bytes
    }
}
impl AsRef<[u8]> for StrokeChunk {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}
impl std::fmt::Debug for StrokeChunk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrokeChunk")
            .field("len", &self.bytes.len())
            .field("header", &peek_header(&self.bytes).ok())
            .finish()
    }
}

/// Encode samples, including pressure.
///
/// # Panics
/// If there are more than `u32::MAX` samples.
#[must_use]
pub fn encode(samples: &[StrokeSample]) -> StrokeChunk {
    match try_encode(samples, ChunkFlags::PRESSURE) {
        Ok(chunk) => chunk,
        Err(e) => panic!("{e}"),
    }
}

/// Encode samples, writing only the optional fields requested in `flags`.
/// Omitted pressure decodes as [`DEFAULT_PRESSURE`].
pub fn try_encode(samples: &[StrokeSample], flags: ChunkFlags) -> Result<StrokeChunk> {
    let sample_count: u32 = samples
        .len()
        .checked_as()
        .ok_or(ChunkError::TooManySamples)?;
    let header = RawHeader {
        version: CURRENT_VERSION.to_byte(),
        flags: flags.bits(),
        sample_count: sample_count.to_le(),
    };

    let mut bytes = Vec::with_capacity(HEADER_SIZE + samples.len() * flags.record_size());
    bytes.extend_from_slice(bytemuck::bytes_of(&header));
    for sample in samples {
        bytes.extend_from_slice(&sample.x.to_le_bytes());
        bytes.extend_from_slice(&sample.y.to_le_bytes());
        if flags.contains(ChunkFlags::PRESSURE) {
            bytes.extend_from_slice(&sample.pressure.to_le_bytes());
        }
    }

    Ok(StrokeChunk {
        bytes: bytes.into_boxed_slice(),
    })
}

/// Read and validate the header, without looking at the records.
pub fn peek_header(bytes: &[u8]) -> Result<ChunkHeader> {
    let Some(header_bytes) = bytes.get(..HEADER_SIZE) else {
        return Err(ChunkError::TooShort {
            expected: HEADER_SIZE,
            actual: bytes.len(),
        }
        .into());
    };
    let raw: RawHeader = bytemuck::pod_read_unaligned(header_bytes);

    let version = Version::from_byte(raw.version);
    if !CURRENT_VERSION.can_read(version) {
        return Err(ChunkError::UnknownVersion(raw.version).into());
    }
    let flags = ChunkFlags::from_bits(raw.flags).ok_or(ChunkError::UnknownFlags(raw.flags))?;

    Ok(ChunkHeader {
        version,
        flags,
        // Change endianness from le -> native.
        sample_count: u32::from_le(raw.sample_count),
    })
}

/// Decode a chunk into samples.
///
/// Fails if the buffer is shorter than its header declares, if the version or flags are not understood,
/// or if any value is NaN or infinite.
pub fn decode(bytes: &[u8]) -> Result<Vec<StrokeSample>> {
    let header = peek_header(bytes)?;
    // Overflowing usize is just a very long requirement.
    let required = header.required_len().unwrap_or(usize::MAX);
    if bytes.len() < required {
        log::debug!(
            "rejecting chunk: {} samples declared but only {} bytes present",
            header.sample_count,
            bytes.len()
        );
        return Err(ChunkError::TooShort {
            expected: required,
            actual: bytes.len(),
        }
        .into());
    }

    let has_pressure = header.flags.contains(ChunkFlags::PRESSURE);
    let read_f32 = |bytes: &[u8]| -> f32 {
        // Slices come from `chunks_exact(4)`, always four long.
        let mut le = [0; 4];
        le.copy_from_slice(bytes);
        f32::from_le_bytes(le)
    };

    bytes[HEADER_SIZE..required]
        .chunks_exact(header.flags.record_size())
        .enumerate()
        .map(|(record, bytes)| {
            let mut elements = bytes.chunks_exact(4).map(read_f32);
            let x = elements.next().unwrap_or(f32::NAN);
            let y = elements.next().unwrap_or(f32::NAN);
            let pressure = if has_pressure {
                elements.next().unwrap_or(f32::NAN)
            } else {
                DEFAULT_PRESSURE
            };
            let sample = StrokeSample::new(x, y, pressure);
            if sample.is_finite() {
                Ok(sample)
            } else {
                Err(ChunkError::NonFinite { record }.into())
            }
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::Error;

    fn sample_stroke() -> Vec<StrokeSample> {
        vec![
            StrokeSample::new(0.0, 0.0, 0.0),
            StrokeSample::new(-12.5, 3.25, 0.5),
            StrokeSample::new(f32::MAX, f32::MIN_POSITIVE, 1.0),
            StrokeSample::new(-0.0, 1e-40, 0.75),
        ]
    }

    #[test]
    fn round_trip() {
        let samples = sample_stroke();
        let chunk = encode(&samples);
        let decoded = decode(&chunk).unwrap();
        // Compare bitwise, so -0.0 and subnormals are checked exactly.
        assert_eq!(samples.len(), decoded.len());
        for (a, b) in samples.iter().zip(&decoded) {
            assert_eq!(bytemuck::bytes_of(a), bytemuck::bytes_of(b));
        }
    }
    #[test]
    fn empty_is_header_only() {
        let chunk = encode(&[]);
        assert_eq!(chunk.len(), HEADER_SIZE);
        assert_eq!(chunk.sample_count(), 0);
        assert_eq!(decode(&chunk).unwrap(), Vec::new());
    }
    #[test]
    fn layout() {
        let chunk = encode(&[StrokeSample::new(1.0, 2.0, 0.5)]);
        assert_eq!(chunk.len(), HEADER_SIZE + 12);
        assert_eq!(chunk[0], CURRENT_VERSION.to_byte());
        assert_eq!(chunk[1], ChunkFlags::PRESSURE.bits());
        assert_eq!(&chunk[2..6], &1u32.to_le_bytes());
        assert_eq!(&chunk[6..10], &1.0f32.to_le_bytes());
        assert_eq!(&chunk[10..14], &2.0f32.to_le_bytes());
        assert_eq!(&chunk[14..18], &0.5f32.to_le_bytes());
    }
    #[test]
    fn position_only() {
        let samples = sample_stroke();
        let chunk = try_encode(&samples, ChunkFlags::empty()).unwrap();
        assert_eq!(chunk.len(), HEADER_SIZE + samples.len() * 8);
        let decoded = decode(&chunk).unwrap();
        assert!(decoded.iter().all(|s| s.pressure == DEFAULT_PRESSURE));
        assert!(samples
            .iter()
            .zip(&decoded)
            .all(|(a, b)| a.x.to_bits() == b.x.to_bits() && a.y.to_bits() == b.y.to_bits()));
    }
    #[test]
    fn truncated() {
        let chunk = encode(&sample_stroke());
        for len in [0, 3, HEADER_SIZE, chunk.len() - 1] {
            assert!(
                matches!(
                    decode(&chunk[..len]),
                    Err(Error::MalformedChunk(ChunkError::TooShort { .. }))
                ),
                "length {len} accepted"
            );
        }
    }
    #[test]
    fn huge_declared_count() {
        let mut bytes = encode(&[]).into_bytes();
        bytes[2..6].copy_from_slice(&u32::MAX.to_le_bytes());
        assert!(matches!(
            decode(&bytes),
            Err(Error::MalformedChunk(ChunkError::TooShort { .. }))
        ));
    }
    #[test]
    fn unknown_version() {
        for version in [0x00, 0x10, 0xFF] {
            let mut bytes = encode(&sample_stroke()).into_bytes();
            bytes[0] = version;
            assert_eq!(
                decode(&bytes),
                Err(Error::MalformedChunk(ChunkError::UnknownVersion(version)))
            );
        }
    }
    #[test]
    fn unknown_flags() {
        let mut bytes = encode(&sample_stroke()).into_bytes();
        bytes[1] |= 0b1000_0000;
        assert!(matches!(
            decode(&bytes),
            Err(Error::MalformedChunk(ChunkError::UnknownFlags(_)))
        ));
    }
    #[test]
    fn newer_minor_with_trailing_data() {
        let samples = sample_stroke();
        let mut bytes = encode(&samples).into_bytes();
        bytes[0] = Version { major: 0, minor: 4 }.to_byte();
        bytes.extend_from_slice(b"future fields");
        assert_eq!(decode(&bytes).unwrap().len(), samples.len());
    }
    #[test]
    fn non_finite() {
        let mut bytes = encode(&sample_stroke()).into_bytes();
        // y of the second record
        let offset = HEADER_SIZE + 12 + 4;
        bytes[offset..offset + 4].copy_from_slice(&f32::NAN.to_le_bytes());
        assert_eq!(
            decode(&bytes),
            Err(Error::MalformedChunk(ChunkError::NonFinite { record: 1 }))
        );

        let mut bytes = encode(&sample_stroke()).into_bytes();
        let offset = HEADER_SIZE + 8;
        bytes[offset..offset + 4].copy_from_slice(&f32::INFINITY.to_le_bytes());
        assert_eq!(
            decode(&bytes),
            Err(Error::MalformedChunk(ChunkError::NonFinite { record: 0 }))
        );
    }
    #[test]
    fn peek() {
        let chunk = encode(&sample_stroke());
        let header = peek_header(&chunk).unwrap();
        assert_eq!(header.version, CURRENT_VERSION);
        assert_eq!(header.flags, ChunkFlags::PRESSURE);
        assert_eq!(header.sample_count, 4);
        assert_eq!(header.required_len(), Some(chunk.len()));
    }
}
