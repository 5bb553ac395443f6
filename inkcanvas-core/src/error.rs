//! Errors surfaced by the stroke engine.
//!
//! Every failure here is deterministic given its inputs - nothing touches IO, so nothing is worth retrying.
//! Outcomes that merely *look* like failures (a truncated query, erasing a stroke that isn't there)
//! are reported through return values instead.

use crate::spatial::IndexHandle;

/// Why a stroke chunk could not be decoded.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkError {
    #[error("chunk is {actual} bytes, but its header requires {expected}")]
    TooShort { expected: usize, actual: usize },
    #[error("unrecognized chunk version {0:#04x}")]
    UnknownVersion(u8),
    #[error("unrecognized chunk flags {0:#010b}")]
    UnknownFlags(u8),
    #[error("record {record} contains a non-finite value")]
    NonFinite { record: usize },
    #[error("too many samples to fit in a chunk")]
    TooManySamples,
}

/// A caller passed a value outside of an operation's domain.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterError {
    #[error("radius must be positive")]
    NonPositiveRadius,
    #[error("zoom factor must be positive")]
    NonPositiveZoom,
    #[error("operation requires at least one sample")]
    EmptySamples,
    #[error("{0} must be finite")]
    NonFinite(&'static str),
    #[error("buffer holds {actual} bytes, but {expected} are required")]
    BufferTooSmall { expected: usize, actual: usize },
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("malformed chunk: {0}")]
    MalformedChunk(#[from] ChunkError),
    #[error("invalid parameter: {0}")]
    InvalidParameter(#[from] ParameterError),
    #[error("{0} was used after being released")]
    UseAfterRelease(IndexHandle),
    #[error(transparent)]
    Id(#[from] crate::id::IdError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
