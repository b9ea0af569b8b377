use thiserror::Error;

use crate::table::ResId;

pub type Result<T> = std::result::Result<T, Error>;

/// Every failure the decode/emit pipeline can produce.
///
/// Structural failures are fatal in strict mode and recovered in lenient
/// mode by advancing to the next chunk boundary. Referential failures
/// downgrade to warnings in lenient mode, substituting a synthetic
/// placeholder so downstream emission still succeeds.
#[derive(Debug, Error)]
pub enum Error {
    #[error("chunk at {pos:#x} declares {declared} bytes but only {available} remain")]
    TruncatedChunk {
        pos: u64,
        declared: u64,
        available: u64,
    },

    #[error("unknown chunk type {type_id:#06x} at {pos:#x}")]
    UnknownChunkType { pos: u64, type_id: u16 },

    #[error("read at {pos:#x} violates 4-byte alignment")]
    UnalignedRead { pos: u64 },

    #[error("string pool index {index} out of range, pool holds {count} strings")]
    StringPoolIndexOutOfRange { index: u32, count: u32 },

    #[error("type chunk references unknown type id {type_id:#04x}")]
    UnknownTypeId { type_id: u8 },

    #[error("unknown resource id {id}")]
    UnknownResourceId { id: ResId },

    #[error("multiple resources: spec={spec}, config={config}")]
    DuplicateResource { spec: String, config: String },

    #[error("config block at {pos:#x} claims {size} bytes beyond its chunk")]
    InvalidConfig { pos: u64, size: u32 },

    #[error("resource table contains no packages")]
    NoPackages,

    #[error("unsupported feature: {what}")]
    UnsupportedFeature { what: String },

    #[error("decode cancelled")]
    Cancelled,

    #[error("read failed at {pos:#x}")]
    Io {
        pos: u64,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn io(pos: u64, source: std::io::Error) -> Self {
        Error::Io { pos, source }
    }

    /// Wrap a non-io failure that surfaced through an io-shaped API.
    pub(crate) fn malformed<E>(pos: u64, err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Error::Io {
            pos,
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, err),
        }
    }
}
