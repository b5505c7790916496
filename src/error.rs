//! Error taxonomy shared by the producer and the decoder.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, FormatError>;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("logger has already allocated {} call sites, the on-disk id is a u16", u16::MAX as u32 + 1)]
    TooManyCallSites,

    #[error("unsupported argument: {reason}")]
    UnsupportedArg { reason: String },

    #[error("{stream} stream truncated at offset {offset}")]
    Truncated { stream: &'static str, offset: u64 },

    #[error("unknown ArgKind tag {tag}")]
    UnknownTag { tag: u8 },

    #[error("stream references call-site id {id} with no matching INDEX schema")]
    InconsistentStreams { id: u16 },
}
