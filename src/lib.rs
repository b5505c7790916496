//! A deferred-formatting binary logger: at the call site, emit just enough
//! bytes to reconstruct the formatted message later — a compact call-site
//! id plus the raw non-constant argument values — and reconstruct the text
//! offline with a [`Decoder`].

pub mod arg_kind;
pub mod args;
pub mod call_site;
pub mod decoder;
pub mod error;
pub mod logger;
pub mod packer;
pub mod writer;

pub use arg_kind::{ArgKind, ConstantMarker, Loggable};
pub use args::{LogArg, LogArgs};
pub use decoder::{CallSiteSchema, DecodedRecord, Decoder, LogValue};
pub use error::{FormatError, Result};
pub use logger::{Logger, LoggerConfig};
