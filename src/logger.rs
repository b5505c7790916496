//! Owns the three output streams and the running call-site id counter; the
//! two operations a call-site macro expansion needs.

use std::path::{Path, PathBuf};

use crate::arg_kind::ArgKind;
use crate::args::LogArgs;
use crate::error::{FormatError, Result};
use crate::packer::Packer;
use crate::writer::{Writer, DEFAULT_LOG_CAPACITY, DEFAULT_SIDE_CAPACITY};

/// The three append-only streams a `Logger` owns exclusively for its
/// lifetime.
pub struct Writers {
    pub log: Writer,
    pub index: Writer,
    pub runlength: Writer,
}

/// Tunable buffer capacities for the three streams. Defaults favor fewer,
/// larger flushes over minimal memory footprint.
#[derive(Debug, Clone, Copy)]
pub struct LoggerConfig {
    pub log_capacity: usize,
    pub index_capacity: usize,
    pub runlength_capacity: usize,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            log_capacity: DEFAULT_LOG_CAPACITY,
            index_capacity: DEFAULT_SIDE_CAPACITY,
            runlength_capacity: DEFAULT_SIDE_CAPACITY,
        }
    }
}

/// A single producer's binary logger. Not `Sync`: the core provides no
/// internal synchronization, and concurrent use of one `Logger` from
/// multiple tasks is undefined behavior from its perspective.
pub struct Logger {
    writers: Writers,
    packer: Packer,
    next_id: u32,
    /// Reused across calls to `log` so the hot path never allocates once it
    /// has grown to its steady-state payload size; cleared (not dropped)
    /// before each call.
    scratch: Vec<u8>,
}

impl Logger {
    /// Opens `base_path`, `base_path.index`, and `base_path.runlength` for
    /// writing with the default stream capacities, truncating any existing
    /// content.
    pub fn open(base_path: impl AsRef<Path>) -> Result<Self> {
        Self::with_config(base_path, LoggerConfig::default())
    }

    /// As [`Logger::open`], with explicit stream buffer capacities.
    pub fn with_config(base_path: impl AsRef<Path>, config: LoggerConfig) -> Result<Self> {
        let base_path = base_path.as_ref();
        let index_path = append_extension(base_path, "index");
        let runlength_path = append_extension(base_path, "runlength");

        let writers = Writers {
            log: Writer::new(base_path, config.log_capacity, "LOG")?,
            index: Writer::new(index_path, config.index_capacity, "INDEX")?,
            runlength: Writer::new(runlength_path, config.runlength_capacity, "RUNLENGTH")?,
        };

        Ok(Self {
            writers,
            packer: Packer::new(),
            next_id: 0,
            scratch: Vec::new(),
        })
    }

    /// Allocates a new call-site id, registers its schema in INDEX, and
    /// returns the id. Called exactly once per physical call site by the
    /// `log_record!` macro's static cache.
    pub fn log_index(
        &mut self,
        format_string: &str,
        arg_kinds: &[ArgKind],
        index_suffixes: &[u8],
    ) -> Result<u16> {
        if self.next_id >= u16::MAX as u32 {
            return Err(FormatError::TooManyCallSites);
        }
        let id = self.next_id as u16;
        self.packer
            .register_call_site(&mut self.writers, format_string, arg_kinds, index_suffixes);
        self.next_id += 1;
        Ok(id)
    }

    /// Appends one call record for the already-registered call site `id`.
    /// Always called, for every invocation of that call site. Encodes
    /// `args`' non-constant values into a logger-owned scratch buffer
    /// instead of a fresh allocation, so the common case (buffer already
    /// grown to its steady-state size) never touches the allocator.
    pub fn log<A: LogArgs>(&mut self, id: u16, args: &A) -> Result<()> {
        self.scratch.clear();
        args.encode_payload(&mut self.scratch)?;
        self.packer.write_log_entry(&mut self.writers, id, &self.scratch);
        Ok(())
    }

    /// Forces durability: closes any open run and flushes all three
    /// streams, returning the first deferred I/O error (if any).
    pub fn flush(&mut self) -> Result<()> {
        self.packer.flush(&mut self.writers)
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if let Err(err) = self.flush() {
            tracing::error!(%err, "logger dropped with a deferred i/o error; data may be lost");
        }
    }
}

fn append_extension(path: &Path, ext: &str) -> PathBuf {
    let mut s = path.as_os_str().to_os_string();
    s.push(".");
    s.push(ext);
    PathBuf::from(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn open_creates_three_sibling_files() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("session.bin");
        let mut logger = Logger::open(&base).unwrap();
        logger.flush().unwrap();

        assert!(base.exists());
        assert!(append_extension(&base, "index").exists());
        assert!(append_extension(&base, "runlength").exists());
    }

    #[test]
    fn ids_are_allocated_densely_from_zero() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("session.bin");
        let mut logger = Logger::open(&base).unwrap();

        let id0 = logger.log_index("first", &[], &[]).unwrap();
        let id1 = logger.log_index("second", &[], &[]).unwrap();
        assert_eq!(id0, 0);
        assert_eq!(id1, 1);
    }
}
