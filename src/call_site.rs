//! The `log_record!` macro.
//!
//! Each expansion site gets its own `static` id slot, initialized exactly
//! once by calling [`crate::Logger::log_index`]; every later hit at that
//! same source location skips registration entirely. Two call sites that
//! happen to share a literal format string still get two different ids,
//! because each macro expansion produces its own `static`. The per-call
//! payload is encoded straight into the `Logger`'s own scratch buffer (see
//! [`crate::Logger::log`]), not a fresh allocation per call.

/// Logs one call-site record.
///
/// ```
/// # use binary_logger::{Logger, log_record};
/// # use tempfile::tempdir;
/// # let dir = tempdir().unwrap();
/// # let mut logger = Logger::open(dir.path().join("demo.bin")).unwrap();
/// log_record!(logger, "Hello, {}!", "world").unwrap();
/// ```
///
/// Wrap an argument in [`crate::ConstantMarker`] to record it once in INDEX
/// instead of on every call:
///
/// ```
/// # use binary_logger::{Logger, ConstantMarker, log_record};
/// # use tempfile::tempdir;
/// # let dir = tempdir().unwrap();
/// # let mut logger = Logger::open(dir.path().join("demo.bin")).unwrap();
/// log_record!(logger, "pi={}", ConstantMarker::new(3.14159265f32)).unwrap();
/// ```
#[macro_export]
macro_rules! log_record {
    ($logger:expr, $fmt:expr $(, $arg:expr)* $(,)?) => {{
        use $crate::args::LogArgs;

        static SLOT: ::std::sync::OnceLock<u16> = ::std::sync::OnceLock::new();

        let __args = ( $($arg,)* );

        (|| -> $crate::error::Result<()> {
            let id = match SLOT.get() {
                Some(&id) => id,
                None => {
                    let kinds = __args.arg_kinds();
                    let mut suffixes = ::std::vec::Vec::new();
                    __args.encode_index_suffixes(&mut suffixes)?;
                    let new_id = $logger.log_index($fmt, &kinds, &suffixes)?;
                    // Another thread can never race this: a Logger is used
                    // by exactly one task, so the slot is only ever
                    // observed empty once.
                    let _ = SLOT.set(new_id);
                    new_id
                }
            };

            $logger.log(id, &__args)?;
            Ok(())
        })()
    }};
}
