//! `unpacker <log_file>` — a thin CLI over [`binary_logger::Decoder`].
//!
//! Reads `<log_file>`, `<log_file>.index`, and optionally
//! `<log_file>.runlength` (absent or empty is treated as no runs), and
//! prints one formatted line per resolved log record in physical order.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use binary_logger::{Decoder, Result};

fn sibling(path: &Path, ext: &str) -> PathBuf {
    let mut s = path.as_os_str().to_os_string();
    s.push(".");
    s.push(ext);
    PathBuf::from(s)
}

fn run(log_path: &Path) -> Result<()> {
    let log_bytes = fs::read(log_path)?;
    let index_bytes = fs::read(sibling(log_path, "index"))?;
    let runlength_bytes = fs::read(sibling(log_path, "runlength")).unwrap_or_default();

    let decoder = Decoder::new(&index_bytes)?;
    for record in decoder.decode(&log_bytes, &runlength_bytes) {
        let record = record?;
        println!("{}", decoder.format(&record)?);
    }
    Ok(())
}

fn main() -> ExitCode {
    let _ = tracing_subscriber::fmt::try_init();

    let log_path = match env::args().nth(1) {
        Some(p) => PathBuf::from(p),
        None => {
            eprintln!("usage: unpacker <log_file>");
            return ExitCode::FAILURE;
        }
    };

    match run(&log_path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("unpacker: {err}");
            ExitCode::FAILURE
        }
    }
}
