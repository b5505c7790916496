//! End-to-end round trip: log through the real `Logger`, decode the three
//! files back with `Decoder`, and check the rendered text.

use std::fs;
use std::path::PathBuf;

use binary_logger::{log_record, ConstantMarker, Decoder, Logger, LoggerConfig};
use tempfile::tempdir;

fn sibling(path: &PathBuf, ext: &str) -> PathBuf {
    let mut s = path.as_os_str().to_os_string();
    s.push(".");
    s.push(ext);
    PathBuf::from(s)
}

fn decode_all(base: &PathBuf) -> Vec<String> {
    let log = fs::read(base).unwrap();
    let index = fs::read(sibling(base, "index")).unwrap();
    let runlength = fs::read(sibling(base, "runlength")).unwrap_or_default();

    let decoder = Decoder::new(&index).unwrap();
    decoder
        .decode(&log, &runlength)
        .map(|r| decoder.format(&r.unwrap()).unwrap())
        .collect()
}

#[test]
fn mixed_call_sites_round_trip_in_program_order() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("session.bin");
    {
        let mut logger = Logger::open(&base).unwrap();
        log_record!(logger, "startup").unwrap();
        log_record!(logger, "connecting to {}:{}", "localhost", 8080u16).unwrap();
        for i in 0..5u64 {
            log_record!(logger, "tick {}", i).unwrap();
        }
        log_record!(logger, "shutdown, code={}", ConstantMarker::new(0i32)).unwrap();
        log_record!(logger, "shutdown, code={}", ConstantMarker::new(0i32)).unwrap();
    }

    let lines = decode_all(&base);
    assert_eq!(
        lines,
        vec![
            "startup".to_string(),
            "connecting to localhost:8080".to_string(),
            "tick 0".to_string(),
            "tick 1".to_string(),
            "tick 2".to_string(),
            "tick 3".to_string(),
            "tick 4".to_string(),
            "shutdown, code=0".to_string(),
            "shutdown, code=0".to_string(),
        ]
    );
}

#[test]
fn empty_runlength_file_is_treated_as_no_runs() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("session.bin");
    {
        let mut logger = Logger::open(&base).unwrap();
        log_record!(logger, "only one record").unwrap();
    }
    // No repeats were ever logged, so the runlength file is empty but present.
    assert!(fs::read(sibling(&base, "runlength")).unwrap().is_empty());
    assert_eq!(decode_all(&base), vec!["only one record".to_string()]);
}

#[test]
fn missing_runlength_file_is_tolerated() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("session.bin");
    {
        let mut logger = Logger::open(&base).unwrap();
        log_record!(logger, "no runs here").unwrap();
    }
    fs::remove_file(sibling(&base, "runlength")).unwrap();
    assert_eq!(decode_all(&base), vec!["no runs here".to_string()]);
}

#[test]
fn bool_char_and_signed_integer_kinds_round_trip() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("session.bin");
    {
        let mut logger = Logger::open(&base).unwrap();
        log_record!(logger, "flag={} grade={} delta={}", true, 'A', -7i16).unwrap();
    }
    assert_eq!(decode_all(&base), vec!["flag=true grade=A delta=-7".to_string()]);
}

#[test]
fn too_many_call_sites_is_rejected() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("session.bin");
    let config = LoggerConfig {
        index_capacity: 64 * 1024,
        ..LoggerConfig::default()
    };
    let mut logger = Logger::with_config(&base, config).unwrap();

    for id in 0..u16::MAX {
        let result = logger.log_index("x", &[], &[]);
        assert_eq!(result.unwrap(), id);
    }

    assert!(matches!(
        logger.log_index("one too many", &[], &[]),
        Err(binary_logger::FormatError::TooManyCallSites)
    ));
}
