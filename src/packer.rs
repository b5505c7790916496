//! Type-directed serialization of a call site's schema (to INDEX) and its
//! per-call payload (to LOG), plus the run-length collapse of repeated
//! all-constant calls into RUNLENGTH records. The `Packer` never owns its
//! `Writer`s — it always operates against the `Writers` its `Logger` hands
//! it.

use crate::arg_kind::ArgKind;
use crate::error::Result;
use crate::logger::Writers;

#[derive(Default)]
struct RunLengthState {
    last_id: Option<u16>,
    run_count: u64,
}

pub struct Packer {
    run: RunLengthState,
}

impl Packer {
    pub fn new() -> Self {
        Self {
            run: RunLengthState::default(),
        }
    }

    /// Writes the INDEX schema record for a freshly allocated call-site id.
    pub fn register_call_site(
        &self,
        writers: &mut Writers,
        format_string: &str,
        arg_kinds: &[ArgKind],
        index_suffixes: &[u8],
    ) {
        writers
            .index
            .write(&(format_string.len() as u16).to_le_bytes());
        writers.index.write(format_string.as_bytes());
        writers.index.write(&[arg_kinds.len() as u8]);
        for kind in arg_kinds {
            writers.index.write(&[kind.tag()]);
        }
        writers.index.write(index_suffixes);
    }

    /// Appends one logical call record, collapsing it into the open run when
    /// possible. `payload` is the already-encoded, non-constant positional
    /// values for this call; an empty payload is exactly the "all args are
    /// constant" condition the algorithm guards on.
    pub fn write_log_entry(&mut self, writers: &mut Writers, id: u16, payload: &[u8]) {
        let all_constant = payload.is_empty();

        match self.run.last_id {
            None => {
                writers.log.write(&id.to_le_bytes());
                self.run.last_id = Some(id);
                self.run.run_count = 1;
            }
            Some(last_id) if last_id == id && all_constant => {
                self.run.run_count += 1;
            }
            Some(last_id) => {
                self.close_run(writers, last_id);
                writers.log.write(&id.to_le_bytes());
                self.run.last_id = Some(id);
                self.run.run_count = 1;
            }
        }

        writers.log.write(payload);
    }

    /// Closes any open run, then flushes all three streams. Shared by the
    /// user-visible `Logger::flush` and the shutdown path.
    pub fn flush(&mut self, writers: &mut Writers) -> Result<()> {
        if let Some(last_id) = self.run.last_id {
            self.close_run(writers, last_id);
        }
        self.run.last_id = None;
        self.run.run_count = 0;

        writers.log.flush()?;
        writers.index.flush()?;
        writers.runlength.flush()?;
        Ok(())
    }

    /// Emits a RUNLENGTH record for `id` only if the run was longer than
    /// one occurrence (a run of length 1 is never recorded).
    fn close_run(&self, writers: &mut Writers, id: u16) {
        if self.run.run_count > 1 {
            writers.runlength.write(&id.to_le_bytes());
            writers.runlength.write(&self.run.run_count.to_le_bytes());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::Writer;

    fn writers() -> Writers {
        Writers {
            log: Writer::new_in_memory(1024, "LOG"),
            index: Writer::new_in_memory(1024, "INDEX"),
            runlength: Writer::new_in_memory(1024, "RUNLENGTH"),
        }
    }

    #[test]
    fn singleton_run_never_emits_runlength() {
        let mut w = writers();
        let mut p = Packer::new();
        p.write_log_entry(&mut w, 0, &[]);
        p.write_log_entry(&mut w, 1, &[]);
        p.flush(&mut w).unwrap();
        assert!(w.runlength.memory_contents().is_empty());
        assert_eq!(w.log.memory_contents(), &[0, 0, 1, 0]);
    }

    #[test]
    fn repeated_constant_calls_collapse_into_one_run() {
        let mut w = writers();
        let mut p = Packer::new();
        p.write_log_entry(&mut w, 0, &[]);
        p.write_log_entry(&mut w, 0, &[]);
        p.write_log_entry(&mut w, 0, &[]);
        p.write_log_entry(&mut w, 1, &[]);
        p.flush(&mut w).unwrap();

        assert_eq!(w.log.memory_contents(), &[0, 0, 1, 0]);
        let mut expected_run = Vec::new();
        expected_run.extend_from_slice(&0u16.to_le_bytes());
        expected_run.extend_from_slice(&3u64.to_le_bytes());
        assert_eq!(w.runlength.memory_contents(), expected_run.as_slice());
    }

    #[test]
    fn non_constant_repeats_never_collapse() {
        let mut w = writers();
        let mut p = Packer::new();
        p.write_log_entry(&mut w, 0, &0u64.to_le_bytes());
        p.write_log_entry(&mut w, 0, &1u64.to_le_bytes());
        p.write_log_entry(&mut w, 0, &2u64.to_le_bytes());
        p.flush(&mut w).unwrap();

        assert!(w.runlength.memory_contents().is_empty());
        let log = w.log.memory_contents();
        assert_eq!(log.len(), 3 * (2 + 8));
    }

    #[test]
    fn flush_closes_an_open_run() {
        let mut w = writers();
        let mut p = Packer::new();
        p.write_log_entry(&mut w, 0, &[]);
        p.write_log_entry(&mut w, 0, &[]);
        p.flush(&mut w).unwrap();

        let mut expected_run = Vec::new();
        expected_run.extend_from_slice(&0u16.to_le_bytes());
        expected_run.extend_from_slice(&2u64.to_le_bytes());
        assert_eq!(w.runlength.memory_contents(), expected_run.as_slice());
    }
}
