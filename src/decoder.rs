//! Offline reconstruction of formatted log text from the three producer
//! streams. Phase 1 parses INDEX into a dense schema table; phase 2 walks
//! LOG and RUNLENGTH in lockstep, expanding collapsed runs back into their
//! repeated records.
//!
//! The text-formatting step here is deliberately minimal — a full format
//! string engine is out of scope for this core. `Decoder::format` only does
//! `{}` placeholder substitution, enough to make the round-trip testable.

use std::fmt;

use crate::arg_kind::ArgKind;
use crate::error::{FormatError, Result};

/// A decoded value, one per logged positional argument.
#[derive(Debug, Clone, PartialEq)]
pub enum LogValue {
    Bool(bool),
    Char(char),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    String(String),
}

impl fmt::Display for LogValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogValue::Bool(v) => write!(f, "{v}"),
            LogValue::Char(v) => write!(f, "{v}"),
            LogValue::U8(v) => write!(f, "{v}"),
            LogValue::U16(v) => write!(f, "{v}"),
            LogValue::U32(v) => write!(f, "{v}"),
            LogValue::U64(v) => write!(f, "{v}"),
            LogValue::I8(v) => write!(f, "{v}"),
            LogValue::I16(v) => write!(f, "{v}"),
            LogValue::I32(v) => write!(f, "{v}"),
            LogValue::I64(v) => write!(f, "{v}"),
            LogValue::F32(v) => write!(f, "{v}"),
            LogValue::F64(v) => write!(f, "{v}"),
            LogValue::String(v) => write!(f, "{v}"),
        }
    }
}

/// One positional argument's shape, as recorded in INDEX.
#[derive(Debug, Clone)]
pub struct ArgSchema {
    pub kind: ArgKind,
    pub is_constant: bool,
    pub constant_value: Option<LogValue>,
}

/// The immutable description of one call site: its literal format string
/// plus the kind/constness of each positional argument.
#[derive(Debug, Clone)]
pub struct CallSiteSchema {
    pub format_string: String,
    pub args: Vec<ArgSchema>,
}

/// One resolved log record: which call site, and the values that fill its
/// non-constant positions (constant positions are already baked in by
/// [`Decoder::format`]).
#[derive(Debug, Clone)]
pub struct DecodedRecord {
    pub id: u16,
    pub values: Vec<LogValue>,
}

/// Sequential byte cursor shared by the INDEX parser and the LOG/RUNLENGTH
/// walk, reporting truncation with the stream name and byte offset.
struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
    stream: &'static str,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8], stream: &'static str) -> Self {
        Self { data, pos: 0, stream }
    }

    fn has_remaining(&self) -> bool {
        self.pos < self.data.len()
    }

    fn truncated(&self) -> FormatError {
        FormatError::Truncated {
            stream: self.stream,
            offset: self.pos as u64,
        }
    }

    fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.pos + len > self.data.len() {
            return Err(self.truncated());
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    fn read_u16(&mut self) -> Result<u16> {
        let b = self.read_bytes(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn read_u64(&mut self) -> Result<u64> {
        let b = self.read_bytes(8)?;
        Ok(u64::from_le_bytes(b.try_into().unwrap()))
    }

    fn read_string(&mut self) -> Result<String> {
        let len = self.read_u16()? as usize;
        let bytes = self.read_bytes(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| FormatError::UnsupportedArg {
            reason: "decoded string is not valid utf-8".to_string(),
        })
    }

    /// Reads one value of the given kind in its fixed-width wire form.
    fn read_value(&mut self, kind: ArgKind) -> Result<LogValue> {
        Ok(match kind {
            ArgKind::Bool => LogValue::Bool(self.read_u8()? != 0),
            ArgKind::Char => LogValue::Char(self.read_u8()? as char),
            ArgKind::U8 => LogValue::U8(self.read_u8()?),
            ArgKind::U16 => LogValue::U16(self.read_u16()?),
            ArgKind::U32 => LogValue::U32(u32::from_le_bytes(self.read_bytes(4)?.try_into().unwrap())),
            ArgKind::U64 => LogValue::U64(self.read_u64()?),
            ArgKind::I8 => LogValue::I8(self.read_u8()? as i8),
            ArgKind::I16 => LogValue::I16(i16::from_le_bytes(self.read_bytes(2)?.try_into().unwrap())),
            ArgKind::I32 => LogValue::I32(i32::from_le_bytes(self.read_bytes(4)?.try_into().unwrap())),
            ArgKind::I64 => LogValue::I64(i64::from_le_bytes(self.read_bytes(8)?.try_into().unwrap())),
            ArgKind::F32 => LogValue::F32(f32::from_le_bytes(self.read_bytes(4)?.try_into().unwrap())),
            ArgKind::F64 => LogValue::F64(f64::from_le_bytes(self.read_bytes(8)?.try_into().unwrap())),
            ArgKind::String => LogValue::String(self.read_string()?),
        })
    }
}

/// Parses the INDEX stream into a dense, id-ordered schema table.
pub fn parse_index(data: &[u8]) -> Result<Vec<CallSiteSchema>> {
    let mut cursor = Cursor::new(data, "INDEX");
    let mut schemas = Vec::new();

    while cursor.has_remaining() {
        let format_string = cursor.read_string()?;
        let num_args = cursor.read_u8()? as usize;

        let mut kinds = Vec::with_capacity(num_args);
        for _ in 0..num_args {
            kinds.push(ArgKind::from_tag(cursor.read_u8()?)?);
        }

        let mut args = Vec::with_capacity(num_args);
        for kind in kinds {
            let is_constant = cursor.read_u8()? != 0;
            let constant_value = if is_constant {
                Some(cursor.read_value(kind)?)
            } else {
                None
            };
            args.push(ArgSchema { kind, is_constant, constant_value });
        }

        schemas.push(CallSiteSchema { format_string, args });
    }

    Ok(schemas)
}

/// Rebuilds formatted text from LOG + INDEX + RUNLENGTH.
pub struct Decoder {
    schemas: Vec<CallSiteSchema>,
}

impl Decoder {
    /// Parses `index_bytes` and builds the schema table. `index_bytes` MAY
    /// be empty (a session that logged nothing).
    pub fn new(index_bytes: &[u8]) -> Result<Self> {
        Ok(Self { schemas: parse_index(index_bytes)? })
    }

    pub fn schema(&self, id: u16) -> Option<&CallSiteSchema> {
        self.schemas.get(id as usize)
    }

    /// Walks `log_bytes` and `runlength_bytes` (which MAY be empty) and
    /// returns every logical record in physical order, with collapsed runs
    /// expanded back out. Stops at the first error.
    pub fn decode<'a>(&'a self, log_bytes: &'a [u8], runlength_bytes: &'a [u8]) -> DecodedRecords<'a> {
        DecodedRecords {
            schemas: &self.schemas,
            log: Cursor::new(log_bytes, "LOG"),
            runlength: Cursor::new(runlength_bytes, "RUNLENGTH"),
            current_id: None,
            remaining_repeats: 0,
            stopped: false,
        }
    }

    /// Renders a decoded record's format string with its values substituted
    /// at each `{}` placeholder, left to right.
    pub fn format(&self, record: &DecodedRecord) -> Result<String> {
        let schema = self
            .schemas
            .get(record.id as usize)
            .ok_or(FormatError::InconsistentStreams { id: record.id })?;

        let mut out = String::with_capacity(schema.format_string.len());
        let mut chars = schema.format_string.chars().peekable();
        let mut values = record.values.iter();

        while let Some(c) = chars.next() {
            if c == '{' && chars.peek() == Some(&'}') {
                chars.next();
                if let Some(value) = values.next() {
                    out.push_str(&value.to_string());
                }
            } else {
                out.push(c);
            }
        }
        Ok(out)
    }
}

/// Iterator over the decoded records of one LOG+RUNLENGTH pair, in physical
/// order. Yields `Err` exactly once, at the offending position, and never
/// yields anything afterward — it does not attempt resynchronization.
pub struct DecodedRecords<'a> {
    schemas: &'a [CallSiteSchema],
    log: Cursor<'a>,
    runlength: Cursor<'a>,
    current_id: Option<u16>,
    remaining_repeats: u64,
    stopped: bool,
}

impl<'a> DecodedRecords<'a> {
    fn step(&mut self) -> Result<Option<DecodedRecord>> {
        if self.remaining_repeats == 0 {
            if !self.log.has_remaining() {
                return Ok(None);
            }
            let id = self.log.read_u16()?;

            if self.runlength.has_remaining() {
                let checkpoint = self.runlength.pos;
                let run_id = self.runlength.read_u16()?;
                if run_id == id {
                    self.remaining_repeats = self.runlength.read_u64()?;
                } else {
                    self.runlength.pos = checkpoint;
                    self.remaining_repeats = 1;
                }
            } else {
                self.remaining_repeats = 1;
            }
            self.current_id = Some(id);
        }

        let id = self.current_id.expect("current_id set above");
        let schema = self
            .schemas
            .get(id as usize)
            .ok_or(FormatError::InconsistentStreams { id })?;

        let mut values = Vec::with_capacity(schema.args.len());
        for arg in &schema.args {
            let value = if arg.is_constant {
                arg.constant_value.clone().expect("constant arg always carries a value")
            } else {
                self.log.read_value(arg.kind)?
            };
            values.push(value);
        }

        self.remaining_repeats -= 1;
        Ok(Some(DecodedRecord { id, values }))
    }
}

impl<'a> Iterator for DecodedRecords<'a> {
    type Item = Result<DecodedRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.stopped {
            return None;
        }
        match self.step() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => None,
            Err(e) => {
                self.stopped = true;
                Some(Err(e))
            }
        }
    }
}
