//! Reading and writing branch traces.
//!
//! A text trace has one conditional branch per line:
//!
//! ```text
//! 0x4006d4 1
//! 0x4006e0 0
//! ```
//!
//! The first field is the program counter in hexadecimal (the `0x` prefix
//! is optional) and the second field is the outcome (`1` for taken, `0` for
//! not-taken). Any further fields are ignored, and blank lines are skipped.

pub mod synthetic;

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use crate::branch::*;
use crate::error::TraceError;

/// Decode a single line of a text trace.
///
/// Returns `Ok(None)` for a blank line.
pub fn parse_record(line: &str, lineno: usize)
    -> Result<Option<BranchRecord>, TraceError>
{
    let malformed = |reason| TraceError::Malformed {
        line: lineno,
        reason,
        text: line.trim_end().to_string(),
    };

    let mut fields = line.split_whitespace();
    let raw_pc = match fields.next() {
        Some(f) => f,
        None => return Ok(None),
    };
    let raw_outcome = fields.next().ok_or_else(|| malformed("missing outcome"))?;

    let digits = raw_pc.strip_prefix("0x")
        .or_else(|| raw_pc.strip_prefix("0X"))
        .unwrap_or(raw_pc);
    let pc = usize::from_str_radix(digits, 16)
        .map_err(|_| malformed("invalid address"))?;

    let outcome = match raw_outcome {
        "1" => Outcome::T,
        "0" => Outcome::N,
        _ => return Err(malformed("invalid outcome")),
    };
    Ok(Some(BranchRecord { pc, outcome }))
}

/// A lazy reader over the records in a text trace.
///
/// Records are decoded one line at a time. A malformed line produces an
/// error, after which the reader yields nothing else.
pub struct TraceReader<R> {
    inner: R,
    buf: String,
    lineno: usize,
    failed: bool,
}
impl<R: BufRead> TraceReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buf: String::new(),
            lineno: 0,
            failed: false,
        }
    }
}

impl TraceReader<BufReader<Box<dyn io::Read + Send>>> {
    /// Open a trace file, or stdin when the path is `-`.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let inner: Box<dyn io::Read + Send> = if path == Path::new("-") {
            Box::new(io::stdin())
        } else {
            Box::new(File::open(path)?)
        };
        Ok(Self::new(BufReader::new(inner)))
    }

    /// Read a trace from stdin.
    pub fn stdin() -> Self {
        let inner: Box<dyn io::Read + Send> = Box::new(io::stdin());
        Self::new(BufReader::new(inner))
    }
}

impl<R: BufRead> Iterator for TraceReader<R> {
    type Item = Result<BranchRecord, TraceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            self.buf.clear();
            match self.inner.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {
                    self.lineno += 1;
                    match parse_record(&self.buf, self.lineno) {
                        Ok(Some(record)) => return Some(Ok(record)),
                        Ok(None) => continue,
                        Err(e) => {
                            self.failed = true;
                            return Some(Err(e));
                        },
                    }
                },
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e.into()));
                },
            }
        }
    }
}

/// Read an entire trace into memory.
pub fn read_trace<R: BufRead>(inner: R) -> Result<Vec<BranchRecord>, TraceError> {
    TraceReader::new(inner).collect()
}

/// Write records in the text trace format.
pub fn write_trace<'a, W, I>(mut out: W, records: I) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a BranchRecord>,
{
    for record in records {
        writeln!(out, "{:#x} {}", record.pc, record.outcome.as_digit())?;
    }
    out.flush()
}
