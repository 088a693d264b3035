//! Splits a log into raw sessions.
//!
//! A session starts at a header line and owns every non-empty line up to the
//! next header or the end of input. The scanner keeps a one-line lookahead so
//! the header that ends a session is handed back as the start of the next one.

use std::io::BufRead;

use tracing::trace;

use crate::error::ConvertError;
use crate::types::RawSession;

/// Literal that opens every session header line.
pub const SESSION_MARKER: &str = "SESSION-BEGIN";

/// Tokens captured from a header line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header<'a> {
    pub info: &'a str,
    pub channel: &'a str,
}

fn is_info_byte(b: u8) -> bool {
    b.is_ascii_digit() || b.is_ascii_lowercase()
}

fn is_channel_byte(b: u8) -> bool {
    b.is_ascii_digit() || b.is_ascii_uppercase()
}

fn run_end(bytes: &[u8], start: usize, pred: fn(u8) -> bool) -> usize {
    bytes[start..]
        .iter()
        .position(|&b| !pred(b))
        .map_or(bytes.len(), |n| start + n)
}

/// Match a header line: `SESSION-BEGIN`, anything, `_`, an info token of
/// `[0-9a-z]+`, then a channel of `[A-Z][0-9A-Z]+`.
///
/// When several underscores could start the fields, the one whose channel
/// ends furthest right wins (leftmost-longest), so
/// `SESSION-BEGIN x_abCD y_efGH` yields `ef`/`GH`.
pub fn parse_header(line: &str) -> Option<Header<'_>> {
    let start = line.find(SESSION_MARKER)? + SESSION_MARKER.len();
    let bytes = line.as_bytes();

    let mut best: Option<(usize, usize, usize)> = None;
    for underscore in (start..bytes.len()).filter(|&i| bytes[i] == b'_') {
        let info_start = underscore + 1;
        let info_end = run_end(bytes, info_start, is_info_byte);
        if info_end == info_start {
            continue;
        }
        match bytes.get(info_end) {
            Some(b) if b.is_ascii_uppercase() => {}
            _ => continue,
        }
        let channel_end = run_end(bytes, info_end + 1, is_channel_byte);
        if channel_end - info_end < 2 {
            continue;
        }
        if best.map_or(true, |(_, _, end)| channel_end > end) {
            best = Some((info_start, info_end, channel_end));
        }
    }

    // Every boundary sits on an ASCII byte, so slicing cannot split a char.
    best.map(|(info_start, info_end, channel_end)| Header {
        info: &line[info_start..info_end],
        channel: &line[info_end..channel_end],
    })
}

pub fn is_header(line: &str) -> bool {
    parse_header(line).is_some()
}

/// Iterator over the raw sessions of a log.
///
/// Yields at most one error; the iterator is fused after it.
pub struct SessionScanner<R> {
    reader: R,
    pending: Option<String>,
    line_no: usize,
    done: bool,
}

impl<R: BufRead> SessionScanner<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            pending: None,
            line_no: 0,
            done: false,
        }
    }

    /// Number of input lines consumed so far.
    pub fn line_number(&self) -> usize {
        self.line_no
    }

    /// Next trimmed line, taking the pushed-back one first. `None` at end of input.
    fn next_line(&mut self) -> Result<Option<String>, ConvertError> {
        if let Some(line) = self.pending.take() {
            return Ok(Some(line));
        }

        let mut buf = String::new();
        if self.reader.read_line(&mut buf)? == 0 {
            return Ok(None);
        }
        self.line_no += 1;
        Ok(Some(buf.trim().to_string()))
    }

    fn push_back(&mut self, line: String) {
        debug_assert!(self.pending.is_none());
        self.pending = Some(line);
    }

    fn read_session(&mut self) -> Result<Option<RawSession>, ConvertError> {
        let mut raw = loop {
            let Some(line) = self.next_line()? else {
                return Ok(None);
            };
            match parse_header(&line) {
                Some(header) => break RawSession::new(header.channel, header.info),
                None => {
                    if !line.is_empty() {
                        trace!(line = self.line_number(), "skipping line outside a session");
                    }
                }
            }
        };

        while let Some(line) = self.next_line()? {
            if is_header(&line) {
                self.push_back(line);
                break;
            }
            if !line.is_empty() {
                raw.payload.push(line);
            }
        }

        Ok(Some(raw))
    }
}

impl<R: BufRead> Iterator for SessionScanner<R> {
    type Item = Result<RawSession, ConvertError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_session() {
            Ok(Some(raw)) => Some(Ok(raw)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Scan an in-memory log into raw sessions.
pub fn scan(input: &str) -> Result<Vec<RawSession>, ConvertError> {
    SessionScanner::new(input.as_bytes()).collect()
}
