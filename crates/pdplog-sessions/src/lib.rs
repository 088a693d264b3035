//! # pdplog-sessions
//!
//! Parsing for PDP armband logs.
//!
//! A log is a flat run of sessions. Each session begins with a header line
//! carrying a channel code and a hex epoch, followed by payload lines whose
//! format depends on the channel.
//!
//! ## Key Types
//!
//! - [`SessionScanner`] - Splits a log into [`RawSession`]s
//! - [`Session`] - A decoded session with a typed [`Payload`]
//! - [`ConvertError`] - Every failure the pipeline can report
//!
//! ## Usage
//!
//! ```rust,ignore
//! let sessions = pdplog_sessions::convert(std::io::BufReader::new(file))?;
//! pdplog_sessions::write_json_file(Path::new("data.json"), &sessions, false)?;
//! ```

mod decode;
mod error;
mod output;
mod scanner;
mod types;

use std::io::BufRead;

use tracing::debug;

pub use decode::{decode, encode_packed, parse_epoch};
pub use error::ConvertError;
pub use output::{write_json, write_json_file};
pub use scanner::{is_header, parse_header, scan, Header, SessionScanner, SESSION_MARKER};
pub use types::{
    Channel, DiagnosticRecord, Payload, RawSession, Session, DIAGNOSTIC_CHANNEL,
    TIMESTAMP_CHANNEL,
};

/// Scan and decode every session in `reader`, stopping at the first error.
pub fn convert<R: BufRead>(reader: R) -> Result<Vec<Session>, ConvertError> {
    convert_with(reader, |_, _| {})
}

/// Like [`convert`], calling `on_session` with the index of each decoded session.
pub fn convert_with<R, F>(reader: R, mut on_session: F) -> Result<Vec<Session>, ConvertError>
where
    R: BufRead,
    F: FnMut(usize, &Session),
{
    let mut sessions = Vec::new();
    for raw in SessionScanner::new(reader) {
        let raw = raw?;
        debug!(session = %raw, "scanned session");

        let session = decode(raw)?;
        on_session(sessions.len(), &session);
        sessions.push(session);
    }
    Ok(sessions)
}

/// [`convert`] over an in-memory log.
pub fn convert_str(input: &str) -> Result<Vec<Session>, ConvertError> {
    convert(input.as_bytes())
}
