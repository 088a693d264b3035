use std::fmt;

use serde::Serialize;

/// Channel carrying decimal timestamps, one per line.
pub const TIMESTAMP_CHANNEL: &str = "TIMESTMP";

/// Channel carrying `timestamp i j` diagnostic triples.
pub const DIAGNOSTIC_CHANNEL: &str = "DIAGNSTC";

/// Payload format selected by a channel name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Timestamp,
    Diagnostic,
    /// Any other channel: one line of 12-bit packed hex values
    Packed,
}

impl Channel {
    pub fn classify(name: &str) -> Self {
        match name {
            TIMESTAMP_CHANNEL => Channel::Timestamp,
            DIAGNOSTIC_CHANNEL => Channel::Diagnostic,
            _ => Channel::Packed,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Timestamp => write!(f, "timestamp"),
            Channel::Diagnostic => write!(f, "diagnostic"),
            Channel::Packed => write!(f, "packed"),
        }
    }
}

/// A session as it appears in the log, before its payload is decoded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSession {
    pub channel: String,
    /// Header-info token; characters 15..23 hold the hex epoch.
    pub info: String,
    pub payload: Vec<String>,
}

impl RawSession {
    pub fn new(channel: impl Into<String>, info: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            info: info.into(),
            payload: Vec::new(),
        }
    }

    pub fn with_payload<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.payload.extend(lines.into_iter().map(Into::into));
        self
    }
}

const PREVIEW_LEN: usize = 16;

impl fmt::Display for RawSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let payload: Vec<String> = self
            .payload
            .iter()
            .map(|p| match p.char_indices().nth(PREVIEW_LEN) {
                Some((cut, _)) => format!("{}...", &p[..cut]),
                None => p.clone(),
            })
            .collect();
        write!(
            f,
            "{{Channel:{} Info:{} Payload:[{}]}}",
            self.channel,
            self.info,
            payload.join(", ")
        )
    }
}

/// One decoded line of a `DIAGNSTC` payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DiagnosticRecord {
    pub timestamp: i64,
    pub i: i32,
    pub j: i32,
}

/// Decoded payload; the arm is chosen by the session's channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Packed(Vec<u16>),
    Timestamp(Vec<i64>),
    Diagnostic(Vec<DiagnosticRecord>),
}

impl Payload {
    pub fn len(&self) -> usize {
        match self {
            Payload::Packed(v) => v.len(),
            Payload::Timestamp(v) => v.len(),
            Payload::Diagnostic(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A fully decoded session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Session {
    pub channel: String,
    pub epoch: i64,
    pub payload: Payload,
}
