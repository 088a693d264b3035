use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Error reading input: {0}")]
    Read(#[from] std::io::Error),

    #[error("Invalid {channel} header info {info:?}: {reason}")]
    HeaderFormat {
        channel: String,
        info: String,
        reason: String,
    },

    #[error("Invalid {channel} payload{}: {reason}", line_suffix(.line))]
    PayloadFormat {
        channel: String,
        /// 1-based payload line, when the fault belongs to a single line
        line: Option<usize>,
        reason: String,
    },

    #[error("Error writing output {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error encoding json output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Usage(String),
}

fn line_suffix(line: &Option<usize>) -> String {
    match line {
        Some(n) => format!(" (line {})", n),
        None => String::new(),
    }
}

impl ConvertError {
    pub(crate) fn header(channel: &str, info: &str, reason: impl Into<String>) -> Self {
        ConvertError::HeaderFormat {
            channel: channel.to_string(),
            info: info.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn payload(channel: &str, line: Option<usize>, reason: impl Into<String>) -> Self {
        ConvertError::PayloadFormat {
            channel: channel.to_string(),
            line,
            reason: reason.into(),
        }
    }

    pub fn is_header_format(&self) -> bool {
        matches!(self, ConvertError::HeaderFormat { .. })
    }

    pub fn is_payload_format(&self) -> bool {
        matches!(self, ConvertError::PayloadFormat { .. })
    }
}
