use crate::error::ConvertError;
use crate::types::{Channel, DiagnosticRecord, Payload, RawSession, Session};

/// Byte range of the hex epoch inside a header-info token.
const EPOCH_RANGE: std::ops::Range<usize> = 15..23;

/// Hex digits per packed value.
const PACKED_WIDTH: usize = 3;

const PACKED_MAX: u16 = 0xFFF;

/// Decode a raw session into its typed form.
pub fn decode(raw: RawSession) -> Result<Session, ConvertError> {
    let epoch = parse_epoch(&raw.channel, &raw.info)?;

    let payload = match Channel::classify(&raw.channel) {
        Channel::Timestamp => Payload::Timestamp(timestamp(&raw.channel, &raw.payload)?),
        Channel::Diagnostic => Payload::Diagnostic(diagnostic(&raw.channel, &raw.payload)?),
        Channel::Packed => Payload::Packed(packed(&raw.channel, &raw.payload)?),
    };

    Ok(Session {
        channel: raw.channel,
        epoch,
        payload,
    })
}

impl TryFrom<RawSession> for Session {
    type Error = ConvertError;

    fn try_from(raw: RawSession) -> Result<Self, Self::Error> {
        decode(raw)
    }
}

/// Parse the 8 hex digits at `info[15..23]`.
pub fn parse_epoch(channel: &str, info: &str) -> Result<i64, ConvertError> {
    let digits = info.get(EPOCH_RANGE).ok_or_else(|| {
        ConvertError::header(
            channel,
            info,
            format!(
                "expected at least {} characters, got {}",
                EPOCH_RANGE.end,
                info.len()
            ),
        )
    })?;

    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ConvertError::header(
            channel,
            info,
            format!("epoch {:?} is not hexadecimal", digits),
        ));
    }

    i64::from_str_radix(digits, 16)
        .map_err(|e| ConvertError::header(channel, info, format!("epoch {:?}: {}", digits, e)))
}

fn parse_decimal<T: std::str::FromStr>(s: &str) -> Option<T> {
    // `FromStr` for integers accepts a leading '+', which is fine for decimals.
    s.parse().ok()
}

/// One signed decimal integer per line.
fn timestamp(channel: &str, lines: &[String]) -> Result<Vec<i64>, ConvertError> {
    lines
        .iter()
        .enumerate()
        .map(|(n, line)| {
            parse_decimal(line).ok_or_else(|| {
                ConvertError::payload(
                    channel,
                    Some(n + 1),
                    format!("expected a decimal integer, got {:?}", line),
                )
            })
        })
        .collect()
}

/// Three whitespace-separated decimals per line: `timestamp i j`.
fn diagnostic(channel: &str, lines: &[String]) -> Result<Vec<DiagnosticRecord>, ConvertError> {
    lines
        .iter()
        .enumerate()
        .map(|(n, line)| {
            parse_diagnostic_line(line).ok_or_else(|| {
                ConvertError::payload(
                    channel,
                    Some(n + 1),
                    format!("expected \"timestamp i j\", got {:?}", line),
                )
            })
        })
        .collect()
}

fn parse_diagnostic_line(line: &str) -> Option<DiagnosticRecord> {
    let mut fields = line.split_whitespace();
    let record = DiagnosticRecord {
        timestamp: parse_decimal(fields.next()?)?,
        i: parse_decimal(fields.next()?)?,
        j: parse_decimal(fields.next()?)?,
    };
    match fields.next() {
        Some(_) => None,
        None => Some(record),
    }
}

/// A single line of back-to-back 3-digit hex values.
fn packed(channel: &str, lines: &[String]) -> Result<Vec<u16>, ConvertError> {
    let [line] = lines else {
        return Err(ConvertError::payload(
            channel,
            None,
            format!(
                "expected exactly one {} payload line, got {}",
                Channel::Packed,
                lines.len()
            ),
        ));
    };

    if line.len() % PACKED_WIDTH != 0 {
        return Err(ConvertError::payload(
            channel,
            Some(1),
            format!(
                "length {} is not a multiple of {}",
                line.len(),
                PACKED_WIDTH
            ),
        ));
    }

    line.as_bytes()
        .chunks(PACKED_WIDTH)
        .enumerate()
        .map(|(n, chunk)| {
            let value = std::str::from_utf8(chunk)
                .ok()
                .filter(|s| s.bytes().all(|b| b.is_ascii_hexdigit()))
                .and_then(|s| u16::from_str_radix(s, 16).ok())
                .filter(|&v| v <= PACKED_MAX);
            value.ok_or_else(|| {
                ConvertError::payload(
                    channel,
                    Some(1),
                    format!(
                        "chunk {} ({:?}) is not a 12-bit hex value",
                        n,
                        String::from_utf8_lossy(chunk)
                    ),
                )
            })
        })
        .collect()
}

/// Render packed values back into their 3-digit hex line.
pub fn encode_packed(values: &[u16]) -> String {
    values
        .iter()
        .map(|v| format!("{:03x}", v & PACKED_MAX))
        .collect()
}
