use std::fs::{self, File};
use std::io::BufReader;

use pdplog_sessions::{
    convert, convert_str, convert_with, decode, encode_packed, scan, write_json_file,
    ConvertError, DiagnosticRecord, Payload, RawSession,
};
use tempfile::TempDir;

/// Header-info token whose epoch digits (15..23) are `1a2b3c4d`.
const INFO: &str = "aaaaaaaaaaaaaaa1a2b3c4d";

fn header(info: &str, channel: &str) -> String {
    format!("SESSION-BEGIN 0000 0001_{}{}", info, channel)
}

/// Helper: a log with one session of every channel shape plus some noise.
fn sample_log() -> String {
    [
        "retrieve PDP".to_string(),
        header(INFO, "TIMESTMP"),
        "100".to_string(),
        "200".to_string(),
        "-5".to_string(),
        String::new(),
        header(concat!("000000000000000", "00000010"), "DIAGNSTC"),
        "7 1 2".to_string(),
        "8 -3 4".to_string(),
        header("0123456789abcde0000ffff", "ACCEL3X"),
        "0ff1a2fff000".to_string(),
        header(INFO, "TIMESTMP"),
    ]
    .join("\n")
}

fn write_log(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

// ============================================================
// Conversion
// ============================================================

#[test]
fn test_convert_sample_log() {
    let sessions = convert_str(&sample_log()).unwrap();

    assert_eq!(sessions.len(), 4);

    assert_eq!(sessions[0].channel, "TIMESTMP");
    assert_eq!(sessions[0].epoch, 0x1a2b3c4d);
    assert_eq!(sessions[0].payload, Payload::Timestamp(vec![100, 200, -5]));

    assert_eq!(sessions[1].channel, "DIAGNSTC");
    assert_eq!(sessions[1].epoch, 0x10);
    assert_eq!(
        sessions[1].payload,
        Payload::Diagnostic(vec![
            DiagnosticRecord { timestamp: 7, i: 1, j: 2 },
            DiagnosticRecord { timestamp: 8, i: -3, j: 4 },
        ])
    );

    assert_eq!(sessions[2].channel, "ACCEL3X");
    assert_eq!(sessions[2].epoch, 0xffff);
    assert_eq!(sessions[2].payload, Payload::Packed(vec![0x0ff, 0x1a2, 0xfff, 0x000]));

    // Trailing header with no payload still decodes.
    assert_eq!(sessions[3].payload, Payload::Timestamp(vec![]));
}

#[test]
fn test_session_count_matches_header_count() {
    let log = sample_log();
    let headers = log
        .lines()
        .filter(|l| pdplog_sessions::is_header(l.trim()))
        .count();

    assert_eq!(convert_str(&log).unwrap().len(), headers);
    assert_eq!(scan(&log).unwrap().len(), headers);
}

#[test]
fn test_no_headers_gives_empty_output() {
    assert!(convert_str("").unwrap().is_empty());
    assert!(convert_str("OK\nnothing to see\n").unwrap().is_empty());
}

#[test]
fn test_convert_from_file() {
    let dir = TempDir::new().unwrap();
    let path = write_log(&dir, "1700000000.log", &sample_log());

    let reader = BufReader::new(File::open(&path).unwrap());
    let sessions = convert(reader).unwrap();
    assert_eq!(sessions.len(), 4);
}

#[test]
fn test_convert_with_reports_each_session() {
    let mut seen = Vec::new();
    let sessions = convert_with(sample_log().as_bytes(), |index, session| {
        seen.push((index, session.channel.clone()));
    })
    .unwrap();

    assert_eq!(seen.len(), sessions.len());
    assert_eq!(seen[0], (0, "TIMESTMP".to_string()));
    assert_eq!(seen[2], (2, "ACCEL3X".to_string()));
}

// ============================================================
// Failures abort the whole run
// ============================================================

#[test]
fn test_first_bad_session_aborts() {
    let log = [
        header(INFO, "TIMESTMP"),
        "1".to_string(),
        header(INFO, "DIAGNSTC"),
        "7 1".to_string(),
        header(INFO, "TIMESTMP"),
        "2".to_string(),
    ]
    .join("\n");

    let err = convert_str(&log).unwrap_err();
    match err {
        ConvertError::PayloadFormat { channel, line, .. } => {
            assert_eq!(channel, "DIAGNSTC");
            assert_eq!(line, Some(1));
        }
        other => panic!("expected PayloadFormat, got {:?}", other),
    }
}

#[test]
fn test_short_info_is_header_error() {
    for info in ["a", "abcdefgh", "0123456789abcdef012345"] {
        let log = format!("{}\n5\n", header(info, "TIMESTMP"));
        let err = convert_str(&log).unwrap_err();
        assert!(err.is_header_format(), "info {:?} gave {:?}", info, err);
    }
}

#[test]
fn test_packed_line_count_errors() {
    let none = RawSession::new("FOOBAR1", INFO);
    assert!(decode(none).unwrap_err().is_payload_format());

    let two = RawSession::new("FOOBAR1", INFO).with_payload(["000", "fff"]);
    assert!(decode(two).unwrap_err().is_payload_format());

    // Via the scanner: a packed header directly followed by another header.
    let log = format!("{}\n{}\n1\n", header(INFO, "FOOBAR1"), header(INFO, "TIMESTMP"));
    assert!(convert_str(&log).unwrap_err().is_payload_format());
}

#[test]
fn test_packed_length_not_multiple_of_three() {
    for line in ["0", "0f", "0ff1", "0ff1a"] {
        let raw = RawSession::new("FOOBAR1", INFO).with_payload([line]);
        assert!(decode(raw).unwrap_err().is_payload_format(), "line {:?}", line);
    }
}

#[test]
fn test_error_messages() {
    let raw = RawSession::new("FOOBAR1", INFO).with_payload(["000", "fff"]);
    assert_eq!(
        decode(raw).unwrap_err().to_string(),
        "Invalid FOOBAR1 payload: expected exactly one packed payload line, got 2"
    );

    let raw = RawSession::new("TIMESTMP", INFO).with_payload(["1", "x"]);
    assert_eq!(
        decode(raw).unwrap_err().to_string(),
        "Invalid TIMESTMP payload (line 2): expected a decimal integer, got \"x\""
    );
}

// ============================================================
// Packed round trip
// ============================================================

#[test]
fn test_packed_round_trip() {
    for line in ["", "000", "0ff1a2", "fffabc0010209ee"] {
        let raw = RawSession::new("ACCEL3X", INFO).with_payload([line]);
        let session = decode(raw).unwrap();
        let Payload::Packed(values) = &session.payload else {
            panic!("expected packed payload");
        };
        assert_eq!(values.len(), line.len() / 3);
        assert_eq!(encode_packed(values), line);
    }
}

// ============================================================
// Output
// ============================================================

#[test]
fn test_write_json_file() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("data.json");

    let sessions = convert_str(&sample_log()).unwrap();
    write_json_file(&out, &sessions, false).unwrap();

    let written = fs::read_to_string(&out).unwrap();
    let value: serde_json::Value = serde_json::from_str(&written).unwrap();
    let array = value.as_array().unwrap();

    assert_eq!(array.len(), 4);
    assert_eq!(array[0]["Channel"], "TIMESTMP");
    assert_eq!(array[0]["Epoch"], 0x1a2b3c4d);
    assert_eq!(array[0]["Payload"], serde_json::json!([100, 200, -5]));
    assert_eq!(array[1]["Payload"][1], serde_json::json!({"Timestamp": 8, "I": -3, "J": 4}));
    assert_eq!(array[2]["Payload"], serde_json::json!([255, 418, 4095, 0]));
    assert!(written.ends_with('\n'));
}

#[test]
fn test_write_json_file_missing_dir() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("no-such-dir").join("data.json");

    let err = write_json_file(&out, &[], false).unwrap_err();
    assert!(matches!(err, ConvertError::Write { .. }));
}
