//! Codec Tests
//!
//! Tests for command and response framing, validation, and the reply
//! bodies carried inside OK responses.

use std::io::Cursor;
use std::ops::Bound;

use sortkv::error::KvError;
use sortkv::ops::{Direction, OpRecord, MAX_SCAN_LIMIT};
use sortkv::protocol::{
    decode_command, decode_response, encode_command, encode_response, read_command,
    read_response, write_command, write_response, Command, CommandType, IterateArgs,
    IterateReply, KeyValue, Response, ScanItem, Status, HEADER_SIZE, MAX_PAYLOAD_SIZE,
};

// =============================================================================
// Command Framing Tests
// =============================================================================

#[test]
fn test_command_header() {
    let cmd = Command::Get {
        key: b"hello".to_vec(),
    };
    let encoded = encode_command(&cmd).unwrap();

    assert_eq!(encoded[0], CommandType::Get as u8);
    let len = u32::from_be_bytes([encoded[1], encoded[2], encoded[3], encoded[4]]) as usize;
    assert_eq!(encoded.len(), HEADER_SIZE + len);
}

#[test]
fn test_structured_commands_survive_encoding() {
    let commands = vec![
        Command::MultiGet {
            keys: vec![b"a".to_vec(), Vec::new(), vec![0xFF, 0x00]],
        },
        Command::Iterate(IterateArgs {
            start: Some(b"b".to_vec()),
            end: Some(b"d".to_vec()),
            include_start: false,
            include_end: true,
            forward: false,
            max: Some(7),
            include_values: false,
        }),
        Command::Batch {
            ops: vec![OpRecord::put("k", "v"), OpRecord::delete("gone")],
        },
        Command::Property {
            name: "sortkv.stats".to_string(),
        },
        Command::Snapshot {
            destination: "/tmp/backup".to_string(),
        },
    ];

    for cmd in commands {
        let decoded = decode_command(&encode_command(&cmd).unwrap()).unwrap();
        assert_eq!(decoded, cmd);
    }
}

#[test]
fn test_unknown_command_byte() {
    let mut encoded = encode_command(&Command::Ping).unwrap();
    encoded[0] = 0x7F;

    assert!(matches!(decode_command(&encoded), Err(KvError::Protocol(_))));
}

#[test]
fn test_command_byte_must_match_payload() {
    let mut encoded = encode_command(&Command::Delete { key: b"k".to_vec() }).unwrap();
    encoded[0] = CommandType::Get as u8;

    assert!(matches!(decode_command(&encoded), Err(KvError::Protocol(_))));
}

#[test]
fn test_garbage_payload() {
    let mut encoded = vec![CommandType::Batch as u8];
    encoded.extend_from_slice(&3u32.to_be_bytes());
    encoded.extend_from_slice(&[0xFF, 0xFF, 0xFF]);

    assert!(matches!(decode_command(&encoded), Err(KvError::Protocol(_))));
}

#[test]
fn test_incomplete_frames() {
    let encoded = encode_command(&Command::Get { key: b"key".to_vec() }).unwrap();

    assert!(decode_command(&encoded[..3]).is_err());
    assert!(decode_command(&encoded[..encoded.len() - 1]).is_err());
}

#[test]
fn test_oversized_payload_rejected_from_header() {
    let mut header = vec![CommandType::Put as u8];
    header.extend_from_slice(&(MAX_PAYLOAD_SIZE + 1).to_be_bytes());

    let mut stream = Cursor::new(header);
    assert!(matches!(read_command(&mut stream), Err(KvError::Protocol(_))));
}

// =============================================================================
// Response Tests
// =============================================================================

#[test]
fn test_response_statuses() {
    let responses = vec![
        Response::ok(Some(b"value".to_vec())),
        Response::ok(None),
        Response::not_found(),
        Response::error("boom"),
        Response::bad_request("bad"),
        Response::too_large("big"),
    ];

    for response in responses {
        let decoded = decode_response(&encode_response(&response).unwrap()).unwrap();
        assert_eq!(decoded, response);
    }
}

#[test]
fn test_unknown_status_byte() {
    let mut encoded = encode_response(&Response::ok(None)).unwrap();
    encoded[0] = 0x42;

    assert!(matches!(decode_response(&encoded), Err(KvError::Protocol(_))));
}

#[test]
fn test_oversized_response_refused() {
    let response = Response::ok(Some(vec![0u8; MAX_PAYLOAD_SIZE as usize + 1]));

    let err = encode_response(&response).unwrap_err();
    assert!(matches!(err, KvError::ReplyTooLarge { .. }));

    let mut buf = Vec::new();
    assert!(write_response(&mut buf, &response).is_err());
    assert!(buf.is_empty());
}

#[test]
fn test_response_at_payload_limit() {
    let response = Response::ok(Some(vec![7u8; MAX_PAYLOAD_SIZE as usize]));

    let decoded = decode_response(&encode_response(&response).unwrap()).unwrap();
    assert_eq!(decoded.payload.map(|p| p.len()), Some(MAX_PAYLOAD_SIZE as usize));
}

#[test]
fn test_error_mapping() {
    assert_eq!(Response::from_error(&KvError::KeyNotFound).status, Status::NotFound);
    assert_eq!(
        Response::from_error(&KvError::BadBatch("x".into())).status,
        Status::BadRequest
    );
    assert_eq!(
        Response::from_error(&KvError::Oversize { count: 2, max: 1 }).status,
        Status::TooLarge
    );
    assert_eq!(
        Response::from_error(&KvError::ReplyTooLarge { size: 2, max: 1 }).status,
        Status::TooLarge
    );
    assert_eq!(
        Response::from_error(&KvError::Storage("disk".into())).status,
        Status::Error
    );

    let response = Response::from_error(&KvError::Storage("disk".into()));
    assert!(response.message().contains("disk"));
}

#[test]
fn test_reply_body_decoding() {
    let reply = IterateReply {
        more: true,
        data: vec![
            ScanItem::Key(b"a".to_vec()),
            ScanItem::Pair(KeyValue {
                key: b"b".to_vec(),
                value: b"B".to_vec(),
            }),
        ],
    };
    let response = Response::ok_encoded(&reply).unwrap();

    let decoded: IterateReply = response.decode().unwrap();
    assert_eq!(decoded, reply);
    assert_eq!(decoded.data[0].value(), None);
    assert_eq!(decoded.data[1].key(), b"b");

    assert!(Response::ok(None).decode::<IterateReply>().is_err());
}

// =============================================================================
// Stream I/O Tests
// =============================================================================

#[test]
fn test_stream_sequence() {
    let mut buf = Vec::new();
    write_command(&mut buf, &Command::Ping).unwrap();
    write_command(&mut buf, &Command::Get { key: b"k".to_vec() }).unwrap();

    let mut stream = Cursor::new(buf);
    assert_eq!(read_command(&mut stream).unwrap(), Command::Ping);
    assert_eq!(
        read_command(&mut stream).unwrap(),
        Command::Get { key: b"k".to_vec() }
    );
    assert!(matches!(read_command(&mut stream), Err(KvError::Io(_))));
}

#[test]
fn test_response_stream() {
    let mut buf = Vec::new();
    write_response(&mut buf, &Response::not_found()).unwrap();
    write_response(&mut buf, &Response::ok(Some(b"v".to_vec()))).unwrap();

    let mut stream = Cursor::new(buf);
    assert_eq!(read_response(&mut stream).unwrap().status, Status::NotFound);
    assert_eq!(read_response(&mut stream).unwrap().payload, Some(b"v".to_vec()));
}

// =============================================================================
// Iterate Argument Tests
// =============================================================================

#[test]
fn test_iterate_defaults() {
    let args = IterateArgs::default();
    assert!(args.include_start);
    assert!(!args.include_end);
    assert!(args.forward);
    assert!(args.include_values);

    let request = args.to_scan_request();
    assert_eq!(request.start(), &Bound::Unbounded);
    assert_eq!(request.end(), &Bound::Unbounded);
    assert_eq!(request.direction(), Direction::Forward);
    assert_eq!(request.limit(), MAX_SCAN_LIMIT);
}

#[test]
fn test_iterate_args_resolve_bounds() {
    let args = IterateArgs {
        start: Some(b"s".to_vec()),
        end: Some(b"e".to_vec()),
        include_start: false,
        include_end: true,
        forward: false,
        max: Some(5),
        include_values: true,
    };

    let request = args.to_scan_request();
    assert_eq!(request.start(), &Bound::Excluded(b"s".to_vec()));
    assert_eq!(request.end(), &Bound::Included(b"e".to_vec()));
    assert_eq!(request.direction(), Direction::Backward);
    assert_eq!(request.limit(), 5);
}

#[test]
fn test_iterate_max_is_capped() {
    let args = IterateArgs {
        max: Some(u64::MAX),
        ..Default::default()
    };
    assert_eq!(args.to_scan_request().limit(), MAX_SCAN_LIMIT);
}
