// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::{Request, Response};

#[test]
fn encode_returns_json_without_length_prefix() {
    let response = Response::Pong;
    let encoded = encode(&response).expect("encode failed");
    let json_str = std::str::from_utf8(&encoded).expect("should be valid UTF-8");
    assert!(json_str.starts_with('{'), "should be JSON object: {json_str}");
}

#[tokio::test]
async fn read_write_message_roundtrip() {
    let original = b"hello world";

    let mut buffer = Vec::new();
    write_message(&mut buffer, original).await.expect("write failed");
    assert_eq!(buffer.len(), 4 + original.len());

    let mut cursor = std::io::Cursor::new(buffer);
    let read_back = read_message(&mut cursor).await.expect("read failed");
    assert_eq!(read_back, original);
}

#[tokio::test]
async fn write_message_adds_length_prefix() {
    let data = b"test data";

    let mut buffer = Vec::new();
    write_message(&mut buffer, data).await.expect("write failed");

    let len = u32::from_be_bytes([buffer[0], buffer[1], buffer[2], buffer[3]]) as usize;
    assert_eq!(len, data.len());
    assert_eq!(&buffer[4..], data);
}

#[tokio::test]
async fn read_message_on_empty_stream_reports_closed_connection() {
    let mut cursor = std::io::Cursor::new(Vec::<u8>::new());
    let err = read_message(&mut cursor).await.unwrap_err();
    assert!(matches!(err, ProtocolError::ConnectionClosed));
}

#[tokio::test]
async fn read_framed_rejects_oversized_length_prefix() {
    let mut buffer = Vec::new();
    buffer.extend_from_slice(&(MAX_MESSAGE_BYTES + 1).to_be_bytes());
    let mut cursor = std::io::Cursor::new(buffer);
    let err = read_message(&mut cursor).await.unwrap_err();
    assert!(matches!(err, ProtocolError::TooLarge(_)));
}

#[tokio::test]
async fn write_framed_then_read_framed_roundtrips_request() {
    let request = Request::Ping;

    let mut buffer = Vec::new();
    write_framed(&mut buffer, &request).await.expect("write failed");

    let mut cursor = std::io::Cursor::new(buffer);
    let decoded: Request = read_framed(&mut cursor).await.expect("read failed");
    assert_eq!(decoded, request);
}
