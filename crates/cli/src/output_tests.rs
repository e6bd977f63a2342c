// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;

use serde::Serialize;

use super::{apply_limit, format_elapsed, format_or_json, format_time_ago, handle_list, OutputFormat};

#[derive(Debug, Clone, Serialize)]
struct FakeEntry {
    name: String,
}

#[test]
fn format_elapsed_picks_largest_unit() {
    assert_eq!(format_elapsed(5), "5s");
    assert_eq!(format_elapsed(125), "2m");
    assert_eq!(format_elapsed(7200), "2h");
    assert_eq!(format_elapsed(172_800), "2d");
}

#[test]
fn format_time_ago_zero_is_dash() {
    assert_eq!(format_time_ago(0), "-");
}

#[test]
fn format_time_ago_recent_is_seconds() {
    let now_ms = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_millis() as u64;
    assert_eq!(format_time_ago(now_ms), "0s");
}

#[test]
fn apply_limit_truncates_and_reports_remaining() {
    let mut items: Vec<i32> = (0..10).collect();
    let trunc = apply_limit(&mut items, 3, false);
    assert_eq!(items, vec![0, 1, 2]);
    assert_eq!(trunc.unwrap().remaining, 7);
}

#[test]
fn apply_limit_no_limit_keeps_everything() {
    let mut items: Vec<i32> = (0..10).collect();
    let trunc = apply_limit(&mut items, 3, true);
    assert_eq!(items.len(), 10);
    assert!(trunc.is_none());
}

#[test]
fn apply_limit_under_limit_is_noop() {
    let mut items = vec![1, 2];
    let trunc = apply_limit(&mut items, 5, false);
    assert_eq!(items, vec![1, 2]);
    assert!(trunc.is_none());
}

#[test]
fn handle_list_json_does_not_panic() {
    let entries = vec![FakeEntry { name: "a".into() }];
    let result = handle_list(OutputFormat::Json, &entries, "none", |_, _| {});
    assert!(result.is_ok());
}

#[test]
fn handle_list_text_empty_message() {
    let entries: Vec<FakeEntry> = vec![];
    let result = handle_list(OutputFormat::Text, &entries, "no entries", |_, out| {
        let _ = writeln!(out, "unreachable");
    });
    assert!(result.is_ok());
}

#[test]
fn format_or_json_json_path() {
    let result = format_or_json(OutputFormat::Json, &42, || panic!("should not run text_fn"));
    assert!(result.is_ok());
}

#[test]
fn format_or_json_text_path_runs_closure() {
    let mut ran = false;
    let result = format_or_json(OutputFormat::Text, &42, || ran = true);
    assert!(result.is_ok());
    assert!(ran);
}
