//! Notes-merge tests: append-only history, seeding of plain existing notes,
//! field inheritance, and the concatenation fallback.

use chrono::{DateTime, Utc};
use serde_json::Value;
use tangocrm_sdk::notes::{concat_notes, merge_notes};

fn now() -> DateTime<Utc> {
    "2026-03-15T12:00:00Z".parse().unwrap()
}

fn parse(merged: &str) -> Value {
    serde_json::from_str(merged).unwrap()
}

fn history(merged: &Value) -> &Vec<Value> {
    merged["noteHistory"].as_array().unwrap()
}

// ---------------------------------------------------------------------------
// Core merge behavior
// ---------------------------------------------------------------------------

#[test]
fn json_existing_plus_plain_incoming_yields_two_history_entries() {
    let merged = merge_notes(Some(r#"{"notes":"first"}"#), "second", now());
    let merged = parse(&merged);

    let entries = history(&merged);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["notes"], "first");
    assert_eq!(entries[1]["notes"], "second");

    // The incoming side wins the shallow merge.
    assert_eq!(merged["notes"], "second");

    let last_updated = merged["lastUpdated"].as_str().unwrap();
    assert!(last_updated >= "2026-03-15T12:00:00.000Z");
}

#[test]
fn repeated_merges_keep_appending_without_duplicates() {
    let first = merge_notes(Some(r#"{"notes":"first"}"#), "second", now());
    let second = merge_notes(Some(&first), "third", now());
    let merged = parse(&second);

    let entries = history(&merged);
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0]["notes"], "first");
    assert_eq!(entries[1]["notes"], "second");
    assert_eq!(entries[2]["notes"], "third");
}

#[test]
fn plain_existing_note_is_seeded_into_history() {
    let merged = merge_notes(Some("hello"), "world", now());
    let merged = parse(&merged);

    let entries = history(&merged);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["notes"], "hello");
    assert_eq!(entries[1]["notes"], "world");
}

#[test]
fn no_existing_note_starts_a_single_entry_history() {
    let merged = merge_notes(None, "first", now());
    let merged = parse(&merged);

    let entries = history(&merged);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["notes"], "first");
    assert_eq!(merged["notes"], "first");
}

// ---------------------------------------------------------------------------
// stageId / niche inheritance
// ---------------------------------------------------------------------------

#[test]
fn new_entry_inherits_stage_and_niche_from_the_existing_object() {
    let existing = r#"{"notes":"x","stageId":"pitch-sent","niche":"creator"}"#;
    let merged = merge_notes(Some(existing), "y", now());
    let merged = parse(&merged);

    let entries = history(&merged);
    let last = entries.last().unwrap();
    assert_eq!(last["stageId"], "pitch-sent");
    assert_eq!(last["niche"], "creator");
}

#[test]
fn incoming_stage_and_niche_override_existing_ones() {
    let existing = r#"{"notes":"x","stageId":"pitch-sent","niche":"creator"}"#;
    let incoming = r#"{"notes":"y","stageId":"rate-negotiation"}"#;
    let merged = merge_notes(Some(existing), incoming, now());
    let merged = parse(&merged);

    let last = history(&merged).last().unwrap().clone();
    assert_eq!(last["stageId"], "rate-negotiation");
    // Niche was not supplied by the incoming side; inherited.
    assert_eq!(last["niche"], "creator");
    assert_eq!(merged["stageId"], "rate-negotiation");
}

#[test]
fn entries_omit_absent_stage_and_niche() {
    let merged = merge_notes(None, "plain", now());
    let merged = parse(&merged);

    let entry = &history(&merged)[0];
    assert!(entry.get("stageId").is_none());
    assert!(entry.get("niche").is_none());
}

// ---------------------------------------------------------------------------
// JSON incoming
// ---------------------------------------------------------------------------

#[test]
fn json_incoming_contributes_its_notes_field() {
    let merged = merge_notes(
        Some(r#"{"notes":"kickoff summary"}"#),
        r#"{"notes":"follow-up scheduled","stageId":"discovery-scheduled","niche":"coach"}"#,
        now(),
    );
    let merged = parse(&merged);

    let last = history(&merged).last().unwrap().clone();
    assert_eq!(last["notes"], "follow-up scheduled");
    assert_eq!(last["stageId"], "discovery-scheduled");
    assert_eq!(last["niche"], "coach");
}

// ---------------------------------------------------------------------------
// Fallback concatenation
// ---------------------------------------------------------------------------

#[test]
fn concat_inserts_the_separator_only_after_existing_content() {
    assert_eq!(concat_notes("", "only"), "only");
    assert_eq!(
        concat_notes("first", "second"),
        "first\n\n---\n\nsecond"
    );
}
