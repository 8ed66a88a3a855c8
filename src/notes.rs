//! Append-only merge policy for opportunity notes.
//!
//! Notes are stored as a single text column that may hold either plain text
//! or a JSON object carrying a `noteHistory` array. Merging never discards
//! prior content: existing notes are preserved in the history and the
//! incoming note is appended as a new entry.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

/// Merge an incoming note into the existing notes value.
///
/// Both sides are parsed as JSON objects (a plain string is wrapped as
/// `{"notes": <string>}`), shallow-merged with the incoming side winning,
/// then stamped with `lastUpdated = now` and a `noteHistory` entry
/// `{timestamp, notes, stageId, niche}` for the incoming note. An existing
/// object that carries `notes` but no history has its note seeded into the
/// history first, so the merge is lossless from the very first call.
///
/// If the merged object cannot be serialized, falls back to
/// [`concat_notes`].
pub fn merge_notes(existing: Option<&str>, incoming: &str, now: DateTime<Utc>) -> String {
    let existing = existing.unwrap_or("");
    match try_merge(existing, incoming, now) {
        Some(merged) => merged,
        None => concat_notes(existing, incoming),
    }
}

/// Plain-string fallback: the incoming note is appended after a separator,
/// which is only inserted when the existing notes are non-empty.
pub fn concat_notes(existing: &str, incoming: &str) -> String {
    if existing.is_empty() {
        incoming.to_string()
    } else {
        format!("{existing}\n\n---\n\n{incoming}")
    }
}

fn try_merge(existing: &str, incoming: &str, now: DateTime<Utc>) -> Option<String> {
    let existing_obj = parse_or_wrap(existing);
    let incoming_obj = parse_or_wrap(incoming);

    let mut history: Vec<Value> = existing_obj
        .get("noteHistory")
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default();

    // First merge over a plain existing note: seed the history with it so
    // the prior content survives in the same place later entries land.
    if history.is_empty() && !existing.is_empty() {
        if let Some(prior) = existing_obj.get("notes").and_then(|v| v.as_str()) {
            let timestamp = existing_obj
                .get("lastUpdated")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string())
                .unwrap_or_else(|| format_ts(now));
            history.push(history_entry(
                timestamp,
                prior,
                existing_obj.get("stageId"),
                existing_obj.get("niche"),
            ));
        }
    }

    let incoming_note = incoming_obj
        .get("notes")
        .and_then(|v| v.as_str())
        .unwrap_or(incoming);
    let stage_id = incoming_obj
        .get("stageId")
        .or_else(|| existing_obj.get("stageId"));
    let niche = incoming_obj
        .get("niche")
        .or_else(|| existing_obj.get("niche"));
    history.push(history_entry(format_ts(now), incoming_note, stage_id, niche));

    let mut merged = existing_obj;
    for (key, value) in incoming_obj {
        merged.insert(key, value);
    }
    merged.insert("lastUpdated".to_string(), Value::String(format_ts(now)));
    merged.insert("noteHistory".to_string(), Value::Array(history));

    serde_json::to_string(&Value::Object(merged)).ok()
}

/// Parse a string as a JSON object; anything else is wrapped as
/// `{"notes": <string>}`.
fn parse_or_wrap(raw: &str) -> Map<String, Value> {
    if let Ok(Value::Object(obj)) = serde_json::from_str::<Value>(raw) {
        return obj;
    }
    let mut wrapped = Map::new();
    wrapped.insert("notes".to_string(), Value::String(raw.to_string()));
    wrapped
}

fn history_entry(
    timestamp: String,
    notes: &str,
    stage_id: Option<&Value>,
    niche: Option<&Value>,
) -> Value {
    let mut entry = Map::new();
    entry.insert("timestamp".to_string(), Value::String(timestamp));
    entry.insert("notes".to_string(), Value::String(notes.to_string()));
    if let Some(stage_id) = stage_id.filter(|v| !v.is_null()) {
        entry.insert("stageId".to_string(), stage_id.clone());
    }
    if let Some(niche) = niche.filter(|v| !v.is_null()) {
        entry.insert("niche".to_string(), niche.clone());
    }
    Value::Object(entry)
}

fn format_ts(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
