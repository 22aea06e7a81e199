//! Backup, restore, and CSV export
//!
//! A backup is a raw dump of every persisted key into one JSON object;
//! restoring parses and validates the whole file before touching the
//! store, so malformed input applies nothing. The CSV export of attempt
//! history is deliberately plain: a static header and comma-joined rows,
//! with no quoting, since no exported field contains a comma.

use std::path::Path;

use anyhow::{Context, Result, bail};
use serde_json::Value;

use super::{KeyValueStore, StoreError, keys, load_record};
use crate::store::progress::History;

/// Collect every key into one JSON object. Values that parse as JSON are
/// embedded as values; anything else is kept as a raw string so the dump
/// stays lossless.
pub fn dump(store: &dyn KeyValueStore) -> Value {
    let mut object = serde_json::Map::new();
    for key in store.keys() {
        if let Some(raw) = store.get(&key) {
            let value = serde_json::from_str(&raw).unwrap_or(Value::String(raw));
            object.insert(key, value);
        }
    }
    Value::Object(object)
}

/// Apply a parsed dump: every existing key is removed, then every entry
/// of the dump is written. The dump must be a JSON object.
pub fn apply(store: &mut dyn KeyValueStore, dump: &Value) -> Result<usize, StoreError> {
    use serde::de::Error as _;

    let Value::Object(entries) = dump else {
        return Err(StoreError::Corrupt(serde_json::Error::custom(
            "backup root must be a JSON object",
        )));
    };

    for key in store.keys() {
        store.remove(&key)?;
    }

    for (key, value) in entries {
        let raw = match value {
            Value::String(s) => s.clone(),
            other => serde_json::to_string(other)?,
        };
        store.set(key, raw)?;
    }

    Ok(entries.len())
}

/// Write a backup file
pub fn export_to_file(store: &dyn KeyValueStore, path: &Path) -> Result<usize> {
    let dump = dump(store);
    let count = dump.as_object().map_or(0, |o| o.len());

    let contents =
        serde_json::to_string_pretty(&dump).context("Failed to serialize backup")?;
    std::fs::write(path, contents)
        .with_context(|| format!("Failed to write backup to {:?}", path))?;

    Ok(count)
}

/// Read and apply a backup file. Parsing happens before any mutation, so
/// a malformed file leaves the store untouched.
pub fn import_from_file(store: &mut dyn KeyValueStore, path: &Path) -> Result<usize> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read backup from {:?}", path))?;

    let parsed: Value =
        serde_json::from_str(&contents).context("Backup file is not valid JSON")?;
    if !parsed.is_object() {
        bail!("Backup file must contain a single JSON object");
    }

    let count = apply(store, &parsed).context("Failed to apply backup")?;
    Ok(count)
}

const CSV_HEADER: &str = "question_id,task,points,max,taken_at";

/// Render attempt history as CSV: static header, one comma-joined row per
/// record.
pub fn history_csv(history: &History) -> String {
    let mut lines = vec![CSV_HEADER.to_string()];
    for attempt in &history.attempts {
        lines.push(format!(
            "{},{:?},{},{},{}",
            attempt.question_id, attempt.task, attempt.points, attempt.max, attempt.taken_at
        ));
    }
    lines.join("\n") + "\n"
}

/// Write the attempt history CSV
pub fn export_csv_to_file(store: &dyn KeyValueStore, path: &Path) -> Result<usize> {
    let history: History = load_record(store, keys::HISTORY)
        .context("Failed to load attempt history")?
        .unwrap_or_default();

    std::fs::write(path, history_csv(&history))
        .with_context(|| format!("Failed to write CSV to {:?}", path))?;

    Ok(history.len())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;
    use crate::bank::model::TaskType;
    use crate::store::progress::AttemptRecord;
    use crate::store::{MemoryStore, save_record};

    fn seeded_store() -> MemoryStore {
        let mut store = MemoryStore::new();
        let mut history = History::default();
        history.record(AttemptRecord::new("q1", TaskType::Dictation, 4, 5));
        save_record(&mut store, keys::HISTORY, &history).unwrap();
        store.set("pteprep.note", "plain text value".into()).unwrap();
        store
    }

    #[test]
    fn backup_restore_round_trip_is_exact() {
        let source = seeded_store();
        let dumped = dump(&source);

        let mut target = MemoryStore::new();
        target.set("stale.key", "{}".into()).unwrap();
        apply(&mut target, &dumped).unwrap();

        assert_eq!(source.keys(), target.keys());
        for key in source.keys() {
            let original: Value = serde_json::from_str(&source.get(&key).unwrap())
                .unwrap_or(Value::String(source.get(&key).unwrap()));
            let restored: Value = serde_json::from_str(&target.get(&key).unwrap())
                .unwrap_or(Value::String(target.get(&key).unwrap()));
            assert_eq!(original, restored, "key {key}");
        }
    }

    #[test]
    fn restore_replaces_existing_keys() {
        let source = seeded_store();
        let dumped = dump(&source);

        let mut target = MemoryStore::new();
        target.set("old.key", "1".into()).unwrap();
        apply(&mut target, &dumped).unwrap();

        assert!(target.get("old.key").is_none());
    }

    #[test]
    fn malformed_backup_applies_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("backup.json");
        std::fs::write(&path, "{ not json").unwrap();

        let mut store = seeded_store();
        let before = store.keys();
        assert!(import_from_file(&mut store, &path).is_err());
        assert_eq!(store.keys(), before);
    }

    #[test]
    fn non_object_backup_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("backup.json");
        std::fs::write(&path, "[1, 2, 3]").unwrap();

        let mut store = MemoryStore::new();
        assert!(import_from_file(&mut store, &path).is_err());
    }

    #[test]
    fn file_round_trip_matches_memory_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("backup.json");

        let source = seeded_store();
        export_to_file(&source, &path).unwrap();

        let mut target = MemoryStore::new();
        let count = import_from_file(&mut target, &path).unwrap();
        assert_eq!(count, source.keys().len());

        let history: History = load_record(&target, keys::HISTORY).unwrap().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(target.get("pteprep.note").as_deref(), Some("plain text value"));
    }

    #[test]
    fn csv_has_static_header_and_comma_joined_rows() {
        let mut history = History::default();
        let mut attempt = AttemptRecord::new("ra-1", TaskType::Reorder, 2, 3);
        attempt.taken_at = 1700000000;
        history.record(attempt);

        let csv = history_csv(&history);
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("question_id,task,points,max,taken_at"));
        assert_eq!(lines.next(), Some("ra-1,Reorder,2,3,1700000000"));
    }
}
