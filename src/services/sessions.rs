//! Session persistence
//!
//! Completed focus sessions are recorded so the reflection flow can be
//! deep-linked to them. The returned identifier is opaque to the timer core.

use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
    sync::Mutex,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::state::{CompletionEvent, TimerMode};

/// One recorded session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: String,
    /// Local completion time, `%Y-%m-%d %H:%M:%S`
    pub session_date: String,
    /// Seconds
    pub duration: i64,
    pub mode: TimerMode,
    pub tasks: Vec<String>,
    pub completed_tasks: Vec<String>,
}

impl SessionRecord {
    pub fn from_event(session_id: String, event: &CompletionEvent) -> Self {
        Self {
            session_id,
            session_date: event.completed_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            duration: event.session_duration_seconds,
            mode: event.mode,
            tasks: event.tasks_outstanding.clone(),
            completed_tasks: event.tasks_completed.clone(),
        }
    }
}

pub trait SessionRepository: Send + Sync {
    /// Durably record a completed session and return its identifier
    fn record(&self, event: &CompletionEvent) -> Result<String, String>;
    /// All recorded sessions, newest first
    fn list(&self) -> Result<Vec<SessionRecord>, String>;
}

/// In-process session log
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    records: Mutex<Vec<SessionRecord>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionRepository for MemorySessionStore {
    fn record(&self, event: &CompletionEvent) -> Result<String, String> {
        let mut records = self
            .records
            .lock()
            .map_err(|e| format!("Failed to lock session log: {}", e))?;
        let session_id = (records.len() + 1).to_string();
        records.push(SessionRecord::from_event(session_id.clone(), event));
        Ok(session_id)
    }

    fn list(&self) -> Result<Vec<SessionRecord>, String> {
        let records = self
            .records
            .lock()
            .map_err(|e| format!("Failed to lock session log: {}", e))?;
        Ok(records.iter().rev().cloned().collect())
    }
}

/// Append-only JSON-lines session log
#[derive(Debug)]
pub struct JsonlSessionStore {
    path: PathBuf,
    next_id: Mutex<u64>,
}

impl JsonlSessionStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, String> {
        let path = path.into();
        let existing = read_records(&path)?;
        let next_id = existing
            .iter()
            .filter_map(|r| r.session_id.parse::<u64>().ok())
            .max()
            .unwrap_or(0)
            + 1;

        info!("Opened session log at {} ({} sessions)", path.display(), existing.len());
        Ok(Self {
            path,
            next_id: Mutex::new(next_id),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionRepository for JsonlSessionStore {
    fn record(&self, event: &CompletionEvent) -> Result<String, String> {
        let mut next_id = self
            .next_id
            .lock()
            .map_err(|e| format!("Failed to lock session log: {}", e))?;
        let record = SessionRecord::from_event(next_id.to_string(), event);
        let line = serde_json::to_string(&record)
            .map_err(|e| format!("Failed to serialize session: {}", e))?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| format!("Failed to open {}: {}", self.path.display(), e))?;
        writeln!(file, "{}", line)
            .map_err(|e| format!("Failed to append to {}: {}", self.path.display(), e))?;

        *next_id += 1;
        Ok(record.session_id)
    }

    fn list(&self) -> Result<Vec<SessionRecord>, String> {
        let mut records = read_records(&self.path)?;
        records.reverse();
        Ok(records)
    }
}

fn read_records(path: &Path) -> Result<Vec<SessionRecord>, String> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;

    let mut records = Vec::new();
    for (index, line) in raw.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<SessionRecord>(line) {
            Ok(record) => records.push(record),
            Err(e) => warn!("Skipping malformed session line {} in {}: {}", index + 1, path.display(), e),
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};

    fn sample_event() -> CompletionEvent {
        CompletionEvent {
            mode: TimerMode::Focus,
            session_duration_seconds: 1500,
            tasks_outstanding: vec!["read chapter 3".to_string()],
            tasks_completed: vec!["flashcards".to_string()],
            completed_at: Local.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap(),
        }
    }

    #[test]
    fn test_record_from_event() {
        let record = SessionRecord::from_event("7".to_string(), &sample_event());
        assert_eq!(record.session_date, "2026-03-14 09:26:53");
        assert_eq!(record.duration, 1500);
        assert_eq!(record.tasks, vec!["read chapter 3"]);
        assert_eq!(record.completed_tasks, vec!["flashcards"]);
    }

    #[test]
    fn test_memory_store_ids_and_order() {
        let store = MemorySessionStore::new();
        assert_eq!(store.record(&sample_event()).unwrap(), "1");
        assert_eq!(store.record(&sample_event()).unwrap(), "2");

        let ids: Vec<String> = store.list().unwrap().into_iter().map(|r| r.session_id).collect();
        assert_eq!(ids, vec!["2", "1"]);
    }

    #[test]
    fn test_jsonl_store_continues_ids_after_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sessions.jsonl");

        let store = JsonlSessionStore::open(&path).unwrap();
        assert_eq!(store.record(&sample_event()).unwrap(), "1");
        assert_eq!(store.record(&sample_event()).unwrap(), "2");
        drop(store);

        let reopened = JsonlSessionStore::open(&path).unwrap();
        assert_eq!(reopened.record(&sample_event()).unwrap(), "3");
        let listed = reopened.list().unwrap();
        assert_eq!(listed.len(), 3);
        assert_eq!(listed[0].session_id, "3");
    }

    #[test]
    fn test_jsonl_store_skips_malformed_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sessions.jsonl");
        fs::write(&path, "{broken\n\n").unwrap();

        let store = JsonlSessionStore::open(&path).unwrap();
        assert!(store.list().unwrap().is_empty());
        assert_eq!(store.record(&sample_event()).unwrap(), "1");
    }
}
