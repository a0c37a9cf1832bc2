//! Conversation persistence.
//!
//! Each correspondent's log is stored as one JSON snapshot under
//! `chat_<correspondent id>`. The same key is used for load and save.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::HistoryError;
use crate::message::{HistoryLog, Message};
use crate::store::KvStore;

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    messages: Vec<Message>,
}

pub fn history_key(correspondent_id: &str) -> String {
    format!("chat_{}", correspondent_id)
}

/// Seed conversation for a correspondent with no saved history.
pub fn default_history(now: DateTime<Utc>) -> HistoryLog {
    HistoryLog::from_messages(vec![
        Message::sent("Hey! How are you?", now - Duration::seconds(3600)),
        Message::received(
            "I'm good, thanks! How about you?",
            now - Duration::seconds(3500),
        ),
    ])
}

/// Result of `HistoryStore::load`: always a usable log, plus the failure that
/// forced a fallback to the seed history, if any.
#[derive(Debug)]
pub struct LoadedHistory {
    pub log: HistoryLog,
    pub failure: Option<HistoryError>,
}

#[derive(Clone)]
pub struct HistoryStore {
    store: Arc<dyn KvStore>,
}

impl HistoryStore {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Read the saved snapshot. `Ok(None)` means nothing has been saved yet.
    pub fn try_load(&self, correspondent_id: &str) -> Result<Option<HistoryLog>, HistoryError> {
        let Some(raw) = self.store.get(&history_key(correspondent_id))? else {
            return Ok(None);
        };

        let snapshot: Snapshot = serde_json::from_str(&raw)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(HistoryError::UnsupportedVersion(snapshot.version));
        }
        Ok(Some(HistoryLog::from_messages(snapshot.messages)))
    }

    /// Load the log, falling back to the seed history when nothing is stored
    /// or the snapshot cannot be read.
    pub fn load(&self, correspondent_id: &str, now: DateTime<Utc>) -> LoadedHistory {
        match self.try_load(correspondent_id) {
            Ok(Some(log)) => LoadedHistory { log, failure: None },
            Ok(None) => LoadedHistory {
                log: default_history(now),
                failure: None,
            },
            Err(e) => {
                tracing::warn!(correspondent = correspondent_id, error = %e, "Error loading chat history");
                LoadedHistory {
                    log: default_history(now),
                    failure: Some(e),
                }
            }
        }
    }

    /// Overwrite the stored snapshot with the full log.
    pub fn save(&self, correspondent_id: &str, log: &HistoryLog) -> Result<(), HistoryError> {
        let snapshot = Snapshot {
            version: SNAPSHOT_VERSION,
            messages: log.messages().to_vec(),
        };
        let raw = serde_json::to_string(&snapshot)?;
        self.store.set(&history_key(correspondent_id), &raw)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Direction;
    use crate::store::MemoryKvStore;
    use chrono::TimeZone;

    fn store() -> (Arc<MemoryKvStore>, HistoryStore) {
        let kv = Arc::new(MemoryKvStore::new());
        let history = HistoryStore::new(kv.clone());
        (kv, history)
    }

    #[test]
    fn test_fresh_key_seeds_two_messages() {
        let (_, history) = store();
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
        let loaded = history.load("42", now);

        assert!(loaded.failure.is_none());
        let messages = loaded.log.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].direction, Direction::Sent);
        assert_eq!(messages[1].direction, Direction::Received);
        assert!(messages[0].sent_at < messages[1].sent_at);
        assert_eq!(messages[0].sent_at, now - Duration::hours(1));
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let (_, history) = store();
        let base = Utc.with_ymd_and_hms(2026, 10, 17, 9, 30, 0).unwrap();
        let mut log = HistoryLog::new();
        log.push(Message::sent("first", base));
        log.push(Message::received("second :)", base + Duration::minutes(2)));
        log.push(Message::sent("http://x.test", base + Duration::days(2)));

        history.save("7", &log).unwrap();
        let loaded = history.try_load("7").unwrap().unwrap();
        assert_eq!(loaded, log);
    }

    #[test]
    fn test_save_uses_id_key() {
        let (kv, history) = store();
        history.save("7", &default_history(Utc::now())).unwrap();
        assert!(kv.get("chat_7").unwrap().is_some());
    }

    #[test]
    fn test_malformed_snapshot_falls_back() {
        let (kv, history) = store();
        kv.set("chat_1", "{not json").unwrap();

        let loaded = history.load("1", Utc::now());
        assert!(matches!(loaded.failure, Some(HistoryError::Parse(_))));
        assert_eq!(loaded.log.len(), 2);
    }

    #[test]
    fn test_unknown_version_rejected() {
        let (kv, history) = store();
        kv.set("chat_1", r#"{"version":99,"messages":[]}"#).unwrap();

        let loaded = history.load("1", Utc::now());
        assert!(matches!(
            loaded.failure,
            Some(HistoryError::UnsupportedVersion(99))
        ));
        assert_eq!(loaded.log.len(), 2);
    }

    #[test]
    fn test_legacy_bare_array_is_a_parse_failure() {
        let (kv, history) = store();
        kv.set("chat_1", r#"[{"type":"sent","text":"hi","time":"10:30"}]"#)
            .unwrap();
        assert!(matches!(
            history.try_load("1"),
            Err(HistoryError::Parse(_))
        ));
    }
}
