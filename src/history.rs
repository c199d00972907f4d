//! Committed color selections and their persistence.
use crate::color::HexColor;
use crate::error::Result;
use crate::selection::Slot;
use crate::storage::KeyValueStore;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Storage key the history is saved under.
pub const HISTORY_KEY: &str = "colorHistory";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorSelection {
    pub color: HexColor,
    #[serde(rename = "type")]
    pub slot: Slot,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl ColorSelection {
    pub fn committed_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp).single()
    }
}

/// Committed selections, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History(Vec<ColorSelection>);

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ColorSelection> {
        self.0.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColorSelection> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[ColorSelection] {
        &self.0
    }

    fn prepend(&mut self, selection: ColorSelection) {
        self.0.insert(0, selection);
    }

    fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// In-memory history mirrored to a [`KeyValueStore`] under [`HISTORY_KEY`].
///
/// Every method keeps the in-memory history usable on failure: the
/// returned error only says that storage is out of sync with it.
#[derive(Debug)]
pub struct HistoryStore<S> {
    storage: S,
    history: History,
}

impl<S: KeyValueStore> HistoryStore<S> {
    /// Creates an empty store. Call [`HistoryStore::load`] to restore saved entries.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            history: History::new(),
        }
    }

    /// Replaces the in-memory history with the stored one.
    ///
    /// On error the history is empty. A corrupt value is left in storage
    /// until the next commit overwrites it.
    pub fn load(&mut self) -> Result<&History> {
        self.history = History::new();
        let loaded = match self.storage.get(HISTORY_KEY)? {
            None => History::new(),
            Some(json) => History::from_json(&json)?,
        };
        log::debug!("loaded {} color selections", loaded.len());
        self.history = loaded;
        Ok(&self.history)
    }

    /// Prepends a selection stamped with the current time and saves the whole history.
    pub fn commit(&mut self, color: HexColor, slot: Slot) -> Result<()> {
        self.commit_at(color, slot, Utc::now().timestamp_millis())
    }

    pub fn commit_at(&mut self, color: HexColor, slot: Slot, timestamp: i64) -> Result<()> {
        self.history.prepend(ColorSelection {
            color,
            slot,
            timestamp,
        });
        log::debug!("committed {color} for {}", slot.name());
        let json = self.history.to_json()?;
        self.storage.set(HISTORY_KEY, &json)
    }

    pub fn clear(&mut self) -> Result<()> {
        self.history = History::new();
        log::debug!("cleared color history");
        self.storage.remove(HISTORY_KEY)
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::storage::{FileStore, MemoryStore};
    use tempfile::tempdir;

    fn color(s: &str) -> HexColor {
        s.parse().unwrap()
    }

    #[test]
    fn first_commit() {
        let mut store = HistoryStore::new(MemoryStore::new());
        store.commit_at(color("#ff0000"), Slot::Emerald, 1).unwrap();
        assert_eq!(
            store.history().as_slice(),
            &[ColorSelection {
                color: color("#ff0000"),
                slot: Slot::Emerald,
                timestamp: 1,
            }]
        );
    }

    #[test]
    fn newest_first() {
        let mut store = HistoryStore::new(MemoryStore::new());
        store.commit_at(color("#00ff00"), Slot::Emerald, 10).unwrap();
        store.commit_at(color("#0000ff"), Slot::Ruby, 20).unwrap();

        let entries = store.history().as_slice();
        assert_eq!(entries.len(), 2);
        assert_eq!((entries[0].slot, entries[0].timestamp), (Slot::Ruby, 20));
        assert_eq!(entries[0].color, color("#0000ff"));
        assert_eq!((entries[1].slot, entries[1].timestamp), (Slot::Emerald, 10));
    }

    #[test]
    fn n_commits_reverse_order_without_dedup() {
        let mut store = HistoryStore::new(MemoryStore::new());
        for i in 0..25 {
            store.commit_at(color("#123456"), Slot::ALL[i % 2], i as i64).unwrap();
        }
        assert_eq!(store.len(), 25);
        let timestamps: Vec<_> = store.history().iter().map(|s| s.timestamp).collect();
        let expected: Vec<_> = (0..25).rev().collect();
        assert_eq!(timestamps, expected);
    }

    #[test]
    fn commit_uses_current_time() {
        let before = Utc::now().timestamp_millis();
        let mut store = HistoryStore::new(MemoryStore::new());
        store.commit(color("#abcdef"), Slot::Ruby).unwrap();
        let latest = store.history().get(0).unwrap();
        assert!(latest.timestamp >= before);
        assert!(latest.committed_at().is_some());
    }

    #[test]
    fn persisted_json_layout() {
        let mut store = HistoryStore::new(MemoryStore::new());
        store.commit_at(color("#10B981"), Slot::Emerald, 1700000000000).unwrap();
        let json = store.storage().get(HISTORY_KEY).unwrap().unwrap();
        assert_eq!(
            json,
            r##"[{"color":"#10b981","type":"emerald","timestamp":1700000000000}]"##
        );
    }

    #[test]
    fn load_restores_saved_history() {
        let mut store = HistoryStore::new(MemoryStore::new());
        store.commit_at(color("#00ff00"), Slot::Emerald, 1).unwrap();
        store.commit_at(color("#0000ff"), Slot::Ruby, 2).unwrap();
        let saved = store.history().clone();

        let mut reopened = HistoryStore::new(store.storage().clone());
        assert_eq!(reopened.load().unwrap(), &saved);
        assert_eq!(reopened.load().unwrap(), &saved);
    }

    #[test]
    fn load_without_key_is_empty() {
        let mut store = HistoryStore::new(MemoryStore::new());
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn corrupt_history_is_discarded() {
        let mut store = HistoryStore::new(MemoryStore::new().with_entry(HISTORY_KEY, "{not json"));
        let err = store.load().unwrap_err();
        assert!(matches!(err, Error::CorruptPersistedState(_)), "{err:?}");
        assert!(store.is_empty());

        store.commit_at(color("#000000"), Slot::Ruby, 1).unwrap();
        let json = store.storage().get(HISTORY_KEY).unwrap().unwrap();
        assert!(History::from_json(&json).is_ok());
    }

    #[test]
    fn invalid_stored_color_is_corrupt() {
        let json = r#"[{"color":"red","type":"ruby","timestamp":1}]"#;
        let mut store = HistoryStore::new(MemoryStore::new().with_entry(HISTORY_KEY, json));
        assert!(matches!(store.load(), Err(Error::CorruptPersistedState(_))));
    }

    #[test]
    fn commit_survives_storage_failure() {
        let mut store = HistoryStore::new(MemoryStore::read_only());
        let err = store.commit_at(color("#ff0000"), Slot::Emerald, 1).unwrap_err();
        assert!(matches!(err, Error::PersistenceUnavailable(_)), "{err:?}");
        assert_eq!(store.len(), 1);
        assert!(!store.storage().contains_key(HISTORY_KEY));
    }

    #[test]
    fn clear_removes_key() {
        let mut store = HistoryStore::new(MemoryStore::new());
        for i in 0..3 {
            store.commit_at(color("#ff0000"), Slot::Emerald, i).unwrap();
        }
        store.clear().unwrap();
        assert!(store.is_empty());
        assert!(!store.storage().contains_key(HISTORY_KEY));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn clear_empties_memory_even_if_storage_fails() {
        let json = r##"[{"color":"#ff0000","type":"ruby","timestamp":1}]"##;
        let mut store = HistoryStore::new(MemoryStore::read_only().with_entry(HISTORY_KEY, json));
        assert_eq!(store.load().unwrap().len(), 1);
        assert!(matches!(store.clear(), Err(Error::PersistenceUnavailable(_))));
        assert!(store.is_empty());
    }

    #[test]
    fn unreadable_history_starts_empty() {
        let dir = tempdir().unwrap();
        let files = FileStore::new(dir.path());
        std::fs::create_dir_all(files.path_for(HISTORY_KEY)).unwrap();

        let mut store = HistoryStore::new(files);
        let err = store.load().unwrap_err();
        assert!(matches!(err, Error::PersistenceUnavailable(_)), "{err:?}");
        assert!(store.is_empty());

        let err = store.commit_at(color("#ff0000"), Slot::Emerald, 1).unwrap_err();
        assert!(matches!(err, Error::PersistenceUnavailable(_)), "{err:?}");
        assert_eq!(store.len(), 1);
        assert_eq!(store.history().get(0).unwrap().color, color("#ff0000"));
    }

    #[test]
    fn file_backed_history_survives_reopen() {
        let dir = tempdir().unwrap();
        let mut store = HistoryStore::new(FileStore::new(dir.path()));
        store.commit_at(color("#111111"), Slot::Emerald, 1).unwrap();
        store.commit_at(color("#222222"), Slot::Ruby, 2).unwrap();
        drop(store);

        let mut reopened = HistoryStore::new(FileStore::new(dir.path()));
        let history = reopened.load().unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history.get(0).unwrap().color, color("#222222"));

        reopened.clear().unwrap();
        assert!(!FileStore::new(dir.path()).path_for(HISTORY_KEY).exists());
    }
}
