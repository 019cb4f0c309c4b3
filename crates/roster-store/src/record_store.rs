//! One JSON document per collection in a data directory.
//!
//! Each collection lives in `<data_dir>/<collection>.json` as a
//! pretty-printed JSON array. Writes go to a temporary file in the same
//! directory and are renamed over the target, so readers only ever see
//! the previous or the next complete document.
//!
//! The store also owns one mutex per collection. Reads do not take it;
//! the repository holds it across load-mutate-save so two writers in
//! this process cannot lose each other's update.

use std::fs;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use roster_types::CollectionKind;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::StoreError;

/// Write guard for one collection.
pub type CollectionGuard<'a> = MutexGuard<'a, ()>;

#[derive(Debug, Default)]
struct CollectionLocks {
    employees: Mutex<()>,
    ambulances: Mutex<()>,
    shifts: Mutex<()>,
    teams: Mutex<()>,
    tasks: Mutex<()>,
}

impl CollectionLocks {
    const fn get(&self, collection: CollectionKind) -> &Mutex<()> {
        match collection {
            CollectionKind::Employees => &self.employees,
            CollectionKind::Ambulances => &self.ambulances,
            CollectionKind::Shifts => &self.shifts,
            CollectionKind::Teams => &self.teams,
            CollectionKind::Tasks => &self.tasks,
        }
    }
}

/// Durable mapping from collection name to an ordered list of records.
#[derive(Debug)]
pub struct RecordStore {
    data_dir: PathBuf,
    locks: CollectionLocks,
}

impl RecordStore {
    /// Open the store rooted at `data_dir`.
    ///
    /// Creates the directory and an empty document for every collection
    /// that does not exist yet. Existing documents are left untouched, so
    /// opening the same directory twice is harmless.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Storage`] if the directory or a missing
    /// collection file cannot be created.
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir)
            .map_err(|e| StoreError::storage(&data_dir, format!("create directory: {e}")))?;

        let store = Self {
            data_dir,
            locks: CollectionLocks::default(),
        };

        for collection in CollectionKind::ALL {
            let path = store.path(collection);
            if !path.exists() {
                store.save::<serde_json::Value>(collection, &[])?;
                debug!(%collection, path = %path.display(), "Initialized empty collection");
            }
        }

        info!(data_dir = %store.data_dir.display(), "Record store opened");
        Ok(store)
    }

    /// The directory holding the collection documents.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of the document backing `collection`.
    pub fn path(&self, collection: CollectionKind) -> PathBuf {
        self.data_dir.join(format!("{}.json", collection.as_str()))
    }

    /// Take the write lock for `collection`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Storage`] if a previous writer panicked while
    /// holding the lock.
    pub fn lock(&self, collection: CollectionKind) -> Result<CollectionGuard<'_>, StoreError> {
        self.locks
            .get(collection)
            .lock()
            .map_err(|e| StoreError::storage(&self.path(collection), format!("lock poisoned: {e}")))
    }

    /// Read every record of `collection`, in stored order.
    ///
    /// A missing document is created empty before returning.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Storage`] if the file cannot be read or does
    /// not hold a JSON array of the expected record shape. Corrupt files
    /// are reported, never rewritten.
    pub fn load<T: DeserializeOwned>(&self, collection: CollectionKind) -> Result<Vec<T>, StoreError> {
        let path = self.path(collection);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                self.save::<serde_json::Value>(collection, &[])?;
                debug!(%collection, "Recreated missing collection");
                return Ok(Vec::new());
            }
            Err(e) => return Err(StoreError::storage(&path, format!("read: {e}"))),
        };

        serde_json::from_str(&contents)
            .map_err(|e| StoreError::storage(&path, format!("corrupt document: {e}")))
    }

    /// Replace every record of `collection` with `records`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Storage`] if serialization, the temporary
    /// write, or the final rename fails. On failure the previous document
    /// is left in place.
    pub fn save<T: Serialize>(&self, collection: CollectionKind, records: &[T]) -> Result<(), StoreError> {
        let path = self.path(collection);
        let io_err = |stage: &str, e: &dyn core::fmt::Display| {
            StoreError::storage(&path, format!("{stage}: {e}"))
        };

        let tmp = NamedTempFile::new_in(&self.data_dir).map_err(|e| io_err("create temp file", &e))?;
        {
            let mut writer = BufWriter::new(tmp.as_file());
            serde_json::to_writer_pretty(&mut writer, records)
                .map_err(|e| io_err("serialize", &e))?;
            writer.write_all(b"\n").map_err(|e| io_err("write", &e))?;
            writer.flush().map_err(|e| io_err("flush", &e))?;
        }
        tmp.as_file().sync_all().map_err(|e| io_err("sync", &e))?;
        tmp.persist(&path).map_err(|e| io_err("rename", &e.error))?;

        debug!(%collection, records = records.len(), "Collection saved");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn open_temp() -> (tempfile::TempDir, RecordStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::open(dir.path().join("data")).unwrap();
        (dir, store)
    }

    #[test]
    fn open_creates_every_collection_file() {
        let (_dir, store) = open_temp();
        for collection in CollectionKind::ALL {
            let path = store.path(collection);
            assert!(path.exists(), "{} missing", path.display());
            let records: Vec<Value> = store.load(collection).unwrap();
            assert!(records.is_empty());
        }
    }

    #[test]
    fn reopening_keeps_existing_content() {
        let (dir, store) = open_temp();
        store
            .save(CollectionKind::Employees, &[json!({"id": 1, "name": "Ahmed"})])
            .unwrap();
        drop(store);

        let reopened = RecordStore::open(dir.path().join("data")).unwrap();
        let records: Vec<Value> = reopened.load(CollectionKind::Employees).unwrap();
        assert_eq!(records, vec![json!({"id": 1, "name": "Ahmed"})]);
    }

    #[test]
    fn save_then_load_preserves_order() {
        let (_dir, store) = open_temp();
        let records = vec![json!({"id": 2, "name": "ب"}), json!({"id": 1, "name": "أ"})];
        store.save(CollectionKind::Employees, &records).unwrap();

        let loaded: Vec<Value> = store.load(CollectionKind::Employees).unwrap();
        assert_eq!(loaded, records);
    }

    #[test]
    fn arabic_text_is_stored_unescaped() {
        let (_dir, store) = open_temp();
        store
            .save(CollectionKind::Employees, &[json!({"name": "أحمد"})])
            .unwrap();
        let raw = fs::read_to_string(store.path(CollectionKind::Employees)).unwrap();
        assert!(raw.contains("أحمد"));
    }

    #[test]
    fn missing_file_is_recreated_on_load() {
        let (_dir, store) = open_temp();
        let path = store.path(CollectionKind::Tasks);
        fs::remove_file(&path).unwrap();

        let records: Vec<Value> = store.load(CollectionKind::Tasks).unwrap();
        assert!(records.is_empty());
        assert!(path.exists());
    }

    #[test]
    fn corrupt_file_is_reported_not_repaired() {
        let (_dir, store) = open_temp();
        let path = store.path(CollectionKind::Shifts);
        fs::write(&path, "[{not json").unwrap();

        let result = store.load::<Value>(CollectionKind::Shifts);
        assert!(matches!(result, Err(StoreError::Storage { .. })));
        assert_eq!(fs::read_to_string(&path).unwrap(), "[{not json");
    }

    #[test]
    fn save_leaves_no_temp_files_behind() {
        let (_dir, store) = open_temp();
        store.save(CollectionKind::Teams, &[json!({"id": 1})]).unwrap();
        let entries = fs::read_dir(store.data_dir()).unwrap().count();
        assert_eq!(entries, CollectionKind::ALL.len());
    }
}
