//! InMemoryRecordStore - HashMap-backed record store for testing and development.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::Utc;

use super::{storage_key, Record, RecordError, RecordFile, RecordStore};

#[derive(Default)]
struct Storage {
    records: HashMap<String, Vec<u8>>,
    files: HashMap<String, Vec<(String, RecordFile)>>,
}

/// In-memory record store backed by a HashMap.
///
/// Storage key is `"collection:id"`. Clone-friendly via Arc.
#[derive(Clone, Default)]
pub struct InMemoryRecordStore {
    storage: Arc<RwLock<Storage>>,
}

impl InMemoryRecordStore {
    /// Create a new empty record store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Files stored for a record, as `(field, file)` pairs.
    pub fn files(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Vec<(String, RecordFile)>, RecordError> {
        let storage = self
            .storage
            .read()
            .map_err(|_| RecordError::LockPoisoned("files"))?;
        Ok(storage
            .files
            .get(&storage_key(collection, id))
            .cloned()
            .unwrap_or_default())
    }

    /// Number of records in a collection.
    pub fn count(&self, collection: &str) -> Result<usize, RecordError> {
        let prefix = format!("{}:", collection);
        let storage = self
            .storage
            .read()
            .map_err(|_| RecordError::LockPoisoned("count"))?;
        Ok(storage.records.keys().filter(|k| k.starts_with(&prefix)).count())
    }
}

impl RecordStore for InMemoryRecordStore {
    fn save_record(&self, record: &mut Record) -> Result<(), RecordError> {
        record.prepare_for_save(Utc::now())?;
        let key = storage_key(record.collection(), record.id());
        let bytes = serde_json::to_vec(record)?;

        let mut storage = self
            .storage
            .write()
            .map_err(|_| RecordError::LockPoisoned("save"))?;

        storage.records.insert(key.clone(), bytes);

        let pending = record.take_pending_files();
        if !pending.is_empty() {
            storage.files.entry(key).or_default().extend(pending);
        }

        Ok(())
    }

    fn find_record(&self, collection: &str, id: &str) -> Result<Option<Record>, RecordError> {
        let storage = self
            .storage
            .read()
            .map_err(|_| RecordError::LockPoisoned("find"))?;

        match storage.records.get(&storage_key(collection, id)) {
            Some(bytes) => Ok(Some(serde_json::from_slice(bytes)?)),
            None => Ok(None),
        }
    }

    fn delete_record(&self, collection: &str, id: &str) -> Result<bool, RecordError> {
        let key = storage_key(collection, id);
        let mut storage = self
            .storage
            .write()
            .map_err(|_| RecordError::LockPoisoned("delete"))?;

        storage.files.remove(&key);
        Ok(storage.records.remove(&key).is_some())
    }

    fn list_records(&self, collection: &str) -> Result<Vec<Record>, RecordError> {
        let prefix = format!("{}:", collection);
        let storage = self
            .storage
            .read()
            .map_err(|_| RecordError::LockPoisoned("list"))?;

        let mut records = storage
            .records
            .iter()
            .filter(|(key, _)| key.starts_with(&prefix))
            .map(|(_, bytes)| serde_json::from_slice::<Record>(bytes))
            .collect::<Result<Vec<_>, _>>()?;
        records.sort_by(|a, b| a.id().cmp(b.id()));
        Ok(records)
    }
}
