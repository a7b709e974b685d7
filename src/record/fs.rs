//! FsRecordStore - records as JSON files on disk.
//!
//! Layout under the data directory:
//!
//! ```text
//! <data_dir>/records/<collection>/<id>.json
//! <data_dir>/storage/<collection>/<id>/<file name>
//! ```

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Utc;

use super::{validate_identifier, Record, RecordError, RecordStore};

pub struct FsRecordStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl FsRecordStore {
    /// Open (or lazily create) a store rooted at `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            root: data_dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the files attached to a record.
    pub fn storage_dir(&self, collection: &str, id: &str) -> PathBuf {
        self.root.join("storage").join(collection).join(id)
    }

    /// Path of a file attached to a record.
    pub fn file_path(&self, collection: &str, id: &str, name: &str) -> PathBuf {
        self.storage_dir(collection, id).join(name)
    }

    fn collection_dir(&self, collection: &str) -> PathBuf {
        self.root.join("records").join(collection)
    }

    fn record_path(&self, collection: &str, id: &str) -> PathBuf {
        self.collection_dir(collection).join(format!("{}.json", id))
    }
}

impl RecordStore for FsRecordStore {
    fn save_record(&self, record: &mut Record) -> Result<(), RecordError> {
        record.prepare_for_save(Utc::now())?;
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| RecordError::LockPoisoned("save"))?;

        fs::create_dir_all(self.collection_dir(record.collection()))?;

        // Pending files stay queued on the record until every write succeeded.
        let storage_dir = self.storage_dir(record.collection(), record.id());
        if !record.pending_files().is_empty() {
            fs::create_dir_all(&storage_dir)?;
        }
        for (_, file) in record.pending_files() {
            let name = Path::new(&file.name)
                .file_name()
                .ok_or_else(|| RecordError::InvalidId(file.name.clone()))?;
            fs::write(storage_dir.join(name), &file.bytes)?;
        }

        let bytes = serde_json::to_vec_pretty(record)?;
        fs::write(self.record_path(record.collection(), record.id()), bytes)?;
        record.take_pending_files();
        Ok(())
    }

    fn find_record(&self, collection: &str, id: &str) -> Result<Option<Record>, RecordError> {
        validate_identifier(collection)?;
        validate_identifier(id)?;
        match fs::read(self.record_path(collection, id)) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn delete_record(&self, collection: &str, id: &str) -> Result<bool, RecordError> {
        validate_identifier(collection)?;
        validate_identifier(id)?;
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| RecordError::LockPoisoned("delete"))?;

        match fs::remove_dir_all(self.storage_dir(collection, id)) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        match fs::remove_file(self.record_path(collection, id)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn list_records(&self, collection: &str) -> Result<Vec<Record>, RecordError> {
        validate_identifier(collection)?;
        let entries = match fs::read_dir(self.collection_dir(collection)) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut records = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let bytes = fs::read(&path)?;
            records.push(serde_json::from_slice::<Record>(&bytes)?);
        }
        records.sort_by(|a, b| a.id().cmp(b.id()));
        Ok(records)
    }
}
