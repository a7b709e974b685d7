//! RecordStore - the framework's record persistence API.

use super::{Record, RecordError};

/// Abstract CRUD storage for records.
///
/// Saving mutates the record: a new record gets its id and `created`
/// timestamp, every save refreshes `updated`, and pending files are written
/// and cleared.
pub trait RecordStore: Send + Sync {
    /// Insert or replace a record.
    fn save_record(&self, record: &mut Record) -> Result<(), RecordError>;

    /// Get a record by collection and id. Returns None if not found.
    fn find_record(&self, collection: &str, id: &str) -> Result<Option<Record>, RecordError>;

    /// Delete a record and its files. Returns true if it existed.
    fn delete_record(&self, collection: &str, id: &str) -> Result<bool, RecordError>;

    /// All records of a collection, ordered by id.
    fn list_records(&self, collection: &str) -> Result<Vec<Record>, RecordError>;

    /// Like `find_record`, but a missing record is an error.
    fn get_record(&self, collection: &str, id: &str) -> Result<Record, RecordError> {
        self.find_record(collection, id)?
            .ok_or_else(|| RecordError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })
    }
}
