//! Trail documents and the calls that keep the `trails` index in step with
//! trail records.

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::record::{format_datetime, Record};
use crate::search::{SearchError, SearchService, TaskInfo};

pub const TRAILS_INDEX: &str = "trails";
pub const TRAILS_PRIMARY_KEY: &str = "id";

/// Geographic point in the shape the search engine expects under `_geo`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// Denormalized trail as stored in the search index.
///
/// Built from scratch on every write; absent record fields become zero
/// values, so a document never inherits anything from a previous version.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrailDocument {
    pub id: String,
    pub author: String,
    pub name: String,
    pub description: String,
    pub location: String,
    pub distance: f64,
    pub elevation_gain: f64,
    pub duration: f64,
    pub category: Value,
    pub completed: bool,
    pub created: String,
    pub public: bool,
    #[serde(rename = "_geo")]
    pub geo: GeoPoint,
}

impl TrailDocument {
    pub fn from_record(record: &Record) -> Self {
        Self {
            id: record.id().to_string(),
            author: record.get_string("author"),
            name: record.get_string("name"),
            description: record.get_string("description"),
            location: record.get_string("location"),
            distance: record.get_float("distance"),
            elevation_gain: record.get_float("elevation_gain"),
            duration: record.get_float("duration"),
            category: record.get("category").cloned().unwrap_or(Value::Null),
            completed: !record.get_string_slice("summit_logs").is_empty(),
            created: record
                .get_datetime("created")
                .map(|at| format_datetime(&at))
                .unwrap_or_default(),
            public: record.get_bool("public"),
            geo: GeoPoint {
                lat: record.get_float("lat"),
                lng: record.get_float("lon"),
            },
        }
    }

    pub fn to_value(&self) -> Result<Value, SearchError> {
        serde_json::to_value(self).map_err(|e| SearchError::Decode(e.to_string()))
    }
}

/// Upsert a trail's document. Replaces any previous version wholesale.
pub fn index_trail(search: &dyn SearchService, record: &Record) -> Result<TaskInfo, SearchError> {
    let document = TrailDocument::from_record(record).to_value()?;
    debug!(id = record.id(), "indexing trail");
    search.add_documents(TRAILS_INDEX, &[document], Some(TRAILS_PRIMARY_KEY))
}

/// Remove a trail's document by id.
pub fn delete_trail(search: &dyn SearchService, id: &str) -> Result<TaskInfo, SearchError> {
    debug!(id, "removing trail from index");
    search.delete_document(TRAILS_INDEX, id)
}
