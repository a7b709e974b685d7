//! Seed data for the categories collection.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::record::{Record, RecordError, RecordFile, RecordStore};

pub const CATEGORIES_COLLECTION: &str = "categories";
pub const CATEGORIES: [&str; 6] = ["Hiking", "Walking", "Climbing", "Skiing", "Canoeing", "Biking"];
pub const DEFAULT_IMAGE_DIR: &str = "migrations/initial_data";

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("cannot read category image {}: {source}", .path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Record(#[from] RecordError),
}

/// Image for a category: `<dir>/<lowercase name>.jpg`.
pub fn category_image_path(image_dir: &Path, name: &str) -> PathBuf {
    image_dir.join(format!("{}.jpg", name.to_lowercase()))
}

/// Create one `categories` record per fixed category, each with its image.
///
/// Running it twice creates the categories twice.
pub fn seed_categories<S: RecordStore + ?Sized>(
    store: &S,
    image_dir: &Path,
) -> Result<Vec<Record>, SeedError> {
    let mut created = Vec::with_capacity(CATEGORIES.len());

    for name in CATEGORIES {
        let path = category_image_path(image_dir, name);
        let image = RecordFile::from_path(&path).map_err(|source| SeedError::Image {
            path: path.clone(),
            source,
        })?;

        let mut record = Record::new(CATEGORIES_COLLECTION);
        record.set("name", name);
        record.add_file("img", image);
        store.save_record(&mut record)?;

        info!(id = record.id(), name, "seeded category");
        created.push(record);
    }

    Ok(created)
}
