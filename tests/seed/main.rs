//! Category seeding against real directories.

use std::fs;
use std::path::Path;

use trail_search::seed::{category_image_path, CATEGORIES, CATEGORIES_COLLECTION};
use trail_search::{seed_categories, FsRecordStore, InMemoryRecordStore, RecordStore, SeedError};

fn write_images(dir: &Path) {
    for name in CATEGORIES {
        fs::write(category_image_path(dir, name), name.as_bytes()).unwrap();
    }
}

#[test]
fn seeds_six_categories_with_images() {
    let images = tempfile::tempdir().unwrap();
    write_images(images.path());
    let data = tempfile::tempdir().unwrap();
    let store = FsRecordStore::new(data.path());

    let created = seed_categories(&store, images.path()).unwrap();
    assert_eq!(created.len(), 6);

    let names: Vec<String> = created.iter().map(|r| r.get_string("name")).collect();
    assert_eq!(names, CATEGORIES.to_vec());

    for record in &created {
        let file_name = record.get_string("img");
        assert_eq!(file_name, format!("{}.jpg", record.get_string("name").to_lowercase()));

        let path = store.file_path(CATEGORIES_COLLECTION, record.id(), &file_name);
        let bytes = fs::read(path).unwrap();
        assert_eq!(bytes, record.get_string("name").into_bytes());
    }

    assert_eq!(store.list_records(CATEGORIES_COLLECTION).unwrap().len(), 6);
}

#[test]
fn running_twice_duplicates() {
    let images = tempfile::tempdir().unwrap();
    write_images(images.path());
    let store = InMemoryRecordStore::new();

    seed_categories(&store, images.path()).unwrap();
    seed_categories(&store, images.path()).unwrap();

    assert_eq!(store.count(CATEGORIES_COLLECTION).unwrap(), 12);
}

#[test]
fn missing_image_stops_seeding() {
    let images = tempfile::tempdir().unwrap();
    write_images(images.path());
    fs::remove_file(category_image_path(images.path(), "Skiing")).unwrap();
    let store = InMemoryRecordStore::new();

    let err = seed_categories(&store, images.path()).unwrap_err();
    match err {
        SeedError::Image { path, .. } => assert!(path.ends_with("skiing.jpg")),
        other => panic!("unexpected error {other:?}"),
    }
    // Hiking, Walking and Climbing come first and are already stored.
    assert_eq!(store.count(CATEGORIES_COLLECTION).unwrap(), 3);
}
