//! Trail create / update / delete keep the `trails` index in step.

use serde_json::json;
use trail_search::search::{Operation, SearchCall};
use trail_search::{HookError, RecordStore, SearchError, TRAILS_INDEX};

use crate::support::{harness, trail};

#[test]
fn create_indexes_one_document() {
    let h = harness();
    let created = h.app.create_record(trail("t1")).unwrap();

    let calls = h.search.calls();
    assert_eq!(calls.len(), 1);
    match &calls[0] {
        SearchCall::AddDocuments {
            index,
            documents,
            primary_key,
        } => {
            assert_eq!(index, TRAILS_INDEX);
            assert_eq!(primary_key.as_deref(), Some("id"));
            assert_eq!(documents.len(), 1);
            assert_eq!(documents[0]["id"], "t1");
            assert_eq!(documents[0]["created"], created.get_string("created"));
        }
        other => panic!("unexpected call {other:?}"),
    }
}

#[test]
fn geo_point_carries_lat_and_lng() {
    let h = harness();
    h.app.create_record(trail("t1")).unwrap();

    let doc = h.search.document(TRAILS_INDEX, "t1").unwrap();
    assert_eq!(doc["_geo"], json!({ "lat": 46.55, "lng": 7.98 }));
}

#[test]
fn completed_tracks_summit_logs() {
    let h = harness();
    for (id, logs, completed) in [
        ("t0", json!([]), false),
        ("t1", json!(["log1"]), true),
        ("t2", json!(["log1", "log2", "log3"]), true),
    ] {
        let mut record = trail(id);
        record.set("summit_logs", logs);
        h.app.create_record(record).unwrap();

        let doc = h.search.document(TRAILS_INDEX, id).unwrap();
        assert_eq!(doc["completed"], completed, "{id}");
    }
}

#[test]
fn update_resends_the_full_document() {
    let h = harness();
    h.app.create_record(trail("t1")).unwrap();

    let mut edited = trail("t1");
    edited.unset("description");
    edited.set("name", "Ridge loop (north)");
    edited.set("summit_logs", json!(["log1"]));
    h.app.update_record(edited).unwrap();

    let doc = h.search.document(TRAILS_INDEX, "t1").unwrap();
    assert_eq!(doc["name"], "Ridge loop (north)");
    assert_eq!(doc["description"], "");
    assert_eq!(doc["completed"], true);
    assert_eq!(h.search.documents(TRAILS_INDEX).len(), 1);

    let adds = h
        .search
        .calls()
        .into_iter()
        .filter(|c| matches!(c, SearchCall::AddDocuments { .. }))
        .count();
    assert_eq!(adds, 2);
}

#[test]
fn update_keeps_created_timestamp() {
    let h = harness();
    let created = h.app.create_record(trail("t1")).unwrap();

    let updated = h.app.update_record(trail("t1")).unwrap();
    assert_eq!(updated.get_string("created"), created.get_string("created"));
}

#[test]
fn update_of_missing_trail_is_not_found() {
    let h = harness();
    let err = h.app.update_record(trail("ghost")).unwrap_err();
    assert_eq!(err.status_code(), 404);
    assert!(h.search.calls().is_empty());
}

#[test]
fn replayed_update_is_an_upsert() {
    let h = harness();
    h.app.create_record(trail("t1")).unwrap();
    h.app.update_record(trail("t1")).unwrap();
    h.app.update_record(trail("t1")).unwrap();

    assert_eq!(h.search.documents(TRAILS_INDEX).len(), 1);
}

#[test]
fn delete_removes_exactly_that_document() {
    let h = harness();
    h.app.create_record(trail("t1")).unwrap();
    h.app.create_record(trail("t2")).unwrap();
    h.search.clear_calls();

    h.app.delete_record("trails", "t1").unwrap();

    assert_eq!(
        h.search.calls(),
        vec![SearchCall::DeleteDocument {
            index: TRAILS_INDEX.to_string(),
            id: "t1".to_string(),
        }]
    );
    assert!(h.search.document(TRAILS_INDEX, "t1").is_none());
    assert!(h.search.document(TRAILS_INDEX, "t2").is_some());
}

#[test]
fn delete_error_is_surfaced_unchanged() {
    let h = harness();
    h.app.create_record(trail("t1")).unwrap();

    let service_error = SearchError::Api {
        status: 404,
        code: "document_not_found".into(),
        message: "Document `t1` not found.".into(),
    };
    h.search.fail_on(Operation::DeleteDocument, service_error.clone());

    match h.app.delete_record("trails", "t1") {
        Err(HookError::Search(err)) => assert_eq!(err, service_error),
        other => panic!("unexpected result {other:?}"),
    }
}

#[test]
fn index_failure_fails_the_request_but_keeps_the_record() {
    let h = harness();
    let err = SearchError::Transport("connection refused".into());
    h.search.fail_on(Operation::AddDocuments, err.clone());

    let result = h.app.create_record(trail("t1"));
    assert!(matches!(result, Err(HookError::Search(ref e)) if *e == err));
    assert_eq!(result.unwrap_err().status_code(), 502);

    // No compensation: the record write stands.
    assert!(h.store.find_record("trails", "t1").unwrap().is_some());
    assert!(h.search.document(TRAILS_INDEX, "t1").is_none());
}

#[test]
fn other_collections_do_not_touch_the_index() {
    let h = harness();
    let mut category = trail_search::Record::new("categories");
    category.set("name", "Hiking");
    h.app.create_record(category).unwrap();

    assert!(h.search.calls().is_empty());
}
