//! New users get a tenant token written onto their record.

use std::sync::Arc;

use chrono::Duration;
use trail_search::search::{tenant_token, Operation, SearchCall};
use trail_search::token::{CITIES_INDEX, TOKEN_FIELD};
use trail_search::{
    ApiKey, App, Config, HookError, InMemoryRecordStore, InMemorySearchService, Record,
    RecordError, RecordStore, SearchError, TRAILS_INDEX,
};

use crate::support::{harness, harness_with, search_with_default_key};

#[test]
fn user_creation_issues_and_persists_token() {
    let h = harness();
    let created = h.app.create_record(Record::with_id("users", "u1")).unwrap();

    let calls = h.search.calls();
    assert_eq!(calls.len(), 1);
    let SearchCall::GenerateTenantToken {
        api_key_uid,
        rules,
        options,
    } = &calls[0]
    else {
        panic!("unexpected call {:?}", calls[0]);
    };
    assert_eq!(api_key_uid, "k1");
    assert_eq!(options.api_key.as_deref(), Some("s1"));
    assert_eq!(options.expires_at, None);
    assert_eq!(rules[TRAILS_INDEX]["filter"], "public = true OR author = u1");

    let token = created.get_string(TOKEN_FIELD);
    assert!(!token.is_empty());

    let stored = h.store.get_record("users", "u1").unwrap();
    assert_eq!(stored.get_string(TOKEN_FIELD), token);

    let claims = tenant_token::verify(&token, "s1").unwrap();
    assert_eq!(claims.api_key_uid, "k1");
}

#[test]
fn rules_grant_cities_and_filter_trails() {
    let h = harness();
    let created = h.app.create_record(Record::new("users")).unwrap();

    let claims = tenant_token::verify(&created.get_string(TOKEN_FIELD), "s1").unwrap();
    assert_eq!(claims.search_rules.len(), 2);
    assert_eq!(claims.search_rules[CITIES_INDEX], serde_json::json!({}));
    assert_eq!(
        claims.search_rules[TRAILS_INDEX]["filter"],
        format!("public = true OR author = {}", created.id())
    );
}

#[test]
fn token_failure_fails_the_request() {
    let h = harness();
    let err = SearchError::TenantToken("api key is empty".into());
    h.search.fail_on(Operation::GenerateTenantToken, err.clone());

    let result = h.app.create_record(Record::with_id("users", "u1"));
    assert!(matches!(result, Err(HookError::Search(ref e)) if *e == err));

    let stored = h.store.get_record("users", "u1").unwrap();
    assert_eq!(stored.get_string(TOKEN_FIELD), "");
}

#[test]
fn key_listing_is_not_repeated_per_signup() {
    let search = InMemorySearchService::new()
        .with_key(ApiKey::new("k0", "s0", "Default Admin API Key"))
        .with_key(ApiKey::new("k1", "s1", trail_search::DEFAULT_SEARCH_KEY_NAME));
    let h = harness_with(search);

    // Listing would fail now, but the key was resolved at bootstrap.
    h.search
        .fail_on(Operation::ListKeys, SearchError::Transport("down".into()));

    for id in ["u1", "u2", "u3"] {
        h.app.create_record(Record::with_id("users", id)).unwrap();
    }
    assert!(!h
        .search
        .calls()
        .iter()
        .any(|c| matches!(c, SearchCall::ListKeys)));
}

#[test]
fn user_updates_do_not_reissue() {
    let h = harness();
    let created = h.app.create_record(Record::with_id("users", "u1")).unwrap();
    h.search.clear_calls();

    let mut edited = created.clone();
    edited.set("username", "ada");
    let updated = h.app.update_record(edited).unwrap();

    assert!(h.search.calls().is_empty());
    assert_eq!(updated.get_string(TOKEN_FIELD), created.get_string(TOKEN_FIELD));
}

#[test]
fn duplicate_user_is_rejected_without_new_token() {
    let h = harness();
    let created = h.app.create_record(Record::with_id("users", "u1")).unwrap();
    h.search.clear_calls();

    let err = h.app.create_record(Record::with_id("users", "u1")).unwrap_err();
    assert!(matches!(err, HookError::Record(RecordError::AlreadyExists { .. })));
    assert_eq!(err.status_code(), 400);

    assert!(h.search.calls().is_empty());
    let stored = h.store.get_record("users", "u1").unwrap();
    assert_eq!(stored.get_string(TOKEN_FIELD), created.get_string(TOKEN_FIELD));
}

#[test]
fn expiry_past_the_calendar_fails_the_request() {
    let store = InMemoryRecordStore::new();
    let config =
        Config::new("http://search.test").with_token_ttl(Duration::days(1_000_000_000));
    let search = Arc::new(search_with_default_key());
    let app = App::bootstrap(store.clone(), search, &config).unwrap();

    let err = app.create_record(Record::with_id("users", "u1")).unwrap_err();
    assert!(matches!(err, HookError::Search(SearchError::TenantToken(_))));
    assert_eq!(err.status_code(), 502);
    assert_eq!(store.get_record("users", "u1").unwrap().get_string(TOKEN_FIELD), "");
}
