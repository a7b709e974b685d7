//! Startup: key resolution happens once and failures stop bootstrap.

use std::sync::Arc;

use trail_search::search::{tenant_token, Operation, SearchCall};
use trail_search::{
    ApiKey, App, BootstrapError, Config, InMemoryRecordStore, InMemorySearchService, KeyError,
    Phase, SearchError, DEFAULT_SEARCH_KEY_NAME,
};

use crate::support::{harness, search_with_default_key};

#[test]
fn registers_the_four_sync_hooks() {
    let h = harness();
    assert_eq!(
        h.app.hooks().registered(),
        vec![
            ("trails", Phase::AfterCreate),
            ("trails", Phase::AfterUpdate),
            ("trails", Phase::AfterDelete),
            ("users", Phase::AfterCreate),
        ]
    );
}

#[test]
fn resolves_key_once() {
    let search = search_with_default_key();
    let app = App::bootstrap(
        InMemoryRecordStore::new(),
        Arc::new(search.clone()),
        &Config::new("http://search.test"),
    )
    .unwrap();
    assert_eq!(app.issuer().key().uid, "k1");

    app.create_record(trail_search::Record::new("users")).unwrap();
    app.create_record(trail_search::Record::new("users")).unwrap();

    let listings = search
        .calls()
        .iter()
        .filter(|c| matches!(c, SearchCall::ListKeys))
        .count();
    assert_eq!(listings, 1);
}

#[test]
fn missing_key_fails_bootstrap() {
    let search = InMemorySearchService::new()
        .with_key(ApiKey::new("k9", "s9", "Default Admin API Key"));
    let result = App::bootstrap(
        InMemoryRecordStore::new(),
        Arc::new(search),
        &Config::new("http://search.test"),
    );
    assert!(matches!(
        result,
        Err(BootstrapError::Key(KeyError::NotFound(ref name))) if name == DEFAULT_SEARCH_KEY_NAME
    ));
}

#[test]
fn listing_failure_fails_bootstrap_without_exiting() {
    let search = search_with_default_key();
    let err = SearchError::Transport("connection refused".into());
    search.fail_on(Operation::ListKeys, err.clone());

    let result = App::bootstrap(
        InMemoryRecordStore::new(),
        Arc::new(search),
        &Config::new("http://search.test"),
    );
    assert!(matches!(result, Err(BootstrapError::Key(KeyError::Search(ref e))) if *e == err));
}

#[test]
fn custom_key_name_is_honoured() {
    let search = search_with_default_key().with_key(ApiKey::new("k2", "s2", "Frontend Key"));
    let app = App::bootstrap(
        InMemoryRecordStore::new(),
        Arc::new(search),
        &Config::new("http://search.test").with_search_key_name("Frontend Key"),
    )
    .unwrap();
    assert_eq!(app.issuer().key().uid, "k2");
}

#[test]
fn refresh_picks_up_a_rotated_key() {
    let search = search_with_default_key();
    let app = App::bootstrap(
        InMemoryRecordStore::new(),
        Arc::new(search.clone()),
        &Config::new("http://search.test"),
    )
    .unwrap();
    assert_eq!(app.issuer().key().uid, "k1");

    search.set_keys(vec![ApiKey::new("k3", "s3", DEFAULT_SEARCH_KEY_NAME)]);
    assert_eq!(app.issuer().key().uid, "k1");

    assert_eq!(app.issuer().refresh_key().unwrap().uid, "k3");
    let token = app.issuer().issue_token("u1").unwrap();
    assert_eq!(tenant_token::verify(&token, "s3").unwrap().api_key_uid, "k3");
}
