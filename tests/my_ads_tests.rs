// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! My-ads page: owner filtering and optimistic deletes.

mod common;

use axum::http::Method;
use common::{FakeStore, StubIdentity, TEST_TOKEN};
use polovnjaci::error::AppError;
use polovnjaci::services::identity::AuthError;
use std::sync::Arc;
use std::time::Duration;

fn ids(page: &polovnjaci::pages::MyAdsPage) -> Vec<String> {
    page.listings().into_iter().map(|c| c.id).collect()
}

#[tokio::test]
async fn test_loads_only_own_listings_newest_first() {
    let store = FakeStore::new(common::seed());
    let (app, _identity) = common::signed_in_app(&store, "u1", "/moji-oglasi").await;
    let page = app.my_ads_page();

    page.load().await.unwrap();
    assert_eq!(ids(&page), vec!["c2", "c1"]);
    assert!(!page.is_loading());

    let request = store.requests().pop().unwrap();
    assert_eq!(request.auth.as_deref(), Some(TEST_TOKEN));
}

#[tokio::test]
async fn test_requires_session() {
    let store = FakeStore::new(common::seed());
    let app = common::test_app(&store, Arc::new(StubIdentity::new())).await;
    let page = app.my_ads_page();

    let err = page.load().await.unwrap_err();
    assert!(matches!(err, AppError::Unauthorized));
    assert_eq!(page.error().as_deref(), Some("Morate biti prijavljeni."));
}

#[tokio::test]
async fn test_delete_removes_listing() {
    let store = FakeStore::new(common::seed());
    let (app, _identity) = common::signed_in_app(&store, "u1", "/moji-oglasi").await;
    let page = app.my_ads_page();
    page.load().await.unwrap();

    page.delete("c1").await.unwrap();
    assert_eq!(ids(&page), vec!["c2"]);
    assert!(store.get("cars/c1").is_null());
    assert!(!page.is_deleting("c1"));
}

#[tokio::test]
async fn test_failed_delete_restores_listing() {
    let store = FakeStore::new(common::seed());
    let (app, _identity) = common::signed_in_app(&store, "u1", "/moji-oglasi").await;
    let page = app.my_ads_page();
    page.load().await.unwrap();

    store.fail("cars/c1");
    let pending = page.begin_delete("c1").await.unwrap();

    // Removed locally before the store answers
    assert_eq!(ids(&page), vec!["c2"]);
    assert!(page.is_deleting("c1"));

    let err = pending.finish().await.unwrap_err();
    assert!(err.is_remote());
    assert_eq!(ids(&page), vec!["c2", "c1"]);
    assert_eq!(page.error().as_deref(), Some("Service unavailable"));
    assert!(!page.is_deleting("c1"));
    assert!(!store.get("cars/c1").is_null());
}

#[tokio::test]
async fn test_token_failure_on_delete_is_displayed() {
    let store = FakeStore::new(common::seed());
    let (app, identity) = common::signed_in_app(&store, "u1", "/moji-oglasi").await;
    let page = app.my_ads_page();
    page.load().await.unwrap();

    identity.fail_next(AuthError::Network("offline".into()));
    let err = page.delete("c1").await.unwrap_err();
    assert!(matches!(err, AppError::Auth(AuthError::Network(_))));
    assert_eq!(
        page.error().as_deref(),
        Some("Problem sa mrežom. Pokušajte ponovo.")
    );
    assert_eq!(ids(&page), vec!["c2", "c1"]);
    assert_eq!(store.count(Method::DELETE, "cars/c1"), 0);
}

#[tokio::test]
async fn test_successful_delete_clears_previous_error() {
    let store = FakeStore::new(common::seed());
    let (app, _identity) = common::signed_in_app(&store, "u1", "/moji-oglasi").await;
    let page = app.my_ads_page();
    page.load().await.unwrap();

    store.fail("cars/c1");
    page.delete("c1").await.unwrap_err();
    assert!(page.error().is_some());

    page.delete("c2").await.unwrap();
    assert_eq!(page.error(), None);
    assert_eq!(ids(&page), vec!["c1"]);
}

#[tokio::test]
async fn test_duplicate_delete_is_rejected() {
    let store = FakeStore::new(common::seed());
    let (app, _identity) = common::signed_in_app(&store, "u1", "/moji-oglasi").await;
    let page = app.my_ads_page();
    page.load().await.unwrap();

    store.delay_next("cars/c2", Duration::from_millis(200));
    let first = page.begin_delete("c2").await.unwrap();
    let second = page.begin_delete("c2").await;
    assert!(matches!(second, Err(AppError::InProgress(_))));
    assert_eq!(page.error().as_deref(), Some("Operacija je već u toku."));

    first.finish().await.unwrap();
    assert_eq!(store.count(Method::DELETE, "cars/c2"), 1);
    assert_eq!(ids(&page), vec!["c1"]);
}

#[tokio::test]
async fn test_unmounted_load_does_not_write() {
    let store = FakeStore::new(common::seed());
    let (app, _identity) = common::signed_in_app(&store, "u1", "/moji-oglasi").await;
    let page = app.my_ads_page();

    store.delay_next("cars", Duration::from_millis(200));
    let (result, ()) = tokio::join!(page.load(), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        page.unmount();
    });

    assert!(result.is_ok());
    assert!(page.listings().is_empty());
}
