// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Upload sideband endpoint and the upload page that posts to it.

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use common::{FakeStore, StubIdentity};
use polovnjaci::config::Config;
use polovnjaci::models::CarFeatures;
use polovnjaci::navigation::AppRoute;
use polovnjaci::pages::UploadForm;
use polovnjaci::routes::create_router;
use polovnjaci::services::{IdentityProvider, ImageFile};
use polovnjaci::AppState;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt;

fn pictures_dir(test: &str) -> PathBuf {
    let dir = std::env::temp_dir()
        .join("polovnjaci-upload-tests")
        .join(format!("{test}-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn sideband(dir: PathBuf) -> axum::Router {
    let mut config = Config::test_default();
    config.pictures_dir = dir;
    create_router(Arc::new(config))
}

async fn post_json(app: axum::Router, body: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/__upload")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_upload_writes_files() {
    let dir = pictures_dir("writes");
    let (status, body) = post_json(
        sideband(dir.clone()),
        json!({"files": [
            {"name": "Prednja Strana.jpg", "dataUrl": "data:image/jpeg;base64,aGVsbG8="},
            {"name": "bad.png", "dataUrl": "not a data url"}
        ]}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let urls = body["urls"].as_array().unwrap();
    assert_eq!(urls.len(), 1);

    let url = urls[0].as_str().unwrap();
    assert!(url.starts_with("/pictures/prednja-strana-"));
    assert!(url.ends_with(".jpeg"));

    let file = dir.join(url.trim_start_matches("/pictures/"));
    assert_eq!(std::fs::read(file).unwrap(), b"hello");
}

#[tokio::test]
async fn test_upload_without_files_is_rejected() {
    let dir = pictures_dir("empty");
    let (status, body) = post_json(sideband(dir.clone()), json!({"files": []})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No files received.");

    let (status, _) = post_json(sideband(dir), json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unwritable_directory_is_server_error() {
    let mut config = Config::test_default();
    config.pictures_dir = pictures_dir("missing").join("does/not/exist");
    let (status, body) = post_json(
        create_router(Arc::new(config)),
        json!({"files": [{"name": "a.png", "dataUrl": "data:image/png;base64,AAAA"}]}),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Upload failed.");
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let mut config = Config::test_default();
    config.pictures_dir = pictures_dir("oversized");
    config.max_upload_bytes = 64;

    let data_url = format!("data:image/png;base64,{}", "A".repeat(256));
    let payload = json!({"files": [{"name": "a.png", "dataUrl": data_url}]}).to_string();
    let response = create_router(Arc::new(config))
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/__upload")
                .header("content-type", "application/json")
                .header("content-length", payload.len())
                .body(Body::from(payload))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

fn complete_form() -> UploadForm {
    UploadForm {
        brand_id: "audi".into(),
        model_id: "a4".into(),
        title: "Audi A4 Avant".into(),
        year: "2018".into(),
        fuel: "dizel".into(),
        body_type: "karavan".into(),
        mileage: "120000".into(),
        engine_power: "110".into(),
        engine_displacement: "1968".into(),
        owners: "2".into(),
        price: "17900".into(),
        currency: "EUR".into(),
        description: "Garažiran.".into(),
        features: CarFeatures {
            has_warranty: true,
            ..Default::default()
        },
        images: vec![ImageFile::new("front.png", "image/png", b"png-bytes".to_vec())],
    }
}

#[tokio::test]
async fn test_upload_page_publishes_listing() {
    let store = FakeStore::new(common::seed());
    let dir = pictures_dir("page");

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, sideband(dir)).await.unwrap();
    });

    let stub = Arc::new(
        StubIdentity::new().with_account(common::identity("u1", "u1@example.com"), "lozinka1"),
    );
    stub.set_session(Some(common::identity("u1", "u1@example.com")));

    let mut config = Config::test_default();
    config.firebase_url = store.serve().await;
    config.upload_url = format!("http://{addr}/__upload");
    let app = AppState::with_identity(config, stub.clone(), "/postavi-oglas");
    app.session().handle_change(stub.current()).await;

    let page = app.upload_page();
    page.update(|form| *form = complete_form());
    let id = page.submit().await.unwrap();

    let stored = store.get(&format!("cars/{id}"));
    assert_eq!(stored["sellerId"], "u1");
    assert_eq!(stored["title"], "Audi A4 Avant");
    assert_eq!(stored["engineType"].as_f64(), Some(110.0));
    assert!(stored["images"][0].as_str().unwrap().starts_with("/pictures/front-"));

    assert_eq!(
        app.navigator.location().route(),
        AppRoute::CarDetails { id: id.clone() }
    );
    assert_eq!(page.form(), UploadForm::default());
}

#[tokio::test]
async fn test_incomplete_form_is_not_submitted() {
    let store = FakeStore::new(common::seed());
    let (app, _stub) = common::signed_in_app(&store, "u1", "/postavi-oglas").await;
    let page = app.upload_page();

    page.update(|form| {
        *form = complete_form();
        form.images.clear();
    });
    assert!(page.submit().await.is_err());
    assert_eq!(
        page.status().error.as_deref(),
        Some("Sva polja moraju biti uneta uključujući i slike!")
    );
    assert_eq!(store.get("cars").as_object().unwrap().len(), 3);
}
