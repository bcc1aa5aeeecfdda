// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared fixtures: an in-process fake document store and a stub identity
//! provider.

use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Json, Router,
};
use polovnjaci::config::Config;
use polovnjaci::navigation::AppRoute;
use polovnjaci::services::{AuthError, FederatedCredential, Identity, IdentityProvider};
use polovnjaci::AppState;
use serde_json::{json, Map, Value};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;

/// Bearer token handed out by [`StubIdentity`].
#[allow(dead_code)]
pub const TEST_TOKEN: &str = "test-id-token";

/// A request seen by the fake store.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub auth: Option<String>,
    pub body: Option<Value>,
}

/// In-memory stand-in for the document store's REST API.
#[derive(Clone, Default)]
pub struct FakeStore {
    root: Arc<Mutex<Value>>,
    failing: Arc<Mutex<HashSet<String>>>,
    delays: Arc<Mutex<HashMap<String, VecDeque<Duration>>>>,
    requests: Arc<Mutex<Vec<Recorded>>>,
    next_key: Arc<AtomicU64>,
}

#[allow(dead_code)]
impl FakeStore {
    pub fn new(data: Value) -> Self {
        Self {
            root: Arc::new(Mutex::new(data)),
            ..Default::default()
        }
    }

    /// Start serving on an ephemeral port; returns the base URL.
    pub async fn serve(&self) -> String {
        let app = Router::new()
            .route("/{*path}", any(handle))
            .with_state(self.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake store");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("fake store");
        });
        format!("http://{addr}")
    }

    /// Make every request to `path` fail with a 500.
    pub fn fail(&self, path: &str) {
        self.failing.lock().unwrap().insert(path.to_string());
    }

    pub fn recover(&self, path: &str) {
        self.failing.lock().unwrap().remove(path);
    }

    /// Delay the next request to `path`.
    pub fn delay_next(&self, path: &str, delay: Duration) {
        self.delays
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .push_back(delay);
    }

    /// Value stored at `path`, or `null`.
    pub fn get(&self, path: &str) -> Value {
        let root = self.root.lock().unwrap();
        root.pointer(&pointer(path)).cloned().unwrap_or(Value::Null)
    }

    pub fn set(&self, path: &str, value: Value) {
        set_at(&mut self.root.lock().unwrap(), path, value);
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests for `method` on `path`.
    pub fn count(&self, method: Method, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }
}

fn pointer(path: &str) -> String {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(|s| format!("/{}", s.replace('~', "~0").replace('/', "~1")))
        .collect()
}

fn set_at(root: &mut Value, path: &str, value: Value) {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let Some((last, parents)) = segments.split_last() else {
        *root = value;
        return;
    };

    let mut node = root;
    for segment in parents {
        if !node.is_object() {
            *node = Value::Object(Map::new());
        }
        node = node
            .as_object_mut()
            .unwrap()
            .entry(segment.to_string())
            .or_insert(Value::Null);
    }
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    let map = node.as_object_mut().unwrap();
    if value.is_null() {
        map.remove(*last);
    } else {
        map.insert(last.to_string(), value);
    }
}

async fn handle(
    State(store): State<FakeStore>,
    method: Method,
    Path(raw): Path<String>,
    axum::extract::Query(query): axum::extract::Query<HashMap<String, String>>,
    body: Bytes,
) -> Response {
    let path = raw.trim_end_matches(".json").to_string();
    let body: Option<Value> = serde_json::from_slice(&body).ok();

    store.requests.lock().unwrap().push(Recorded {
        method: method.clone(),
        path: path.clone(),
        auth: query.get("auth").cloned(),
        body: body.clone(),
    });

    let delay = store
        .delays
        .lock()
        .unwrap()
        .get_mut(&path)
        .and_then(VecDeque::pop_front);
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    if store.failing.lock().unwrap().contains(&path) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "Service unavailable"})),
        )
            .into_response();
    }

    let body = body.unwrap_or(Value::Null);
    match method {
        Method::GET => Json(store.get(&path)).into_response(),
        Method::PUT => {
            store.set(&path, body.clone());
            Json(body).into_response()
        }
        Method::PATCH => {
            let mut merged = store.get(&path);
            if let (Some(target), Value::Object(update)) = (merged.as_object_mut(), &body) {
                target.extend(update.clone());
            } else {
                merged = body.clone();
            }
            store.set(&path, merged);
            Json(body).into_response()
        }
        Method::POST => {
            let key = format!("-N{:04}", store.next_key.fetch_add(1, Ordering::SeqCst));
            store.set(&format!("{path}/{key}"), body);
            Json(json!({"name": key})).into_response()
        }
        Method::DELETE => {
            store.set(&path, Value::Null);
            Json(Value::Null).into_response()
        }
        _ => StatusCode::METHOD_NOT_ALLOWED.into_response(),
    }
}

/// Seed data: reference lists plus three listings from two sellers.
#[allow(dead_code)]
pub fn seed() -> Value {
    json!({
        "brands": {
            "audi": {"name": "Audi"},
            "vw": {"name": "Volkswagen"}
        },
        "models": {
            "a4": {"brandId": "audi", "name": "A4"},
            "golf": {"brandId": "vw", "name": "Golf"}
        },
        "fuels": {
            "dizel": {"name": "Dizel"},
            "benzin": {"name": "Benzin"}
        },
        "bodytypes": {
            "karavan": {"name": "Karavan"},
            "hecbek": {"name": "Hečbek"}
        },
        "cars": {
            "c1": {
                "sellerId": "u1", "title": "Audi A4 Avant", "brandId": "audi",
                "modelId": "a4", "price": 18500, "currency": "EUR", "year": 2019,
                "fuel": "dizel", "bodyType": "karavan", "mileage": 155000,
                "images": ["/pictures/a4.png"], "createdAt": "2026-01-10T10:00:00Z"
            },
            "c2": {
                "sellerId": "u1", "title": "Golf 7", "brandId": "vw",
                "modelId": "golf", "price": 9900, "currency": "EUR", "year": 2014,
                "fuel": "benzin", "bodyType": "hecbek", "mileage": 190000,
                "images": [], "createdAt": "2026-02-01T08:30:00Z"
            },
            "c3": {
                "sellerId": "u2", "title": "Audi A4 2.0 TDI", "brandId": "audi",
                "modelId": "a4", "price": 12000, "currency": "EUR", "year": 2012,
                "fuel": "dizel", "bodyType": "karavan", "mileage": 240000,
                "images": [], "createdAt": "2025-12-20T12:00:00Z"
            }
        },
        "users": {
            "u1": {"uid": "u1", "name": "Pera", "username": "pera", "email": "pera@example.com", "phoneNum": "0641234567", "city": "Beograd"},
            "u2": {"uid": "u2", "name": "Mika", "username": "mika"}
        }
    })
}

/// Identity provider double with an in-memory account table.
pub struct StubIdentity {
    state: watch::Sender<Option<Identity>>,
    accounts: Mutex<HashMap<String, (String, Identity)>>,
    next_error: Mutex<Option<AuthError>>,
    password_changes: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl StubIdentity {
    pub fn new() -> Self {
        let (state, _rx) = watch::channel(None);
        Self {
            state,
            accounts: Mutex::new(HashMap::new()),
            next_error: Mutex::new(None),
            password_changes: Mutex::new(Vec::new()),
        }
    }

    /// Register an account that can sign in with `password`.
    pub fn with_account(self, identity: Identity, password: &str) -> Self {
        let email = identity.email.clone().unwrap_or_default();
        self.accounts
            .lock()
            .unwrap()
            .insert(email, (password.to_string(), identity));
        self
    }

    /// Make the next provider call fail with `error`.
    pub fn fail_next(&self, error: AuthError) {
        *self.next_error.lock().unwrap() = Some(error);
    }

    /// Switch the session without going through a sign-in call.
    pub fn set_session(&self, identity: Option<Identity>) {
        self.state.send_replace(identity);
    }

    pub fn password_changes(&self) -> Vec<String> {
        self.password_changes.lock().unwrap().clone()
    }

    fn check(&self) -> Result<(), AuthError> {
        match self.next_error.lock().unwrap().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl IdentityProvider for StubIdentity {
    fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.state.subscribe()
    }

    fn current(&self) -> Option<Identity> {
        self.state.borrow().clone()
    }

    async fn id_token(&self, _force_refresh: bool) -> Result<String, AuthError> {
        self.check()?;
        match self.current() {
            Some(_) => Ok(TEST_TOKEN.to_string()),
            None => Err(AuthError::NoSession),
        }
    }

    async fn register(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        self.check()?;
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.contains_key(email) {
            return Err(AuthError::EmailInUse);
        }
        let identity = Identity {
            uid: format!("uid-{}", accounts.len() + 1),
            email: Some(email.to_string()),
            ..Default::default()
        };
        accounts.insert(email.to_string(), (password.to_string(), identity.clone()));
        drop(accounts);

        self.state.send_replace(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        self.check()?;
        let identity = match self.accounts.lock().unwrap().get(email) {
            Some((stored, identity)) if stored == password => identity.clone(),
            _ => return Err(AuthError::InvalidCredential),
        };
        self.state.send_replace(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_in_federated(
        &self,
        credential: &FederatedCredential,
    ) -> Result<Identity, AuthError> {
        self.check()?;
        let identity = Identity {
            uid: format!("fed-{}", credential.id_token),
            email: Some(format!("{}@gmail.com", credential.id_token)),
            email_verified: true,
            ..Default::default()
        };
        self.state.send_replace(Some(identity.clone()));
        Ok(identity)
    }

    async fn update_display_name(&self, display_name: &str) -> Result<(), AuthError> {
        self.check()?;
        let name = display_name.to_string();
        let mut found = false;
        // Profile edits are not session changes
        self.state.send_if_modified(|current| {
            if let Some(identity) = current {
                identity.display_name = Some(name);
                found = true;
            }
            false
        });
        if found {
            Ok(())
        } else {
            Err(AuthError::NoSession)
        }
    }

    async fn reauthenticate(&self, email: &str, password: &str) -> Result<(), AuthError> {
        self.check()?;
        match self.accounts.lock().unwrap().get(email) {
            Some((stored, _)) if stored == password => Ok(()),
            _ => Err(AuthError::InvalidCredential),
        }
    }

    async fn update_password(&self, new_password: &str) -> Result<(), AuthError> {
        self.check()?;
        let email = self
            .current()
            .and_then(|identity| identity.email)
            .ok_or(AuthError::NoSession)?;
        if let Some((stored, _)) = self.accounts.lock().unwrap().get_mut(&email) {
            *stored = new_password.to_string();
        }
        self.password_changes
            .lock()
            .unwrap()
            .push(new_password.to_string());
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.check()?;
        self.state.send_replace(None);
        Ok(())
    }
}

/// An identity with email and display name.
#[allow(dead_code)]
pub fn identity(uid: &str, email: &str) -> Identity {
    Identity {
        uid: uid.to_string(),
        email: Some(email.to_string()),
        display_name: None,
        photo_url: None,
        email_verified: true,
    }
}

/// App state wired to a running fake store and the given identity stub.
#[allow(dead_code)]
pub async fn test_app(store: &FakeStore, identity: Arc<StubIdentity>) -> AppState {
    test_app_at(store, identity, &AppRoute::Home.to_path()).await
}

#[allow(dead_code)]
pub async fn test_app_at(
    store: &FakeStore,
    identity: Arc<StubIdentity>,
    initial_url: &str,
) -> AppState {
    let mut config = Config::test_default();
    config.firebase_url = store.serve().await;
    AppState::with_identity(config, identity, initial_url)
}

/// Signed-in app state: the session is resolved before returning.
#[allow(dead_code)]
pub async fn signed_in_app(
    store: &FakeStore,
    uid: &str,
    initial_url: &str,
) -> (AppState, Arc<StubIdentity>) {
    let email = format!("{uid}@example.com");
    let stub = Arc::new(StubIdentity::new().with_account(identity(uid, &email), "lozinka1"));
    stub.set_session(Some(identity(uid, &email)));

    let app = test_app_at(store, stub.clone(), initial_url).await;
    app.session().handle_change(stub.current()).await;
    app.navigator.revalidate();
    (app, stub)
}
