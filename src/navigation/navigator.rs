// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client-side history with guard enforcement.
//!
//! Every navigation runs through [`guard`]: a redirect replaces the entry the
//! caller asked for, so "back" never returns to a page the user was not
//! allowed to see. Auth changes re-run the guard on the current entry.

use std::sync::{Arc, RwLock};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::guard::{guard, GuardOutcome};
use super::route::Location;
use crate::stores::{read, write, AuthStore};

/// One history entry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HistoryEntry {
    pub location: Location,
    /// Destination a guard redirect intercepted.
    pub from: Option<Location>,
}

#[derive(Debug)]
struct History {
    entries: Vec<HistoryEntry>,
    index: usize,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    Push,
    Replace,
}

/// Shared navigator handle.
#[derive(Clone)]
pub struct Navigator {
    history: Arc<RwLock<History>>,
    tx: Arc<watch::Sender<HistoryEntry>>,
    auth: AuthStore,
}

impl Navigator {
    pub fn new(auth: AuthStore, initial_url: &str) -> Self {
        let entry = HistoryEntry {
            location: Location::parse(initial_url),
            from: None,
        };
        let (tx, _rx) = watch::channel(entry.clone());
        let navigator = Self {
            history: Arc::new(RwLock::new(History {
                entries: vec![entry],
                index: 0,
            })),
            tx: Arc::new(tx),
            auth,
        };
        navigator.revalidate();
        navigator
    }

    pub fn current(&self) -> HistoryEntry {
        let history = read(&self.history);
        history.entries[history.index].clone()
    }

    pub fn location(&self) -> Location {
        self.current().location
    }

    pub fn subscribe(&self) -> watch::Receiver<HistoryEntry> {
        self.tx.subscribe()
    }

    /// What the current entry should display right now.
    pub fn outcome(&self) -> GuardOutcome {
        guard(&self.location(), &self.auth.snapshot())
    }

    pub fn push(&self, url: &str) {
        self.navigate(url, Mode::Push);
    }

    pub fn replace(&self, url: &str) {
        self.navigate(url, Mode::Replace);
    }

    /// Step back one entry; false if already at the oldest entry.
    pub fn back(&self) -> bool {
        let entry = {
            let mut history = write(&self.history);
            if history.index == 0 {
                return false;
            }
            history.index -= 1;
            history.entries[history.index].clone()
        };
        self.tx.send_replace(entry);
        self.revalidate();
        true
    }

    /// History depth, for tests and diagnostics.
    pub fn len(&self) -> usize {
        read(&self.history).entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Re-run the guard for the current entry, redirecting if it now fails.
    pub fn revalidate(&self) {
        let current = self.current();
        if let Some(redirected) = self.resolve(&current) {
            self.commit(redirected, Mode::Replace);
        }
    }

    /// Re-check guards whenever the auth session changes.
    pub fn watch_auth(&self) -> JoinHandle<()> {
        let navigator = self.clone();
        let mut rx = self.auth.subscribe();
        tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                navigator.revalidate();
            }
        })
    }

    fn navigate(&self, url: &str, mode: Mode) {
        let entry = HistoryEntry {
            location: Location::parse(url),
            from: None,
        };
        let entry = self.resolve(&entry).unwrap_or(entry);
        self.commit(entry, mode);
    }

    /// The redirect entry, if the guard rejects `entry`.
    fn resolve(&self, entry: &HistoryEntry) -> Option<HistoryEntry> {
        match guard(&entry.location, &self.auth.snapshot()) {
            GuardOutcome::Redirect { to, from } => {
                tracing::debug!(target_path = %entry.location, redirect = %to, "Navigation redirected");
                Some(HistoryEntry { location: to, from })
            }
            GuardOutcome::Render | GuardOutcome::Loading => None,
        }
    }

    fn commit(&self, entry: HistoryEntry, mode: Mode) {
        {
            let mut history = write(&self.history);
            match mode {
                Mode::Push => {
                    let keep = history.index + 1;
                    history.entries.truncate(keep);
                    history.entries.push(entry.clone());
                    history.index = history.entries.len() - 1;
                }
                Mode::Replace => {
                    let index = history.index;
                    history.entries[index] = entry.clone();
                }
            }
        }
        self.tx.send_replace(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserProfile;

    fn signed_in(auth: &AuthStore) {
        auth.publish(
            Some(UserProfile {
                uid: "u1".into(),
                ..Default::default()
            }),
            Some("tok".into()),
        );
    }

    #[test]
    fn test_push_and_back() {
        let auth = AuthStore::new();
        auth.publish(None, None);
        let nav = Navigator::new(auth, "/");

        nav.push("/oglasi?brand=audi");
        nav.push("/oglas/c1");
        assert_eq!(nav.len(), 3);
        assert_eq!(nav.location().path, "/oglas/c1");

        assert!(nav.back());
        assert_eq!(nav.location().to_url(), "/oglasi?brand=audi");
        assert!(nav.back());
        assert!(!nav.back());
    }

    #[test]
    fn test_push_after_back_drops_forward_entries() {
        let auth = AuthStore::new();
        auth.publish(None, None);
        let nav = Navigator::new(auth, "/");
        nav.push("/oglasi");
        nav.push("/oglas/c1");
        nav.back();
        nav.push("/oglas/c2");
        assert_eq!(nav.len(), 3);
        assert_eq!(nav.location().path, "/oglas/c2");
    }

    #[test]
    fn test_replace_keeps_depth() {
        let auth = AuthStore::new();
        auth.publish(None, None);
        let nav = Navigator::new(auth, "/oglasi");
        nav.replace("/oglasi?fuel=dizel");
        assert_eq!(nav.len(), 1);
        assert_eq!(nav.location().query, "fuel=dizel");
    }

    #[test]
    fn test_protected_push_redirects_and_remembers_destination() {
        let auth = AuthStore::new();
        auth.publish(None, None);
        let nav = Navigator::new(auth, "/");

        nav.push("/moji-oglasi");
        let entry = nav.current();
        assert_eq!(entry.location.path, "/prijava");
        assert_eq!(entry.from, Some(Location::parse("/moji-oglasi")));
        assert_eq!(nav.len(), 2);
    }

    #[test]
    fn test_loading_defers_the_decision() {
        let auth = AuthStore::new();
        let nav = Navigator::new(auth.clone(), "/profil");
        assert_eq!(nav.outcome(), GuardOutcome::Loading);
        assert_eq!(nav.location().path, "/profil");

        signed_in(&auth);
        nav.revalidate();
        assert_eq!(nav.location().path, "/profil");
        assert_eq!(nav.outcome(), GuardOutcome::Render);
    }

    #[test]
    fn test_sign_in_leaves_login_page() {
        let auth = AuthStore::new();
        auth.publish(None, None);
        let nav = Navigator::new(auth.clone(), "/prijava");
        assert_eq!(nav.outcome(), GuardOutcome::Render);

        signed_in(&auth);
        nav.revalidate();
        assert_eq!(nav.location().path, "/");
    }

    #[tokio::test]
    async fn test_logout_on_protected_page_redirects() {
        let auth = AuthStore::new();
        signed_in(&auth);
        let nav = Navigator::new(auth.clone(), "/profil");
        let mut rx = nav.subscribe();
        let handle = nav.watch_auth();

        auth.logout();
        let entry = rx
            .wait_for(|entry| entry.location.path == "/prijava")
            .await
            .unwrap()
            .clone();
        assert_eq!(entry.from, Some(Location::parse("/profil")));

        handle.abort();
    }
}
