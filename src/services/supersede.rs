// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Cooperative cancellation for page fetches.
//!
//! Each fetch takes a [`FetchTicket`] from its controller's [`FetchSequence`].
//! Starting a newer fetch (or unmounting) invalidates every older ticket, and
//! a fetch whose ticket is no longer current must drop its result.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Generation counter shared by one controller instance.
#[derive(Clone, Default)]
pub struct FetchSequence {
    generation: Arc<AtomicU64>,
}

impl FetchSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fetch, superseding any fetch started earlier.
    pub fn begin(&self) -> FetchTicket {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        FetchTicket {
            generation,
            sequence: self.generation.clone(),
        }
    }

    /// Invalidate all outstanding tickets without starting a new fetch.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

/// Handle held by one in-flight fetch.
#[derive(Clone)]
pub struct FetchTicket {
    generation: u64,
    sequence: Arc<AtomicU64>,
}

impl FetchTicket {
    /// False once a newer fetch started or the controller was torn down.
    pub fn is_current(&self) -> bool {
        self.sequence.load(Ordering::SeqCst) == self.generation
    }

    pub fn is_cancelled(&self) -> bool {
        !self.is_current()
    }
}
