// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - identity, session and data orchestration helpers.

pub mod identity;
pub mod optimistic;
pub mod reference;
pub mod session;
pub mod supersede;
pub mod uploads;

pub use identity::{AuthError, AuthFlow, FederatedCredential, FirebaseIdentity, Identity, IdentityProvider};
pub use optimistic::{InFlight, OptimisticCommand, Rollback};
pub use reference::{ensure_reference_data, fetch_reference_data};
pub use session::{merge_profile, SessionBootstrap};
pub use supersede::{FetchSequence, FetchTicket};
pub use uploads::{ImageFile, ImageUploadClient};
