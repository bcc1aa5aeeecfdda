// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Password change page (`/reset-sifre`).

use super::{FormStatus, StatusCell};
use crate::error::{AppError, Result};
use crate::services::AuthFlow;
use crate::AppState;

pub const PASSWORD_CHANGED: &str = "Lozinka je uspešno promenjena.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PasswordChangeForm {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

impl PasswordChangeForm {
    /// Checks that need no network call.
    pub fn check(&self) -> Result<()> {
        if self.current_password.is_empty()
            || self.new_password.is_empty()
            || self.confirm_password.is_empty()
        {
            return Err(AppError::Validation("Popunite sva polja.".to_string()));
        }
        if self.new_password != self.confirm_password {
            return Err(AppError::Validation(
                "Nova lozinka i potvrda se ne poklapaju.".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct PasswordPage {
    app: AppState,
    status: StatusCell,
}

impl PasswordPage {
    pub fn new(app: AppState) -> Self {
        Self {
            app,
            status: StatusCell::default(),
        }
    }

    pub fn status(&self) -> FormStatus {
        self.status.get()
    }

    /// Reauthenticate with the current password, then set the new one.
    pub async fn change_password(&self, form: &PasswordChangeForm) -> Result<()> {
        self.status.start();
        match self.try_change(form).await {
            Ok(()) => {
                self.status.succeed(Some(PASSWORD_CHANGED.to_string()));
                Ok(())
            }
            Err(e) => {
                self.status.fail(e.message_for(AuthFlow::PasswordChange));
                Err(e)
            }
        }
    }

    async fn try_change(&self, form: &PasswordChangeForm) -> Result<()> {
        let email = self
            .app
            .identity
            .current()
            .and_then(|identity| identity.email)
            .ok_or_else(|| {
                AppError::Validation(
                    "Morate biti prijavljeni da biste promenili lozinku.".to_string(),
                )
            })?;

        form.check()?;

        let identity = &self.app.identity;
        identity.reauthenticate(&email, &form.current_password).await?;
        identity.update_password(&form.new_password).await?;
        Ok(())
    }
}
