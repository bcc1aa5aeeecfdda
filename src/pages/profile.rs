// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile page: the session user's details and the editable subset.

use serde::Serialize;
use validator::Validate;

use super::{field_messages, FormStatus, StatusCell};
use crate::db::collections;
use crate::error::{AppError, Result};
use crate::models::UserProfile;
use crate::AppState;

/// Read-only profile view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileView {
    pub avatar_url: Option<String>,
    pub avatar_initial: String,
    pub name: String,
    pub username: String,
    pub email: String,
    pub phone_num: String,
    pub city: String,
}

impl From<&UserProfile> for ProfileView {
    fn from(user: &UserProfile) -> Self {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        Self {
            avatar_url: user.avatar.clone().filter(|a| !a.is_empty()),
            avatar_initial: user.avatar_initial(),
            name: text(&user.name),
            username: text(&user.username),
            email: text(&user.email),
            phone_num: text(&user.phone_num),
            city: text(&user.city),
        }
    }
}

/// Editable profile fields; written with `PATCH users/{uid}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[validate(length(min = 1, message = "Unesite ime i prezime."))]
    pub name: String,
    pub phone_num: String,
    pub city: String,
}

impl ProfileUpdate {
    fn trimmed(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            phone_num: self.phone_num.trim().to_string(),
            city: self.city.trim().to_string(),
        }
    }
}

#[derive(Clone)]
pub struct ProfilePage {
    app: AppState,
    status: StatusCell,
}

impl ProfilePage {
    pub fn new(app: AppState) -> Self {
        Self {
            app,
            status: StatusCell::default(),
        }
    }

    pub fn view(&self) -> Option<ProfileView> {
        self.app.auth.user().as_ref().map(ProfileView::from)
    }

    pub fn status(&self) -> FormStatus {
        self.status.get()
    }

    /// Save the editable fields and merge them into the session profile.
    pub async fn save(&self, update: &ProfileUpdate) -> Result<UserProfile> {
        self.status.start();
        let update = update.trimmed();

        if let Err(errors) = update.validate() {
            let fields = field_messages(&errors);
            let message = fields.values().next().cloned().unwrap_or_default();
            self.status.invalid(fields, message.clone());
            return Err(AppError::Validation(message));
        }

        match self.try_save(&update).await {
            Ok(user) => {
                self.status.succeed(Some("Izmene su sačuvane.".to_string()));
                Ok(user)
            }
            Err(e) => {
                self.status.fail(e.user_message());
                Err(e)
            }
        }
    }

    async fn try_save(&self, update: &ProfileUpdate) -> Result<UserProfile> {
        let user = self.app.require_user()?;
        let token = self.app.id_token().await?;

        let path = collections::doc(collections::USERS, &user.uid);
        let _: serde_json::Value = self.app.db.patch(&path, update, Some(&token)).await?;

        if let Err(e) = self.app.identity.update_display_name(&update.name).await {
            tracing::warn!(uid = %user.uid, error = %e, "Display name update failed");
        }

        let non_empty = |v: &str| (!v.is_empty()).then(|| v.to_string());
        let updated = UserProfile {
            name: Some(update.name.clone()),
            phone_num: non_empty(&update.phone_num),
            city: non_empty(&update.city),
            ..user
        };
        self.app.auth.set_user(Some(updated.clone()));
        tracing::info!(uid = %updated.uid, "Profile updated");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_falls_back_for_missing_fields() {
        let view = ProfileView::from(&UserProfile {
            uid: "u1".into(),
            avatar: Some(String::new()),
            ..Default::default()
        });
        assert_eq!(view.avatar_initial, "U");
        assert_eq!(view.avatar_url, None);
        assert_eq!(view.name, "");
    }

    #[test]
    fn test_update_wire_format() {
        let update = ProfileUpdate {
            name: "Pera Perić".into(),
            phone_num: "0601234567".into(),
            city: "Beograd".into(),
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            serde_json::json!({"name": "Pera Perić", "phoneNum": "0601234567", "city": "Beograd"})
        );
    }

    #[test]
    fn test_blank_name_is_invalid() {
        let update = ProfileUpdate {
            name: "   ".into(),
            ..Default::default()
        };
        assert!(update.trimmed().validate().is_err());
    }
}
