// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity provider client.
//!
//! The provider owns accounts and sessions; this crate only consumes it:
//! - session-state subscription (`None` when signed out)
//! - ID token issuance with refresh shortly before expiry
//! - email/password registration and sign-in, federated sign-in
//! - display name and password updates, reauthentication, sign-out
//!
//! [`FirebaseIdentity`] talks to the provider's REST API. Tests substitute
//! their own [`IdentityProvider`] implementation.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::sync::{watch, Mutex};

use crate::config::Config;

/// Margin before token expiration when we proactively refresh (5 minutes).
const TOKEN_REFRESH_MARGIN_SECS: i64 = 5 * 60;

/// Signed-in identity as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Identity {
    /// Provider subject id; also the key of the user's profile document.
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    pub email_verified: bool,
}

/// Credential obtained from a federated sign-in flow (e.g. Google).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FederatedCredential {
    /// Provider id, e.g. `google.com`
    pub provider_id: String,
    /// ID token issued by the federated provider
    pub id_token: String,
}

impl FederatedCredential {
    pub fn google(id_token: impl Into<String>) -> Self {
        Self {
            provider_id: "google.com".to_string(),
            id_token: id_token.into(),
        }
    }
}

/// User flow an identity error is reported in; selects the message wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFlow {
    Register,
    SignIn,
    PasswordChange,
}

/// Identity provider error, classified by provider error code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("email already in use")]
    EmailInUse,
    #[error("invalid email")]
    InvalidEmail,
    #[error("weak password")]
    WeakPassword,
    #[error("sign-in method not enabled")]
    OperationNotAllowed,
    #[error("invalid credential")]
    InvalidCredential,
    #[error("recent login required")]
    RequiresRecentLogin,
    #[error("account exists with different credential")]
    AccountExistsWithDifferentCredential,
    #[error("popup closed by user")]
    PopupClosed,
    #[error("user disabled")]
    UserDisabled,
    #[error("too many requests")]
    TooManyRequests,
    #[error("network request failed: {0}")]
    Network(String),
    #[error("no signed-in user")]
    NoSession,
    #[error("identity provider error: {0}")]
    Other(String),
}

impl AuthError {
    /// Classify a provider error code such as `EMAIL_EXISTS` or
    /// `WEAK_PASSWORD : Password should be at least 6 characters`.
    pub fn from_code(raw: &str) -> Self {
        let code = raw.split([' ', ':']).next().unwrap_or_default();
        match code {
            "EMAIL_EXISTS" => AuthError::EmailInUse,
            "INVALID_EMAIL" | "MISSING_EMAIL" => AuthError::InvalidEmail,
            "WEAK_PASSWORD" => AuthError::WeakPassword,
            "OPERATION_NOT_ALLOWED" | "PASSWORD_LOGIN_DISABLED" => {
                AuthError::OperationNotAllowed
            }
            "INVALID_LOGIN_CREDENTIALS" | "INVALID_PASSWORD" | "EMAIL_NOT_FOUND"
            | "INVALID_IDP_RESPONSE" | "USER_MISMATCH" => AuthError::InvalidCredential,
            "CREDENTIAL_TOO_OLD_LOGIN_AGAIN" | "TOKEN_EXPIRED" | "INVALID_ID_TOKEN"
            | "INVALID_REFRESH_TOKEN" => AuthError::RequiresRecentLogin,
            "NEED_CONFIRMATION" | "FEDERATED_USER_ID_ALREADY_LINKED" => {
                AuthError::AccountExistsWithDifferentCredential
            }
            "USER_DISABLED" => AuthError::UserDisabled,
            "TOO_MANY_ATTEMPTS_TRY_LATER" => AuthError::TooManyRequests,
            _ => AuthError::Other(raw.to_string()),
        }
    }

    /// Localized message for the flow the error occurred in.
    pub fn message(&self, flow: AuthFlow) -> String {
        let text = match (flow, self) {
            (_, AuthError::Network(_)) => "Problem sa mrežom. Pokušajte ponovo.",
            (_, AuthError::NoSession) => "Morate biti prijavljeni.",
            (_, AuthError::TooManyRequests) => {
                "Previše neuspešnih pokušaja. Pokušajte ponovo kasnije."
            }

            (AuthFlow::Register, AuthError::EmailInUse) => "Email adresa je već u upotrebi.",
            (AuthFlow::Register | AuthFlow::SignIn, AuthError::InvalidEmail) => {
                "Email adresa nije validna."
            }
            (AuthFlow::Register, AuthError::WeakPassword) => {
                "Lozinka je prekratka. Koristite najmanje 6 karaktera."
            }
            (AuthFlow::Register | AuthFlow::SignIn, AuthError::OperationNotAllowed) => {
                "Email/lozinka autentikacija nije omogućena."
            }
            (AuthFlow::Register | AuthFlow::SignIn, AuthError::PopupClosed) => {
                "Popup je zatvoren pre završetka prijave."
            }
            (
                AuthFlow::Register | AuthFlow::SignIn,
                AuthError::AccountExistsWithDifferentCredential,
            ) => "Nalog već postoji sa drugim načinom prijave.",
            (AuthFlow::Register, _) => "Došlo je do greške prilikom registracije.",

            (AuthFlow::SignIn, AuthError::InvalidCredential) => "Pogrešan email ili lozinka.",
            (AuthFlow::SignIn, AuthError::UserDisabled) => "Nalog je onemogućen.",
            (AuthFlow::SignIn, _) => "Došlo je do greške prilikom prijave.",

            (AuthFlow::PasswordChange, AuthError::InvalidCredential) => {
                "Trenutna lozinka nije ispravna."
            }
            (AuthFlow::PasswordChange, AuthError::RequiresRecentLogin) => {
                "Potrebna je ponovna prijava. Odjavite se i prijavite ponovo."
            }
            (AuthFlow::PasswordChange, AuthError::WeakPassword) => "Nova lozinka je preslaba.",
            (AuthFlow::PasswordChange, _) => "Došlo je do greške prilikom promene lozinke.",
        };
        text.to_string()
    }
}

/// Identity provider contract consumed by the application core.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Session-state changes; the current value is the signed-in identity.
    fn subscribe(&self) -> watch::Receiver<Option<Identity>>;

    fn current(&self) -> Option<Identity>;

    /// A valid ID token for the signed-in user.
    async fn id_token(&self, force_refresh: bool) -> Result<String, AuthError>;

    async fn register(&self, email: &str, password: &str) -> Result<Identity, AuthError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError>;

    async fn sign_in_federated(
        &self,
        credential: &FederatedCredential,
    ) -> Result<Identity, AuthError>;

    async fn update_display_name(&self, display_name: &str) -> Result<(), AuthError>;

    /// Re-verify the signed-in user's password before a sensitive change.
    async fn reauthenticate(&self, email: &str, password: &str) -> Result<(), AuthError>;

    async fn update_password(&self, new_password: &str) -> Result<(), AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// REST implementation
// ─────────────────────────────────────────────────────────────────────────────

/// Tokens for the signed-in user.
#[derive(Clone)]
struct Session {
    id_token: String,
    refresh_token: String,
    expires_at: DateTime<Utc>,
}

/// Identity provider client over the account and secure-token REST APIs.
#[derive(Clone)]
pub struct FirebaseIdentity {
    http: reqwest::Client,
    api_key: String,
    identity_url: String,
    secure_token_url: String,
    state: Arc<watch::Sender<Option<Identity>>>,
    session: Arc<Mutex<Option<Session>>>,
}

impl FirebaseIdentity {
    pub fn new(config: &Config) -> Self {
        Self::with_client(
            reqwest::Client::new(),
            config.firebase_api_key.clone(),
            config.identity_url.clone(),
            config.secure_token_url.clone(),
        )
    }

    pub fn with_client(
        http: reqwest::Client,
        api_key: String,
        identity_url: String,
        secure_token_url: String,
    ) -> Self {
        let (state, _rx) = watch::channel(None);
        Self {
            http,
            api_key,
            identity_url: identity_url.trim_end_matches('/').to_string(),
            secure_token_url: secure_token_url.trim_end_matches('/').to_string(),
            state: Arc::new(state),
            session: Arc::new(Mutex::new(None)),
        }
    }

    /// POST to an `accounts:*` endpoint.
    async fn account_call<B: Serialize, T: DeserializeOwned>(
        &self,
        method: &str,
        body: &B,
    ) -> Result<T, AuthError> {
        let url = format!("{}/accounts:{}", self.identity_url, method);
        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(body)
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        check_response_json(response).await
    }

    /// Exchange the refresh token for a new ID token.
    async fn refresh(&self, refresh_token: &str) -> Result<Session, AuthError> {
        let url = format!("{}/token", self.secure_token_url);
        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await
            .map_err(|e| AuthError::Network(format!("Token refresh request failed: {}", e)))?;

        let refreshed: RefreshResponse = check_response_json(response).await?;
        Ok(Session {
            expires_at: token_expiry(&refreshed.id_token, &refreshed.expires_in),
            id_token: refreshed.id_token,
            refresh_token: refreshed.refresh_token,
        })
    }

    /// Store tokens from an auth response and publish the identity.
    async fn establish(&self, auth: AuthResponse) -> Result<Identity, AuthError> {
        let mut identity = Identity {
            uid: auth.local_id,
            email: non_empty(auth.email),
            display_name: non_empty(auth.display_name),
            photo_url: non_empty(auth.photo_url),
            email_verified: auth.email_verified.unwrap_or(false),
        };

        let session = Session {
            expires_at: token_expiry(&auth.id_token, &auth.expires_in),
            id_token: auth.id_token,
            refresh_token: auth.refresh_token,
        };

        // Password sign-in does not return the full profile.
        if identity.display_name.is_none() || identity.photo_url.is_none() {
            match self.lookup(&session.id_token).await {
                Ok(Some(profile)) => {
                    identity.display_name = identity.display_name.or(profile.display_name);
                    identity.photo_url = identity.photo_url.or(profile.photo_url);
                    identity.email_verified |= profile.email_verified;
                }
                Ok(None) => {}
                Err(e) => tracing::warn!(uid = %identity.uid, error = %e, "Account lookup failed"),
            }
        }

        *self.session.lock().await = Some(session);
        self.state.send_replace(Some(identity.clone()));
        tracing::info!(uid = %identity.uid, "Signed in");
        Ok(identity)
    }

    async fn lookup(&self, id_token: &str) -> Result<Option<Identity>, AuthError> {
        let response: LookupResponse = self
            .account_call("lookup", &serde_json::json!({ "idToken": id_token }))
            .await?;

        Ok(response.users.into_iter().next().map(|u| Identity {
            uid: u.local_id,
            email: non_empty(u.email),
            display_name: non_empty(u.display_name),
            photo_url: non_empty(u.photo_url),
            email_verified: u.email_verified.unwrap_or(false),
        }))
    }

    /// Replace the stored tokens if the update call issued new ones.
    async fn store_rotated_tokens(&self, update: UpdateResponse) {
        if let (Some(id_token), Some(refresh_token)) = (update.id_token, update.refresh_token) {
            let expires_in = update.expires_in.unwrap_or_default();
            let mut session = self.session.lock().await;
            *session = Some(Session {
                expires_at: token_expiry(&id_token, &expires_in),
                id_token,
                refresh_token,
            });
        }
    }
}

#[async_trait]
impl IdentityProvider for FirebaseIdentity {
    fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.state.subscribe()
    }

    fn current(&self) -> Option<Identity> {
        self.state.borrow().clone()
    }

    async fn id_token(&self, force_refresh: bool) -> Result<String, AuthError> {
        let margin = Duration::seconds(TOKEN_REFRESH_MARGIN_SECS);

        // Held across the refresh so concurrent callers share one exchange.
        let mut guard = self.session.lock().await;
        let session = guard.as_ref().ok_or(AuthError::NoSession)?;

        if !force_refresh && Utc::now() + margin < session.expires_at {
            return Ok(session.id_token.clone());
        }

        tracing::debug!("Refreshing ID token");
        let refreshed = self.refresh(&session.refresh_token).await?;
        let token = refreshed.id_token.clone();
        *guard = Some(refreshed);
        Ok(token)
    }

    async fn register(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let auth: AuthResponse = self
            .account_call(
                "signUp",
                &PasswordRequest {
                    email,
                    password,
                    return_secure_token: true,
                },
            )
            .await?;
        self.establish(auth).await
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let auth: AuthResponse = self
            .account_call(
                "signInWithPassword",
                &PasswordRequest {
                    email,
                    password,
                    return_secure_token: true,
                },
            )
            .await?;
        self.establish(auth).await
    }

    async fn sign_in_federated(
        &self,
        credential: &FederatedCredential,
    ) -> Result<Identity, AuthError> {
        let post_body = format!(
            "id_token={}&providerId={}",
            urlencoding::encode(&credential.id_token),
            urlencoding::encode(&credential.provider_id)
        );
        let auth: AuthResponse = self
            .account_call(
                "signInWithIdp",
                &serde_json::json!({
                    "postBody": post_body,
                    "requestUri": "http://localhost",
                    "returnIdpCredential": true,
                    "returnSecureToken": true,
                }),
            )
            .await?;

        if auth.need_confirmation.unwrap_or(false) {
            return Err(AuthError::AccountExistsWithDifferentCredential);
        }
        self.establish(auth).await
    }

    async fn update_display_name(&self, display_name: &str) -> Result<(), AuthError> {
        let id_token = self.id_token(false).await?;
        let update: UpdateResponse = self
            .account_call(
                "update",
                &serde_json::json!({
                    "idToken": id_token,
                    "displayName": display_name,
                    "returnSecureToken": false,
                }),
            )
            .await?;
        self.store_rotated_tokens(update).await;

        // A profile edit is not a session change; update without notifying.
        let name = display_name.to_string();
        self.state.send_if_modified(|state| {
            if let Some(identity) = state.as_mut() {
                identity.display_name = Some(name);
            }
            false
        });
        Ok(())
    }

    async fn reauthenticate(&self, email: &str, password: &str) -> Result<(), AuthError> {
        let uid = self.current().ok_or(AuthError::NoSession)?.uid;
        let auth: AuthResponse = self
            .account_call(
                "signInWithPassword",
                &PasswordRequest {
                    email,
                    password,
                    return_secure_token: true,
                },
            )
            .await?;

        if auth.local_id != uid {
            return Err(AuthError::InvalidCredential);
        }

        *self.session.lock().await = Some(Session {
            expires_at: token_expiry(&auth.id_token, &auth.expires_in),
            id_token: auth.id_token,
            refresh_token: auth.refresh_token,
        });
        Ok(())
    }

    async fn update_password(&self, new_password: &str) -> Result<(), AuthError> {
        let id_token = self.id_token(false).await?;
        let update: UpdateResponse = self
            .account_call(
                "update",
                &serde_json::json!({
                    "idToken": id_token,
                    "password": new_password,
                    "returnSecureToken": true,
                }),
            )
            .await?;
        self.store_rotated_tokens(update).await;
        tracing::info!("Password updated");
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        *self.session.lock().await = None;
        self.state.send_replace(None);
        tracing::info!("Signed out");
        Ok(())
    }
}

// ─── Wire types ──────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthResponse {
    local_id: String,
    id_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: String,
    email: Option<String>,
    display_name: Option<String>,
    photo_url: Option<String>,
    email_verified: Option<bool>,
    need_confirmation: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateResponse {
    id_token: Option<String>,
    refresh_token: Option<String>,
    expires_in: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupUser {
    local_id: String,
    email: Option<String>,
    display_name: Option<String>,
    photo_url: Option<String>,
    email_verified: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ExpiryClaims {
    exp: i64,
}

/// Check response status and parse the JSON body, classifying provider errors.
async fn check_response_json<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, AuthError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let error = match serde_json::from_str::<ErrorEnvelope>(&body) {
            Ok(envelope) => AuthError::from_code(&envelope.error.message),
            Err(_) => AuthError::Other(format!("HTTP {}", status.as_u16())),
        };
        tracing::warn!(status = status.as_u16(), error = %error, "Identity provider request failed");
        return Err(error);
    }

    response
        .json()
        .await
        .map_err(|e| AuthError::Other(format!("JSON parse error: {}", e)))
}

/// Token expiry from its `exp` claim, falling back to the `expiresIn` seconds.
///
/// The signature is not checked here; the document store validates tokens.
fn token_expiry(id_token: &str, expires_in: &str) -> DateTime<Utc> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;

    let from_claim = decode::<ExpiryClaims>(id_token, &DecodingKey::from_secret(&[]), &validation)
        .ok()
        .and_then(|data| DateTime::from_timestamp(data.claims.exp, 0));

    from_claim.unwrap_or_else(|| {
        let secs = expires_in.trim().parse::<i64>().unwrap_or(0);
        Utc::now() + Duration::seconds(secs)
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    #[test]
    fn test_error_code_classification() {
        assert_eq!(AuthError::from_code("EMAIL_EXISTS"), AuthError::EmailInUse);
        assert_eq!(
            AuthError::from_code("WEAK_PASSWORD : Password should be at least 6 characters"),
            AuthError::WeakPassword
        );
        assert_eq!(
            AuthError::from_code("INVALID_LOGIN_CREDENTIALS"),
            AuthError::InvalidCredential
        );
        assert_eq!(
            AuthError::from_code("SOMETHING_NEW"),
            AuthError::Other("SOMETHING_NEW".to_string())
        );
    }

    #[test]
    fn test_messages_depend_on_flow() {
        let err = AuthError::WeakPassword;
        assert_eq!(
            err.message(AuthFlow::Register),
            "Lozinka je prekratka. Koristite najmanje 6 karaktera."
        );
        assert_eq!(err.message(AuthFlow::PasswordChange), "Nova lozinka je preslaba.");

        let err = AuthError::InvalidCredential;
        assert_eq!(
            err.message(AuthFlow::PasswordChange),
            "Trenutna lozinka nije ispravna."
        );
    }

    #[test]
    fn test_unmapped_codes_fall_back() {
        let err = AuthError::Other("QUOTA_EXCEEDED".into());
        assert_eq!(
            err.message(AuthFlow::Register),
            "Došlo je do greške prilikom registracije."
        );
        assert_eq!(
            err.message(AuthFlow::PasswordChange),
            "Došlo je do greške prilikom promene lozinke."
        );
        assert_eq!(
            AuthError::Network("timeout".into()).message(AuthFlow::SignIn),
            "Problem sa mrežom. Pokušajte ponovo."
        );
    }

    #[test]
    fn test_token_expiry_reads_exp_claim() {
        let claims = serde_json::json!({"sub": "u1", "exp": 2_000_000_000_i64, "aud": "proj"});
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"anything"),
        )
        .unwrap();

        let expiry = token_expiry(&token, "3600");
        assert_eq!(expiry.timestamp(), 2_000_000_000);
    }

    #[test]
    fn test_token_expiry_falls_back_to_expires_in() {
        let before = Utc::now();
        let expiry = token_expiry("not-a-jwt", "3600");
        assert!(expiry >= before + Duration::seconds(3599));
    }
}
