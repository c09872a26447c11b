//! Authentication operations.
//!
//! Login and register are public calls that seed the credential store on
//! success; logout clears credentials and caches unconditionally, even when
//! the remote call fails, then signals navigation.

use serde_json::Value;

use crate::api::EmasClient;
use crate::api::endpoints;
use crate::error::Result;
use crate::models::{
    AuthResponse, ChangePasswordRequest, ForgotPasswordRequest, LoginRequest,
    ProfileUpdateRequest, RegisterRequest, User,
};

impl EmasClient {
    /// Whether a credential pair is currently held (it may still need a
    /// refresh on first use).
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.store.current().is_some()
    }

    /// Log in and seed the credential store.
    ///
    /// # Errors
    ///
    /// Propagates validation failures (bad credentials) and transport
    /// errors.
    pub async fn login(&self, request: &LoginRequest) -> Result<User> {
        let auth: AuthResponse = self
            .transport
            .post_public(endpoints::AUTH_LOGIN, request)
            .await?;
        self.store.set(auth.credential())?;
        tracing::info!(user = %auth.user.email, "logged in");
        Ok(auth.user)
    }

    /// Register a new account and seed the credential store.
    ///
    /// # Errors
    ///
    /// Propagates validation failures and transport errors.
    pub async fn register(&self, request: &RegisterRequest) -> Result<User> {
        let auth: AuthResponse = self
            .transport
            .post_public(endpoints::AUTH_REGISTER, request)
            .await?;
        self.store.set(auth.credential())?;
        tracing::info!(user = %auth.user.email, "registered");
        Ok(auth.user)
    }

    /// Log out: best-effort remote call, then clear credentials and caches
    /// and signal navigation. Local teardown happens even if the remote
    /// call fails.
    pub async fn logout(&self) {
        if let Err(e) = self.transport.post_action(endpoints::AUTH_LOGOUT).await {
            tracing::warn!(error = %e, "logout call failed; clearing session anyway");
        }
        self.store.clear();
        self.clear_caches();
        self.navigator.to_login(None);
        tracing::info!("logged out");
    }

    /// Fetch the authenticated user.
    ///
    /// # Errors
    ///
    /// Propagates transport and session errors.
    pub async fn current_user(&self) -> Result<User> {
        self.transport.get(endpoints::AUTH_ME).await
    }

    /// Request a password-reset email.
    ///
    /// # Errors
    ///
    /// Propagates validation failures and transport errors.
    pub async fn forgot_password(&self, email: &str) -> Result<()> {
        let request = ForgotPasswordRequest {
            email: email.to_string(),
        };
        self.transport
            .post_public::<Value, _>(endpoints::AUTH_FORGOT_PASSWORD, &request)
            .await
            .map(|_| ())
    }

    /// Update profile fields.
    ///
    /// # Errors
    ///
    /// Propagates validation failures, session, and transport errors.
    pub async fn update_profile(&self, request: &ProfileUpdateRequest) -> Result<User> {
        self.transport.patch(endpoints::PROFILE, request).await
    }

    /// Change the account password.
    ///
    /// # Errors
    ///
    /// Propagates validation failures, session, and transport errors.
    pub async fn change_password(&self, request: &ChangePasswordRequest) -> Result<()> {
        self.transport
            .post_unit(endpoints::PROFILE_CHANGE_PASSWORD, request)
            .await
    }
}
