//! AuthProvider Trait - Abstraction over the remote auth service
//!
//! The coordinator never talks to a concrete auth backend directly; it is
//! constructed with an `AuthProvider` so that the backend can be swapped
//! for an in-memory fake in tests.
//!
//! # Architecture
//!
//! ```text
//! SessionCoordinator
//!       |
//!       v
//! AuthProvider (trait)
//!       |
//!       +---> MemoryAuthProvider (local/dev and tests)
//!       |
//!       +---> remote service adapter (out of tree)
//! ```

use crate::core_session::errors::AuthError;
use crate::core_session::types::{AuthEvent, Identity, ProfileUpdate, UserId};
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Abstraction over the remote authentication service
///
/// All calls attempt exactly once; there is no retry or timeout at this
/// layer. Timeouts are the backend client's responsibility.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Verify credentials and establish a session
    ///
    /// Resolving does not imply the auth-state event has been delivered
    /// yet; state changes arrive through [`AuthProvider::subscribe`].
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError>;

    /// Create a new account and establish a session for it
    ///
    /// Fails with [`AuthError::EmailTaken`] on duplicate email and
    /// [`AuthError::WeakPassword`] when the backend's password policy
    /// rejects the password.
    async fn create_account(&self, email: &str, password: &str) -> Result<Identity, AuthError>;

    /// Apply profile fields to the identity held by the auth service
    ///
    /// Returns the updated identity. Does not emit an auth-state event.
    async fn apply_profile_update(
        &self,
        user: &UserId,
        update: &ProfileUpdate,
    ) -> Result<Identity, AuthError>;

    /// Terminate the current session
    async fn sign_out(&self) -> Result<(), AuthError>;

    /// Ask the backend to send a password reset email
    ///
    /// Fails with [`AuthError::AccountNotFound`] when no account exists
    /// for the email.
    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError>;

    /// Subscribe to auth-state changes
    ///
    /// Contract: the channel carries one event immediately reflecting the
    /// current state, then one event per subsequent sign-in or sign-out.
    /// The subscription lives until the receiver is dropped.
    fn subscribe(&self) -> mpsc::UnboundedReceiver<AuthEvent>;
}
