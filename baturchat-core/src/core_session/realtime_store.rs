//! RealtimeStore Trait - Abstraction over the remote realtime store
//!
//! Presence and profile data live under the `users/<id>` namespace of an
//! external realtime key-value store. The store owns all timestamps:
//! `last_seen` and `created_at` are stamped at write time by the backend
//! clock, never by the client.

use crate::core_session::errors::StoreError;
use crate::core_session::types::{PresenceRecord, ProfileUpdate, UserId, UserProfileRecord};
use async_trait::async_trait;
use tokio::sync::watch;

/// Abstraction over the remote realtime store
#[async_trait]
pub trait RealtimeStore: Send + Sync {
    /// Write the presence record for a user
    ///
    /// The store assigns `last_seen` from its own clock, which advances
    /// monotonically across writes. Returns the record as written.
    async fn write_presence(
        &self,
        user: &UserId,
        online: bool,
    ) -> Result<PresenceRecord, StoreError>;

    /// Register a compensating offline write for a user
    ///
    /// The backend executes the write itself when it detects that the
    /// user's connection dropped without an explicit sign-out:
    /// exactly-once on detected disconnect, best-effort timing. The
    /// registration is never torn down under normal operation.
    async fn register_disconnect_write(&self, user: &UserId) -> Result<(), StoreError>;

    /// Create a user profile record
    ///
    /// The store stamps `created_at` and `presence.last_seen`; the
    /// caller-provided values for those fields are ignored.
    async fn create_profile(&self, profile: &UserProfileRecord) -> Result<(), StoreError>;

    /// Merge profile fields into an existing record
    ///
    /// Field-level merge: fields absent from the update keep their
    /// current value, including `bio` and the embedded presence record.
    /// Fails with [`StoreError::KeyNotFound`] when no profile exists.
    async fn apply_profile_update(
        &self,
        user: &UserId,
        update: &ProfileUpdate,
    ) -> Result<(), StoreError>;

    /// Read one profile record
    async fn get_profile(&self, user: &UserId) -> Result<Option<UserProfileRecord>, StoreError>;

    /// Read every profile under the `users` namespace
    async fn list_profiles(&self) -> Result<Vec<UserProfileRecord>, StoreError>;

    /// Subscribe to presence changes for a single user
    ///
    /// The receiver starts with the current value (`None` until the first
    /// presence write) and updates on every subsequent write, including
    /// disconnect-triggered ones.
    fn watch_presence(&self, user: &UserId) -> watch::Receiver<Option<PresenceRecord>>;
}
