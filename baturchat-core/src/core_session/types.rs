//! Core data types for the session layer

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Unix timestamp in milliseconds
///
/// Presence and profile timestamps are stamped by the store backend at
/// write time, never by the client clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct Timestamp(pub u64);

impl Timestamp {
    /// Create a timestamp representing the current time
    pub fn now() -> Self {
        let duration = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Timestamp(duration.as_millis() as u64)
    }

    /// Create a timestamp from milliseconds since epoch
    pub fn from_millis(millis: u64) -> Self {
        Timestamp(millis)
    }

    /// Get milliseconds since epoch
    pub fn as_millis(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a user
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: String) -> Self {
        UserId(id)
    }

    pub fn generate() -> Self {
        use uuid::Uuid;
        let id = Uuid::new_v4().to_string();
        UserId(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The signed-in principal, sourced from the auth provider
///
/// Loaded into memory on every auth-state event and set to absent on
/// sign-out or session expiry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Identity {
    /// Opaque unique user id
    pub user_id: UserId,

    /// Account email, unique per backend
    pub email: String,

    /// Mutable display name (empty until set)
    pub display_name: String,

    /// Mutable avatar reference; may be a URL or a large inline-encoded
    /// image payload
    pub photo_url: String,

    /// Account creation time
    pub created_at: Timestamp,
}

/// Remote liveness record, keyed by user id
///
/// `last_seen` is server-assigned at write time and advances
/// monotonically. The record is created on first authentication and never
/// deleted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PresenceRecord {
    /// Whether a live connection from this user currently exists
    /// (best-effort, not guaranteed)
    pub online: bool,

    /// Server-assigned time of the last presence write
    pub last_seen: Timestamp,
}

impl PresenceRecord {
    pub fn online(last_seen: Timestamp) -> Self {
        Self { online: true, last_seen }
    }

    pub fn offline(last_seen: Timestamp) -> Self {
        Self { online: false, last_seen }
    }
}

/// Local best-effort copy of minimal Identity fields
///
/// Written after every auth-state resolution to a signed-in identity and
/// removed when the identity becomes absent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionCacheEntry {
    pub user_id: UserId,
    pub email: String,
    pub display_name: String,
    pub photo_url: String,
}

impl SessionCacheEntry {
    /// Project an identity down to the cached fields
    pub fn from_identity(identity: &Identity) -> Self {
        Self {
            user_id: identity.user_id.clone(),
            email: identity.email.clone(),
            display_name: identity.display_name.clone(),
            photo_url: identity.photo_url.clone(),
        }
    }
}

/// Durable backend-side profile, keyed by user id under the `users`
/// namespace
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfileRecord {
    pub user_id: UserId,
    pub email: String,
    pub display_name: String,
    pub photo_url: String,
    pub bio: String,
    pub created_at: Timestamp,
    pub presence: PresenceRecord,
}

impl UserProfileRecord {
    /// Build the initial profile written at registration: empty bio,
    /// empty avatar, presence online. `created_at` and
    /// `presence.last_seen` are stamped by the store on create.
    pub fn initial(identity: &Identity) -> Self {
        Self {
            user_id: identity.user_id.clone(),
            email: identity.email.clone(),
            display_name: identity.display_name.clone(),
            photo_url: String::new(),
            bio: String::new(),
            created_at: identity.created_at,
            presence: PresenceRecord::online(Timestamp::from_millis(0)),
        }
    }
}

/// Partial profile update applied with field-level merge semantics:
/// fields left as `None` keep their current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

impl ProfileUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the display name field
    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Set the avatar reference field
    pub fn photo_url(mut self, url: impl Into<String>) -> Self {
        self.photo_url = Some(url.into());
        self
    }

    /// True if no field is set
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none() && self.photo_url.is_none()
    }
}

/// Auth-state change notification payload
#[derive(Debug, Clone, PartialEq)]
pub enum AuthEvent {
    /// A concrete identity is signed in
    SignedIn(Identity),
    /// No identity is signed in
    SignedOut,
}

/// Observable coordinator state
///
/// `loading` is true only until the first auth event has been processed,
/// then false for the life of the process.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub identity: Option<Identity>,
    pub loading: bool,
}

impl SessionSnapshot {
    /// Initial state before any auth event has been seen
    pub fn initializing() -> Self {
        Self { identity: None, loading: true }
    }

    /// True once a signed-in identity has been resolved
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }
}
