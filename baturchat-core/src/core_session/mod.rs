//! Core Session Layer - Identity, Presence, and Session Lifecycle
//!
//! This module owns the authenticated-identity lifecycle by coordinating
//! three external boundaries: the auth service, the realtime store
//! (presence and profiles under `users/<id>`), and the local session
//! cache.

pub mod adapters;
pub mod auth_provider;
pub mod cache;
pub mod coordinator;
pub mod directory;
pub mod errors;
pub mod realtime_store;
pub mod types;

// Re-exports
pub use auth_provider::AuthProvider;
pub use cache::{FileSessionCache, MemorySessionCache, SessionCache};
pub use coordinator::SessionCoordinator;
pub use directory::ContactDirectory;
pub use errors::{AuthError, CacheError, SessionResult, StoreError};
pub use realtime_store::RealtimeStore;
pub use types::{
    AuthEvent, Identity, PresenceRecord, ProfileUpdate, SessionCacheEntry, SessionSnapshot,
    Timestamp, UserId, UserProfileRecord,
};
