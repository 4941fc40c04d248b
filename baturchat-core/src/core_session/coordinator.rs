//! Session & Presence Coordinator
//!
//! Single source of truth for "who is signed in" and "are they online".
//! The coordinator subscribes to the auth provider's state channel exactly
//! once for its lifetime and mirrors each transition into the realtime
//! store (presence record, disconnect-triggered offline write) and the
//! local session cache.
//!
//! # State machine
//!
//! ```text
//! Initializing (loading=true, identity=absent)
//!      |
//!      v  first auth event
//! Unauthenticated (loading=false) <----> Authenticated (loading=false)
//! ```
//!
//! Transitions are driven exclusively by auth events, which are processed
//! strictly sequentially by a single listener task. Operations never
//! mutate the snapshot directly; they only talk to the backends and let
//! the resulting event drive the state.

use crate::core_session::auth_provider::AuthProvider;
use crate::core_session::cache::SessionCache;
use crate::core_session::errors::{AuthError, SessionResult};
use crate::core_session::realtime_store::RealtimeStore;
use crate::core_session::types::{
    AuthEvent, Identity, ProfileUpdate, SessionCacheEntry, SessionSnapshot, UserProfileRecord,
};
use crate::metrics::{self, record_counter};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Session & Presence Coordinator
///
/// Constructed explicitly with its backends and passed by reference to
/// every consumer; there is no ambient singleton.
pub struct SessionCoordinator {
    auth: Arc<dyn AuthProvider>,
    store: Arc<dyn RealtimeStore>,
    cache: Arc<dyn SessionCache>,

    /// Observable state; written only by the listener task
    state: Arc<watch::Sender<SessionSnapshot>>,

    /// Listener task handle, taken on shutdown
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl SessionCoordinator {
    /// Subscribe to the auth provider and start the listener task
    ///
    /// The subscription is taken exactly once and released only when the
    /// coordinator is shut down or dropped.
    pub fn start(
        auth: Arc<dyn AuthProvider>,
        store: Arc<dyn RealtimeStore>,
        cache: Arc<dyn SessionCache>,
    ) -> Arc<Self> {
        info!("Starting session coordinator");

        let (tx, _rx) = watch::channel(SessionSnapshot::initializing());
        let state = Arc::new(tx);

        let mut events = auth.subscribe();
        let listener = tokio::spawn({
            let store = store.clone();
            let cache = cache.clone();
            let state = state.clone();
            async move {
                while let Some(event) = events.recv().await {
                    Self::apply_event(store.as_ref(), cache.as_ref(), &state, event).await;
                }
                debug!("Auth event channel closed");
            }
        });

        Arc::new(Self {
            auth,
            store,
            cache,
            state,
            listener: Mutex::new(Some(listener)),
        })
    }

    /// Process one auth-state event
    ///
    /// Sign-in side effects run sequentially and are each independently
    /// fallible: a failed presence or cache write is logged and the
    /// sign-in still completes.
    async fn apply_event(
        store: &dyn RealtimeStore,
        cache: &dyn SessionCache,
        state: &watch::Sender<SessionSnapshot>,
        event: AuthEvent,
    ) {
        record_counter(metrics::AUTH_EVENTS_TOTAL, 1);

        match event {
            AuthEvent::SignedIn(identity) => {
                info!(user_id = %identity.user_id, "Auth state changed: signed in");

                if let Err(e) = store.write_presence(&identity.user_id, true).await {
                    record_counter(metrics::PRESENCE_WRITE_FAILED, 1);
                    warn!(
                        user_id = %identity.user_id,
                        error = %e,
                        "Presence write failed; continuing sign-in"
                    );
                }

                if let Err(e) = store.register_disconnect_write(&identity.user_id).await {
                    record_counter(metrics::PRESENCE_WRITE_FAILED, 1);
                    warn!(
                        user_id = %identity.user_id,
                        error = %e,
                        "Disconnect-write registration failed; continuing sign-in"
                    );
                }

                let entry = SessionCacheEntry::from_identity(&identity);
                if let Err(e) = cache.put(&entry) {
                    record_counter(metrics::CACHE_WRITE_FAILED, 1);
                    warn!(
                        user_id = %identity.user_id,
                        error = %e,
                        "Session cache write failed; continuing sign-in"
                    );
                }

                state.send_replace(SessionSnapshot {
                    identity: Some(identity),
                    loading: false,
                });
            }
            AuthEvent::SignedOut => {
                info!("Auth state changed: signed out");

                if let Err(e) = cache.remove() {
                    record_counter(metrics::CACHE_WRITE_FAILED, 1);
                    warn!(error = %e, "Session cache removal failed");
                }

                state.send_replace(SessionSnapshot { identity: None, loading: false });
            }
        }
    }

    /// Subscribe to coordinator state changes
    pub fn watch(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    /// Currently signed-in identity, if any
    pub fn identity(&self) -> Option<Identity> {
        self.state.borrow().identity.clone()
    }

    /// True until the first auth event has been processed
    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    /// Sign in with email and password
    ///
    /// Resolves once the backend accepts the credentials; the transition
    /// to Authenticated arrives through the event channel, not through
    /// this call.
    pub async fn login(&self, email: &str, password: &str) -> SessionResult<()> {
        info!(email = %email, "Login requested");

        self.auth.sign_in(email, password).await?;
        record_counter(metrics::SIGN_IN_TOTAL, 1);

        Ok(())
    }

    /// Create an account, set its display name, and create the backing
    /// profile record
    ///
    /// Known gap: if profile creation fails after the account was
    /// created, the account remains without a backing profile record. The
    /// error is propagated and nothing is rolled back.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> SessionResult<()> {
        info!(email = %email, "Registration requested");

        let identity = self.auth.create_account(email, password).await?;
        let identity = self
            .auth
            .apply_profile_update(
                &identity.user_id,
                &ProfileUpdate::new().display_name(display_name),
            )
            .await?;

        let profile = UserProfileRecord::initial(&identity);
        self.store.create_profile(&profile).await?;

        record_counter(metrics::REGISTER_TOTAL, 1);
        info!(user_id = %identity.user_id, "Account registered");

        Ok(())
    }

    /// Mark the user offline, then terminate the session
    ///
    /// The offline presence write happens before, and independently of,
    /// the sign-out call. A sign-out failure after a successful presence
    /// write leaves the identity signed in with presence already offline;
    /// either failure propagates.
    pub async fn logout(&self) -> SessionResult<()> {
        info!("Logout requested");

        if let Some(identity) = self.identity() {
            self.store.write_presence(&identity.user_id, false).await?;
        }
        self.auth.sign_out().await?;

        record_counter(metrics::SIGN_OUT_TOTAL, 1);
        Ok(())
    }

    /// Ask the backend to send a password reset email
    ///
    /// Coordinator state is untouched regardless of outcome.
    pub async fn reset_password(&self, email: &str) -> SessionResult<()> {
        info!(email = %email, "Password reset requested");

        self.auth.send_password_reset(email).await
    }

    /// Apply profile fields to the auth identity and merge them into the
    /// profile record
    ///
    /// Merge semantics: fields absent from the update keep their stored
    /// value, so a display-name-only edit cannot erase the bio or the
    /// embedded presence record. Returns the updated identity; the
    /// observable snapshot refreshes on the next auth event.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> SessionResult<Identity> {
        let identity = self.identity().ok_or(AuthError::NotSignedIn)?;
        info!(user_id = %identity.user_id, "Profile update requested");

        let identity = self.auth.apply_profile_update(&identity.user_id, update).await?;
        self.store.apply_profile_update(&identity.user_id, update).await?;

        Ok(identity)
    }

    /// Stop the listener task and release the auth subscription
    pub fn shutdown(&self) {
        if let Some(handle) = self.listener.lock().unwrap().take() {
            debug!("Shutting down session coordinator");
            handle.abort();
        }
    }
}

impl Drop for SessionCoordinator {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_session::adapters::{MemoryAuthProvider, MemoryRealtimeStore};
    use crate::core_session::cache::MemorySessionCache;

    fn build() -> (Arc<SessionCoordinator>, Arc<MemoryRealtimeStore>, Arc<MemorySessionCache>) {
        let auth = Arc::new(MemoryAuthProvider::new());
        let store = Arc::new(MemoryRealtimeStore::new());
        let cache = Arc::new(MemorySessionCache::new());
        let coordinator =
            SessionCoordinator::start(auth, store.clone(), cache.clone());
        (coordinator, store, cache)
    }

    #[tokio::test]
    async fn test_initial_event_resolves_loading() {
        let (coordinator, _store, _cache) = build();
        let mut rx = coordinator.watch();

        let snapshot = rx.wait_for(|s| !s.loading).await.unwrap().clone();
        assert!(snapshot.identity.is_none());
        assert!(!coordinator.is_loading());
    }

    #[tokio::test]
    async fn test_register_reaches_authenticated() {
        let (coordinator, _store, _cache) = build();
        let mut rx = coordinator.watch();

        coordinator.register("a@b.com", "secret1", "Alice").await.unwrap();

        let snapshot = rx.wait_for(|s| s.is_authenticated()).await.unwrap().clone();
        assert_eq!(snapshot.identity.unwrap().email, "a@b.com");
    }

    #[tokio::test]
    async fn test_presence_failure_does_not_block_sign_in() {
        let (coordinator, store, _cache) = build();
        let mut rx = coordinator.watch();
        rx.wait_for(|s| !s.loading).await.unwrap();

        coordinator.register("a@b.com", "secret1", "Alice").await.unwrap();
        rx.wait_for(|s| s.is_authenticated()).await.unwrap();
        coordinator.logout().await.unwrap();
        rx.wait_for(|s| !s.is_authenticated()).await.unwrap();

        store.fail_presence_writes(true);
        coordinator.login("a@b.com", "secret1").await.unwrap();

        let snapshot = rx.wait_for(|s| s.is_authenticated()).await.unwrap().clone();
        assert!(snapshot.identity.is_some(), "sign-in completes despite presence failure");
    }

    #[tokio::test]
    async fn test_logout_without_identity_still_signs_out() {
        let (coordinator, _store, _cache) = build();
        let mut rx = coordinator.watch();
        rx.wait_for(|s| !s.loading).await.unwrap();

        // No presence write possible, but the sign-out call still goes
        // through, mirroring the absent-identity path.
        coordinator.logout().await.unwrap();
        assert!(coordinator.identity().is_none());
    }

    #[tokio::test]
    async fn test_update_profile_requires_identity() {
        let (coordinator, _store, _cache) = build();
        let mut rx = coordinator.watch();
        rx.wait_for(|s| !s.loading).await.unwrap();

        let err = coordinator
            .update_profile(&ProfileUpdate::new().display_name("Bob"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::NotSignedIn));
    }
}
