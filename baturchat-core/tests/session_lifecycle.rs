//! End-to-end session lifecycle tests
//!
//! Drives the coordinator against the in-memory backends and checks the
//! observable properties of the auth/presence lifecycle.

use baturchat_core::core_session::adapters::{
    CallJournal, MemoryAuthProvider, MemoryRealtimeStore,
};
use baturchat_core::core_session::{
    AuthError, AuthProvider, ContactDirectory, MemorySessionCache, ProfileUpdate, RealtimeStore,
    SessionCache, SessionCacheEntry, SessionCoordinator,
};
use std::sync::Arc;

struct Harness {
    coordinator: Arc<SessionCoordinator>,
    auth: Arc<MemoryAuthProvider>,
    store: Arc<MemoryRealtimeStore>,
    cache: Arc<MemorySessionCache>,
    journal: CallJournal,
}

fn harness() -> Harness {
    let journal = CallJournal::new();
    let auth = Arc::new(MemoryAuthProvider::with_journal(journal.clone()));
    let store = Arc::new(MemoryRealtimeStore::with_journal(journal.clone()));
    let cache = Arc::new(MemorySessionCache::new());
    let coordinator = SessionCoordinator::start(auth.clone(), store.clone(), cache.clone());
    Harness { coordinator, auth, store, cache, journal }
}

#[tokio::test]
async fn loading_latches_false_after_first_event() {
    let h = harness();
    let mut rx = h.coordinator.watch();

    rx.wait_for(|s| !s.loading).await.unwrap();

    // Every later transition keeps loading false, permanently.
    h.coordinator.register("a@b.com", "secret1", "Alice").await.unwrap();
    let snapshot = rx.wait_for(|s| s.is_authenticated()).await.unwrap().clone();
    assert!(!snapshot.loading);

    h.coordinator.logout().await.unwrap();
    let snapshot = rx.wait_for(|s| !s.is_authenticated()).await.unwrap().clone();
    assert!(!snapshot.loading);

    h.coordinator.login("a@b.com", "secret1").await.unwrap();
    let snapshot = rx.wait_for(|s| s.is_authenticated()).await.unwrap().clone();
    assert!(!snapshot.loading);
}

#[tokio::test]
async fn cache_entry_tracks_identity() {
    let h = harness();
    let mut rx = h.coordinator.watch();

    h.coordinator.register("a@b.com", "secret1", "Alice").await.unwrap();
    let snapshot = rx.wait_for(|s| s.is_authenticated()).await.unwrap().clone();
    let identity = snapshot.identity.unwrap();

    let entry = h.cache.get().unwrap().expect("cache entry after sign-in");
    assert_eq!(entry, SessionCacheEntry::from_identity(&identity));

    h.coordinator.logout().await.unwrap();
    rx.wait_for(|s| !s.is_authenticated()).await.unwrap();

    assert!(h.cache.get().unwrap().is_none(), "cache removed after sign-out");
}

#[tokio::test]
async fn register_creates_initial_profile() {
    let h = harness();
    let mut rx = h.coordinator.watch();

    h.coordinator.register("a@b.com", "secret1", "Alice").await.unwrap();
    let snapshot = rx.wait_for(|s| s.is_authenticated()).await.unwrap().clone();
    let user_id = snapshot.identity.unwrap().user_id;

    let profile = h.store.get_profile(&user_id).await.unwrap().expect("profile record");
    assert_eq!(profile.display_name, "Alice");
    assert_eq!(profile.bio, "");
    assert_eq!(profile.photo_url, "");
    assert!(profile.presence.online);
    assert!(profile.created_at.as_millis() > 0, "created_at stamped by the store");
}

#[tokio::test]
async fn register_propagates_profile_creation_failure() {
    let h = harness();

    h.store.fail_profile_creates(true);
    let err = h.coordinator.register("a@b.com", "secret1", "Alice").await.unwrap_err();
    assert!(matches!(err, AuthError::Backend(_)));

    // The account exists without a backing profile record; nothing is
    // rolled back.
    h.store.fail_profile_creates(false);
    assert!(h.auth.sign_in("a@b.com", "secret1").await.is_ok());
}

#[tokio::test]
async fn logout_writes_offline_presence_before_sign_out() {
    let h = harness();
    let mut rx = h.coordinator.watch();

    h.coordinator.register("a@b.com", "secret1", "Alice").await.unwrap();
    let snapshot = rx.wait_for(|s| s.is_authenticated()).await.unwrap().clone();
    let user_id = snapshot.identity.unwrap().user_id;

    h.coordinator.logout().await.unwrap();

    let offline_write = h
        .journal
        .position_of(&format!("store.write_presence user={} online=false", user_id))
        .expect("offline presence write recorded");
    let sign_out = h.journal.position_of("auth.sign_out").expect("sign-out recorded");
    assert!(
        offline_write < sign_out,
        "offline write must be issued before sign-out: {:?}",
        h.journal.entries()
    );

    let profile = h.store.get_profile(&user_id).await.unwrap().unwrap();
    assert!(!profile.presence.online);
}

#[tokio::test]
async fn display_name_edit_preserves_bio() {
    let h = harness();
    let mut rx = h.coordinator.watch();

    h.coordinator.register("a@b.com", "secret1", "Alice").await.unwrap();
    let snapshot = rx.wait_for(|s| s.is_authenticated()).await.unwrap().clone();
    let user_id = snapshot.identity.unwrap().user_id;

    // Bio edited out of band, as the profile screen would.
    let mut profile = h.store.get_profile(&user_id).await.unwrap().unwrap();
    profile.bio = "exploring".to_string();
    h.store.create_profile(&profile).await.unwrap();

    let updated = h
        .coordinator
        .update_profile(&ProfileUpdate::new().display_name("Bob"))
        .await
        .unwrap();
    assert_eq!(updated.display_name, "Bob");

    let profile = h.store.get_profile(&user_id).await.unwrap().unwrap();
    assert_eq!(profile.display_name, "Bob");
    assert_eq!(profile.bio, "exploring", "merge keeps fields absent from the update");
    assert!(profile.presence.online, "presence survives a profile edit");
}

#[tokio::test]
async fn concurrent_logins_converge_on_one_identity() {
    let h = harness();
    let mut rx = h.coordinator.watch();

    h.coordinator.register("a@b.com", "secret1", "Alice").await.unwrap();
    rx.wait_for(|s| s.is_authenticated()).await.unwrap();
    h.coordinator.logout().await.unwrap();
    rx.wait_for(|s| !s.is_authenticated()).await.unwrap();

    let (first, second) = futures::join!(
        h.coordinator.login("a@b.com", "secret1"),
        h.coordinator.login("a@b.com", "secret1"),
    );
    first.unwrap();
    second.unwrap();

    let snapshot = rx.wait_for(|s| s.is_authenticated()).await.unwrap().clone();
    assert_eq!(snapshot.identity.unwrap().email, "a@b.com");
}

#[tokio::test]
async fn reset_password_failure_leaves_state_unchanged() {
    let h = harness();
    let mut rx = h.coordinator.watch();
    rx.wait_for(|s| !s.loading).await.unwrap();

    let before = rx.borrow().clone();
    let err = h.coordinator.reset_password("unknown@nowhere.com").await.unwrap_err();
    assert!(matches!(err, AuthError::AccountNotFound { .. }));

    assert_eq!(*rx.borrow(), before);
    assert!(h.cache.get().unwrap().is_none());
}

#[tokio::test]
async fn disconnect_marks_user_offline() {
    let h = harness();
    let mut rx = h.coordinator.watch();

    h.coordinator.register("a@b.com", "secret1", "Alice").await.unwrap();
    let snapshot = rx.wait_for(|s| s.is_authenticated()).await.unwrap().clone();
    let user_id = snapshot.identity.unwrap().user_id;

    let mut presence = h.store.watch_presence(&user_id);
    presence.wait_for(|p| matches!(p, Some(p) if p.online)).await.unwrap();
    let online_seen = presence.borrow().unwrap().last_seen;

    // Connection drop without explicit logout: the registered
    // compensating write fires on the backend side.
    h.store.simulate_disconnect();

    let record = *presence.wait_for(|p| matches!(p, Some(p) if !p.online)).await.unwrap();
    let record = record.unwrap();
    assert!(record.last_seen > online_seen, "last_seen advances at write time");
}

#[tokio::test]
async fn contacts_exclude_the_viewer() {
    let h = harness();
    let mut rx = h.coordinator.watch();

    h.coordinator.register("alice@b.com", "secret1", "Alice").await.unwrap();
    rx.wait_for(|s| s.is_authenticated()).await.unwrap();
    h.coordinator.logout().await.unwrap();
    rx.wait_for(|s| !s.is_authenticated()).await.unwrap();

    h.coordinator.register("bob@b.com", "secret1", "Bob").await.unwrap();
    let snapshot = rx.wait_for(|s| s.is_authenticated()).await.unwrap().clone();
    let bob = snapshot.identity.unwrap().user_id;

    let directory = ContactDirectory::new(h.store.clone() as Arc<dyn RealtimeStore>);
    let contacts = directory.list_contacts(&bob).await.unwrap();

    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0].display_name, "Alice");
}

#[tokio::test]
async fn shutdown_stops_processing_events() {
    let h = harness();
    let mut rx = h.coordinator.watch();
    rx.wait_for(|s| !s.loading).await.unwrap();

    h.coordinator.shutdown();

    // Events delivered after teardown no longer reach the snapshot.
    h.auth.create_account("x@y.com", "secret1").await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    let snapshot = rx.borrow().clone();
    assert!(snapshot.identity.is_none());
}
