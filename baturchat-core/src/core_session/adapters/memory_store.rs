//! In-memory RealtimeStore
//!
//! Holds profiles and presence in process memory with a monotonic server
//! clock. Registered disconnect writes are executed by
//! [`MemoryRealtimeStore::simulate_disconnect`], standing in for the
//! backend detecting a dropped connection.

use super::CallJournal;
use crate::core_session::errors::StoreError;
use crate::core_session::realtime_store::RealtimeStore;
use crate::core_session::types::{
    PresenceRecord, ProfileUpdate, Timestamp, UserId, UserProfileRecord,
};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tokio::sync::watch;

/// In-memory realtime store
pub struct MemoryRealtimeStore {
    /// Profile records keyed by user id
    profiles: Mutex<HashMap<UserId, UserProfileRecord>>,

    /// Presence records keyed by user id; never removed once created
    presence: Mutex<HashMap<UserId, PresenceRecord>>,

    /// Users with a registered disconnect-triggered offline write
    disconnect_hooks: Mutex<HashSet<UserId>>,

    /// Per-key presence watchers
    watchers: Mutex<HashMap<UserId, watch::Sender<Option<PresenceRecord>>>>,

    /// Last issued server timestamp, in milliseconds
    clock: Mutex<u64>,

    /// Failure injection for presence writes
    fail_presence_writes: AtomicBool,

    /// Failure injection for profile creates
    fail_profile_creates: AtomicBool,

    journal: CallJournal,
}

impl MemoryRealtimeStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::with_journal(CallJournal::new())
    }

    /// Create a store recording calls into the given journal
    pub fn with_journal(journal: CallJournal) -> Self {
        Self {
            profiles: Mutex::new(HashMap::new()),
            presence: Mutex::new(HashMap::new()),
            disconnect_hooks: Mutex::new(HashSet::new()),
            watchers: Mutex::new(HashMap::new()),
            clock: Mutex::new(0),
            fail_presence_writes: AtomicBool::new(false),
            fail_profile_creates: AtomicBool::new(false),
            journal,
        }
    }

    /// Make subsequent presence writes fail
    pub fn fail_presence_writes(&self, fail: bool) {
        self.fail_presence_writes.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent profile creates fail
    pub fn fail_profile_creates(&self, fail: bool) {
        self.fail_profile_creates.store(fail, Ordering::SeqCst);
    }

    /// Next server timestamp: wall clock, but strictly after the last
    /// issued one
    fn server_now(&self) -> Timestamp {
        let mut last = self.clock.lock().unwrap();
        let now = Timestamp::now().as_millis().max(*last + 1);
        *last = now;
        Timestamp::from_millis(now)
    }

    /// Apply a presence record and notify watchers
    fn store_presence(&self, user: &UserId, record: PresenceRecord) {
        self.presence.lock().unwrap().insert(user.clone(), record);

        if let Some(profile) = self.profiles.lock().unwrap().get_mut(user) {
            profile.presence = record;
        }

        if let Some(tx) = self.watchers.lock().unwrap().get(user) {
            let _ = tx.send(Some(record));
        }
    }

    /// Execute every registered disconnect write, as the backend would on
    /// detecting a dropped connection
    pub fn simulate_disconnect(&self) {
        let users: Vec<UserId> = self.disconnect_hooks.lock().unwrap().drain().collect();

        for user in users {
            self.journal.record(format!("store.disconnect_write user={}", user));
            let record = PresenceRecord::offline(self.server_now());
            self.store_presence(&user, record);
        }
    }

    fn with_presence(&self, mut profile: UserProfileRecord) -> UserProfileRecord {
        if let Some(record) = self.presence.lock().unwrap().get(&profile.user_id) {
            profile.presence = *record;
        }
        profile
    }
}

impl Default for MemoryRealtimeStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RealtimeStore for MemoryRealtimeStore {
    async fn write_presence(
        &self,
        user: &UserId,
        online: bool,
    ) -> Result<PresenceRecord, StoreError> {
        self.journal
            .record(format!("store.write_presence user={} online={}", user, online));

        if self.fail_presence_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("presence write rejected".to_string()));
        }

        let record = PresenceRecord { online, last_seen: self.server_now() };
        self.store_presence(user, record);

        Ok(record)
    }

    async fn register_disconnect_write(&self, user: &UserId) -> Result<(), StoreError> {
        self.journal.record(format!("store.register_disconnect user={}", user));

        self.disconnect_hooks.lock().unwrap().insert(user.clone());
        Ok(())
    }

    async fn create_profile(&self, profile: &UserProfileRecord) -> Result<(), StoreError> {
        self.journal
            .record(format!("store.create_profile user={}", profile.user_id));

        if self.fail_profile_creates.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("profile create rejected".to_string()));
        }

        let mut stored = profile.clone();
        stored.created_at = self.server_now();
        stored.presence.last_seen = self.server_now();

        let presence = stored.presence;
        self.profiles
            .lock()
            .unwrap()
            .insert(stored.user_id.clone(), stored.clone());
        self.store_presence(&stored.user_id, presence);

        Ok(())
    }

    async fn apply_profile_update(
        &self,
        user: &UserId,
        update: &ProfileUpdate,
    ) -> Result<(), StoreError> {
        self.journal
            .record(format!("store.apply_profile_update user={}", user));

        let mut profiles = self.profiles.lock().unwrap();
        let profile = profiles
            .get_mut(user)
            .ok_or_else(|| StoreError::KeyNotFound(format!("users/{}", user)))?;

        if let Some(name) = &update.display_name {
            profile.display_name = name.clone();
        }
        if let Some(url) = &update.photo_url {
            profile.photo_url = url.clone();
        }

        Ok(())
    }

    async fn get_profile(&self, user: &UserId) -> Result<Option<UserProfileRecord>, StoreError> {
        let profile = self.profiles.lock().unwrap().get(user).cloned();
        Ok(profile.map(|p| self.with_presence(p)))
    }

    async fn list_profiles(&self) -> Result<Vec<UserProfileRecord>, StoreError> {
        let profiles: Vec<UserProfileRecord> =
            self.profiles.lock().unwrap().values().cloned().collect();
        Ok(profiles.into_iter().map(|p| self.with_presence(p)).collect())
    }

    fn watch_presence(&self, user: &UserId) -> watch::Receiver<Option<PresenceRecord>> {
        let mut watchers = self.watchers.lock().unwrap();
        let tx = watchers.entry(user.clone()).or_insert_with(|| {
            let current = self.presence.lock().unwrap().get(user).copied();
            watch::channel(current).0
        });
        tx.subscribe()
    }
}
