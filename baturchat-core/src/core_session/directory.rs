//! Contact directory
//!
//! Read-side view over the `users` namespace: every profile except the
//! viewer's own, plus presence subscriptions for individual contacts.

use crate::core_session::errors::StoreError;
use crate::core_session::realtime_store::RealtimeStore;
use crate::core_session::types::{PresenceRecord, UserId, UserProfileRecord};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

/// Contact directory backed by the realtime store
pub struct ContactDirectory {
    store: Arc<dyn RealtimeStore>,
}

impl ContactDirectory {
    /// Create a directory over the given store
    pub fn new(store: Arc<dyn RealtimeStore>) -> Self {
        Self { store }
    }

    /// List every user except the viewer
    ///
    /// Reads the whole `users` namespace; the viewer's own id is filtered
    /// out client-side.
    pub async fn list_contacts(
        &self,
        viewer: &UserId,
    ) -> Result<Vec<UserProfileRecord>, StoreError> {
        let profiles = self.store.list_profiles().await?;
        let contacts: Vec<UserProfileRecord> = profiles
            .into_iter()
            .filter(|p| &p.user_id != viewer)
            .collect();

        debug!(viewer = %viewer, count = contacts.len(), "Listed contacts");
        Ok(contacts)
    }

    /// Subscribe to one contact's presence
    pub fn watch_presence(&self, user: &UserId) -> watch::Receiver<Option<PresenceRecord>> {
        self.store.watch_presence(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_session::adapters::MemoryRealtimeStore;
    use crate::core_session::types::{Identity, Timestamp};

    fn profile(id: &str) -> UserProfileRecord {
        UserProfileRecord::initial(&Identity {
            user_id: UserId::new(id.to_string()),
            email: format!("{}@b.com", id),
            display_name: id.to_string(),
            photo_url: String::new(),
            created_at: Timestamp::from_millis(0),
        })
    }

    #[tokio::test]
    async fn test_list_contacts_filters_viewer() {
        let store = Arc::new(MemoryRealtimeStore::new());
        store.create_profile(&profile("alice")).await.unwrap();
        store.create_profile(&profile("bob")).await.unwrap();
        store.create_profile(&profile("carol")).await.unwrap();

        let directory = ContactDirectory::new(store);
        let contacts = directory
            .list_contacts(&UserId::new("bob".to_string()))
            .await
            .unwrap();

        assert_eq!(contacts.len(), 2);
        assert!(contacts.iter().all(|p| p.user_id.as_str() != "bob"));
    }

    #[tokio::test]
    async fn test_watch_contact_presence() {
        let store = Arc::new(MemoryRealtimeStore::new());
        let directory = ContactDirectory::new(store.clone());

        let alice = UserId::new("alice".to_string());
        let mut rx = directory.watch_presence(&alice);

        store.write_presence(&alice, true).await.unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow().unwrap().online);
    }
}
