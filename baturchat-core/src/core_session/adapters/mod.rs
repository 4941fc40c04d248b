//! In-memory backend adapters
//!
//! Reference implementations of the auth and realtime store boundaries,
//! used for local development and for exercising the coordinator in tests
//! without a remote backend.

pub mod memory_auth;
pub mod memory_store;

pub use memory_auth::MemoryAuthProvider;
pub use memory_store::MemoryRealtimeStore;

use std::sync::{Arc, Mutex};

/// Shared record of backend calls in issue order
///
/// A single journal can be handed to both the auth and store adapters to
/// assert cross-backend ordering, e.g. that the offline presence write
/// happens before the sign-out call.
#[derive(Clone, Default)]
pub struct CallJournal {
    entries: Arc<Mutex<Vec<String>>>,
}

impl CallJournal {
    /// Create an empty journal
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one call record
    pub fn record(&self, entry: impl Into<String>) {
        self.entries.lock().unwrap().push(entry.into());
    }

    /// Snapshot of all recorded calls, oldest first
    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }

    /// Index of the first entry starting with the given prefix
    pub fn position_of(&self, prefix: &str) -> Option<usize> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .position(|e| e.starts_with(prefix))
    }
}
