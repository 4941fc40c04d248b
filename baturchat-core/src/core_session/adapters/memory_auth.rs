//! In-memory AuthProvider
//!
//! Keeps accounts and the current session in process memory and delivers
//! auth-state events over per-subscriber channels. Password policy: at
//! least six characters, standing in for the policy a remote service
//! would own.

use super::CallJournal;
use crate::core_session::auth_provider::AuthProvider;
use crate::core_session::errors::AuthError;
use crate::core_session::types::{AuthEvent, Identity, ProfileUpdate, Timestamp, UserId};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::mpsc;

/// Minimum password length accepted by this backend
const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone)]
struct AccountRecord {
    user_id: UserId,
    email: String,
    password: String,
    display_name: String,
    photo_url: String,
    created_at: Timestamp,
}

impl AccountRecord {
    fn identity(&self) -> Identity {
        Identity {
            user_id: self.user_id.clone(),
            email: self.email.clone(),
            display_name: self.display_name.clone(),
            photo_url: self.photo_url.clone(),
            created_at: self.created_at,
        }
    }
}

/// In-memory auth backend
pub struct MemoryAuthProvider {
    /// Accounts keyed by email
    accounts: Mutex<HashMap<String, AccountRecord>>,

    /// Currently signed-in identity, if any
    current: Mutex<Option<Identity>>,

    /// Live auth-state subscribers
    subscribers: Mutex<Vec<mpsc::UnboundedSender<AuthEvent>>>,

    journal: CallJournal,
}

impl MemoryAuthProvider {
    /// Create an empty provider
    pub fn new() -> Self {
        Self::with_journal(CallJournal::new())
    }

    /// Create a provider recording calls into the given journal
    pub fn with_journal(journal: CallJournal) -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
            current: Mutex::new(None),
            subscribers: Mutex::new(Vec::new()),
            journal,
        }
    }

    /// Deliver an event to every live subscriber
    fn broadcast(&self, event: AuthEvent) {
        self.subscribers
            .lock()
            .unwrap()
            .retain(|tx| tx.send(event.clone()).is_ok());
    }

    fn current_event(&self) -> AuthEvent {
        match self.current.lock().unwrap().as_ref() {
            Some(identity) => AuthEvent::SignedIn(identity.clone()),
            None => AuthEvent::SignedOut,
        }
    }
}

impl Default for MemoryAuthProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthProvider for MemoryAuthProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        self.journal.record(format!("auth.sign_in email={}", email));

        let identity = {
            let accounts = self.accounts.lock().unwrap();
            let account = accounts
                .get(email)
                .ok_or_else(|| AuthError::AccountNotFound { email: email.to_string() })?;

            if account.password != password {
                return Err(AuthError::InvalidCredentials);
            }
            account.identity()
        };

        *self.current.lock().unwrap() = Some(identity.clone());
        self.broadcast(AuthEvent::SignedIn(identity.clone()));

        Ok(identity)
    }

    async fn create_account(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        self.journal.record(format!("auth.create_account email={}", email));

        if password.len() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword(format!(
                "password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        let identity = {
            let mut accounts = self.accounts.lock().unwrap();
            if accounts.contains_key(email) {
                return Err(AuthError::EmailTaken { email: email.to_string() });
            }

            let record = AccountRecord {
                user_id: UserId::generate(),
                email: email.to_string(),
                password: password.to_string(),
                display_name: String::new(),
                photo_url: String::new(),
                created_at: Timestamp::now(),
            };
            let identity = record.identity();
            accounts.insert(email.to_string(), record);
            identity
        };

        *self.current.lock().unwrap() = Some(identity.clone());
        self.broadcast(AuthEvent::SignedIn(identity.clone()));

        Ok(identity)
    }

    async fn apply_profile_update(
        &self,
        user: &UserId,
        update: &ProfileUpdate,
    ) -> Result<Identity, AuthError> {
        self.journal.record(format!("auth.apply_profile_update user={}", user));

        let identity = {
            let mut accounts = self.accounts.lock().unwrap();
            let account = accounts
                .values_mut()
                .find(|a| &a.user_id == user)
                .ok_or_else(|| AuthError::Backend(format!("unknown user: {}", user)))?;

            if let Some(name) = &update.display_name {
                account.display_name = name.clone();
            }
            if let Some(url) = &update.photo_url {
                account.photo_url = url.clone();
            }
            account.identity()
        };

        // Keep the current session in step, but do not emit an auth-state
        // event: profile edits are not sign-in/sign-out transitions.
        let mut current = self.current.lock().unwrap();
        if current.as_ref().map(|i| &i.user_id) == Some(user) {
            *current = Some(identity.clone());
        }

        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.journal.record("auth.sign_out");

        *self.current.lock().unwrap() = None;
        self.broadcast(AuthEvent::SignedOut);

        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError> {
        self.journal.record(format!("auth.send_password_reset email={}", email));

        let accounts = self.accounts.lock().unwrap();
        if !accounts.contains_key(email) {
            return Err(AuthError::AccountNotFound { email: email.to_string() });
        }

        Ok(())
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<AuthEvent> {
        let (tx, rx) = mpsc::unbounded_channel();

        // Seed and register under the subscribers lock: a transition that
        // lands mid-subscribe is either captured in the seed event or
        // delivered by broadcast, never dropped.
        let mut subscribers = self.subscribers.lock().unwrap();
        let _ = tx.send(self.current_event());
        subscribers.push(tx);

        rx
    }
}
