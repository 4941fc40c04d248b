//! Error types for the session layer

use thiserror::Error;

/// Result type for coordinator operations
pub type SessionResult<T> = Result<T, AuthError>;

/// Errors surfaced to callers of the coordinator operations
///
/// These carry the backend-provided message and are recoverable by retry
/// with corrected input.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Password did not match the account
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// No account exists for the given email
    #[error("No account found for {email}")]
    AccountNotFound { email: String },

    /// An account with this email already exists
    #[error("Email already in use: {email}")]
    EmailTaken { email: String },

    /// Password rejected by the backend's policy
    #[error("Weak password: {0}")]
    WeakPassword(String),

    /// Backend unreachable
    #[error("Network error: {0}")]
    Network(String),

    /// Any other backend-reported failure
    #[error("Auth backend error: {0}")]
    Backend(String),

    /// Operation requires a signed-in identity
    #[error("No user is signed in")]
    NotSignedIn,
}

/// Errors from the realtime store boundary
///
/// Non-fatal when raised from sign-in side effects (logged, sign-in still
/// completes); fatal from logout, register and profile updates.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("Store backend error: {0}")]
    Backend(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Store disconnected: {0}")]
    Disconnected(String),
}

/// Errors from the local session cache
///
/// Always non-fatal from the coordinator's point of view.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for CacheError {
    fn from(e: serde_json::Error) -> Self {
        CacheError::Serialization(e.to_string())
    }
}

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        AuthError::Backend(e.to_string())
    }
}
