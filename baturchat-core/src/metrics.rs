//! Metrics collection for session observability

use metrics::{counter, describe_counter};

/// Successful login operations
pub const SIGN_IN_TOTAL: &str = "session.sign_in.total";
/// Successful logout operations
pub const SIGN_OUT_TOTAL: &str = "session.sign_out.total";
/// Successful registrations
pub const REGISTER_TOTAL: &str = "session.register.total";
/// Auth-state events processed by the coordinator
pub const AUTH_EVENTS_TOTAL: &str = "session.auth_events.total";
/// Presence or disconnect-registration writes that failed non-fatally
pub const PRESENCE_WRITE_FAILED: &str = "session.presence_write.failed";
/// Session cache writes or removals that failed non-fatally
pub const CACHE_WRITE_FAILED: &str = "session.cache_write.failed";

/// Initialize metrics with descriptions
pub fn init_metrics() {
    describe_counter!(SIGN_IN_TOTAL, "Number of successful login operations");
    describe_counter!(SIGN_OUT_TOTAL, "Number of successful logout operations");
    describe_counter!(REGISTER_TOTAL, "Number of successful registrations");
    describe_counter!(AUTH_EVENTS_TOTAL, "Number of auth-state events processed");
    describe_counter!(
        PRESENCE_WRITE_FAILED,
        "Presence writes swallowed as non-fatal during sign-in"
    );
    describe_counter!(
        CACHE_WRITE_FAILED,
        "Session cache operations swallowed as non-fatal"
    );
}

/// Record a counter metric
pub fn record_counter(name: &'static str, value: u64) {
    counter!(name).increment(value);
}
