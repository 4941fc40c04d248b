//! BaturChat session core
//!
//! The session and presence layer of the BaturChat application: the
//! [`core_session::SessionCoordinator`], the boundary traits it consumes,
//! in-memory reference backends, configuration, logging, and metrics.

pub mod config;
pub mod core_session;
pub mod logging;
pub mod metrics;

pub use config::Config;
pub use core_session::{ContactDirectory, SessionCoordinator};
pub use logging::{init_logging, LogLevel};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        // Ensure the main exports are accessible
        let _ = LogLevel::Info;
        let _ = Config::default();
    }
}
