use anyhow::Result;
use baturchat_core::config::Config;
use baturchat_core::core_session::adapters::{MemoryAuthProvider, MemoryRealtimeStore};
use baturchat_core::core_session::{
    ContactDirectory, FileSessionCache, ProfileUpdate, SessionCoordinator,
};
use baturchat_core::logging::{init_logging_with_config, LogConfig, LogLevel};
use baturchat_core::metrics::init_metrics;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "baturchat")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Set the log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Enable JSON formatted logging
    #[arg(long)]
    json_logs: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Parser, Debug)]
enum Command {
    /// Run a scripted demo session against the in-memory backends
    Demo {
        /// Email for the demo account
        #[arg(default_value = "alice@example.com")]
        email: String,

        /// Display name for the demo account
        #[arg(default_value = "Alice")]
        display_name: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Parse log level
    let log_level = LogLevel::from_str(&args.log_level).unwrap_or_else(|| {
        eprintln!("Invalid log level '{}', using 'info'", args.log_level);
        LogLevel::Info
    });

    // Initialize logging and metrics
    let config = LogConfig::new(log_level).json_format(args.json_logs);
    init_logging_with_config(config)?;
    init_metrics();

    info!("BaturChat CLI started");

    match args.command {
        Some(Command::Demo { email, display_name }) => {
            run_demo(&email, &display_name).await?;
        }
        None => {
            info!("No command specified. Use --help for usage information.");
        }
    }

    info!("BaturChat CLI finished");

    Ok(())
}

/// Drive one full session lifecycle: register, browse contacts, edit the
/// profile, log out.
async fn run_demo(email: &str, display_name: &str) -> Result<()> {
    let config = Config::from_env()?;

    let auth = Arc::new(MemoryAuthProvider::new());
    let store = Arc::new(MemoryRealtimeStore::new());
    let cache = Arc::new(FileSessionCache::new(config.cache.dir.clone())?);

    let coordinator = SessionCoordinator::start(auth, store.clone(), cache);
    let mut session = coordinator.watch();

    coordinator.register(email, "demo-password", display_name).await?;
    let identity = wait_authenticated(&mut session)
        .await?
        .ok_or_else(|| anyhow::anyhow!("no identity after sign-in"))?;
    info!(user_id = %identity.user_id, "Registered and signed in");

    let directory = ContactDirectory::new(store);
    let contacts = directory.list_contacts(&identity.user_id).await?;
    info!(count = contacts.len(), "Contacts visible");

    let updated = coordinator
        .update_profile(&ProfileUpdate::new().display_name(format!("{} (demo)", display_name)))
        .await?;
    info!(display_name = %updated.display_name, "Profile updated");

    coordinator.logout().await?;
    info!("Logged out");

    coordinator.shutdown();
    Ok(())
}

async fn wait_authenticated(
    session: &mut tokio::sync::watch::Receiver<baturchat_core::core_session::SessionSnapshot>,
) -> Result<Option<baturchat_core::core_session::Identity>> {
    let snapshot = tokio::time::timeout(
        Duration::from_secs(5),
        session.wait_for(|s| s.is_authenticated()),
    )
    .await??;
    Ok(snapshot.identity.clone())
}
