//! Topika - knowledge-base topic navigator and chat assistant
//!
//! Main entry point for the Topika client application.

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use topika::cli::{Cli, Commands, TopicCommand};
use topika::commands;
use topika::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    init_tracing();

    // Parse command line arguments
    let cli = Cli::parse_args();

    // If the user supplied a storage path on the CLI, mirror it into
    // TOPIKA_STORE_DB so the store initializer can pick it up. This keeps
    // callers unchanged while allowing `SessionStore::new()` to honor an
    // override.
    if let Some(db_path) = &cli.storage_path {
        std::env::set_var("TOPIKA_STORE_DB", db_path);
        tracing::info!("Using storage DB override from CLI: {}", db_path);
    }

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Chat { provider, resume } => {
            tracing::info!("Starting interactive chat");
            if let Some(p) = &provider {
                tracing::debug!("Using provider override: {}", p);
            }
            if let Some(r) = &resume {
                tracing::debug!("Resuming session: {}", r);
            }

            commands::chat::run_chat(config, provider, resume).await?;
            Ok(())
        }
        Commands::Topics { command } => match command {
            TopicCommand::Tree => {
                commands::topics::run_tree(&config).await?;
                Ok(())
            }
            TopicCommand::Show { id } => {
                commands::topics::run_show(&config, &id).await?;
                Ok(())
            }
            TopicCommand::Add { title, parent } => {
                commands::topics::run_add(&config, &title, parent.as_deref()).await?;
                Ok(())
            }
            TopicCommand::Delete { id, yes } => {
                commands::topics::run_delete(&config, &id, yes).await?;
                Ok(())
            }
            TopicCommand::Dedupe => {
                commands::topics::run_dedupe(&config).await?;
                Ok(())
            }
            TopicCommand::Generate { id } => {
                commands::topics::run_generate(&config, &id).await?;
                Ok(())
            }
        },
        Commands::Sessions { command } => {
            commands::sessions::handle_sessions(command)?;
            Ok(())
        }
        Commands::Voices => {
            commands::voices::handle_voices(&config).await?;
            Ok(())
        }
        Commands::Key { command } => {
            commands::key::handle_key(command)?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("topika=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
