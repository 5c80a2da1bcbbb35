//! Command-line interface definition for Topika
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for chat, topic browsing/administration, session
//! management, voice listing, and API key management.

use clap::{Parser, Subcommand};

/// Topika - knowledge-base topic navigator and chat assistant
///
/// Browse a hierarchical topic taxonomy and chat with an assistant that
/// grounds its answers in the knowledge collection.
#[derive(Parser, Debug, Clone)]
#[command(name = "topika")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Override the knowledge collection base URL
    #[arg(long)]
    pub knowledge_url: Option<String>,

    /// Override the session store database path
    #[arg(long)]
    pub storage_path: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Topika
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive chat session
    Chat {
        /// Override the provider from config (openai, relay)
        #[arg(short, long)]
        provider: Option<String>,

        /// Resume a specific session by id (or 8-char prefix)
        #[arg(short, long)]
        resume: Option<String>,
    },

    /// Browse and administer the topic collection
    Topics {
        /// Topic subcommand
        #[command(subcommand)]
        command: TopicCommand,
    },

    /// Manage chat sessions
    Sessions {
        /// Session subcommand
        #[command(subcommand)]
        command: SessionCommand,
    },

    /// List available synthesis voices
    Voices,

    /// Manage the stored API key
    Key {
        /// Key subcommand
        #[command(subcommand)]
        command: KeyCommand,
    },
}

/// Topic browsing and administration subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum TopicCommand {
    /// Render the topic taxonomy as an outline
    Tree,

    /// Show a single record with all metadata sections
    Show {
        /// Record id (or unique prefix)
        id: String,
    },

    /// Create a new record and replace the stored collection
    Add {
        /// Title of the new record
        #[arg(short, long)]
        title: String,

        /// Parent record id (creates a subtopic when given)
        #[arg(short, long)]
        parent: Option<String>,
    },

    /// Delete a record and all of its descendants
    Delete {
        /// Record id (or unique prefix)
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Collapse records that share a title
    Dedupe,

    /// Generate structured metadata for a record via the completion provider
    Generate {
        /// Record id (or unique prefix)
        id: String,
    },
}

/// Session management subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum SessionCommand {
    /// List stored sessions
    List,

    /// Create a new session and make it active
    New,

    /// Delete a session (refused for the last remaining one)
    Delete {
        /// Session id (or 8-char prefix)
        id: String,
    },
}

/// API key management subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum KeyCommand {
    /// Store the API key (prompts when no value is given)
    Set {
        /// Key value
        value: Option<String>,
    },

    /// Show whether a key is stored (masked)
    Status,

    /// Remove the stored key
    Clear,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
