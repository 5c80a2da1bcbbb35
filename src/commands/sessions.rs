//! Session management commands

use crate::error::Result;
use crate::storage::SessionStore;
use colored::Colorize;
use prettytable::{format, Table};

/// Print the session listing table
///
/// Shared with the chat loop's `/sessions` command.
pub fn print_session_table(store: &SessionStore) -> Result<()> {
    let sessions = store.list_sessions()?;
    if sessions.is_empty() {
        println!("{}", "No sessions stored yet.".yellow());
        return Ok(());
    }

    let active = store.active_session_id()?;

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
    table.add_row(prettytable::row![
        "ID".bold(),
        "Messages".bold(),
        "Tokens (in/out)".bold(),
        "Last Updated".bold(),
        "".bold()
    ]);

    for session in sessions {
        let id_short = session.id.get(..8).unwrap_or(&session.id).to_string();
        let tokens = format!(
            "{}/{}",
            session.total_input_tokens, session.total_output_tokens
        );
        let updated = session.updated_at.format("%Y-%m-%d %H:%M").to_string();
        let marker = if active.as_deref() == Some(session.id.as_str()) {
            "active"
        } else {
            ""
        };

        table.add_row(prettytable::row![
            id_short.cyan(),
            session.message_total,
            tokens,
            updated,
            marker.green()
        ]);
    }

    println!();
    table.printstd();
    println!();
    Ok(())
}

/// Handle the `sessions` subcommands
pub fn handle_sessions(command: crate::cli::SessionCommand) -> Result<()> {
    let store = SessionStore::new()?;

    match command {
        crate::cli::SessionCommand::List => {
            print_session_table(&store)?;
            println!(
                "Use {} to resume a session.",
                "topika chat --resume <ID>".cyan()
            );
            println!();
        }
        crate::cli::SessionCommand::New => {
            let session = store.create_session()?;
            println!(
                "{}",
                format!("Created session {}", session.id.get(..8).unwrap_or(&session.id)).green()
            );
        }
        crate::cli::SessionCommand::Delete { id } => {
            if store.delete_session(&id)? {
                println!("{}", format!("Deleted session {}", id).green());
            } else {
                println!(
                    "{}",
                    "Not deleted: unknown id, or it is the last remaining session.".yellow()
                );
            }
        }
    }

    Ok(())
}
