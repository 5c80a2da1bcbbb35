//! API key management
//!
//! The key is kept cleartext in the settings table; `status` only ever
//! shows the masked form.

use crate::cli::KeyCommand;
use crate::error::Result;
use crate::storage::SessionStore;
use colored::Colorize;
use std::io::Write;

/// Masked display form of a stored key
const MASK: &str = "********";

/// Handle the `key` subcommands
pub fn handle_key(command: KeyCommand) -> Result<()> {
    let store = SessionStore::new()?;

    match command {
        KeyCommand::Set { value } => {
            let key = match value {
                Some(value) => value,
                None => {
                    print!("Enter API key: ");
                    std::io::stdout().flush()?;
                    let mut line = String::new();
                    std::io::stdin().read_line(&mut line)?;
                    line
                }
            };

            let key = key.trim();
            if key.is_empty() {
                println!("{}", "Please enter an API key".red());
                return Ok(());
            }

            store.set_api_key(key)?;
            println!("{}", "API key saved".green());
        }
        KeyCommand::Status => match store.api_key()? {
            Some(_) => println!("API key: {}", MASK.green()),
            None => println!("{}", "No API key stored.".yellow()),
        },
        KeyCommand::Clear => {
            store.clear_api_key()?;
            println!("{}", "API key removed".green());
        }
    }

    Ok(())
}
