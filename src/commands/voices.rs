//! Voice catalog listing

use crate::config::Config;
use crate::error::Result;
use crate::speech::{SpeechClient, VoiceCatalog};
use crate::storage::SessionStore;
use colored::Colorize;
use prettytable::{format, Table};

/// Print the voice catalog as a table
///
/// The service default and the user's stored selection are both marked.
pub fn print_voice_table(catalog: &VoiceCatalog, selected: Option<&str>) {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
    table.add_row(prettytable::row![
        "ID".bold(),
        "Name".bold(),
        "Accent".bold(),
        "Gender".bold(),
        "".bold()
    ]);

    let mut ids: Vec<&String> = catalog.voices.keys().collect();
    ids.sort();

    for id in ids {
        let info = &catalog.voices[id];
        let mut marks = Vec::new();
        if id == &catalog.default_voice {
            marks.push("default");
        }
        if selected == Some(id.as_str()) {
            marks.push("selected");
        }

        table.add_row(prettytable::row![
            id.cyan(),
            info.name,
            info.accent,
            info.gender,
            marks.join(", ").green()
        ]);
    }

    println!();
    table.printstd();
    println!();
}

/// Handle the `voices` command
pub async fn handle_voices(config: &Config) -> Result<()> {
    let client = SpeechClient::new(&config.speech.base_url)?;
    match client.list_voices().await {
        Ok(catalog) => {
            let store = SessionStore::new()?;
            print_voice_table(&catalog, store.voice()?.as_deref());
        }
        Err(e) => {
            tracing::warn!("Voice catalog unavailable: {}", e);
            println!("{}", "Could not load the voice catalog.".yellow());
        }
    }
    Ok(())
}
