//! Special command parser for the interactive chat loop
//!
//! Lines starting with `/` are chat-local commands; everything else is a
//! message for the assistant.

/// A parsed special command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Show the command reference
    Help,
    /// Create a new session and make it active
    NewSession,
    /// List stored sessions
    ListSessions,
    /// Switch to another session by id or prefix
    SwitchSession(String),
    /// Delete the current session
    DeleteSession,
    /// Show token totals for the current session
    Tokens,
    /// List available synthesis voices
    Voices,
    /// Persist the selected voice id
    SetVoice(String),
    /// Speak the last assistant reply, optionally with a one-off voice
    Speak(Option<String>),
    /// Leave the chat loop
    Exit,
    /// A slash command that is not recognized
    Unknown(String),
    /// Not a special command: treat as a chat message
    None,
}

/// Parse a trimmed input line into a special command
///
/// # Examples
///
/// ```
/// use topika::commands::special::{parse_special_command, SpecialCommand};
///
/// assert_eq!(parse_special_command("/new"), SpecialCommand::NewSession);
/// assert_eq!(parse_special_command("hello"), SpecialCommand::None);
/// ```
pub fn parse_special_command(input: &str) -> SpecialCommand {
    if !input.starts_with('/') {
        return SpecialCommand::None;
    }

    let mut parts = input.split_whitespace();
    let command = parts.next().unwrap_or_default();
    let argument = parts.next().map(String::from);

    match command {
        "/help" => SpecialCommand::Help,
        "/new" => SpecialCommand::NewSession,
        "/sessions" => SpecialCommand::ListSessions,
        "/switch" => match argument {
            Some(id) => SpecialCommand::SwitchSession(id),
            None => SpecialCommand::Unknown("/switch requires a session id".to_string()),
        },
        "/delete" => SpecialCommand::DeleteSession,
        "/tokens" => SpecialCommand::Tokens,
        "/voices" => SpecialCommand::Voices,
        "/voice" => match argument {
            Some(id) => SpecialCommand::SetVoice(id),
            None => SpecialCommand::Unknown("/voice requires a voice id".to_string()),
        },
        "/speak" => SpecialCommand::Speak(argument),
        "/exit" | "/quit" => SpecialCommand::Exit,
        other => SpecialCommand::Unknown(format!("Unknown command: {}", other)),
    }
}

/// Print the command reference
pub fn print_help() {
    println!("Commands:");
    println!("  /new            Start a new chat session");
    println!("  /sessions       List stored sessions");
    println!("  /switch <id>    Switch to another session");
    println!("  /delete         Delete the current session");
    println!("  /tokens         Show token totals for this session");
    println!("  /voices         List available synthesis voices");
    println!("  /voice <id>     Select a synthesis voice");
    println!("  /speak [voice]  Speak the last assistant reply");
    println!("  /help           Show this reference");
    println!("  /exit           Leave the chat");
    println!();
}
