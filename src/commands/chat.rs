//! Interactive chat command
//!
//! Runs a readline loop over the active session. Each turn walks the same
//! path: validate locally, persist the user message, retrieve context,
//! request a completion, then render either the reply or an error bubble.
//! Every failure path returns the loop to an interactive prompt.

use crate::commands::special::{parse_special_command, print_help, SpecialCommand};
use crate::config::Config;
use crate::error::Result;
use crate::history::RetainedHistory;
use crate::knowledge::{KnowledgeClient, TopicRecord};
use crate::providers::{create_provider, ChatMessage, CompletionProvider};
use crate::retrieval::{build_context_block, find_relevant};
use crate::speech::SpeechClient;
use crate::storage::{ChatSession, MessageRole, MessageTokens, SessionStore, StoredMessage};

use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// Error bubble text shown for any failed exchange
const EXCHANGE_ERROR: &str =
    "Sorry, there was an error processing your message. Please try again.";

/// Start the interactive chat loop
///
/// # Arguments
///
/// * `config` - Global configuration (consumed)
/// * `provider_name` - Optional override for the configured provider
/// * `resume` - Optional session id (or prefix) to resume
pub async fn run_chat(
    config: Config,
    provider_name: Option<String>,
    resume: Option<String>,
) -> Result<()> {
    let store = SessionStore::new()?;
    let mut rl = DefaultEditor::new()?;

    let Some(api_key) = ensure_api_key(&store, &mut rl)? else {
        return Ok(());
    };

    // One read request; on failure the chat degrades to an empty collection.
    let knowledge_client = KnowledgeClient::new(&config.knowledge.base_url)?;
    let records = match knowledge_client.fetch_all().await {
        Ok(records) => records,
        Err(e) => {
            tracing::warn!("Knowledge load failed: {}", e);
            println!(
                "{}",
                "Failed to load knowledge base. Some features may be limited.".yellow()
            );
            Vec::new()
        }
    };

    let mut session = match &resume {
        Some(id) => match store.switch_session(id)? {
            Some(session) => session,
            None => {
                println!("{}", format!("No session matching '{}'", id).yellow());
                store.ensure_active_session()?
            }
        },
        None => store.ensure_active_session()?,
    };

    let mut history = RetainedHistory::from_session(&session, config.chat.history_limit);

    let provider_type = provider_name
        .as_deref()
        .unwrap_or(&config.provider.provider_type);
    let provider = create_provider(provider_type, &config.provider, &config.chat)?;

    println!();
    println!(
        "{}",
        "Ask me anything about the topics in the knowledge base!".bold()
    );
    println!("Session: {}  ({} for commands)", short_id(&session.id).cyan(), "/help".cyan());
    println!();

    loop {
        let prompt = format!("[{}] >> ", short_id(&session.id));
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                rl.add_history_entry(trimmed)?;

                match parse_special_command(trimmed) {
                    SpecialCommand::Help => {
                        print_help();
                        continue;
                    }
                    SpecialCommand::NewSession => {
                        session = store.create_session()?;
                        history = RetainedHistory::new(config.chat.history_limit);
                        println!("Started session {}\n", short_id(&session.id).cyan());
                        continue;
                    }
                    SpecialCommand::ListSessions => {
                        crate::commands::sessions::print_session_table(&store)?;
                        continue;
                    }
                    SpecialCommand::SwitchSession(id) => {
                        // Unknown ids are a silent no-op.
                        if let Some(switched) = store.switch_session(&id)? {
                            session = switched;
                            history =
                                RetainedHistory::from_session(&session, config.chat.history_limit);
                            println!("Switched to session {}\n", short_id(&session.id).cyan());
                        } else {
                            tracing::debug!("Switch to unknown session '{}' ignored", id);
                        }
                        continue;
                    }
                    SpecialCommand::DeleteSession => {
                        if store.delete_session(&session.id)? {
                            session = store.ensure_active_session()?;
                            history =
                                RetainedHistory::from_session(&session, config.chat.history_limit);
                            println!(
                                "{}",
                                format!("Deleted. Now on session {}\n", short_id(&session.id))
                                    .green()
                            );
                        } else {
                            println!(
                                "{}",
                                "Cannot delete the only remaining session.\n".yellow()
                            );
                        }
                        continue;
                    }
                    SpecialCommand::Tokens => {
                        print_token_totals(&session);
                        continue;
                    }
                    SpecialCommand::Voices => {
                        match SpeechClient::new(&config.speech.base_url)?.list_voices().await {
                            Ok(catalog) => crate::commands::voices::print_voice_table(
                                &catalog,
                                store.voice()?.as_deref(),
                            ),
                            Err(e) => println!("{}", format!("Could not load voices: {}", e).yellow()),
                        }
                        continue;
                    }
                    SpecialCommand::SetVoice(id) => {
                        set_voice(&config, &store, &id).await?;
                        continue;
                    }
                    SpecialCommand::Speak(voice) => {
                        speak_last_reply(&config, &store, &session, voice.as_deref()).await;
                        continue;
                    }
                    SpecialCommand::Exit => break,
                    SpecialCommand::Unknown(message) => {
                        println!("{}", message.yellow());
                        println!("Use {} for the command reference.\n", "/help".cyan());
                        continue;
                    }
                    SpecialCommand::None => {}
                }

                run_turn(
                    &config,
                    &store,
                    provider.as_ref(),
                    &api_key,
                    &records,
                    &mut session,
                    &mut history,
                    trimmed,
                )
                .await?;
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}", format!("Input error: {}", e).red());
                break;
            }
        }
    }

    println!("Goodbye.");
    Ok(())
}

/// One chat turn: Idle -> Sending -> rendered reply or error bubble -> Idle
#[allow(clippy::too_many_arguments)]
async fn run_turn(
    config: &Config,
    store: &SessionStore,
    provider: &dyn CompletionProvider,
    api_key: &str,
    records: &[TopicRecord],
    session: &mut ChatSession,
    history: &mut RetainedHistory,
    message: &str,
) -> Result<()> {
    store.append_message(session, StoredMessage::new(MessageRole::User, message))?;
    history.push_user(message);

    let entries = find_relevant(records, message, config.chat.max_context_entries);
    let context = build_context_block(&entries);
    let system = ChatMessage::system(crate::prompts::chat_system_prompt(&context));

    let mut request_messages = Vec::with_capacity(history.len() + 1);
    request_messages.push(system);
    request_messages.extend_from_slice(history.entries());

    println!("{}", "Sending...".dimmed());

    match provider.complete(api_key, &request_messages).await {
        Ok(completion) => {
            history.push_assistant(&completion.content);
            history.trim();

            let tokens = completion.usage.map(|usage| MessageTokens {
                input: usage.prompt_tokens,
                output: usage.completion_tokens,
            });
            let stored = match tokens {
                Some(tokens) => StoredMessage::with_tokens(
                    MessageRole::Assistant,
                    completion.content.as_str(),
                    tokens,
                ),
                None => StoredMessage::new(MessageRole::Assistant, completion.content.as_str()),
            };
            store.append_message(session, stored)?;

            println!("\n{}\n", completion.content);
            print_token_totals(session);
        }
        Err(e) => {
            tracing::error!("Exchange failed: {}", e);
            history.trim();
            store.append_message(session, StoredMessage::new(MessageRole::Error, EXCHANGE_ERROR))?;
            println!("\n{}\n", EXCHANGE_ERROR.red());
        }
    }

    Ok(())
}

/// Return the stored API key, prompting for one when absent
///
/// Empty input is rejected before anything is stored; `None` means the
/// chat cannot start.
fn ensure_api_key(store: &SessionStore, rl: &mut DefaultEditor) -> Result<Option<String>> {
    if let Some(key) = store.api_key()? {
        return Ok(Some(key));
    }

    let line = match rl.readline("Enter API key: ") {
        Ok(line) => line,
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let key = line.trim();
    if key.is_empty() {
        println!("{}", "Please enter an API key".red());
        return Ok(None);
    }

    store.set_api_key(key)?;
    println!("{}", "API key saved".green());
    Ok(Some(key.to_string()))
}

/// Speak the most recent assistant reply
///
/// Voice resolution order: explicit argument, stored selection, catalog
/// default. Any failure prints a transient warning; the message log is
/// never touched here.
async fn speak_last_reply(
    config: &Config,
    store: &SessionStore,
    session: &ChatSession,
    voice: Option<&str>,
) {
    let Some(reply) = session
        .messages
        .iter()
        .rev()
        .find(|m| m.role == MessageRole::Assistant)
    else {
        println!("{}", "No assistant reply to speak yet.".yellow());
        return;
    };

    let result = async {
        let client = SpeechClient::new(&config.speech.base_url)?;
        let voice = match voice {
            Some(voice) => voice.to_string(),
            None => match store.voice()? {
                Some(voice) => voice,
                None => client.list_voices().await?.default_voice,
            },
        };

        let audio = client.synthesize(&reply.content, &voice).await?;
        let path = store
            .audio_dir()?
            .join(format!("speech-{}.mp3", chrono::Utc::now().format("%Y%m%d%H%M%S")));
        std::fs::write(&path, &audio)?;
        Ok::<_, anyhow::Error>(path)
    }
    .await;

    match result {
        Ok(path) => println!("{}", format!("Audio saved to {}", path.display()).green()),
        Err(e) => {
            tracing::warn!("Speech synthesis failed: {}", e);
            println!("{}", "Could not synthesize speech. Please try again.".yellow());
        }
    }
}

/// Validate and persist a voice selection
async fn set_voice(config: &Config, store: &SessionStore, id: &str) -> Result<()> {
    match SpeechClient::new(&config.speech.base_url)?.list_voices().await {
        Ok(catalog) => {
            if catalog.voices.contains_key(id) {
                store.set_voice(id)?;
                println!("{}", format!("Voice set to {}", id).green());
            } else {
                println!("{}", format!("Unknown voice: {}", id).yellow());
            }
        }
        Err(e) => {
            tracing::warn!("Voice catalog unavailable: {}", e);
            println!("{}", "Could not load the voice catalog.".yellow());
        }
    }
    Ok(())
}

/// Print the running token totals and per-exchange averages
fn print_token_totals(session: &ChatSession) {
    println!(
        "{}",
        format!(
            "Total Tokens: {} in / {} out | Average per message: {} in / {} out",
            session.total_input_tokens,
            session.total_output_tokens,
            session.average_input_tokens(),
            session.average_output_tokens()
        )
        .dimmed()
    );
}

/// First eight characters of a session id
fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}
