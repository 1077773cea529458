//! Interactive chat loop

use std::io::Write;
use std::sync::Arc;

use anyhow::Result;
use colloquy_core::prelude::*;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

/// A line typed at the chat prompt
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Message(&'a str),
    New,
    Switch { name: &'a str, keep: bool },
    History,
    Quit,
    Unknown(&'a str),
}

fn parse_input(line: &str) -> Input<'_> {
    let trimmed = line.trim();
    let Some(command) = trimmed.strip_prefix('/') else {
        return Input::Message(line);
    };

    let mut words = command.split_whitespace();
    match words.next() {
        Some("new") => Input::New,
        Some("history") => Input::History,
        Some("quit") | Some("exit") => Input::Quit,
        Some("switch") => {
            let mut name = None;
            let mut keep = false;
            for word in words {
                if word == "--keep" {
                    keep = true;
                } else if name.is_none() {
                    name = Some(word);
                }
            }
            match name {
                Some(name) => Input::Switch { name, keep },
                None => Input::Unknown(trimmed),
            }
        }
        _ => Input::Unknown(trimmed),
    }
}

/// Builds the model client for a profile
type Connect<'a> = dyn Fn(&Profile) -> colloquy_core::error::Result<Arc<dyn LLMProvider>> + 'a;

fn prompt(out: &mut impl Write) -> std::io::Result<()> {
    write!(out, "> ")?;
    out.flush()
}

fn print_history(session: &ConversationSession, out: &mut impl Write) -> std::io::Result<()> {
    if session.history().is_empty() {
        writeln!(out, "(empty)")?;
    }
    for turn in session.history() {
        writeln!(
            out,
            "[{}] {}: {}",
            turn.timestamp.format("%H:%M:%S"),
            turn.role.as_str(),
            turn.content
        )?;
    }
    Ok(())
}

/// Run the chat loop on stdin/stdout until `/quit` or end of input.
pub async fn run(
    profile: Profile,
    store: &dyn ProfileStore,
    config: &ColloquyConfig,
    options: ExchangeOptions,
) -> Result<()> {
    let connect = |profile: &Profile| LLMProviderFactory::for_profile(profile, &config.http);
    let input = BufReader::new(tokio::io::stdin());
    let mut out = std::io::stdout();

    drive(
        profile,
        input,
        &mut out,
        store,
        config.session.clear_history_on_switch,
        &options,
        &connect,
    )
    .await?;
    Ok(())
}

/// The chat loop proper; returns the session as it stood at exit.
///
/// Model and profile failures are printed and the loop keeps going. Only
/// I/O errors on `input`/`out` end it early.
async fn drive<R, W>(
    profile: Profile,
    input: R,
    out: &mut W,
    store: &dyn ProfileStore,
    clear_on_switch: bool,
    options: &ExchangeOptions,
    connect: &Connect<'_>,
) -> Result<ConversationSession>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut client = connect(&profile)?;
    let mut session = ConversationSession::create(profile)?;

    writeln!(
        out,
        "Chatting with {} ({}). /new, /switch <name> [--keep], /history, /quit",
        session.profile().name,
        session.profile().model_id
    )?;

    let mut lines = input.lines();
    prompt(out)?;

    while let Some(line) = lines.next_line().await? {
        match parse_input(&line) {
            Input::Quit => break,
            Input::New => {
                session.clear();
                writeln!(out, "Started a new chat")?;
            }
            Input::History => print_history(&session, out)?,
            Input::Switch { name, keep } => {
                let clear = !keep && clear_on_switch;
                // Reload so edits made since startup are picked up
                let switched = store
                    .load_or_default()
                    .and_then(|profiles| {
                        profiles
                            .get(name)
                            .cloned()
                            .ok_or_else(|| ColloquyError::ProfileNotFound(name.to_string()))
                    })
                    .and_then(|profile| {
                        let next_client = connect(&profile)?;
                        session.switch_profile(profile, clear)?;
                        Ok(next_client)
                    });

                match switched {
                    Ok(next_client) => {
                        client = next_client;
                        match session.history().last() {
                            Some(notice) if notice.is_system() => {
                                writeln!(out, "{}", notice.content)?
                            }
                            _ => writeln!(out, "Switched to {}", session.profile().name)?,
                        }
                    }
                    Err(e) => writeln!(out, "Could not switch profile: {}", e)?,
                }
            }
            Input::Unknown(command) => writeln!(out, "Unknown command: {}", command)?,
            Input::Message(text) => {
                if text.trim().is_empty() {
                    prompt(out)?;
                    continue;
                }
                match exchange(&mut session, client.as_ref(), text, options).await {
                    Ok(reply) => writeln!(out, "{}", reply)?,
                    Err(e) => writeln!(out, "Error getting response: {}", e)?,
                }
            }
        }
        prompt(out)?;
    }

    Ok(session)
}
