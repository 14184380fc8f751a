// SPDX-FileCopyrightText: 2026 Haggle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `haggle shell` command implementation.
//!
//! Opens one conversation interactively: readline input on one side, live
//! events printed as they arrive on the other. Typed lines are sent as
//! messages; `/quit` leaves.

use colored::Colorize;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::mpsc;
use tracing::debug;

use haggle_config::model::HaggleConfig;
use haggle_core::error::HaggleError;
use haggle_core::types::{ChatKind, ConversationId, Message};
use haggle_session::SessionEvent;

use crate::context;

/// Runs the `haggle shell` interactive conversation.
pub async fn run_shell(config: &HaggleConfig, chat_id: &str) -> Result<(), HaggleError> {
    let mut session = context::build_session(config)?;
    let conversation = ConversationId(chat_id.to_string());

    session.open_conversation(&conversation).await?;
    session.start_unread_refresh();

    if let Some((kind, peer, listing)) = session.active().metadata().await {
        match (kind, listing) {
            (ChatKind::Product, Some(listing)) => println!(
                "{} · {} ({})",
                peer.display_name.bold(),
                listing.title,
                listing.kind
            ),
            _ => println!("{}", peer.display_name.bold()),
        }
    }

    // Replay the loaded history before going live.
    for message in session.messages().await {
        println!("{}", format_message(&message));
    }

    println!(
        "{}  {}",
        "haggle shell".bold().green(),
        "type /quit to leave".dimmed()
    );

    // Readline blocks, so it lives on its own thread and feeds lines
    // through a channel the event loop can select on.
    let (line_tx, mut line_rx) = mpsc::channel::<String>(8);
    std::thread::spawn(move || {
        let mut editor = match DefaultEditor::new() {
            Ok(editor) => editor,
            Err(e) => {
                eprintln!("error: failed to initialize readline: {e}");
                return;
            }
        };
        loop {
            match editor.readline("> ") {
                Ok(line) => {
                    let _ = editor.add_history_entry(&line);
                    if line_tx.blocking_send(line).is_err() {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                    let _ = line_tx.blocking_send("/quit".to_string());
                    break;
                }
                Err(e) => {
                    eprintln!("error: readline failed: {e}");
                    break;
                }
            }
        }
    });

    // The select resolves which side fired; the session is only touched
    // afterwards, once the competing future is dropped.
    enum Input {
        Line(Option<String>),
        Event(Option<SessionEvent>),
    }

    let mut live = true;
    loop {
        let input = if live {
            tokio::select! {
                line = line_rx.recv() => Input::Line(line),
                event = session.next_event() => Input::Event(event),
            }
        } else {
            Input::Line(line_rx.recv().await)
        };

        match input {
            Input::Line(None) => break,
            Input::Line(Some(line)) => {
                let trimmed = line.trim();
                if trimmed == "/quit" || trimmed == "/exit" {
                    break;
                }
                if trimmed.is_empty() {
                    continue;
                }
                if let Err(e) = session.send(&line).await {
                    println!("{}", format!("not sent: {e}").red());
                }
            }
            Input::Event(Some(event)) => print_event(&event),
            Input::Event(None) => {
                live = false;
                debug!("live event stream ended");
            }
        }
    }

    session.shutdown().await;
    Ok(())
}

fn print_event(event: &SessionEvent) {
    match event {
        SessionEvent::MessageReceived(message) => {
            println!("{}", format_message(message));
        }
        SessionEvent::PeerTyping(true) => println!("{}", "typing…".dimmed()),
        SessionEvent::PeerTyping(false) => {}
        SessionEvent::MessagesRead => println!("{}", "✓ read".dimmed()),
        SessionEvent::TransientError(message) => {
            println!("{}", format!("server: {message}").yellow());
        }
        SessionEvent::ConnectionLost { reason } => {
            let detail = reason.as_deref().unwrap_or("connection lost");
            println!(
                "{}",
                format!("{detail} — reopen the conversation to reconnect").red()
            );
        }
    }
}

fn format_message(message: &Message) -> String {
    let time = message.created_at.format("%H:%M");
    if message.is_own {
        format!("{} {} {}", time.to_string().dimmed(), "you:".green(), message.content)
    } else {
        format!(
            "{} {} {}",
            time.to_string().dimmed(),
            format!("{}:", message.sender_name).cyan(),
            message.content
        )
    }
}
