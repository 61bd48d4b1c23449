// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Line-oriented console transport for a single local user.
//
//   /start            greeting
//   /help, /menu      help text, main menu
//   /op <callback-id> press an inline button (pdf_to_word, back_to_main, ...)
//   /file <path>      upload a document
//   /quit             exit
//   anything else     free text (menu button labels, page ranges)
//
// Output documents are written into the output directory.

use std::path::{Path, PathBuf};

use hujjat_core::UserId;
use hujjat_core::error::Result;
use hujjat_session::{Event, Keyboard, Reply};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::services::app_services::AppServices;

/// The console has exactly one user.
const LOCAL_USER: UserId = UserId(1);

/// What one input line asks for.
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Event(Event),
    Upload(PathBuf),
    Quit,
    Nothing,
}

/// Parse one input line. `Err` carries a usage message for the user.
pub fn parse_line(line: &str, display_name: &str) -> std::result::Result<Command, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Command::Nothing);
    }
    if !line.starts_with('/') {
        return Ok(Command::Event(Event::Text(line.to_string())));
    }

    let (command, argument) = match line.split_once(char::is_whitespace) {
        Some((command, argument)) => (command, argument.trim()),
        None => (line, ""),
    };
    match (command, argument) {
        ("/start", _) => Ok(Command::Event(Event::Start {
            display_name: display_name.to_string(),
        })),
        ("/help", _) => Ok(Command::Event(Event::Help)),
        ("/menu", _) => Ok(Command::Event(Event::Menu)),
        ("/quit" | "/exit", _) => Ok(Command::Quit),
        ("/op", "") => Err("usage: /op <callback-id>".into()),
        ("/op", id) => Ok(Command::Event(Event::Callback(id.to_string()))),
        ("/file", "") => Err("usage: /file <path>".into()),
        ("/file", path) => Ok(Command::Upload(PathBuf::from(path))),
        (other, _) => Err(format!("unknown command {other}")),
    }
}

/// Render a reply for the terminal, writing documents into `out_dir`.
pub fn render_reply(reply: Reply, out_dir: &Path) -> Result<String> {
    match reply {
        Reply::Text { text, keyboard } => {
            let mut rendered = text;
            if let Some(keyboard) = keyboard {
                rendered.push('\n');
                rendered.push_str(&render_keyboard(keyboard));
            }
            Ok(rendered)
        }
        Reply::Document {
            bytes,
            file_name,
            caption,
        } => {
            std::fs::create_dir_all(out_dir)?;
            // Only the final component; the name comes from user input.
            let name = Path::new(&file_name)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "document".into());
            let path = out_dir.join(name);
            std::fs::write(&path, &bytes)?;
            info!(path = %path.display(), bytes = bytes.len(), "Document written");
            Ok(format!("[{caption}] -> {}", path.display()))
        }
    }
}

fn render_keyboard(keyboard: Keyboard) -> String {
    keyboard
        .rows()
        .iter()
        .map(|row| {
            row.iter()
                .map(|button| match button.callback {
                    Some(id) => format!("[{}] /op {id}", button.label),
                    None => format!("[{}]", button.label),
                })
                .collect::<Vec<_>>()
                .join("   ")
        })
        .map(|row| format!("  {row}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Read commands from stdin until EOF or `/quit`.
pub async fn run(services: &AppServices, out_dir: &Path, display_name: &str) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("Hujjat. /start, /help, /op <id>, /file <path>, /quit");

    while let Some(line) = lines.next_line().await? {
        let event = match parse_line(&line, display_name) {
            Ok(Command::Event(event)) => event,
            Ok(Command::Upload(path)) => match tokio::fs::read(&path).await {
                Ok(bytes) => Event::File {
                    file_name: file_name_of(&path),
                    bytes,
                },
                Err(e) => {
                    println!("cannot read {}: {e}", path.display());
                    continue;
                }
            },
            Ok(Command::Quit) => break,
            Ok(Command::Nothing) => continue,
            Err(usage) => {
                println!("{usage}");
                continue;
            }
        };

        for reply in services.machine().handle(LOCAL_USER, event).await {
            match render_reply(reply, out_dir) {
                Ok(text) => println!("{text}\n"),
                Err(e) => {
                    warn!(error = %e, "could not deliver reply");
                    println!("could not save output: {e}");
                }
            }
        }
    }
    Ok(())
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
