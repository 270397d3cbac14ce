//! `docchat ask` and the interactive `docchat chat` loop.

use anyhow::Result;
use docchat_core::{AlgorithmId, ExchangeOutcome, QueryError, Role};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::display::turn_text;
use crate::files::print_domain;
use crate::session::Session;

const HELP: &str = "\
Type a question to ask about your documents. Commands:
  /algo NAME      switch ranking algorithm (semantic, bm25, tfidf, hybrid)
  /filter TOKEN   toggle a folder or file in the search scope
  /filters        show the active scope
  /clearfilters   search everything again
  /files          list folders and files
  /reload         re-index documents on the server
  /clear          start a new conversation
  /history        show the conversation so far
  /help           show this help
  /quit           leave";

/// A parsed line of REPL input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    Ask(String),
    Algorithm(String),
    ToggleFilter(String),
    ShowFilters,
    ClearFilters,
    Files,
    Reload,
    Clear,
    History,
    Help,
    Quit,
    Unknown(String),
    Empty,
}

pub fn parse_line(line: &str) -> ChatCommand {
    let line = line.trim();
    if line.is_empty() {
        return ChatCommand::Empty;
    }
    let Some(command) = line.strip_prefix('/') else {
        return ChatCommand::Ask(line.to_string());
    };

    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };
    match (name, arg) {
        ("algo" | "algorithm", arg) if !arg.is_empty() => ChatCommand::Algorithm(arg.to_string()),
        ("filter", arg) if !arg.is_empty() => ChatCommand::ToggleFilter(arg.to_string()),
        ("filters", _) => ChatCommand::ShowFilters,
        ("clearfilters", _) => ChatCommand::ClearFilters,
        ("files", _) => ChatCommand::Files,
        ("reload", _) => ChatCommand::Reload,
        ("clear", _) => ChatCommand::Clear,
        ("history", _) => ChatCommand::History,
        ("help", _) => ChatCommand::Help,
        ("quit" | "exit", _) => ChatCommand::Quit,
        _ => ChatCommand::Unknown(line.to_string()),
    }
}

/// One exchange, printed. Returns `false` if no answer was produced.
async fn exchange(session: &Session, text: &str) -> Result<bool> {
    match session.ask(text).await {
        Ok(ExchangeOutcome::Completed(turn)) => {
            println!("{}", turn_text(&turn));
            if !turn.sources().is_empty() {
                println!();
                println!("Sources:");
                for source in turn.sources() {
                    println!("  - {}", source);
                }
            }
            Ok(true)
        }
        Ok(ExchangeOutcome::Failed { error, turn }) => {
            debug!(error = %error, "Exchange failed");
            println!("{}", turn_text(&turn));
            Ok(false)
        }
        Ok(ExchangeOutcome::Discarded) => Ok(false),
        Err(QueryError::EmptyQuery) => {
            eprintln!("{}", QueryError::EmptyQuery);
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

/// `docchat ask`: a single question. Fails if the service was unavailable.
pub async fn run_ask(session: &Session, question: &str) -> Result<()> {
    if !exchange(session, question).await? {
        anyhow::bail!("No answer was produced");
    }
    Ok(())
}

fn print_filters(session: &Session) {
    let active = session.filters().active();
    if active.is_empty() {
        println!("Searching all documents.");
        return;
    }
    println!("Searching in:");
    for token in active.iter() {
        println!("  {}", token);
    }
    let stale = session.filters().stale_tokens();
    if !stale.is_empty() {
        println!("Not in the document list: {}", stale.join(", "));
    }
}

/// `docchat chat`: read lines from stdin until `/quit` or end of input.
pub async fn run_chat(session: &mut Session) -> Result<()> {
    session.load_filters().await;
    println!(
        "docchat ({}). Type /help for commands.",
        session.algorithm().label()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_line(&line) {
            ChatCommand::Empty => {}
            ChatCommand::Ask(text) => {
                exchange(session, &text).await?;
                println!();
            }
            ChatCommand::Algorithm(name) => match name.parse::<AlgorithmId>() {
                Ok(algorithm) => {
                    session.set_algorithm(algorithm);
                    println!("Algorithm: {}", algorithm.label());
                }
                Err(e) => println!("{}", e),
            },
            ChatCommand::ToggleFilter(token) => {
                if session.toggle_filter(&token) {
                    println!("Added {} to the search scope.", token);
                } else {
                    println!("Removed {} from the search scope.", token);
                }
            }
            ChatCommand::ShowFilters => print_filters(session),
            ChatCommand::ClearFilters => {
                session.clear_filters();
                println!("Searching all documents.");
            }
            ChatCommand::Files => print_domain(session.load_filters().await),
            ChatCommand::Reload => {
                let reloaded = session.client().reload().await;
                match reloaded {
                    Ok(report) => {
                        println!("{} ({} documents)", report.message, report.doc_count);
                        session.refresh_filters().await;
                    }
                    Err(e) => println!("Reload failed: {:#}", e),
                }
            }
            ChatCommand::Clear => {
                session.clear_conversation();
                println!("Conversation cleared.");
            }
            ChatCommand::History => {
                let turns = session.conversation();
                if turns.is_empty() {
                    println!("No messages yet.");
                }
                for turn in turns {
                    let who = match turn.role() {
                        Role::User => "you",
                        Role::Assistant => "assistant",
                    };
                    println!(
                        "[{}] {}:\n{}\n",
                        turn.created_at().format("%H:%M:%S"),
                        who,
                        turn_text(&turn)
                    );
                }
            }
            ChatCommand::Help => println!("{}", HELP),
            ChatCommand::Quit => break,
            ChatCommand::Unknown(input) => {
                println!("Unknown command: {}. Type /help for commands.", input)
            }
        }
    }

    Ok(())
}
