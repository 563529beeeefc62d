use anyhow::Result;
use geoweather_core::{App, CommandPump, Coordinates};
use inquire::{InquireError, Text};

use crate::terminal::OutputQueue;

const HELP: &str = "\
Commands:
  /city <name>        search a city
  /click <lat> <lon>  drop the marker at a point
  /toggle             show or hide the chat
  /help               this text
  /quit               leave
Anything else is sent to the chat assistant.
Press Enter on an empty line to show pending output.";

#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    City(String),
    Click(Coordinates),
    Toggle,
    Help,
    Quit,
    /// Empty line: just print whatever arrived since the last prompt.
    Refresh,
    Chat(String),
    Invalid(String),
}

pub fn parse_line(line: &str) -> Input {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Input::Refresh;
    }

    let Some(command) = trimmed.strip_prefix('/') else {
        return Input::Chat(trimmed.to_string());
    };

    let (name, rest) = command
        .split_once(char::is_whitespace)
        .map(|(name, rest)| (name, rest.trim()))
        .unwrap_or((command, ""));

    match name {
        "city" => Input::City(rest.to_string()),
        "click" => parse_click(rest),
        "toggle" => Input::Toggle,
        "help" => Input::Help,
        "quit" | "exit" => Input::Quit,
        other => Input::Invalid(format!("Unknown command '/{other}'. Type /help.")),
    }
}

fn parse_click(args: &str) -> Input {
    let mut parts = args.split_whitespace();
    let parsed = match (parts.next(), parts.next(), parts.next()) {
        (Some(lat), Some(lon), None) => lat.parse::<f64>().ok().zip(lon.parse::<f64>().ok()),
        _ => None,
    };

    match parsed {
        Some((lat, lon)) if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon) => {
            Input::Click(Coordinates::new(lat, lon))
        }
        _ => Input::Invalid("Usage: /click <lat> <lon>".to_string()),
    }
}

/// Interactive loop. Each action runs in its own task so a slow request
/// never blocks the next one; their output is printed before each prompt.
pub async fn run(app: App, pump: CommandPump, mut output: OutputQueue) -> Result<()> {
    let pump_task = tokio::spawn(pump.run());

    println!("{HELP}");
    app.chat().toggle_visibility();

    loop {
        output.flush();
        let prompt = tokio::task::spawn_blocking(|| Text::new(">").prompt()).await?;

        let line = match prompt {
            Ok(line) => line,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(err) => return Err(err.into()),
        };

        match parse_line(&line) {
            Input::Quit => break,
            Input::Refresh => {}
            Input::Help => println!("{HELP}"),
            Input::Invalid(msg) => eprintln!("{msg}"),
            Input::Toggle => {
                app.chat().toggle_visibility();
            }
            Input::City(city) => {
                let app = app.clone();
                tokio::spawn(async move {
                    app.selector().search_city(&city).await;
                });
            }
            Input::Click(at) => {
                let app = app.clone();
                tokio::spawn(async move {
                    app.selector().click(at).await;
                });
            }
            Input::Chat(text) => {
                let app = app.clone();
                tokio::spawn(async move {
                    app.chat().send_message(&text).await;
                });
            }
        }
    }

    pump_task.abort();
    output.flush();
    Ok(())
}
