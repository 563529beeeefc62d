use std::sync::Arc;

use anyhow::bail;
use clap::{Parser, Subcommand};
use geoweather_core::{
    App, CommandPump, Config, Coordinates, FetchOutcome, config::DEFAULT_BACKEND_URL,
};
use inquire::{Password, PasswordDisplayMode, Text};

use crate::{
    session,
    terminal::{OutputQueue, TerminalView},
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "geoweather", version, about = "Map-driven weather client with a chat assistant")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure the backend URL and geocoding credentials.
    Configure,

    /// Show weather for a city or a map point, then exit.
    Show {
        /// City name, resolved by the backend.
        #[arg(long, conflicts_with_all = ["lat", "lon"])]
        city: Option<String>,

        /// Latitude of the point, in degrees.
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Longitude of the point, in degrees.
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,
    },

    /// Interactive session: search, click, and chat.
    Session,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { city, lat, lon } => {
                let (app, _pump, mut output) = build_app()?;

                let selection = match (city, lat, lon) {
                    (Some(city), _, _) => app.selector().search_city(&city).await,
                    (None, Some(lat), Some(lon)) => {
                        Some(app.selector().click(Coordinates::new(lat, lon)).await)
                    }
                    _ => bail!("Pass either --city <name> or both --lat and --lon."),
                };
                output.flush();

                let Some(selection) = selection else {
                    bail!("City name is empty.");
                };
                show_result(selection.weather)
            }
            Command::Session => {
                let (app, pump, output) = build_app()?;
                session::run(app, pump, output).await
            }
        }
    }
}

/// Exit status of `show`: only a rendered forecast counts as success.
fn show_result(outcome: FetchOutcome) -> anyhow::Result<()> {
    match outcome {
        FetchOutcome::Rendered | FetchOutcome::Superseded => Ok(()),
        FetchOutcome::NotFound => bail!("no weather for that location"),
        FetchOutcome::Failed => {
            bail!("weather request failed; check the backend URL with `geoweather configure`")
        }
    }
}

fn build_app() -> anyhow::Result<(App, CommandPump, OutputQueue)> {
    let config = Config::load()?;
    let (view, output) = TerminalView::new();
    let view = Arc::new(view);

    let (app, pump) = App::from_config(&config, view.clone(), view.clone(), view)?;
    Ok((app, pump, output))
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let backend_url = Text::new("Backend URL:")
        .with_default(config.backend_url.as_deref().unwrap_or(DEFAULT_BACKEND_URL))
        .prompt()?;
    config.set_backend_url(backend_url.trim());

    let prompt = if config.is_geocoding_configured() {
        "OpenWeather API key (leave empty to keep current):"
    } else {
        "OpenWeather API key:"
    };
    let api_key = Password::new(prompt)
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()?;

    let api_key = api_key.trim();
    if !api_key.is_empty() {
        config.upsert_geocoding_api_key(api_key.to_string());
    }

    let path = config.save()?;
    println!("Configuration saved to {}", path.display());

    if !config.is_geocoding_configured() {
        println!("Note: without a geocoding key the marker stays put on city searches; run `geoweather configure` again to add one.");
    }

    Ok(())
}
