//! Wiring: builds the orchestrators and routes chat-driven location commands
//! back into the selector.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::{
    ChatBackend, Config, Geocoder, MapView, WeatherBackend,
    backend::backend_from_config,
    chat::{ChatOrchestrator, ChatSurface, LocationCommand},
    display::WeatherSurface,
    geocode::geocoder_or_unconfigured,
    selector::{LocationSelector, Selection},
    weather::WeatherOrchestrator,
};

/// Everything outside the orchestration core.
pub struct Collaborators {
    pub weather_backend: Arc<dyn WeatherBackend>,
    pub chat_backend: Arc<dyn ChatBackend>,
    pub geocoder: Arc<dyn Geocoder>,
    pub map: Arc<dyn MapView>,
    pub weather_surface: Arc<dyn WeatherSurface>,
    pub chat_surface: Arc<dyn ChatSurface>,
}

#[derive(Debug, Clone)]
pub struct App {
    selector: Arc<LocationSelector>,
    chat: Arc<ChatOrchestrator>,
}

impl App {
    pub fn new(parts: Collaborators) -> (Self, CommandPump) {
        let (tx, rx) = mpsc::unbounded_channel();

        let weather = Arc::new(WeatherOrchestrator::new(
            parts.weather_backend,
            parts.weather_surface,
        ));
        let selector = Arc::new(LocationSelector::new(weather, parts.geocoder, parts.map));
        let chat = Arc::new(ChatOrchestrator::new(
            parts.chat_backend,
            parts.chat_surface,
            tx,
        ));

        let pump = CommandPump {
            commands: rx,
            selector: selector.clone(),
        };

        (Self { selector, chat }, pump)
    }

    /// Build an app talking to the configured server and geocoding service.
    /// Without a geocoding key the app still runs; markers just never move
    /// for city searches.
    pub fn from_config(
        config: &Config,
        map: Arc<dyn MapView>,
        weather_surface: Arc<dyn WeatherSurface>,
        chat_surface: Arc<dyn ChatSurface>,
    ) -> anyhow::Result<(Self, CommandPump)> {
        let backend = Arc::new(backend_from_config(config)?);
        let geocoder = geocoder_or_unconfigured(config)?;

        Ok(Self::new(Collaborators {
            weather_backend: backend.clone(),
            chat_backend: backend,
            geocoder,
            map,
            weather_surface,
            chat_surface,
        }))
    }

    pub fn selector(&self) -> &Arc<LocationSelector> {
        &self.selector
    }

    pub fn chat(&self) -> &Arc<ChatOrchestrator> {
        &self.chat
    }

    pub fn weather(&self) -> &Arc<WeatherOrchestrator> {
        self.selector.weather()
    }
}

/// Consumes [`LocationCommand`]s emitted by the chat side.
#[derive(Debug)]
pub struct CommandPump {
    commands: mpsc::UnboundedReceiver<LocationCommand>,
    selector: Arc<LocationSelector>,
}

impl CommandPump {
    /// Wait for the next command and run it to completion.
    /// Returns `None` once every sender is gone.
    pub async fn next(&mut self) -> Option<Selection> {
        let command = self.commands.recv().await?;
        Some(apply(&self.selector, command).await)
    }

    /// Run commands until the channel closes, each in its own task so a slow
    /// location flow never holds up the next one.
    pub async fn run(mut self) {
        while let Some(command) = self.commands.recv().await {
            let selector = self.selector.clone();
            tokio::spawn(async move {
                apply(&selector, command).await;
            });
        }
        tracing::debug!("location command channel closed");
    }
}

async fn apply(selector: &LocationSelector, command: LocationCommand) -> Selection {
    match command {
        LocationCommand::SearchCity(city) => {
            tracing::debug!(city = %city, "applying chat location change");
            selector
                .select(crate::LocationQuery::City { city })
                .await
        }
    }
}
