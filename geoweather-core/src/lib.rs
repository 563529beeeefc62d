//! Core library for the `geoweather` client.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Clients for the application server (`/weather`, `/chat`) and geocoding
//! - The map adapter and weather display projections
//! - Orchestrators keeping map marker, weather panels and chat transcript in step
//!
//! It is used by `geoweather-cli`, but any front end implementing the surface
//! traits can drive it.

pub mod app;
pub mod backend;
pub mod chat;
pub mod config;
pub mod display;
pub mod error;
pub mod geocode;
pub mod map;
pub mod model;
pub mod selector;
pub mod weather;

#[cfg(test)]
mod testutil;

pub use app::{App, Collaborators, CommandPump};
pub use backend::{ChatBackend, WeatherBackend, http::HttpBackend};
pub use chat::{ChatExchange, ChatOrchestrator, ChatSurface, LocationCommand, Transcript};
pub use config::{Config, GeocodingConfig};
pub use display::{ForecastCard, WeatherPanels, WeatherSurface};
pub use error::{ClientError, Notice};
pub use geocode::{Geocoder, OpenWeatherGeocoder, UnconfiguredGeocoder};
pub use map::{MapAdapter, MapView};
pub use model::{
    ChatMessage, ChatReply, Coordinates, CurrentConditions, ForecastDay, LocationQuery, Sender,
    WeatherPayload, WeatherResult,
};
pub use selector::{LocationSelector, MarkerOutcome, Selection};
pub use weather::{FetchOutcome, WeatherOrchestrator};
