use crate::{
    ChatReply, ClientError, Config, LocationQuery, WeatherPayload, backend::http::HttpBackend,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod http;

/// The server-side `/weather` endpoint.
#[async_trait]
pub trait WeatherBackend: Send + Sync + Debug {
    async fn weather(&self, query: &LocationQuery) -> Result<WeatherPayload, ClientError>;
}

/// The server-side `/chat` endpoint.
#[async_trait]
pub trait ChatBackend: Send + Sync + Debug {
    async fn chat(&self, message: &str) -> Result<ChatReply, ClientError>;
}

/// Construct the HTTP backend pointed at the configured server.
pub fn backend_from_config(config: &Config) -> anyhow::Result<HttpBackend> {
    HttpBackend::new(config.backend_url())
}
