use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Serialize;

use crate::{
    ChatReply, ClientError, LocationQuery, WeatherPayload,
    model::ChatRequest,
};

use super::{ChatBackend, WeatherBackend};

const WEATHER_ENDPOINT: &str = "/weather";
const CHAT_ENDPOINT: &str = "/chat";

/// JSON-over-HTTP client for the application server.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: String,
    http: Client,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Result<Self> {
        let trimmed = base_url.trim().trim_end_matches('/');
        Url::parse(trimmed).with_context(|| format!("Invalid backend URL '{base_url}'"))?;

        Ok(Self {
            base_url: trimmed.to_string(),
            http: Client::new(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST a JSON body and return the raw response text of a success status.
    async fn post_json<B: Serialize + ?Sized>(
        &self,
        endpoint: &'static str,
        body: &B,
    ) -> Result<String, ClientError> {
        let url = format!("{}{}", self.base_url, endpoint);

        let res = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|source| ClientError::Transport { endpoint, source })?;

        let status = res.status();
        let text = res
            .text()
            .await
            .map_err(|source| ClientError::Transport { endpoint, source })?;

        if !status.is_success() {
            return Err(ClientError::Status {
                endpoint,
                status,
                body: truncate_body(&text),
            });
        }

        Ok(text)
    }
}

#[async_trait]
impl WeatherBackend for HttpBackend {
    async fn weather(&self, query: &LocationQuery) -> Result<WeatherPayload, ClientError> {
        tracing::debug!(%query, "POST {WEATHER_ENDPOINT}");

        let body = self.post_json(WEATHER_ENDPOINT, query).await?;

        WeatherPayload::from_json(&body)
            .map_err(|source| ClientError::Decode {
                endpoint: WEATHER_ENDPOINT,
                source,
            })?
            .ok_or(ClientError::Malformed {
                endpoint: WEATHER_ENDPOINT,
            })
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn chat(&self, message: &str) -> Result<ChatReply, ClientError> {
        tracing::debug!(len = message.len(), "POST {CHAT_ENDPOINT}");

        let body = self
            .post_json(CHAT_ENDPOINT, &ChatRequest { message })
            .await?;

        serde_json::from_str(&body).map_err(|source| ClientError::Decode {
            endpoint: CHAT_ENDPOINT,
            source,
        })
    }
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
