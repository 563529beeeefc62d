//! Forward geocoding: turn a city name into map coordinates.
//! Backed by the OpenWeather direct-geocoding API.

use anyhow::{Context, anyhow};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use std::{fmt::Debug, sync::Arc};

use crate::{ClientError, Config, Coordinates, backend::http::truncate_body};

pub const DEFAULT_GEOCODING_URL: &str = "https://api.openweathermap.org/geo/1.0/direct";

const GEOCODING_ENDPOINT: &str = "geocoding";

#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    /// Resolve `city` to the best candidate. `Ok(None)` means no candidates.
    async fn geocode(&self, city: &str) -> Result<Option<Coordinates>, ClientError>;
}

#[derive(Debug, Clone)]
pub struct OpenWeatherGeocoder {
    api_key: String,
    endpoint: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct GeoCandidate {
    lat: f64,
    lon: f64,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    country: Option<String>,
}

impl OpenWeatherGeocoder {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            endpoint: DEFAULT_GEOCODING_URL.to_string(),
            http: Client::new(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl Geocoder for OpenWeatherGeocoder {
    async fn geocode(&self, city: &str) -> Result<Option<Coordinates>, ClientError> {
        let res = self
            .http
            .get(&self.endpoint)
            .query(&[("q", city), ("limit", "1"), ("appid", self.api_key.as_str())])
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                endpoint: GEOCODING_ENDPOINT,
                source,
            })?;

        let status = res.status();
        let body = res.text().await.map_err(|source| ClientError::Transport {
            endpoint: GEOCODING_ENDPOINT,
            source,
        })?;

        if !status.is_success() {
            return Err(ClientError::Status {
                endpoint: GEOCODING_ENDPOINT,
                status,
                body: truncate_body(&body),
            });
        }

        let candidates: Vec<GeoCandidate> =
            serde_json::from_str(&body).map_err(|source| ClientError::Decode {
                endpoint: GEOCODING_ENDPOINT,
                source,
            })?;

        Ok(candidates.into_iter().next().map(|hit| {
            tracing::debug!(
                city,
                name = hit.name.as_deref().unwrap_or("?"),
                country = hit.country.as_deref().unwrap_or("?"),
                "geocoded"
            );
            Coordinates::new(hit.lat, hit.lon)
        }))
    }
}

/// Stands in when no API key is configured. Every lookup fails, so the
/// marker stays put while weather fetches carry on.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredGeocoder;

#[async_trait]
impl Geocoder for UnconfiguredGeocoder {
    async fn geocode(&self, _city: &str) -> Result<Option<Coordinates>, ClientError> {
        Err(ClientError::Unconfigured {
            endpoint: GEOCODING_ENDPOINT,
        })
    }
}

/// Like [`geocoder_from_config`], but a missing API key yields an
/// [`UnconfiguredGeocoder`] instead of an error.
pub fn geocoder_or_unconfigured(config: &Config) -> anyhow::Result<Arc<dyn Geocoder>> {
    if !config.is_geocoding_configured() {
        tracing::warn!(
            "No geocoding API key configured; city searches will not move the map marker. \
             Hint: run `geoweather configure` and enter your OpenWeather API key."
        );
        return Ok(Arc::new(UnconfiguredGeocoder));
    }

    Ok(Arc::new(geocoder_from_config(config)?))
}

/// Construct the geocoder from config.
pub fn geocoder_from_config(config: &Config) -> anyhow::Result<OpenWeatherGeocoder> {
    let api_key = config.geocoding_api_key().ok_or_else(|| {
        anyhow!(
            "No geocoding API key configured.\n\
                 Hint: run `geoweather configure` and enter your OpenWeather API key."
        )
    })?;

    let geocoder = OpenWeatherGeocoder::new(api_key.to_owned());

    match config.geocoding_endpoint() {
        Some(endpoint) => {
            Url::parse(endpoint)
                .with_context(|| format!("Invalid geocoding endpoint '{endpoint}'"))?;
            Ok(geocoder.with_endpoint(endpoint))
        }
        None => Ok(geocoder),
    }
}
