use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A point on the map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lon)
    }
}

/// Where to fetch weather for. Serializes to the `/weather` request body:
/// `{ "lat": .., "lon": .. }` or `{ "city": .. }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LocationQuery {
    Coordinates(Coordinates),
    City { city: String },
}

impl LocationQuery {
    /// Build a city query from raw user input. Blank input yields `None`.
    pub fn city(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return None;
        }

        Some(LocationQuery::City {
            city: trimmed.to_string(),
        })
    }

    pub fn coordinates(lat: f64, lon: f64) -> Self {
        LocationQuery::Coordinates(Coordinates::new(lat, lon))
    }

    pub fn city_name(&self) -> Option<&str> {
        match self {
            LocationQuery::City { city } => Some(city),
            LocationQuery::Coordinates(_) => None,
        }
    }
}

impl std::fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocationQuery::Coordinates(at) => write!(f, "({at})"),
            LocationQuery::City { city } => f.write_str(city),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub city: String,
    /// Degrees Celsius.
    pub temp: f64,
    pub description: String,
    /// Relative humidity, percent.
    pub humidity: u8,
    /// Metres per second.
    pub wind: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    /// `YYYY-MM-DD`, kept as sent by the backend.
    pub date: String,
    pub min: f64,
    pub max: f64,
    /// Probability of precipitation, percent.
    pub rain: u8,
}

/// A resolved weather answer for one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherResult {
    pub current: CurrentConditions,
    pub daily: Vec<ForecastDay>,
}

/// Decoded body of a successful `/weather` exchange.
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherPayload {
    Found(WeatherResult),
    /// The backend could not resolve the location.
    NotFound,
}

#[derive(Debug, Deserialize)]
struct RawWeatherPayload {
    #[serde(default)]
    error: Value,
    current: Option<CurrentConditions>,
    #[serde(default)]
    daily: Vec<ForecastDay>,
}

impl WeatherPayload {
    /// Decode a `/weather` response body.
    ///
    /// A truthy `error` value marks the location as not found, regardless of
    /// what else the body carries. `null`, `false`, `0` and `""` are falsy.
    pub fn from_json(body: &str) -> Result<Option<Self>, serde_json::Error> {
        let raw: RawWeatherPayload = serde_json::from_str(body)?;

        if is_truthy(&raw.error) {
            return Ok(Some(WeatherPayload::NotFound));
        }

        Ok(raw.current.map(|current| {
            WeatherPayload::Found(WeatherResult {
                current,
                daily: raw.daily,
            })
        }))
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
}

/// Body of a successful `/chat` exchange.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatReply {
    pub reply: String,
    #[serde(default)]
    pub city_update: Option<String>,
}

impl ChatReply {
    /// The city the backend asked the client to switch to, if any.
    pub fn city_update(&self) -> Option<&str> {
        self.city_update
            .as_deref()
            .map(str::trim)
            .filter(|city| !city.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Bot => "bot",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Bot,
            text: text.into(),
        }
    }
}
