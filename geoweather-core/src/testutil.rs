//! In-memory collaborators for unit tests.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::StatusCode;
use tokio::sync::{mpsc, oneshot};

use crate::{
    ChatBackend, ChatMessage, ChatReply, ClientError, Coordinates, CurrentConditions,
    ForecastDay, Geocoder, LocationQuery, MapView, WeatherBackend, WeatherPayload, WeatherResult,
    chat::ChatSurface,
};

pub fn sample_result(city: &str) -> WeatherResult {
    WeatherResult {
        current: CurrentConditions {
            city: city.to_string(),
            temp: 21.0,
            description: "scattered clouds".into(),
            humidity: 55,
            wind: 3.4,
        },
        daily: vec![
            ForecastDay { date: "2024-03-07".into(), min: 14.0, max: 23.0, rain: 10 },
            ForecastDay { date: "2024-03-08".into(), min: 15.0, max: 24.0, rain: 60 },
        ],
    }
}

pub fn status_error(endpoint: &'static str) -> ClientError {
    ClientError::Status {
        endpoint,
        status: StatusCode::INTERNAL_SERVER_ERROR,
        body: "boom".into(),
    }
}

/// Answers weather requests from a queue, in call order.
#[derive(Debug, Default)]
pub struct ScriptedWeatherBackend {
    responses: Mutex<VecDeque<Result<WeatherPayload, ClientError>>>,
    calls: Mutex<Vec<LocationQuery>>,
}

impl ScriptedWeatherBackend {
    pub fn new(responses: Vec<Result<WeatherPayload, ClientError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::default(),
        }
    }

    pub fn calls(&self) -> Vec<LocationQuery> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl WeatherBackend for ScriptedWeatherBackend {
    async fn weather(&self, query: &LocationQuery) -> Result<WeatherPayload, ClientError> {
        self.calls.lock().push(query.clone());
        self.responses
            .lock()
            .pop_front()
            .unwrap_or(Err(ClientError::Malformed { endpoint: "/weather" }))
    }
}

/// Holds each weather request until the test releases it.
#[derive(Debug)]
pub struct GatedWeatherBackend {
    gates: Mutex<HashMap<String, oneshot::Receiver<Result<WeatherPayload, ClientError>>>>,
    seen: mpsc::UnboundedSender<String>,
}

impl GatedWeatherBackend {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (seen, seen_rx) = mpsc::unbounded_channel();
        let backend = Self {
            gates: Mutex::default(),
            seen,
        };
        (backend, seen_rx)
    }

    /// Register a gate for `label`; sending on the returned half releases it.
    pub fn gate(&self, label: &str) -> oneshot::Sender<Result<WeatherPayload, ClientError>> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().insert(label.to_string(), rx);
        tx
    }
}

#[async_trait]
impl WeatherBackend for GatedWeatherBackend {
    async fn weather(&self, query: &LocationQuery) -> Result<WeatherPayload, ClientError> {
        let label = query.to_string();
        let gate = self.gates.lock().remove(&label);
        let _ = self.seen.send(label);

        match gate {
            Some(rx) => rx.await.unwrap_or(Err(ClientError::Malformed { endpoint: "/weather" })),
            None => Err(ClientError::Malformed { endpoint: "/weather" }),
        }
    }
}

#[derive(Debug, Default)]
pub struct ScriptedGeocoder {
    answers: Mutex<HashMap<String, Result<Option<Coordinates>, ClientError>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedGeocoder {
    pub fn with(self, city: &str, answer: Result<Option<Coordinates>, ClientError>) -> Self {
        self.answers.lock().insert(city.to_string(), answer);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl Geocoder for ScriptedGeocoder {
    async fn geocode(&self, city: &str) -> Result<Option<Coordinates>, ClientError> {
        self.calls.lock().push(city.to_string());
        self.answers.lock().remove(city).unwrap_or(Ok(None))
    }
}

/// Holds each geocode lookup until the test releases it.
#[derive(Debug)]
pub struct GatedGeocoder {
    gates: Mutex<HashMap<String, oneshot::Receiver<Result<Option<Coordinates>, ClientError>>>>,
    seen: mpsc::UnboundedSender<String>,
}

impl GatedGeocoder {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (seen, seen_rx) = mpsc::unbounded_channel();
        let geocoder = Self {
            gates: Mutex::default(),
            seen,
        };
        (geocoder, seen_rx)
    }

    pub fn gate(&self, city: &str) -> oneshot::Sender<Result<Option<Coordinates>, ClientError>> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().insert(city.to_string(), rx);
        tx
    }
}

#[async_trait]
impl Geocoder for GatedGeocoder {
    async fn geocode(&self, city: &str) -> Result<Option<Coordinates>, ClientError> {
        let gate = self.gates.lock().remove(city);
        let _ = self.seen.send(city.to_string());

        match gate {
            Some(rx) => rx.await.unwrap_or(Ok(None)),
            None => Ok(None),
        }
    }
}

#[derive(Debug, Default)]
pub struct ScriptedChatBackend {
    replies: Mutex<VecDeque<Result<ChatReply, ClientError>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedChatBackend {
    pub fn new(replies: Vec<Result<ChatReply, ClientError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::default(),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl ChatBackend for ScriptedChatBackend {
    async fn chat(&self, message: &str) -> Result<ChatReply, ClientError> {
        self.calls.lock().push(message.to_string());
        self.replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(status_error("/chat")))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    Append(ChatMessage),
    ClearInput,
    Visible(bool),
}

#[derive(Debug, Default)]
pub struct RecordingChatSurface {
    events: Mutex<Vec<ChatEvent>>,
}

impl RecordingChatSurface {
    pub fn events(&self) -> Vec<ChatEvent> {
        self.events.lock().clone()
    }
}

impl ChatSurface for RecordingChatSurface {
    fn append(&self, message: &ChatMessage) {
        self.events.lock().push(ChatEvent::Append(message.clone()));
    }

    fn clear_input(&self) {
        self.events.lock().push(ChatEvent::ClearInput);
    }

    fn set_visible(&self, visible: bool) {
        self.events.lock().push(ChatEvent::Visible(visible));
    }
}

#[derive(Debug, Default)]
pub struct RecordingMap {
    markers: Mutex<Vec<Coordinates>>,
}

impl RecordingMap {
    pub fn markers(&self) -> Vec<Coordinates> {
        self.markers.lock().clone()
    }
}

impl MapView for RecordingMap {
    fn set_marker(&self, at: Coordinates) {
        self.markers.lock().push(at);
    }
}
