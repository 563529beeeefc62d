//! Chat orchestrator: transcript bookkeeping and chat-driven location changes.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::{ChatBackend, ChatMessage};

pub const CHAT_FALLBACK_REPLY: &str = "Something went wrong.";

/// A request from the chat side to move the selected location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationCommand {
    SearchCity(String),
}

/// Where the transcript is shown and where the user types.
pub trait ChatSurface: Send + Sync {
    fn append(&self, message: &ChatMessage);

    fn clear_input(&self);

    fn set_visible(&self, visible: bool);
}

/// Ordered, append-only log of chat messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// How one chat exchange ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatExchange {
    Replied { city_update: Option<String> },
    Failed,
}

pub struct ChatOrchestrator {
    backend: Arc<dyn ChatBackend>,
    surface: Arc<dyn ChatSurface>,
    commands: mpsc::UnboundedSender<LocationCommand>,
    transcript: Mutex<Transcript>,
    visible: AtomicBool,
}

impl ChatOrchestrator {
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        surface: Arc<dyn ChatSurface>,
        commands: mpsc::UnboundedSender<LocationCommand>,
    ) -> Self {
        Self {
            backend,
            surface,
            commands,
            transcript: Mutex::default(),
            visible: AtomicBool::new(false),
        }
    }

    /// Send `text` to the chat backend. Blank input is ignored and yields `None`.
    pub async fn send_message(&self, text: &str) -> Option<ChatExchange> {
        let message = text.trim();
        if message.is_empty() {
            return None;
        }

        self.append(ChatMessage::user(message));
        self.surface.clear_input();

        let exchange = match self.backend.chat(message).await {
            Ok(reply) => {
                self.append(ChatMessage::bot(reply.reply.as_str()));

                let city_update = reply.city_update().map(str::to_string);
                if let Some(city) = &city_update {
                    tracing::info!(city = %city, "chat requested a location change");
                    if self
                        .commands
                        .send(LocationCommand::SearchCity(city.clone()))
                        .is_err()
                    {
                        tracing::warn!(city = %city, "location command channel closed");
                    }
                }

                ChatExchange::Replied { city_update }
            }
            Err(err) => {
                tracing::warn!(error = %err, "chat error");
                self.append(ChatMessage::bot(CHAT_FALLBACK_REPLY));
                ChatExchange::Failed
            }
        };

        Some(exchange)
    }

    /// Show or hide the chat box, returning the new visibility.
    pub fn toggle_visibility(&self) -> bool {
        let visible = !self.visible.fetch_xor(true, Ordering::SeqCst);
        self.surface.set_visible(visible);
        visible
    }

    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }

    pub fn transcript(&self) -> Transcript {
        self.transcript.lock().clone()
    }

    fn append(&self, message: ChatMessage) {
        let mut transcript = self.transcript.lock();
        self.surface.append(&message);
        transcript.push(message);
    }
}

impl std::fmt::Debug for ChatOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatOrchestrator")
            .field("backend", &self.backend)
            .field("visible", &self.visible)
            .finish_non_exhaustive()
    }
}
