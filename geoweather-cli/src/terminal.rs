use std::sync::atomic::{AtomicBool, Ordering};

use geoweather_core::{
    ChatMessage, ChatSurface, Coordinates, ForecastCard, MapAdapter, MapView, Notice, Sender,
    WeatherPanels, WeatherSurface, display::PanelState,
};
use tokio::sync::mpsc;

/// One line of terminal output, tagged with the stream it belongs on.
#[derive(Debug, Clone, PartialEq)]
pub enum Line {
    Out(String),
    Err(String),
}

/// Terminal rendering of the map, weather panels and chat box.
///
/// Surfaces are updated from background tasks, so nothing is printed here
/// directly: lines are queued and printed by [`OutputQueue::flush`] while no
/// prompt owns the terminal.
#[derive(Debug)]
pub struct TerminalView {
    panels: WeatherPanels,
    map: MapAdapter,
    chat_visible: AtomicBool,
    out: mpsc::UnboundedSender<Line>,
}

impl TerminalView {
    pub fn new() -> (Self, OutputQueue) {
        let (out, lines) = mpsc::unbounded_channel();
        let view = Self {
            panels: WeatherPanels::new(),
            map: MapAdapter::new(),
            chat_visible: AtomicBool::new(false),
            out,
        };
        (view, OutputQueue { lines })
    }

    fn emit(&self, line: Line) {
        // Closed only during shutdown.
        let _ = self.out.send(line);
    }
}

/// Output queued by a [`TerminalView`].
#[derive(Debug)]
pub struct OutputQueue {
    lines: mpsc::UnboundedReceiver<Line>,
}

impl OutputQueue {
    /// Take every line queued so far without waiting for more.
    pub fn drain(&mut self) -> Vec<Line> {
        let mut drained = Vec::new();
        while let Ok(line) = self.lines.try_recv() {
            drained.push(line);
        }
        drained
    }

    pub fn flush(&mut self) {
        for line in self.drain() {
            match line {
                Line::Out(text) => println!("{text}"),
                Line::Err(text) => eprintln!("{text}"),
            }
        }
    }
}

impl WeatherSurface for TerminalView {
    fn replace_current(&self, block: String) {
        self.panels.replace_current(block);
    }

    fn replace_forecast(&self, cards: Vec<ForecastCard>) {
        self.panels.replace_forecast(cards);
    }

    fn scroll_to_current(&self) {
        self.panels.scroll_to_current();
        self.emit(Line::Out(format_panels(&self.panels.snapshot())));
    }

    fn notify(&self, notice: Notice) {
        self.panels.notify(notice);
        self.emit(Line::Err(format!("! {notice}")));
    }
}

impl MapView for TerminalView {
    fn set_marker(&self, at: Coordinates) {
        self.map.set_marker(at);
        let viewport = self.map.snapshot().viewport();
        self.emit(Line::Out(format!("marker -> {at} (zoom {})", viewport.zoom)));
    }
}

impl ChatSurface for TerminalView {
    fn append(&self, message: &ChatMessage) {
        if self.chat_visible.load(Ordering::SeqCst) {
            self.emit(Line::Out(format_chat_line(message)));
        }
    }

    fn clear_input(&self) {
        // The prompt line is consumed on submit.
    }

    fn set_visible(&self, visible: bool) {
        self.chat_visible.store(visible, Ordering::SeqCst);
        let state = if visible { "shown" } else { "hidden" };
        self.emit(Line::Out(format!("[chat {state}]")));
    }
}

pub fn format_panels(state: &PanelState) -> String {
    let mut out = String::new();

    if let Some(current) = &state.current {
        for line in current.lines() {
            out.push_str("  ");
            out.push_str(line);
            out.push('\n');
        }
    }

    if !state.forecast.is_empty() {
        out.push_str("  Forecast:\n");
        for card in &state.forecast {
            out.push_str(&format!("    {card}\n"));
        }
    }

    out.trim_end().to_string()
}

pub fn format_chat_line(message: &ChatMessage) -> String {
    let who = match message.sender {
        Sender::User => "you",
        Sender::Bot => "bot",
    };
    format!("{who}> {}", message.text)
}
