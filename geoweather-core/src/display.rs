//! Weather display: pure projections of weather data into view surfaces.

use parking_lot::Mutex;

use crate::{CurrentConditions, ForecastDay, Notice};

/// The panels a weather result is rendered into.
pub trait WeatherSurface: Send + Sync {
    /// Replace the current-conditions panel content.
    fn replace_current(&self, block: String);

    /// Clear the forecast panel and draw `cards` in order.
    fn replace_forecast(&self, cards: Vec<ForecastCard>);

    /// Bring the current-conditions panel into view.
    fn scroll_to_current(&self);

    fn notify(&self, notice: Notice);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastCard {
    /// `DD/MM/YYYY`
    pub date: String,
    pub range: String,
    pub rain: String,
}

impl std::fmt::Display for ForecastCard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} | {} | {}", self.date, self.range, self.rain)
    }
}

pub fn render_current(current: &CurrentConditions) -> String {
    format!(
        "{}\n{:.1}°C\n{}\nHumidity: {}%\nWind Speed: {} m/s",
        current.city, current.temp, current.description, current.humidity, current.wind
    )
}

pub fn render_forecast(daily: &[ForecastDay]) -> Vec<ForecastCard> {
    daily
        .iter()
        .map(|day| ForecastCard {
            date: reformat_date(&day.date),
            range: format!("{}°C - {}°C", day.min, day.max),
            rain: format!("Rain: {}%", day.rain),
        })
        .collect()
}

/// `YYYY-MM-DD` to `DD/MM/YYYY` by position. Nothing is validated; missing
/// segments render empty.
pub fn reformat_date(date: &str) -> String {
    let parts: Vec<&str> = date.split('-').collect();
    let part = |idx: usize| parts.get(idx).copied().unwrap_or_default();

    format!("{}/{}/{}", part(2), part(1), part(0))
}

/// What the weather panels currently show.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PanelState {
    pub current: Option<String>,
    pub forecast: Vec<ForecastCard>,
    pub scrolls: usize,
    pub notices: Vec<Notice>,
}

/// In-memory weather panels.
#[derive(Debug, Default)]
pub struct WeatherPanels {
    state: Mutex<PanelState>,
}

impl WeatherPanels {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> PanelState {
        self.state.lock().clone()
    }
}

impl WeatherSurface for WeatherPanels {
    fn replace_current(&self, block: String) {
        self.state.lock().current = Some(block);
    }

    fn replace_forecast(&self, cards: Vec<ForecastCard>) {
        let mut state = self.state.lock();
        state.forecast.clear();
        state.forecast.extend(cards);
    }

    fn scroll_to_current(&self) {
        self.state.lock().scrolls += 1;
    }

    fn notify(&self, notice: Notice) {
        self.state.lock().notices.push(notice);
    }
}
