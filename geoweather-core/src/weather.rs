//! Weather orchestrator: one query in, at most one rendering pass out.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use parking_lot::Mutex;

use crate::{
    LocationQuery, Notice, WeatherBackend, WeatherPayload, WeatherResult,
    display::{WeatherSurface, render_current, render_forecast},
};

/// How a single weather fetch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Stored and rendered.
    Rendered,
    /// The backend could not resolve the location.
    NotFound,
    /// Transport, status or decode failure.
    Failed,
    /// A newer request was already committed; this response was dropped.
    Superseded,
}

#[derive(Debug, Default)]
struct WeatherState {
    stored: Option<WeatherResult>,
    /// Ticket of the last response that reached the display.
    committed: u64,
}

pub struct WeatherOrchestrator {
    backend: Arc<dyn WeatherBackend>,
    surface: Arc<dyn WeatherSurface>,
    tickets: AtomicU64,
    state: Mutex<WeatherState>,
}

impl WeatherOrchestrator {
    pub fn new(backend: Arc<dyn WeatherBackend>, surface: Arc<dyn WeatherSurface>) -> Self {
        Self {
            backend,
            surface,
            tickets: AtomicU64::new(0),
            state: Mutex::default(),
        }
    }

    /// Fetch weather for `query` and, unless a newer fetch already landed,
    /// commit the outcome to the display.
    pub async fn fetch_weather(&self, query: &LocationQuery) -> FetchOutcome {
        let ticket = self.tickets.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(ticket, %query, "weather requested");

        let response = self.backend.weather(query).await;

        // Held through rendering so two responses never interleave.
        let mut state = self.state.lock();

        if ticket <= state.committed {
            tracing::debug!(
                ticket,
                committed = state.committed,
                %query,
                "dropping superseded weather response"
            );
            return FetchOutcome::Superseded;
        }

        match response {
            Ok(WeatherPayload::Found(result)) => {
                tracing::info!(ticket, city = %result.current.city, days = result.daily.len(), "weather committed");

                state.committed = ticket;
                self.surface.replace_current(render_current(&result.current));
                self.surface.replace_forecast(render_forecast(&result.daily));
                state.stored = Some(result);
                self.surface.scroll_to_current();

                FetchOutcome::Rendered
            }
            Ok(WeatherPayload::NotFound) => {
                tracing::warn!(ticket, %query, "backend could not resolve location");
                self.surface.notify(Notice::LocationNotFound);
                FetchOutcome::NotFound
            }
            Err(err) => {
                tracing::warn!(ticket, %query, error = %err, "weather fetch failed");
                self.surface.notify(Notice::WeatherUnavailable);
                FetchOutcome::Failed
            }
        }
    }

    /// The most recent successfully rendered result.
    pub fn stored(&self) -> Option<WeatherResult> {
        self.state.lock().stored.clone()
    }
}

impl std::fmt::Debug for WeatherOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherOrchestrator")
            .field("backend", &self.backend)
            .field("tickets", &self.tickets)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::WeatherPanels;
    use crate::testutil::{GatedWeatherBackend, ScriptedWeatherBackend, sample_result, status_error};

    fn orchestrator(
        backend: Arc<dyn WeatherBackend>,
    ) -> (WeatherOrchestrator, Arc<WeatherPanels>) {
        let panels = Arc::new(WeatherPanels::new());
        (WeatherOrchestrator::new(backend, panels.clone()), panels)
    }

    #[tokio::test]
    async fn success_stores_renders_and_scrolls() {
        let backend = Arc::new(ScriptedWeatherBackend::new(vec![Ok(WeatherPayload::Found(
            sample_result("Delhi"),
        ))]));
        let (weather, panels) = orchestrator(backend.clone());

        let outcome = weather
            .fetch_weather(&LocationQuery::city("Delhi").unwrap())
            .await;

        assert_eq!(outcome, FetchOutcome::Rendered);
        assert_eq!(weather.stored(), Some(sample_result("Delhi")));

        let shown = panels.snapshot();
        assert!(shown.current.as_deref().unwrap().starts_with("Delhi\n21.0°C"));
        assert_eq!(shown.forecast.len(), 2);
        assert_eq!(shown.forecast[0].date, "07/03/2024");
        assert_eq!(shown.scrolls, 1);
        assert!(shown.notices.is_empty());
        assert_eq!(backend.calls().len(), 1);
    }

    #[tokio::test]
    async fn not_found_keeps_prior_state() {
        let backend = Arc::new(ScriptedWeatherBackend::new(vec![
            Ok(WeatherPayload::Found(sample_result("Delhi"))),
            Ok(WeatherPayload::NotFound),
        ]));
        let (weather, panels) = orchestrator(backend);

        weather.fetch_weather(&LocationQuery::city("Delhi").unwrap()).await;
        let before = panels.snapshot();

        let outcome = weather
            .fetch_weather(&LocationQuery::city("Atlantis").unwrap())
            .await;

        assert_eq!(outcome, FetchOutcome::NotFound);
        assert_eq!(weather.stored(), Some(sample_result("Delhi")));

        let after = panels.snapshot();
        assert_eq!(after.current, before.current);
        assert_eq!(after.forecast, before.forecast);
        assert_eq!(after.notices, vec![Notice::LocationNotFound]);
    }

    #[tokio::test]
    async fn transport_failure_reports_generic_notice() {
        let backend = Arc::new(ScriptedWeatherBackend::new(vec![Err(status_error("/weather"))]));
        let (weather, panels) = orchestrator(backend);

        let outcome = weather
            .fetch_weather(&LocationQuery::coordinates(10.0, 20.0))
            .await;

        assert_eq!(outcome, FetchOutcome::Failed);
        assert_eq!(weather.stored(), None);

        let shown = panels.snapshot();
        assert_eq!(shown.notices, vec![Notice::WeatherUnavailable]);
        assert_eq!(shown.current, None);
        assert_eq!(shown.scrolls, 0);
    }

    #[tokio::test]
    async fn stale_response_is_dropped_after_newer_commit() {
        let (backend, mut seen) = GatedWeatherBackend::new();
        let release_old = backend.gate("Berlin");
        let release_new = backend.gate("Madrid");
        let (weather, panels) = orchestrator(Arc::new(backend));
        let weather = Arc::new(weather);

        let old = tokio::spawn({
            let weather = weather.clone();
            async move { weather.fetch_weather(&LocationQuery::city("Berlin").unwrap()).await }
        });
        assert_eq!(seen.recv().await.as_deref(), Some("Berlin"));

        let new = tokio::spawn({
            let weather = weather.clone();
            async move { weather.fetch_weather(&LocationQuery::city("Madrid").unwrap()).await }
        });
        assert_eq!(seen.recv().await.as_deref(), Some("Madrid"));

        release_new
            .send(Ok(WeatherPayload::Found(sample_result("Madrid"))))
            .unwrap();
        assert_eq!(new.await.unwrap(), FetchOutcome::Rendered);

        release_old
            .send(Ok(WeatherPayload::Found(sample_result("Berlin"))))
            .unwrap();
        assert_eq!(old.await.unwrap(), FetchOutcome::Superseded);

        assert_eq!(weather.stored().unwrap().current.city, "Madrid");
        let shown = panels.snapshot();
        assert!(shown.current.unwrap().starts_with("Madrid"));
        assert_eq!(shown.scrolls, 1);
    }

    #[tokio::test]
    async fn in_order_responses_both_render() {
        let (backend, mut seen) = GatedWeatherBackend::new();
        let release_old = backend.gate("Berlin");
        let release_new = backend.gate("Madrid");
        let (weather, panels) = orchestrator(Arc::new(backend));
        let weather = Arc::new(weather);

        let old = tokio::spawn({
            let weather = weather.clone();
            async move { weather.fetch_weather(&LocationQuery::city("Berlin").unwrap()).await }
        });
        seen.recv().await;
        let new = tokio::spawn({
            let weather = weather.clone();
            async move { weather.fetch_weather(&LocationQuery::city("Madrid").unwrap()).await }
        });
        seen.recv().await;

        release_old
            .send(Ok(WeatherPayload::Found(sample_result("Berlin"))))
            .unwrap();
        assert_eq!(old.await.unwrap(), FetchOutcome::Rendered);

        release_new
            .send(Ok(WeatherPayload::Found(sample_result("Madrid"))))
            .unwrap();
        assert_eq!(new.await.unwrap(), FetchOutcome::Rendered);

        assert_eq!(weather.stored().unwrap().current.city, "Madrid");
        assert_eq!(panels.snapshot().scrolls, 2);
    }

    #[tokio::test]
    async fn stale_failure_is_silent() {
        let (backend, mut seen) = GatedWeatherBackend::new();
        let release_old = backend.gate("Berlin");
        let release_new = backend.gate("Madrid");
        let (weather, panels) = orchestrator(Arc::new(backend));
        let weather = Arc::new(weather);

        let old = tokio::spawn({
            let weather = weather.clone();
            async move { weather.fetch_weather(&LocationQuery::city("Berlin").unwrap()).await }
        });
        seen.recv().await;
        let new = tokio::spawn({
            let weather = weather.clone();
            async move { weather.fetch_weather(&LocationQuery::city("Madrid").unwrap()).await }
        });
        seen.recv().await;

        release_new
            .send(Ok(WeatherPayload::Found(sample_result("Madrid"))))
            .unwrap();
        new.await.unwrap();

        release_old.send(Err(status_error("/weather"))).unwrap();
        assert_eq!(old.await.unwrap(), FetchOutcome::Superseded);

        assert!(panels.snapshot().notices.is_empty());
    }
}
