//! Location selector: turns a map click or a city search into a marker
//! placement plus an independent weather fetch.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use parking_lot::Mutex;

use crate::{
    Coordinates, Geocoder, LocationQuery, MapView,
    weather::{FetchOutcome, WeatherOrchestrator},
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarkerOutcome {
    Placed(Coordinates),
    /// Geocoding found no candidates; the marker stays where it was.
    NotFound,
    /// Geocoding failed; the marker stays where it was.
    Unavailable,
    /// A newer selection already placed its marker.
    Superseded,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection {
    pub marker: MarkerOutcome,
    pub weather: FetchOutcome,
}

pub struct LocationSelector {
    weather: Arc<WeatherOrchestrator>,
    geocoder: Arc<dyn Geocoder>,
    map: Arc<dyn MapView>,
    selections: AtomicU64,
    /// Selection ticket of the marker currently on the map.
    marker_ticket: Mutex<u64>,
}

impl LocationSelector {
    pub fn new(
        weather: Arc<WeatherOrchestrator>,
        geocoder: Arc<dyn Geocoder>,
        map: Arc<dyn MapView>,
    ) -> Self {
        Self {
            weather,
            geocoder,
            map,
            selections: AtomicU64::new(0),
            marker_ticket: Mutex::new(0),
        }
    }

    pub fn weather(&self) -> &Arc<WeatherOrchestrator> {
        &self.weather
    }

    /// A map click: the coordinates are exact, so the marker moves at once.
    pub async fn click(&self, at: Coordinates) -> Selection {
        self.select(LocationQuery::Coordinates(at)).await
    }

    /// A city search from free text. Blank input is ignored.
    pub async fn search_city(&self, input: &str) -> Option<Selection> {
        let query = LocationQuery::city(input)?;
        Some(self.select(query).await)
    }

    pub async fn select(&self, query: LocationQuery) -> Selection {
        let ticket = self.selections.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(ticket, %query, "location selected");

        match &query {
            LocationQuery::Coordinates(at) => {
                let marker = self.place_marker(ticket, *at);
                let weather = self.weather.fetch_weather(&query).await;
                Selection { marker, weather }
            }
            LocationQuery::City { city } => {
                // The backend resolves the name on its own, so the fetch does
                // not wait for geocoding.
                let (marker, weather) =
                    tokio::join!(self.locate(ticket, city), self.weather.fetch_weather(&query));
                Selection { marker, weather }
            }
        }
    }

    async fn locate(&self, ticket: u64, city: &str) -> MarkerOutcome {
        match self.geocoder.geocode(city).await {
            Ok(Some(at)) => self.place_marker(ticket, at),
            Ok(None) => {
                tracing::debug!(city, "geocoding found no candidates");
                MarkerOutcome::NotFound
            }
            Err(err) => {
                tracing::warn!(city, error = %err, "geocode error");
                MarkerOutcome::Unavailable
            }
        }
    }

    fn place_marker(&self, ticket: u64, at: Coordinates) -> MarkerOutcome {
        let mut current = self.marker_ticket.lock();
        if ticket <= *current {
            tracing::debug!(ticket, current = *current, "dropping superseded marker");
            return MarkerOutcome::Superseded;
        }

        *current = ticket;
        self.map.set_marker(at);
        MarkerOutcome::Placed(at)
    }
}

impl std::fmt::Debug for LocationSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationSelector")
            .field("geocoder", &self.geocoder)
            .field("selections", &self.selections)
            .finish_non_exhaustive()
    }
}
