//! Map adapter: the single marker and the viewport it drives.

use parking_lot::Mutex;

use crate::Coordinates;

/// Initial view: the Indian subcontinent at country level.
pub const DEFAULT_CENTER: Coordinates = Coordinates {
    lat: 20.5937,
    lon: 78.9629,
};
pub const DEFAULT_ZOOM: u8 = 4;
/// Zoom applied whenever a marker is placed.
pub const MARKER_ZOOM: u8 = 8;

/// Anything that can show the selected location on a map.
pub trait MapView: Send + Sync {
    /// Remove the previous marker, place a new one at `at` and recenter on it.
    fn set_marker(&self, at: Coordinates);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center: Coordinates,
    pub zoom: u8,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker {
    /// Increases with every placement, so a replaced marker is distinguishable.
    pub id: u64,
    pub position: Coordinates,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapState {
    marker: Option<Marker>,
    viewport: Viewport,
    placed: u64,
}

impl Default for MapState {
    fn default() -> Self {
        Self {
            marker: None,
            viewport: Viewport {
                center: DEFAULT_CENTER,
                zoom: DEFAULT_ZOOM,
            },
            placed: 0,
        }
    }
}

impl MapState {
    /// Place a marker, returning the one it replaced.
    pub fn place_marker(&mut self, at: Coordinates) -> Option<Marker> {
        self.placed += 1;
        self.viewport = Viewport {
            center: at,
            zoom: MARKER_ZOOM,
        };
        self.marker.replace(Marker {
            id: self.placed,
            position: at,
        })
    }

    pub fn marker(&self) -> Option<Marker> {
        self.marker
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Total number of markers ever placed.
    pub fn placements(&self) -> u64 {
        self.placed
    }
}

/// In-memory map backing any front end.
#[derive(Debug, Default)]
pub struct MapAdapter {
    state: Mutex<MapState>,
}

impl MapAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> MapState {
        self.state.lock().clone()
    }
}

impl MapView for MapAdapter {
    fn set_marker(&self, at: Coordinates) {
        let replaced = self.state.lock().place_marker(at);
        tracing::info!(
            marker = %at,
            replaced = ?replaced.map(|m| m.id),
            "marker placed"
        );
    }
}
