//! Critical sector overlays: interactive drawing and persisted display.
//!
//! Both halves share the coordinate transforms and the overlay bookkeeping,
//! so they live on one manager, [`SectorOverlays`]. Drawing is in the
//! `drawing` submodule, rendering of stored sectors in `display`.
//!
//! The manager owns only the overlays it created. It never touches elements
//! created by [`MarkerOverlays`](crate::markers::MarkerOverlays) even though
//! both share the same viewer.

mod display;
mod drawing;

use std::collections::{BTreeMap, HashMap};

use siteplan_viewer::{ElementId, TrackerId};

use crate::config::{AppearanceConfig, OverlayConfig};
use crate::event::OverlayEvent;
use crate::model::{CriticalSector, SectorId};
use crate::pointer::{ClickThresholds, PointerTracker};

pub use drawing::DrawingState;
use drawing::DrawingSession;

/// Bookkeeping for one displayed sector.
#[derive(Debug)]
struct SectorEntry {
    element: ElementId,
    tracker: PointerTracker,
    sector: CriticalSector,
    /// Rendered with a fixed pixel size that must be refreshed on zoom
    fixed_size: bool,
}

/// Sector drawing and display manager.
#[derive(Debug)]
pub struct SectorOverlays {
    sectors: BTreeMap<SectorId, SectorEntry>,
    trackers: HashMap<TrackerId, SectorId>,
    session: DrawingSession,
    can_manage: bool,
    thresholds: ClickThresholds,
    polygon_close_px: f64,
    appearance: AppearanceConfig,
    events: Vec<OverlayEvent>,
}

impl SectorOverlays {
    /// Create a manager. `can_manage` gates the delete button on sectors.
    pub fn new(config: &OverlayConfig, can_manage: bool) -> Self {
        Self {
            sectors: BTreeMap::new(),
            trackers: HashMap::new(),
            session: DrawingSession::default(),
            can_manage,
            thresholds: ClickThresholds::from(&config.interaction),
            polygon_close_px: config.interaction.polygon_close_px,
            appearance: config.appearance,
            events: Vec::new(),
        }
    }

    pub fn can_manage(&self) -> bool {
        self.can_manage
    }

    /// Whether a pointer tracker belongs to one of the displayed sectors.
    pub fn owns_tracker(&self, tracker: TrackerId) -> bool {
        self.trackers.contains_key(&tracker)
    }

    pub fn get(&self, id: SectorId) -> Option<&CriticalSector> {
        self.sectors.get(&id).map(|entry| &entry.sector)
    }

    /// Viewer element showing a sector.
    pub fn element_of(&self, id: SectorId) -> Option<ElementId> {
        self.sectors.get(&id).map(|entry| entry.element)
    }

    /// Displayed sectors in id order.
    pub fn sectors(&self) -> impl Iterator<Item = &CriticalSector> + '_ {
        self.sectors.values().map(|entry| &entry.sector)
    }

    pub fn ids(&self) -> impl Iterator<Item = SectorId> + '_ {
        self.sectors.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.sectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sectors.is_empty()
    }

    /// Drain queued events.
    pub fn take_events(&mut self) -> Vec<OverlayEvent> {
        std::mem::take(&mut self.events)
    }
}
