//! Siteplan - floor-plan overlays for construction work tracking
//!
//! Places work-log markers and critical-sector shapes on a deep-zoom
//! floor-plan viewer, and lets users draw new sectors as rectangles or
//! polygons. Everything is stored in normalized image coordinates; the
//! viewer itself is abstracted behind [`siteplan_viewer::Viewer`].

pub mod config;
pub mod constants;
pub mod coords;
pub mod error;
pub mod event;
pub mod floor_view;
pub mod geometry;
pub mod markers;
pub mod model;
pub mod pointer;
pub mod replay;
pub mod sectors;

#[cfg(test)]
mod tests;

pub use config::{ConfigError, OverlayConfig};
pub use coords::NormalizedCoord;
pub use error::OverlayError;
pub use event::OverlayEvent;
pub use floor_view::FloorPlanView;
pub use markers::MarkerOverlays;
pub use model::{CriticalSector, SectorDraft, SectorType, WorkLog, WorkType};
pub use sectors::{DrawingState, SectorOverlays};
