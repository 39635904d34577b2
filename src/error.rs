//! Error types for overlay operations.

use siteplan_viewer::ViewerError;
use thiserror::Error;

use crate::model::{MarkerId, SectorId};

/// Errors returned by the marker and sector managers.
///
/// None of these are fatal: callers treat them as a failed operation and
/// keep going.
#[derive(Error, Debug)]
pub enum OverlayError {
    /// The viewer has no image loaded yet
    #[error("No floor-plan image is loaded")]
    ImageNotLoaded,

    /// Drawing was requested with a shape that cannot be drawn
    #[error("Cannot draw sectors of type '{0}'")]
    InvalidDrawingMode(String),

    /// A polygon was closed with too few vertices
    #[error("A polygon needs at least {required} points, got {found}")]
    NotEnoughPoints {
        /// Minimum vertex count
        required: usize,
        /// Vertices placed so far
        found: usize,
    },

    /// The operation needs an active drawing session
    #[error("No drawing session is active")]
    NotDrawing,

    /// Marker id not managed here
    #[error("Unknown marker: {0}")]
    UnknownMarker(MarkerId),

    /// Sector id not managed here
    #[error("Unknown sector: {0}")]
    UnknownSector(SectorId),

    /// Sector data that cannot be rendered
    #[error("Invalid sector {id}: {message}")]
    InvalidSector {
        /// The offending sector
        id: SectorId,
        /// What is wrong with it
        message: String,
    },

    /// The viewer backend failed
    #[error("Viewer error: {0}")]
    Viewer(#[from] ViewerError),

    /// JSON parsing or serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading a replay script failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl OverlayError {
    /// Create an invalid sector error with a message.
    pub fn invalid_sector(id: SectorId, message: impl Into<String>) -> Self {
        Self::InvalidSector {
            id,
            message: message.into(),
        }
    }

    /// Precondition failures are expected in normal use; everything else
    /// points at a broken viewer or bad data.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            OverlayError::ImageNotLoaded
                | OverlayError::InvalidDrawingMode(_)
                | OverlayError::NotEnoughPoints { .. }
                | OverlayError::NotDrawing
        )
    }
}
