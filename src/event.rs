//! Events emitted by the overlay managers for the host to act on.
//!
//! The managers never call into host UI code. Whatever the user did that
//! needs a host decision (open a details view, ask for a sector name, confirm
//! a delete) is queued as an [`OverlayEvent`] and drained with `take_events`.

use serde::Serialize;

use crate::model::{CriticalSector, SectorDraft, SectorId, WorkLog};

/// Something the host should react to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum OverlayEvent {
    /// A marker was clicked (not dragged)
    MarkerClicked { work_log: WorkLog },
    /// A sector body was clicked
    SectorClicked { sector: CriticalSector },
    /// The delete button of a sector was clicked; the host confirms, deletes
    /// through the API and then calls `remove_sector`
    SectorDeleteRequested {
        sector_id: SectorId,
        sector_name: String,
    },
    /// A shape was finished and needs a name and priority
    DraftCompleted { draft: SectorDraft },
    /// A drawing step was refused; the session is still active
    DrawingRejected { reason: String },
    /// The drawing session ended without a draft
    DrawingCancelled,
    /// Something failed; show the message and let the user retry
    Alert { message: String },
}
