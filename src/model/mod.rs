//! Entities placed on the floor plan.

mod sector;
mod work_log;

pub use sector::{
    sectors_containing, CriticalSector, DraftBounds, NewSectorRequest, Priority, PriorityTier,
    SectorDraft, SectorId, SectorType, DEFAULT_SECTOR_RADIUS,
};
pub use work_log::{MarkerId, WorkLog, WorkType};
