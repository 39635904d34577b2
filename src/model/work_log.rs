//! Work log data model. Each displayed work log is one marker on the plan.

use serde::{Deserialize, Serialize};
use siteplan_viewer::Color;

use crate::coords::NormalizedCoord;

/// Unique identifier of a work log (and of its marker).
pub type MarkerId = i64;

/// Kind of work a log records. Unknown values from the backend map to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WorkType {
    CableLaying,
    Installation,
    Maintenance,
    Inspection,
    #[default]
    #[serde(other)]
    Other,
}

impl WorkType {
    /// Get the display name for this work type.
    pub fn name(&self) -> &'static str {
        match self {
            WorkType::CableLaying => "Cable laying",
            WorkType::Installation => "Installation",
            WorkType::Maintenance => "Maintenance",
            WorkType::Inspection => "Inspection",
            WorkType::Other => "Other",
        }
    }

    /// Marker color for this work type.
    pub fn color(&self) -> Color {
        match self {
            WorkType::CableLaying => Color::rgb8(37, 99, 235),
            WorkType::Installation => Color::rgb8(22, 163, 74),
            WorkType::Maintenance => Color::rgb8(245, 158, 11),
            WorkType::Inspection => Color::rgb8(139, 92, 246),
            WorkType::Other => Color::rgb8(107, 114, 128),
        }
    }
}

/// A work log as delivered by `/work-logs`. Only the fields the overlay
/// engine reads are typed; everything else is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkLog {
    pub id: MarkerId,
    #[serde(default)]
    pub floor_id: i64,
    pub x_coord: f64,
    pub y_coord: f64,
    #[serde(default)]
    pub work_type: WorkType,
    #[serde(default)]
    pub worker_name: String,
    #[serde(default)]
    pub work_date: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
}

impl WorkLog {
    pub fn new(id: MarkerId, x_coord: f64, y_coord: f64, work_type: WorkType) -> Self {
        Self {
            id,
            floor_id: 0,
            x_coord,
            y_coord,
            work_type,
            worker_name: String::new(),
            work_date: String::new(),
            description: String::new(),
            status: None,
            priority: None,
        }
    }

    pub fn with_worker(mut self, name: impl Into<String>) -> Self {
        self.worker_name = name.into();
        self
    }

    pub fn position(&self) -> NormalizedCoord {
        NormalizedCoord::new(self.x_coord, self.y_coord)
    }

    /// Tooltip text for the marker.
    pub fn tooltip(&self) -> String {
        let mut text = self.work_type.name().to_string();
        if !self.worker_name.is_empty() {
            text.push_str(" - ");
            text.push_str(&self.worker_name);
        }
        if !self.work_date.is_empty() {
            text.push_str(&format!(" ({})", self.work_date));
        }
        text
    }
}
