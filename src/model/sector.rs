//! Critical sector data model.
//!
//! Sectors are stored in normalized image coordinates. `radius` is always
//! present as a bounding-circle radius, so every sector can fall back to a
//! circle. `width`/`height` belong to rectangles, `points` to polygons.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use siteplan_viewer::{Color, Point, Rect};

use crate::constants::MIN_POLYGON_POINTS;
use crate::coords::NormalizedCoord;
use crate::error::OverlayError;
use crate::geometry;

/// Unique identifier of a critical sector.
pub type SectorId = i64;

/// Radius the backend assigns when none is given.
pub const DEFAULT_SECTOR_RADIUS: f64 = 0.1;

/// Geometry type of a sector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SectorType {
    #[default]
    Rectangle,
    Polygon,
    Circle,
}

impl SectorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SectorType::Rectangle => "rectangle",
            SectorType::Polygon => "polygon",
            SectorType::Circle => "circle",
        }
    }

    /// Whether sectors of this type can be drawn interactively.
    pub fn is_drawable(&self) -> bool {
        matches!(self, SectorType::Rectangle | SectorType::Polygon)
    }
}

impl fmt::Display for SectorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectorType {
    type Err = OverlayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rectangle" => Ok(SectorType::Rectangle),
            "polygon" => Ok(SectorType::Polygon),
            "circle" => Ok(SectorType::Circle),
            other => Err(OverlayError::InvalidDrawingMode(other.to_string())),
        }
    }
}

/// Sector priority as stored by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
    /// Also what unknown wire values fall back to.
    #[default]
    #[serde(other)]
    Standard,
}

impl Priority {
    /// Priorities `POST /critical-sectors` accepts. `medium` only shows up
    /// on sectors stored before the create rules were tightened.
    pub const ACCEPTED_ON_CREATE: [Priority; 4] = [
        Priority::Low,
        Priority::Standard,
        Priority::High,
        Priority::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Critical => "critical",
            Priority::Standard => "standard",
        }
    }

    pub fn tier(&self) -> PriorityTier {
        match self {
            Priority::High | Priority::Critical => PriorityTier::High,
            Priority::Medium => PriorityTier::Medium,
            Priority::Standard | Priority::Low => PriorityTier::Standard,
        }
    }
}

/// The three visual tiers sectors are colored by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorityTier {
    High,
    Medium,
    Standard,
}

impl PriorityTier {
    pub fn color(&self) -> Color {
        match self {
            PriorityTier::High => Color::rgb8(220, 38, 38),
            PriorityTier::Medium => Color::rgb8(234, 88, 12),
            PriorityTier::Standard => Color::rgb8(202, 138, 4),
        }
    }
}

/// A critical sector as delivered by `/critical-sectors`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriticalSector {
    pub id: SectorId,
    #[serde(default)]
    pub floor_id: i64,
    pub sector_name: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(rename = "type", default)]
    pub sector_type: SectorType,
    /// Center X
    pub x_coord: f64,
    /// Center Y
    pub y_coord: f64,
    #[serde(default = "default_radius")]
    pub radius: f64,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(
        default,
        deserialize_with = "deserialize_points",
        skip_serializing_if = "Option::is_none"
    )]
    pub points: Option<Vec<NormalizedCoord>>,
}

fn default_radius() -> f64 {
    DEFAULT_SECTOR_RADIUS
}

/// The backend keeps polygon points in a TEXT column, so they arrive either
/// as a JSON array or as a string holding one.
#[derive(Deserialize)]
#[serde(untagged)]
enum PointsField {
    List(Vec<NormalizedCoord>),
    Encoded(String),
}

fn deserialize_points<'de, D>(deserializer: D) -> Result<Option<Vec<NormalizedCoord>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<PointsField>::deserialize(deserializer)? {
        None => Ok(None),
        Some(PointsField::List(points)) => Ok(Some(points)),
        Some(PointsField::Encoded(text)) if text.trim().is_empty() => Ok(None),
        Some(PointsField::Encoded(text)) => serde_json::from_str(&text)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

fn serialize_points_encoded<S>(
    points: &Option<Vec<NormalizedCoord>>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match points {
        Some(points) => {
            let text = serde_json::to_string(points).map_err(serde::ser::Error::custom)?;
            serializer.serialize_some(&text)
        }
        None => serializer.serialize_none(),
    }
}

impl CriticalSector {
    pub fn center(&self) -> NormalizedCoord {
        NormalizedCoord::new(self.x_coord, self.y_coord)
    }

    /// Rectangle extents, if this sector has them.
    pub fn extents(&self) -> Option<(f64, f64)> {
        Some((self.width?, self.height?))
    }

    /// Top-left anchored bounds of a rectangle sector (center minus half extent).
    pub fn rect_bounds(&self) -> Option<Rect> {
        let (width, height) = self.extents()?;
        Some(Rect::new(
            self.x_coord - width / 2.0,
            self.y_coord - height / 2.0,
            width,
            height,
        ))
    }

    /// Polygon vertices as points, empty for other types.
    pub fn vertices(&self) -> Vec<Point> {
        self.points
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(NormalizedCoord::as_point)
            .collect()
    }

    /// Whether a normalized coordinate lies inside the sector.
    ///
    /// Rectangles use their half extents, polygons their outline; circles
    /// and sectors missing their shape data use the bounding radius.
    pub fn contains(&self, coord: NormalizedCoord) -> bool {
        match self.sector_type {
            SectorType::Rectangle if self.extents().is_some() => self
                .rect_bounds()
                .is_some_and(|bounds| bounds.contains(coord.as_point())),
            SectorType::Polygon if self.vertices().len() >= MIN_POLYGON_POINTS => {
                geometry::polygon_contains(&self.vertices(), coord.as_point())
            }
            _ => self.center().as_point().distance_to(coord.as_point()) <= self.radius,
        }
    }

    /// Bounding-circle overlap with another sector.
    pub fn overlaps(&self, other: &CriticalSector) -> bool {
        let distance = self.center().as_point().distance_to(other.center().as_point());
        distance < self.radius + other.radius
    }

    /// Tooltip text for the overlay.
    pub fn tooltip(&self) -> String {
        format!("{} ({:?} priority)", self.sector_name, self.priority)
    }
}

/// Sectors that contain the given coordinate, e.g. to flag work logged
/// inside a critical area.
pub fn sectors_containing(
    sectors: &[CriticalSector],
    coord: NormalizedCoord,
) -> Vec<&CriticalSector> {
    sectors.iter().filter(|s| s.contains(coord)).collect()
}

/// Top-left anchored bounds of a drawn rectangle, normalized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DraftBounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// A freshly drawn sector waiting for a name and priority from the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SectorDraft {
    Rectangle {
        x_coord: f64,
        y_coord: f64,
        radius: f64,
        bounds: DraftBounds,
    },
    Polygon {
        x_coord: f64,
        y_coord: f64,
        radius: f64,
        points: Vec<NormalizedCoord>,
    },
}

impl SectorDraft {
    pub fn sector_type(&self) -> SectorType {
        match self {
            SectorDraft::Rectangle { .. } => SectorType::Rectangle,
            SectorDraft::Polygon { .. } => SectorType::Polygon,
        }
    }

    pub fn center(&self) -> NormalizedCoord {
        match self {
            SectorDraft::Rectangle {
                x_coord, y_coord, ..
            }
            | SectorDraft::Polygon {
                x_coord, y_coord, ..
            } => NormalizedCoord::new(*x_coord, *y_coord),
        }
    }

    pub fn radius(&self) -> f64 {
        match self {
            SectorDraft::Rectangle { radius, .. } | SectorDraft::Polygon { radius, .. } => *radius,
        }
    }

    /// Combine the drawn geometry with the details the user entered.
    pub fn into_request(
        self,
        floor_id: i64,
        sector_name: impl Into<String>,
        priority: Priority,
    ) -> NewSectorRequest {
        let sector_type = self.sector_type();
        let (x_coord, y_coord) = (self.center().x, self.center().y);
        let radius = self.radius();
        let (width, height, points) = match self {
            SectorDraft::Rectangle { bounds, .. } => {
                (Some(bounds.width), Some(bounds.height), None)
            }
            SectorDraft::Polygon { points, .. } => (None, None, Some(points)),
        };
        NewSectorRequest {
            floor_id,
            sector_name: sector_name.into(),
            priority,
            sector_type,
            x_coord,
            y_coord,
            radius,
            width,
            height,
            points,
        }
    }
}

/// Body of `POST /critical-sectors`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewSectorRequest {
    pub floor_id: i64,
    pub sector_name: String,
    pub priority: Priority,
    #[serde(rename = "type")]
    pub sector_type: SectorType,
    pub x_coord: f64,
    pub y_coord: f64,
    pub radius: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(
        serialize_with = "serialize_points_encoded",
        skip_serializing_if = "Option::is_none"
    )]
    pub points: Option<Vec<NormalizedCoord>>,
}

impl NewSectorRequest {
    /// Check the request against the backend's rules. Returns every issue
    /// found; an empty list means the request will be accepted.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.sector_name.trim().is_empty() {
            issues.push("Sector name cannot be empty".to_string());
        }

        for (field, value) in [("x_coord", self.x_coord), ("y_coord", self.y_coord)] {
            if !(0.0..=1.0).contains(&value) {
                issues.push(format!("{} must be between 0 and 1", field));
            }
        }

        for (field, value) in [
            ("radius", Some(self.radius)),
            ("width", self.width),
            ("height", self.height),
        ] {
            let Some(value) = value else { continue };
            if value <= 0.0 {
                issues.push(format!("{} must be positive", field));
            }
            if value > 1.0 {
                issues.push(format!("{} must not exceed 1", field));
            }
        }

        if !Priority::ACCEPTED_ON_CREATE.contains(&self.priority) {
            issues.push(format!(
                "priority must be one of low, standard, high, critical (got {})",
                self.priority.as_str()
            ));
        }

        if self.sector_type == SectorType::Polygon {
            let count = self.points.as_ref().map_or(0, Vec::len);
            if count < MIN_POLYGON_POINTS {
                issues.push(format!(
                    "Polygon needs at least {} points",
                    MIN_POLYGON_POINTS
                ));
            }
        }

        issues
    }
}
