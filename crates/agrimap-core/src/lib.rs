pub mod capture;
pub mod catalog;
pub mod community;
pub mod config;
pub mod error;
pub mod generate;
pub mod geometry;
pub mod kv;
pub mod market;
pub mod planner;
pub mod recommend;
pub mod store;
pub mod tasks;
pub mod zones;

pub use capture::{BoundaryCapture, CaptureConfig, CaptureEvent};
pub use community::{Author, Post, PostCategory};
pub use config::Config;
pub use error::{Error, Result};
pub use generate::{Clock, ColorGenerator, FixedClock, IdGenerator, PaletteColors, SeededColors, SequentialIds, SystemClock};
pub use geometry::Bounds;
pub use kv::{FileStore, KvStore, MemoryStore};
pub use market::{Product, ProductCategory, SortOrder};
pub use planner::CropPlanner;
pub use recommend::{Recommendation, Recommendations};
pub use store::FarmStore;
pub use tasks::{NewTask, Priority, ResourceTask, TaskKind};
pub use zones::MapLayers;

use serde::{Deserialize, Serialize};

// --- Types (matching the persisted JSON layout) ---

/// A geographic point in decimal degrees.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, schemars::JsonSchema)]
pub struct Point {
    pub lat: f64,
    pub lng: f64,
}

impl Point {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// A farm as stored in the `farms` collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Farm {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub points: Vec<Point>,
    /// Estimated area in hectares.
    #[serde(default)]
    pub area: f64,
    #[serde(default)]
    pub center: Point,
    #[serde(default)]
    pub created_at: String,
}

impl Farm {
    /// A boundary needs at least three vertices to enclose anything.
    pub fn is_valid(&self) -> bool {
        self.points.len() >= 3
    }
}

/// Lifecycle of a planted crop. `Harvested` is terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum CropStage {
    #[default]
    Planned,
    Sown,
    Growing,
    Harvested,
}

impl CropStage {
    pub fn advance(self) -> Self {
        match self {
            CropStage::Planned => CropStage::Sown,
            CropStage::Sown => CropStage::Growing,
            CropStage::Growing | CropStage::Harvested => CropStage::Harvested,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CropStage::Planned => "planned",
            CropStage::Sown => "sown",
            CropStage::Growing => "growing",
            CropStage::Harvested => "harvested",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CropPlanEntry {
    pub crop_id: String,
    #[serde(default)]
    pub crop_name: String,
    pub allocated_area: f64,
    #[serde(default)]
    pub color: String,
    /// Share of the farm's total area, rounded to a whole percent.
    #[serde(default)]
    pub percentage: u32,
    #[serde(default)]
    pub stage: CropStage,
}

/// The allocation of a farm's area among crops. One per farm, stored under
/// `cropPlan_<farmId>`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CropPlan {
    pub farm_id: String,
    #[serde(default)]
    pub crops: Vec<CropPlanEntry>,
    pub total_area: f64,
    pub allocated_area: f64,
    pub remaining_area: f64,
    #[serde(default)]
    pub created_at: String,
}

impl CropPlan {
    pub fn entry(&self, crop_id: &str) -> Option<&CropPlanEntry> {
        self.crops.iter().find(|c| c.crop_id == crop_id)
    }
}

/// A rectangular slice of the farm assigned to one crop. Derived on demand,
/// never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CropZone {
    pub crop_id: String,
    pub crop_name: String,
    pub color: String,
    pub points: [Point; 4],
    pub area: f64,
    pub percentage: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn farm_round_trips_camel_case() {
        let json = r##"{
            "id": "farm-1",
            "name": "Green Valley",
            "points": [{"lat": 1.0, "lng": 2.0}],
            "area": 12.5,
            "center": {"lat": 1.0, "lng": 2.0},
            "createdAt": "2024-01-01T00:00:00+00:00"
        }"##;
        let farm: Farm = serde_json::from_str(json).unwrap();
        assert_eq!(farm.created_at, "2024-01-01T00:00:00+00:00");
        assert!(!farm.is_valid());

        let val = serde_json::to_value(&farm).unwrap();
        assert!(val.get("createdAt").is_some());
        assert!(val.get("created_at").is_none());
    }

    #[test]
    fn plan_entry_without_stage_defaults_to_planned() {
        let json = r##"{"cropId": "wheat", "cropName": "Winter Wheat", "allocatedArea": 4.0, "color": "#F59E0B", "percentage": 40}"##;
        let entry: CropPlanEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.stage, CropStage::Planned);
    }

    #[test]
    fn stage_advances_and_stops_at_harvest() {
        let mut stage = CropStage::default();
        for expected in [CropStage::Sown, CropStage::Growing, CropStage::Harvested, CropStage::Harvested] {
            stage = stage.advance();
            assert_eq!(stage, expected);
        }
    }
}
