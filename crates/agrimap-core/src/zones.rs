//! Treemap-style layout of crop zones inside a farm's bounding rectangle.
//!
//! Zones are a display aid. Their shapes follow the rectangle, not the real
//! boundary, and each zone carries the plan's allocated area rather than a
//! measured one.

use serde::Serialize;
use tracing::warn;

use crate::geometry::Bounds;
use crate::{CropPlan, CropZone, Farm, Point};

/// Everything a map renderer needs for one farm.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MapLayers {
    pub boundary: Vec<Point>,
    pub center: Point,
    pub zones: Vec<CropZone>,
}

impl MapLayers {
    pub fn for_farm(farm: &Farm, plan: Option<&CropPlan>) -> Self {
        Self {
            boundary: farm.points.clone(),
            center: farm.center,
            zones: plan.map(|p| farm_zones(farm, p)).unwrap_or_default(),
        }
    }
}

/// Zones for a stored farm. A farm without a closed boundary has none.
pub fn farm_zones(farm: &Farm, plan: &CropPlan) -> Vec<CropZone> {
    if !farm.is_valid() {
        return Vec::new();
    }
    match Bounds::of(&farm.points) {
        Some(bounds) => partition(bounds, plan),
        None => Vec::new(),
    }
}

/// Slice `bounds` into one rectangle per plan entry, in plan order.
///
/// Each entry takes `allocatedArea / remainingArea` of the longer side of
/// what is left (latitude on ties); the last entry takes all of it.
pub fn partition(bounds: Bounds, plan: &CropPlan) -> Vec<CropZone> {
    let mut rest = bounds;
    let mut remaining_area = plan.total_area;
    let mut zones = Vec::with_capacity(plan.crops.len());
    let last = plan.crops.len().saturating_sub(1);

    for (i, entry) in plan.crops.iter().enumerate() {
        if remaining_area <= 0.0 {
            warn!(crop = %entry.crop_id, "no area left for crop zone, skipping");
            continue;
        }

        let (slice, leftover) = if i == last {
            (rest, rest)
        } else {
            split(rest, (entry.allocated_area / remaining_area).clamp(0.0, 1.0))
        };
        zones.push(CropZone {
            crop_id: entry.crop_id.clone(),
            crop_name: entry.crop_name.clone(),
            color: entry.color.clone(),
            points: slice.corners(),
            area: entry.allocated_area,
            percentage: entry.percentage,
        });

        rest = leftover;
        remaining_area -= entry.allocated_area;
    }

    zones
}

/// Cut `proportion` off the low end of the longer axis.
fn split(b: Bounds, proportion: f64) -> (Bounds, Bounds) {
    if b.lat_span() >= b.lng_span() {
        let cut = b.min_lat + b.lat_span() * proportion;
        (
            Bounds { max_lat: cut, ..b },
            Bounds { min_lat: cut, ..b },
        )
    } else {
        let cut = b.min_lng + b.lng_span() * proportion;
        (
            Bounds { max_lng: cut, ..b },
            Bounds { min_lng: cut, ..b },
        )
    }
}
