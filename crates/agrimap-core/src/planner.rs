use tracing::debug;

use crate::generate::Clock;
use crate::recommend::Recommendations;
use crate::{CropPlan, CropPlanEntry, CropStage, Error, Farm, Result};

/// Slack for floating-point sums when checking allocations against the farm.
const AREA_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq)]
struct Selection {
    crop_id: String,
    area: f64,
}

/// Collects per-crop allocations for one farm and turns them into a
/// [`CropPlan`].
#[derive(Debug, Clone)]
pub struct CropPlanner {
    farm_id: String,
    farm_area: f64,
    selections: Vec<Selection>,
}

impl CropPlanner {
    pub fn new(farm: &Farm) -> Self {
        Self {
            farm_id: farm.id.clone(),
            farm_area: farm.area,
            selections: Vec::new(),
        }
    }

    /// Insert or replace the allocation for a crop. Order of first selection
    /// is kept.
    pub fn select(&mut self, crop_id: &str, area: f64) {
        match self.selections.iter_mut().find(|s| s.crop_id == crop_id) {
            Some(existing) => existing.area = area,
            None => self.selections.push(Selection {
                crop_id: crop_id.to_string(),
                area,
            }),
        }
    }

    pub fn remove(&mut self, crop_id: &str) {
        self.selections.retain(|s| s.crop_id != crop_id);
    }

    pub fn allocated(&self) -> f64 {
        self.selections.iter().map(|s| s.area).sum()
    }

    /// Can be negative while the user is still editing.
    pub fn remaining(&self) -> f64 {
        self.farm_area - self.allocated()
    }

    /// Validate the selections and build the plan.
    ///
    /// Allocating more than the farm's area is rejected.
    pub fn finalize(&self, recommendations: &Recommendations, clock: &dyn Clock) -> Result<CropPlan> {
        let mut crops = Vec::with_capacity(self.selections.len());
        let divisor = if self.farm_area > 0.0 { self.farm_area } else { 1.0 };

        for s in &self.selections {
            if !s.area.is_finite() || s.area < 0.0 {
                return Err(Error::Validation(format!(
                    "allocation for '{}' must be a non-negative number of hectares",
                    s.crop_id
                )));
            }
            let rec = recommendations.get(&s.crop_id).ok_or_else(|| {
                Error::Validation(format!("'{}' is not among the recommended crops", s.crop_id))
            })?;
            crops.push(CropPlanEntry {
                crop_id: s.crop_id.clone(),
                crop_name: rec.name.clone(),
                allocated_area: s.area,
                color: rec.color.clone(),
                percentage: (s.area / divisor * 100.0).round() as u32,
                stage: CropStage::Planned,
            });
        }

        let allocated = self.allocated();
        if allocated > self.farm_area + AREA_EPSILON {
            return Err(Error::OverAllocated {
                allocated,
                available: self.farm_area,
            });
        }

        debug!(farm = %self.farm_id, crops = crops.len(), allocated, "crop plan finalized");
        Ok(CropPlan {
            farm_id: self.farm_id.clone(),
            crops,
            total_area: self.farm_area,
            allocated_area: allocated,
            remaining_area: self.farm_area - allocated,
            created_at: clock.now(),
        })
    }
}

/// Move one crop of the plan to its next lifecycle stage and return the new
/// stage.
pub fn advance_stage(plan: &mut CropPlan, crop_id: &str) -> Result<CropStage> {
    let entry = plan
        .crops
        .iter_mut()
        .find(|c| c.crop_id == crop_id)
        .ok_or_else(|| {
            Error::NotFound(format!("crop '{}' is not in the plan for farm '{}'", crop_id, plan.farm_id))
        })?;
    entry.stage = entry.stage.advance();
    Ok(entry.stage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::FixedClock;
    use crate::Point;

    fn farm(area: f64) -> Farm {
        Farm {
            id: "farm-1".into(),
            name: "Green Valley".into(),
            points: vec![Point::new(0.0, 0.0), Point::new(0.0, 1.0), Point::new(1.0, 1.0)],
            area,
            center: Point::default(),
            created_at: String::new(),
        }
    }

    fn clock() -> FixedClock {
        FixedClock("2024-06-01T00:00:00+00:00".into())
    }

    #[test]
    fn select_replaces_and_remove_drops() {
        let mut planner = CropPlanner::new(&farm(10.0));
        planner.select("wheat", 4.0);
        planner.select("corn", 3.0);
        planner.select("wheat", 5.0);
        assert_eq!(planner.allocated(), 8.0);
        assert_eq!(planner.remaining(), 2.0);

        planner.remove("wheat");
        assert_eq!(planner.allocated(), 3.0);
    }

    #[test]
    fn finalize_builds_plan_with_percentages() {
        let f = farm(10.0);
        let recs = Recommendations::for_area(f.area);
        let mut planner = CropPlanner::new(&f);
        planner.select("wheat", 6.0);
        planner.select("corn", 3.333);

        let plan = planner.finalize(&recs, &clock()).unwrap();
        assert_eq!(plan.farm_id, "farm-1");
        assert_eq!(plan.total_area, 10.0);
        assert!((plan.allocated_area - 9.333).abs() < 1e-12);
        assert!((plan.remaining_area - 0.667).abs() < 1e-12);
        assert_eq!(plan.crops[0].crop_name, "Winter Wheat");
        assert_eq!(plan.crops[0].color, "#F59E0B");
        assert_eq!(plan.crops[0].percentage, 60);
        assert_eq!(plan.crops[1].percentage, 33);
        assert_eq!(plan.created_at, "2024-06-01T00:00:00+00:00");
    }

    #[test]
    fn over_allocation_is_rejected() {
        let f = farm(10.0);
        let recs = Recommendations::for_area(f.area);
        let mut planner = CropPlanner::new(&f);
        planner.select("wheat", 6.0);
        planner.select("corn", 5.0);
        assert!(planner.remaining() < 0.0);

        match planner.finalize(&recs, &clock()) {
            Err(Error::OverAllocated { allocated, available }) => {
                assert_eq!(allocated, 11.0);
                assert_eq!(available, 10.0);
            }
            other => panic!("expected OverAllocated, got {:?}", other),
        }
    }

    #[test]
    fn exact_allocation_is_accepted() {
        let f = farm(1.0);
        let recs = Recommendations::for_area(f.area);
        let mut planner = CropPlanner::new(&f);
        planner.select("wheat", 0.1);
        planner.select("corn", 0.2);
        planner.select("vegetables", 0.7);
        let plan = planner.finalize(&recs, &clock()).unwrap();
        assert!(plan.remaining_area.abs() < 1e-9);
    }

    #[test]
    fn invalid_selections_are_rejected() {
        let f = farm(10.0);
        let recs = Recommendations::for_area(f.area);

        let mut planner = CropPlanner::new(&f);
        planner.select("wheat", -1.0);
        assert!(matches!(planner.finalize(&recs, &clock()), Err(Error::Validation(_))));

        let mut planner = CropPlanner::new(&f);
        planner.select("quinoa", 1.0);
        assert!(matches!(planner.finalize(&recs, &clock()), Err(Error::Validation(_))));
    }

    #[test]
    fn zero_area_farm_uses_unit_divisor() {
        let f = farm(0.0);
        let recs = Recommendations::for_area(f.area);
        let mut planner = CropPlanner::new(&f);
        planner.select("wheat", 0.0);
        let plan = planner.finalize(&recs, &clock()).unwrap();
        assert_eq!(plan.crops[0].percentage, 0);
    }

    #[test]
    fn advance_stage_moves_one_crop() {
        let f = farm(10.0);
        let recs = Recommendations::for_area(f.area);
        let mut planner = CropPlanner::new(&f);
        planner.select("wheat", 2.0);
        planner.select("corn", 2.0);
        let mut plan = planner.finalize(&recs, &clock()).unwrap();

        assert_eq!(advance_stage(&mut plan, "corn").unwrap(), CropStage::Sown);
        assert_eq!(plan.entry("wheat").unwrap().stage, CropStage::Planned);
        assert!(matches!(advance_stage(&mut plan, "rice"), Err(Error::NotFound(_))));
    }
}
