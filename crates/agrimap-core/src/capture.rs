use tracing::{debug, warn};

use crate::generate::{Clock, IdGenerator};
use crate::geometry::{centroid, distance_meters, estimate_hectares};
use crate::{Error, Farm, Point, Result};

/// Thresholds for turning map clicks into a boundary ring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureConfig {
    /// A click closer than this (meters) to the first vertex closes the ring.
    pub close_threshold_m: f64,
    /// The ring is force-closed once it holds this many vertices.
    pub max_points: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            close_threshold_m: 50.0,
            max_points: 8,
        }
    }
}

/// What a click did to the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureEvent {
    Added,
    /// The click landed near the first vertex and closed the ring.
    AutoClosed,
    /// The click filled the last free slot and closed the ring.
    CapReached,
    /// The ring is closed; reopen or clear it first.
    Rejected,
}

/// Accumulates clicked points into a farm boundary.
#[derive(Debug, Clone, Default)]
pub struct BoundaryCapture {
    points: Vec<Point>,
    closed: bool,
    config: CaptureConfig,
}

impl BoundaryCapture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CaptureConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn add_point(&mut self, p: Point) -> CaptureEvent {
        if self.closed {
            warn!(lat = p.lat, lng = p.lng, "boundary is closed, point ignored");
            return CaptureEvent::Rejected;
        }

        if self.points.len() >= 2 {
            let first = self.points[0];
            if distance_meters(p, first) < self.config.close_threshold_m {
                self.points.push(p);
                self.closed = true;
                debug!(vertices = self.points.len(), "boundary auto-closed");
                return CaptureEvent::AutoClosed;
            }
        }

        self.points.push(p);
        if self.points.len() >= self.config.max_points {
            self.closed = true;
            debug!(vertices = self.points.len(), "boundary closed at vertex cap");
            return CaptureEvent::CapReached;
        }
        CaptureEvent::Added
    }

    /// Reopen a closed ring, keeping its last vertex, or drop the last vertex
    /// of an open one.
    pub fn undo(&mut self) {
        if self.closed {
            self.closed = false;
        } else {
            self.points.pop();
        }
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.closed = false;
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Saving is allowed once the ring is closed or holds at least three vertices.
    pub fn can_save(&self) -> bool {
        self.closed || self.points.len() >= 3
    }

    pub fn estimated_hectares(&self) -> f64 {
        estimate_hectares(&self.points)
    }

    /// Build a farm record from the captured boundary.
    pub fn to_farm(&self, name: &str, ids: &mut dyn IdGenerator, clock: &dyn Clock) -> Result<Farm> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::Validation("farm name must not be blank".into()));
        }
        if self.points.len() < 3 {
            return Err(Error::Validation(format!(
                "a farm boundary needs at least 3 points, got {}",
                self.points.len()
            )));
        }

        let center = centroid(&self.points).unwrap_or_default();
        Ok(Farm {
            id: ids.next_id(),
            name: name.to_string(),
            points: self.points.clone(),
            area: self.estimated_hectares(),
            center,
            created_at: clock.now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::{FixedClock, SequentialIds};

    // ~1.1 km apart, far outside the close threshold.
    fn far(i: usize) -> Point {
        let step = 0.01 * i as f64;
        Point::new(step, (i % 2) as f64 * 0.01)
    }

    #[test]
    fn third_click_near_first_closes_ring() {
        let mut cap = BoundaryCapture::new();
        assert_eq!(cap.add_point(Point::new(0.0, 0.0)), CaptureEvent::Added);
        assert_eq!(cap.add_point(Point::new(0.01, 0.01)), CaptureEvent::Added);
        assert_eq!(cap.add_point(Point::new(0.0001, 0.0)), CaptureEvent::AutoClosed);
        assert!(cap.is_closed());
        assert_eq!(cap.points().len(), 3);
        assert_eq!(cap.points()[2], Point::new(0.0001, 0.0));
    }

    #[test]
    fn second_click_near_first_does_not_close() {
        let mut cap = BoundaryCapture::new();
        cap.add_point(Point::new(0.0, 0.0));
        assert_eq!(cap.add_point(Point::new(0.0, 0.0)), CaptureEvent::Added);
        assert!(!cap.is_closed());
        assert_eq!(cap.points().len(), 2);
    }

    #[test]
    fn eighth_point_force_closes() {
        let mut cap = BoundaryCapture::new();
        for i in 1..8 {
            assert_eq!(cap.add_point(far(i)), CaptureEvent::Added, "click {i}");
        }
        assert!(!cap.is_closed());
        assert_eq!(cap.add_point(far(8)), CaptureEvent::CapReached);
        assert!(cap.is_closed());
        assert_eq!(cap.points().len(), 8);
    }

    #[test]
    fn closed_ring_rejects_points() {
        let mut cap = BoundaryCapture::new();
        for i in 1..=8 {
            cap.add_point(far(i));
        }
        assert_eq!(cap.add_point(far(20)), CaptureEvent::Rejected);
        assert_eq!(cap.points().len(), 8);
    }

    #[test]
    fn undo_after_close_reopens_without_losing_point() {
        let mut cap = BoundaryCapture::new();
        cap.add_point(Point::new(0.0, 0.0));
        cap.add_point(Point::new(0.01, 0.01));
        cap.add_point(Point::new(0.0, 0.0001));
        assert!(cap.is_closed());

        cap.undo();
        assert!(!cap.is_closed());
        assert_eq!(cap.points().len(), 3);

        cap.undo();
        assert_eq!(cap.points().len(), 2);
    }

    #[test]
    fn clear_resets_everything() {
        let mut cap = BoundaryCapture::new();
        for i in 1..=8 {
            cap.add_point(far(i));
        }
        cap.clear();
        assert!(cap.points().is_empty());
        assert!(!cap.is_closed());
        assert_eq!(cap.add_point(far(1)), CaptureEvent::Added);
    }

    #[test]
    fn custom_config_changes_cap() {
        let mut cap = BoundaryCapture::with_config(CaptureConfig {
            close_threshold_m: 10.0,
            max_points: 3,
        });
        cap.add_point(far(1));
        cap.add_point(far(2));
        assert_eq!(cap.add_point(far(3)), CaptureEvent::CapReached);
    }

    #[test]
    fn to_farm_derives_area_and_center() {
        let mut cap = BoundaryCapture::new();
        for p in [
            Point::new(0.0, 0.0),
            Point::new(0.0, 0.01),
            Point::new(0.01, 0.01),
            Point::new(0.01, 0.0),
        ] {
            cap.add_point(p);
        }
        assert!(cap.can_save());

        let mut ids = SequentialIds::new("farm");
        let clock = FixedClock("2024-06-01T00:00:00+00:00".into());
        let farm = cap.to_farm("  North Field ", &mut ids, &clock).unwrap();
        assert_eq!(farm.id, "farm-1");
        assert_eq!(farm.name, "North Field");
        assert_eq!(farm.center, Point::new(0.005, 0.005));
        assert!((farm.area - 123.92).abs() < 0.1);
        assert_eq!(farm.created_at, "2024-06-01T00:00:00+00:00");
    }

    #[test]
    fn to_farm_rejects_blank_name_and_short_ring() {
        let mut ids = SequentialIds::new("farm");
        let clock = FixedClock("t".into());

        let mut cap = BoundaryCapture::new();
        cap.add_point(far(1));
        cap.add_point(far(2));
        assert!(!cap.can_save());
        assert!(matches!(cap.to_farm("A", &mut ids, &clock), Err(Error::Validation(_))));

        cap.add_point(far(3));
        assert!(matches!(cap.to_farm("   ", &mut ids, &clock), Err(Error::Validation(_))));
    }
}
