//! Planar geometry over lat/lng pairs.
//!
//! Coordinates are treated as a flat plane. The hectare figure is rescaled with
//! a fixed meters-per-degree factor that only holds near the equator, so it is
//! a rough estimate, not a geodesic area.

use crate::Point;

/// Meters per degree of latitude (and of longitude at the equator).
pub const METERS_PER_DEGREE: f64 = 111_320.0;

pub const SQUARE_METERS_PER_HECTARE: f64 = 10_000.0;

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Shoelace area of the ring in squared degrees. The ring is implicitly
/// closed: the last vertex connects back to the first.
pub fn shoelace_area(points: &[Point]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }

    let mut signed = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        signed += points[i].lat * points[j].lng;
        signed -= points[j].lat * points[i].lng;
    }
    signed.abs() / 2.0
}

/// Approximate area in hectares.
pub fn estimate_hectares(points: &[Point]) -> f64 {
    shoelace_area(points) * METERS_PER_DEGREE * METERS_PER_DEGREE / SQUARE_METERS_PER_HECTARE
}

/// Vertex average, which is what a farm stores as its center.
pub fn centroid(points: &[Point]) -> Option<Point> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let (lat, lng) = points
        .iter()
        .fold((0.0, 0.0), |(lat, lng), p| (lat + p.lat, lng + p.lng));
    Some(Point::new(lat / n, lng / n))
}

/// Great-circle distance in meters.
pub fn distance_meters(a: Point, b: Point) -> f64 {
    let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
    let dlat = lat2 - lat1;
    let dlng = (b.lng - a.lng).to_radians();
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}

/// Axis-aligned bounding rectangle in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    pub fn of(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let init = Bounds {
            min_lat: first.lat,
            max_lat: first.lat,
            min_lng: first.lng,
            max_lng: first.lng,
        };
        Some(points.iter().skip(1).fold(init, |b, p| Bounds {
            min_lat: b.min_lat.min(p.lat),
            max_lat: b.max_lat.max(p.lat),
            min_lng: b.min_lng.min(p.lng),
            max_lng: b.max_lng.max(p.lng),
        }))
    }

    pub fn lat_span(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    pub fn lng_span(&self) -> f64 {
        self.max_lng - self.min_lng
    }

    /// Corners in ring order starting at the south-west corner.
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.min_lat, self.min_lng),
            Point::new(self.min_lat, self.max_lng),
            Point::new(self.max_lat, self.max_lng),
            Point::new(self.max_lat, self.min_lng),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(lat0: f64, lng0: f64, lat1: f64, lng1: f64) -> Vec<Point> {
        vec![
            Point::new(lat0, lng0),
            Point::new(lat0, lng1),
            Point::new(lat1, lng1),
            Point::new(lat1, lng0),
        ]
    }

    #[test]
    fn shoelace_matches_integer_rectangles() {
        for (w, h) in [(1.0, 1.0), (2.0, 3.0), (5.0, 7.0)] {
            let ring = rect(10.0, -20.0, 10.0 + h, -20.0 + w);
            assert_eq!(shoelace_area(&ring), w * h);

            let mut reversed = ring.clone();
            reversed.reverse();
            assert_eq!(shoelace_area(&reversed), w * h, "winding must not change the area");
        }
    }

    #[test]
    fn small_square_near_equator_is_about_124_hectares() {
        let ring = rect(0.0, 0.0, 0.01, 0.01);
        let expected = (0.01 * METERS_PER_DEGREE).powi(2) / SQUARE_METERS_PER_HECTARE;
        let got = estimate_hectares(&ring);
        assert!((got - expected).abs() / expected < 0.01, "got {got}, expected {expected}");
        assert!((got - 123.9).abs() < 1.239);
    }

    #[test]
    fn fewer_than_three_points_has_no_area() {
        assert_eq!(shoelace_area(&[]), 0.0);
        assert_eq!(estimate_hectares(&[Point::new(1.0, 1.0), Point::new(2.0, 2.0)]), 0.0);
    }

    #[test]
    fn bounds_and_centroid() {
        let pts = vec![Point::new(1.0, 4.0), Point::new(3.0, 2.0), Point::new(2.0, 6.0)];
        let b = Bounds::of(&pts).unwrap();
        assert_eq!((b.min_lat, b.max_lat, b.min_lng, b.max_lng), (1.0, 3.0, 2.0, 6.0));
        assert_eq!(b.lat_span(), 2.0);
        assert_eq!(b.lng_span(), 4.0);
        assert_eq!(centroid(&pts), Some(Point::new(2.0, 4.0)));
        assert!(Bounds::of(&[]).is_none());
        assert!(centroid(&[]).is_none());
    }

    #[test]
    fn haversine_distance_is_sane() {
        let a = Point::new(0.0, 0.0);
        assert_eq!(distance_meters(a, a), 0.0);
        // One thousandth of a degree of latitude is ~111 m.
        let d = distance_meters(a, Point::new(0.001, 0.0));
        assert!((d - 111.19).abs() < 0.5, "got {d}");
    }
}
