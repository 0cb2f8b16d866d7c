use std::sync::Arc;

use agrimap_core::zones::farm_zones;
use agrimap_core::{
    catalog, BoundaryCapture, CaptureEvent, CropPlanner, FarmStore, FileStore, FixedClock,
    MapLayers, PaletteColors, Point, Recommendations,
};

#[test]
fn capture_plan_and_lay_out_zones() {
    let dir = tempfile::tempdir().unwrap();
    let store = FarmStore::new(Arc::new(FileStore::new(dir.path())));
    let clock = FixedClock("2024-06-01T00:00:00+00:00".into());

    // Draw a ~0.02° x 0.01° rectangle and close it by clicking near the start.
    let mut capture = BoundaryCapture::new();
    for p in [
        Point::new(30.0, 75.0),
        Point::new(30.0, 75.02),
        Point::new(30.01, 75.02),
        Point::new(30.01, 75.0),
    ] {
        assert_eq!(capture.add_point(p), CaptureEvent::Added);
    }
    assert_eq!(capture.add_point(Point::new(30.0001, 75.0001)), CaptureEvent::AutoClosed);

    let mut ids = store.farm_ids().unwrap();
    let farm = capture.to_farm("Green Valley", &mut ids, &clock).unwrap();
    store.save_farm(&farm).unwrap();
    assert_eq!(farm.id, "farm-1");
    assert!(farm.area > 240.0 && farm.area < 250.0, "area {}", farm.area);

    let mut recs = Recommendations::for_area(farm.area);
    let mut colors = PaletteColors::new();
    assert!(recs.add_custom(catalog::find("Soybean").unwrap(), &mut colors));

    let mut planner = CropPlanner::new(&farm);
    planner.select("wheat", 100.0);
    planner.select("soybean", 50.0);
    let plan = planner.finalize(&recs, &clock).unwrap();
    store.save_crop_plan(&plan).unwrap();

    // Reload from disk the way a fresh session would.
    let reopened = FarmStore::new(Arc::new(FileStore::new(dir.path())));
    let farm = reopened.farm_or_err("farm-1").unwrap();
    let plan = reopened.crop_plan(&farm.id).unwrap().unwrap();

    let zones = farm_zones(&farm, &plan);
    assert_eq!(zones.len(), 2);
    assert_eq!(zones[0].crop_id, "wheat");
    assert_eq!(zones[0].area, 100.0);
    assert_eq!(zones[1].crop_id, "soybean");
    assert_eq!(zones[1].area, 50.0);

    let layers = MapLayers::for_farm(&farm, Some(&plan));
    assert_eq!(layers.boundary.len(), 5);
    assert_eq!(layers.zones, zones);

    // Same input, same output.
    assert_eq!(farm_zones(&farm, &plan), zones);
}
