#![allow(clippy::unwrap_used)]

mod common;

use std::f64::consts::{FRAC_PI_2, PI};

use common::pin_lattice;
use fsr_geometry::csg::BoundaryType;
use fsr_geometry::math::{direction, Point3};
use fsr_geometry::registry::FsrKey;
use fsr_geometry::Track;
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn interior_location_ignores_direction(
        x in -1.99f64..1.99,
        y in -1.99f64..1.99,
        azimuthal in 0.0f64..(2.0 * PI),
    ) {
        let geometry = pin_lattice(4, BoundaryType::Vacuum);
        let navigator = geometry.navigator();
        let point = Point3::new(x, y, 0.0);
        let plain = navigator.locate(point).unwrap();
        let along = navigator
            .locate_along(point, &direction(azimuthal, FRAC_PI_2))
            .unwrap();
        prop_assert_eq!(
            FsrKey::from_path(&plain, geometry.store()).unwrap(),
            FsrKey::from_path(&along, geometry.store()).unwrap()
        );
    }

    #[test]
    fn segments_cover_the_chord(
        x in -1.9f64..1.9,
        y in -1.9f64..1.9,
        azimuthal in 0.0f64..(2.0 * PI),
    ) {
        let mut geometry = pin_lattice(4, BoundaryType::Vacuum);
        geometry.initialize_flat_source_regions().unwrap();

        let start = Point3::new(x, y, 0.0);
        let length = geometry
            .bounds()
            .distance_to_exit(&start, &direction(azimuthal, FRAC_PI_2));
        let mut track = Track::planar(x, y, azimuthal, length);
        let report = geometry.segmentize_planar(&mut track, 0.0).unwrap();

        let dropped: f64 = report.degenerate.iter().map(|d| d.length).sum();
        prop_assert!((track.segmented_length() + dropped - length).abs() < 1e-6);
        prop_assert!(track.segments().iter().all(|s| s.length > 0.0));
    }
}
