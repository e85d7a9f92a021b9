#![allow(clippy::unwrap_used)]

mod common;

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI, SQRT_2};

use approx::assert_relative_eq;
use common::{layered_cube, pin_lattice, slab, LEFT, RIGHT};
use fsr_geometry::csg::BoundaryType;
use fsr_geometry::error::ConsistencyError;
use fsr_geometry::math::Point3;
use fsr_geometry::operations::Tracking;
use fsr_geometry::{FsrError, SegmentationConfig, Track};

#[test]
fn split_square_yields_two_halves() {
    let mut geometry = slab(BoundaryType::Vacuum);
    assert_eq!(geometry.initialize_flat_source_regions().unwrap(), 2);

    let mut track = Track::between(Point3::new(-5.0, 0.0, 0.0), Point3::new(5.0, 0.0, 0.0));
    let report = geometry.segmentize_planar(&mut track, 0.0).unwrap();

    let segments = track.segments();
    assert_eq!(segments.len(), 2);
    assert_eq!(report.segments, 2);
    assert_relative_eq!(segments[0].length, 5.0, epsilon = 1e-9);
    assert_relative_eq!(segments[1].length, 5.0, epsilon = 1e-9);
    assert_ne!(segments[0].fsr, segments[1].fsr);
    assert_eq!(segments[0].material, LEFT);
    assert_eq!(segments[1].material, RIGHT);
}

#[test]
fn long_crossings_are_split_evenly() {
    let mut geometry = slab(BoundaryType::Vacuum);
    geometry
        .set_segmentation_config(SegmentationConfig::default().with_max_segment_length(2.0))
        .unwrap();
    geometry.initialize_flat_source_regions().unwrap();

    let mut track = Track::planar(-5.0, 0.0, 0.0, 10.0);
    geometry.segmentize_planar(&mut track, 0.0).unwrap();

    assert_eq!(track.segments().len(), 6);
    for segment in track.segments() {
        assert!(segment.length <= 2.0);
        assert_relative_eq!(segment.length, 5.0 / 3.0, epsilon = 1e-9);
    }
    assert_relative_eq!(track.segmented_length(), 10.0, epsilon = 1e-9);
}

#[test]
fn short_crossings_are_dropped_and_reported() {
    let mut geometry = slab(BoundaryType::Vacuum);
    geometry
        .set_segmentation_config(SegmentationConfig::default().with_min_segment_length(0.1))
        .unwrap();
    geometry.initialize_flat_source_regions().unwrap();

    let mut track = Track::planar(-0.05, 1.0, 0.0, 5.05);
    let report = geometry.segmentize_planar(&mut track, 0.0).unwrap();

    assert_eq!(track.segments().len(), 1);
    assert_eq!(track.segments()[0].material, RIGHT);
    assert_eq!(report.degenerate.len(), 1);
    assert_relative_eq!(report.degenerate[0].length, 0.05, epsilon = 1e-9);
}

#[test]
fn track_may_end_inside_geometry() {
    let mut geometry = slab(BoundaryType::Vacuum);
    geometry.initialize_flat_source_regions().unwrap();

    let mut track = Track::planar(-5.0, 0.0, 0.0, 7.0);
    geometry.segmentize_planar(&mut track, 0.0).unwrap();
    let lengths: Vec<f64> = track.segments().iter().map(|s| s.length).collect();
    assert_eq!(lengths.len(), 2);
    assert_relative_eq!(lengths[0], 5.0, epsilon = 1e-9);
    assert_relative_eq!(lengths[1], 2.0, epsilon = 1e-9);
}

#[test]
fn vacuum_exit_before_declared_length_is_fatal() {
    let mut geometry = slab(BoundaryType::Vacuum);
    geometry.initialize_flat_source_regions().unwrap();

    let mut track = Track::planar(-5.0, 0.0, 0.0, 12.0);
    let err = geometry.segmentize_planar(&mut track, 0.0).unwrap_err();
    assert!(matches!(
        err,
        FsrError::Consistency(ConsistencyError::TrackLengthMismatch { .. })
    ));
}

#[test]
fn reflective_faces_mirror_the_track() {
    let mut geometry = slab(BoundaryType::Reflective);
    geometry.initialize_flat_source_regions().unwrap();

    let mut track = Track::planar(-5.0, 0.0, 0.0, 30.0);
    let report = geometry.segmentize_planar(&mut track, 0.0).unwrap();

    let materials: Vec<u32> = track.segments().iter().map(|s| s.material).collect();
    assert_eq!(materials, vec![LEFT, RIGHT, RIGHT, LEFT, LEFT, RIGHT]);
    assert_eq!(report.reflections, 2);
    assert_relative_eq!(track.segmented_length(), 30.0, epsilon = 1e-9);
}

#[test]
fn corner_hit_reflects_both_components() {
    let mut geometry = slab(BoundaryType::Reflective);
    geometry.initialize_flat_source_regions().unwrap();

    let mut track = Track::planar(-5.0, -5.0, FRAC_PI_4, 20.0 * SQRT_2);
    let report = geometry.segmentize_planar(&mut track, 0.0).unwrap();

    assert_eq!(report.reflections, 1);
    let materials: Vec<u32> = track.segments().iter().map(|s| s.material).collect();
    assert_eq!(materials, vec![LEFT, RIGHT, RIGHT, LEFT]);
    for segment in track.segments() {
        assert_relative_eq!(segment.length, 5.0 * SQRT_2, epsilon = 1e-9);
    }
}

#[test]
fn segmentation_requires_initialized_regions() {
    let geometry = slab(BoundaryType::Vacuum);
    let mut track = Track::planar(-5.0, 0.0, 0.0, 10.0);
    let err = geometry.segmentize_planar(&mut track, 0.0).unwrap_err();
    assert!(matches!(
        err,
        FsrError::Consistency(ConsistencyError::NotFinalized)
    ));
}

#[test]
fn unregistered_region_is_fatal() {
    let mut geometry = slab(BoundaryType::Vacuum);
    geometry.initialize_flat_source_regions().unwrap();
    let table = geometry.fsrs_mut().unwrap();
    let mut map = table.fingerprint_map();
    map.retain(|_, record| record.id.index() == 0);
    table.set_fingerprint_map(map).unwrap();
    assert_eq!(geometry.num_fsrs(), 1);

    let mut track = Track::planar(-5.0, 0.0, 0.0, 10.0);
    let err = geometry.segmentize_planar(&mut track, 0.0).unwrap_err();
    assert!(matches!(
        err,
        FsrError::Consistency(ConsistencyError::Unregistered(_))
    ));
}

#[test]
fn start_outside_geometry_is_bounds_error() {
    let mut geometry = slab(BoundaryType::Vacuum);
    geometry.initialize_flat_source_regions().unwrap();
    let mut track = Track::planar(-6.0, 0.0, 0.0, 10.0);
    let err = geometry.segmentize_planar(&mut track, 0.0).unwrap_err();
    assert!(matches!(err, FsrError::Bounds(_)));
}

#[test]
fn segments_match_material_at_midpoint() {
    let mut geometry = pin_lattice(3, BoundaryType::Vacuum);
    geometry.initialize_flat_source_regions().unwrap();

    let start = Point3::new(-1.5, -1.2, 0.0);
    let azimuthal = 0.37;
    let direction = fsr_geometry::math::direction(azimuthal, FRAC_PI_2);
    let length = geometry.bounds().distance_to_exit(&start, &direction);
    let mut track = Track::planar(start.x, start.y, azimuthal, length);
    geometry.segmentize_planar(&mut track, 0.0).unwrap();

    assert!(track.segments().len() > 3);
    let mut position = 0.0;
    for segment in track.segments() {
        let midpoint = start + direction * (position + 0.5 * segment.length);
        assert_eq!(geometry.find_fsr_id(midpoint).unwrap(), segment.fsr);
        assert_eq!(geometry.find_fsr_material(segment.fsr).unwrap().id(), segment.material);
        position += segment.length;
    }
    assert_relative_eq!(position, length, epsilon = 1e-9);
}

#[test]
fn spatial_tracks_cross_z_layers() {
    let mut geometry = layered_cube();
    geometry.initialize_flat_source_regions().unwrap();

    let mut vertical = Track::spatial(Point3::new(0.2, 0.3, -1.0), 0.0, 0.0, 2.0);
    geometry.segmentize_spatial(&mut vertical).unwrap();
    let materials: Vec<u32> = vertical.segments().iter().map(|s| s.material).collect();
    assert_eq!(materials, vec![LEFT, RIGHT]);
    assert_relative_eq!(vertical.segments()[0].length, 1.0, epsilon = 1e-9);

    let mut oblique = Track::between(Point3::new(-1.0, 0.0, -1.0), Point3::new(1.0, 0.0, 1.0));
    geometry.segmentize_spatial(&mut oblique).unwrap();
    assert_eq!(oblique.segments().len(), 2);
    for segment in oblique.segments() {
        assert_relative_eq!(segment.length, SQRT_2, epsilon = 1e-9);
    }
}

#[test]
fn planar_segmentation_ignores_polar_angle() {
    let mut geometry = slab(BoundaryType::Vacuum);
    geometry.initialize_flat_source_regions().unwrap();
    let mut track = Track::spatial(Point3::new(-5.0, 0.0, 3.0), 0.0, 0.3, 10.0);
    geometry.segmentize_planar(&mut track, 0.0).unwrap();
    assert_eq!(track.segments().len(), 2);
}

#[test]
fn parallel_segmentation_matches_serial() {
    let mut geometry = pin_lattice(4, BoundaryType::Reflective);
    geometry.initialize_flat_source_regions().unwrap();

    let make_tracks = || -> Vec<Track> {
        (0..32)
            .map(|i| {
                let azimuthal = f64::from(i) * 0.8 * PI / 32.0 - 0.4 * PI + 0.013;
                Track::planar(-2.0, -1.7 + 0.1 * f64::from(i), azimuthal, 9.5)
            })
            .collect()
    };

    let mut serial = make_tracks();
    for track in &mut serial {
        geometry.segmentize_planar(track, 0.0).unwrap();
    }
    let mut parallel = make_tracks();
    let report = geometry
        .segmentize_all(&mut parallel, Tracking::Planar { z: 0.0 })
        .unwrap();

    let serial_count: usize = serial.iter().map(|t| t.segments().len()).sum();
    assert_eq!(report.segments, serial_count);
    for (a, b) in serial.iter().zip(&parallel) {
        assert_eq!(a.segments(), b.segments());
        assert_relative_eq!(b.segmented_length(), 9.5, epsilon = 1e-6);
    }
}

#[test]
fn tracks_along_each_face_stay_inside() {
    let mut geometry = slab(BoundaryType::Vacuum);
    geometry.initialize_flat_source_regions().unwrap();

    // (x, y, azimuthal, materials in order)
    let cases = [
        (5.0, -5.0, FRAC_PI_2, vec![RIGHT]),
        (5.0, 5.0, -FRAC_PI_2, vec![RIGHT]),
        (-5.0, -5.0, FRAC_PI_2, vec![LEFT]),
        (-5.0, 5.0, -FRAC_PI_2, vec![LEFT]),
        (-5.0, 5.0, 0.0, vec![LEFT, RIGHT]),
        (5.0, 5.0, PI, vec![RIGHT, LEFT]),
        (-5.0, -5.0, 0.0, vec![LEFT, RIGHT]),
        (5.0, -5.0, PI, vec![RIGHT, LEFT]),
    ];
    for (x, y, azimuthal, expected) in cases {
        let mut track = Track::planar(x, y, azimuthal, 10.0);
        geometry.segmentize_planar(&mut track, 0.0).unwrap();
        let materials: Vec<u32> = track.segments().iter().map(|s| s.material).collect();
        assert_eq!(materials, expected, "track from ({x}, {y}) at {azimuthal}");
        assert_relative_eq!(track.segmented_length(), 10.0, epsilon = 1e-9);
    }

    let mut between = Track::between(Point3::new(5.0, -5.0, 0.0), Point3::new(5.0, 5.0, 0.0));
    geometry.segmentize_planar(&mut between, 0.0).unwrap();
    assert_eq!(between.segments().len(), 1);
    assert_eq!(between.segments()[0].material, RIGHT);
}
