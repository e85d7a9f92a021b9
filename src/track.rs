use std::f64::consts::FRAC_PI_2;

use crate::csg::MaterialId;
use crate::math::{direction, Point3, Vector3};
use crate::registry::FsrId;

/// A piece of a track lying entirely inside one flat source region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub length: f64,
    pub fsr: FsrId,
    pub material: MaterialId,
}

/// A fixed-direction ray across the geometry.
///
/// Tracks are laid out by the caller; segmentation only appends segments.
#[derive(Debug, Clone)]
pub struct Track {
    start: Point3,
    azimuthal: f64,
    polar: f64,
    length: f64,
    segments: Vec<Segment>,
}

impl Track {
    /// Creates a track in the x-y plane. The z coordinate is supplied at segmentation.
    #[must_use]
    pub fn planar(x: f64, y: f64, azimuthal: f64, length: f64) -> Self {
        Self::spatial(Point3::new(x, y, 0.0), azimuthal, FRAC_PI_2, length)
    }

    /// Creates a track with a full three-dimensional direction.
    #[must_use]
    pub fn spatial(start: Point3, azimuthal: f64, polar: f64, length: f64) -> Self {
        Self {
            start,
            azimuthal,
            polar,
            length,
            segments: Vec::new(),
        }
    }

    /// Creates the track running from `start` to `end`.
    #[must_use]
    pub fn between(start: Point3, end: Point3) -> Self {
        let delta = end - start;
        let length = delta.norm();
        let azimuthal = delta.y.atan2(delta.x);
        let polar = if length > 0.0 {
            (delta.z / length).clamp(-1.0, 1.0).acos()
        } else {
            FRAC_PI_2
        };
        Self::spatial(start, azimuthal, polar, length)
    }

    #[must_use]
    pub fn start(&self) -> &Point3 {
        &self.start
    }

    #[must_use]
    pub fn azimuthal(&self) -> f64 {
        self.azimuthal
    }

    #[must_use]
    pub fn polar(&self) -> f64 {
        self.polar
    }

    /// Unit direction of travel.
    #[must_use]
    pub fn direction(&self) -> Vector3 {
        direction(self.azimuthal, self.polar)
    }

    /// Declared total length.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.length
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Appends a segment.
    pub fn push_segment(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    /// Sum of segment lengths.
    #[must_use]
    pub fn segmented_length(&self) -> f64 {
        self.segments.iter().map(|s| s.length).sum()
    }
}
