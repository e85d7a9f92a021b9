use std::f64::consts::FRAC_PI_2;

use tracing::{debug, trace};

use crate::config::SegmentationConfig;
use crate::csg::{BoundaryType, MaterialId};
use crate::error::{ConsistencyError, DegenerateSegment, Result};
use crate::geometry::Geometry;
use crate::math::{direction, Point3, LENGTH_TOLERANCE};
use crate::navigation::Advance;
use crate::registry::{FsrId, FsrKey};
use crate::track::{Segment, Track};

/// Whether tracks are confined to a plane or travel in full 3D.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tracking {
    /// Tracks lie in the plane `z = z`; their polar angle is ignored.
    Planar { z: f64 },
    /// Tracks use their azimuthal and polar angles.
    Spatial,
}

/// Summary of one or more segmentation runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SegmentationReport {
    /// Segments appended to tracks.
    pub segments: usize,
    /// Reflections applied at reflective boundaries.
    pub reflections: usize,
    /// Crossings dropped for being shorter than the minimum length.
    pub degenerate: Vec<DegenerateSegment>,
    /// Shortest segment emitted.
    pub min_length: Option<f64>,
    /// Longest segment emitted.
    pub max_length: Option<f64>,
}

impl SegmentationReport {
    /// Folds another report into this one.
    pub fn merge(&mut self, other: SegmentationReport) {
        self.segments += other.segments;
        self.reflections += other.reflections;
        self.degenerate.extend(other.degenerate);
        self.min_length = min_opt(self.min_length, other.min_length);
        self.max_length = match (self.max_length, other.max_length) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
    }

    fn record(&mut self, length: f64) {
        self.segments += 1;
        self.min_length = min_opt(self.min_length, Some(length));
        self.max_length = Some(self.max_length.map_or(length, |m| m.max(length)));
    }
}

fn min_opt(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

/// Decomposes a track into segments, each inside one flat source region.
///
/// Requires the geometry's flat source regions to be initialized; every
/// region crossed must already be registered.
#[derive(Debug, Clone, Copy)]
pub struct Segmentize {
    tracking: Tracking,
}

impl Segmentize {
    /// Creates a new `Segmentize` operation.
    #[must_use]
    pub fn new(tracking: Tracking) -> Self {
        Self { tracking }
    }

    /// Segmentation of planar tracks at the given z-level.
    #[must_use]
    pub fn planar(z: f64) -> Self {
        Self::new(Tracking::Planar { z })
    }

    /// Segmentation of fully three-dimensional tracks.
    #[must_use]
    pub fn spatial() -> Self {
        Self::new(Tracking::Spatial)
    }

    /// Executes the operation, appending segments to the track.
    ///
    /// The walk ends when the traced length reaches the track's declared
    /// length. Reaching a vacuum boundary first is a consistency error;
    /// reflective boundaries mirror the direction and the walk continues.
    ///
    /// # Errors
    ///
    /// Returns a bounds error if the track leaves the modelled space, or a
    /// consistency error if regions are not initialized, a crossed region is
    /// unregistered, or the traced and declared lengths disagree.
    pub fn execute(&self, geometry: &Geometry, track: &mut Track) -> Result<SegmentationReport> {
        let table = geometry.fsrs()?;
        let store = geometry.store();
        let navigator = geometry.navigator();
        let config = geometry.segmentation_config();

        let (mut point, mut dir) = match self.tracking {
            Tracking::Planar { z } => {
                let start = track.start();
                (
                    Point3::new(start.x, start.y, z),
                    direction(track.azimuthal(), FRAC_PI_2),
                )
            }
            Tracking::Spatial => (*track.start(), track.direction()),
        };

        let total = track.length();
        let mut report = SegmentationReport::default();
        if total <= LENGTH_TOLERANCE {
            return Ok(report);
        }

        let mut path = navigator.locate_along(point, &dir)?;
        let mut travelled = 0.0;
        loop {
            let key = FsrKey::from_path(&path, store)?;
            let fsr = table.lookup(&key)?;
            let material = store.material(path.material())?.id();

            let step = navigator.advance_along(&mut path, &dir)?;
            let length = step.distance().min(total - travelled);
            emit(track, length, fsr, material, config, &mut report);
            travelled += length;
            if total - travelled <= LENGTH_TOLERANCE {
                break;
            }

            if let Advance::Exited { point: exit, .. } = step {
                let faces = geometry.bounds().exit_faces(&exit, &dir);
                let reflective = !faces.is_empty()
                    && faces
                        .iter()
                        .all(|f| geometry.boundary_type(*f) == BoundaryType::Reflective);
                if !reflective {
                    return Err(ConsistencyError::TrackLengthMismatch {
                        expected: total,
                        traced: travelled,
                    }
                    .into());
                }
                for face in faces {
                    dir = face.reflect(&dir);
                }
                point = exit;
                report.reflections += 1;
                trace!(?point, ?dir, "reflected at boundary");
                path = navigator.locate_along(point, &dir)?;
            }
        }

        debug!(
            segments = report.segments,
            dropped = report.degenerate.len(),
            reflections = report.reflections,
            "segmentized track"
        );
        Ok(report)
    }
}

fn emit(
    track: &mut Track,
    length: f64,
    fsr: FsrId,
    material: MaterialId,
    config: &SegmentationConfig,
    report: &mut SegmentationReport,
) {
    if length < config.min_segment_length {
        let dropped = DegenerateSegment { length, fsr };
        debug!(%dropped, "dropping segment");
        report.degenerate.push(dropped);
        return;
    }
    let pieces = config.pieces(length);
    #[allow(clippy::cast_precision_loss)]
    let piece = length / pieces as f64;
    for _ in 0..pieces {
        track.push_segment(Segment {
            length: piece,
            fsr,
            material,
        });
        report.record(piece);
    }
}
