//! Spatial core of a method-of-characteristics transport solver.
//!
//! A [`Geometry`] owns a CSG tree ([`csg::CsgStore`]), locates points in it
//! through a [`navigation::Navigator`], gives every distinct leaf region a
//! dense flat source region id ([`registry::FsrTable`]) and splits tracks
//! into per-region segments.

pub mod config;
pub mod csg;
pub mod error;
pub mod geometry;
pub mod math;
pub mod navigation;
pub mod operations;
pub mod registry;
pub mod track;

pub use config::SegmentationConfig;
pub use error::{FsrError, Result};
pub use geometry::Geometry;
pub use registry::{FsrId, FsrKey};
pub use track::{Segment, Track};
