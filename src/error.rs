use thiserror::Error;

use crate::registry::FsrId;

/// Top-level error type for the flat source region geometry core.
#[derive(Debug, Error)]
pub enum FsrError {
    #[error(transparent)]
    Csg(#[from] CsgError),

    #[error(transparent)]
    Bounds(#[from] BoundsError),

    #[error(transparent)]
    Consistency(#[from] ConsistencyError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors raised while building or reading the CSG model.
#[derive(Debug, Error)]
pub enum CsgError {
    #[error("entity not found: {0}")]
    EntityNotFound(String),

    #[error("duplicate {kind} id {id}")]
    DuplicateId { kind: &'static str, id: u32 },

    #[error("invalid lattice: {0}")]
    InvalidLattice(String),

    #[error("degenerate surface: {0}")]
    DegenerateSurface(String),

    #[error("materials disagree on energy group count ({expected} vs {found})")]
    InconsistentGroups { expected: usize, found: usize },
}

/// A queried point could not be placed inside the root universe.
#[derive(Debug, Error)]
pub enum BoundsError {
    #[error("point ({x}, {y}, {z}) lies outside the root universe")]
    OutsideRoot { x: f64, y: f64, z: f64 },

    #[error("point ({x}, {y}, {z}) lies in no cell of universe {universe}")]
    NoCell { universe: u32, x: f64, y: f64, z: f64 },

    #[error("point ({x}, {y}, {z}) lies outside lattice {lattice}")]
    OutsideLattice { lattice: u32, x: f64, y: f64, z: f64 },

    #[error("ray from ({x}, {y}, {z}) never crosses a boundary")]
    Unbounded { x: f64, y: f64, z: f64 },
}

/// Registry or track state that would corrupt flat source region indexing.
#[derive(Debug, Error)]
pub enum ConsistencyError {
    #[error("flat source regions have not been initialized")]
    NotFinalized,

    #[error("fingerprint {0} is not registered")]
    Unregistered(String),

    #[error("FSR id {id} is out of range (registry holds {count})")]
    UnknownFsr { id: usize, count: usize },

    #[error("bulk replace given {keys} fingerprints but {materials} materials")]
    CardinalityMismatch { keys: usize, materials: usize },

    #[error("bulk replace given {given} entries but the registry holds {held}")]
    SizeMismatch { given: usize, held: usize },

    #[error("bulk replace ids are not contiguous from 0: {0}")]
    NonContiguousIds(String),

    #[error("fingerprint {0} appears more than once")]
    DuplicateFingerprint(String),

    #[error("traced {traced} of a declared track length {expected}")]
    TrackLengthMismatch { expected: f64, traced: f64 },
}

/// Invalid segmentation configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be finite and positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },

    #[error("minimum segment length {min} exceeds maximum {max}")]
    InvertedBounds { min: f64, max: f64 },
}

/// A segment shorter than the configured minimum. Dropped, never returned as an error.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("degenerate segment of length {length} in FSR {fsr}")]
pub struct DegenerateSegment {
    pub length: f64,
    pub fsr: FsrId,
}

/// Convenience type alias for results using [`FsrError`].
pub type Result<T> = std::result::Result<T, FsrError>;
