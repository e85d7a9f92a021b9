use crate::csg::{BoundaryType, CsgStore, MaterialId, UniverseKey};
use crate::error::Result;
use crate::math::{Aabb, Face};
use crate::registry::FsrKey;

/// A coarse mesh laid over the geometry by an acceleration scheme.
///
/// The geometry only keeps a weak reference to its overlay; the overlay's
/// lifetime belongs to whoever wires the solver together.
pub trait CoarseMeshOverlay: Send + Sync {
    /// Builds the overlay from a finalized geometry.
    ///
    /// # Errors
    ///
    /// Implementations report their own failures.
    fn initialize(&self, view: &OverlayView<'_>) -> Result<()>;
}

/// Everything an overlay needs to map flat source regions onto its mesh.
#[derive(Debug)]
pub struct OverlayView<'a> {
    /// Material id of each flat source region, indexed by FSR id.
    pub fsr_materials: Vec<MaterialId>,
    /// Fingerprint of each flat source region, indexed by FSR id.
    pub fsr_keys: Vec<&'a FsrKey>,
    pub store: &'a CsgStore,
    pub root: UniverseKey,
    pub bounds: Aabb,
    pub boundaries: [BoundaryType; 6],
}

impl OverlayView<'_> {
    /// Boundary condition on one face of the bounding box.
    #[must_use]
    pub fn boundary(&self, face: Face) -> BoundaryType {
        self.boundaries[face.index()]
    }
}
