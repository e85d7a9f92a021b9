mod overlay;
mod summary;

pub use overlay::{CoarseMeshOverlay, OverlayView};

use std::collections::BTreeMap;
use std::sync::{Arc, Weak};

use rayon::prelude::*;
use tracing::{debug, info};

use crate::config::SegmentationConfig;
use crate::csg::{
    BoundaryType, CellId, CellKey, CsgStore, Fill, Material, MaterialId, MaterialKey, Sense,
    SurfaceKind, UniverseKey,
};
use crate::error::{ConsistencyError, CsgError, Result};
use crate::math::{Aabb, Face, Point3, TOLERANCE};
use crate::navigation::{Navigator, PositionalPath};
use crate::operations::{EnumerateRegions, SegmentationReport, Segmentize, Tracking};
use crate::registry::{FsrId, FsrKey, FsrTable};
use crate::track::Track;

/// The spatial model of a solver run.
///
/// Owns the CSG tree and the flat source region table. Bounds, face
/// boundary conditions and the material cache are derived whenever the
/// root universe is assigned and are read-only afterwards.
#[derive(Debug)]
pub struct Geometry {
    store: CsgStore,
    root: UniverseKey,
    bounds: Aabb,
    boundaries: [BoundaryType; 6],
    materials: BTreeMap<MaterialId, MaterialKey>,
    fsrs: Option<FsrTable>,
    config: SegmentationConfig,
    overlay: Option<Weak<dyn CoarseMeshOverlay>>,
}

impl Geometry {
    /// Creates a geometry over `store` rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if the root is missing or encloses no space.
    pub fn new(store: CsgStore, root: UniverseKey) -> Result<Self> {
        let mut geometry = Self {
            store,
            root,
            bounds: Aabb::empty(),
            boundaries: [BoundaryType::Vacuum; 6],
            materials: BTreeMap::new(),
            fsrs: None,
            config: SegmentationConfig::default(),
            overlay: None,
        };
        geometry.set_root_universe(root)?;
        Ok(geometry)
    }

    /// Injects a non-owning reference to an acceleration overlay.
    #[must_use]
    pub fn with_overlay(mut self, overlay: &Arc<dyn CoarseMeshOverlay>) -> Self {
        self.overlay = Some(Arc::downgrade(overlay));
        self
    }

    /// Replaces the segment length bounds.
    ///
    /// # Errors
    ///
    /// Returns a config error if the bounds are invalid.
    pub fn set_segmentation_config(&mut self, config: SegmentationConfig) -> Result<()> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    #[must_use]
    pub fn segmentation_config(&self) -> &SegmentationConfig {
        &self.config
    }

    /// Assigns a new root universe, rebuilding bounds, boundary types and the
    /// material cache. Previously registered regions are discarded.
    ///
    /// # Errors
    ///
    /// Returns an error if the root is missing or encloses no space.
    pub fn set_root_universe(&mut self, root: UniverseKey) -> Result<()> {
        let bounds = self.store.universe_bounds(root)?;
        if bounds.is_empty() {
            return Err(CsgError::EntityNotFound(format!(
                "space inside root universe {}",
                self.store.universe(root)?.id()
            ))
            .into());
        }
        let boundaries = face_boundaries(&self.store, root, &bounds)?;
        let mut materials = BTreeMap::new();
        for key in self.store.reachable_materials(root)? {
            materials.insert(self.store.material(key)?.id(), key);
        }

        self.root = root;
        self.bounds = bounds;
        self.boundaries = boundaries;
        self.materials = materials;
        self.fsrs = None;
        debug!(
            root = self.store.universe(root)?.id(),
            materials = self.materials.len(),
            "assigned root universe"
        );
        Ok(())
    }

    #[must_use]
    pub fn store(&self) -> &CsgStore {
        &self.store
    }

    #[must_use]
    pub fn root_universe(&self) -> UniverseKey {
        self.root
    }

    /// A navigator over this geometry.
    #[must_use]
    pub fn navigator(&self) -> Navigator<'_> {
        Navigator::new(&self.store, self.root, self.bounds)
    }

    // --- Extents ---

    #[must_use]
    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    #[must_use]
    pub fn min_x(&self) -> f64 {
        self.bounds.min.x
    }

    #[must_use]
    pub fn max_x(&self) -> f64 {
        self.bounds.max.x
    }

    #[must_use]
    pub fn min_y(&self) -> f64 {
        self.bounds.min.y
    }

    #[must_use]
    pub fn max_y(&self) -> f64 {
        self.bounds.max.y
    }

    #[must_use]
    pub fn min_z(&self) -> f64 {
        self.bounds.min.z
    }

    #[must_use]
    pub fn max_z(&self) -> f64 {
        self.bounds.max.z
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.bounds.extent(0)
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.bounds.extent(1)
    }

    #[must_use]
    pub fn depth(&self) -> f64 {
        self.bounds.extent(2)
    }

    /// Boundary condition on one face of the bounding box.
    #[must_use]
    pub fn boundary_type(&self, face: Face) -> BoundaryType {
        self.boundaries[face.index()]
    }

    /// Whether a point lies inside the bounding box (faces included).
    #[must_use]
    pub fn within_bounds(&self, point: &Point3) -> bool {
        self.bounds.contains(point)
    }

    // --- Materials and cells ---

    /// Materials reachable from the root, by id.
    #[must_use]
    pub fn all_materials(&self) -> &BTreeMap<MaterialId, MaterialKey> {
        &self.materials
    }

    #[must_use]
    pub fn num_materials(&self) -> usize {
        self.materials.len()
    }

    /// Number of distinct cells reachable from the root.
    ///
    /// # Errors
    ///
    /// Returns an error if the tree references missing entities.
    pub fn num_cells(&self) -> Result<usize> {
        Ok(self.store.reachable_cells(self.root)?.len())
    }

    /// Material-filled cells reachable from the root, by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the tree references missing entities.
    pub fn all_material_cells(&self) -> Result<BTreeMap<CellId, CellKey>> {
        let mut cells = BTreeMap::new();
        for key in self.store.reachable_cells(self.root)? {
            let cell = self.store.cell(key)?;
            if matches!(cell.fill(), Fill::Material(_)) {
                cells.insert(cell.id(), key);
            }
        }
        Ok(cells)
    }

    /// Energy group count shared by every material, or 0 without materials.
    ///
    /// # Errors
    ///
    /// Returns [`CsgError::InconsistentGroups`] if materials disagree.
    pub fn num_energy_groups(&self) -> Result<usize> {
        let mut groups = None;
        for &key in self.materials.values() {
            let found = self.store.material(key)?.num_groups();
            match groups {
                None => groups = Some(found),
                Some(expected) if expected != found => {
                    return Err(CsgError::InconsistentGroups { expected, found }.into());
                }
                Some(_) => {}
            }
        }
        Ok(groups.unwrap_or(0))
    }

    /// Flags fissionable universes and lattices. Returns the root's flag.
    ///
    /// # Errors
    ///
    /// Returns an error if the tree references missing entities.
    pub fn compute_fissionability(&mut self) -> Result<bool> {
        self.store.compute_fissionability(self.root)
    }

    /// The leaf cell containing a point.
    ///
    /// # Errors
    ///
    /// Returns a bounds error if the point lies outside the geometry.
    pub fn find_cell_containing(&self, point: Point3) -> Result<CellKey> {
        Ok(self.navigator().locate(point)?.leaf_cell())
    }

    // --- Flat source regions ---

    /// Registers every flat source region. Must run before segmentation.
    /// Returns the number of regions.
    ///
    /// # Errors
    ///
    /// Returns an error if the tree references missing entities.
    pub fn initialize_flat_source_regions(&mut self) -> Result<usize> {
        let enumeration = EnumerateRegions::new().execute(self)?;
        let count = enumeration.table.len();
        self.fsrs = Some(enumeration.table);
        info!(
            fsrs = count,
            skipped = enumeration.skipped.len(),
            "initialized flat source regions"
        );
        Ok(count)
    }

    /// The finalized region table.
    ///
    /// # Errors
    ///
    /// Returns [`ConsistencyError::NotFinalized`] before initialization.
    pub fn fsrs(&self) -> Result<&FsrTable> {
        self.fsrs
            .as_ref()
            .ok_or_else(|| ConsistencyError::NotFinalized.into())
    }

    /// Mutable access for centroid assignment and bulk replacement.
    ///
    /// # Errors
    ///
    /// Returns [`ConsistencyError::NotFinalized`] before initialization.
    pub fn fsrs_mut(&mut self) -> Result<&mut FsrTable> {
        self.fsrs
            .as_mut()
            .ok_or_else(|| ConsistencyError::NotFinalized.into())
    }

    /// Number of flat source regions; 0 before initialization.
    #[must_use]
    pub fn num_fsrs(&self) -> usize {
        self.fsrs.as_ref().map_or(0, FsrTable::len)
    }

    /// The region containing a point. Never allocates a new id.
    ///
    /// # Errors
    ///
    /// Returns a bounds error for points outside the geometry and a
    /// consistency error if the region is not registered.
    pub fn find_fsr_id(&self, point: Point3) -> Result<FsrId> {
        let path = self.navigator().locate(point)?;
        self.fsrs()?.lookup(&FsrKey::from_path(&path, &self.store)?)
    }

    /// Human-readable fingerprint of the region a path ends in.
    ///
    /// # Errors
    ///
    /// Returns an error if the path references missing entities.
    pub fn fsr_key_string(&self, path: &PositionalPath) -> Result<String> {
        Ok(FsrKey::from_path(path, &self.store)?.to_string())
    }

    /// Representative point of a region.
    ///
    /// # Errors
    ///
    /// Returns a consistency error for unknown ids or before initialization.
    pub fn fsr_point(&self, fsr: FsrId) -> Result<Point3> {
        Ok(*self.fsrs()?.point(fsr)?)
    }

    /// Centroid of a region, if assigned.
    ///
    /// # Errors
    ///
    /// Returns a consistency error for unknown ids or before initialization.
    pub fn fsr_centroid(&self, fsr: FsrId) -> Result<Option<Point3>> {
        Ok(self.fsrs()?.centroid(fsr)?.copied())
    }

    /// Stores the finished centroid of a region.
    ///
    /// # Errors
    ///
    /// Returns a consistency error for unknown ids or before initialization.
    pub fn set_fsr_centroid(&mut self, fsr: FsrId, centroid: Point3) -> Result<()> {
        self.fsrs_mut()?.set_centroid(fsr, centroid)
    }

    /// The material filling a region.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown ids, before initialization, or if the
    /// material is no longer reachable from the root.
    pub fn find_fsr_material(&self, fsr: FsrId) -> Result<&Material> {
        let id = self.fsrs()?.material(fsr)?;
        let key = self
            .materials
            .get(&id)
            .ok_or_else(|| CsgError::EntityNotFound(format!("material {id}")))?;
        self.store.material(*key)
    }

    /// The leaf cell of a region, found by relocating its representative point.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown ids or before initialization.
    pub fn find_cell_containing_fsr(&self, fsr: FsrId) -> Result<CellKey> {
        self.find_cell_containing(self.fsr_point(fsr)?)
    }

    // --- Segmentation ---

    /// Segments a planar track at height `z`.
    ///
    /// # Errors
    ///
    /// See [`Segmentize::execute`].
    pub fn segmentize_planar(&self, track: &mut Track, z: f64) -> Result<SegmentationReport> {
        Segmentize::planar(z).execute(self, track)
    }

    /// Segments a fully three-dimensional track.
    ///
    /// # Errors
    ///
    /// See [`Segmentize::execute`].
    pub fn segmentize_spatial(&self, track: &mut Track) -> Result<SegmentationReport> {
        Segmentize::spatial().execute(self, track)
    }

    /// Segments many tracks in parallel. Stops at the first failing track.
    ///
    /// # Errors
    ///
    /// See [`Segmentize::execute`].
    pub fn segmentize_all(
        &self,
        tracks: &mut [Track],
        tracking: Tracking,
    ) -> Result<SegmentationReport> {
        let op = Segmentize::new(tracking);
        let reports = tracks
            .par_iter_mut()
            .map(|track| op.execute(self, track))
            .collect::<Result<Vec<_>>>()?;
        let mut total = SegmentationReport::default();
        for report in reports {
            total.merge(report);
        }
        Ok(total)
    }

    // --- Acceleration overlay ---

    /// Hands the finalized geometry to the overlay, if one is attached and
    /// still alive. Returns whether an overlay was initialized.
    ///
    /// # Errors
    ///
    /// Returns [`ConsistencyError::NotFinalized`] before region
    /// initialization, or the overlay's own error.
    pub fn initialize_overlay(&self) -> Result<bool> {
        let Some(overlay) = self.overlay.as_ref().and_then(Weak::upgrade) else {
            return Ok(false);
        };
        let table = self.fsrs()?;
        let view = OverlayView {
            fsr_materials: table.materials(),
            fsr_keys: table.keys().collect(),
            store: &self.store,
            root: self.root,
            bounds: self.bounds,
            boundaries: self.boundaries,
        };
        overlay.initialize(&view)?;
        Ok(true)
    }
}

/// Boundary type of each bounding box face, taken from the root-level
/// axis plane lying on that face. Faces without a marked surface are vacuum.
fn face_boundaries(
    store: &CsgStore,
    root: UniverseKey,
    bounds: &Aabb,
) -> Result<[BoundaryType; 6]> {
    let mut found: [Option<BoundaryType>; 6] = [None; 6];
    for &cell_key in store.universe(root)?.cells() {
        for halfspace in store.cell(cell_key)?.region() {
            let surface = store.surface(halfspace.surface)?;
            let Some(boundary) = surface.boundary() else {
                continue;
            };
            let positive = halfspace.sense == Sense::Positive;
            let (face, value) = match *surface.kind() {
                SurfaceKind::XPlane { x0 } if positive => (Face::XMin, x0),
                SurfaceKind::XPlane { x0 } => (Face::XMax, x0),
                SurfaceKind::YPlane { y0 } if positive => (Face::YMin, y0),
                SurfaceKind::YPlane { y0 } => (Face::YMax, y0),
                SurfaceKind::ZPlane { z0 } if positive => (Face::ZMin, z0),
                SurfaceKind::ZPlane { z0 } => (Face::ZMax, z0),
                _ => continue,
            };
            let limit = if face.is_max() {
                bounds.max[face.axis()]
            } else {
                bounds.min[face.axis()]
            };
            let slot = &mut found[face.index()];
            if slot.is_none() && (value - limit).abs() < TOLERANCE {
                *slot = Some(boundary);
            }
        }
    }
    Ok(found.map(Option::unwrap_or_default))
}
