use crate::error::Result;
use crate::math::{Aabb, Point3, Vector3};

use super::lattice::LatticeKey;
use super::material::MaterialKey;
use super::surface::{halfspace_contains, Sense, SurfaceKey};
use super::universe::UniverseKey;
use super::CsgStore;

slotmap::new_key_type! {
    /// Unique identifier for a cell in the CSG store.
    pub struct CellKey;
}

/// User-facing cell identifier.
pub type CellId = u32;

/// What occupies the region of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fill {
    /// A leaf region of homogeneous material.
    Material(MaterialKey),
    /// A nested universe, in the same coordinates as the cell.
    Universe(UniverseKey),
    /// A lattice of universes.
    Lattice(LatticeKey),
}

/// One side of a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Halfspace {
    pub surface: SurfaceKey,
    pub sense: Sense,
}

/// A region bounded by the intersection of halfspaces, with a fill.
#[derive(Debug, Clone)]
pub struct Cell {
    id: CellId,
    name: String,
    region: Vec<Halfspace>,
    fill: Fill,
}

impl Cell {
    /// Creates an unbounded cell with the given fill.
    #[must_use]
    pub fn new(id: CellId, fill: Fill) -> Self {
        Self {
            id,
            name: String::new(),
            region: Vec::new(),
            fill,
        }
    }

    /// Sets a display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Intersects the cell region with one side of a surface.
    #[must_use]
    pub fn with_halfspace(mut self, surface: SurfaceKey, sense: Sense) -> Self {
        self.region.push(Halfspace { surface, sense });
        self
    }

    #[must_use]
    pub fn id(&self) -> CellId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn fill(&self) -> Fill {
        self.fill
    }

    #[must_use]
    pub fn region(&self) -> &[Halfspace] {
        &self.region
    }

    /// Tests whether the point lies inside every halfspace of the cell.
    ///
    /// # Errors
    ///
    /// Returns an error if a bounding surface is missing from the store.
    pub fn contains(
        &self,
        point: &Point3,
        direction: Option<&Vector3>,
        store: &CsgStore,
    ) -> Result<bool> {
        for halfspace in &self.region {
            let surface = store.surface(halfspace.surface)?;
            if !halfspace_contains(surface, halfspace.sense, point, direction) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Distance along `direction` to the nearest bounding surface.
    ///
    /// # Errors
    ///
    /// Returns an error if a bounding surface is missing from the store.
    pub fn min_surface_distance(
        &self,
        point: &Point3,
        direction: &Vector3,
        store: &CsgStore,
    ) -> Result<f64> {
        let mut distance = f64::INFINITY;
        for halfspace in &self.region {
            let d = store.surface(halfspace.surface)?.min_distance(point, direction);
            distance = distance.min(d);
        }
        Ok(distance)
    }

    /// Axis-aligned bounds implied by the cell's halfspaces.
    ///
    /// # Errors
    ///
    /// Returns an error if a bounding surface is missing from the store.
    pub fn region_bounds(&self, store: &CsgStore) -> Result<Aabb> {
        let mut bounds = Aabb::infinite();
        for halfspace in &self.region {
            let surface = store.surface(halfspace.surface)?;
            bounds = bounds.intersection(&surface.halfspace_bounds(halfspace.sense));
        }
        Ok(bounds)
    }
}
