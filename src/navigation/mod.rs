mod path;

pub use path::{PathLevel, PositionalPath};

use crate::csg::{CsgStore, Fill, UniverseKey};
use crate::error::{BoundsError, Result};
use crate::math::{direction, Aabb, Point3, Vector3};

/// Outcome of moving a path across the nearest boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Advance {
    /// The path now describes the region on the far side of the boundary.
    Entered { distance: f64 },
    /// The boundary crossed was the edge of the geometry. The path is left
    /// describing the region that was just traversed.
    Exited { distance: f64, point: Point3 },
}

impl Advance {
    /// Distance travelled to reach the boundary.
    #[must_use]
    pub fn distance(&self) -> f64 {
        match *self {
            Advance::Entered { distance } | Advance::Exited { distance, .. } => distance,
        }
    }
}

/// Stateless locator over a read-only CSG tree.
///
/// Cheap to copy and safe to share across worker threads.
#[derive(Debug, Clone, Copy)]
pub struct Navigator<'a> {
    store: &'a CsgStore,
    root: UniverseKey,
    bounds: Aabb,
}

impl<'a> Navigator<'a> {
    /// Creates a navigator for the tree under `root`, confined to `bounds`.
    #[must_use]
    pub fn new(store: &'a CsgStore, root: UniverseKey, bounds: Aabb) -> Self {
        Self {
            store,
            root,
            bounds,
        }
    }

    /// Descends from the root to the leaf cell containing `point`.
    ///
    /// Points on a shared boundary go to the first cell listed in their universe.
    ///
    /// # Errors
    ///
    /// Returns a [`BoundsError`] if the point lies outside the root universe
    /// or in a void.
    pub fn locate(&self, point: Point3) -> Result<PositionalPath> {
        if !self.bounds.contains(&point) {
            return Err(outside_root(&point));
        }
        self.descend(point, None)
    }

    /// Like [`locate`](Self::locate), but a point on a shared boundary goes to
    /// the region the direction `(azimuthal, polar)` heads into.
    ///
    /// # Errors
    ///
    /// Returns a [`BoundsError`] if the point lies outside the root universe
    /// (or on its boundary heading out) or in a void.
    pub fn locate_along_direction(
        &self,
        point: Point3,
        azimuthal: f64,
        polar: f64,
    ) -> Result<PositionalPath> {
        self.locate_along(point, &direction(azimuthal, polar))
    }

    /// [`locate_along_direction`](Self::locate_along_direction) with a unit direction vector.
    ///
    /// # Errors
    ///
    /// Returns a [`BoundsError`] if the point cannot be placed.
    pub fn locate_along(&self, point: Point3, direction: &Vector3) -> Result<PositionalPath> {
        if !self.bounds.contains_along(&point, direction) {
            return Err(outside_root(&point));
        }
        self.descend(point, Some(direction))
    }

    /// Moves the path past the nearest boundary of its leaf cell along the
    /// direction `(azimuthal, polar)` and relocates it.
    ///
    /// Leaving the root bounding box is reported as [`Advance::Exited`];
    /// applying the boundary condition is up to the caller.
    ///
    /// # Errors
    ///
    /// Returns a [`BoundsError`] if no boundary lies ahead or the new position
    /// falls in a void inside the bounding box.
    pub fn advance_past_boundary(
        &self,
        path: &mut PositionalPath,
        azimuthal: f64,
        polar: f64,
    ) -> Result<Advance> {
        self.advance_along(path, &direction(azimuthal, polar))
    }

    /// [`advance_past_boundary`](Self::advance_past_boundary) with a unit direction vector.
    ///
    /// # Errors
    ///
    /// Returns a [`BoundsError`] if the path cannot be advanced.
    pub fn advance_along(&self, path: &mut PositionalPath, direction: &Vector3) -> Result<Advance> {
        let start = path.global_point();
        let distance = self.boundary_distance(path, direction)?;
        if !distance.is_finite() {
            return Err(BoundsError::Unbounded {
                x: start.x,
                y: start.y,
                z: start.z,
            }
            .into());
        }

        let point = start + direction * distance;
        if !self.bounds.contains_along(&point, direction) {
            return Ok(Advance::Exited { distance, point });
        }
        *path = self.descend(point, Some(direction))?;
        Ok(Advance::Entered { distance })
    }

    /// Distance along `direction` to the nearest boundary of any container on
    /// the path, or of the root bounding box.
    ///
    /// # Errors
    ///
    /// Returns an error if an entity on the path is missing from the store.
    pub fn boundary_distance(&self, path: &PositionalPath, direction: &Vector3) -> Result<f64> {
        let mut distance = self
            .bounds
            .distance_to_exit(&path.global_point(), direction);
        for level in path.levels() {
            let d = match level {
                PathLevel::Universe { cell, point, .. } => self
                    .store
                    .cell(*cell)?
                    .min_surface_distance(point, direction, self.store)?,
                PathLevel::Lattice {
                    lattice,
                    index,
                    point,
                } => {
                    let lattice = self.store.lattice(*lattice)?;
                    lattice.min_wall_distance(&lattice.local_point(point, *index), direction)
                }
            };
            distance = distance.min(d);
        }
        Ok(distance)
    }

    fn descend(&self, global: Point3, direction: Option<&Vector3>) -> Result<PositionalPath> {
        let mut levels = Vec::new();
        let mut universe_key = self.root;
        let mut point = global;

        loop {
            let universe = self.store.universe(universe_key)?;
            let Some(cell_key) = universe.find_cell(&point, direction, self.store)? else {
                return Err(BoundsError::NoCell {
                    universe: universe.id(),
                    x: global.x,
                    y: global.y,
                    z: global.z,
                }
                .into());
            };
            levels.push(PathLevel::Universe {
                universe: universe_key,
                cell: cell_key,
                point,
            });

            match self.store.cell(cell_key)?.fill() {
                Fill::Material(material) => {
                    return Ok(PositionalPath {
                        levels,
                        leaf: cell_key,
                        material,
                    });
                }
                Fill::Universe(inner) => universe_key = inner,
                Fill::Lattice(lattice_key) => {
                    let lattice = self.store.lattice(lattice_key)?;
                    let index = lattice.find_index(&point, direction).ok_or(
                        BoundsError::OutsideLattice {
                            lattice: lattice.id(),
                            x: global.x,
                            y: global.y,
                            z: global.z,
                        },
                    )?;
                    levels.push(PathLevel::Lattice {
                        lattice: lattice_key,
                        index,
                        point,
                    });
                    point = lattice.local_point(&point, index);
                    universe_key = lattice.universe_at(index);
                }
            }
        }
    }
}

fn outside_root(point: &Point3) -> crate::error::FsrError {
    BoundsError::OutsideRoot {
        x: point.x,
        y: point.y,
        z: point.z,
    }
    .into()
}
