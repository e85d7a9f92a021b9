use rayon::prelude::*;
use tracing::{debug, warn};

use crate::csg::{CsgStore, Fill, MaterialId, UniverseKey};
use crate::error::Result;
use crate::geometry::Geometry;
use crate::math::{Aabb, Point3, Vector3};
use crate::navigation::Navigator;
use crate::registry::{FsrKey, FsrRegistry, FsrTable, KeyPart};

/// One instance of a material-filled cell, as reached through a particular
/// chain of containers.
#[derive(Debug, Clone, PartialEq)]
pub struct LeafInstance {
    pub key: FsrKey,
    pub material: MaterialId,
    /// Conservative bounds of the instance in root coordinates.
    pub bounds: Aabb,
}

/// Result of [`EnumerateRegions::execute`].
#[derive(Debug, Clone)]
pub struct Enumeration {
    pub table: FsrTable,
    /// Leaf instances whose conservative bounds overlap their container but
    /// which no sample point located. Usually cells lying wholly outside a
    /// lattice cell; they hold no volume and get no id.
    pub skipped: Vec<FsrKey>,
}

/// Registers every leaf region of a geometry before any track is segmented.
///
/// Leaves are collected by a depth-first walk that expands every lattice
/// cell. Representative points are searched for and verified regions
/// registered on the rayon pool; ids are then renumbered to the depth-first
/// order so the result does not depend on thread scheduling.
#[derive(Debug, Clone, Copy)]
pub struct EnumerateRegions {
    probe_resolution: usize,
    canonical_order: bool,
}

impl Default for EnumerateRegions {
    fn default() -> Self {
        Self {
            probe_resolution: 8,
            canonical_order: true,
        }
    }
}

impl EnumerateRegions {
    /// Creates a new `EnumerateRegions` operation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Finest probe grid (per axis) used to find a point inside each region.
    #[must_use]
    pub fn with_probe_resolution(mut self, resolution: usize) -> Self {
        self.probe_resolution = resolution.max(1);
        self
    }

    /// Keeps first-registered ids instead of renumbering to depth-first order.
    #[must_use]
    pub fn with_canonical_order(mut self, canonical: bool) -> Self {
        self.canonical_order = canonical;
        self
    }

    /// Executes the enumeration, returning the finalized table.
    ///
    /// A leaf is registered only once a point has been found that locates
    /// back to it. Leaves whose bounds overlap their container but whose
    /// region does not are reported in [`Enumeration::skipped`].
    ///
    /// # Errors
    ///
    /// Returns an error if the CSG tree references missing entities.
    pub fn execute(&self, geometry: &Geometry) -> Result<Enumeration> {
        let store = geometry.store();
        let leaves = collect_leaves(store, geometry.root_universe(), geometry.bounds())?;
        let navigator = geometry.navigator();
        let registry = FsrRegistry::new();

        let registered = leaves
            .par_iter()
            .map(|leaf| -> Result<bool> {
                let Some(point) = self.representative_point(&navigator, store, leaf)? else {
                    debug!(key = %leaf.key, "no sample point lies in this region; skipping it");
                    return Ok(false);
                };
                registry.resolve(leaf.key.clone(), point, leaf.material);
                Ok(true)
            })
            .collect::<Result<Vec<_>>>()?;

        let mut kept = Vec::with_capacity(leaves.len());
        let mut skipped = Vec::new();
        for (leaf, registered) in leaves.into_iter().zip(registered) {
            if registered {
                kept.push(leaf);
            } else {
                skipped.push(leaf.key);
            }
        }
        if !skipped.is_empty() {
            warn!(
                skipped = skipped.len(),
                "leaf cells with no located interior point were not registered"
            );
        }

        let mut table = registry.finalize();
        if self.canonical_order {
            let keys = kept.iter().map(|l| l.key.clone()).collect();
            let materials = kept.iter().map(|l| l.material).collect();
            table.set_all(keys, materials)?;
        }
        debug!(fsrs = table.len(), "enumerated flat source regions");
        Ok(Enumeration { table, skipped })
    }

    fn representative_point(
        &self,
        navigator: &Navigator<'_>,
        store: &CsgStore,
        leaf: &LeafInstance,
    ) -> Result<Option<Point3>> {
        let center = leaf.bounds.center();
        if locates_to(navigator, store, center, &leaf.key)? {
            return Ok(Some(center));
        }

        let mut n = 2;
        while n <= self.probe_resolution {
            for point in probe_grid(&leaf.bounds, n) {
                if locates_to(navigator, store, point, &leaf.key)? {
                    return Ok(Some(point));
                }
            }
            n *= 2;
        }
        Ok(None)
    }
}

fn locates_to(navigator: &Navigator<'_>, store: &CsgStore, point: Point3, key: &FsrKey) -> Result<bool> {
    match navigator.locate(point) {
        Ok(path) => Ok(FsrKey::from_path(&path, store)? == *key),
        Err(crate::FsrError::Bounds(_)) => Ok(false),
        Err(other) => Err(other),
    }
}

/// Cell-centred points of an `n`-per-axis grid over the finite axes of `bounds`.
#[allow(clippy::cast_precision_loss)]
fn probe_grid(bounds: &Aabb, n: usize) -> Vec<Point3> {
    let center = bounds.center();
    let axis_values = |axis: usize| -> Vec<f64> {
        let (lo, hi) = (bounds.min[axis], bounds.max[axis]);
        if lo.is_finite() && hi.is_finite() {
            (0..n)
                .map(|i| lo + (i as f64 + 0.5) / n as f64 * (hi - lo))
                .collect()
        } else {
            vec![center[axis]]
        }
    };
    let (xs, ys, zs) = (axis_values(0), axis_values(1), axis_values(2));
    let mut points = Vec::with_capacity(xs.len() * ys.len() * zs.len());
    for &z in &zs {
        for &y in &ys {
            for &x in &xs {
                points.push(Point3::new(x, y, z));
            }
        }
    }
    points
}

/// Walks the tree under `root` and lists every leaf instance in depth-first order.
///
/// # Errors
///
/// Returns an error if the tree references missing entities.
pub fn collect_leaves(store: &CsgStore, root: UniverseKey, bounds: &Aabb) -> Result<Vec<LeafInstance>> {
    let mut leaves = Vec::new();
    let mut prefix = Vec::new();
    walk(store, root, Vector3::zeros(), bounds, &mut prefix, &mut leaves)?;
    Ok(leaves)
}

fn walk(
    store: &CsgStore,
    universe_key: UniverseKey,
    offset: Vector3,
    container: &Aabb,
    prefix: &mut Vec<KeyPart>,
    leaves: &mut Vec<LeafInstance>,
) -> Result<()> {
    let universe = store.universe(universe_key)?;
    for &cell_key in universe.cells() {
        let cell = store.cell(cell_key)?;
        let region = cell
            .region_bounds(store)?
            .translated(&offset)
            .intersection(container);
        if region.is_empty() {
            continue;
        }

        prefix.push(KeyPart::Cell {
            universe: universe.id(),
            cell: cell.id(),
        });
        match cell.fill() {
            Fill::Material(material) => leaves.push(LeafInstance {
                key: FsrKey::new(prefix.clone()),
                material: store.material(material)?.id(),
                bounds: region,
            }),
            Fill::Universe(inner) => walk(store, inner, offset, &region, prefix, leaves)?,
            Fill::Lattice(lattice_key) => {
                let lattice = store.lattice(lattice_key)?;
                for index in lattice.indices() {
                    let cell_bounds = lattice
                        .cell_bounds(index)
                        .translated(&offset)
                        .intersection(&region);
                    if cell_bounds.is_empty() {
                        continue;
                    }
                    prefix.push(KeyPart::Lattice {
                        lattice: lattice.id(),
                        index,
                    });
                    let inner_offset = offset + lattice.cell_center(index).coords;
                    walk(
                        store,
                        lattice.universe_at(index),
                        inner_offset,
                        &cell_bounds,
                        prefix,
                        leaves,
                    )?;
                    prefix.pop();
                }
            }
        }
        prefix.pop();
    }
    Ok(())
}
