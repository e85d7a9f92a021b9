pub mod cell;
pub mod lattice;
pub mod material;
pub mod surface;
pub mod universe;

pub use cell::{Cell, CellId, CellKey, Fill, Halfspace};
pub use lattice::{Lattice, LatticeId, LatticeKey};
pub use material::{Material, MaterialId, MaterialKey};
pub use surface::{BoundaryType, Sense, Surface, SurfaceId, SurfaceKey, SurfaceKind};
pub use universe::{Universe, UniverseId, UniverseKey};

use crate::error::{CsgError, Result};
use crate::math::Aabb;
use slotmap::SlotMap;

/// Central arena that owns every CSG entity.
///
/// Entities reference each other via typed keys (generational indices).
/// Insertion checks that referenced entities already exist, so the
/// containment graph is always acyclic and built bottom-up.
#[derive(Debug, Default)]
pub struct CsgStore {
    surfaces: SlotMap<SurfaceKey, Surface>,
    cells: SlotMap<CellKey, Cell>,
    universes: SlotMap<UniverseKey, Universe>,
    lattices: SlotMap<LatticeKey, Lattice>,
    materials: SlotMap<MaterialKey, Material>,
}

impl CsgStore {
    /// Creates a new, empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Material operations ---

    /// Inserts a material and returns its key.
    ///
    /// # Errors
    ///
    /// Returns an error if a material with the same id already exists.
    pub fn add_material(&mut self, material: Material) -> Result<MaterialKey> {
        if self.material_by_id(material.id()).is_some() {
            return Err(duplicate("material", material.id()));
        }
        Ok(self.materials.insert(material))
    }

    /// Returns the material, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn material(&self, key: MaterialKey) -> Result<&Material> {
        self.materials
            .get(key)
            .ok_or_else(|| CsgError::EntityNotFound("material".into()).into())
    }

    /// Looks a material up by its user id.
    #[must_use]
    pub fn material_by_id(&self, id: MaterialId) -> Option<MaterialKey> {
        self.materials
            .iter()
            .find_map(|(key, m)| (m.id() == id).then_some(key))
    }

    // --- Surface operations ---

    /// Inserts a surface and returns its key.
    ///
    /// # Errors
    ///
    /// Returns an error if a surface with the same id already exists.
    pub fn add_surface(&mut self, surface: Surface) -> Result<SurfaceKey> {
        if self.surfaces.values().any(|s| s.id() == surface.id()) {
            return Err(duplicate("surface", surface.id()));
        }
        Ok(self.surfaces.insert(surface))
    }

    /// Returns the surface, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn surface(&self, key: SurfaceKey) -> Result<&Surface> {
        self.surfaces
            .get(key)
            .ok_or_else(|| CsgError::EntityNotFound("surface".into()).into())
    }

    // --- Cell operations ---

    /// Inserts a cell and returns its key.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is taken or the cell references a missing
    /// surface or fill.
    pub fn add_cell(&mut self, cell: Cell) -> Result<CellKey> {
        if self.cells.values().any(|c| c.id() == cell.id()) {
            return Err(duplicate("cell", cell.id()));
        }
        for halfspace in cell.region() {
            self.surface(halfspace.surface)?;
        }
        match cell.fill() {
            Fill::Material(key) => {
                self.material(key)?;
            }
            Fill::Universe(key) => {
                self.universe(key)?;
            }
            Fill::Lattice(key) => {
                self.lattice(key)?;
            }
        }
        Ok(self.cells.insert(cell))
    }

    /// Returns the cell, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn cell(&self, key: CellKey) -> Result<&Cell> {
        self.cells
            .get(key)
            .ok_or_else(|| CsgError::EntityNotFound("cell".into()).into())
    }

    // --- Universe operations ---

    /// Inserts a universe and returns its key.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is taken or a listed cell is missing.
    pub fn add_universe(&mut self, universe: Universe) -> Result<UniverseKey> {
        if self.universes.values().any(|u| u.id() == universe.id()) {
            return Err(duplicate("universe", universe.id()));
        }
        for &cell in universe.cells() {
            self.cell(cell)?;
        }
        Ok(self.universes.insert(universe))
    }

    /// Returns the universe, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn universe(&self, key: UniverseKey) -> Result<&Universe> {
        self.universes
            .get(key)
            .ok_or_else(|| CsgError::EntityNotFound("universe".into()).into())
    }

    // --- Lattice operations ---

    /// Inserts a lattice and returns its key.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is taken or a lattice universe is missing.
    pub fn add_lattice(&mut self, lattice: Lattice) -> Result<LatticeKey> {
        if self.lattices.values().any(|l| l.id() == lattice.id()) {
            return Err(duplicate("lattice", lattice.id()));
        }
        for universe in lattice.universes() {
            self.universe(universe)?;
        }
        Ok(self.lattices.insert(lattice))
    }

    /// Returns the lattice, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn lattice(&self, key: LatticeKey) -> Result<&Lattice> {
        self.lattices
            .get(key)
            .ok_or_else(|| CsgError::EntityNotFound("lattice".into()).into())
    }

    // --- Traversals ---

    /// Bounds of everything a universe can contain, in its own coordinates.
    ///
    /// # Errors
    ///
    /// Returns an error if a referenced entity is missing.
    pub fn universe_bounds(&self, key: UniverseKey) -> Result<Aabb> {
        let mut bounds = Aabb::empty();
        for &cell_key in self.universe(key)?.cells() {
            let cell = self.cell(cell_key)?;
            let fill_bounds = match cell.fill() {
                Fill::Material(_) => Aabb::infinite(),
                Fill::Universe(inner) => self.universe_bounds(inner)?,
                Fill::Lattice(lattice) => self.lattice(lattice)?.bounds(),
            };
            let cell_bounds = cell.region_bounds(self)?.intersection(&fill_bounds);
            bounds = bounds.union(&cell_bounds);
        }
        Ok(bounds)
    }

    /// Visits every cell reachable from a universe, depth first, once per
    /// definition (repeated lattice instances are not revisited).
    ///
    /// # Errors
    ///
    /// Returns an error if a referenced entity is missing.
    pub fn reachable_cells(&self, root: UniverseKey) -> Result<Vec<CellKey>> {
        let mut seen_universes = Vec::new();
        let mut cells = Vec::new();
        self.collect_cells(root, &mut seen_universes, &mut cells)?;
        Ok(cells)
    }

    fn collect_cells(
        &self,
        universe: UniverseKey,
        seen: &mut Vec<UniverseKey>,
        cells: &mut Vec<CellKey>,
    ) -> Result<()> {
        if seen.contains(&universe) {
            return Ok(());
        }
        seen.push(universe);
        for &cell_key in self.universe(universe)?.cells() {
            cells.push(cell_key);
            match self.cell(cell_key)?.fill() {
                Fill::Material(_) => {}
                Fill::Universe(inner) => self.collect_cells(inner, seen, cells)?,
                Fill::Lattice(lattice) => {
                    for inner in self.lattice(lattice)?.universes() {
                        self.collect_cells(inner, seen, cells)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Distinct materials reachable from a universe, in first-visit order.
    ///
    /// # Errors
    ///
    /// Returns an error if a referenced entity is missing.
    pub fn reachable_materials(&self, root: UniverseKey) -> Result<Vec<MaterialKey>> {
        let mut materials = Vec::new();
        for cell in self.reachable_cells(root)? {
            if let Fill::Material(key) = self.cell(cell)?.fill() {
                if !materials.contains(&key) {
                    materials.push(key);
                }
            }
        }
        Ok(materials)
    }

    /// Flags every universe and lattice reachable from `root` as fissionable
    /// when it contains a fissionable material. Returns the root's flag.
    ///
    /// # Errors
    ///
    /// Returns an error if a referenced entity is missing.
    pub fn compute_fissionability(&mut self, root: UniverseKey) -> Result<bool> {
        let mut memo = Vec::new();
        self.universe_fissionability(root, &mut memo)
    }

    fn universe_fissionability(
        &mut self,
        key: UniverseKey,
        memo: &mut Vec<(UniverseKey, bool)>,
    ) -> Result<bool> {
        if let Some(&(_, known)) = memo.iter().find(|(k, _)| *k == key) {
            return Ok(known);
        }
        let cells = self.universe(key)?.cells().to_vec();
        let mut fissionable = false;
        for cell in cells {
            let contains = match self.cell(cell)?.fill() {
                Fill::Material(material) => self.material(material)?.is_fissionable(),
                Fill::Universe(inner) => self.universe_fissionability(inner, memo)?,
                Fill::Lattice(lattice) => {
                    let inner: Vec<_> = self.lattice(lattice)?.universes().collect();
                    let mut any = false;
                    for universe in inner {
                        any |= self.universe_fissionability(universe, memo)?;
                    }
                    if let Some(l) = self.lattices.get_mut(lattice) {
                        l.fissionable = any;
                    }
                    any
                }
            };
            fissionable |= contains;
        }
        if let Some(u) = self.universes.get_mut(key) {
            u.fissionable = fissionable;
        }
        memo.push((key, fissionable));
        Ok(fissionable)
    }
}

fn duplicate(kind: &'static str, id: u32) -> crate::error::FsrError {
    CsgError::DuplicateId { kind, id }.into()
}
