#![allow(dead_code, clippy::unwrap_used)]

use fsr_geometry::csg::{
    BoundaryType, Cell, CsgStore, Fill, Lattice, Material, Sense, Surface, Universe,
};
use fsr_geometry::Geometry;

pub const LEFT: u32 = 1;
pub const RIGHT: u32 = 2;
pub const FUEL: u32 = 10;
pub const WATER: u32 = 20;
pub const CLAD: u32 = 30;

/// Adds the four planes of the square `[-half, half]^2` and returns a cell
/// bounded by them.
fn square(store: &mut CsgStore, half: f64, boundary: BoundaryType, first_id: u32, cell: Cell) -> Cell {
    let x_min = store
        .add_surface(Surface::x_plane(first_id, -half).with_boundary(boundary))
        .unwrap();
    let x_max = store
        .add_surface(Surface::x_plane(first_id + 1, half).with_boundary(boundary))
        .unwrap();
    let y_min = store
        .add_surface(Surface::y_plane(first_id + 2, -half).with_boundary(boundary))
        .unwrap();
    let y_max = store
        .add_surface(Surface::y_plane(first_id + 3, half).with_boundary(boundary))
        .unwrap();
    cell.with_halfspace(x_min, Sense::Positive)
        .with_halfspace(x_max, Sense::Negative)
        .with_halfspace(y_min, Sense::Positive)
        .with_halfspace(y_max, Sense::Negative)
}

/// A 10 x 10 square centred on the origin, split at x = 0 into a left and a
/// right material.
pub fn slab(boundary: BoundaryType) -> Geometry {
    let mut store = CsgStore::new();
    let left = store
        .add_material(Material::new(LEFT, 2).with_name("left"))
        .unwrap();
    let right = store
        .add_material(Material::new(RIGHT, 2).with_name("right"))
        .unwrap();
    let x_min = store
        .add_surface(Surface::x_plane(1, -5.0).with_boundary(boundary))
        .unwrap();
    let x_max = store
        .add_surface(Surface::x_plane(2, 5.0).with_boundary(boundary))
        .unwrap();
    let y_min = store
        .add_surface(Surface::y_plane(3, -5.0).with_boundary(boundary))
        .unwrap();
    let y_max = store
        .add_surface(Surface::y_plane(4, 5.0).with_boundary(boundary))
        .unwrap();
    let split = store.add_surface(Surface::x_plane(5, 0.0)).unwrap();

    let a = store
        .add_cell(
            Cell::new(1, Fill::Material(left))
                .with_halfspace(x_min, Sense::Positive)
                .with_halfspace(split, Sense::Negative)
                .with_halfspace(y_min, Sense::Positive)
                .with_halfspace(y_max, Sense::Negative),
        )
        .unwrap();
    let b = store
        .add_cell(
            Cell::new(2, Fill::Material(right))
                .with_halfspace(split, Sense::Positive)
                .with_halfspace(x_max, Sense::Negative)
                .with_halfspace(y_min, Sense::Positive)
                .with_halfspace(y_max, Sense::Negative),
        )
        .unwrap();
    let root = store.add_universe(Universe::new(0, vec![a, b])).unwrap();
    Geometry::new(store, root).unwrap()
}

/// An `n x n` lattice of unit pin cells (fuel pin of radius 0.4 in water),
/// centred on the origin.
pub fn pin_lattice(n: usize, boundary: BoundaryType) -> Geometry {
    let mut store = CsgStore::new();
    let fuel = store
        .add_material(Material::new(FUEL, 2).with_fissionable(true))
        .unwrap();
    let water = store.add_material(Material::new(WATER, 2)).unwrap();
    let pin = store
        .add_surface(Surface::z_cylinder(100, 0.0, 0.0, 0.4).unwrap())
        .unwrap();
    let fuel_cell = store
        .add_cell(Cell::new(1, Fill::Material(fuel)).with_halfspace(pin, Sense::Negative))
        .unwrap();
    let water_cell = store
        .add_cell(Cell::new(2, Fill::Material(water)).with_halfspace(pin, Sense::Positive))
        .unwrap();
    let pin_universe = store
        .add_universe(Universe::new(1, vec![fuel_cell, water_cell]).with_name("pin"))
        .unwrap();

    #[allow(clippy::cast_precision_loss)]
    let half = n as f64 / 2.0;
    let rows = vec![vec![pin_universe; n]; n];
    let lattice = store
        .add_lattice(Lattice::new_2d(1, (-half, -half), (1.0, 1.0), rows).unwrap())
        .unwrap();
    let holder = square(
        &mut store,
        half,
        boundary,
        1,
        Cell::new(100, Fill::Lattice(lattice)),
    );
    let holder = store.add_cell(holder).unwrap();
    let root = store.add_universe(Universe::new(0, vec![holder])).unwrap();
    Geometry::new(store, root).unwrap()
}

/// A 2 x 2 lattice of unit pin cells whose pin universe also lists a ring
/// `0.75 < r < 0.9` (material CLAD). The ring lies wholly outside the unit
/// cell, whose corners are at r = 0.707.
pub fn ringed_pin_lattice() -> Geometry {
    let mut store = CsgStore::new();
    let fuel = store.add_material(Material::new(FUEL, 2)).unwrap();
    let water = store.add_material(Material::new(WATER, 2)).unwrap();
    let clad = store.add_material(Material::new(CLAD, 2)).unwrap();
    let pin = store
        .add_surface(Surface::z_cylinder(100, 0.0, 0.0, 0.4).unwrap())
        .unwrap();
    let inner = store
        .add_surface(Surface::z_cylinder(101, 0.0, 0.0, 0.75).unwrap())
        .unwrap();
    let outer = store
        .add_surface(Surface::z_cylinder(102, 0.0, 0.0, 0.9).unwrap())
        .unwrap();
    let fuel_cell = store
        .add_cell(Cell::new(1, Fill::Material(fuel)).with_halfspace(pin, Sense::Negative))
        .unwrap();
    let water_cell = store
        .add_cell(
            Cell::new(2, Fill::Material(water))
                .with_halfspace(pin, Sense::Positive)
                .with_halfspace(inner, Sense::Negative),
        )
        .unwrap();
    let ring_cell = store
        .add_cell(
            Cell::new(3, Fill::Material(clad))
                .with_halfspace(inner, Sense::Positive)
                .with_halfspace(outer, Sense::Negative),
        )
        .unwrap();
    let pin_universe = store
        .add_universe(Universe::new(1, vec![fuel_cell, water_cell, ring_cell]))
        .unwrap();

    let lattice = store
        .add_lattice(
            Lattice::new_2d(1, (-1.0, -1.0), (1.0, 1.0), vec![vec![pin_universe; 2]; 2]).unwrap(),
        )
        .unwrap();
    let holder = square(
        &mut store,
        1.0,
        BoundaryType::Vacuum,
        1,
        Cell::new(100, Fill::Lattice(lattice)),
    );
    let holder = store.add_cell(holder).unwrap();
    let root = store.add_universe(Universe::new(0, vec![holder])).unwrap();
    Geometry::new(store, root).unwrap()
}

/// The cube `[-1, 1]^3` split at z = 0: material LEFT below, RIGHT above.
pub fn layered_cube() -> Geometry {
    let mut store = CsgStore::new();
    let bottom = store.add_material(Material::new(LEFT, 1)).unwrap();
    let top = store.add_material(Material::new(RIGHT, 1)).unwrap();
    let z_min = store.add_surface(Surface::z_plane(10, -1.0)).unwrap();
    let z_mid = store.add_surface(Surface::z_plane(11, 0.0)).unwrap();
    let z_max = store.add_surface(Surface::z_plane(12, 1.0)).unwrap();

    let lower = square(
        &mut store,
        1.0,
        BoundaryType::Vacuum,
        1,
        Cell::new(1, Fill::Material(bottom)),
    )
    .with_halfspace(z_min, Sense::Positive)
    .with_halfspace(z_mid, Sense::Negative);
    let lower = store.add_cell(lower).unwrap();

    let upper = store.cell(lower).unwrap().region().to_vec();
    let mut upper_cell = Cell::new(2, Fill::Material(top));
    for halfspace in upper.iter().take(4) {
        upper_cell = upper_cell.with_halfspace(halfspace.surface, halfspace.sense);
    }
    let upper_cell = upper_cell
        .with_halfspace(z_mid, Sense::Positive)
        .with_halfspace(z_max, Sense::Negative);
    let upper = store.add_cell(upper_cell).unwrap();

    let root = store.add_universe(Universe::new(0, vec![lower, upper])).unwrap();
    Geometry::new(store, root).unwrap()
}
