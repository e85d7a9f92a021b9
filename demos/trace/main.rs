//! Traces a fan of tracks across a small pin lattice and prints what it found.
//!
//! Usage:
//! ```text
//! cargo run --example trace
//! RUST_LOG=fsr_geometry=debug cargo run --example trace
//! ```

use std::f64::consts::{FRAC_PI_2, PI};

use fsr_geometry::csg::{
    BoundaryType, Cell, CsgStore, Fill, Lattice, Material, Sense, Surface, Universe,
};
use fsr_geometry::math::{direction, Point3};
use fsr_geometry::operations::Tracking;
use fsr_geometry::{FsrError, Geometry, Track};

const PINS: usize = 3;

fn main() -> Result<(), FsrError> {
    // Default: WARN for everything, INFO for fsr_geometry.
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        .add_directive("fsr_geometry=info".parse().unwrap_or_default());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let mut geometry = build_assembly()?;
    geometry.initialize_flat_source_regions()?;
    println!("{geometry}");

    let mut tracks = Vec::new();
    for a in 0..8 {
        let azimuthal = -FRAC_PI_2 + (f64::from(a) + 0.5) * PI / 8.0;
        for s in 0..16 {
            let y = geometry.min_y() + (f64::from(s) + 0.5) * geometry.height() / 16.0;
            let start = Point3::new(geometry.min_x(), y, 0.0);
            let length = geometry
                .bounds()
                .distance_to_exit(&start, &direction(azimuthal, FRAC_PI_2));
            tracks.push(Track::planar(start.x, start.y, azimuthal, length));
        }
    }

    let report = geometry.segmentize_all(&mut tracks, Tracking::Planar { z: 0.0 })?;
    println!(
        "{} tracks, {} segments, {} dropped, lengths in [{:.4}, {:.4}]",
        tracks.len(),
        report.segments,
        report.degenerate.len(),
        report.min_length.unwrap_or(0.0),
        report.max_length.unwrap_or(0.0),
    );
    Ok(())
}

fn build_assembly() -> Result<Geometry, FsrError> {
    let mut store = CsgStore::new();
    let fuel = store.add_material(Material::new(1, 7).with_name("UO2").with_fissionable(true))?;
    let water = store.add_material(Material::new(2, 7).with_name("water"))?;

    let pin = store.add_surface(Surface::z_cylinder(1, 0.0, 0.0, 0.54)?)?;
    let fuel_cell = store.add_cell(Cell::new(1, Fill::Material(fuel)).with_halfspace(pin, Sense::Negative))?;
    let water_cell =
        store.add_cell(Cell::new(2, Fill::Material(water)).with_halfspace(pin, Sense::Positive))?;
    let pin_universe = store.add_universe(Universe::new(1, vec![fuel_cell, water_cell]))?;

    let pitch = 1.26;
    #[allow(clippy::cast_precision_loss)]
    let half = pitch * PINS as f64 / 2.0;
    let lattice = store.add_lattice(Lattice::new_2d(
        1,
        (-half, -half),
        (pitch, pitch),
        vec![vec![pin_universe; PINS]; PINS],
    )?)?;

    let mut holder = Cell::new(10, Fill::Lattice(lattice));
    for (id, surface, sense) in [
        (11, Surface::x_plane(11, -half), Sense::Positive),
        (12, Surface::x_plane(12, half), Sense::Negative),
        (13, Surface::y_plane(13, -half), Sense::Positive),
        (14, Surface::y_plane(14, half), Sense::Negative),
    ] {
        let key = store.add_surface(surface.with_name(format!("edge {id}")).with_boundary(BoundaryType::Vacuum))?;
        holder = holder.with_halfspace(key, sense);
    }
    let holder = store.add_cell(holder)?;
    let root = store.add_universe(Universe::new(0, vec![holder]).with_name("root"))?;
    Geometry::new(store, root)
}
