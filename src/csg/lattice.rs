use crate::error::{CsgError, Result};
use crate::math::{Aabb, Point3, Vector3, ON_SURFACE_THRESH};

use super::universe::UniverseKey;

slotmap::new_key_type! {
    /// Unique identifier for a lattice in the CSG store.
    pub struct LatticeKey;
}

/// User-facing lattice identifier.
pub type LatticeId = u32;

/// A regular grid of universes.
///
/// Each lattice cell has its own local coordinate system centred on the
/// cell. Two-dimensional lattices extend infinitely in z and leave the z
/// coordinate untouched.
#[derive(Debug, Clone)]
pub struct Lattice {
    id: LatticeId,
    name: String,
    lower_left: Point3,
    pitch: Vector3,
    shape: [usize; 3],
    three_d: bool,
    /// Indexed by `i + nx * (j + ny * k)`.
    universes: Vec<UniverseKey>,
    pub(crate) fissionable: bool,
}

impl Lattice {
    /// Creates a two-dimensional lattice.
    ///
    /// `rows` are listed top (largest y) to bottom, each row left to right.
    ///
    /// # Errors
    ///
    /// Returns an error if the rows are empty or ragged, or a pitch is not positive.
    pub fn new_2d(
        id: LatticeId,
        lower_left: (f64, f64),
        pitch: (f64, f64),
        rows: Vec<Vec<UniverseKey>>,
    ) -> Result<Self> {
        let mut lattice = Self::new_3d(
            id,
            Point3::new(lower_left.0, lower_left.1, 0.0),
            Vector3::new(pitch.0, pitch.1, 1.0),
            vec![rows],
        )?;
        lattice.three_d = false;
        Ok(lattice)
    }

    /// Creates a three-dimensional lattice.
    ///
    /// `layers` are listed bottom (smallest z) to top; within a layer rows run
    /// top to bottom and each row left to right.
    ///
    /// # Errors
    ///
    /// Returns an error if the layers are empty or ragged, or a pitch is not positive.
    pub fn new_3d(
        id: LatticeId,
        lower_left: Point3,
        pitch: Vector3,
        layers: Vec<Vec<Vec<UniverseKey>>>,
    ) -> Result<Self> {
        if pitch.iter().any(|p| !p.is_finite() || *p <= 0.0) {
            return Err(CsgError::InvalidLattice(format!(
                "lattice {id} pitch must be positive"
            ))
            .into());
        }
        let nz = layers.len();
        let ny = layers.first().map_or(0, Vec::len);
        let nx = layers.first().and_then(|l| l.first()).map_or(0, Vec::len);
        if nx == 0 || ny == 0 || nz == 0 {
            return Err(CsgError::InvalidLattice(format!("lattice {id} is empty")).into());
        }

        let mut universes = Vec::with_capacity(nx * ny * nz);
        for layer in &layers {
            if layer.len() != ny || layer.iter().any(|row| row.len() != nx) {
                return Err(CsgError::InvalidLattice(format!(
                    "lattice {id} rows must all be {nx} wide and {ny} tall"
                ))
                .into());
            }
            for row in layer.iter().rev() {
                universes.extend_from_slice(row);
            }
        }

        Ok(Self {
            id,
            name: String::new(),
            lower_left,
            pitch,
            shape: [nx, ny, nz],
            three_d: true,
            universes,
            fissionable: false,
        })
    }

    /// Sets a display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn id(&self) -> LatticeId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of lattice cells along x, y and z.
    #[must_use]
    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    #[must_use]
    pub fn pitch(&self) -> &Vector3 {
        &self.pitch
    }

    #[must_use]
    pub fn is_3d(&self) -> bool {
        self.three_d
    }

    /// Whether any material reachable from this lattice is fissionable.
    #[must_use]
    pub fn is_fissionable(&self) -> bool {
        self.fissionable
    }

    fn dims(&self) -> usize {
        if self.three_d {
            3
        } else {
            2
        }
    }

    /// The universe filling a lattice cell.
    #[must_use]
    pub fn universe_at(&self, index: [usize; 3]) -> UniverseKey {
        let [nx, ny, _] = self.shape;
        self.universes[index[0] + nx * (index[1] + ny * index[2])]
    }

    /// All universes, in storage order.
    pub fn universes(&self) -> impl Iterator<Item = UniverseKey> + '_ {
        self.universes.iter().copied()
    }

    /// All lattice cell indices, x fastest.
    pub fn indices(&self) -> impl Iterator<Item = [usize; 3]> {
        let [nx, ny, nz] = self.shape;
        (0..nz).flat_map(move |k| (0..ny).flat_map(move |j| (0..nx).map(move |i| [i, j, k])))
    }

    /// Bounds of the whole lattice in its parent's coordinates.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        let mut bounds = Aabb::infinite();
        for axis in 0..self.dims() {
            bounds.min[axis] = self.lower_left[axis];
            #[allow(clippy::cast_precision_loss)]
            let n = self.shape[axis] as f64;
            bounds.max[axis] = self.lower_left[axis] + n * self.pitch[axis];
        }
        bounds
    }

    /// Bounds of one lattice cell in its parent's coordinates.
    #[must_use]
    pub fn cell_bounds(&self, index: [usize; 3]) -> Aabb {
        let mut bounds = Aabb::infinite();
        for axis in 0..self.dims() {
            #[allow(clippy::cast_precision_loss)]
            let lo = self.lower_left[axis] + index[axis] as f64 * self.pitch[axis];
            bounds.min[axis] = lo;
            bounds.max[axis] = lo + self.pitch[axis];
        }
        bounds
    }

    /// Centre of a lattice cell; z is 0 for two-dimensional lattices.
    #[must_use]
    pub fn cell_center(&self, index: [usize; 3]) -> Point3 {
        let mut center = Point3::origin();
        for axis in 0..self.dims() {
            #[allow(clippy::cast_precision_loss)]
            let offset = (index[axis] as f64 + 0.5) * self.pitch[axis];
            center[axis] = self.lower_left[axis] + offset;
        }
        center
    }

    /// Converts a point in parent coordinates to the local coordinates of a lattice cell.
    #[must_use]
    pub fn local_point(&self, point: &Point3, index: [usize; 3]) -> Point3 {
        Point3::from(point - self.cell_center(index))
    }

    /// Finds the lattice cell containing a point.
    ///
    /// A point on a grid plane belongs to the cell `direction` is heading
    /// into; without a direction, or with one parallel to the plane, it
    /// belongs to the upper cell. The outer planes of the lattice belong to
    /// the adjacent interior cell.
    #[must_use]
    pub fn find_index(&self, point: &Point3, direction: Option<&Vector3>) -> Option<[usize; 3]> {
        let mut index = [0; 3];
        for (axis, slot) in index.iter_mut().enumerate().take(self.dims()) {
            *slot = self.axis_index(axis, point[axis], direction.map(|d| d[axis]))?;
        }
        Some(index)
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn axis_index(&self, axis: usize, coord: f64, direction: Option<f64>) -> Option<usize> {
        let n = self.shape[axis] as f64;
        let u = (coord - self.lower_left[axis]) / self.pitch[axis];
        let nearest = u.round();
        let on_plane = ((u - nearest) * self.pitch[axis]).abs() < ON_SURFACE_THRESH;

        let mut index = if on_plane {
            match direction {
                Some(d) if d <= -f64::EPSILON => nearest - 1.0,
                _ => nearest,
            }
        } else {
            u.floor()
        };
        if on_plane && index < 0.0 {
            index = 0.0;
        }
        if on_plane && index >= n {
            index = n - 1.0;
        }

        if index < 0.0 || index >= n {
            None
        } else {
            Some(index as usize)
        }
    }

    /// Distance along `direction` from a local point to the walls of its lattice cell.
    #[must_use]
    pub fn min_wall_distance(&self, local: &Point3, direction: &Vector3) -> f64 {
        let mut distance = f64::INFINITY;
        for axis in 0..self.dims() {
            let d = direction[axis];
            if d.abs() < f64::EPSILON {
                continue;
            }
            let half = 0.5 * self.pitch[axis];
            let wall = if d > 0.0 { half } else { -half };
            let t = (wall - local[axis]) / d;
            if t > ON_SURFACE_THRESH {
                distance = distance.min(t);
            }
        }
        distance
    }
}
