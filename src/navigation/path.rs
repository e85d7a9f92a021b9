use crate::csg::{CellKey, LatticeKey, MaterialKey, UniverseKey};
use crate::math::Point3;

/// One level of nesting on the way from the root universe to a leaf cell.
#[derive(Debug, Clone, PartialEq)]
pub enum PathLevel {
    /// The cell chosen inside a universe; `point` is in the universe's coordinates.
    Universe {
        universe: UniverseKey,
        cell: CellKey,
        point: Point3,
    },
    /// The lattice cell chosen inside a lattice; `point` is in the lattice's
    /// (parent) coordinates.
    Lattice {
        lattice: LatticeKey,
        index: [usize; 3],
        point: Point3,
    },
}

impl PathLevel {
    /// The point at this level, in this level's coordinates.
    #[must_use]
    pub fn point(&self) -> &Point3 {
        match self {
            PathLevel::Universe { point, .. } | PathLevel::Lattice { point, .. } => point,
        }
    }
}

/// The chain of containers traversed to reach a point, ending in a
/// material-filled leaf cell. Created per query by the
/// [`Navigator`](super::Navigator).
#[derive(Debug, Clone, PartialEq)]
pub struct PositionalPath {
    pub(crate) levels: Vec<PathLevel>,
    pub(crate) leaf: CellKey,
    pub(crate) material: MaterialKey,
}

impl PositionalPath {
    /// Levels from the root universe down to the leaf cell.
    #[must_use]
    pub fn levels(&self) -> &[PathLevel] {
        &self.levels
    }

    /// The point in root (global) coordinates.
    #[must_use]
    pub fn global_point(&self) -> Point3 {
        // A path always holds at least the root level.
        self.levels
            .first()
            .map_or_else(Point3::origin, |level| *level.point())
    }

    /// The material-filled cell at the bottom of the path.
    #[must_use]
    pub fn leaf_cell(&self) -> CellKey {
        self.leaf
    }

    /// The material filling the leaf cell.
    #[must_use]
    pub fn material(&self) -> MaterialKey {
        self.material
    }

    /// Number of levels, root included.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.levels.len()
    }
}
