use std::fmt;

use crate::csg::BoundaryType;
use crate::math::Face;

use super::Geometry;

impl fmt::Display for BoundaryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BoundaryType::Vacuum => "vacuum",
            BoundaryType::Reflective => "reflective",
        })
    }
}

/// Diagnostic summary. Not a stable format.
impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let root = self.store.universe(self.root).map_or(0, |u| u.id());
        writeln!(f, "Geometry (root universe {root})")?;
        for (axis, name) in ["x", "y", "z"].iter().enumerate() {
            writeln!(
                f,
                "  {name}: [{}, {}]",
                self.bounds.min[axis], self.bounds.max[axis]
            )?;
        }
        write!(f, "  boundaries:")?;
        for (face, label) in Face::ALL
            .iter()
            .zip(["x-", "x+", "y-", "y+", "z-", "z+"])
        {
            write!(f, " {label} {}", self.boundary_type(*face))?;
        }
        writeln!(f)?;
        let cells = self
            .num_cells()
            .map_or_else(|_| "?".to_string(), |n| n.to_string());
        write!(
            f,
            "  materials: {}, cells: {cells}, FSRs: {}",
            self.num_materials(),
            self.num_fsrs()
        )
    }
}
