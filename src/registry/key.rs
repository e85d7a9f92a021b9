use std::fmt;

use crate::csg::{CellId, CsgStore, LatticeId, UniverseId};
use crate::error::Result;
use crate::navigation::{PathLevel, PositionalPath};

/// One step of a region fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyPart {
    /// A cell chosen inside a universe.
    Cell { universe: UniverseId, cell: CellId },
    /// A lattice cell chosen inside a lattice.
    Lattice { lattice: LatticeId, index: [usize; 3] },
}

/// Deterministic identity of a leaf region instance.
///
/// Built from user ids rather than arena keys, so it is stable across runs
/// for the same geometry definition. Lattice indices distinguish repeated
/// instances of the same leaf cell. Equality compares every part; two keys
/// that merely hash alike are never treated as the same region.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FsrKey(Vec<KeyPart>);

impl FsrKey {
    #[must_use]
    pub fn new(parts: Vec<KeyPart>) -> Self {
        Self(parts)
    }

    /// Fingerprint of the leaf region a path ends in.
    ///
    /// # Errors
    ///
    /// Returns an error if an entity on the path is missing from the store.
    pub fn from_path(path: &PositionalPath, store: &CsgStore) -> Result<Self> {
        let mut parts = Vec::with_capacity(path.depth());
        for level in path.levels() {
            parts.push(match level {
                PathLevel::Universe { universe, cell, .. } => KeyPart::Cell {
                    universe: store.universe(*universe)?.id(),
                    cell: store.cell(*cell)?.id(),
                },
                PathLevel::Lattice { lattice, index, .. } => KeyPart::Lattice {
                    lattice: store.lattice(*lattice)?.id(),
                    index: *index,
                },
            });
        }
        Ok(Self(parts))
    }

    #[must_use]
    pub fn parts(&self) -> &[KeyPart] {
        &self.0
    }
}

impl fmt::Display for KeyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyPart::Cell { universe, cell } => write!(f, "U{universe}:C{cell}"),
            KeyPart::Lattice { lattice, index } => {
                write!(f, "L{lattice}({},{},{})", index[0], index[1], index[2])
            }
        }
    }
}

impl fmt::Display for FsrKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" > ")?;
            }
            write!(f, "{part}")?;
        }
        Ok(())
    }
}
