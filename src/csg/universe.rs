use crate::error::Result;
use crate::math::{Point3, Vector3};

use super::cell::CellKey;
use super::CsgStore;

slotmap::new_key_type! {
    /// Unique identifier for a universe in the CSG store.
    pub struct UniverseKey;
}

/// User-facing universe identifier.
pub type UniverseId = u32;

/// An ordered collection of cells sharing one coordinate system.
///
/// Cells are expected not to overlap; where they do, the first listed cell wins.
#[derive(Debug, Clone)]
pub struct Universe {
    id: UniverseId,
    name: String,
    cells: Vec<CellKey>,
    pub(crate) fissionable: bool,
}

impl Universe {
    #[must_use]
    pub fn new(id: UniverseId, cells: Vec<CellKey>) -> Self {
        Self {
            id,
            name: String::new(),
            cells,
            fissionable: false,
        }
    }

    /// Sets a display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn id(&self) -> UniverseId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn cells(&self) -> &[CellKey] {
        &self.cells
    }

    /// Whether any material reachable from this universe is fissionable.
    ///
    /// Only meaningful after [`CsgStore::compute_fissionability`].
    #[must_use]
    pub fn is_fissionable(&self) -> bool {
        self.fissionable
    }

    /// Returns the first cell containing the point, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if a cell or surface is missing from the store.
    pub fn find_cell(
        &self,
        point: &Point3,
        direction: Option<&Vector3>,
        store: &CsgStore,
    ) -> Result<Option<CellKey>> {
        for &key in &self.cells {
            if store.cell(key)?.contains(point, direction, store)? {
                return Ok(Some(key));
            }
        }
        Ok(None)
    }
}
