slotmap::new_key_type! {
    /// Unique identifier for a material in the CSG store.
    pub struct MaterialKey;
}

/// User-facing material identifier.
pub type MaterialId = u32;

/// The parts of a material the spatial core needs.
///
/// Cross sections live with the solver; this only records identity,
/// energy group count and whether the material can fission.
#[derive(Debug, Clone)]
pub struct Material {
    id: MaterialId,
    name: String,
    num_groups: usize,
    fissionable: bool,
}

impl Material {
    /// Creates a non-fissionable material with the given group count.
    #[must_use]
    pub fn new(id: MaterialId, num_groups: usize) -> Self {
        Self {
            id,
            name: String::new(),
            num_groups,
            fissionable: false,
        }
    }

    /// Sets a display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Marks the material as fissionable.
    #[must_use]
    pub fn with_fissionable(mut self, fissionable: bool) -> Self {
        self.fissionable = fissionable;
        self
    }

    #[must_use]
    pub fn id(&self) -> MaterialId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn num_groups(&self) -> usize {
        self.num_groups
    }

    #[must_use]
    pub fn is_fissionable(&self) -> bool {
        self.fissionable
    }
}
