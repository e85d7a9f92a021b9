mod key;

pub use key::{FsrKey, KeyPart};

use std::collections::HashMap;
use std::fmt;

use parking_lot::Mutex;
use tracing::warn;

use crate::csg::MaterialId;
use crate::error::{ConsistencyError, Result};
use crate::math::Point3;

/// Dense flat source region index in `[0, num_fsrs)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FsrId(usize);

impl FsrId {
    #[must_use]
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for FsrId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-region data, as exchanged through [`FsrTable::fingerprint_map`] and
/// [`FsrTable::set_fingerprint_map`].
#[derive(Debug, Clone, PartialEq)]
pub struct FsrRecord {
    pub id: FsrId,
    /// A point known to lie inside the region, in root coordinates.
    pub point: Point3,
    /// Aggregate centre of the region, once computed.
    pub centroid: Option<Point3>,
    pub material: MaterialId,
}

#[derive(Debug, Clone, PartialEq)]
struct FsrEntry {
    key: FsrKey,
    point: Point3,
    centroid: Option<Point3>,
    material: MaterialId,
}

/// Registry under construction, shared by enumeration workers.
///
/// [`resolve`](Self::resolve) is the only place a new id is allocated; the
/// check, allocation and insertion happen under one lock.
#[derive(Debug, Default)]
pub struct FsrRegistry {
    state: Mutex<FsrTable>,
}

impl FsrRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id of `key`, allocating the next id if it is new.
    ///
    /// `point` and `material` are only stored on first sight.
    pub fn resolve(&self, key: FsrKey, point: Point3, material: MaterialId) -> FsrId {
        let mut table = self.state.lock();
        if let Some(&id) = table.index.get(&key) {
            return id;
        }
        let id = FsrId(table.entries.len());
        table.index.insert(key.clone(), id);
        table.entries.push(FsrEntry {
            key,
            point,
            centroid: None,
            material,
        });
        id
    }

    /// Registers every region of a partial registry, in its id order.
    pub fn absorb(&self, partial: FsrTable) {
        for entry in partial.entries {
            self.resolve(entry.key, entry.point, entry.material);
        }
    }

    /// Number of regions registered so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ends allocation, producing the lookup-only table.
    #[must_use]
    pub fn finalize(self) -> FsrTable {
        self.state.into_inner()
    }
}

/// Finalized fingerprint ↔ id association.
///
/// One growth-only sequence indexed by id holds each region's fingerprint,
/// material and points; a map from fingerprint to id is kept beside it.
/// Lookups need no locking. New ids can only appear through bulk replacement.
#[derive(Debug, Clone, Default)]
pub struct FsrTable {
    entries: Vec<FsrEntry>,
    index: HashMap<FsrKey, FsrId>,
}

impl FsrTable {
    /// Number of flat source regions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the id of a fingerprint, if registered.
    #[must_use]
    pub fn get(&self, key: &FsrKey) -> Option<FsrId> {
        self.index.get(key).copied()
    }

    /// Returns the id of a fingerprint that must already be registered.
    ///
    /// # Errors
    ///
    /// Returns [`ConsistencyError::Unregistered`] if the fingerprint is unknown.
    pub fn lookup(&self, key: &FsrKey) -> Result<FsrId> {
        self.get(key)
            .ok_or_else(|| ConsistencyError::Unregistered(key.to_string()).into())
    }

    fn entry(&self, id: FsrId) -> Result<&FsrEntry> {
        self.entries.get(id.0).ok_or_else(|| {
            ConsistencyError::UnknownFsr {
                id: id.0,
                count: self.entries.len(),
            }
            .into()
        })
    }

    /// Fingerprint of a region.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is out of range.
    pub fn key(&self, id: FsrId) -> Result<&FsrKey> {
        Ok(&self.entry(id)?.key)
    }

    /// Material id of a region.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is out of range.
    pub fn material(&self, id: FsrId) -> Result<MaterialId> {
        Ok(self.entry(id)?.material)
    }

    /// Representative point of a region.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is out of range.
    pub fn point(&self, id: FsrId) -> Result<&Point3> {
        Ok(&self.entry(id)?.point)
    }

    /// Centroid of a region, if one has been assigned.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is out of range.
    pub fn centroid(&self, id: FsrId) -> Result<Option<&Point3>> {
        Ok(self.entry(id)?.centroid.as_ref())
    }

    /// Stores the finished centroid of a region.
    ///
    /// Centroids are aggregates over the whole region and are assigned once.
    /// Assigning again overwrites the previous value and logs a warning.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is out of range.
    pub fn set_centroid(&mut self, id: FsrId, centroid: Point3) -> Result<()> {
        self.entry(id)?;
        let entry = &mut self.entries[id.0];
        if let Some(previous) = entry.centroid.replace(centroid) {
            warn!(
                fsr = id.0,
                ?previous,
                ?centroid,
                "centroid assigned more than once; keeping the latest"
            );
        }
        Ok(())
    }

    /// Fingerprints in id order.
    pub fn keys(&self) -> impl ExactSizeIterator<Item = &FsrKey> + '_ {
        self.entries.iter().map(|e| &e.key)
    }

    /// Material ids in id order.
    #[must_use]
    pub fn materials(&self) -> Vec<MaterialId> {
        self.entries.iter().map(|e| e.material).collect()
    }

    /// Snapshot of the fingerprint → record association.
    #[must_use]
    pub fn fingerprint_map(&self) -> HashMap<FsrKey, FsrRecord> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, e)| {
                (
                    e.key.clone(),
                    FsrRecord {
                        id: FsrId(i),
                        point: e.point,
                        centroid: e.centroid,
                        material: e.material,
                    },
                )
            })
            .collect()
    }

    /// Renumbers the registered regions so that `keys[i]` gets id `i` and
    /// material `materials[i]`. Points and centroids follow their fingerprint.
    ///
    /// Validation happens before any change; on error the table is untouched.
    ///
    /// # Errors
    ///
    /// Returns a [`ConsistencyError`] if the lengths differ from each other or
    /// from the table, a fingerprint is repeated, or one is not registered.
    pub fn set_all(&mut self, keys: Vec<FsrKey>, materials: Vec<MaterialId>) -> Result<()> {
        if keys.len() != materials.len() {
            return Err(ConsistencyError::CardinalityMismatch {
                keys: keys.len(),
                materials: materials.len(),
            }
            .into());
        }
        if keys.len() != self.entries.len() {
            return Err(ConsistencyError::SizeMismatch {
                given: keys.len(),
                held: self.entries.len(),
            }
            .into());
        }

        let mut index = HashMap::with_capacity(keys.len());
        let mut entries = Vec::with_capacity(keys.len());
        for (i, (key, material)) in keys.into_iter().zip(materials).enumerate() {
            let previous = self.entry(self.lookup(&key)?)?;
            let (point, centroid) = (previous.point, previous.centroid);
            if index.insert(key.clone(), FsrId(i)).is_some() {
                return Err(ConsistencyError::DuplicateFingerprint(key.to_string()).into());
            }
            entries.push(FsrEntry {
                key,
                point,
                centroid,
                material,
            });
        }

        self.entries = entries;
        self.index = index;
        Ok(())
    }

    /// Replaces the whole table with the given association, typically a
    /// merge of per-worker partial registries.
    ///
    /// Validation happens before any change; on error the table is untouched.
    ///
    /// # Errors
    ///
    /// Returns [`ConsistencyError::NonContiguousIds`] unless the record ids
    /// are exactly `0..map.len()`.
    pub fn set_fingerprint_map(&mut self, map: HashMap<FsrKey, FsrRecord>) -> Result<()> {
        let count = map.len();
        let mut slots: Vec<Option<FsrEntry>> = vec![None; count];
        for (key, record) in map {
            let slot = slots.get_mut(record.id.0).ok_or_else(|| {
                ConsistencyError::NonContiguousIds(format!(
                    "id {} out of range for {count} records",
                    record.id
                ))
            })?;
            if slot.is_some() {
                return Err(ConsistencyError::NonContiguousIds(format!(
                    "id {} assigned twice",
                    record.id
                ))
                .into());
            }
            *slot = Some(FsrEntry {
                key,
                point: record.point,
                centroid: record.centroid,
                material: record.material,
            });
        }

        // Every id is in range and none repeats, so every slot is filled.
        let entries: Vec<FsrEntry> = slots.into_iter().flatten().collect();
        self.index = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.key.clone(), FsrId(i)))
            .collect();
        self.entries = entries;
        Ok(())
    }
}
