//! Dense remapping of external item identifiers.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::data::{HoldoutTable, InteractionTable, ItemColumn};
use crate::errors::PrepError;
use crate::types::{ItemId, ItemIndex};

/// Mapping from external item identifier to a dense zero-based index.
///
/// Built once upstream from the full item vocabulary and read-only afterwards.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentifierIndex {
    entries: IndexMap<ItemId, ItemIndex>,
}

impl IdentifierIndex {
    /// Wrap an externally supplied mapping.
    ///
    /// The indices must be exactly `0..entries.len()`, each used once;
    /// anything else is a configuration error.
    pub fn new(entries: IndexMap<ItemId, ItemIndex>) -> Result<Self, PrepError> {
        let index = Self { entries };
        index.check_dense()?;
        Ok(index)
    }

    /// Assign indices `0..n` to identifiers in first-seen order.
    pub fn from_vocabulary<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut index = Self::default();
        index.extend_vocabulary(ids);
        index
    }

    /// Append identifiers not yet present, continuing the dense numbering.
    pub fn extend_vocabulary<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for id in ids {
            let id = id.as_ref();
            if !self.entries.contains_key(id) {
                let next = self.next_index();
                self.entries.insert(id.to_string(), next);
            }
        }
    }

    /// Load a plain `{ "id": index }` JSON object, rejecting non-dense indices.
    pub fn from_json_path(path: impl AsRef<Path>) -> Result<Self, PrepError> {
        let raw = fs::read_to_string(path.as_ref())?;
        Self::new(serde_json::from_str(&raw)?)
    }

    /// Persist as a plain `{ "id": index }` JSON object.
    pub fn to_json_path(&self, path: impl AsRef<Path>) -> Result<(), PrepError> {
        fs::write(path.as_ref(), serde_json::to_vec_pretty(self)?)?;
        Ok(())
    }

    /// Index for `id`, if known.
    pub fn get(&self, id: &str) -> Option<ItemIndex> {
        self.entries.get(id).copied()
    }

    /// Index for `id`, or a lookup error naming it.
    pub fn lookup(&self, id: &str) -> Result<ItemIndex, PrepError> {
        self.get(id).ok_or_else(|| PrepError::Lookup {
            identifier: id.to_string(),
        })
    }

    /// Number of identifiers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the index has no identifiers.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reverse mapping from index back to identifier.
    pub fn inverse(&self) -> HashMap<ItemIndex, ItemId> {
        self.entries
            .iter()
            .map(|(id, idx)| (*idx, id.clone()))
            .collect()
    }

    // One past the largest assigned index, so appended ids never collide.
    fn next_index(&self) -> ItemIndex {
        self.entries.values().max().map_or(0, |max| max + 1)
    }

    fn check_dense(&self) -> Result<(), PrepError> {
        let mut seen = vec![false; self.entries.len()];
        for (id, &idx) in &self.entries {
            let slot = usize::try_from(idx)
                .ok()
                .and_then(|pos| seen.get_mut(pos))
                .ok_or_else(|| {
                    PrepError::Configuration(format!(
                        "identifier '{id}' has index {idx} outside 0..{}",
                        self.entries.len()
                    ))
                })?;
            if *slot {
                return Err(PrepError::Configuration(format!(
                    "index {idx} is assigned to more than one identifier (including '{id}')"
                )));
            }
            *slot = true;
        }
        Ok(())
    }
}

/// Applies an `IdentifierIndex` to identifier columns.
///
/// Unknown identifiers abort the remap; nothing is dropped or defaulted.
#[derive(Clone, Copy, Debug)]
pub struct IdentifierRemapper<'a> {
    index: &'a IdentifierIndex,
}

impl<'a> IdentifierRemapper<'a> {
    /// Remap through `index`.
    pub fn new(index: &'a IdentifierIndex) -> Self {
        Self { index }
    }

    /// Remap every identifier of a column, keeping its scalar/basket shape.
    pub fn remap_column(
        &self,
        column: ItemColumn<ItemId>,
    ) -> Result<ItemColumn<ItemIndex>, PrepError> {
        column.try_map(|id| self.index.lookup(&id))
    }

    /// Replace `item_id`; every other column and the row order are untouched.
    pub fn remap_interactions(
        &self,
        mut table: InteractionTable<ItemId>,
    ) -> Result<InteractionTable<ItemIndex>, PrepError> {
        let rows = table.len();
        let item_id = std::mem::replace(&mut table.item_id, ItemColumn::Scalar(Vec::new()));
        let remapped = self.remap_column(item_id)?;
        debug!(rows, listed = remapped.is_listed(), "remapped interaction identifiers");
        table.with_item_column(remapped)
    }

    /// Remap both `profile` and `predict`, which share the `item_id` space.
    pub fn remap_holdout(
        &self,
        holdout: HoldoutTable<ItemId>,
    ) -> Result<HoldoutTable<ItemIndex>, PrepError> {
        let profile = holdout
            .profile
            .into_iter()
            .map(|items| {
                items
                    .iter()
                    .map(|id| self.index.lookup(id))
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;
        let predict = self.remap_column(holdout.predict)?;
        debug!(scenarios = holdout.timestamp.len(), "remapped holdout identifiers");
        Ok(HoldoutTable {
            timestamp: holdout.timestamp,
            profile,
            predict,
            user_id: holdout.user_id,
        })
    }
}
