use serde::{Deserialize, Serialize};

use crate::constants::columns::{EVALUATION, N_BASKETS, N_ITEMS, USER_ID};
use crate::errors::PrepError;
use crate::utils::stable_order_by_key;

pub use crate::types::{ItemId, ItemIndex, Timestamp, UserId};

/// Identifier column whose element shape is fixed when the table is built.
///
/// Inventory additions carry one item per row (`Scalar`); purchases carry one
/// basket per row (`Listed`). Consumers match on the variant instead of
/// probing individual cells.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemColumn<T> {
    /// One identifier per row.
    Scalar(Vec<T>),
    /// An ordered basket of identifiers per row.
    Listed(Vec<Vec<T>>),
}

impl<T> ItemColumn<T> {
    /// Number of rows in the column.
    pub fn len(&self) -> usize {
        match self {
            Self::Scalar(values) => values.len(),
            Self::Listed(baskets) => baskets.len(),
        }
    }

    /// True when the column holds no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True for basket-valued columns.
    pub fn is_listed(&self) -> bool {
        matches!(self, Self::Listed(_))
    }

    /// Items of row `idx` as a slice (a scalar row yields a single-element slice).
    ///
    /// Panics if `idx` is out of bounds, like slice indexing.
    pub fn row_items(&self, idx: usize) -> &[T] {
        match self {
            Self::Scalar(values) => std::slice::from_ref(&values[idx]),
            Self::Listed(baskets) => &baskets[idx],
        }
    }

    /// Every identifier in the column, rows in order and baskets flattened.
    pub fn iter_ids(&self) -> Box<dyn Iterator<Item = &T> + '_> {
        match self {
            Self::Scalar(values) => Box::new(values.iter()),
            Self::Listed(baskets) => Box::new(baskets.iter().flatten()),
        }
    }

    /// Number of items per row; scalar rows count as a basket of one.
    pub fn basket_sizes(&self) -> Vec<usize> {
        match self {
            Self::Scalar(values) => vec![1; values.len()],
            Self::Listed(baskets) => baskets.iter().map(Vec::len).collect(),
        }
    }

    /// Apply a fallible conversion to every identifier, keeping the column shape.
    pub fn try_map<U, E, F>(self, mut f: F) -> Result<ItemColumn<U>, E>
    where
        F: FnMut(T) -> Result<U, E>,
    {
        Ok(match self {
            Self::Scalar(values) => {
                ItemColumn::Scalar(values.into_iter().map(&mut f).collect::<Result<_, E>>()?)
            }
            Self::Listed(baskets) => ItemColumn::Listed(
                baskets
                    .into_iter()
                    .map(|basket| basket.into_iter().map(&mut f).collect::<Result<_, E>>())
                    .collect::<Result<_, E>>()?,
            ),
        })
    }
}

impl<T: Clone> ItemColumn<T> {
    /// Gather rows at `indices` (in that order) into a new column of the same shape.
    pub fn select(&self, indices: &[usize]) -> Self {
        match self {
            Self::Scalar(values) => Self::Scalar(gather(values, indices)),
            Self::Listed(baskets) => Self::Listed(gather(baskets, indices)),
        }
    }
}

/// Borrowed view of one canonical interaction row.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InteractionRecord<'a, T> {
    pub timestamp: Timestamp,
    pub user_id: Option<&'a str>,
    /// The row's item, or its basket in purchase order.
    pub items: &'a [T],
    pub n_baskets: Option<usize>,
    pub n_items: Option<usize>,
    pub evaluation: Option<bool>,
}

/// Canonical interaction stream stored column-wise.
///
/// All present columns have the same length. Optional columns are added by
/// later pipeline stages and never removed. Row positions carry no meaning
/// beyond the current ordering.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionTable<T = ItemId> {
    pub timestamp: Vec<Timestamp>,
    /// Absent for inventory-derived tables.
    pub user_id: Option<Vec<UserId>>,
    pub item_id: ItemColumn<T>,
    pub n_baskets: Option<Vec<usize>>,
    pub n_items: Option<Vec<usize>>,
    pub evaluation: Option<Vec<bool>>,
}

impl<T> InteractionTable<T> {
    /// Build a table from its canonical columns, checking they line up.
    pub fn new(
        timestamp: Vec<Timestamp>,
        user_id: Option<Vec<UserId>>,
        item_id: ItemColumn<T>,
    ) -> Result<Self, PrepError> {
        let table = Self {
            timestamp,
            user_id,
            item_id,
            n_baskets: None,
            n_items: None,
            evaluation: None,
        };
        table.check_lengths()?;
        Ok(table)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.timestamp.len()
    }

    /// True when the table holds no rows.
    pub fn is_empty(&self) -> bool {
        self.timestamp.is_empty()
    }

    /// Verify that every present column has one value per row.
    pub fn check_lengths(&self) -> Result<(), PrepError> {
        let rows = self.len();
        let mismatch = |name: &str, len: usize| {
            PrepError::Schema(format!(
                "column '{name}' has {len} values but the table has {rows} rows"
            ))
        };
        if self.item_id.len() != rows {
            return Err(mismatch("item_id", self.item_id.len()));
        }
        if let Some(users) = &self.user_id
            && users.len() != rows
        {
            return Err(mismatch(USER_ID, users.len()));
        }
        if let Some(counts) = &self.n_baskets
            && counts.len() != rows
        {
            return Err(mismatch(N_BASKETS, counts.len()));
        }
        if let Some(counts) = &self.n_items
            && counts.len() != rows
        {
            return Err(mismatch(N_ITEMS, counts.len()));
        }
        if let Some(flags) = &self.evaluation
            && flags.len() != rows
        {
            return Err(mismatch(EVALUATION, flags.len()));
        }
        Ok(())
    }

    /// The `user_id` column, or a schema error for tables without users.
    pub fn user_ids(&self) -> Result<&[UserId], PrepError> {
        self.user_id
            .as_deref()
            .ok_or_else(|| PrepError::Schema(format!("expected column '{USER_ID}' is absent")))
    }

    /// The `evaluation` column, or a schema error when rows were never marked.
    pub fn evaluation_flags(&self) -> Result<&[bool], PrepError> {
        self.evaluation
            .as_deref()
            .ok_or_else(|| PrepError::Schema(format!("expected column '{EVALUATION}' is absent")))
    }

    /// Borrowed view of row `idx`, or `None` when out of bounds.
    pub fn row(&self, idx: usize) -> Option<InteractionRecord<'_, T>> {
        if idx >= self.len() {
            return None;
        }
        Some(InteractionRecord {
            timestamp: self.timestamp[idx],
            user_id: self.user_id.as_ref().map(|users| users[idx].as_str()),
            items: self.item_id.row_items(idx),
            n_baskets: self.n_baskets.as_ref().map(|counts| counts[idx]),
            n_items: self.n_items.as_ref().map(|counts| counts[idx]),
            evaluation: self.evaluation.as_ref().map(|flags| flags[idx]),
        })
    }

    /// Iterate rows in table order.
    pub fn rows(&self) -> impl Iterator<Item = InteractionRecord<'_, T>> + '_ {
        (0..self.len()).filter_map(|idx| self.row(idx))
    }

    /// Swap the identifier column, keeping every other column and the row order.
    pub fn with_item_column<U>(self, item_id: ItemColumn<U>) -> Result<InteractionTable<U>, PrepError> {
        let table = InteractionTable {
            timestamp: self.timestamp,
            user_id: self.user_id,
            item_id,
            n_baskets: self.n_baskets,
            n_items: self.n_items,
            evaluation: self.evaluation,
        };
        table.check_lengths()?;
        Ok(table)
    }
}

impl<T: Clone> InteractionTable<T> {
    /// Gather rows at `indices` (in that order) across every column.
    pub fn select(&self, indices: &[usize]) -> Self {
        Self {
            timestamp: gather(&self.timestamp, indices),
            user_id: self.user_id.as_ref().map(|users| gather(users, indices)),
            item_id: self.item_id.select(indices),
            n_baskets: self.n_baskets.as_ref().map(|counts| gather(counts, indices)),
            n_items: self.n_items.as_ref().map(|counts| gather(counts, indices)),
            evaluation: self.evaluation.as_ref().map(|flags| gather(flags, indices)),
        }
    }

    /// Stable sort by ascending timestamp; ties keep their current order.
    pub fn sort_by_timestamp(self) -> Self {
        let order = stable_order_by_key(&self.timestamp, |ts| *ts);
        if order.iter().enumerate().all(|(pos, idx)| pos == *idx) {
            return self;
        }
        self.select(&order)
    }
}

/// Borrowed view of one holdout scenario.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HoldoutScenario<'a, T> {
    pub timestamp: Timestamp,
    /// Flattened items of every non-evaluation row of the user.
    pub profile: &'a [T],
    /// Item or basket of the held-out row.
    pub predict: &'a [T],
    pub user_id: &'a str,
}

/// One row per evaluation-flagged interaction, sorted by timestamp.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldoutTable<T = ItemId> {
    pub timestamp: Vec<Timestamp>,
    pub profile: Vec<Vec<T>>,
    pub predict: ItemColumn<T>,
    pub user_id: Vec<UserId>,
}

impl<T> HoldoutTable<T> {
    /// Number of scenarios.
    pub fn len(&self) -> usize {
        self.timestamp.len()
    }

    /// True when no user qualified for evaluation.
    pub fn is_empty(&self) -> bool {
        self.timestamp.is_empty()
    }

    /// Borrowed view of scenario `idx`, or `None` when out of bounds.
    pub fn scenario(&self, idx: usize) -> Option<HoldoutScenario<'_, T>> {
        if idx >= self.len() {
            return None;
        }
        Some(HoldoutScenario {
            timestamp: self.timestamp[idx],
            profile: &self.profile[idx],
            predict: self.predict.row_items(idx),
            user_id: &self.user_id[idx],
        })
    }

    /// Iterate scenarios in table order.
    pub fn scenarios(&self) -> impl Iterator<Item = HoldoutScenario<'_, T>> + '_ {
        (0..self.len()).filter_map(|idx| self.scenario(idx))
    }
}

fn gather<V: Clone>(values: &[V], indices: &[usize]) -> Vec<V> {
    indices.iter().map(|&idx| values[idx].clone()).collect()
}
