//! Chronological leave-last-k-out evaluation split.
//!
//! The split is decided per user, never globally:
//! - a user with more than `threshold` rows has exactly the last `threshold`
//!   rows (by timestamp, ties in table order) flagged for evaluation;
//! - a user with `threshold` rows or fewer has no flagged row and stays in
//!   training entirely.
//!
//! Every evaluated user therefore keeps at least one training interaction.

use std::collections::BTreeMap;
use tracing::debug;

use crate::constants::splits::DEFAULT_THRESHOLD;
use crate::data::{HoldoutTable, InteractionTable};
use crate::errors::PrepError;
use crate::types::UserId;
use crate::utils::stable_order_by_key;

/// Leave-last-`threshold`-out splitter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EvaluationSplitter {
    threshold: usize,
}

impl Default for EvaluationSplitter {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl EvaluationSplitter {
    /// Create a splitter holding out the last `threshold` rows per user.
    pub fn new(threshold: usize) -> Result<Self, PrepError> {
        if threshold == 0 {
            return Err(PrepError::Configuration(
                "evaluation threshold must be at least 1".to_string(),
            ));
        }
        Ok(Self { threshold })
    }

    /// Rows held out per qualifying user.
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Add the `evaluation` column and return the table sorted by timestamp.
    ///
    /// Rows are grouped per user into position lists, flags are computed per
    /// group, then scattered back by position.
    pub fn mark_evaluation_rows<T: Clone>(
        &self,
        table: InteractionTable<T>,
    ) -> Result<InteractionTable<T>, PrepError> {
        table.check_lengths()?;
        let mut table = table.sort_by_timestamp();
        let groups = group_rows_by_user(table.user_ids()?);

        let mut flags = vec![false; table.len()];
        let mut evaluated_users = 0usize;
        for positions in groups.values() {
            if positions.len() > self.threshold {
                evaluated_users += 1;
                for &pos in &positions[positions.len() - self.threshold..] {
                    flags[pos] = true;
                }
            }
        }
        debug!(
            threshold = self.threshold,
            users = groups.len(),
            evaluated_users,
            excluded_users = groups.len() - evaluated_users,
            "marked evaluation rows"
        );
        table.evaluation = Some(flags);
        Ok(table)
    }

    /// Split a marked table into holdout scenarios and residual training rows.
    ///
    /// Returns `(holdout, train)`. Each user's `profile` is the concatenation of
    /// all of that user's unflagged baskets and is shared, unchanged, by every
    /// one of the user's scenarios. Both outputs are sorted by timestamp.
    pub fn get_holdout<T: Clone>(
        &self,
        table: InteractionTable<T>,
    ) -> Result<(HoldoutTable<T>, InteractionTable<T>), PrepError> {
        table.check_lengths()?;
        let flags = table.evaluation_flags()?;
        let users = table.user_ids()?;
        let groups = group_rows_by_user(users);

        let mut timestamps = Vec::new();
        let mut profiles = Vec::new();
        let mut predict_rows = Vec::new();
        let mut scenario_users: Vec<UserId> = Vec::new();
        for (user_id, positions) in &groups {
            let (predict_positions, profile_positions): (Vec<usize>, Vec<usize>) =
                positions.iter().partition(|&&pos| flags[pos]);
            if predict_positions.is_empty() {
                continue;
            }
            let profile: Vec<T> = profile_positions
                .iter()
                .flat_map(|&pos| table.item_id.row_items(pos).iter().cloned())
                .collect();
            for pos in predict_positions {
                timestamps.push(table.timestamp[pos]);
                profiles.push(profile.clone());
                predict_rows.push(pos);
                scenario_users.push((*user_id).to_string());
            }
        }

        let order = stable_order_by_key(&timestamps, |ts| *ts);
        let holdout = HoldoutTable {
            timestamp: order.iter().map(|&idx| timestamps[idx]).collect(),
            profile: order.iter().map(|&idx| profiles[idx].clone()).collect(),
            predict: table
                .item_id
                .select(&order.iter().map(|&idx| predict_rows[idx]).collect::<Vec<_>>()),
            user_id: order.iter().map(|&idx| scenario_users[idx].clone()).collect(),
        };

        let train_rows: Vec<usize> = (0..table.len()).filter(|&pos| !flags[pos]).collect();
        let train = table.select(&train_rows).sort_by_timestamp();
        debug!(
            scenarios = holdout.len(),
            train_rows = train.len(),
            "extracted holdout scenarios"
        );
        Ok((holdout, train))
    }

    /// `mark_evaluation_rows` followed by `get_holdout`.
    pub fn split<T: Clone>(
        &self,
        table: InteractionTable<T>,
    ) -> Result<(HoldoutTable<T>, InteractionTable<T>), PrepError> {
        let marked = self.mark_evaluation_rows(table)?;
        self.get_holdout(marked)
    }
}

/// Row positions per user, in table order, keyed by user id.
pub fn group_rows_by_user(users: &[UserId]) -> BTreeMap<&str, Vec<usize>> {
    let mut groups: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (pos, user) in users.iter().enumerate() {
        groups.entry(user.as_str()).or_default().push(pos);
    }
    groups
}
