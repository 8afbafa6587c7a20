//! Derived per-user and per-basket counts for the purchase stream.

use std::collections::HashMap;
use tracing::debug;

use crate::data::InteractionTable;
use crate::errors::PrepError;

/// Add `n_baskets` (rows per user, broadcast to each of the user's rows) and
/// `n_items` (basket size of each row), then re-sort by timestamp.
///
/// Scalar item columns count as baskets of one. An empty table gains empty
/// columns. Fails only when the table has no `user_id` column.
pub fn add_aggregation_columns<T: Clone>(
    mut table: InteractionTable<T>,
) -> Result<InteractionTable<T>, PrepError> {
    table.check_lengths()?;
    let users = table.user_ids()?;
    let mut per_user: HashMap<&str, usize> = HashMap::new();
    for user in users {
        *per_user.entry(user.as_str()).or_insert(0) += 1;
    }
    let n_baskets: Vec<usize> = users.iter().map(|user| per_user[user.as_str()]).collect();
    debug!(
        rows = table.len(),
        users = per_user.len(),
        "added per-user basket counts"
    );
    table.n_baskets = Some(n_baskets);
    table.n_items = Some(table.item_id.basket_sizes());
    Ok(table.sort_by_timestamp())
}
